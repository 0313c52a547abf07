/// End-to-end sessions driven through in-memory streams
use serde_json::{json, Value};
use tempfile::TempDir;
use touch_mcp_server::*;

#[cfg(test)]
mod stdio_session_tests {
    use super::*;

    /// Config that creates files under `home` and keeps the log out of the way
    fn config_for(home: &TempDir) -> ServerConfig {
        ServerConfig {
            default_touch_path: None,
            home_dir: Some(home.path().to_path_buf()),
            log_file: None,
        }
    }

    async fn run_session(config: ServerConfig, input: &str) -> Vec<Value> {
        let mut output = Vec::new();
        TouchServer::new(config)
            .serve(input.as_bytes(), &mut output)
            .await
            .expect("session failed");

        String::from_utf8(output)
            .expect("output is not UTF-8")
            .lines()
            .map(|line| serde_json::from_str(line).expect("output line is not JSON"))
            .collect()
    }

    fn call_touch(id: u64, arguments: Value) -> String {
        json!({
            "jsonrpc": "2.0",
            "id": id,
            "method": "tools/call",
            "params": {"name": "touch-mcp", "arguments": arguments}
        })
        .to_string()
    }

    fn is_closed_stream_error(response: &Value) -> bool {
        response["id"].is_null() && response["error"]["code"] == -32700
    }

    #[tokio::test]
    async fn test_initialize_handshake() {
        let home = TempDir::new().expect("Failed to create temp dir");
        let input = r#"
            {"jsonrpc":"2.0","id":1,"method":"initialize","params":{"protocolVersion":"2024-11-05","capabilities":{},"clientInfo":{"name":"test","version":"0"}}}
            {"jsonrpc":"2.0","method":"notifications/initialized"}
        "#;

        let responses = run_session(config_for(&home), input).await;

        assert_eq!(responses.len(), 2);
        let result = &responses[0]["result"];
        assert_eq!(responses[0]["id"], 1);
        assert_eq!(result["protocolVersion"], "2024-11-05");
        assert_eq!(result["capabilities"]["tools"], json!({}));
        assert_eq!(result["serverInfo"]["name"], "touch-mcp-server");
        assert!(is_closed_stream_error(&responses[1]));
    }

    #[tokio::test]
    async fn test_notifications_produce_no_output() {
        let home = TempDir::new().expect("Failed to create temp dir");
        let input = r#"
            {"jsonrpc":"2.0","id":10,"method":"initialized"}
            {"jsonrpc":"2.0","id":11,"method":"cancelled","params":{"requestId":3}}
            {"jsonrpc":"2.0","method":"notifications/cancelled"}
            {"jsonrpc":"2.0","id":12,"method":"resources/list"}
        "#;

        let responses = run_session(config_for(&home), input).await;

        assert_eq!(responses.len(), 2);
        assert_eq!(responses[0]["id"], 12);
        assert_eq!(responses[0]["result"], json!({"resources": []}));
    }

    #[tokio::test]
    async fn test_tools_list_advertises_touch() {
        let home = TempDir::new().expect("Failed to create temp dir");
        let input = r#"{"jsonrpc":"2.0","id":"list","method":"tools/list"}"#;

        let responses = run_session(config_for(&home), input).await;

        let tools = responses[0]["result"]["tools"].as_array().expect("tools array");
        assert_eq!(responses[0]["id"], "list");
        assert_eq!(tools.len(), 1);
        assert_eq!(tools[0]["name"], "touch-mcp");
        let schema = &tools[0]["inputSchema"];
        assert_eq!(schema["required"], json!(["file"]));
        assert_eq!(schema["properties"]["file"]["type"], "string");
        assert_eq!(schema["properties"]["destPath"]["type"], "string");
    }

    #[tokio::test]
    async fn test_touch_creates_file_in_home() {
        let home = TempDir::new().expect("Failed to create temp dir");
        let input = call_touch(5, json!({"file": "a.txt"}));

        let responses = run_session(config_for(&home), &input).await;

        assert!(home.path().join("a.txt").is_file());
        assert_eq!(responses[0]["id"], 5);
        assert_eq!(
            responses[0]["result"],
            json!({"content": [{
                "type": "text",
                "text": format!("File a.txt created successfully at {}", home.path().display())
            }]})
        );
    }

    #[tokio::test]
    async fn test_default_touch_path_beats_home() {
        let home = TempDir::new().expect("Failed to create temp dir");
        let drop_dir = TempDir::new().expect("Failed to create temp dir");
        let config = ServerConfig {
            default_touch_path: Some(drop_dir.path().to_path_buf()),
            ..config_for(&home)
        };

        run_session(config, &call_touch(1, json!({"file": "b.txt"}))).await;

        assert!(drop_dir.path().join("b.txt").is_file());
        assert!(!home.path().join("b.txt").exists());
    }

    #[tokio::test]
    async fn test_dest_path_argument_wins() {
        let home = TempDir::new().expect("Failed to create temp dir");
        let target = TempDir::new().expect("Failed to create temp dir");
        let dest = target.path().display().to_string();

        let responses = run_session(
            config_for(&home),
            &call_touch(1, json!({"file": "c.txt", "destPath": dest})),
        )
        .await;

        assert!(target.path().join("c.txt").is_file());
        let text = responses[0]["result"]["content"][0]["text"].as_str().unwrap();
        assert_eq!(text, format!("File c.txt created successfully at {}", dest));
    }

    #[tokio::test]
    async fn test_second_touch_fails_with_internal_error() {
        let home = TempDir::new().expect("Failed to create temp dir");
        let input = format!(
            "{}\n{}\n",
            call_touch(1, json!({"file": "twice.txt"})),
            call_touch(2, json!({"file": "twice.txt"}))
        );

        let responses = run_session(config_for(&home), &input).await;

        assert!(responses[0]["result"].is_object());
        assert_eq!(responses[1]["id"], 2);
        assert_eq!(responses[1]["error"]["code"], -32603);
        assert!(responses[1]["result"].is_null());
        let message = responses[1]["error"]["message"].as_str().unwrap();
        assert!(message.starts_with("Failed to create file"));
    }

    #[tokio::test]
    async fn test_missing_directory_is_internal_error() {
        let home = TempDir::new().expect("Failed to create temp dir");
        let dest = home.path().join("does-not-exist").display().to_string();

        let responses = run_session(
            config_for(&home),
            &call_touch(9, json!({"file": "x", "destPath": dest})),
        )
        .await;

        assert_eq!(responses[0]["error"]["code"], -32603);
    }

    #[tokio::test]
    async fn test_invalid_params_keep_session_alive() {
        let home = TempDir::new().expect("Failed to create temp dir");
        let input = [
            call_touch(1, json!({})),
            call_touch(2, json!({"file": ""})),
            r#"{"jsonrpc":"2.0","id":3,"method":"tools/call","params":{"name":"touch-mcp"}}"#.to_string(),
            r#"{"jsonrpc":"2.0","id":4,"method":"tools/call","params":"touch-mcp"}"#.to_string(),
            r#"{"jsonrpc":"2.0","id":5,"method":"tools/call"}"#.to_string(),
            r#"{"jsonrpc":"2.0","id":6,"method":"tools/list"}"#.to_string(),
        ]
        .join("\n");

        let responses = run_session(config_for(&home), &input).await;

        assert_eq!(responses.len(), 7);
        for (i, response) in responses[..5].iter().enumerate() {
            assert_eq!(response["id"], json!(i + 1));
            assert_eq!(response["error"]["code"], -32602);
        }
        assert!(responses[5]["result"]["tools"].is_array());
    }

    #[tokio::test]
    async fn test_unknown_tool_and_method() {
        let home = TempDir::new().expect("Failed to create temp dir");
        let input = r#"
            {"jsonrpc":"2.0","id":1,"method":"tools/call","params":{"name":"rm-rf","arguments":{}}}
            {"jsonrpc":"2.0","id":2,"method":"resources/read"}
            {"jsonrpc":"2.0","id":3,"method":"prompts/list"}
        "#;

        let responses = run_session(config_for(&home), input).await;

        assert_eq!(responses[0]["error"]["code"], -32601);
        assert!(responses[0]["error"]["message"].as_str().unwrap().contains("rm-rf"));
        assert_eq!(responses[1]["error"]["code"], -32601);
        assert!(responses[1]["error"]["message"].as_str().unwrap().contains("resources/read"));
        assert_eq!(responses[2]["result"], json!({"prompts": []}));
    }

    #[tokio::test]
    async fn test_wrong_version_stops_processing() {
        let home = TempDir::new().expect("Failed to create temp dir");
        let input = format!(
            "{}\n{}\n",
            r#"{"jsonrpc":"1.0","id":"old","method":"initialize"}"#,
            call_touch(2, json!({"file": "never.txt"}))
        );

        let responses = run_session(config_for(&home), &input).await;

        assert_eq!(responses.len(), 1);
        assert_eq!(responses[0]["id"], "old");
        assert_eq!(responses[0]["error"]["code"], -32600);
        assert!(!home.path().join("never.txt").exists());
    }

    #[tokio::test]
    async fn test_missing_version_stops_processing() {
        let home = TempDir::new().expect("Failed to create temp dir");
        let input = format!(
            "{}\n{}\n{}\n",
            call_touch(1, Value::Null),
            r#"{"id":2,"method":"initialize"}"#,
            r#"{"jsonrpc":"2.0","id":3,"method":"tools/list"}"#
        );

        let responses = run_session(config_for(&home), &input).await;

        assert_eq!(responses.len(), 2);
        assert_eq!(responses[0]["id"], 1);
        assert_eq!(responses[0]["error"]["code"], -32602);
        assert_eq!(responses[1]["id"], 2);
        assert_eq!(responses[1]["error"]["code"], -32600);
    }

    #[tokio::test]
    async fn test_missing_method_keeps_session_alive() {
        let home = TempDir::new().expect("Failed to create temp dir");
        let input = r#"
            {"jsonrpc":"2.0","id":3}
            {"jsonrpc":"2.0","id":4,"method":"tools/list"}
        "#;

        let responses = run_session(config_for(&home), input).await;

        assert_eq!(responses.len(), 3);
        assert_eq!(responses[0]["id"], 3);
        assert_eq!(responses[0]["error"]["code"], -32601);
        assert_eq!(responses[1]["id"], 4);
        assert_eq!(responses[1]["result"]["tools"][0]["name"], "touch-mcp");
        assert!(is_closed_stream_error(&responses[2]));
    }

    #[tokio::test]
    async fn test_malformed_json_stops_processing() {
        let home = TempDir::new().expect("Failed to create temp dir");
        let input = format!(
            "{}\n{}\n",
            r#"{"jsonrpc":"2.0","id":1,"method":}"#,
            call_touch(2, json!({"file": "never.txt"}))
        );

        let responses = run_session(config_for(&home), &input).await;

        assert_eq!(responses.len(), 1);
        assert!(is_closed_stream_error(&responses[0]));
        assert!(!home.path().join("never.txt").exists());
    }

    #[tokio::test]
    async fn test_whitespace_between_messages_is_irrelevant() {
        let home = TempDir::new().expect("Failed to create temp dir");
        let input = "{\"jsonrpc\":\"2.0\",\"id\":1,\"method\":\"tools/list\"}{\"jsonrpc\":\"2.0\",\n\"id\":2,\n\"method\":\"prompts/list\"\n}";

        let responses = run_session(config_for(&home), input).await;

        assert_eq!(responses.len(), 3);
        assert_eq!(responses[0]["id"], 1);
        assert_eq!(responses[1]["id"], 2);
    }

    #[tokio::test]
    async fn test_diagnostic_log_records_traffic() {
        let home = TempDir::new().expect("Failed to create temp dir");
        let log_path = home.path().join("touch-mcp-server.log");
        let config = ServerConfig {
            log_file: Some(log_path.clone()),
            ..config_for(&home)
        };

        run_session(config, &call_touch(42, json!({"file": "logged.txt"}))).await;

        let log = std::fs::read_to_string(&log_path).expect("log file missing");
        assert!(log.contains(" starting\n"));
        assert!(log.contains(">> Request: [42] tools/call"));
        assert!(log.contains(">> Response: [42] Succeed"));
        assert!(log.contains(">> Response: [null] Failed"));
        assert!(log.trim_end().ends_with(" exiting"));
    }

    #[tokio::test]
    async fn test_broken_log_does_not_change_responses() {
        let home = TempDir::new().expect("Failed to create temp dir");
        let config = ServerConfig {
            // A directory cannot be appended to
            log_file: Some(home.path().to_path_buf()),
            ..config_for(&home)
        };

        let responses = run_session(config, &call_touch(1, json!({"file": "ok.txt"}))).await;

        assert!(responses[0]["result"].is_object());
        assert!(home.path().join("ok.txt").is_file());
    }
}
