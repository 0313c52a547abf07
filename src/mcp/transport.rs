/// Stream framing for JSON-RPC messages
///
/// Input is a sequence of JSON values with arbitrary whitespace between
/// them; line breaks carry no meaning. Output is one compact JSON object per
/// line.

use serde::Serialize;
use serde_json::{Deserializer, Value};
use thiserror::Error;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::mcp::protocol::JsonRpcRequest;
use crate::ServerError;

const READ_CHUNK: usize = 4096;

/// Errors that end the read side of a session
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("input stream closed")]
    Closed,

    #[error("input stream closed in the middle of a message")]
    Truncated,

    #[error("{0}")]
    Malformed(serde_json::Error),

    #[error("{0}")]
    Shape(serde_json::Error),

    #[error("{0}")]
    Io(#[from] std::io::Error),
}

/// Decodes consecutive JSON values from an async byte stream
pub struct MessageReader<R> {
    reader: R,
    buf: Vec<u8>,
}

impl<R: AsyncRead + Unpin> MessageReader<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            buf: Vec::new(),
        }
    }

    /// Read the next value and decode it as a request
    pub async fn next_request(&mut self) -> Result<JsonRpcRequest, TransportError> {
        let value = self.next_value().await?;
        serde_json::from_value(value).map_err(TransportError::Shape)
    }

    /// Read the next complete JSON value, pulling more input as needed
    pub async fn next_value(&mut self) -> Result<Value, TransportError> {
        let mut chunk = [0u8; READ_CHUNK];
        loop {
            if let Some(value) = self.take_buffered()? {
                return Ok(value);
            }

            let n = self.reader.read(&mut chunk).await?;
            if n == 0 {
                return Err(if self.buf.iter().all(u8::is_ascii_whitespace) {
                    TransportError::Closed
                } else {
                    TransportError::Truncated
                });
            }
            self.buf.extend_from_slice(&chunk[..n]);
        }
    }

    /// Decode one value from the buffer, if a complete one is there
    fn take_buffered(&mut self) -> Result<Option<Value>, TransportError> {
        let decoded = {
            let mut stream = Deserializer::from_slice(&self.buf).into_iter::<Value>();
            match stream.next() {
                Some(Ok(value)) => Some((value, stream.byte_offset())),
                Some(Err(e)) if e.is_eof() => None,
                Some(Err(e)) => return Err(TransportError::Malformed(e)),
                None => None,
            }
        };

        Ok(decoded.map(|(value, consumed)| {
            self.buf.drain(..consumed);
            value
        }))
    }
}

/// Write one message as a single line and flush it
///
/// Nothing is written when the message fails to encode.
pub async fn write_message<W, T>(writer: &mut W, message: &T) -> Result<(), ServerError>
where
    W: AsyncWrite + Unpin,
    T: Serialize,
{
    let mut line = serde_json::to_vec(message)?;
    line.push(b'\n');
    writer.write_all(&line).await?;
    writer.flush().await?;
    Ok(())
}
