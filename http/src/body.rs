use std::pin::Pin;

use tokio::io::{AsyncRead, AsyncReadExt};

#[derive(Default)]
pub enum HttpBody {
    /// complete data in memory
    InMemory { data: Vec<u8> },
    /// streaming data of a known length, such as a file on disk
    Streaming {
        reader: Pin<Box<dyn AsyncRead + Send + Sync + 'static>>,
        read_buf: Vec<u8>,
        buffer_size: usize,
        remaining: u64,
    },
    /// empty body
    #[default]
    Empty,
}

impl HttpBody {
    pub fn new() -> Self {
        HttpBody::Empty
    }

    pub fn from_data(data: Vec<u8>) -> Self {
        match data.is_empty() {
            true => HttpBody::Empty,
            false => HttpBody::InMemory { data },
        }
    }

    /// Stream exactly `length` bytes out of `reader`
    pub fn from_reader<R>(reader: R, length: u64, buffer_size: usize) -> Self
    where
        R: AsyncRead + Send + Sync + 'static,
    {
        HttpBody::Streaming {
            reader: Box::pin(reader),
            read_buf: Vec::with_capacity(buffer_size),
            buffer_size,
            remaining: length,
        }
    }

    pub async fn read_next(&mut self) -> tokio::io::Result<Option<Vec<u8>>> {
        match self {
            HttpBody::InMemory { data } => {
                if data.is_empty() {
                    Ok(None)
                } else {
                    Ok(Some(std::mem::take(data)))
                }
            }
            HttpBody::Streaming {
                reader,
                read_buf,
                buffer_size,
                remaining,
            } => {
                if *remaining == 0 {
                    return Ok(None);
                }

                let want = (*buffer_size as u64).min(*remaining) as usize;
                read_buf.clear();
                read_buf.resize(want, 0);
                match AsyncReadExt::read(reader, read_buf).await? {
                    // the source shrank under us; the announced length can no longer be met
                    0 => Err(tokio::io::Error::new(
                        tokio::io::ErrorKind::UnexpectedEof,
                        format!("body ended with {remaining} bytes missing"),
                    )),
                    n => {
                        read_buf.truncate(n);
                        *remaining -= n as u64;
                        Ok(Some(read_buf.clone()))
                    }
                }
            }
            HttpBody::Empty => Ok(None),
        }
    }

    pub fn is_streaming(&self) -> bool {
        matches!(self, HttpBody::Streaming { .. })
    }

    /// Number of bytes the body will produce
    pub fn content_length(&self) -> u64 {
        match self {
            HttpBody::InMemory { data } => data.len() as u64,
            HttpBody::Streaming { remaining, .. } => *remaining,
            HttpBody::Empty => 0,
        }
    }
}

impl std::fmt::Debug for HttpBody {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HttpBody::InMemory { data } => f.debug_struct("InMemory").field("data", data).finish(),
            HttpBody::Streaming {
                read_buf,
                buffer_size,
                remaining,
                ..
            } => f
                .debug_struct("Streaming")
                .field("read_buf", read_buf)
                .field("buffer_size", buffer_size)
                .field("remaining", remaining)
                .field("reader", &"<dyn AsyncRead>")
                .finish(),
            HttpBody::Empty => write!(f, "Empty"),
        }
    }
}

impl From<&str> for HttpBody {
    fn from(value: &str) -> Self {
        HttpBody::from_data(value.as_bytes().to_vec())
    }
}

impl From<String> for HttpBody {
    fn from(value: String) -> Self {
        HttpBody::from_data(value.into_bytes())
    }
}

impl From<Vec<u8>> for HttpBody {
    fn from(value: Vec<u8>) -> Self {
        HttpBody::from_data(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::test;

    #[test]
    async fn test_empty_body() {
        let mut body = HttpBody::new();

        assert_eq!(body.read_next().await.unwrap(), None);
        assert_eq!(body.content_length(), 0);
        assert!(!body.is_streaming());
    }

    #[test]
    async fn test_in_memory_body() {
        let data = "Hello world!".as_bytes().to_vec();
        let expected_len = data.len() as u64;
        let mut body = HttpBody::from_data(data);

        // length
        assert_eq!(body.content_length(), expected_len);

        // read content
        let content = body.read_next().await.unwrap().unwrap();
        assert_eq!(String::from_utf8_lossy(&content), "Hello world!");

        // have read all data
        assert_eq!(body.read_next().await.unwrap(), None);

        // not streaming
        assert!(!body.is_streaming());
    }

    #[test]
    async fn test_streaming_body() {
        use std::io::Cursor;

        let data = "First chunk\nSecond chunk\nOther chunk".as_bytes().to_vec();
        let cursor = Cursor::new(data.clone());

        // some buffer size to ensure read few times
        let mut body = HttpBody::from_reader(cursor, data.len() as u64, 8);

        assert!(body.is_streaming());
        assert_eq!(body.content_length(), data.len() as u64);

        let mut all_chunks = Vec::new();
        while let Some(chunk) = body.read_next().await.unwrap() {
            assert!(chunk.len() <= 8);
            all_chunks.extend_from_slice(&chunk);
        }

        assert_eq!(all_chunks, data);
    }

    #[test]
    async fn test_streaming_body_stops_at_length() {
        use std::io::Cursor;

        let cursor = Cursor::new(b"0123456789".to_vec());
        let mut body = HttpBody::from_reader(cursor, 4, 1024);

        assert_eq!(body.read_next().await.unwrap().unwrap(), b"0123".to_vec());
        assert_eq!(body.read_next().await.unwrap(), None);
    }

    #[test]
    async fn test_streaming_body_short_source() {
        use std::io::Cursor;

        let cursor = Cursor::new(b"abc".to_vec());
        let mut body = HttpBody::from_reader(cursor, 10, 1024);

        assert_eq!(body.read_next().await.unwrap().unwrap(), b"abc".to_vec());
        assert!(body.read_next().await.is_err());
    }
}
