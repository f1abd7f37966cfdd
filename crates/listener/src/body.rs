use axum::body::Body;
use bytes::{Bytes, BytesMut};
use futures::StreamExt;
use thiserror::Error;

/// Failure to obtain a complete request body.
#[derive(Debug, Error)]
pub enum BodyError {
    /// The declared or streamed length exceeds the configured cap.
    #[error("request body exceeds the {limit} byte limit")]
    TooLarge {
        /// The cap that was exceeded.
        limit: usize,
    },

    /// The connection failed while the body was being read.
    #[error("failed to read request body: {0}")]
    Transport(String),
}

/// Reads a request body chunk by chunk.
///
/// With a declared length, frames are accumulated until that many bytes have
/// arrived or the stream ends; bytes past the declared length are discarded.
/// Without one, frames are accumulated until the stream ends. Either way at
/// most `limit` bytes are buffered.
pub async fn read_body(body: Body, declared: Option<u64>, limit: usize) -> Result<Bytes, BodyError> {
    let expected = match declared {
        Some(len) => {
            let len = usize::try_from(len).unwrap_or(usize::MAX);
            if len > limit {
                return Err(BodyError::TooLarge { limit });
            }
            Some(len)
        }
        None => None,
    };
    let ceiling = expected.unwrap_or(limit);

    let mut buf = BytesMut::with_capacity(expected.unwrap_or(0));
    let mut frames = body.into_data_stream();

    while expected.map_or(true, |len| buf.len() < len) {
        let chunk = match frames.next().await {
            Some(Ok(chunk)) => chunk,
            Some(Err(e)) => return Err(BodyError::Transport(e.to_string())),
            None => break,
        };

        let room = ceiling - buf.len();
        if chunk.len() > room {
            if expected.is_none() {
                return Err(BodyError::TooLarge { limit });
            }
            buf.extend_from_slice(&chunk[..room]);
            break;
        }
        buf.extend_from_slice(&chunk);
    }

    Ok(buf.freeze())
}

#[cfg(test)]
mod tests {
    use futures::stream;

    use super::*;

    fn chunked(parts: &[&'static str]) -> Body {
        let frames: Vec<Result<Bytes, std::io::Error>> = parts
            .iter()
            .map(|p| Ok(Bytes::from_static(p.as_bytes())))
            .collect();
        Body::from_stream(stream::iter(frames))
    }

    #[tokio::test]
    async fn test_accumulates_every_frame_up_to_declared_length() {
        let parts = [r#"{"eventType":"#, r#""status_update","#, r#""appId":"/web"}"#];
        let declared: usize = parts.iter().map(|p| p.len()).sum();

        let bytes = read_body(chunked(&parts), Some(declared as u64), 1024)
            .await
            .unwrap();

        assert_eq!(bytes.len(), declared);
        assert_eq!(&bytes[..], br#"{"eventType":"status_update","appId":"/web"}"#);
    }

    #[tokio::test]
    async fn test_stops_at_declared_length() {
        let bytes = read_body(chunked(&["{}", "trailing garbage"]), Some(2), 1024)
            .await
            .unwrap();
        assert_eq!(&bytes[..], b"{}");
    }

    #[tokio::test]
    async fn test_short_stream_returns_what_arrived() {
        let bytes = read_body(chunked(&["{\"a\":"]), Some(64), 1024)
            .await
            .unwrap();
        assert_eq!(&bytes[..], b"{\"a\":");
    }

    #[tokio::test]
    async fn test_undeclared_length_reads_to_end() {
        let bytes = read_body(chunked(&["{\"a\"", ":1", "}"]), None, 1024)
            .await
            .unwrap();
        assert_eq!(&bytes[..], b"{\"a\":1}");
    }

    #[tokio::test]
    async fn test_declared_length_over_limit_is_rejected_before_reading() {
        let err = read_body(chunked(&["{}"]), Some(10_000), 16).await.unwrap_err();
        assert!(matches!(err, BodyError::TooLarge { limit: 16 }));
    }

    #[tokio::test]
    async fn test_undeclared_stream_over_limit_is_rejected() {
        let err = read_body(chunked(&["0123456789", "0123456789"]), None, 16)
            .await
            .unwrap_err();
        assert!(matches!(err, BodyError::TooLarge { limit: 16 }));
    }
}
