// Chunked JSON streaming utilities
//
// Each chunk is a 4-byte big-endian length followed by one JSON message,
// Brotli-compressed per chunk when requested.
use crate::infrastructure::http_response::brotli_compress;
use axum::body::Body;
use axum::http::{Response, StatusCode, header};
use axum::response::IntoResponse;
use bytes::{BufMut, Bytes, BytesMut};
use futures::StreamExt;
use futures::stream::Stream;
use serde::Serialize;

/// Create a chunked JSON streaming response
pub async fn chunked_json_stream<S, T>(stream: S, compress: bool) -> Result<Response<Body>, StatusCode>
where
    S: Stream<Item = T> + Send + 'static,
    T: Serialize + Send + Sync + 'static,
{
    let byte_stream = stream.then(move |msg| async move { serialize_chunk(&msg, compress).await });

    let body = Body::from_stream(byte_stream);

    // Chunks are compressed individually, so no Content-Encoding header
    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "application/x-ndjson-framed")
        .header(header::TRANSFER_ENCODING, "chunked")
        .body(body)
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)
}

/// Serialize a single message to a length-prefixed chunk
pub async fn serialize_chunk<T: Serialize>(msg: &T, compress: bool) -> Result<Bytes, std::io::Error> {
    let buffer = serde_json::to_vec(msg).map_err(std::io::Error::other)?;

    let payload = if compress {
        brotli_compress(buffer).await?
    } else {
        buffer
    };

    let length = payload.len() as u32;
    let mut chunk = BytesMut::with_capacity(4 + payload.len());
    chunk.put_u32(length);
    chunk.put_slice(&payload);

    Ok(chunk.freeze())
}

/// Helper to create a streaming response from a receiver
pub async fn stream_from_receiver<T>(mut rx: tokio::sync::mpsc::Receiver<T>, compress: bool) -> impl IntoResponse
where
    T: Serialize + Send + Sync + 'static,
{
    let stream = async_stream::stream! {
        while let Some(msg) = rx.recv().await {
            yield msg;
        }
    };

    match chunked_json_stream(stream, compress).await {
        Ok(response) => response,
        Err(status) => status.into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_chunk_framing() {
        let msg = json!({ "type": "snapshot" });
        let chunk = serialize_chunk(&msg, false).await.unwrap();

        let expected = serde_json::to_vec(&msg).unwrap();
        assert_eq!(&chunk[..4], &(expected.len() as u32).to_be_bytes());
        assert_eq!(&chunk[4..], expected.as_slice());
    }

    #[tokio::test]
    async fn test_stream_body_concatenates_chunks() {
        let (tx, rx) = tokio::sync::mpsc::channel(4);
        tx.send(json!({ "n": 1 })).await.unwrap();
        tx.send(json!({ "n": 2 })).await.unwrap();
        drop(tx);

        let response = stream_from_receiver(rx, false).await.into_response();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();

        let first_len = u32::from_be_bytes(body[..4].try_into().unwrap()) as usize;
        let first: serde_json::Value = serde_json::from_slice(&body[4..4 + first_len]).unwrap();
        assert_eq!(first["n"], 1);
        assert_eq!(body.len(), 2 * (4 + first_len));
    }
}
