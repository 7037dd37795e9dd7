use crate::config::BridgeConfig;
use crate::error::{BridgeError, Result};
use crate::logging::{LogLevel, SharedJournal};
use crate::translate::openai_types::{ChatCompletionRequest, ChatCompletionResponse};
use crate::translate::Translator;

use bytes::Bytes;
use futures::stream::Stream;
use futures::StreamExt;
use std::fmt::Display;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use uuid::Uuid;

/// Largest slice of backend bytes forwarded in one write.
pub const CHUNK_SIZE: usize = 1024;

const RELAY_CHANNEL_CAPACITY: usize = 16;

/// Body of a streaming reply, fed by the forwarding task.
pub type RelayStream = ReceiverStream<std::result::Result<Bytes, std::io::Error>>;

/// Forward a buffered request: read the whole backend body and wrap it in the
/// inbound response shape.
pub async fn relay_buffered(
    req: &ChatCompletionRequest,
    config: &BridgeConfig,
    client: &reqwest::Client,
    translator: &dyn Translator,
    journal: &SharedJournal,
    request_id: Uuid,
) -> Result<ChatCompletionResponse> {
    let response = dispatch(req, config, client, translator, journal, request_id).await?;

    let status = response.status();
    let body = response
        .bytes()
        .await
        .map_err(|e| BridgeError::upstream(format!("Failed to read response body: {}", e)))?;

    if !status.is_success() {
        journal.request(
            LogLevel::Warn,
            request_id,
            "relay",
            format!("Backend returned status {}, wrapping body anyway", status),
        );
    }

    journal.request_with_context(
        LogLevel::Info,
        request_id,
        "relay",
        "Buffered reply complete",
        serde_json::json!({ "status": status.as_u16(), "body_len": body.len() }),
    );

    Ok(translator.decode_response(&body))
}

/// Forward a streaming request. The backend body is relayed untranslated, in
/// order, in slices of at most [`CHUNK_SIZE`] bytes.
pub async fn relay_streaming(
    req: &ChatCompletionRequest,
    config: &BridgeConfig,
    client: &reqwest::Client,
    translator: &dyn Translator,
    journal: &SharedJournal,
    request_id: Uuid,
) -> Result<RelayStream> {
    let response = dispatch(req, config, client, translator, journal, request_id).await?;

    if !response.status().is_success() {
        journal.request(
            LogLevel::Warn,
            request_id,
            "relay",
            format!(
                "Backend returned status {}, relaying body anyway",
                response.status()
            ),
        );
    }

    Ok(spawn_forwarder(
        response.bytes_stream(),
        journal.clone(),
        request_id,
    ))
}

/// Encode the request and POST it to the backend.
async fn dispatch(
    req: &ChatCompletionRequest,
    config: &BridgeConfig,
    client: &reqwest::Client,
    translator: &dyn Translator,
    journal: &SharedJournal,
    request_id: Uuid,
) -> Result<reqwest::Response> {
    let body = translator.encode_request(req)?;

    tracing::debug!(
        %request_id,
        url = %config.chatbot_ui_url,
        translator = translator.name(),
        body_len = body.len(),
        "dispatching"
    );
    journal.request(
        LogLevel::Info,
        request_id,
        "relay",
        format!(
            "POST {} messages={} streaming={}",
            config.chatbot_ui_url,
            req.messages.len(),
            req.stream
        ),
    );

    client
        .post(&config.chatbot_ui_url)
        .header(reqwest::header::CONTENT_TYPE, translator.content_type())
        .header(reqwest::header::COOKIE, &config.cookie)
        .body(body)
        .send()
        .await
        .map_err(|e| BridgeError::upstream(format!("Request failed: {}", e)))
}

/// Split an upstream byte stream into slices of at most `chunk_size` bytes,
/// preserving order. Stops after the first upstream error.
pub fn rechunk<S, E>(
    upstream: S,
    chunk_size: usize,
) -> impl Stream<Item = std::result::Result<Bytes, E>> + Send + 'static
where
    S: Stream<Item = std::result::Result<Bytes, E>> + Send + 'static,
    E: Send + 'static,
{
    let chunk_size = chunk_size.max(1);
    async_stream::stream! {
        tokio::pin!(upstream);

        while let Some(next) = upstream.next().await {
            match next {
                Ok(mut bytes) => {
                    while !bytes.is_empty() {
                        let n = bytes.len().min(chunk_size);
                        yield Ok(bytes.split_to(n));
                    }
                }
                Err(e) => {
                    yield Err(e);
                    break;
                }
            }
        }
    }
}

/// Spawn the task copying backend bytes into the response body channel.
///
/// Each chunk is sent as its own body frame, so the HTTP layer writes it out
/// immediately. When the caller hangs up the next send fails and the task
/// drops the backend stream.
pub fn spawn_forwarder<S, E>(upstream: S, journal: SharedJournal, request_id: Uuid) -> RelayStream
where
    S: Stream<Item = std::result::Result<Bytes, E>> + Send + 'static,
    E: Display + Send + 'static,
{
    let (tx, rx) = mpsc::channel(RELAY_CHANNEL_CAPACITY);

    tokio::spawn(async move {
        let chunks = rechunk(upstream, CHUNK_SIZE);
        tokio::pin!(chunks);

        let mut chunk_count = 0usize;
        let mut byte_count = 0usize;

        while let Some(next) = chunks.next().await {
            match next {
                Ok(chunk) => {
                    let len = chunk.len();
                    if tx.send(Ok(chunk)).await.is_err() {
                        journal.request(
                            LogLevel::Warn,
                            request_id,
                            "stream",
                            format!("Client went away after {} bytes", byte_count),
                        );
                        return;
                    }
                    chunk_count += 1;
                    byte_count += len;
                }
                Err(e) => {
                    tracing::warn!(%request_id, error = %e, "backend stream failed");
                    journal.request(
                        LogLevel::Error,
                        request_id,
                        "stream",
                        format!("Byte stream error after {} bytes: {}", byte_count, e),
                    );
                    let _ = tx
                        .send(Err(std::io::Error::other(e.to_string())))
                        .await;
                    return;
                }
            }
        }

        journal.request_with_context(
            LogLevel::Info,
            request_id,
            "stream",
            "Stream completed",
            serde_json::json!({ "chunks": chunk_count, "bytes": byte_count }),
        );
    });

    ReceiverStream::new(rx)
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::stream;

    fn body_of(len: usize) -> Vec<u8> {
        (0..len).map(|i| (i % 251) as u8).collect()
    }

    async fn collect_chunks(
        pieces: Vec<Vec<u8>>,
    ) -> Vec<std::result::Result<Bytes, String>> {
        let upstream = stream::iter(
            pieces
                .into_iter()
                .map(|p| Ok::<_, String>(Bytes::from(p))),
        );
        rechunk(upstream, CHUNK_SIZE).collect().await
    }

    #[tokio::test]
    async fn test_rechunk_preserves_bytes_at_boundaries() {
        for len in [0usize, 1, 1024, 2049] {
            let body = body_of(len);
            let chunks = collect_chunks(vec![body.clone()]).await;

            let mut joined = Vec::new();
            for chunk in &chunks {
                let chunk = chunk.as_ref().unwrap();
                assert!(!chunk.is_empty());
                assert!(chunk.len() <= CHUNK_SIZE);
                joined.extend_from_slice(chunk);
            }
            assert_eq!(joined, body, "body of {} bytes", len);
        }
    }

    #[tokio::test]
    async fn test_rechunk_chunk_counts() {
        assert_eq!(collect_chunks(vec![body_of(0)]).await.len(), 0);
        assert_eq!(collect_chunks(vec![body_of(1)]).await.len(), 1);
        assert_eq!(collect_chunks(vec![body_of(1024)]).await.len(), 1);
        assert_eq!(collect_chunks(vec![body_of(2049)]).await.len(), 3);
    }

    #[tokio::test]
    async fn test_rechunk_keeps_small_arrivals_separate() {
        let chunks = collect_chunks(vec![b"ab".to_vec(), Vec::new(), b"c".to_vec()]).await;
        let chunks: Vec<Bytes> = chunks.into_iter().map(|c| c.unwrap()).collect();
        assert_eq!(chunks, vec![Bytes::from("ab"), Bytes::from("c")]);
    }

    #[tokio::test]
    async fn test_rechunk_stops_at_first_error() {
        let upstream = stream::iter(vec![
            Ok(Bytes::from("before")),
            Err("boom".to_string()),
            Ok(Bytes::from("after")),
        ]);
        let items: Vec<_> = rechunk(upstream, CHUNK_SIZE).collect().await;

        assert_eq!(items.len(), 2);
        assert_eq!(items[0].as_ref().unwrap(), &Bytes::from("before"));
        assert_eq!(items[1].as_ref().unwrap_err(), "boom");
    }

    #[tokio::test]
    async fn test_forwarder_relays_in_order() {
        let body = body_of(3000);
        let pieces: Vec<std::result::Result<Bytes, String>> = body
            .chunks(700)
            .map(|c| Ok(Bytes::copy_from_slice(c)))
            .collect();

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("journal.jsonl");
        let journal = SharedJournal::open(&path).unwrap();
        let id = Uuid::new_v4();
        let relayed: Vec<_> = spawn_forwarder(stream::iter(pieces), journal.clone(), id)
            .collect()
            .await;

        let mut joined = Vec::new();
        for chunk in relayed {
            joined.extend_from_slice(&chunk.unwrap());
        }
        assert_eq!(joined, body);

        // The completion entry is recorded before the sender is dropped.
        journal.flush().await;
        let written = std::fs::read_to_string(&path).unwrap();
        let last: crate::logging::JournalEntry =
            serde_json::from_str(written.lines().last().unwrap()).unwrap();
        assert_eq!(last.message, "Stream completed");
        assert_eq!(last.request_id, Some(id));
        assert_eq!(last.context.as_ref().unwrap()["bytes"], 3000);
    }

    #[tokio::test]
    async fn test_forwarder_surfaces_backend_error() {
        let upstream = stream::iter(vec![Ok(Bytes::from("partial")), Err("reset".to_string())]);
        let relayed: Vec<_> = spawn_forwarder(upstream, SharedJournal::disabled(), Uuid::new_v4())
            .collect()
            .await;

        assert_eq!(relayed.len(), 2);
        assert_eq!(relayed[0].as_ref().unwrap(), &Bytes::from("partial"));
        assert!(relayed[1].is_err());
    }
}
