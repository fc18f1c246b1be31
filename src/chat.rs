//! Streaming chat over the `/v1/chat/completions` SSE endpoint.
//!
//! The endpoint replies with server-sent events, each `data:` payload
//! carrying one chat-completion chunk. [`ApiClient::stream_chat`] turns that
//! into a lazy, forward-only stream of text fragments.

use futures::stream::BoxStream;
use futures::{Stream, StreamExt};
use serde::{Deserialize, Serialize};

use crate::client::ApiClient;
use crate::error::ApiError;

/// SSE terminator payload sent after the last chunk.
const DONE_MARKER: &str = "[DONE]";

/// Stream of incremental chat output. Finite and not restartable; a
/// transport or decode failure surfaces as one terminal `Err` item.
pub type ChatStream = BoxStream<'static, Result<String, ApiError>>;

/// Chat participant role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// One message in a chat conversation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    stream: bool,
}

/// One completion chunk, only the fields we consume.
#[derive(Debug, Deserialize)]
struct ChatChunk {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    #[serde(default)]
    delta: Delta,
}

#[derive(Debug, Default, Deserialize)]
struct Delta {
    content: Option<String>,
}

impl ChatChunk {
    fn content(self) -> Option<String> {
        self.choices
            .into_iter()
            .next()
            .and_then(|c| c.delta.content)
            .filter(|c| !c.is_empty())
    }
}

impl ApiClient {
    /// Stream a chat completion as incremental text fragments.
    ///
    /// A failed response to the initial POST goes through the failure
    /// classifier like any other request. Failures after the stream has
    /// started yield one terminal `Err`; they are not toasted.
    pub async fn stream_chat(&self, messages: &[ChatMessage]) -> Result<ChatStream, ApiError> {
        let request = ChatRequest {
            model: &self.config().chat_model,
            messages,
            stream: true,
        };
        let resp = self.post_raw("/v1/chat/completions", &request).await?;
        Ok(sse_fragments(resp.bytes_stream().boxed()).boxed())
    }
}

/// Decode an SSE byte stream into text fragments.
fn sse_fragments<S, B, E>(body: S) -> impl Stream<Item = Result<String, ApiError>>
where
    S: Stream<Item = Result<B, E>> + Send + Unpin + 'static,
    B: AsRef<[u8]> + Send + 'static,
    E: std::fmt::Display + Send + 'static,
{
    let state = (body, SseDecoder::default(), false);
    futures::stream::unfold(state, |(mut body, mut decoder, done)| async move {
        if done {
            return None;
        }
        loop {
            while let Some(data) = decoder.next_event() {
                if data == DONE_MARKER {
                    return None;
                }
                match serde_json::from_str::<ChatChunk>(&data) {
                    Ok(chunk) => {
                        if let Some(content) = chunk.content() {
                            return Some((Ok(content), (body, decoder, false)));
                        }
                        // Chunk without delta content (e.g. finish_reason
                        // only) — keep reading.
                    }
                    Err(e) => {
                        let err = ApiError::Stream(format!("bad chunk: {e}"));
                        return Some((Err(err), (body, decoder, true)));
                    }
                }
            }

            match body.next().await {
                Some(Ok(bytes)) => decoder.push(bytes.as_ref()),
                Some(Err(e)) => {
                    let err = ApiError::Stream(e.to_string());
                    return Some((Err(err), (body, decoder, true)));
                }
                None => return None,
            }
        }
    })
}

/// Incremental SSE frame decoder.
///
/// Feed raw bytes in with [`push`](Self::push), drain complete `data:`
/// payloads with [`next_event`](Self::next_event). Events are delimited by a
/// blank line; multi-line data fields are joined with `\n`.
#[derive(Debug, Default)]
struct SseDecoder {
    buffer: String,
}

impl SseDecoder {
    fn push(&mut self, bytes: &[u8]) {
        self.buffer.push_str(&String::from_utf8_lossy(bytes));
    }

    fn next_event(&mut self) -> Option<String> {
        loop {
            let lf = self.buffer.find("\n\n").map(|i| (i, 2));
            let crlf = self.buffer.find("\r\n\r\n").map(|i| (i, 4));
            let (end, sep_len) = match (lf, crlf) {
                (Some(a), Some(b)) => std::cmp::min(a, b),
                (Some(a), None) => a,
                (None, Some(b)) => b,
                (None, None) => return None,
            };

            let raw = self.buffer[..end].to_string();
            self.buffer.drain(..end + sep_len);

            let data_lines: Vec<&str> = raw
                .lines()
                .filter_map(|line| line.strip_prefix("data:"))
                .map(|rest| rest.strip_prefix(' ').unwrap_or(rest))
                .collect();

            if !data_lines.is_empty() {
                return Some(data_lines.join("\n"));
            }
            // Comment or keep-alive event, keep scanning.
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chunk_json(content: &str) -> String {
        format!(r#"{{"choices":[{{"delta":{{"content":"{content}"}}}}]}}"#)
    }

    #[test]
    fn decoder_extracts_single_event() {
        let mut decoder = SseDecoder::default();
        decoder.push(b"data: hello\n\n");
        assert_eq!(decoder.next_event().as_deref(), Some("hello"));
        assert_eq!(decoder.next_event(), None);
    }

    #[test]
    fn decoder_handles_split_events() {
        let mut decoder = SseDecoder::default();
        decoder.push(b"data: par");
        assert_eq!(decoder.next_event(), None);
        decoder.push(b"tial\n\ndata: next\n\n");
        assert_eq!(decoder.next_event().as_deref(), Some("partial"));
        assert_eq!(decoder.next_event().as_deref(), Some("next"));
    }

    #[test]
    fn decoder_handles_crlf_delimiters() {
        let mut decoder = SseDecoder::default();
        decoder.push(b"data: one\r\n\r\ndata: two\r\n\r\n");
        assert_eq!(decoder.next_event().as_deref(), Some("one"));
        assert_eq!(decoder.next_event().as_deref(), Some("two"));
    }

    #[test]
    fn decoder_joins_multiline_data() {
        let mut decoder = SseDecoder::default();
        decoder.push(b"data: line1\ndata: line2\n\n");
        assert_eq!(decoder.next_event().as_deref(), Some("line1\nline2"));
    }

    #[test]
    fn decoder_skips_comments_and_keepalives() {
        let mut decoder = SseDecoder::default();
        decoder.push(b": keep-alive\n\ndata: real\n\n");
        assert_eq!(decoder.next_event().as_deref(), Some("real"));
    }

    #[test]
    fn chunk_extracts_delta_content() {
        let chunk: ChatChunk = serde_json::from_str(&chunk_json("Hi")).unwrap();
        assert_eq!(chunk.content().as_deref(), Some("Hi"));
    }

    #[test]
    fn chunk_without_content_yields_none() {
        let chunk: ChatChunk =
            serde_json::from_str(r#"{"choices":[{"delta":{},"finish_reason":"stop"}]}"#).unwrap();
        assert_eq!(chunk.content(), None);

        let chunk: ChatChunk = serde_json::from_str(r#"{"choices":[]}"#).unwrap();
        assert_eq!(chunk.content(), None);
    }

    #[tokio::test]
    async fn fragments_stream_until_done_marker() {
        let frames = vec![
            format!("data: {}\n\n", chunk_json("Hello")),
            format!("data: {}\n\n", chunk_json(" world")),
            format!("data: {DONE_MARKER}\n\n"),
        ];
        let body = futures::stream::iter(
            frames
                .into_iter()
                .map(|f| Ok::<_, std::convert::Infallible>(f.into_bytes())),
        )
        .boxed();

        let fragments: Vec<_> = sse_fragments(body)
            .map(|r| r.unwrap())
            .collect::<Vec<_>>()
            .await;
        assert_eq!(fragments, ["Hello", " world"]);
    }

    #[tokio::test]
    async fn malformed_chunk_is_terminal_error() {
        let frames = vec![
            format!("data: {}\n\n", chunk_json("ok")),
            "data: not json\n\n".to_string(),
            format!("data: {}\n\n", chunk_json("never seen")),
        ];
        let body = futures::stream::iter(
            frames
                .into_iter()
                .map(|f| Ok::<_, std::convert::Infallible>(f.into_bytes())),
        )
        .boxed();

        let items: Vec<_> = sse_fragments(body).collect::<Vec<_>>().await;
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].as_deref().unwrap(), "ok");
        assert!(matches!(items[1], Err(ApiError::Stream(_))));
    }
}
