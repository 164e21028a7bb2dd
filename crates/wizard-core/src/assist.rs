//! Streaming text-suggestion collaborator for the free-text step.
//!
//! Only the final accepted text ever reaches the wizard store; partial
//! output lives and dies with the [`AssistStream`].

use futures::Stream;
use serde::{Deserialize, Serialize};
use std::pin::Pin;
use std::task::{Context, Poll};
use std::time::Duration;
use thiserror::Error;
use tokio::sync::mpsc;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssistRequest {
    pub prompt: String,
    #[serde(default)]
    pub context: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AssistEvent {
    /// Incremental text. The final chunk has `is_complete` set.
    Chunk {
        content: String,
        #[serde(rename = "isComplete")]
        is_complete: bool,
    },
    Error { message: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AssistError {
    #[error("assistant failed: {0}")]
    Failed(String),
    #[error("assistant stream ended before completing")]
    Incomplete,
}

// ---------------------------------------------------------------------------
// AssistStream
// ---------------------------------------------------------------------------

/// Receiving end of one generation. Dropping or cancelling it stops the
/// producer on its next send.
pub struct AssistStream {
    rx: mpsc::Receiver<AssistEvent>,
}

impl AssistStream {
    pub fn channel(buffer: usize) -> (mpsc::Sender<AssistEvent>, Self) {
        let (tx, rx) = mpsc::channel(buffer);
        (tx, Self { rx })
    }

    /// Stop accepting output. Already-buffered events are discarded.
    pub fn cancel(&mut self) {
        self.rx.close();
        while self.rx.try_recv().is_ok() {}
    }

    /// Wait for the whole suggestion.
    pub async fn collect_text(mut self) -> Result<String, AssistError> {
        let mut text = String::new();
        while let Some(event) = self.rx.recv().await {
            match event {
                AssistEvent::Chunk {
                    content,
                    is_complete,
                } => {
                    text.push_str(&content);
                    if is_complete {
                        return Ok(text.trim_end().to_string());
                    }
                }
                AssistEvent::Error { message } => return Err(AssistError::Failed(message)),
            }
        }
        Err(AssistError::Incomplete)
    }
}

impl Stream for AssistStream {
    type Item = AssistEvent;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.rx.poll_recv(cx)
    }
}

pub trait TextAssistant: Send + Sync {
    /// Start a generation. Must be called from within a tokio runtime.
    fn generate(&self, request: AssistRequest) -> AssistStream;
}

// ---------------------------------------------------------------------------
// CannedAssistant
// ---------------------------------------------------------------------------

/// Offline assistant that streams a templated suggestion word by word.
#[derive(Debug, Clone, Default)]
pub struct CannedAssistant {
    delay: Duration,
}

impl CannedAssistant {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }

    fn compose(request: &AssistRequest) -> String {
        let topic = request.prompt.trim().trim_end_matches('.');
        let context = request.context.trim();
        if context.is_empty() {
            format!(
                "Regarding {topic}: my circumstances have changed recently and I am \
                 requesting support while I work to regain stability."
            )
        } else {
            format!(
                "Regarding {topic}: {context} These circumstances have made it \
                 difficult to cover essential expenses, and I am requesting support \
                 while I work to regain stability."
            )
        }
    }
}

impl TextAssistant for CannedAssistant {
    fn generate(&self, request: AssistRequest) -> AssistStream {
        let (tx, stream) = AssistStream::channel(16);
        let delay = self.delay;

        tokio::spawn(async move {
            if request.prompt.trim().is_empty() {
                let _ = tx
                    .send(AssistEvent::Error {
                        message: "prompt must not be empty".to_string(),
                    })
                    .await;
                return;
            }

            let text = Self::compose(&request);
            for word in text.split_whitespace() {
                if !delay.is_zero() {
                    tokio::time::sleep(delay).await;
                }
                let chunk = AssistEvent::Chunk {
                    content: format!("{word} "),
                    is_complete: false,
                };
                if tx.send(chunk).await.is_err() {
                    tracing::debug!("assist stream cancelled");
                    return;
                }
            }
            let _ = tx
                .send(AssistEvent::Chunk {
                    content: String::new(),
                    is_complete: true,
                })
                .await;
        });

        stream
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;

    fn request(prompt: &str, context: &str) -> AssistRequest {
        AssistRequest {
            prompt: prompt.to_string(),
            context: context.to_string(),
        }
    }

    #[tokio::test]
    async fn canned_assistant_streams_complete_text() {
        let text = CannedAssistant::default()
            .generate(request("my employment situation", "I was laid off in May."))
            .collect_text()
            .await
            .unwrap();
        assert!(text.starts_with("Regarding my employment situation:"));
        assert!(text.contains("I was laid off in May."));
        assert!(!text.ends_with(' '));
    }

    #[tokio::test]
    async fn chunks_arrive_incrementally_and_end_with_completion() {
        let events: Vec<AssistEvent> = CannedAssistant::default()
            .generate(request("housing", ""))
            .collect()
            .await;
        assert!(events.len() > 2);
        assert_eq!(
            events.last(),
            Some(&AssistEvent::Chunk {
                content: String::new(),
                is_complete: true
            })
        );
    }

    #[tokio::test]
    async fn empty_prompt_is_an_error() {
        let err = CannedAssistant::default()
            .generate(request("  ", "context"))
            .collect_text()
            .await
            .unwrap_err();
        assert_eq!(err, AssistError::Failed("prompt must not be empty".into()));
    }

    #[tokio::test]
    async fn cancelled_stream_yields_nothing_more() {
        let mut stream = CannedAssistant::new(Duration::from_millis(5))
            .generate(request("housing", ""));
        stream.cancel();
        assert!(stream.next().await.is_none());
    }

    #[tokio::test]
    async fn producer_dropping_early_is_incomplete() {
        let (tx, stream) = AssistStream::channel(4);
        tx.send(AssistEvent::Chunk {
            content: "partial ".into(),
            is_complete: false,
        })
        .await
        .unwrap();
        drop(tx);
        assert_eq!(stream.collect_text().await, Err(AssistError::Incomplete));
    }
}
