/*!
 * Mock provider implementation for testing.
 *
 * `ScriptedProvider` replays a fixed queue of replies, one per request, and
 * records every request it receives:
 * - `ScriptedProvider::new(replies)` - replies in order
 * - `ScriptedProvider::reply(text)` / `stop(text)` - reply builders
 * - An exhausted script answers with a transient `RequestFailed` error
 */

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use super::{Generation, GenerationRequest, Provider, StopReason};
use crate::errors::ProviderError;

/// One scripted reply
pub type ScriptedReply = Result<Generation, ProviderError>;

/// Mock provider replaying scripted replies
#[derive(Debug, Clone)]
pub struct ScriptedProvider {
    /// Remaining replies
    replies: Arc<Mutex<VecDeque<ScriptedReply>>>,
    /// Requests received so far
    requests: Arc<Mutex<Vec<GenerationRequest>>>,
    /// Request counter
    request_count: Arc<AtomicUsize>,
}

impl ScriptedProvider {
    /// Create a provider that answers with `replies` in order
    pub fn new(replies: Vec<ScriptedReply>) -> Self {
        Self {
            replies: Arc::new(Mutex::new(replies.into())),
            requests: Arc::new(Mutex::new(Vec::new())),
            request_count: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// A reply that ran into the token ceiling
    pub fn reply(text: &str) -> ScriptedReply {
        Ok(Generation {
            content: text.to_string(),
            stop_reason: StopReason::MaxTokens,
            output_tokens: Self::token_estimate(text),
        })
    }

    /// A reply that ended on the stop marker
    pub fn stop(text: &str) -> ScriptedReply {
        Ok(Generation {
            content: text.to_string(),
            stop_reason: StopReason::StopMarker,
            output_tokens: Self::token_estimate(text),
        })
    }

    /// A reply that ended naturally
    pub fn finished(text: &str) -> ScriptedReply {
        Ok(Generation {
            content: text.to_string(),
            stop_reason: StopReason::Other,
            output_tokens: Self::token_estimate(text),
        })
    }

    /// A failing reply
    pub fn error(error: ProviderError) -> ScriptedReply {
        Err(error)
    }

    fn token_estimate(text: &str) -> u32 {
        (text.chars().count() / 4).max(1) as u32
    }

    /// Append more replies to the script
    pub fn push(&self, reply: ScriptedReply) {
        self.replies.lock().push_back(reply);
    }

    /// Number of requests received
    pub fn request_count(&self) -> usize {
        self.request_count.load(Ordering::SeqCst)
    }

    /// Copy of every request received
    pub fn requests(&self) -> Vec<GenerationRequest> {
        self.requests.lock().clone()
    }

    /// Replies not consumed yet
    pub fn remaining(&self) -> usize {
        self.replies.lock().len()
    }
}

#[async_trait]
impl Provider for ScriptedProvider {
    async fn complete(&self, request: GenerationRequest) -> Result<Generation, ProviderError> {
        self.request_count.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().push(request);
        self.replies
            .lock()
            .pop_front()
            .unwrap_or_else(|| Err(ProviderError::RequestFailed("script exhausted".to_string())))
    }

    async fn test_connection(&self) -> Result<(), ProviderError> {
        Ok(())
    }
}
