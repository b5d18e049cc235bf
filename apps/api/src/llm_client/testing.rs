//! In-process provider that replays a fixed script of replies.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use super::{ChatProvider, ChatRequest, LlmClient, LlmError, ProviderKind, RetryPolicy};

pub(crate) struct ScriptedProvider {
    kind: ProviderKind,
    replies: Mutex<VecDeque<Result<String, LlmError>>>,
    requests: Mutex<Vec<ChatRequest>>,
}

impl ScriptedProvider {
    pub(crate) fn new(kind: ProviderKind, replies: Vec<Result<String, LlmError>>) -> Arc<Self> {
        Arc::new(Self {
            kind,
            replies: Mutex::new(replies.into()),
            requests: Mutex::new(Vec::new()),
        })
    }

    pub(crate) fn replying(kind: ProviderKind, replies: &[&str]) -> Arc<Self> {
        Self::new(kind, replies.iter().map(|r| Ok(r.to_string())).collect())
    }

    pub(crate) fn calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub(crate) fn requests(&self) -> Vec<ChatRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChatProvider for ScriptedProvider {
    fn kind(&self) -> ProviderKind {
        self.kind
    }

    fn model(&self) -> &str {
        "scripted"
    }

    async fn send(&self, request: &ChatRequest) -> Result<String, LlmError> {
        self.requests.lock().unwrap().push(request.clone());
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(server_error()))
    }
}

/// Client with no backoff so retry paths run instantly.
pub(crate) fn client_with(provider: Arc<ScriptedProvider>) -> LlmClient {
    let provider: Arc<dyn ChatProvider> = provider;
    LlmClient::new(vec![provider], RetryPolicy::new(Duration::ZERO))
}

pub(crate) fn server_error() -> LlmError {
    LlmError::Api {
        status: 500,
        message: "scripted failure".to_string(),
    }
}
