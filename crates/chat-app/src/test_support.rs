use std::collections::VecDeque;
use std::sync::Mutex;

use futures::future::BoxFuture;
use paperwhisperer_llm::{
    CompletionRequest, DEFAULT_OPENAI_MODEL, LlmProvider, Model, ProviderError, ProviderMessage,
    ProviderResult,
};

/// Completion service double that replays queued replies and records every
/// request it receives.
pub struct ScriptedProvider {
    replies: Mutex<VecDeque<ProviderResult<String>>>,
    requests: Mutex<Vec<CompletionRequest>>,
}

impl ScriptedProvider {
    pub fn new(replies: Vec<ProviderResult<String>>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn replying<I, S>(replies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(replies.into_iter().map(|reply| Ok(reply.into())).collect())
    }

    pub fn failing() -> Self {
        Self::new(vec![Err(Self::empty_completion())])
    }

    pub fn empty_completion() -> ProviderError {
        ProviderError::EmptyCompletion {
            stage: "scripted",
            model_id: DEFAULT_OPENAI_MODEL.to_string(),
        }
    }

    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.requests.lock().expect("requests lock").clone()
    }
}

impl LlmProvider for ScriptedProvider {
    fn id(&self) -> &str {
        "scripted"
    }

    fn name(&self) -> &str {
        "Scripted"
    }

    fn default_model(&self) -> &str {
        DEFAULT_OPENAI_MODEL
    }

    fn known_models(&self) -> &[Model] {
        &[]
    }

    fn complete<'a>(
        &'a self,
        request: CompletionRequest,
    ) -> BoxFuture<'a, ProviderResult<ProviderMessage>> {
        self.requests.lock().expect("requests lock").push(request);
        let next = self
            .replies
            .lock()
            .expect("replies lock")
            .pop_front()
            .unwrap_or_else(|| Err(Self::empty_completion()));
        Box::pin(async move { next.map(ProviderMessage::assistant) })
    }
}
