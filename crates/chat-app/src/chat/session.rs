use paperwhisperer_llm::{CompletionRequest, DEFAULT_OPENAI_MODEL, LlmProvider, ProviderError};
use snafu::{ResultExt, Snafu};

use super::context::{ContextBuilder, ContextError};
use super::history::{ConversationHistory, assistant_display, user_display};
use super::render::{Bubble, render_transcript};

/// Fixed request parameters applied to every submission of a session.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionProfile {
    pub model_id: String,
    pub temperature: Option<f64>,
    pub max_tokens: Option<u64>,
}

impl Default for CompletionProfile {
    fn default() -> Self {
        Self::new(DEFAULT_OPENAI_MODEL)
    }
}

impl CompletionProfile {
    pub fn new(model_id: impl Into<String>) -> Self {
        Self {
            model_id: model_id.into(),
            temperature: None,
            max_tokens: None,
        }
    }

    pub fn with_temperature(mut self, temperature: Option<f64>) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: Option<u64>) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    fn request(&self, history: &ConversationHistory) -> CompletionRequest {
        let mut request =
            CompletionRequest::new(self.model_id.clone(), history.to_provider_messages());
        if let Some(temperature) = self.temperature {
            request = request.with_temperature(temperature);
        }
        if let Some(max_tokens) = self.max_tokens {
            request = request.with_max_tokens(max_tokens);
        }
        request
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Blank input; nothing changed and no request was sent.
    Idle,
    /// One user message and one assistant reply were appended.
    Replied,
}

/// Session state for one active conversation.
///
/// Holds the history plus the two display sequences derived from it. A
/// session only exists once its context has been built, so there is no
/// uninitialized variant to guard against.
#[derive(Debug, Clone)]
pub struct ChatSession {
    history: ConversationHistory,
    user_display: Vec<String>,
    assistant_display: Vec<String>,
    profile: CompletionProfile,
}

impl ChatSession {
    /// Builds the context from the reading guide and seeds a new session.
    pub fn start(builder: &ContextBuilder, profile: CompletionProfile) -> SessionResult<Self> {
        let context = builder.build_context().context(BuildContextSnafu {
            stage: "start-session",
        })?;

        tracing::info!(
            guide_path = ?builder.guide_path(),
            model_id = %profile.model_id,
            context_bytes = context.len(),
            "session started"
        );

        Ok(Self::from_context(context, profile))
    }

    pub fn from_context(context: impl Into<String>, profile: CompletionProfile) -> Self {
        Self {
            history: ConversationHistory::seeded(context),
            user_display: Vec::new(),
            assistant_display: Vec::new(),
            profile,
        }
    }

    pub fn history(&self) -> &ConversationHistory {
        &self.history
    }

    pub fn user_display(&self) -> &[String] {
        &self.user_display
    }

    pub fn assistant_display(&self) -> &[String] {
        &self.assistant_display
    }

    pub fn profile(&self) -> &CompletionProfile {
        &self.profile
    }

    pub fn transcript(&self) -> Vec<Bubble<'_>> {
        render_transcript(&self.user_display, &self.assistant_display)
    }

    /// Runs one exchange with the completion service.
    ///
    /// The user message is appended before the request is sent and stays in
    /// the history when the request fails; the display sequences are only
    /// refreshed after a reply arrives.
    pub async fn submit(
        &mut self,
        provider: &dyn LlmProvider,
        input: &str,
    ) -> SessionResult<SubmitOutcome> {
        if input.trim().is_empty() {
            tracing::trace!("ignoring blank submission");
            return Ok(SubmitOutcome::Idle);
        }

        self.history.append_user(input);
        let request = self.profile.request(&self.history);

        tracing::debug!(
            provider_id = %provider.id(),
            model_id = %request.model_id,
            history_len = self.history.len(),
            "requesting completion"
        );

        let reply = provider
            .complete(request)
            .await
            .context(RemoteCallSnafu {
                stage: "submit-complete",
            })?;

        self.history.append_assistant(reply.content);
        self.refresh_display();

        tracing::debug!(
            history_len = self.history.len(),
            exchanges = self.assistant_display.len(),
            "completion appended"
        );

        Ok(SubmitOutcome::Replied)
    }

    fn refresh_display(&mut self) {
        self.user_display = user_display(self.history.messages());
        self.assistant_display = assistant_display(self.history.messages());
    }
}

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum SessionError {
    #[snafu(display("failed to build session context on `{stage}`: {source}"))]
    BuildContext {
        stage: &'static str,
        source: ContextError,
    },
    #[snafu(display("completion service call failed on `{stage}`: {source}"))]
    RemoteCall {
        stage: &'static str,
        source: ProviderError,
    },
}

pub type SessionResult<T> = Result<T, SessionError>;
