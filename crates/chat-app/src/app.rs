use std::borrow::Cow;
use std::io::{self, Write};
use std::sync::Arc;

use paperwhisperer_llm::{LlmProvider, ProviderError, create_provider};
use snafu::{ResultExt, Snafu};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

use crate::chat::{ChatSession, SessionError, SubmitOutcome};
use crate::settings::{AppSettings, SettingsError, SettingsLoader};
use crate::terminal::TranscriptView;

const DEFAULT_LOG_FILTER: &str = "warn";

/// Logs go to stderr so they never interleave with the transcript on stdout.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

/// One interactive session wired to a completion provider and a view.
pub struct ChatApp<W: Write> {
    session: ChatSession,
    provider: Arc<dyn LlmProvider>,
    view: TranscriptView<W>,
}

impl<W: Write> ChatApp<W> {
    pub fn new(
        session: ChatSession,
        provider: Arc<dyn LlmProvider>,
        view: TranscriptView<W>,
    ) -> Self {
        Self {
            session,
            provider,
            view,
        }
    }

    /// Creates the provider and starts the session. Both a missing API key
    /// and an unreadable reading guide stop startup here.
    pub fn bootstrap(settings: &AppSettings, view: TranscriptView<W>) -> AppResult<Self> {
        let provider = create_provider(settings.to_provider_config()).context(ProviderSnafu {
            stage: "bootstrap-provider",
        })?;

        let session = ChatSession::start(
            &settings.context_builder(),
            settings.completion_profile(),
        )
        .context(SessionSnafu {
            stage: "bootstrap-session",
        })?;

        let model_id = &session.profile().model_id;
        if !provider
            .known_models()
            .iter()
            .any(|model| &model.id == model_id)
        {
            tracing::warn!(
                provider_id = %provider.id(),
                model_id = %model_id,
                "configured model is not in the provider's known model list"
            );
        }

        tracing::info!(
            provider_id = %provider.id(),
            provider_name = %provider.name(),
            model_id = %session.profile().model_id,
            "chat app ready"
        );

        Ok(Self::new(session, provider, view))
    }

    pub fn session(&self) -> &ChatSession {
        &self.session
    }

    pub fn into_view(self) -> TranscriptView<W> {
        self.view
    }

    /// Reads one submission per line until the input closes.
    pub async fn run<R>(&mut self, title: &str, mut input: R) -> AppResult<()>
    where
        R: AsyncBufRead + Unpin,
    {
        self.view.header(title).context(WriteOutputSnafu {
            stage: "write-header",
        })?;

        let mut buffer = Vec::new();
        loop {
            self.view.prompt().context(WriteOutputSnafu {
                stage: "write-prompt",
            })?;

            buffer.clear();
            let read = input
                .read_until(b'\n', &mut buffer)
                .await
                .context(ReadInputSnafu {
                    stage: "read-submission",
                })?;
            if read == 0 {
                tracing::debug!(
                    history_len = self.session.history().len(),
                    "input closed, ending session"
                );
                break;
            }

            let line = decode_line(&buffer);
            match self.handle_submission(&line).await {
                Ok(_) | Err(AppError::Submission { .. }) => {}
                Err(error) => return Err(error),
            }
        }

        Ok(())
    }

    /// Forwards one line to the session and redraws the transcript.
    ///
    /// A failed completion is reported and the loop carries on; the user
    /// message stays in the history, so a resubmission sends it twice.
    pub async fn handle_submission(&mut self, line: &str) -> AppResult<SubmitOutcome> {
        match self.session.submit(self.provider.as_ref(), line).await {
            Ok(SubmitOutcome::Idle) => Ok(SubmitOutcome::Idle),
            Ok(SubmitOutcome::Replied) => {
                self.view
                    .render(&self.session.transcript())
                    .context(WriteOutputSnafu {
                        stage: "render-transcript",
                    })?;
                Ok(SubmitOutcome::Replied)
            }
            Err(error) => {
                tracing::error!(
                    error = %error,
                    history_len = self.session.history().len(),
                    "submission failed"
                );
                self.view
                    .error(&error.to_string())
                    .context(WriteOutputSnafu {
                        stage: "render-error",
                    })?;
                Err(error).context(SubmissionSnafu {
                    stage: "handle-submission",
                })
            }
        }
    }
}

/// Strips the line terminator; invalid UTF-8 is replaced rather than
/// ending the session.
fn decode_line(raw: &[u8]) -> Cow<'_, str> {
    let raw = raw.strip_suffix(b"\n").unwrap_or(raw);
    let raw = raw.strip_suffix(b"\r").unwrap_or(raw);

    let line = String::from_utf8_lossy(raw);
    if let Cow::Owned(_) = line {
        tracing::warn!(bytes = raw.len(), "input line was not valid UTF-8");
    }
    line
}

/// Entry point used by the binary: settings, provider, session, then the
/// stdin/stdout loop.
pub async fn run() -> AppResult<()> {
    let settings = SettingsLoader::default().load().context(SettingsSnafu {
        stage: "load-settings",
    })?;

    let view = TranscriptView::new(io::stdout(), console::colors_enabled());
    let mut app = ChatApp::bootstrap(&settings, view)?;
    app.run(&settings.title, BufReader::new(tokio::io::stdin()))
        .await
}

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum AppError {
    #[snafu(display("failed on `{stage}`: {source}"))]
    Settings {
        stage: &'static str,
        source: SettingsError,
    },
    #[snafu(display("failed to create completion provider on `{stage}`: {source}"))]
    Provider {
        stage: &'static str,
        source: ProviderError,
    },
    #[snafu(display("failed to start session on `{stage}`: {source}"))]
    Session {
        stage: &'static str,
        source: SessionError,
    },
    #[snafu(display("submission failed on `{stage}`: {source}"))]
    Submission {
        stage: &'static str,
        source: SessionError,
    },
    #[snafu(display("failed to read input on `{stage}`: {source}"))]
    ReadInput {
        stage: &'static str,
        source: io::Error,
    },
    #[snafu(display("failed to write output on `{stage}`: {source}"))]
    WriteOutput {
        stage: &'static str,
        source: io::Error,
    },
}

pub type AppResult<T> = Result<T, AppError>;
