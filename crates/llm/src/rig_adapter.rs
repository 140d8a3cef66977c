use futures::future::BoxFuture;
use rig::completion::message::AssistantContent;
use rig::completion::{CompletionModel, Message as RigMessage};
use rig::prelude::CompletionClient;
use rig::providers::openai;
use snafu::{ResultExt, ensure};

use super::model::{DEFAULT_OPENAI_MODEL, Model, default_openai_models};
use super::provider::{
    CompletionRequest, CompletionsFailedSnafu, EmptyCompletionSnafu, EmptyMessageSetSnafu,
    HttpClientSnafu, LlmProvider, MissingApiKeySnafu, ProviderConfig, ProviderMessage,
    ProviderResult, Role,
};

pub const RIG_OPENAI_PROVIDER_ID: &str = "openai";

pub struct RigProviderAdapter {
    config: ProviderConfig,
    known_models: Vec<Model>,
}

impl RigProviderAdapter {
    pub fn new(config: ProviderConfig) -> ProviderResult<Self> {
        ensure!(
            !config.api_key.is_empty(),
            MissingApiKeySnafu {
                stage: "rig-adapter-new",
                provider_id: config.provider_id.clone(),
            }
        );

        Ok(Self {
            config,
            known_models: default_openai_models(),
        })
    }

    fn build_client(config: &ProviderConfig) -> ProviderResult<openai::Client> {
        let mut builder = openai::Client::builder().api_key(config.api_key.as_str());
        if !config.endpoint.is_empty() {
            builder = builder.base_url(config.endpoint.as_str());
        }
        builder.build().context(HttpClientSnafu {
            stage: "build-client",
        })
    }

    fn to_rig_message(message: &ProviderMessage) -> Option<RigMessage> {
        match message.role {
            Role::System => None,
            Role::User => Some(RigMessage::user(message.content.clone())),
            Role::Assistant => Some(RigMessage::assistant(message.content.clone())),
        }
    }

    // Rig exposes a single preamble field, so system-role messages are folded into it
    // while user/assistant turns still travel as chat messages.
    fn merged_preamble(request: &CompletionRequest) -> Option<String> {
        let preamble_parts = request
            .messages
            .iter()
            .filter(|message| matches!(message.role, Role::System))
            .filter(|message| !message.content.trim().is_empty())
            .map(|message| message.content.as_str())
            .collect::<Vec<_>>();

        if preamble_parts.is_empty() {
            None
        } else {
            Some(preamble_parts.join("\n\n"))
        }
    }

    fn reply_text<'a>(choice: impl IntoIterator<Item = &'a AssistantContent>) -> String {
        choice
            .into_iter()
            .filter_map(|content| match content {
                AssistantContent::Text(text) => Some(text.text.as_str()),
                _ => None,
            })
            .collect::<Vec<_>>()
            .join("")
    }

    async fn send_completion(
        config: &ProviderConfig,
        request: CompletionRequest,
    ) -> ProviderResult<ProviderMessage> {
        let mut messages = request
            .messages
            .iter()
            .filter_map(Self::to_rig_message)
            .collect::<Vec<_>>();

        let Some(prompt) = messages.pop() else {
            tracing::warn!(
                model_id = %request.model_id,
                total_message_count = request.messages.len(),
                "cannot send completion because no user/assistant messages remain after filtering"
            );
            return EmptyMessageSetSnafu {
                stage: "send-completion-filter-messages",
                model_id: request.model_id.clone(),
            }
            .fail();
        };

        let client = Self::build_client(config)?;
        let model = client.completion_model(request.model_id.clone());
        let mut builder = model.completion_request(prompt).messages(messages);

        if let Some(preamble) = Self::merged_preamble(&request) {
            builder = builder.preamble(preamble);
        }

        if let Some(temperature) = request.temperature {
            builder = builder.temperature(temperature);
        }

        if let Some(max_tokens) = request.max_tokens {
            builder = builder.max_tokens(max_tokens);
        }

        tracing::debug!(
            provider_id = %config.provider_id,
            model_id = %request.model_id,
            history_len = request.messages.len(),
            "sending completion request"
        );

        let response = builder.send().await.context(CompletionsFailedSnafu {
            stage: "send-completion",
        })?;

        let text = Self::reply_text(response.choice.iter());
        ensure!(
            !text.trim().is_empty(),
            EmptyCompletionSnafu {
                stage: "read-completion-choice",
                model_id: request.model_id.clone(),
            }
        );

        Ok(ProviderMessage::assistant(text))
    }
}

impl LlmProvider for RigProviderAdapter {
    fn id(&self) -> &str {
        &self.config.provider_id
    }

    fn name(&self) -> &str {
        "Rig OpenAI"
    }

    fn default_model(&self) -> &str {
        DEFAULT_OPENAI_MODEL
    }

    fn known_models(&self) -> &[Model] {
        &self.known_models
    }

    fn complete<'a>(
        &'a self,
        request: CompletionRequest,
    ) -> BoxFuture<'a, ProviderResult<ProviderMessage>> {
        Box::pin(async move {
            let model_id = request.model_id.clone();
            let result = Self::send_completion(&self.config, request).await;
            if let Err(error) = &result {
                tracing::error!(
                    provider_id = %self.config.provider_id,
                    model_id = %model_id,
                    error = %error,
                    "completion request failed"
                );
            }
            result
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::ProviderError;

    fn config(api_key: &str) -> ProviderConfig {
        ProviderConfig::new("openai", api_key, "https://api.openai.com/v1")
    }

    #[test]
    fn empty_api_key_is_rejected_at_construction() {
        let result = RigProviderAdapter::new(config("   "));
        assert!(matches!(
            result,
            Err(ProviderError::MissingApiKey { ref provider_id, .. }) if provider_id == "openai"
        ));
    }

    #[test]
    fn system_messages_are_folded_into_the_preamble() {
        let request = CompletionRequest::new(
            "gpt-4",
            vec![
                ProviderMessage::new(Role::System, "Use the reading guide."),
                ProviderMessage::new(Role::User, "Summarize section 2"),
                ProviderMessage::new(Role::System, "  "),
                ProviderMessage::new(Role::System, "Be concise."),
            ],
        );

        assert_eq!(
            RigProviderAdapter::merged_preamble(&request).as_deref(),
            Some("Use the reading guide.\n\nBe concise.")
        );
    }

    #[test]
    fn no_preamble_without_system_messages() {
        let request = CompletionRequest::new(
            "gpt-4",
            vec![ProviderMessage::new(Role::User, "hello")],
        );
        assert_eq!(RigProviderAdapter::merged_preamble(&request), None);
    }

    #[test]
    fn only_chat_turns_become_rig_messages() {
        let system = ProviderMessage::new(Role::System, "guide");
        let user = ProviderMessage::new(Role::User, "question");
        let assistant = ProviderMessage::assistant("answer");

        assert!(RigProviderAdapter::to_rig_message(&system).is_none());
        assert!(matches!(
            RigProviderAdapter::to_rig_message(&user),
            Some(RigMessage::User { .. })
        ));
        assert!(matches!(
            RigProviderAdapter::to_rig_message(&assistant),
            Some(RigMessage::Assistant { .. })
        ));
    }

    #[test]
    fn reply_text_joins_every_text_part() {
        let parts = vec![
            AssistantContent::text("Section 2 "),
            AssistantContent::text("covers X."),
        ];
        assert_eq!(
            RigProviderAdapter::reply_text(parts.iter()),
            "Section 2 covers X."
        );
    }

    #[tokio::test]
    async fn system_only_request_fails_before_any_network_call() {
        let adapter = match RigProviderAdapter::new(config("sk-test")) {
            Ok(adapter) => adapter,
            Err(error) => panic!("adapter should build: {error}"),
        };
        let request = CompletionRequest::new(
            "gpt-4",
            vec![ProviderMessage::new(Role::System, "guide")],
        );

        let result = adapter.complete(request).await;
        assert!(matches!(
            result,
            Err(ProviderError::EmptyMessageSet { ref model_id, .. }) if model_id == "gpt-4"
        ));
    }
}
