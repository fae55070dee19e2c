use log::{ debug, info, warn };
use std::error::Error;
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

use crate::cli::Args;
use crate::config::prompt::PromptConfig;
use crate::error::GenerationError;
use crate::llm::{ new_client, LlmConfig, ModelClient };
use crate::models::{ ConversationTurn, GeneratedSite };
use crate::normalize::normalize_response;

pub const DEFAULT_MAX_TOOL_TURNS: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AgentSettings {
    /// Function-call rounds resolved before the request is aborted.
    pub max_tool_turns: usize,
    /// Corrective follow-ups allowed after an answer that is not valid JSON.
    pub json_retries: usize,
}

impl Default for AgentSettings {
    fn default() -> Self {
        Self {
            max_tool_turns: DEFAULT_MAX_TOOL_TURNS,
            json_retries: 0,
        }
    }
}

impl From<&Args> for AgentSettings {
    fn from(args: &Args) -> Self {
        Self {
            max_tool_turns: args.max_tool_turns,
            json_retries: args.json_retries,
        }
    }
}

/// Drives the turn-based exchange with the model for one prompt and hands
/// the final answer to the normalizer. Holds no per-request state.
#[derive(Clone)]
pub struct SiteAgent {
    client: Arc<dyn ModelClient>,
    prompt_config: Arc<PromptConfig>,
    settings: AgentSettings,
}

impl SiteAgent {
    pub fn new(
        client: Arc<dyn ModelClient>,
        prompt_config: Arc<PromptConfig>,
        settings: AgentSettings
    ) -> Self {
        Self { client, prompt_config, settings }
    }

    pub fn from_args(
        args: &Args,
        prompt_config: Arc<PromptConfig>
    ) -> Result<Self, Box<dyn Error + Send + Sync>> {
        let llm_config = LlmConfig {
            api_key: args.api_key().map(str::to_string),
            model: Some(args.gemini_model.clone()),
            base_url: Some(args.gemini_base_url.clone()),
            request_timeout: Duration::from_secs(args.request_timeout_secs),
        };
        let client = new_client(&llm_config)?;
        info!(
            "Model client configured: Model={}, BaseURL={}, Timeout={}s",
            client.get_model(),
            args.gemini_base_url,
            args.request_timeout_secs
        );
        Ok(Self::new(client, prompt_config, AgentSettings::from(args)))
    }

    pub async fn generate(&self, prompt: &str) -> Result<GeneratedSite, GenerationError> {
        if prompt.is_empty() {
            return Err(GenerationError::InvalidRequest);
        }

        let request_id = Uuid::new_v4();
        info!("[{}] Generating site for prompt ({} chars)", request_id, prompt.chars().count());

        let mut history = vec![ConversationTurn::user_text(prompt)];
        let mut tool_turns = 0;
        let mut corrections = 0;

        loop {
            let reply = self.client
                .generate(&history, &self.prompt_config.system_instruction).await
                .map_err(|e| {
                    warn!("[{}] Model call failed: {}", request_id, e);
                    e
                })?;

            if let Some(call) = reply.function_calls.into_iter().next() {
                if tool_turns >= self.settings.max_tool_turns {
                    warn!(
                        "[{}] Model kept requesting functions after {} rounds",
                        request_id,
                        tool_turns
                    );
                    return Err(GenerationError::upstream("tool-call loop exceeded"));
                }
                tool_turns += 1;
                info!("[{}] Acknowledging function call '{}' (round {})", request_id, call.name, tool_turns);
                let name = call.name.clone();
                history.push(ConversationTurn::model_function_call(call));
                history.push(ConversationTurn::tool_result(&name));
                continue;
            }

            let text = reply.text.unwrap_or_default();
            debug!("[{}] AI raw response: {}", request_id, text);

            match normalize_response(&text) {
                Ok(site) => {
                    info!(
                        "[{}] Generated site: html={}B css={}B js={}B",
                        request_id,
                        site.html.len(),
                        site.css.len(),
                        site.js.len()
                    );
                    return Ok(site);
                }
                Err(err) if corrections < self.settings.json_retries => {
                    corrections += 1;
                    warn!(
                        "[{}] {}; asking the model to correct it ({}/{})",
                        request_id,
                        err,
                        corrections,
                        self.settings.json_retries
                    );
                    history.push(ConversationTurn::model_text(text));
                    history.push(ConversationTurn::user_text(self.prompt_config.json_correction.clone()));
                }
                Err(err) => {
                    warn!("[{}] {}", request_id, err);
                    return Err(err);
                }
            }
        }
    }
}
