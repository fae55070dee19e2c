pub mod gemini;

use async_trait::async_trait;
use std::error::Error;
use std::sync::Arc;
use std::time::Duration;

use crate::error::GenerationError;
use crate::models::{ ConversationTurn, FunctionCall };
use self::gemini::GeminiClient;

/// What the model answered for one invocation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ModelReply {
    pub text: Option<String>,
    pub function_calls: Vec<FunctionCall>,
}

impl ModelReply {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            function_calls: Vec::new(),
        }
    }

    pub fn function_call(call: FunctionCall) -> Self {
        Self {
            text: None,
            function_calls: vec![call],
        }
    }
}

#[async_trait]
pub trait ModelClient: Send + Sync {
    /// Sends the full transcript plus the system instruction and returns the
    /// model's next turn.
    async fn generate(
        &self,
        history: &[ConversationTurn],
        system_instruction: &str
    ) -> Result<ModelReply, GenerationError>;

    fn get_model(&self) -> String;
}

#[derive(Debug, Clone)]
pub struct LlmConfig {
    pub api_key: Option<String>,
    pub model: Option<String>,
    pub base_url: Option<String>,
    pub request_timeout: Duration,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: None,
            base_url: None,
            request_timeout: Duration::from_secs(120),
        }
    }
}

pub fn new_client(
    config: &LlmConfig
) -> Result<Arc<dyn ModelClient>, Box<dyn Error + Send + Sync>> {
    let client = GeminiClient::from_config(config)?;
    Ok(Arc::new(client))
}
