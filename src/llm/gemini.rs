use async_trait::async_trait;
use log::{ debug, info };
use reqwest::{ Client as HttpClient, StatusCode, header::{ HeaderMap, HeaderValue, CONTENT_TYPE } };
use serde::{ Deserialize, Serialize };
use std::error::Error as StdError;
use std::time::Duration;

use super::{ LlmConfig, ModelClient, ModelReply };
use crate::error::GenerationError;
use crate::models::{ ConversationTurn, FunctionCall };

pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    contents: &'a [ConversationTurn],
    system_instruction: SystemInstruction<'a>,
}

#[derive(Serialize)]
struct SystemInstruction<'a> {
    parts: Vec<TextPart<'a>>,
}

#[derive(Serialize)]
struct TextPart<'a> {
    text: &'a str,
}

#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<CandidateContent>,
    finish_reason: Option<String>,
}

#[derive(Deserialize, Debug)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct ResponsePart {
    text: Option<String>,
    function_call: Option<FunctionCall>,
    #[serde(default)]
    thought: bool,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}

#[derive(Deserialize)]
struct ApiErrorEnvelope {
    error: ApiErrorBody,
}

#[derive(Deserialize)]
struct ApiErrorBody {
    message: String,
}

fn parse_generate_response(body: GenerateContentResponse) -> Result<ModelReply, GenerationError> {
    let Some(candidate) = body.candidates.into_iter().next() else {
        let message = match body.prompt_feedback.and_then(|f| f.block_reason) {
            Some(reason) => format!("prompt blocked by model provider: {}", reason),
            None => "model returned no candidates".to_string(),
        };
        return Err(GenerationError::upstream(message));
    };

    if let Some(reason) = candidate.finish_reason.as_deref() {
        debug!("Gemini finish reason: {}", reason);
    }

    let mut reply = ModelReply::default();
    for part in candidate.content.map(|c| c.parts).unwrap_or_default() {
        if let Some(call) = part.function_call {
            reply.function_calls.push(call);
        } else if let Some(text) = part.text.filter(|_| !part.thought) {
            reply.text.get_or_insert_with(String::new).push_str(&text);
        }
    }
    Ok(reply)
}

fn describe_error_body(status: StatusCode, body: &str) -> String {
    serde_json
        ::from_str::<ApiErrorEnvelope>(body)
        .map(|envelope| envelope.error.message)
        .unwrap_or_else(|_| format!("{} {}", status, body.trim()))
}

pub struct GeminiClient {
    http: HttpClient,
    model: String,
    base_url: String,
}

impl GeminiClient {
    pub fn new(
        api_key: String,
        model: Option<String>,
        base_url: Option<String>,
        request_timeout: Duration
    ) -> Result<Self, Box<dyn StdError + Send + Sync>> {
        let model = model
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_MODEL.to_string());
        let base_url = base_url
            .filter(|u| !u.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        let mut key_header = HeaderValue::from_str(&api_key).map_err(|e|
            format!("Invalid API key format: {}", e)
        )?;
        key_header.set_sensitive(true);
        headers.insert("x-goog-api-key", key_header);

        let http = HttpClient::builder()
            .default_headers(headers)
            .timeout(request_timeout)
            .build()
            .map_err(|e| Box::new(e) as Box<dyn StdError + Send + Sync>)?;

        Ok(Self { http, model, base_url })
    }

    pub fn from_config(config: &LlmConfig) -> Result<Self, Box<dyn StdError + Send + Sync>> {
        let api_key = config.api_key
            .clone()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| "Gemini API key is required for GeminiClient".to_string())?;

        Self::new(api_key, config.model.clone(), config.base_url.clone(), config.request_timeout)
    }

    fn endpoint(&self) -> String {
        format!("{}/models/{}:generateContent", self.base_url.trim_end_matches('/'), self.model)
    }
}

#[async_trait]
impl ModelClient for GeminiClient {
    async fn generate(
        &self,
        history: &[ConversationTurn],
        system_instruction: &str
    ) -> Result<ModelReply, GenerationError> {
        info!("GeminiClient::generate() → model={} turns={}", self.model, history.len());

        let payload = GenerateContentRequest {
            contents: history,
            system_instruction: SystemInstruction {
                parts: vec![TextPart { text: system_instruction }],
            },
        };

        let resp = self.http.post(self.endpoint()).json(&payload).send().await?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(GenerationError::upstream(describe_error_body(status, &body)));
        }

        let body: GenerateContentResponse = resp.json().await?;
        parse_generate_response(body)
    }

    fn get_model(&self) -> String {
        self.model.clone()
    }
}
