use serde::Deserialize;
use std::error::Error;
use std::fmt;
use std::fs;
use std::sync::Arc;
use log::info;

pub const DEFAULT_SYSTEM_INSTRUCTION: &str = r#"You are a creative website code generator.

Your only task is to turn a short description such as "travel blog", "snake game", "calculator" or "DSA study site" into the complete code of a working website.

Respond ONLY with a JSON object in exactly this shape:
{
  "html": "<!DOCTYPE html> ...",
  "css": "body { ... }",
  "js": "document.addEventListener(...)"
}

Rules for the output:
- The keys must be exactly "html", "css" and "js"; every value is a string.
- No explanation, no markdown, no headings, no comments and no triple backticks.
- The response must be valid JSON.

Rules for the website:
- Build fully functional websites, not just layouts. Games must be playable with working logic; tools such as calculators need real features and a distinctive look.
- Use semantic HTML with <header>, <main>, <section> and <footer>, and always include a footer with social links and basic info.
- Make it responsive, long-scroll and visually polished: gradients, custom fonts, icons, transitions, hover effects and soft shadows.
- When real content is missing, generate placeholder text and use open image or video URLs (for example https://source.unsplash.com/1600x900/?nature or a sample YouTube embed).
- FontAwesome, Google Fonts or anime.js may be loaded from a CDN when they improve the design.
- Use alt text for images and label every input. Add a dark/light toggle when it fits the project.
"#;

pub const DEFAULT_JSON_CORRECTION: &str = r#"Your previous answer could not be parsed as JSON. Reply again with ONLY a valid JSON object with the string keys "html", "css" and "js". Do not use markdown, triple backticks or any text outside the JSON object."#;

#[derive(Debug)]
pub enum PromptError {
    IoError(std::io::Error),
    JsonError(serde_json::Error),
    EmptyTemplate(String),
}

impl fmt::Display for PromptError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PromptError::IoError(e) => write!(f, "Prompt file IO error: {}", e),
            PromptError::JsonError(e) => write!(f, "Prompt JSON parsing error: {}", e),
            PromptError::EmptyTemplate(key) => write!(f, "Prompt template '{}' is empty", key),
        }
    }
}

impl Error for PromptError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            PromptError::IoError(e) => Some(e),
            PromptError::JsonError(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for PromptError {
    fn from(err: std::io::Error) -> Self {
        PromptError::IoError(err)
    }
}

impl From<serde_json::Error> for PromptError {
    fn from(err: serde_json::Error) -> Self {
        PromptError::JsonError(err)
    }
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct PromptConfig {
    pub system_instruction: String,
    pub json_correction: String,
}

impl Default for PromptConfig {
    fn default() -> Self {
        Self {
            system_instruction: DEFAULT_SYSTEM_INSTRUCTION.to_string(),
            json_correction: DEFAULT_JSON_CORRECTION.to_string(),
        }
    }
}

impl PromptConfig {
    fn validate(&self) -> Result<(), PromptError> {
        if self.system_instruction.trim().is_empty() {
            return Err(PromptError::EmptyTemplate("system_instruction".to_string()));
        }
        if self.json_correction.trim().is_empty() {
            return Err(PromptError::EmptyTemplate("json_correction".to_string()));
        }
        Ok(())
    }
}

pub fn load_prompts_from_str(json: &str) -> Result<PromptConfig, PromptError> {
    let config: PromptConfig = serde_json::from_str(json)?;
    config.validate()?;
    Ok(config)
}

/// Loads prompt overrides from `path`, or the built-in prompts when no path
/// is configured. Keys missing from the file keep their built-in value.
pub fn load_prompts(path: Option<&str>) -> Result<Arc<PromptConfig>, Box<dyn Error + Send + Sync>> {
    let Some(path) = path.filter(|p| !p.trim().is_empty()) else {
        info!("Using built-in prompts");
        return Ok(Arc::new(PromptConfig::default()));
    };

    let file_content = fs
        ::read_to_string(path)
        .map_err(|e| format!("Failed to read prompts file '{}': {}", path, e))?;
    let config = load_prompts_from_str(&file_content).map_err(|e|
        format!("Failed to parse prompts file '{}': {}", path, e)
    )?;
    info!("Loaded prompts from {}", path);
    Ok(Arc::new(config))
}
