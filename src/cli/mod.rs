use clap::Parser;

#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    // --- Model Provider Args ---
    /// API key for the Gemini API. Without it the server starts but refuses to generate.
    #[arg(long, env = "GEMINI_API_KEY", hide_env_values = true)]
    pub gemini_api_key: Option<String>,

    /// Gemini model used for generation.
    #[arg(long, env = "GEMINI_MODEL", default_value = "gemini-2.5-flash")]
    pub gemini_model: String,

    /// Base URL of the Gemini REST API (without the /models/... suffix).
    #[arg(long, env = "GEMINI_BASE_URL", default_value = "https://generativelanguage.googleapis.com/v1beta")]
    pub gemini_base_url: String,

    /// Timeout in seconds for each call to the model provider.
    #[arg(long, env = "REQUEST_TIMEOUT_SECS", default_value = "120")]
    pub request_timeout_secs: u64,

    // --- Generation Args ---
    /// Optional JSON file overriding the built-in system/correction prompts.
    #[arg(long, env = "PROMPTS_PATH")]
    pub prompts_path: Option<String>,

    /// Maximum number of function-call rounds resolved before a request is aborted.
    #[arg(long, env = "MAX_TOOL_TURNS", default_value = "5")]
    pub max_tool_turns: usize,

    /// Follow-up turns asking the model to fix an answer that is not valid JSON. 0 disables.
    #[arg(long, env = "JSON_RETRIES", default_value = "0")]
    pub json_retries: usize,

    // --- Server Args ---
    /// Interface the HTTP server binds to.
    #[arg(long, env = "HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// Port the HTTP server listens on.
    #[arg(long, env = "PORT", default_value = "3000")]
    pub port: u16,

    /// Runtime environment. Static files are served only in "production".
    #[arg(long, env = "NODE_ENV", default_value = "development")]
    pub node_env: String,

    /// Directory with the built front-end, served in production.
    #[arg(long, env = "PUBLIC_DIR", default_value = "public")]
    pub public_dir: String,

    /// Global limit of generate requests per second. 0 disables the limit.
    #[arg(long, env = "RATE_LIMIT_PER_SECOND", default_value = "10")]
    pub rate_limit_per_second: u32,

    /// Optional path to the TLS certificate file (PEM format). Requires --tls-key-path.
    #[arg(long, env = "TLS_CERT_PATH")]
    pub tls_cert_path: Option<String>,

    /// Optional path to the TLS private key file (PEM format). Requires --tls-cert-path.
    #[arg(long, env = "TLS_KEY_PATH")]
    pub tls_key_path: Option<String>,

    #[arg(long, env = "ENABLE_TLS", default_value = "false")]
    pub enable_tls: bool,
}

impl Args {
    /// The provider key, treating an empty value as unset.
    pub fn api_key(&self) -> Option<&str> {
        self.gemini_api_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
    }

    pub fn is_production(&self) -> bool {
        self.node_env.eq_ignore_ascii_case("production")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generation_defaults() {
        let args = Args::parse_from(["site-forge"]);
        assert_eq!(args.gemini_base_url, "https://generativelanguage.googleapis.com/v1beta");
        assert_eq!(args.max_tool_turns, 5);
        assert_eq!(args.json_retries, 0);
        assert!(!args.enable_tls);
    }

    #[test]
    fn blank_api_key_counts_as_missing() {
        let args = Args::parse_from(["site-forge", "--gemini-api-key", "  "]);
        assert_eq!(args.api_key(), None);

        let args = Args::parse_from(["site-forge", "--gemini-api-key", "abc"]);
        assert_eq!(args.api_key(), Some("abc"));
    }

    #[test]
    fn production_flag() {
        let args = Args::parse_from(["site-forge", "--node-env", "Production"]);
        assert!(args.is_production());
    }
}
