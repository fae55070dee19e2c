pub mod agent;
pub mod models;
pub mod server;
pub mod config;
pub mod llm;
pub mod cli;
pub mod error;
pub mod normalize;

use agent::SiteAgent;
use cli::Args;
use config::prompt;
use log::{ info, error };
use server::Server;
use std::error::Error;
use std::sync::Arc;

pub async fn run(args: Args) -> Result<(), Box<dyn Error + Send + Sync>> {
    info!("--- Core Configuration ---");
    info!("Listen Address: {}:{}", args.host, args.port);
    info!("Environment: {}", args.node_env);
    info!("Gemini Model: {}", args.gemini_model);
    info!("Gemini Base URL: {}", args.gemini_base_url);
    info!("API Key: {}", if args.api_key().is_some() { "Loaded" } else { "NOT loaded" });
    info!("Prompts Path: {}", args.prompts_path.as_deref().unwrap_or("built-in"));
    info!("Max Tool Turns: {}", args.max_tool_turns);
    info!("JSON Retries: {}", args.json_retries);
    info!("Request Timeout: {}s", args.request_timeout_secs);
    if args.is_production() {
        info!("Public Dir: {}", args.public_dir);
    }
    info!("-------------------------");

    let prompt_config = prompt::load_prompts(args.prompts_path.as_deref())?;
    let agent = if args.api_key().is_some() {
        Some(Arc::new(SiteAgent::from_args(&args, prompt_config)?))
    } else {
        error!("GEMINI_API_KEY is missing in .env. Server will not work.");
        None
    };

    let server = Server::new(agent, args);
    server.run().await?;

    Ok(())
}
