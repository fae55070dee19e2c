pub mod api;

use crate::agent::SiteAgent;
use crate::cli::Args;
use self::api::AppState;
use log::{ info, warn };
use std::error::Error;
use std::sync::Arc;

pub struct Server {
    agent: Option<Arc<SiteAgent>>,
    args: Args,
}

impl Server {
    pub fn new(agent: Option<Arc<SiteAgent>>, args: Args) -> Self {
        if args.rate_limit_per_second > 0 {
            info!("Generate requests limited to {}/s.", args.rate_limit_per_second);
        } else {
            warn!("Generate requests are NOT rate limited.");
        }

        Self { agent, args }
    }

    pub async fn run(&self) -> Result<(), Box<dyn Error + Send + Sync>> {
        let state = AppState::new(self.agent.clone(), self.args.rate_limit_per_second);
        api::start_http_server(&self.args, state).await
    }
}
