use crate::agent::SiteAgent;
use crate::cli::Args;
use crate::error::GenerationError;
use crate::models::GeneratedSite;
use std::error::Error;
use std::net::SocketAddr;
use std::num::NonZeroU32;
use std::path::Path;
use std::sync::Arc;
use axum::{
    routing::{ get, post },
    Router,
    Json,
    extract::{ State, rejection::JsonRejection },
    response::{ IntoResponse, Response },
    http::StatusCode,
};
use governor::{ DefaultDirectRateLimiter, Quota, RateLimiter };
use serde::{ Deserialize, Serialize };
use serde_json::json;
use tower_http::cors::{ Any, CorsLayer };
use tower_http::services::{ ServeDir, ServeFile };
use log::{ info, warn, error, debug };

#[derive(Deserialize, Debug, Default)]
pub struct GenerateRequest {
    #[serde(default)]
    pub prompt: Option<String>,
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    message: String,
}

#[derive(Debug)]
pub enum ApiError {
    Generation(GenerationError),
    RateLimited,
}

impl From<GenerationError> for ApiError {
    fn from(err: GenerationError) -> Self {
        ApiError::Generation(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            ApiError::Generation(err @ GenerationError::InvalidRequest) => {
                (StatusCode::BAD_REQUEST, json!({ "error": err.to_string() }))
            }
            ApiError::Generation(err @ GenerationError::Configuration) => {
                (StatusCode::INTERNAL_SERVER_ERROR, json!({ "error": err.to_string() }))
            }
            ApiError::Generation(GenerationError::Upstream(details)) => {
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "error": "Gemini API error", "details": details }),
                )
            }
            ApiError::Generation(GenerationError::MalformedResponse { raw, .. }) => {
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "error": "AI response is not valid JSON", "raw": raw }),
                )
            }
            ApiError::RateLimited => {
                (StatusCode::TOO_MANY_REQUESTS, json!({ "error": "Too many requests" }))
            }
        };
        (status, Json(body)).into_response()
    }
}

/// Shared handler state. `agent` is `None` when no provider key is configured.
#[derive(Clone)]
pub struct AppState {
    agent: Option<Arc<SiteAgent>>,
    limiter: Option<Arc<DefaultDirectRateLimiter>>,
}

impl AppState {
    pub fn new(agent: Option<Arc<SiteAgent>>, rate_limit_per_second: u32) -> Self {
        let limiter = NonZeroU32::new(rate_limit_per_second).map(|n|
            Arc::new(RateLimiter::direct(Quota::per_second(n)))
        );
        Self { agent, limiter }
    }
}

pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any);

    Router::new()
        .route("/api/health", get(health_handler))
        .route("/api/generate", post(generate_handler))
        .layer(cors)
        .with_state(state)
}

/// Serves the built front-end for every path the API does not handle,
/// falling back to `index.html` for client-side routes.
pub fn with_static_files(router: Router, public_dir: &Path) -> Router {
    let index = public_dir.join("index.html");
    router.fallback_service(ServeDir::new(public_dir).fallback(ServeFile::new(index)))
}

pub fn build_app(args: &Args, state: AppState) -> Router {
    let app = router(state);
    if !args.is_production() {
        return app;
    }

    let public_dir = Path::new(&args.public_dir);
    if public_dir.is_dir() {
        info!("Serving static files from {}", public_dir.display());
        with_static_files(app, public_dir)
    } else {
        warn!("'{}' folder not found. Static file serving is disabled.", args.public_dir);
        app
    }
}

pub async fn start_http_server(
    args: &Args,
    state: AppState
) -> Result<(), Box<dyn Error + Send + Sync>> {
    let addr = format!("{}:{}", args.host, args.port).parse::<SocketAddr>()?;
    let app = build_app(args, state);

    match (args.enable_tls, &args.tls_cert_path, &args.tls_key_path) {
        (true, Some(cert_path), Some(key_path)) => {
            info!("TLS enabled. Loading certificate from '{}' and key from '{}'", cert_path, key_path);
            let tls_config = axum_server::tls_rustls::RustlsConfig
                ::from_pem_file(cert_path, key_path).await
                .map_err(|e| format!("Failed to load TLS certificate/key: {}", e))?;

            info!("Server running at https://{}", addr);
            axum_server::bind_rustls(addr, tls_config).serve(app.into_make_service()).await?;
        }
        (true, _, _) => {
            error!("Both --tls-cert-path and --tls-key-path must be provided to enable TLS.");
            return Err("Missing TLS certificate or key path".into());
        }
        (false, _, _) => {
            let listener = tokio::net::TcpListener
                ::bind(addr).await
                .map_err(|e| format!("Failed to bind HTTP server to {}: {}. Try a different port.", addr, e))?;
            info!("Server running at http://{}", addr);
            axum::serve(listener, app.into_make_service()).await?;
        }
    }

    Ok(())
}

async fn health_handler(State(state): State<AppState>) -> impl IntoResponse {
    if state.agent.is_some() {
        (
            StatusCode::OK,
            Json(HealthResponse {
                status: "ok",
                message: "Server running and API key loaded".into(),
            }),
        )
    } else {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(HealthResponse {
                status: "error",
                message: GenerationError::Configuration.to_string(),
            }),
        )
    }
}

async fn generate_handler(
    State(state): State<AppState>,
    payload: Result<Json<GenerateRequest>, JsonRejection>
) -> Result<Json<GeneratedSite>, ApiError> {
    let Some(agent) = state.agent.as_ref() else {
        error!("Rejecting generate request: GEMINI_API_KEY is not configured");
        return Err(GenerationError::Configuration.into());
    };

    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => {
            debug!("Unreadable generate body: {}", rejection);
            GenerateRequest::default()
        }
    };
    let prompt = request.prompt.unwrap_or_default();
    if prompt.is_empty() {
        return Err(GenerationError::InvalidRequest.into());
    }

    if let Some(limiter) = &state.limiter {
        if limiter.check().is_err() {
            warn!("Generate rate limit exceeded. Rejecting request.");
            return Err(ApiError::RateLimited);
        }
    }

    let site = agent.generate(&prompt).await?;
    Ok(Json(site))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[tokio::test]
    async fn tls_without_both_paths_is_rejected() {
        for extra in [
            vec![],
            vec!["--tls-cert-path", "cert.pem"],
            vec!["--tls-key-path", "key.pem"],
        ] {
            let mut argv = vec!["site-forge", "--enable-tls", "--host", "127.0.0.1", "--port", "0"];
            argv.extend(extra);
            let args = Args::parse_from(argv);

            let err = start_http_server(&args, AppState::new(None, 0)).await.unwrap_err();
            assert_eq!(err.to_string(), "Missing TLS certificate or key path");
        }
    }

    #[tokio::test]
    async fn unreadable_tls_files_fail_startup() {
        let args = Args::parse_from([
            "site-forge",
            "--enable-tls",
            "--host",
            "127.0.0.1",
            "--port",
            "0",
            "--tls-cert-path",
            "/nonexistent/cert.pem",
            "--tls-key-path",
            "/nonexistent/key.pem",
        ]);

        let err = start_http_server(&args, AppState::new(None, 0)).await.unwrap_err();
        assert!(err.to_string().starts_with("Failed to load TLS certificate/key"), "{}", err);
    }
}
