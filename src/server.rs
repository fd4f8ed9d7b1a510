//! HTTP surface over the processing pipeline.
//!
//! Provides [`router`] (for embedding and tests) and [`serve`], which binds the
//! configured address and runs until ctrl-c.

use std::sync::Arc;

use anyhow::Result;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Serialize;

use crate::config::FactkeeperConfig;
use crate::health;
use crate::knowledge::table::render_markdown;
use crate::llm::{self, GenerateOptions, LlmClient};
use crate::pipeline::{KnowledgeProcessor, ProcessingResult};
use crate::source::{self, InputSource, ProcessingInput};

/// Shared, read-only state. Each request builds its own processing run.
#[derive(Clone)]
pub struct AppState {
    config: Arc<FactkeeperConfig>,
    client: Option<Arc<dyn LlmClient>>,
    client_error: Option<String>,
    source: Arc<dyn InputSource>,
}

impl AppState {
    pub fn new(
        config: FactkeeperConfig,
        client: Option<Arc<dyn LlmClient>>,
        source: Arc<dyn InputSource>,
    ) -> Self {
        Self {
            config: Arc::new(config),
            client,
            client_error: None,
            source,
        }
    }

    /// Build the client and source from config. A client that cannot be built
    /// is recorded and reported by `/health` instead of aborting startup.
    pub fn from_config(config: FactkeeperConfig) -> Result<Self> {
        let source = Arc::<dyn InputSource>::from(source::create_source(&config.source)?);
        let (client, client_error) = match llm::create_client(&config.llm) {
            Ok(client) => (Some(Arc::<dyn LlmClient>::from(client)), None),
            Err(e) => {
                tracing::warn!(error = %e, "LLM client unavailable, /process will fail");
                (None, Some(e.to_string()))
            }
        };
        Ok(Self {
            config: Arc::new(config),
            client,
            client_error,
            source,
        })
    }

    fn processor(&self) -> Option<KnowledgeProcessor> {
        self.client.as_ref().map(|client| {
            KnowledgeProcessor::new(Arc::clone(client), GenerateOptions::from_config(&self.config.llm))
        })
    }
}

#[derive(Serialize)]
struct ProcessResponse {
    #[serde(flatten)]
    result: ProcessingResult,
    updated_knowledge_base_markdown: String,
}

#[derive(Serialize)]
struct ErrorResponse {
    success: bool,
    error: String,
}

fn error_response(status: StatusCode, error: impl Into<String>) -> Response {
    let body = ErrorResponse {
        success: false,
        error: error.into(),
    };
    (status, Json(body)).into_response()
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/health", get(health_check))
        .route("/process", post(process))
        .route("/process/source", post(process_source))
        .with_state(state)
}

async fn index(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "service": "factkeeper",
        "version": env!("CARGO_PKG_VERSION"),
        "llm_provider": state.config.llm.provider,
        "source": state.source.name(),
        "endpoints": {
            "GET /": "service information",
            "GET /health": "component health report",
            "POST /process": "merge a message into a supplied knowledge base",
            "POST /process/source": "merge using the configured input source",
        }
    }))
}

async fn health_check(State(state): State<AppState>) -> Response {
    let report = health::check_health(
        &state.config,
        state.client.as_deref(),
        state.client_error.as_deref(),
        Arc::clone(&state.source),
    )
    .await;
    let status = if report.is_healthy() {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (status, Json(report)).into_response()
}

async fn process(State(state): State<AppState>, Json(input): Json<ProcessingInput>) -> Response {
    run(&state, input).await
}

async fn process_source(State(state): State<AppState>) -> Response {
    match source::load_input(Arc::clone(&state.source)).await {
        Ok(input) => run(&state, input).await,
        Err(e) => error_response(
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("failed to load input from {}: {e:#}", state.source.name()),
        ),
    }
}

async fn run(state: &AppState, input: ProcessingInput) -> Response {
    let Some(processor) = state.processor() else {
        return error_response(
            StatusCode::SERVICE_UNAVAILABLE,
            state
                .client_error
                .clone()
                .unwrap_or_else(|| "LLM client not configured".into()),
        );
    };

    let result = processor
        .process(&input.guidelines, &input.knowledge_base, &input.message)
        .await;
    let status = if result.success {
        StatusCode::OK
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    };
    let body = ProcessResponse {
        updated_knowledge_base_markdown: render_markdown(&result.updated_knowledge_base),
        result,
    };
    (status, Json(body)).into_response()
}

/// Serve the HTTP surface on the configured host and port until ctrl-c.
pub async fn serve(config: FactkeeperConfig) -> Result<()> {
    let bind_addr = format!("{}:{}", config.server.host, config.server.port);
    let state = AppState::from_config(config)?;
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!(addr = %bind_addr, "factkeeper listening at http://{bind_addr}/");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "failed to listen for ctrl-c");
            }
            tracing::info!("shutting down HTTP server");
        })
        .await?;

    Ok(())
}
