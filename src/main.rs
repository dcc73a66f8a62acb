use std::process::ExitCode;
use std::sync::Arc;

use healthbrief_lib::api::{api_router, ApiContext, ApiServer};
use healthbrief_lib::config::{self, ServiceConfig};
use healthbrief_lib::llm::build_generator;
use healthbrief_lib::summary::{ReconcilerConfig, SqliteSummaryStore, SummaryReconciler};
use healthbrief_lib::transcription::{discover_token_source, GoogleSpeechClient, Transcriber};

fn main() -> ExitCode {
    healthbrief_lib::init_tracing();
    tracing::info!("healthbrief starting v{}", config::APP_VERSION);

    let config = match ServiceConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(error = %e, "Invalid configuration");
            return ExitCode::FAILURE;
        }
    };

    let store = match SqliteSummaryStore::open(&config.database_path) {
        Ok(store) => Arc::new(store),
        Err(e) => {
            tracing::error!(path = %config.database_path.display(), error = %e, "Cannot open summary database");
            return ExitCode::FAILURE;
        }
    };
    tracing::info!(path = %config.database_path.display(), "Summary database ready");

    let runtime = match tokio::runtime::Runtime::new() {
        Ok(runtime) => runtime,
        Err(e) => {
            tracing::error!(error = %e, "Cannot start async runtime");
            return ExitCode::FAILURE;
        }
    };
    let tokens = runtime.block_on(discover_token_source(&config.speech));

    // Blocking HTTP clients are built outside the runtime context and
    // dropped only after the runtime is gone.
    let generator = match build_generator(&config.llm) {
        Ok(generator) => generator,
        Err(e) => {
            tracing::error!(error = %e, "Cannot build text generator");
            return ExitCode::FAILURE;
        }
    };
    let transcriber: Arc<dyn Transcriber> = match GoogleSpeechClient::new(&config.speech, tokens) {
        Ok(client) => Arc::new(client),
        Err(e) => {
            tracing::error!(error = %e, "Cannot build speech client");
            return ExitCode::FAILURE;
        }
    };

    let reconciler = Arc::new(SummaryReconciler::with_config(
        generator,
        store,
        ReconcilerConfig {
            similarity_threshold: config.similarity_threshold,
        },
    ));
    let ctx = ApiContext::new(reconciler.clone(), transcriber.clone(), &config.api_key);

    let code = runtime.block_on(serve(ctx, config.bind_addr));
    drop(runtime);
    drop((reconciler, transcriber));
    code
}

async fn serve(ctx: ApiContext, bind_addr: std::net::SocketAddr) -> ExitCode {
    let server = match ApiServer::start(api_router(ctx), bind_addr).await {
        Ok(server) => server,
        Err(e) => {
            tracing::error!(%bind_addr, error = %e, "Failed to bind API server");
            return ExitCode::FAILURE;
        }
    };
    tracing::info!(addr = %server.addr, "Listening");

    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Cannot listen for shutdown signal");
    }
    server.stop().await;
    ExitCode::SUCCESS
}
