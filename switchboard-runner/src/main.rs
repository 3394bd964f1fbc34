//! Switchboard Runner - serves registered models over the dispatch protocol.

use std::env;
use std::sync::Arc;

use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use switchboard_runner::model::descriptor;
use switchboard_runner::{api, AppState, ClassResolver, Config, ModelRegistry};

const VERSION: &str = env!("CARGO_PKG_VERSION");

fn print_version() {
    println!("switchboard-runner {}", VERSION);
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Handle --version / -V
    let args: Vec<String> = env::args().collect();
    if args.iter().any(|a| a == "--version" || a == "-V") {
        print_version();
        return Ok(());
    }

    // Initialize tracing
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::load().map_err(|e| {
        format!(
            "Failed to load configuration: {}. \
             Check config.toml or the SWITCHBOARD__SECTION__KEY environment variables.",
            e
        )
    })?;
    config.validate()?;

    // Create model registry with the bundled demo catalog
    let registry = Arc::new(ModelRegistry::new(ClassResolver::with_demo_models()));

    // Register configured models. A broken document is fatal; a model that
    // fails to construct is not.
    if let Some(ref path) = config.models.path {
        let descriptors = descriptor::load(path)?;
        tracing::info!("Loaded {} model descriptors from {}", descriptors.len(), path);

        let report = registry.register_all(descriptors).await;
        tracing::info!(
            "Registered {} models ({} failed)",
            report.registered.len(),
            report.failed.len()
        );
    } else {
        tracing::info!("No model config configured, starting with an empty registry");
    }

    // Create shared state
    let state = Arc::new(AppState::new(&config, registry));
    tracing::info!(
        "Starting switchboard-runner: {} (stage: {})",
        state.replica.deployment_name,
        state.replica.stage
    );

    let app = api::app(state);

    // Start server
    let addr = format!("{}:{}", config.api.host, config.api.port);
    tracing::info!("Listening on {}", addr);

    let listener = TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
