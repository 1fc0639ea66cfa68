use anyhow::Result;
use clap::Parser;
use replay_host::{router, AppState, Config};
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{filter::EnvFilter, fmt::format::JsonFields, util::SubscriberInitExt, Layer};

const DEFAULT_LOG_FILTER: &str = "info";

#[tokio::main]
async fn main() -> Result<()> {
	dotenv::dotenv().ok();
	let config = Config::parse();

	init_tracing(&config)?;

	let config = Arc::new(config);
	let shutdown_token = CancellationToken::new();

	let app_state = AppState::build(config.clone());
	if !app_state.clips.encoder().is_available().await {
		tracing::warn!(program = %config.encoder_bin, "encoder not found, clip export will fail until it is installed");
	}
	app_state.preload().await;

	let app = router(app_state);

	let listener = TcpListener::bind(config.bind_address()).await?;
	tracing::info!("listening on {}", listener.local_addr()?);

	let signal_shutdown_token = shutdown_token.clone();
	tokio::spawn(async move {
		tokio::signal::ctrl_c().await.ok();
		tracing::info!("Received Ctrl+C, initiating shutdown...");
		signal_shutdown_token.cancel();
	});

	let server_token = shutdown_token.clone();
	axum::serve(listener, app)
		.with_graceful_shutdown(async move {
			server_token.cancelled().await;
		})
		.await?;

	tracing::info!("Server stopped");
	Ok(())
}

pub fn init_tracing(config: &Config) -> Result<()> {
	use std::str::FromStr;
	use tracing_subscriber::layer::SubscriberExt;

	let filter = EnvFilter::from_str(config.rust_log.as_deref().unwrap_or(DEFAULT_LOG_FILTER))?;

	tracing_subscriber::registry()
		.with(if config.log_json {
			Box::new(
				tracing_subscriber::fmt::layer()
					.fmt_fields(JsonFields::default())
					.event_format(tracing_subscriber::fmt::format().json().flatten_event(true).with_span_list(false))
					.with_filter(filter),
			) as Box<dyn Layer<_> + Send + Sync>
		} else {
			Box::new(
				tracing_subscriber::fmt::layer()
					.event_format(tracing_subscriber::fmt::format().pretty())
					.with_filter(filter),
			)
		})
		.try_init()?;

	Ok(())
}
