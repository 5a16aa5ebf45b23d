//! Main entry point for the launch guard service.
//!
//! Loads configuration, wires storage and the optional off-chain authorizer
//! into an [`AuthorizationVerifier`], and serves the query and issuance API.
//! Guard change notifications are logged for as long as the process runs.

use clap::Parser;
use launch_account::AuthorizerService;
use launch_config::Config;
use launch_guard::{AuthorizationVerifier, GuardBuilder, GuardFactories};
use launch_storage::implementations::file::create_storage as create_file_storage;
use launch_storage::implementations::memory::create_storage as create_memory_storage;
use launch_types::GuardEvent;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast::error::RecvError;

mod apis;
mod server;

/// Command-line arguments for the guard service.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
	/// Path to configuration file
	#[arg(short, long, default_value = "config.toml")]
	config: PathBuf,

	/// Log level (trace, debug, info, warn, error)
	#[arg(short, long, default_value = "info")]
	log_level: String,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
	let args = Args::parse();

	use tracing_subscriber::{fmt, EnvFilter};

	let env_filter =
		EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));

	fmt()
		.with_env_filter(env_filter)
		.with_thread_ids(true)
		.with_target(true)
		.init();

	tracing::info!("Started guard");

	let config = Config::from_file(&args.config).await?;
	tracing::info!("Loaded configuration [{}]", config.guard.id);

	let guard = Arc::new(build_guard(config.clone()).await?);
	let authorizer = build_authorizer(&config)?.map(Arc::new);
	if let Some(authorizer) = &authorizer {
		tracing::info!(address = %authorizer.address().await?, "Authorizer loaded");
	}

	let observer = tokio::spawn(observe_events(Arc::clone(&guard)));

	match config.api.clone().filter(|api| api.enabled) {
		Some(api_config) => {
			let state = server::AppState {
				guard: Arc::clone(&guard),
				authorizer,
			};
			tokio::select! {
				result = server::start_server(api_config, state) => {
					tracing::info!("API server finished");
					result?;
				}
				_ = tokio::signal::ctrl_c() => {
					tracing::info!("Received shutdown signal");
				}
			}
		},
		None => {
			tracing::info!("API disabled, watching guard events only");
			tokio::signal::ctrl_c().await?;
		},
	}

	observer.abort();
	tracing::info!("Stopped guard");
	Ok(())
}

/// Macro to create a factory HashMap with the appropriate type aliases
macro_rules! create_factory_map {
    ($interface:path, $error:path, $( $name:literal => $factory:expr ),* $(,)?) => {{
        let mut factories = std::collections::HashMap::new();
        $(
            factories.insert(
                $name.to_string(),
                $factory as fn(&toml::Value) -> Result<Box<dyn $interface>, $error>
            );
        )*
        factories
    }};
}

/// Builds the verifier with the configured storage backend.
async fn build_guard(config: Config) -> Result<AuthorizationVerifier, Box<dyn std::error::Error>> {
	let storage_factories = create_factory_map!(
		launch_storage::StorageInterface,
		launch_storage::StorageError,
		"file" => create_file_storage,
		"memory" => create_memory_storage,
	);

	let factories = GuardFactories { storage_factories };
	Ok(GuardBuilder::new(config).build(factories).await?)
}

/// Creates the primary authorizer, if this node issues tokens.
fn build_authorizer(
	config: &Config,
) -> Result<Option<AuthorizerService>, Box<dyn std::error::Error>> {
	let Some(authorizer_config) = &config.authorizer else {
		return Ok(None);
	};

	let primary = &authorizer_config.primary;
	let factory = launch_account::get_all_implementations()
		.into_iter()
		.find_map(|(name, factory)| (name == primary.as_str()).then_some(factory))
		.ok_or_else(|| format!("Unknown authorizer implementation '{}'", primary))?;
	let implementation_config = authorizer_config
		.implementations
		.get(primary)
		.ok_or_else(|| format!("Authorizer implementation '{}' is not configured", primary))?;

	let implementation = factory(implementation_config)?;
	Ok(Some(AuthorizerService::new(
		implementation,
		Duration::from_secs(authorizer_config.validity_seconds),
	)))
}

/// Logs guard change notifications until the bus closes.
async fn observe_events(guard: Arc<AuthorizationVerifier>) {
	let mut events = guard.event_bus().subscribe();
	loop {
		match events.recv().await {
			Ok(event) => log_event(&event),
			Err(RecvError::Lagged(skipped)) => {
				tracing::warn!(skipped, "Event observer lagged");
			},
			Err(RecvError::Closed) => break,
		}
	}
}

fn log_event(event: &GuardEvent) {
	match event {
		GuardEvent::TrustedSignerAdded { signer } => {
			tracing::info!(%signer, "event: trusted signer added")
		},
		GuardEvent::TrustedSignerRemoved { signer } => {
			tracing::info!(%signer, "event: trusted signer removed")
		},
		GuardEvent::MarketSignerSet { market, signer } => {
			tracing::info!(%market, signer = ?signer, "event: market signer set")
		},
		GuardEvent::CapConfigSet { market, config } => {
			tracing::info!(%market, enabled = config.enabled, "event: cap config set")
		},
		GuardEvent::PurchaseRecorded {
			market,
			account,
			amount,
			total,
		} => {
			tracing::debug!(%market, %account, %amount, %total, "event: purchase recorded")
		},
		GuardEvent::AuthorizationConsumed {
			fingerprint,
			origin,
		} => {
			tracing::debug!(%fingerprint, %origin, "event: authorization consumed")
		},
	}
}
