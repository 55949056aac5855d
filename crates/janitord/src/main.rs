// # janitord - DNS Janitor Daemon
//
// Thin startup layer: everything about building plugins lives in
// janitor-core and janitor-gcp.
//
// The daemon is responsible for:
// 1. Reading configuration from environment variables
// 2. Resolving the Pub/Sub emulator signal once
// 3. Building the Publisher, Reconciler and Authority plugins
// 4. Releasing the Authority session on shutdown
//
// ## Configuration
//
// - `JANITOR_KEYFILE`: Service account JSON keyfile (all plugins)
// - `JANITOR_PROJECT`: GCP project for Pub/Sub and Cloud DNS
// - `JANITOR_TOPIC`: Pub/Sub topic, bare or fully qualified
// - `JANITOR_DNS_ZONE`: Absolute DNS zone, e.g. `example.com.`
// - `JANITOR_CLEANUP_TIMEOUT`: Cleanup timeout in seconds (default 60)
// - `JANITOR_LOG_LEVEL`: trace, debug, info, warn, error (default info)
// - `PUBSUB_EMULATOR_HOST`: Use a local Pub/Sub emulator when set
//
// ## Example
//
// ```bash
// export JANITOR_KEYFILE=/etc/janitor/keyfile.json
// export JANITOR_PROJECT=dns-project
// export JANITOR_TOPIC=janitor-changes
// export JANITOR_DNS_ZONE=example.com.
//
// janitord
// ```

use anyhow::Result;
use janitor_core::channel::{Channel, ChannelRef};
use janitor_core::config::{ClientOptions, PluginConfig};
use janitor_core::plugins::{Plugin, get_authority, get_publisher, get_reconciler};
use janitor_gcp::GcpClientFactory;
use std::env;
use std::process::ExitCode;
use tracing::{Level, error, info};
use tracing_subscriber::FmtSubscriber;

#[cfg(unix)]
use tokio::signal::unix::{SignalKind, signal};

/// Exit codes for different termination scenarios
///
/// These codes follow systemd conventions:
/// - 0: Clean shutdown
/// - 1: Configuration or startup error
/// - 2: Runtime error (unexpected)
#[derive(Debug, Clone, Copy)]
enum JanitorExitCode {
    /// Clean shutdown (normal exit)
    CleanShutdown = 0,
    /// A plugin could not be configured
    ConfigError = 1,
    /// Remote bootstrap or runtime failure
    RuntimeError = 2,
}

impl From<JanitorExitCode> for ExitCode {
    fn from(code: JanitorExitCode) -> Self {
        ExitCode::from(code as u8)
    }
}

/// Daemon configuration
struct Config {
    keyfile: Option<String>,
    project: Option<String>,
    topic: Option<String>,
    dns_zone: Option<String>,
    cleanup_timeout: Option<String>,
    log_level: String,
}

impl Config {
    /// Load configuration from environment variables
    fn from_env() -> Self {
        Self {
            keyfile: env::var("JANITOR_KEYFILE").ok(),
            project: env::var("JANITOR_PROJECT").ok(),
            topic: env::var("JANITOR_TOPIC").ok(),
            dns_zone: env::var("JANITOR_DNS_ZONE").ok(),
            cleanup_timeout: env::var("JANITOR_CLEANUP_TIMEOUT").ok(),
            log_level: env::var("JANITOR_LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
        }
    }

    /// Parse the log level
    fn log_level(&self) -> Result<Level> {
        match self.log_level.to_lowercase().as_str() {
            "trace" => Ok(Level::TRACE),
            "debug" => Ok(Level::DEBUG),
            "info" => Ok(Level::INFO),
            "warn" => Ok(Level::WARN),
            "error" => Ok(Level::ERROR),
            other => anyhow::bail!(
                "JANITOR_LOG_LEVEL '{}' is not valid. \
                Valid levels: trace, debug, info, warn, error",
                other
            ),
        }
    }

    /// Plugin configuration holding `keys` that are set
    ///
    /// Unset keys are left out so the builders report them.
    fn plugin_config(&self, keys: &[(&str, &Option<String>)]) -> PluginConfig {
        keys.iter()
            .filter_map(|&(key, value)| value.as_ref().map(|v| (key, v.clone())))
            .chain(
                self.cleanup_timeout
                    .as_ref()
                    .map(|v| ("cleanup_timeout", v.clone())),
            )
            .collect()
    }

    fn publisher(&self) -> PluginConfig {
        self.plugin_config(&[
            ("keyfile", &self.keyfile),
            ("project", &self.project),
            ("topic", &self.topic),
        ])
    }

    fn reconciler(&self) -> PluginConfig {
        self.plugin_config(&[("keyfile", &self.keyfile), ("project", &self.project)])
    }

    fn authority(&self) -> PluginConfig {
        self.plugin_config(&[("keyfile", &self.keyfile), ("dns_zone", &self.dns_zone)])
    }
}

fn main() -> ExitCode {
    let config = Config::from_env();

    let log_level = match config.log_level() {
        Ok(level) => level,
        Err(e) => {
            eprintln!("Configuration validation error: {}", e);
            return JanitorExitCode::ConfigError.into();
        }
    };

    let subscriber = FmtSubscriber::builder().with_max_level(log_level).finish();
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
        return JanitorExitCode::ConfigError.into();
    }

    info!("Starting janitord");

    let rt = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to create tokio runtime: {}", e);
            return JanitorExitCode::RuntimeError.into();
        }
    };

    rt.block_on(run_daemon(config)).into()
}

/// Build the plugins and wait for shutdown
async fn run_daemon(config: Config) -> JanitorExitCode {
    // Builders already logged any error they return.
    let exit_code = |e: &janitor_core::Error| {
        if e.is_config() {
            JanitorExitCode::ConfigError
        } else {
            JanitorExitCode::RuntimeError
        }
    };

    let options = ClientOptions::from_env();
    if options.is_emulated() {
        info!("Pub/Sub emulator mode enabled");
    }
    let factory = GcpClientFactory::new(options);

    let rrset_channel: ChannelRef = Channel::shared();
    let changes_channel: ChannelRef = Channel::shared();

    let publisher = match get_publisher(&config.publisher(), changes_channel.clone(), &factory).await
    {
        Ok(plugin) => plugin,
        Err(e) => return exit_code(&e),
    };
    let reconciler = match get_reconciler(
        &config.reconciler(),
        rrset_channel.clone(),
        changes_channel.clone(),
        &factory,
    ) {
        Ok(plugin) => plugin,
        Err(e) => return exit_code(&e),
    };
    let authority = match get_authority(&config.authority(), rrset_channel.clone(), &factory) {
        Ok(plugin) => plugin,
        Err(e) => return exit_code(&e),
    };

    info!(topic = %publisher.topic(), "Publisher ready");
    info!(cleanup_timeout = ?reconciler.cleanup_timeout(), "Reconciler ready");
    info!(dns_zone = %authority.dns_zone(), "Authority ready");

    let result = wait_for_shutdown().await;
    authority.close().await;

    match result {
        Ok(signal) => {
            info!("Received shutdown signal: {}", signal);
            JanitorExitCode::CleanShutdown
        }
        Err(e) => {
            error!("Shutdown error: {}", e);
            JanitorExitCode::RuntimeError
        }
    }
}

/// Wait for shutdown signals (SIGTERM, SIGINT)
#[cfg(unix)]
async fn wait_for_shutdown() -> Result<&'static str> {
    let mut sigterm = signal(SignalKind::terminate())
        .map_err(|e| anyhow::anyhow!("Failed to setup SIGTERM handler: {}", e))?;
    let mut sigint = signal(SignalKind::interrupt())
        .map_err(|e| anyhow::anyhow!("Failed to setup SIGINT handler: {}", e))?;

    Ok(tokio::select! {
        _ = sigterm.recv() => "SIGTERM",
        _ = sigint.recv() => "SIGINT",
    })
}

/// Wait for shutdown signals (SIGINT only)
///
/// Fallback implementation for non-Unix platforms.
#[cfg(not(unix))]
async fn wait_for_shutdown() -> Result<&'static str> {
    tokio::signal::ctrl_c()
        .await
        .map_err(|e| anyhow::anyhow!("Failed to wait for CTRL-C: {}", e))?;
    Ok("SIGINT")
}
