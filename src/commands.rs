//! CLI command definitions and dispatch.

use std::path::Path;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use serde_json::{Map, Value};

use plughub_core::config::AppConfig;
use plughub_core::error::{AppError, ErrorKind};
use plughub_core::traits::PluginStore;
use plughub_database::migration::run_migrations;
use plughub_database::{DatabasePool, PgPluginStore};
use plughub_runtime::loader::PluginSource;
use plughub_runtime::registry::dependency_order;
use plughub_runtime::{MemoryPluginStore, PluginLoader, PluginManager};

use crate::output::{self, OutputFormat};

/// PlugHub — plugin runtime host
#[derive(Debug, Parser)]
#[command(name = "plughub", version, about, long_about = None)]
pub struct Cli {
    /// Directory holding `default.toml` and environment overlays
    #[arg(long, default_value = "config", env = "PLUGHUB_CONFIG_DIR")]
    pub config_dir: String,

    /// Environment overlay to apply (`{config_dir}/{env}.toml`)
    #[arg(long, default_value = "development", env = "PLUGHUB_ENV")]
    pub env: String,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Restore plugin state and run until interrupted
    Serve {
        /// Activate every installed plugin after startup
        #[arg(long)]
        activate_all: bool,
    },
    /// List installed plugins
    List,
    /// Install a plugin from a location
    Install {
        /// Plugin location (file, directory, or embedded id)
        location: String,
        /// Initial config as a JSON object
        #[arg(long)]
        config: Option<String>,
        /// Activate right after installing
        #[arg(long)]
        activate: bool,
    },
    /// Activate an installed plugin and its dependencies
    Activate {
        /// Plugin name
        name: String,
    },
    /// Deactivate an active plugin
    Deactivate {
        /// Plugin name
        name: String,
    },
    /// Uninstall a plugin
    Uninstall {
        /// Plugin name
        name: String,
    },
}

/// Everything a command needs.
struct Runtime {
    manager: PluginManager,
    loader: PluginLoader,
    pool: Option<DatabasePool>,
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(&self, config: AppConfig) -> Result<(), AppError> {
        let runtime = build_runtime(&config).await?;

        let result = match &self.command {
            Commands::Serve { activate_all } => serve(&runtime, *activate_all).await,
            Commands::List => {
                output::print_plugins(&runtime.manager.list().await, self.format);
                Ok(())
            }
            Commands::Install {
                location,
                config,
                activate,
            } => install(&runtime, location, config.as_deref(), *activate).await,
            Commands::Activate { name } => runtime.manager.activate(name).await.map(|()| {
                output::print_success(&format!("Plugin '{name}' activated"));
            }),
            Commands::Deactivate { name } => runtime.manager.deactivate(name).await.map(|()| {
                output::print_success(&format!("Plugin '{name}' deactivated"));
            }),
            Commands::Uninstall { name } => runtime.manager.uninstall(name).await.map(|()| {
                output::print_success(&format!("Plugin '{name}' uninstalled"));
            }),
        };

        if let Some(pool) = &runtime.pool {
            pool.close().await;
        }
        result
    }
}

/// Connects the store, loads plugin candidates and restores durable state.
async fn build_runtime(config: &AppConfig) -> Result<Runtime, AppError> {
    tracing::info!("Starting PlugHub v{}", env!("CARGO_PKG_VERSION"));

    let (store, pool): (Arc<dyn PluginStore>, Option<DatabasePool>) = match &config.database.url {
        Some(_) => {
            let pool = DatabasePool::connect(&config.database).await?;
            if !pool.health_check().await? {
                return Err(AppError::new(
                    ErrorKind::Database,
                    "Database health check returned an unexpected result",
                ));
            }
            run_migrations(pool.pool()).await?;
            (Arc::new(PgPluginStore::new(pool.pool().clone())), Some(pool))
        }
        None => {
            tracing::warn!("No database configured, plugin state is kept in memory only");
            (Arc::new(MemoryPluginStore::new()), None)
        }
    };

    let manager = PluginManager::new(store, &config.runtime);
    let loader = PluginLoader::new(plugin_source());

    if config.runtime.auto_load {
        loader
            .load_directory(Path::new(&config.runtime.plugin_directory))
            .await?;
    }

    let report = manager.reconcile(&loader).await?;
    for name in &report.orphaned {
        tracing::warn!(plugin = %name, "Installed plugin is missing from the plugin directory");
    }

    Ok(Runtime {
        manager,
        loader,
        pool,
    })
}

#[cfg(feature = "dynamic")]
fn plugin_source() -> Arc<dyn PluginSource> {
    Arc::new(plughub_runtime::loader::DynamicPluginSource::new())
}

#[cfg(not(feature = "dynamic"))]
fn plugin_source() -> Arc<dyn PluginSource> {
    Arc::new(plughub_runtime::loader::DescriptorPluginSource::new())
}

async fn serve(runtime: &Runtime, activate_all: bool) -> Result<(), AppError> {
    let manager = &runtime.manager;

    // Install discovered plugins that are not installed yet
    let mut discovered = Vec::new();
    for loaded in runtime.loader.loaded().await {
        if !manager.is_installed(&loaded.plugin.name).await {
            discovered.push(loaded.plugin);
        }
    }
    for plugin in dependency_order(discovered) {
        let name = plugin.name.clone();
        if let Err(e) = manager.install(plugin, None).await {
            tracing::error!(plugin = %name, error = %e, "Failed to install discovered plugin");
        }
    }

    if activate_all {
        for status in manager.list().await {
            if let Err(e) = manager.activate(&status.name).await {
                tracing::error!(plugin = %status.name, error = %e, "Failed to activate plugin");
            }
        }
    }

    tracing::info!(
        plugins = manager.list().await.len(),
        routes = manager.active_routes().await.len(),
        admin_pages = manager.active_admin_pages().await.len(),
        "PlugHub ready"
    );

    shutdown_signal().await;
    tracing::info!("Shutdown signal received, deactivating plugins...");

    manager.deactivate_all().await;
    tracing::info!("PlugHub stopped");
    Ok(())
}

async fn install(
    runtime: &Runtime,
    location: &str,
    config: Option<&str>,
    activate: bool,
) -> Result<(), AppError> {
    let config = config.map(parse_config).transpose()?;
    let loaded = runtime.loader.load(location).await?;
    let name = loaded.plugin.name.clone();

    runtime.manager.install(loaded.plugin, config).await?;
    output::print_success(&format!("Plugin '{name}' installed"));

    if activate {
        runtime.manager.activate(&name).await?;
        output::print_success(&format!("Plugin '{name}' activated"));
    }

    if runtime.pool.is_none() {
        output::print_warning("No database configured, this change is not persisted");
    }
    Ok(())
}

fn parse_config(raw: &str) -> Result<Map<String, Value>, AppError> {
    match serde_json::from_str::<Value>(raw)? {
        Value::Object(map) => Ok(map),
        _ => Err(AppError::validation("Plugin config must be a JSON object")),
    }
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
