//! Table and JSON output formatting for CLI commands.

use serde::Serialize;
use tabled::{Table, Tabled};

use plughub_runtime::manager::PluginStatus;

/// Output format selection
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable table
    #[default]
    Table,
    /// JSON output
    Json,
}

/// Plugin display row
#[derive(Debug, Serialize, Tabled)]
pub struct PluginRow {
    /// Plugin name
    name: String,
    /// Version
    version: String,
    /// Derived state
    state: String,
    /// Declared dependencies
    depends_on: String,
    /// Installed at
    installed_at: String,
}

impl From<&PluginStatus> for PluginRow {
    fn from(status: &PluginStatus) -> Self {
        Self {
            name: status.name.clone(),
            version: status.version.clone(),
            state: status.state.to_string(),
            depends_on: status.dependencies.join(", "),
            installed_at: status
                .installed_at
                .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
                .unwrap_or_default(),
        }
    }
}

/// Print the plugin list in the selected format
pub fn print_plugins(plugins: &[PluginStatus], format: OutputFormat) {
    match format {
        OutputFormat::Table => {
            let rows: Vec<PluginRow> = plugins.iter().map(PluginRow::from).collect();
            print_list(&rows, format);
        }
        OutputFormat::Json => print_json(plugins, "[]"),
    }
}

/// Print a list of items in the selected format
pub fn print_list<T: Serialize + Tabled>(items: &[T], format: OutputFormat) {
    match format {
        OutputFormat::Table => {
            if items.is_empty() {
                println!("No plugins installed.");
            } else {
                println!("{}", Table::new(items));
            }
        }
        OutputFormat::Json => print_json(items, "[]"),
    }
}

fn print_json<T: Serialize + ?Sized>(item: &T, fallback: &str) {
    let json = serde_json::to_string_pretty(item).unwrap_or_else(|_| fallback.to_string());
    println!("{}", json);
}

/// Print a success message
pub fn print_success(msg: &str) {
    println!("✓ {}", msg);
}

/// Print a warning message
pub fn print_warning(msg: &str) {
    println!("⚠ {}", msg);
}

/// Print an error message
pub fn print_error(msg: &str) {
    eprintln!("✗ {}", msg);
}
