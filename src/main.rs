mod cli;
mod color;
mod config;
mod providers;
mod registry;
mod utils;

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use cli::{list::list_cmd, refresh::refresh_cmd, resolve::resolve_cmd, ColorMode};
use tracing_subscriber::EnvFilter;

#[derive(
    Parser, Default, Clone, Copy, ValueEnum, strum_macros::Display, strum_macros::EnumString,
)]
#[strum(serialize_all = "lowercase")]
pub(crate) enum RequestedColorMode {
    #[default]
    Auto,
    On,
    Off,
}

#[derive(Parser)]
#[command(name = "modelboard")]
#[command(
    about = "A live catalog of chat models across providers",
    version = "0.0.1"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
    #[arg(long, default_value_t = RequestedColorMode::default())]
    color: RequestedColorMode,
    /// Read the configuration from the specified file
    #[arg(long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// List catalogued models or providers
    List(ListArgs),
    /// Resolve a model reference to a callable model
    Resolve(ResolveArgs),
    /// Fetch the providers' live model listings
    Refresh(RefreshArgs),
}

/// Possible listings
#[derive(Subcommand)]
pub(crate) enum ListObject {
    /// Catalogued models
    Models(ListModelArgs),
    /// Providers
    Providers,
}

/// Output formats
#[derive(
    Parser, ValueEnum, Default, Clone, Copy, strum_macros::Display, strum_macros::EnumString,
)]
#[strum(serialize_all = "snake_case")]
pub(crate) enum ListingFormat {
    /// Format the output as a table
    #[default]
    Table,
    /// Format the output as JSON
    Json,
    /// Format the output as a table without a header
    HeaderlessTable,
}

#[derive(Parser)]
pub(crate) struct ListArgs {
    /// Output the listing with the specified format
    #[arg(short, long, default_value_t = ListingFormat::default())]
    format: ListingFormat,
    /// List the specified object
    #[command(subcommand)]
    object: ListObject,
}

#[derive(Parser, Default)]
pub(crate) struct ListModelArgs {
    /// Limit listing to the specified provider
    #[arg(short, long)]
    provider: Option<String>,
    /// List the catalog without refreshing it from the providers
    #[arg(long)]
    offline: bool,
}

#[derive(Parser, Default)]
pub(crate) struct ResolveArgs {
    /// The model as <provider>/<model>; the fallback model when omitted
    model: Option<String>,
    /// Output the result with the specified format
    #[arg(short, long, default_value_t = ListingFormat::default())]
    format: ListingFormat,
}

#[derive(Parser, Default)]
pub(crate) struct RefreshArgs {
    /// Refresh even if the catalog was refreshed recently
    #[arg(long)]
    force: bool,
    /// Output the report with the specified format
    #[arg(short, long, default_value_t = ListingFormat::default())]
    format: ListingFormat,
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let color = ColorMode::resolve_auto(cli.color);
    color::configure_color(color);

    init_tracing();

    let config = config::read_config(cli.config);

    match &cli.command {
        Commands::List(args) => list_cmd(&config, args).await,
        Commands::Resolve(args) => resolve_cmd(&config, args),
        Commands::Refresh(args) => refresh_cmd(&config, args).await,
    }
}
