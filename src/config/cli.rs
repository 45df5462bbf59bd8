use crate::config::toml_config::ResolverConfig;
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Debug, Clone, Parser)]
#[command(name = "coord-resolver")]
#[command(about = "Resolve Web4 coordinates and simulate coordinate walks")]
pub struct CliConfig {
    /// Path to TOML configuration file (defaults to ./coord-resolver.toml when present)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Override the ledger API base URL
    #[arg(long, global = true)]
    pub api_base: Option<String>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    pub log_json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Resolve a single coordinate into its knowledge tree
    Resolve(ResolveArgs),
    /// Simulate a coordinate walk starting from a coordinate
    Walk(WalkArgs),
    /// Start the web dashboard
    Serve(ServeArgs),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Debug, Clone, Args)]
pub struct ResolveArgs {
    /// Web4 coordinate, e.g. EV-Demo-Session-123
    pub coordinate: String,

    /// Output format
    #[arg(long, value_enum, default_value = "text")]
    pub format: OutputFormat,

    /// Also print the raw ledger JSON
    #[arg(long)]
    pub raw: bool,
}

#[derive(Debug, Clone, Args)]
pub struct WalkArgs {
    /// Start coordinate, e.g. EV-882
    pub start: String,

    /// Number of hops (1-10); defaults to walk.max_hops
    #[arg(long)]
    pub hops: Option<u32>,

    /// Hide hop numbers on graph nodes
    #[arg(long)]
    pub no_hop_numbers: bool,

    /// Hide the walk inspection table
    #[arg(long)]
    pub no_inspection: bool,

    /// Print the Graphviz DOT source
    #[arg(long)]
    pub dot: bool,

    /// Also print the raw walk JSON
    #[arg(long)]
    pub raw: bool,

    /// Write walk.dot, inspection.csv and walk.json into this directory
    #[arg(long)]
    pub output_dir: Option<String>,

    /// Output format
    #[arg(long, value_enum, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Debug, Clone, Args)]
pub struct ServeArgs {
    /// Port to listen on; defaults to server.port
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Open the dashboard in the default browser
    #[arg(long)]
    pub open: bool,
}

impl CliConfig {
    /// 命令列參數覆蓋 TOML 設定
    pub fn apply_overrides(&self, config: &mut ResolverConfig) {
        if let Some(api_base) = &self.api_base {
            tracing::info!("🔧 API base overridden to: {}", api_base);
            config.api.base_url = api_base.clone();
        }

        match &self.command {
            Command::Walk(args) => {
                if let Some(hops) = args.hops {
                    config.walk.max_hops = hops;
                }
                if args.no_hop_numbers {
                    config.walk.show_hop_numbers = false;
                }
                if args.no_inspection {
                    config.walk.show_inspection = false;
                }
            }
            Command::Serve(args) => {
                if let Some(port) = args.port {
                    config.server.port = port;
                }
            }
            Command::Resolve(_) => {}
        }
    }
}
