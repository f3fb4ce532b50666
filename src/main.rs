//! toolbox-mcp server — entry point.

use std::sync::Arc;

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;

use toolbox_mcp::config::resolve_port;
use toolbox_mcp::protocol::ProtocolHandler;
use toolbox_mcp::store::MemoryStore;
use toolbox_mcp::tools::ToolRegistry;
use toolbox_mcp::transport::{SseTransport, StdioTransport};

#[derive(Parser)]
#[command(
    name = "toolbox-mcp",
    about = "MCP server exposing clock, calculator, and shared-memory tools",
    version
)]
struct Cli {
    /// Log level (trace, debug, info, warn, error).
    #[arg(long, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the MCP server over HTTP/SSE (default).
    Serve {
        /// Listen port. Falls back to the PORT env var, then 8000.
        #[arg(short, long)]
        port: Option<u16>,

        /// Listen host.
        #[arg(long, default_value = "0.0.0.0")]
        host: String,
    },

    /// Start the MCP server over stdio.
    ServeStdio,

    /// Print server capabilities and the tool catalog as JSON.
    Info,

    /// Generate shell completion scripts.
    Completions {
        /// Shell type (bash, zsh, fish, powershell, elvish).
        shell: Shell,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&cli.log_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command.unwrap_or(Commands::Serve {
        port: None,
        host: "0.0.0.0".to_string(),
    }) {
        Commands::Serve { port, host } => {
            let port = resolve_port(port);
            let addr = format!("{host}:{port}");

            let store = Arc::new(MemoryStore::new());
            let tools = Arc::new(ToolRegistry::new());
            tracing::info!("toolbox-mcp server, {} tools registered", tools.list().len());

            let transport = SseTransport::new(store, tools);
            transport.run(&addr).await?;
        }

        Commands::ServeStdio => {
            let store = Arc::new(MemoryStore::new());
            let tools = Arc::new(ToolRegistry::new());
            let handler = ProtocolHandler::new(store, tools);
            let transport = StdioTransport::new(handler);
            transport.run().await?;
        }

        Commands::Info => {
            let capabilities = toolbox_mcp::types::InitializeResult::default_result();
            let tools = ToolRegistry::new().list();
            let info = serde_json::json!({
                "server": capabilities.server_info,
                "protocol_version": capabilities.protocol_version,
                "capabilities": capabilities.capabilities,
                "tools": tools.iter().map(|t| &t.name).collect::<Vec<_>>(),
                "tool_count": tools.len(),
            });
            println!("{}", serde_json::to_string_pretty(&info)?);
        }

        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            clap_complete::generate(shell, &mut cmd, "toolbox-mcp", &mut std::io::stdout());
        }
    }

    Ok(())
}
