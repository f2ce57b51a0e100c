use clap::{Parser, Subcommand};
use loupe_adapter_mongo::MongoStore;
use loupe_core::{LoupeConfig, Transport};
use loupe_mcp::{builtin_tools, McpServer};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "loupe", version, about = "Loupe: read-only MCP server for document databases")]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the MCP server.
    Serve {
        /// Path to the configuration file.
        #[arg(long, default_value = "loupe.yaml")]
        config: PathBuf,

        /// Transport to use: stdio or http. Overrides the config file.
        #[arg(long)]
        transport: Option<String>,

        /// Connection string, e.g. mongodb://localhost:27017. Overrides the
        /// config file and MONGODB_URI.
        #[arg(long)]
        url: Option<String>,

        /// Default database for calls that do not name one.
        #[arg(long)]
        database: Option<String>,

        /// Port for the HTTP transport.
        #[arg(long)]
        port: Option<u16>,
    },

    /// Print the tool catalog as JSON and exit.
    Tools,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logs go to stderr: stdout carries the JSON-RPC stream on stdio.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.cmd {
        Command::Serve {
            config,
            transport,
            url,
            database,
            port,
        } => run_serve(config, transport, url, database, port).await?,

        Command::Tools => {
            let catalog = builtin_tools();
            println!("{}", serde_json::to_string_pretty(&catalog)?);
        }
    }

    Ok(())
}

async fn run_serve(
    config_path: PathBuf,
    transport: Option<String>,
    url: Option<String>,
    database: Option<String>,
    port: Option<u16>,
) -> anyhow::Result<()> {
    let mut config = if config_path.exists() {
        tracing::info!(path = %config_path.display(), "Loading configuration");
        LoupeConfig::from_file(&config_path)?
    } else {
        LoupeConfig::default()
    };
    config.apply_env();

    // Flags override both the file and the environment.
    if let Some(transport) = transport {
        config.mcp.transport = match transport.as_str() {
            "stdio" => Transport::Stdio,
            "http" => Transport::Http,
            other => anyhow::bail!("unknown transport '{}': expected 'stdio' or 'http'", other),
        };
    }
    if let Some(url) = url {
        config.store.url = url;
    }
    if let Some(database) = database {
        config.store.default_database = Some(database);
    }
    if let Some(port) = port {
        config.mcp.port = port;
    }

    let store = Arc::new(MongoStore::new(&config.store));
    let server = McpServer::new(config, store);

    server.run().await?;
    Ok(())
}
