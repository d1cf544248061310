use anyhow::Context;
use clap::{Parser, Subcommand};

use bib_kernel::settings::Settings;

/// Command-line entrypoint for the bib catalogue service
#[derive(Debug, Parser)]
#[command(name = "bib", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run the HTTP server
    Serve {
        /// Override `server.host`
        #[arg(long)]
        host: Option<String>,
        /// Override `server.port`
        #[arg(long)]
        port: Option<u16>,
        /// Start with an empty catalogue instead of the demo records
        #[arg(long)]
        no_seed: bool,
    },
    /// Print the OpenAPI document as JSON
    Openapi,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let mut settings = Settings::load().with_context(|| "failed to load bib settings")?;

    match cli.command {
        Command::Serve {
            host,
            port,
            no_seed,
        } => {
            if let Some(host) = host {
                settings.server.host = host;
            }
            if let Some(port) = port {
                settings.server.port = port;
            }
            if no_seed {
                settings.books.seed = false;
            }

            bib_telemetry::init(&settings)?;
            tracing::info!(env = settings.environment.as_str(), "bib serve");

            let runtime = tokio::runtime::Runtime::new().context("failed to start tokio runtime")?;
            runtime.block_on(bib_app::run(settings))
        }
        Command::Openapi => {
            let registry = bib_app::build_registry(&settings);
            let document = bib_http::router::openapi_document(&registry);
            println!(
                "{}",
                serde_json::to_string_pretty(&document).context("failed to render OpenAPI document")?
            );
            Ok(())
        }
    }
}
