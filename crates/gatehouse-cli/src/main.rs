use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod bootstrap;
mod console;

#[derive(Parser)]
#[command(name = "gatehouse")]
#[command(about = "Gatehouse - residential smart gate access console", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the interactive console
    Run {
        /// Use the built-in demo backend instead of the hosted service
        #[arg(long)]
        demo: bool,
    },
    /// Print the resolved configuration file path
    Config,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr so the console prompt stays clean.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run { demo } => {
            let services = bootstrap::build(demo)?;
            console::run(services).await?;
        }
        Commands::Config => {
            let service = gatehouse_infrastructure::ConfigService::new()?;
            println!("{}", service.path().display());
        }
    }

    Ok(())
}
