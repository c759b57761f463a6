use clap::Parser;
use jockmkt::cli::{self, Cli, Commands};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();

    match &cli.command {
        Commands::Stream(args) => cli::stream::execute(&cli, args).await?,
        Commands::Topics => cli::topics::execute(),
    }
    Ok(())
}
