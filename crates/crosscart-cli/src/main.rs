use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "crosscart")]
#[command(about = "CrossCart command line interface")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Analyze a product URL and compare its price across marketplaces.
    Analyze {
        /// Amazon.in or Flipkart.com product URL (short links work too).
        url: String,
        /// Pretty-print the JSON result.
        #[arg(long)]
        pretty: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Analyze { url, pretty } => {
            let config = crosscart_core::load_app_config_from_env()?;
            let analyzer = crosscart_scraper::Analyzer::from_config(&config)?;
            let response = analyzer.analyze(&url).await?;
            tracing::info!(
                source = %response.source_platform,
                cheapest = ?response.comparison.cheapest_platform,
                "analysis finished"
            );

            let json = if pretty {
                serde_json::to_string_pretty(&response)?
            } else {
                serde_json::to_string(&response)?
            };
            println!("{json}");
        }
    }

    Ok(())
}
