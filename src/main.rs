//! Buildbeacon CLI entry point.

use clap::Parser;

use buildbeacon::cli::{commands, Cli, Commands};
use buildbeacon::domain::models::LoggingConfig;
use buildbeacon::infrastructure::config::ConfigLoader;
use buildbeacon::infrastructure::logging::LoggerImpl;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let logging = match ConfigLoader::load_from_file(&cli.config) {
        Ok(config) => config.logging,
        Err(err) => {
            let _logger = LoggerImpl::init(&LoggingConfig::default());
            buildbeacon::cli::handle_error(err.into(), cli.json);
        }
    };
    let _logger = match LoggerImpl::init(&logging) {
        Ok(logger) => logger,
        Err(err) => buildbeacon::cli::handle_error(err, cli.json),
    };

    let result = match cli.command {
        Commands::Run(args) => commands::run::execute(args, &cli.config, cli.json).await,
        Commands::Tick(args) => commands::tick::execute(args, &cli.config, cli.json).await,
        Commands::Jobs(args) => commands::jobs::execute(args, &cli.config, cli.json).await,
        Commands::Validate => commands::validate::execute(&cli.config, cli.json),
    };

    if let Err(err) = result {
        buildbeacon::cli::handle_error(err, cli.json);
    }
}
