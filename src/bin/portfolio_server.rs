use anyhow::Context;
use clap::Parser;
use portfolio_pipeline::app::routes::{router, AppState};
use portfolio_pipeline::domain::ports::ConfigProvider;
use portfolio_pipeline::utils::{logger, validation::Validate};
use portfolio_pipeline::{
    GitHubClient, NotificationDispatcher, ProjectAggregator, SmtpRelay, TomlConfig,
};
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "portfolio-server")]
#[command(about = "Serve the portfolio contact and project endpoints")]
struct Args {
    /// Path to TOML configuration file
    #[arg(short, long, default_value = "portfolio.toml")]
    config: String,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Validate configuration and exit without binding
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    logger::init_server_logger(args.verbose);

    tracing::info!("🚀 Starting portfolio server");
    tracing::info!("📁 Loading configuration from: {}", args.config);

    let config = TomlConfig::from_file(&args.config)
        .with_context(|| format!("failed to load config file '{}'", args.config))?;

    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        return Err(e.into());
    }

    display_config_summary(&config);

    if args.dry_run {
        tracing::info!("🔍 DRY RUN MODE - configuration is valid, not binding");
        return Ok(());
    }

    let client = GitHubClient::from_config(&config)?;
    let aggregator = ProjectAggregator::from_config(client.clone(), client, &config);
    let dispatcher = NotificationDispatcher::new(
        SmtpRelay::from_config(&config.mail),
        config.mail.clone(),
    );

    let state = Arc::new(AppState {
        aggregator,
        dispatcher,
        handle: config.handle().to_string(),
        display_limit: config.display_limit(),
        candidate_pool: config.candidate_pool(),
    });

    let listener = tokio::net::TcpListener::bind(config.bind_address())
        .await
        .with_context(|| format!("failed to bind {}", config.bind_address()))?;
    tracing::info!("✅ Listening on {}", listener.local_addr()?);

    axum::serve(listener, router(state))
        .await
        .context("server terminated unexpectedly")?;

    Ok(())
}

fn display_config_summary(config: &TomlConfig) {
    tracing::info!(
        handle = config.handle(),
        api_base = config.github_api_base(),
        authenticated = config.github_token().is_some(),
        display_limit = config.display_limit(),
        candidate_pool = config.candidate_pool(),
        exclude_forks = config.exclude_forks(),
        "📋 Aggregation settings"
    );
    tracing::info!(
        relay = %format!("{}:{}", config.mail.relay_host, config.mail.relay_port),
        security = ?config.mail.security,
        credentials = config.mail.credentials().is_ok(),
        "📋 Mail settings"
    );
}
