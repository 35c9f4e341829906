use clap::Parser;
use portfolio_pipeline::domain::ports::ConfigProvider;
use portfolio_pipeline::utils::error::ErrorSeverity;
use portfolio_pipeline::utils::{logger, validation::Validate};
use portfolio_pipeline::{CliConfig, GitHubClient, PortfolioError, ProjectAggregator};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = CliConfig::parse();

    // 初始化日誌
    logger::init_cli_logger(config.verbose);

    tracing::info!("Starting portfolio CLI");
    if config.verbose {
        tracing::debug!("CLI config: {:?}", config);
    }

    // 驗證配置
    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    let result = build(&config).await;

    match result {
        Ok(json) => {
            println!("{}", json);
        }
        Err(e) => {
            tracing::error!(
                "❌ Failed to build project list: {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );
            tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 {}", e.recovery_suggestion());

            // 根據錯誤嚴重程度決定退出碼
            let exit_code = match e.severity() {
                ErrorSeverity::Low => 0,
                ErrorSeverity::Medium => 2,
                ErrorSeverity::High => 1,
                ErrorSeverity::Critical => 3,
            };

            if exit_code > 0 {
                std::process::exit(exit_code);
            }
        }
    }

    Ok(())
}

async fn build(config: &CliConfig) -> Result<String, PortfolioError> {
    let client = GitHubClient::from_config(config)?;
    if !client.is_authenticated() {
        tracing::info!("🔓 No GitHub token configured, using anonymous rate limits");
    }

    let aggregator = ProjectAggregator::from_config(client.clone(), client, config);
    let list = aggregator
        .build_project_list(config.handle(), config.display_limit())
        .await?;

    if list.is_degraded() {
        eprintln!(
            "⚠️ {} project(s) are shown with their repository description",
            list.missing_enrichment
        );
    }

    Ok(serde_json::to_string_pretty(&list.projects)?)
}
