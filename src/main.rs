use clap::Parser;
use release_notifier::utils::{logger, validation::Validate};
use release_notifier::{
    CliConfig, GitHubClient, JsonStateStore, ReleaseWatcher, Result, RunReport, Settings,
    SlackWebhook, WatchConfig,
};

#[tokio::main]
async fn main() {
    let cli = CliConfig::parse();

    if cli.json_logs {
        logger::init_json_logger();
    } else {
        logger::init_cli_logger(cli.verbose);
    }

    tracing::info!("Starting release-notifier");

    match run(&cli).await {
        Ok(report) => {
            if report.planned.is_empty() {
                println!("No new releases to notify.");
            }
            for (repo, tag) in &report.sent {
                println!("Announced {} {}", repo, tag);
            }
            for (repo, tag) in &report.failed {
                eprintln!("Failed to announce {} {}", repo, tag);
            }
        }
        Err(e) => {
            tracing::error!("Run failed: {} (severity: {:?})", e, e.severity());
            tracing::error!("Recovery suggestion: {}", e.recovery_suggestion());
            eprintln!("ERROR: {}", e.user_friendly_message());

            let exit_code = e.exit_code();
            if exit_code > 0 {
                std::process::exit(exit_code);
            }
        }
    }
}

async fn run(cli: &CliConfig) -> Result<RunReport> {
    release_notifier::config::load_env_file(&cli.env_file)?;

    let file = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from {}", path);
            Some(WatchConfig::from_file(path)?)
        }
        None => None,
    };

    let mut settings = Settings::from_env(file)?;
    if let Some(state_path) = &cli.state_path {
        settings.state_path = state_path.clone();
    }
    settings.validate()?;

    let source = GitHubClient::new(&settings.github_api_url, settings.github_token.clone())?;
    let notifier = SlackWebhook::new(settings.webhook_url.clone())?;
    let store = JsonStateStore::new(&settings.state_path);

    let mut watcher = ReleaseWatcher::new(
        source,
        notifier,
        store,
        settings.watch_options(cli.dry_run),
    );
    if let Some(summarizer) = settings.summarizer() {
        watcher = watcher.with_summarizer(summarizer);
    }

    watcher.run().await
}
