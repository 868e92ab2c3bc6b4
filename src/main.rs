use clap::Parser;
use domain_watch::utils::error::ErrorSeverity;
use domain_watch::utils::{logger, validation::Validate};
use domain_watch::{FetchSettings, ReqwestFetcher, SmtpNotifier, WatchConfig, WatchError, Watcher};

fn exit_with(e: &WatchError) -> ! {
    tracing::error!(
        "❌ {} (Category: {:?}, Severity: {:?})",
        e,
        e.category(),
        e.severity()
    );
    tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());
    eprintln!("❌ {}", e.user_friendly_message());

    // 根據錯誤嚴重程度決定退出碼
    let exit_code = match e.severity() {
        ErrorSeverity::Medium => 2,
        ErrorSeverity::High => 1,
        ErrorSeverity::Critical => 3,
    };
    std::process::exit(exit_code)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 開發環境可用 .env 提供設定
    let _ = dotenvy::dotenv();
    let config = WatchConfig::parse();

    if config.log_json {
        logger::init_json_logger(config.verbose);
    } else {
        logger::init_cli_logger(config.verbose);
    }

    tracing::info!("Starting domain-watch");
    tracing::debug!("Config: {}", config.summary());

    // 驗證配置，任何錯誤都在開始輪詢前結束程式
    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    let settings = config.watch_settings()?;
    let fetcher = ReqwestFetcher::new(FetchSettings::default()).unwrap_or_else(|e| exit_with(&e));
    let notifier =
        SmtpNotifier::new(config.smtp_settings()?).unwrap_or_else(|e| exit_with(&e));
    let recipient = notifier.recipient().to_string();

    let mut watcher = Watcher::new(settings, fetcher, notifier);

    if config.test_email {
        match watcher.send_test_alert().await {
            Ok(domain) => {
                tracing::info!("✅ Test email for '{}' sent: {}", domain, recipient);
                println!("Test email sent: {}", recipient);
                return Ok(());
            }
            Err(e) => exit_with(&e),
        }
    }

    tracing::info!(
        "👀 Watching {} domain(s), alerting {} on items up to {:?} old",
        watcher.settings().domains.len(),
        recipient,
        watcher.settings().threshold
    );

    match watcher.run().await {
        Ok(report) => {
            tracing::info!(
                "✅ Single run finished: {} domain(s) checked, {} alert(s) sent",
                report.outcomes.len(),
                report.alerts_sent()
            );
            Ok(())
        }
        Err(e) => exit_with(&e),
    }
}
