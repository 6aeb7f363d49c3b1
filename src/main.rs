use clap::Parser;
use listing_service::utils::error::{ErrorSeverity, ListingError};
use listing_service::utils::{logger, validation::Validate};
use listing_service::{app, CliConfig, HttpServer};

fn exit_code(e: &ListingError) -> i32 {
    match e.severity() {
        ErrorSeverity::Low => 0,
        ErrorSeverity::Medium => 2,
        ErrorSeverity::High => 1,
        ErrorSeverity::Critical => 3,
    }
}

fn fail(e: ListingError, context: &str) -> ! {
    tracing::error!(
        "❌ {}: {} (Category: {:?}, Severity: {:?})",
        context,
        e,
        e.category(),
        e.severity()
    );
    tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());
    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 建議: {}", e.recovery_suggestion());
    std::process::exit(exit_code(&e).max(1));
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CliConfig::parse();

    // 設定檔解析失敗時日誌尚未初始化，直接輸出到 stderr
    let config = match cli.resolve() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 建議: {}", e.recovery_suggestion());
            std::process::exit(exit_code(&e).max(1));
        }
    };

    // 初始化日誌
    logger::init_logger(config.verbose, config.json_logs);

    tracing::info!("Starting listing-service v{}", env!("CARGO_PKG_VERSION"));
    if config.verbose {
        tracing::debug!(
            "Resolved config: listen={} backend={} database={} collection={} max_page_size={}",
            config.listen_addr,
            config.backend,
            config.database_url_for_display(),
            config.collection,
            config.max_page_size
        );
    }

    // 驗證配置
    if let Err(e) = config.validate() {
        fail(e, "Configuration validation failed");
    }

    // 建立資料庫連線（整個程序共用）
    let service = match app::build_service(&config).await {
        Ok(service) => service,
        Err(e) => fail(e, "Could not initialise the listing store"),
    };

    let server = HttpServer::new(config.listen_addr.clone(), service).with_cors(config.cors_enabled);

    server
        .run(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!("Failed to listen for shutdown signal: {}", e);
                std::future::pending::<()>().await;
            }
        })
        .await?;

    tracing::info!("✅ listing-service stopped");
    Ok(())
}
