use clap::Parser;
use mesh_nodes::utils::{logger, validation::Validate};
use mesh_nodes::{build_source, CliConfig, NodeTableEngine};

#[tokio::main]
async fn main() {
    let cli = CliConfig::parse();

    // 初始化日誌
    if cli.log_json {
        logger::init_json_logger(cli.verbose);
    } else {
        logger::init_cli_logger(cli.verbose);
    }

    tracing::debug!("CLI config: {:?}", cli);

    let config = match cli.resolve().and_then(|config| {
        config.validate()?;
        Ok(config)
    }) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("❌ Configuration validation failed: {}", e);
            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 {}", e.recovery_suggestion());
            std::process::exit(1);
        }
    };

    let source = match build_source(&config) {
        Ok(source) => source,
        Err(e) => {
            eprintln!("❌ {}", e.user_friendly_message());
            std::process::exit(1);
        }
    };

    let engine = NodeTableEngine::from_config(source, &config);
    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    match engine.run(&mut out).await {
        Ok(rows) => {
            tracing::info!("✅ Printed {} nodes", rows);
        }
        Err(e) => {
            tracing::error!(
                "❌ Failed to list nodes: {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );
            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 {}", e.recovery_suggestion());

            std::process::exit(e.severity().exit_code());
        }
    }
}
