use clap::Parser;
use coord_resolver::config::cli::{Command, OutputFormat, ResolveArgs, ServeArgs, WalkArgs};
use coord_resolver::render::{self, WalkView};
use coord_resolver::utils::logger;
use coord_resolver::utils::validation::{require_coordinate, Validate};
use coord_resolver::{
    CliConfig, HttpLedgerClient, LedgerApi, LocalStorage, ResolverConfig, ResolverError,
    WalkExporter, WalkSimulator,
};

async fn run_resolve(config: ResolverConfig, args: ResolveArgs) -> anyhow::Result<()> {
    let coordinate = match require_coordinate(&args.coordinate) {
        Ok(coordinate) => coordinate,
        Err(e) => report_failure(&e),
    };

    let client = HttpLedgerClient::new(config.api);
    let result = client.decode(coordinate).await;

    match args.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&result)?),
        OutputFormat::Text => print!("{}", render::render_decode(&result, args.raw)),
    }

    // 解碼失敗時以結束碼 1 回報
    if !result.is_success() {
        std::process::exit(1);
    }
    Ok(())
}

async fn run_walk(config: ResolverConfig, args: WalkArgs) -> Result<(), ResolverError> {
    let hops = config.walk.max_hops;
    let view = WalkView {
        show_inspection: config.walk.show_inspection,
        show_dot: args.dot,
        show_raw: args.raw,
    };

    let client = HttpLedgerClient::new(config.api);
    let simulator = WalkSimulator::new(client, config.walk);
    let trace = simulator.simulate(&args.start, hops).await?;

    match args.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&trace)?),
        OutputFormat::Text => print!("{}", render::render_walk(&trace, &view)),
    }

    if let Some(output_dir) = args.output_dir {
        let exporter = WalkExporter::new(LocalStorage::new(output_dir.clone()));
        let written = exporter.export(&trace).await?;
        tracing::info!("📁 Walk artifacts saved to: {}", output_dir);
        for file in written {
            eprintln!("📁 {}/{}", output_dir, file);
        }
    }

    Ok(())
}

async fn run_serve(config: ResolverConfig, args: ServeArgs) -> Result<(), ResolverError> {
    coord_resolver::web::run_server(config, args.open).await
}

fn report_failure(e: &ResolverError) -> ! {
    // 記錄詳細錯誤信息
    tracing::error!(
        "❌ Command failed: {} (Category: {:?}, Severity: {:?})",
        e,
        e.category(),
        e.severity()
    );
    tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 Suggestion: {}", e.recovery_suggestion());

    std::process::exit(e.exit_code());
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CliConfig::parse();

    // 初始化日誌
    logger::init_cli_logger(cli.verbose, cli.log_json);

    tracing::debug!("CLI config: {:?}", cli);

    let mut config = match ResolverConfig::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => report_failure(&e),
    };
    cli.apply_overrides(&mut config);

    // 驗證配置
    if let Err(e) = config.validate() {
        report_failure(&e);
    }

    let outcome = match cli.command {
        Command::Resolve(args) => return run_resolve(config, args).await,
        Command::Walk(args) => run_walk(config, args).await,
        Command::Serve(args) => run_serve(config, args).await,
    };

    if let Err(e) = outcome {
        report_failure(&e);
    }

    Ok(())
}
