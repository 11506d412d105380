use anyhow::{Context, Result};
use clap::Parser;
use std::path::Path;
use std::sync::Arc;
use tokio::signal;
use webcheck::cli::{describe_config, run_single_check, Cli, Commands};
use webcheck::{Config, ControlSurface, HttpProbe, MonitorController, SmtpNotifier, WebServer};

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command line arguments first to get debug flag
    let cli = Cli::parse();

    let level = if cli.debug {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    tracing_subscriber::fmt().with_max_level(level).init();

    let config_path = cli.config_path();
    match cli.command {
        None => run_monitor(&config_path).await?,
        Some(Commands::Check(args)) => handle_check_command(&config_path, args.notify).await?,
        Some(Commands::Show) => handle_show_command(&config_path)?,
    }

    Ok(())
}

/// Serve the control surface and run the monitor until Ctrl+C
async fn run_monitor(config_path: &Path) -> Result<()> {
    let config = Config::load(config_path)
        .with_context(|| format!("Failed to load config {}", config_path.display()))?;

    let settings = config.monitor_settings();
    let probe = HttpProbe::new(&settings.probe).context("Failed to build HTTP client")?;
    let notifier = SmtpNotifier::from_config(&config.email).context("Invalid email settings")?;
    let controller = Arc::new(MonitorController::new(
        settings,
        Arc::new(probe),
        Arc::new(notifier),
    ));

    println!("🎯 WebCheck started");
    println!("📂 Config file: {}", config_path.display());
    println!("🔎 Endpoint: {}", config.endpoint.url);
    println!("🛑 Press Ctrl+C to stop");

    let web_server = WebServer::new(
        config.server.port,
        config.server.host.clone(),
        ControlSurface::new(Arc::clone(&controller)),
    );
    let listener = web_server.bind().await?;

    // Boot auto-start is silent
    controller.start(false).await;

    let server_handle = tokio::spawn(async move {
        let shutdown = async {
            let _ = signal::ctrl_c().await;
        };
        if let Err(e) = web_server.serve(listener, shutdown).await {
            tracing::error!("❌ Web server failed: {:#}", e);
        }
    });

    signal::ctrl_c()
        .await
        .context("Failed to listen for ctrl_c")?;
    println!("\n🛑 Received Ctrl+C, shutting down...");

    controller.shutdown().await;
    let _ = server_handle.await;

    Ok(())
}

/// Handle check command
async fn handle_check_command(config_path: &Path, notify: bool) -> Result<()> {
    let config = Config::load(config_path)
        .with_context(|| format!("Failed to load config {}", config_path.display()))?;

    let result = run_single_check(&config, notify).await?;
    match result {
        webcheck::ProbeResult::Success => {
            println!("✅ {}: Endpoint response verified", config.endpoint.url);
            Ok(())
        }
        webcheck::ProbeResult::Failure(reason) => {
            anyhow::bail!("{}: {}", config.endpoint.url, reason)
        }
    }
}

/// Handle show command
fn handle_show_command(config_path: &Path) -> Result<()> {
    let mut config = Config::from_file(config_path)
        .with_context(|| format!("Failed to load config {}", config_path.display()))?;
    config.apply_env_overrides(|key| std::env::var(key).ok())?;

    println!("{}", describe_config(&config));
    if let Err(e) = config.validate() {
        println!("\n⚠️ Configuration is not usable: {}", e);
    }
    Ok(())
}
