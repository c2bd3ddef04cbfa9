use anyhow::Result;
use clap::Parser;
use produktsync::driver::wire::{FirefoxOptions, WireEngine};
use produktsync::{DriverEngine, Session};
use produktsync_cli::facade::ProcessFacade;
use produktsync_cli::login::LogIn;
use produktsync_cli::{config, layout, menu};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Copies product records from the Tricoma CRM into the Shopware 6 admin, translating descriptions along the way"
)]
struct Args {
    /// Path to the configuration file
    #[arg(short, long, default_value = "config.json")]
    config: PathBuf,

    /// Attach to an already-running WebDriver server instead of spawning
    /// geckodriver
    #[arg(long)]
    webdriver_url: Option<String>,
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    init_logging();
    let args = Args::parse();
    let config = config::load(&args.config)?;

    let firefox = FirefoxOptions {
        binary: config.firefox_binary.clone(),
        profile: config.firefox_profile.clone(),
    };
    let engine: Arc<dyn DriverEngine> = match &args.webdriver_url {
        Some(url) => Arc::new(WireEngine::connect(url, firefox).await?),
        None => {
            Arc::new(
                WireEngine::launch(&config.geckodriver_path, config.webdriver_port, firefox)
                    .await?,
            )
        }
    };
    let session = Session::new(engine);

    // Open the CRM in tab 0 and the Shop in tab 1.
    info!("opening the CRM and the Shop");
    session.navigate(&config.crm_url).await?;
    session.open_new_tab(&config.shop_url).await?;

    if let Err(e) = layout::setup_layout(&session, &config.layout).await {
        warn!("window layout could not be applied: {e}");
    }

    let login = LogIn::new(&session, &config);
    login.run().await?;

    let facade = ProcessFacade::new(session.clone(), config);
    while menu::execute_choice(&facade).await {}

    info!("shutting down");
    session.quit().await.ok();
    Ok(())
}
