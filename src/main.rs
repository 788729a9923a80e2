#![allow(clippy::uninlined_format_args)]

use std::path::PathBuf;

use clap::Parser;
use serde_json::json;
use tokio::io::BufReader;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use pagepilot::browser::BrowserFacade;
use pagepilot::config::ConsoleConfig;
use pagepilot::console::{Console, Mode, RunSummary};
use pagepilot::driver::{GLOBAL_DRIVER_MANAGER, WebDriverLauncher};
use pagepilot::errors::ConsoleError;
use pagepilot::types::{BrowserType, OutputFormat, ViewportSize};

// Exit codes
const EXIT_SUCCESS: i32 = 0;
const EXIT_COMMAND_FAILED: i32 = 1;

#[derive(Parser)]
#[command(name = "pagepilot")]
#[command(about = "Interactive console that drives a browser page", long_about = None)]
struct Cli {
    /// Browser to drive (firefox or chrome)
    #[arg(short, long, default_value = "chrome")]
    browser: BrowserType,

    /// Run the browser without a visible window
    #[arg(long)]
    headless: bool,

    /// Set viewport size (WIDTHxHEIGHT, e.g., 1920x1080)
    #[arg(long, value_parser = ViewportSize::parse)]
    viewport: Option<ViewportSize>,

    /// Attach to a running WebDriver server instead of starting one
    #[arg(long)]
    webdriver_url: Option<String>,

    /// Directory for saved markup, element lists and screenshots
    #[arg(short, long, default_value = ".")]
    output_dir: PathBuf,

    /// Output format
    #[arg(short, long, default_value = "simple")]
    format: OutputFormat,

    /// Run commands from a file instead of standard input
    #[arg(short, long)]
    script: Option<PathBuf>,

    /// Abort a script at the first failed command
    #[arg(long, requires = "script")]
    stop_on_error: bool,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    fn config(&self) -> ConsoleConfig {
        ConsoleConfig {
            browser: self.browser,
            headless: self.headless,
            viewport: self.viewport.clone(),
            webdriver_url: self.webdriver_url.clone(),
            output_dir: self.output_dir.clone(),
            format: self.format,
            stop_on_error: self.stop_on_error,
            ..ConsoleConfig::default()
        }
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = run(&cli).await;

    // Always clean up WebDriver processes before exiting
    GLOBAL_DRIVER_MANAGER.stop_all();

    match result {
        Ok(summary) if summary.failed > 0 && cli.script.is_some() => {
            std::process::exit(EXIT_COMMAND_FAILED)
        }
        Ok(_) => std::process::exit(EXIT_SUCCESS),
        Err(err) => {
            // Output JSON error to stdout for programmatic consumption
            let error_json = json!({
                "error": true,
                "message": err.to_string(),
                "exit_code": err.exit_code()
            });
            println!(
                "{}",
                serde_json::to_string(&error_json).unwrap_or_else(|_| "{}".to_string())
            );

            eprintln!("Error: {}", err);
            std::process::exit(err.exit_code());
        }
    }
}

fn init_tracing(verbose: bool) {
    let default_filter = if verbose {
        "pagepilot=debug"
    } else {
        "pagepilot=info"
    };

    // Logs go to stderr so command output on stdout stays clean
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .init();
}

async fn run(cli: &Cli) -> Result<RunSummary, ConsoleError> {
    let config = cli.config();
    tokio::fs::create_dir_all(&config.output_dir).await?;

    let launcher = WebDriverLauncher::new(&config);
    let facade = BrowserFacade::new(Box::new(launcher), &config);
    let mut console = Console::new(facade, config.format).stop_on_error(config.stop_on_error);

    let mut stdout = tokio::io::stdout();
    let result = match &cli.script {
        Some(path) => {
            info!("Running script {}", path.display());
            let file = tokio::fs::File::open(path).await?;
            console
                .run(BufReader::new(file), &mut stdout, Mode::Batch)
                .await
        }
        None => {
            console
                .run(BufReader::new(tokio::io::stdin()), &mut stdout, Mode::Interactive)
                .await
        }
    };

    let closed = console.shutdown().await;
    let summary = result?;
    closed?;
    Ok(summary)
}
