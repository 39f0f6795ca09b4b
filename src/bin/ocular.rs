use std::path::PathBuf;

use clap::Parser;

use ocular::cli;
use ocular::config::{AgentConfig, LaunchOptions};

/// Vision-grounded browser automation agent.
#[derive(Parser)]
#[command(name = "ocular", version, about)]
struct Args {
    /// Run the browser headless
    #[arg(long)]
    headless: bool,

    /// Path to the Chrome/Chromium binary
    #[arg(long)]
    chrome_path: Option<PathBuf>,

    /// Directory for overlay debug artifacts
    #[arg(long, default_value = "assets")]
    artifacts_dir: PathBuf,

    /// Iteration cap per goal
    #[arg(long, default_value_t = 20)]
    max_iterations: u32,

    /// Click-resolution attempts per click step
    #[arg(long, default_value_t = 3)]
    click_attempts: u32,
}

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();

    let config = AgentConfig::new()
        .max_iterations(args.max_iterations)
        .click_attempts(args.click_attempts)
        .artifacts_dir(args.artifacts_dir);

    let mut launch = LaunchOptions::new().headless(args.headless);
    if let Some(path) = args.chrome_path {
        launch = launch.chrome_path(path);
    }

    cli::run(launch, config)
}
