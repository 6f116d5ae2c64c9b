// Entrypoint for the CLI application.
// - Keeps `main` small: resolve credentials, build the client, get a URL
//   and hand everything to the UI layer.
// - All failures end up here; they are printed to stderr and mapped to an
//   exit code, nothing is retried.

use clap::Parser;
use crossterm::style::Stylize;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;
use vision_quickstart::{api::ComputerVisionClient, config::Cli, error::exit_code_for, ui};

fn init_tracing(verbose: bool) {
    let default = if verbose {
        "vision_quickstart=debug"
    } else {
        "vision_quickstart=warn"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| default.into());
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: &Cli) -> anyhow::Result<()> {
    println!("\n{}", ui::BANNER);

    // No request is sent here; bad credentials surface on `analyze`.
    let client = ComputerVisionClient::authenticate(cli.credentials()?)?;

    let image_url = match &cli.url {
        Some(url) => url.clone(),
        None => ui::prompt_image_url()?,
    };

    let stdout = std::io::stdout();
    ui::analyze_remote_image(&client, &image_url, &mut stdout.lock())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            // `{:?}` carries the cause chain plus a backtrace when
            // RUST_BACKTRACE is set; the default stays on one line.
            if cli.verbose {
                eprintln!("{} {:?}", "Error:".red().bold(), err);
            } else {
                eprintln!("{} {:#}", "Error:".red().bold(), err);
            }
            ExitCode::from(exit_code_for(&err))
        }
    }
}
