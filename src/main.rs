//! html2png CLI
//!
//! Usage:
//!   html2png [OPTIONS] [BASENAME]
//!
//! Reads `<BASENAME>.html` and writes `<BASENAME>.png` with exactly the
//! requested viewport size. Exit status is 0 on success and non-zero on any
//! failure (see `html2png::Error::exit_code`).

use std::path::PathBuf;

use clap::Parser;
use env_logger::{Builder, Env};

use html2png::{Error, JobOptions, Preset};

#[derive(Parser)]
#[command(name = "html2png", version)]
#[command(about = "Render <BASENAME>.html to a fixed-size <BASENAME>.png")]
struct Cli {
    /// File stem shared by the input .html and output .png
    basename: Option<String>,

    /// Viewport width in pixels
    #[arg(short = 'W', long)]
    width: Option<u32>,

    /// Viewport height in pixels
    #[arg(short = 'H', long)]
    height: Option<u32>,

    /// Named viewport size: report (1500x900), wide (1900x900), a4 (794x1123)
    #[arg(short, long)]
    preset: Option<Preset>,

    /// JSON file with any of: basename, width, height, preset
    #[arg(short, long)]
    config: Option<PathBuf>,
}

impl Cli {
    fn job_options(&self) -> html2png::Result<JobOptions> {
        let flags = JobOptions {
            basename: self.basename.clone(),
            width: self.width,
            height: self.height,
            preset: self.preset,
        };
        match &self.config {
            Some(path) => Ok(flags.or(JobOptions::from_path(path)?)),
            None => Ok(flags),
        }
    }
}

async fn run(cli: Cli) -> html2png::Result<()> {
    let job = cli.job_options()?.into_job()?;
    html2png::render_async(&job).await
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    Builder::from_env(Env::default().filter_or("RUST_LOG", "info"))
        .format_timestamp(None)
        .init();

    let cli = Cli::parse();
    if let Err(e) = run(cli).await {
        report(&e);
        std::process::exit(e.exit_code());
    }
}

fn report(e: &Error) {
    eprintln!("error: {}", e);
}
