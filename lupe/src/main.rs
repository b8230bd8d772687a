use std::path::PathBuf;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use lupe::analyzer::AnalyzerProvider;
use lupe::config::Config;
use lupe::host;
use lupe::metadata;
use lupe::session::ExtractionSession;

#[derive(Parser)]
#[command(name = "lupe")]
#[command(about = "Image tag & text extraction filter for full-text indexers")]
struct Args {
    /// Extract one file, print the rendered document to stdout and exit
    #[arg(long)]
    single: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    dotenvy::dotenv().ok();

    // stdout is the protocol channel; logs go to stderr.
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "lupe=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = Config::from_env();

    // Fail-fast precondition: the sentinel line is the only thing the host
    // may see from a process whose metadata backend is unusable.
    if let Err(e) = metadata::capability_check() {
        tracing::error!(error = %e, "metadata backend unusable");
        println!("RECFILTERROR HELPERNOTFOUND exif");
        std::process::exit(1);
    }

    let analyzer = AnalyzerProvider::new(&config.analyzer);
    if !analyzer.is_available() {
        tracing::warn!("analyzer unavailable - documents will carry metadata only");
    }

    let mut session = ExtractionSession::new(analyzer);

    if let Some(path) = args.single {
        let mut stdout = tokio::io::stdout();
        if !host::run_single(&mut stdout, &mut session, &path).await? {
            tracing::error!(file = %path.display(), "extraction failed");
            std::process::exit(1);
        }
        return Ok(());
    }

    host::run(
        tokio::io::stdin(),
        tokio::io::stdout(),
        session,
        config.host.trace_requests,
    )
    .await?;
    Ok(())
}
