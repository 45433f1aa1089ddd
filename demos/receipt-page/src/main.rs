use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use receipt_points::{ReceiptPage, Result};
use tokio::task::JoinSet;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Build a receipt from the catalog and submit it for points.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Scoring service base URL. Defaults to $RECEIPT_SERVICE_URL or
    /// http://localhost:8080.
    #[arg(long)]
    base_url: Option<String>,

    /// Store to buy from. Defaults to the first store.
    #[arg(long)]
    store: Option<String>,

    /// Quantity for a catalog item, as NAME=N. May be repeated.
    #[arg(long = "qty", value_name = "NAME=N")]
    quantities: Vec<String>,

    /// Print the catalog and stores, then exit without submitting.
    #[arg(long)]
    list: bool,

    /// Submit the same inputs this many times, concurrently.
    #[arg(long, default_value_t = 1)]
    repeat: usize,

    /// Request timeout in seconds. No timeout when omitted.
    #[arg(long)]
    timeout: Option<u64>,
}

fn build_page(args: &Args) -> Result<ReceiptPage> {
    let mut builder = ReceiptPage::builder();
    if let Some(url) = &args.base_url {
        builder = builder.base_url(url.clone());
    }
    if let Some(secs) = args.timeout {
        builder = builder.timeout(Duration::from_secs(secs));
    }
    let mut page = builder.build()?;

    if let Some(store) = &args.store {
        page.select_store(store)?;
    }
    for entry in &args.quantities {
        let (name, qty) = entry.rsplit_once('=').ok_or_else(|| {
            receipt_points::ReceiptError::InvalidArgument(format!(
                "Expected NAME=N, got '{}'",
                entry
            ))
        })?;
        page.set_quantity(name.trim(), qty)?;
    }
    Ok(page)
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = Args::parse();
    let page = match build_page(&args) {
        Ok(page) => page,
        Err(e) => {
            eprintln!("error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    if args.list {
        print!("{}", page.catalog_view());
        println!();
        println!("Stores: {}", page.stores().join(", "));
        return ExitCode::SUCCESS;
    }

    if let Ok(Err(issues)) = page.preflight() {
        for issue in &issues {
            tracing::warn!(%issue, "service will likely reject this receipt");
        }
    }

    let page = Arc::new(page);
    let mut tasks = JoinSet::new();
    for _ in 0..args.repeat.max(1) {
        let page = Arc::clone(&page);
        tasks.spawn(async move { page.submit().await });
    }
    let mut failed = 0;
    while let Some(joined) = tasks.join_next().await {
        if !matches!(joined, Ok(Ok(_))) {
            failed += 1;
        }
    }

    print!("{}", page.results_view());
    if let Some(msg) = page.last_error() {
        eprintln!("last error: {}", msg);
    }
    if failed > 0 {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
