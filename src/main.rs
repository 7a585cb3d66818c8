//! Health check CLI
//!
//! Runs a full link health check against the content catalog, prints a
//! summary, and optionally writes the dated JSON report artifact. With
//! `--watch <minutes>` it keeps re-running on that cadence, publishing each
//! finished tree through the monitor.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, Result};
use tokio::sync::watch;

use course_health::catalog::HttpCatalog;
use course_health::monitor::HealthMonitor;
use course_health::progress::Progress;
use course_health::report;
use course_health::validator::LinkValidator;

struct Args {
    catalog_url: String,
    export_dir: Option<PathBuf>,
    watch_minutes: Option<u64>,
}

fn parse_args() -> Result<Args> {
    let mut args = Args {
        catalog_url: std::env::var("CATALOG_URL")
            .unwrap_or_else(|_| "http://localhost:3000/api/admin".to_string()),
        export_dir: None,
        watch_minutes: None,
    };

    let mut iter = std::env::args().skip(1);
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--catalog" => {
                args.catalog_url =
                    iter.next().ok_or_else(|| anyhow!("--catalog requires a value"))?;
            }
            "--export" => {
                let dir = iter.next().ok_or_else(|| anyhow!("--export requires a directory"))?;
                args.export_dir = Some(PathBuf::from(dir));
            }
            "--watch" => {
                let minutes = iter.next().ok_or_else(|| anyhow!("--watch requires minutes"))?;
                args.watch_minutes = Some(minutes.parse()?);
            }
            other => return Err(anyhow!("Unknown argument: {}", other)),
        }
    }
    Ok(args)
}

/// Prints progress lines for whichever run is current. Each refresh
/// publishes a fresh counter, so the printer re-subscribes when one arrives.
fn spawn_progress_printer(mut runs: watch::Receiver<Arc<Progress>>) {
    tokio::spawn(async move {
        let mut snaps = runs.borrow_and_update().subscribe();
        loop {
            tokio::select! {
                changed = runs.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    snaps = runs.borrow_and_update().subscribe();
                }
                changed = snaps.changed() => {
                    if changed.is_err() {
                        // Counter retired; wait for the next run's.
                        if runs.changed().await.is_err() {
                            break;
                        }
                        snaps = runs.borrow_and_update().subscribe();
                        continue;
                    }
                    let snap = snaps.borrow_and_update().clone();
                    println!("[{}/{}] {}", snap.completed, snap.total, snap.message);
                }
            }
        }
    });
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = parse_args()?;

    let catalog = Arc::new(HttpCatalog::new(&args.catalog_url));
    let checker = Arc::new(LinkValidator::new());
    let monitor = Arc::new(HealthMonitor::new(catalog, checker));
    spawn_progress_printer(monitor.subscribe_progress());

    println!("Checking link health against {}", args.catalog_url);
    let snapshot = monitor.refresh().await;
    println!("\n{}", report::render_summary(&snapshot));

    if let Some(dir) = &args.export_dir {
        let path = report::write_report(&snapshot, dir)?;
        println!("Report written to {}", path.display());
    }

    if let Some(minutes) = args.watch_minutes {
        println!("Auto-refreshing every {} minutes. Ctrl-C to stop.", minutes);
        let mut rx = monitor.subscribe();
        tokio::spawn(monitor.clone().run_auto_refresh(Duration::from_secs(minutes * 60)));

        loop {
            if rx.changed().await.is_err() {
                break;
            }
            let Some(snapshot) = rx.borrow_and_update().clone() else { continue };
            println!("\n{}", report::render_summary(&snapshot));
            if let Some(dir) = &args.export_dir {
                let path = report::write_report(&snapshot, dir)?;
                println!("Report written to {}", path.display());
            }
        }
    }

    Ok(())
}
