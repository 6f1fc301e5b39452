use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use netdev_core::{
    AcquisitionConfig, InterfaceSample, LocalSource, NetdevError, NetdevSource, Poller,
    TelemetryClient, is_local_host, select_source,
};
use r2d2_postgres::postgres::{Client, Config, NoTls, config::Host};
use serde::Serialize;

/// One JSON line of `watch --json`.
#[derive(Serialize)]
struct Report<'a> {
    unix_ms: u64,
    interfaces: &'a [InterfaceSample],
}

fn unix_ms_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

fn first_host(config: &Config) -> String {
    match config.get_hosts().first() {
        Some(Host::Tcp(h)) => h.clone(),
        #[cfg(unix)]
        Some(Host::Unix(p)) => p.display().to_string(),
        None => String::new(),
    }
}

fn connect(dsn: &str, config: &AcquisitionConfig) -> Box<dyn NetdevSource + Send> {
    let pg_config: Config = match dsn.parse() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Invalid --dsn: {e}");
            std::process::exit(2);
        }
    };
    let host = first_host(&pg_config);
    if is_local_host(&host) {
        log::info!("{host:?} is local, reading procfs instead of the telemetry schema");
        return Box::new(LocalSource::from_config(config));
    }
    let mut client = match pg_config.connect(NoTls) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error connecting to {host:?}: {e}");
            std::process::exit(1);
        }
    };
    let schema_present = match client.schema_exists(&config.remote.schema_query) {
        Ok(present) => present,
        Err(e) => {
            eprintln!("Error checking telemetry schema: {e}");
            std::process::exit(1);
        }
    };
    if !schema_present {
        eprintln!("Warning: telemetry schema not found on {host:?}; no remote interface stats");
    }
    select_source::<Client>(&host, client, schema_present, config)
}

pub fn run(
    config_path: Option<&str>,
    interval: &str,
    count: Option<usize>,
    json: bool,
    dsn: Option<&str>,
) {
    let Some(interval) = super::parse_duration(interval) else {
        eprintln!("Invalid --interval: {interval}");
        std::process::exit(2);
    };
    let config = super::load_config(config_path);

    let source: Box<dyn NetdevSource + Send> = match dsn {
        Some(dsn) => connect(dsn, &config),
        None => Box::new(LocalSource::from_config(&config)),
    };
    log::info!("watching {} interfaces every {:?}", source.kind(), interval);
    let mut poller = Poller::new(source);

    let running = Arc::new(AtomicBool::new(true));
    let r = running.clone();
    ctrlc::set_handler(move || {
        r.store(false, Ordering::SeqCst);
    })
    .expect("Error setting Ctrl+C handler");

    let mut reports = 0usize;
    while running.load(Ordering::SeqCst) {
        match poller.poll() {
            Ok(Some(snapshot)) => {
                if json {
                    let report = Report {
                        unix_ms: unix_ms_now(),
                        interfaces: snapshot.samples(),
                    };
                    match serde_json::to_string(&report) {
                        Ok(line) => println!("{line}"),
                        Err(e) => eprintln!("Error encoding report: {e}"),
                    }
                } else {
                    println!();
                    super::print_rates(snapshot.samples());
                }
                reports += 1;
                if count.is_some_and(|n| reports >= n) {
                    break;
                }
            }
            Ok(None) => {}
            Err(e @ NetdevError::SnapshotShapeMismatch { .. }) => {
                eprintln!("{e}; skipping this interval");
            }
            Err(e) => {
                eprintln!("Error polling interfaces: {e}");
            }
        }
        sleep_while_running(interval, &running);
    }
}

/// Sleep in short slices so Ctrl+C is honoured promptly.
fn sleep_while_running(total: Duration, running: &AtomicBool) {
    let step = Duration::from_millis(100);
    let mut left = total;
    while running.load(Ordering::SeqCst) && !left.is_zero() {
        let chunk = left.min(step);
        std::thread::sleep(chunk);
        left -= chunk;
    }
}
