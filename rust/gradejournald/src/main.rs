mod aggregate;
mod calc;
mod config;
mod exchange;
mod format;
mod ipc;
mod sample;
mod schema;
mod store;

use serde_json::json;
use std::io::{self, BufRead, Write};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

fn main() {
    // A broken config file must not keep the sidecar from starting.
    let (cfg, cfg_error) = match config::JournalConfig::load() {
        Ok(c) => (c, None),
        Err(e) => (config::JournalConfig::default(), Some(e)),
    };

    // stdout carries the protocol; logs go to stderr.
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(cfg.log_filter.as_str()));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();

    if let Some(e) = cfg_error {
        warn!(error = %format!("{e:#}"), "ignoring config, using defaults");
    }
    info!(version = env!("CARGO_PKG_VERSION"), "gradejournald ready");

    let mut state = ipc::AppState::new(cfg);

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    for line in stdin.lock().lines() {
        let line = match line {
            Ok(v) => v,
            Err(e) => {
                warn!(error = %e, "unreadable stdin line, shutting down");
                break;
            }
        };
        if line.trim().is_empty() {
            continue;
        }

        let req: ipc::Request = match serde_json::from_str(&line) {
            Ok(v) => v,
            Err(e) => {
                // No id to echo; the reply carries only the error.
                warn!(error = %e, "malformed request, replying bad_json");
                let _ = writeln!(
                    stdout,
                    "{}",
                    json!({ "ok": false, "error": { "code": "bad_json", "message": e.to_string() } })
                );
                let _ = stdout.flush();
                continue;
            }
        };

        let resp = ipc::handle_request(&mut state, req);
        let _ = writeln!(
            stdout,
            "{}",
            serde_json::to_string(&resp).unwrap_or_else(|_| "{\"ok\":false}".to_string())
        );
        let _ = stdout.flush();
    }

    info!("stdin closed, shutting down");
}
