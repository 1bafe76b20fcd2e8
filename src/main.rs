mod config;
mod export;
mod insights;
mod ipc;
mod logging;
mod records;
mod source;

use std::io::{self, BufRead, Write};
use tracing::{error, info};

fn main() {
    logging::init();

    let settings = match config::Settings::from_env() {
        Ok(s) => s,
        Err(e) => {
            error!("invalid environment configuration, starting unconfigured: {e:#}");
            config::Settings::default()
        }
    };

    let mut state = ipc::AppState {
        source: None,
        subject_match: settings.subject_match,
    };
    if let Some(src) = settings.source {
        match source::open(src) {
            Ok(s) => {
                info!(kind = s.kind(), "records source configured from environment");
                state.source = Some(s);
            }
            Err(e) => error!(error = %e, "records source could not be opened"),
        }
    }

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    for line in stdin.lock().lines() {
        let line = match line {
            Ok(v) => v,
            Err(_) => break,
        };
        if line.trim().is_empty() {
            continue;
        }

        let req: ipc::Request = match serde_json::from_str(&line) {
            Ok(v) => v,
            Err(e) => {
                // Can't reply without id.
                let _ = writeln!(
                    stdout,
                    "{}",
                    serde_json::json!({
                        "ok": false,
                        "error": { "code": "bad_json", "message": e.to_string() }
                    })
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
}
