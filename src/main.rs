//! httppost - entry point

use clap::Parser;
use httppost::config::Config;
use std::process;

fn main() {
    let config = match Config::try_parse() {
        Ok(config) => config,
        Err(e) => {
            // --help and --version are not failures
            let code = if e.use_stderr() { 1 } else { 0 };
            let _ = e.print();
            process::exit(code);
        }
    };

    env_logger::Builder::new()
        .filter_level(config.log_level())
        .parse_default_env()
        .format_target(false)
        .init();

    let result = config.into_job().and_then(|job| job.run());
    match result {
        Ok(summary) => {
            log::info!(
                "sent {} bytes, received {} bytes ({})",
                summary.bytes_sent,
                summary.bytes_received,
                summary.status.rest()
            );
        }
        Err(e) => {
            eprintln!("httppost: {}", error_chain(&e));
            process::exit(1);
        }
    }
}

/// Render an error with its sources, `outer: inner`
fn error_chain(err: &dyn std::error::Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        let text = cause.to_string();
        if !message.contains(&text) {
            message.push_str(": ");
            message.push_str(&text);
        }
        source = cause.source();
    }
    message
}
