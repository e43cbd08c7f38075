//! CLI entry point for the household record tracker.
//!
//! # Responsibility
//! - Run one JSON request through the boundary contract and print the
//!   JSON response envelope.
//! - Optionally enable file logging from environment variables.
//!
//! Usage: `famtrack_cli '<json request>'`, or pipe the request on stdin.
//! With no input, prints version information.

use famtrack_api::Response;
use std::io::{IsTerminal, Read};
use std::process::ExitCode;

const LOG_DIR_ENV: &str = "FAMTRACK_LOG_DIR";
const LOG_LEVEL_ENV: &str = "FAMTRACK_LOG_LEVEL";

fn main() -> ExitCode {
    if let Ok(log_dir) = std::env::var(LOG_DIR_ENV) {
        let level = std::env::var(LOG_LEVEL_ENV)
            .unwrap_or_else(|_| famtrack_core::default_log_level().to_string());
        if let Err(err) = famtrack_core::init_logging(&level, &log_dir) {
            eprintln!("logging disabled: {err}");
        }
    }

    let input = match read_request() {
        Ok(input) => input,
        Err(err) => {
            eprintln!("failed to read request: {err}");
            return ExitCode::FAILURE;
        }
    };

    let Some(input) = input else {
        println!("famtrack_core version={}", famtrack_core::core_version());
        println!("famtrack_core db_path={}", famtrack_core::db::configured_db_path().display());
        return ExitCode::SUCCESS;
    };

    let response = famtrack_api::handle_request(&input);
    println!("{}", response.to_json());
    famtrack_core::flush_logs();
    exit_code(&response)
}

fn exit_code(response: &Response) -> ExitCode {
    if response.ok {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

fn read_request() -> std::io::Result<Option<String>> {
    if let Some(arg) = std::env::args().nth(1) {
        return Ok(Some(arg));
    }

    let mut stdin = std::io::stdin();
    if stdin.is_terminal() {
        return Ok(None);
    }
    let mut buffer = String::new();
    stdin.read_to_string(&mut buffer)?;
    let trimmed = buffer.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    Ok(Some(trimmed.to_string()))
}
