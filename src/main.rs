//! IPBan policy query entry point.

use ipban_policy::answer::answer;
use ipban_policy::audit::AuditLogger;
use ipban_policy::config::Config;
use ipban_policy::input::Query;
use ipban_policy::output::{format_error, format_response};

use std::io::{self, Read};
use std::path::Path;
use std::process::ExitCode;
use tracing::{error, warn};
use tracing_subscriber::EnvFilter;

fn init_logging() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("ipban_policy=warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn fail(message: &str) -> ExitCode {
    println!("{}", format_error(message));
    ExitCode::from(1)
}

fn main() -> ExitCode {
    init_logging();

    // Read JSON from stdin
    let mut input_str = String::new();
    if let Err(e) = io::stdin().read_to_string(&mut input_str) {
        return fail(&format!("failed to read stdin: {}", e));
    }

    let query = match Query::parse(&input_str) {
        Ok(q) => q,
        Err(e) => return fail(&e.to_string()),
    };

    // Load config
    let cwd = query.cwd.as_deref().map(Path::new);
    let config = match Config::load(cwd) {
        Ok(c) => c,
        Err(e) => {
            error!(error = %e, "failed to load configuration");
            return fail(&format!("config error: {}", e));
        }
    };

    // Build the policy; a bad expression aborts here
    let policy = match config.compile() {
        Ok(p) => p,
        Err(e) => {
            error!(error = %e, "invalid configuration");
            return fail(&format!("config error: {}", e));
        }
    };

    let result = match answer(&query, &policy) {
        Ok(a) => a,
        Err(e) => return fail(&e.to_string()),
    };

    // Audit logging (if enabled)
    if config.audit.enabled {
        if let Some(path) = &config.audit.path {
            match AuditLogger::open(Path::new(path)) {
                Ok(mut logger) => {
                    if let Err(e) = logger.log_answer(&query, &result) {
                        warn!(error = %e, path = %path, "failed to write audit entry");
                    }
                }
                Err(e) => warn!(error = %e, path = %path, "failed to open audit log"),
            }
        }
    }

    println!("{}", format_response(&result));

    if result.is_ban() {
        ExitCode::from(2)
    } else {
        ExitCode::SUCCESS
    }
}
