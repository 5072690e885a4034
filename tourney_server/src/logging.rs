//! Structured logging configuration.
//!
//! The engine crate logs through the `log` facade; `tracing-subscriber`
//! picks those records up alongside the server's own spans and events.

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Default filter when `RUST_LOG` is unset
pub const DEFAULT_FILTER: &str = "info,sqlx=warn,hyper=warn";

/// Initialize structured logging
///
/// Log levels are configurable via the `RUST_LOG` env var.
///
/// # Example
///
/// ```no_run
/// use tourney_server::logging;
///
/// #[tokio::main]
/// async fn main() {
///     logging::init();
///     tracing::info!("Server starting");
/// }
/// ```
pub fn init() {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .init();

    tracing::info!("Structured logging initialized");
}

/// Log a rejected command with the caller and reason
pub fn log_rejected_command(command: &str, identity: Option<&str>, reason: &str) {
    tracing::warn!(
        command = command,
        identity = identity,
        reason = reason,
        "Command rejected"
    );
}

/// Log a command that changed tournament state
pub fn log_command(command: &str, identity: &str, tournament_id: i64, duration_ms: u64) {
    if duration_ms > 1000 {
        tracing::warn!(
            command = command,
            identity = identity,
            tournament_id = tournament_id,
            duration_ms = duration_ms,
            "PERFORMANCE: Slow command"
        );
    } else {
        tracing::info!(
            command = command,
            identity = identity,
            tournament_id = tournament_id,
            duration_ms = duration_ms,
            "Command executed"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_filter_parses() {
        assert!(EnvFilter::try_new(DEFAULT_FILTER).is_ok());
    }

    #[test]
    fn test_log_helpers() {
        // Just ensure they don't panic without a subscriber
        log_rejected_command("lock_tournament", Some("mallory"), "not an organizer");
        log_rejected_command("submit_result", None, "missing identity");
        log_command("lock_tournament", "alice", 1, 5);
        log_command("submit_result", "alice", 1, 2500);
    }
}
