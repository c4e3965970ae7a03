//! Tracing/logging setup shared by every process embedding the forecast engine.

/// Initialize process-wide logging with the format chosen by `OPSBOARD_LOG_FORMAT`.
///
/// This is safe to call multiple times; subsequent calls become no-ops.
pub fn init() {
    tracing::init_with(tracing::LogFormat::from_env());
}

/// Tracing configuration (filters, layers).
pub mod tracing;

pub use self::tracing::{LogFormat, init_with};
