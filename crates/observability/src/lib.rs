//! Tracing and logging (shared setup).

pub mod tracing;

pub use crate::tracing::LogFormat;

/// Initialize process-wide observability with the format from the environment.
///
/// This is safe to call multiple times; subsequent calls become no-ops.
pub fn init() {
    tracing::init(LogFormat::from_env());
}
