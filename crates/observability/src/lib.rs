//! Process-wide tracing setup.

/// Initialize process-wide observability (tracing/logging).
///
/// `level` is the fallback filter used when `RUST_LOG` is unset.
/// This is safe to call multiple times; subsequent calls become no-ops.
pub fn init(level: &str) {
    tracing::init(level);
}

/// Tracing configuration (filters, layers).
pub mod tracing;
