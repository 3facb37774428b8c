//! Integration tests over the in-memory adapters.

pub mod funding_flows;
pub mod properties;

/// Installs a test subscriber once; honours `RUST_LOG`.
#[cfg(test)]
pub(crate) fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
