use tracing_subscriber::EnvFilter;

/// Install the fmt subscriber. `RUST_LOG` wins over the `info` default;
/// an already-installed subscriber is left in place.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_tracing_is_repeatable() {
        init_tracing();
        init_tracing();
        tracing::info!("subscriber installed");
    }
}
