use tracing::warn;

#[derive(Debug, Clone)]
pub struct Config {
    /// Port for the application to run on
    pub port: usize,
    /// Maximum allowed duration in millis for querying occurrences.
    /// Recurring series are unbounded, so a client asking for a timespan of
    /// several years would make the server expand a lot of useless occurrences.
    pub occurrences_query_duration_limit: i64,
    /// Seconds between the keep-alive comments written to every live viewer
    pub heartbeat_interval_secs: u64,
}

fn parse_env<T: std::str::FromStr>(key: &str, default: T) -> T
where
    T: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(value) => match value.parse::<T>() {
            Ok(value) => value,
            Err(_) => {
                warn!(
                    "The given {}: {} is not valid, falling back to the default: {}.",
                    key, value, default
                );
                default
            }
        },
        Err(_) => default,
    }
}

impl Config {
    pub fn new() -> Self {
        Self {
            port: parse_env("PORT", 5000),
            occurrences_query_duration_limit: 1000 * 60 * 60 * 24 * 62, // 62 days
            heartbeat_interval_secs: parse_env("HEARTBEAT_INTERVAL_SECS", 15).max(1),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}
