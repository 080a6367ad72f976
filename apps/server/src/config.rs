use std::{net::SocketAddr, str::FromStr, time::Duration};

use marketpulse_market_data::{ConfigError, FetcherConfig};

/// Headroom between the slowest provider chain and the request timeout.
const REQUEST_TIMEOUT_MARGIN: Duration = Duration::from_millis(500);

pub struct Config {
    pub listen_addr: SocketAddr,
    pub cors_allow: Vec<String>,
    pub request_timeout: Duration,
    /// Quote provider ids, highest priority first.
    pub quote_providers: Vec<String>,
    /// News provider ids, highest priority first.
    pub news_providers: Vec<String>,
    pub fetcher: FetcherConfig,
}

impl Config {
    /// Read configuration from `MP_*` environment variables (and `.env`).
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from any key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let listen_addr = parse_or(&lookup, "MP_LISTEN_ADDR", "0.0.0.0:8088".parse().ok())?;
        let cors_allow = list_or(&lookup, "MP_CORS_ALLOW_ORIGINS", "*");
        let timeout_ms: u64 = parse_or(&lookup, "MP_REQUEST_TIMEOUT_MS", Some(30_000))?;

        let quote_providers = list_or(&lookup, "MP_QUOTE_PROVIDERS", "YAHOO,STOOQ");
        let news_providers = list_or(&lookup, "MP_NEWS_PROVIDERS", "EASTMONEY,SINA");

        let defaults = FetcherConfig::default();
        let mut fetcher = FetcherConfig {
            quotes_ttl_secs: parse_or(&lookup, "MP_QUOTES_TTL_SECS", Some(defaults.quotes_ttl_secs))?,
            news_ttl_secs: parse_or(&lookup, "MP_NEWS_TTL_SECS", Some(defaults.news_ttl_secs))?,
            synthetic_ttl_secs: parse_opt(&lookup, "MP_SYNTHETIC_TTL_SECS")?,
            provider_timeout_ms: parse_or(&lookup, "MP_PROVIDER_TIMEOUT_SECS", Some(8u64))?
                .saturating_mul(1000),
            synthetic: defaults.synthetic,
            validator: defaults.validator,
        };
        fetcher.synthetic.series_len = parse_or(
            &lookup,
            "MP_SYNTHETIC_LEN",
            Some(fetcher.synthetic.series_len),
        )?;
        fetcher.synthetic.seed = parse_or(&lookup, "MP_SYNTHETIC_SEED", Some(fetcher.synthetic.seed))?;

        if fetcher.provider_timeout_ms == 0 {
            return Err(invalid("MP_PROVIDER_TIMEOUT_SECS", "must be at least 1"));
        }
        if fetcher.synthetic.series_len == 0 {
            return Err(invalid("MP_SYNTHETIC_LEN", "must be at least 1"));
        }

        // A request must outlive its whole provider chain, or the client sees
        // a timeout instead of the synthetic fallback.
        let request_timeout = Duration::from_millis(timeout_ms);
        let longest_chain = quote_providers.len().max(news_providers.len()) as u32;
        let worst_case = fetcher.provider_timeout() * longest_chain + REQUEST_TIMEOUT_MARGIN;
        if request_timeout < worst_case {
            return Err(invalid(
                "MP_REQUEST_TIMEOUT_MS",
                format!(
                    "{}ms is shorter than the slowest provider chain ({}ms)",
                    timeout_ms,
                    worst_case.as_millis()
                ),
            ));
        }

        Ok(Self {
            listen_addr,
            cors_allow,
            request_timeout,
            quote_providers,
            news_providers,
            fetcher,
        })
    }
}

fn invalid(key: &str, message: impl Into<String>) -> ConfigError {
    ConfigError::InvalidValue {
        key: key.to_string(),
        message: message.into(),
    }
}

fn parse_opt<T, F>(lookup: &F, key: &str) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|e: T::Err| invalid(key, format!("'{}': {}", raw, e))),
        _ => Ok(None),
    }
}

fn parse_or<T, F>(lookup: &F, key: &str, default: Option<T>) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    match parse_opt(lookup, key)? {
        Some(value) => Ok(value),
        None => default.ok_or_else(|| invalid(key, "missing")),
    }
}

fn list_or<F>(lookup: &F, key: &str, default: &str) -> Vec<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .unwrap_or_else(|| default.to_string())
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}
