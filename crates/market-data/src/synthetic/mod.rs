//! Deterministic placeholder data.
//!
//! Used when every provider for a kind has failed. Output depends only on the
//! request and the seed, so repeated fallbacks render the same chart instead
//! of jittering, and tests can pin exact values.

use chrono::{Duration, NaiveTime};
use num_traits::FromPrimitive;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::StandardNormal;
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::models::{DataRequest, NewsRecord, QuoteRecord, Records, RequestKey};

/// Default synthetic series length.
pub const DEFAULT_SERIES_LEN: usize = 100;

/// Default seed.
pub const DEFAULT_SEED: u64 = 42;

/// Label used as `source_label` for synthetic results.
pub const SYNTHETIC_SOURCE: &str = "SYNTHETIC";

/// Floor for the random walk so prices stay positive.
const MIN_PRICE: f64 = 0.01;

const NEWS_SPACING_MINUTES: i64 = 15;

const PLACEHOLDER_NEWS: [(&str, &str); 4] = [
    (
        "[Simulated] Live news feed temporarily unavailable",
        "Market news providers could not be reached. This placeholder is shown until a live source responds.",
    ),
    (
        "[Simulated] Major indexes trade in a narrow range",
        "Placeholder headline. Equity benchmarks are shown flat while live data is unavailable.",
    ),
    (
        "[Simulated] Treasury yields steady ahead of data releases",
        "Placeholder headline. Rates commentary will resume when a live source responds.",
    ),
    (
        "[Simulated] Commodities mixed in a quiet session",
        "Placeholder headline. Commodity prices are not live.",
    ),
];

/// Synthetic generator configuration.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct SyntheticConfig {
    /// Number of daily bars for quote requests.
    pub series_len: usize,
    /// Seed used by [`SyntheticGenerator::generate_default`].
    pub seed: u64,
    /// First close of the walk.
    pub base_price: f64,
    /// Standard deviation of the daily close-to-close step.
    pub step: f64,
}

impl Default for SyntheticConfig {
    fn default() -> Self {
        Self {
            series_len: DEFAULT_SERIES_LEN,
            seed: DEFAULT_SEED,
            base_price: 100.0,
            step: 1.0,
        }
    }
}

/// Produces shape-valid placeholder records.
#[derive(Clone, Debug, Default)]
pub struct SyntheticGenerator {
    config: SyntheticConfig,
}

impl SyntheticGenerator {
    pub fn new(config: SyntheticConfig) -> Self {
        Self { config }
    }

    /// Generate with the configured seed.
    pub fn generate_default(&self, request: &DataRequest) -> Records {
        self.generate(request, self.config.seed)
    }

    /// Generate placeholder rows for a request.
    ///
    /// Same request and seed always give identical output. News ignores the
    /// seed; its items are fixed.
    pub fn generate(&self, request: &DataRequest, seed: u64) -> Records {
        match &request.key {
            RequestKey::Quotes { .. } => {
                Records::Quotes(self.quotes(request, mix_seed(seed, &request.cache_key())))
            }
            RequestKey::News => Records::News(self.news(request)),
        }
    }

    /// Seeded random walk of daily bars ending on the request date.
    ///
    /// High and low are derived after open and close are rounded, so the
    /// OHLC bounds hold exactly.
    fn quotes(&self, request: &DataRequest, seed: u64) -> Vec<QuoteRecord> {
        let mut rng = StdRng::seed_from_u64(seed);
        let len = self.config.series_len.max(1);
        let end = request.requested_at.date_naive().and_time(NaiveTime::default()).and_utc();

        let mut records = Vec::with_capacity(len);
        let mut close = self.config.base_price.max(MIN_PRICE);

        for i in 0..len {
            if i > 0 {
                let noise: f64 = rng.sample(StandardNormal);
                close = (close + noise * self.config.step).max(MIN_PRICE);
            }
            let small: f64 = rng.sample(StandardNormal);
            let extra_high: f64 = rng.sample(StandardNormal);
            let extra_low: f64 = rng.sample(StandardNormal);
            let volume: u64 = rng.gen_range(1_000_000..5_000_000);

            let step = self.config.step * 0.5;
            let open = price((close + small * step).max(MIN_PRICE));
            let close_d = price(close);
            let high = open.max(close_d) + price((extra_high * step).abs());
            let low = (open.min(close_d) - price((extra_low * step).abs())).max(Decimal::ZERO);

            let days_back = (len - 1 - i) as i64;
            records.push(
                QuoteRecord::ohlc(end - Duration::days(days_back), open, high, low, close_d)
                    .with_volume(Decimal::from(volume)),
            );
        }

        records
    }

    /// Fixed placeholder items, newest first.
    fn news(&self, request: &DataRequest) -> Vec<NewsRecord> {
        PLACEHOLDER_NEWS
            .iter()
            .enumerate()
            .map(|(i, (title, content))| {
                let at = request.requested_at - Duration::minutes(NEWS_SPACING_MINUTES * i as i64);
                NewsRecord::new(at.format("%Y-%m-%d %H:%M").to_string(), *title, *content)
            })
            .collect()
    }
}

/// Round to cents.
fn price(value: f64) -> Decimal {
    Decimal::from_f64(value).unwrap_or_default().round_dp(2)
}

/// Combine the caller's seed with the request key so different symbols get
/// different walks.
fn mix_seed(seed: u64, key: &str) -> u64 {
    let digest = md5::compute(key.as_bytes());
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&digest.0[..8]);
    seed ^ u64::from_le_bytes(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Period;
    use chrono::{TimeZone, Utc};

    fn request() -> DataRequest {
        DataRequest::quotes(
            "AAPL",
            Period::OneMonth,
            Utc.with_ymd_and_hms(2024, 3, 15, 14, 0, 0).unwrap(),
        )
    }

    #[test]
    fn test_default_length_and_consecutive_days() {
        let generator = SyntheticGenerator::default();
        let records = generator.generate_default(&request());
        let quotes = records.quotes().unwrap();

        assert_eq!(quotes.len(), DEFAULT_SERIES_LEN);
        assert_eq!(
            quotes.last().unwrap().timestamp,
            Utc.with_ymd_and_hms(2024, 3, 15, 0, 0, 0).unwrap()
        );
        for pair in quotes.windows(2) {
            assert_eq!(pair[1].timestamp - pair[0].timestamp, Duration::days(1));
        }
    }

    #[test]
    fn test_first_close_is_base_price() {
        let generator = SyntheticGenerator::default();
        let records = generator.generate(&request(), 7);
        assert_eq!(records.quotes().unwrap()[0].close, Decimal::from(100));
    }

    #[test]
    fn test_ohlc_invariant_holds() {
        let generator = SyntheticGenerator::default();
        for seed in 0..20 {
            let records = generator.generate(&request(), seed);
            for quote in records.quotes().unwrap() {
                assert!(quote.high >= quote.open.max(quote.close));
                assert!(quote.low <= quote.open.min(quote.close));
                assert!(quote.low >= Decimal::ZERO);
            }
        }
    }

    #[test]
    fn test_same_seed_same_output() {
        let generator = SyntheticGenerator::default();
        assert_eq!(
            generator.generate(&request(), 42),
            generator.generate(&request(), 42)
        );
    }

    #[test]
    fn test_different_seed_or_symbol_differs() {
        let generator = SyntheticGenerator::default();
        assert_ne!(
            generator.generate(&request(), 1),
            generator.generate(&request(), 2)
        );

        let other = DataRequest::quotes("MSFT", Period::OneMonth, request().requested_at);
        assert_ne!(
            generator.generate(&request(), 42),
            generator.generate(&other, 42)
        );
    }

    #[test]
    fn test_configured_length() {
        let generator = SyntheticGenerator::new(SyntheticConfig {
            series_len: 10,
            ..Default::default()
        });
        assert_eq!(generator.generate_default(&request()).len(), 10);
    }

    #[test]
    fn test_news_is_tagged_and_newest_first() {
        let generator = SyntheticGenerator::default();
        let at = Utc.with_ymd_and_hms(2024, 3, 15, 14, 0, 0).unwrap();
        let records = generator.generate_default(&DataRequest::news(at));
        let news = records.news().unwrap();

        assert_eq!(news.len(), 4);
        assert!(news.iter().all(|n| n.title.starts_with("[Simulated]")));
        assert_eq!(news[0].time, "2024-03-15 14:00");
        assert_eq!(news[1].time, "2024-03-15 13:45");
        for pair in news.windows(2) {
            assert!(pair[0].time > pair[1].time);
        }
    }
}
