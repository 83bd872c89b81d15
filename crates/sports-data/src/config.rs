//! Runtime configuration, read from `CBB_*` environment variables.

use std::collections::HashMap;
use std::fmt::Display;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use log::warn;

use crate::cache::{CacheSettings, TtlClass, TtlPolicy};
use crate::http::HttpSettings;
use crate::provider::RateLimit;

const PREFIX: &str = "CBB_";

/// Sustained request rates for the known upstreams.
const DEFAULT_PROVIDER_RATES: [(&str, f64); 4] = [
    ("espn", 10.0),
    ("ncaa", 5.0),
    ("sportsdataverse", 5.0),
    ("cbbpy", 3.0),
];

#[derive(Clone, Debug)]
pub struct SportsDataConfig {
    pub cache: CacheSettings,
    pub http: HttpSettings,
    /// Maximum concurrent resolution calls.
    pub max_concurrency: usize,
    pub admission_timeout: Duration,
    /// Bound on a single provider call.
    pub provider_timeout: Duration,
    /// How long one attempt may wait for a rate-limit token.
    pub rate_limit_wait: Duration,
    /// Per-provider rate limits, overriding what adapters declare.
    pub rate_limits: HashMap<String, RateLimit>,
    /// Per-provider priority overrides.
    pub priorities: HashMap<String, i32>,
}

impl Default for SportsDataConfig {
    fn default() -> Self {
        Self {
            cache: CacheSettings::default(),
            http: HttpSettings::default(),
            max_concurrency: 50,
            admission_timeout: Duration::from_secs(30),
            provider_timeout: Duration::from_secs(30),
            rate_limit_wait: Duration::from_secs(5),
            rate_limits: DEFAULT_PROVIDER_RATES
                .iter()
                .map(|(name, rate)| (name.to_string(), RateLimit::per_second(*rate)))
                .collect(),
            priorities: HashMap::new(),
        }
    }
}

impl SportsDataConfig {
    /// Load from the process environment (and `.env`, if present).
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        Self::from_vars(std::env::vars())
    }

    /// Load from explicit `(name, value)` pairs. Unset variables keep their
    /// defaults; invalid values are logged and ignored.
    pub fn from_vars<I, K, V>(vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let vars: HashMap<String, String> = vars
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .filter(|(k, _)| k.starts_with(PREFIX))
            .collect();
        let mut config = Self::default();

        if let Some(dir) = vars.get("CBB_CACHE_DIR").filter(|v| !v.trim().is_empty()) {
            config.cache.dir = PathBuf::from(dir.trim());
        }
        config.cache.enabled = parse_bool(&vars, "CBB_CACHE_ENABLED", config.cache.enabled);
        config.cache.memory_capacity =
            parse(&vars, "CBB_MEMORY_CACHE_CAPACITY", config.cache.memory_capacity);
        config.cache.ttls = ttl_policy(&vars);

        config.max_concurrency = parse(&vars, "CBB_MAX_CONCURRENCY", config.max_concurrency);
        config.admission_timeout =
            parse_millis(&vars, "CBB_ADMISSION_TIMEOUT_MS", config.admission_timeout);
        config.provider_timeout =
            parse_millis(&vars, "CBB_PROVIDER_TIMEOUT_MS", config.provider_timeout);
        config.rate_limit_wait =
            parse_millis(&vars, "CBB_RATE_LIMIT_WAIT_MS", config.rate_limit_wait);
        config.http.max_response_bytes =
            parse(&vars, "CBB_MAX_RESPONSE_BYTES", config.http.max_response_bytes);

        apply_provider_overrides(&vars, &mut config);
        config
    }
}

fn parse<T>(vars: &HashMap<String, String>, name: &str, default: T) -> T
where
    T: FromStr,
    T::Err: Display,
{
    match vars.get(name) {
        None => default,
        Some(raw) => raw.trim().parse().unwrap_or_else(|e| {
            warn!("Ignoring invalid {}={:?}: {}", name, raw, e);
            default
        }),
    }
}

fn parse_millis(vars: &HashMap<String, String>, name: &str, default: Duration) -> Duration {
    let millis = parse(vars, name, default.as_millis() as u64);
    Duration::from_millis(millis)
}

fn parse_bool(vars: &HashMap<String, String>, name: &str, default: bool) -> bool {
    let Some(raw) = vars.get(name) else {
        return default;
    };
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => true,
        "0" | "false" | "no" | "off" => false,
        _ => {
            warn!("Ignoring invalid {}={:?}", name, raw);
            default
        }
    }
}

fn ttl_policy(vars: &HashMap<String, String>) -> TtlPolicy {
    let mut policy = TtlPolicy::default();
    for class in TtlClass::ALL {
        let name = format!("CBB_TTL_{}_SECS", class.as_str().to_ascii_uppercase());
        let secs = parse(vars, &name, class.default_ttl().as_secs());
        policy.set(class, Duration::from_secs(secs));
    }
    policy
}

/// `CBB_<PROVIDER>_RATE_LIMIT`, `CBB_<PROVIDER>_BURST` and
/// `CBB_<PROVIDER>_PRIORITY`.
fn apply_provider_overrides(vars: &HashMap<String, String>, config: &mut SportsDataConfig) {
    for (name, raw) in vars {
        let Some(rest) = name.strip_prefix(PREFIX) else {
            continue;
        };

        if let Some(provider) = rest.strip_suffix("_RATE_LIMIT") {
            let provider = provider.to_ascii_lowercase();
            match raw.trim().parse::<f64>() {
                Ok(rate) if RateLimit::per_second(rate).is_valid() => {
                    config
                        .rate_limits
                        .entry(provider)
                        .or_default()
                        .requests_per_second = rate;
                }
                _ => warn!("Ignoring invalid {}={:?}", name, raw),
            }
        } else if let Some(provider) = rest.strip_suffix("_BURST") {
            let provider = provider.to_ascii_lowercase();
            match raw.trim().parse::<u32>() {
                Ok(burst) if burst > 0 => {
                    config.rate_limits.entry(provider).or_default().burst_capacity = Some(burst);
                }
                _ => warn!("Ignoring invalid {}={:?}", name, raw),
            }
        } else if let Some(provider) = rest.strip_suffix("_PRIORITY") {
            match raw.trim().parse::<i32>() {
                Ok(priority) => {
                    config
                        .priorities
                        .insert(provider.to_ascii_lowercase(), priority);
                }
                Err(e) => warn!("Ignoring invalid {}={:?}: {}", name, raw, e),
            }
        }
    }
}
