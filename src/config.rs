use std::path::PathBuf;
use crate::book::DEFAULT_BOOK_KEY;
use crate::candidates::DedupPolicy;
use crate::error::ConfigError;
use crate::geocode::DEFAULT_BASE_URL;
use crate::utils::RetryPolicy;

const DATA_DIR: &str = "CARNET_DATA_DIR";
const BOOK_KEY: &str = "CARNET_BOOK_KEY";
const GEOCODER_URL: &str = "CARNET_GEOCODER_URL";
const SEARCH_LIMIT: &str = "CARNET_SEARCH_LIMIT";
const RETRY_TIMES: &str = "CARNET_RETRY_TIMES";
const DEDUP: &str = "CARNET_DEDUP";

/// Runtime settings, read once at startup
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// where the address book file lives
    pub data_dir: PathBuf,
    pub book_key: String,
    pub geocoder_url: String,
    pub search_limit: u32,
    pub retry: RetryPolicy,
    pub dedup: DedupPolicy,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            book_key: DEFAULT_BOOK_KEY.to_string(),
            geocoder_url: DEFAULT_BASE_URL.to_string(),
            search_limit: 1,
            retry: RetryPolicy::default(),
            dedup: DedupPolicy::default(),
        }
    }
}

impl Config {
    /// load settings from `CARNET_*` environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// load settings from any variable source, unset ones keep their default
    pub fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        if let Some(dir) = get(DATA_DIR) {
            config.data_dir = PathBuf::from(non_empty(DATA_DIR, dir)?);
        }
        if let Some(key) = get(BOOK_KEY) {
            config.book_key = non_empty(BOOK_KEY, key)?;
        }
        if let Some(url) = get(GEOCODER_URL) {
            config.geocoder_url = non_empty(GEOCODER_URL, url)?;
        }
        if let Some(limit) = get(SEARCH_LIMIT) {
            config.search_limit = number(SEARCH_LIMIT, &limit)?.max(1);
        }
        if let Some(times) = get(RETRY_TIMES) {
            config.retry = RetryPolicy::with_retries(number(RETRY_TIMES, &times)? as usize);
        }
        if let Some(dedup) = get(DEDUP) {
            config.dedup = dedup_policy(&dedup)?;
        }
        Ok(config)
    }
}

fn non_empty(name: &'static str, value: String) -> Result<String, ConfigError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ConfigError::Empty { name });
    }
    Ok(trimmed.to_string())
}

fn number(name: &'static str, value: &str) -> Result<u32, ConfigError> {
    value.trim()
        .parse()
        .map_err(|_| ConfigError::NotANumber { name, value: value.to_string() })
}

fn dedup_policy(value: &str) -> Result<DedupPolicy, ConfigError> {
    match value.trim().to_lowercase().as_str() {
        "search-key" => Ok(DedupPolicy::SearchKey),
        "address-id" => Ok(DedupPolicy::AddressId),
        _ => Err(ConfigError::UnknownDedupPolicy(value.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use super::*;

    fn config_from(vars: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let vars = vars.iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect::<HashMap<_, _>>();
        Config::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn unset_variables_keep_defaults() {
        assert_eq!(config_from(&[]).unwrap(), Config::default());
        assert_eq!(Config::default().geocoder_url, "https://api-adresse.data.gouv.fr");
        assert_eq!(Config::default().book_key, "addressBook");
    }

    #[test]
    fn variables_override_defaults() {
        let config = config_from(&[
            ("CARNET_DATA_DIR", "/var/lib/carnet"),
            ("CARNET_BOOK_KEY", "famille"),
            ("CARNET_SEARCH_LIMIT", "5"),
            ("CARNET_RETRY_TIMES", "0"),
            ("CARNET_DEDUP", "address-id"),
        ])
            .unwrap();

        assert_eq!(config.data_dir, PathBuf::from("/var/lib/carnet"));
        assert_eq!(config.book_key, "famille");
        assert_eq!(config.search_limit, 5);
        assert_eq!(config.retry.max_retries, 0);
        assert_eq!(config.dedup, DedupPolicy::AddressId);
    }

    #[test]
    fn bad_values_are_rejected() {
        assert_eq!(
            config_from(&[("CARNET_RETRY_TIMES", "many")]).unwrap_err(),
            ConfigError::NotANumber { name: "CARNET_RETRY_TIMES", value: "many".to_string() }
        );
        assert_eq!(
            config_from(&[("CARNET_BOOK_KEY", "  ")]).unwrap_err(),
            ConfigError::Empty { name: "CARNET_BOOK_KEY" }
        );
        assert!(matches!(config_from(&[("CARNET_DEDUP", "content")]), Err(ConfigError::UnknownDedupPolicy(_))));
    }

    #[test]
    fn zero_limit_is_raised_to_one() {
        assert_eq!(config_from(&[("CARNET_SEARCH_LIMIT", "0")]).unwrap().search_limit, 1);
    }
}
