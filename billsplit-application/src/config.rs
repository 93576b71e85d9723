use std::{env, str::FromStr, time::Duration};

use billsplit_domain::{DraftConfig, ExtrasPolicy, SplitPolicy, UnassignedPolicy};

const DEFAULT_PARTY_SIZE: usize = 2;
const DEFAULT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_MAX_OUTPUT_TOKENS: u32 = 1024;
const DEFAULT_RETRY_OUTPUT_TOKENS: u32 = 4096;
const DEFAULT_MAX_LONG_EDGE: u32 = 1600;
const DEFAULT_JPEG_QUALITY: u8 = 80;
pub const DEFAULT_SHARE_BASE_URL: &str = "https://billsplit.invalid/s";

/// Runtime settings, read from the environment (and `.env`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// Local user's name; empty means "Me".
    pub display_name: String,
    pub party_size: usize,
    pub policy: SplitPolicy,
    pub request_timeout: Duration,
    pub max_output_tokens: u32,
    pub retry_output_tokens: u32,
    pub max_long_edge: u32,
    pub jpeg_quality: u8,
    pub share_base_url: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            display_name: String::new(),
            party_size: DEFAULT_PARTY_SIZE,
            policy: SplitPolicy::default(),
            request_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            max_output_tokens: DEFAULT_MAX_OUTPUT_TOKENS,
            retry_output_tokens: DEFAULT_RETRY_OUTPUT_TOKENS,
            max_long_edge: DEFAULT_MAX_LONG_EDGE,
            jpeg_quality: DEFAULT_JPEG_QUALITY,
            share_base_url: DEFAULT_SHARE_BASE_URL.to_owned(),
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from any key lookup. Malformed values fall back to
    /// their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let read = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_owned())
                .filter(|value| !value.is_empty())
        };

        let display_name = lookup("BILLSPLIT_DISPLAY_NAME")
            .map(|name| name.trim().to_owned())
            .unwrap_or_default();

        let party_size = parse_or(
            "BILLSPLIT_PARTY_SIZE",
            read("BILLSPLIT_PARTY_SIZE"),
            defaults.party_size,
            |size: &usize| *size >= 1,
        );
        let extras = policy_or(
            "BILLSPLIT_EXTRAS_POLICY",
            read("BILLSPLIT_EXTRAS_POLICY"),
            defaults.policy.extras,
            |value| match value {
                "pro-rata" => Some(ExtrasPolicy::ProRata),
                "payer" => Some(ExtrasPolicy::PayerAbsorbs),
                _ => None,
            },
        );
        let unassigned = policy_or(
            "BILLSPLIT_UNASSIGNED_POLICY",
            read("BILLSPLIT_UNASSIGNED_POLICY"),
            defaults.policy.unassigned,
            |value| match value {
                "split-equally" => Some(UnassignedPolicy::SplitEqually),
                "payer" => Some(UnassignedPolicy::Payer),
                _ => None,
            },
        );
        let timeout_secs = parse_or(
            "BILLSPLIT_REQUEST_TIMEOUT_SECS",
            read("BILLSPLIT_REQUEST_TIMEOUT_SECS"),
            DEFAULT_TIMEOUT_SECS,
            |secs: &u64| *secs > 0,
        );
        let max_output_tokens = parse_or(
            "BILLSPLIT_MAX_OUTPUT_TOKENS",
            read("BILLSPLIT_MAX_OUTPUT_TOKENS"),
            defaults.max_output_tokens,
            |tokens: &u32| *tokens > 0,
        );
        let retry_output_tokens = parse_or(
            "BILLSPLIT_RETRY_OUTPUT_TOKENS",
            read("BILLSPLIT_RETRY_OUTPUT_TOKENS"),
            defaults.retry_output_tokens,
            |tokens: &u32| *tokens > 0,
        );
        let max_long_edge = parse_or(
            "BILLSPLIT_MAX_LONG_EDGE",
            read("BILLSPLIT_MAX_LONG_EDGE"),
            defaults.max_long_edge,
            |edge: &u32| *edge > 0,
        );
        let jpeg_quality = parse_or(
            "BILLSPLIT_JPEG_QUALITY",
            read("BILLSPLIT_JPEG_QUALITY"),
            defaults.jpeg_quality,
            |quality: &u8| (1..=100).contains(quality),
        );
        let share_base_url = read("BILLSPLIT_SHARE_BASE_URL").unwrap_or(defaults.share_base_url);

        Self {
            display_name,
            party_size,
            policy: SplitPolicy { extras, unassigned },
            request_timeout: Duration::from_secs(timeout_secs),
            max_output_tokens,
            retry_output_tokens,
            max_long_edge,
            jpeg_quality,
            share_base_url,
        }
    }

    pub fn draft_config(&self) -> DraftConfig {
        DraftConfig {
            party_size: self.party_size,
            my_name: self.display_name.clone(),
            policy: self.policy,
        }
    }
}

fn parse_or<T>(key: &str, raw: Option<String>, default: T, valid: impl Fn(&T) -> bool) -> T
where
    T: FromStr + Copy,
{
    let Some(raw) = raw else {
        return default;
    };
    match raw.parse::<T>() {
        Ok(value) if valid(&value) => value,
        _ => {
            tracing::warn!(key, value = %raw, "Ignoring malformed setting; using default");
            default
        }
    }
}

fn policy_or<T: Copy>(
    key: &str,
    raw: Option<String>,
    default: T,
    parse: impl Fn(&str) -> Option<T>,
) -> T {
    let Some(raw) = raw else {
        return default;
    };
    parse(&raw.to_ascii_lowercase()).unwrap_or_else(|| {
        tracing::warn!(key, value = %raw, "Unknown policy; using default");
        default
    })
}
