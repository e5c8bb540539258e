use chrono_tz::Tz;
use dosewatch_domain::RetryPolicy;
use dosewatch_utils::create_random_secret;
use std::{fmt::Display, str::FromStr};
use tracing::{info, warn};

const API_KEY_LEN: usize = 32;
const MILLIS_PER_HOUR: i64 = 1000 * 60 * 60;

#[derive(Debug, Clone)]
pub struct TwilioConfig {
    pub account_sid: String,
    pub auth_token: String,
    /// The sender phone number
    pub from_number: String,
    pub api_url: String,
}

#[derive(Debug, Clone)]
pub struct Config {
    /// Secret api key the UI layer has to send in the `x-api-key` header
    pub api_key: String,
    /// Port for the application to run on
    pub port: usize,
    /// Timezone used to interpret dose times when a prescription
    /// does not specify one
    pub default_timezone: Tz,
    /// How often the scheduler looks for due reminders
    pub reminder_tick_secs: u64,
    /// How often the retention cleanup runs
    pub cleanup_interval_secs: u64,
    /// How often reminders are generated for the rolling window
    /// of active medication plans
    pub expansion_interval_secs: u64,
    /// How far ahead reminders are generated
    pub generation_window_millis: i64,
    /// How long sent, failed and dismissed reminders are kept
    pub retention_millis: i64,
    /// Maximum number of reminders dispatched concurrently in one pass
    pub dispatch_concurrency: usize,
    /// Timeout for a single provider or profile service call
    pub notifier_timeout_secs: u64,
    /// A claim older than this is considered abandoned
    pub claim_lease_millis: i64,
    pub retry_policy: RetryPolicy,
    /// Maximum number of rows fetched by a single store query.
    /// Everything beyond the first indexed field is filtered in memory
    /// so this bounds the amount of work per query.
    pub query_limit: usize,
    pub push_api_url: String,
    pub push_access_token: Option<String>,
    pub profile_service_url: Option<String>,
    /// Sent as `x-api-key` to the profile service
    pub profile_service_api_key: Option<String>,
    pub twilio: Option<TwilioConfig>,
}

fn env_var(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn parse_env<T>(key: &str, default: T) -> T
where
    T: FromStr + Display,
{
    match env_var(key) {
        None => default,
        Some(value) => match value.parse::<T>() {
            Ok(parsed) => parsed,
            Err(_) => {
                warn!(
                    "The given {}: {} is not valid, falling back to the default: {}.",
                    key, value, default
                );
                default
            }
        },
    }
}

fn parse_url_env(key: &str) -> Option<String> {
    let value = env_var(key)?;
    match url::Url::parse(&value) {
        Ok(parsed) if parsed.scheme() == "https" || parsed.scheme() == "http" => {
            Some(value.trim_end_matches('/').to_string())
        }
        _ => {
            warn!("The given {}: {} is not a valid url, ignoring it.", key, value);
            None
        }
    }
}

impl Config {
    pub fn new() -> Self {
        let api_key = match env_var("API_KEY") {
            Some(key) => key,
            None => {
                info!("Did not find API_KEY environment variable. Going to create one.");
                let key = create_random_secret(API_KEY_LEN);
                info!("Api key was generated and set to: {}", key);
                key
            }
        };

        let default_timezone = match env_var("DEFAULT_TIMEZONE") {
            None => chrono_tz::UTC,
            Some(tz) => tz.parse::<Tz>().unwrap_or_else(|_| {
                warn!(
                    "The given DEFAULT_TIMEZONE: {} is not valid, falling back to UTC.",
                    tz
                );
                chrono_tz::UTC
            }),
        };

        let notifier_timeout_secs = parse_env("NOTIFIER_TIMEOUT_SECONDS", 15_u64).max(10).min(30);

        let retry_policy = RetryPolicy {
            max_attempts: parse_env("REMINDER_MAX_ATTEMPTS", 1_i64).max(1),
            base_delay_millis: parse_env("REMINDER_RETRY_BASE_SECONDS", 60_i64).max(1) * 1000,
            multiplier: 2.0,
        };

        let twilio = match (
            env_var("TWILIO_ACCOUNT_SID"),
            env_var("TWILIO_AUTH_TOKEN"),
            env_var("TWILIO_FROM_NUMBER"),
        ) {
            (Some(account_sid), Some(auth_token), Some(from_number)) => Some(TwilioConfig {
                account_sid,
                auth_token,
                from_number,
                api_url: parse_url_env("TWILIO_API_URL")
                    .unwrap_or_else(|| "https://api.twilio.com".into()),
            }),
            _ => {
                info!("Twilio credentials are not set, the messaging channel is disabled.");
                None
            }
        };

        Self {
            api_key,
            port: parse_env("PORT", 5000),
            default_timezone,
            reminder_tick_secs: parse_env("REMINDER_TICK_SECONDS", 60_u64).max(1),
            cleanup_interval_secs: parse_env("REMINDER_CLEANUP_INTERVAL_HOURS", 24_u64).max(1)
                * 60
                * 60,
            expansion_interval_secs: parse_env("REMINDER_EXPANSION_INTERVAL_MINUTES", 60_u64)
                .max(1)
                * 60,
            generation_window_millis: parse_env("REMINDER_GENERATION_WINDOW_HOURS", 24_i64)
                .max(1)
                * MILLIS_PER_HOUR,
            retention_millis: parse_env("REMINDER_RETENTION_DAYS", 7_i64).max(1) * 24 * MILLIS_PER_HOUR,
            dispatch_concurrency: parse_env("REMINDER_DISPATCH_CONCURRENCY", 8_usize).max(1),
            notifier_timeout_secs,
            claim_lease_millis: parse_env("REMINDER_CLAIM_LEASE_SECONDS", 300_i64).max(1) * 1000,
            retry_policy,
            query_limit: parse_env("REMINDER_QUERY_LIMIT", 500_usize).max(1),
            push_api_url: parse_url_env("PUSH_API_URL")
                .unwrap_or_else(|| "https://exp.host/--/api/v2/push/send".into()),
            push_access_token: env_var("PUSH_ACCESS_TOKEN"),
            profile_service_url: parse_url_env("PROFILE_SERVICE_URL"),
            profile_service_api_key: env_var("PROFILE_SERVICE_API_KEY"),
            twilio,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}
