use std::env;
use std::num::NonZeroU32;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result};
use dotenvy::dotenv;
use github_client::Token;

use crate::intake::IntakePolicy;
use crate::pipeline::eligibility::EligibilityRules;

/// Configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    /// Required by the crawler only
    pub github_token: Option<Token>,
    pub main_repository: String,
    /// Zero means cached users never expire
    pub user_expiration_delay: chrono::Duration,
    pub main_repository_scan_delay: Duration,
    pub task_repository_scan_delay: Duration,
    pub task_repository_max_stargazer_pages: NonZeroU32,
    pub task_repository_exclusions: Vec<String>,
    pub task_repository_org_contributors_to_check: usize,
    pub log_level: String,
    pub port: u16,
    /// Zero regenerates on every request
    pub regenerate_delay: chrono::Duration,
    pub max_entries_count: u64,
}

fn parse_or<T>(lookup: &impl Fn(&str) -> Option<String>, name: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(name) {
        Some(value) => value
            .trim()
            .parse()
            .with_context(|| format!("{name} must be a valid number")),
        None => Ok(default),
    }
}

/// A delay in whole seconds, bounded so that adding it to a timestamp
/// cannot overflow.
fn parse_seconds(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &str,
    default: u64,
) -> Result<chrono::Duration> {
    let seconds: u64 = parse_or(lookup, name, default)?;
    if seconds > MAX_DELAY_SECONDS {
        anyhow::bail!("{name} must be at most {MAX_DELAY_SECONDS} seconds");
    }
    i64::try_from(seconds)
        .ok()
        .and_then(chrono::Duration::try_seconds)
        .with_context(|| format!("{name} is out of range"))
}

/// 1000 years.
const MAX_DELAY_SECONDS: u64 = 1000 * 366 * 24 * 3600;

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present (development)
        let _ = dotenv();

        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Load configuration from any key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let max_pages: u32 = parse_or(&lookup, "STARGAZER_TASK_REPOSITORY_MAX_STARGAZER_PAGES", 10)?;
        let task_repository_max_stargazer_pages = NonZeroU32::new(max_pages)
            .context("STARGAZER_TASK_REPOSITORY_MAX_STARGAZER_PAGES must be at least 1")?;

        let port = match lookup("STARGAZER_PORT") {
            Some(_) => parse_or(&lookup, "STARGAZER_PORT", 8080)?,
            None => parse_or(&lookup, "PORT", 8080)?,
        };

        let task_repository_exclusions = lookup("STARGAZER_TASK_REPOSITORY_EXCLUSIONS")
            .unwrap_or_else(|| "richardlt/stargazer".to_string())
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from)
            .collect();

        Ok(Self {
            database_url: lookup("DATABASE_URL").context("DATABASE_URL must be set")?,
            github_token: lookup("STARGAZER_GH_TOKEN")
                .filter(|t| !t.is_empty())
                .map(Token::from),
            main_repository: lookup("STARGAZER_MAIN_REPOSITORY")
                .unwrap_or_else(|| "richardlt/stargazer".to_string()),
            user_expiration_delay: parse_seconds(&lookup, "STARGAZER_USER_EXPIRATION_DELAY", 3600)?,
            main_repository_scan_delay: Duration::from_secs(parse_or(
                &lookup,
                "STARGAZER_MAIN_REPOSITORY_SCAN_DELAY",
                30,
            )?),
            task_repository_scan_delay: Duration::from_secs(parse_or(
                &lookup,
                "STARGAZER_TASK_REPOSITORY_SCAN_DELAY",
                30,
            )?),
            task_repository_max_stargazer_pages,
            task_repository_exclusions,
            task_repository_org_contributors_to_check: parse_or(
                &lookup,
                "STARGAZER_TASK_REPOSITORY_ORG_CONTRIBUTORS_TO_CHECK",
                3,
            )?,
            log_level: lookup("STARGAZER_LOG_LEVEL").unwrap_or_else(|| "info".to_string()),
            port,
            regenerate_delay: parse_seconds(&lookup, "STARGAZER_REGENERATE_DELAY", 86400)?,
            max_entries_count: parse_or(&lookup, "STARGAZER_MAX_ENTRIES_COUNT", 100)?,
        })
    }

    pub fn eligibility_rules(&self) -> EligibilityRules {
        EligibilityRules {
            main_repository: self.main_repository.clone(),
            exclusions: self.task_repository_exclusions.clone(),
            contributors_to_check: self.task_repository_org_contributors_to_check,
        }
    }

    pub fn intake_policy(&self) -> IntakePolicy {
        IntakePolicy {
            max_entries: self.max_entries_count,
            regenerate_delay: self.regenerate_delay,
        }
    }

    pub fn user_ttl(&self) -> chrono::Duration {
        self.user_expiration_delay
    }
}
