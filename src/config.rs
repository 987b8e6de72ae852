//! Environment-driven configuration.
//!
//! All environment reads live here; the rest of the crate takes explicit
//! config structs. Every knob has a usable default, so an empty environment
//! still yields a working (demo-ready) site.

use std::env;

use chrono::NaiveDate;

use crate::affiliates::{ApiConfig, DEFAULT_API_BASE};
use crate::amount::currency_symbol;
use crate::period::{parse_period_mode, PeriodConfig, PeriodMode};
use crate::prizes::parse_prize_table;
use crate::site::{parse_theme, SiteConfig, SiteLinks};

/// Reads the page configuration: period mode and window, prize schedule,
/// currency symbol, theme, and outbound links.
pub fn site_config_from_env() -> SiteConfig {
    let mode = match env_trimmed("PERIOD_MODE") {
        Some(raw) => parse_period_mode(&raw),
        None => PeriodMode::Monthly,
    };
    let custom_start = env_trimmed("PERIOD_START")
        .and_then(|raw| NaiveDate::parse_from_str(&raw, "%Y-%m-%d").ok());
    let custom_length_days = env_trimmed("PERIOD_LENGTH_DAYS")
        .and_then(|raw| raw.parse::<u32>().ok())
        .unwrap_or(7);

    let currency = env_trimmed("PRIZE_CURRENCY").unwrap_or_else(|| "USD".to_string());
    let prize_symbol =
        env_trimmed("PRIZE_CURRENCY_SYMBOL").unwrap_or_else(|| currency_symbol(&currency));

    SiteConfig {
        theme: parse_theme(&env_trimmed("LEADERBOARD_THEME").unwrap_or_default()),
        period: PeriodConfig {
            mode,
            custom_start,
            custom_length_days,
        },
        prizes: parse_prize_table(env::var("PRIZES").ok().as_deref()),
        prize_symbol,
        links: SiteLinks {
            discord: link_from_env("DISCORD_INVITE_URL"),
            referral: link_from_env("RAINBET_REFERRAL_URL"),
            kick: link_from_env("KICK_URL"),
            instagram: link_from_env("INSTAGRAM_URL"),
        },
    }
}

/// Reads the affiliate API endpoint and key. An empty key is allowed here;
/// the server treats it as the cue to fall back to the demo source.
pub fn api_config_from_env() -> ApiConfig {
    ApiConfig {
        base: env_trimmed("RAINBET_API_BASE").unwrap_or_else(|| DEFAULT_API_BASE.to_string()),
        key: env_trimmed("RAINBET_API_KEY").unwrap_or_default(),
    }
}

fn env_trimmed(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn link_from_env(key: &str) -> String {
    env_trimmed(key).unwrap_or_else(|| "#".to_string())
}
