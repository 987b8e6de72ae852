//! Wagerboard core crate.
//!
//! Affiliate wager leaderboard: lenient amount and prize-schedule parsing,
//! UTC period calendar math, ranking with identity masking, and an axum
//! site that assembles the pages from those pieces.

mod affiliates;
mod amount;
mod config;
mod observability;
mod period;
mod prizes;
mod ranking;
mod site;

pub use affiliates::{
    demo_affiliates, fetch_period_pair, Affiliate, AffiliateFetchError, AffiliateSource,
    AffiliatesResponse, ApiConfig, FailingAffiliateSource, FetchedRows, InMemoryAffiliateSource,
    ReqwestAffiliateSource, DEFAULT_API_BASE,
};
pub use amount::{currency_symbol, format_prize, format_usd, parse_amount};
pub use config::{api_config_from_env, site_config_from_env};
pub use observability::{
    init_logging, log_app_bind, log_app_start, log_source_selected, logging_config_from_env,
    LogFormat, LoggingConfig, LoggingInitError,
};
pub use period::{
    compute_period, human_period_label, ny_display_week, ny_previous_display_week,
    parse_period_mode, Period, PeriodConfig, PeriodMode,
};
pub use prizes::{parse_prize_table, total_prize_pool, PrizeTable};
pub use ranking::{
    display_identity, mask_identity, rank_affiliates, top_n, totals, LeaderboardTotals,
    RankedEntry,
};
pub use site::{
    build_last_week_view, build_view, parse_theme, render_leaderboard_html, site_router,
    LeaderboardView, SiteConfig, SiteLinks, Theme, ViewEntry, MANATEE, MOBBIN,
};
