//! Page assembly and HTTP routes.
//!
//! One parameterized renderer serves every page variant: theme, period
//! mode, prize schedule, and link targets are configuration, not copies of
//! the page.

use std::sync::Arc;

use axum::{
    extract::State,
    response::{Html, IntoResponse},
    routing::get,
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;

use crate::affiliates::{fetch_period_pair, AffiliateSource, FetchedRows};
use crate::amount::{format_prize, format_usd};
use crate::period::{
    compute_period, human_period_label, ny_previous_display_week, Period, PeriodConfig, PeriodMode,
};
use crate::prizes::{total_prize_pool, PrizeTable};
use crate::ranking::{display_identity, rank_affiliates, top_n, totals, RankedEntry};

const DISCORD_BLURPLE: &str = "#5865F2";
const KICK_GREEN: &str = "#53FC18";
const RAINBET_BLUE: &str = "#10216E";

/// Visual pack: colors only, never behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Theme {
    pub name: &'static str,
    pub accent: &'static str,
    pub panel_tint: &'static str,
    pub pill_border: &'static str,
    pub pill_bg: &'static str,
    pub medal_glow: [&'static str; 3],
    pub show_instagram: bool,
}

pub const MANATEE: Theme = Theme {
    name: "manatee",
    accent: "#fb7185",
    panel_tint: "rgba(136,19,55,0.20)",
    pill_border: "rgba(190,18,60,0.40)",
    pill_bg: "rgba(136,19,55,0.30)",
    medal_glow: [
        "rgba(244,63,94,0.9)",
        "rgba(251,113,133,0.8)",
        "rgba(159,18,57,0.8)",
    ],
    show_instagram: true,
};

pub const MOBBIN: Theme = Theme {
    name: "mobbin",
    accent: "#7dd3fc",
    panel_tint: "rgba(12,74,110,0.20)",
    pill_border: "rgba(3,105,161,0.40)",
    pill_bg: "rgba(12,74,110,0.40)",
    medal_glow: [
        "rgba(59,130,246,0.9)",
        "rgba(191,219,254,0.8)",
        "rgba(56,189,248,0.8)",
    ],
    show_instagram: true,
};

/// Theme by name; unknown names get the manatee pack.
pub fn parse_theme(raw: &str) -> Theme {
    match raw.trim().to_ascii_lowercase().as_str() {
        "mobbin" => MOBBIN,
        _ => MANATEE,
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteLinks {
    pub discord: String,
    pub referral: String,
    pub kick: String,
    pub instagram: String,
}

impl Default for SiteLinks {
    fn default() -> Self {
        Self {
            discord: "#".to_string(),
            referral: "#".to_string(),
            kick: "#".to_string(),
            instagram: "#".to_string(),
        }
    }
}

/// Everything one render needs, resolved once at startup and passed in
/// explicitly. Components below this struct never read the environment.
#[derive(Debug, Clone)]
pub struct SiteConfig {
    pub theme: Theme,
    pub period: PeriodConfig,
    pub prizes: PrizeTable,
    pub prize_symbol: String,
    pub links: SiteLinks,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            theme: MANATEE,
            period: PeriodConfig::default(),
            prizes: PrizeTable::new(),
            prize_symbol: "$".to_string(),
            links: SiteLinks::default(),
        }
    }
}

/// One display row: ranking joined with the prize table and masked for
/// public display.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ViewEntry {
    pub rank: u32,
    pub display_name: String,
    pub wagered: f64,
    pub wagered_text: String,
    pub prize: Option<f64>,
    pub prize_text: Option<String>,
}

/// Fully derived page model, also exposed verbatim as the JSON snapshot.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LeaderboardView {
    pub title: String,
    pub period_word: String,
    pub display_start: String,
    pub display_end: String,
    pub updated_at: String,
    pub participants: usize,
    pub total_wagered: f64,
    pub total_wagered_text: String,
    pub prize_pool_text: Option<String>,
    pub entries: Vec<ViewEntry>,
    pub podium: Vec<ViewEntry>,
    pub last_winner: Option<ViewEntry>,
    pub countdown_target_ms: Option<i64>,
    pub error: Option<String>,
}

/// Builds the current-period page model from fetched rows. Pure: every
/// input, including "now", is a parameter.
pub fn build_view(
    cfg: &SiteConfig,
    now: DateTime<Utc>,
    period: &Period,
    fetched: &FetchedRows,
) -> LeaderboardView {
    let ranked = rank_affiliates(&fetched.current);
    let aggregates = totals(&ranked);
    let previous_ranked = rank_affiliates(&fetched.previous);
    let pool = total_prize_pool(&cfg.prizes);

    LeaderboardView {
        title: "Rainbet Leaderboards".to_string(),
        period_word: human_period_label(cfg.period.mode).to_string(),
        display_start: period.start_at(),
        display_end: period.end_at(),
        updated_at: format_updated_at(now),
        participants: aggregates.participants,
        total_wagered: aggregates.total_wagered,
        total_wagered_text: format_usd(aggregates.total_wagered),
        prize_pool_text: (pool > 0.0).then(|| format_prize(pool, &cfg.prize_symbol)),
        entries: view_entries(top_n(&ranked, 10), cfg),
        podium: view_entries(top_n(&ranked, 3), cfg),
        last_winner: previous_ranked.first().map(|entry| view_entry(entry, cfg)),
        countdown_target_ms: Some(period.end_utc().timestamp_millis()),
        error: fetched.error.clone(),
    }
}

/// Page model for the last completed Sunday-through-Saturday week. Header
/// dates come from the New York display calendar, not from the UTC query
/// range.
pub fn build_last_week_view(
    cfg: &SiteConfig,
    now: DateTime<Utc>,
    fetched: &FetchedRows,
) -> LeaderboardView {
    let (display_start, display_end) = ny_previous_display_week(now);
    let ranked = rank_affiliates(&fetched.current);
    let aggregates = totals(&ranked);
    let pool = total_prize_pool(&cfg.prizes);

    LeaderboardView {
        title: "Last Week Results".to_string(),
        period_word: "Week".to_string(),
        display_start: display_start.format("%Y-%m-%d").to_string(),
        display_end: display_end.format("%Y-%m-%d").to_string(),
        updated_at: format_updated_at(now),
        participants: aggregates.participants,
        total_wagered: aggregates.total_wagered,
        total_wagered_text: format_usd(aggregates.total_wagered),
        prize_pool_text: (pool > 0.0).then(|| format_prize(pool, &cfg.prize_symbol)),
        entries: view_entries(top_n(&ranked, 10), cfg),
        podium: view_entries(top_n(&ranked, 3), cfg),
        last_winner: None,
        countdown_target_ms: None,
        error: fetched.error.clone(),
    }
}

fn view_entries(entries: &[RankedEntry], cfg: &SiteConfig) -> Vec<ViewEntry> {
    entries.iter().map(|entry| view_entry(entry, cfg)).collect()
}

fn view_entry(entry: &RankedEntry, cfg: &SiteConfig) -> ViewEntry {
    let prize = cfg.prizes.get(&entry.rank).copied();
    ViewEntry {
        rank: entry.rank,
        display_name: display_identity(&entry.affiliate),
        wagered: entry.wagered,
        wagered_text: format_usd(entry.wagered),
        prize,
        prize_text: prize.map(|amount| format_prize(amount, &cfg.prize_symbol)),
    }
}

fn format_updated_at(now: DateTime<Utc>) -> String {
    now.format("%Y-%m-%d %H:%M:%S UTC").to_string()
}

pub fn render_leaderboard_html(view: &LeaderboardView, cfg: &SiteConfig) -> String {
    let theme = cfg.theme;
    let mut out = String::new();

    out.push_str("<!DOCTYPE html><html><head><meta charset=\"utf-8\">\n");
    out.push_str("<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n");
    out.push_str(&format!("<title>{}</title>\n", escape_html(&view.title)));
    out.push_str(&format!(
        "<style>:root{{--accent:{accent};--panel:{panel};--pillborder:{pill_border};--pillbg:{pill_bg}}}*{{box-sizing:border-box}}body{{margin:0;background:#000;color:#f4f4f5;font-family:\"Segoe UI\",\"Avenir Next\",sans-serif}}.shell{{max-width:1100px;margin:0 auto;padding:20px 16px 32px}}.hero{{border:1px solid #27272a;border-radius:20px;padding:20px;background:linear-gradient(180deg,var(--panel),rgba(0,0,0,.6))}}.hero h1{{margin:0;font-size:1.8rem;letter-spacing:.01em}}.hero-meta{{margin-top:6px;color:#d4d4d8;font-size:.92rem}}.btn-col{{display:flex;flex-direction:column;gap:8px;align-items:flex-end}}.btn{{display:inline-flex;justify-content:center;width:14rem;padding:8px 16px;border-radius:12px;font-weight:600;font-size:.88rem;color:#fff;text-decoration:none}}.stats{{display:grid;grid-template-columns:repeat(3,1fr);gap:12px;margin-top:20px}}.stat-card{{border:1px solid #27272a;border-radius:16px;background:rgba(24,24,27,.5);padding:14px}}.stat-card p{{margin:0}}.stat-label{{font-size:.72rem;text-transform:uppercase;letter-spacing:.04em;color:#a1a1aa}}.stat-value{{margin-top:4px;font-size:1.4rem;font-weight:600}}.winner-row{{display:flex;justify-content:space-between;align-items:center;gap:12px;flex-wrap:wrap;margin-top:14px;border:1px solid #27272a;border-radius:16px;background:rgba(24,24,27,.5);padding:14px;font-size:.9rem}}.pill{{display:inline-flex;align-items:center;gap:8px;border:1px solid var(--pillborder);background:var(--pillbg);border-radius:999px;padding:6px 14px;font-weight:600}}.podium{{display:grid;grid-template-columns:repeat(3,1fr);gap:16px;margin-top:18px;align-items:end}}.podium-card{{display:flex;flex-direction:column;align-items:center;border:1px solid #27272a;border-radius:18px;background:rgba(24,24,27,.5);min-height:15rem;padding:14px}}.medal{{display:flex;align-items:center;justify-content:center;width:6rem;height:6rem;border-radius:999px;border:2px solid var(--pillborder);background:rgba(24,24,27,.7);font-size:1.6rem;font-weight:700}}.medal-1{{box-shadow:0 0 30px {glow1}}}.medal-2{{box-shadow:0 0 30px {glow2}}}.medal-3{{box-shadow:0 0 30px {glow3}}}.podium-rank{{margin-top:8px;font-size:.75rem;color:#a1a1aa}}.podium-name{{margin-top:4px;font-size:1.05rem;font-weight:700;text-align:center;word-break:break-word}}.podium-amount{{margin-top:4px;font-size:1.3rem;font-weight:800;color:var(--accent)}}.table-card{{margin-top:18px;border:1px solid #27272a;border-radius:20px;background:rgba(9,9,11,.7);padding:18px}}table{{width:100%;border-collapse:collapse;font-size:.88rem}}th{{text-align:left;color:#d4d4d8;padding:10px}}td{{padding:10px;border-top:1px solid #27272a}}.amount-cell{{font-weight:600;color:var(--accent)}}.muted{{color:#71717a}}.error{{margin-top:14px;color:#f87171;font-size:.88rem}}@media(max-width:720px){{.stats,.podium{{grid-template-columns:1fr}}}}</style>\n",
        accent = theme.accent,
        panel = theme.panel_tint,
        pill_border = theme.pill_border,
        pill_bg = theme.pill_bg,
        glow1 = theme.medal_glow[0],
        glow2 = theme.medal_glow[1],
        glow3 = theme.medal_glow[2],
    ));
    out.push_str("</head><body><main class=\"shell\">\n");

    // Hero
    out.push_str("<section class=\"hero\">");
    out.push_str(&format!("<h1>{}</h1>", escape_html(&view.title)));
    out.push_str(&format!(
        "<p class=\"hero-meta\">{} · {} → {}</p>",
        escape_html(&view.period_word),
        escape_html(&view.display_start),
        escape_html(&view.display_end)
    ));
    out.push_str(&format!(
        "<p class=\"hero-meta\">Updated: {}</p>",
        escape_html(&view.updated_at)
    ));

    out.push_str("<div class=\"btn-col\">");
    push_button(&mut out, &cfg.links.discord, DISCORD_BLURPLE, "Join Discord");
    push_button(&mut out, &cfg.links.referral, RAINBET_BLUE, "Join Rainbet");
    push_button(&mut out, &cfg.links.kick, KICK_GREEN, "Watch on Kick");
    if theme.show_instagram {
        push_button(&mut out, &cfg.links.instagram, "#d946ef", "Instagram");
    }
    out.push_str("</div>");

    // Stat cards
    out.push_str("<div class=\"stats\">");
    push_stat_card(&mut out, "Participants", &view.participants.to_string());
    push_stat_card(&mut out, "Total Wagered", &view.total_wagered_text);
    push_stat_card(
        &mut out,
        "Total Prize Pool",
        view.prize_pool_text.as_deref().unwrap_or("—"),
    );
    out.push_str("</div>");

    // Last winner and countdown
    let visible_winner = view
        .last_winner
        .as_ref()
        .filter(|_| view.period_word != "Period");
    if visible_winner.is_some() || view.countdown_target_ms.is_some() {
        out.push_str("<div class=\"winner-row\">");
        match visible_winner {
            Some(winner) => out.push_str(&format!(
                "<div>Last {} Winner: <strong>{}</strong> <span class=\"amount-cell\">{}</span></div>",
                escape_html(&view.period_word),
                escape_html(&winner.display_name),
                escape_html(&winner.wagered_text)
            )),
            None => out.push_str("<div></div>"),
        }
        if let Some(target_ms) = view.countdown_target_ms {
            push_countdown(&mut out, target_ms);
        }
        out.push_str("</div>");
    }

    // Podium
    out.push_str("<h2>Champions Podium</h2>");
    if view.podium.is_empty() {
        out.push_str("<div class=\"table-card muted\">No data available</div>");
    } else {
        out.push_str("<div class=\"podium\">");
        for rank in [2u32, 1, 3] {
            push_podium_card(&mut out, view, cfg, rank);
        }
        out.push_str("</div>");
    }
    out.push_str("</section>\n");

    // Top-10 table
    out.push_str("<section class=\"table-card\"><h3>Participants (Top 10)</h3>\n");
    out.push_str("<table><thead><tr><th>#</th><th>Affiliate</th><th>Wagered</th><th>Prize</th></tr></thead><tbody>\n");
    for entry in &view.entries {
        out.push_str(&format!(
            "<tr><td class=\"muted\">{}</td><td>{}</td><td class=\"amount-cell\">{}</td><td>{}</td></tr>\n",
            entry.rank,
            escape_html(&entry.display_name),
            escape_html(&entry.wagered_text),
            match &entry.prize_text {
                Some(prize) => format!("<span class=\"pill\">{}</span>", escape_html(prize)),
                None => "<span class=\"muted\">—</span>".to_string(),
            }
        ));
    }
    if view.entries.is_empty() {
        out.push_str("<tr><td colspan=\"4\" class=\"muted\">No entrants yet</td></tr>\n");
    }
    out.push_str("</tbody></table></section>\n");

    if let Some(error) = &view.error {
        out.push_str(&format!(
            "<p class=\"error\">Error: {}</p>\n",
            escape_html(error)
        ));
    }

    out.push_str("</main></body></html>\n");
    out
}

fn push_button(out: &mut String, href: &str, color: &str, label: &str) {
    out.push_str(&format!(
        "<a class=\"btn\" style=\"background-color:{}\" target=\"_blank\" rel=\"noopener noreferrer\" href=\"{}\">{}</a>",
        color,
        escape_html(href),
        escape_html(label)
    ));
}

fn push_stat_card(out: &mut String, label: &str, value: &str) {
    out.push_str(&format!(
        "<div class=\"stat-card\"><p class=\"stat-label\">{}</p><p class=\"stat-value\">{}</p></div>",
        escape_html(label),
        escape_html(value)
    ));
}

fn push_podium_card(out: &mut String, view: &LeaderboardView, cfg: &SiteConfig, rank: u32) {
    let entry = view.podium.get(rank as usize - 1);
    let name = entry.map_or("—".to_string(), |e| e.display_name.clone());
    let amount = entry.map_or_else(|| format_usd(0.0), |e| e.wagered_text.clone());
    let prize_text = cfg
        .prizes
        .get(&rank)
        .map(|prize| format_prize(*prize, &cfg.prize_symbol));

    out.push_str(&format!(
        "<div class=\"podium-card\"><div class=\"medal medal-{rank}\">{rank}</div><div class=\"podium-rank\">#{rank}</div><div class=\"podium-name\">{}</div><div class=\"podium-amount\">{}</div>",
        escape_html(&name),
        escape_html(&amount)
    ));
    if let Some(prize) = prize_text {
        out.push_str(&format!(
            "<div class=\"pill\">Prize: {}</div>",
            escape_html(&prize)
        ));
    }
    out.push_str("</div>");
}

fn push_countdown(out: &mut String, target_ms: i64) {
    out.push_str(
        "<div class=\"pill\"><span>Time left (UTC):</span><span id=\"countdown-utc\">—</span></div>",
    );
    out.push_str(&format!(
        "<script>(function(){{var target={target_ms};function pad(n){{return String(n).padStart(2,'0');}}function tick(){{var el=document.getElementById('countdown-utc');if(!el){{return;}}var diff=Math.max(0,target-Date.now());var d=Math.floor(diff/86400000);diff-=d*86400000;var h=Math.floor(diff/3600000);diff-=h*3600000;var m=Math.floor(diff/60000);diff-=m*60000;var s=Math.floor(diff/1000);el.textContent=d+'d '+pad(h)+':'+pad(m)+':'+pad(s);}}tick();setInterval(tick,1000);}})();</script>"
    ));
}

fn escape_html(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

#[derive(Clone)]
struct SiteAppState {
    cfg: Arc<SiteConfig>,
    source: Arc<dyn AffiliateSource>,
}

/// Router serving the current-period page, the last-week page, and the
/// JSON snapshot.
pub fn site_router(cfg: SiteConfig, source: Arc<dyn AffiliateSource>) -> Router {
    Router::new()
        .route("/", get(get_leaderboard_html))
        .route("/snapshot", get(get_leaderboard_snapshot))
        .route("/last-week", get(get_last_week_html))
        .with_state(SiteAppState {
            cfg: Arc::new(cfg),
            source,
        })
}

async fn current_view(state: &SiteAppState) -> LeaderboardView {
    let now = Utc::now();
    let period = compute_period(&state.cfg.period, now);
    let previous = period.previous();
    let fetched = fetch_period_pair(Arc::clone(&state.source), &period, &previous).await;
    build_view(&state.cfg, now, &period, &fetched)
}

async fn get_leaderboard_html(State(state): State<SiteAppState>) -> impl IntoResponse {
    let view = current_view(&state).await;
    Html(render_leaderboard_html(&view, &state.cfg))
}

async fn get_leaderboard_snapshot(State(state): State<SiteAppState>) -> impl IntoResponse {
    let view = current_view(&state).await;
    info!(
        component = "leaderboard_server",
        event = "http.snapshot.request",
        participants = view.participants,
        degraded = view.error.is_some()
    );
    Json(view)
}

async fn get_last_week_html(State(state): State<SiteAppState>) -> impl IntoResponse {
    let now = Utc::now();
    // Last completed Sunday-through-Saturday UTC week, independent of the
    // configured period mode.
    let week_cfg = PeriodConfig {
        mode: PeriodMode::WeeklySaturdayNight,
        ..PeriodConfig::default()
    };
    let last_week = compute_period(&week_cfg, now).previous();

    let source = Arc::clone(&state.source);
    let (start_at, end_at) = (last_week.start_at(), last_week.end_at());
    let result = tokio::task::spawn_blocking(move || source.fetch(&start_at, &end_at)).await;

    let fetched = match result {
        Ok(Ok(response)) => FetchedRows {
            current: response.affiliates,
            previous: Vec::new(),
            error: None,
        },
        Ok(Err(err)) => FetchedRows {
            error: Some(err.to_string()),
            ..FetchedRows::default()
        },
        Err(join_err) => FetchedRows {
            error: Some(join_err.to_string()),
            ..FetchedRows::default()
        },
    };

    let view = build_last_week_view(&state.cfg, now, &fetched);
    Html(render_leaderboard_html(&view, &state.cfg))
}
