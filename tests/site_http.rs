use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
};
use tower::util::ServiceExt;
use wagerboard::{
    parse_prize_table, site_router, Affiliate, AffiliatesResponse, FailingAffiliateSource,
    InMemoryAffiliateSource, SiteConfig,
};

fn affiliate(name: &str, amount: &str) -> Affiliate {
    Affiliate {
        username: Some(name.to_string()),
        id: None,
        wagered_amount: Some(amount.to_string()),
    }
}

fn fallback_source(rows: Vec<Affiliate>) -> Arc<InMemoryAffiliateSource> {
    Arc::new(InMemoryAffiliateSource::with_fallback(AffiliatesResponse {
        affiliates: rows,
        cache_updated_at: None,
    }))
}

fn site_cfg() -> SiteConfig {
    SiteConfig {
        prizes: parse_prize_table(Some("100,60,40")),
        ..SiteConfig::default()
    }
}

async fn get(app: axum::Router, uri: &str) -> (StatusCode, String) {
    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, String::from_utf8(body.to_vec()).unwrap())
}

#[tokio::test]
async fn leaderboard_page_renders_podium_table_and_countdown() {
    let source = fallback_source(vec![
        affiliate("highroller", "500"),
        affiliate("runnersup", "300"),
        affiliate("thirdbest", "100"),
    ]);

    let app = site_router(site_cfg(), source);
    let (status, text) = get(app, "/").await;

    assert_eq!(status, StatusCode::OK);
    assert!(text.contains("Rainbet Leaderboards"));
    assert!(text.contains("Champions Podium"));
    assert!(text.contains("hi*******r"));
    assert!(text.contains("ru******p"));
    assert!(text.contains("Prize: $100"));
    assert!(text.contains("Join Discord"));
    assert!(text.contains("Join Rainbet"));
    assert!(text.contains("Watch on Kick"));
    assert!(text.contains("countdown-utc"));
    assert!(text.contains("Participants (Top 10)"));
    // Raw identities never reach the page.
    assert!(!text.contains("highroller"));
}

#[tokio::test]
async fn snapshot_endpoint_returns_ranked_masked_json() {
    let source = fallback_source(vec![
        affiliate("smallfry", "10"),
        affiliate("highroller", "500"),
    ]);

    let app = site_router(site_cfg(), source);
    let (status, text) = get(app, "/snapshot").await;

    assert_eq!(status, StatusCode::OK);
    let json: serde_json::Value = serde_json::from_str(&text).unwrap();

    assert_eq!(json["participants"], 2);
    assert_eq!(json["total_wagered"], 510.0);
    assert_eq!(json["error"], serde_json::Value::Null);

    let date_re = regex::Regex::new(r"^\d{4}-\d{2}-\d{2}$").unwrap();
    assert!(date_re.is_match(json["display_start"].as_str().unwrap()));
    assert!(date_re.is_match(json["display_end"].as_str().unwrap()));

    let entries = json["entries"].as_array().unwrap();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0]["rank"], 1);
    assert_eq!(entries[0]["display_name"], "hi*******r");
    assert_eq!(entries[0]["wagered"], 500.0);
    assert_eq!(entries[0]["prize"], 100.0);
    assert_eq!(entries[1]["prize"], 60.0);

    // The fallback source answers the previous range too, so a last winner
    // is present and masked.
    assert_eq!(json["last_winner"]["display_name"], "hi*******r");
}

#[tokio::test]
async fn failing_source_degrades_to_an_empty_page_with_the_error() {
    let source = Arc::new(FailingAffiliateSource {
        message: "connection refused".to_string(),
    });

    let app = site_router(site_cfg(), source);
    let (status, text) = get(app, "/").await;

    assert_eq!(status, StatusCode::OK);
    assert!(text.contains("No entrants yet"));
    assert!(text.contains("No data available"));
    assert!(text.contains("connection refused"));
}

#[tokio::test]
async fn failing_source_degrades_the_snapshot_too() {
    let source = Arc::new(FailingAffiliateSource {
        message: "connection refused".to_string(),
    });

    let app = site_router(site_cfg(), source);
    let (status, text) = get(app, "/snapshot").await;

    assert_eq!(status, StatusCode::OK);
    let json: serde_json::Value = serde_json::from_str(&text).unwrap();
    assert_eq!(json["participants"], 0);
    assert!(json["entries"].as_array().unwrap().is_empty());
    assert!(json["error"]
        .as_str()
        .unwrap()
        .contains("connection refused"));
}

#[tokio::test]
async fn last_week_route_renders_without_a_countdown() {
    let source = fallback_source(vec![affiliate("weekwinner", "750")]);

    let app = site_router(site_cfg(), source);
    let (status, text) = get(app, "/last-week").await;

    assert_eq!(status, StatusCode::OK);
    assert!(text.contains("Last Week Results"));
    assert!(text.contains("we*******r"));
    assert!(!text.contains("countdown-utc"));
    assert!(!text.contains("Winner:"));
}

#[tokio::test]
async fn demo_source_serves_a_full_board() {
    let source = Arc::new(InMemoryAffiliateSource::demo());

    let app = site_router(site_cfg(), source);
    let (status, text) = get(app, "/snapshot").await;

    assert_eq!(status, StatusCode::OK);
    let json: serde_json::Value = serde_json::from_str(&text).unwrap();
    assert_eq!(json["participants"], 12);
    assert_eq!(json["entries"].as_array().unwrap().len(), 10);
    assert_eq!(json["podium"].as_array().unwrap().len(), 3);
}
