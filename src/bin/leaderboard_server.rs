use std::{net::SocketAddr, sync::Arc};

use wagerboard::{
    api_config_from_env, init_logging, log_app_bind, log_app_start, log_source_selected,
    logging_config_from_env, site_config_from_env, site_router, AffiliateSource,
    InMemoryAffiliateSource, ReqwestAffiliateSource, SiteConfig,
};

// The blocking HTTP client cannot be built inside a tokio runtime, so the
// source is constructed here and the runtime started afterwards.
fn main() -> Result<(), Box<dyn std::error::Error>> {
    let logging_cfg = logging_config_from_env();
    init_logging(&logging_cfg)?;
    log_app_start(&logging_cfg);

    let addr: SocketAddr = std::env::var("WAGERBOARD_ADDR")
        .unwrap_or_else(|_| "127.0.0.1:8080".to_string())
        .parse()?;
    let source = source_from_env()?;
    let site_cfg = site_config_from_env();

    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?
        .block_on(serve(addr, site_cfg, source))
}

async fn serve(
    addr: SocketAddr,
    site_cfg: SiteConfig,
    source: Arc<dyn AffiliateSource>,
) -> Result<(), Box<dyn std::error::Error>> {
    let app = site_router(site_cfg, source);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    let bound_addr = listener.local_addr()?;

    log_app_bind(bound_addr);
    axum::serve(listener, app).await?;

    Ok(())
}

fn source_from_env() -> Result<Arc<dyn AffiliateSource>, Box<dyn std::error::Error>> {
    let force_demo = std::env::var("WAGERBOARD_USE_DEMO")
        .map(|raw| raw == "1" || raw.eq_ignore_ascii_case("true"))
        .unwrap_or(false);
    if force_demo {
        log_source_selected("demo", Some("WAGERBOARD_USE_DEMO"));
        return Ok(Arc::new(InMemoryAffiliateSource::demo()));
    }

    let api_cfg = api_config_from_env();
    if api_cfg.key.is_empty() {
        log_source_selected("demo", Some("missing_api_key"));
        return Ok(Arc::new(InMemoryAffiliateSource::demo()));
    }

    log_source_selected("live_affiliates", None);
    Ok(Arc::new(ReqwestAffiliateSource::new(api_cfg)?))
}
