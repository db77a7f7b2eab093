//! Composition root: HTTP adapter, session, and stores.

use std::sync::Arc;

use tracing::info;

use crate::adapter::outbound::marketplace::HttpMarketplaceApi;
use crate::application::Dashboard;
use crate::error::Result;
use crate::infrastructure::config::Config;
use crate::port::{Confirmer, LogObserver, SessionContext};

/// Build a dashboard talking to the configured API.
///
/// A [`LogObserver`] is subscribed so every store change is traced.
#[allow(clippy::result_large_err)]
pub fn build_dashboard(
    config: &Config,
    session: Arc<dyn SessionContext>,
    confirmer: Arc<dyn Confirmer>,
) -> Result<Dashboard> {
    let api = HttpMarketplaceApi::from_config(config, Arc::clone(&session))?;
    info!(base_url = %api.base_url(), "Marketplace API configured");

    let dashboard = Dashboard::new(Arc::new(api), session, confirmer, config.close_delay());
    dashboard.subscribe(Arc::new(LogObserver));
    Ok(dashboard)
}
