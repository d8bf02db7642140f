use std::sync::Arc;

use tokio::task::JoinHandle;
use tracing::{error, info};

use crate::auth::AuthContext;
use crate::cache::OrderCache;
use crate::clients::OrderClient;
use crate::config::ClientConfig;
use crate::error::ConfigError;
use crate::gateway::{ApiGateway, HttpGateway};
use crate::reconcile::{CascadingUpdateExecutor, OrderAggregator, OrderReconciliationService};

/// The booking client with everything wired together.
///
/// Owns the order cache task. The service and session handles are public so
/// callers can log in and issue requests directly.
pub struct BookingSystem {
    pub auth: AuthContext,
    pub service: OrderReconciliationService,
    cache_task: JoinHandle<()>,
}

impl BookingSystem {
    /// Builds the system against the HTTP backend described by `config`.
    ///
    /// # Errors
    /// Returns `ConfigError::ClientBuild` if the HTTP client cannot be constructed.
    pub fn connect(config: &ClientConfig) -> Result<Self, ConfigError> {
        let auth = AuthContext::new();
        let gateway = HttpGateway::new(config, auth.clone())?;
        Ok(Self::new(config, Arc::new(gateway), auth))
    }

    /// Builds the system on an arbitrary gateway. Must be called inside a Tokio runtime.
    pub fn new(config: &ClientConfig, gateway: Arc<dyn ApiGateway>, auth: AuthContext) -> Self {
        info!(api = %config.api_base_url, fallback = ?config.payment_fallback, "Starting booking system");

        let (cache_actor, cache) = OrderCache::new(config.cache_buffer);
        let cache_task = tokio::spawn(cache_actor.run());

        let client = OrderClient::new(gateway.clone());
        let aggregator = OrderAggregator::new(client.clone(), auth.clone());
        let executor = CascadingUpdateExecutor::new(gateway, config.payment_fallback);
        let service = OrderReconciliationService::new(client, aggregator, executor, cache);

        Self {
            auth,
            service,
            cache_task,
        }
    }

    /// Logs out, releases the service and waits for the order cache to drain.
    ///
    /// # Errors
    /// Returns the join error text if the cache task panicked.
    pub async fn shutdown(self) -> Result<(), String> {
        info!("Stopping booking client");
        self.auth.logout();
        // Last cache handle; the cache loop ends when its channel closes.
        drop(self.service);

        self.cache_task.await.map_err(|e| {
            error!(error = %e, "Order cache task did not stop cleanly");
            format!("order cache task failed: {e}")
        })?;

        info!("Booking client stopped");
        Ok(())
    }
}
