use std::collections::BTreeSet;

use tracing::{error, info, instrument, warn};

use crate::cache::{OrderCacheClient, OrderView};
use crate::clients::OrderClient;
use crate::domain::{NewOrder, Order, OrderStatus};
use crate::error::OrderError;
use crate::reconcile::aggregator::OrderAggregator;
use crate::reconcile::cascade::{CascadingUpdateExecutor, StatusUpdateOutcome};
use crate::reconcile::seats::{conflicting_seats, taken_seats};

/// Entry point for the booking UI.
///
/// Combines the aggregator, the seat resolver and the update cascade, and
/// keeps the order cache in line with what the user was told.
#[derive(Clone)]
pub struct OrderReconciliationService {
    client: OrderClient,
    aggregator: OrderAggregator,
    executor: CascadingUpdateExecutor,
    cache: OrderCacheClient,
}

impl OrderReconciliationService {
    pub fn new(
        client: OrderClient,
        aggregator: OrderAggregator,
        executor: CascadingUpdateExecutor,
        cache: OrderCacheClient,
    ) -> Self {
        Self {
            client,
            aggregator,
            executor,
            cache,
        }
    }

    /// Seats held by paid-equivalent orders for a screening.
    ///
    /// Refreshes the cached `All` and `Mine` views on the way. A source that
    /// failed or was skipped keeps its previously cached view.
    #[instrument(skip(self))]
    pub async fn get_taken_seats(&self, screening_id: i64) -> Result<BTreeSet<String>, OrderError> {
        let views = self.aggregator.load_views().await;
        let merged = views.merged();

        if let Some(mine) = views.mine {
            self.cache.replace_view(OrderView::Mine, mine).await?;
        }
        if let Some(all) = views.all {
            self.cache.replace_view(OrderView::All, all).await?;
        }

        let taken = taken_seats(screening_id, &merged);
        info!(taken = taken.len(), "Resolved taken seats");
        Ok(taken)
    }

    /// Applies a status change and mirrors it into every cached view holding the order.
    ///
    /// # Errors
    /// `InvalidStatus` and `UpdateRejected` from the cascade; the cache is left untouched.
    #[instrument(skip(self))]
    pub async fn update_order_status(&self, order_id: i64, status: &str) -> Result<StatusUpdateOutcome, OrderError> {
        let outcome = self.executor.apply_status(order_id, status).await?;

        let touched = self
            .cache
            .apply_status(order_id, OrderStatus::from(outcome.status))
            .await?;
        if outcome.client_processed {
            warn!(touched, "Status accepted locally, pending reconciliation");
        } else {
            info!(touched, "Status updated");
        }
        Ok(outcome)
    }

    /// Places an order after an advisory check against seats already taken.
    ///
    /// # Errors
    /// - `DataShapeError` for an empty seat selection
    /// - `SeatsUnavailable` when any requested seat is already taken
    /// - `Gateway` / `DataShapeError` from the create call
    #[instrument(skip(self), fields(screening_id = order.screening_id))]
    pub async fn create_order(&self, order: NewOrder) -> Result<i64, OrderError> {
        if order.seats.is_empty() {
            return Err(OrderError::DataShapeError("an order needs at least one seat".to_string()));
        }

        let taken = self.get_taken_seats(order.screening_id).await?;
        let conflicts = conflicting_seats(&order.seats, &taken);
        if !conflicts.is_empty() {
            error!(?conflicts, "Requested seats already taken");
            return Err(OrderError::SeatsUnavailable(conflicts));
        }

        self.client.create_order(&order).await
    }

    /// Loads one order and makes it the current view.
    #[instrument(skip(self))]
    pub async fn view_order(&self, order_id: i64) -> Result<Order, OrderError> {
        let order = self.client.get_order(order_id).await?;
        self.cache.set_current(Some(order.clone())).await?;
        Ok(order)
    }

    pub async fn close_order(&self) -> Result<(), OrderError> {
        self.cache.set_current(None).await
    }

    pub async fn cached_orders(&self, view: OrderView) -> Result<Vec<Order>, OrderError> {
        self.cache.snapshot(view).await
    }
}
