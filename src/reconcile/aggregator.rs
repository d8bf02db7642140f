//! Merging the privileged and self-scoped order listings.

use std::collections::HashMap;

use tracing::{debug, info, instrument, warn};

use crate::auth::AuthContext;
use crate::clients::OrderClient;
use crate::domain::Order;

/// Both sources as fetched. `None` marks a source that failed or was skipped;
/// it merges as empty.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OrderViews {
    pub mine: Option<Vec<Order>>,
    pub all: Option<Vec<Order>>,
}

impl OrderViews {
    /// One entry per order id, in first-seen order. When both sources hold the
    /// same id the record with more populated fields wins; on a tie the
    /// caller's own record is kept.
    pub fn merged(&self) -> Vec<Order> {
        let mine = self.mine.as_deref().unwrap_or_default();
        let all = self.all.as_deref().unwrap_or_default();
        let mut merged: Vec<Order> = Vec::with_capacity(mine.len() + all.len());
        let mut positions: HashMap<i64, usize> = HashMap::new();

        for order in mine.iter().chain(all.iter()) {
            match positions.get(&order.id) {
                Some(&at) => {
                    if order.richness() > merged[at].richness() {
                        merged[at] = order.clone();
                    }
                }
                None => {
                    positions.insert(order.id, merged.len());
                    merged.push(order.clone());
                }
            }
        }
        merged
    }
}

#[derive(Clone)]
pub struct OrderAggregator {
    client: OrderClient,
    auth: AuthContext,
}

impl OrderAggregator {
    pub fn new(client: OrderClient, auth: AuthContext) -> Self {
        Self { client, auth }
    }

    /// Merged, deduplicated orders from every source the caller can read.
    /// Never fails: an unreadable source contributes nothing.
    pub async fn load_relevant_orders(&self) -> Vec<Order> {
        self.load_views().await.merged()
    }

    #[instrument(skip(self))]
    pub async fn load_views(&self) -> OrderViews {
        let (mine, all) = tokio::join!(self.load_mine(), self.load_all());
        info!(
            mine = ?mine.as_ref().map(Vec::len),
            all = ?all.as_ref().map(Vec::len),
            "Loaded order views"
        );
        OrderViews { mine, all }
    }

    async fn load_mine(&self) -> Option<Vec<Order>> {
        match self.client.list_my_orders().await {
            Ok(orders) => Some(orders),
            Err(e) => {
                warn!(error = %e, "Own orders unavailable, continuing without them");
                None
            }
        }
    }

    async fn load_all(&self) -> Option<Vec<Order>> {
        if !self.should_fetch_all() {
            debug!("Caller is not an admin, skipping privileged listing");
            return None;
        }
        match self.client.list_all_orders().await {
            Ok(orders) => Some(orders),
            Err(e) => {
                warn!(error = %e, "Privileged order listing unavailable, continuing without it");
                None
            }
        }
    }

    /// Skipped only when the caller is known not to be an admin.
    fn should_fetch_all(&self) -> bool {
        self.auth.current_user().map_or(true, |user| user.is_admin)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use serde_json::json;

    use crate::clients::{ALL_ORDERS_PATH, MY_ORDERS_PATH};
    use crate::domain::{CurrentUser, OrderStatus, UserSummary};
    use crate::gateway::Method;
    use crate::mock_framework::{assert_no_request, create_mock_gateway, expect_request, next_requests};

    fn aggregator(user: Option<CurrentUser>) -> (OrderAggregator, tokio::sync::mpsc::Receiver<crate::mock_framework::GatewayRequest>) {
        let (gateway, rx) = create_mock_gateway(10);
        let auth = AuthContext::new();
        if let Some(user) = user {
            auth.login(user, None);
        }
        (OrderAggregator::new(OrderClient::new(Arc::new(gateway)), auth), rx)
    }

    #[test]
    fn test_merge_prefers_richer_record() {
        let own = Order::new(7, 5, vec!["B2".into(), "B3".into()], 80.0, OrderStatus::Cancelled);
        let mut privileged = own.clone();
        privileged.user = Some(UserSummary { id: Some(1), username: Some("ann".into()), email: None });
        let other = Order::new(8, 5, vec!["C1".into()], 40.0, OrderStatus::Paid);

        let views = OrderViews {
            mine: Some(vec![own]),
            all: Some(vec![other.clone(), privileged.clone()]),
        };
        let merged = views.merged();
        assert_eq!(merged, vec![privileged, other]);
    }

    #[tokio::test]
    async fn test_both_sources_merged() {
        let (aggregator, mut rx) = aggregator(Some(CurrentUser::new(1, true)));
        let task = tokio::spawn(async move { aggregator.load_relevant_orders().await });

        for request in next_requests(&mut rx, 2).await {
            match request.call.path.as_str() {
                MY_ORDERS_PATH => request.ok(json!([
                    {"id": 7, "screening_id": 5, "seats": ["B2", "B3"], "status": "cancelled"}
                ])),
                ALL_ORDERS_PATH => request.ok(json!([
                    {"id": 7, "screening_id": 5, "seats": ["B2", "B3"], "status": "cancelled"},
                    {"id": 9, "screening": {"id": 5}, "seats": "D1", "status": "confirmed"}
                ])),
                other => panic!("Unexpected path: {other}"),
            }
        }

        let orders = task.await.unwrap();
        assert_eq!(orders.iter().filter(|o| o.id == 7).count(), 1);
        assert_eq!(orders.len(), 2);
    }

    #[tokio::test]
    async fn test_failures_degrade_to_empty() {
        let (aggregator, mut rx) = aggregator(None);
        let task = tokio::spawn(async move { aggregator.load_views().await });

        for request in next_requests(&mut rx, 2).await {
            if request.call.path == MY_ORDERS_PATH {
                request.unreachable();
            } else {
                request.ok(json!({"error": "not a list"}));
            }
        }

        assert_eq!(task.await.unwrap(), OrderViews::default());
    }

    #[tokio::test]
    async fn test_non_admin_skips_privileged_listing() {
        let (aggregator, mut rx) = aggregator(Some(CurrentUser::new(2, false)));
        let task = tokio::spawn(async move { aggregator.load_views().await });

        let request = expect_request(&mut rx, Method::Get, MY_ORDERS_PATH).await.unwrap();
        request.ok(json!([]));

        assert_eq!(task.await.unwrap(), OrderViews { mine: Some(Vec::new()), all: None });
        assert_no_request(&mut rx);
    }
}
