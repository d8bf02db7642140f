use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, error, info, instrument};

use crate::domain::{NewOrder, Order};
use crate::error::OrderError;
use crate::gateway::ApiGateway;

pub const ALL_ORDERS_PATH: &str = "orders";
pub const MY_ORDERS_PATH: &str = "users/current/orders";

pub fn order_path(order_id: i64) -> String {
    format!("orders/{order_id}")
}

pub fn pay_action_path(order_id: i64) -> String {
    format!("users/current/orders/{order_id}/pay")
}

pub fn cancel_action_path(order_id: i64) -> String {
    format!("users/current/orders/{order_id}/cancel")
}

/// Client for the order endpoints.
///
/// Decodes responses into [`Order`] values. Transport failures come back as
/// `OrderError::Gateway` so callers can decide whether they are recoverable.
#[derive(Clone)]
pub struct OrderClient {
    gateway: Arc<dyn ApiGateway>,
}

impl OrderClient {
    pub fn new(gateway: Arc<dyn ApiGateway>) -> Self {
        Self { gateway }
    }

    /// Privileged listing of every order.
    #[instrument(skip(self))]
    pub async fn list_all_orders(&self) -> Result<Vec<Order>, OrderError> {
        debug!("Sending request");
        let body = self.gateway.get(ALL_ORDERS_PATH).await?;
        Order::list_from_value(&body)
    }

    /// Orders owned by the authenticated caller.
    #[instrument(skip(self))]
    pub async fn list_my_orders(&self) -> Result<Vec<Order>, OrderError> {
        debug!("Sending request");
        let body = self.gateway.get(MY_ORDERS_PATH).await?;
        Order::list_from_value(&body)
    }

    #[instrument(skip(self))]
    pub async fn get_order(&self, order_id: i64) -> Result<Order, OrderError> {
        debug!("Sending request");
        let body = self.gateway.get(&order_path(order_id)).await?;
        Order::from_value(&body)
    }

    /// Creates an order and returns its server-assigned id.
    #[instrument(skip(self), fields(screening_id = order.screening_id, seats = order.seats.len()))]
    pub async fn create_order(&self, order: &NewOrder) -> Result<i64, OrderError> {
        debug!("Sending request");
        let body = self
            .gateway
            .post(ALL_ORDERS_PATH, Some(order.to_body()))
            .await
            .map_err(|e| {
                error!(error = %e, "Order creation failed");
                OrderError::from(e)
            })?;

        let order_id = created_order_id(&body)
            .ok_or_else(|| OrderError::DataShapeError(format!("create response carries no order id: {body}")))?;
        info!(order_id, "Order created");
        Ok(order_id)
    }
}

fn created_order_id(body: &Value) -> Option<i64> {
    body.get("order_id")
        .or_else(|| body.get("id"))
        .and_then(|id| match id {
            Value::Number(n) => n.as_i64(),
            Value::String(s) => s.parse().ok(),
            _ => None,
        })
}
