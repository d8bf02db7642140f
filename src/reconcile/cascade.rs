//! Applying a status change through a ranked list of endpoints.
//!
//! Each [`AttemptStrategy`] describes one endpoint: which statuses it serves,
//! the request it sends, and what a failure escalates to. The executor runs
//! them in order and stops at the first success or the first terminal
//! escalation. When no remote write happens but the failure is recoverable,
//! the result is synthesized locally and marked `client_processed`.

use std::sync::Arc;

use serde::Serialize;
use serde_json::json;
use tracing::{debug, error, info, instrument, warn};

use crate::clients::{cancel_action_path, order_path, pay_action_path};
use crate::config::PaymentFallback;
use crate::domain::{BackendStatus, ClientStatus};
use crate::error::{HttpError, HttpErrorKind, OrderError};
use crate::gateway::{ApiGateway, GatewayCall, Method};
use crate::reconcile::status::backend_status_for;

/// What a failed attempt leads to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Escalation {
    NextAttempt,
    Synthesize,
    Propagate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttemptStrategy {
    /// `POST users/current/orders/{id}/pay`
    PayAction,
    /// `POST users/current/orders/{id}/cancel`
    CancelAction,
    /// `PUT orders/{id}` with `{status}`
    GenericUpdate,
}

impl AttemptStrategy {
    /// Strategies to try for `status`, in order.
    pub fn plan(status: BackendStatus) -> Vec<AttemptStrategy> {
        [
            AttemptStrategy::PayAction,
            AttemptStrategy::CancelAction,
            AttemptStrategy::GenericUpdate,
        ]
        .into_iter()
        .filter(|strategy| strategy.applies_to(status))
        .collect()
    }

    pub fn applies_to(&self, status: BackendStatus) -> bool {
        match self {
            AttemptStrategy::PayAction => status == BackendStatus::Paid,
            AttemptStrategy::CancelAction => status == BackendStatus::Cancelled,
            AttemptStrategy::GenericUpdate => true,
        }
    }

    pub fn call(&self, order_id: i64, status: BackendStatus) -> GatewayCall {
        match self {
            AttemptStrategy::PayAction => GatewayCall::new(Method::Post, pay_action_path(order_id), None),
            AttemptStrategy::CancelAction => GatewayCall::new(Method::Post, cancel_action_path(order_id), None),
            AttemptStrategy::GenericUpdate => GatewayCall::new(
                Method::Put,
                order_path(order_id),
                Some(json!({ "status": status.as_str() })),
            ),
        }
    }

    pub fn escalation(&self, error: &HttpError, policy: PaymentFallback) -> Escalation {
        match self {
            // A payment is never retried through the generic endpoint once the
            // pay action is known to be missing.
            AttemptStrategy::PayAction if !error.is_unavailable() => Escalation::NextAttempt,
            AttemptStrategy::PayAction
                if error.kind == HttpErrorKind::NetworkUnreachable && policy == PaymentFallback::Strict =>
            {
                Escalation::NextAttempt
            }
            AttemptStrategy::PayAction => Escalation::Synthesize,
            AttemptStrategy::CancelAction => Escalation::NextAttempt,
            AttemptStrategy::GenericUpdate if error.is_forbidden() => Escalation::Synthesize,
            AttemptStrategy::GenericUpdate => Escalation::Propagate,
        }
    }
}

/// Result of a status change as reported to the UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusUpdateOutcome {
    pub id: i64,
    pub status: ClientStatus,
    /// No authoritative write happened; the UI proceeds optimistically.
    pub client_processed: bool,
}

impl StatusUpdateOutcome {
    fn remote(id: i64, status: ClientStatus) -> Self {
        Self { id, status, client_processed: false }
    }

    fn synthesized(id: i64, status: ClientStatus) -> Self {
        Self { id, status, client_processed: true }
    }

    /// Success wording for the UI. Client-processed outcomes read softer but are never errors.
    pub fn confirmation(&self) -> &'static str {
        match (self.status, self.client_processed) {
            (ClientStatus::Paid | ClientStatus::Completed, false) => "Payment successful",
            (ClientStatus::Paid | ClientStatus::Completed, true) => "Payment recorded, awaiting confirmation",
            (ClientStatus::Cancelled, false) => "Order cancelled",
            (ClientStatus::Cancelled, true) => "Cancellation recorded, awaiting confirmation",
            (ClientStatus::Pending, false) => "Order updated",
            (ClientStatus::Pending, true) => "Update recorded, awaiting confirmation",
        }
    }
}

#[derive(Clone)]
pub struct CascadingUpdateExecutor {
    gateway: Arc<dyn ApiGateway>,
    policy: PaymentFallback,
}

impl CascadingUpdateExecutor {
    pub fn new(gateway: Arc<dyn ApiGateway>, policy: PaymentFallback) -> Self {
        Self { gateway, policy }
    }

    /// Applies `client_status` to an order.
    ///
    /// # Errors
    /// - `InvalidStatus` before any request is sent
    /// - `UpdateRejected` when the generic endpoint fails for a reason other than permission
    #[instrument(skip(self))]
    pub async fn apply_status(&self, order_id: i64, client_status: &str) -> Result<StatusUpdateOutcome, OrderError> {
        let status: ClientStatus = client_status.parse()?;
        let backend_status = backend_status_for(status);
        debug!(%backend_status, "Mapped status");

        for strategy in AttemptStrategy::plan(backend_status) {
            let call = strategy.call(order_id, backend_status);
            debug!(?strategy, path = %call.path, "Sending request");

            let error = match self.gateway.execute(call).await {
                Ok(_) => {
                    info!(?strategy, "Status applied remotely");
                    return Ok(StatusUpdateOutcome::remote(order_id, status));
                }
                Err(error) => error,
            };

            match strategy.escalation(&error, self.policy) {
                Escalation::NextAttempt => {
                    warn!(?strategy, error = %error, "Attempt failed, falling back");
                }
                Escalation::Synthesize => {
                    warn!(?strategy, error = %error, "Remote update unavailable, accepting locally");
                    return Ok(StatusUpdateOutcome::synthesized(order_id, status));
                }
                Escalation::Propagate => {
                    error!(?strategy, error = %error, "Status update rejected");
                    return Err(OrderError::UpdateRejected { order_id, source: error });
                }
            }
        }

        warn!("All remote attempts failed, accepting locally");
        Ok(StatusUpdateOutcome::synthesized(order_id, status))
    }
}
