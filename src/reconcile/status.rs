//! Translation between the client-facing and backend status vocabularies.

use crate::domain::{BackendStatus, ClientStatus, OrderStatus};
use crate::error::OrderError;

/// Maps a client status onto a status the generic update endpoint accepts.
///
/// # Errors
/// `InvalidStatus` when `client_status` is not `pending`, `paid`, `cancelled` or `completed`.
pub fn to_backend_update_status(client_status: &str) -> Result<BackendStatus, OrderError> {
    client_status.parse::<ClientStatus>().map(backend_status_for)
}

/// `completed` is stored as paid; the update endpoint rejects it.
pub fn backend_status_for(status: ClientStatus) -> BackendStatus {
    match status {
        ClientStatus::Pending => BackendStatus::Pending,
        ClientStatus::Paid | ClientStatus::Completed => BackendStatus::Paid,
        ClientStatus::Cancelled => BackendStatus::Cancelled,
    }
}

/// True for `paid`, `confirmed` and `completed`. Anything else, including
/// values this client does not know, counts as not paid.
pub fn is_paid_equivalent(raw_status: &str) -> bool {
    OrderStatus::parse(raw_status).is_paid_equivalent()
}
