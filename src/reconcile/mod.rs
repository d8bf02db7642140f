//! Order-status reconciliation and seat availability.
//!
//! - [`status`] translates between the client and backend status vocabularies
//! - [`cascade`] applies a status change through a ranked list of endpoints
//! - [`aggregator`] merges the privileged and self-scoped order listings
//! - [`seats`] derives the seats already taken for a screening
//! - [`service`] is the façade the booking UI talks to

pub mod aggregator;
pub mod cascade;
pub mod seats;
pub mod service;
pub mod status;

pub use aggregator::{OrderAggregator, OrderViews};
pub use cascade::{AttemptStrategy, CascadingUpdateExecutor, Escalation, StatusUpdateOutcome};
pub use seats::taken_seats;
pub use service::OrderReconciliationService;
pub use status::{is_paid_equivalent, to_backend_update_status};
