//! # Booking Reconciler
//!
//! Client-side order reconciliation for a cinema booking backend.
//!
//! The backend speaks two status vocabularies, guards its endpoints with
//! different permissions, and only lets admins read every order. This crate
//! keeps a consistent view on top of that:
//!
//! - **Status mapping** - `completed` is sent as `paid`; `paid`, `confirmed`
//!   and `completed` all count as paid → [`reconcile::status`]
//! - **Update cascade** - user-scoped pay/cancel actions first, then the
//!   generic endpoint, then a locally accepted result → [`CascadingUpdateExecutor`]
//! - **Order aggregation** - own and privileged listings merged by id → [`OrderAggregator`]
//! - **Seat availability** - seats held by paid orders for one screening → [`reconcile::taken_seats`]
//! - **Façade** - [`OrderReconciliationService`], wired up by [`BookingSystem`]
//!
//! ## Example Usage
//!
//! ```no_run
//! # async fn demo() -> Result<(), Box<dyn std::error::Error>> {
//! use booking_reconciler::{BookingSystem, ClientConfig, CurrentUser};
//!
//! let system = BookingSystem::connect(&ClientConfig::from_env()?)?;
//! system.auth.login(CurrentUser::new(1, false), Some("token".to_string()));
//!
//! let taken = system.service.get_taken_seats(5).await?;
//! let outcome = system.service.update_order_status(42, "paid").await?;
//! println!("{taken:?} {}", outcome.confirmation());
//!
//! system.shutdown().await?;
//! # Ok(())
//! # }
//! ```

pub mod app_system;
pub mod auth;
pub mod cache;
pub mod clients;
pub mod config;
pub mod domain;
pub mod error;
pub mod gateway;
pub mod reconcile;

#[cfg(test)]
mod mock_framework;

pub use app_system::{setup_tracing, BookingSystem};
pub use auth::AuthContext;
pub use cache::OrderView;
pub use config::{ClientConfig, PaymentFallback};
pub use domain::{ClientStatus, CurrentUser, NewOrder, Order, OrderStatus};
pub use error::{ConfigError, HttpError, HttpErrorKind, OrderError};
pub use gateway::{ApiGateway, HttpGateway};
pub use reconcile::{CascadingUpdateExecutor, OrderAggregator, OrderReconciliationService, StatusUpdateOutcome};
