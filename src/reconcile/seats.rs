//! Seats already taken for a screening.
//!
//! Advisory only: the result is a UI hint, not a lock. Double booking is
//! prevented (if at all) where orders are created.

use std::collections::BTreeSet;

use crate::domain::Order;

/// Union of the seats held by paid-equivalent orders for `screening_id`.
/// Cancelled and pending orders hold nothing.
pub fn taken_seats(screening_id: i64, orders: &[Order]) -> BTreeSet<String> {
    orders
        .iter()
        .filter(|order| order.screening_id == screening_id && order.status.is_paid_equivalent())
        .flat_map(|order| order.seats.iter().cloned())
        .collect()
}

/// Requested seats that are already taken, in request order.
pub fn conflicting_seats(requested: &[String], taken: &BTreeSet<String>) -> Vec<String> {
    requested.iter().filter(|seat| taken.contains(*seat)).cloned().collect()
}
