use std::env;

use booking_reconciler::{setup_tracing, BookingSystem, ClientConfig, CurrentUser};
use tracing::{error, info, Instrument};

#[tokio::main]
async fn main() -> Result<(), String> {
    // Setup tracing once for the entire application
    setup_tracing();

    let config = ClientConfig::from_env().map_err(|e| e.to_string())?;
    let system = BookingSystem::connect(&config).map_err(|e| e.to_string())?;

    if let Some(user_id) = env::var("BOOKING_USER_ID").ok().and_then(|id| id.parse().ok()) {
        let is_admin = env::var("BOOKING_IS_ADMIN").map(|v| v == "true" || v == "1").unwrap_or(false);
        system.auth.login(CurrentUser::new(user_id, is_admin), env::var("BOOKING_TOKEN").ok());
    }

    let screening_id: i64 = env::args()
        .nth(1)
        .ok_or_else(|| "usage: booking_reconciler <screening-id> [<order-id> <status>]".to_string())?
        .parse()
        .map_err(|e| format!("invalid screening id: {e}"))?;

    let span = tracing::info_span!("seat_availability", screening_id);
    let taken = async { system.service.get_taken_seats(screening_id).await }
        .instrument(span)
        .await
        .map_err(|e| e.to_string())?;
    info!(count = taken.len(), "Seats taken");
    println!("{}", taken.into_iter().collect::<Vec<_>>().join(","));

    if let (Some(order_id), Some(status)) = (env::args().nth(2), env::args().nth(3)) {
        let order_id: i64 = order_id.parse().map_err(|e| format!("invalid order id: {e}"))?;

        let span = tracing::info_span!("status_update", order_id);
        let result = async { system.service.update_order_status(order_id, &status).await }
            .instrument(span)
            .await;

        match result {
            Ok(outcome) => info!(client_processed = outcome.client_processed, "{}", outcome.confirmation()),
            Err(e) => error!(error = %e, "Status update failed"),
        }
    }

    system.shutdown().await?;
    Ok(())
}
