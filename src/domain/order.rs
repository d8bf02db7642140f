use chrono::{DateTime, NaiveDateTime};
use serde::Serialize;
use serde_json::{json, Map, Value};
use tracing::warn;

use crate::domain::{OrderStatus, UserSummary};
use crate::error::OrderError;

const TIMESTAMP_FORMATS: [&str; 3] = ["%Y-%m-%d %H:%M", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M"];

/// Movie summary embedded in order records.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct MovieSummary {
    pub id: Option<i64>,
    pub title: Option<String>,
    pub poster_url: Option<String>,
}

/// Screening summary embedded in order records.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct ScreeningSummary {
    pub id: Option<i64>,
    pub theater: Option<String>,
    pub hall: Option<String>,
    pub screening_time: Option<String>,
    pub price: Option<f64>,
}

/// A ticket order for one screening.
///
/// Records are normalized on the way in: ids arrive as numbers or numeric
/// strings, seats as an array, a JSON-encoded array or a comma-joined string.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Order {
    pub id: i64,
    pub screening_id: i64,
    pub seats: Vec<String>,
    pub total_price: f64,
    pub status: OrderStatus,
    pub created_at: Option<NaiveDateTime>,
    pub user_id: Option<i64>,
    pub user: Option<UserSummary>,
    pub movie: Option<MovieSummary>,
    pub screening: Option<ScreeningSummary>,
}

/// Payload for creating a new order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewOrder {
    pub screening_id: i64,
    pub seats: Vec<String>,
    pub total_price: f64,
}

impl NewOrder {
    /// Seats may be given in any of the shapes accepted on read.
    pub fn new(screening_id: i64, seats: &Value, total_price: f64) -> Self {
        Self {
            screening_id,
            seats: normalize_seats(seats),
            total_price,
        }
    }

    pub fn to_body(&self) -> Value {
        json!({
            "screening_id": self.screening_id,
            "seats": self.seats,
            "total_price": self.total_price,
        })
    }
}

impl Order {
    pub fn new(id: i64, screening_id: i64, seats: Vec<String>, total_price: f64, status: OrderStatus) -> Self {
        Self {
            id,
            screening_id,
            seats,
            total_price,
            status,
            created_at: None,
            user_id: None,
            user: None,
            movie: None,
            screening: None,
        }
    }

    /// Decodes one backend order record.
    ///
    /// # Errors
    /// `DataShapeError` when the record is not an object, has no usable id,
    /// or has neither `screening_id` nor an embedded screening id.
    pub fn from_value(value: &Value) -> Result<Self, OrderError> {
        let record = value
            .as_object()
            .ok_or_else(|| OrderError::DataShapeError(format!("order record is not an object: {value}")))?;

        let id = record
            .get("id")
            .and_then(coerce_i64)
            .ok_or_else(|| OrderError::DataShapeError(format!("order record has no usable id: {value}")))?;

        let screening = record.get("screening").and_then(Value::as_object).map(screening_summary);

        let screening_id = record
            .get("screening_id")
            .and_then(coerce_i64)
            .or_else(|| screening.as_ref().and_then(|s| s.id))
            .ok_or_else(|| OrderError::DataShapeError(format!("order {id} has no screening id")))?;

        Ok(Self {
            id,
            screening_id,
            seats: record.get("seats").map(normalize_seats).unwrap_or_default(),
            total_price: record.get("total_price").and_then(coerce_f64).unwrap_or(0.0),
            status: record
                .get("status")
                .and_then(Value::as_str)
                .map(OrderStatus::parse)
                .unwrap_or_default(),
            created_at: record.get("created_at").and_then(Value::as_str).and_then(parse_timestamp),
            user_id: record.get("user_id").and_then(coerce_i64),
            user: record.get("user").and_then(Value::as_object).map(user_summary),
            movie: record.get("movie").and_then(Value::as_object).map(movie_summary),
            screening,
        })
    }

    /// Decodes a list response. Entries that fail to decode are logged and skipped.
    ///
    /// # Errors
    /// `DataShapeError` when the response is not an array.
    pub fn list_from_value(value: &Value) -> Result<Vec<Self>, OrderError> {
        let entries = value
            .as_array()
            .ok_or_else(|| OrderError::DataShapeError(format!("expected an order list, got: {value}")))?;

        Ok(entries
            .iter()
            .filter_map(|entry| match Order::from_value(entry) {
                Ok(order) => Some(order),
                Err(e) => {
                    warn!(error = %e, "Skipping malformed order record");
                    None
                }
            })
            .collect())
    }

    /// Number of optional fields carried by this record.
    pub fn richness(&self) -> usize {
        [
            self.created_at.is_some(),
            self.user_id.is_some(),
            self.user.is_some(),
            self.movie.is_some(),
            self.screening.is_some(),
        ]
        .iter()
        .filter(|present| **present)
        .count()
    }
}

/// Normalizes any accepted seat encoding into a list of labels.
pub fn normalize_seats(value: &Value) -> Vec<String> {
    match value {
        Value::Array(items) => items
            .iter()
            .filter_map(|item| match item {
                Value::String(label) => Some(label.trim().to_string()),
                Value::Number(n) => Some(n.to_string()),
                _ => None,
            })
            .filter(|label| !label.is_empty())
            .collect(),
        Value::String(raw) => match serde_json::from_str::<Value>(raw) {
            Ok(parsed @ Value::Array(_)) => normalize_seats(&parsed),
            _ => raw
                .split(',')
                .map(str::trim)
                .filter(|label| !label.is_empty())
                .map(str::to_string)
                .collect(),
        },
        _ => Vec::new(),
    }
}

fn coerce_i64(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn coerce_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    TIMESTAMP_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
        .or_else(|| DateTime::parse_from_rfc3339(raw).ok().map(|dt| dt.naive_utc()))
}

fn string_field(record: &Map<String, Value>, key: &str) -> Option<String> {
    record.get(key).and_then(Value::as_str).map(str::to_string)
}

fn user_summary(record: &Map<String, Value>) -> UserSummary {
    UserSummary {
        id: record.get("id").and_then(coerce_i64),
        username: string_field(record, "username"),
        email: string_field(record, "email"),
    }
}

fn movie_summary(record: &Map<String, Value>) -> MovieSummary {
    MovieSummary {
        id: record.get("id").and_then(coerce_i64),
        title: string_field(record, "title"),
        poster_url: string_field(record, "poster_url"),
    }
}

fn screening_summary(record: &Map<String, Value>) -> ScreeningSummary {
    ScreeningSummary {
        id: record.get("id").and_then(coerce_i64),
        theater: string_field(record, "theater"),
        hall: string_field(record, "hall"),
        screening_time: string_field(record, "screening_time"),
        price: record.get("price").and_then(coerce_f64),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seat_encodings() {
        assert_eq!(normalize_seats(&json!("A1,A2")), vec!["A1", "A2"]);
        assert_eq!(normalize_seats(&json!("[\"A1\",\"A2\"]")), vec!["A1", "A2"]);
        assert_eq!(normalize_seats(&json!(["A1", "A2"])), vec!["A1", "A2"]);
        assert_eq!(normalize_seats(&json!(" A1 , ,A2 ")), vec!["A1", "A2"]);
        assert!(normalize_seats(&Value::Null).is_empty());
        assert!(normalize_seats(&json!("")).is_empty());
    }

    #[test]
    fn test_own_order_record() {
        let record = json!({
            "id": "12",
            "user_id": 3,
            "screening_id": "5",
            "seats": "[\"C4\",\"C5\"]",
            "total_price": "90.5",
            "status": "confirmed",
            "created_at": "2024-05-01 19:30",
        });

        let order = Order::from_value(&record).unwrap();
        assert_eq!(order.id, 12);
        assert_eq!(order.screening_id, 5);
        assert_eq!(order.seats, vec!["C4", "C5"]);
        assert_eq!(order.total_price, 90.5);
        assert_eq!(order.status, OrderStatus::Confirmed);
        assert!(order.created_at.is_some());
        assert_eq!(order.richness(), 2);
    }

    #[test]
    fn test_privileged_record_uses_embedded_screening() {
        let record = json!({
            "id": 7,
            "user": {"id": 2, "username": "bob", "email": null},
            "screening": {"id": 9, "theater": "Main", "hall": "1", "screening_time": "2024-05-01 20:00", "price": 45.0},
            "movie": {"id": 4, "title": "Heat", "poster_url": null},
            "seats": null,
            "status": "pending",
        });

        let order = Order::from_value(&record).unwrap();
        assert_eq!(order.screening_id, 9);
        assert!(order.seats.is_empty());
        assert_eq!(order.total_price, 0.0);
        assert_eq!(order.user.as_ref().and_then(|u| u.username.as_deref()), Some("bob"));
        assert_eq!(order.richness(), 3);
    }

    #[test]
    fn test_malformed_records() {
        assert!(matches!(Order::from_value(&json!([1, 2])), Err(OrderError::DataShapeError(_))));
        assert!(matches!(
            Order::from_value(&json!({"id": "abc", "screening_id": 1})),
            Err(OrderError::DataShapeError(_))
        ));
        assert!(matches!(Order::from_value(&json!({"id": 1})), Err(OrderError::DataShapeError(_))));
        assert!(matches!(
            Order::list_from_value(&json!({"error": "Unauthorized"})),
            Err(OrderError::DataShapeError(_))
        ));
    }

    #[test]
    fn test_list_skips_malformed_entries() {
        let orders = Order::list_from_value(&json!([
            {"id": 1, "screening_id": 5, "seats": ["A1"], "status": "paid"},
            {"id": "abc", "screening_id": 5, "seats": ["A2"]},
            {"id": 3, "seats": ["A3"]},
            "garbage",
            {"id": 4, "screening": {"id": 5}, "seats": "A4", "status": "confirmed"}
        ]))
        .unwrap();

        assert_eq!(orders.iter().map(|o| o.id).collect::<Vec<_>>(), vec![1, 4]);
    }

    #[test]
    fn test_new_order_body() {
        let order = NewOrder::new(5, &json!("A1, A2"), 80.0);
        assert_eq!(
            order.to_body(),
            json!({"screening_id": 5, "seats": ["A1", "A2"], "total_price": 80.0})
        );
    }
}
