use std::fmt;
use std::str::FromStr;

use serde::{Serialize, Serializer};

use crate::error::OrderError;

/// Status values a caller may request through the booking UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ClientStatus {
    Pending,
    Paid,
    Cancelled,
    Completed,
}

impl ClientStatus {
    pub const ALL: [ClientStatus; 4] = [
        ClientStatus::Pending,
        ClientStatus::Paid,
        ClientStatus::Cancelled,
        ClientStatus::Completed,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ClientStatus::Pending => "pending",
            ClientStatus::Paid => "paid",
            ClientStatus::Cancelled => "cancelled",
            ClientStatus::Completed => "completed",
        }
    }
}

impl FromStr for ClientStatus {
    type Err = OrderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(ClientStatus::Pending),
            "paid" => Ok(ClientStatus::Paid),
            "cancelled" => Ok(ClientStatus::Cancelled),
            "completed" => Ok(ClientStatus::Completed),
            other => Err(OrderError::InvalidStatus(other.to_string())),
        }
    }
}

impl fmt::Display for ClientStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Status values the generic update endpoint accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendStatus {
    Pending,
    Paid,
    Cancelled,
}

impl BackendStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BackendStatus::Pending => "pending",
            BackendStatus::Paid => "paid",
            BackendStatus::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for BackendStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Status of an order as read back from the backend.
///
/// Both vocabularies land here: the stored one (`confirmed`) and the
/// client-facing one (`paid`). Unrecognised values are kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum OrderStatus {
    #[default]
    Pending,
    Paid,
    Confirmed,
    Completed,
    Cancelled,
    Unknown(String),
}

impl OrderStatus {
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "pending" => OrderStatus::Pending,
            "paid" => OrderStatus::Paid,
            "confirmed" => OrderStatus::Confirmed,
            "completed" => OrderStatus::Completed,
            "cancelled" => OrderStatus::Cancelled,
            _ => OrderStatus::Unknown(raw.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Paid => "paid",
            OrderStatus::Confirmed => "confirmed",
            OrderStatus::Completed => "completed",
            OrderStatus::Cancelled => "cancelled",
            OrderStatus::Unknown(raw) => raw,
        }
    }

    /// Payment has been captured.
    pub fn is_paid_equivalent(&self) -> bool {
        matches!(
            self,
            OrderStatus::Paid | OrderStatus::Confirmed | OrderStatus::Completed
        )
    }
}

impl From<ClientStatus> for OrderStatus {
    fn from(status: ClientStatus) -> Self {
        match status {
            ClientStatus::Pending => OrderStatus::Pending,
            ClientStatus::Paid => OrderStatus::Paid,
            ClientStatus::Cancelled => OrderStatus::Cancelled,
            ClientStatus::Completed => OrderStatus::Completed,
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for OrderStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_status_parsing() {
        for status in ClientStatus::ALL {
            assert_eq!(status.as_str().parse::<ClientStatus>().unwrap(), status);
        }
        assert_eq!(
            "bogus".parse::<ClientStatus>(),
            Err(OrderError::InvalidStatus("bogus".to_string()))
        );
        // Stored-only vocabulary is not a legal request.
        assert!("confirmed".parse::<ClientStatus>().is_err());
    }

    #[test]
    fn test_read_back_vocabulary() {
        assert_eq!(OrderStatus::parse("confirmed"), OrderStatus::Confirmed);
        assert_eq!(OrderStatus::parse(" PAID "), OrderStatus::Paid);
        assert_eq!(OrderStatus::parse("refunded"), OrderStatus::Unknown("refunded".into()));
        assert_eq!(OrderStatus::Unknown("refunded".into()).as_str(), "refunded");
    }
}
