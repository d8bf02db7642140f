use thiserror::Error;

/// How a failed gateway call failed, as far as the update cascade cares.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpErrorKind {
    NotFound,
    MethodNotAllowed,
    NetworkUnreachable,
    Forbidden,
    Other,
}

/// Failure reported by the API gateway.
#[derive(Debug, Clone, Error, PartialEq)]
#[error("HTTP error ({kind:?}, status {status:?}): {message}")]
pub struct HttpError {
    pub kind: HttpErrorKind,
    pub status: Option<u16>,
    pub message: String,
}

impl HttpError {
    /// Classifies a response status code.
    pub fn from_status(status: u16, message: impl Into<String>) -> Self {
        let kind = match status {
            403 => HttpErrorKind::Forbidden,
            404 => HttpErrorKind::NotFound,
            405 => HttpErrorKind::MethodNotAllowed,
            _ => HttpErrorKind::Other,
        };
        Self {
            kind,
            status: Some(status),
            message: message.into(),
        }
    }

    /// The request never produced a response.
    pub fn unreachable(message: impl Into<String>) -> Self {
        Self {
            kind: HttpErrorKind::NetworkUnreachable,
            status: None,
            message: message.into(),
        }
    }

    /// 404, 405 or no response at all.
    pub fn is_unavailable(&self) -> bool {
        matches!(
            self.kind,
            HttpErrorKind::NotFound | HttpErrorKind::MethodNotAllowed | HttpErrorKind::NetworkUnreachable
        )
    }

    pub fn is_forbidden(&self) -> bool {
        self.kind == HttpErrorKind::Forbidden
    }
}

/// Errors surfaced by order operations.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum OrderError {
    #[error("Invalid order status: {0}")]
    InvalidStatus(String),
    #[error("Status update for order {order_id} rejected: {source}")]
    UpdateRejected {
        order_id: i64,
        #[source]
        source: HttpError,
    },
    #[error("Unexpected response shape: {0}")]
    DataShapeError(String),
    #[error("Gateway error: {0}")]
    Gateway(#[from] HttpError),
    #[error("Seats already taken: {}", .0.join(", "))]
    SeatsUnavailable(Vec<String>),
    #[error("Actor communication error: {0}")]
    ActorCommunicationError(String),
}

/// Errors raised while loading configuration.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ConfigError {
    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: &'static str, value: String },
    #[error("HTTP client setup failed: {0}")]
    ClientBuild(String),
}
