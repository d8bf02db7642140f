use serde::{Deserialize, Serialize};

/// The authenticated caller, as reported by the login endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentUser {
    pub id: i64,
    pub is_admin: bool,
}

impl CurrentUser {
    /// Creates a new CurrentUser instance.
    ///
    /// # Arguments
    /// * `id` - Server-assigned user id
    /// * `is_admin` - Whether the caller may read the privileged order list
    pub fn new(id: i64, is_admin: bool) -> Self {
        Self { id, is_admin }
    }
}

/// User summary embedded in privileged order records.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct UserSummary {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}
