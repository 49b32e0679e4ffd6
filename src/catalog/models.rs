use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// Role row. Id 1 is the administrator.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct RoleRecord {
    pub id: i32,
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Committee {
    pub id: i32,
    pub name: String,
    /// Term label, e.g. `"2024-2025"`
    pub epoch: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateRoleRequest {
    #[validate(length(min = 1, max = 50))]
    pub name: String,
    #[validate(length(max = 255))]
    pub description: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateCommitteeRequest {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    #[validate(length(min = 1, max = 50))]
    pub epoch: String,
}

#[derive(Debug, Serialize)]
pub struct RoleList {
    pub roles: Vec<RoleRecord>,
}

#[derive(Debug, Serialize)]
pub struct CommitteeList {
    pub committees: Vec<Committee>,
}
