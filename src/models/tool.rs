use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolStatus {
    Available,
    CheckedOut,
    Maintenance,
}

impl ToolStatus {
    /// "checked_out", "checkedOut" and "checked out" are all accepted.
    pub fn parse(s: &str) -> Option<Self> {
        let normalized: String = s
            .chars()
            .filter(|c| !matches!(c, '_' | '-' | ' '))
            .flat_map(char::to_lowercase)
            .collect();
        match normalized.as_str() {
            "available" => Some(ToolStatus::Available),
            "checkedout" => Some(ToolStatus::CheckedOut),
            "maintenance" => Some(ToolStatus::Maintenance),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolModel {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub brand: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
    pub status: String,
    #[serde(default)]
    pub current_holder: Option<String>,
}

impl ToolModel {
    pub fn status(&self) -> Option<ToolStatus> {
        ToolStatus::parse(&self.status)
    }
}
