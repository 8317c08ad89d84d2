//! Project data model matching the upstream API schema.

use serde::{Deserialize, Serialize};

/// A project owned by the API key holder.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    /// Unique project ID.
    pub id: String,

    /// Display name.
    pub name: String,

    /// Owning organization.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub organization_id: Option<String>,

    /// Whether this is the organization's default project.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_default: Option<bool>,

    /// Creation timestamp (ISO 8601).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,

    /// Last update timestamp (ISO 8601).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

/// Serialized payload returned by the `list_projects` tool.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Projects {
    pub projects: Vec<Project>,
}

impl From<Vec<Project>> for Projects {
    fn from(projects: Vec<Project>) -> Self {
        Self { projects }
    }
}
