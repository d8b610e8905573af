use std::fmt::Display;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::types::WorkflowStateId;

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum TicketPriority {
    Critical,
    High,
    Medium,
    Low,
    Trivial,
}

impl Display for TicketPriority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TicketPriority::Critical => write!(f, "Critical"),
            TicketPriority::High => write!(f, "High"),
            TicketPriority::Medium => write!(f, "Medium"),
            TicketPriority::Low => write!(f, "Low"),
            TicketPriority::Trivial => write!(f, "Trivial"),
        }
    }
}

/// Team request tracked by a workflow.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Ticket {
    pub id: i64,
    pub request_title: String,
    #[serde(default)]
    pub request_description: Option<String>,
    #[serde(default)]
    pub priority: Option<TicketPriority>,
    #[serde(default)]
    pub team_id: Option<i64>,
    #[serde(default)]
    pub team_name: Option<String>,
    #[serde(default)]
    pub workflow_id: Option<i64>,
    #[serde(default)]
    pub current_state_id: Option<i64>,
    #[serde(default)]
    pub current_state_name: Option<String>,
    #[serde(default)]
    pub request_user_email: Option<String>,
    #[serde(default)]
    pub assign_user_email: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub attachments: Vec<TicketAttachment>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TicketAttachment {
    pub id: i64,
    pub file_name: String,
    #[serde(default)]
    pub file_type: Option<String>,
    #[serde(default)]
    pub file_size: Option<u64>,
}

/// Body of the PATCH moving a ticket to another workflow state.
#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TicketStateUpdate {
    pub current_state_id: WorkflowStateId,
}

/// Binary attachment downloaded from the backend.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AttachmentBlob {
    pub bytes: Vec<u8>,
    pub content_type: Option<String>,
    pub file_name: Option<String>,
}
