use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::ApiError;
use crate::users::skills::contains_skill;

/// Lifecycle of a swap request: `pending` is the only non-terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "swap_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum RequestStatus {
    Pending,
    Accepted,
    Rejected,
    Cancelled,
}

impl RequestStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Accepted => "accepted",
            Self::Rejected => "rejected",
            Self::Cancelled => "cancelled",
        }
    }

    pub fn is_terminal(self) -> bool {
        self != Self::Pending
    }
}

impl std::fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A transition a participant may ask for. `pending` is never a target,
/// which the type rules out entirely.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusAction {
    Accepted,
    Rejected,
    Cancelled,
}

impl StatusAction {
    pub fn target(self) -> RequestStatus {
        match self {
            Self::Accepted => RequestStatus::Accepted,
            Self::Rejected => RequestStatus::Rejected,
            Self::Cancelled => RequestStatus::Cancelled,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Sender,
    Recipient,
}

pub fn role_of(sender_id: Uuid, recipient_id: Uuid, user_id: Uuid) -> Option<Role> {
    if user_id == sender_id {
        Some(Role::Sender)
    } else if user_id == recipient_id {
        Some(Role::Recipient)
    } else {
        None
    }
}

/// Preconditions for creating a request once both profiles are loaded, in
/// order: no self-requests, the recipient offers the requested skill, the
/// sender offers the offered skill. Skills compare case-insensitively.
pub fn check_create(
    sender_id: Uuid,
    recipient_id: Uuid,
    recipient_offers: &[String],
    skill_requested: &str,
    sender_offers: &[String],
    skill_offered: &str,
) -> Result<(), ApiError> {
    if recipient_id == sender_id {
        return Err(ApiError::bad_request("Cannot send request to yourself"));
    }
    if !contains_skill(recipient_offers, skill_requested) {
        return Err(ApiError::bad_request("Recipient does not offer this skill"));
    }
    if !contains_skill(sender_offers, skill_offered) {
        return Err(ApiError::bad_request("You do not offer this skill"));
    }
    Ok(())
}

/// Authorization and state rules for a transition, in order: participant,
/// role, then current state. Cancel is sender-only; accept/reject are
/// recipient-only; only pending requests may move at all.
pub fn check_transition(
    current: RequestStatus,
    action: StatusAction,
    role: Option<Role>,
) -> Result<RequestStatus, ApiError> {
    let role = role.ok_or_else(|| ApiError::forbidden("Not authorized to update this request"))?;

    match action {
        StatusAction::Cancelled if role != Role::Sender => {
            return Err(ApiError::forbidden("Only the sender can cancel a request"));
        }
        StatusAction::Accepted if role != Role::Recipient => {
            return Err(ApiError::forbidden("Only the recipient can accept a request"));
        }
        StatusAction::Rejected if role != Role::Recipient => {
            return Err(ApiError::forbidden("Only the recipient can reject a request"));
        }
        _ => {}
    }

    if current.is_terminal() {
        return Err(ApiError::conflict(format!("Request already {current}")));
    }

    Ok(action.target())
}
