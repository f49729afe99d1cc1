use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;
use validator::Validate;

use crate::users::dto::UserSummary;

use super::lifecycle::{RequestStatus, StatusAction};
use super::repo::SwapRequestDetail;

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateSwapRequest {
    pub recipient_id: Uuid,
    #[validate(length(min = 1, message = "Skill requested is required"))]
    pub skill_requested: String,
    #[validate(length(min = 1, message = "Skill offered is required"))]
    pub skill_offered: String,
    #[validate(length(max = 500, message = "Message cannot exceed 500 characters"))]
    pub message: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateStatusRequest {
    pub status: StatusAction,
}

/// Which side of the exchange the caller wants listed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Sent,
    Received,
    #[default]
    All,
}

#[derive(Debug, Deserialize)]
pub struct ListParams {
    #[serde(rename = "type", default)]
    pub direction: Direction,
    pub status: Option<RequestStatus>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct MeetingDetails {
    #[serde(with = "time::serde::rfc3339::option")]
    pub date: Option<OffsetDateTime>,
    pub time: Option<String>,
    pub location: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SwapRequestResponse {
    pub id: Uuid,
    pub sender: UserSummary,
    pub recipient: UserSummary,
    pub skill_requested: String,
    pub skill_offered: String,
    pub message: Option<String>,
    pub status: RequestStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meeting_details: Option<MeetingDetails>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl From<SwapRequestDetail> for SwapRequestResponse {
    fn from(row: SwapRequestDetail) -> Self {
        let has_meeting = row.meeting_date.is_some()
            || row.meeting_time.is_some()
            || row.meeting_location.is_some()
            || row.meeting_notes.is_some();
        Self {
            id: row.id,
            sender: UserSummary {
                id: row.sender_id,
                full_name: row.sender_full_name,
                username: row.sender_username,
                avatar: row.sender_avatar,
            },
            recipient: UserSummary {
                id: row.recipient_id,
                full_name: row.recipient_full_name,
                username: row.recipient_username,
                avatar: row.recipient_avatar,
            },
            skill_requested: row.skill_requested,
            skill_offered: row.skill_offered,
            message: row.message,
            status: row.status,
            meeting_details: has_meeting.then_some(MeetingDetails {
                date: row.meeting_date,
                time: row.meeting_time,
                location: row.meeting_location,
                notes: row.meeting_notes,
            }),
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_action_deserializes_lowercase_only() {
        assert_eq!(
            serde_json::from_str::<StatusAction>(r#""accepted""#).unwrap(),
            StatusAction::Accepted
        );
        // "pending" is not a legal target.
        assert!(serde_json::from_str::<StatusAction>(r#""pending""#).is_err());
    }

    #[test]
    fn direction_defaults_to_all() {
        let params: ListParams = serde_json::from_str("{}").unwrap();
        assert_eq!(params.direction, Direction::All);
    }

    #[test]
    fn message_over_500_chars_fails_validation() {
        let body = CreateSwapRequest {
            recipient_id: Uuid::new_v4(),
            skill_requested: "guitar".into(),
            skill_offered: "python".into(),
            message: Some("x".repeat(501)),
        };
        assert!(body.validate().is_err());
    }

    #[test]
    fn response_serializes_camel_case() {
        let row = SwapRequestDetail {
            id: Uuid::new_v4(),
            sender_id: Uuid::new_v4(),
            recipient_id: Uuid::new_v4(),
            skill_requested: "guitar".into(),
            skill_offered: "python".into(),
            message: None,
            status: RequestStatus::Pending,
            meeting_date: None,
            meeting_time: None,
            meeting_location: None,
            meeting_notes: None,
            created_at: OffsetDateTime::UNIX_EPOCH,
            updated_at: OffsetDateTime::UNIX_EPOCH,
            sender_full_name: "Alice".into(),
            sender_username: "alice".into(),
            sender_avatar: "a.png".into(),
            recipient_full_name: "Bob".into(),
            recipient_username: "bob".into(),
            recipient_avatar: "b.png".into(),
        };
        let json = serde_json::to_value(SwapRequestResponse::from(row)).unwrap();
        assert_eq!(json["skillRequested"], "guitar");
        assert_eq!(json["status"], "pending");
        assert!(json.get("meetingDetails").is_none());
    }
}
