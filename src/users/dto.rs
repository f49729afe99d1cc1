use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;
use validator::{Validate, ValidationError};

use super::repo::User;
use super::skills::{TIME_SLOTS, WEEKDAYS};

#[derive(Debug, Clone, Serialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct Location {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coordinates: Option<Coordinates>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Availability {
    pub days: Vec<String>,
    pub time_slots: Vec<String>,
}

/// Directory projection: everything a stranger may see. No email, no
/// password hash, no visibility flag.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicProfile {
    pub id: Uuid,
    pub full_name: String,
    pub username: String,
    pub avatar: String,
    pub location: Location,
    pub skills_offered: Vec<String>,
    pub skills_wanted: Vec<String>,
    pub availability: Availability,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

/// Owner's view of their own record. Adds email and the visibility flag;
/// still never the password hash.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: Uuid,
    pub full_name: String,
    pub username: String,
    pub email: String,
    pub avatar: String,
    pub location: Location,
    pub skills_offered: Vec<String>,
    pub skills_wanted: Vec<String>,
    pub availability: Availability,
    pub is_public: bool,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

/// Minimal identity attached to swap requests and feedback.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    pub id: Uuid,
    pub full_name: String,
    pub username: String,
    pub avatar: String,
}

fn location_of(user: &User) -> Location {
    Location {
        address: user.location_address.clone(),
        coordinates: match (user.location_lat, user.location_lng) {
            (Some(lat), Some(lng)) => Some(Coordinates { lat, lng }),
            _ => None,
        },
    }
}

fn availability_of(user: &User) -> Availability {
    Availability {
        days: user.availability_days.clone(),
        time_slots: user.availability_time_slots.clone(),
    }
}

impl From<User> for PublicProfile {
    fn from(user: User) -> Self {
        Self {
            location: location_of(&user),
            availability: availability_of(&user),
            id: user.id,
            full_name: user.full_name,
            username: user.username,
            avatar: user.avatar,
            skills_offered: user.skills_offered,
            skills_wanted: user.skills_wanted,
            created_at: user.created_at,
        }
    }
}

impl From<User> for UserProfile {
    fn from(user: User) -> Self {
        Self {
            location: location_of(&user),
            availability: availability_of(&user),
            id: user.id,
            full_name: user.full_name,
            username: user.username,
            email: user.email,
            avatar: user.avatar,
            skills_offered: user.skills_offered,
            skills_wanted: user.skills_wanted,
            is_public: user.is_public,
            created_at: user.created_at,
        }
    }
}

/// Raw query parameters for GET /users.
#[derive(Debug, Deserialize)]
pub struct SearchParams {
    pub search: Option<String>,
    pub skill: Option<String>,
    pub availability: Option<String>,
    pub sort: Option<String>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CoordinatesPatch {
    #[validate(range(min = -90.0, max = 90.0, message = "Invalid latitude"))]
    pub lat: f64,
    #[validate(range(min = -180.0, max = 180.0, message = "Invalid longitude"))]
    pub lng: f64,
}

#[derive(Debug, Deserialize, Validate)]
pub struct LocationPatch {
    pub address: Option<String>,
    #[validate(nested)]
    pub coordinates: Option<CoordinatesPatch>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct AvailabilityPatch {
    #[validate(custom(function = validate_days))]
    pub days: Option<Vec<String>>,
    #[validate(custom(function = validate_time_slots))]
    pub time_slots: Option<Vec<String>>,
}

/// Allow-listed profile patch. Anything absent stays untouched; anything
/// invalid fails the whole request before persistence.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileRequest {
    #[validate(length(min = 2, max = 50, message = "Full name must be between 2 and 50 characters"))]
    pub full_name: Option<String>,
    #[validate(nested)]
    pub location: Option<LocationPatch>,
    pub skills_offered: Option<Vec<String>>,
    pub skills_wanted: Option<Vec<String>>,
    #[validate(nested)]
    pub availability: Option<AvailabilityPatch>,
    pub is_public: Option<bool>,
}

fn validate_days(days: &Vec<String>) -> Result<(), ValidationError> {
    for day in days {
        if !WEEKDAYS.contains(&day.to_lowercase().as_str()) {
            return Err(ValidationError::new("availability_day")
                .with_message(format!("Unknown day: {day}").into()));
        }
    }
    Ok(())
}

fn validate_time_slots(slots: &Vec<String>) -> Result<(), ValidationError> {
    for slot in slots {
        if !TIME_SLOTS.contains(&slot.to_lowercase().as_str()) {
            return Err(ValidationError::new("availability_time_slot")
                .with_message(format!("Unknown time slot: {slot}").into()));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_patch() -> UpdateProfileRequest {
        UpdateProfileRequest {
            full_name: None,
            location: None,
            skills_offered: None,
            skills_wanted: None,
            availability: None,
            is_public: None,
        }
    }

    #[test]
    fn coordinates_out_of_range_fail() {
        let patch = UpdateProfileRequest {
            location: Some(LocationPatch {
                address: None,
                coordinates: Some(CoordinatesPatch { lat: 91.0, lng: 0.0 }),
            }),
            ..base_patch()
        };
        assert!(patch.validate().is_err());
    }

    #[test]
    fn unknown_availability_day_fails() {
        let patch = UpdateProfileRequest {
            availability: Some(AvailabilityPatch {
                days: Some(vec!["funday".into()]),
                time_slots: None,
            }),
            ..base_patch()
        };
        assert!(patch.validate().is_err());
    }

    #[test]
    fn valid_patch_passes() {
        let patch = UpdateProfileRequest {
            full_name: Some("Alice Example".into()),
            location: Some(LocationPatch {
                address: Some("Lisbon".into()),
                coordinates: Some(CoordinatesPatch {
                    lat: 38.72,
                    lng: -9.14,
                }),
            }),
            skills_offered: Some(vec!["Python".into()]),
            availability: Some(AvailabilityPatch {
                days: Some(vec!["Monday".into(), "friday".into()]),
                time_slots: Some(vec!["evening".into()]),
            }),
            ..base_patch()
        };
        assert!(patch.validate().is_ok());
    }

    #[test]
    fn short_full_name_fails() {
        let patch = UpdateProfileRequest {
            full_name: Some("A".into()),
            ..base_patch()
        };
        assert!(patch.validate().is_err());
    }

    #[test]
    fn profile_json_is_camel_case_without_secrets() {
        let user = User {
            id: Uuid::new_v4(),
            username: "alice".into(),
            email: "alice@example.com".into(),
            password_hash: "secret-hash".into(),
            full_name: "Alice Example".into(),
            avatar: "https://example.com/a.png".into(),
            location_address: None,
            location_lat: None,
            location_lng: None,
            skills_offered: vec!["python".into()],
            skills_wanted: vec!["guitar".into()],
            availability_days: vec!["monday".into()],
            availability_time_slots: vec!["evening".into()],
            is_public: true,
            created_at: OffsetDateTime::UNIX_EPOCH,
            updated_at: OffsetDateTime::UNIX_EPOCH,
        };
        let json = serde_json::to_string(&PublicProfile::from(user)).unwrap();
        assert!(json.contains("skillsOffered"));
        assert!(json.contains("fullName"));
        assert!(!json.contains("secret-hash"));
        assert!(!json.contains("alice@example.com"));
    }
}
