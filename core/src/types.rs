//! Domain DTOs for the users API.
//!
//! # Design
//! These types mirror the mock-server's schema but are defined independently;
//! integration tests catch schema drift. Profile photos travel as base64
//! strings on the wire and are held as raw bytes here.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Server-assigned identifier of a persisted user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub Uuid);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for UserId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(UserId)
    }
}

/// A persisted user record as returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct User {
    pub id: UserId,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone_number: String,
    #[serde(default, with = "base64_photo", skip_serializing_if = "Option::is_none")]
    pub profile_photo: Option<Vec<u8>>,
}

impl User {
    /// Overwrite the fields present in `update`, leaving the rest untouched.
    pub fn apply(&mut self, update: &UserUpdate) {
        if let Some(first_name) = &update.first_name {
            self.first_name = first_name.clone();
        }
        if let Some(last_name) = &update.last_name {
            self.last_name = last_name.clone();
        }
        if let Some(email) = &update.email {
            self.email = email.clone();
        }
        if let Some(phone_number) = &update.phone_number {
            self.phone_number = phone_number.clone();
        }
        if let Some(photo) = &update.profile_photo {
            self.profile_photo = Some(photo.clone());
        }
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// Request payload for creating a user.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NewUser {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone_number: String,
    #[serde(default, with = "base64_photo", skip_serializing_if = "Option::is_none")]
    pub profile_photo: Option<Vec<u8>>,
}

/// Request payload for updating a user. Only the fields present in the JSON
/// are applied; omitted fields keep their previous value.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
    #[serde(default, with = "base64_photo", skip_serializing_if = "Option::is_none")]
    pub profile_photo: Option<Vec<u8>>,
}

/// One page of the user collection.
///
/// The server also sends `message` and `total_pages`; both are ignored and
/// page math is done client-side from `total_count`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserPage {
    pub data: Vec<User>,
    pub total_count: u64,
}

mod base64_photo {
    use base64::engine::general_purpose::STANDARD;
    use base64::Engine as _;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(photo: &Option<Vec<u8>>, serializer: S) -> Result<S::Ok, S::Error> {
        match photo {
            Some(bytes) => serializer.serialize_str(&STANDARD.encode(bytes)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Vec<u8>>, D::Error> {
        let encoded: Option<String> = Option::deserialize(deserializer)?;
        encoded
            .filter(|s| !s.is_empty())
            .map(|s| STANDARD.decode(s).map_err(serde::de::Error::custom))
            .transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user() -> User {
        User {
            id: UserId(Uuid::nil()),
            first_name: "Alex".to_string(),
            last_name: "Taylor".to_string(),
            email: "alex@example.com".to_string(),
            phone_number: "1234567890".to_string(),
            profile_photo: None,
        }
    }

    #[test]
    fn apply_overwrites_only_present_fields() {
        let mut u = user();
        u.apply(&UserUpdate {
            email: Some("new@example.com".to_string()),
            ..Default::default()
        });
        assert_eq!(u.email, "new@example.com");
        assert_eq!(u.first_name, "Alex");
        assert_eq!(u.phone_number, "1234567890");
    }

    #[test]
    fn apply_keeps_photo_when_update_has_none() {
        let mut u = user();
        u.profile_photo = Some(vec![1, 2, 3]);
        u.apply(&UserUpdate {
            first_name: Some("Sam".to_string()),
            ..Default::default()
        });
        assert_eq!(u.profile_photo, Some(vec![1, 2, 3]));
    }

    #[test]
    fn photo_travels_as_base64() {
        let mut u = user();
        u.profile_photo = Some(b"jpeg".to_vec());
        let json = serde_json::to_value(&u).unwrap();
        assert_eq!(json["profile_photo"], "anBlZw==");

        let back: User = serde_json::from_value(json).unwrap();
        assert_eq!(back.profile_photo.as_deref(), Some(&b"jpeg"[..]));
    }

    #[test]
    fn null_or_missing_photo_decodes_to_none() {
        let json = r#"{"id":"00000000-0000-0000-0000-000000000000","first_name":"A","last_name":"B","email":"a@b.c","phone_number":"1234567890","profile_photo":null}"#;
        let u: User = serde_json::from_str(json).unwrap();
        assert!(u.profile_photo.is_none());

        let json = r#"{"id":"00000000-0000-0000-0000-000000000000","first_name":"A","last_name":"B","email":"a@b.c","phone_number":"1234567890"}"#;
        let u: User = serde_json::from_str(json).unwrap();
        assert!(u.profile_photo.is_none());
    }

    #[test]
    fn update_omits_absent_fields() {
        let update = UserUpdate {
            last_name: Some("Lee".to_string()),
            ..Default::default()
        };
        let json = serde_json::to_value(&update).unwrap();
        assert_eq!(json, serde_json::json!({ "last_name": "Lee" }));
    }

    #[test]
    fn page_ignores_extra_keys() {
        let body = r#"{"message":"Users fetched successfully","data":[],"total_pages":0,"total_count":0}"#;
        let page: UserPage = serde_json::from_str(body).unwrap();
        assert!(page.data.is_empty());
        assert_eq!(page.total_count, 0);
    }

    #[test]
    fn user_id_parses_from_str() {
        let id: UserId = "00000000-0000-0000-0000-000000000000".parse().unwrap();
        assert_eq!(id, UserId(Uuid::nil()));
        assert!("not-a-uuid".parse::<UserId>().is_err());
    }
}
