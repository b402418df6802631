//! Wire DTOs for the registration API.
//!
//! DESIGN
//! ======
//! Records keep unknown fields out of the type; only what the session and the
//! registration form read is modeled. Ids are normalized to strings because
//! the API has served both numeric and string ids.

#[cfg(test)]
#[path = "types_test.rs"]
mod types_test;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};

/// Free-form registration answers keyed by metadata field name.
pub type Metadata = serde_json::Map<String, serde_json::Value>;

/// An authenticated user as returned by `/users/@me`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct User {
    /// Unique user identifier.
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,
    /// Display name.
    pub name: String,
    /// Primary email address.
    #[serde(default)]
    pub email: String,
}

/// A user's registration for the current event.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Registration {
    /// Answers submitted with the registration.
    #[serde(default)]
    pub metadata: Metadata,
    /// ISO 8601 creation timestamp, if the API reports one.
    #[serde(default)]
    pub created_at: Option<String>,
}

/// Value type of a metadata field.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MetadataDatatype {
    Boolean,
    String,
    /// Anything the form does not special-case (numbers, enums, ...).
    #[serde(other)]
    Other,
}

/// A question the event asks at registration time.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MetadataField {
    /// Key under which the answer is stored.
    pub name: String,
    pub datatype: MetadataDatatype,
    /// Human-readable label.
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub required: bool,
}

/// Partial user update sent before registering.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct UserUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

/// Body of a registration create request.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct NewRegistration {
    pub metadata: Metadata,
}

fn deserialize_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(id) => Ok(id),
        serde_json::Value::Number(number) if number.is_i64() || number.is_u64() => Ok(number.to_string()),
        _ => Err(D::Error::custom("expected string or integer id")),
    }
}
