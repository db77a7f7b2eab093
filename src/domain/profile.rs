//! Editable profile fields of the signed-in user.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::wire::null_as_default;

/// Profile as shown and edited on the profile tab.
///
/// Every field is optional on the wire; absent or `null` values load as an
/// empty string so the form never holds a missing value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    #[serde(default, deserialize_with = "null_as_default")]
    pub username: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub email: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub phone: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub location: String,
}

impl UserProfile {
    /// Set a single field.
    pub fn set(&mut self, field: ProfileField, value: impl Into<String>) {
        let value = value.into();
        match field {
            ProfileField::Username => self.username = value,
            ProfileField::Email => self.email = value,
            ProfileField::Phone => self.phone = value,
            ProfileField::Location => self.location = value,
        }
    }

    /// Read a single field.
    #[must_use]
    pub fn get(&self, field: ProfileField) -> &str {
        match field {
            ProfileField::Username => &self.username,
            ProfileField::Email => &self.email,
            ProfileField::Phone => &self.phone,
            ProfileField::Location => &self.location,
        }
    }

    /// Uppercased first character of the username, or `?` when unset.
    #[must_use]
    pub fn avatar_initial(&self) -> String {
        self.username
            .chars()
            .next()
            .map(|c| c.to_uppercase().collect())
            .unwrap_or_else(|| "?".to_string())
    }
}

/// Names of the editable profile fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProfileField {
    Username,
    Email,
    Phone,
    Location,
}

impl ProfileField {
    pub const ALL: [ProfileField; 4] = [
        ProfileField::Username,
        ProfileField::Email,
        ProfileField::Phone,
        ProfileField::Location,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Username => "username",
            Self::Email => "email",
            Self::Phone => "phone",
            Self::Location => "location",
        }
    }
}

impl fmt::Display for ProfileField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProfileField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|field| field.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown profile field '{s}'"))
    }
}
