use std::fmt;

use serde::{Deserialize, Serialize};
use serde_with::serde_conv;

#[derive(Debug, Clone)]
pub struct Student {
    user_id: UserId,
    full_name: Option<String>,
    first_name: Option<String>,
    last_name: Option<String>,
    sid: Option<String>,
    email: String,
}

impl Student {
    pub fn new(
        user_id: UserId,
        full_name: Option<String>,
        first_name: Option<String>,
        last_name: Option<String>,
        sid: Option<String>,
        email: String,
    ) -> Self {
        Self {
            user_id,
            full_name,
            first_name,
            last_name,
            sid,
            email,
        }
    }

    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    pub fn full_name(&self) -> Option<&str> {
        self.full_name.as_deref()
    }

    pub fn first_name(&self) -> Option<&str> {
        self.first_name.as_deref()
    }

    pub fn last_name(&self) -> Option<&str> {
        self.last_name.as_deref()
    }

    /// Institution-issued student id, distinct from the Gradescope user id.
    pub fn sid(&self) -> Option<&str> {
        self.sid.as_deref()
    }

    pub fn email(&self) -> &str {
        &self.email
    }
}

/// Gradescope's numeric id for a user, kept as a string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId {
    id: String,
}

impl UserId {
    pub fn new(id: String) -> Self {
        Self { id }
    }

    pub fn as_str(&self) -> &str {
        &self.id
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        self.id.fmt(f)
    }
}

impl From<&str> for UserId {
    fn from(id: &str) -> Self {
        Self::new(id.to_owned())
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
pub(crate) enum NumberOrString {
    Number(u64),
    String(String),
}

impl NumberOrString {
    fn into_string(self) -> String {
        match self {
            Self::Number(number) => number.to_string(),
            Self::String(string) => string,
        }
    }
}

// Props emit ids and sids as JSON numbers on some pages and strings on others.
serde_conv! {
    pub(crate) StringFromNumber,
    String,
    |value: &String| value.clone(),
    |value: NumberOrString| -> Result<_, std::convert::Infallible> {
        Ok(value.into_string())
    }
}

/// A user id exactly as some props carry it, so it can be posted back in the same JSON type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawUserId {
    Number(u64),
    String(String),
}

impl RawUserId {
    pub fn user_id(&self) -> UserId {
        UserId::new(self.to_string())
    }
}

impl fmt::Display for RawUserId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Number(number) => number.fmt(f),
            Self::String(string) => string.fmt(f),
        }
    }
}

impl From<&UserId> for RawUserId {
    fn from(user_id: &UserId) -> Self {
        Self::String(user_id.id.clone())
    }
}

impl From<u64> for RawUserId {
    fn from(id: u64) -> Self {
        Self::Number(id)
    }
}
