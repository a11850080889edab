//! Waitlist entry model and its enumerated fields

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Error returned when a string is not a member of one of the entry enumerations
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownVariant(pub String);

impl fmt::Display for UnknownVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown value '{}'", self.0)
    }
}

impl std::error::Error for UnknownVariant {}

/// Declares a string-backed enumeration with `as_str`, `FromStr` and `Display`.
macro_rules! string_enum {
    (
        $(#[$meta:meta])*
        pub enum $name:ident { $($variant:ident => $value:literal),+ $(,)? }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(
                #[serde(rename = $value)]
                $variant,
            )+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $value,)+
                }
            }
        }

        impl FromStr for $name {
            type Err = UnknownVariant;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($value => Ok($name::$variant),)+
                    other => Err(UnknownVariant(other.to_string())),
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

string_enum! {
    /// Kind of farm the registrant runs
    pub enum FarmType {
        Vegetable => "vegetable",
        Fruit => "fruit",
        Grain => "grain",
        Livestock => "livestock",
        Greenhouse => "greenhouse",
        Urban => "urban",
        Other => "other",
    }
}

string_enum! {
    pub enum FarmSize {
        Small => "small",
        Medium => "medium",
        Large => "large",
        Urban => "urban",
    }
}

string_enum! {
    /// Product area the registrant is most interested in
    pub enum Interest {
        AiOptimization => "ai-optimization",
        Composting => "composting",
        SoilHealth => "soil-health",
        PestManagement => "pest-management",
        WaterManagement => "water-management",
        YieldPrediction => "yield-prediction",
        Sustainability => "sustainability",
    }
}

string_enum! {
    /// Lifecycle marker. Only `Active` is ever written by this service.
    pub enum EntryStatus {
        Active => "active",
        Notified => "notified",
        Converted => "converted",
    }
}

/// Email address in its uniqueness-key form: trimmed and lowercased
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct NormalizedEmail(String);

impl NormalizedEmail {
    /// Returns `None` when nothing is left after trimming.
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return None;
        }
        Some(Self(trimmed.to_lowercase()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Error returned when an email is blank after trimming
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlankEmail;

impl fmt::Display for BlankEmail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("email is blank")
    }
}

impl std::error::Error for BlankEmail {}

impl TryFrom<String> for NormalizedEmail {
    type Error = BlankEmail;

    fn try_from(raw: String) -> Result<Self, Self::Error> {
        Self::parse(&raw).ok_or(BlankEmail)
    }
}

impl From<NormalizedEmail> for String {
    fn from(email: NormalizedEmail) -> Self {
        email.0
    }
}

impl fmt::Display for NormalizedEmail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Row id assigned by the store
pub type EntryId = i64;

/// A signup that passed validation and is ready to be persisted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewWaitlistEntry {
    pub email: NormalizedEmail,
    pub name: String,
    pub farm_type: FarmType,
    pub farm_size: FarmSize,
    pub interests: Interest,
    pub signup_date: DateTime<Utc>,
    pub status: EntryStatus,
}

/// A persisted waitlist registration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WaitlistEntry {
    pub id: EntryId,
    pub email: NormalizedEmail,
    pub name: String,
    pub farm_type: FarmType,
    pub farm_size: FarmSize,
    pub interests: Interest,
    pub signup_date: DateTime<Utc>,
    pub status: EntryStatus,
}
