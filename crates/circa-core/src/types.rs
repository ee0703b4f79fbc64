//! Core type definitions with validation.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Validation errors for values crossing the engine boundary.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// The provided value was empty.
    #[error("{field} cannot be empty")]
    Empty { field: &'static str },

    /// A time-of-day string was not `HH:mm`.
    #[error("invalid time of day '{value}': expected zero-padded 24-hour HH:mm")]
    InvalidTime { value: String },

    /// A duration was negative.
    #[error("{field} cannot be negative, got {value}")]
    NegativeDuration { field: &'static str, value: i64 },

    /// A numeric value fell outside its hard bounds.
    #[error("{field} must be between {min} and {max}, got {value}")]
    OutOfRange {
        field: &'static str,
        value: i64,
        min: i64,
        max: i64,
    },

    /// A string did not name a known variant.
    #[error("unknown {kind}: {value}")]
    UnknownVariant { kind: &'static str, value: String },

    /// A required field was absent.
    #[error("missing required field: {field}")]
    MissingField { field: &'static str },

    /// Fields that must agree with each other do not.
    #[error("inconsistent {record}: {reason}")]
    Inconsistent {
        record: &'static str,
        reason: &'static str,
    },
}

/// Generates a `snake_case` string enum with `as_str`, `Display`, `FromStr`
/// and string serde.
macro_rules! define_str_enum {
    (
        $(#[$meta:meta])*
        $name:ident, $kind:literal {
            $( $(#[$vmeta:meta])* $variant:ident => $text:literal ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub enum $name {
            $( $(#[$vmeta])* $variant, )+
        }

        impl $name {
            /// All variants in declaration order.
            pub const ALL: &'static [Self] = &[$( Self::$variant ),+];

            /// String representation used for storage and the CLI.
            #[must_use]
            pub const fn as_str(&self) -> &'static str {
                match self {
                    $( Self::$variant => $text, )+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = ValidationError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $( $text => Ok(Self::$variant), )+
                    _ => Err(ValidationError::UnknownVariant {
                        kind: $kind,
                        value: s.to_string(),
                    }),
                }
            }
        }

        impl TryFrom<String> for $name {
            type Error = ValidationError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                value.parse()
            }
        }

        impl From<$name> for String {
            fn from(value: $name) -> Self {
                value.as_str().to_string()
            }
        }
    };
}

define_str_enum!(
    /// A person's natural lean toward morning- or evening-oriented timing.
    Chronotype, "chronotype" {
        Morning => "morning",
        Intermediate => "intermediate",
        Evening => "evening",
    }
);

impl Chronotype {
    /// Shift applied to the default breakfast time, in minutes.
    pub const fn breakfast_offset_minutes(self) -> i64 {
        match self {
            Self::Morning => -30,
            Self::Intermediate => 0,
            Self::Evening => 30,
        }
    }
}

define_str_enum!(
    /// What the eating schedule is optimised for.
    UserGoal, "goal" {
        MetabolicHealth => "metabolic_health",
        MentalPerformance => "mental_performance",
        EnergyStability => "energy_stability",
        AthleticPerformance => "athletic_performance",
        Flexibility => "flexibility",
    }
);

impl UserGoal {
    /// Default eating-window length for this goal, in minutes.
    pub const fn default_window_minutes(self) -> i64 {
        match self {
            Self::MetabolicHealth => 8 * 60,
            Self::MentalPerformance | Self::EnergyStability | Self::AthleticPerformance => 10 * 60,
            Self::Flexibility => 12 * 60,
        }
    }
}

define_str_enum!(
    /// Shape of the working day.
    WorkSchedule, "work schedule" {
        Standard => "standard",
        EarlyShift => "early_shift",
        LateShift => "late_shift",
        NightShift => "night_shift",
        Flexible => "flexible",
    }
);

impl Default for WorkSchedule {
    fn default() -> Self {
        Self::Standard
    }
}

define_str_enum!(
    /// Kind of eating event.
    MealType, "meal type" {
        Breakfast => "breakfast",
        Lunch => "lunch",
        Dinner => "dinner",
        Snack => "snack",
    }
);

define_str_enum!(
    /// Self-reported portion size.
    MealSize, "meal size" {
        Light => "light",
        Moderate => "moderate",
        Large => "large",
    }
);

/// Generates a validated string ID newtype with common trait implementations.
macro_rules! define_string_id {
    (
        $(#[$meta:meta])*
        $name:ident, $field_name:literal
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(String);

        impl $name {
            /// Creates a new ID after validation.
            pub fn new(id: impl Into<String>) -> Result<Self, ValidationError> {
                let id = id.into();
                if id.trim().is_empty() {
                    return Err(ValidationError::Empty { field: $field_name });
                }
                Ok(Self(id))
            }

            /// Returns the ID as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl TryFrom<String> for $name {
            type Error = ValidationError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl From<$name> for String {
            fn from(id: $name) -> Self {
                id.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

define_string_id!(
    /// A validated meal log identifier.
    ///
    /// Meal log IDs must be non-empty. Uniqueness is the caller's concern
    /// (the CLI mints UUIDs).
    MealLogId, "meal log ID"
);
