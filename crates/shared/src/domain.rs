use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub i64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

id_newtype!(ProfileId);
id_newtype!(ReviewId);

/// Opaque handle for a locally staged photo. Never sent to the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PhotoId(pub Uuid);

impl PhotoId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for PhotoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProfileKind {
    Model,
    Photographer,
}

impl ProfileKind {
    /// Value of the listing endpoint's `type` parameter.
    pub fn as_query_value(self) -> &'static str {
        match self {
            Self::Model => "model",
            Self::Photographer => "photographer",
        }
    }
}

impl fmt::Display for ProfileKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_query_value())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {what}: {value}")]
pub struct UnknownVariant {
    pub what: &'static str,
    pub value: String,
}

impl FromStr for ProfileKind {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "model" | "models" => Ok(Self::Model),
            "photographer" | "photographers" => Ok(Self::Photographer),
            other => Err(UnknownVariant {
                what: "profile kind",
                value: other.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CooperationFormat {
    Tfp,
    Paid,
}

impl FromStr for CooperationFormat {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "tfp" => Ok(Self::Tfp),
            "paid" => Ok(Self::Paid),
            other => Err(UnknownVariant {
                what: "cooperation format",
                value: other.to_string(),
            }),
        }
    }
}

/// How revealing a model is willing to shoot, least to most open.
///
/// The wire values are the labels the directory API stores verbatim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum OpennessLevel {
    #[serde(rename = "Портрет")]
    Portrait,
    #[serde(rename = "Купальник")]
    Swimwear,
    #[serde(rename = "Бельё")]
    Lingerie,
    #[serde(rename = "Гламур")]
    Glamour,
    #[serde(rename = "Эротика")]
    Erotic,
    #[serde(rename = "Ню")]
    Nude,
    #[serde(rename = "Метарт")]
    FineArtNude,
    #[serde(rename = "Порно")]
    Explicit,
}

impl OpennessLevel {
    pub const ALL: [Self; 8] = [
        Self::Portrait,
        Self::Swimwear,
        Self::Lingerie,
        Self::Glamour,
        Self::Erotic,
        Self::Nude,
        Self::FineArtNude,
        Self::Explicit,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Self::Portrait => "Портрет",
            Self::Swimwear => "Купальник",
            Self::Lingerie => "Бельё",
            Self::Glamour => "Гламур",
            Self::Erotic => "Эротика",
            Self::Nude => "Ню",
            Self::FineArtNude => "Метарт",
            Self::Explicit => "Порно",
        }
    }
}

impl FromStr for OpennessLevel {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        Self::ALL
            .into_iter()
            .find(|level| level.label() == trimmed)
            .ok_or_else(|| UnknownVariant {
                what: "openness level",
                value: trimmed.to_string(),
            })
    }
}
