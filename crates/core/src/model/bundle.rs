use serde::de::Deserializer;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

use crate::model::exercise::RawExercise;
use crate::model::interaction::scalar_text;

//
// ─── VARIANT POLICY ────────────────────────────────────────────────────────────
//

/// Rule selecting which variants of each core enter the runtime exercise list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(from = "Option<String>")]
pub enum VariantPolicy {
    /// Use the flat `exercises` list as-is.
    SingleFixed,
    /// Lowest `variant_index` per core.
    #[default]
    FirstPerCore,
    /// Every variant of every core.
    ManualSelect,
    /// One uniformly random variant per core, re-drawn on every resolve.
    RandomPerCore,
    /// Unrecognized value; resolves like `FirstPerCore`.
    Other(String),
}

impl VariantPolicy {
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "single_fixed" => Self::SingleFixed,
            "first_per_core" | "" => Self::FirstPerCore,
            "manual_select" => Self::ManualSelect,
            "random_per_core" => Self::RandomPerCore,
            _ => Self::Other(raw.trim().to_owned()),
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::SingleFixed => "single_fixed",
            Self::FirstPerCore => "first_per_core",
            Self::ManualSelect => "manual_select",
            Self::RandomPerCore => "random_per_core",
            Self::Other(raw) => raw,
        }
    }
}

impl From<Option<String>> for VariantPolicy {
    fn from(raw: Option<String>) -> Self {
        raw.as_deref().map_or(Self::FirstPerCore, Self::parse)
    }
}

impl fmt::Display for VariantPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for VariantPolicy {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

//
// ─── BUNDLE DOCUMENT ───────────────────────────────────────────────────────────
//

/// `delivery` block. Anything but a string `variant_policy` reads as the default.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Delivery {
    pub variant_policy: VariantPolicy,
}

impl<'de> Deserialize<'de> for Delivery {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        let raw = value
            .get("variant_policy")
            .and_then(Value::as_str)
            .map(str::to_owned);
        Ok(Self {
            variant_policy: VariantPolicy::from(raw),
        })
    }
}

/// A group of interchangeable variants for one learning objective.
///
/// A non-object entry reads as a core without variants, which the resolver skips.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawCore {
    pub core_id: Option<String>,
    pub variants: Vec<RawExercise>,
}

impl RawCore {
    #[must_use]
    pub fn from_value(value: Value) -> Self {
        let Value::Object(mut obj) = value else {
            return Self::default();
        };
        let core_id = ["core_id", "id"]
            .iter()
            .find_map(|key| obj.get(*key).and_then(scalar_text));
        let variants = match obj.remove("variants") {
            Some(Value::Array(items)) => items.into_iter().map(RawExercise::from_value).collect(),
            _ => Vec::new(),
        };
        Self { core_id, variants }
    }
}

impl From<Value> for RawCore {
    fn from(value: Value) -> Self {
        Self::from_value(value)
    }
}

impl<'de> Deserialize<'de> for RawCore {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Value::deserialize(deserializer).map(Self::from_value)
    }
}

/// Top-level document describing one loadable assessment unit.
///
/// Carries either a flat `exercises` list, or `udl_cores` plus a delivery
/// policy. Which one is used is decided by the resolver.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Bundle {
    #[serde(deserialize_with = "lenient_list")]
    pub exercises: Vec<RawExercise>,
    #[serde(deserialize_with = "lenient_list")]
    pub udl_cores: Vec<RawCore>,
    pub delivery: Delivery,
    pub resource_metadata: Value,
}

impl Bundle {
    /// A bundle made only of a flat exercise list.
    #[must_use]
    pub fn from_exercises(exercises: Vec<RawExercise>) -> Self {
        Self {
            exercises,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn policy(&self) -> &VariantPolicy {
        &self.delivery.variant_policy
    }

    #[must_use]
    pub fn has_cores(&self) -> bool {
        !self.udl_cores.is_empty()
    }

    /// Delivery policy and resource metadata echoed into session reports.
    #[must_use]
    pub fn loaded_meta(&self) -> LoadedMeta {
        LoadedMeta {
            variant_policy: self.policy().clone(),
            resource_metadata: self.resource_metadata.clone(),
        }
    }
}

/// Echo of the bundle's delivery policy and metadata. Opaque to the engine.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LoadedMeta {
    pub variant_policy: VariantPolicy,
    pub resource_metadata: Value,
}

/// Treats a present-but-not-an-array value (`null`, object, string) as empty.
///
/// Items are read through their own lenient `from_value`, so one malformed
/// entry never rejects the list.
fn lenient_list<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: From<Value>,
{
    match Value::deserialize(deserializer)? {
        Value::Array(items) => Ok(items.into_iter().map(T::from).collect()),
        _ => Ok(Vec::new()),
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
