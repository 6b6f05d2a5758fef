//! Material records and identifiers

use std::fmt;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::warn;
use uuid::Uuid;

use super::wire::{dmy_date, lenient_decimal};

const TEMPORARY_PREFIX: &str = "tmp-";

pub const DEFAULT_NAME: &str = "New Material";
pub const DEFAULT_COLOR: &str = "#ffffff";

/// Identifier of a material, either server-assigned or a temporary client placeholder
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MaterialId(String);

impl MaterialId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Fresh placeholder id. The prefix keeps it disjoint from server ids.
    pub fn temporary() -> Self {
        Self(format!("{}{}", TEMPORARY_PREFIX, Uuid::new_v4()))
    }

    pub fn is_temporary(&self) -> bool {
        self.0.starts_with(TEMPORARY_PREFIX)
    }

    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MaterialId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for MaterialId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for MaterialId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// A material as the backend stores it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Material {
    pub id: MaterialId,
    pub name: String,
    pub color: String,
    #[serde(with = "lenient_decimal")]
    pub volume: Decimal,
    /// Currency units per volume unit
    #[serde(with = "lenient_decimal")]
    pub cost: Decimal,
    #[serde(with = "dmy_date")]
    pub delivery_date: NaiveDate,
}

/// Material fields without an identifier; the body of a create request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MaterialDraft {
    pub name: String,
    pub color: String,
    #[serde(with = "lenient_decimal")]
    pub volume: Decimal,
    #[serde(with = "lenient_decimal")]
    pub cost: Decimal,
    #[serde(with = "dmy_date")]
    pub delivery_date: NaiveDate,
}

impl MaterialDraft {
    /// Values a newly added material starts with
    pub fn defaults(today: NaiveDate) -> Self {
        Self {
            name: DEFAULT_NAME.to_string(),
            color: DEFAULT_COLOR.to_string(),
            volume: Decimal::ZERO,
            cost: Decimal::ZERO,
            delivery_date: today,
        }
    }

    pub fn into_material(self, id: MaterialId) -> Material {
        Material {
            id,
            name: self.name,
            color: self.color,
            volume: self.volume,
            cost: self.cost,
            delivery_date: self.delivery_date,
        }
    }
}

impl Material {
    pub fn draft(&self) -> MaterialDraft {
        MaterialDraft {
            name: self.name.clone(),
            color: self.color.clone(),
            volume: self.volume,
            cost: self.cost,
            delivery_date: self.delivery_date,
        }
    }
}

/// `{ "material": ... }`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MaterialEnvelope {
    pub material: Material,
}

/// `{ "materials": [...] }`
///
/// Records that fail to decode are logged and skipped; the rest of the list
/// still loads.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(from = "RawMaterialsEnvelope")]
pub struct MaterialsEnvelope {
    pub materials: Vec<Material>,
}

#[derive(Deserialize)]
struct RawMaterialsEnvelope {
    materials: Vec<serde_json::Value>,
}

impl From<RawMaterialsEnvelope> for MaterialsEnvelope {
    fn from(raw: RawMaterialsEnvelope) -> Self {
        let materials = raw
            .materials
            .into_iter()
            .filter_map(|record| {
                let id = record.get("id").map(|id| id.to_string());
                match serde_json::from_value::<Material>(record) {
                    Ok(material) => Some(material),
                    Err(err) => {
                        warn!(id = id.as_deref(), error = %err, "skipping undecodable material");
                        None
                    }
                }
            })
            .collect();
        Self { materials }
    }
}

/// `{ "errors": [{ "msg": ... }] }`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ErrorPayload {
    #[serde(default)]
    pub errors: Vec<FieldMessage>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldMessage {
    pub msg: String,
}

impl ErrorPayload {
    pub fn from_messages(messages: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            errors: messages
                .into_iter()
                .map(|msg| FieldMessage { msg: msg.into() })
                .collect(),
        }
    }

    pub fn messages(&self) -> Vec<String> {
        self.errors.iter().map(|e| e.msg.clone()).collect()
    }
}
