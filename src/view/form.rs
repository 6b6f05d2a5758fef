//! Form editor for the selected material

use crate::format::two_decimals;
use crate::models::{Material, MaterialId};
use crate::state::{FieldName, MaterialsEvent};

use super::list_item::swatch;

const ISO_DATE_FORMAT: &str = "%Y-%m-%d";

/// Field values exactly as the form displays them
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormView {
    pub id: MaterialId,
    pub name: String,
    pub color: String,
    pub volume: String,
    pub cost: String,
    pub delivery_date: String,
}

impl From<&Material> for FormView {
    fn from(material: &Material) -> Self {
        Self {
            id: material.id.clone(),
            name: material.name.clone(),
            color: material.color.clone(),
            volume: two_decimals(material.volume),
            cost: two_decimals(material.cost),
            delivery_date: material.delivery_date.format(ISO_DATE_FORMAT).to_string(),
        }
    }
}

impl FormView {
    pub fn value(&self, field: FieldName) -> &str {
        match field {
            FieldName::Name => &self.name,
            FieldName::Color => &self.color,
            FieldName::Volume => &self.volume,
            FieldName::Cost => &self.cost,
            FieldName::DeliveryDate => &self.delivery_date,
        }
    }

    /// Event emitted when `field` loses focus holding `raw`
    pub fn blur(&self, field: FieldName, raw: impl Into<String>) -> MaterialsEvent {
        MaterialsEvent::FieldBlur {
            field,
            raw: raw.into(),
        }
    }

    pub fn render(&self) -> String {
        let rows = [
            ("Name", self.name.clone()),
            ("Color", format!("{} {}", swatch(&self.color), self.color)),
            ("Volume (m³)", self.volume.clone()),
            ("Cost (USD per m³)", self.cost.clone()),
            ("Delivery Date", self.delivery_date.clone()),
        ];

        rows.iter()
            .map(|(label, value)| format!("  {:<18} {}", format!("{}:", label), value))
            .collect::<Vec<_>>()
            .join("\n")
    }
}
