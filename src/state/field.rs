//! Editable material fields and parsing of raw form input

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::error::FieldError;
use crate::models::Material;

/// Date formats accepted from the form: the date input's ISO value, or the wire format.
const INPUT_DATE_FORMATS: [&str; 2] = ["%Y-%m-%d", "%d/%m/%Y"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldName {
    Name,
    Color,
    Volume,
    Cost,
    DeliveryDate,
}

impl FieldName {
    pub const ALL: [FieldName; 5] = [
        FieldName::Name,
        FieldName::Color,
        FieldName::Volume,
        FieldName::Cost,
        FieldName::DeliveryDate,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            FieldName::Name => "name",
            FieldName::Color => "color",
            FieldName::Volume => "volume",
            FieldName::Cost => "cost",
            FieldName::DeliveryDate => "deliveryDate",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            FieldName::Name => "Name",
            FieldName::Color => "Color",
            FieldName::Volume => "Volume",
            FieldName::Cost => "Cost",
            FieldName::DeliveryDate => "Delivery Date",
        }
    }

    pub fn is_date(self) -> bool {
        matches!(self, FieldName::DeliveryDate)
    }

    /// Parse a raw form value into a typed update for this field
    pub fn parse(self, raw: &str) -> Result<FieldUpdate, FieldError> {
        match self {
            FieldName::Name => Ok(FieldUpdate::Name(raw.to_string())),
            FieldName::Color => Ok(FieldUpdate::Color(raw.trim().to_string())),
            FieldName::Volume => parse_decimal(raw, self.label()).map(FieldUpdate::Volume),
            FieldName::Cost => parse_decimal(raw, self.label()).map(FieldUpdate::Cost),
            FieldName::DeliveryDate => parse_input_date(raw).map(FieldUpdate::DeliveryDate),
        }
    }
}

impl fmt::Display for FieldName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FieldName {
    type Err = FieldError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "name" => Ok(FieldName::Name),
            "color" | "colour" => Ok(FieldName::Color),
            "volume" => Ok(FieldName::Volume),
            "cost" => Ok(FieldName::Cost),
            "deliverydate" | "delivery_date" | "delivery-date" | "date" => {
                Ok(FieldName::DeliveryDate)
            }
            _ => Err(FieldError::UnknownField(s.to_string())),
        }
    }
}

/// A typed new value for one field
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldUpdate {
    Name(String),
    Color(String),
    Volume(Decimal),
    Cost(Decimal),
    DeliveryDate(NaiveDate),
}

impl FieldUpdate {
    pub fn field(&self) -> FieldName {
        match self {
            FieldUpdate::Name(_) => FieldName::Name,
            FieldUpdate::Color(_) => FieldName::Color,
            FieldUpdate::Volume(_) => FieldName::Volume,
            FieldUpdate::Cost(_) => FieldName::Cost,
            FieldUpdate::DeliveryDate(_) => FieldName::DeliveryDate,
        }
    }

    pub fn apply(&self, material: &mut Material) {
        match self {
            FieldUpdate::Name(v) => material.name = v.clone(),
            FieldUpdate::Color(v) => material.color = v.clone(),
            FieldUpdate::Volume(v) => material.volume = *v,
            FieldUpdate::Cost(v) => material.cost = *v,
            FieldUpdate::DeliveryDate(v) => material.delivery_date = *v,
        }
    }
}

/// Largest magnitude accepted for volume or cost.
const MAX_QUANTITY: i64 = 1_000_000_000_000_000;

fn parse_decimal(raw: &str, label: &'static str) -> Result<Decimal, FieldError> {
    let value = raw
        .trim()
        .parse::<Decimal>()
        .map_err(|_| FieldError::InvalidNumber { field: label })?;
    if value.abs() > Decimal::from(MAX_QUANTITY) {
        return Err(FieldError::OutOfRange { field: label });
    }
    Ok(value)
}

/// Parse a form date, keeping only the calendar day
pub fn parse_input_date(raw: &str) -> Result<NaiveDate, FieldError> {
    let trimmed = raw.trim();
    // A datetime-local value ("2026-10-17T09:30") is cut down to its day.
    let day_part = trimmed.split('T').next().unwrap_or(trimmed);

    INPUT_DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(day_part, format).ok())
        .ok_or_else(|| FieldError::InvalidDate {
            value: raw.to_string(),
        })
}
