//! Working copy of a listing's editable fields.

use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Editable fields of a listing, detached from the listing itself.
///
/// Serialized as the body of the update request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingDraft {
    pub brand: String,
    pub model: String,
    pub location: String,
    #[serde(serialize_with = "rust_decimal::serde::float::serialize")]
    pub price: Decimal,
    pub description: String,
    pub color: String,
    pub owners_count: u32,
    pub kilometres_run: u64,
    pub model_year: u16,
}

impl ListingDraft {
    /// Overwrite the one field named by `change`.
    pub fn apply(&mut self, change: DraftChange) {
        match change {
            DraftChange::Brand(v) => self.brand = v,
            DraftChange::Model(v) => self.model = v,
            DraftChange::Location(v) => self.location = v,
            DraftChange::Price(v) => self.price = v,
            DraftChange::Description(v) => self.description = v,
            DraftChange::Color(v) => self.color = v,
            DraftChange::OwnersCount(v) => self.owners_count = v,
            DraftChange::KilometresRun(v) => self.kilometres_run = v,
            DraftChange::ModelYear(v) => self.model_year = v,
        }
    }
}

/// Names of the editable listing fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DraftField {
    Brand,
    Model,
    Location,
    Price,
    Description,
    Color,
    OwnersCount,
    KilometresRun,
    ModelYear,
}

impl DraftField {
    pub const ALL: [DraftField; 9] = [
        DraftField::Brand,
        DraftField::Model,
        DraftField::Location,
        DraftField::Price,
        DraftField::Description,
        DraftField::Color,
        DraftField::OwnersCount,
        DraftField::KilometresRun,
        DraftField::ModelYear,
    ];

    /// Wire name of the field.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Brand => "brand",
            Self::Model => "model",
            Self::Location => "location",
            Self::Price => "price",
            Self::Description => "description",
            Self::Color => "color",
            Self::OwnersCount => "ownersCount",
            Self::KilometresRun => "kilometresRun",
            Self::ModelYear => "modelYear",
        }
    }

    /// Parse `raw` as a value for this field.
    pub fn parse_value(self, raw: &str) -> Result<DraftChange, String> {
        let trimmed = raw.trim();
        let change = match self {
            Self::Brand => DraftChange::Brand(raw.to_string()),
            Self::Model => DraftChange::Model(raw.to_string()),
            Self::Location => DraftChange::Location(raw.to_string()),
            Self::Description => DraftChange::Description(raw.to_string()),
            Self::Color => DraftChange::Color(raw.to_string()),
            Self::Price => DraftChange::Price(
                Decimal::from_str(trimmed).map_err(|e| format!("invalid price '{raw}': {e}"))?,
            ),
            Self::OwnersCount => DraftChange::OwnersCount(
                trimmed
                    .parse()
                    .map_err(|e| format!("invalid ownersCount '{raw}': {e}"))?,
            ),
            Self::KilometresRun => DraftChange::KilometresRun(
                trimmed
                    .parse()
                    .map_err(|e| format!("invalid kilometresRun '{raw}': {e}"))?,
            ),
            Self::ModelYear => DraftChange::ModelYear(
                trimmed
                    .parse()
                    .map_err(|e| format!("invalid modelYear '{raw}': {e}"))?,
            ),
        };
        Ok(change)
    }
}

impl fmt::Display for DraftField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DraftField {
    type Err = String;

    /// Accepts the wire name as well as snake or kebab case
    /// (`ownersCount`, `owners_count`, `owners-count`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = normalize(s);
        Self::ALL
            .into_iter()
            .find(|field| normalize(field.as_str()) == wanted)
            .ok_or_else(|| format!("unknown listing field '{s}'"))
    }
}

fn normalize(name: &str) -> String {
    name.chars()
        .filter(|c| *c != '_' && *c != '-')
        .flat_map(char::to_lowercase)
        .collect()
}

/// A typed new value for one draft field.
#[derive(Debug, Clone, PartialEq)]
pub enum DraftChange {
    Brand(String),
    Model(String),
    Location(String),
    Price(Decimal),
    Description(String),
    Color(String),
    OwnersCount(u32),
    KilometresRun(u64),
    ModelYear(u16),
}

impl DraftChange {
    #[must_use]
    pub const fn field(&self) -> DraftField {
        match self {
            Self::Brand(_) => DraftField::Brand,
            Self::Model(_) => DraftField::Model,
            Self::Location(_) => DraftField::Location,
            Self::Price(_) => DraftField::Price,
            Self::Description(_) => DraftField::Description,
            Self::Color(_) => DraftField::Color,
            Self::OwnersCount(_) => DraftField::OwnersCount,
            Self::KilometresRun(_) => DraftField::KilometresRun,
            Self::ModelYear(_) => DraftField::ModelYear,
        }
    }
}

impl FromStr for DraftChange {
    type Err = String;

    /// Parse `field=value`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (name, value) = s
            .split_once('=')
            .ok_or_else(|| format!("expected field=value, got '{s}'"))?;
        let field: DraftField = name.parse()?;
        field.parse_value(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn field_names_accept_several_spellings() {
        assert_eq!("ownersCount".parse::<DraftField>().unwrap(), DraftField::OwnersCount);
        assert_eq!("owners_count".parse::<DraftField>().unwrap(), DraftField::OwnersCount);
        assert_eq!("model-year".parse::<DraftField>().unwrap(), DraftField::ModelYear);
        assert!("mileage".parse::<DraftField>().is_err());
    }

    #[test]
    fn change_parses_typed_values() {
        let change: DraftChange = "price=50000".parse().unwrap();
        assert_eq!(change, DraftChange::Price(dec!(50000)));
        assert_eq!(change.field(), DraftField::Price);

        let change: DraftChange = "description=single owner, a=b".parse().unwrap();
        assert_eq!(
            change,
            DraftChange::Description("single owner, a=b".to_string())
        );
    }

    #[test]
    fn change_rejects_bad_numbers() {
        assert!("modelYear=twenty".parse::<DraftChange>().is_err());
        assert!("kilometresRun=-5".parse::<DraftChange>().is_err());
        assert!("price".parse::<DraftChange>().is_err());
    }

    #[test]
    fn apply_touches_only_named_field() {
        let mut draft = ListingDraft {
            brand: "TVS".into(),
            price: dec!(30000),
            ..Default::default()
        };
        let before = draft.clone();
        draft.apply(DraftChange::Price(dec!(28000)));
        assert_eq!(draft.price, dec!(28000));
        assert_eq!(draft.brand, before.brand);
        assert_eq!(draft.model_year, before.model_year);
    }

    #[test]
    fn serializes_with_camel_case_keys() {
        let draft = ListingDraft {
            owners_count: 2,
            price: dec!(1500),
            ..Default::default()
        };
        let value = serde_json::to_value(&draft).unwrap();
        assert_eq!(value["ownersCount"], serde_json::json!(2));
        assert_eq!(value["price"], serde_json::json!(1500.0));
    }
}
