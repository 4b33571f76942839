//! Entity kinds, column aliases and the row-to-draft mapper.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::csv::ImportRow;
use crate::error::ValidationError;

/// Units an inventory item may be counted in.
pub const VALID_UNITS: &[&str] = &["unit", "ft", "lbs", "gal", "sq ft", "cu ft", "yd", "in"];

const DEFAULT_COUNTRY: &str = "USA";
const DEFAULT_PIPELINE_STATUS: &str = "lead";

/// Recognized fields and the header names accepted for each, in priority order.
///
/// Aliases only resolve field values. The required-column check in
/// [`crate::csv::parse_document`] matches the literal names from
/// [`EntityKind::required_columns`], so a header of `First Name,Last Name`
/// is rejected before any alias is consulted.
type ColumnTable = &'static [(&'static str, &'static [&'static str])];

const CUSTOMER_COLUMNS: ColumnTable = &[
    ("first_name", &["first_name", "first name", "firstname"]),
    ("last_name", &["last_name", "last name", "lastname"]),
    ("email", &["email", "email address", "e-mail"]),
    ("phone", &["phone", "phone number", "phone_number"]),
    ("company", &["company", "company name", "company_name"]),
    ("address_line1", &["address_line1", "address line 1", "address"]),
    ("address_line2", &["address_line2", "address line 2"]),
    ("city", &["city"]),
    ("state", &["state", "province"]),
    ("zip_code", &["zip_code", "zip code", "zip"]),
    ("country", &["country"]),
    ("pipeline_status", &["pipeline_status", "pipeline status", "status"]),
    ("estimated_value", &["estimated_value", "estimated value", "value"]),
    ("notes", &["notes", "note"]),
];

const INVENTORY_COLUMNS: ColumnTable = &[
    ("name", &["name", "item name", "item_name"]),
    ("sku", &["sku"]),
    ("description", &["description"]),
    ("category", &["category"]),
    ("unit", &["unit", "units"]),
    ("stock", &["stock", "quantity", "qty"]),
    ("unit_price", &["unit_price", "unit price", "price"]),
    ("location", &["location"]),
    ("notes", &["notes", "note"]),
];

/// The dashboard collections a CSV can be imported into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Customers,
    Inventory,
}

impl EntityKind {
    /// REST collection path, relative to the API base URL.
    pub fn endpoint(&self) -> &'static str {
        match self {
            EntityKind::Customers => "/api/customers",
            EntityKind::Inventory => "/api/inventory",
        }
    }

    /// Header columns that must be present for the file to be accepted.
    pub fn required_columns(&self) -> &'static [&'static str] {
        match self {
            EntityKind::Customers => &["first_name", "last_name"],
            EntityKind::Inventory => &["name", "unit"],
        }
    }

    /// The two identifying fields; a row with both empty is treated as blank.
    pub fn primary_fields(&self) -> [&'static str; 2] {
        match self {
            EntityKind::Customers => ["first_name", "last_name"],
            EntityKind::Inventory => ["name", "unit"],
        }
    }

    fn columns(&self) -> ColumnTable {
        match self {
            EntityKind::Customers => CUSTOMER_COLUMNS,
            EntityKind::Inventory => INVENTORY_COLUMNS,
        }
    }

    /// Canonical header row listing every recognized field.
    pub fn template_header(&self) -> String {
        self.columns()
            .iter()
            .map(|(field, _)| *field)
            .collect::<Vec<_>>()
            .join(",")
    }

    pub fn noun(&self, count: usize) -> &'static str {
        match (self, count) {
            (EntityKind::Customers, 1) => "customer",
            (EntityKind::Customers, _) => "customers",
            (EntityKind::Inventory, 1) => "item",
            (EntityKind::Inventory, _) => "items",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityKind::Customers => write!(f, "customers"),
            EntityKind::Inventory => write!(f, "inventory"),
        }
    }
}

impl FromStr for EntityKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "customers" | "customer" => Ok(EntityKind::Customers),
            "inventory" | "items" | "item" => Ok(EntityKind::Inventory),
            other => Err(format!(
                "Unknown entity '{}'. Expected 'customers' or 'inventory'",
                other
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CustomerDraft {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub company: String,
    pub address_line1: String,
    pub address_line2: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
    pub country: String,
    pub pipeline_status: String,
    pub estimated_value: Option<f64>,
    pub notes: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InventoryDraft {
    pub name: String,
    pub sku: String,
    pub description: String,
    pub category: String,
    pub unit: String,
    pub stock: i64,
    pub unit_price: f64,
    pub location: String,
    pub notes: String,
}

/// A typed record ready to be sent as a create request body.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum EntityDraft {
    Customer(CustomerDraft),
    Inventory(InventoryDraft),
}

impl EntityDraft {
    /// Apply aliases, defaults and numeric coercion. Never fails; call
    /// [`EntityDraft::validate`] before submitting.
    pub fn from_row(kind: EntityKind, row: &ImportRow) -> Self {
        let table = kind.columns();
        let get = |field: &str| pick(row, table, field).to_string();

        match kind {
            EntityKind::Customers => EntityDraft::Customer(CustomerDraft {
                first_name: get("first_name"),
                last_name: get("last_name"),
                email: get("email"),
                phone: get("phone"),
                company: get("company"),
                address_line1: get("address_line1"),
                address_line2: get("address_line2"),
                city: get("city"),
                state: get("state"),
                zip_code: get("zip_code"),
                country: or_default(get("country"), DEFAULT_COUNTRY),
                pipeline_status: or_default(get("pipeline_status"), DEFAULT_PIPELINE_STATUS),
                estimated_value: parse_float(&get("estimated_value")),
                notes: get("notes"),
            }),
            EntityKind::Inventory => {
                let unit = get("unit");
                EntityDraft::Inventory(InventoryDraft {
                    name: get("name"),
                    sku: get("sku"),
                    description: get("description"),
                    category: get("category"),
                    unit: canonical_unit(&unit).map(str::to_string).unwrap_or(unit),
                    stock: parse_int(&get("stock")).unwrap_or(0),
                    unit_price: parse_float(&get("unit_price")).unwrap_or(0.0),
                    location: get("location"),
                    notes: get("notes"),
                })
            }
        }
    }

    pub fn kind(&self) -> EntityKind {
        match self {
            EntityDraft::Customer(_) => EntityKind::Customers,
            EntityDraft::Inventory(_) => EntityKind::Inventory,
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        match self {
            EntityDraft::Customer(c) => {
                require(&[("first_name", &c.first_name), ("last_name", &c.last_name)])
            }
            EntityDraft::Inventory(i) => {
                require(&[("name", &i.name), ("unit", &i.unit)])?;
                if canonical_unit(&i.unit).is_none() {
                    return Err(ValidationError::InvalidUnit(i.unit.clone()));
                }
                Ok(())
            }
        }
    }

    /// Short human label, used in rejection listings.
    pub fn label(&self) -> String {
        match self {
            EntityDraft::Customer(c) => format!("{} {}", c.first_name, c.last_name)
                .trim()
                .to_string(),
            EntityDraft::Inventory(i) => i.name.clone(),
        }
    }
}

fn require(fields: &[(&'static str, &String)]) -> Result<(), ValidationError> {
    let missing: Vec<&'static str> = fields
        .iter()
        .filter(|(_, value)| value.is_empty())
        .map(|(name, _)| *name)
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(ValidationError::MissingFields(missing))
    }
}

/// First alias present in the row with a non-empty value.
fn pick<'a>(row: &'a ImportRow, table: ColumnTable, field: &str) -> &'a str {
    table
        .iter()
        .find(|(name, _)| *name == field)
        .and_then(|(_, aliases)| {
            aliases
                .iter()
                .map(|alias| row.get(alias))
                .find(|value| !value.is_empty())
        })
        .unwrap_or("")
}

fn or_default(value: String, default: &str) -> String {
    if value.is_empty() {
        default.to_string()
    } else {
        value
    }
}

fn canonical_unit(unit: &str) -> Option<&'static str> {
    VALID_UNITS
        .iter()
        .find(|valid| valid.eq_ignore_ascii_case(unit))
        .copied()
}

/// Lenient integer parse: "12" and "12.7" both give 12.
fn parse_int(s: &str) -> Option<i64> {
    s.parse::<i64>().ok().or_else(|| {
        parse_float(s)
            .filter(|f| *f >= i64::MIN as f64 && *f <= i64::MAX as f64)
            .map(|f| f.trunc() as i64)
    })
}

fn parse_float(s: &str) -> Option<f64> {
    s.parse::<f64>().ok().filter(|f| f.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(pairs: &[(&str, &str)]) -> ImportRow {
        pairs.iter().map(|(k, v)| (*k, *v)).collect()
    }

    fn customer(draft: EntityDraft) -> CustomerDraft {
        match draft {
            EntityDraft::Customer(c) => c,
            other => panic!("Expected customer, got {:?}", other),
        }
    }

    fn item(draft: EntityDraft) -> InventoryDraft {
        match draft {
            EntityDraft::Inventory(i) => i,
            other => panic!("Expected inventory item, got {:?}", other),
        }
    }

    // --- aliases and defaults ---

    #[test]
    fn zip_aliases_map_to_zip_code() {
        for header in ["zip", "zip code", "zip_code"] {
            let r = row(&[("first_name", "A"), ("last_name", "B"), (header, "02139")]);
            let c = customer(EntityDraft::from_row(EntityKind::Customers, &r));
            assert_eq!(c.zip_code, "02139", "alias '{}'", header);
        }
    }

    #[test]
    fn first_non_empty_alias_wins() {
        let r = row(&[
            ("first_name", "A"),
            ("last_name", "B"),
            ("address_line1", ""),
            ("address", "1 Main St"),
        ]);
        let c = customer(EntityDraft::from_row(EntityKind::Customers, &r));
        assert_eq!(c.address_line1, "1 Main St");
    }

    #[test]
    fn customer_defaults() {
        let r = row(&[("first_name", "John"), ("last_name", "Doe")]);
        let c = customer(EntityDraft::from_row(EntityKind::Customers, &r));
        assert_eq!(c.country, "USA");
        assert_eq!(c.pipeline_status, "lead");
        assert_eq!(c.estimated_value, None);
        assert_eq!(c.email, "");
    }

    #[test]
    fn estimated_value_parses_or_is_null() {
        let r = row(&[("first_name", "J"), ("last_name", "D"), ("estimated_value", "1500.50")]);
        let c = customer(EntityDraft::from_row(EntityKind::Customers, &r));
        assert_eq!(c.estimated_value, Some(1500.5));

        let r = row(&[("first_name", "J"), ("last_name", "D"), ("estimated_value", "lots")]);
        let c = customer(EntityDraft::from_row(EntityKind::Customers, &r));
        assert_eq!(c.estimated_value, None);
    }

    // --- numeric coercion ---

    #[test]
    fn empty_stock_and_price_coerce_to_zero() {
        let r = row(&[("name", "Bolt"), ("unit", "unit"), ("stock", ""), ("unit_price", "")]);
        let draft = EntityDraft::from_row(EntityKind::Inventory, &r);
        assert!(draft.validate().is_ok());
        let i = item(draft);
        assert_eq!(i.stock, 0);
        assert_eq!(i.unit_price, 0.0);
    }

    #[test]
    fn stock_truncates_fractional_values() {
        let r = row(&[("name", "Pipe"), ("unit", "ft"), ("qty", "12.7"), ("price", "3.25")]);
        let i = item(EntityDraft::from_row(EntityKind::Inventory, &r));
        assert_eq!(i.stock, 12);
        assert_eq!(i.unit_price, 3.25);
    }

    #[test]
    fn non_numeric_stock_is_zero() {
        let r = row(&[("name", "Pipe"), ("unit", "ft"), ("stock", "many")]);
        assert_eq!(item(EntityDraft::from_row(EntityKind::Inventory, &r)).stock, 0);
    }

    // --- validation ---

    #[test]
    fn missing_last_name_is_rejected() {
        let r = row(&[("first_name", "John"), ("last_name", "")]);
        let err = EntityDraft::from_row(EntityKind::Customers, &r)
            .validate()
            .unwrap_err();
        assert_eq!(err, ValidationError::MissingFields(vec!["last_name"]));
        assert_eq!(err.to_string(), "Missing required fields: last_name");
    }

    #[test]
    fn invalid_unit_lists_valid_set() {
        let r = row(&[("name", "Paint"), ("unit", "Gallons")]);
        let err = EntityDraft::from_row(EntityKind::Inventory, &r)
            .validate()
            .unwrap_err();
        assert_eq!(err, ValidationError::InvalidUnit("Gallons".into()));
        assert_eq!(
            err.to_string(),
            "Invalid unit \"Gallons\". Must be one of: unit, ft, lbs, gal, sq ft, cu ft, yd, in"
        );
    }

    #[test]
    fn unit_match_is_case_insensitive_and_canonicalized() {
        let r = row(&[("name", "Tile"), ("unit", "SQ FT")]);
        let draft = EntityDraft::from_row(EntityKind::Inventory, &r);
        assert!(draft.validate().is_ok());
        assert_eq!(item(draft).unit, "sq ft");
    }

    #[test]
    fn missing_unit_reports_missing_not_invalid() {
        let r = row(&[("name", "Tile"), ("unit", "")]);
        let err = EntityDraft::from_row(EntityKind::Inventory, &r)
            .validate()
            .unwrap_err();
        assert_eq!(err, ValidationError::MissingFields(vec!["unit"]));
    }

    // --- serialization ---

    #[test]
    fn inventory_draft_serializes_flat() {
        let r = row(&[("name", "Bolt"), ("unit", "lbs"), ("stock", "3"), ("unit_price", "1.5")]);
        let json = serde_json::to_value(EntityDraft::from_row(EntityKind::Inventory, &r)).unwrap();
        assert_eq!(json["name"], "Bolt");
        assert_eq!(json["unit"], "lbs");
        assert_eq!(json["stock"], 3);
        assert_eq!(json["unit_price"], 1.5);
    }

    #[test]
    fn entity_kind_from_str() {
        assert_eq!("Customers".parse::<EntityKind>(), Ok(EntityKind::Customers));
        assert_eq!("items".parse::<EntityKind>(), Ok(EntityKind::Inventory));
        assert!("vendors".parse::<EntityKind>().is_err());
    }

    #[test]
    fn template_header_lists_canonical_fields() {
        assert_eq!(
            EntityKind::Inventory.template_header(),
            "name,sku,description,category,unit,stock,unit_price,location,notes"
        );
    }
}
