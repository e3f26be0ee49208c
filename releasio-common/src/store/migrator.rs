//! Declarative shape reconciliation for stored cell values
//!
//! A [`Shape`] describes what the running code expects a cell to look like.
//! [`StoreMigrator::migrate`] conforms a raw stored value to it:
//!
//! - Records keep only declared fields; undeclared fields are dropped
//! - Missing or ill-typed required fields take their declared default
//! - List and map elements that cannot be conformed are dropped
//!
//! Conformance is a whitelist and is idempotent: migrating an already
//! migrated value reports `changed == false`.

use serde_json::{Map, Value};

/// Expected structure of a stored value
#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    /// Accept anything unchanged (unregistered cells)
    Any,
    Bool,
    Number,
    Text,
    /// A string drawn from a closed set of identifiers
    OneOf(Vec<&'static str>),
    /// `null` or the inner shape
    Nullable(Box<Shape>),
    /// Array whose elements conform to the inner shape
    List(Box<Shape>),
    /// Object with arbitrary keys whose values conform to the inner shape
    Map(Box<Shape>),
    /// Object with exactly the declared fields
    Record(Vec<Field>),
}

/// Whether a record field must be present after migration
#[derive(Debug, Clone, PartialEq)]
pub enum Presence {
    /// Always present; filled with this value when missing or unusable
    Required(Value),
    /// Kept when present and valid, otherwise omitted
    Optional,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub name: &'static str,
    pub shape: Shape,
    pub presence: Presence,
}

impl Field {
    pub fn required(name: &'static str, shape: Shape, default: Value) -> Self {
        Self {
            name,
            shape,
            presence: Presence::Required(default),
        }
    }

    pub fn optional(name: &'static str, shape: Shape) -> Self {
        Self {
            name,
            shape,
            presence: Presence::Optional,
        }
    }
}

impl Shape {
    pub fn nullable(inner: Shape) -> Self {
        Shape::Nullable(Box::new(inner))
    }

    pub fn list(inner: Shape) -> Self {
        Shape::List(Box::new(inner))
    }

    pub fn map(inner: Shape) -> Self {
        Shape::Map(Box::new(inner))
    }

    /// Record of boolean flags, each defaulting to `false`
    pub fn flags(names: &[&'static str]) -> Self {
        Shape::Record(
            names
                .iter()
                .map(|name| Field::required(*name, Shape::Bool, Value::Bool(false)))
                .collect(),
        )
    }

    /// Check that every declared default conforms to its own shape
    ///
    /// A default that does not conform would make migration non-idempotent,
    /// so registries validate their shapes once in tests.
    pub fn validate_defaults(&self) -> Result<(), String> {
        match self {
            Shape::Nullable(inner) | Shape::List(inner) | Shape::Map(inner) => {
                inner.validate_defaults()
            }
            Shape::Record(fields) => {
                for field in fields {
                    field.shape.validate_defaults()?;
                    if let Presence::Required(default) = &field.presence {
                        let mut scratch = MigrationReport::default();
                        let conformed = field.shape.conform(default, field.name, &mut scratch);
                        if conformed.as_ref() != Some(default) {
                            return Err(format!(
                                "default for field '{}' does not match its shape",
                                field.name
                            ));
                        }
                    }
                }
                Ok(())
            }
            _ => Ok(()),
        }
    }

    fn conform(&self, value: &Value, path: &str, report: &mut MigrationReport) -> Option<Value> {
        match self {
            Shape::Any => Some(value.clone()),
            Shape::Bool => value.is_boolean().then(|| value.clone()),
            Shape::Number => value.is_number().then(|| value.clone()),
            Shape::Text => value.is_string().then(|| value.clone()),
            Shape::OneOf(allowed) => match value.as_str() {
                Some(s) if allowed.iter().any(|a| *a == s) => Some(value.clone()),
                _ => None,
            },
            Shape::Nullable(inner) => {
                if value.is_null() {
                    Some(Value::Null)
                } else {
                    inner.conform(value, path, report)
                }
            }
            Shape::List(inner) => {
                let items = value.as_array()?;
                let kept = items
                    .iter()
                    .enumerate()
                    .filter_map(|(i, item)| {
                        let item_path = format!("{}[{}]", path, i);
                        let conformed = inner.conform(item, &item_path, report);
                        if conformed.is_none() {
                            report.dropped.push(item_path);
                        }
                        conformed
                    })
                    .collect();
                Some(Value::Array(kept))
            }
            Shape::Map(inner) => {
                let entries = value.as_object()?;
                let mut kept = Map::new();
                for (key, entry) in entries {
                    let entry_path = format!("{}.{}", path, key);
                    match inner.conform(entry, &entry_path, report) {
                        Some(v) => {
                            kept.insert(key.clone(), v);
                        }
                        None => report.dropped.push(entry_path),
                    }
                }
                Some(Value::Object(kept))
            }
            Shape::Record(fields) => {
                let entries = value.as_object()?;
                let mut kept = Map::new();
                for field in fields {
                    let field_path = format!("{}.{}", path, field.name);
                    let conformed = entries
                        .get(field.name)
                        .and_then(|v| field.shape.conform(v, &field_path, report));
                    match (conformed, &field.presence) {
                        (Some(v), _) => {
                            kept.insert(field.name.to_string(), v);
                        }
                        (None, Presence::Required(default)) => {
                            report.defaulted.push(field_path);
                            kept.insert(field.name.to_string(), default.clone());
                        }
                        (None, Presence::Optional) => {
                            if entries.contains_key(field.name) {
                                report.dropped.push(field_path);
                            }
                        }
                    }
                }
                for key in entries.keys() {
                    if !fields.iter().any(|f| f.name == key.as_str()) {
                        report.dropped.push(format!("{}.{}", path, key));
                    }
                }
                Some(Value::Object(kept))
            }
        }
    }
}

/// Paths touched while conforming a value, for logging
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MigrationReport {
    /// Unrecognized or unusable entries that were removed
    pub dropped: Vec<String>,
    /// Required fields that were missing or unusable and took their default
    pub defaulted: Vec<String>,
}

/// Outcome of migrating one stored value
#[derive(Debug, Clone, PartialEq)]
pub struct Migrated {
    /// Conformed value, `None` when the top level itself cannot be conformed
    pub value: Option<Value>,
    pub changed: bool,
    pub report: MigrationReport,
}

pub struct StoreMigrator;

impl StoreMigrator {
    /// Conform `raw` to `shape`
    pub fn migrate(shape: &Shape, raw: &Value) -> Migrated {
        let mut report = MigrationReport::default();
        let value = shape.conform(raw, "$", &mut report);
        let changed = value.as_ref() != Some(raw);
        Migrated {
            value,
            changed,
            report,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    fn platforms() -> Shape {
        Shape::flags(&["facebook", "instagram", "tiktok", "x", "youtube"])
    }

    fn member_shape() -> Shape {
        Shape::Record(vec![
            Field::required("id", Shape::Number, json!(0)),
            Field::required("name", Shape::Text, json!("")),
            Field::required("role", Shape::OneOf(vec!["Admin", "Finance"]), json!("Finance")),
            Field::required(
                "permissions",
                Shape::list(Shape::OneOf(vec!["releases", "settings"])),
                json!([]),
            ),
            Field::optional("avatarUrl", Shape::Text),
        ])
    }

    #[test]
    fn test_platform_connections_drop_unknown_and_default_missing() {
        let raw = json!({"facebook": true, "myspace": true});
        let migrated = StoreMigrator::migrate(&platforms(), &raw);

        assert!(migrated.changed);
        assert_eq!(
            migrated.value,
            Some(json!({
                "facebook": true,
                "instagram": false,
                "tiktok": false,
                "x": false,
                "youtube": false
            }))
        );
        assert_eq!(migrated.report.dropped, vec!["$.myspace".to_string()]);
        assert_eq!(migrated.report.defaulted.len(), 4);
    }

    #[test]
    fn test_canonical_value_is_unchanged() {
        let raw = json!({"facebook": false, "instagram": true, "tiktok": false, "x": true, "youtube": false});
        let migrated = StoreMigrator::migrate(&platforms(), &raw);
        assert!(!migrated.changed);
        assert_eq!(migrated.value, Some(raw));
    }

    #[test]
    fn test_unknown_permissions_pruned_from_members() {
        let raw = json!([{
            "id": 1,
            "name": "Ada",
            "role": "Finance",
            "permissions": ["releases", "myspace-sync", "settings"],
            "legacyFlag": 1
        }]);
        let migrated = StoreMigrator::migrate(&Shape::list(member_shape()), &raw);
        assert!(migrated.changed);
        assert_eq!(
            migrated.value,
            Some(json!([{
                "id": 1,
                "name": "Ada",
                "role": "Finance",
                "permissions": ["releases", "settings"]
            }]))
        );
    }

    #[test]
    fn test_ill_typed_optional_field_is_omitted() {
        let raw = json!({"id": 2, "name": "Bo", "role": "Admin", "permissions": [], "avatarUrl": 5});
        let migrated = StoreMigrator::migrate(&member_shape(), &raw);
        assert!(migrated.changed);
        assert_eq!(migrated.value.unwrap().get("avatarUrl"), None);
    }

    #[test]
    fn test_wrong_top_level_type_yields_none() {
        let migrated = StoreMigrator::migrate(&platforms(), &json!("facebook"));
        assert_eq!(migrated.value, None);
        assert!(migrated.changed);
    }

    #[test]
    fn test_nullable_accepts_null() {
        let shape = Shape::nullable(Shape::Number);
        assert!(!StoreMigrator::migrate(&shape, &Value::Null).changed);
        assert_eq!(StoreMigrator::migrate(&shape, &json!("7")).value, None);
    }

    #[test]
    fn test_validate_defaults_catches_bad_default() {
        let bad = Shape::Record(vec![Field::required("flag", Shape::Bool, json!("no"))]);
        assert!(bad.validate_defaults().is_err());
        assert!(member_shape().validate_defaults().is_ok());
        assert!(platforms().validate_defaults().is_ok());
    }

    fn arb_json() -> impl Strategy<Value = Value> {
        let leaf = prop_oneof![
            Just(Value::Null),
            any::<bool>().prop_map(Value::Bool),
            any::<i32>().prop_map(|n| json!(n)),
            prop_oneof![
                Just("facebook"),
                Just("x"),
                Just("releases"),
                Just("Admin"),
                Just("myspace"),
                Just("name"),
            ]
            .prop_map(|s| Value::String(s.to_string())),
        ];
        leaf.prop_recursive(3, 24, 6, |inner| {
            prop_oneof![
                proptest::collection::vec(inner.clone(), 0..6).prop_map(Value::Array),
                proptest::collection::btree_map(
                    prop_oneof![
                        Just("facebook".to_string()),
                        Just("x".to_string()),
                        Just("id".to_string()),
                        Just("name".to_string()),
                        Just("role".to_string()),
                        Just("permissions".to_string()),
                        Just("avatarUrl".to_string()),
                        Just("myspace".to_string()),
                    ],
                    inner,
                    0..6
                )
                .prop_map(|m| Value::Object(m.into_iter().collect())),
            ]
        })
    }

    fn arb_shape() -> impl Strategy<Value = Shape> {
        prop_oneof![
            Just(platforms()),
            Just(member_shape()),
            Just(Shape::list(member_shape())),
            Just(Shape::map(Shape::nullable(Shape::Number))),
            Just(Shape::list(Shape::OneOf(vec!["releases", "settings"]))),
            Just(Shape::Any),
        ]
    }

    proptest! {
        #[test]
        fn prop_migration_is_idempotent(shape in arb_shape(), raw in arb_json()) {
            let first = StoreMigrator::migrate(&shape, &raw);
            if let Some(value) = first.value {
                let second = StoreMigrator::migrate(&shape, &value);
                prop_assert!(!second.changed);
                prop_assert_eq!(second.value, Some(value));
            }
        }
    }
}
