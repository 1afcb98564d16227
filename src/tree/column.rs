//! Column definitions and row field access.

use serde_json::Value;

/// One column: the row field it reads and its header text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnDef {
    pub key: String,
    pub header: String,
}

impl ColumnDef {
    pub fn new(key: impl Into<String>, header: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            header: header.into(),
        }
    }
}

/// A row that can be displayed by the hierarchical table.
pub trait TableRecord {
    /// Display text of a field, `None` when absent or null.
    fn field(&self, key: &str) -> Option<String>;
}

impl TableRecord for Value {
    fn field(&self, key: &str) -> Option<String> {
        match self.get(key)? {
            Value::Null => None,
            Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_json_fields() {
        let row = json!({"floorId": 5, "name": "Tầng 2", "active": true, "note": null});
        assert_eq!(row.field("floorId").as_deref(), Some("5"));
        assert_eq!(row.field("name").as_deref(), Some("Tầng 2"));
        assert_eq!(row.field("active").as_deref(), Some("true"));
        assert_eq!(row.field("note"), None);
        assert_eq!(row.field("missing"), None);
    }
}
