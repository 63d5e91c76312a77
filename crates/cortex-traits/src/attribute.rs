//! Categorical attribute values and the value tuples used as grouping keys.

use std::fmt;

use serde::{Deserialize, Serialize};

/// One categorical value in a traits table (e.g. `"L5_TPC"`, `"inhibitory"`, `3`).
///
/// Deserialized untagged, so recipe files write plain integers and strings.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttributeValue {
    /// Integer-coded category (layer numbers, color indices, ...).
    Int(i64),
    /// Named category.
    Text(String),
}

impl AttributeValue {
    /// Returns the text content, if this is a [`AttributeValue::Text`].
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            Self::Int(_) => None,
        }
    }
}

impl fmt::Display for AttributeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(v) => write!(f, "{v}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

impl From<&str> for AttributeValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for AttributeValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<i64> for AttributeValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<i32> for AttributeValue {
    fn from(value: i32) -> Self {
        Self::Int(i64::from(value))
    }
}

/// Ordered tuple of attribute values identifying one split group.
///
/// Splitting on a single attribute yields one-element keys.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TraitKey(Vec<AttributeValue>);

impl TraitKey {
    /// Creates a key from values listed in attribute order.
    pub fn new(values: Vec<AttributeValue>) -> Self {
        Self(values)
    }

    /// Creates a one-element key.
    pub fn single(value: impl Into<AttributeValue>) -> Self {
        Self(vec![value.into()])
    }

    /// Returns the values in attribute order.
    pub fn values(&self) -> &[AttributeValue] {
        &self.0
    }

    /// Number of attributes in the key.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` for the empty key.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<V: Into<AttributeValue>> FromIterator<V> for TraitKey {
    fn from_iter<I: IntoIterator<Item = V>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

impl fmt::Display for TraitKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("(")?;
        for (i, value) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{value}")?;
        }
        f.write_str(")")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_untagged_values_parse_from_ron() {
        let values: Vec<AttributeValue> = ron::from_str(r#"[3, "L23_MC", -1]"#).unwrap();
        assert_eq!(
            values,
            vec![
                AttributeValue::Int(3),
                AttributeValue::from("L23_MC"),
                AttributeValue::Int(-1)
            ]
        );
    }

    #[test]
    fn test_key_display() {
        let key: TraitKey = ["b", "y"].into_iter().collect();
        assert_eq!(key.to_string(), "(b, y)");
        assert_eq!(TraitKey::single(4).to_string(), "(4)");
    }

    #[test]
    fn test_text_and_int_are_distinct() {
        assert_ne!(AttributeValue::from("0"), AttributeValue::from(0));
    }
}
