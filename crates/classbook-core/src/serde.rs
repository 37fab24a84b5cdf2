//! Serde helpers for write payloads.

use serde::{Deserialize, Deserializer};

/// Distinguishes an absent field from an explicit `null` in partial updates.
///
/// Use together with `#[serde(default)]`: absent → `None`, `null` →
/// `Some(None)`, a value → `Some(Some(value))`.
pub fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Deserialize)]
    struct Patch {
        #[serde(default, deserialize_with = "double_option")]
        grade: Option<Option<i64>>,
    }

    #[test]
    fn test_double_option_absent() {
        let patch: Patch = serde_json::from_str("{}").unwrap();
        assert_eq!(patch.grade, None);
    }

    #[test]
    fn test_double_option_null() {
        let patch: Patch = serde_json::from_str(r#"{"grade": null}"#).unwrap();
        assert_eq!(patch.grade, Some(None));
    }

    #[test]
    fn test_double_option_value() {
        let patch: Patch = serde_json::from_str(r#"{"grade": 4}"#).unwrap();
        assert_eq!(patch.grade, Some(Some(4)));
    }
}
