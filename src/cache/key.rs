//! Cache key construction.

use crate::{Error, ErrorContext, Result};
use serde::{Deserialize, Serialize};

/// Separator between the operation name and its serialized parameters.
pub const KEY_SEPARATOR: char = ':';

/// Identifies one cacheable operation together with its parameters.
///
/// Keys built through [`CacheKey::for_request`] have the shape `op` or
/// `op:<canonical json>`. Operation names never contain the separator, so two
/// different `(op, params)` pairs can not produce the same key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CacheKey(String);

impl CacheKey {
    /// Raw key, used verbatim.
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// Key for an operation without parameters.
    pub fn for_operation(op: &str) -> Result<Self> {
        validate_operation(op)?;
        Ok(Self(op.to_string()))
    }

    /// Key for an operation and its parameters.
    ///
    /// Parameters are serialized to JSON with object keys sorted, so equal
    /// inputs always produce equal keys regardless of field order.
    pub fn for_request<P: Serialize + ?Sized>(op: &str, params: &P) -> Result<Self> {
        validate_operation(op)?;
        let canonical = canonical_json(params)?;
        Ok(Self(format!("{}{}{}", op, KEY_SEPARATOR, canonical)))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Operation name part of the key (everything before the first separator).
    pub fn endpoint(&self) -> &str {
        match self.0.split_once(KEY_SEPARATOR) {
            Some((op, _)) => op,
            None => &self.0,
        }
    }

    pub fn belongs_to(&self, endpoint: &str) -> bool {
        self.endpoint() == endpoint
    }
}

impl std::fmt::Display for CacheKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for CacheKey {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for CacheKey {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl AsRef<str> for CacheKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

fn validate_operation(op: &str) -> Result<()> {
    if op.is_empty() {
        return Err(Error::validation_with_context(
            "operation name cannot be empty",
            ErrorContext::new().with_source("cache_key"),
        ));
    }
    if op.contains(KEY_SEPARATOR) {
        return Err(Error::validation_with_context(
            format!("operation name '{}' contains '{}'", op, KEY_SEPARATOR),
            ErrorContext::new()
                .with_field_path("op")
                .with_source("cache_key"),
        ));
    }
    Ok(())
}

/// serde_json's default map is ordered, so going through `Value` sorts object keys.
fn canonical_json<P: Serialize + ?Sized>(params: &P) -> Result<String> {
    let value = serde_json::to_value(params)?;
    Ok(serde_json::to_string(&value)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::HashMap;

    #[derive(Serialize)]
    #[serde(rename_all = "camelCase")]
    struct ByEmployee<'a> {
        employee_id: &'a str,
    }

    #[test]
    fn test_key_shape() {
        let key = CacheKey::for_request("paginatedTransactions", &json!({"page": 1})).unwrap();
        assert_eq!(key.as_str(), r#"paginatedTransactions:{"page":1}"#);
        assert_eq!(key.endpoint(), "paginatedTransactions");

        let key = CacheKey::for_operation("employees").unwrap();
        assert_eq!(key.as_str(), "employees");
        assert_eq!(key.endpoint(), "employees");
    }

    #[test]
    fn test_field_order_does_not_matter() {
        let mut a = HashMap::new();
        a.insert("b", 2);
        a.insert("a", 1);
        let b = json!({"a": 1, "b": 2});
        assert_eq!(
            CacheKey::for_request("op", &a).unwrap(),
            CacheKey::for_request("op", &b).unwrap()
        );
    }

    #[test]
    fn test_struct_and_value_agree() {
        let typed = CacheKey::for_request("transactionsByEmployee", &ByEmployee { employee_id: "e1" }).unwrap();
        let untyped = CacheKey::for_request("transactionsByEmployee", &json!({"employeeId": "e1"})).unwrap();
        assert_eq!(typed, untyped);
    }

    #[test]
    fn test_distinct_inputs_distinct_keys() {
        let keys = vec![
            CacheKey::for_operation("employees").unwrap(),
            CacheKey::for_request("employees", &json!(null)).unwrap(),
            CacheKey::for_request("paginatedTransactions", &json!({"page": 0})).unwrap(),
            CacheKey::for_request("paginatedTransactions", &json!({"page": 1})).unwrap(),
            CacheKey::for_request("paginatedTransactions", &json!({"page": "1"})).unwrap(),
            CacheKey::for_request("transactionsByEmployee", &json!({"employeeId": "1"})).unwrap(),
            CacheKey::for_request("transactionsByEmployee", &json!({"employeeId": "10"})).unwrap(),
        ];
        let unique: std::collections::HashSet<_> = keys.iter().collect();
        assert_eq!(unique.len(), keys.len());
    }

    #[test]
    fn test_invalid_operation_rejected() {
        assert!(matches!(
            CacheKey::for_operation(""),
            Err(Error::Validation { .. })
        ));
        assert!(matches!(
            CacheKey::for_request("a:b", &json!({})),
            Err(Error::Validation { .. })
        ));
    }

    #[test]
    fn test_raw_keys() {
        let key = CacheKey::from("e:1");
        assert_eq!(key.endpoint(), "e");
        assert!(key.belongs_to("e"));
        assert!(!key.belongs_to("e:1"));
        assert_eq!(key.to_string(), "e:1");
    }
}
