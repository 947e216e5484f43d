//! Hierarchical cache keys

use std::fmt;

use serde::Serialize;

use crate::ApplicationError;

/// Resource name followed by ordered parts, e.g. `applications/search/{...}`
///
/// Invalidation works on prefixes, so `["inbox"]` covers every inbox page
/// and the unread counter.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct QueryKey(Vec<String>);

impl QueryKey {
    #[must_use]
    pub fn new(resource: impl Into<String>) -> Self {
        Self(vec![resource.into()])
    }

    #[must_use]
    pub fn with(mut self, part: impl Into<String>) -> Self {
        self.0.push(part.into());
        self
    }

    /// Append the JSON form of a parameter object
    pub fn with_params<T: Serialize + ?Sized>(self, params: &T) -> Result<Self, ApplicationError> {
        let encoded = serde_json::to_string(params)
            .map_err(|e| ApplicationError::Internal(format!("Query key encoding error: {e}")))?;
        Ok(self.with(encoded))
    }

    #[must_use]
    pub fn parts(&self) -> &[String] {
        &self.0
    }

    #[must_use]
    pub fn resource(&self) -> &str {
        &self.0[0]
    }

    #[must_use]
    pub fn starts_with(&self, prefix: &Self) -> bool {
        self.0.starts_with(&prefix.0)
    }
}

impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.join("/"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefix_matching_is_by_part() {
        let key = QueryKey::new("inbox").with("list").with("unread");
        assert!(key.starts_with(&QueryKey::new("inbox")));
        assert!(key.starts_with(&QueryKey::new("inbox").with("list")));
        assert!(!key.starts_with(&QueryKey::new("in")));
        assert!(!QueryKey::new("inbox").starts_with(&key));
    }

    #[test]
    fn params_are_encoded_as_json() {
        let key = QueryKey::new("applications")
            .with("search")
            .with_params(&serde_json::json!({"q": "quarry"}))
            .unwrap();
        assert_eq!(key.parts().len(), 3);
        assert_eq!(key.parts()[2], r#"{"q":"quarry"}"#);
        assert_eq!(key.resource(), "applications");
    }

    #[test]
    fn display_joins_parts() {
        let key = QueryKey::new("applications").with("a1");
        assert_eq!(key.to_string(), "applications/a1");
    }
}
