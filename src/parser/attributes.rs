//! Attribute lookup for element-opened notifications.

use crate::decode::parse_u32;
use crate::error::{Error, Result};
use crate::objects::Uri;
use std::str::FromStr;

/// The attributes of one start tag, in document order.
///
/// ```rust
/// use collada_rs::parser::Attributes;
///
/// let attrs: Attributes = [("id", "geom-1"), ("count", "3")].into_iter().collect();
/// assert_eq!(attrs.get("id"), Some("geom-1"));
/// assert_eq!(attrs.u32("count").unwrap(), Some(3));
/// assert_eq!(attrs.u32("stride").unwrap(), None);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Attributes(Vec<(String, String)>);

impl Attributes {
    /// Creates an empty attribute set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an attribute.
    pub fn push(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.push((key.into(), value.into()));
    }

    /// Returns the raw value of `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Returns an owned copy of the value of `key`.
    pub fn string(&self, key: &str) -> Option<String> {
        self.get(key).map(str::to_string)
    }

    /// Parses the value of `key` with its `FromStr` implementation.
    pub fn parse<T: FromStr<Err = Error>>(&self, key: &str) -> Result<Option<T>> {
        self.get(key).map(|v| v.trim().parse()).transpose()
    }

    /// Parses the value of `key` as a URI reference.
    pub fn uri(&self, key: &str) -> Result<Option<Uri>> {
        self.get(key).map(Uri::parse).transpose()
    }

    /// Parses the value of `key` as an unsigned integer.
    pub fn u32(&self, key: &str) -> Result<Option<u32>> {
        self.get(key).map(|v| parse_u32(v.trim())).transpose()
    }

    /// Parses the value of `key` as a double.
    pub fn f64(&self, key: &str) -> Result<Option<f64>> {
        self.get(key)
            .map(|v| {
                v.trim().parse().map_err(|source| Error::InvalidFloat {
                    value: v.to_string(),
                    source,
                })
            })
            .transpose()
    }

    /// Number of attributes.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true when the tag carried no attributes.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Attributes {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Attributes(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_typed_lookups() {
        let attrs: Attributes = [
            ("url", "#geom"),
            ("meter", "0.01"),
            ("count", "x"),
            ("type", "JOINT"),
        ]
        .into_iter()
        .collect();

        assert!(attrs.uri("url").unwrap().unwrap().is_local());
        assert_eq!(attrs.f64("meter").unwrap(), Some(0.01));
        assert!(matches!(
            attrs.u32("count"),
            Err(Error::InvalidInteger { .. })
        ));
        assert_eq!(
            attrs.parse::<crate::objects::NodeType>("type").unwrap(),
            Some(crate::objects::NodeType::Joint)
        );
        assert_eq!(attrs.len(), 4);
    }
}
