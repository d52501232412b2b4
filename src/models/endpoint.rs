//! Endpoint identity models
//!
//! Defines the two benchmarked endpoints and the payload sent to them.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of one of the two endpoints under comparison.
///
/// `A` orders before `B`; `A` is the default winner on exact ties.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EndpointId {
    A,
    B,
}

impl EndpointId {
    /// Short name used in CLI arguments and logs
    pub fn name(&self) -> &'static str {
        match self {
            EndpointId::A => "a",
            EndpointId::B => "b",
        }
    }

    /// Both endpoints, in listing order
    pub fn all() -> [EndpointId; 2] {
        [EndpointId::A, EndpointId::B]
    }

    /// Parse from string
    pub fn from_str(s: &str) -> Option<EndpointId> {
        match s.to_lowercase().as_str() {
            "a" | "endpoint-a" => Some(EndpointId::A),
            "b" | "endpoint-b" => Some(EndpointId::B),
            _ => None,
        }
    }
}

impl fmt::Display for EndpointId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name().to_uppercase())
    }
}

/// A benchmarked endpoint
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Endpoint {
    pub id: EndpointId,
    /// Human readable label shown in reports
    pub label: String,
    /// Base address; requests go to `<base_url>/process`
    pub base_url: String,
}

impl Endpoint {
    pub fn new(id: EndpointId, label: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            id,
            label: label.into(),
            base_url: base_url.into(),
        }
    }

    /// Full URL of the processing route
    pub fn process_url(&self) -> String {
        format!("{}/process", self.base_url.trim_end_matches('/'))
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.label, self.base_url)
    }
}

/// One value per endpoint
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct EndpointPair<T> {
    pub a: T,
    pub b: T,
}

impl<T> EndpointPair<T> {
    pub fn new(a: T, b: T) -> Self {
        Self { a, b }
    }

    pub fn get(&self, id: EndpointId) -> &T {
        match id {
            EndpointId::A => &self.a,
            EndpointId::B => &self.b,
        }
    }

    pub fn get_mut(&mut self, id: EndpointId) -> &mut T {
        match id {
            EndpointId::A => &mut self.a,
            EndpointId::B => &mut self.b,
        }
    }
}

/// Document text sent to the endpoints
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Document(String);

impl Document {
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Zero-length text. Whitespace-only text is still a payload.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }
}

impl From<String> for Document {
    fn from(text: String) -> Self {
        Self(text)
    }
}

impl From<&str> for Document {
    fn from(text: &str) -> Self {
        Self(text.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_id_from_str() {
        assert_eq!(EndpointId::from_str("A"), Some(EndpointId::A));
        assert_eq!(EndpointId::from_str("endpoint-b"), Some(EndpointId::B));
        assert_eq!(EndpointId::from_str("c"), None);
    }

    #[test]
    fn test_process_url() {
        let endpoint = Endpoint::new(EndpointId::A, "Endpoint A", "http://localhost:8080/");
        assert_eq!(endpoint.process_url(), "http://localhost:8080/process");
    }

    #[test]
    fn test_endpoint_pair() {
        let mut pair = EndpointPair::new(1, 2);
        *pair.get_mut(EndpointId::B) += 10;
        assert_eq!(*pair.get(EndpointId::A), 1);
        assert_eq!(*pair.get(EndpointId::B), 12);
    }

    #[test]
    fn test_document_emptiness() {
        assert!(Document::default().is_empty());
        assert!(!Document::from("   ").is_empty());
        assert_eq!(Document::from("abc").len(), 3);
    }
}
