//! Query parameter map and its form encoder.

use std::collections::BTreeMap;

use url::form_urlencoded;

/// One query value, tagged with whether it still needs encoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryValue {
    /// Raw value; form-encoded by [`QueryParams::encode`].
    Plain(String),
    /// Already percent-encoded by the operation; emitted verbatim.
    Encoded(String),
}

impl QueryValue {
    fn encoded(&self) -> String {
        match self {
            Self::Plain(v) => form_urlencoded::byte_serialize(v.as_bytes()).collect(),
            Self::Encoded(v) => v.clone(),
        }
    }
}

/// Query parameters keyed by name. Keys are unique; setting a key twice keeps
/// the last value. Iteration and encoding are in key order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams(BTreeMap<String, QueryValue>);

impl QueryParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a raw value that the executor will form-encode.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.0.insert(key.into(), QueryValue::Plain(value.into()));
        self
    }

    /// Sets a value the caller has already percent-encoded.
    pub fn set_encoded(&mut self, key: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.0.insert(key.into(), QueryValue::Encoded(value.into()));
        self
    }

    /// Sets a raw value only if `key` is absent.
    pub fn set_default(&mut self, key: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.0
            .entry(key.into())
            .or_insert_with(|| QueryValue::Plain(value.into()));
        self
    }

    pub fn get(&self, key: &str) -> Option<&QueryValue> {
        self.0.get(key)
    }

    /// Raw (plain) or pre-encoded value as stored.
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(|v| match v {
            QueryValue::Plain(s) | QueryValue::Encoded(s) => s.as_str(),
        })
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn remove(&mut self, key: &str) -> Option<QueryValue> {
        self.0.remove(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Serializes as `k1=v1&k2=v2`, sorted by key.
    ///
    /// Plain values are form-encoded (space becomes `+`); pre-encoded values
    /// pass through untouched.
    pub fn encode(&self) -> String {
        self.0
            .iter()
            .map(|(k, v)| {
                let key: String = form_urlencoded::byte_serialize(k.as_bytes()).collect();
                format!("{key}={}", v.encoded())
            })
            .collect::<Vec<_>>()
            .join("&")
    }
}
