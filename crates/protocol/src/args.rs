//! Call arguments and their per-generation wire encoding.

use std::collections::BTreeMap;

use {
    serde::{Deserialize, Serialize},
    serde_json::Value,
};

use crate::ApiVersion;

/// Arguments for one API call: a mapping of string keys to JSON values.
///
/// Duplicate keys are impossible by construction and ordering is
/// insignificant. For API1 the keys are logically a token list; see
/// [`Args::encode`] for the flag/`key=value` split rule.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Args(BTreeMap<String, Value>);

impl Args {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set(key, value);
        self
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(key.into(), value.into());
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// The argument keys in their (insignificant) sorted order.
    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.0.keys()
    }

    /// Synthesize API1 arguments from a literal token list.
    ///
    /// Each token becomes a key with a boolean-true value; the token split
    /// rule is then applied by [`Args::encode`], so `"foo=bar"` and `"baz"`
    /// encode identically whether they arrived through this constructor or
    /// as map keys built by another layer.
    #[must_use]
    pub fn from_tokens(tokens: &[String]) -> Self {
        let mut args = Self::new();
        for token in tokens {
            args.set(token.clone(), true);
        }
        args
    }

    /// Encode into query/form pairs for the given API generation.
    ///
    /// Non-legacy generations stringify each value into one pair. API1
    /// treats each *key* as a token: no `=` means a bare flag with an empty
    /// value, otherwise the token splits once on the first `=`.
    #[must_use]
    pub fn encode(&self, version: ApiVersion) -> Vec<(String, String)> {
        let mut pairs = Vec::with_capacity(self.0.len());
        for (key, value) in &self.0 {
            if version == ApiVersion::Api1 {
                match key.split_once('=') {
                    Some((k, v)) => pairs.push((k.to_string(), v.to_string())),
                    None => pairs.push((key.clone(), String::new())),
                }
            } else {
                pairs.push((key.clone(), stringify(value)));
            }
        }
        pairs
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Args {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

/// Render a JSON value the way it should appear as a single query parameter.
fn stringify(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn api2_keeps_keys_verbatim() {
        let args = Args::new().with("key=not", "value");
        assert_eq!(
            args.encode(ApiVersion::Api2),
            vec![("key=not".to_string(), "value".to_string())]
        );
    }

    #[test]
    fn api1_splits_on_first_equals() {
        let args = Args::new().with("key=not", "value");
        assert_eq!(
            args.encode(ApiVersion::Api1),
            vec![("key".to_string(), "not".to_string())]
        );

        let args = Args::new().with("a=b=c", true);
        assert_eq!(
            args.encode(ApiVersion::Api1),
            vec![("a".to_string(), "b=c".to_string())]
        );
    }

    #[test]
    fn api1_bare_token_is_an_empty_flag() {
        let args = Args::new().with("baz", true);
        assert_eq!(
            args.encode(ApiVersion::Api1),
            vec![("baz".to_string(), String::new())]
        );
    }

    #[test]
    fn token_list_and_map_keys_encode_identically() {
        let from_tokens = Args::from_tokens(&["foo=bar".to_string(), "baz".to_string()]);
        let from_map = Args::new().with("foo=bar", true).with("baz", true);
        assert_eq!(
            from_tokens.encode(ApiVersion::Api1),
            from_map.encode(ApiVersion::Api1)
        );
        assert_eq!(from_tokens.encode(ApiVersion::Api1), vec![
            ("baz".to_string(), String::new()),
            ("foo".to_string(), "bar".to_string()),
        ]);
    }

    #[test]
    fn values_stringify_without_json_quoting() {
        let args = Args::new()
            .with("name", "test")
            .with("count", 3)
            .with("flag", true)
            .with("nothing", Value::Null);
        let pairs = args.encode(ApiVersion::Uapi);
        assert!(pairs.contains(&("name".to_string(), "test".to_string())));
        assert!(pairs.contains(&("count".to_string(), "3".to_string())));
        assert!(pairs.contains(&("flag".to_string(), "true".to_string())));
        assert!(pairs.contains(&("nothing".to_string(), String::new())));
    }

    #[test]
    fn serializes_as_a_plain_map() {
        let args = Args::new().with("domain", "example.com");
        assert_eq!(
            serde_json::to_string(&args).unwrap(),
            r#"{"domain":"example.com"}"#
        );
    }
}
