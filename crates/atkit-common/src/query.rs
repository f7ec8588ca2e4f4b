//! Query-string encoding for XRPC queries.
//!
//! [`QueryParams`] is an ordered list of `(name, value)` pairs. Array
//! parameters are written as repeated pairs with the same name, which the
//! server OR-combines. Absent values are skipped and bounded numerics are
//! clamped into range rather than rejected.

use serde::Serialize;
use smol_str::{SmolStr, ToSmolStr};
use url::Url;
use url::form_urlencoded;

use crate::error::{ClientError, EncodeError};

/// Declared numeric range for a query parameter, with an optional default.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bounds {
    /// Smallest accepted value
    pub min: i64,
    /// Largest accepted value
    pub max: i64,
    /// Value sent when the caller leaves the parameter unset
    pub default: Option<i64>,
}

impl Bounds {
    /// A range with no default; unset values are omitted.
    pub const fn new(min: i64, max: i64) -> Self {
        Self {
            min,
            max,
            default: None,
        }
    }

    /// Send `default` when the caller leaves the parameter unset.
    pub const fn with_default(self, default: i64) -> Self {
        Self {
            default: Some(default),
            ..self
        }
    }

    /// Clamp `value` into `[min, max]`.
    pub fn clamp(&self, value: i64) -> i64 {
        value.clamp(self.min, self.max)
    }

    /// The value to send for `requested`, if any.
    pub fn resolve(&self, requested: Option<i64>) -> Option<i64> {
        requested.or(self.default).map(|v| self.clamp(v))
    }
}

/// Ordered query parameter set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams {
    pairs: Vec<(SmolStr, SmolStr)>,
}

impl QueryParams {
    /// Empty parameter set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Encode a params struct through serde, in field order.
    ///
    /// Sequences become repeated pairs and `None` fields marked
    /// `skip_serializing_if` are left out.
    pub fn from_serialize<T: Serialize + ?Sized>(params: &T) -> Result<Self, EncodeError> {
        let encoded = serde_html_form::to_string(params)?;
        let pairs = form_urlencoded::parse(encoded.as_bytes())
            .map(|(k, v)| (SmolStr::new(k), SmolStr::new(v)))
            .collect();
        Ok(Self { pairs })
    }

    /// Append a scalar parameter.
    pub fn push(&mut self, name: &str, value: impl ToSmolStr) -> &mut Self {
        self.pairs.push((SmolStr::new(name), value.to_smolstr()));
        self
    }

    /// Append a parameter only when it is present.
    pub fn push_opt<V: ToSmolStr>(&mut self, name: &str, value: Option<V>) -> &mut Self {
        if let Some(value) = value {
            self.push(name, value);
        }
        self
    }

    /// Append one pair per value, preserving order.
    pub fn push_all<I>(&mut self, name: &str, values: I) -> &mut Self
    where
        I: IntoIterator,
        I::Item: ToSmolStr,
    {
        for value in values {
            self.push(name, value);
        }
        self
    }

    /// Append a bounded numeric parameter, clamped into range.
    pub fn push_bounded(&mut self, name: &str, value: Option<i64>, bounds: Bounds) -> &mut Self {
        self.push_opt(name, bounds.resolve(value))
    }

    /// All values recorded under `name`, in order.
    pub fn get_all<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.pairs
            .iter()
            .filter(move |(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// The recorded pairs, in order.
    pub fn pairs(&self) -> &[(SmolStr, SmolStr)] {
        &self.pairs
    }

    /// Whether no parameters were recorded.
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// The canonical `application/x-www-form-urlencoded` string.
    pub fn encode(&self) -> String {
        let mut serializer = form_urlencoded::Serializer::new(String::new());
        for (name, value) in &self.pairs {
            serializer.append_pair(name, value);
        }
        serializer.finish()
    }

    /// Replace the query of `url` with these parameters.
    pub fn apply_to(&self, url: &mut Url) {
        if self.pairs.is_empty() {
            url.set_query(None);
        } else {
            url.set_query(Some(&self.encode()));
        }
    }

    /// Parse `base` and append these parameters.
    pub fn to_url(&self, base: &str) -> Result<Url, ClientError> {
        let mut url = Url::parse(base).map_err(|e| ClientError::invalid_url(base, e))?;
        self.apply_to(&mut url);
        Ok(url)
    }
}
