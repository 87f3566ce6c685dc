use std::borrow::Cow;

use serde::Serialize;

use crate::error::{DecodeError, Result};
use crate::value::QueryMap;

/// Decoding hook applied by [`Config::parse`] to the whole input string
/// before it is split into pairs. Defaults to [`unescape`](crate::unescape).
pub type DecodeFn = fn(&str) -> std::result::Result<String, DecodeError>;

/// Encoding hook applied by [`Config::stringify`] to each key and value.
/// Defaults to [`escape`](crate::escape) (which never fails; the `Result`
/// is in the signature so replacements may reject input).
pub type EncodeFn = fn(&str) -> std::result::Result<String, DecodeError>;

/// Configuration for parsing and stringification behavior.
///
/// A `Config` carries the pair separator, the key/value joiner, the
/// percent-coding hooks and the key limit. `Config::new()` returns the
/// defaults matching Node's `querystring` module; builder methods derive
/// adjusted copies, so a shared default can never be mutated from afar.
///
/// ```
/// use querystring::{Config, Value};
///
/// let config = Config::new().separator(";").key_value_joiner(":");
/// let map = config.parse("a:1;b:2").unwrap();
/// assert_eq!(map["a"], Value::from("1"));
/// assert_eq!(map["b"], Value::from("2"));
/// ```
#[derive(Clone, Debug)]
pub struct Config {
    pub(crate) separator: Cow<'static, str>,
    pub(crate) key_value_joiner: Cow<'static, str>,
    pub(crate) decode_fn: DecodeFn,
    pub(crate) encode_fn: EncodeFn,
    pub(crate) max_keys: usize,
    pub(crate) inclusive_max_keys: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

impl Config {
    pub const fn new() -> Self {
        Self {
            separator: Cow::Borrowed("&"),
            key_value_joiner: Cow::Borrowed("="),
            decode_fn: crate::encode::unescape,
            encode_fn: crate::encode::escape_fn,
            max_keys: 1000,
            inclusive_max_keys: true,
        }
    }

    /// The substring separating key/value pairs. Default is `"&"`.
    ///
    /// An empty separator makes the whole input a single pair: there is
    /// nothing to split on.
    pub fn separator(mut self, separator: impl Into<Cow<'static, str>>) -> Self {
        self.separator = separator.into();
        self
    }

    /// The substring joining a key to its value within one pair.
    /// Default is `"="`.
    ///
    /// Pairs are split on the _first_ occurrence, so `a==b` parses to key
    /// `a` with value `=b`. An empty joiner is treated as absent: every
    /// pair becomes a bare key.
    pub fn key_value_joiner(mut self, key_value_joiner: impl Into<Cow<'static, str>>) -> Self {
        self.key_value_joiner = key_value_joiner.into();
        self
    }

    /// Replaces the decoding function applied to the input before
    /// splitting. Default is [`unescape`](crate::unescape).
    pub fn decode_fn(mut self, decode_fn: DecodeFn) -> Self {
        self.decode_fn = decode_fn;
        self
    }

    /// Replaces the encoding function applied to each key and value
    /// during stringification. Default is [`escape`](crate::escape).
    pub fn encode_fn(mut self, encode_fn: EncodeFn) -> Self {
        self.encode_fn = encode_fn;
        self
    }

    /// Limits how many pairs [`Config::parse`] will consume; pairs past
    /// the limit are dropped without error. Default is 1000; `0` means
    /// unlimited.
    pub fn max_keys(mut self, max_keys: usize) -> Self {
        self.max_keys = max_keys;
        self
    }

    /// Historically the key limit is applied _after_ consuming a pair, so
    /// one more pair than `max_keys` makes it into the output. That quirk
    /// is kept by default since existing callers may depend on the cutoff
    /// point; pass `false` to stop at exactly `max_keys` pairs.
    pub fn inclusive_max_keys(mut self, inclusive_max_keys: bool) -> Self {
        self.inclusive_max_keys = inclusive_max_keys;
        self
    }

    /// Parses a query string into a [`QueryMap`] using this `Config`.
    pub fn parse(&self, input: &str) -> Result<QueryMap> {
        crate::parse::parse(self, input)
    }

    /// Serializes an object to a query string using this `Config`.
    pub fn stringify<T: Serialize>(&self, input: &T) -> Result<String> {
        crate::stringify::stringify(self, input)
    }
}
