//! Query string parsing and stringification in the style of Node's
//! `querystring` module.
//!
//! Four operations cover the whole surface: [`parse`] and [`stringify`]
//! convert between delimited strings and an insertion-ordered map, and
//! [`escape`] / [`unescape`] are the percent-coding helpers both are
//! built on.
//!
//! A parsed query string is a flat [`QueryMap`]: keys map to a single
//! [`Value`], and a key that appears several times collects its values
//! into a sequence in encounter order. Nested structures and bracket
//! syntax (`a[b]=1`) are out of scope; the bracket characters are just
//! ordinary key text here.
//!
//! Two behaviors are worth knowing up front:
//!
//! - The input is percent-decoded _before_ it is split, so encoded
//!   delimiters come out of the decoder as live ones: `parse("a%26b=1")`
//!   produces the keys `a` and `b`, not a single `a&b` key.
//! - At most `max_keys` pairs are consumed (1000 by default, plus one
//!   extra for historical reasons); the rest are dropped without error.
//!
//! Both are configurable through [`Config`], along with the delimiters
//! and the percent-coding functions themselves.
//!
//! ## Usage
//!
//! ```
//! use querystring::{parse, stringify, Value};
//!
//! let map = parse("?name=Alice&lang=en&lang=fr")?;
//! assert_eq!(map["name"], Value::from("Alice"));
//! assert_eq!(
//!     map["lang"],
//!     Value::Sequence(vec![Value::from("en"), Value::from("fr")])
//! );
//!
//! assert_eq!(stringify(&map)?, "name=Alice&lang=en&lang=fr");
//! # Ok::<(), querystring::Error>(())
//! ```

mod config;
mod encode;
mod error;
mod parse;
mod stringify;
mod value;

#[doc(inline)]
pub use crate::config::{Config, DecodeFn, EncodeFn};
#[doc(inline)]
pub use crate::encode::{escape, unescape};
#[doc(inline)]
pub use crate::error::{DecodeError, Error, Result};
#[doc(inline)]
pub use crate::value::{QueryMap, Value};

/// Parses a query string into a [`QueryMap`] with the default [`Config`].
///
/// ```
/// use querystring::{parse, Value};
///
/// let map = parse("a=1&flag&a=2").unwrap();
/// assert_eq!(
///     map["a"],
///     Value::Sequence(vec![Value::from("1"), Value::from("2")])
/// );
/// assert_eq!(map["flag"], Value::NoValue);
/// ```
pub fn parse(input: &str) -> Result<QueryMap> {
    Config::new().parse(input)
}

/// Serializes a value into a query string with the default [`Config`].
///
/// The input must serialize as a mapping (a map, a struct, or a sequence,
/// which writes its elements under index keys). Anything else produces
/// the empty string.
///
/// ```
/// use serde::Serialize;
///
/// #[derive(Serialize)]
/// struct Query {
///     name: String,
///     age: u8,
///     lang: Vec<String>,
/// }
///
/// let q = Query {
///     name: "Alice".to_owned(),
///     age: 24,
///     lang: vec!["en".to_owned(), "fr".to_owned()],
/// };
///
/// assert_eq!(
///     querystring::stringify(&q).unwrap(),
///     "name=Alice&age=24&lang=en&lang=fr"
/// );
/// ```
pub fn stringify<T: serde::Serialize>(input: &T) -> Result<String> {
    Config::new().stringify(input)
}
