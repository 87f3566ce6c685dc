use tracing::debug;

use crate::config::Config;
use crate::error::Result;
use crate::value::{QueryMap, Value, insert_value};

/// Parses `input` into a map, in a fixed order: trim, decode the whole
/// string, strip one leading `?`, split into pairs, split each pair once
/// on the joiner.
///
/// Decoding happens once on the entire input _before_ any splitting, so
/// percent-encoded separators and joiners (`%26`, `%3D`) come out of the
/// decoder as live delimiters and take part in the split. Escaping a
/// literal `&` inside a value is therefore not round-trip safe through
/// this parser; it is the historical behavior this crate preserves.
pub(crate) fn parse(config: &Config, input: &str) -> Result<QueryMap> {
    let mut output = QueryMap::default();
    if input.is_empty() {
        return Ok(output);
    }

    let decoded = (config.decode_fn)(input.trim())?;
    let query = decoded.strip_prefix('?').unwrap_or(&decoded);

    if config.separator.is_empty() {
        // nothing to split on, the whole input is a single pair
        let (key, value) = split_pair(config, query);
        insert_value(&mut output, key, value);
        return Ok(output);
    }

    for (index, pair) in query.split(config.separator.as_ref()).enumerate() {
        if limit_reached(config, index) {
            debug!(
                max_keys = config.max_keys,
                "key limit reached, dropping remaining pairs"
            );
            break;
        }

        let (key, value) = split_pair(config, pair);
        insert_value(&mut output, key, value);
    }

    Ok(output)
}

/// A pair splits on the first joiner occurrence only. No joiner at all
/// (including the empty-joiner config) leaves the whole pair as a key
/// with no value.
fn split_pair(config: &Config, pair: &str) -> (String, Value) {
    if config.key_value_joiner.is_empty() {
        return (pair.to_string(), Value::NoValue);
    }

    match pair.split_once(config.key_value_joiner.as_ref()) {
        Some((key, value)) => (key.to_string(), Value::String(value.to_string())),
        None => (pair.to_string(), Value::NoValue),
    }
}

fn limit_reached(config: &Config, index: usize) -> bool {
    if config.max_keys == 0 {
        return false;
    }
    if config.inclusive_max_keys {
        index > config.max_keys
    } else {
        index >= config.max_keys
    }
}

#[cfg(test)]
mod test {
    use super::parse;
    use crate::error::{DecodeError, Error};
    use crate::{Config, Value};

    use pretty_assertions::assert_eq;

    static DEFAULT_CONFIG: Config = Config::new();

    #[test]
    fn empty_input_is_an_empty_map() {
        let map = parse(&DEFAULT_CONFIG, "").unwrap();
        assert!(map.is_empty());
    }

    #[test]
    fn splits_pairs_on_the_separator() {
        let map = parse(&DEFAULT_CONFIG, "a=1&b=2").unwrap();
        assert_eq!(map["a"], Value::from("1"));
        assert_eq!(map["b"], Value::from("2"));
    }

    #[test]
    fn strips_one_leading_question_mark() {
        let map = parse(&DEFAULT_CONFIG, "?a=1&b=2").unwrap();
        assert_eq!(map["a"], Value::from("1"));
        assert_eq!(map["b"], Value::from("2"));

        let map = parse(&DEFAULT_CONFIG, "??a=1").unwrap();
        assert_eq!(map["?a"], Value::from("1"));
    }

    #[test]
    fn trims_surrounding_whitespace() {
        let map = parse(&DEFAULT_CONFIG, "  a=1&b=2\t\n").unwrap();
        assert_eq!(map["a"], Value::from("1"));
        assert_eq!(map["b"], Value::from("2"));
    }

    #[test]
    fn whitespace_only_input_keeps_an_empty_pair() {
        let map = parse(&DEFAULT_CONFIG, "   ").unwrap();
        assert_eq!(map[""], Value::NoValue);
    }

    #[test]
    fn decodes_before_splitting() {
        // %26 decodes to a live `&` and takes part in the split
        let map = parse(&DEFAULT_CONFIG, "a%26b=1").unwrap();
        assert_eq!(map["a"], Value::NoValue);
        assert_eq!(map["b"], Value::from("1"));
    }

    #[test]
    fn decode_errors_propagate() {
        assert_eq!(
            parse(&DEFAULT_CONFIG, "a=%zz"),
            Err(Error::Decode(DecodeError::InvalidEscape(2)))
        );
        assert_eq!(
            parse(&DEFAULT_CONFIG, "a=%"),
            Err(Error::Decode(DecodeError::IncompleteEscape(2)))
        );
    }

    #[test]
    fn bare_keys_have_no_value() {
        let map = parse(&DEFAULT_CONFIG, "flag&a=1").unwrap();
        assert_eq!(map["flag"], Value::NoValue);
        assert_eq!(map["a"], Value::from("1"));
    }

    #[test]
    fn joined_empty_value_is_the_empty_string() {
        let map = parse(&DEFAULT_CONFIG, "a=&b=2").unwrap();
        assert_eq!(map["a"], Value::from(""));
    }

    #[test]
    fn splits_each_pair_on_the_first_joiner_only() {
        let map = parse(&DEFAULT_CONFIG, "a==b").unwrap();
        assert_eq!(map["a"], Value::from("=b"));
    }

    #[test]
    fn empty_keys_collect_under_the_empty_string() {
        let map = parse(&DEFAULT_CONFIG, "a=1&&b=2").unwrap();
        assert_eq!(map[""], Value::NoValue);

        let map = parse(&DEFAULT_CONFIG, "=x").unwrap();
        assert_eq!(map[""], Value::from("x"));
    }

    #[test]
    fn repeated_keys_build_a_sequence() {
        let map = parse(&DEFAULT_CONFIG, "a=1&a=2&a=3").unwrap();
        assert_eq!(
            map["a"],
            Value::Sequence(vec![
                Value::from("1"),
                Value::from("2"),
                Value::from("3")
            ])
        );
    }

    #[test]
    fn key_limit_consumes_one_extra_pair_by_default() {
        let config = Config::new().max_keys(1);
        let map = parse(&config, "a=1&a=2&b=3").unwrap();
        assert_eq!(
            map["a"],
            Value::Sequence(vec![Value::from("1"), Value::from("2")])
        );
        assert_eq!(map.get("b"), None);
    }

    #[test]
    fn exact_key_limit_stops_at_the_limit() {
        let config = Config::new().max_keys(1).inclusive_max_keys(false);
        let map = parse(&config, "a=1&a=2&b=3").unwrap();
        assert_eq!(map["a"], Value::from("1"));
        assert_eq!(map.len(), 1);
    }

    #[test]
    fn zero_key_limit_means_unlimited() {
        let config = Config::new().max_keys(0);
        let map = parse(&config, "a=1&b=2&c=3&d=4").unwrap();
        assert_eq!(map.len(), 4);

        let config = config.inclusive_max_keys(false);
        let map = parse(&config, "a=1&b=2&c=3&d=4").unwrap();
        assert_eq!(map.len(), 4);
    }

    #[test]
    fn custom_separator_and_joiner() {
        let config = Config::new().separator(";").key_value_joiner(":");
        let map = parse(&config, "a:1;b:2").unwrap();
        assert_eq!(map["a"], Value::from("1"));
        assert_eq!(map["b"], Value::from("2"));
    }

    #[test]
    fn multi_character_separator() {
        let config = Config::new().separator("&&");
        let map = parse(&config, "a=1&&b=2").unwrap();
        assert_eq!(map["a"], Value::from("1"));
        assert_eq!(map["b"], Value::from("2"));
    }

    #[test]
    fn empty_separator_keeps_the_input_as_one_pair() {
        let config = Config::new().separator("");
        let map = parse(&config, "a=1&b=2").unwrap();
        assert_eq!(map["a"], Value::from("1&b=2"));
    }

    #[test]
    fn empty_joiner_leaves_bare_keys() {
        let config = Config::new().key_value_joiner("");
        let map = parse(&config, "a=1&b=2").unwrap();
        assert_eq!(map["a=1"], Value::NoValue);
        assert_eq!(map["b=2"], Value::NoValue);
    }

    #[test]
    fn custom_decode_fn_is_applied() {
        fn upper(input: &str) -> std::result::Result<String, DecodeError> {
            Ok(input.to_uppercase())
        }

        let config = Config::new().decode_fn(upper);
        let map = parse(&config, "a=b").unwrap();
        assert_eq!(map["A"], Value::from("B"));
    }
}
