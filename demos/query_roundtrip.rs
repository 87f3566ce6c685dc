use querystring::{Config, Value};
use serde::Serialize;

#[derive(Debug, Serialize)]
struct Search {
    q: String,
    lang: Vec<String>,
    page: u32,
}

fn main() -> Result<(), querystring::Error> {
    // Parsing keeps keys in the order they appear and folds repeats
    // into a sequence.
    let parsed = querystring::parse("?q=caf%C3%A9&lang=en&lang=fr&debug")?;
    println!("parsed: {parsed:?}");

    if let Some(Value::Sequence(langs)) = parsed.get("lang") {
        println!("languages: {langs:?}");
    }

    // A serializable struct turns into the same wire format.
    let search = Search {
        q: "café".to_string(),
        lang: vec!["en".to_string(), "fr".to_string()],
        page: 2,
    };
    println!("stringified: {}", querystring::stringify(&search)?);

    // Delimiters are configurable for non-standard formats.
    let config = Config::new().separator(";").key_value_joiner(":");
    let parsed = config.parse("q:caf%C3%A9;page:2")?;
    println!("custom delimiters: {}", config.stringify(&parsed)?);

    Ok(())
}
