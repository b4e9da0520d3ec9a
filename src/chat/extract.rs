use std::collections::HashMap;

use serde_json::{Map, Value};

use super::ChatError;
use crate::FunctionDecl;

/// Values pulled out of a user message, consumed in order of appearance.
#[derive(Debug, Default, Clone, PartialEq)]
struct Facts {
    places: Vec<String>,
    dates: Vec<String>,
    numbers: Vec<f64>,
    ids: Vec<String>,
    words: Vec<String>,
}

impl Facts {
    fn gather(message: &str) -> Self {
        let mut facts = Self::default();
        let mut place: Vec<&str> = Vec::new();
        let mut sentence_start = true;

        for raw in message.split_whitespace() {
            let word = raw.trim_matches(|c: char| !c.is_alphanumeric() && c != '-');
            let word = word.trim_matches('-');
            let has_digit = word.chars().any(|c| c.is_ascii_digit());
            let capitalised = word.chars().next().is_some_and(char::is_uppercase);

            if capitalised && !has_digit && !sentence_start && word != "I" {
                place.push(word);
            } else {
                flush(&mut place, &mut facts.places);
            }

            if is_iso_date(word) {
                facts.dates.push(word.to_string());
            } else if let Ok(n) = word.parse::<f64>() {
                facts.numbers.push(n);
            } else if has_digit && !word.chars().any(char::is_lowercase) {
                facts.ids.push(word.to_string());
            }
            if !word.is_empty() {
                facts.words.push(word.to_lowercase());
            }

            // a trailing comma or full stop ends a place name
            if raw.ends_with([',', '.', '?', '!', ';', ':']) {
                flush(&mut place, &mut facts.places);
            }
            sentence_start = raw.ends_with(['.', '?', '!']);
        }
        flush(&mut place, &mut facts.places);
        facts
    }

    fn take_place(&mut self) -> Option<String> {
        (!self.places.is_empty()).then(|| self.places.remove(0))
    }

    fn take_date(&mut self) -> Option<String> {
        (!self.dates.is_empty()).then(|| self.dates.remove(0))
    }

    fn take_number(&mut self, integral: bool) -> Option<f64> {
        let i = self
            .numbers
            .iter()
            .position(|n| !integral || n.fract() == 0.0)?;
        Some(self.numbers.remove(i))
    }

    fn take_id(&mut self, param: &str) -> Option<String> {
        let prefix: String = param.chars().take(4).collect::<String>().to_uppercase();
        let i = self
            .ids
            .iter()
            .position(|id| id.starts_with(&prefix))
            .or_else(|| (!self.ids.is_empty()).then_some(0))?;
        Some(self.ids.remove(i))
    }
}

fn flush(place: &mut Vec<&str>, places: &mut Vec<String>) {
    if !place.is_empty() {
        places.push(place.join(" "));
        place.clear();
    }
}

fn is_iso_date(word: &str) -> bool {
    let b = word.as_bytes();
    b.len() == 10
        && b[4] == b'-'
        && b[7] == b'-'
        && b.iter()
            .enumerate()
            .all(|(i, c)| i == 4 || i == 7 || c.is_ascii_digit())
}

/// JSON type of a parameter schema, looking through `Option`'s `anyOf`.
fn schema_type(schema: &Value) -> Option<&str> {
    if let Some(ty) = schema.get("type").and_then(Value::as_str) {
        return Some(ty);
    }
    schema
        .get("anyOf")?
        .as_array()?
        .iter()
        .filter_map(|s| s.get("type").and_then(Value::as_str))
        .find(|ty| *ty != "null")
}

/// Builds call arguments for a function from a user message.
///
/// Location parameters take capitalised place names (skipping the first word
/// of each sentence), date parameters take `YYYY-MM-DD` dates, `*_id`
/// parameters take upper-case identifiers such as `LODGE3`, and numeric
/// parameters take numbers. Each value is used once, in order of
/// appearance. Unfilled optional parameters are left out; unfilled required
/// parameters fall back to configured defaults or fail.
#[derive(Debug, Clone)]
pub struct ArgumentExtractor {
    defaults: HashMap<String, Value>,
    choices: HashMap<String, Vec<String>>,
}

impl Default for ArgumentExtractor {
    fn default() -> Self {
        Self::new()
            .with_default("days", 3)
            .with_default("hours", 24)
    }
}

impl ArgumentExtractor {
    /// An extractor with no defaults or choices.
    pub fn new() -> Self {
        Self {
            defaults: HashMap::new(),
            choices: HashMap::new(),
        }
    }

    /// Value used for `param` when the message does not supply one.
    pub fn with_default(mut self, param: &str, value: impl Into<Value>) -> Self {
        self.defaults.insert(param.to_string(), value.into());
        self
    }

    /// Fills the string parameter `param` with the first of `options`
    /// mentioned in the message.
    pub fn with_choices<I, S>(mut self, param: &str, options: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.choices
            .insert(param.to_string(), options.into_iter().map(Into::into).collect());
        self
    }

    pub fn extract(&self, decl: &FunctionDecl, message: &str) -> Result<Value, ChatError> {
        let mut facts = Facts::gather(message);
        let required: Vec<&str> = decl
            .parameters
            .get("required")
            .and_then(Value::as_array)
            .map(|r| r.iter().filter_map(Value::as_str).collect())
            .unwrap_or_default();
        let empty = Map::new();
        let properties = decl
            .parameters
            .get("properties")
            .and_then(Value::as_object)
            .unwrap_or(&empty);

        let mut args = Map::new();
        for (param, schema) in properties {
            let value = self
                .fill(param, schema_type(schema), &mut facts)
                .or_else(|| self.defaults.get(param).cloned());
            match value {
                Some(value) => {
                    args.insert(param.clone(), value);
                }
                None if required.contains(&param.as_str()) => {
                    return Err(ChatError::MissingArgument {
                        function: decl.name.clone(),
                        parameter: param.clone(),
                    });
                }
                None => {}
            }
        }
        Ok(Value::Object(args))
    }

    fn fill(&self, param: &str, ty: Option<&str>, facts: &mut Facts) -> Option<Value> {
        match ty? {
            "string" => {
                if let Some(options) = self.choices.get(param) {
                    return options
                        .iter()
                        .find(|o| facts.words.contains(&o.to_lowercase()))
                        .map(|o| Value::from(o.as_str()));
                }
                if param.contains("location") {
                    facts.take_place().map(Value::from)
                } else if param.contains("date") {
                    facts.take_date().map(Value::from)
                } else if param.ends_with("id") {
                    facts.take_id(param).map(Value::from)
                } else {
                    None
                }
            }
            "integer" => facts.take_number(true).map(|n| Value::from(n as i64)),
            "number" => facts.take_number(false).map(Value::from),
            _ => None,
        }
    }
}
