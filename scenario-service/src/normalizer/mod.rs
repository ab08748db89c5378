//! Response normalization.
//!
//! Turns untrusted model output into a [`CanonicalScenario`] whose fields are
//! always present. Missing or unusable fields fall back to [`DEFAULTS`],
//! out-of-range effects are clamped, and only undecodable JSON is an error.

pub mod defaults;
pub mod model;
pub mod schema;

pub use defaults::DEFAULTS;
pub use model::{CanonicalScenario, Choice, Choices, NormalizationReport, Normalized};
pub use schema::{Effect, Field, SchemaVariant};

use serde_json::{Map, Value};
use thiserror::Error;

/// Shortest backtick run treated as a code fence.
const FENCE_MIN: usize = 3;

/// Error type for scenario parsing.
#[derive(Error, Debug)]
pub enum ParseError {
    #[error("Malformed scenario payload: {reason}")]
    Malformed {
        /// Text that failed to decode, kept for diagnostics.
        text: String,
        reason: String,
    },
}

impl ParseError {
    fn malformed(text: &str, reason: impl Into<String>) -> Self {
        ParseError::Malformed {
            text: text.to_string(),
            reason: reason.into(),
        }
    }
}

/// Strip code-fence markers and surrounding whitespace from model output.
///
/// Repeats until nothing more can be stripped, so applying it twice gives
/// the same result as applying it once.
pub fn extract_json(raw: &str) -> &str {
    let mut text = raw.trim();
    loop {
        let stripped = strip_fences(text);
        if stripped == text {
            return text;
        }
        text = stripped;
    }
}

fn strip_fences(text: &str) -> &str {
    let mut body = text.trim();

    let opening = body.len() - body.trim_start_matches('`').len();
    if opening >= FENCE_MIN {
        body = &body[opening..];
        match body.find('\n') {
            // The rest of the opening line is a language tag such as `json` or `c++`.
            Some(end) if !starts_json(&body[..end]) => body = &body[end..],
            Some(_) => {}
            None => body = body.trim_start_matches(|c: char| c.is_ascii_alphanumeric()),
        }
    }

    let closing = body.len() - body.trim_end_matches('`').len();
    if closing >= FENCE_MIN {
        body = &body[..body.len() - closing];
    }

    body.trim()
}

fn starts_json(line: &str) -> bool {
    line.trim_start().starts_with(['{', '['])
}

/// Decode `json_text` and normalize it against `variant`.
pub fn parse_scenario(
    json_text: &str,
    variant: SchemaVariant,
) -> Result<CanonicalScenario, ParseError> {
    parse_normalized(json_text, variant).map(|normalized| normalized.scenario)
}

/// Extract and normalize raw model output, keeping the repair report.
pub fn normalize(raw: &str, variant: SchemaVariant) -> Result<Normalized, ParseError> {
    parse_normalized(extract_json(raw), variant)
}

fn parse_normalized(json_text: &str, variant: SchemaVariant) -> Result<Normalized, ParseError> {
    let value: Value = serde_json::from_str(json_text)
        .map_err(|e| ParseError::malformed(json_text, e.to_string()))?;

    let Value::Object(payload) = value else {
        return Err(ParseError::malformed(json_text, "expected a JSON object"));
    };

    Ok(normalize_payload(&payload, variant))
}

fn normalize_payload(payload: &Map<String, Value>, variant: SchemaVariant) -> Normalized {
    let mut report = NormalizationReport::default();

    let title = if variant.fields().contains(&Field::Title) {
        let title = lookup(payload, variant.aliases(Field::Title), read_text).unwrap_or_else(|| {
            report.defaulted.push(Field::Title);
            DEFAULTS.title.to_string()
        });
        Some(title)
    } else {
        None
    };

    let narrative =
        lookup(payload, variant.aliases(Field::Narrative), read_text).unwrap_or_else(|| {
            report.defaulted.push(Field::Narrative);
            DEFAULTS.narrative.to_string()
        });

    let count = variant.choice_count();
    let choice_aliases = variant.aliases(Field::Choices);
    let choices = match variant {
        SchemaVariant::Survival => {
            let options = match lookup(payload, choice_aliases, read_options) {
                Some(options) => {
                    fit_to_count(options, count, &mut report.padded_choices, |i| {
                        DEFAULTS.option(i)
                    })
                }
                None => {
                    report.defaulted.push(Field::Choices);
                    (0..count).map(|i| DEFAULTS.option(i)).collect()
                }
            };
            Choices::Options(options)
        }
        SchemaVariant::Nomad => {
            let choices = match lookup(payload, choice_aliases, read_choices) {
                Some(mut read) => {
                    read.truncate(count);
                    report.clamped_effects +=
                        read.iter().map(|(_, clamped)| clamped).sum::<usize>();
                    let choices = read.into_iter().map(|(choice, _)| choice).collect();
                    fit_to_count(choices, count, &mut report.padded_choices, |i| {
                        DEFAULTS.choice(i)
                    })
                }
                None => {
                    report.defaulted.push(Field::Choices);
                    (0..count).map(|i| DEFAULTS.choice(i)).collect()
                }
            };
            Choices::Structured(choices)
        }
    };

    Normalized {
        scenario: CanonicalScenario::new(variant, title, narrative, choices),
        report,
    }
}

/// First alias whose value is present and readable.
fn lookup<'a, T>(
    payload: &'a Map<String, Value>,
    aliases: &[&str],
    read: impl Fn(&'a Value) -> Option<T>,
) -> Option<T> {
    aliases
        .iter()
        .filter_map(|alias| payload.get(*alias))
        .find_map(read)
}

fn fit_to_count<T>(
    mut items: Vec<T>,
    count: usize,
    padded: &mut usize,
    default: impl Fn(usize) -> T,
) -> Vec<T> {
    items.truncate(count);
    while items.len() < count {
        items.push(default(items.len()));
        *padded += 1;
    }
    items
}

fn read_text(value: &Value) -> Option<String> {
    match value {
        Value::String(text) if !text.trim().is_empty() => Some(text.clone()),
        _ => None,
    }
}

fn read_options(value: &Value) -> Option<Vec<String>> {
    let Value::Array(items) = value else {
        return None;
    };

    let options: Vec<String> = items
        .iter()
        .filter_map(|item| match item {
            Value::Object(obj) => obj.get("option").and_then(read_text),
            other => read_text(other),
        })
        .collect();

    (!options.is_empty()).then_some(options)
}

fn read_choices(value: &Value) -> Option<Vec<(Choice, usize)>> {
    let Value::Array(items) = value else {
        return None;
    };

    let choices: Vec<(Choice, usize)> = items.iter().filter_map(read_choice).collect();
    (!choices.is_empty()).then_some(choices)
}

/// Read one structured choice, returning it with the number of clamped effects.
fn read_choice(value: &Value) -> Option<(Choice, usize)> {
    match value {
        Value::String(_) => {
            let option = read_text(value)?;
            let choice = Choice {
                option,
                effect_cash: 0,
                effect_laptop: 0,
                effect_mental: 0,
                outcome_text: DEFAULTS.outcome_text.to_string(),
            };
            Some((choice, 0))
        }
        Value::Object(obj) => {
            let option = obj.get("option").and_then(read_text)?;
            let outcome_text = obj
                .get("outcome_text")
                .and_then(read_text)
                .unwrap_or_else(|| DEFAULTS.outcome_text.to_string());

            let mut choice = Choice {
                option,
                effect_cash: 0,
                effect_laptop: 0,
                effect_mental: 0,
                outcome_text,
            };

            let mut clamped_count = 0;
            for effect in Effect::ALL {
                let (value, clamped) = effect.clamp(read_effect(obj.get(effect.key())));
                if clamped {
                    clamped_count += 1;
                }
                choice.set_effect(effect, value);
            }

            Some((choice, clamped_count))
        }
        _ => None,
    }
}

/// Integer value of an effect. Missing or non-numeric values read as zero.
///
/// Numbers beyond the f64 range saturate at the i64 bounds, so they clamp
/// to the nearest effect boundary instead of failing the payload.
fn read_effect(value: Option<&Value>) -> i64 {
    match value {
        Some(Value::Number(number)) => number
            .as_i64()
            .or_else(|| number.to_string().parse::<f64>().ok().map(round_to_i64))
            .unwrap_or(0),
        Some(Value::String(text)) => text.trim().parse::<f64>().map(round_to_i64).unwrap_or(0),
        _ => 0,
    }
}

fn round_to_i64(value: f64) -> i64 {
    if value.is_nan() {
        0
    } else if value == f64::INFINITY {
        i64::MAX
    } else if value == f64::NEG_INFINITY {
        i64::MIN
    } else {
        // Saturates at the i64 bounds; clamping happens afterwards.
        value.round() as i64
    }
}
