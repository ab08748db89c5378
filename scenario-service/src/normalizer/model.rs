//! Canonical scenario types.

use super::schema::{Effect, Field, SchemaVariant};
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

/// A structured choice with its numeric effects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Choice {
    pub option: String,
    pub effect_cash: i64,
    pub effect_laptop: i64,
    pub effect_mental: i64,
    pub outcome_text: String,
}

impl Choice {
    pub fn effect(&self, effect: Effect) -> i64 {
        match effect {
            Effect::Cash => self.effect_cash,
            Effect::Laptop => self.effect_laptop,
            Effect::Mental => self.effect_mental,
        }
    }

    pub(crate) fn set_effect(&mut self, effect: Effect, value: i64) {
        match effect {
            Effect::Cash => self.effect_cash = value,
            Effect::Laptop => self.effect_laptop = value,
            Effect::Mental => self.effect_mental = value,
        }
    }
}

/// Choice list in the shape its variant uses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Choices {
    Options(Vec<String>),
    Structured(Vec<Choice>),
}

impl Choices {
    pub fn len(&self) -> usize {
        match self {
            Choices::Options(options) => options.len(),
            Choices::Structured(choices) => choices.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Normalized scenario with every field of its variant populated.
///
/// Serializes each logical field under all of the variant's aliases, so
/// consumers using either naming convention read the same values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanonicalScenario {
    variant: SchemaVariant,
    title: Option<String>,
    narrative: String,
    choices: Choices,
}

impl CanonicalScenario {
    pub(crate) fn new(
        variant: SchemaVariant,
        title: Option<String>,
        narrative: String,
        choices: Choices,
    ) -> Self {
        Self {
            variant,
            title,
            narrative,
            choices,
        }
    }

    pub fn variant(&self) -> SchemaVariant {
        self.variant
    }

    /// Title, present only for variants that carry one.
    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    pub fn narrative(&self) -> &str {
        &self.narrative
    }

    pub fn choices(&self) -> &Choices {
        &self.choices
    }
}

impl Serialize for CanonicalScenario {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        for field in self.variant.fields() {
            for alias in self.variant.aliases(*field) {
                match field {
                    Field::Title => map.serialize_entry(alias, &self.title)?,
                    Field::Narrative => map.serialize_entry(alias, &self.narrative)?,
                    Field::Choices => map.serialize_entry(alias, &self.choices)?,
                }
            }
        }
        map.end()
    }
}

/// What the normalizer had to repair while building a scenario.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NormalizationReport {
    /// Logical fields that fell back to their defaults entirely.
    pub defaulted: Vec<Field>,
    /// Choice slots filled from defaults because the payload had too few.
    pub padded_choices: usize,
    /// Effect values moved to the nearest bound of their range.
    pub clamped_effects: usize,
}

impl NormalizationReport {
    /// Whether the payload was used as-is.
    pub fn is_clean(&self) -> bool {
        self.defaulted.is_empty() && self.padded_choices == 0 && self.clamped_effects == 0
    }
}

/// A scenario together with its normalization report.
#[derive(Debug, Clone)]
pub struct Normalized {
    pub scenario: CanonicalScenario,
    pub report: NormalizationReport,
}
