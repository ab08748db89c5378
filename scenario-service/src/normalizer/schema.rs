//! Schema variants and the alias table.
//!
//! Each calling context expects its own output shape. The same logical field
//! is known under different names depending on the consumer, so every
//! variant lists its aliases per field. The first alias is the canonical name.

use std::fmt;
use std::ops::RangeInclusive;

/// Expected shape of a decoded scenario payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SchemaVariant {
    /// Survival game: a narrative and three plain option strings.
    Survival,
    /// Digital nomad trail: title, narrative and two choices with effects.
    Nomad,
}

/// Logical fields recognized in a scenario payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Title,
    Narrative,
    Choices,
}

impl Field {
    pub fn as_str(self) -> &'static str {
        match self {
            Field::Title => "title",
            Field::Narrative => "narrative",
            Field::Choices => "choices",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl SchemaVariant {
    pub fn as_str(self) -> &'static str {
        match self {
            SchemaVariant::Survival => "survival",
            SchemaVariant::Nomad => "nomad",
        }
    }

    /// Logical fields carried by this variant, in output order.
    pub fn fields(self) -> &'static [Field] {
        match self {
            SchemaVariant::Survival => &[Field::Narrative, Field::Choices],
            SchemaVariant::Nomad => &[Field::Title, Field::Narrative, Field::Choices],
        }
    }

    /// Names under which `field` may appear, canonical name first.
    ///
    /// Returns an empty slice when the variant does not carry the field.
    pub fn aliases(self, field: Field) -> &'static [&'static str] {
        match (self, field) {
            (SchemaVariant::Survival, Field::Title) => &[],
            (SchemaVariant::Survival, Field::Narrative) => &["scenario_text", "description"],
            (SchemaVariant::Survival, Field::Choices) => &["options", "choices"],
            (SchemaVariant::Nomad, Field::Title) => &["title"],
            (SchemaVariant::Nomad, Field::Narrative) => &["description", "scenario_text"],
            (SchemaVariant::Nomad, Field::Choices) => &["choices", "options"],
        }
    }

    /// Exact number of choices a normalized scenario holds.
    pub fn choice_count(self) -> usize {
        match self {
            SchemaVariant::Survival => 3,
            SchemaVariant::Nomad => 2,
        }
    }
}

impl fmt::Display for SchemaVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Numeric effects carried by a structured choice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Effect {
    Cash,
    Laptop,
    Mental,
}

impl Effect {
    pub const ALL: [Effect; 3] = [Effect::Cash, Effect::Laptop, Effect::Mental];

    /// JSON key of the effect inside a choice object.
    pub fn key(self) -> &'static str {
        match self {
            Effect::Cash => "effect_cash",
            Effect::Laptop => "effect_laptop",
            Effect::Mental => "effect_mental",
        }
    }

    /// Inclusive valid range.
    pub fn range(self) -> RangeInclusive<i64> {
        match self {
            Effect::Cash => -200..=200,
            Effect::Laptop => -30..=15,
            Effect::Mental => -20..=10,
        }
    }

    /// Clamp `value` into the valid range, reporting whether it moved.
    pub fn clamp(self, value: i64) -> (i64, bool) {
        let range = self.range();
        let clamped = value.clamp(*range.start(), *range.end());
        (clamped, clamped != value)
    }
}
