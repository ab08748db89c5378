//! Fallback values substituted for missing or unusable fields.

use super::model::Choice;

/// Default values keyed by logical field.
pub struct Defaults {
    pub title: &'static str,
    pub narrative: &'static str,
    pub options: &'static [&'static str],
    pub choices: &'static [ChoiceDefault],
    pub outcome_text: &'static str,
}

/// Default label and outcome of a structured choice. Effects default to zero.
pub struct ChoiceDefault {
    pub option: &'static str,
    pub outcome_text: &'static str,
}

pub const DEFAULTS: Defaults = Defaults {
    title: "Unexpected Detour",
    narrative: "The road ahead is uncertain, and you must decide how to proceed.",
    options: &[
        "Stay where you are and wait for more information.",
        "Scout the surrounding area for resources.",
        "Reach out to anyone nearby for help.",
    ],
    choices: &[
        ChoiceDefault {
            option: "Play it safe",
            outcome_text: "Nothing much changes, for now.",
        },
        ChoiceDefault {
            option: "Take a chance",
            outcome_text: "Nothing much changes, for now.",
        },
    ],
    outcome_text: "Nothing much changes, for now.",
};

impl Defaults {
    /// Default plain option at `index`, cycling when the table is shorter.
    pub fn option(&self, index: usize) -> String {
        self.options[index % self.options.len()].to_string()
    }

    /// Default structured choice at `index`, cycling when the table is shorter.
    pub fn choice(&self, index: usize) -> Choice {
        let default = &self.choices[index % self.choices.len()];
        Choice {
            option: default.option.to_string(),
            effect_cash: 0,
            effect_laptop: 0,
            effect_mental: 0,
            outcome_text: default.outcome_text.to_string(),
        }
    }
}
