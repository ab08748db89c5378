//! Fixed prompts and response schemas for each calling context.

use crate::normalizer::SchemaVariant;
use serde_json::{json, Value};

const SURVIVAL_SYSTEM_INSTRUCTION: &str = r#"You are a creative game master for a dynamic, text-based survival game.
Your task is to generate a new, unique scenario based on the latest global news, specifically around natural events, technological breakthroughs, or socio-political events.
The output MUST be a single, raw JSON object with no markdown formatting (no ```json```).
The JSON object must contain these two fields:
1. "scenario_text": (string) A compelling, short narrative (3-5 sentences) that describes the player's current situation, linking it directly to the information retrieved from the search tool.
2. "options": (array of strings) A list of three distinct, plausible player choices for how to proceed in this new situation.

Example JSON:
{"scenario_text": "The latest reports of a massive solar flare disrupting GPS systems globally have reached your remote cabin. All navigation and satellite communication is down. You hear a distant emergency broadcast on a short-wave radio.", "options": ["Try to repair the old compass you have stored away.", "Venture out to a nearby town to find the source of the broadcast.", "Stay put and wait for official instructions to be transmitted."]}
"#;

const SURVIVAL_PROMPT: &str = "Using the latest information available from your search tool, generate a brand new, unique scenario for a text-based survival game. The scenario must be based on a recent global event, such as a natural disaster, political crisis, or major technology failure.";

const NOMAD_SYSTEM_INSTRUCTION: &str = r#"You are the Game Master for a game called "The 2025 Digital Nomad Trail". Your task is to generate a unique, unpredictable, and highly specific scenario tailored to a remote worker traveling across the US. The scenario MUST be relevant to CURRENT EVENTS or timeless digital nomad challenges: tech failure, gig economy paywalls, political instability, unexpected travel costs, or mental health burnout. You MUST return the output as a valid JSON object following the provided schema, including exactly two distinct choices (A and B) with realistic consequences. Do not add any text or explanation outside the JSON."#;

/// Everything sent upstream for one generation call.
#[derive(Debug, Clone)]
pub struct PromptSpec {
    pub variant: SchemaVariant,
    pub system_instruction: &'static str,
    pub user_prompt: String,
    pub response_schema: Value,
    pub temperature: Option<f32>,
    /// Ground the answer with Google Search.
    pub google_search: bool,
}

/// A scenario request for one of the calling contexts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScenarioRequest {
    Survival,
    Nomad { profession: String },
}

impl ScenarioRequest {
    pub fn variant(&self) -> SchemaVariant {
        match self {
            ScenarioRequest::Survival => SchemaVariant::Survival,
            ScenarioRequest::Nomad { .. } => SchemaVariant::Nomad,
        }
    }

    pub fn prompt(&self) -> PromptSpec {
        match self {
            ScenarioRequest::Survival => PromptSpec {
                variant: SchemaVariant::Survival,
                system_instruction: SURVIVAL_SYSTEM_INSTRUCTION,
                user_prompt: SURVIVAL_PROMPT.to_string(),
                response_schema: survival_schema(),
                temperature: Some(0.7),
                google_search: true,
            },
            ScenarioRequest::Nomad { profession } => PromptSpec {
                variant: SchemaVariant::Nomad,
                system_instruction: NOMAD_SYSTEM_INSTRUCTION,
                user_prompt: nomad_prompt(profession),
                response_schema: nomad_schema(),
                temperature: None,
                google_search: false,
            },
        }
    }
}

fn nomad_prompt(profession: &str) -> String {
    format!(
        "Generate a new event scenario for a player who is currently a {}. The event should involve a choice between two actions, each with clear impacts on Cash, Laptop Health (1-100), and Mental Health (1-100). Keep the effects moderate (e.g., changes between -100 and +100 for cash, and -30 to +15 for health).",
        profession.trim()
    )
}

fn survival_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "scenario_text": {
                "type": "STRING",
                "description": "A short narrative describing the player's new situation."
            },
            "options": {
                "type": "ARRAY",
                "items": { "type": "STRING" },
                "description": "Three distinct player choices."
            }
        },
        "required": ["scenario_text", "options"]
    })
}

fn nomad_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "title": {
                "type": "STRING",
                "description": "A catchy, short title for the event, e.g., 'Server Meltdown' or 'Unexpected Checkpoint'."
            },
            "description": {
                "type": "STRING",
                "description": "A detailed description of the event unfolding, setting the scene."
            },
            "choices": {
                "type": "ARRAY",
                "description": "Exactly two distinct choices the player can make, A and B.",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "option": {
                            "type": "STRING",
                            "description": "The text for the player's choice (e.g., 'Pay for premium repairs' or 'Attempt DIY fix')."
                        },
                        "effect_cash": {
                            "type": "INTEGER",
                            "description": "Change to player cash. Positive is gain, negative is loss. Range: -200 to 200."
                        },
                        "effect_laptop": {
                            "type": "INTEGER",
                            "description": "Change to laptop health (1-100). Positive is gain, negative is loss. Range: -30 to 15."
                        },
                        "effect_mental": {
                            "type": "INTEGER",
                            "description": "Change to mental health (1-100). Positive is gain, negative is loss. Range: -20 to 10."
                        },
                        "outcome_text": {
                            "type": "STRING",
                            "description": "A brief, narrative consequence of making this choice."
                        }
                    },
                    "required": ["option", "effect_cash", "effect_laptop", "effect_mental", "outcome_text"]
                }
            }
        },
        "required": ["title", "description", "choices"]
    })
}
