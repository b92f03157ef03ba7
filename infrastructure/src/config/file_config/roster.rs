//! Roster configuration from TOML (`[[members]]` / `[[elites]]` arrays)
//!
//! Each entry names one council participant. `model` addresses a model
//! installed on the backend; when `characteristic` is set, a persona
//! model named `name` is derived from it at startup with the
//! characteristic as system prompt.
//!
//! Example configuration:
//!
//! ```toml
//! [[members]]
//! name = "optimist"
//! model = "gemma3:4b"
//! characteristic = "You look for what could go right."
//!
//! [[elites]]
//! name = "judge"
//! model = "llama3"
//! ```

use serde::{Deserialize, Serialize};

use council_domain::Participant;

/// One roster entry. `name` and `model` are required in the file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileParticipantConfig {
    pub name: String,
    pub model: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub characteristic: Option<String>,
}

impl FileParticipantConfig {
    pub fn to_member(&self) -> Participant {
        self.apply_characteristic(Participant::member(&self.name, &self.model))
    }

    pub fn to_elite(&self) -> Participant {
        self.apply_characteristic(Participant::elite(&self.name, &self.model))
    }

    fn apply_characteristic(&self, participant: Participant) -> Participant {
        match &self.characteristic {
            Some(characteristic) => participant.with_characteristic(characteristic),
            None => participant,
        }
    }
}
