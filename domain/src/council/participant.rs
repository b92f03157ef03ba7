//! Council participants.
//!
//! A participant is an opaque handle onto one text-generation agent: a
//! display name, the backing model identifier, and an optional persona used
//! when the model has to be provisioned from a base model. Participants are
//! loaded once at startup and never change afterwards.

use serde::{Deserialize, Serialize};

/// Which panel a participant sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    /// Takes part in the general discussion and refines the consensus statement
    Member,
    /// Votes on the refined candidates
    Elite,
}

impl Role {
    pub fn as_str(&self) -> &str {
        match self {
            Role::Member => "MEMBER",
            Role::Elite => "ELITE",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One text-generation agent on the council.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
    /// Display name, also the provisioned model name for persona members
    pub name: String,
    /// Backing model identifier passed to the generation backend
    pub model: String,
    /// Persona installed as the system prompt when the named model is
    /// created from `model`; `None` means use `model` as-is
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub characteristic: Option<String>,
    /// Panel assignment
    pub role: Role,
}

impl Participant {
    pub fn member(name: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            model: model.into(),
            characteristic: None,
            role: Role::Member,
        }
    }

    pub fn elite(name: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            model: model.into(),
            characteristic: None,
            role: Role::Elite,
        }
    }

    /// Attach a persona (builder).
    pub fn with_characteristic(mut self, characteristic: impl Into<String>) -> Self {
        self.characteristic = Some(characteristic.into());
        self
    }

    /// The model name generation requests should address.
    ///
    /// Persona participants generate under their provisioned `name`;
    /// plain participants address the backing `model` directly.
    pub fn generation_model(&self) -> &str {
        if self.characteristic.is_some() {
            &self.name
        } else {
            &self.model
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_display() {
        assert_eq!(Role::Member.to_string(), "MEMBER");
        assert_eq!(Role::Elite.to_string(), "ELITE");
    }

    #[test]
    fn test_plain_participant_generates_under_model() {
        let p = Participant::member("alpha", "gemma3:4b");
        assert_eq!(p.generation_model(), "gemma3:4b");
    }

    #[test]
    fn test_persona_participant_generates_under_name() {
        let p = Participant::member("skeptic", "gemma3:4b")
            .with_characteristic("You doubt everything until proven.");
        assert_eq!(p.generation_model(), "skeptic");
    }

    #[test]
    fn test_characteristic_omitted_from_json_when_none() {
        let p = Participant::elite("judge", "llama3");
        let json = serde_json::to_value(&p).unwrap();
        assert!(json.get("characteristic").is_none());
        assert_eq!(json["role"], "ELITE");
    }
}
