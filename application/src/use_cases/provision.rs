//! Roster provisioning
//!
//! At startup every participant must be backed by an installed model.
//! Plain participants just need their base model pulled; persona
//! participants get a derived model created under the participant's
//! name, with the characteristic baked in as the system prompt.

use std::collections::HashSet;

use tracing::{debug, info};

use council_domain::Participant;

use crate::ports::generation::{GenerationError, GenerationGateway};

/// Make sure the backend can serve every participant in `roster`.
///
/// Fails fast: a pull or create error means the council cannot convene,
/// so the caller should treat it as fatal.
pub async fn ensure_participants<G: GenerationGateway>(
    gateway: &G,
    roster: &[Participant],
) -> Result<(), GenerationError> {
    let mut installed: HashSet<String> = gateway.available_models().await?.into_iter().collect();

    for participant in roster {
        match &participant.characteristic {
            None => {
                if installed.contains(&participant.model) {
                    debug!(model = %participant.model, "Model already installed");
                    continue;
                }
                info!(model = %participant.model, "Pulling model");
                gateway.pull_model(&participant.model).await?;
                installed.insert(participant.model.clone());
            }
            Some(characteristic) => {
                if installed.contains(&participant.name) {
                    debug!(model = %participant.name, "Persona model already installed");
                    continue;
                }
                if !installed.contains(&participant.model) {
                    info!(model = %participant.model, "Pulling base model");
                    gateway.pull_model(&participant.model).await?;
                    installed.insert(participant.model.clone());
                }
                info!(
                    model = %participant.name,
                    base = %participant.model,
                    "Creating persona model"
                );
                gateway
                    .create_persona_model(&participant.name, &participant.model, characteristic)
                    .await?;
                installed.insert(participant.name.clone());
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::*;

    #[derive(Default)]
    struct ProvisioningGateway {
        installed: Vec<String>,
        pulled: Mutex<Vec<String>>,
        created: Mutex<Vec<(String, String, String)>>,
        fail_creates: bool,
    }

    impl ProvisioningGateway {
        fn with_installed(models: &[&str]) -> Self {
            Self {
                installed: models.iter().map(|m| m.to_string()).collect(),
                ..Default::default()
            }
        }
    }

    #[async_trait]
    impl GenerationGateway for ProvisioningGateway {
        async fn generate(&self, _model: &str, _prompt: &str) -> Result<String, GenerationError> {
            Ok(String::new())
        }

        async fn available_models(&self) -> Result<Vec<String>, GenerationError> {
            Ok(self.installed.clone())
        }

        async fn pull_model(&self, model: &str) -> Result<(), GenerationError> {
            self.pulled.lock().unwrap().push(model.to_string());
            Ok(())
        }

        async fn create_persona_model(
            &self,
            name: &str,
            base: &str,
            system: &str,
        ) -> Result<(), GenerationError> {
            if self.fail_creates {
                return Err(GenerationError::ProvisioningFailed {
                    model: name.to_string(),
                    reason: "create rejected".to_string(),
                });
            }
            self.created.lock().unwrap().push((
                name.to_string(),
                base.to_string(),
                system.to_string(),
            ));
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_installed_models_are_left_alone() {
        let gateway = ProvisioningGateway::with_installed(&["llama3", "sage"]);
        let roster = vec![
            Participant::member("member1", "llama3"),
            Participant::elite("sage", "llama3").with_characteristic("terse and exact"),
        ];

        ensure_participants(&gateway, &roster).await.unwrap();

        assert!(gateway.pulled.lock().unwrap().is_empty());
        assert!(gateway.created.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_missing_base_model_is_pulled() {
        let gateway = ProvisioningGateway::with_installed(&[]);
        let roster = vec![Participant::member("member1", "llama3")];

        ensure_participants(&gateway, &roster).await.unwrap();

        assert_eq!(*gateway.pulled.lock().unwrap(), vec!["llama3"]);
        assert!(gateway.created.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_persona_is_created_from_pulled_base() {
        let gateway = ProvisioningGateway::with_installed(&[]);
        let roster =
            vec![Participant::member("socrates", "llama3").with_characteristic("asks questions")];

        ensure_participants(&gateway, &roster).await.unwrap();

        assert_eq!(*gateway.pulled.lock().unwrap(), vec!["llama3"]);
        assert_eq!(
            *gateway.created.lock().unwrap(),
            vec![(
                "socrates".to_string(),
                "llama3".to_string(),
                "asks questions".to_string()
            )]
        );
    }

    #[tokio::test]
    async fn test_persona_with_installed_base_skips_pull() {
        let gateway = ProvisioningGateway::with_installed(&["llama3"]);
        let roster =
            vec![Participant::member("socrates", "llama3").with_characteristic("asks questions")];

        ensure_participants(&gateway, &roster).await.unwrap();

        assert!(gateway.pulled.lock().unwrap().is_empty());
        assert_eq!(gateway.created.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_shared_base_model_is_pulled_once() {
        let gateway = ProvisioningGateway::with_installed(&[]);
        let roster = vec![
            Participant::member("member1", "llama3"),
            Participant::member("member2", "llama3"),
        ];

        ensure_participants(&gateway, &roster).await.unwrap();

        assert_eq!(*gateway.pulled.lock().unwrap(), vec!["llama3"]);
    }

    #[tokio::test]
    async fn test_create_failure_is_fatal() {
        let gateway = ProvisioningGateway {
            installed: vec!["llama3".to_string()],
            fail_creates: true,
            ..Default::default()
        };
        let roster = vec![Participant::member("socrates", "llama3").with_characteristic("wise")];

        let result = ensure_participants(&gateway, &roster).await;
        assert!(matches!(
            result,
            Err(GenerationError::ProvisioningFailed { .. })
        ));
    }
}
