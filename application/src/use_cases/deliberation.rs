//! Council deliberation engine
//!
//! Runs one prompt through the three deliberation phases:
//!
//! ```text
//! General Discussion          Elite Voting            Final Selection
//! ┌──────────────────┐      ┌──────────────────┐      ┌──────────────┐
//! │ members refine a │      │ elites score each│      │ highest tally│
//! │ shared statement │ ───► │ member's snapshot│ ───► │ wins, first  │
//! │ until the budget │      │ with 1 / 0 votes │      │ entry breaks │
//! │ expires          │      │ (no time budget) │      │ ties         │
//! └──────────────────┘      └──────────────────┘      └──────────────┘
//! ```
//!
//! Discussion is budgeted wall-clock time: the deadline is checked
//! before every turn, so a slow member delays the check but no new turn
//! starts past the deadline. Voting always runs to completion.

use std::sync::{Arc, RwLock};
use std::time::Duration;

use tokio::time::Instant;
use tracing::{debug, info, warn};

use council_domain::{
    CouncilState, DiscussionEntry, DomainError, Participant, StatementFit, StatementLimits,
    clamp_statement,
};
use thiserror::Error;

use crate::ports::generation::{GenerationError, GenerationGateway};

/// Default wall-clock budget for the general discussion phase.
pub const DEFAULT_DISCUSSION_TIME: Duration = Duration::from_secs(7 * 60);

const DISCUSSION_PHASE: &str = "General Discussion";
const VOTING_PHASE: &str = "Voting Phase";

const DISCUSSION_DUTY: &str = "If you agree with the current discussionStatus, simply repeat it \
     with no modifications. Otherwise, refine the statement to be better.";
const VOTING_DUTY: &str =
    "If you agree with the current discussionStatus, simply vote with the number 1. \
     Otherwise, vote 0";

/// Deliberation tunables.
#[derive(Debug, Clone, Copy)]
pub struct DeliberationParams {
    default_discussion_time: Duration,
    limits: StatementLimits,
}

impl Default for DeliberationParams {
    fn default() -> Self {
        Self {
            default_discussion_time: DEFAULT_DISCUSSION_TIME,
            limits: StatementLimits::default(),
        }
    }
}

impl DeliberationParams {
    pub fn default_discussion_time(&self) -> Duration {
        self.default_discussion_time
    }

    pub fn limits(&self) -> StatementLimits {
        self.limits
    }

    // ==================== Builder Methods ====================

    pub fn with_default_discussion_time(mut self, budget: Duration) -> Self {
        self.default_discussion_time = budget;
        self
    }

    pub fn with_limits(mut self, limits: StatementLimits) -> Self {
        self.limits = limits;
        self
    }
}

/// What a completed deliberation produced.
#[derive(Debug, Clone)]
pub struct DeliberationOutcome {
    /// The winning member's final statement.
    pub answer: String,
    /// Elite votes the winning statement collected.
    pub votes: u32,
    /// Full discussion rounds that started before the deadline.
    pub rounds: u32,
}

/// Errors surfaced by a deliberation run.
#[derive(Error, Debug)]
pub enum DeliberationError {
    #[error("Council error: {0}")]
    Council(#[from] DomainError),

    #[error("Generation error: {0}")]
    Generation(#[from] GenerationError),
}

/// The council itself: a fixed roster of members and elites bound to a
/// generation gateway.
///
/// [`deliberate`](Self::deliberate) runs serially; the published
/// [`CouncilState`] always returns to `ADJOURNED` when a run finishes,
/// whether it produced an answer or an error.
pub struct DeliberationEngine<G: GenerationGateway> {
    gateway: Arc<G>,
    members: Vec<Participant>,
    elites: Vec<Participant>,
    params: DeliberationParams,
    state: RwLock<CouncilState>,
}

impl<G: GenerationGateway> DeliberationEngine<G> {
    /// Build a council. At least one member and one elite are required.
    pub fn new(
        gateway: Arc<G>,
        members: Vec<Participant>,
        elites: Vec<Participant>,
        params: DeliberationParams,
    ) -> Result<Self, DomainError> {
        if members.is_empty() {
            return Err(DomainError::NoMembers);
        }
        if elites.is_empty() {
            return Err(DomainError::NoElites);
        }
        Ok(Self {
            gateway,
            members,
            elites,
            params,
            state: RwLock::new(CouncilState::Adjourned),
        })
    }

    /// Current phase of the council session.
    pub fn state(&self) -> CouncilState {
        *self
            .state
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn members(&self) -> &[Participant] {
        &self.members
    }

    pub fn elites(&self) -> &[Participant] {
        &self.elites
    }

    /// Deliberate on `prompt` and return the council's answer.
    ///
    /// `budget` bounds the general discussion phase; `None` uses the
    /// configured default.
    pub async fn deliberate(
        &self,
        prompt: &str,
        budget: Option<Duration>,
    ) -> Result<DeliberationOutcome, DeliberationError> {
        let budget = budget.unwrap_or(self.params.default_discussion_time);
        info!(
            members = self.members.len(),
            elites = self.elites.len(),
            budget_ms = budget.as_millis() as u64,
            "Council session opened"
        );

        self.set_state(CouncilState::InSession);
        let result = self.run_phases(prompt, budget).await;
        self.set_state(CouncilState::Adjourned);

        match &result {
            Ok(outcome) => info!(
                votes = outcome.votes,
                rounds = outcome.rounds,
                answer_chars = outcome.answer.chars().count(),
                "Council session adjourned"
            ),
            Err(e) => warn!("Council session adjourned with error: {e}"),
        }
        result
    }

    async fn run_phases(
        &self,
        prompt: &str,
        budget: Duration,
    ) -> Result<DeliberationOutcome, DeliberationError> {
        let (entries, rounds) = self.general_discussion(prompt, budget).await?;

        self.set_state(CouncilState::Evaluating);
        let entries = self.elite_voting(entries).await?;

        let winner = DiscussionEntry::winner(&entries)?;
        Ok(DeliberationOutcome {
            answer: winner.statement.clone(),
            votes: winner.votes,
            rounds,
        })
    }

    /// Phase 1: members take turns refining a shared statement until the
    /// budget runs out.
    ///
    /// Entries are seeded with the original prompt, so a budget that
    /// expires before anyone speaks still sends something meaningful to
    /// the vote.
    async fn general_discussion(
        &self,
        prompt: &str,
        budget: Duration,
    ) -> Result<(Vec<DiscussionEntry>, u32), DeliberationError> {
        let deadline = Instant::now() + budget;
        let mut entries: Vec<DiscussionEntry> = self
            .members
            .iter()
            .map(|member| DiscussionEntry::new(member.clone(), prompt))
            .collect();
        let mut baton = prompt.to_string();
        let mut rounds = 0u32;

        while Instant::now() < deadline {
            rounds += 1;
            debug!(round = rounds, "General discussion round started");
            for entry in entries.iter_mut() {
                if Instant::now() > deadline {
                    break;
                }
                let request = discussion_request(prompt, &baton);
                let response = self
                    .gateway
                    .generate(entry.participant.generation_model(), &request)
                    .await?;
                baton = self.clamp_response(&entry.participant.name, response);
                entry.record_statement(baton.clone());
            }
        }

        info!(rounds, "General discussion closed");
        Ok((entries, rounds))
    }

    /// Phase 2: every elite scores every member's final statement. A
    /// response containing the character `1` counts as an approval.
    async fn elite_voting(
        &self,
        mut entries: Vec<DiscussionEntry>,
    ) -> Result<Vec<DiscussionEntry>, DeliberationError> {
        for entry in entries.iter_mut() {
            let request = voting_request(&entry.statement);
            for elite in &self.elites {
                let response = self
                    .gateway
                    .generate(elite.generation_model(), &request)
                    .await?;
                let ballot = self.clamp_response(&elite.name, response);
                if ballot.contains('1') {
                    entry.record_vote();
                }
            }
            debug!(
                member = %entry.participant.name,
                votes = entry.votes,
                "Entry scored"
            );
        }
        Ok(entries)
    }

    /// Enforce the statement size policy on one response, with the
    /// participant name attached to any warning.
    fn clamp_response(&self, participant: &str, response: String) -> String {
        let (clamped, fit) = clamp_statement(&response, &self.params.limits);
        match fit {
            StatementFit::Truncated { original_chars } => warn!(
                participant,
                original_chars,
                kept_chars = self.params.limits.max_chars,
                "Response truncated"
            ),
            StatementFit::NearLimit { chars } => warn!(
                participant,
                chars,
                limit = self.params.limits.max_chars,
                "Response approaching length limit"
            ),
            StatementFit::Within => {}
        }
        clamped.into_owned()
    }

    fn set_state(&self, next: CouncilState) {
        let mut state = self
            .state
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        debug!(from = %*state, to = %next, "Council state changed");
        *state = next;
    }
}

/// Build the structured instruction for one discussion turn.
fn discussion_request(original_prompt: &str, discussion_status: &str) -> String {
    serde_json::json!({
        "phase": DISCUSSION_PHASE,
        "originalPrompt": original_prompt,
        "discussionStatus": discussion_status,
        "duty": DISCUSSION_DUTY,
    })
    .to_string()
}

/// Build the structured ballot for one statement. The statement rides
/// along JSON-quoted, so the elite sees it exactly as the member wrote
/// it, whitespace and all.
fn voting_request(statement: &str) -> String {
    let quoted = serde_json::Value::String(statement.to_string()).to_string();
    serde_json::json!({
        "phase": VOTING_PHASE,
        "conclusion": quoted,
        "duty": VOTING_DUTY,
    })
    .to_string()
}
