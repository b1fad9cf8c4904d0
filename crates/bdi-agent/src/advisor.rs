//! The capability boundary between the BDI components and the language
//! model (§6). Defined here — not in `bdi-llm` — because the Desire
//! Generator and Planner are the consumers; `bdi-llm` depends on this
//! crate and supplies implementations (a deterministic fallback and an
//! HTTP-backed one), keeping the dependency arrow pointing the same way
//! as the rest of the leaves-first layering.

use std::collections::HashMap;

use bdi_core::AgentId;

use crate::belief::BeliefValue;
use crate::desire::MotivationType;
use crate::personality::Personality;

/// One exchange in a conversation's recent history, as fed to the advisor.
#[derive(Clone, Debug)]
pub struct HistoryTurn {
    pub sender_name: String,
    pub content: String,
}

/// A desire proposed by the advisor, before the Desire Generator's filter
/// pipeline (§4.2 step 3) has run over it.
#[derive(Clone, Debug)]
pub struct DesireSeed {
    pub description: String,
    pub priority: f32,
    pub urgency: f32,
    pub motivation_type: MotivationType,
    pub context: HashMap<String, BeliefValue>,
}

/// Verdict from `analyze_conversation_turn` (§4.5 step 8).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConversationVerdict {
    Continue,
    WrapUp,
    ForceQuit,
}

/// The restricted set of plan-step kinds the advisor may propose, both for
/// dialogue-plan construction and `extend_conversation_plan` (§4.3). Dynamic
/// plan extension never offers `InitiateConversation` — callers filter it
/// out themselves when that's the context.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlanStepKind {
    SendMessage,
    WaitForResponse,
    EndConversation,
    RespondToMessage,
    InitiateConversation,
    Think,
}

/// Everything the engine asks a language model for, plus the one
/// free-form content call (§6). Every method here has a deterministic
/// fallback at the call site — this trait is an advisor, never an oracle
/// (§9): a failing implementation should be rare, but callers are never
/// required to trust it.
pub trait LlmAdvisor: Send + Sync {
    /// Propose 1–3 candidate desires from personality/emotion/context.
    /// Implementations may return any length; callers truncate to 3.
    fn generate_dynamic_desires(
        &self,
        name: &str,
        id: AgentId,
        personality: &Personality,
        emotions: &crate::emotion::Emotion,
        social_battery: f32,
        recent_perception_summaries: &[String],
    ) -> Result<Vec<DesireSeed>, String>;

    /// Classify the current state of an in-flight conversation.
    fn analyze_conversation_turn(
        &self,
        name: &str,
        id: AgentId,
        personality: &Personality,
        history: &[HistoryTurn],
        social_battery: f32,
    ) -> Result<ConversationVerdict, String>;

    /// Propose 1–2 next plan steps from the restricted set, for dialogue
    /// plan construction or extension.
    fn generate_next_plan_step(
        &self,
        name: &str,
        id: AgentId,
        personality: &Personality,
        current_desire_description: &str,
        history: &[HistoryTurn],
        social_battery: f32,
    ) -> Result<Vec<PlanStepKind>, String>;

    /// Free-form content for one outbound message.
    fn generate_content(
        &self,
        personality: &Personality,
        context: &str,
        history: &[HistoryTurn],
        message_type: &str,
        incoming_content: Option<&str>,
    ) -> Result<String, String>;
}
