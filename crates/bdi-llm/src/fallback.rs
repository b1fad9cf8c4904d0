//! The "no model configured" advisor: `llm.py`'s behavior when
//! `OPENROUTER_API_KEY` is unset — deterministic, no network, never errors.
//!
//! Returning empty vectors/`Continue` here is not a cop-out: every call site
//! in `bdi-agent` already has its own deterministic fallback for an empty or
//! absent proposal (`append_dialogue_continuation`'s battery-based `_` arm,
//! the idle-drive desire), so routing through this advisor and routing
//! through `advisor: None` produce identical plans. The one place that
//! genuinely needs *some* text regardless — `generate_content` — gets a
//! template bank instead of an empty string, mirroring `llm.py`'s
//! `f"Mock response to: {prompt}"` mock path.

use bdi_agent::advisor::{ConversationVerdict, DesireSeed, HistoryTurn, LlmAdvisor, PlanStepKind};
use bdi_agent::emotion::Emotion;
use bdi_agent::personality::Personality;
use bdi_core::AgentId;

/// Deterministic stand-in for a language model. Safe to use in tests, demos,
/// and any run with no API key configured.
pub struct FallbackAdvisor;

impl LlmAdvisor for FallbackAdvisor {
    fn generate_dynamic_desires(
        &self,
        _name: &str,
        _id: AgentId,
        _personality: &Personality,
        _emotions: &Emotion,
        _social_battery: f32,
        _recent_perception_summaries: &[String],
    ) -> Result<Vec<DesireSeed>, String> {
        Ok(Vec::new())
    }

    fn analyze_conversation_turn(
        &self,
        _name: &str,
        _id: AgentId,
        _personality: &Personality,
        _history: &[HistoryTurn],
        _social_battery: f32,
    ) -> Result<ConversationVerdict, String> {
        Ok(ConversationVerdict::Continue)
    }

    fn generate_next_plan_step(
        &self,
        _name: &str,
        _id: AgentId,
        _personality: &Personality,
        _current_desire_description: &str,
        _history: &[HistoryTurn],
        _social_battery: f32,
    ) -> Result<Vec<PlanStepKind>, String> {
        Ok(Vec::new())
    }

    fn generate_content(
        &self,
        personality: &Personality,
        context: &str,
        history: &[HistoryTurn],
        message_type: &str,
        incoming_content: Option<&str>,
    ) -> Result<String, String> {
        Ok(mock_content(personality, context, history, message_type, incoming_content))
    }
}

/// A small deterministic template bank, keyed on `message_type` and whether
/// the agent is replying to something. Warm tone for agreeable/extroverted
/// personalities, terse tone otherwise — the one place this advisor reads
/// the personality vector at all.
fn mock_content(
    personality: &Personality,
    context: &str,
    _history: &[HistoryTurn],
    message_type: &str,
    incoming_content: Option<&str>,
) -> String {
    let warm = personality.agreeableness > 0.6 && personality.extraversion > 0.5;
    match message_type {
        "greeting" => if warm {
            format!("Hey! Good to see you — {context}")
        } else {
            format!("Hello. {context}")
        },
        "farewell" => if warm {
            "Take care, talk soon!".to_string()
        } else {
            "I have to go.".to_string()
        },
        "answer" => match incoming_content {
            Some(content) => format!("About \"{content}\" — {context}"),
            None => format!("Mock response: {context}"),
        },
        "question" => format!("{context}? What do you think?"),
        _ => format!("Mock response to: {context}"),
    }
}
