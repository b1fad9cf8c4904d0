//! Planner — materializes a [`Plan`] for a selected [`Desire`], and later
//! extends a dialogue plan in flight (§4.3).

use bdi_core::{AgentId, MessageId};

use crate::advisor::{HistoryTurn, LlmAdvisor, PlanStepKind};
use crate::desire::{Desire, ReactiveMessageKind};
use crate::intention::Intention;
use crate::personality::Personality;

/// Outgoing message classification. Re-exported from the same closed set
/// used to classify *incoming* messages (§3) — the protocol is symmetric,
/// only the owning component differs.
pub type MessageKind = ReactiveMessageKind;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OnTimeout {
    End,
    Continue,
}

/// The closed action-type tag (§3, §9). Each variant carries its own typed
/// parameters rather than a dynamic map, per the language-neutral mapping
/// in §9 ("Dynamic named parameters on plan steps → a typed parameter
/// struct per action variant").
#[derive(Clone, Debug)]
pub enum ActionType {
    Move { destination: String },
    Observe { subject: Option<String> },
    Think,
    Search { query: String },
    Wait,
    Express,
    Acquire,
    Use,
    Help,
    Request,
    Give,
    InitiateConversation {
        target: AgentId,
        topic: String,
    },
    SendMessage {
        target: AgentId,
        message_type: MessageKind,
        topic: Option<String>,
        tone: Option<String>,
        requires_response: bool,
        response_timeout: f64,
        in_reply_to: Option<MessageId>,
        incoming_content: Option<String>,
    },
    WaitForResponse {
        expected_from: AgentId,
        on_timeout: OnTimeout,
        max_ticks: u32,
    },
    RespondToMessage {
        target: AgentId,
        in_reply_to: Option<MessageId>,
        incoming_content: String,
        tone: Option<String>,
    },
    EndConversation,
}

impl ActionType {
    /// The conversation partner this step addresses, if any — used to
    /// derive an intention's `target()` (§4.7 `atomic_force_quit`).
    pub fn target(&self) -> Option<AgentId> {
        match self {
            ActionType::InitiateConversation { target, .. }
            | ActionType::SendMessage { target, .. }
            | ActionType::RespondToMessage { target, .. } => Some(*target),
            ActionType::WaitForResponse { expected_from, .. } => Some(*expected_from),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ActionType::Move { .. } => "MOVE",
            ActionType::Observe { .. } => "OBSERVE",
            ActionType::Think => "THINK",
            ActionType::Search { .. } => "SEARCH",
            ActionType::Wait => "WAIT",
            ActionType::Express => "EXPRESS",
            ActionType::Acquire => "ACQUIRE",
            ActionType::Use => "USE",
            ActionType::Help => "HELP",
            ActionType::Request => "REQUEST",
            ActionType::Give => "GIVE",
            ActionType::InitiateConversation { .. } => "INITIATE_CONVERSATION",
            ActionType::SendMessage { .. } => "SEND_MESSAGE",
            ActionType::WaitForResponse { .. } => "WAIT_FOR_RESPONSE",
            ActionType::RespondToMessage { .. } => "RESPOND_TO_MESSAGE",
            ActionType::EndConversation => "END_CONVERSATION",
        }
    }

    /// Is this action one of `{initiate_conversation, send_message,
    /// respond_to_message, wait_for_response, end_conversation}` — the set
    /// excluded from `mark_solo_action` (§4.2).
    pub fn is_social_action(&self) -> bool {
        matches!(
            self,
            ActionType::InitiateConversation { .. }
                | ActionType::SendMessage { .. }
                | ActionType::WaitForResponse { .. }
                | ActionType::RespondToMessage { .. }
                | ActionType::EndConversation
        )
    }
}

#[derive(Clone, Debug)]
pub struct PlanStep {
    pub action: ActionType,
    pub description: String,
    pub estimated_duration: f32,
    pub executed: bool,
    pub success: bool,
    pub timed_out: bool,
    pub result: Option<String>,
}

impl PlanStep {
    pub fn new(action: ActionType, description: impl Into<String>, estimated_duration: f32) -> Self {
        Self {
            action,
            description: description.into(),
            estimated_duration,
            executed: false,
            success: false,
            timed_out: false,
            result: None,
        }
    }

    pub fn target(&self) -> Option<AgentId> {
        self.action.target()
    }
}

#[derive(Clone, Debug, Default)]
pub struct Plan {
    pub steps: Vec<PlanStep>,
    pub estimated_total_duration: f32,
}

impl Plan {
    pub fn new(steps: Vec<PlanStep>) -> Self {
        let estimated_total_duration = steps.iter().map(|s| s.estimated_duration).sum();
        Self {
            steps,
            estimated_total_duration,
        }
    }

    pub fn remaining_steps(&self, current_step: usize) -> usize {
        self.steps.len().saturating_sub(current_step)
    }

    fn first_end_conversation_from(&self, from: usize) -> Option<usize> {
        self.steps[from..]
            .iter()
            .position(|s| matches!(s.action, ActionType::EndConversation))
            .map(|rel| rel + from)
    }

    /// Marks every step from `from` up to (exclusive of) the first
    /// `END_CONVERSATION` as `{executed:true, success:false, timed_out:true}`
    /// and returns its index; if none exists, marks all remaining steps the
    /// same way and returns `steps.len()` (§3).
    pub fn skip_to_end_conversation(&mut self, from: usize) -> usize {
        let end = self.first_end_conversation_from(from).unwrap_or(self.steps.len());
        for step in &mut self.steps[from..end] {
            step.executed = true;
            step.success = false;
            step.timed_out = true;
        }
        end
    }

    fn push(&mut self, step: PlanStep) {
        self.estimated_total_duration += step.estimated_duration;
        self.steps.push(step);
    }

    // ---- Convenience constructors (non-dialogue templates) ----

    pub fn create_simple_plan(action: ActionType, description: impl Into<String>) -> Self {
        Self::new(vec![PlanStep::new(action, description, 1.0)])
    }

    pub fn create_multi_step_plan(steps: Vec<(ActionType, &str, f32)>) -> Self {
        Self::new(
            steps
                .into_iter()
                .map(|(action, desc, dur)| PlanStep::new(action, desc, dur))
                .collect(),
        )
    }

    /// A dynamic dialogue plan shared by both the initiator and responder
    /// roles (§4.3). `is_initiator` selects `GREETING` vs `ANSWER` for the
    /// second step and whether it requires a response.
    pub fn create_response_plan(
        target: AgentId,
        topic: String,
        is_initiator: bool,
        incoming_content: Option<String>,
    ) -> Self {
        let greeting_kind = if is_initiator {
            MessageKind::Greeting
        } else {
            MessageKind::Answer
        };
        Self::new(vec![
            PlanStep::new(
                ActionType::InitiateConversation {
                    target,
                    topic: topic.clone(),
                },
                format!("start a conversation with agent_{}", target.0),
                0.5,
            ),
            PlanStep::new(
                ActionType::SendMessage {
                    target,
                    message_type: greeting_kind,
                    topic: Some(topic),
                    tone: None,
                    requires_response: is_initiator,
                    response_timeout: 30.0,
                    in_reply_to: None,
                    incoming_content,
                },
                "greet the other agent".to_string(),
                1.0,
            ),
        ])
    }
}

/// Stateless plan-construction logic. Holds no per-agent state.
pub struct Planner;

impl Planner {
    const SOCIAL_KEYWORDS: &'static [&'static str] = &[
        "поговорить",
        "общаться",
        "пообщаться",
        "поделиться",
        "помочь",
        "утешение",
        "talk",
        "chat",
        "converse",
        "share",
        "comfort",
    ];
    const MOVEMENT_LEARNING_KEYWORDS: &'static [&'static str] =
        &["move", "travel", "go to", "learn", "study", "explore", "research"];
    const REFLECTION_KEYWORDS: &'static [&'static str] =
        &["reflect", "organize", "tidy", "think over", "plan ahead"];

    /// Dispatch a freshly selected desire to the appropriate plan template
    /// (§4.3 "Dispatch by desire classification"). `advisor`/`history`/
    /// `name` are only consulted for dialogue plans.
    #[allow(clippy::too_many_arguments)]
    pub fn build_plan(
        desire: &Desire,
        self_id: AgentId,
        name: &str,
        personality: &Personality,
        social_battery: f32,
        history: &[HistoryTurn],
        advisor: Option<&dyn LlmAdvisor>,
    ) -> Plan {
        let description = desire.description.to_lowercase();

        if desire.source == "incoming_message" || description.starts_with("respond") {
            let target = desire.context_agent("target").unwrap_or(AgentId::INVALID);
            let mut plan =
                Plan::create_response_plan(target, desire.description.clone(), false, None);
            Self::append_dialogue_continuation(&mut plan, self_id, name, personality, social_battery, history, advisor, target);
            return plan;
        }

        if desire.source == "idle_drive" || desire.context_bool("is_idle") {
            return Plan::create_simple_plan(
                ActionType::Observe { subject: None },
                "observe the surroundings",
            );
        }

        if Self::SOCIAL_KEYWORDS.iter().any(|k| description.contains(k)) {
            let target = desire
                .context_agent("target")
                .unwrap_or(AgentId::INVALID);
            let mut plan =
                Plan::create_response_plan(target, desire.description.clone(), true, None);
            Self::append_dialogue_continuation(&mut plan, self_id, name, personality, social_battery, history, advisor, target);
            return plan;
        }

        if Self::MOVEMENT_LEARNING_KEYWORDS.iter().any(|k| description.contains(k)) {
            return Plan::create_multi_step_plan(vec![
                (
                    ActionType::Move {
                        destination: "nearby area".to_string(),
                    },
                    "move toward the goal",
                    1.0,
                ),
                (
                    ActionType::Search {
                        query: desire.description.clone(),
                    },
                    "search for relevant information",
                    1.0,
                ),
                (ActionType::Observe { subject: None }, "observe what's found", 1.0),
                (ActionType::Think, "reflect on the findings", 1.0),
            ]);
        }

        if Self::REFLECTION_KEYWORDS.iter().any(|k| description.contains(k)) {
            return Plan::create_multi_step_plan(vec![
                (
                    ActionType::Move {
                        destination: "quiet spot".to_string(),
                    },
                    "find a quiet spot",
                    1.0,
                ),
                (ActionType::Observe { subject: None }, "take stock of surroundings", 1.0),
                (ActionType::Think, "reflect", 1.0),
                (
                    ActionType::Search {
                        query: "personal priorities".to_string(),
                    },
                    "organize priorities",
                    1.0,
                ),
            ]);
        }

        Plan::create_multi_step_plan(vec![
            (ActionType::Think, "think it over", 1.0),
            (ActionType::Observe { subject: None }, "take a look around", 1.0),
        ])
    }

    /// Append 1–2 advisor-proposed steps (or the deterministic fallback) to
    /// a freshly created dialogue plan (§4.3 point 3).
    #[allow(clippy::too_many_arguments)]
    fn append_dialogue_continuation(
        plan: &mut Plan,
        self_id: AgentId,
        name: &str,
        personality: &Personality,
        social_battery: f32,
        history: &[HistoryTurn],
        advisor: Option<&dyn LlmAdvisor>,
        target: AgentId,
    ) {
        let proposed = advisor.and_then(|a| {
            a.generate_next_plan_step(name, self_id, personality, "continue the conversation", history, social_battery)
                .ok()
        });

        match proposed {
            Some(kinds) if !kinds.is_empty() => {
                for kind in kinds.into_iter().take(2) {
                    if let Some(step) = Self::restricted_step(kind, target) {
                        plan.push(step);
                    }
                }
            }
            _ => {
                if social_battery < 0.3 {
                    plan.push(PlanStep::new(
                        ActionType::SendMessage {
                            target,
                            message_type: MessageKind::Farewell,
                            topic: None,
                            tone: None,
                            requires_response: false,
                            response_timeout: 0.0,
                            in_reply_to: None,
                            incoming_content: None,
                        },
                        "say goodbye",
                        0.5,
                    ));
                    plan.push(PlanStep::new(ActionType::EndConversation, "end the conversation", 0.5));
                } else {
                    plan.push(PlanStep::new(
                        ActionType::WaitForResponse {
                            expected_from: target,
                            on_timeout: OnTimeout::End,
                            max_ticks: 6,
                        },
                        "wait for a reply",
                        1.0,
                    ));
                    plan.push(PlanStep::new(ActionType::EndConversation, "end the conversation", 0.5));
                }
            }
        }
    }

    /// Map a [`PlanStepKind`] (the restricted advisor vocabulary) onto a
    /// concrete [`PlanStep`] targeting `target`. `InitiateConversation` is
    /// never offered during extension (callers already filter it at the
    /// advisor boundary), but is handled here for completeness.
    fn restricted_step(kind: PlanStepKind, target: AgentId) -> Option<PlanStep> {
        let step = match kind {
            PlanStepKind::SendMessage => PlanStep::new(
                ActionType::SendMessage {
                    target,
                    message_type: MessageKind::Statement,
                    topic: None,
                    tone: None,
                    requires_response: false,
                    response_timeout: 30.0,
                    in_reply_to: None,
                    incoming_content: None,
                },
                "continue the conversation",
                1.0,
            ),
            PlanStepKind::WaitForResponse => PlanStep::new(
                ActionType::WaitForResponse {
                    expected_from: target,
                    on_timeout: OnTimeout::End,
                    max_ticks: 4,
                },
                "wait for a reply",
                1.0,
            ),
            PlanStepKind::EndConversation => PlanStep::new(ActionType::EndConversation, "end the conversation", 0.5),
            PlanStepKind::RespondToMessage => PlanStep::new(
                ActionType::RespondToMessage {
                    target,
                    in_reply_to: None,
                    incoming_content: String::new(),
                    tone: None,
                },
                "respond to the message",
                1.0,
            ),
            PlanStepKind::Think => PlanStep::new(ActionType::Think, "think", 0.5),
            PlanStepKind::InitiateConversation => PlanStep::new(
                ActionType::InitiateConversation {
                    target,
                    topic: "continued conversation".to_string(),
                },
                "resume the conversation",
                0.5,
            ),
        };
        Some(step)
    }

    /// `extend_conversation_plan` (§4.3). Called when the opposite party's
    /// next message arrives and the plan has ≤ 1 remaining step.
    #[allow(clippy::too_many_arguments)]
    pub fn extend_conversation_plan(
        intention: &mut Intention,
        self_id: AgentId,
        name: &str,
        personality: &Personality,
        force_end: bool,
        history: &[HistoryTurn],
        social_battery: f32,
        advisor: Option<&dyn LlmAdvisor>,
    ) {
        let target = intention.target().unwrap_or(AgentId::INVALID);
        let from = intention.current_step;

        if force_end {
            intention.plan.skip_to_end_conversation(from);
            intention.plan.push(PlanStep::new(
                ActionType::SendMessage {
                    target,
                    message_type: MessageKind::Farewell,
                    topic: None,
                    tone: None,
                    requires_response: false,
                    response_timeout: 0.0,
                    in_reply_to: None,
                    incoming_content: None,
                },
                "say goodbye",
                0.5,
            ));
            intention.plan.push(PlanStep::new(ActionType::EndConversation, "end the conversation", 0.5));
            return;
        }

        let proposed = advisor.and_then(|a| {
            a.generate_next_plan_step(
                name,
                self_id,
                personality,
                &intention.desire_description,
                history,
                social_battery,
            )
            .ok()
        });

        if let Some(kinds) = proposed {
            for kind in kinds.into_iter().take(2) {
                if let Some(step) = Self::restricted_step(kind, target) {
                    intention.plan.push(step);
                }
            }
        }
    }
}
