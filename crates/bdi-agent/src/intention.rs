//! Intention Selector — binds at most one new commitment per tick and
//! reactively suspends routine work in favor of urgent social input (§4.4).

use bdi_core::{DesireId, IntentionId, Tick};

use crate::belief::BeliefStore;
use crate::desire::{Desire, DesireStatus};
use crate::plan::{Plan, PlanStep};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IntentionStatus {
    Active,
    Suspended,
    Completed,
    Failed,
    Abandoned,
}

impl IntentionStatus {
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            IntentionStatus::Completed | IntentionStatus::Failed | IntentionStatus::Abandoned
        )
    }
}

/// An active commitment to pursue a [`Desire`]'s plan (§3).
#[derive(Clone, Debug)]
pub struct Intention {
    pub id: IntentionId,
    pub desire_id: DesireId,
    /// Snapshot of the desire's description at bind time, so UI/logging
    /// survive desire-list cleanup (§9).
    pub desire_description: String,
    pub plan: Plan,
    pub status: IntentionStatus,
    pub priority: f32,
    pub current_step: usize,
    pub steps_completed: u32,
    pub steps_failed: u32,
    pub retry_count: u32,
    pub interruptible: bool,
    pub started_at: Tick,
    pub completed_at: Option<Tick>,
    pub suspend_reason: Option<String>,
    /// Copied from the originating desire's `context["bypass_battery"]`
    /// (§9 "god mode" identifier): when true, dispatch must not drain
    /// social battery for this intention's outbound messages.
    pub bypass_battery: bool,
}

impl Intention {
    pub fn new(
        id: IntentionId,
        desire: &Desire,
        plan: Plan,
        interruptible: bool,
        started_at: Tick,
    ) -> Self {
        Self {
            id,
            desire_id: desire.id,
            desire_description: desire.description.clone(),
            plan,
            status: IntentionStatus::Active,
            priority: desire.priority,
            current_step: 0,
            steps_completed: 0,
            steps_failed: 0,
            retry_count: 0,
            interruptible,
            started_at,
            completed_at: None,
            suspend_reason: None,
            bypass_battery: desire.context_bool("bypass_battery"),
        }
    }

    pub fn suspend(&mut self, reason: impl Into<String>) {
        self.status = IntentionStatus::Suspended;
        self.suspend_reason = Some(reason.into());
    }

    pub fn resume(&mut self) {
        if self.status == IntentionStatus::Suspended {
            self.status = IntentionStatus::Active;
            self.suspend_reason = None;
        }
    }

    pub fn abandon(&mut self, reason: impl Into<String>) {
        self.status = IntentionStatus::Abandoned;
        self.suspend_reason = Some(reason.into());
    }

    /// §3 invariant 5: an intention whose every step is executed can never
    /// still be ACTIVE.
    pub fn all_steps_executed(&self) -> bool {
        !self.plan.steps.is_empty() && self.plan.steps.iter().all(|s| s.executed)
    }

    pub fn target(&self) -> Option<bdi_core::AgentId> {
        self.plan
            .steps
            .iter()
            .find_map(|s| s.target())
    }

    /// Fraction of the plan's steps executed so far, as a percentage.
    /// Used by the output snapshot row and by dispatch's harvest step (§4.5).
    pub fn get_progress_percentage(&self) -> f32 {
        if self.plan.steps.is_empty() {
            return 0.0;
        }
        let executed = self.plan.steps.iter().filter(|s| s.executed).count();
        (executed as f32 / self.plan.steps.len() as f32) * 100.0
    }

    /// The step dispatch should execute next, if any remain.
    pub fn get_current_action(&self) -> Option<&PlanStep> {
        self.plan.steps.get(self.current_step)
    }
}

/// Stateless selection/interrupt logic over an agent's desires and
/// intentions. Holds no per-agent state of its own (unlike the Desire
/// Generator) — everything it needs is passed in.
pub struct IntentionSelector;

/// A candidate desire ready to become an intention, returned by
/// [`IntentionSelector::select`]. The caller (Deliberation) builds the plan
/// and constructs the `Intention`.
pub struct SelectionResult {
    pub desire_index: usize,
    /// `world_event` / `user_message` sources force priority to 1.0 and
    /// `interruptible = false` regardless of the planner's usual rule
    /// (§4.5 step 10).
    pub tier_override: bool,
}

impl IntentionSelector {
    /// §4.4 step 1–3. Only called when the agent has no ACTIVE intention.
    /// `bound_desire_ids` are desires already claimed by some intention
    /// (including suspended ones).
    pub fn select(
        desires: &[Desire],
        bound_desire_ids: &[DesireId],
        beliefs: &BeliefStore,
        now: Tick,
    ) -> Option<SelectionResult> {
        let mut candidates: Vec<(usize, &Desire)> = desires
            .iter()
            .enumerate()
            .filter(|(_, d)| d.status == DesireStatus::Active)
            .filter(|(_, d)| !bound_desire_ids.contains(&d.id))
            .filter(|(_, d)| !d.is_expired(now))
            .filter(|(_, d)| Self::is_achievable(d, beliefs))
            .collect();

        candidates.sort_by(|(_, a), (_, b)| {
            b.priority
                .partial_cmp(&a.priority)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| b.utility().partial_cmp(&a.utility()).unwrap_or(std::cmp::Ordering::Equal))
        });

        candidates.first().map(|(idx, d)| SelectionResult {
            desire_index: *idx,
            tier_override: matches!(d.source.as_str(), "world_event" | "user_message"),
        })
    }

    /// All preconditions satisfied by a belief query. This engine has no
    /// explicit precondition language in the desire's context beyond the
    /// implicit ones already enforced upstream (cooldowns, partner
    /// availability, deep-work gating) — desires that reach the selector
    /// are always achievable.
    fn is_achievable(_desire: &Desire, _beliefs: &BeliefStore) -> bool {
        true
    }

    /// An intention is non-interruptible ("social-locked") when its source
    /// is reactive/social per §3, or its motivation is `SOCIAL`/`WORLD_EVENT`
    /// with a resolved target.
    pub fn derive_interruptible(desire: &Desire) -> bool {
        const LOCKING_SOURCES: &[&str] = &[
            "incoming_message",
            "user_message",
            "wrap_up",
            "deep_work_reject",
            "world_event",
        ];
        if LOCKING_SOURCES.contains(&desire.source.as_str()) {
            return false;
        }
        let social_or_world = matches!(
            desire.motivation_type,
            crate::desire::MotivationType::Social | crate::desire::MotivationType::WorldEvent
        );
        if social_or_world && desire.context_agent("target").is_some() {
            return false;
        }
        true
    }

    /// Tier-5/4 reactive interrupt pass (§4.4). `tier` is the urgent
    /// desire's tier (5 or 4). Returns the indices of intentions that were
    /// suspended, for diagnostics.
    pub fn interrupt(
        intentions: &mut [Intention],
        tier: u8,
        reason: &str,
    ) -> Vec<usize> {
        let mut suspended = Vec::new();
        let already_social = intentions
            .iter()
            .any(|i| i.status == IntentionStatus::Active && !i.interruptible);

        for (idx, intention) in intentions.iter_mut().enumerate() {
            if intention.status != IntentionStatus::Active || !intention.interruptible {
                continue;
            }
            if tier == 5 && intention.desire_description.to_lowercase().contains("user") {
                continue;
            }
            if tier == 4 && already_social {
                continue;
            }
            intention.suspend(reason);
            suspended.push(idx);
        }
        suspended
    }

    /// §4.4 "Resume": called when Deliberation finds no new intention
    /// candidate, no urgent social desire, and no ACTIVE intention. Resumes
    /// all suspended intentions in insertion order (i.e., list order).
    pub fn resume_all(intentions: &mut [Intention]) {
        for intention in intentions.iter_mut() {
            intention.resume();
        }
    }
}
