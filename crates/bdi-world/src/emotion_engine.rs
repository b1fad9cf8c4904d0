//! The Emotion Engine (§4.7, §9 "Emotion matrix & personality multipliers
//! ... design-time data, not runtime"): a static trigger → delta table, plus
//! a keyword map for picking a trigger out of free-form event/message
//! content. Amplification of negative-affect axes by neuroticism happens in
//! [`bdi_agent::emotion::Emotion::apply`]; this module only owns which
//! axes move and by how much for each named trigger.

use bdi_agent::emotion::{Emotion, EmotionAxis};

use EmotionAxis::*;

/// `(axis, delta)` pairs applied for one trigger. Deltas are pre-amplifier;
/// `Emotion::apply` handles the neuroticism multiplier for `Fear`/`Anger`/
/// `Sadness` on positive deltas.
type Impact = &'static [(EmotionAxis, f32)];

const WORLD_EVENT: Impact = &[(Surprise, 0.4), (Fear, 0.25)];
const FRIENDLY_CHAT: Impact = &[(Happiness, 0.08), (Comfort, 0.05), (Loneliness, -0.05)];
const LONG_PLEASANT_CHAT: Impact = &[(Happiness, 0.15), (Comfort, 0.12), (Loneliness, -0.12)];
const CONFLICT: Impact = &[(Anger, 0.2), (Disgust, 0.1), (Happiness, -0.1)];
const REJECTION: Impact = &[(Sadness, 0.2), (Loneliness, 0.15), (Happiness, -0.1)];
const FAREWELL: Impact = &[(Loneliness, 0.05), (Comfort, -0.02)];
const FORCE_QUIT: Impact = &[(Anger, 0.15), (Disgust, 0.1), (Comfort, -0.05)];
const IDLE: Impact = &[(Loneliness, 0.02)];

/// Every named trigger the engine recognizes. A trigger string that doesn't
/// match one of these is a silent no-op (deterministic contract failures
/// never propagate, per §7).
fn impact_for(trigger: &str) -> Impact {
    match trigger {
        "world_event" => WORLD_EVENT,
        "friendly_chat" => FRIENDLY_CHAT,
        "long_pleasant_chat" => LONG_PLEASANT_CHAT,
        "conflict" => CONFLICT,
        "rejection" => REJECTION,
        "farewell" => FAREWELL,
        "force_quit" => FORCE_QUIT,
        "idle" => IDLE,
        _ => &[],
    }
}

/// Apply the named trigger's impact to `emotion`, amplified by `neuroticism`
/// per axis (§4.7).
pub fn apply_trigger(emotion: &mut Emotion, trigger: &str, neuroticism: f32) {
    for &(axis, delta) in impact_for(trigger) {
        emotion.apply(axis, delta, neuroticism);
    }
}

/// `update_emotions_from_dialogue(affinity)`: mirrors an outbound message's
/// pairwise affinity back onto the sender's own mood (§4.7 dispatch).
pub fn apply_dialogue_affinity(emotion: &mut Emotion, affinity: f32, neuroticism: f32) {
    let trigger = if affinity >= 0.5 {
        "long_pleasant_chat"
    } else if affinity >= 0.0 {
        "friendly_chat"
    } else {
        "rejection"
    };
    apply_trigger(emotion, trigger, neuroticism);
}

/// Pick a trigger key out of free-form content by keyword
/// (`"happy"`/`"sad"`/`"angry"` and friends), extended to the named triggers
/// above. Returns `None` (no-op) if nothing matches — content-derived
/// impact is a bonus signal, not a requirement.
pub fn classify_content(content: &str) -> Option<&'static str> {
    let lower = content.to_lowercase();
    const RULES: &[(&[&str], &str)] = &[
        (&["fire", "alarm", "danger", "emergency"], "world_event"),
        (&["angry", "furious", "mad at", "hostile"], "conflict"),
        (&["reject", "rejected", "ignored", "dismissed"], "rejection"),
        (&["goodbye", "farewell", "see you", "bye"], "farewell"),
        (&["happy", "great", "wonderful", "glad"], "friendly_chat"),
        (&["sad", "unhappy", "down"], "rejection"),
    ];
    RULES
        .iter()
        .find(|(keywords, _)| keywords.iter().any(|k| lower.contains(k)))
        .map(|(_, trigger)| *trigger)
}
