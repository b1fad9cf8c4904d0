//! The mutable emotion vector.
//!
//! Eight axes, each in `[0, 1]`. Updated by the World Tick Loop's emotion
//! engine (trigger → delta table, kept as static data in `bdi-world`) and
//! mirrored into the Belief Store every tick as `SELF.emotion_*` beliefs
//! (§4.5 step 3).

#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Emotion {
    pub happiness: f32,
    pub sadness: f32,
    pub anger: f32,
    pub fear: f32,
    pub surprise: f32,
    pub disgust: f32,
    pub loneliness: f32,
    pub comfort: f32,
}

impl Default for Emotion {
    fn default() -> Self {
        Self {
            happiness: 0.5,
            sadness: 0.0,
            anger: 0.0,
            fear: 0.0,
            surprise: 0.0,
            disgust: 0.0,
            loneliness: 0.0,
            comfort: 0.5,
        }
    }
}

impl Emotion {
    /// Apply a named delta, amplifying negative-affect axes
    /// (`fear`/`anger`/`sadness`) by `1 + (neuroticism - 0.5) * 0.4` per
    /// §4.7's Emotion Engine, then clamp every axis to `[0, 1]`.
    pub fn apply(&mut self, axis: EmotionAxis, delta: f32, neuroticism: f32) {
        let amplifier = if matches!(
            axis,
            EmotionAxis::Fear | EmotionAxis::Anger | EmotionAxis::Sadness
        ) && delta > 0.0
        {
            1.0 + (neuroticism - 0.5) * 0.4
        } else {
            1.0
        };
        let scaled = delta * amplifier;
        let slot = self.axis_mut(axis);
        *slot = (*slot + scaled).clamp(0.0, 1.0);
    }

    pub fn axis_mut(&mut self, axis: EmotionAxis) -> &mut f32 {
        match axis {
            EmotionAxis::Happiness => &mut self.happiness,
            EmotionAxis::Sadness => &mut self.sadness,
            EmotionAxis::Anger => &mut self.anger,
            EmotionAxis::Fear => &mut self.fear,
            EmotionAxis::Surprise => &mut self.surprise,
            EmotionAxis::Disgust => &mut self.disgust,
            EmotionAxis::Loneliness => &mut self.loneliness,
            EmotionAxis::Comfort => &mut self.comfort,
        }
    }

    pub fn axis(&self, axis: EmotionAxis) -> f32 {
        match axis {
            EmotionAxis::Happiness => self.happiness,
            EmotionAxis::Sadness => self.sadness,
            EmotionAxis::Anger => self.anger,
            EmotionAxis::Fear => self.fear,
            EmotionAxis::Surprise => self.surprise,
            EmotionAxis::Disgust => self.disgust,
            EmotionAxis::Loneliness => self.loneliness,
            EmotionAxis::Comfort => self.comfort,
        }
    }

    /// Iterate `(name, value)` pairs for belief mirroring (§4.5 step 3).
    pub fn named_axes(&self) -> [(&'static str, f32); 8] {
        [
            ("happiness", self.happiness),
            ("sadness", self.sadness),
            ("anger", self.anger),
            ("fear", self.fear),
            ("surprise", self.surprise),
            ("disgust", self.disgust),
            ("loneliness", self.loneliness),
            ("comfort", self.comfort),
        ]
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EmotionAxis {
    Happiness,
    Sadness,
    Anger,
    Fear,
    Surprise,
    Disgust,
    Loneliness,
    Comfort,
}
