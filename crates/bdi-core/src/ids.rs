//! Strongly typed, zero-cost identifier wrappers.
//!
//! All IDs are `Copy + Ord + Hash` so they can be used as map keys and sorted
//! collection elements without ceremony. The inner integer is `pub` to allow
//! direct indexing into `Vec`s via `id.0 as usize`, but callers should prefer
//! the `.index()` helpers for clarity.

use std::fmt;

/// Generate a typed ID wrapper around a primitive integer.
macro_rules! typed_id {
    ($(#[$attr:meta])* $vis:vis struct $name:ident($inner:ty);) => {
        $(#[$attr])*
        #[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        $vis struct $name(pub $inner);

        impl $name {
            /// Sentinel meaning "no valid ID".
            pub const INVALID: $name = $name(<$inner>::MAX);

            /// Cast to `usize` for direct use as a `Vec` index.
            #[inline(always)]
            pub fn index(self) -> usize {
                self.0 as usize
            }

            /// Next sequential id after this one. Used by monotonic counters.
            #[inline(always)]
            pub fn next(self) -> Self {
                Self(self.0 + 1)
            }
        }

        impl Default for $name {
            /// Returns the `INVALID` sentinel so uninitialized IDs are visibly invalid.
            #[inline(always)]
            fn default() -> Self {
                Self::INVALID
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self.0)
            }
        }

        impl From<$name> for usize {
            #[inline(always)]
            fn from(id: $name) -> usize {
                id.0 as usize
            }
        }

        impl TryFrom<usize> for $name {
            type Error = std::num::TryFromIntError;
            fn try_from(n: usize) -> Result<$name, Self::Error> {
                <$inner>::try_from(n).map($name)
            }
        }
    };
}

typed_id! {
    /// Index of an agent in the world's agent store. Max ~4.3 billion agents.
    pub struct AgentId(u32);
}

impl AgentId {
    /// Reserved id for the "user" capability (§9). Not a real simulated
    /// agent — dispatch handlers treat it as a wildcard that bypasses
    /// cooldowns, global blocks, and social-battery drain. Distinct from
    /// `INVALID` so a missing id and the user sentinel are never confused.
    pub const USER: AgentId = AgentId(u32::MAX - 1);

    #[inline(always)]
    pub fn is_user(self) -> bool {
        self.0 == Self::USER.0
    }
}

typed_id! {
    /// Monotonically issued id for a `Belief` entry.
    pub struct BeliefId(u64);
}

typed_id! {
    /// Monotonically issued id for a `Desire`, unique per owning agent.
    pub struct DesireId(u64);
}

typed_id! {
    /// Monotonically issued id for an `Intention`, unique per owning agent.
    pub struct IntentionId(u64);
}

typed_id! {
    /// Monotonically issued id for a `Message`, unique hub-wide.
    pub struct MessageId(u64);
}

typed_id! {
    /// Monotonically issued id for a `Conversation`, unique hub-wide.
    pub struct ConversationId(u64);
}
