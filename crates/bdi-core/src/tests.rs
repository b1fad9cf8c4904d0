//! Unit tests for bdi-core primitives.

#[cfg(test)]
mod ids {
    use crate::{AgentId, DesireId, IntentionId};

    #[test]
    fn index_roundtrip() {
        let id = AgentId(42);
        assert_eq!(id.index(), 42);
        assert_eq!(AgentId::try_from(42usize).unwrap(), id);
    }

    #[test]
    fn ordering() {
        assert!(AgentId(0) < AgentId(1));
        assert!(DesireId(100) > DesireId(99));
    }

    #[test]
    fn invalid_sentinels_are_max() {
        assert_eq!(AgentId::INVALID.0, u32::MAX);
        assert_eq!(DesireId::INVALID.0, u64::MAX);
        assert_eq!(IntentionId::INVALID.0, u64::MAX);
    }

    #[test]
    fn next_increments() {
        assert_eq!(DesireId(0).next(), DesireId(1));
    }

    #[test]
    fn user_sentinel_distinct_from_invalid() {
        assert!(AgentId::USER.is_user());
        assert!(!AgentId::INVALID.is_user());
        assert_ne!(AgentId::USER, AgentId::INVALID);
    }

    #[test]
    fn display() {
        assert_eq!(AgentId(7).to_string(), "AgentId(7)");
    }
}

#[cfg(test)]
mod time {
    use crate::{SimClock, Tick, WorldConfig};

    #[test]
    fn tick_arithmetic() {
        let t = Tick(10);
        assert_eq!(t + 5, Tick(15));
        assert_eq!(t.offset(3), Tick(13));
        assert_eq!(Tick(15) - Tick(10), 5u64);
    }

    #[test]
    fn clock_elapsed() {
        let mut clock = SimClock::new(0, 5.0, 1.0);
        assert_eq!(clock.elapsed_secs(), 0);
        clock.advance();
        assert_eq!(clock.elapsed_secs(), 5);
        clock.advance();
        assert_eq!(clock.elapsed_secs(), 10);
    }

    #[test]
    fn tick_period_scales_with_speed() {
        let clock = SimClock::new(0, 5.0, 2.0);
        assert_eq!(clock.tick_period().as_secs_f64(), 2.5);
    }

    #[test]
    fn tick_period_floor() {
        // absurdly high speed must still floor at 0.1s, never catch up in a burst
        let clock = SimClock::new(0, 5.0, 10.0);
        assert!(clock.tick_period().as_secs_f64() >= 0.1);
    }

    #[test]
    fn time_speed_clamped() {
        let clock = SimClock::new(0, 5.0, 100.0);
        assert_eq!(clock.time_speed, 10.0);
        let clock = SimClock::new(0, 5.0, 0.0);
        assert_eq!(clock.time_speed, 0.1);
    }

    #[test]
    fn world_config_end_tick() {
        let cfg = WorldConfig {
            total_ticks: Some(100),
            ..Default::default()
        };
        assert_eq!(cfg.end_tick(), Some(Tick(100)));
        let unbounded = WorldConfig::default();
        assert_eq!(unbounded.end_tick(), None);
    }

    #[test]
    fn world_config_defaults_match_spec() {
        let cfg = WorldConfig::default();
        assert_eq!(cfg.base_tick_seconds, 5.0);
        assert_eq!(cfg.event_log_capacity, 500);
        assert_eq!(cfg.hard_limit_turns, 10);
        assert_eq!(cfg.idle_guard_threshold, 2);
    }
}

#[cfg(test)]
mod rng {
    use crate::{AgentId, AgentRng};

    #[test]
    fn deterministic_same_seed() {
        let mut r1 = AgentRng::new(12345, AgentId(0));
        let mut r2 = AgentRng::new(12345, AgentId(0));
        for _ in 0..100 {
            let a: f32 = r1.random();
            let b: f32 = r2.random();
            assert_eq!(a, b);
        }
    }

    #[test]
    fn different_agents_differ() {
        let mut r0 = AgentRng::new(1, AgentId(0));
        let mut r1 = AgentRng::new(1, AgentId(1));
        let a: u64 = r0.random();
        let b: u64 = r1.random();
        assert_ne!(a, b, "seeds for adjacent agents should diverge");
    }

    #[test]
    fn gen_range_in_bounds() {
        let mut rng = AgentRng::new(0, AgentId(0));
        for _ in 0..1000 {
            let v = rng.gen_range(0.0f32..1.0);
            assert!((0.0..1.0).contains(&v));
        }
    }

    #[test]
    fn gen_bool_extremes() {
        let mut rng = AgentRng::new(0, AgentId(0));
        assert!(!rng.gen_bool(0.0));
        assert!(rng.gen_bool(1.0));
    }
}
