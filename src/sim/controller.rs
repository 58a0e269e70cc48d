//! Juggling controller
//!
//! Owns the environment, the active ball set and the hand timers, and
//! advances them one frame at a time. A frame's `dt` is clamped and then
//! integrated in fixed sub-steps; every sub-step runs the same order:
//!
//! 1. trigger throws (hand timers, or restart a stalled apex chain)
//! 2. update every ball, recording catches
//! 3. check apexes (and, for the apex-chained strategy, throw the next ball)

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::ball::Ball;
use super::environment::{Environment, Hand};
use super::planner::{self, ThrowPlan};
use crate::consts::{MAX_FRAME_DT, MAX_SUBSTEPS, SIM_DT};
use crate::error::Result;
use crate::settings::{JugglingSettings, TriggerStrategy};

/// Something that happened during the last tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum JuggleEvent {
    Thrown { ball: u32, from: Hand },
    Caught { ball: u32, hand: Hand },
    Apex { ball: u32 },
    /// A hand's timer fired with no ball resting in it
    Missed { hand: Hand },
}

/// What the host draws for one ball
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BallSprite {
    /// Center (px)
    pub pos: Vec2,
    /// Radius (px)
    pub radius: f32,
    pub color: [u8; 3],
}

/// Accumulated time per hand since its last throw (s)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct HandTimers {
    pub left: f32,
    pub right: f32,
}

impl HandTimers {
    /// Hands start half an interval apart so they alternate
    fn staggered(interval: f32) -> Self {
        Self {
            left: interval / 2.0,
            right: 0.0,
        }
    }

    fn get_mut(&mut self, hand: Hand) -> &mut f32 {
        match hand {
            Hand::Left => &mut self.left,
            Hand::Right => &mut self.right,
        }
    }
}

/// Letter name for a ball: A..Z, then A1..Z1 and so on
fn ball_name(index: u32) -> String {
    let letter = char::from(b'A' + (index % 26) as u8);
    if index < 26 {
        letter.to_string()
    } else {
        format!("{letter}{}", index / 26)
    }
}

/// The juggling simulation
#[derive(Debug, Clone)]
pub struct Juggler {
    settings: JugglingSettings,
    env: Environment,
    plan: ThrowPlan,
    balls: Vec<Ball>,
    timers: HandTimers,
    /// Ball the apex chain throws next when it has to restart
    chain_next: usize,
    events: Vec<JuggleEvent>,
    /// Simulated time since the last rebuild (s)
    elapsed: f32,
}

impl Juggler {
    /// Plan the pattern described by `settings` and seat a fresh ball set
    pub fn configure(settings: JugglingSettings) -> Result<Self> {
        let mut env = Environment::new(&settings);
        let plan = planner::plan(&env, &settings)?;
        env.place_hands(plan.range_px);

        let mut juggler = Self {
            settings,
            env,
            plan,
            balls: Vec::new(),
            timers: HandTimers::default(),
            chain_next: 0,
            events: Vec::new(),
            elapsed: 0.0,
        };
        juggler.rebuild();
        Ok(juggler)
    }

    /// Replace the settings. On error the running simulation is left untouched.
    pub fn reconfigure(&mut self, settings: JugglingSettings) -> Result<()> {
        *self = Self::configure(settings)?;
        Ok(())
    }

    pub fn plan(&self) -> &ThrowPlan {
        &self.plan
    }

    pub fn settings(&self) -> &JugglingSettings {
        &self.settings
    }

    pub fn environment(&self) -> &Environment {
        &self.env
    }

    pub fn strategy(&self) -> TriggerStrategy {
        self.settings.strategy
    }

    pub fn balls(&self) -> &[Ball] {
        &self.balls
    }

    pub fn timers(&self) -> HandTimers {
        self.timers
    }

    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    /// Events from the most recent tick (plus any manual throws since)
    pub fn events(&self) -> &[JuggleEvent] {
        &self.events
    }

    /// Hand positions on the floor line, if the host should mark them
    pub fn hand_markers(&self) -> Option<[Vec2; 2]> {
        if !self.settings.show_hand_markers {
            return None;
        }
        let floor = self.env.floor_y;
        Some([
            Vec2::new(self.env.hand_x(Hand::Left)?, floor),
            Vec2::new(self.env.hand_x(Hand::Right)?, floor),
        ])
    }

    /// Catch line y, if the host should draw it
    pub fn catch_line(&self) -> Option<f32> {
        self.settings.show_catch_line.then_some(self.env.floor_y)
    }

    /// Advance the simulation by `dt` seconds and return what to draw
    pub fn tick(&mut self, dt: f32) -> Vec<BallSprite> {
        self.events.clear();

        let dt = if !dt.is_finite() || dt < 0.0 {
            log::warn!("Ignoring invalid frame time {dt}");
            0.0
        } else if dt > MAX_FRAME_DT {
            log::debug!("Capping frame time {dt:.3}s to {MAX_FRAME_DT}s");
            MAX_FRAME_DT
        } else {
            dt
        };

        let mut remaining = dt;
        let mut substeps = 0;
        while remaining > 0.0 && substeps < MAX_SUBSTEPS {
            let step_dt = remaining.min(SIM_DT);
            remaining -= step_dt;
            self.step(step_dt);
            substeps += 1;
        }

        self.snapshot()
    }

    /// Current draw list without advancing time
    pub fn snapshot(&self) -> Vec<BallSprite> {
        self.balls
            .iter()
            .map(|ball| BallSprite {
                pos: ball.pos,
                radius: ball.radius * self.env.scaling_factor,
                color: ball.color,
            })
            .collect()
    }

    /// Put every ball back in its starting hand and restart the pattern
    pub fn on_reset_command(&mut self) {
        log::info!("Reset: reseating {} balls", self.balls.len());
        self.rebuild();
    }

    /// Add or remove balls (never fewer than one), replan and reseat.
    ///
    /// If the new count cannot be planned the error is returned and the
    /// current pattern keeps running with the old count.
    pub fn on_ball_count_delta(&mut self, delta: i32) -> Result<()> {
        let previous = self.env.ball_count();
        let requested = (i64::from(previous) + i64::from(delta)).clamp(1, i64::from(u32::MAX));
        self.env.set_ball_count(requested as u32);

        match planner::plan(&self.env, &self.settings) {
            Ok(plan) => {
                self.env.place_hands(plan.range_px);
                self.plan = plan;
                self.rebuild();
                Ok(())
            }
            Err(e) => {
                log::warn!("Cannot juggle {requested} balls: {e}");
                self.env.set_ball_count(previous);
                Err(e)
            }
        }
    }

    /// Throw the first ball resting in `hand`. Returns false if the hand is empty.
    pub fn on_throw_request(&mut self, hand: Hand) -> bool {
        self.throw_from(hand)
    }

    /// Discard all ball state and seat a fresh set, alternating hands from the left
    fn rebuild(&mut self) {
        let floor = self.env.floor_y;
        let palette = self.settings.palette;
        let radius = self.settings.ball_radius;
        let (left_x, right_x) = (self.plan.left_hand_x, self.plan.right_hand_x);

        self.balls = (0..self.env.ball_count())
            .map(|i| {
                let x = if i % 2 == 0 { left_x } else { right_x };
                Ball::new(
                    i,
                    ball_name(i),
                    Vec2::new(x, floor),
                    radius,
                    palette.color(i as usize),
                )
            })
            .collect();

        self.timers = HandTimers::staggered(self.plan.interval);
        self.chain_next = 0;
        self.events.clear();
        self.elapsed = 0.0;

        log::info!(
            "{}-ball cascade ({}): {:.2} m/s at {:.1}°, throw every {:.3}s, hands {:.0}px apart",
            self.balls.len(),
            self.settings.strategy.as_str(),
            self.plan.velocity,
            self.plan.angle_deg,
            self.plan.interval,
            self.plan.range_px,
        );
    }

    fn step(&mut self, dt: f32) {
        match self.settings.strategy {
            TriggerStrategy::Timed => self.run_timers(dt),
            TriggerStrategy::ApexChained => self.restart_stalled_chain(),
        }

        for ball in &mut self.balls {
            let was_airborne = ball.is_airborne();
            ball.update(&self.env, dt);
            if was_airborne && !ball.is_airborne() {
                let hand = self.env.side_of(ball.pos.x);
                log::debug!("Ball {} caught in {hand} hand", ball.name);
                self.events.push(JuggleEvent::Caught { ball: ball.id, hand });
            }
        }

        let count = self.balls.len();
        for i in 0..count {
            if !self.balls[i].detect_apex() {
                continue;
            }
            self.events.push(JuggleEvent::Apex {
                ball: self.balls[i].id,
            });
            if self.settings.strategy == TriggerStrategy::ApexChained {
                self.throw_in_chain((i + 1) % count);
            }
        }

        self.elapsed += dt;
    }

    /// Left hand first, so a tick where both timers expire is deterministic
    fn run_timers(&mut self, dt: f32) {
        for hand in [Hand::Left, Hand::Right] {
            let timer = self.timers.get_mut(hand);
            *timer += dt;
            if *timer < self.plan.interval {
                continue;
            }
            *timer = 0.0;
            if !self.throw_from(hand) {
                self.events.push(JuggleEvent::Missed { hand });
            }
        }
    }

    /// With every ball at rest nothing can reach an apex, so kick the chain
    fn restart_stalled_chain(&mut self) {
        if self.balls.is_empty() || self.balls.iter().any(Ball::is_airborne) {
            return;
        }
        let next = self.chain_next % self.balls.len();
        self.throw_in_chain(next);
    }

    fn throw_in_chain(&mut self, index: usize) {
        if self.throw_ball(index) {
            self.chain_next = (index + 1) % self.balls.len();
        } else {
            self.chain_next = index;
        }
    }

    fn throw_from(&mut self, hand: Hand) -> bool {
        let env = &self.env;
        let held = self
            .balls
            .iter()
            .position(|ball| ball.is_in_hand(env, hand) == Some(true));
        match held {
            Some(index) => self.throw_ball(index),
            None => false,
        }
    }

    fn throw_ball(&mut self, index: usize) -> bool {
        let ball = &mut self.balls[index];
        let from = self.env.side_of(ball.pos.x);
        if !ball.throw(&self.env, self.plan.velocity, self.plan.angle_deg) {
            return false;
        }
        log::debug!(
            "Ball {} thrown {from} -> {} at t={:.3}s",
            ball.name,
            from.opposite(),
            self.elapsed
        );
        self.events.push(JuggleEvent::Thrown { ball: ball.id, from });
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::MAX_BALLS;
    use crate::error::JuggleError;

    fn settings(ball_count: u32, dwell_ratio: f32, strategy: TriggerStrategy) -> JugglingSettings {
        JugglingSettings {
            gravity: 9.8,
            ball_count,
            dwell_ratio,
            strategy,
            ..Default::default()
        }
    }

    fn thrown_from(events: &[JuggleEvent], hand: Hand) -> Option<u32> {
        events.iter().find_map(|e| match *e {
            JuggleEvent::Thrown { ball, from } if from == hand => Some(ball),
            _ => None,
        })
    }

    #[test]
    fn test_configure_seats_balls_alternating() {
        let juggler = Juggler::configure(JugglingSettings::default()).unwrap();
        let env = juggler.environment();
        assert_eq!(juggler.balls().len(), 4);
        for (i, ball) in juggler.balls().iter().enumerate() {
            let hand = if i % 2 == 0 { Hand::Left } else { Hand::Right };
            assert_eq!(ball.is_in_hand(env, hand), Some(true), "ball {}", ball.name);
            assert_eq!(ball.pos.y, env.floor_y);
        }
        assert_eq!(juggler.balls()[2].name, "C");
        let left = env.left_hand_x.unwrap();
        let right = env.right_hand_x.unwrap();
        assert!((left + right - env.width).abs() < 1e-3);
    }

    #[test]
    fn test_configure_rejects_degenerate_pattern() {
        let err = Juggler::configure(settings(1, 0.66, TriggerStrategy::Timed)).unwrap_err();
        assert!(matches!(err, JuggleError::DegenerateInterval { .. }));
    }

    #[test]
    fn test_timed_throw_fires_when_timer_reaches_interval() {
        let mut juggler = Juggler::configure(settings(3, 0.66, TriggerStrategy::Timed)).unwrap();
        let interval = juggler.plan().interval;
        assert!((interval - 1.2147).abs() < 1e-3);

        let mut left_throws = 0;
        for _ in 0..400 {
            let due = juggler.timers().left + SIM_DT >= interval;
            let resting_left = juggler
                .balls()
                .iter()
                .any(|b| b.is_in_hand(juggler.environment(), Hand::Left) == Some(true));
            juggler.tick(SIM_DT);
            let thrown = thrown_from(juggler.events(), Hand::Left).is_some();
            assert_eq!(thrown, due && resting_left);
            if thrown {
                left_throws += 1;
                assert_eq!(juggler.timers().left, 0.0);
            }
        }
        assert!(left_throws >= 2);
    }

    #[test]
    fn test_first_throws_alternate_hands() {
        let mut juggler = Juggler::configure(settings(3, 0.66, TriggerStrategy::Timed)).unwrap();
        let mut order = Vec::new();
        while order.len() < 3 {
            juggler.tick(SIM_DT);
            for event in juggler.events() {
                if let JuggleEvent::Thrown { ball, from } = *event {
                    order.push((ball, from));
                }
            }
        }
        assert_eq!(order[0], (0, Hand::Left));
        assert_eq!(order[1], (1, Hand::Right));
        assert_eq!(order[2], (2, Hand::Left));
    }

    #[test]
    fn test_timer_with_empty_hand_is_a_miss() {
        let mut juggler = Juggler::configure(settings(1, 0.3, TriggerStrategy::Timed)).unwrap();
        juggler.timers.right = juggler.plan().interval;
        juggler.tick(SIM_DT);
        assert!(juggler.events().contains(&JuggleEvent::Missed { hand: Hand::Right }));
        assert_eq!(juggler.timers().right, 0.0);
        assert!(!juggler.balls()[0].is_airborne());
    }

    fn hand_events(events: &[JuggleEvent]) -> Vec<JuggleEvent> {
        events
            .iter()
            .copied()
            .filter(|e| matches!(e, JuggleEvent::Thrown { .. } | JuggleEvent::Missed { .. }))
            .collect()
    }

    #[test]
    fn test_both_timers_due_left_throws_first() {
        let mut juggler = Juggler::configure(settings(2, 0.3, TriggerStrategy::Timed)).unwrap();
        let interval = juggler.plan().interval;
        juggler.timers.left = interval;
        juggler.timers.right = interval;
        juggler.tick(SIM_DT);

        assert_eq!(
            hand_events(juggler.events()),
            vec![
                JuggleEvent::Thrown { ball: 0, from: Hand::Left },
                JuggleEvent::Thrown { ball: 1, from: Hand::Right },
            ]
        );
        assert_eq!(juggler.timers(), HandTimers { left: 0.0, right: 0.0 });
        assert!(juggler.balls().iter().all(Ball::is_airborne));
    }

    #[test]
    fn test_both_timers_due_with_one_ball_misses_right() {
        let mut juggler = Juggler::configure(settings(1, 0.3, TriggerStrategy::Timed)).unwrap();
        let interval = juggler.plan().interval;
        juggler.timers.left = interval;
        juggler.timers.right = interval;
        juggler.tick(SIM_DT);

        assert_eq!(
            hand_events(juggler.events()),
            vec![
                JuggleEvent::Thrown { ball: 0, from: Hand::Left },
                JuggleEvent::Missed { hand: Hand::Right },
            ]
        );
        assert_eq!(juggler.timers(), HandTimers { left: 0.0, right: 0.0 });
    }

    #[test]
    fn test_apex_chain_throws_next_ball() {
        let mut juggler =
            Juggler::configure(settings(3, 0.3, TriggerStrategy::ApexChained)).unwrap();
        juggler.tick(SIM_DT);
        assert_eq!(thrown_from(juggler.events(), Hand::Left), Some(0));

        let mut chained = false;
        for _ in 0..240 {
            juggler.tick(SIM_DT);
            if juggler.events().contains(&JuggleEvent::Apex { ball: 0 }) {
                assert_eq!(thrown_from(juggler.events(), Hand::Right), Some(1));
                chained = true;
                break;
            }
            assert!(!juggler.balls()[1].is_airborne());
        }
        assert!(chained);
        // Timers never drive the apex-chained strategy
        assert!(
            !juggler
                .events()
                .iter()
                .any(|e| matches!(e, JuggleEvent::Missed { .. }))
        );
    }

    #[test]
    fn test_apex_chain_single_ball_restarts_after_catch() {
        let mut juggler =
            Juggler::configure(settings(1, 0.3, TriggerStrategy::ApexChained)).unwrap();
        let mut throws = 0;
        for _ in 0..(120 * 5) {
            juggler.tick(SIM_DT);
            throws += juggler
                .events()
                .iter()
                .filter(|e| matches!(e, JuggleEvent::Thrown { .. }))
                .count();
        }
        assert!(throws >= 3, "only {throws} throws in 5s");
    }

    #[test]
    fn test_ball_count_delta_rebuilds() {
        let mut juggler = Juggler::configure(JugglingSettings::default()).unwrap();
        juggler.tick(0.1);
        juggler.tick(0.1);
        juggler.tick(0.1);
        juggler.tick(0.1);
        juggler.tick(0.1);
        assert!(juggler.balls().iter().any(Ball::is_airborne));
        let old_interval = juggler.plan().interval;

        juggler.on_ball_count_delta(1).unwrap();
        assert_eq!(juggler.balls().len(), 5);
        assert!(juggler.balls().iter().all(|b| !b.is_airborne()));
        assert!(juggler.plan().interval < old_interval);
        assert_eq!(juggler.elapsed(), 0.0);
    }

    #[test]
    fn test_ball_count_clamps_at_one() {
        let mut juggler = Juggler::configure(settings(2, 0.3, TriggerStrategy::Timed)).unwrap();
        juggler.on_ball_count_delta(-5).unwrap();
        assert_eq!(juggler.environment().ball_count(), 1);
        assert_eq!(juggler.balls().len(), 1);
        juggler.on_ball_count_delta(-1).unwrap();
        assert_eq!(juggler.balls().len(), 1);
    }

    #[test]
    fn test_unplannable_count_keeps_running_pattern() {
        let mut juggler = Juggler::configure(settings(2, 0.66, TriggerStrategy::Timed)).unwrap();
        let plan = *juggler.plan();
        let err = juggler.on_ball_count_delta(-1).unwrap_err();
        assert!(err.is_config_error());
        assert_eq!(juggler.environment().ball_count(), 2);
        assert_eq!(juggler.balls().len(), 2);
        assert_eq!(*juggler.plan(), plan);
    }

    #[test]
    fn test_ball_count_above_cap_is_rejected() {
        let mut juggler =
            Juggler::configure(settings(MAX_BALLS, 0.3, TriggerStrategy::Timed)).unwrap();
        let err = juggler.on_ball_count_delta(1).unwrap_err();
        assert!(matches!(err, JuggleError::InvalidParameter { name: "ball_count", .. }));
        assert_eq!(juggler.environment().ball_count(), MAX_BALLS);
        assert_eq!(juggler.balls().len(), MAX_BALLS as usize);
    }

    #[test]
    fn test_reset_reseats_all_balls() {
        let mut juggler = Juggler::configure(JugglingSettings::default()).unwrap();
        for _ in 0..20 {
            juggler.tick(0.05);
        }
        juggler.on_reset_command();
        for ball in juggler.balls() {
            assert!(!ball.is_airborne());
            assert_eq!(ball.pos, ball.rest_pos);
        }
        assert_eq!(juggler.timers().right, 0.0);
        assert!((juggler.timers().left - juggler.plan().interval / 2.0).abs() < 1e-6);
    }

    #[test]
    fn test_manual_throw_request() {
        let mut juggler = Juggler::configure(settings(3, 0.3, TriggerStrategy::Timed)).unwrap();
        assert!(juggler.on_throw_request(Hand::Left));
        assert!(juggler.balls()[0].is_airborne());
        assert!(juggler.on_throw_request(Hand::Left));
        assert!(juggler.balls()[2].is_airborne());
        // Left hand is now empty
        assert!(!juggler.on_throw_request(Hand::Left));
        let hand: Hand = "RIGHT".parse().unwrap();
        assert!(juggler.on_throw_request(hand));
    }

    #[test]
    fn test_frame_time_is_clamped() {
        let mut juggler = Juggler::configure(JugglingSettings::default()).unwrap();
        let before = juggler.snapshot();
        assert_eq!(juggler.tick(-1.0), before);
        assert_eq!(juggler.tick(f32::NAN), before);
        assert_eq!(juggler.elapsed(), 0.0);

        juggler.tick(10.0);
        assert!((juggler.elapsed() - MAX_FRAME_DT).abs() < 1e-4);
    }

    #[test]
    fn test_snapshot_sprites() {
        let juggler = Juggler::configure(JugglingSettings::default()).unwrap();
        let sprites = juggler.snapshot();
        assert_eq!(sprites.len(), 4);
        assert!((sprites[0].radius - 12.0).abs() < 1e-4);
        assert_eq!(sprites[1].color, [0, 0, 255]);
        assert!(juggler.hand_markers().is_some());
        assert_eq!(juggler.catch_line(), None);
    }

    #[test]
    fn test_reconfigure_failure_keeps_state() {
        let mut juggler = Juggler::configure(JugglingSettings::default()).unwrap();
        juggler.tick(0.1);
        let elapsed = juggler.elapsed();
        assert!(juggler.reconfigure(settings(1, 0.9, TriggerStrategy::Timed)).is_err());
        assert_eq!(juggler.balls().len(), 4);
        assert_eq!(juggler.elapsed(), elapsed);

        juggler
            .reconfigure(settings(5, 0.3, TriggerStrategy::ApexChained))
            .unwrap();
        assert_eq!(juggler.balls().len(), 5);
        assert_eq!(juggler.strategy(), TriggerStrategy::ApexChained);
    }

    #[test]
    fn test_long_run_stays_consistent() {
        for strategy in [TriggerStrategy::Timed, TriggerStrategy::ApexChained] {
            let mut juggler = Juggler::configure(JugglingSettings {
                strategy,
                ..Default::default()
            })
            .unwrap();
            let mut catches = 0;
            for frame in 0..(60 * 30) {
                // Uneven frame times, as a real host would supply
                let dt = if frame % 7 == 0 { 1.0 / 30.0 } else { 1.0 / 60.0 };
                let sprites = juggler.tick(dt);
                let floor = juggler.environment().floor_y;
                assert!(sprites.iter().all(|s| s.pos.y <= floor));
                for ball in juggler.balls() {
                    if ball.is_airborne() {
                        assert_eq!(ball.is_in_hand(juggler.environment(), Hand::Left), None);
                    }
                }
                catches += juggler
                    .events()
                    .iter()
                    .filter(|e| matches!(e, JuggleEvent::Caught { .. }))
                    .count();
            }
            assert!(catches > 10, "{strategy:?}: only {catches} catches");
        }
    }

    #[test]
    fn test_ball_names() {
        assert_eq!(ball_name(0), "A");
        assert_eq!(ball_name(25), "Z");
        assert_eq!(ball_name(26), "A1");
    }
}
