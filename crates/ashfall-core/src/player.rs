//! Player sickness model.
//!
//! Unlike NPCs, the player's fate is not pre-computed: at every sickness
//! checkpoint (5:00 and 10:00 on the round timer) a fresh roll decides
//! whether the player falls sick, with odds depending on how well they
//! protected themselves this round. A sick player's health sinks to a
//! floor and climbs back; a bath in contaminated water causes a milder
//! curve of its own.
//!
//! The host feeds in the round clock and the player's protective behaviour
//! each frame and reads health and sickness state back; nothing here
//! touches rendering or input.

use rand::rngs::SmallRng;
use rand::Rng;

use ashfall_events::FIRST_SICKNESS_ROUND;

use crate::config::{Config, PlayerConfig};
use crate::schedule::LATE_PHASE_ROUND;

/// Protective behaviour the player showed in the current round.
#[derive(Debug, Clone, Copy, Default)]
pub struct Protection {
    /// Whether the player bathed this round.
    pub took_bath: bool,
    /// Seconds of goggle wear since the last checkpoint.
    pub goggle_time: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum State {
    Healthy,
    Sick,
    BathSick { since: f32 },
}

/// The player's sickness state machine for one session.
#[derive(Debug, Clone)]
pub struct PlayerSickness {
    config: PlayerConfig,
    sick_interval: f32,
    checkpoint_count: u32,
    state: State,
    hp: f32,
}

impl PlayerSickness {
    pub fn new(config: &Config) -> Self {
        Self {
            config: config.player.clone(),
            sick_interval: config.sickness.sick_interval,
            checkpoint_count: 0,
            state: State::Healthy,
            hp: config.player.max_hp,
        }
    }

    /// Current health.
    pub fn hp(&self) -> f32 {
        self.hp
    }

    pub fn is_sick(&self) -> bool {
        self.state == State::Sick
    }

    pub fn is_bath_sick(&self) -> bool {
        matches!(self.state, State::BathSick { .. })
    }

    /// Resets the per-round checkpoint counter. Call when a round starts.
    pub fn begin_round(&mut self) {
        self.checkpoint_count = 0;
        self.recover();
    }

    /// Clears any sickness and restores full health.
    pub fn recover(&mut self) {
        self.state = State::Healthy;
        self.hp = self.config.max_hp;
    }

    /// Starts the milder bath-sickness curve at `elapsed` seconds into the
    /// round. Triggered by the host when the player bathes in bad water.
    pub fn start_bath_sickness(&mut self, elapsed: f32) {
        self.state = State::BathSick { since: elapsed };
    }

    /// The probability of falling sick at the next checkpoint.
    ///
    /// Zero before the sickness phase and before the first checkpoint of a
    /// round; otherwise looked up by (bath, goggles) and halved-ish once
    /// the late phase begins.
    pub fn sickness_likelihood(&self, round: u32, elapsed: f32, protection: Protection) -> f64 {
        if round < FIRST_SICKNESS_ROUND || elapsed < self.sick_interval {
            return 0.0;
        }
        let goggles = protection.goggle_time >= self.config.min_goggle_time;
        let late = round >= LATE_PHASE_ROUND;
        match (protection.took_bath, goggles) {
            (false, false) => {
                if late {
                    0.7
                } else {
                    0.9
                }
            }
            (true, false) => {
                if late {
                    0.3
                } else {
                    0.5
                }
            }
            (false, true) => {
                if late {
                    0.5
                } else {
                    0.7
                }
            }
            (true, true) => 0.1,
        }
    }

    /// Per-frame update against the round clock.
    ///
    /// Rolls at each checkpoint the timer crosses, then moves health along
    /// whichever sickness curve is active.
    pub fn update(&mut self, round: u32, elapsed: f32, protection: Protection, rng: &mut SmallRng) {
        let cfg = self.config.clone();

        if let State::BathSick { since } = self.state {
            let t = elapsed - since;
            if t < cfg.bath_decline {
                self.hp = cfg.max_hp - (cfg.max_hp - cfg.bath_min_hp) * t / cfg.bath_decline;
            } else if t <= cfg.bath_duration {
                self.hp = cfg.bath_min_hp
                    + (cfg.max_hp - cfg.bath_min_hp) * (t - cfg.bath_decline) / cfg.bath_incline;
            } else {
                self.recover();
            }
        }

        // at 5:00 and 10:00 determine whether the player falls sick
        if elapsed >= self.sick_interval * (self.checkpoint_count + 1) as f32 {
            self.checkpoint_count += 1;
            let likelihood = self.sickness_likelihood(round, elapsed, protection);
            if rng.gen::<f64>() < likelihood {
                self.state = State::Sick;
            }
        }

        // a sick player declines, climbs back, and recovers after a while
        if self.state == State::Sick {
            if elapsed >= self.sick_interval * self.checkpoint_count as f32 + cfg.sick_duration {
                self.recover();
            } else {
                let t = elapsed % self.sick_interval;
                if t < cfg.sick_decline {
                    self.hp = cfg.max_hp - (cfg.max_hp - cfg.sick_min_hp) * t / cfg.sick_decline;
                } else {
                    self.hp = cfg.sick_min_hp
                        + (cfg.max_hp - cfg.sick_min_hp) * (t - cfg.sick_decline) / cfg.sick_incline;
                }
                self.hp = self.hp.min(cfg.max_hp);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn player() -> PlayerSickness {
        PlayerSickness::new(&Config::default())
    }

    #[test]
    fn test_likelihood_is_zero_before_the_sickness_phase() {
        let player = player();
        let unprotected = Protection::default();
        assert_eq!(player.sickness_likelihood(6, 400.0, unprotected), 0.0);
        assert_eq!(player.sickness_likelihood(7, 200.0, unprotected), 0.0);
    }

    #[test]
    fn test_likelihood_table() {
        let player = player();
        let protection = |bath, goggle_time| Protection {
            took_bath: bath,
            goggle_time,
        };
        assert_eq!(player.sickness_likelihood(7, 300.0, protection(false, 0.0)), 0.9);
        assert_eq!(player.sickness_likelihood(10, 300.0, protection(false, 0.0)), 0.7);
        assert_eq!(player.sickness_likelihood(7, 300.0, protection(true, 0.0)), 0.5);
        assert_eq!(player.sickness_likelihood(10, 300.0, protection(true, 0.0)), 0.3);
        assert_eq!(player.sickness_likelihood(7, 300.0, protection(false, 200.0)), 0.7);
        assert_eq!(player.sickness_likelihood(10, 300.0, protection(false, 200.0)), 0.5);
        assert_eq!(player.sickness_likelihood(7, 300.0, protection(true, 200.0)), 0.1);
        assert_eq!(player.sickness_likelihood(12, 300.0, protection(true, 200.0)), 0.1);
    }

    #[test]
    fn test_short_goggle_wear_does_not_protect() {
        let player = player();
        let protection = Protection {
            took_bath: false,
            goggle_time: 100.0, // below min_goggle_time
        };
        assert_eq!(player.sickness_likelihood(7, 300.0, protection), 0.9);
    }

    #[test]
    fn test_no_sickness_rolls_before_round_seven() {
        let mut player = player();
        let mut rng = SmallRng::seed_from_u64(1);
        for step in 0..200 {
            player.update(6, step as f32 * 5.0, Protection::default(), &mut rng);
        }
        assert!(!player.is_sick());
        assert_eq!(player.hp(), 100.0);
    }

    #[test]
    fn test_unprotected_player_gets_sick_eventually() {
        // p = 0.9 per checkpoint; forty seeds without one sickness would
        // mean the roll is broken
        let sickened = (0..40).any(|seed| {
            let mut player = player();
            let mut rng = SmallRng::seed_from_u64(seed);
            player.update(7, 301.0, Protection::default(), &mut rng);
            player.is_sick()
        });
        assert!(sickened);
    }

    #[test]
    fn test_sick_hp_declines_then_climbs() {
        let mut player = player();
        let mut rng = SmallRng::seed_from_u64(0);
        // roll until a seed sickens the player right at the checkpoint
        for seed in 0..100 {
            rng = SmallRng::seed_from_u64(seed);
            player = self::player();
            player.update(7, 300.0, Protection::default(), &mut rng);
            if player.is_sick() {
                break;
            }
        }
        assert!(player.is_sick());

        player.update(7, 360.0, Protection::default(), &mut rng);
        let declining = player.hp();
        assert!(declining < 100.0);

        player.update(7, 420.0, Protection::default(), &mut rng);
        assert!(player.hp() < declining, "still declining before the floor");

        player.update(7, 480.0, Protection::default(), &mut rng);
        assert!(player.hp() > 20.0, "climbing back after the floor");
    }

    #[test]
    fn test_sick_player_recovers_after_duration() {
        let mut player = player();
        let mut rng = SmallRng::seed_from_u64(0);
        for seed in 0..100 {
            rng = SmallRng::seed_from_u64(seed);
            player = self::player();
            player.update(7, 300.0, Protection::default(), &mut rng);
            if player.is_sick() {
                break;
            }
        }
        assert!(player.is_sick());

        // still sick just before the 9:00 mark
        player.update(7, 535.0, Protection::default(), &mut rng);
        assert!(player.is_sick());

        // recovery lands at checkpoint + 240 seconds, i.e. 9:00
        player.update(7, 545.0, Protection::default(), &mut rng);
        assert!(!player.is_sick());
        assert_eq!(player.hp(), 100.0);
    }

    #[test]
    fn test_bath_sickness_curve_and_recovery() {
        let mut player = player();
        let mut rng = SmallRng::seed_from_u64(3);
        player.start_bath_sickness(10.0);

        player.update(7, 40.0, Protection::default(), &mut rng);
        assert!(player.is_bath_sick());
        assert!(player.hp() < 100.0 && player.hp() > 50.0);

        player.update(7, 70.0, Protection::default(), &mut rng);
        assert_eq!(player.hp(), 50.0); // bottom of the curve

        player.update(7, 100.0, Protection::default(), &mut rng);
        assert!(player.hp() > 50.0);

        player.update(7, 140.0, Protection::default(), &mut rng);
        assert!(!player.is_bath_sick());
        assert_eq!(player.hp(), 100.0);
    }

    #[test]
    fn test_begin_round_resets_checkpoints() {
        let mut player = player();
        let mut rng = SmallRng::seed_from_u64(5);
        player.update(7, 610.0, Protection::default(), &mut rng);
        player.begin_round();
        assert!(!player.is_sick());
        assert_eq!(player.hp(), 100.0);
    }
}
