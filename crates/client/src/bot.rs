use std::f32::consts::TAU;

use glam::Vec3;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use skirmish::{AmmoIndicator, Game, InputFlags, PlayerInput};

/// Component threshold for turning a direction into WASD flags.
const STEER_THRESHOLD: f32 = 0.38;

#[derive(Debug, Clone)]
pub struct BotConfig {
    pub engage_range: f32,
    pub keep_distance: f32,
    pub wander_interval: f32,
    pub switch_chance: f64,
    pub bounds_margin: f32,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            engage_range: 25.0,
            keep_distance: 6.0,
            wander_interval: 2.0,
            switch_chance: 0.2,
            bounds_margin: 4.0,
        }
    }
}

/// Produces player input from what the local game currently sees.
pub struct Bot {
    config: BotConfig,
    rng: StdRng,
    heading: f32,
    wander_timer: f32,
    previous: InputFlags,
}

impl Bot {
    pub fn new(config: BotConfig, seed: u64) -> Self {
        Self {
            config,
            rng: StdRng::seed_from_u64(seed),
            heading: 0.0,
            wander_timer: 0.0,
            previous: InputFlags::empty(),
        }
    }

    pub fn think(&mut self, game: &Game, delta: f32) -> PlayerInput {
        let player = game.player();
        if player.is_dead() {
            self.previous = InputFlags::empty();
            return PlayerInput::default();
        }

        let position = player.position();
        let indicator = game.ammo_indicator();

        let (flags, aim) = match self.nearest_target(game, position) {
            Some(target) => {
                let offset = target - position;
                let mut flags = weapon_flags(indicator);
                if offset.length() > self.config.keep_distance {
                    flags |= steer(offset);
                }
                (flags, aim_at(offset))
            }
            None => {
                let (heading, mut flags) = self.wander(game, position, delta);
                flags |= steer(Vec3::new(heading.sin(), 0.0, heading.cos()));
                if indicator == AmmoIndicator::Reload {
                    flags |= InputFlags::RELOAD;
                }
                (flags, heading)
            }
        };

        PlayerInput::new(self.release_repeats(flags), aim)
    }

    fn nearest_target(&self, game: &Game, position: Vec3) -> Option<Vec3> {
        game.remotes()
            .players()
            .filter(|remote| !remote.is_dead())
            .map(|remote| remote.transform.rendered_position)
            .filter(|target| target.distance(position) <= self.config.engage_range)
            .min_by(|a, b| a.distance(position).total_cmp(&b.distance(position)))
    }

    fn wander(&mut self, game: &Game, position: Vec3, delta: f32) -> (f32, InputFlags) {
        let mut flags = InputFlags::empty();
        self.wander_timer -= delta;

        let limit = game.arena().half_size() - self.config.bounds_margin;
        if position.x.abs() > limit || position.z.abs() > limit {
            self.heading = aim_at(-position);
            self.wander_timer = self.config.wander_interval;
        } else if self.wander_timer <= 0.0 {
            self.heading = self.rng.gen_range(0.0..TAU);
            self.wander_timer = self.config.wander_interval;
            if self.rng.gen_bool(self.config.switch_chance) {
                flags |= InputFlags::NEXT_WEAPON;
            }
        }

        (self.heading, flags)
    }

    /// Edge-triggered keys must be let go for a frame before they act again.
    fn release_repeats(&mut self, flags: InputFlags) -> InputFlags {
        let repeated = flags & self.previous & InputFlags::EDGE_TRIGGERED;
        let flags = flags.difference(repeated);
        self.previous = flags;
        flags
    }
}

fn weapon_flags(indicator: AmmoIndicator) -> InputFlags {
    match indicator {
        AmmoIndicator::Ready { .. } => InputFlags::FIRE,
        AmmoIndicator::Reload => InputFlags::RELOAD,
        AmmoIndicator::NoAmmo | AmmoIndicator::Unarmed => InputFlags::NEXT_WEAPON,
        AmmoIndicator::Reloading => InputFlags::empty(),
    }
}

/// Rotation whose forward vector points along `offset` on the ground plane.
fn aim_at(offset: Vec3) -> f32 {
    offset.x.atan2(offset.z)
}

fn steer(direction: Vec3) -> InputFlags {
    let direction = Vec3::new(direction.x, 0.0, direction.z).normalize_or_zero();
    let mut flags = InputFlags::empty();
    if direction.z > STEER_THRESHOLD {
        flags |= InputFlags::FORWARD;
    } else if direction.z < -STEER_THRESHOLD {
        flags |= InputFlags::BACKWARD;
    }
    if direction.x > STEER_THRESHOLD {
        flags |= InputFlags::RIGHT;
    } else if direction.x < -STEER_THRESHOLD {
        flags |= InputFlags::LEFT;
    }
    flags
}

#[cfg(test)]
mod tests {
    use std::f32::consts::FRAC_PI_2;
    use std::rc::Rc;

    use serde_json::json;
    use skirmish::net::protocol::{PLAYER_POSITION, USER_WELCOME};
    use skirmish::{Arena, GameConfig, ManualClock};

    use super::*;

    fn game() -> Game {
        let clock = ManualClock::new(10_000);
        let mut game = Game::with_seed(GameConfig::default(), Rc::new(clock), Arena::empty(40.0), 3);
        game.handle_inbound(USER_WELCOME, &json!({ "userId": "me" }));
        game
    }

    fn place(game: &mut Game, peer: &str, x: f32, z: f32) {
        game.handle_inbound(
            PLAYER_POSITION,
            &json!({ "userId": peer, "position": { "x": x, "y": 1.0, "z": z }, "rotation": 0.0 }),
        );
    }

    #[test]
    fn engages_the_nearest_peer() {
        let mut game = game();
        place(&mut game, "near", 0.0, 10.0);
        place(&mut game, "far", 20.0, 0.0);
        for _ in 0..60 {
            game.update(&PlayerInput::default(), 1.0 / 60.0);
        }

        let mut bot = Bot::new(BotConfig::default(), 1);
        let input = bot.think(&game, 1.0 / 60.0);

        assert!(input.aim_rotation.abs() < 0.05);
        assert!(input.flags.contains(InputFlags::FIRE));
        assert!(input.flags.contains(InputFlags::FORWARD));
    }

    #[test]
    fn reload_key_is_released_between_presses() {
        let mut game = game();
        game.player_mut().weapons_mut().sync_ammo(Some(0), Some(60));
        assert_eq!(game.ammo_indicator(), AmmoIndicator::Reload);

        let mut bot = Bot::new(BotConfig::default(), 1);
        let pressed: Vec<bool> = (0..3)
            .map(|_| bot.think(&game, 0.016).flags.contains(InputFlags::RELOAD))
            .collect();

        assert_eq!(pressed, vec![true, false, true]);
    }

    #[test]
    fn turns_back_from_the_walls() {
        let mut game = game();
        game.player_mut().set_position(Vec3::new(39.0, 1.0, 0.0));

        let mut bot = Bot::new(BotConfig::default(), 1);
        let input = bot.think(&game, 0.016);

        assert!((input.aim_rotation + FRAC_PI_2).abs() < 1e-3);
        assert!(input.flags.contains(InputFlags::LEFT));
        assert!(!input.flags.contains(InputFlags::RIGHT));
    }

    #[test]
    fn steering_maps_diagonals_to_two_keys() {
        let flags = steer(Vec3::new(1.0, 5.0, 1.0));
        assert_eq!(flags, InputFlags::FORWARD | InputFlags::RIGHT);
        assert_eq!(steer(Vec3::ZERO), InputFlags::empty());
    }
}
