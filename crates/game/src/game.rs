use std::rc::Rc;

use glam::Vec3;
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde_json::Value;

use crate::combat::{IncomingShotTargets, LocalShotTargets};
use crate::effects::{EffectsScheduler, ImpactEffect};
use crate::event::{CombatEvent, CombatKind, FlushReport, GameEvent, Outbox, Transport};
use crate::hud::{AmmoIndicator, NotificationIcon, Notifications};
use crate::map::Arena;
use crate::net::{InboundEvent, NetConfig, Networked, PeerId, decode};
use crate::pickup::{Collected, PickupField};
use crate::player::{InputOutcome, LocalPlayer, PlayerConfig, PlayerInput};
use crate::remote::{RemoteConfig, RemotePlayerRegistry};
use crate::scene::{SceneEvent, SceneQueue};
use crate::time::{Clock, FixedInterval};
use crate::weapon::forward;

#[derive(Debug, Clone, Default)]
pub struct GameConfig {
    pub net: NetConfig,
    pub remote: RemoteConfig,
    pub player: PlayerConfig,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GameStats {
    pub inbound_applied: u64,
    pub inbound_dropped: u64,
    pub events_flushed: u64,
    pub payloads_sent: u64,
    pub bullets_fired: u64,
    pub hits_dealt: u64,
    pub pickups_collected: u64,
}

#[derive(Debug, Default)]
pub struct FrameReport {
    pub input: InputOutcome,
    pub collected: Vec<Collected>,
    pub hits: Vec<PeerId>,
    pub impacts: usize,
    pub damage_taken: i32,
}

/// One client's view of the match. The host feeds it input, inbound events
/// and frame time, and drains its scene and notification queues.
pub struct Game {
    config: GameConfig,
    clock: Rc<dyn Clock>,
    outbox: Outbox,
    scene: SceneQueue,
    notifications: Notifications,
    effects: EffectsScheduler,
    arena: Arena,
    player: LocalPlayer,
    remotes: RemotePlayerRegistry,
    pickups: PickupField,
    flush_timer: FixedInterval,
    position_timer: FixedInterval,
    stats: GameStats,
}

impl Game {
    pub fn new(config: GameConfig, clock: Rc<dyn Clock>) -> Self {
        Self::build(config, clock, Arena::new(), StdRng::from_entropy())
    }

    pub fn with_seed(config: GameConfig, clock: Rc<dyn Clock>, arena: Arena, seed: u64) -> Self {
        Self::build(config, clock, arena, StdRng::seed_from_u64(seed))
    }

    fn build(config: GameConfig, clock: Rc<dyn Clock>, arena: Arena, rng: StdRng) -> Self {
        let outbox = Outbox::new(Rc::clone(&clock));
        let scene = SceneQueue::new();
        let notifications = Notifications::new();
        let mut effects = EffectsScheduler::new();

        let player = LocalPlayer::new(config.player.clone(), outbox.emitter(), scene.clone());
        let remotes = RemotePlayerRegistry::with_rng(
            config.remote.clone(),
            outbox.emitter(),
            scene.clone(),
            notifications.clone(),
            Rc::clone(&clock),
            rng,
        );

        let mut pickups = PickupField::new(scene.clone());
        for (position, kind) in arena.ammo_spawns() {
            pickups.spawn(kind.clone(), *position, &mut effects);
        }

        Self {
            flush_timer: FixedInterval::from_millis(config.net.flush_interval_ms),
            position_timer: FixedInterval::from_millis(config.net.position_interval_ms),
            config,
            clock,
            outbox,
            scene,
            notifications,
            effects,
            arena,
            player,
            remotes,
            pickups,
            stats: GameStats::default(),
        }
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn local_id(&self) -> &str {
        self.player.id()
    }

    pub fn player(&self) -> &LocalPlayer {
        &self.player
    }

    pub fn player_mut(&mut self) -> &mut LocalPlayer {
        &mut self.player
    }

    pub fn remotes(&self) -> &RemotePlayerRegistry {
        &self.remotes
    }

    pub fn arena(&self) -> &Arena {
        &self.arena
    }

    pub fn pickups(&self) -> &PickupField {
        &self.pickups
    }

    pub fn effects(&self) -> &EffectsScheduler {
        &self.effects
    }

    pub fn outbox(&self) -> &Outbox {
        &self.outbox
    }

    pub fn scene(&self) -> &SceneQueue {
        &self.scene
    }

    pub fn notifications(&self) -> &Notifications {
        &self.notifications
    }

    pub fn stats(&self) -> GameStats {
        self.stats
    }

    pub fn ammo_indicator(&self) -> AmmoIndicator {
        AmmoIndicator::for_slot(self.player.weapons().current())
    }

    /// Decodes and applies one inbound delivery. Returns how many events
    /// were applied; malformed ones are logged and dropped.
    pub fn handle_inbound(&mut self, event_name: &str, payload: &Value) -> usize {
        let mut applied = 0;
        for result in decode(event_name, payload) {
            match result {
                Ok(event) => {
                    self.apply(event);
                    applied += 1;
                }
                Err(reason) => {
                    log::warn!("Dropped inbound event: {}", reason);
                    self.stats.inbound_dropped += 1;
                }
            }
        }
        self.stats.inbound_applied += applied as u64;
        applied
    }

    pub fn apply(&mut self, event: InboundEvent) {
        if !matches!(event, InboundEvent::Welcome { .. }) && event.peer_id() == self.player.id() {
            log::debug!("Ignoring own event relayed back");
            return;
        }

        match event {
            InboundEvent::Welcome { peer_id } => {
                log::info!("Assigned id {}", peer_id);
                self.player.set_id(peer_id);
            }
            InboundEvent::Connected { peer_id } => {
                self.remotes.connect(&peer_id);
            }
            InboundEvent::Disconnected { peer_id } => {
                self.remotes.disconnect(&peer_id);
            }
            InboundEvent::Position {
                peer_id,
                position,
                rotation,
            } => {
                self.remotes.position_update(&peer_id, position, rotation);
            }
            InboundEvent::WeaponSwitch {
                peer_id,
                weapon_type,
                ammo,
                total_ammo,
            } => {
                self.remotes
                    .weapon_switch(&peer_id, &weapon_type, ammo, total_ammo);
            }
            InboundEvent::WeaponShoot {
                peer_id,
                position,
                direction,
                ammo,
                total_ammo,
            } => {
                self.remotes
                    .weapon_shoot(&peer_id, position, direction, ammo, total_ammo);
            }
            InboundEvent::WeaponReload {
                peer_id,
                weapon_type,
                ammo,
                total_ammo,
            } => {
                self.remotes
                    .weapon_reload(&peer_id, &weapon_type, ammo, total_ammo);
            }
            InboundEvent::WeaponPickup {
                peer_id,
                weapon_type,
                ammo,
                total_ammo,
            } => {
                self.remotes
                    .weapon_pickup(&peer_id, &weapon_type, ammo, total_ammo);
            }
            InboundEvent::WeaponDrop {
                peer_id,
                weapon_type,
                ammo,
                total_ammo,
            } => {
                self.remotes
                    .weapon_drop(&peer_id, &weapon_type, ammo, total_ammo);
            }
            InboundEvent::Combat { peer_id, event } => self.apply_combat(&peer_id, event),
        }
    }

    fn apply_combat(&mut self, peer_id: &str, event: CombatEvent) {
        match event.kind {
            CombatKind::Hit | CombatKind::Damage => {
                // Damage is applied where the bullet was simulated; this is a report.
                log::debug!(
                    "{} reports {:?} {} -> {} ({:?})",
                    peer_id,
                    event.kind,
                    event.source_id,
                    event.target_id,
                    event.damage
                );
            }
            CombatKind::Kill => {
                let killer = if event.source_id == self.player.id() {
                    "You".to_string()
                } else {
                    event.source_id.clone()
                };
                self.notifications.show(
                    format!("kill-{}", event.target_id),
                    "Elimination",
                    format!("{} eliminated {}", killer, event.target_id),
                    NotificationIcon::Kill,
                );
            }
        }
    }

    /// Advances one frame of local simulation.
    pub fn update(&mut self, input: &PlayerInput, delta: f32) -> FrameReport {
        let now = self.clock.now_secs();
        let health_before = self.player.health();

        let outcome = self.player.apply_input(input, delta, now);
        let clamped = self.arena.clamp_to_bounds(self.player.position());
        self.player.set_position(clamped);
        self.player.weapons_mut().poll_reload(now);
        self.stats.bullets_fired += outcome.bullets_fired as u64;

        if let Some(dropped) = outcome.dropped.clone() {
            let ahead = forward(self.player.rotation()) * self.config.player.pickup_radius * 2.0;
            let position = self.arena.clamp_to_bounds(self.player.position() + ahead);
            self.pickups.spawn(dropped.into(), position, &mut self.effects);
        }

        let collected = self.pickups.collect_near(
            self.player.position(),
            self.config.player.pickup_radius,
            self.player.weapons_mut(),
            &mut self.effects,
            outcome.interact,
        );
        self.stats.pickups_collected += collected.len() as u64;

        let mut targets = LocalShotTargets::new(&self.arena, &mut self.remotes);
        let mut impacts = self.player.weapons_mut().update_bullets(delta, &mut targets);
        let hits = targets.into_hits();
        self.report_hits(&hits);

        let mut incoming = IncomingShotTargets::new(
            &self.arena,
            &mut self.player,
            self.config.remote.player_half_width,
            self.config.remote.bullet_damage,
        );
        impacts.extend(self.remotes.update(delta, &mut incoming));

        let damage_taken = health_before - self.player.health();
        if damage_taken > 0 {
            self.report_damage_taken(health_before);
        }

        for position in &impacts {
            self.effects.register(ImpactEffect::new(*position));
            self.scene.push(SceneEvent::ImpactSpawned {
                position: *position,
            });
        }
        self.effects.update(delta);

        FrameReport {
            input: outcome,
            collected,
            hits: hits.into_iter().map(|(peer_id, _)| peer_id).collect(),
            impacts: impacts.len(),
            damage_taken,
        }
    }

    fn report_hits(&mut self, hits: &[(PeerId, Vec3)]) {
        let weapon_type = self.player.weapons().current_kind().name().to_string();
        for (peer_id, position) in hits {
            self.stats.hits_dealt += 1;
            self.player.emit(GameEvent::Combat(CombatEvent {
                kind: CombatKind::Hit,
                source_id: self.player.id().to_string(),
                target_id: peer_id.clone(),
                damage: Some(self.config.remote.bullet_damage),
                weapon_type: Some(weapon_type.clone()),
                position: Some((*position).into()),
            }));
        }
    }

    fn report_damage_taken(&mut self, health_before: i32) {
        let health = self.player.health();
        self.notifications.show(
            "hit-local",
            "You were hit",
            format!("Health {}", health),
            NotificationIcon::Hit,
        );
        if health_before > 0 && health == 0 {
            self.notifications.show(
                "death-local",
                "You were eliminated",
                "",
                NotificationIcon::Death,
            );
        }
    }

    /// Drives the position broadcast and outbox flush timers.
    pub fn tick_network(&mut self, delta: f32, transport: &mut dyn Transport) -> Option<FlushReport> {
        self.position_timer.accumulate(delta);
        if self.position_timer.consume_all() {
            self.player.broadcast_position();
        }

        self.flush_timer.accumulate(delta);
        if !self.flush_timer.consume_all() {
            return None;
        }
        Some(self.flush(transport))
    }

    /// Flushes immediately, outside the regular cadence.
    pub fn flush(&mut self, transport: &mut dyn Transport) -> FlushReport {
        let report = self.outbox.flush(transport);
        self.stats.events_flushed += report.events as u64;
        self.stats.payloads_sent += report.groups as u64;
        report
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::event::RecordingTransport;
    use crate::net::protocol::{PLAYER_POSITION, USER_CONNECTED, USER_WELCOME, WEAPON_SHOOT};
    use crate::player::InputFlags;
    use crate::time::ManualClock;

    fn game() -> (ManualClock, Game) {
        let clock = ManualClock::new(10_000);
        let game = Game::with_seed(
            GameConfig::default(),
            Rc::new(clock.clone()),
            Arena::empty(40.0),
            3,
        );
        (clock, game)
    }

    #[test]
    fn welcome_assigns_local_id() {
        let (_clock, mut game) = game();
        game.handle_inbound(USER_WELCOME, &json!({ "userId": "me" }));
        assert_eq!(game.local_id(), "me");

        game.handle_inbound(USER_CONNECTED, &json!({ "userId": "me" }));
        assert!(game.remotes().is_empty());
    }

    #[test]
    fn malformed_events_are_counted_and_dropped() {
        let (_clock, mut game) = game();
        let applied = game.handle_inbound(
            WEAPON_SHOOT,
            &json!({ "userId": "a", "data": { "direction": { "x": 1.0, "y": 0.0, "z": 0.0 } } }),
        );

        assert_eq!(applied, 0);
        assert_eq!(game.stats().inbound_dropped, 1);
        assert!(game.remotes().is_empty());
    }

    #[test]
    fn network_tick_broadcasts_then_flushes() {
        let (clock, mut game) = game();
        let mut transport = RecordingTransport::new();

        assert!(game.tick_network(0.05, &mut transport).is_none());
        clock.advance(60);
        let report = game.tick_network(0.06, &mut transport).expect("flush due");

        assert_eq!(report.events, 1);
        assert_eq!(transport.sends_for(PLAYER_POSITION).len(), 1);
        assert!(game.outbox().is_empty());
    }

    #[test]
    fn local_bullet_damages_remote_and_reports_hit() {
        let (clock, mut game) = game();
        game.handle_inbound(USER_WELCOME, &json!({ "userId": "me" }));
        game.handle_inbound(
            PLAYER_POSITION,
            &json!({ "userId": "target", "position": { "x": 0.0, "y": 1.0, "z": 4.0 }, "rotation": 0.0 }),
        );
        for _ in 0..40 {
            game.update(&PlayerInput::default(), 0.016);
        }

        let fire = PlayerInput::new(InputFlags::FIRE, 0.0);
        let mut hits = Vec::new();
        for _ in 0..20 {
            let report = game.update(&fire, 0.016);
            hits.extend(report.hits);
            clock.advance(16);
            if !hits.is_empty() {
                break;
            }
        }

        assert_eq!(hits, vec!["target".to_string()]);
        assert_eq!(game.remotes().get("target").unwrap().health, 75);
        assert_eq!(game.outbox().pending_count("combat.hit"), 1);
        assert_eq!(game.stats().hits_dealt, 1);
    }
}
