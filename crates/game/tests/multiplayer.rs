use std::rc::Rc;

use glam::Vec3;
use serde_json::json;

use skirmish::net::protocol::{
    COMBAT_DAMAGE, COMBAT_HIT, PLAYER_POSITION, USER_CONNECTED, USER_DISCONNECTED, USER_WELCOME,
    WEAPON_DROP, WEAPON_SHOOT, WEAPON_SWITCH,
};
use skirmish::net::stamp_sender;
use skirmish::{
    Arena, Game, GameConfig, ManualClock, PlayerInput, RecordingTransport, WeaponKind,
    WireMessage,
};

const FRAME: f32 = 0.016;

struct Peer {
    id: &'static str,
    game: Game,
    transport: RecordingTransport,
    sent: Vec<String>,
}

impl Peer {
    fn new(id: &'static str, clock: &ManualClock, seed: u64) -> Self {
        let mut game = Game::with_seed(
            GameConfig::default(),
            Rc::new(clock.clone()),
            Arena::empty(40.0),
            seed,
        );
        game.handle_inbound(USER_WELCOME, &json!({ "userId": id }));
        Self {
            id,
            game,
            transport: RecordingTransport::new(),
            sent: Vec::new(),
        }
    }
}

/// Two clients joined through an in-memory stand-in for the relay.
struct Match {
    clock: ManualClock,
    alice: Peer,
    bob: Peer,
}

impl Match {
    fn new() -> Self {
        let clock = ManualClock::new(50_000);
        let mut alice = Peer::new("alice", &clock, 1);
        let mut bob = Peer::new("bob", &clock, 2);

        alice
            .game
            .handle_inbound(USER_CONNECTED, &json!({ "userId": "bob" }));
        bob.game
            .handle_inbound(USER_CONNECTED, &json!({ "userId": "alice" }));

        Self { clock, alice, bob }
    }

    fn frames(&mut self, count: usize, alice_input: PlayerInput, bob_input: PlayerInput) {
        for _ in 0..count {
            self.clock.advance(16);
            self.alice.game.update(&alice_input, FRAME);
            self.bob.game.update(&bob_input, FRAME);

            self.alice
                .game
                .tick_network(FRAME, &mut self.alice.transport);
            self.bob.game.tick_network(FRAME, &mut self.bob.transport);

            deliver(&mut self.alice, &mut self.bob);
            deliver(&mut self.bob, &mut self.alice);
        }
    }

    fn idle(&mut self, count: usize) {
        self.frames(count, PlayerInput::default(), PlayerInput::default());
    }
}

fn deliver(from: &mut Peer, to: &mut Peer) {
    for (event, payload) in from.transport.take() {
        let frame = WireMessage::new(event.clone(), stamp_sender(payload, from.id))
            .encode()
            .unwrap();
        let message = WireMessage::decode(&frame).unwrap();
        to.game.handle_inbound(&message.event, &message.payload);
        from.sent.push(event);
    }
}

#[test]
fn replayed_weapon_switch_is_not_echoed() {
    let mut m = Match::new();

    assert!(m.alice.game.player_mut().weapons_mut().next());
    m.idle(10);

    let replica = m.bob.game.remotes().get("alice").unwrap();
    assert_eq!(replica.weapons.current_kind(), WeaponKind::Rifle);

    assert_eq!(
        m.alice.sent.iter().filter(|e| *e == WEAPON_SWITCH).count(),
        1
    );
    assert!(!m.bob.sent.iter().any(|e| e == WEAPON_SWITCH));
}

#[test]
fn switches_within_one_window_arrive_as_one_batch() {
    let mut m = Match::new();

    {
        let weapons = m.alice.game.player_mut().weapons_mut();
        weapons.next();
        weapons.next();
        weapons.previous();
    }
    m.alice.game.flush(&mut m.alice.transport);

    let switches = m.alice.transport.sends_for(WEAPON_SWITCH);
    assert_eq!(switches.len(), 1);
    assert_eq!(switches[0].as_array().map(Vec::len), Some(3));

    deliver(&mut m.alice, &mut m.bob);
    let replica = m.bob.game.remotes().get("alice").unwrap();
    assert_eq!(replica.weapons.current_kind(), WeaponKind::Rifle);
}

#[test]
fn positions_converge_on_the_other_side() {
    let mut m = Match::new();
    m.alice
        .game
        .player_mut()
        .set_position(Vec3::new(8.0, 1.0, -3.0));

    m.idle(60);

    let replica = m.bob.game.remotes().get("alice").unwrap();
    assert!(replica.transform.target_position.distance(Vec3::new(8.0, 1.0, -3.0)) < 1e-5);
    assert!(replica.transform.position_error() < 1e-2);
}

#[test]
fn unseen_peer_is_created_from_position() {
    let mut m = Match::new();
    m.bob.game.handle_inbound(
        PLAYER_POSITION,
        &json!([
            { "userId": "carol", "position": { "x": 1.0, "y": 1.0, "z": 1.0 }, "rotation": 0.0 },
            { "userId": "carol", "position": { "x": 2.0, "y": 1.0, "z": 1.0 }, "rotation": 0.2 }
        ]),
    );

    let carol = m.bob.game.remotes().get("carol").expect("self-healed");
    assert_eq!(carol.transform.target_position, Vec3::new(2.0, 1.0, 1.0));
    assert_eq!(m.bob.game.remotes().len(), 2);

    m.bob
        .game
        .handle_inbound(USER_DISCONNECTED, &json!({ "userId": "carol" }));
    assert!(m.bob.game.remotes().get("carol").is_none());
}

#[test]
fn shots_resolve_on_both_clients() {
    let mut m = Match::new();
    m.alice
        .game
        .player_mut()
        .set_position(Vec3::new(0.0, 1.0, 0.0));
    m.bob.game.player_mut().set_position(Vec3::new(0.0, 1.0, 4.0));
    m.idle(40);

    let fire = skirmish::PlayerInput::new(skirmish::InputFlags::FIRE, 0.0);
    m.frames(1, fire, PlayerInput::default());
    m.idle(30);

    assert!(m.alice.sent.iter().any(|e| e == WEAPON_SHOOT));
    assert!(m.alice.sent.iter().any(|e| e == COMBAT_HIT));
    assert_eq!(m.alice.game.remotes().get("bob").unwrap().health, 75);

    assert_eq!(m.bob.game.player().health(), 75);
    assert!(m.bob.sent.iter().any(|e| e == COMBAT_DAMAGE));
    assert!(!m.bob.sent.iter().any(|e| e == WEAPON_SHOOT));

    assert!(m.alice.game.player().weapons().bullets().is_empty());
    assert!(
        m.bob
            .game
            .remotes()
            .get("alice")
            .unwrap()
            .weapons
            .bullets()
            .is_empty()
    );
}

#[test]
fn reload_cycle_matches_on_replica() {
    let mut m = Match::new();
    let fire = skirmish::PlayerInput::new(skirmish::InputFlags::FIRE, std::f32::consts::PI);

    for _ in 0..12 {
        m.frames(1, fire, PlayerInput::default());
        m.idle(20);
    }
    assert_eq!(m.alice.game.player().weapons().current().bullets_in_magazine, 0);

    let reload = skirmish::PlayerInput::new(skirmish::InputFlags::RELOAD, 0.0);
    m.frames(1, reload, PlayerInput::default());
    m.idle(120);

    let local = m.alice.game.player().weapons().current().clone();
    assert_eq!((local.bullets_in_magazine, local.total_bullets), (12, 108));

    let replica = m.bob.game.remotes().get("alice").unwrap();
    let mirrored = replica.weapons.current();
    assert_eq!(
        (mirrored.bullets_in_magazine, mirrored.total_bullets),
        (12, 108)
    );
}

#[test]
fn dropped_weapon_empties_the_replica_slot() {
    let mut m = Match::new();

    let drop = skirmish::PlayerInput::new(skirmish::InputFlags::DROP_WEAPON, 0.0);
    m.frames(1, drop, PlayerInput::default());
    m.idle(10);

    assert!(m.alice.sent.iter().any(|e| e == WEAPON_DROP));
    assert!(m.alice.game.player().weapons().slots()[0].is_empty());
    assert_eq!(m.alice.game.pickups().len(), 1);

    let replica = m.bob.game.remotes().get("alice").unwrap();
    assert!(replica.weapons.slots()[0].is_empty());
    assert_eq!(replica.weapons.current_kind(), WeaponKind::Rifle);
}

#[test]
fn replica_keeps_owner_ammo_through_drop_and_pickup() {
    let mut m = Match::new();
    let fire = skirmish::PlayerInput::new(skirmish::InputFlags::FIRE, std::f32::consts::PI);
    m.frames(1, fire, PlayerInput::default());
    m.idle(20);

    let weapons = m.alice.game.player_mut().weapons_mut();
    let dropped = weapons.drop_current().unwrap();
    weapons
        .pick_up(dropped.kind, dropped.ammo, dropped.total_ammo)
        .unwrap();
    m.idle(20);

    let local = m.alice.game.player().weapons().slots()[0].clone();
    let replica = m.bob.game.remotes().get("alice").unwrap();
    let mirrored = &replica.weapons.slots()[0];
    assert_eq!((local.bullets_in_magazine, local.total_bullets), (11, 120));
    assert_eq!(
        (mirrored.bullets_in_magazine, mirrored.total_bullets),
        (11, 120)
    );

    assert!(m.alice.game.player_mut().weapons_mut().switch_to(0));
    let reload = skirmish::PlayerInput::new(skirmish::InputFlags::RELOAD, 0.0);
    m.frames(1, reload, PlayerInput::default());
    m.idle(120);

    let local = m.alice.game.player().weapons().current().clone();
    assert_eq!((local.bullets_in_magazine, local.total_bullets), (12, 119));

    let replica = m.bob.game.remotes().get("alice").unwrap();
    let mirrored = replica.weapons.current();
    assert_eq!(mirrored.kind, WeaponKind::Pistol);
    assert_eq!(
        (mirrored.bullets_in_magazine, mirrored.total_bullets),
        (12, 119)
    );
}
