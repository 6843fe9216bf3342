use avian2d::prelude::*;
use bevy::ecs::message::Messages;
use bevy::prelude::*;
use rand::SeedableRng;
use rand::rngs::StdRng;

use super::*;
use crate::common::rng::GameRng;
use crate::common::state::GameplayGate;
use crate::common::test_utils::{drain_messages, run_system_once};
use crate::plugins::core::data::GameData;
use crate::plugins::enemies::config::EnemyConfig;
use crate::plugins::enemies::{Enemy, EnemyArchetypes};
use crate::plugins::health::knockback::Knockback;
use crate::plugins::health::{Died, Health};
use crate::plugins::modifiers::{
    ModifierData, ModifierEffect, ModifierKind, ModifierManager, OfferRecipe,
};
use crate::plugins::player::combat::MeleeAttack;
use crate::plugins::player::{MovementModifiers, Player};
use crate::plugins::qte::QteManager;
use crate::plugins::world::Goal;

/// Stands in for the ECS spawner: hands out real entity ids and records orders.
struct Recorder {
    world: World,
    orders: Vec<SpawnOrder>,
}

impl Recorder {
    fn new() -> Self {
        Self {
            world: World::new(),
            orders: Vec::new(),
        }
    }

    fn spawn(&mut self, order: &SpawnOrder) -> Option<Entity> {
        self.orders.push(order.clone());
        Some(self.world.spawn_empty().id())
    }

    fn count(&self, archetype: &str) -> usize {
        self.orders.iter().filter(|o| o.archetype == archetype).count()
    }
}

fn entry(archetype: &str, count: usize) -> WaveEntry {
    WaveEntry {
        archetype: archetype.into(),
        count,
    }
}

fn points(n: usize) -> Vec<Vec2> {
    (0..n).map(|i| Vec2::new(i as f32, 0.0)).collect()
}

fn schedule(initial: usize, continuous: usize, interval: f32) -> SpawnSchedule {
    SpawnSchedule {
        initial_spawn_count: initial,
        continuous_spawn_count: continuous,
        spawn_interval: interval,
    }
}

fn two_waves() -> Vec<WaveDefinition> {
    vec![
        WaveDefinition {
            enemies: vec![entry("Charger", 4), entry("Flyer", 3)],
        },
        WaveDefinition {
            enemies: vec![entry("Shooter", 2)],
        },
    ]
}

fn kill_all(manager: &mut WaveManager) {
    let alive = manager.active().to_vec();
    for e in alive {
        assert!(manager.on_enemy_died(e));
    }
}

#[test]
fn initial_burst_then_continuous_until_quota() {
    let mut manager = WaveManager::new(two_waves(), schedule(3, 2, 5.0), points(10));
    let mut rng = StdRng::seed_from_u64(3);
    let mut rec = Recorder::new();

    manager.start_wave(0, &mut rng, &mut |o: &SpawnOrder| rec.spawn(o));
    assert_eq!(manager.phase(), WavePhase::Active);
    assert_eq!(manager.spawned(), 3);
    assert_eq!(manager.to_spawn(), 7);
    assert_eq!(
        manager.drain_events().collect::<Vec<_>>(),
        vec![WaveEvent::Started { index: 0, total: 7 }]
    );

    manager.tick(2.5, &mut rng, &mut |o: &SpawnOrder| rec.spawn(o));
    assert_eq!(manager.spawned(), 3, "interval not yet elapsed");
    manager.tick(2.5, &mut rng, &mut |o: &SpawnOrder| rec.spawn(o));
    assert_eq!(manager.spawned(), 5);
    manager.tick(5.0, &mut rng, &mut |o: &SpawnOrder| rec.spawn(o));
    assert_eq!(manager.spawned(), 7);
    assert!(!manager.is_scheduling());

    manager.tick(50.0, &mut rng, &mut |o: &SpawnOrder| rec.spawn(o));
    assert_eq!(manager.spawned(), 7, "spawning stops at the quota");
    assert_eq!(rec.count("Charger"), 4);
    assert_eq!(rec.count("Flyer"), 3);
    assert_eq!(manager.active().len(), 7);
}

#[test]
fn batch_positions_are_distinct() {
    let waves = vec![WaveDefinition {
        enemies: vec![entry("Charger", 5)],
    }];
    for seed in 0..20 {
        let mut manager = WaveManager::new(waves.clone(), schedule(5, 1, 1.0), points(5));
        let mut rng = StdRng::seed_from_u64(seed);
        let mut rec = Recorder::new();
        manager.start_wave(0, &mut rng, &mut |o: &SpawnOrder| rec.spawn(o));

        let mut xs: Vec<i32> = rec.orders.iter().map(|o| o.position.x as i32).collect();
        xs.sort_unstable();
        assert_eq!(xs, vec![0, 1, 2, 3, 4], "seed {seed}");
    }
}

#[test]
fn exhausted_spawn_points_skip_the_rest_of_the_batch() {
    let waves = vec![WaveDefinition {
        enemies: vec![entry("Charger", 5)],
    }];
    let mut manager = WaveManager::new(waves, schedule(5, 2, 1.0), points(2));
    let mut rng = StdRng::seed_from_u64(9);
    let mut rec = Recorder::new();

    manager.start_wave(0, &mut rng, &mut |o: &SpawnOrder| rec.spawn(o));
    assert_eq!(manager.spawned(), 2);
    assert!(manager.is_scheduling());

    manager.tick(1.0, &mut rng, &mut |o: &SpawnOrder| rec.spawn(o));
    assert_eq!(manager.spawned(), 4);
    manager.tick(1.0, &mut rng, &mut |o: &SpawnOrder| rec.spawn(o));
    assert_eq!(manager.spawned(), 5);
    assert!(!manager.is_scheduling());
}

#[test]
fn killing_everything_early_does_not_complete_the_wave() {
    let mut manager = WaveManager::new(two_waves(), schedule(3, 2, 5.0), points(10));
    let mut rng = StdRng::seed_from_u64(5);
    let mut rec = Recorder::new();

    manager.start_wave(0, &mut rng, &mut |o: &SpawnOrder| rec.spawn(o));
    kill_all(&mut manager);
    assert_eq!(manager.phase(), WavePhase::Active);
    assert!(!manager.goal_active());

    manager.tick(5.0, &mut rng, &mut |o: &SpawnOrder| rec.spawn(o));
    manager.tick(5.0, &mut rng, &mut |o: &SpawnOrder| rec.spawn(o));
    assert_eq!(manager.spawned(), 7);
    assert_eq!(manager.phase(), WavePhase::Active);

    manager.drain_events().for_each(drop);
    kill_all(&mut manager);
    assert_eq!(manager.phase(), WavePhase::Complete);
    assert!(manager.goal_active());
    assert!(manager.goal_armed());
    assert_eq!(
        manager.drain_events().collect::<Vec<_>>(),
        vec![WaveEvent::Completed { index: 0 }]
    );
}

#[test]
fn unknown_deaths_are_ignored() {
    let mut manager = WaveManager::new(two_waves(), schedule(3, 2, 5.0), points(10));
    let mut rng = StdRng::seed_from_u64(1);
    let mut rec = Recorder::new();
    manager.start_wave(0, &mut rng, &mut |o: &SpawnOrder| rec.spawn(o));

    let stranger = rec.world.spawn_empty().id();
    assert!(!manager.on_enemy_died(stranger));
    assert_eq!(manager.active().len(), 3);
}

#[test]
fn goal_triggers_once_per_completion() {
    let waves = vec![WaveDefinition {
        enemies: vec![entry("Charger", 1)],
    }];
    let mut manager = WaveManager::new(waves, schedule(1, 1, 1.0), points(1));
    let mut rng = StdRng::seed_from_u64(2);
    let mut rec = Recorder::new();

    manager.start_wave(0, &mut rng, &mut |o: &SpawnOrder| rec.spawn(o));
    assert!(!manager.reach_goal(), "goal is inactive mid-wave");

    kill_all(&mut manager);
    assert!(manager.reach_goal());
    assert!(!manager.reach_goal());
    assert!(manager.goal_active(), "still shown until the next wave");
}

#[test]
fn next_wave_hides_goal_and_last_wave_reports_all_complete() {
    let mut manager = WaveManager::new(two_waves(), schedule(10, 2, 5.0), points(10));
    let mut rng = StdRng::seed_from_u64(4);
    let mut rec = Recorder::new();

    manager.start_wave(0, &mut rng, &mut |o: &SpawnOrder| rec.spawn(o));
    kill_all(&mut manager);
    manager.prepare_next_wave(&mut rng, &mut |o: &SpawnOrder| rec.spawn(o));
    assert_eq!(manager.current_wave(), 1);
    assert!(!manager.goal_active());
    assert_eq!(rec.count("Shooter"), 2);

    kill_all(&mut manager);
    manager.drain_events().for_each(drop);
    manager.prepare_next_wave(&mut rng, &mut |o: &SpawnOrder| rec.spawn(o));
    assert_eq!(manager.phase(), WavePhase::AllComplete);
    assert_eq!(
        manager.drain_events().collect::<Vec<_>>(),
        vec![WaveEvent::AllComplete]
    );
}

#[test]
fn empty_wave_completes_immediately() {
    let waves = vec![WaveDefinition::default()];
    let mut manager = WaveManager::new(waves, SpawnSchedule::default(), points(3));
    let mut rng = StdRng::seed_from_u64(0);
    let mut rec = Recorder::new();

    manager.start_wave(0, &mut rng, &mut |o: &SpawnOrder| rec.spawn(o));
    assert_eq!(manager.phase(), WavePhase::Complete);
    assert!(manager.goal_active());
}

#[test]
fn failed_spawns_still_count_toward_the_quota() {
    let waves = vec![WaveDefinition {
        enemies: vec![entry("Ghost", 2)],
    }];
    let mut manager = WaveManager::new(waves, schedule(2, 1, 1.0), points(4));
    let mut rng = StdRng::seed_from_u64(0);

    manager.start_wave(0, &mut rng, &mut |_: &SpawnOrder| None);
    assert_eq!(manager.spawned(), 2);
    assert!(manager.active().is_empty());
    assert_eq!(manager.phase(), WavePhase::Complete);
}

#[test]
fn restart_returns_survivors_and_begins_again() {
    let mut manager = WaveManager::new(two_waves(), schedule(10, 2, 5.0), points(10));
    let mut rng = StdRng::seed_from_u64(6);
    let mut rec = Recorder::new();

    manager.start_wave(0, &mut rng, &mut |o: &SpawnOrder| rec.spawn(o));
    kill_all(&mut manager);
    manager.prepare_next_wave(&mut rng, &mut |o: &SpawnOrder| rec.spawn(o));
    let alive = manager.active().to_vec();
    assert_eq!(alive.len(), 2);

    let survivors = manager.restart(&mut rng, &mut |o: &SpawnOrder| rec.spawn(o));
    assert_eq!(survivors, alive);
    assert_eq!(manager.current_wave(), 0);
    assert_eq!(manager.phase(), WavePhase::Active);
    assert_eq!(manager.spawned(), 7);
    assert!(manager.active().iter().all(|e| !survivors.contains(e)));
}

// --- systems ---

fn catalogue() -> ModifierManager {
    let modifier = |id: &str, kind, effect| ModifierData {
        id: id.into(),
        name: id.into(),
        kind,
        effect,
    };
    ModifierManager::new(
        vec![
            modifier("mirror", ModifierKind::Bad, ModifierEffect::MirrorControls),
            modifier("swift", ModifierKind::Good, ModifierEffect::MoveSpeed { multiplier: 2.0 }),
            modifier("mend", ModifierKind::Good, ModifierEffect::Heal { amount: 1 }),
            modifier("focus", ModifierKind::Good, ModifierEffect::PerfectZone { multiplier: 1.5 }),
        ],
        vec![
            OfferRecipe { bad: 1, ..default() },
            OfferRecipe { good: 1, ..default() },
            OfferRecipe { good: 1, ..default() },
        ],
    )
}

fn flow_world() -> World {
    let mut world = World::new();
    world.init_resource::<Messages<Died>>();
    world.init_resource::<Messages<CollisionStart>>();
    world.init_resource::<Messages<OffersPresented>>();
    world.init_resource::<Messages<OfferChosen>>();
    world.init_resource::<Messages<WaveStarted>>();
    world.init_resource::<Messages<WaveCompleted>>();
    world.init_resource::<Messages<AllWavesComplete>>();

    let mut data = GameData::default();
    data.arena.respawn_point = [-3.0, 1.0];
    world.insert_resource(data);
    world.insert_resource(EnemyArchetypes::from_configs([
        EnemyConfig::charger(),
        EnemyConfig::flyer(),
        EnemyConfig::shooter(),
    ]));
    world.insert_resource(GameRng::from_seed(11));
    world.insert_resource(GameplayGate::default());
    world.insert_resource(PendingOffers::default());
    world.insert_resource(QteManager::default());
    world.insert_resource(catalogue());
    world.insert_resource(WaveManager::new(two_waves(), schedule(3, 2, 5.0), points(10)));
    world
}

fn spawn_player(world: &mut World, at: Vec2) -> Entity {
    world
        .spawn((
            Player,
            Transform::from_xyz(at.x, at.y, 1.0),
            LinearVelocity(Vec2::ONE),
            MovementModifiers::default(),
            Health::new(4, 0.0),
        ))
        .id()
}

fn enemy_count(world: &mut World) -> usize {
    world.query_filtered::<(), With<Enemy>>().iter(world).count()
}

/// Start wave 0 through the system and kill its whole roster.
fn complete_first_wave(world: &mut World) {
    run_system_once(world, systems::start_first_wave);
    {
        let mut waves = world.resource_mut::<WaveManager>();
        waves.tick(10.0, &mut StdRng::seed_from_u64(0), &mut |_: &SpawnOrder| None);
    }
    let alive = world.resource::<WaveManager>().active().to_vec();
    for entity in alive {
        world.write_message(Died { entity });
    }
    run_system_once(world, systems::track_enemy_deaths);
}

#[test]
fn first_wave_spawns_enemies_through_commands() {
    let mut world = flow_world();
    run_system_once(&mut world, systems::start_first_wave);

    assert_eq!(enemy_count(&mut world), 3);
    run_system_once(&mut world, systems::publish_wave_events);
    assert_eq!(
        drain_messages::<WaveStarted>(&mut world),
        vec![WaveStarted { index: 0, total: 7 }]
    );
}

#[test]
fn enemy_deaths_complete_the_wave() {
    let mut world = flow_world();
    complete_first_wave(&mut world);

    let waves = world.resource::<WaveManager>();
    assert_eq!(waves.phase(), WavePhase::Complete);
    assert!(waves.goal_active());
}

fn touch_goal(world: &mut World, goal: Entity, player: Entity) {
    world.write_message(CollisionStart {
        collider1: goal,
        collider2: player,
        body1: None,
        body2: Some(player),
    });
    run_system_once(world, systems::detect_goal);
}

#[test]
fn touching_the_goal_pauses_and_presents_offers() {
    let mut world = flow_world();
    let player = spawn_player(&mut world, Vec2::new(4.0, 4.0));
    let goal = world.spawn(Goal).id();

    // Inactive goal: nothing happens.
    run_system_once(&mut world, systems::start_first_wave);
    touch_goal(&mut world, goal, player);
    assert!(!world.resource::<PendingOffers>().is_pending());

    complete_first_wave(&mut world);
    touch_goal(&mut world, goal, player);

    assert!(world.resource::<GameplayGate>().paused);
    assert!(world.resource::<GameplayGate>().input_frozen);
    let offers = world.resource::<PendingOffers>().offers.clone().unwrap();
    assert_eq!(offers.len(), OFFER_COUNT);
    assert_eq!(drain_messages::<OffersPresented>(&mut world).len(), 1);

    // A second touch is ignored.
    touch_goal(&mut world, goal, player);
    assert!(drain_messages::<OffersPresented>(&mut world).is_empty());
}

fn world_awaiting_choice() -> (World, Entity) {
    let mut world = flow_world();
    let player = spawn_player(&mut world, Vec2::new(4.0, 4.0));
    let goal = world.spawn(Goal).id();
    complete_first_wave(&mut world);
    touch_goal(&mut world, goal, player);
    (world, player)
}

#[test]
fn invalid_choice_keeps_the_pause() {
    let (mut world, _) = world_awaiting_choice();
    world.write_message(OfferChosen { index: 7 });
    run_system_once(&mut world, systems::resolve_offer_choice);

    assert!(world.resource::<PendingOffers>().is_pending());
    assert!(world.resource::<GameplayGate>().paused);
    assert_eq!(world.resource::<WaveManager>().current_wave(), 0);
}

#[test]
fn valid_choice_applies_offer_and_starts_next_wave() {
    let (mut world, player) = world_awaiting_choice();
    world.write_message(OfferChosen { index: 0 });
    run_system_once(&mut world, systems::resolve_offer_choice);

    assert!(!world.resource::<PendingOffers>().is_pending());
    assert_eq!(*world.resource::<GameplayGate>(), GameplayGate::default());
    // Slot 0 draws the only bad modifier.
    assert!(world.get::<MovementModifiers>(player).unwrap().is_horizontal_inverted());
    assert_eq!(world.resource::<ModifierManager>().active_effects().len(), 1);

    let transform = world.get::<Transform>(player).unwrap();
    assert_eq!(transform.translation.truncate(), Vec2::new(-3.0, 1.0));
    assert_eq!(world.get::<LinearVelocity>(player).unwrap().0, Vec2::ZERO);

    let waves = world.resource::<WaveManager>();
    assert_eq!(waves.current_wave(), 1);
    assert_eq!(waves.phase(), WavePhase::Active);
    assert!(!waves.goal_active());
}

#[test]
fn input_choice_becomes_a_message_only_while_pending() {
    let mut world = World::new();
    world.init_resource::<Messages<OfferChosen>>();
    world.insert_resource(crate::common::input::GameplayInput {
        offer_choice: Some(1),
        ..default()
    });
    world.insert_resource(PendingOffers::default());

    run_system_once(&mut world, systems::choose_offer_from_input);
    assert!(drain_messages::<OfferChosen>(&mut world).is_empty());

    world.resource_mut::<PendingOffers>().offers = Some(Vec::new());
    run_system_once(&mut world, systems::choose_offer_from_input);
    assert_eq!(
        drain_messages::<OfferChosen>(&mut world),
        vec![OfferChosen { index: 1 }]
    );
}

#[test]
fn player_death_restarts_the_run() {
    let (mut world, player) = world_awaiting_choice();
    world.write_message(OfferChosen { index: 0 });
    run_system_once(&mut world, systems::resolve_offer_choice);
    assert_eq!(enemy_count(&mut world), 5, "3 from wave one, 2 from wave two");
    let wave_two = world.resource::<WaveManager>().active().to_vec();

    {
        let mut health = world.get_mut::<Health>(player).unwrap();
        health.scale_max(2.0);
        health.take_damage(100, None);
    }
    world.get_mut::<Transform>(player).unwrap().translation = Vec3::new(9.0, 9.0, 1.0);
    let mut melee = MeleeAttack::new(1.5, 0.5, 1, 1.0);
    assert!(melee.try_swing(Vec2::ZERO, true).is_some());
    let mut knockback = Knockback::default();
    knockback.start(Vec2::Y);
    world.entity_mut(player).insert((melee, knockback));

    world.write_message(Died { entity: player });
    run_system_once(&mut world, systems::restart_run_on_player_death);

    assert!(world.get::<MeleeAttack>(player).unwrap().is_ready());
    assert!(!world.get::<Knockback>(player).unwrap().is_active());

    let movement = world.get::<MovementModifiers>(player).unwrap();
    assert!(!movement.is_horizontal_inverted());
    let health = world.get::<Health>(player).unwrap();
    assert!(!health.is_dead());
    assert_eq!(health.current(), health.max());
    assert!(world.resource::<ModifierManager>().active_effects().is_empty());
    assert_eq!(
        world.get::<Transform>(player).unwrap().translation.truncate(),
        Vec2::new(-3.0, 1.0)
    );

    for e in wave_two {
        assert!(world.get_entity(e).is_err(), "wave enemies are cleared");
    }
    let waves = world.resource::<WaveManager>();
    assert_eq!(waves.current_wave(), 0);
    assert_eq!(waves.phase(), WavePhase::Active);
}

#[test]
fn enemy_deaths_do_not_restart_the_run() {
    let mut world = flow_world();
    spawn_player(&mut world, Vec2::ZERO);
    run_system_once(&mut world, systems::start_first_wave);
    let enemy = world.resource::<WaveManager>().active()[0];

    world.write_message(Died { entity: enemy });
    world.resource_mut::<GameplayGate>().freeze();
    run_system_once(&mut world, systems::restart_run_on_player_death);

    assert!(world.resource::<GameplayGate>().paused, "no reset happened");
}

#[test]
fn goal_visibility_follows_the_manager() {
    let mut world = flow_world();
    let goal = world
        .spawn((
            Goal,
            Visibility::Hidden,
            crate::plugins::world::goal_layers(false),
        ))
        .id();

    complete_first_wave(&mut world);
    run_system_once(&mut world, systems::sync_goal);
    assert_eq!(*world.get::<Visibility>(goal).unwrap(), Visibility::Inherited);
    assert_eq!(
        world.get::<CollisionLayers>(goal).unwrap().filters,
        crate::plugins::world::goal_layers(true).filters
    );

    {
        let mut waves = world.resource_mut::<WaveManager>();
        waves.prepare_next_wave(&mut StdRng::seed_from_u64(0), &mut |_: &SpawnOrder| None);
    }
    run_system_once(&mut world, systems::sync_goal);
    assert_eq!(*world.get::<Visibility>(goal).unwrap(), Visibility::Hidden);
}

