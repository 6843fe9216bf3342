use avian2d::prelude::*;
use bevy::ecs::system::SystemParam;
use bevy::prelude::*;

use super::manager::{SpawnOrder, WaveEvent, WaveManager};
use super::{
    AllWavesComplete, OFFER_COUNT, OfferChosen, OffersPresented, PendingOffers, WaveCompleted,
    WaveStarted,
};
use crate::common::error::GameError;
use crate::common::input::GameplayInput;
use crate::common::rng::GameRng;
use crate::common::state::GameplayGate;
use crate::common::tunables::Tunables;
use crate::plugins::core::data::GameData;
use crate::plugins::enemies::{EnemyArchetypes, spawn_enemy};
use crate::plugins::health::knockback::Knockback;
use crate::plugins::health::{Died, Health};
use crate::plugins::modifiers::{ModifierManager, ModifierOffer, ModifierTargets};
use crate::plugins::player::combat::MeleeAttack;
use crate::plugins::player::{MovementModifiers, Player, place_player};
use crate::plugins::qte::QteManager;
use crate::plugins::world::{Goal, goal_layers};

type PlayerLoadout<'w, 's> = Query<
    'w,
    's,
    (
        &'static mut Transform,
        &'static mut LinearVelocity,
        &'static mut MovementModifiers,
        &'static mut Health,
    ),
    With<Player>,
>;

/// Everything the wave schedule needs to put enemies into the world.
#[derive(SystemParam)]
pub struct EnemySpawner<'w, 's> {
    commands: Commands<'w, 's>,
    archetypes: Res<'w, EnemyArchetypes>,
    tunables: Option<Res<'w, Tunables>>,
}

impl EnemySpawner<'_, '_> {
    pub fn spawn(&mut self, order: &SpawnOrder) -> Option<Entity> {
        let invulnerability = self
            .tunables
            .as_ref()
            .map_or(0.0, |t| t.enemy_invulnerability);
        spawn_enemy(
            &mut self.commands,
            &self.archetypes,
            &order.archetype,
            order.position,
            invulnerability,
        )
    }

    pub fn despawn(&mut self, entities: impl IntoIterator<Item = Entity>) {
        for entity in entities {
            self.commands.entity(entity).try_despawn();
        }
    }
}

fn respawn_point(data: Option<&GameData>) -> Vec2 {
    data.map_or(Vec2::ZERO, |d| Vec2::from(d.arena.respawn_point))
}

pub fn start_first_wave(
    mut waves: ResMut<WaveManager>,
    mut rng: ResMut<GameRng>,
    mut spawner: EnemySpawner,
) {
    waves.start_wave(0, &mut rng.0, &mut |order: &SpawnOrder| spawner.spawn(order));
}

/// Virtual time: the schedule stops while gameplay is paused.
pub fn run_spawn_schedule(
    time: Res<Time>,
    mut waves: ResMut<WaveManager>,
    mut rng: ResMut<GameRng>,
    mut spawner: EnemySpawner,
) {
    if !waves.is_scheduling() {
        return;
    }
    let dt = time.delta_secs();
    waves.tick(dt, &mut rng.0, &mut |order: &SpawnOrder| spawner.spawn(order));
}

pub fn track_enemy_deaths(mut died: MessageReader<Died>, mut waves: ResMut<WaveManager>) {
    for ev in died.read() {
        if waves.on_enemy_died(ev.entity) {
            debug!("wave enemy {} down, {} left", ev.entity, waves.active().len());
        }
    }
}

/// Player body touching the active goal: pause and present offers.
pub fn detect_goal(
    mut started: MessageReader<CollisionStart>,
    q_goal: Query<(), With<Goal>>,
    q_player: Query<(), With<Player>>,
    mut waves: ResMut<WaveManager>,
    modifiers: Res<ModifierManager>,
    mut rng: ResMut<GameRng>,
    mut gate: ResMut<GameplayGate>,
    mut pending: ResMut<PendingOffers>,
    mut presented: MessageWriter<OffersPresented>,
) {
    let touched = started.read().any(|ev| {
        let sides = [
            (ev.collider1, ev.body2.unwrap_or(ev.collider2)),
            (ev.collider2, ev.body1.unwrap_or(ev.collider1)),
        ];
        sides
            .iter()
            .any(|(goal, other)| q_goal.contains(*goal) && q_player.contains(*other))
    });
    if !touched || !waves.reach_goal() {
        return;
    }

    gate.freeze();
    let offers = modifiers.generate_offers(OFFER_COUNT, &mut rng.0);
    info!(
        "goal reached, offering {:?}",
        offers.iter().map(ModifierOffer::names).collect::<Vec<_>>()
    );
    pending.offers = Some(offers.clone());
    presented.write(OffersPresented { offers });
}

pub fn choose_offer_from_input(
    input: Res<GameplayInput>,
    pending: Res<PendingOffers>,
    mut chosen: MessageWriter<OfferChosen>,
) {
    if !pending.is_pending() {
        return;
    }
    if let Some(index) = input.offer_choice {
        chosen.write(OfferChosen { index });
    }
}

/// Apply the chosen offer, move the player home and start the next wave.
/// An empty offer list advances without a choice.
pub fn resolve_offer_choice(
    mut chosen: MessageReader<OfferChosen>,
    mut pending: ResMut<PendingOffers>,
    mut modifiers: ResMut<ModifierManager>,
    mut qte: ResMut<QteManager>,
    mut q_player: PlayerLoadout,
    data: Option<Res<GameData>>,
    mut waves: ResMut<WaveManager>,
    mut rng: ResMut<GameRng>,
    mut gate: ResMut<GameplayGate>,
    mut spawner: EnemySpawner,
) {
    let Some(offers) = pending.offers.as_ref() else {
        chosen.clear();
        return;
    };

    let picked = if offers.is_empty() {
        None
    } else {
        let mut picked = None;
        for ev in chosen.read() {
            match offers.get(ev.index) {
                Some(offer) => {
                    picked = Some(offer.clone());
                    break;
                }
                None => warn!(
                    "{}",
                    GameError::InvalidIndex {
                        what: "offer",
                        index: ev.index,
                        len: offers.len(),
                    }
                ),
            }
        }
        if picked.is_none() {
            return;
        }
        picked
    };
    pending.offers = None;
    chosen.clear();

    let home = respawn_point(data.as_deref());
    match q_player.single_mut() {
        Ok((mut transform, mut velocity, mut movement, mut health)) => {
            if let Some(offer) = &picked {
                let mut targets = ModifierTargets {
                    movement: Some(&mut *movement),
                    health: Some(&mut *health),
                    qte: Some(&mut *qte),
                };
                modifiers.apply_offer(offer, &mut targets);
            }
            place_player(&mut transform, &mut velocity, home);
        }
        Err(_) => {
            warn!("{}", GameError::missing("offer choice", "player"));
            if let Some(offer) = &picked {
                let mut targets = ModifierTargets {
                    qte: Some(&mut *qte),
                    ..default()
                };
                modifiers.apply_offer(offer, &mut targets);
            }
        }
    }

    waves.prepare_next_wave(&mut rng.0, &mut |order: &SpawnOrder| spawner.spawn(order));
    gate.release();
}

/// Player death resets the run: modifiers unwound, player restored,
/// waves started over from the first.
pub fn restart_run_on_player_death(
    mut died: MessageReader<Died>,
    mut q_player: PlayerLoadout,
    mut modifiers: ResMut<ModifierManager>,
    mut qte: ResMut<QteManager>,
    data: Option<Res<GameData>>,
    mut waves: ResMut<WaveManager>,
    mut rng: ResMut<GameRng>,
    mut gate: ResMut<GameplayGate>,
    mut pending: ResMut<PendingOffers>,
    mut spawner: EnemySpawner,
    mut q_combat: Query<(Option<&mut MeleeAttack>, Option<&mut Knockback>), With<Player>>,
) {
    let player_died = died.read().any(|ev| q_player.contains(ev.entity));
    if !player_died {
        return;
    }

    let Ok((mut transform, mut velocity, mut movement, mut health)) = q_player.single_mut() else {
        return;
    };
    info!("player died, restarting run");

    let mut targets = ModifierTargets {
        movement: Some(&mut *movement),
        health: Some(&mut *health),
        qte: Some(&mut *qte),
    };
    modifiers.revert_all(&mut targets);
    movement.reset();
    health.reset();
    place_player(&mut transform, &mut velocity, respawn_point(data.as_deref()));
    for (melee, knockback) in &mut q_combat {
        if let Some(mut melee) = melee {
            melee.reset();
        }
        if let Some(mut knockback) = knockback {
            knockback.cancel();
        }
    }

    let survivors = waves.restart(&mut rng.0, &mut |order: &SpawnOrder| spawner.spawn(order));
    spawner.despawn(survivors);
    pending.offers = None;
    gate.release();
}

pub fn publish_wave_events(
    mut waves: ResMut<WaveManager>,
    mut started: MessageWriter<WaveStarted>,
    mut completed: MessageWriter<WaveCompleted>,
    mut all_complete: MessageWriter<AllWavesComplete>,
) {
    for ev in waves.drain_events() {
        match ev {
            WaveEvent::Started { index, total } => {
                started.write(WaveStarted { index, total });
            }
            WaveEvent::Completed { index } => {
                completed.write(WaveCompleted { index });
            }
            WaveEvent::AllComplete => {
                all_complete.write(AllWavesComplete);
            }
        }
    }
}

/// The goal is only visible and collidable between completion and touch.
pub fn sync_goal(
    waves: Res<WaveManager>,
    mut q_goal: Query<(&mut Visibility, &mut CollisionLayers), With<Goal>>,
) {
    let active = waves.goal_active();
    let visibility = if active {
        Visibility::Inherited
    } else {
        Visibility::Hidden
    };
    let layers = goal_layers(active);

    for (mut vis, mut col) in &mut q_goal {
        vis.set_if_neq(visibility);
        if col.filters != layers.filters {
            *col = layers;
        }
    }
}
