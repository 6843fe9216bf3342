//! Wave bookkeeping and the spawn schedule, independent of the ECS.
//!
//! ```text
//! NotStarted -> Active -> Complete -> (goal reached, offer chosen) -> next Active
//!                                  \-> AllComplete once the list runs out
//! ```
//!
//! Spawning goes through a caller-supplied closure so the schedule can be
//! driven by `Commands` in the game and by a plain counter in tests.

use bevy::prelude::*;
use rand::Rng;
use serde::Deserialize;

use crate::common::error::GameError;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct WaveEntry {
    pub archetype: String,
    pub count: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct WaveDefinition {
    pub enemies: Vec<WaveEntry>,
}

impl WaveDefinition {
    pub fn total(&self) -> usize {
        self.enemies.iter().map(|e| e.count).sum()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct SpawnSchedule {
    /// Spawned the moment a wave starts.
    pub initial_spawn_count: usize,
    /// Spawned every `spawn_interval` seconds afterwards.
    pub continuous_spawn_count: usize,
    pub spawn_interval: f32,
}

impl Default for SpawnSchedule {
    fn default() -> Self {
        Self {
            initial_spawn_count: 3,
            continuous_spawn_count: 2,
            spawn_interval: 5.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WavePhase {
    #[default]
    NotStarted,
    Active,
    Complete,
    AllComplete,
}

/// One spawn the schedule wants performed.
#[derive(Debug, Clone, PartialEq)]
pub struct SpawnOrder {
    pub archetype: String,
    pub position: Vec2,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaveEvent {
    Started { index: usize, total: usize },
    Completed { index: usize },
    AllComplete,
}

#[derive(Resource, Debug, Default)]
pub struct WaveManager {
    waves: Vec<WaveDefinition>,
    schedule: SpawnSchedule,
    spawn_points: Vec<Vec2>,

    current: usize,
    phase: WavePhase,
    to_spawn: usize,
    spawned: usize,
    /// Per `WaveDefinition::enemies` entry of the current wave.
    spawned_by_entry: Vec<usize>,
    active: Vec<Entity>,

    scheduling: bool,
    spawn_clock: f32,

    goal_active: bool,
    goal_armed: bool,

    events: Vec<WaveEvent>,
}

impl WaveManager {
    pub fn new(waves: Vec<WaveDefinition>, schedule: SpawnSchedule, spawn_points: Vec<Vec2>) -> Self {
        Self {
            waves,
            schedule,
            spawn_points,
            ..Self::default()
        }
    }

    /// Reset bookkeeping for wave `index` and spawn its initial burst.
    /// Past the last wave this only reports `AllComplete`.
    pub fn start_wave<R, F>(&mut self, index: usize, rng: &mut R, spawner: &mut F)
    where
        R: Rng + ?Sized,
        F: FnMut(&SpawnOrder) -> Option<Entity>,
    {
        self.scheduling = false;
        self.goal_active = false;
        self.goal_armed = false;
        self.active.clear();

        if index >= self.waves.len() {
            info!("all {} waves complete", self.waves.len());
            self.current = index;
            self.phase = WavePhase::AllComplete;
            self.events.push(WaveEvent::AllComplete);
            return;
        }

        let wave = &self.waves[index];
        self.current = index;
        self.phase = WavePhase::Active;
        self.to_spawn = wave.total();
        self.spawned = 0;
        self.spawned_by_entry = vec![0; wave.enemies.len()];
        self.spawn_clock = 0.0;
        self.scheduling = true;

        info!("wave {} started: {} enemies", index + 1, self.to_spawn);
        self.events.push(WaveEvent::Started {
            index,
            total: self.to_spawn,
        });

        let burst = self.schedule.initial_spawn_count.min(self.to_spawn);
        self.spawn_batch(burst, rng, spawner);
        self.check_completion();
    }

    /// Advance the continuous schedule by `dt` seconds.
    pub fn tick<R, F>(&mut self, dt: f32, rng: &mut R, spawner: &mut F)
    where
        R: Rng + ?Sized,
        F: FnMut(&SpawnOrder) -> Option<Entity>,
    {
        if !self.scheduling || self.phase != WavePhase::Active {
            return;
        }

        self.spawn_clock += dt;
        let interval = self.schedule.spawn_interval.max(f32::EPSILON);
        while self.scheduling && self.spawn_clock >= interval {
            self.spawn_clock -= interval;
            let count = self.schedule.continuous_spawn_count.min(self.remaining());
            self.spawn_batch(count, rng, spawner);
        }
        self.check_completion();
    }

    /// Forget a dead enemy. `false` when it was not part of this wave.
    pub fn on_enemy_died(&mut self, entity: Entity) -> bool {
        let Some(i) = self.active.iter().position(|e| *e == entity) else {
            return false;
        };
        self.active.swap_remove(i);
        self.check_completion();
        true
    }

    /// One-shot: true only for the first touch of an active goal.
    pub fn reach_goal(&mut self) -> bool {
        if self.goal_active && self.goal_armed {
            self.goal_armed = false;
            true
        } else {
            false
        }
    }

    pub fn prepare_next_wave<R, F>(&mut self, rng: &mut R, spawner: &mut F)
    where
        R: Rng + ?Sized,
        F: FnMut(&SpawnOrder) -> Option<Entity>,
    {
        let next = self.current + 1;
        self.start_wave(next, rng, spawner);
    }

    /// Cancel the schedule and start over from the first wave.
    /// Returns the enemies that were alive, for the caller to despawn.
    pub fn restart<R, F>(&mut self, rng: &mut R, spawner: &mut F) -> Vec<Entity>
    where
        R: Rng + ?Sized,
        F: FnMut(&SpawnOrder) -> Option<Entity>,
    {
        self.scheduling = false;
        let survivors = std::mem::take(&mut self.active);
        info!("restarting waves ({} enemies cleared)", survivors.len());
        self.start_wave(0, rng, spawner);
        survivors
    }

    pub fn drain_events(&mut self) -> impl Iterator<Item = WaveEvent> + '_ {
        self.events.drain(..)
    }

    #[inline]
    pub fn phase(&self) -> WavePhase {
        self.phase
    }

    /// Zero-based.
    #[inline]
    pub fn current_wave(&self) -> usize {
        self.current
    }

    pub fn wave_count(&self) -> usize {
        self.waves.len()
    }

    #[inline]
    pub fn spawned(&self) -> usize {
        self.spawned
    }

    #[inline]
    pub fn to_spawn(&self) -> usize {
        self.to_spawn
    }

    pub fn remaining(&self) -> usize {
        self.to_spawn.saturating_sub(self.spawned)
    }

    #[inline]
    pub fn active(&self) -> &[Entity] {
        &self.active
    }

    #[inline]
    pub fn is_scheduling(&self) -> bool {
        self.scheduling
    }

    #[inline]
    pub fn goal_active(&self) -> bool {
        self.goal_active
    }

    #[inline]
    pub fn goal_armed(&self) -> bool {
        self.goal_armed
    }

    fn spawn_batch<R, F>(&mut self, count: usize, rng: &mut R, spawner: &mut F)
    where
        R: Rng + ?Sized,
        F: FnMut(&SpawnOrder) -> Option<Entity>,
    {
        let Some(wave) = self.waves.get(self.current) else {
            return;
        };
        let mut points = self.spawn_points.clone();

        for i in 0..count {
            let open: Vec<usize> = wave
                .enemies
                .iter()
                .enumerate()
                .filter(|(k, entry)| self.spawned_by_entry[*k] < entry.count)
                .map(|(k, _)| k)
                .collect();
            if open.is_empty() {
                break;
            }
            if points.is_empty() {
                warn!(
                    "{}",
                    GameError::ResourceExhausted {
                        resource: "spawn points",
                        requested: count - i,
                        available: 0,
                    }
                );
                break;
            }

            let entry = open[rng.random_range(0..open.len())];
            let position = points.swap_remove(rng.random_range(0..points.len()));
            let order = SpawnOrder {
                archetype: wave.enemies[entry].archetype.clone(),
                position,
            };

            // Unknown archetypes still use up quota so the wave can finish.
            if let Some(entity) = spawner(&order) {
                self.active.push(entity);
            }
            self.spawned_by_entry[entry] += 1;
            self.spawned += 1;
        }

        if self.spawned >= self.to_spawn {
            self.scheduling = false;
        }
    }

    fn check_completion(&mut self) {
        if self.phase != WavePhase::Active || !self.active.is_empty() || self.spawned < self.to_spawn {
            return;
        }
        self.phase = WavePhase::Complete;
        self.scheduling = false;
        self.goal_active = true;
        self.goal_armed = true;
        info!("wave {} complete", self.current + 1);
        self.events.push(WaveEvent::Completed { index: self.current });
    }
}
