//! Enemy finite state machine.
//!
//! ```text
//!   Patrol --(in range, cooldown ready, attack can start)--> PrepareAttack
//!     ^                                                        |
//!     |                                              elapsed >= prepare_time
//!   Recover <--(attack no longer attacking)-- Attack <---------+
//!     |
//!   elapsed >= recover_time --> Patrol
//! ```
//!
//! Exactly one state is active. `change_state` always runs `exit` on the old
//! state before `enter` on the new one, and an `enter` may request an
//! immediate follow-up transition (missing attack strategy -> Patrol).
//! Effects leave the brain through an outbox of `BrainEvent`s.

use bevy::prelude::*;

use super::attacks::ShotRelease;
use super::context::EnemyContext;
use super::sensors::{LineOfSight, TargetSample};
use crate::common::error::GameError;

/// Upper bound on enter-requested transitions inside one `change_state`.
const MAX_CHAINED_TRANSITIONS: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EnemyStateKind {
    Patrol,
    PrepareAttack,
    Attack,
    Recover,
}

impl EnemyStateKind {
    /// Successor in the nominal cycle.
    pub fn next(self) -> Self {
        match self {
            EnemyStateKind::Patrol => EnemyStateKind::PrepareAttack,
            EnemyStateKind::PrepareAttack => EnemyStateKind::Attack,
            EnemyStateKind::Attack => EnemyStateKind::Recover,
            EnemyStateKind::Recover => EnemyStateKind::Patrol,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum BrainEvent {
    Entered {
        state: EnemyStateKind,
        from: Option<EnemyStateKind>,
    },
    Exited(EnemyStateKind),
    ShotReleased(ShotRelease),
}

#[derive(Debug, Clone)]
enum EnemyState {
    Patrol { player_was_in_range: bool },
    PrepareAttack { elapsed: f32 },
    Attack { shot_executed: bool },
    Recover { elapsed: f32 },
}

impl EnemyState {
    fn fresh(kind: EnemyStateKind) -> Self {
        match kind {
            EnemyStateKind::Patrol => EnemyState::Patrol {
                player_was_in_range: false,
            },
            EnemyStateKind::PrepareAttack => EnemyState::PrepareAttack { elapsed: 0.0 },
            EnemyStateKind::Attack => EnemyState::Attack {
                shot_executed: false,
            },
            EnemyStateKind::Recover => EnemyState::Recover { elapsed: 0.0 },
        }
    }

    fn kind(&self) -> EnemyStateKind {
        match self {
            EnemyState::Patrol { .. } => EnemyStateKind::Patrol,
            EnemyState::PrepareAttack { .. } => EnemyStateKind::PrepareAttack,
            EnemyState::Attack { .. } => EnemyStateKind::Attack,
            EnemyState::Recover { .. } => EnemyStateKind::Recover,
        }
    }

    fn enter(&mut self, ctx: &mut EnemyContext) -> Option<EnemyStateKind> {
        match self {
            EnemyState::Patrol { .. } => None,
            EnemyState::PrepareAttack { elapsed } => {
                *elapsed = 0.0;
                ctx.stop();
                if let Some(target) = ctx.sensors.as_ref().and_then(|s| s.target_position()) {
                    ctx.last_known_player_position = target;
                }
                None
            }
            EnemyState::Attack { shot_executed } => {
                *shot_executed = false;
                let origin = ctx.position;
                let aim = ctx.aim_point();
                let Some(attack) = ctx.attack.as_mut() else {
                    error!("{}", GameError::missing(ctx.name.as_str(), "attack strategy"));
                    return Some(EnemyStateKind::Patrol);
                };
                attack.start_attack(origin, aim);
                debug!("[{}] {} toward {aim:?}", ctx.name, attack.name());
                // Pacing runs from commitment, not completion.
                ctx.attack_cooldown.start();
                None
            }
            EnemyState::Recover { elapsed } => {
                *elapsed = 0.0;
                ctx.stop();
                None
            }
        }
    }

    fn tick(
        &mut self,
        ctx: &mut EnemyContext,
        dt: f32,
        sight: &dyn LineOfSight,
        out: &mut Vec<BrainEvent>,
    ) -> Option<EnemyStateKind> {
        match self {
            EnemyState::Patrol {
                player_was_in_range,
            } => {
                let position = ctx.position;
                let (a, b) = ctx.patrol_points();
                let speed = ctx.config.patrol_speed;
                if let Some(movement) = ctx.movement.as_mut() {
                    movement.patrol_between_points(position, a, b, speed);
                }

                let in_range = ctx
                    .sensors
                    .as_ref()
                    .is_some_and(|s| s.player_in_range(position, ctx.config.detection_range));
                if in_range != *player_was_in_range {
                    debug!("[{}] player in range: {in_range}", ctx.name);
                    *player_was_in_range = in_range;
                }

                if !in_range || !ctx.attack_cooldown.is_ready() {
                    return None;
                }
                let (Some(attack), Some(sensors)) = (ctx.attack.as_ref(), ctx.sensors.as_ref())
                else {
                    return None;
                };
                attack
                    .can_start_attack(position, sensors, sight)
                    .then_some(EnemyStateKind::PrepareAttack)
            }
            EnemyState::PrepareAttack { elapsed } => {
                *elapsed += dt;
                (*elapsed >= ctx.config.prepare_time).then_some(EnemyStateKind::Attack)
            }
            EnemyState::Attack { shot_executed } => {
                let Some(attack) = ctx.attack.as_mut() else {
                    return Some(EnemyStateKind::Patrol);
                };
                if !*shot_executed {
                    if let Some(shot) = attack.execute_shot() {
                        out.push(BrainEvent::ShotReleased(shot));
                    }
                    *shot_executed = true;
                }
                (!attack.is_attacking()).then_some(EnemyStateKind::Recover)
            }
            EnemyState::Recover { elapsed } => {
                *elapsed += dt;
                ctx.stop();
                (*elapsed >= ctx.config.recover_time).then_some(EnemyStateKind::Patrol)
            }
        }
    }

    fn exit(&mut self, ctx: &mut EnemyContext) {
        match self {
            EnemyState::Patrol { .. } | EnemyState::Recover { .. } => ctx.stop(),
            EnemyState::PrepareAttack { .. } => {}
            EnemyState::Attack { .. } => {
                if let Some(attack) = ctx.attack.as_mut() {
                    attack.cancel_attack();
                }
                ctx.stop();
            }
        }
    }
}

#[derive(Component, Debug, Clone)]
pub struct EnemyBrain {
    ctx: EnemyContext,
    state: EnemyState,
    events: Vec<BrainEvent>,
}

impl EnemyBrain {
    /// Starts in Patrol.
    pub fn new(ctx: EnemyContext) -> Self {
        for (absent, what) in [
            (ctx.movement.is_none(), "movement module"),
            (ctx.sensors.is_none(), "sensors"),
            (ctx.attack.is_none(), "attack strategy"),
        ] {
            if absent {
                warn!("{}", GameError::missing(ctx.name.as_str(), what));
            }
        }

        let mut brain = Self {
            ctx,
            state: EnemyState::fresh(EnemyStateKind::Patrol),
            events: Vec::new(),
        };
        brain.events.push(BrainEvent::Entered {
            state: EnemyStateKind::Patrol,
            from: None,
        });
        if let Some(next) = brain.state.enter(&mut brain.ctx) {
            brain.change_state(next);
        }
        brain
    }

    /// Refresh position and feed the sensors. Call before `tick`.
    pub fn observe(&mut self, position: Vec2, target: Option<TargetSample>, dt: f32) {
        self.ctx.position = position;
        if let Some(sensors) = self.ctx.sensors.as_mut() {
            sensors.observe(target, dt);
        }
    }

    /// Variable-rate tick: state first, then the attack cooldown.
    pub fn tick(&mut self, dt: f32, sight: &dyn LineOfSight) {
        if let Some(next) = self.state.tick(&mut self.ctx, dt, sight, &mut self.events) {
            self.change_state(next);
        }
        self.ctx.attack_cooldown.tick(dt);
    }

    /// Fixed-rate tick: integrate the committed attack motion, if any.
    pub fn fixed_tick(&mut self, position: Vec2, dt: f32) {
        self.ctx.position = position;
        let Some(attack) = self.ctx.attack.as_mut() else {
            return;
        };
        if let Some(velocity) = attack.fixed_tick(position, dt) {
            if let Some(movement) = self.ctx.movement.as_mut() {
                movement.set_velocity(velocity);
            }
        }
    }

    pub fn change_state(&mut self, next: EnemyStateKind) {
        let mut pending = Some(next);
        let mut hops = 0;

        while let Some(kind) = pending.take() {
            hops += 1;
            if hops > MAX_CHAINED_TRANSITIONS {
                error!("[{}] transition loop at {kind:?}, staying put", self.ctx.name);
                break;
            }

            let from = self.state.kind();
            self.state.exit(&mut self.ctx);
            self.events.push(BrainEvent::Exited(from));

            self.state = EnemyState::fresh(kind);
            self.events.push(BrainEvent::Entered {
                state: kind,
                from: Some(from),
            });
            debug!("[{}] {from:?} -> {kind:?}", self.ctx.name);

            pending = self.state.enter(&mut self.ctx);
        }
    }

    #[inline]
    pub fn state(&self) -> EnemyStateKind {
        self.state.kind()
    }

    #[inline]
    pub fn context(&self) -> &EnemyContext {
        &self.ctx
    }

    #[inline]
    pub fn context_mut(&mut self) -> &mut EnemyContext {
        &mut self.ctx
    }

    pub fn velocity(&self) -> Vec2 {
        self.ctx.velocity()
    }

    pub fn facing_left(&self) -> bool {
        self.ctx
            .movement
            .as_ref()
            .is_some_and(|m| m.facing_left())
    }

    pub fn drain_events(&mut self) -> Vec<BrainEvent> {
        std::mem::take(&mut self.events)
    }
}
