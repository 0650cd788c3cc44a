//! Tethered balloon simulation, independent of the ECS.
//!
//! Each frame runs in two phases: [`BalloonSim::step`] (integrate + relax) and,
//! after every other anchor writer, [`BalloonSim::late_step`] (pops, shocks,
//! anchor spring). Pops only enqueue work for the next late phase.

pub mod anchor_spring;
pub mod body;
pub mod error;
pub mod integrator;
pub mod orientation;
pub mod relax;
pub mod shock;

use bevy::math::Vec2;
use bevy::prelude::Resource;
use rand::Rng;

pub use anchor_spring::AnchorSpring;
pub use body::{BodyId, BodyLayout, BodyRegistry};
pub use error::SimError;
pub use shock::ShockField;

use crate::config::BalloonSimConfig;

/// A pop waiting for the late phase
#[derive(Debug, Clone, Copy, PartialEq)]
struct PendingPop {
    origin: Vec2,
    radius: f32,
}

/// Read-only view of one body for the renderer
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BodySnapshot {
    pub id: BodyId,
    pub position: Vec2,
    pub attach_point: Vec2,
    pub rotation: f32,
    pub active: bool,
}

/// The whole balloon cluster: registry, live shocks and the anchor spring
#[derive(Debug, Clone, Resource)]
pub struct BalloonSim {
    config: BalloonSimConfig,
    registry: BodyRegistry,
    shocks: ShockField,
    spring: AnchorSpring,
    pending_pops: Vec<PendingPop>,
}

impl BalloonSim {
    /// Build the simulation from the scene's current layout.
    ///
    /// Returns the simulation and, for every layout slot, the id it was given
    /// (`None` for skipped slots). Without an anchor there is nothing to
    /// simulate, which is a configuration error.
    pub fn new(
        config: BalloonSimConfig,
        anchor: Option<Vec2>,
        layouts: &[Option<BodyLayout>],
    ) -> Result<(Self, Vec<Option<BodyId>>), SimError> {
        config.validate()?;
        let anchor = anchor.ok_or(SimError::MissingAnchor)?;

        let anchor_attach = anchor + config.rope.anchor_attach_offset();
        let (registry, ids) = BodyRegistry::bootstrap(anchor_attach, layouts, &config);

        log::info!(
            "Balloon simulation ready: {} of {} balloons registered",
            registry.len(),
            layouts.len()
        );

        let sim = BalloonSim {
            config,
            registry,
            shocks: ShockField::default(),
            spring: AnchorSpring::new(anchor),
            pending_pops: Vec::new(),
        };
        Ok((sim, ids))
    }

    pub fn config(&self) -> &BalloonSimConfig {
        &self.config
    }

    pub fn set_simulating(&mut self, simulate: bool) {
        self.config.simulate = simulate;
    }

    pub fn anchor_attach(&self, anchor: Vec2) -> Vec2 {
        anchor + self.config.rope.anchor_attach_offset()
    }

    /// Early phase: forces, then the relax passes.
    /// `rotation_target` falls back to the anchor attach point.
    pub fn step(&mut self, dt: f32, anchor: Vec2, rotation_target: Option<Vec2>) {
        if !self.config.simulate || dt <= 0.0 {
            return;
        }

        let anchor_attach = self.anchor_attach(anchor);
        let rotation_target = rotation_target.unwrap_or(anchor_attach);
        let last_good = self.positions();

        let bodies = self.registry.bodies_mut();
        integrator::integrate(bodies, anchor_attach, &self.config.forces, dt);
        relax::relax(bodies, anchor_attach, rotation_target, &self.config, dt);

        self.recover_non_finite(&last_good);
    }

    /// Report that a balloon finished popping. Only the first report per body
    /// counts; returns whether this one did.
    pub fn notify_popped(&mut self, id: BodyId) -> Result<bool, SimError> {
        let count = self.registry.len();
        let body = self
            .registry
            .get_mut(id)
            .ok_or(SimError::BodyOutOfRange { id, count })?;

        // Already popped, or removed from the scene without popping
        if body.popped || !body.active {
            return Ok(false);
        }
        body.popped = true;
        body.active = false;

        self.pending_pops.push(PendingPop {
            origin: body.position,
            radius: body.radius,
        });
        Ok(true)
    }

    /// Take a body out of every pass without a shock or anchor kick, e.g. when
    /// its balloon left the scene. Returns whether it was still active.
    pub fn deactivate(&mut self, id: BodyId) -> Result<bool, SimError> {
        let count = self.registry.len();
        let body = self
            .registry
            .get_mut(id)
            .ok_or(SimError::BodyOutOfRange { id, count })?;

        let was_active = body.active;
        body.active = false;
        Ok(was_active)
    }

    /// Late phase: drain pops, run shocks on unscaled `dt`, then the anchor spring.
    /// `anchor` is read and written in place.
    ///
    /// Pops reported while the simulation is paused are dropped: their bodies
    /// stay inactive but nothing pushes the cluster when it resumes.
    pub fn late_step<R: Rng>(&mut self, dt: f32, anchor: &mut Vec2, rng: &mut R) {
        if !self.config.simulate {
            self.pending_pops.clear();
            return;
        }

        for pop in self.pending_pops.drain(..) {
            if self.config.shock.enabled {
                self.shocks.spawn(pop.origin, pop.radius, &self.config.shock);
            }
            self.spring.kick(&self.config.anchor_spring, rng);
        }

        let last_good = self.positions();
        self.shocks
            .tick(self.registry.bodies_mut(), &self.config.shock, dt);
        self.recover_non_finite(&last_good);

        self.spring.tick(anchor, &self.config.anchor_spring, dt);
    }

    #[cfg(test)]
    pub fn body(&self, id: BodyId) -> Option<&body::Body> {
        self.registry.get(id)
    }

    pub fn registry(&self) -> &BodyRegistry {
        &self.registry
    }

    pub fn active_count(&self) -> usize {
        self.registry.active_count()
    }

    #[cfg(test)]
    pub fn shocks(&self) -> &[shock::Shock] {
        self.shocks.shocks()
    }

    #[cfg(test)]
    pub fn spring(&self) -> &AnchorSpring {
        &self.spring
    }

    /// Squash/stretch factor for the anchor sprite
    pub fn anchor_scale(&self) -> Vec2 {
        self.spring.scale
    }

    pub fn snapshot(&self) -> impl Iterator<Item = BodySnapshot> + '_ {
        self.registry.iter().map(|(id, body)| BodySnapshot {
            id,
            position: body.position,
            attach_point: body.attach_point(),
            rotation: body.rotation,
            active: body.active,
        })
    }

    fn positions(&self) -> Vec<Vec2> {
        self.registry.bodies().iter().map(|body| body.position).collect()
    }

    /// A body that blew up numerically goes back to its last pose, at rest.
    /// The others keep this frame's result.
    fn recover_non_finite(&mut self, last_good: &[Vec2]) {
        for (index, (body, &previous)) in self
            .registry
            .bodies_mut()
            .iter_mut()
            .zip(last_good)
            .enumerate()
        {
            if body.position.is_finite() && body.velocity.is_finite() && body.rotation.is_finite()
            {
                continue;
            }
            log::warn!("Balloon {} produced a non-finite state, restoring last pose", index);
            body.position = previous;
            body.velocity = Vec2::ZERO;
            if !body.rotation.is_finite() {
                body.rotation = 0.0;
            }
        }
    }
}
