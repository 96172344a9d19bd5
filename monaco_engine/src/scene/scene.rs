/// Scene - ordered list of actors drawn every frame

use crate::error::Result;
use crate::render::DeviceContext;
use crate::scene::Actor;

/// Owner of all actors
///
/// Actors are referenced elsewhere by index (editor selection) and are
/// never duplicated.
#[derive(Default)]
pub struct Scene {
    actors: Vec<Actor>,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an actor and return its index
    pub fn add_actor(&mut self, actor: Actor) -> usize {
        crate::engine_debug!("monaco::Scene", "Actor '{}' added", actor.name());
        self.actors.push(actor);
        self.actors.len() - 1
    }

    /// Remove and destroy the actor at `index`
    pub fn remove_actor(&mut self, index: usize) -> Option<Actor> {
        if index >= self.actors.len() {
            return None;
        }
        let mut actor = self.actors.remove(index);
        actor.destroy();
        Some(actor)
    }

    pub fn actor(&self, index: usize) -> Option<&Actor> {
        self.actors.get(index)
    }

    pub fn actor_mut(&mut self, index: usize) -> Option<&mut Actor> {
        self.actors.get_mut(index)
    }

    pub fn find_actor(&self, name: &str) -> Option<usize> {
        self.actors.iter().position(|actor| actor.name() == name)
    }

    pub fn actors(&self) -> &[Actor] {
        &self.actors
    }

    pub fn len(&self) -> usize {
        self.actors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actors.is_empty()
    }

    pub fn update(&mut self, delta_time: f32, device_context: &mut DeviceContext) -> Result<()> {
        for actor in &mut self.actors {
            actor.update(delta_time, device_context)?;
        }
        Ok(())
    }

    pub fn render(&self, device_context: &mut DeviceContext) -> Result<()> {
        for actor in &self.actors {
            actor.render(device_context)?;
        }
        Ok(())
    }

    /// Destroy and drop every actor (idempotent)
    pub fn destroy(&mut self) {
        for actor in &mut self.actors {
            actor.destroy();
        }
        self.actors.clear();
    }
}

#[cfg(test)]
#[path = "scene_tests.rs"]
mod tests;
