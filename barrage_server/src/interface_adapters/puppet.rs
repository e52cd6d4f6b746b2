use glam::DVec3;
use tracing::trace;

use crate::domain::{PuppetError, Puppet, WorldId};

/// Puppet that only reports its moves to the log. Used by the headless host.
#[derive(Debug, Default)]
pub struct TracingPuppet {
    label: &'static str,
    position: Option<DVec3>,
    cancelled: bool,
}

impl TracingPuppet {
    pub fn new(label: &'static str) -> Self {
        Self {
            label,
            ..Self::default()
        }
    }

    pub fn position(&self) -> Option<DVec3> {
        self.position
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled
    }

    fn ensure_live(&self) -> Result<(), PuppetError> {
        if self.cancelled {
            return Err(PuppetError::Cancelled);
        }
        if self.position.is_none() {
            return Err(PuppetError::NotSpawned);
        }
        Ok(())
    }
}

impl Puppet for TracingPuppet {
    fn spawn_in_world(&mut self, world: WorldId, pos: DVec3) -> Result<(), PuppetError> {
        if self.cancelled {
            return Err(PuppetError::Cancelled);
        }
        trace!(label = self.label, %world, ?pos, "puppet spawned");
        self.position = Some(pos);
        Ok(())
    }

    fn teleport_to(&mut self, pos: DVec3) -> Result<(), PuppetError> {
        self.ensure_live()?;
        trace!(label = self.label, ?pos, "puppet moved");
        self.position = Some(pos);
        Ok(())
    }

    fn cancel(&mut self) -> Result<(), PuppetError> {
        self.ensure_live()?;
        trace!(label = self.label, "puppet cancelled");
        self.cancelled = true;
        Ok(())
    }
}

/// Puppet for barrages without any external representation.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullPuppet;

impl Puppet for NullPuppet {
    fn spawn_in_world(&mut self, _world: WorldId, _pos: DVec3) -> Result<(), PuppetError> {
        Ok(())
    }

    fn teleport_to(&mut self, _pos: DVec3) -> Result<(), PuppetError> {
        Ok(())
    }

    fn cancel(&mut self) -> Result<(), PuppetError> {
        Ok(())
    }
}
