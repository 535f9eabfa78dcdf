//! Timed power-ups the digger picks up from nuggets.

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PowerUp {
    /// Enemies lose track of the digger and wander; roamers cannot hurt it.
    Invisibility,
    /// Enemies and spikies stand still and nothing can hurt the digger.
    Freeze,
    /// Tunnel enemies move at double speed.
    TurboEnemy,
}

impl PowerUp {
    /// Ticks the power lasts when collected on `level`.
    pub fn duration(self, level: u32) -> u32 {
        match self {
            PowerUp::Invisibility => {
                if level < 10 { 350 - 10 * level } else { 250 }
            }
            PowerUp::Freeze => {
                if level < 10 { 250 - 10 * level } else { 150 }
            }
            PowerUp::TurboEnemy => level.saturating_mul(10).saturating_add(100),
        }
    }

    pub fn code(self) -> u8 {
        match self {
            PowerUp::Invisibility => 0,
            PowerUp::Freeze => 1,
            PowerUp::TurboEnemy => 2,
        }
    }
}

/// Remaining ticks of each power. Collecting a power again restarts its timer.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PowerUps {
    invisible: u32,
    frozen: u32,
    turbo: u32,
}

impl PowerUps {
    pub fn grant(&mut self, power: PowerUp, level: u32) {
        let ticks = power.duration(level);
        match power {
            PowerUp::Invisibility => self.invisible = ticks,
            PowerUp::Freeze => self.frozen = ticks,
            PowerUp::TurboEnemy => self.turbo = ticks,
        }
    }

    pub fn tick(&mut self) {
        self.invisible = self.invisible.saturating_sub(1);
        self.frozen = self.frozen.saturating_sub(1);
        self.turbo = self.turbo.saturating_sub(1);
    }

    pub fn remaining(&self, power: PowerUp) -> u32 {
        match power {
            PowerUp::Invisibility => self.invisible,
            PowerUp::Freeze => self.frozen,
            PowerUp::TurboEnemy => self.turbo,
        }
    }

    pub fn is_invisible(&self) -> bool {
        self.invisible > 0
    }

    pub fn is_frozen(&self) -> bool {
        self.frozen > 0
    }

    pub fn is_turbo(&self) -> bool {
        self.turbo > 0
    }
}
