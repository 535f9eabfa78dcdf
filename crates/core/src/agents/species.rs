//! Capability table for the pursuit enemies.
//! This module exists so per-level tuning lives in one place instead of inside tick code.
//! It does not own movement or target selection.

use serde::{Deserialize, Serialize};

/// Links searched when a forager looks for a resting boulder to eat.
pub const DINNER_SEARCH_DEPTH: u32 = 5;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Species {
    /// Chases the digger, pathfinding most ticks and wandering the rest.
    Pursuer,
    /// Chases the digger too, but detours to eat resting boulders it can reach.
    Forager,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Behavior {
    pub speed: f64,
    pub search_depth: u32,
    /// Body radius used for contact tests.
    pub radius: f64,
    /// Chance, out of `path_odds.1`, that a pursuer pathfinds instead of wandering.
    pub path_odds: (u64, u64),
}

impl Species {
    pub fn behavior(self, level: u32) -> Behavior {
        let scaled = f64::from(level.min(19)) * 0.2;
        match self {
            Species::Pursuer => Behavior {
                speed: if level < 20 { 2.0 + scaled } else { 6.0 },
                search_depth: if level < 4 { 2 + level } else { 6 },
                radius: 20.0,
                path_odds: (4, 5),
            },
            Species::Forager => Behavior {
                speed: if level < 20 { 2.2 + scaled } else { 6.2 },
                search_depth: if level < 4 { 3 + level } else { 7 },
                radius: 15.0,
                path_odds: (1, 1),
            },
        }
    }

    pub fn code(self) -> u8 {
        match self {
            Species::Pursuer => 0,
            Species::Forager => 1,
        }
    }
}

/// Descent per tick while an enemy materialises above the spawn point.
pub fn materialise_step(level: u32) -> f64 {
    if level < 10 { 1.0 + f64::from(level) / 10.0 } else { 2.0 }
}

/// Ticks a forager spends on a boulder once it starts eating.
pub fn eating_ticks(level: u32) -> u32 {
    if level < 10 { 100 - 5 * level } else { 50 }
}
