//! Gold nuggets buried in the ground. Collecting every one clears the level; a few of them
//! carry a power-up.

use std::{iter, mem};

use rand_chacha::ChaCha8Rng;

use crate::agents::PowerUp;
use crate::config::PlayfieldConfig;
use crate::grid::OccupancyGrid;
use crate::random::random_index;
use crate::types::Point;

pub const NUGGET_RADIUS: f64 = 15.0;
const MAX_NUGGETS: usize = 40;
const PLACEMENT_TRIES: usize = 200;

#[derive(Clone, Debug, PartialEq)]
pub struct Nugget {
    pos: Point,
    power: Option<PowerUp>,
    /// A roamer has chewed on it; the power-up is gone but it still counts toward the level.
    spoiled: bool,
}

impl Nugget {
    pub fn new(pos: Point, power: Option<PowerUp>) -> Self {
        Self { pos, power, spoiled: false }
    }

    pub fn pos(&self) -> Point {
        self.pos
    }

    pub fn power(&self) -> Option<PowerUp> {
        self.power
    }

    pub fn is_spoiled(&self) -> bool {
        self.spoiled
    }

    /// What collecting it grants the digger.
    pub fn reward(&self) -> Option<PowerUp> {
        if self.spoiled { None } else { self.power }
    }

    /// Returns true the first time only.
    pub fn spoil(&mut self) -> bool {
        !mem::replace(&mut self.spoiled, true)
    }
}

pub fn nugget_count(level: u32) -> usize {
    (level as usize).saturating_mul(3).saturating_add(10).min(MAX_NUGGETS)
}

/// Power-ups hidden in a level's nuggets, in the order they are handed out.
pub fn power_ups(level: u32) -> Vec<PowerUp> {
    let (invisible, freeze, turbo) = match level {
        0..=2 => (0, 0, 0),
        3..=5 => (1, 0, 1),
        6 => (1, 1, 1),
        7 => (2, 1, 1),
        8 => (2, 1, 2),
        _ => (2, 2, 2),
    };
    iter::repeat_n(PowerUp::Invisibility, invisible)
        .chain(iter::repeat_n(PowerUp::Freeze, freeze))
        .chain(iter::repeat_n(PowerUp::TurboEnemy, turbo))
        .collect()
}

/// Buries a level's nuggets in solid ground, clear of the spawn point, the listed obstacles
/// and each other. A nugget that finds no room is left out.
pub fn place_nuggets(
    grid: &OccupancyGrid,
    config: &PlayfieldConfig,
    level: u32,
    obstacles: &[(Point, f64)],
    rng: &mut ChaCha8Rng,
) -> Vec<Nugget> {
    let diameter = (2.0 * NUGGET_RADIUS) as i32;
    let x_span = (config.size - diameter).max(1) as usize;
    let y_span = (config.size - config.play_area_top - diameter).max(1) as usize;
    let spawn = Point::from(config.spawn());
    let keep_clear = f64::from(config.corridor_width * 2);
    let mut powers = power_ups(level).into_iter();
    let mut placed: Vec<Nugget> = Vec::new();

    for _ in 0..nugget_count(level) {
        let spot = (0..PLACEMENT_TRIES)
            .map(|_| {
                let x = random_index(rng, x_span) as i32 + diameter / 2;
                let y = config.play_area_top + random_index(rng, y_span) as i32 + diameter / 2;
                Point::new(f64::from(x), f64::from(y))
            })
            .find(|&at| {
                let cell = at.cell();
                grid.is_solid_ground(cell.x, cell.y)
                    && at.distance_to(spawn) >= keep_clear
                    && obstacles
                        .iter()
                        .all(|&(pos, r)| pos.distance_to(at) >= r + NUGGET_RADIUS)
                    && placed.iter().all(|n| n.pos.distance_to(at) >= 2.0 * NUGGET_RADIUS)
            });
        match spot {
            Some(at) => placed.push(Nugget::new(at, powers.next())),
            None => log::debug!("no room left for nugget {}", placed.len() + 1),
        }
    }
    placed
}
