//! Bodies that move by grid probes alone: bouncing drifters and falling boulders. Nuggets
//! sit still in the ground until collected.

mod boulder;
mod drifter;
mod nugget;

pub use boulder::{
    BOULDER_RADIUS, Boulder, BoulderEvent, BoulderStage, FALL_SPEED, PUSH_SPEED, break_height,
    place_boulders, wobble_ticks,
};
pub use drifter::{Bounce, Drifter, DrifterKind};
pub use nugget::{NUGGET_RADIUS, Nugget, nugget_count, place_nuggets, power_ups};
