//! Agents that navigate the tunnel network: the digger that builds it and the enemies that
//! hunt through it. Roamers burrow through the ground around it instead.

mod digger;
mod enemy;
mod powers;
mod roamer;
mod species;

pub use digger::{Digger, digger_speed};
pub use enemy::{Enemy, EnemyStage, Meal, Quarry, Surroundings};
pub use species::{Behavior, DINNER_SEARCH_DEPTH, Species, eating_ticks, materialise_step};
pub use powers::{PowerUp, PowerUps};
pub use roamer::{Forage, ROAMER_HEAD_RADIUS, ROAMER_RADIUS, Roamer, RoamerStage, roamer_quota};
