pub mod agents;
pub mod bodies;
pub mod config;
pub mod grid;
pub mod nav;
mod random;
pub mod sim;
pub mod tunnels;
pub mod types;

pub use config::{ConfigError, PlayfieldConfig, SimConfig};
pub use grid::OccupancyGrid;
pub use nav::{NavState, Resolution};
pub use sim::{AdvanceResult, AdvanceStopReason, LossCause, SimError, SimEvent, Simulation};
pub use tunnels::{PathStep, StartingTunnels, TunnelGraph, TunnelSegment, reset_level};
pub use types::*;
