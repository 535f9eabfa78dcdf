//! Stand-in player for headless runs: wanders the field, digging, and flees enemies.

use super::*;
use crate::bodies::DrifterKind;
use crate::random::random_index;
use crate::types::{Direction, Point};

/// Enemies closer than this make the digger flee and throw a ball.
pub const THREAT_RANGE: f64 = 100.0;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(super) struct Autopilot {
    /// Ticks left before picking a fresh heading.
    hold: u32,
}

/// Heading straight away from `threat`, along whichever axis it is further on.
pub fn flee_direction(here: Point, threat: Point) -> Direction {
    let dx = here.x - threat.x;
    let dy = here.y - threat.y;
    if dx.abs() > dy.abs() {
        if dx < 0.0 { Direction::Left } else { Direction::Right }
    } else if dy < 0.0 {
        Direction::Up
    } else {
        Direction::Down
    }
}

impl Simulation {
    pub(super) fn steer_digger(&mut self) -> Result<(), NavError> {
        let here = self.digger.pos();
        let threat = self
            .enemies
            .values()
            .filter(|enemy| enemy.is_active())
            .map(|enemy| enemy.pos())
            .filter(|pos| pos.distance_to(here) < THREAT_RANGE)
            .min_by(|a, b| a.distance_to(here).total_cmp(&b.distance_to(here)));
        if let Some(threat) = threat {
            self.throw_ball();
            return self.digger.steer(&mut self.graph, flee_direction(here, threat));
        }

        let blocked = self.digger.take_blocked();
        if blocked || self.autopilot.hold == 0 {
            self.autopilot.hold = 20 + random_index(&mut self.rng, 100) as u32;
            let dir = Direction::MOVING[random_index(&mut self.rng, Direction::MOVING.len())];
            return self.digger.steer(&mut self.graph, dir);
        }
        self.autopilot.hold -= 1;
        Ok(())
    }

    /// Throws a ball the way the digger faces, unless one is already in flight.
    fn throw_ball(&mut self) {
        if self.drifters.values().any(|d| d.kind() == DrifterKind::Ball) {
            return;
        }
        let ball = Drifter::ball(self.digger.pos(), self.digger.facing());
        let id = self.drifters.insert(ball);
        self.log.push(SimEvent::BallThrown { drifter: id });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flees_along_dominant_axis() {
        let here = Point::new(100.0, 100.0);
        assert_eq!(flee_direction(here, Point::new(150.0, 110.0)), Direction::Left);
        assert_eq!(flee_direction(here, Point::new(60.0, 90.0)), Direction::Right);
        assert_eq!(flee_direction(here, Point::new(95.0, 160.0)), Direction::Up);
        assert_eq!(flee_direction(here, Point::new(105.0, 40.0)), Direction::Down);
    }

    #[test]
    fn nearby_enemy_triggers_single_ball() {
        let config = SimConfig { boulders: 0, ..SimConfig::default() };
        let mut sim = Simulation::new(2, config).unwrap();
        let home = sim.graph.home().unwrap();
        sim.enemies.insert(Enemy::placed(Species::Pursuer, 1, Point::new(325.0, 150.0), home));

        sim.steer_digger().unwrap();
        sim.steer_digger().unwrap();
        let balls = sim.drifters.values().filter(|d| d.kind() == DrifterKind::Ball).count();
        assert_eq!(balls, 1);
        assert_eq!(sim.digger.dir(), Direction::Up);
    }

    #[test]
    fn wandering_holds_heading_between_picks() {
        let config = SimConfig { boulders: 0, ..SimConfig::default() };
        let mut sim = Simulation::new(4, config).unwrap();
        sim.steer_digger().unwrap();
        let heading = sim.digger.dir();
        assert!(heading.is_moving());
        for _ in 0..19 {
            sim.steer_digger().unwrap();
            assert_eq!(sim.digger.dir(), heading);
        }
    }
}
