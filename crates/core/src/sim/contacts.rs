//! Contact resolution between the digger, enemies, roamers, boulders, drifters and nuggets.
//! This module exists to apply the outcome of bodies touching once everything has moved.
//! It does not move anything itself, beyond backing bodies off a boulder they ran into.

use std::cmp::Ordering;

use super::*;
use crate::agents::{EnemyStage, ROAMER_HEAD_RADIUS};
use crate::bodies::{BOULDER_RADIUS, NUGGET_RADIUS};
use crate::types::{Direction, Point};

/// Half the digger's sprite; enemies and boulders closer than this plus their own radius touch it.
pub const DIGGER_RADIUS: f64 = 20.0;
/// Overlap the digger tolerates from a boulder: a falling one grazing it by no more than
/// this does not crush it, and a resting one overlapping it by less does not stop it.
const BOULDER_LEEWAY: f64 = 10.0;
/// A freshly thrown ball starts on top of the digger; it can only be caught back later.
const BALL_CATCH_AGE: u32 = 10;

fn touching(a: Point, a_radius: f64, b: Point, b_radius: f64) -> bool {
    a.distance_to(b) < a_radius + b_radius
}

fn overlap(a: Point, a_radius: f64, b: Point, b_radius: f64) -> f64 {
    a_radius + b_radius - a.distance_to(b)
}

/// Horizontal side of `from` that `to` lies on.
fn side_of(from: Point, to: Point) -> Direction {
    if to.x < from.x { Direction::Left } else { Direction::Right }
}

impl Simulation {
    pub(super) fn resolve_contacts(&mut self) -> Result<(), NavError> {
        self.falling_boulders_hit();
        self.boulders_meet();
        self.enemies_meet_boulders();
        self.roamers_meet_bodies();
        self.drifters_meet_bodies();
        self.balls_hit_enemies();
        self.digger_meets_bodies();

        if let Some(cause) = self.digger_hazard() {
            self.digger.finish(&mut self.graph)?;
            log::info!("tick {}: digger lost ({cause:?})", self.tick);
            self.lost = Some(cause);
            self.log.push(SimEvent::DiggerLost { cause });
        }
        Ok(())
    }

    fn falling_boulders_hit(&mut self) {
        let falling: Vec<Point> =
            self.boulders.values().filter(|b| b.is_falling()).map(|b| b.pos()).collect();
        if falling.is_empty() {
            return;
        }
        let radius = f64::from(BOULDER_RADIUS);
        let crushed: Vec<AgentId> = self
            .enemies
            .iter()
            .filter(|(_, enemy)| enemy.is_active())
            .filter(|(_, enemy)| {
                falling.iter().any(|&at| touching(at, radius, enemy.pos(), enemy.behavior().radius))
            })
            .map(|(id, _)| id)
            .collect();
        for id in crushed {
            self.enemies.remove(id);
            log::debug!("tick {}: {id:?} crushed", self.tick);
            self.log.push(SimEvent::EnemyCrushed { enemy: id });
        }

        let spikies: Vec<BodyId> = self
            .drifters
            .iter()
            .filter(|(_, d)| d.kind() == DrifterKind::Spiky)
            .filter(|(_, d)| falling.iter().any(|&at| touching(at, radius, d.pos(), d.radius())))
            .map(|(id, _)| id)
            .collect();
        for id in spikies {
            self.drifters.remove(id);
            log::debug!("tick {}: spiky {id:?} crushed", self.tick);
            self.log.push(SimEvent::SpikyCrushed { drifter: id });
        }
    }

    /// Touching boulders hold each other up: the higher one rests on the lower and neither
    /// can be pushed into the other.
    fn boulders_meet(&mut self) {
        let ids: Vec<BodyId> = self.boulders.keys().collect();
        for (i, &a) in ids.iter().enumerate() {
            for &b in &ids[i + 1..] {
                let (at_a, at_b) = (self.boulders[a].pos(), self.boulders[b].pos());
                if !touching(at_a, self.boulders[a].radius(), at_b, self.boulders[b].radius()) {
                    continue;
                }
                self.boulders[a].block_push(side_of(at_a, at_b));
                self.boulders[b].block_push(side_of(at_b, at_a));

                let upper = match at_a.y.total_cmp(&at_b.y) {
                    Ordering::Less => a,
                    Ordering::Greater => b,
                    Ordering::Equal => continue,
                };
                if let Some(BoulderEvent::Landed { segment }) =
                    self.boulders[upper].rest_on_boulder(&self.graph)
                {
                    log::debug!("tick {}: {upper:?} landed on another boulder", self.tick);
                    self.log.push(SimEvent::BoulderLanded { boulder: upper, segment });
                }
            }
        }
    }

    /// Foragers start eating a resting boulder they bump into; every other enemy that
    /// touches a boulder on the ground backs away from it.
    fn enemies_meet_boulders(&mut self) {
        let ids: Vec<AgentId> = self.enemies.keys().collect();
        for id in ids {
            let enemy = &self.enemies[id];
            if !matches!(enemy.stage(), EnemyStage::Hunting) {
                continue;
            }
            let (pos, radius) = (enemy.pos(), enemy.behavior().radius);
            let Some((boulder_id, boulder)) = self
                .boulders
                .iter()
                .filter(|(_, b)| !b.is_falling())
                .find(|(_, b)| touching(b.pos(), b.radius(), pos, radius))
            else {
                continue;
            };
            let (resting, at) = (boulder.is_resting(), boulder.pos());

            let enemy = &mut self.enemies[id];
            if enemy.species() == Species::Forager && resting {
                enemy.start_eating(boulder_id);
                self.boulders.remove(boulder_id);
                log::debug!("tick {}: {id:?} eating {boulder_id:?}", self.tick);
                self.log.push(SimEvent::BoulderEaten { boulder: boulder_id, by: id });
            } else {
                enemy.drop_dinner(boulder_id);
                enemy.reverse(&self.graph);
                self.boulders[boulder_id].block_push(side_of(at, pos));
            }
        }
    }

    /// Roamers turn away from boulders and start on the nugget they were after once their
    /// head reaches it.
    fn roamers_meet_bodies(&mut self) {
        let ids: Vec<AgentId> = self.roamers.keys().collect();
        for id in ids {
            let roamer = &self.roamers[id];
            if !roamer.is_active() {
                continue;
            }
            let (head, target) = (roamer.pos(), roamer.target());
            let boulder = self
                .boulders
                .iter()
                .find(|(_, b)| touching(b.pos(), b.radius(), head, ROAMER_HEAD_RADIUS))
                .map(|(boulder_id, b)| (boulder_id, b.pos()));
            if let Some((boulder_id, at)) = boulder {
                self.boulders[boulder_id].block_push(side_of(at, head));
                self.roamers[id].shove_from(at);
                continue;
            }

            let Some(target) = target else {
                continue;
            };
            let reached = self
                .nuggets
                .get(target)
                .is_some_and(|n| touching(n.pos(), NUGGET_RADIUS, head, ROAMER_HEAD_RADIUS));
            if reached && self.roamers[id].start_eating(target) {
                if let Some(nugget) = self.nuggets.get_mut(target) {
                    nugget.spoil();
                }
                log::debug!("tick {}: roamer {id:?} chewing {target:?}", self.tick);
                self.log.push(SimEvent::NuggetSpoiled { nugget: target, by: id });
            }
        }
    }

    /// Drifters glance off boulders, and balls off roamers too. A spiky that runs into a
    /// ball glances off it and destroys it.
    fn drifters_meet_bodies(&mut self) {
        let ids: Vec<BodyId> = self.drifters.keys().collect();
        for id in ids {
            let Some(drifter) = self.drifters.get(id) else {
                continue;
            };
            let (pos, radius, kind) = (drifter.pos(), drifter.radius(), drifter.kind());

            let mut obstacle = self
                .boulders
                .values()
                .find(|b| touching(b.pos(), b.radius(), pos, radius))
                .map(|b| b.pos());
            if obstacle.is_none() && kind == DrifterKind::Ball {
                obstacle = self.roamers.values().find(|r| r.touches(pos, radius)).map(|r| r.pos());
            }
            if let Some(at) = obstacle {
                self.drifters[id].rebound_from(at);
                continue;
            }

            if kind != DrifterKind::Spiky {
                continue;
            }
            let ball = self
                .drifters
                .iter()
                .filter(|(_, d)| d.kind() == DrifterKind::Ball)
                .find(|(_, d)| touching(d.pos(), d.radius(), pos, radius))
                .map(|(ball_id, d)| (ball_id, d.pos()));
            if let Some((ball_id, at)) = ball {
                self.drifters[id].rebound_from(at);
                self.drifters.remove(ball_id);
                log::debug!("tick {}: spiky {id:?} smashed ball {ball_id:?}", self.tick);
                self.log.push(SimEvent::BallDestroyed { drifter: ball_id });
            }
        }
    }

    fn balls_hit_enemies(&mut self) {
        let balls: Vec<BodyId> = self
            .drifters
            .iter()
            .filter(|(_, d)| d.kind() == DrifterKind::Ball)
            .map(|(id, _)| id)
            .collect();
        for ball_id in balls {
            let ball = &self.drifters[ball_id];
            let target = self
                .enemies
                .iter()
                .filter(|(_, enemy)| enemy.is_active())
                .find(|(_, enemy)| {
                    touching(ball.pos(), ball.radius(), enemy.pos(), enemy.behavior().radius)
                })
                .map(|(id, _)| id);
            if let Some(enemy_id) = target {
                self.enemies.remove(enemy_id);
                self.drifters.remove(ball_id);
                log::debug!("tick {}: ball knocked out {enemy_id:?}", self.tick);
                self.log.push(SimEvent::EnemyKnockedOut { enemy: enemy_id });
            }
        }
    }

    /// Everything the digger touches without being hurt: nuggets, its own returning balls,
    /// resting boulders in its way, and roamers while a power-up protects it.
    fn digger_meets_bodies(&mut self) {
        self.collect_nuggets();

        let here = self.digger.pos();
        let caught: Vec<BodyId> = self
            .drifters
            .iter()
            .filter(|(_, d)| d.kind() == DrifterKind::Ball && d.age() > BALL_CATCH_AGE)
            .filter(|(_, d)| touching(d.pos(), d.radius(), here, DIGGER_RADIUS))
            .map(|(id, _)| id)
            .collect();
        for id in caught {
            self.drifters.remove(id);
            self.log.push(SimEvent::BallCaught { drifter: id });
        }

        let (dx, dy) = self.digger.dir().delta();
        let blocking = self
            .boulders
            .iter()
            .filter(|(_, b)| !b.is_falling())
            .filter(|(_, b)| (b.pos().x - here.x) * dx + (b.pos().y - here.y) * dy > 0.0)
            .find(|(_, b)| overlap(b.pos(), b.radius(), here, DIGGER_RADIUS) >= BOULDER_LEEWAY)
            .map(|(id, _)| id);
        if let Some(id) = blocking {
            let pushed = self.boulders[id].push(self.digger.dir(), &self.grid);
            self.digger.bump(pushed);
        }

        let powers = self.digger.powers();
        if powers.is_invisible() || powers.is_frozen() {
            let here = self.digger.pos();
            let squashed: Vec<AgentId> = self
                .roamers
                .iter()
                .filter(|(_, roamer)| roamer.touches(here, DIGGER_RADIUS))
                .map(|(id, _)| id)
                .collect();
            for id in squashed {
                self.roamers.remove(id);
                self.roamers_killed += 1;
                log::debug!("tick {}: roamer {id:?} squashed", self.tick);
                self.log.push(SimEvent::RoamerKilled { roamer: id });
            }
        }
    }

    fn collect_nuggets(&mut self) {
        let here = self.digger.pos();
        let found: Vec<BodyId> = self
            .nuggets
            .iter()
            .filter(|(_, n)| touching(n.pos(), NUGGET_RADIUS, here, DIGGER_RADIUS))
            .map(|(id, _)| id)
            .collect();
        for id in found {
            let Some(nugget) = self.nuggets.remove(id) else {
                continue;
            };
            let power = nugget.reward();
            if let Some(power) = power {
                log::debug!("tick {}: digger picked up {power:?}", self.tick);
                self.digger.grant(power);
            }
            self.log.push(SimEvent::NuggetCollected { nugget: id, power });
            if self.nuggets.is_empty() {
                log::info!("tick {}: level {} cleared", self.tick, self.level);
                self.cleared = true;
                self.log.push(SimEvent::LevelCleared { level: self.level });
            }
        }
    }

    fn digger_hazard(&self) -> Option<LossCause> {
        let here = self.digger.pos();
        let radius = f64::from(BOULDER_RADIUS);
        let crushed = self.boulders.values().any(|b| {
            b.is_falling() && overlap(b.pos(), radius, here, DIGGER_RADIUS) > BOULDER_LEEWAY
        });
        if crushed {
            return Some(LossCause::Crushed);
        }
        let powers = self.digger.powers();
        if powers.is_frozen() {
            return None;
        }
        let catcher = self
            .enemies
            .values()
            .filter(|enemy| enemy.is_active())
            .find(|enemy| enemy.pos().distance_to(here) < self.config.catch_radius);
        if let Some(enemy) = catcher {
            return Some(LossCause::Caught { by: enemy.species() });
        }
        if !powers.is_invisible() && self.roamers.values().any(|r| r.touches(here, DIGGER_RADIUS))
        {
            return Some(LossCause::Ambushed);
        }
        let spiked = self.drifters.values().any(|d| {
            d.kind() == DrifterKind::Spiky && touching(d.pos(), d.radius(), here, DIGGER_RADIUS)
        });
        spiked.then_some(LossCause::Spiked)
    }
}
