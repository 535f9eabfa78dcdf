//! Stable snapshot hashing for deterministic verification.
//! This module exists to keep hashing concerns separate from simulation control code.
//! It does not own replay or persistence of runs.

use std::collections::BTreeMap;
use std::hash::Hasher;

use xxhash_rust::xxh3::Xxh3;

use super::*;
use crate::agents::{EnemyStage, RoamerStage};
use crate::bodies::{BoulderStage, DrifterKind};
use crate::types::{Point, Pos, Rect};

fn write_point(hasher: &mut Xxh3, point: Point) {
    hasher.write_u64(point.x.to_bits());
    hasher.write_u64(point.y.to_bits());
}

fn write_pos(hasher: &mut Xxh3, pos: Pos) {
    hasher.write_i32(pos.x);
    hasher.write_i32(pos.y);
}

fn write_rect(hasher: &mut Xxh3, rect: Rect) {
    hasher.write_i32(rect.min_x);
    hasher.write_i32(rect.min_y);
    hasher.write_i32(rect.max_x);
    hasher.write_i32(rect.max_y);
}

impl Simulation {
    pub fn snapshot_hash(&self) -> u64 {
        let mut hasher = Xxh3::new();
        hasher.write_u64(self.seed);
        hasher.write_u64(self.tick);
        hasher.write_u64(self.level_tick);
        hasher.write_u32(self.level);
        hasher.write_u8(match self.lost {
            None => 0,
            Some(LossCause::Caught { by }) => 1 + by.code(),
            Some(LossCause::Crushed) => 8,
            Some(LossCause::Spiked) => 9,
            Some(LossCause::Ambushed) => 10,
        });
        hasher.write_u8(u8::from(self.cleared));

        write_point(&mut hasher, self.digger.pos());
        hasher.write_u8(self.digger.dir() as u8);
        let powers = self.digger.powers();
        for power in [PowerUp::Invisibility, PowerUp::Freeze, PowerUp::TurboEnemy] {
            hasher.write_u32(powers.remaining(power));
        }

        // Links are hashed by creation order so the hash does not depend on key encoding.
        let order: BTreeMap<SegmentId, u32> =
            self.graph.segments().enumerate().map(|(i, (id, _))| (id, i as u32)).collect();
        hasher.write_usize(order.len());
        for (_, seg) in self.graph.segments() {
            write_pos(&mut hasher, seg.start());
            write_pos(&mut hasher, seg.end());
            write_rect(&mut hasher, seg.rect());
            for link in seg.links() {
                hasher.write_u32(order.get(link).copied().unwrap_or(u32::MAX));
            }
        }
        hasher.write_usize(self.grid.dug_cell_count());

        for enemy in self.enemies.values() {
            hasher.write_u8(enemy.species().code());
            hasher.write_u8(match enemy.stage() {
                EnemyStage::Materialising => 0,
                EnemyStage::Hunting => 1,
                EnemyStage::Eating { .. } => 2,
            });
            write_point(&mut hasher, enemy.pos());
            hasher.write_u8(enemy.dir() as u8);
        }
        for boulder in self.boulders.values() {
            write_point(&mut hasher, boulder.pos());
            hasher.write_u8(match boulder.stage() {
                BoulderStage::Resting => 0,
                BoulderStage::Wobbling { .. } => 1,
                BoulderStage::Falling { .. } => 2,
                BoulderStage::Broken => 3,
            });
        }
        for drifter in self.drifters.values() {
            hasher.write_u8(match drifter.kind() {
                DrifterKind::Ball => 0,
                DrifterKind::Spiky => 1,
            });
            write_point(&mut hasher, drifter.pos());
        }
        for roamer in self.roamers.values() {
            hasher.write_u8(match roamer.stage() {
                RoamerStage::Materialising => 0,
                RoamerStage::Roaming => 1,
                RoamerStage::Eating { .. } => 2,
            });
            write_point(&mut hasher, roamer.pos());
            for &section in roamer.trail() {
                write_point(&mut hasher, section);
            }
        }
        hasher.write_usize(self.roamers_killed);
        for nugget in self.nuggets.values() {
            write_point(&mut hasher, nugget.pos());
            hasher.write_u8(nugget.power().map_or(u8::MAX, PowerUp::code));
            hasher.write_u8(u8::from(nugget.is_spoiled()));
        }
        hasher.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_tracks_progress() {
        let mut sim = Simulation::new(17, SimConfig::default()).unwrap();
        let before = sim.snapshot_hash();
        assert_eq!(before, sim.snapshot_hash());
        sim.advance(5);
        assert_ne!(before, sim.snapshot_hash());
    }

    #[test]
    fn seed_changes_hash() {
        let a = Simulation::new(1, SimConfig::default()).unwrap();
        let b = Simulation::new(2, SimConfig::default()).unwrap();
        assert_ne!(a.snapshot_hash(), b.snapshot_hash());
    }

    #[test]
    fn collected_nugget_changes_hash() {
        let mut sim = Simulation::new(5, SimConfig::default()).unwrap();
        let before = sim.snapshot_hash();
        let first = sim.nuggets.keys().next().unwrap();
        sim.nuggets.remove(first);
        assert_ne!(before, sim.snapshot_hash());
    }
}
