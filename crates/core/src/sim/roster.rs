//! Per-level spawn schedule for enemies, spikies and roamers.

use super::*;
use crate::agents::roamer_quota;
use crate::bodies::NUGGET_RADIUS;
use crate::random::one_in;

pub fn first_pursuer_tick(level: u32) -> u64 {
    if level < 10 { u64::from(40 - 2 * level) } else { 20 }
}

pub fn pursuer_interval(level: u32) -> u64 {
    if level < 10 { u64::from(300 - 20 * level) } else { 100 }
}

pub fn forager_interval(level: u32) -> u64 {
    if level < 15 { u64::from(250 - 10 * level) } else { 100 }
}

/// Whether a forager is due at `tick` of `level`. Early levels release them at fixed
/// moments, later ones on a shrinking period.
pub fn forager_due(level: u32, tick: u64) -> bool {
    match level {
        1 => tick == 500 || tick == 1000,
        2 => matches!(tick, 400 | 800 | 1200),
        3 | 4 => tick % 300 == 0,
        5 | 6 => tick % 250 == 0,
        7 | 8 => tick % 200 == 0,
        _ => tick % forager_interval(level) == 0,
    }
}

/// `(grace_ticks, one_in)` for spiky spawns, or `None` on levels that have none.
pub fn spiky_odds(level: u32) -> Option<(u64, u64)> {
    match level {
        0..=3 => None,
        4 => Some((500, 400)),
        5..=8 => Some((500, 300)),
        _ => Some((400, 200)),
    }
}

impl Simulation {
    pub(super) fn spawn_scheduled(&mut self) {
        let tick = self.level_tick;
        let level = self.level;

        if tick == 1 {
            self.spawn_roamers();
        }
        let pursuer_due = tick == first_pursuer_tick(level) || tick % pursuer_interval(level) == 0;
        if pursuer_due && self.count_species(Species::Pursuer) < self.config.pursuers {
            self.spawn_enemy(Species::Pursuer);
        }
        if forager_due(level, tick) && self.count_species(Species::Forager) < self.config.foragers
        {
            self.spawn_enemy(Species::Forager);
        }
        if let Some((grace, odds)) = spiky_odds(level)
            && tick > grace
            && self.count_spikies() < self.config.drifters
            && one_in(&mut self.rng, 1, odds)
        {
            self.spawn_spiky();
        }
    }

    fn count_species(&self, species: Species) -> usize {
        self.enemies.values().filter(|enemy| enemy.species() == species).count()
    }

    fn count_spikies(&self) -> usize {
        self.drifters.values().filter(|drifter| drifter.kind() == DrifterKind::Spiky).count()
    }

    fn spawn_enemy(&mut self, species: Species) {
        let Some(enemy) = Enemy::spawn(species, &self.graph, &self.config.playfield, self.level)
        else {
            log::warn!("no home segment to spawn a {species:?} into");
            return;
        };
        let id = self.enemies.insert(enemy);
        log::debug!("tick {}: {species:?} {id:?} materialising", self.tick);
        self.log.push(SimEvent::EnemySpawned { enemy: id, species });
    }

    /// Tops roamers up to the level's quota, less any squashed this level.
    fn spawn_roamers(&mut self) {
        let quota = roamer_quota(self.level)
            .min(self.config.roamers)
            .saturating_sub(self.roamers_killed);
        let obstacles: Vec<_> = self
            .boulders
            .values()
            .map(|b| (b.pos(), b.radius()))
            .chain(self.nuggets.values().map(|n| (n.pos(), NUGGET_RADIUS)))
            .collect();
        while self.roamers.len() < quota {
            let Some(roamer) = Roamer::spawn(
                &self.grid,
                &self.config.playfield,
                self.level,
                &obstacles,
                &mut self.rng,
            ) else {
                log::debug!("no buried spot left for a roamer");
                return;
            };
            let id = self.roamers.insert(roamer);
            log::debug!("tick {}: roamer {id:?} burrowing in", self.tick);
            self.log.push(SimEvent::RoamerSpawned { roamer: id });
        }
    }

    fn spawn_spiky(&mut self) {
        let avoid = Some(self.digger.segment());
        let Some(spiky) = Drifter::spiky(&self.graph, self.level, avoid, &mut self.rng) else {
            return;
        };
        let id = self.drifters.insert(spiky);
        log::debug!("tick {}: spiky {id:?} released", self.tick);
        self.log.push(SimEvent::SpikySpawned { drifter: id });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pursuer_timings_scale_with_level() {
        assert_eq!(first_pursuer_tick(1), 38);
        assert_eq!(first_pursuer_tick(12), 20);
        assert_eq!(pursuer_interval(1), 280);
        assert_eq!(pursuer_interval(10), 100);
    }

    #[test]
    fn foragers_follow_level_table() {
        assert!(forager_due(1, 500));
        assert!(!forager_due(1, 240));
        assert!(forager_due(2, 1200));
        assert!(forager_due(4, 600));
        assert!(forager_due(6, 750));
        assert!(forager_due(8, 400));
        assert!(forager_due(10, 150));
        assert!(forager_due(20, 300));
    }

    #[test]
    fn spikies_wait_for_level_four() {
        assert_eq!(spiky_odds(3), None);
        assert_eq!(spiky_odds(4), Some((500, 400)));
        assert_eq!(spiky_odds(11), Some((400, 200)));
    }

    #[test]
    fn roster_respects_configured_caps() {
        let config = SimConfig { pursuers: 1, ..SimConfig::default() };
        let mut sim = Simulation::new(9, config).unwrap();
        for tick in 1..=600 {
            sim.level_tick = tick;
            sim.spawn_scheduled();
        }
        assert_eq!(sim.count_species(Species::Pursuer), 1);
        assert_eq!(sim.count_species(Species::Forager), 1);
    }

    #[test]
    fn roamers_join_from_level_three() {
        let mut sim = Simulation::new(9, SimConfig::default()).unwrap();
        sim.level_tick = 1;
        sim.spawn_scheduled();
        assert_eq!(sim.roamers.len(), 0);

        let config = SimConfig { level: 7, roamers: 1, ..SimConfig::default() };
        let mut sim = Simulation::new(9, config).unwrap();
        sim.level_tick = 1;
        sim.spawn_scheduled();
        assert_eq!(sim.roamers.len(), 1);
        let (id, _) = sim.roamers.iter().next().unwrap();
        assert!(sim.log().contains(&SimEvent::RoamerSpawned { roamer: id }));
    }

    #[test]
    fn squashed_roamers_stay_gone_for_the_level() {
        let config = SimConfig { level: 8, ..SimConfig::default() };
        let mut sim = Simulation::new(2, config).unwrap();
        sim.roamers_killed = 1;
        sim.level_tick = 1;
        sim.spawn_scheduled();
        assert_eq!(sim.roamers.len(), 1);

        sim.start_level(8).unwrap();
        sim.level_tick = 1;
        sim.spawn_scheduled();
        assert_eq!(sim.roamers.len(), 2);
    }
}
