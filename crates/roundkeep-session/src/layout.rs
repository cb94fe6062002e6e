//! Random level layouts.
//!
//! A layout is rolled once per game, the first time a client calls
//! `init`. Production layouts are seeded from the wall clock at that moment,
//! so the same game code does not imply the same layout.

use std::time::{SystemTime, UNIX_EPOCH};

use rand::rngs::StdRng;
use rand::seq::index;
use rand::{Rng, SeedableRng};
use roundkeep_protocol::{Layout, LayoutRequest};

use crate::SessionError;

/// Rolls layouts from a request's population sizes.
#[derive(Debug, Clone)]
pub struct LayoutGenerator {
    rng: StdRng,
}

impl LayoutGenerator {
    /// Seeds from the current wall-clock time (nanoseconds since the epoch).
    pub fn from_clock() -> Self {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_nanos();
        Self::seeded(nanos as u64)
    }

    /// Seeds explicitly. Same seed and request, same layout.
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Rolls a layout.
    ///
    /// - `openExits`: `numOpenExits` distinct values from `[0, numExits)`,
    ///   sorted ascending.
    /// - `monsterSpawn`: one value from `[0, numMonsterSpawns)`.
    /// - `childSpawn`: one value from `[0, numChildSpawns)`.
    ///
    /// # Errors
    /// Returns [`SessionError::InvalidParameter`] if a sample count exceeds
    /// its population (this includes a spawn population of zero).
    pub fn generate(
        &mut self,
        request: &LayoutRequest,
    ) -> Result<Layout, SessionError> {
        let open_exits = self.sample_sorted(
            "numOpenExits",
            request.num_exits,
            request.num_open_exits,
        )?;
        let monster_spawn =
            self.sample_one("numMonsterSpawns", request.num_monster_spawns)?;
        let child_spawn =
            self.sample_one("numChildSpawns", request.num_child_spawns)?;

        Ok(Layout {
            open_exits,
            monster_spawn,
            child_spawn,
        })
    }

    /// Draws `amount` distinct values from `[0, population)` without
    /// replacement, ascending.
    fn sample_sorted(
        &mut self,
        field: &str,
        population: u32,
        amount: u32,
    ) -> Result<Vec<u32>, SessionError> {
        if amount > population {
            return Err(SessionError::InvalidParameter(format!(
                "{field} = {amount} exceeds population of {population}"
            )));
        }
        let mut picked: Vec<u32> =
            index::sample(&mut self.rng, population as usize, amount as usize)
                .into_iter()
                .map(|i| i as u32)
                .collect();
        picked.sort_unstable();
        Ok(picked)
    }

    fn sample_one(
        &mut self,
        field: &str,
        population: u32,
    ) -> Result<u32, SessionError> {
        if population == 0 {
            return Err(SessionError::InvalidParameter(format!(
                "{field} must be at least 1"
            )));
        }
        Ok(self.rng.random_range(0..population))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(exits: u32, open: u32, monsters: u32, children: u32) -> LayoutRequest {
        LayoutRequest {
            num_exits: exits,
            num_open_exits: open,
            num_monster_spawns: monsters,
            num_child_spawns: children,
        }
    }

    #[test]
    fn test_generate_three_of_five_exits_distinct_ascending() {
        for seed in 0..100 {
            let layout = LayoutGenerator::seeded(seed)
                .generate(&request(5, 3, 2, 2))
                .expect("valid request");

            assert_eq!(layout.open_exits.len(), 3);
            assert!(layout.open_exits.windows(2).all(|w| w[0] < w[1]));
            assert!(layout.open_exits.iter().all(|&e| e < 5));
        }
    }

    #[test]
    fn test_generate_spawns_within_range() {
        for seed in 0..100 {
            let layout = LayoutGenerator::seeded(seed)
                .generate(&request(4, 1, 3, 7))
                .unwrap();
            assert!(layout.monster_spawn < 3);
            assert!(layout.child_spawn < 7);
        }
    }

    #[test]
    fn test_generate_all_exits_open() {
        let layout = LayoutGenerator::seeded(3)
            .generate(&request(4, 4, 1, 1))
            .unwrap();
        assert_eq!(layout.open_exits, vec![0, 1, 2, 3]);
        assert_eq!(layout.monster_spawn, 0);
        assert_eq!(layout.child_spawn, 0);
    }

    #[test]
    fn test_generate_no_open_exits() {
        let layout = LayoutGenerator::seeded(3)
            .generate(&request(4, 0, 1, 1))
            .unwrap();
        assert!(layout.open_exits.is_empty());
    }

    #[test]
    fn test_generate_too_many_open_exits_returns_invalid_parameter() {
        let result = LayoutGenerator::seeded(1).generate(&request(5, 6, 1, 1));
        assert!(matches!(result, Err(SessionError::InvalidParameter(_))));
    }

    #[test]
    fn test_generate_zero_monster_spawns_returns_invalid_parameter() {
        let result = LayoutGenerator::seeded(1).generate(&request(5, 1, 0, 1));
        assert!(matches!(result, Err(SessionError::InvalidParameter(_))));
    }

    #[test]
    fn test_generate_zero_child_spawns_returns_invalid_parameter() {
        let result = LayoutGenerator::seeded(1).generate(&request(5, 1, 1, 0));
        assert!(matches!(result, Err(SessionError::InvalidParameter(_))));
    }

    #[test]
    fn test_same_seed_same_layout() {
        let req = request(10, 4, 5, 5);
        let a = LayoutGenerator::seeded(42).generate(&req).unwrap();
        let b = LayoutGenerator::seeded(42).generate(&req).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_from_clock_produces_valid_layout() {
        let layout = LayoutGenerator::from_clock()
            .generate(&request(5, 3, 2, 2))
            .unwrap();
        assert_eq!(layout.open_exits.len(), 3);
    }
}
