/// WorldState: everything a running session owns.
///
/// ## Grid discipline
///
/// Two grids are kept:
///   - `base_grid`: the level as loaded, untouched after `load_level`
///     (restarts reseed from it).
///   - `grid`: the authoritative live state.
///
/// Mutation passes clone `grid`, work on the clone, and hand it back via
/// `commit_grid()`, which also refreshes the pickup census. The entity
/// position fields (`player`, `enemies`) are re-synced by the same passes,
/// so grid and entities never disagree between commits.

use rand::rngs::SmallRng;
use rand::SeedableRng;

use crate::domain::entity::{Enemy, Player};
use crate::domain::grid::Grid;
use crate::domain::tile::Tile;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Phase {
    Title,
    /// Level loaded, waiting for the first key.
    Ready,
    Playing,
    /// An enemy reached the player; the session decides what follows.
    Caught,
    LevelComplete,
    GameOver,
    GameComplete,
}

pub struct WorldState {
    // ── Grid layers ──
    /// The level as loaded; restarts reseed from this.
    pub base_grid: Grid,
    /// Authoritative live state. Replaced wholesale by `commit_grid`.
    pub grid: Grid,

    // ── Entities ──
    pub player: Player,
    pub enemies: Vec<Enemy>,

    // ── Derived ──
    /// Pickup census, refreshed on every commit.
    pub pickups_remaining: usize,

    // ── Session RNG (spawn-point choice) ──
    pub rng: SmallRng,

    // ── Meta ──
    pub phase: Phase,
    pub score: u32,
    pub lives: u32,
    pub current_level: usize,
    pub total_levels: usize,
    pub level_name: String,
    #[allow(dead_code)]
    pub tick: u64,

    // ── UI ──
    pub message: String,
    pub message_timer: u32,
    /// Frames left in a timed phase (the caught pause).
    pub phase_timer: u32,

    // ── Spawn points (for restart) ──
    pub player_spawn: (usize, usize),
    pub enemy_spawns: Vec<(usize, usize)>,
}

impl WorldState {
    pub fn new() -> Self {
        WorldState {
            base_grid: Grid::new(0, 0),
            grid: Grid::new(0, 0),
            player: Player::new(0, 0),
            enemies: vec![],
            pickups_remaining: 0,
            rng: SmallRng::from_entropy(),
            phase: Phase::Title,
            score: 0,
            lives: 3,
            current_level: 0,
            total_levels: 0,
            level_name: String::new(),
            tick: 0,
            message: String::new(),
            message_timer: 0,
            phase_timer: 0,
            player_spawn: (0, 0),
            enemy_spawns: vec![],
        }
    }

    /// Replace the authoritative grid after a mutation pass and refresh
    /// the pickup census.
    pub fn commit_grid(&mut self, grid: Grid) {
        self.grid = grid;
        self.pickups_remaining = self.grid.count(Tile::Pickup);
    }

    pub fn set_message(&mut self, msg: &str, duration: u32) {
        self.message = msg.to_string();
        self.message_timer = duration;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn commit_refreshes_pickup_census() {
        let mut world = WorldState::new();
        let mut next = Grid::new(3, 3);
        next.set(0, 0, Tile::Pickup);
        next.set(2, 2, Tile::Pickup);
        world.commit_grid(next);
        assert_eq!(world.pickups_remaining, 2);
    }
}
