/// The two state-transition entry points: `handle_move` for the input
/// trigger and `handle_tick` for the timer trigger.
///
/// Both run to completion against a working copy of the grid and commit
/// it atomically; neither is reentrant and the session loop never overlaps
/// them, so copy-then-commit is the whole concurrency story.
///
/// Tick processing order:
///   1. Every enemy decides against the shared pre-tick snapshot
///   2. Moves/trap markings applied to the working grid (last-write-wins)
///   3. Catch check (terminal)
///   4. Global-trap conversion to pickups + respawn
///   5. Commit

use rand::rngs::SmallRng;
use rand::Rng;

use crate::domain::ai;
use crate::domain::entity::{Enemy, MoveDir, Player};
use crate::domain::grid::Grid;
use crate::domain::rules::{self, MoveOutcome};
use crate::domain::tile::Tile;
use super::event::GameEvent;
use super::world::{Phase, WorldState};

pub const PICKUP_POINTS: u32 = 100;
pub const CLEAR_POINTS: u32 = 500;

/// Replacements spawned after a full-swarm conversion.
const RESPAWN_COUNT: usize = 2;
/// Spawn candidates sit this far in from the edge, clear of the boundary wall.
const SPAWN_MARGIN: usize = 2;

// ══════════════════════════════════════════════════════════════
// Input trigger
// ══════════════════════════════════════════════════════════════

pub fn handle_move(world: &mut WorldState, dir: MoveDir) -> Vec<GameEvent> {
    if world.phase != Phase::Playing {
        return vec![];
    }

    let mut events: Vec<GameEvent> = Vec::new();
    let (dx, dy) = dir.delta();

    let mut working = world.grid.snapshot();
    match rules::resolve_player_move(&mut working, world.player.x, world.player.y, dx, dy) {
        MoveOutcome::Stepped { x, y, pickup } => {
            world.player.x = x;
            world.player.y = y;
            if pickup {
                world.score += PICKUP_POINTS;
                events.push(GameEvent::PickupCollected { x, y });
                events.push(GameEvent::ScoreChanged { score: world.score });
            }
            world.commit_grid(working);

            // Clearing the board is only possible by collecting; a pickup
            // crushed under a block just shrinks the census.
            if pickup && world.pickups_remaining == 0 {
                world.score += CLEAR_POINTS;
                events.push(GameEvent::ScoreChanged { score: world.score });
                events.push(GameEvent::LevelCleared);
                world.phase = Phase::LevelComplete;
            }
        }
        MoveOutcome::Blocked => {
            // Wall, enemy, or unpushable chain. The working copy is
            // untouched; nothing to commit.
        }
    }

    events
}

// ══════════════════════════════════════════════════════════════
// Timer trigger
// ══════════════════════════════════════════════════════════════

pub fn handle_tick(world: &mut WorldState) -> Vec<GameEvent> {
    if world.phase != Phase::Playing {
        return vec![];
    }

    let mut events: Vec<GameEvent> = Vec::new();
    world.tick += 1;

    // All enemies classify against the same pre-tick state; order only
    // matters for last-write-wins on contested cells.
    let snapshot = world.grid.snapshot();
    let mut working = world.grid.snapshot();
    let (px, py) = (world.player.x, world.player.y);

    let mut any_moved = false;
    let mut caught = false;

    for i in 0..world.enemies.len() {
        let (ex, ey) = (world.enemies[i].x, world.enemies[i].y);
        match ai::choose_step(&snapshot, ex, ey, px, py) {
            None => {
                if working.tile_at(ex, ey) != Tile::EnemyTrapped {
                    events.push(GameEvent::EnemyTrapped { x: ex, y: ey });
                }
                working.set(ex, ey, Tile::EnemyTrapped);
            }
            Some((nx, ny)) => {
                if snapshot.tile_at(nx, ny) == Tile::Player {
                    caught = true;
                }
                working.set(ex, ey, Tile::Empty);
                working.set(nx, ny, Tile::Enemy);
                world.enemies[i].x = nx;
                world.enemies[i].y = ny;
                any_moved = true;
            }
        }
    }

    if caught {
        // Terminal: the catching enemy completes its move, the signal
        // fires once, and the phase gates all further input.
        events.push(GameEvent::PlayerCaught);
        world.phase = Phase::Caught;
        world.commit_grid(working);
        return events;
    }

    if !any_moved && !world.enemies.is_empty() {
        // The whole swarm is stuck: convert to pickups and respawn.
        let count = world.enemies.len();
        for e in &world.enemies {
            working.set(e.x, e.y, Tile::Pickup);
        }
        world.enemies.clear();
        events.push(GameEvent::EnemiesConverted { count });

        for _ in 0..RESPAWN_COUNT {
            match spawn_enemy(&mut working, &mut world.rng) {
                Some((x, y)) => {
                    world.enemies.push(Enemy::new(x, y));
                    events.push(GameEvent::EnemySpawned { x, y });
                }
                None => {
                    events.push(GameEvent::SpawnExhausted);
                    world.set_message("No open cell left to spawn into", 300);
                    world.phase = Phase::GameOver;
                    break;
                }
            }
        }
    }

    world.commit_grid(working);
    events
}

// ══════════════════════════════════════════════════════════════
// Spawn
// ══════════════════════════════════════════════════════════════

/// Place a new enemy near one of the four edge midpoints, probing forward
/// (x first, wrapping row by row) from the chosen point until an empty
/// cell turns up. Visits each cell at most once: a board with no empty
/// cell yields None instead of an unbounded scan.
fn spawn_enemy(grid: &mut Grid, rng: &mut SmallRng) -> Option<(usize, usize)> {
    let w = grid.width();
    let h = grid.height();
    if w == 0 || h == 0 {
        return None;
    }

    let candidates = [
        (SPAWN_MARGIN.min(w - 1), h / 2),
        (w.saturating_sub(1 + SPAWN_MARGIN), h / 2),
        (w / 2, SPAWN_MARGIN.min(h - 1)),
        (w / 2, h.saturating_sub(1 + SPAWN_MARGIN)),
    ];
    let (sx, sy) = candidates[rng.gen_range(0..candidates.len())];

    let total = w * h;
    let start = sy * w + sx;
    for step in 0..total {
        let idx = (start + step) % total;
        let (x, y) = (idx % w, idx / w);
        if grid.tile_at(x, y) == Tile::Empty {
            grid.set(x, y, Tile::Enemy);
            return Some((x, y));
        }
    }
    None
}

// ══════════════════════════════════════════════════════════════
// Restart
// ══════════════════════════════════════════════════════════════

/// Reseed the live grid and entities from the level as loaded.
/// Score and lives are session state and survive.
pub fn restart_level(world: &mut WorldState) {
    let base = world.base_grid.snapshot();
    world.commit_grid(base);
    world.player = Player::new(world.player_spawn.0, world.player_spawn.1);
    world.enemies = world
        .enemy_spawns
        .iter()
        .map(|&(x, y)| Enemy::new(x, y))
        .collect();
    world.tick = 0;
}

// ══════════════════════════════════════════════════════════════
// Unit tests
// ══════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    /// Build a Playing world from a string diagram.
    /// Legend:  '#'=Wall  'O'=Block  '$'=Pickup  'E'=Enemy
    ///          'T'=EnemyTrapped  'P'=Player  ' '=Empty
    fn world_from(rows: &[&str]) -> WorldState {
        let mut tiles = Vec::with_capacity(rows.len());
        let mut player = None;
        let mut enemies = vec![];
        for (y, row) in rows.iter().enumerate() {
            let mut out = Vec::with_capacity(row.len());
            for (x, ch) in row.chars().enumerate() {
                let tile = match ch {
                    '#' => Tile::Wall,
                    'O' => Tile::Block,
                    '$' => Tile::Pickup,
                    'E' => Tile::Enemy,
                    'T' => Tile::EnemyTrapped,
                    'P' => Tile::Player,
                    _ => Tile::Empty,
                };
                if tile == Tile::Player {
                    player = Some((x, y));
                }
                if tile == Tile::Enemy {
                    enemies.push(Enemy::new(x, y));
                }
                out.push(tile);
            }
            tiles.push(out);
        }

        let mut world = WorldState::new();
        let (px, py) = player.expect("diagram has a player");
        let grid = Grid::from_tiles(tiles);
        world.base_grid = grid.snapshot();
        world.commit_grid(grid);
        world.player = Player::new(px, py);
        world.player_spawn = (px, py);
        world.enemy_spawns = enemies.iter().map(|e| (e.x, e.y)).collect();
        world.enemies = enemies;
        world.rng = SmallRng::seed_from_u64(7);
        world.phase = Phase::Playing;
        world
    }

    fn contains_caught(events: &[GameEvent]) -> bool {
        events.iter().any(|e| matches!(e, GameEvent::PlayerCaught))
    }

    // ── handle_move ──

    #[test]
    fn reference_pickup_scenario() {
        // 5×5, walls on the border, P(1,1), $(2,1); move right.
        let mut world = world_from(&[
            "#####",
            "#P$ #",
            "#   #",
            "#   #",
            "#####",
        ]);
        let events = handle_move(&mut world, MoveDir::Right);
        assert_eq!((world.player.x, world.player.y), (2, 1));
        assert_eq!(world.score, 100);
        assert_eq!(world.grid.tile_at(1, 1), Tile::Empty);
        assert_eq!(world.grid.tile_at(2, 1), Tile::Player);
        assert!(events.iter().any(|e| matches!(e, GameEvent::PickupCollected { x: 2, y: 1 })));
        assert!(events.iter().any(|e| matches!(e, GameEvent::ScoreChanged { score: 100 })));
    }

    #[test]
    fn wall_moves_never_change_state() {
        let mut world = world_from(&[
            "#####",
            "#P  #",
            "#####",
        ]);
        let before = world.grid.snapshot();
        for _ in 0..4 {
            let events = handle_move(&mut world, MoveDir::Up);
            assert!(events.is_empty());
        }
        assert_eq!(world.grid, before);
        assert_eq!((world.player.x, world.player.y), (1, 1));
        assert_eq!(world.score, 0);
    }

    #[test]
    fn collecting_last_pickup_clears_level() {
        let mut world = world_from(&[
            "#####",
            "#P$ #",
            "#####",
        ]);
        let events = handle_move(&mut world, MoveDir::Right);
        assert_eq!(world.phase, Phase::LevelComplete);
        assert_eq!(world.score, PICKUP_POINTS + CLEAR_POINTS);
        assert!(events.iter().any(|e| matches!(e, GameEvent::LevelCleared)));
    }

    #[test]
    fn crushed_pickup_does_not_clear_level() {
        let mut world = world_from(&[
            "######",
            "#PO$ #",
            "######",
        ]);
        handle_move(&mut world, MoveDir::Right);
        // The only pickup was overwritten by the block: census empty,
        // but no clear and no score.
        assert_eq!(world.pickups_remaining, 0);
        assert_eq!(world.score, 0);
        assert_eq!(world.phase, Phase::Playing);
    }

    // ── handle_tick: pursuit ──

    #[test]
    fn enemy_closes_in_on_player() {
        let mut world = world_from(&[
            "#######",
            "#E   P#",
            "#     #",
            "#######",
        ]);
        handle_tick(&mut world);
        assert_eq!((world.enemies[0].x, world.enemies[0].y), (2, 1));
        assert_eq!(world.grid.tile_at(1, 1), Tile::Empty);
        assert_eq!(world.grid.tile_at(2, 1), Tile::Enemy);
    }

    #[test]
    fn adjacent_enemy_catches_player() {
        let mut world = world_from(&[
            "#####",
            "#EP #",
            "#####",
        ]);
        let events = handle_tick(&mut world);
        assert!(contains_caught(&events));
        assert_eq!(world.phase, Phase::Caught);
        // The catching enemy completed its move onto the player's cell.
        assert_eq!(world.grid.tile_at(2, 1), Tile::Enemy);

        // Caught is terminal for the core: further input is a no-op and
        // further ticks emit nothing.
        let before = world.grid.snapshot();
        assert!(handle_move(&mut world, MoveDir::Left).is_empty());
        assert!(handle_tick(&mut world).is_empty());
        assert_eq!(world.grid, before);
    }

    #[test]
    fn caught_signal_fires_exactly_once() {
        let mut world = world_from(&[
            "#####",
            "#EP #",
            "#####",
        ]);
        let first = handle_tick(&mut world);
        let second = handle_tick(&mut world);
        assert!(contains_caught(&first));
        assert!(!contains_caught(&second));
    }

    // ── handle_tick: trapping ──

    #[test]
    fn walled_enemy_marked_trapped_and_kept() {
        let mut world = world_from(&[
            "#########",
            "#E#     #",
            "###  P  #",
            "#E      #",
            "#########",
        ]);
        handle_tick(&mut world);
        // The boxed-in enemy is marked; the free one moved, so no
        // conversion happens and both stay in the set.
        assert_eq!(world.grid.tile_at(1, 1), Tile::EnemyTrapped);
        assert_eq!(world.enemies.len(), 2);

        // Still trapped next tick; the marker stays put.
        handle_tick(&mut world);
        assert_eq!(world.grid.tile_at(1, 1), Tile::EnemyTrapped);
    }

    #[test]
    fn full_swarm_trap_converts_and_respawns() {
        let mut world = world_from(&[
            "###########",
            "#E#     #E#",
            "###     ###",
            "#    P    #",
            "#         #",
            "###########",
        ]);
        let events = handle_tick(&mut world);

        // Both enemy cells became pickups, the set was rebuilt with
        // exactly two fresh spawns on previously empty cells.
        assert_eq!(world.grid.tile_at(1, 1), Tile::Pickup);
        assert_eq!(world.grid.tile_at(9, 1), Tile::Pickup);
        assert!(events.iter().any(|e| matches!(e, GameEvent::EnemiesConverted { count: 2 })));
        assert_eq!(world.enemies.len(), 2);
        assert_eq!(world.grid.count(Tile::Enemy), 2);
        for e in &world.enemies {
            assert_eq!(world.grid.tile_at(e.x, e.y), Tile::Enemy);
        }
        assert_eq!(
            events.iter().filter(|e| matches!(e, GameEvent::EnemySpawned { .. })).count(),
            2
        );
    }

    #[test]
    fn spawn_on_full_board_reports_exhaustion() {
        // No empty cell anywhere once the lone enemy converts.
        let mut world = world_from(&[
            "#####",
            "#E#P#",
            "#####",
        ]);
        let events = handle_tick(&mut world);
        assert!(events.iter().any(|e| matches!(e, GameEvent::SpawnExhausted)));
        assert_eq!(world.phase, Phase::GameOver);
        assert!(world.enemies.is_empty());
    }

    #[test]
    fn spawn_probe_skips_occupied_cells() {
        let mut grid = Grid::from_tiles(
            (0..7)
                .map(|y| {
                    (0..7)
                        .map(|x| {
                            if x == 0 || y == 0 || x == 6 || y == 6 {
                                Tile::Wall
                            } else {
                                Tile::Block
                            }
                        })
                        .collect()
                })
                .collect(),
        );
        // One empty cell in the whole board; every candidate is occupied.
        grid.set(5, 5, Tile::Empty);
        let mut rng = SmallRng::seed_from_u64(1);
        assert_eq!(spawn_enemy(&mut grid, &mut rng), Some((5, 5)));
        assert_eq!(grid.tile_at(5, 5), Tile::Enemy);
    }

    // ── invariants & restart ──

    #[test]
    fn one_player_marker_through_moves_and_ticks() {
        let mut world = world_from(&[
            "#########",
            "#P $ O $#",
            "#       #",
            "#      E#",
            "#########",
        ]);
        for dir in [MoveDir::Right, MoveDir::Right, MoveDir::Down, MoveDir::Left] {
            handle_move(&mut world, dir);
            handle_tick(&mut world);
            assert_eq!(world.grid.count(Tile::Player), 1);
            let (px, py) = (world.player.x, world.player.y);
            assert_eq!(world.grid.find_player(), Some((px, py)));
            assert!(px < world.grid.width() && py < world.grid.height());
        }
    }

    #[test]
    fn restart_reseeds_from_base() {
        let mut world = world_from(&[
            "########",
            "#P$ E $#",
            "########",
        ]);
        handle_move(&mut world, MoveDir::Right);
        handle_tick(&mut world);
        assert_ne!(world.grid, world.base_grid);

        restart_level(&mut world);
        assert_eq!(world.grid, world.base_grid);
        assert_eq!((world.player.x, world.player.y), (1, 1));
        assert_eq!(world.enemies.len(), 1);
        assert_eq!((world.enemies[0].x, world.enemies[0].y), (4, 1));
        assert_eq!(world.pickups_remaining, 2);
    }
}
