/// Enemy pursuit: a greedy step toward the player.
///
/// Each enemy looks at its Moore neighborhood, keeps the steppable cells
/// (Empty, or the player's cell: entering it is the catch), and takes the
/// one nearest the player by Manhattan distance. Classification runs
/// against the shared pre-tick snapshot so every enemy reasons about the
/// same state regardless of processing order.

use super::grid::Grid;

/// Fixed enumeration order of the 8 neighbors. Ties on distance resolve
/// to this order, which keeps pursuit deterministic.
pub const NEIGHBOR_OFFSETS: [(i32, i32); 8] = [
    (-1, -1),
    (0, -1),
    (1, -1),
    (-1, 0),
    (1, 0),
    (-1, 1),
    (0, 1),
    (1, 1),
];

pub fn manhattan(x1: usize, y1: usize, x2: usize, y2: usize) -> i32 {
    (x1 as i32 - x2 as i32).abs() + (y1 as i32 - y2 as i32).abs()
}

/// The cell the enemy at (ex, ey) steps into this tick, or None when it
/// is trapped (no steppable neighbor).
pub fn choose_step(
    snapshot: &Grid,
    ex: usize,
    ey: usize,
    px: usize,
    py: usize,
) -> Option<(usize, usize)> {
    let mut candidates: Vec<(usize, usize)> = Vec::with_capacity(8);
    for &(dx, dy) in &NEIGHBOR_OFFSETS {
        let nx = ex as i32 + dx;
        let ny = ey as i32 + dy;
        if !snapshot.in_bounds(nx, ny) {
            continue;
        }
        let (nx, ny) = (nx as usize, ny as usize);
        if snapshot.tile_at(nx, ny).is_steppable() {
            candidates.push((nx, ny));
        }
    }

    // Stable sort: equidistant candidates keep enumeration order.
    candidates.sort_by_key(|&(nx, ny)| manhattan(nx, ny, px, py));
    candidates.first().copied()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::tile::Tile;

    /// Legend:  '#'=Wall  'O'=Block  '$'=Pickup  'E'=Enemy
    ///          'T'=EnemyTrapped  'P'=Player  ' '=Empty
    fn grid_from(rows: &[&str]) -> Grid {
        let tiles = rows
            .iter()
            .map(|row| {
                row.chars()
                    .map(|ch| match ch {
                        '#' => Tile::Wall,
                        'O' => Tile::Block,
                        '$' => Tile::Pickup,
                        'E' => Tile::Enemy,
                        'T' => Tile::EnemyTrapped,
                        'P' => Tile::Player,
                        _ => Tile::Empty,
                    })
                    .collect()
            })
            .collect();
        Grid::from_tiles(tiles)
    }

    #[test]
    fn steps_toward_player() {
        let g = grid_from(&[
            "#######",
            "#E   P#",
            "#######",
        ]);
        // Only in-bounds non-wall neighbors are (2,1); straight pursuit.
        assert_eq!(choose_step(&g, 1, 1, 5, 1), Some((2, 1)));
    }

    #[test]
    fn prefers_diagonal_when_closer() {
        let g = grid_from(&[
            "#####",
            "#E  #",
            "#   #",
            "#  P#",
            "#####",
        ]);
        // (2,2) is Manhattan 2 from the player, beats (2,1)/(1,2) at 3.
        assert_eq!(choose_step(&g, 1, 1, 3, 3), Some((2, 2)));
    }

    #[test]
    fn equidistant_tie_uses_enumeration_order() {
        let g = grid_from(&[
            "     ",
            " E   ",
            "  #  ",
            "   P ",
            "     ",
        ]);
        // With the diagonal walled off, (2,1) and (1,2) are both
        // distance 3 from the player; (2,1) enumerates first and the
        // stable sort keeps it there.
        assert_eq!(choose_step(&g, 1, 1, 3, 3), Some((2, 1)));
    }

    #[test]
    fn enters_player_cell() {
        let g = grid_from(&[
            "####",
            "#EP#",
            "####",
        ]);
        assert_eq!(choose_step(&g, 1, 1, 2, 1), Some((2, 1)));
    }

    #[test]
    fn walled_in_is_trapped() {
        let g = grid_from(&[
            "###",
            "#E#",
            "###",
        ]);
        assert_eq!(choose_step(&g, 1, 1, 0, 0), None);
    }

    #[test]
    fn blocks_pickups_and_enemies_not_steppable() {
        let g = grid_from(&[
            "#####",
            "#OEO#",
            "#$T$#",
            "#####",
        ]);
        // Every neighbor of the enemy at (2,1) is wall, block, pickup,
        // or a trapped enemy: none steppable.
        assert_eq!(choose_step(&g, 2, 1, 4, 3), None);
    }

    #[test]
    fn grid_edge_neighbors_filtered() {
        let g = grid_from(&[
            "E  ",
            "   ",
            "  P",
        ]);
        // Corner enemy: only (1,0), (0,1), (1,1) exist; (1,1) is closest.
        assert_eq!(choose_step(&g, 0, 0, 2, 2), Some((1, 1)));
    }
}
