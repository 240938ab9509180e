/// Movement resolution: what a directional move attempt does to the
/// player and to any blocks in its way.
///
/// Both functions mutate the grid they are handed. Callers pass a working
/// snapshot and commit it afterwards; a `Blocked` outcome guarantees the
/// grid is untouched, so committing or discarding is equally safe.

use super::grid::Grid;
use super::tile::Tile;

/// Result of a player move attempt. `Blocked` is a normal outcome
/// (wall, enemy, unpushable chain), not an error.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum MoveOutcome {
    /// Player advanced to (x, y). `pickup` is set when the vacated
    /// target cell held a pickup (caller scores it).
    Stepped { x: usize, y: usize, pickup: bool },
    Blocked,
}

/// Resolve a directional move attempt for the player at (px, py).
///
/// `dx, dy ∈ {-1, 0, 1}`, at most one non-zero: directional input never
/// produces diagonal motion.
pub fn resolve_player_move(
    grid: &mut Grid,
    px: usize,
    py: usize,
    dx: i32,
    dy: i32,
) -> MoveOutcome {
    let tx = px as i32 + dx;
    let ty = py as i32 + dy;
    if !grid.in_bounds(tx, ty) {
        return MoveOutcome::Blocked;
    }
    let (tx, ty) = (tx as usize, ty as usize);

    match grid.tile_at(tx, ty) {
        t if t.is_walkable() => {
            let pickup = t == Tile::Pickup;
            grid.set(px, py, Tile::Empty);
            grid.set(tx, ty, Tile::Player);
            MoveOutcome::Stepped { x: tx, y: ty, pickup }
        }
        Tile::Block => {
            if push_chain(grid, tx, ty, dx, dy) {
                // The head of the chain slid forward; the first block's
                // cell is now the player's.
                grid.set(px, py, Tile::Empty);
                grid.set(tx, ty, Tile::Player);
                MoveOutcome::Stepped { x: tx, y: ty, pickup: false }
            } else {
                MoveOutcome::Blocked
            }
        }
        _ => MoveOutcome::Blocked,
    }
}

/// Push the contiguous line of blocks starting at (x, y) one cell along
/// (dx, dy). The whole chain moves or nothing does: writes happen only on
/// the unwind from a successful base case, so a failed push leaves the
/// grid untouched.
pub fn push_chain(grid: &mut Grid, x: usize, y: usize, dx: i32, dy: i32) -> bool {
    let nx = x as i32 + dx;
    let ny = y as i32 + dy;
    if !grid.in_bounds(nx, ny) {
        return false;
    }
    let (nx, ny) = (nx as usize, ny as usize);

    match grid.tile_at(nx, ny) {
        t if t.accepts_block() => {
            // A pickup underneath is crushed, not collected.
            grid.set(nx, ny, Tile::Block);
            true
        }
        Tile::Block => {
            if push_chain(grid, nx, ny, dx, dy) {
                grid.set(nx, ny, Tile::Block);
                true
            } else {
                false
            }
        }
        _ => false,
    }
}
