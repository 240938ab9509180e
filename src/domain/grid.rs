/// The authoritative tile array.
///
/// Indexing is `[y][x]`. Out-of-bounds reads resolve to `Tile::Wall` so
/// every algorithm treats the boundary as blocked without a separate error
/// path; out-of-bounds writes are ignored. Mutation passes work on a
/// `snapshot()` and commit the whole grid back, so an in-progress
/// resolution is never partially visible.

use super::tile::Tile;

#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Grid {
    width: usize,
    height: usize,
    tiles: Vec<Vec<Tile>>,
}

impl Grid {
    pub fn new(width: usize, height: usize) -> Self {
        Grid {
            width,
            height,
            tiles: vec![vec![Tile::Empty; width]; height],
        }
    }

    /// Build from parsed rows. Rows must be rectangular.
    pub fn from_tiles(tiles: Vec<Vec<Tile>>) -> Self {
        let height = tiles.len();
        let width = tiles.first().map_or(0, |row| row.len());
        debug_assert!(tiles.iter().all(|row| row.len() == width));
        Grid { width, height, tiles }
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    /// Are signed coordinates inside `[0,width) × [0,height)`?
    /// Candidate coordinates are filtered here before any dereference.
    #[inline]
    pub fn in_bounds(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && (x as usize) < self.width && (y as usize) < self.height
    }

    /// Tile at (x, y). Out of bounds reads as a wall.
    #[inline]
    pub fn tile_at(&self, x: usize, y: usize) -> Tile {
        if x < self.width && y < self.height {
            self.tiles[y][x]
        } else {
            Tile::Wall
        }
    }

    /// Set a tile. Out-of-bounds writes are dropped.
    #[inline]
    pub fn set(&mut self, x: usize, y: usize, tile: Tile) {
        if x < self.width && y < self.height {
            self.tiles[y][x] = tile;
        }
    }

    /// Deep copy for a mutation pass. The pass mutates the copy and the
    /// session commits it back atomically.
    pub fn snapshot(&self) -> Grid {
        self.clone()
    }

    /// How many cells currently hold `tile`?
    pub fn count(&self, tile: Tile) -> usize {
        self.tiles
            .iter()
            .map(|row| row.iter().filter(|&&t| t == tile).count())
            .sum()
    }

    /// Position of the unique Player marker, if present.
    pub fn find_player(&self) -> Option<(usize, usize)> {
        for (y, row) in self.tiles.iter().enumerate() {
            for (x, &t) in row.iter().enumerate() {
                if t == Tile::Player {
                    return Some((x, y));
                }
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn oob_reads_as_wall() {
        let g = Grid::new(3, 2);
        assert_eq!(g.tile_at(0, 0), Tile::Empty);
        assert_eq!(g.tile_at(3, 0), Tile::Wall);
        assert_eq!(g.tile_at(0, 2), Tile::Wall);
        assert_eq!(g.tile_at(99, 99), Tile::Wall);
    }

    #[test]
    fn oob_writes_dropped() {
        let mut g = Grid::new(3, 2);
        g.set(3, 0, Tile::Block);
        g.set(0, 2, Tile::Block);
        assert_eq!(g.count(Tile::Block), 0);
    }

    #[test]
    fn bounds_check_signed() {
        let g = Grid::new(5, 5);
        assert!(g.in_bounds(0, 0));
        assert!(g.in_bounds(4, 4));
        assert!(!g.in_bounds(-1, 0));
        assert!(!g.in_bounds(0, -1));
        assert!(!g.in_bounds(5, 0));
        assert!(!g.in_bounds(0, 5));
    }

    #[test]
    fn snapshot_is_independent() {
        let mut g = Grid::new(3, 3);
        g.set(1, 1, Tile::Pickup);
        let mut snap = g.snapshot();
        snap.set(1, 1, Tile::Wall);
        assert_eq!(g.tile_at(1, 1), Tile::Pickup);
        assert_eq!(snap.tile_at(1, 1), Tile::Wall);
    }

    #[test]
    fn census_and_player_lookup() {
        let mut g = Grid::new(4, 3);
        g.set(2, 1, Tile::Player);
        g.set(0, 0, Tile::Pickup);
        g.set(3, 2, Tile::Pickup);
        assert_eq!(g.count(Tile::Pickup), 2);
        assert_eq!(g.find_player(), Some((2, 1)));
    }
}
