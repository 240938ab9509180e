/// The tile kinds a grid cell can hold.
/// Semantics (solidity, who may enter) are queried through methods here
/// rather than scattered through the resolvers as match arms.

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Tile {
    Empty,
    Wall,         // immovable
    Block,        // movable, sokoban style
    Pickup,       // collect for score
    Enemy,        // active pursuer
    EnemyTrapped, // pursuer with no legal move
    Player,
}

impl Tile {
    /// Does this tile block entry outright? (walls, blocks, active enemies)
    #[allow(dead_code)]
    pub fn is_solid(self) -> bool {
        matches!(self, Tile::Wall | Tile::Block | Tile::Enemy)
    }

    /// Can the player walk straight into this cell? (no push required)
    pub fn is_walkable(self) -> bool {
        matches!(self, Tile::Empty | Tile::Pickup)
    }

    /// Can an enemy move into this cell? The player's cell counts:
    /// an enemy entering it is the catch, not a collision.
    pub fn is_steppable(self) -> bool {
        matches!(self, Tile::Empty | Tile::Player)
    }

    /// Can a pushed block slide into this cell? A pickup underneath
    /// is crushed, not collected.
    pub fn accepts_block(self) -> bool {
        matches!(self, Tile::Empty | Tile::Pickup)
    }

}

impl Default for Tile {
    fn default() -> Self {
        Tile::Empty
    }
}
