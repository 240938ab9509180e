/// Events a simulation step hands back to its caller.
/// The session/UI layer consumes these for the score display, messages,
/// and game-over handling.

#[derive(Clone, Debug)]
#[allow(dead_code)]
pub enum GameEvent {
    PickupCollected { x: usize, y: usize },
    ScoreChanged { score: u32 },
    EnemyTrapped { x: usize, y: usize },
    /// Every enemy was stuck this tick; their cells turned to pickups.
    EnemiesConverted { count: usize },
    EnemySpawned { x: usize, y: usize },
    /// Spawn scanned the whole board and found no empty cell.
    SpawnExhausted,
    PlayerCaught,
    LevelCleared,
}
