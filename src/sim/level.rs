/// Level loader.
///
/// ## Sources (priority order):
///   1. `levels/` directory (individual `.txt` files, filename order)
///   2. Built-in embedded levels
///
/// ## Single-level format (`.txt`):
///   Line 1: `# Level Name`   (a `#` line with a lowercase letter)
///   Lines: map rows
///
/// ## Tile legend:
///   '#' = Wall (immovable)       'O' = Block (pushable)
///   '$' = Pickup                 'E' = Enemy spawn
///   'P' = Player spawn           ' ' = Empty
///
/// A level must contain exactly one `P` or it is rejected.

use std::path::Path;

use crate::config::GameConfig;
use crate::domain::entity::{Enemy, Player};
use crate::domain::grid::Grid;
use crate::domain::tile::Tile;
use crate::sim::world::{Phase, WorldState};

/// A parsed level: display name plus its map rows.
pub struct LevelDef {
    pub name: String,
    pub rows: Vec<String>,
}

// ══════════════════════════════════════════════════════════════
// Public API
// ══════════════════════════════════════════════════════════════

/// Seed the world from a level. Score and lives carry across loads.
pub fn load_level(world: &mut WorldState, level_idx: usize, config: &GameConfig) {
    let levels = available_levels(config);

    if level_idx >= levels.len() {
        world.phase = Phase::GameComplete;
        return;
    }

    let def = &levels[level_idx];
    world.current_level = level_idx;
    world.total_levels = levels.len();
    world.level_name = def.name.clone();

    let height = def.rows.len();
    let width = def.rows.iter().map(|r| r.len()).max().unwrap_or(0);
    let mut tiles = vec![vec![Tile::Empty; width]; height];
    world.enemies.clear();
    world.enemy_spawns.clear();

    for (y, row) in def.rows.iter().enumerate() {
        for (x, ch) in row.chars().enumerate() {
            match ch {
                '#' => tiles[y][x] = Tile::Wall,
                'O' => tiles[y][x] = Tile::Block,
                '$' => tiles[y][x] = Tile::Pickup,
                'P' => {
                    tiles[y][x] = Tile::Player;
                    world.player = Player::new(x, y);
                    world.player_spawn = (x, y);
                }
                'E' => {
                    tiles[y][x] = Tile::Enemy;
                    world.enemies.push(Enemy::new(x, y));
                    world.enemy_spawns.push((x, y));
                }
                _ => {}
            }
        }
    }

    let grid = Grid::from_tiles(tiles);
    world.base_grid = grid.snapshot();
    world.commit_grid(grid);
    world.tick = 0;
    world.phase = Phase::Ready;
    world.set_message(&def.name, 400);
}

/// How many levels the active source provides.
pub fn level_count(config: &GameConfig) -> usize {
    available_levels(config).len()
}

// ══════════════════════════════════════════════════════════════
// Internal: level sources
// ══════════════════════════════════════════════════════════════

fn available_levels(config: &GameConfig) -> Vec<LevelDef> {
    if config.levels_dir.is_dir() {
        let mut found = load_from_directory(&config.levels_dir);
        if !found.is_empty() {
            found.sort_by(|a, b| a.0.cmp(&b.0));
            return found.into_iter().map(|(_, def)| def).collect();
        }
    }
    embedded_levels()
}

fn load_from_directory(dir: &Path) -> Vec<(String, LevelDef)> {
    let mut results = vec![];

    let entries = match std::fs::read_dir(dir) {
        Ok(e) => e,
        Err(_) => return results,
    };

    for entry in entries.flatten() {
        let path = entry.path();
        if path.extension().map_or(false, |e| e == "txt") {
            if let Ok(content) = std::fs::read_to_string(&path) {
                if let Some(def) = parse_level_file(&content) {
                    let filename = path
                        .file_name()
                        .unwrap_or_default()
                        .to_string_lossy()
                        .to_string();
                    results.push((filename, def));
                }
            }
        }
    }

    results
}

// ══════════════════════════════════════════════════════════════
// Single-level file parsing
// ══════════════════════════════════════════════════════════════

/// Parse a single level from text content. Returns None for a level with
/// no rows or without exactly one player spawn.
fn parse_level_file(content: &str) -> Option<LevelDef> {
    let mut name = String::new();
    let mut rows = vec![];

    for line in content.lines() {
        if line.starts_with('#') && name.is_empty() && is_name_line(line) {
            name = line[1..].trim().to_string();
        } else {
            rows.push(line.to_string());
        }
    }

    while rows.last().map_or(false, |r| r.trim().is_empty()) {
        rows.pop();
    }

    if rows.is_empty() {
        return None;
    }

    let players: usize = rows
        .iter()
        .map(|r| r.chars().filter(|&c| c == 'P').count())
        .sum();
    if players != 1 {
        return None;
    }

    let max_width = rows.iter().map(|r| r.len()).max().unwrap_or(0);
    for row in &mut rows {
        if row.len() < max_width {
            row.extend(std::iter::repeat(' ').take(max_width - row.len()));
        }
    }

    if name.is_empty() {
        name = "Unnamed Zone".to_string();
    }

    Some(LevelDef { name, rows })
}

/// Distinguish `# Level Name` from `######` / `#P  O#` (level data).
/// The legend's letters are all uppercase, so a lowercase letter after
/// the hash marks a name line.
fn is_name_line(line: &str) -> bool {
    line[1..].chars().any(|c| c.is_lowercase())
}

// ══════════════════════════════════════════════════════════════
// Embedded fallback levels
// ══════════════════════════════════════════════════════════════

/// Three 23×23 boards (the odd-dimension convention is deliberate: the
/// player starts dead-center).
fn embedded_levels() -> Vec<LevelDef> {
    vec![
        make_embedded("Zone 1 - Training Yard", &[
            "#######################",
            "#          $          #",
            "#  O     O   O     O  #",
            "#                     #",
            "#   ##    ###    ##   #",
            "#   #$     $     $#   #",
            "#   ##    ###    ##   #",
            "#                     #",
            "#    E           E    #",
            "#                     #",
            "#  O    OO   OO    O  #",
            "#          P          #",
            "#  O    OO   OO    O  #",
            "#                     #",
            "#    $           $    #",
            "#                     #",
            "#   ##    ###    ##   #",
            "#   #$     $     $#   #",
            "#   ##    ###    ##   #",
            "#                     #",
            "#  O     O   O     O  #",
            "#          $          #",
            "#######################",
        ]),
        make_embedded("Zone 2 - The Vaults", &[
            "#######################",
            "#$                   $#",
            "# ### ### ### ### ### #",
            "# #$#  E  #$#  E  #$# #",
            "#                     #",
            "#  O      O      O    #",
            "#                     #",
            "#####             #####",
            "#   #  $       $  #   #",
            "#####             #####",
            "#                     #",
            "#         OPO         #",
            "#                     #",
            "#####             #####",
            "#   #  $       $  #   #",
            "#####             #####",
            "#                     #",
            "#  O      O      O    #",
            "#                     #",
            "# #$#     #$#     #$# #",
            "# ###     ###     ### #",
            "#$                   $#",
            "#######################",
        ]),
        make_embedded("Zone 3 - Containment Core", &[
            "#######################",
            "#          $          #",
            "# ## ## ## # ## ## ## #",
            "#  $    E     E    $  #",
            "#                     #",
            "#  ###   #####   ###  #",
            "#  #$    #   #    $#  #",
            "#  ###   # $ #   ###  #",
            "#        ## ##        #",
            "#                     #",
            "#   O  O       O  O   #",
            "#      O  OPO  O      #",
            "#   O  O       O  O   #",
            "#                     #",
            "#        ## ##        #",
            "#  ###   # $ #   ###  #",
            "#  #$    #   #    $#  #",
            "#  ###   #####   ###  #",
            "#                     #",
            "#  $    O     O    $  #",
            "# ## ## ## # ## ## ## #",
            "#          $          #",
            "#######################",
        ]),
    ]
}

fn make_embedded(name: &str, map: &[&str]) -> LevelDef {
    LevelDef {
        name: name.to_string(),
        rows: map.iter().map(|s| s.to_string()).collect(),
    }
}

// ══════════════════════════════════════════════════════════════
// Unit tests
// ══════════════════════════════════════════════════════════════
