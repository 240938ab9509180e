/// Entry point, session flow, and the frame loop that drives the two
/// simulation triggers (directional input, periodic enemy tick).

mod config;
mod domain;
mod sim;
mod ui;

use std::time::{Duration, Instant};

use crossterm::event::KeyCode;

use config::GameConfig;
use domain::entity::MoveDir;
use sim::event::GameEvent;
use sim::level::{self, load_level};
use sim::step;
use sim::world::{Phase, WorldState};
use ui::input::InputState;
use ui::renderer::Renderer;

const FRAME_SLEEP: Duration = Duration::from_millis(5);

/// Frames the caught pause holds before a life is spent.
const CAUGHT_PAUSE_FRAMES: u32 = 240;

fn main() {
    let config = GameConfig::load();

    let mut world = WorldState::new();
    world.total_levels = level::level_count(&config);

    let mut renderer = Renderer::new();

    if let Err(e) = renderer.init() {
        eprintln!("Terminal init failed: {e}");
        return;
    }

    let result = game_loop(&mut world, &mut renderer, &config);

    if let Err(e) = renderer.cleanup() {
        eprintln!("Terminal cleanup failed: {e}");
    }

    if let Err(e) = result {
        eprintln!("Game error: {e}");
    }

    println!();
    println!("Thanks for playing Gridlock!");
    println!("Final Score: {}", world.score);
}

fn game_loop(
    world: &mut WorldState,
    renderer: &mut Renderer,
    config: &GameConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut kb = InputState::new();
    let tick_rate = Duration::from_millis(config.speed.enemy_tick_ms);
    let mut last_enemy_tick = Instant::now();

    loop {
        kb.drain_events();

        if kb.ctrl_c_pressed() {
            break;
        }
        if handle_meta(world, &kb, config, &mut last_enemy_tick) {
            break;
        }

        if world.phase == Phase::Playing {
            // Direct-input trigger: each key event is one discrete move.
            for dir in directional_presses(&kb) {
                let events = step::handle_move(world, dir);
                apply_events(world, &events);
                if world.phase != Phase::Playing {
                    break;
                }
            }

            // Timer trigger: the autonomous enemy tick.
            if world.phase == Phase::Playing && last_enemy_tick.elapsed() >= tick_rate {
                let events = step::handle_tick(world);
                apply_events(world, &events);
                last_enemy_tick = Instant::now();
            }
        }

        // Caught pause → spend a life, restart or game over.
        if world.phase == Phase::Caught {
            if world.phase_timer > 0 {
                world.phase_timer -= 1;
            } else {
                resolve_caught(world);
            }
        }

        if world.message_timer > 0 {
            world.message_timer -= 1;
            if world.message_timer == 0 {
                world.message.clear();
            }
        }

        renderer.render(world)?;
        std::thread::sleep(FRAME_SLEEP);
    }

    Ok(())
}

// ── Key Constants ──

const KEYS_LEFT: &[KeyCode] = &[KeyCode::Left, KeyCode::Char('a'), KeyCode::Char('A')];
const KEYS_RIGHT: &[KeyCode] = &[KeyCode::Right, KeyCode::Char('d'), KeyCode::Char('D')];
const KEYS_UP: &[KeyCode] = &[KeyCode::Up, KeyCode::Char('w'), KeyCode::Char('W')];
const KEYS_DOWN: &[KeyCode] = &[KeyCode::Down, KeyCode::Char('s'), KeyCode::Char('S')];
const KEYS_RESTART: &[KeyCode] = &[KeyCode::Char('r'), KeyCode::Char('R')];
const KEYS_CONFIRM: &[KeyCode] = &[KeyCode::Enter, KeyCode::Char(' ')];
const KEYS_QUIT: &[KeyCode] = &[KeyCode::Char('q'), KeyCode::Char('Q')];

fn key_direction(code: KeyCode) -> Option<MoveDir> {
    if KEYS_LEFT.contains(&code) {
        Some(MoveDir::Left)
    } else if KEYS_RIGHT.contains(&code) {
        Some(MoveDir::Right)
    } else if KEYS_UP.contains(&code) {
        Some(MoveDir::Up)
    } else if KEYS_DOWN.contains(&code) {
        Some(MoveDir::Down)
    } else {
        None
    }
}

/// Directional presses this frame, in arrival order.
fn directional_presses(kb: &InputState) -> Vec<MoveDir> {
    kb.presses().iter().filter_map(|&c| key_direction(c)).collect()
}

fn any_directional(kb: &InputState) -> bool {
    kb.any_pressed(KEYS_LEFT)
        || kb.any_pressed(KEYS_RIGHT)
        || kb.any_pressed(KEYS_UP)
        || kb.any_pressed(KEYS_DOWN)
}

// ── Session helpers ──

fn start_new_game(world: &mut WorldState, config: &GameConfig) {
    world.score = 0;
    world.lives = config.game.start_lives;
    load_level(world, 0, config);
}

/// Reset to title screen, preserving the level count.
fn return_to_title(world: &mut WorldState) {
    let total = world.total_levels;
    *world = WorldState::new();
    world.total_levels = total;
    world.phase = Phase::Title;
}

fn resolve_caught(world: &mut WorldState) {
    world.lives = world.lives.saturating_sub(1);
    if world.lives == 0 {
        world.phase = Phase::GameOver;
        world.set_message("The swarm got you", 600);
    } else {
        step::restart_level(world);
        world.phase = Phase::Ready;
        let msg = format!("Lives left: {}", world.lives);
        world.set_message(&msg, 400);
    }
}

/// Translate core events into session/UI state.
fn apply_events(world: &mut WorldState, events: &[GameEvent]) {
    for event in events {
        match event {
            GameEvent::PlayerCaught => {
                world.phase_timer = CAUGHT_PAUSE_FRAMES;
                world.set_message("CAUGHT!", CAUGHT_PAUSE_FRAMES);
            }
            GameEvent::LevelCleared => {
                world.set_message("Zone clear! +500", 500);
            }
            GameEvent::EnemiesConverted { count } => {
                let msg = format!("Swarm contained! {count} drone(s) salvaged");
                world.set_message(&msg, 300);
            }
            _ => {}
        }
    }
}

// ── Phase / meta-key handling ──

fn handle_meta(
    world: &mut WorldState,
    kb: &InputState,
    config: &GameConfig,
    last_enemy_tick: &mut Instant,
) -> bool {
    let confirm = kb.any_pressed(KEYS_CONFIRM);
    let esc = kb.any_pressed(&[KeyCode::Esc]);

    match world.phase {
        // ── Title Screen ──
        Phase::Title => {
            if confirm {
                start_new_game(world, config);
            } else if kb.any_pressed(KEYS_QUIT) || esc {
                return true;
            }
        }

        // ── Ready: level loaded, waiting for the first key ──
        Phase::Ready => {
            if confirm || any_directional(kb) {
                world.phase = Phase::Playing;
                world.message.clear();
                world.message_timer = 0;
                *last_enemy_tick = Instant::now();
            } else if esc {
                return_to_title(world);
            }
        }

        // ── Playing ──
        Phase::Playing => {
            if esc {
                return_to_title(world);
            } else if kb.any_pressed(KEYS_RESTART) {
                step::restart_level(world);
                world.phase = Phase::Ready;
                world.set_message("Zone restarted", 300);
            }
        }

        // ── Caught: timed pause, no input ──
        Phase::Caught => {}

        // ── Level Complete ──
        Phase::LevelComplete => {
            if confirm {
                let next = world.current_level + 1;
                load_level(world, next, config);
            } else if esc {
                return_to_title(world);
            }
        }

        // ── Game Over / Game Complete ──
        Phase::GameOver | Phase::GameComplete => {
            if confirm || esc {
                return_to_title(world);
            }
        }
    }

    false
}
