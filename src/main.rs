//! Ricochet - headless simulation driver
//!
//! Loads the configuration and level, then runs a short scripted session:
//! the player walks, turns, fires, jumps and crouches while a simulated
//! relay announces a second player. Progress is reported through the log.

use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

use ricochet::config::AppConfig;
use ricochet::systems::SimulationSystem;
use ricochet_core::{LevelTemplate, PeerId};
use winit::event::{ElementState, MouseButton};
use winit::keyboard::KeyCode;

const FRAME_DT: f32 = 1.0 / 60.0;
const FRAMES: u32 = 360;

/// Relay traffic replayed at fixed frames
const RELAY_SCRIPT: &[(u32, &str)] = &[
    (30, r#"{"event":"add-enemy","data":{"id":"bot"}}"#),
    (
        45,
        r#"{"event":"update","data":{"bot":[[4.0,1.0,-6.0],[0.0,1.5],["walk",false],0.0]}}"#,
    ),
    (300, r#"{"event":"remove-player","data":"bot"}"#),
];

fn main() {
    let config = AppConfig::load().unwrap_or_else(|e| {
        eprintln!("Failed to load config: {}. Using defaults.", e);
        AppConfig::default()
    });

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(&config.debug.log_level)).init();

    let start_time = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs_f64())
        .unwrap_or(0.0);

    let mut sim = match SimulationSystem::new(&config, PeerId::from("local"), start_time) {
        Ok(sim) => sim,
        Err(e) => {
            log::error!("Invalid player configuration: {}", e);
            std::process::exit(1);
        }
    };

    let level_path = Path::new(&config.level.path);
    let base_dir = level_path.parent().unwrap_or_else(|| Path::new("."));
    match LevelTemplate::load(level_path).and_then(|level| sim.load_level(&level, base_dir)) {
        Ok(()) => {}
        Err(e) => log::warn!("Failed to load level '{}': {}. Running without one.", config.level.path, e),
    }

    for frame in 0..FRAMES {
        for (_, text) in RELAY_SCRIPT.iter().filter(|(at, _)| *at == frame) {
            sim.handle_text(text);
        }
        script_input(&mut sim, frame);
        sim.update(FRAME_DT);

        if frame % 60 == 0 {
            report(&sim, frame);
        }
    }

    let sent = sim.drain_outgoing();
    log::info!("Session finished after {} frames, {} messages queued for the relay", FRAMES, sent.len());
}

fn script_input(sim: &mut SimulationSystem, frame: u32) {
    let input = sim.input_mut();
    match frame {
        0 => {
            input.process_keyboard(KeyCode::KeyW, ElementState::Pressed);
        }
        60 => input.process_mouse_motion(400.0, 0.0),
        90 | 150 => input.process_mouse_button(MouseButton::Left, ElementState::Pressed),
        120 => {
            input.process_keyboard(KeyCode::KeyW, ElementState::Released);
            input.process_keyboard(KeyCode::Space, ElementState::Pressed);
        }
        121 => {
            input.process_keyboard(KeyCode::Space, ElementState::Released);
        }
        200 => {
            input.process_keyboard(KeyCode::ShiftLeft, ElementState::Pressed);
        }
        260 => {
            input.process_keyboard(KeyCode::ShiftLeft, ElementState::Released);
        }
        _ => {}
    }
}

fn report(sim: &SimulationSystem, frame: u32) {
    let Some(player) = sim.player() else {
        return;
    };
    let p = player.position();
    log::info!(
        "frame {:>3}: player ({:.2}, {:.2}, {:.2}) grounded={} crouching={} bullets={} remotes={} loading={}",
        frame,
        p.x,
        p.y,
        p.z,
        player.on_ground,
        sim.controller().is_crouching(),
        sim.bullets().len(),
        sim.remotes().len(),
        sim.colliders_loading()
    );
}
