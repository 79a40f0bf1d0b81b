/// Entry point and game loop.

mod config;
mod domain;
mod sim;
mod ui;

use std::fs::File;
use std::path::PathBuf;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use crossterm::event::KeyCode;
use tracing_subscriber::EnvFilter;

use config::GameConfig;
use sim::catalog;
use sim::session::{Phase, Session};
use ui::gamepad::GamepadState;
use ui::input::InputState;
use ui::renderer::Renderer;
use ui::sound::{effects_for, SoundEngine};

const FRAME_SLEEP: Duration = Duration::from_millis(5);
const LOG_PATH_ENV: &str = "BOXPUSH_LOG";

fn main() {
    init_tracing();

    let config = GameConfig::load();
    let levels = catalog::load_catalog(&config);
    let mut session = Session::new(levels, config.rules.clone());

    let mut renderer = Renderer::new();
    if let Err(e) = renderer.init() {
        eprintln!("Terminal init failed: {e}");
        return;
    }

    let sound = SoundEngine::new();

    let result = game_loop(&mut session, &mut renderer, sound.as_ref(), &config);

    if let Err(e) = renderer.cleanup() {
        eprintln!("Terminal cleanup failed: {e}");
    }

    if let Err(e) = result {
        tracing::error!(error = %e, "game loop aborted");
        eprintln!("Game error: {e}");
    }

    println!();
    println!("Thanks for playing Box Push!");
    if session.all_cleared() {
        println!("All {} stages cleared in {}.", session.level_count(), session.elapsed_text());
    }
    tracing::info!("exit");
}

/// Log to a file: the terminal belongs to the renderer.
/// `RUST_LOG` filters (default `info`); `BOXPUSH_LOG` overrides the path.
fn init_tracing() {
    let path = std::env::var_os(LOG_PATH_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|| std::env::temp_dir().join("boxpush.log"));
    let file = match File::create(&path) {
        Ok(f) => f,
        Err(e) => {
            eprintln!("Logging disabled, cannot create {}: {e}", path.display());
            return;
        }
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(false)
        .compact()
        .init();
}

fn game_loop(
    session: &mut Session,
    renderer: &mut Renderer,
    sound: Option<&SoundEngine>,
    config: &GameConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut kb = InputState::new();
    let mut gp = GamepadState::new();
    gp.load_button_config(&config.gamepad);
    if gp.connected {
        tracing::info!("gamepad detected");
    }
    let tick_rate = Duration::from_millis(config.tick_rate_ms);
    let mut last_tick = Instant::now();

    renderer.render(session)?;

    loop {
        kb.drain_events();
        gp.update();

        if kb.ctrl_c_pressed() || quit_requested(session, &kb) {
            break;
        }

        for intent in kb.intents().into_iter().chain(gp.intents()) {
            if let Err(rejected) = session.handle(intent) {
                tracing::debug!(?intent, %rejected, "intent rejected");
            }
        }

        let mut frame_due = false;
        let now = Instant::now();
        if now.duration_since(last_tick) >= tick_rate {
            session.tick(now.duration_since(last_tick));
            last_tick = now;
            frame_due = true;
        }

        process_sound_events(sound, session);

        // Repaint on change, and once per tick to pick up terminal resizes.
        if session.take_redraw() || frame_due {
            renderer.render(session)?;
        }
        std::thread::sleep(FRAME_SLEEP);
    }

    Ok(())
}

/// `Q` quits from the title screen only.
fn quit_requested(session: &Session, kb: &InputState) -> bool {
    session.phase() == Phase::Title
        && kb.raw_events.iter().any(|k| matches!(k.code, KeyCode::Char('q') | KeyCode::Char('Q')))
}

fn process_sound_events(sound: Option<&SoundEngine>, session: &mut Session) {
    let events = session.drain_events();
    let sfx = match sound {
        Some(s) => s,
        None => return,
    };
    for effect in effects_for(&events) {
        sfx.play(effect);
    }
}
