/// Entry point and game loop.

mod config;
mod domain;
mod error;
mod sim;
mod ui;

use std::io::Write;
use std::time::Duration;

use anyhow::{Context, Result};
use crossterm::event::KeyEvent;
use log::LevelFilter;

use config::{GameConfig, LoggingConfig};
use sim::present::{present, Panel};
use sim::projection;
use sim::step::resolve_turn;
use sim::world::{Phase, Session};
use ui::gamepad::GamepadState;
use ui::input::{Command, FormAction, InputState, Keymap, StartForm};
use ui::renderer::Renderer;
use ui::sound::{sfx_for_turn, SoundEngine};

/// Longest wait for input before the gamepad is polled again.
const POLL_WAIT: Duration = Duration::from_millis(40);

/// Environment variable overriding `[logging] level`.
const LOG_ENV: &str = "DUNGEON_LOG";

fn main() -> Result<()> {
    let config = GameConfig::load();
    init_logging(&config.logging)?;
    for w in &config.warnings {
        log::warn!("{w}");
    }

    // Map defects are fatal and reported before the terminal is taken over.
    let session = Session::from_config(&config).context("could not build the dungeon")?;

    let mut renderer = Renderer::new();
    renderer.help = help_line(&config);
    renderer.restart_key = first_key(&config.keys.restart);
    renderer.quit_key = first_key(&config.keys.quit);
    renderer.init().context("terminal init failed")?;

    let sound = if config.sound_enabled { SoundEngine::new() } else { None };

    let result = game_loop(session, &mut renderer, sound.as_ref(), &config);
    let cleanup = renderer.cleanup();

    result?;
    cleanup.context("terminal cleanup failed")?;

    println!();
    println!("Thanks for playing Dungeon Crawl!");
    Ok(())
}

/// Log to the configured file. Without one, logging is off: the terminal
/// belongs to the renderer.
fn init_logging(cfg: &LoggingConfig) -> Result<()> {
    let path = match &cfg.file {
        Some(p) => p,
        None => {
            log::set_max_level(LevelFilter::Off);
            return Ok(());
        }
    };
    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("could not open log file {}", path.display()))?;

    let (level, bad_level) = match cfg.level.parse::<LevelFilter>() {
        Ok(l) => (l, false),
        Err(_) => (LevelFilter::Info, true),
    };

    let mut builder = env_logger::Builder::new();
    builder.filter_level(level);
    if let Ok(filters) = std::env::var(LOG_ENV) {
        builder.parse_filters(&filters);
    }
    builder
        .format(|buf, record| {
            writeln!(buf, "{} [{}] {}", buf.timestamp(), record.level(), record.args())
        })
        .target(env_logger::Target::Pipe(Box::new(file)))
        .try_init()
        .context("logger already initialised")?;

    if bad_level {
        log::warn!("unknown log level {:?}, using info", cfg.level);
    }
    log::info!("dungeon-crawl {} starting", env!("CARGO_PKG_VERSION"));
    Ok(())
}

fn first_key(keys: &[String]) -> String {
    keys.first().cloned().unwrap_or_default()
}

fn help_line(config: &GameConfig) -> String {
    let k = &config.keys;
    format!(
        " {}{}{}{}: move   {}: backpack   {}: enemies   {}: quit",
        first_key(&k.up), first_key(&k.left), first_key(&k.down), first_key(&k.right),
        first_key(&k.backpack), first_key(&k.enemies), first_key(&k.quit),
    )
}

// ══════════════════════════════════════════════════════════════
// Game loop
// ══════════════════════════════════════════════════════════════

struct Game<'a> {
    session: Session,
    form: StartForm,
    panel: Option<Panel>,
    keymap: Keymap,
    sound: Option<&'a SoundEngine>,
    config: &'a GameConfig,
}

/// What the loop should do after an input.
#[derive(PartialEq, Eq)]
enum Flow {
    Continue,
    Quit,
}

fn game_loop(
    session: Session,
    renderer: &mut Renderer,
    sound: Option<&SoundEngine>,
    config: &GameConfig,
) -> Result<()> {
    let mut kb = InputState::new();
    let mut gp = GamepadState::new();
    gp.load_button_config(&config.gamepad);

    let mut game = Game {
        session,
        form: StartForm::new(&config.player.races, &config.player.race),
        panel: None,
        keymap: Keymap::from_config(&config.keys),
        sound,
        config,
    };

    loop {
        game.draw(renderer).context("drawing failed")?;

        kb.drain_events(POLL_WAIT);
        let pad_commands = gp.update();

        if kb.ctrl_c_pressed() {
            break;
        }

        for key in &kb.presses {
            if game.on_key(key)? == Flow::Quit {
                return Ok(());
            }
        }
        for cmd in pad_commands {
            if game.on_command(cmd)? == Flow::Quit {
                return Ok(());
            }
        }
    }

    Ok(())
}

impl Game<'_> {
    fn draw(&self, renderer: &mut Renderer) -> std::io::Result<()> {
        match self.session.phase {
            Phase::Start => renderer.draw_start(&self.form),
            Phase::Playing => {
                present(&self.session, self.panel, renderer);
                renderer.draw_playing()
            }
            Phase::GameOver => renderer.draw_game_over(&projection::player_summary(&self.session)),
        }
    }

    fn on_key(&mut self, key: &KeyEvent) -> Result<Flow> {
        if self.session.phase == Phase::Start {
            return Ok(match self.form.handle(key) {
                FormAction::Submit => {
                    self.begin_play();
                    Flow::Continue
                }
                FormAction::Quit => Flow::Quit,
                FormAction::Edited | FormAction::None => Flow::Continue,
            });
        }
        match self.keymap.command(key.code) {
            Some(cmd) => self.on_command(cmd),
            None => Ok(Flow::Continue),
        }
    }

    fn on_command(&mut self, cmd: Command) -> Result<Flow> {
        match (self.session.phase, cmd) {
            (_, Command::Quit) => return Ok(Flow::Quit),

            (Phase::Start, Command::Confirm) => self.begin_play(),
            (Phase::Start, _) => {}

            (Phase::Playing, Command::Move(dir)) => {
                self.panel = None;
                match resolve_turn(&mut self.session, dir) {
                    Ok(report) => {
                        if let Some(sfx) = self.sound {
                            for effect in sfx_for_turn(&report.events) {
                                sfx.play(effect);
                            }
                        }
                    }
                    Err(e) => log::debug!("move ignored: {e}"),
                }
            }
            (Phase::Playing, Command::OpenBackpack) => self.panel = Some(Panel::Backpack),
            (Phase::Playing, Command::OpenEnemies) => self.panel = Some(Panel::Enemies),
            (Phase::Playing, _) => {}

            (Phase::GameOver, Command::Restart) => self.restart()?,
            (Phase::GameOver, _) => {}
        }
        Ok(Flow::Continue)
    }

    fn begin_play(&mut self) {
        let name = self.form.name.clone();
        let race = self.form.race().to_string();
        self.session.start(&name, &race);
        self.panel = None;
    }

    /// Discard the whole session and go back to the start screen.
    fn restart(&mut self) -> Result<()> {
        log::info!("restart after {} turns", self.session.turn);
        self.session = Session::from_config(self.config).context("could not rebuild the dungeon")?;
        self.form = StartForm::new(&self.config.player.races, &self.config.player.race);
        self.panel = None;
        Ok(())
    }
}
