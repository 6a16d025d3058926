/// Keyboard input.
///
/// One key press is one command. Movement is edge-triggered: a held key
/// does not repeat turns, so only Press events are kept.
///
/// Key names in config.toml:
///   single character (letters case-insensitive),
///   Up Down Left Right Enter Esc Tab Space Backspace F1..F12

use std::time::Duration;

use crossterm::event::{self, poll, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::config::{GameConfig, KeyConfig};
use crate::domain::entity::MoveDir;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Command {
    Move(MoveDir),
    OpenBackpack,
    OpenEnemies,
    Restart,
    Quit,
    Confirm,
}

/// Parse one key name. `None` for unknown names.
pub fn parse_key_name(name: &str) -> Option<KeyCode> {
    let mut chars = name.chars();
    if let (Some(c), None) = (chars.next(), chars.next()) {
        return Some(KeyCode::Char(c.to_ascii_lowercase()));
    }
    let code = match name.to_ascii_lowercase().as_str() {
        "up" => KeyCode::Up,
        "down" => KeyCode::Down,
        "left" => KeyCode::Left,
        "right" => KeyCode::Right,
        "enter" | "return" => KeyCode::Enter,
        "esc" | "escape" => KeyCode::Esc,
        "tab" => KeyCode::Tab,
        "space" => KeyCode::Char(' '),
        "backspace" => KeyCode::Backspace,
        f if f.starts_with('f') => {
            let n: u8 = f[1..].parse().ok()?;
            if (1..=12).contains(&n) { KeyCode::F(n) } else { return None; }
        }
        _ => return None,
    };
    Some(code)
}

fn normalize(code: KeyCode) -> KeyCode {
    match code {
        KeyCode::Char(c) => KeyCode::Char(c.to_ascii_lowercase()),
        other => other,
    }
}

/// Key → command bindings.
pub struct Keymap {
    bindings: Vec<(KeyCode, Command)>,
}

impl Keymap {
    /// Build from config. Unknown names are skipped with a warning; a
    /// command left with no keys keeps its default binding.
    pub fn from_config(cfg: &KeyConfig) -> Self {
        let defaults = GameConfig::default().keys;
        let groups = [
            (cfg.up.as_slice(), defaults.up.as_slice(), Command::Move(MoveDir::Up)),
            (cfg.down.as_slice(), defaults.down.as_slice(), Command::Move(MoveDir::Down)),
            (cfg.left.as_slice(), defaults.left.as_slice(), Command::Move(MoveDir::Left)),
            (cfg.right.as_slice(), defaults.right.as_slice(), Command::Move(MoveDir::Right)),
            (cfg.backpack.as_slice(), defaults.backpack.as_slice(), Command::OpenBackpack),
            (cfg.enemies.as_slice(), defaults.enemies.as_slice(), Command::OpenEnemies),
            (cfg.restart.as_slice(), defaults.restart.as_slice(), Command::Restart),
            (cfg.quit.as_slice(), defaults.quit.as_slice(), Command::Quit),
        ];

        let mut bindings = Vec::new();
        for (names, fallback, cmd) in groups {
            let mut codes = parse_list(names, cmd);
            if codes.is_empty() {
                codes = parse_list(fallback, cmd);
            }
            bindings.extend(codes.into_iter().map(|c| (c, cmd)));
        }
        bindings.push((KeyCode::Enter, Command::Confirm));
        Keymap { bindings }
    }

    /// First binding wins when a key is listed twice.
    pub fn command(&self, code: KeyCode) -> Option<Command> {
        let code = normalize(code);
        self.bindings.iter().find(|(c, _)| *c == code).map(|(_, cmd)| *cmd)
    }
}

fn parse_list(names: &[String], cmd: Command) -> Vec<KeyCode> {
    names.iter()
        .filter_map(|n| {
            let code = parse_key_name(n);
            if code.is_none() {
                log::warn!("unknown key name {n:?} for {cmd:?}, ignored");
            }
            code
        })
        .collect()
}

// ══════════════════════════════════════════════════════════════
// Terminal event pump
// ══════════════════════════════════════════════════════════════

pub struct InputState {
    /// Key presses collected by the last drain.
    pub presses: Vec<KeyEvent>,
}

impl InputState {
    pub fn new() -> Self {
        InputState { presses: Vec::with_capacity(8) }
    }

    /// Wait up to `wait` for input, then drain everything pending.
    pub fn drain_events(&mut self, wait: Duration) {
        self.presses.clear();
        if !poll(wait).unwrap_or(false) {
            return;
        }
        loop {
            match event::read() {
                Ok(Event::Key(key)) if key.kind == KeyEventKind::Press => self.presses.push(key),
                Ok(_) => {}
                Err(e) => {
                    log::warn!("terminal read failed: {e}");
                    break;
                }
            }
            if !poll(Duration::ZERO).unwrap_or(false) {
                break;
            }
        }
    }

    pub fn ctrl_c_pressed(&self) -> bool {
        self.presses.iter().any(|k| {
            k.modifiers.contains(KeyModifiers::CONTROL)
                && (k.code == KeyCode::Char('c') || k.code == KeyCode::Char('C'))
        })
    }
}

// ══════════════════════════════════════════════════════════════
// Start screen form
// ══════════════════════════════════════════════════════════════

pub const NAME_MAX: usize = 16;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum FormAction {
    None,
    Edited,
    Submit,
    Quit,
}

/// Name entry plus race choice.
pub struct StartForm {
    pub name: String,
    races: Vec<String>,
    race_idx: usize,
}

impl StartForm {
    pub fn new(races: &[String], default_race: &str) -> Self {
        let mut races = races.to_vec();
        let race_idx = match races.iter().position(|r| r == default_race) {
            Some(i) => i,
            None => {
                races.insert(0, default_race.to_string());
                0
            }
        };
        StartForm { name: String::new(), races, race_idx }
    }

    pub fn race(&self) -> &str {
        &self.races[self.race_idx]
    }

    pub fn handle(&mut self, key: &KeyEvent) -> FormAction {
        match key.code {
            KeyCode::Enter => FormAction::Submit,
            KeyCode::Esc => FormAction::Quit,
            KeyCode::Backspace => {
                self.name.pop();
                FormAction::Edited
            }
            KeyCode::Tab | KeyCode::Right => {
                self.race_idx = (self.race_idx + 1) % self.races.len();
                FormAction::Edited
            }
            KeyCode::BackTab | KeyCode::Left => {
                self.race_idx = (self.race_idx + self.races.len() - 1) % self.races.len();
                FormAction::Edited
            }
            KeyCode::Char(c) if !c.is_control() && !key.modifiers.contains(KeyModifiers::CONTROL) => {
                if self.name.chars().count() < NAME_MAX {
                    self.name.push(c);
                }
                FormAction::Edited
            }
            _ => FormAction::None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn key_names() {
        assert_eq!(parse_key_name("W"), Some(KeyCode::Char('w')));
        assert_eq!(parse_key_name("Up"), Some(KeyCode::Up));
        assert_eq!(parse_key_name("esc"), Some(KeyCode::Esc));
        assert_eq!(parse_key_name("Space"), Some(KeyCode::Char(' ')));
        assert_eq!(parse_key_name("F12"), Some(KeyCode::F(12)));
        assert_eq!(parse_key_name("F13"), None);
        assert_eq!(parse_key_name("Hyper"), None);
        assert_eq!(parse_key_name(""), None);
    }

    #[test]
    fn default_keymap() {
        let km = Keymap::from_config(&GameConfig::default().keys);
        assert_eq!(km.command(KeyCode::Char('w')), Some(Command::Move(MoveDir::Up)));
        assert_eq!(km.command(KeyCode::Char('S')), Some(Command::Move(MoveDir::Down)));
        assert_eq!(km.command(KeyCode::Left), Some(Command::Move(MoveDir::Left)));
        assert_eq!(km.command(KeyCode::Char('d')), Some(Command::Move(MoveDir::Right)));
        assert_eq!(km.command(KeyCode::Char('i')), Some(Command::OpenBackpack));
        assert_eq!(km.command(KeyCode::Char('e')), Some(Command::OpenEnemies));
        assert_eq!(km.command(KeyCode::Char('r')), Some(Command::Restart));
        assert_eq!(km.command(KeyCode::Esc), Some(Command::Quit));
        assert_eq!(km.command(KeyCode::Enter), Some(Command::Confirm));
        assert_eq!(km.command(KeyCode::Char('z')), None);
    }

    #[test]
    fn unknown_names_fall_back_to_default() {
        let mut keys = GameConfig::default().keys;
        keys.up = vec!["Hyper".into()];
        keys.backpack = vec!["b".into(), "Nope".into()];
        let km = Keymap::from_config(&keys);
        assert_eq!(km.command(KeyCode::Char('w')), Some(Command::Move(MoveDir::Up)));
        assert_eq!(km.command(KeyCode::Char('b')), Some(Command::OpenBackpack));
        assert_eq!(km.command(KeyCode::Char('i')), None);
    }

    #[test]
    fn start_form_edits_and_cycles() {
        let races: Vec<String> = ["Elf", "Human", "Dwarf"].iter().map(|s| s.to_string()).collect();
        let mut form = StartForm::new(&races, "Elf");
        assert_eq!(form.race(), "Elf");
        for c in "Gimlix".chars() {
            form.handle(&key(KeyCode::Char(c)));
        }
        form.handle(&key(KeyCode::Backspace));
        assert_eq!(form.name, "Gimli");
        form.handle(&key(KeyCode::Tab));
        form.handle(&key(KeyCode::Tab));
        assert_eq!(form.race(), "Dwarf");
        form.handle(&key(KeyCode::Right));
        assert_eq!(form.race(), "Elf");
        form.handle(&key(KeyCode::Left));
        assert_eq!(form.race(), "Dwarf");
        assert_eq!(form.handle(&key(KeyCode::Enter)), FormAction::Submit);
        assert_eq!(form.handle(&key(KeyCode::Esc)), FormAction::Quit);
    }

    #[test]
    fn start_form_limits_name_and_adds_unknown_race() {
        let mut form = StartForm::new(&["Human".to_string()], "Hobbit");
        assert_eq!(form.race(), "Hobbit");
        for _ in 0..40 {
            form.handle(&key(KeyCode::Char('a')));
        }
        assert_eq!(form.name.len(), NAME_MAX);
    }
}
