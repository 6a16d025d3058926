/// Session: the complete state of a running game.
///
/// ## Lifecycle
///
///   Start ──start()──▶ Playing ──health <= 0──▶ GameOver
///     ▲                                            │
///     └──────────── restart (fresh Session) ◀──────┘
///
/// `board` is the snapshot drawn at the end of the previous turn. The turn
/// engine reads it for collision and target detection, then rebuilds it.
/// Restart never mutates a Session: it builds a new one, which regenerates
/// the map registry, the player and the backpack together.

use crate::config::GameConfig;
use crate::domain::board::Board;
use crate::domain::cell::Cell;
use crate::domain::entity::{Player, RoomKey};
use crate::error::MapError;

use super::backpack::Backpack;
use super::map::{MapRegistry, Room};
use super::projection;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Phase {
    Start,
    Playing,
    GameOver,
}

pub struct Session {
    pub phase: Phase,
    pub current_room: RoomKey,
    pub board: Board,
    pub map: MapRegistry,
    pub player: Player,
    pub backpack: Backpack,
    /// Single message slot. Only the newest message is kept.
    pub message: Option<String>,
    pub width: usize,
    pub height: usize,
    pub turn: u64,
}

// ── Construction ──

impl Session {
    /// Validate `map` against the board size and build a fresh session.
    /// The player is placed at the map's start position.
    pub fn new(map: MapRegistry, width: usize, height: usize, mut player: Player) -> Result<Self, MapError> {
        map.validate(width, height)?;
        (player.x, player.y) = map.player_start;
        let mut session = Session {
            phase: Phase::Start,
            current_room: map.start,
            board: Board::new(width, height, Cell::Empty),
            map,
            player,
            backpack: Backpack::new(),
            message: None,
            width,
            height,
            turn: 0,
        };
        session.redraw();
        Ok(session)
    }

    /// Build a session from config: map file if configured, else built-in rooms.
    pub fn from_config(config: &GameConfig) -> Result<Self, MapError> {
        let map = match &config.map_file {
            Some(path) => {
                log::info!("loading map file {}", path.display());
                MapRegistry::load_file(path)?
            }
            None => MapRegistry::builtin(),
        };
        let player = Player::new(&config.player.name, &config.player.race);
        Self::new(map, config.board.width, config.board.height, player)
    }

    /// Begin play. An empty name keeps the current (default) name.
    pub fn start(&mut self, name: &str, race: &str) {
        let name = name.trim();
        if !name.is_empty() {
            self.player.name = name.to_string();
        }
        if !race.is_empty() {
            self.player.race = race.to_string();
        }
        self.phase = Phase::Playing;
        log::info!("{} the {} enters room {}", self.player.name, self.player.race, self.current_room);
    }
}

// ── Queries / mutation ──

impl Session {
    pub fn room(&self) -> &Room {
        self.map.room(self.current_room)
    }

    pub fn room_mut(&mut self) -> &mut Room {
        self.map.room_mut(self.current_room)
    }

    /// Rebuild the board snapshot from current entity state.
    pub fn redraw(&mut self) {
        self.board = projection::project(self);
    }

    pub fn set_message(&mut self, msg: String) {
        self.message = Some(msg);
    }

    pub fn clear_message(&mut self) {
        self.message = None;
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Built-in session, already playing.
    pub(crate) fn playing() -> Session {
        let mut s = Session::new(MapRegistry::builtin(), 80, 24, Player::new("Legolas", "Elf")).unwrap();
        s.start("", "");
        s
    }

    #[test]
    fn new_session_starts_in_room_a_with_drawn_board() {
        let s = Session::new(MapRegistry::builtin(), 80, 24, Player::new("Legolas", "Elf")).unwrap();
        assert_eq!(s.phase, Phase::Start);
        assert_eq!(s.current_room, RoomKey::A);
        assert_eq!(s.board.get(15, 15), Cell::Player);
        assert_eq!(s.board.get(10, 10), Cell::Wall);
        assert!(s.backpack.is_empty());
    }

    #[test]
    fn start_keeps_default_name_when_blank() {
        let mut s = Session::new(MapRegistry::builtin(), 80, 24, Player::new("Legolas", "Elf")).unwrap();
        s.start("   ", "Dwarf");
        assert_eq!(s.phase, Phase::Playing);
        assert_eq!(s.player.name, "Legolas");
        assert_eq!(s.player.race, "Dwarf");

        let mut s = Session::new(MapRegistry::builtin(), 80, 24, Player::new("Legolas", "Elf")).unwrap();
        s.start("Gimli", "Dwarf");
        assert_eq!(s.player.name, "Gimli");
    }

    #[test]
    fn from_default_config_uses_builtin_rooms() {
        let s = Session::from_config(&GameConfig::default()).unwrap();
        assert_eq!(s.player.name, "Legolas");
        assert_eq!((s.width, s.height), (80, 24));
        assert_eq!(s.room().enemies.len(), 2);
    }

    #[test]
    fn player_appears_at_map_start() {
        let text = "start = \"B\"\nplayer = [5, 6]\n[[room]]\nkey = \"B\"\nlayout = [1, 1, 8, 8]\n";
        let map = MapRegistry::from_toml_str(text).unwrap();
        let s = Session::new(map, 12, 12, Player::new("Legolas", "Elf")).unwrap();
        assert_eq!((s.player.x, s.player.y), (5, 6));
        assert_eq!(s.board.get(5, 6), Cell::Player);
    }

    #[test]
    fn invalid_map_fails_construction() {
        let r = Session::new(MapRegistry::builtin(), 40, 24, Player::new("Legolas", "Elf"));
        assert!(matches!(r, Err(MapError::OutOfBounds { x: 57, y: 17, .. })));
    }
}
