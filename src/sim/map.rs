/// Room registry: the fixed set of rooms for one session.
///
/// ## Sources (priority order):
///   1. `map_file` from config.toml (TOML room list)
///   2. Built-in rooms A, B, C
///
/// ## Map file format:
///   ```toml
///   start = "A"
///   player = [15, 15]              # player start (x, y) in the start room
///   [[room]]
///   key = "A"
///   layout = [10, 10, 20, 20]      # top, left, bottom, right
///   [[room.gate]]
///   to = "B"
///   x = 20
///   y = 15
///   orientation = "vertical"       # or "horizontal"
///   start = [19, 15]               # player start (x, y) in room B
///   [[room.enemy]]
///   kind = "emu"                   # rat | emu | dragon
///   name = "Emulgealo"
///   x = 14
///   y = 18
///   [[room.item]]
///   kind = "food"                  # food | sword | armor
///   name = "Peach"
///   x = 11
///   y = 19
///   ```
///
/// Enemy and item stats come from their kind unless overridden.
/// Overrides must lie within ±`STAT_LIMIT`.
/// Regenerating the registry is what resets enemy health and item
/// pickup flags on restart.

use std::collections::BTreeMap;
use std::path::Path;

use serde::Deserialize;

use crate::domain::entity::{Enemy, EnemyKind, Gate, GateOrientation, Item, ItemKind, Player, StatBonus};
use crate::error::MapError;

/// Largest magnitude accepted for any stat in a map file.
pub const STAT_LIMIT: i32 = 10_000;

pub use crate::domain::entity::RoomKey;

/// Room outline rectangle, inclusive bounds.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Layout {
    pub top: usize,
    pub left: usize,
    pub bottom: usize,
    pub right: usize,
}

#[derive(Clone, Debug)]
pub struct Room {
    pub key: RoomKey,
    pub layout: Layout,
    pub gates: Vec<Gate>,
    pub enemies: Vec<Enemy>,
    pub items: Vec<Item>,
}

#[derive(Clone, Debug)]
pub struct MapRegistry {
    rooms: BTreeMap<RoomKey, Room>,
    pub start: RoomKey,
    /// Where the player appears in the start room.
    pub player_start: (usize, usize),
}

// ══════════════════════════════════════════════════════════════
// Public API
// ══════════════════════════════════════════════════════════════

impl MapRegistry {
    /// Build a registry from rooms. Duplicate keys are rejected.
    pub fn from_rooms(start: RoomKey, rooms: Vec<Room>) -> Result<Self, MapError> {
        let mut map = BTreeMap::new();
        for room in rooms {
            let key = room.key;
            if map.insert(key, room).is_some() {
                return Err(MapError::DuplicateRoom(key));
            }
        }
        Ok(MapRegistry { rooms: map, start, player_start: Player::START })
    }

    /// The built-in dungeon.
    pub fn builtin() -> Self {
        let rooms = builtin_rooms();
        MapRegistry {
            rooms: rooms.into_iter().map(|r| (r.key, r)).collect(),
            start: RoomKey::A,
            player_start: Player::START,
        }
    }

    /// Parse a map file's contents.
    pub fn from_toml_str(text: &str) -> Result<Self, MapError> {
        let file: MapFile = toml::from_str(text)?;
        let rooms = file.room.into_iter().map(RoomDef::into_room).collect();
        let mut map = Self::from_rooms(file.start, rooms)?;
        map.player_start = file.player;
        Ok(map)
    }

    /// Read and parse a map file.
    pub fn load_file(path: &Path) -> Result<Self, MapError> {
        let text = std::fs::read_to_string(path).map_err(|source| MapError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// Check every room against the board size. Any defect is fatal.
    pub fn validate(&self, width: usize, height: usize) -> Result<(), MapError> {
        let start_room = match self.rooms.get(&self.start) {
            Some(r) => r,
            None => return Err(MapError::MissingRoom(self.start)),
        };
        let inside = |x: usize, y: usize| x < width && y < height;

        for room in self.rooms.values() {
            let key = room.key;
            let l = room.layout;
            if l.top > l.bottom || l.left > l.right || !inside(l.right, l.bottom) {
                return Err(MapError::LayoutOutOfBounds {
                    room: key,
                    top: l.top,
                    left: l.left,
                    bottom: l.bottom,
                    right: l.right,
                });
            }
            for gate in &room.gates {
                if !self.rooms.contains_key(&gate.to) {
                    return Err(MapError::UnknownGateTarget { room: key, to: gate.to });
                }
                if !inside(gate.x, gate.y) {
                    return Err(out_of_bounds(key, "gate", gate.x, gate.y));
                }
                let (sx, sy) = gate.player_start;
                if !inside(sx, sy) {
                    return Err(out_of_bounds(gate.to, "player start", sx, sy));
                }
                if room.items.iter().any(|i| i.x == gate.x && i.y == gate.y) {
                    return Err(MapError::GateOnItem { room: key, x: gate.x, y: gate.y });
                }
            }
            for e in &room.enemies {
                if !inside(e.x, e.y) {
                    return Err(out_of_bounds(key, &format!("enemy {}", e.name), e.x, e.y));
                }
                check_stats(key, &e.name, [Some(e.health), Some(e.attack), Some(e.defense)])?;
            }
            for i in &room.items {
                if !inside(i.x, i.y) {
                    return Err(out_of_bounds(key, &format!("item {}", i.name), i.x, i.y));
                }
                check_stats(key, &i.name, [i.bonus.health, i.bonus.attack, i.bonus.defense])?;
            }
        }

        let (px, py) = self.player_start;
        let l = start_room.layout;
        if !inside(px, py) || !(l.left < px && px < l.right && l.top < py && py < l.bottom) {
            return Err(out_of_bounds(self.start, "player start", px, py));
        }
        Ok(())
    }

    /// Room by key. Keys come from `start` or validated gate targets.
    pub fn room(&self, key: RoomKey) -> &Room {
        &self.rooms[&key]
    }

    pub fn room_mut(&mut self, key: RoomKey) -> &mut Room {
        self.rooms.get_mut(&key).expect("room key validated at registry construction")
    }

    #[cfg(test)]
    pub fn keys(&self) -> impl Iterator<Item = RoomKey> + '_ {
        self.rooms.keys().copied()
    }
}

fn out_of_bounds(room: RoomKey, what: &str, x: usize, y: usize) -> MapError {
    MapError::OutOfBounds { room, what: what.to_string(), x, y }
}

fn check_stats(room: RoomKey, name: &str, stats: [Option<i32>; 3]) -> Result<(), MapError> {
    match stats.into_iter().flatten().find(|v| v.abs() > STAT_LIMIT) {
        Some(value) => Err(MapError::StatOutOfRange { room, name: name.to_string(), value }),
        None => Ok(()),
    }
}

// ══════════════════════════════════════════════════════════════
// Map file schema
// ══════════════════════════════════════════════════════════════

#[derive(Deserialize, Debug)]
struct MapFile {
    #[serde(default = "default_start")]
    start: RoomKey,
    #[serde(default = "default_player")]
    player: (usize, usize),
    #[serde(default)]
    room: Vec<RoomDef>,
}

fn default_start() -> RoomKey { RoomKey::A }
fn default_player() -> (usize, usize) { Player::START }

#[derive(Deserialize, Debug)]
struct RoomDef {
    key: RoomKey,
    layout: [usize; 4],
    #[serde(default)]
    gate: Vec<GateDef>,
    #[serde(default)]
    enemy: Vec<EnemyDef>,
    #[serde(default)]
    item: Vec<ItemDef>,
}

#[derive(Deserialize, Debug)]
struct GateDef {
    to: RoomKey,
    x: usize,
    y: usize,
    orientation: GateOrientation,
    start: (usize, usize),
}

#[derive(Deserialize, Debug)]
struct EnemyDef {
    kind: EnemyKind,
    name: Option<String>,
    x: usize,
    y: usize,
    health: Option<i32>,
    attack: Option<i32>,
    defense: Option<i32>,
    disturbed: Option<bool>,
    boss: Option<bool>,
}

#[derive(Deserialize, Debug)]
struct ItemDef {
    kind: ItemKind,
    name: String,
    x: usize,
    y: usize,
    health: Option<i32>,
    attack: Option<i32>,
    defense: Option<i32>,
}

impl RoomDef {
    fn into_room(self) -> Room {
        let [top, left, bottom, right] = self.layout;
        Room {
            key: self.key,
            layout: Layout { top, left, bottom, right },
            gates: self.gate.into_iter().map(|g| Gate {
                x: g.x,
                y: g.y,
                to: g.to,
                orientation: g.orientation,
                player_start: g.start,
            }).collect(),
            enemies: self.enemy.into_iter().map(EnemyDef::into_enemy).collect(),
            items: self.item.into_iter().map(ItemDef::into_item).collect(),
        }
    }
}

impl EnemyDef {
    fn into_enemy(self) -> Enemy {
        let name = self.name.unwrap_or_else(|| self.kind.race().to_string());
        let mut e = Enemy::new(self.kind, &name, self.x, self.y);
        if let Some(v) = self.health { e.health = v; }
        if let Some(v) = self.attack { e.attack = v; }
        if let Some(v) = self.defense { e.defense = v; }
        if let Some(v) = self.disturbed { e.disturbed = v; }
        if let Some(v) = self.boss { e.boss = v; }
        e
    }
}

impl ItemDef {
    fn into_item(self) -> Item {
        let mut item = Item::new(self.kind, &self.name, self.x, self.y);
        let base = item.bonus;
        item.bonus = StatBonus {
            health: self.health.or(base.health),
            attack: self.attack.or(base.attack),
            defense: self.defense.or(base.defense),
        };
        item
    }
}

// ══════════════════════════════════════════════════════════════
// Built-in rooms
// ══════════════════════════════════════════════════════════════

fn builtin_rooms() -> Vec<Room> {
    vec![
        Room {
            key: RoomKey::A,
            layout: Layout { top: 10, left: 10, bottom: 20, right: 20 },
            gates: vec![
                gate(20, 15, RoomKey::B, GateOrientation::Vertical, (19, 15)),
                gate(13, 10, RoomKey::C, GateOrientation::Horizontal, (57, 17)),
            ],
            enemies: vec![
                Enemy::new(EnemyKind::Emu, "Emulgealo", 14, 18),
                Enemy::new(EnemyKind::Rat, "Ratatouille", 12, 11),
            ],
            items: vec![
                Item::new(ItemKind::Food, "Peach", 11, 19),
                Item::new(ItemKind::Sword, "Mace", 19, 19),
                Item::new(ItemKind::Armor, "Chainmail", 19, 11),
            ],
        },
        Room {
            key: RoomKey::B,
            layout: Layout { top: 13, left: 6, bottom: 17, right: 70 },
            gates: vec![
                gate(6, 15, RoomKey::A, GateOrientation::Vertical, (19, 15)),
            ],
            enemies: vec![
                Enemy::new(EnemyKind::Dragon, "Draconoid", 25, 15),
            ],
            items: vec![
                Item::new(ItemKind::Food, "Peach", 10, 16),
                Item::new(ItemKind::Sword, "Mace", 30, 14),
                Item::new(ItemKind::Armor, "Chainmail", 69, 16),
            ],
        },
        Room {
            key: RoomKey::C,
            layout: Layout { top: 10, left: 50, bottom: 18, right: 65 },
            gates: vec![
                gate(57, 18, RoomKey::A, GateOrientation::Horizontal, (13, 11)),
            ],
            enemies: vec![
                Enemy::new(EnemyKind::Rat, "Rattata", 55, 15),
            ],
            items: vec![
                Item::new(ItemKind::Food, "Peach", 64, 17),
                Item::new(ItemKind::Sword, "Mace", 64, 11),
            ],
        },
    ]
}

fn gate(x: usize, y: usize, to: RoomKey, orientation: GateOrientation, player_start: (usize, usize)) -> Gate {
    Gate { x, y, to, orientation, player_start }
}
