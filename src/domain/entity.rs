/// Entities: Player, Enemy, Item, Gate.
/// Kinds carry their stat tables so map data only names them.

use std::fmt;

use serde::Deserialize;

use super::cell::Cell;

/// Anything that occupies a board cell.
pub trait Placeable {
    fn position(&self) -> (usize, usize);
    fn cell(&self) -> Cell;
}

/// Room identifier.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Deserialize)]
pub enum RoomKey {
    A,
    B,
    C,
    D,
    E,
}

impl fmt::Display for RoomKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RoomKey::A => "A",
            RoomKey::B => "B",
            RoomKey::C => "C",
            RoomKey::D => "D",
            RoomKey::E => "E",
        };
        f.write_str(s)
    }
}

/// Movement direction, one per key press.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum MoveDir {
    Up,
    Down,
    Left,
    Right,
}

impl MoveDir {
    pub const ALL: [MoveDir; 4] = [MoveDir::Up, MoveDir::Down, MoveDir::Left, MoveDir::Right];

    /// (dx, dy) unit vector.
    pub fn delta(self) -> (i32, i32) {
        match self {
            MoveDir::Up => (0, -1),
            MoveDir::Down => (0, 1),
            MoveDir::Left => (-1, 0),
            MoveDir::Right => (1, 0),
        }
    }
}

/// Offset (x, y) by (dx, dy). `None` if it would leave the first quadrant.
pub fn offset(x: usize, y: usize, dx: i32, dy: i32) -> Option<(usize, usize)> {
    let nx = x.checked_add_signed(dx as isize)?;
    let ny = y.checked_add_signed(dy as isize)?;
    Some((nx, ny))
}

// ── Player ──

#[derive(Clone, Debug)]
pub struct Player {
    pub x: usize,
    pub y: usize,
    pub name: String,
    pub race: String,
    pub health: i32,
    pub attack: i32,
    pub defense: i32,
}

impl Player {
    pub const START: (usize, usize) = (15, 15);
    pub const START_HEALTH: i32 = 100;

    pub fn new(name: &str, race: &str) -> Self {
        Player {
            x: Self::START.0,
            y: Self::START.1,
            name: name.to_string(),
            race: race.to_string(),
            health: Self::START_HEALTH,
            attack: 1,
            defense: 1,
        }
    }

    pub fn is_alive(&self) -> bool {
        self.health > 0
    }
}

impl Placeable for Player {
    fn position(&self) -> (usize, usize) {
        (self.x, self.y)
    }
    fn cell(&self) -> Cell {
        Cell::Player
    }
}

// ── Enemies ──

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EnemyKind {
    Rat,
    Emu,
    Dragon,
}

/// Default stat block of an enemy kind.
#[derive(Clone, Copy, Debug)]
pub struct EnemyStats {
    pub health: i32,
    pub attack: i32,
    pub defense: i32,
    pub disturbed: bool,
    pub boss: bool,
}

impl EnemyKind {
    pub fn glyph(self) -> char {
        match self {
            EnemyKind::Rat => 'R',
            EnemyKind::Emu => 'E',
            EnemyKind::Dragon => 'D',
        }
    }

    pub fn race(self) -> &'static str {
        match self {
            EnemyKind::Rat => "Rat",
            EnemyKind::Emu => "Emu",
            EnemyKind::Dragon => "Dragon",
        }
    }

    pub fn stats(self) -> EnemyStats {
        match self {
            EnemyKind::Rat => EnemyStats { health: 10, attack: 1, defense: 0, disturbed: false, boss: false },
            EnemyKind::Emu => EnemyStats { health: 5, attack: 3, defense: 1, disturbed: true, boss: false },
            EnemyKind::Dragon => EnemyStats { health: 100, attack: 10, defense: 10, disturbed: true, boss: true },
        }
    }
}

#[derive(Clone, Debug)]
pub struct Enemy {
    pub kind: EnemyKind,
    pub name: String,
    pub x: usize,
    pub y: usize,
    pub health: i32,
    pub attack: i32,
    pub defense: i32,
    /// Has noticed the player. Undisturbed enemies take no turns.
    pub disturbed: bool,
    pub boss: bool,
}

impl Enemy {
    pub fn new(kind: EnemyKind, name: &str, x: usize, y: usize) -> Self {
        let s = kind.stats();
        Enemy {
            kind,
            name: name.to_string(),
            x, y,
            health: s.health,
            attack: s.attack,
            defense: s.defense,
            disturbed: s.disturbed,
            boss: s.boss,
        }
    }

    /// Health <= 0 is permanent: no board presence, no turns.
    pub fn is_alive(&self) -> bool {
        self.health > 0
    }

    pub fn race(&self) -> &'static str {
        self.kind.race()
    }
}

impl Placeable for Enemy {
    fn position(&self) -> (usize, usize) {
        (self.x, self.y)
    }
    fn cell(&self) -> Cell {
        Cell::Enemy(self.kind)
    }
}

// ── Items ──

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemKind {
    Food,
    Sword,
    Armor,
}

/// Stat bonuses an item grants. Only defined fields apply.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct StatBonus {
    pub health: Option<i32>,
    pub attack: Option<i32>,
    pub defense: Option<i32>,
}

impl StatBonus {
    pub fn apply_to(&self, player: &mut Player) {
        if let Some(h) = self.health { player.health = player.health.saturating_add(h); }
        if let Some(a) = self.attack { player.attack = player.attack.saturating_add(a); }
        if let Some(d) = self.defense { player.defense = player.defense.saturating_add(d); }
    }
}

impl ItemKind {
    pub fn glyph(self) -> char {
        match self {
            ItemKind::Food => 'f',
            ItemKind::Sword => 's',
            ItemKind::Armor => 'a',
        }
    }

    pub fn bonus(self) -> StatBonus {
        match self {
            ItemKind::Food => StatBonus { health: Some(5), attack: None, defense: Some(0) },
            ItemKind::Sword => StatBonus { health: None, attack: Some(5), defense: Some(2) },
            ItemKind::Armor => StatBonus { health: Some(10), attack: Some(1), defense: Some(5) },
        }
    }
}

#[derive(Clone, Debug)]
pub struct Item {
    pub kind: ItemKind,
    pub name: String,
    pub x: usize,
    pub y: usize,
    /// Once set, the item never returns to the board.
    pub picked_up: bool,
    pub bonus: StatBonus,
}

impl Item {
    pub fn new(kind: ItemKind, name: &str, x: usize, y: usize) -> Self {
        Item {
            kind,
            name: name.to_string(),
            x, y,
            picked_up: false,
            bonus: kind.bonus(),
        }
    }
}

impl Placeable for Item {
    fn position(&self) -> (usize, usize) {
        (self.x, self.y)
    }
    fn cell(&self) -> Cell {
        Cell::Item(self.kind)
    }
}

// ── Gates ──

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GateOrientation {
    Horizontal,
    Vertical,
}

impl GateOrientation {
    pub fn glyph(self) -> char {
        match self {
            GateOrientation::Horizontal => '"',
            GateOrientation::Vertical => '=',
        }
    }
}

#[derive(Clone, Debug)]
pub struct Gate {
    pub x: usize,
    pub y: usize,
    pub to: RoomKey,
    pub orientation: GateOrientation,
    /// Where the player lands in the destination room.
    pub player_start: (usize, usize),
}

impl Placeable for Gate {
    fn position(&self) -> (usize, usize) {
        (self.x, self.y)
    }
    fn cell(&self) -> Cell {
        Cell::Gate(self.orientation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn enemy_takes_kind_defaults() {
        let rat = Enemy::new(EnemyKind::Rat, "Ratatouille", 12, 11);
        assert_eq!((rat.health, rat.attack, rat.defense), (10, 1, 0));
        assert!(!rat.disturbed);
        assert!(!rat.boss);
        let dragon = Enemy::new(EnemyKind::Dragon, "Draconoid", 25, 15);
        assert!(dragon.disturbed && dragon.boss);
        assert_eq!(dragon.race(), "Dragon");
    }

    #[test]
    fn bonus_applies_only_defined_fields() {
        let mut p = Player::new("Legolas", "Elf");
        ItemKind::Sword.bonus().apply_to(&mut p);
        assert_eq!((p.health, p.attack, p.defense), (100, 6, 3));
        ItemKind::Armor.bonus().apply_to(&mut p);
        assert_eq!((p.health, p.attack, p.defense), (110, 7, 8));
    }

    #[test]
    fn bonus_saturates_instead_of_overflowing() {
        let mut p = Player::new("Legolas", "Elf");
        let bonus = StatBonus { health: None, attack: Some(i32::MAX), defense: Some(i32::MIN) };
        bonus.apply_to(&mut p);
        bonus.apply_to(&mut p);
        assert_eq!((p.attack, p.defense), (i32::MAX, i32::MIN));
    }

    #[test]
    fn offset_refuses_negative_coordinates() {
        assert_eq!(offset(0, 5, -1, 0), None);
        assert_eq!(offset(3, 5, 1, -1), Some((4, 4)));
    }

    #[test]
    fn directions_are_unit_steps() {
        for d in MoveDir::ALL {
            let (dx, dy) = d.delta();
            assert_eq!(dx.abs() + dy.abs(), 1);
        }
    }
}
