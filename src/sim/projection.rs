/// Projection: flattens session state into what the sinks display.
///
/// Draw order per frame (last write wins on overlap):
///   room outline → living enemies → gates → unpicked items → player

use std::fmt::Write;

use crate::domain::board::Board;
use crate::domain::cell::Cell;

use super::world::Session;

/// Build a fresh board for the current room.
pub fn project(s: &Session) -> Board {
    let room = s.room();
    let l = room.layout;
    let mut board = Board::new(s.width, s.height, Cell::Empty);
    board.draw_room(l.top, l.left, l.bottom, l.right);
    for enemy in room.enemies.iter().filter(|e| e.is_alive()) {
        board.add(enemy);
    }
    for gate in &room.gates {
        board.add(gate);
    }
    for item in room.items.iter().filter(|i| !i.picked_up) {
        board.add(item);
    }
    board.add(&s.player);
    board
}

/// One-line player summary.
pub fn player_summary(s: &Session) -> String {
    let p = &s.player;
    format!(
        "Name: {} ({}) | Health: {} | A/D: {}/{} | POS: {} {} | ROOM: {}",
        p.name, p.race, p.health, p.attack, p.defense, p.x, p.y, s.current_room,
    )
}

/// Living enemies in the current room, `race: health` per line.
pub fn enemy_summary(s: &Session) -> String {
    let mut out = String::new();
    for e in s.room().enemies.iter().filter(|e| e.is_alive()) {
        let _ = writeln!(out, "{}: {}", e.race(), e.health);
    }
    out
}

/// Backpack panel text.
pub fn backpack_listing(s: &Session) -> String {
    let mut out = String::from("Items:\n");
    if s.backpack.is_empty() {
        out.push_str("Empty.");
        return out;
    }
    for (name, count) in s.backpack.iter() {
        let _ = writeln!(out, "{name}: {count}");
    }
    out
}

/// Enemy table panel text for the current room.
pub fn enemy_table(s: &Session) -> String {
    let mut out = String::from("Enemies in the room:\n");
    let living: Vec<_> = s.room().enemies.iter().filter(|e| e.is_alive()).collect();
    if living.is_empty() {
        out.push_str("The room is empty.");
        return out;
    }
    let _ = writeln!(out, "{:<14}{:<8}{:>7}{:>7}{:>8}", "name", "race", "health", "attack", "defense");
    for e in living {
        let _ = writeln!(out, "{:<14}{:<8}{:>7}{:>7}{:>8}", e.name, e.race(), e.health, e.attack, e.defense);
    }
    out
}
