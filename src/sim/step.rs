/// The turn function: resolves one player move and every enemy reaction.
///
/// Processing order:
///   1. Collision precheck (stale board cell at the target)
///   2. Gate transition
///   3. Attack resolution
///   4. Pickup resolution
///   5. Normal move
///   6. Enemy pass (attack if adjacent, else chase one step)
///   7. Terminal check
///
/// Steps 2–4 all test the same cell value read in step 1; nothing rereads
/// the board mid-turn. The board is rebuilt once, after step 7.
///
/// Relocation paths: gate teleport (2), pickup walk-on (4) and normal step
/// (5). Only step 5 consults the collision flag.

use crate::domain::cell::Cell;
use crate::domain::entity::{offset, MoveDir, Player};
use crate::domain::rules;
use crate::error::TurnError;
use super::event::GameEvent;
use super::world::{Phase, Session};

/// What a turn produced.
#[derive(Clone, Debug, Default)]
pub struct TurnReport {
    pub events: Vec<GameEvent>,
    /// Final content of the message slot (last writer wins).
    pub message: Option<String>,
}

// ══════════════════════════════════════════════════════════════
// Main entry point
// ══════════════════════════════════════════════════════════════

pub fn resolve_turn(s: &mut Session, dir: MoveDir) -> Result<TurnReport, TurnError> {
    if s.phase != Phase::Playing {
        return Err(TurnError::NotPlaying(s.phase));
    }

    let mut events: Vec<GameEvent> = Vec::new();
    s.turn += 1;
    s.clear_message();

    let (dx, dy) = dir.delta();
    let target = offset(s.player.x, s.player.y, dx, dy);
    let cell = match target {
        Some((tx, ty)) => s.board.get(tx, ty),
        None => Cell::Wall,
    };
    let can_move = cell.is_empty();

    if let Some((tx, ty)) = target {
        resolve_gate(s, tx, ty, &mut events);
        resolve_attack(s, cell, tx, ty, &mut events);
        resolve_pickup(s, cell, tx, ty, (dx, dy), &mut events);
    }

    if can_move {
        step_player(&mut s.player, dx, dy);
    }

    resolve_enemies(s, &mut events);
    resolve_terminal(s, &mut events);

    s.redraw();
    Ok(TurnReport { events, message: s.message.clone() })
}

fn step_player(p: &mut Player, dx: i32, dy: i32) {
    if let Some((nx, ny)) = offset(p.x, p.y, dx, dy) {
        p.x = nx;
        p.y = ny;
    }
}

// ══════════════════════════════════════════════════════════════
// Gate
// ══════════════════════════════════════════════════════════════

/// Room switch and teleport happen together or not at all.
fn resolve_gate(s: &mut Session, tx: usize, ty: usize, events: &mut Vec<GameEvent>) {
    let gate = match s.room().gates.iter().find(|g| g.x == tx && g.y == ty) {
        Some(g) => g.clone(),
        None => return,
    };
    let from = s.current_room;
    s.current_room = gate.to;
    s.player.x = gate.player_start.0;
    s.player.y = gate.player_start.1;
    log::info!("room {} -> {} at ({},{})", from, gate.to, s.player.x, s.player.y);
    events.push(GameEvent::RoomChanged { from, to: gate.to });
}

// ══════════════════════════════════════════════════════════════
// Attack
// ══════════════════════════════════════════════════════════════

fn resolve_attack(s: &mut Session, cell: Cell, tx: usize, ty: usize, events: &mut Vec<GameEvent>) {
    let kind = match cell.enemy() {
        Some(k) => k,
        None => return,
    };
    let attack = s.player.attack;
    let room = s.map.room_mut(s.current_room);
    let candidates = |at_target: bool| {
        room.enemies.iter().position(|e| {
            e.kind == kind && e.is_alive() && (!at_target || (e.x == tx && e.y == ty))
        })
    };
    let idx = match candidates(true).or_else(|| candidates(false)) {
        Some(i) => i,
        None => return,
    };

    let enemy = &mut room.enemies[idx];
    let dmg = rules::damage(attack, enemy.defense);
    enemy.health = enemy.health.saturating_sub(dmg);
    enemy.disturbed = true;
    log::debug!("hit {} for {} ({} left)", enemy.name, dmg, enemy.health);
    events.push(GameEvent::EnemyHit { name: enemy.name.clone(), damage: dmg });
    if !enemy.is_alive() {
        log::info!("{} slain", enemy.name);
        events.push(GameEvent::EnemySlain { name: enemy.name.clone(), boss: enemy.boss });
    }
}

// ══════════════════════════════════════════════════════════════
// Pickup
// ══════════════════════════════════════════════════════════════

/// Picking up walks the player onto the item cell even though the cell
/// was not empty.
fn resolve_pickup(
    s: &mut Session,
    cell: Cell,
    tx: usize,
    ty: usize,
    (dx, dy): (i32, i32),
    events: &mut Vec<GameEvent>,
) {
    let kind = match cell.item() {
        Some(k) => k,
        None => return,
    };
    let room = s.map.room_mut(s.current_room);
    let candidates = |at_target: bool| {
        room.items.iter().position(|i| {
            i.kind == kind && !i.picked_up && (!at_target || (i.x == tx && i.y == ty))
        })
    };
    let idx = match candidates(true).or_else(|| candidates(false)) {
        Some(i) => i,
        None => return,
    };

    let item = &mut room.items[idx];
    item.picked_up = true;
    let name = item.name.clone();
    item.bonus.apply_to(&mut s.player);
    s.backpack.add(&name);
    s.set_message(format!("You picked up: {name}!"));
    step_player(&mut s.player, dx, dy);
    log::debug!("picked up {name}");
    events.push(GameEvent::ItemPicked { name });
}

// ══════════════════════════════════════════════════════════════
// Enemy pass
// ══════════════════════════════════════════════════════════════

/// Every living, disturbed enemy in the (possibly new) room either
/// attacks in place or steps one cell toward the player. Steps ignore
/// walls and other enemies.
fn resolve_enemies(s: &mut Session, events: &mut Vec<GameEvent>) {
    let room = s.map.room_mut(s.current_room);
    let player = &mut s.player;
    let mut last_message: Option<String> = None;

    for i in 0..room.enemies.len() {
        let enemy = &mut room.enemies[i];
        if !enemy.is_alive() || !enemy.disturbed { continue; }

        if rules::is_adjacent(enemy.x, enemy.y, player.x, player.y) {
            let dmg = rules::damage(enemy.attack, player.defense);
            player.health = player.health.saturating_sub(dmg);
            if dmg > 0 {
                log::debug!("{} hits player for {}", enemy.name, dmg);
                events.push(GameEvent::PlayerHit { by: enemy.name.clone(), damage: dmg });
            }
            last_message = Some(rules::taunt(enemy, player));
            events.push(GameEvent::EnemyTaunt { name: enemy.name.clone() });
        } else {
            let (dx, dy) = rules::direction_to((enemy.x, enemy.y), (player.x, player.y));
            if let Some((nx, ny)) = offset(enemy.x, enemy.y, dx, dy) {
                enemy.x = nx;
                enemy.y = ny;
            }
        }
    }

    if let Some(msg) = last_message {
        s.set_message(msg);
    }
}

// ══════════════════════════════════════════════════════════════
// Terminal check
// ══════════════════════════════════════════════════════════════

fn resolve_terminal(s: &mut Session, events: &mut Vec<GameEvent>) {
    if !s.player.is_alive() {
        s.phase = Phase::GameOver;
        log::info!("{} died in room {} after {} turns", s.player.name, s.current_room, s.turn);
        events.push(GameEvent::PlayerDied);
    }
}
