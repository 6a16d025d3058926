/// Combat and chase rules.
///
/// Pure functions, no side effects. The turn engine decides when they
/// apply; these only encode the arithmetic.
///
/// ## Damage
/// ┌──────────────────────┬──────────────────┐
/// │ Condition             │ Damage           │
/// ├──────────────────────┼──────────────────┤
/// │ defense < attack      │ attack - defense │
/// │ defense >= attack     │ 0                │
/// └──────────────────────┴──────────────────┘
///
/// ## Chase step (enemy toward player)
/// ┌──────────────────────┬──────────────────┐
/// │ Condition             │ Step             │
/// ├──────────────────────┼──────────────────┤
/// │ |gap x| > |gap y|     │ one unit along X │
/// │ otherwise (ties too)  │ one unit along Y │
/// └──────────────────────┴──────────────────┘

use super::entity::{Enemy, Player};

/// Damage dealt by `attack` against `defense`. Never negative.
pub fn damage(attack: i32, defense: i32) -> i32 {
    if defense < attack { attack.saturating_sub(defense) } else { 0 }
}

/// Within one cell on both axes (diagonals count, same cell counts).
pub fn is_adjacent(ax: usize, ay: usize, bx: usize, by: usize) -> bool {
    ax.abs_diff(bx) <= 1 && ay.abs_diff(by) <= 1
}

/// Unit step (dx, dy) from `from` toward `to`. Equal gaps favor Y.
/// Returns (0, 0) when the positions coincide.
pub fn direction_to(from: (usize, usize), to: (usize, usize)) -> (i32, i32) {
    let (fx, fy) = from;
    let (tx, ty) = to;
    if fx.abs_diff(tx) > fy.abs_diff(ty) {
        (signum(fx, tx), 0)
    } else {
        (0, signum(fy, ty))
    }
}

fn signum(from: usize, to: usize) -> i32 {
    match to.cmp(&from) {
        std::cmp::Ordering::Greater => 1,
        std::cmp::Ordering::Less => -1,
        std::cmp::Ordering::Equal => 0,
    }
}

/// What an adjacent enemy shouts. Exactly one line per attack.
pub fn taunt(enemy: &Enemy, player: &Player) -> String {
    if enemy.defense >= player.attack {
        format!("{}: You can't hurt me!", enemy.name)
    } else {
        format!("{}: You will DIE!", enemy.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entity::EnemyKind;

    #[test]
    fn damage_never_negative() {
        assert_eq!(damage(1, 0), 1);
        assert_eq!(damage(10, 3), 7);
        assert_eq!(damage(3, 3), 0);
        assert_eq!(damage(1, 10), 0);
        for a in -5..15 {
            for d in -5..15 {
                assert!(damage(a, d) >= 0);
            }
        }
        assert_eq!(damage(i32::MAX, -5), i32::MAX);
    }

    #[test]
    fn adjacency_includes_diagonals() {
        assert!(is_adjacent(5, 5, 6, 6));
        assert!(is_adjacent(5, 5, 4, 5));
        assert!(is_adjacent(5, 5, 5, 5));
        assert!(!is_adjacent(5, 5, 7, 5));
        assert!(!is_adjacent(5, 5, 6, 7));
    }

    #[test]
    fn chase_prefers_larger_gap() {
        assert_eq!(direction_to((10, 10), (15, 12)), (1, 0));
        assert_eq!(direction_to((10, 10), (4, 12)), (-1, 0));
        assert_eq!(direction_to((10, 10), (11, 4)), (0, -1));
    }

    #[test]
    fn chase_tie_goes_to_y() {
        assert_eq!(direction_to((10, 10), (13, 13)), (0, 1));
        assert_eq!(direction_to((10, 10), (7, 7)), (0, -1));
    }

    #[test]
    fn chase_same_cell_is_still() {
        assert_eq!(direction_to((3, 3), (3, 3)), (0, 0));
    }

    #[test]
    fn taunt_depends_on_enemy_defense() {
        let p = Player::new("Legolas", "Elf");
        let rat = Enemy::new(EnemyKind::Rat, "Ratatouille", 1, 1);
        assert_eq!(taunt(&rat, &p), "Ratatouille: You will DIE!");
        let dragon = Enemy::new(EnemyKind::Dragon, "Draconoid", 1, 1);
        assert_eq!(taunt(&dragon, &p), "Draconoid: You can't hurt me!");
        let emu = Enemy::new(EnemyKind::Emu, "Emulgealo", 1, 1);
        // defense 1 == attack 1: equal defense blocks all damage
        assert_eq!(taunt(&emu, &p), "Emulgealo: You can't hurt me!");
    }
}
