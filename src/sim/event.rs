/// Events emitted during one turn.
/// The presentation layer consumes these for sound and logging.

use crate::domain::entity::RoomKey;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GameEvent {
    RoomChanged { from: RoomKey, to: RoomKey },
    EnemyHit { name: String, damage: i32 },
    EnemySlain { name: String, boss: bool },
    ItemPicked { name: String },
    PlayerHit { by: String, damage: i32 },
    EnemyTaunt { name: String },
    PlayerDied,
}
