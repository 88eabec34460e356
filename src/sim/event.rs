/// Events emitted during a simulation step.
/// The presentation layer consumes these for sound effects and messages.

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum GameEvent {
    CoinCollected,
    EnemyStomped,
    PlayerJumped,
    PlayerKilled,
    LevelCleared,
}
