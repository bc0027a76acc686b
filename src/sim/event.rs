/// Events emitted during a simulation step.
/// The front end consumes these for status messages.

use std::path::PathBuf;

#[derive(Clone, Debug, PartialEq)]
pub enum GameEvent {
    Paused,
    Resumed,
    CollisionBoxesToggled(bool),
    /// The controlled entity touched the exit; `next` loads on the following tick.
    ExitReached { next: PathBuf },
    LevelLoaded { name: String },
}
