//! Hook through which the stage requests sound cues.

use std::fmt::Debug;

use terraform_core::SoundCue;

/// Plays named sound cues on behalf of the stage.
pub trait SoundEffects: Debug {
    /// Plays `cue`. Implementations must not block.
    fn play(&mut self, cue: SoundCue);
}

/// Sound hook that only records the request in the log.
#[derive(Clone, Copy, Debug, Default)]
pub struct LoggingSoundEffects;

impl SoundEffects for LoggingSoundEffects {
    fn play(&mut self, cue: SoundCue) {
        log::info!("Playing {} sound effect", cue.name());
    }
}
