use crossterm::{execute, style::Print};
use std::io;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Cue {
    HeatingStarted,
    CrystallizationStarted,
    Success,
}

impl Cue {
    /// Bell pulses per cue, so the three are distinguishable by ear.
    fn pulses(self) -> usize {
        match self {
            Cue::HeatingStarted => 1,
            Cue::CrystallizationStarted => 2,
            Cue::Success => 3,
        }
    }
}

/// Fire-and-forget feedback. Never affects the simulation.
pub(crate) trait CueSink {
    fn cue(&mut self, cue: Cue);
}

/// Rings the terminal bell.
pub(crate) struct Bell {
    pub(crate) enabled: bool,
}

impl CueSink for Bell {
    fn cue(&mut self, cue: Cue) {
        if !self.enabled {
            return;
        }
        log::debug!("cue {:?}", cue);
        for _ in 0..cue.pulses() {
            // a lost beep is not worth surfacing
            let _ = execute!(io::stdout(), Print('\u{7}'));
        }
    }
}

#[cfg(test)]
#[derive(Default)]
pub(crate) struct Recorder {
    pub(crate) cues: Vec<Cue>,
}

#[cfg(test)]
impl CueSink for Recorder {
    fn cue(&mut self, cue: Cue) {
        self.cues.push(cue);
    }
}
