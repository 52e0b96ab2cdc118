use std::path::Path;

use prism_audio::Sound;
use tracing::warn;

/// Footstep pitch cycles through these so repeated steps do not sound
/// machine-like.
const STEP_PITCHES: [f32; 4] = [1.0, 0.96, 1.05, 0.92];

/// The game's sound effects, loaded up front.
///
/// Missing or undecodable files degrade to silence with a warning; audio is
/// never a reason to refuse to start.
pub struct SoundBank {
    steps: Vec<Sound>,
    land: Option<Sound>,
    respawn: Option<Sound>,
    next_step: usize,
}

impl SoundBank {
    pub fn load(dir: &Path) -> Self {
        let steps = (1..=4)
            .filter_map(|i| load_optional(&dir.join(format!("step{i}.ogg"))))
            .collect();

        Self {
            steps,
            land: load_optional(&dir.join("land.ogg")),
            respawn: load_optional(&dir.join("respawn.ogg")),
            next_step: 0,
        }
    }

    /// Next footstep variant with its pitch, cycling through the set.
    pub fn step(&mut self) -> Option<(&Sound, f32)> {
        if self.steps.is_empty() {
            return None;
        }

        let index = self.next_step;
        self.next_step = (self.next_step + 1) % self.steps.len();

        Some((
            &self.steps[index],
            STEP_PITCHES[index % STEP_PITCHES.len()],
        ))
    }

    pub fn land(&self) -> Option<&Sound> {
        self.land.as_ref()
    }

    pub fn respawn(&self) -> Option<&Sound> {
        self.respawn.as_ref()
    }
}

fn load_optional(path: &Path) -> Option<Sound> {
    match Sound::from_file(path) {
        Ok(sound) => Some(sound),
        Err(e) => {
            warn!("sound unavailable: {e}");
            None
        }
    }
}
