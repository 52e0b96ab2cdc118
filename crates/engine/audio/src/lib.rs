//! Sound playback for the game
//!
//! A thin engine over `rodio`: sounds are decoded-on-play buffers held in
//! memory, the engine owns the output stream and a master volume. Playback
//! problems are logged, never fatal — the game keeps running silently.

mod engine;
mod sound;

pub use engine::AudioEngine;
pub use sound::Sound;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AudioError {
    #[error("no audio output available")]
    Stream(#[from] rodio::StreamError),

    #[error("could not play sound")]
    Play(#[from] rodio::PlayError),

    #[error("could not decode sound data")]
    Decode(#[from] rodio::decoder::DecoderError),

    #[error("could not read sound file {path}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, AudioError>;

/// A playback volume in `0.0..=1.0`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Volume(f32);

impl Volume {
    pub const FULL: Volume = Volume(1.0);

    pub fn new(value: f32) -> Self {
        Volume(value.clamp(0.0, 1.0))
    }

    pub fn value(&self) -> f32 {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn volume_clamps_to_unit_range() {
        assert_eq!(Volume::new(1.5).value(), 1.0);
        assert_eq!(Volume::new(-0.5).value(), 0.0);
        assert_eq!(Volume::new(0.25).value(), 0.25);
        assert_eq!(Volume::FULL.value(), 1.0);
    }
}
