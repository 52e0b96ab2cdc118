use rodio::{OutputStream, OutputStreamHandle, Source};
use tracing::{info, warn};

use crate::{Result, Sound, Volume};

/// Owns the audio output stream and plays fire-and-forget sound effects.
pub struct AudioEngine {
    // Kept alive for the lifetime of the engine; dropping it stops playback.
    _stream: OutputStream,
    handle: OutputStreamHandle,
    master_volume: Volume,
}

impl AudioEngine {
    /// Open the default audio output.
    pub fn new() -> Result<Self> {
        let (_stream, handle) = OutputStream::try_default()?;
        info!("audio output opened");

        Ok(Self {
            _stream,
            handle,
            master_volume: Volume::FULL,
        })
    }

    pub fn set_master_volume(&mut self, volume: Volume) {
        self.master_volume = volume;
    }

    pub fn master_volume(&self) -> Volume {
        self.master_volume
    }

    /// Play a sound at the given volume and pitch.
    ///
    /// Problems are logged and swallowed; a failed effect must not disturb
    /// the frame loop.
    pub fn play(&self, sound: &Sound, volume: Volume, pitch: f32) {
        let source = match sound.decoder() {
            Ok(source) => source,
            Err(e) => {
                warn!("skipping undecodable sound: {e}");
                return;
            }
        };

        let source = source
            .amplify(self.master_volume.value() * volume.value())
            .speed(pitch);

        if let Err(e) = self.handle.play_raw(source.convert_samples()) {
            warn!("sound playback failed: {e}");
        }
    }
}
