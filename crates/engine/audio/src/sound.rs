use std::io::Cursor;
use std::path::Path;
use std::sync::Arc;

use rodio::Decoder;

use crate::{AudioError, Result};

/// A sound effect held in memory in its encoded form.
///
/// Decoding happens per play, which keeps the buffer shareable and cheap to
/// clone; the data is validated once at load time.
#[derive(Clone, Debug)]
pub struct Sound {
    data: Arc<[u8]>,
}

impl Sound {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let data = std::fs::read(path).map_err(|source| AudioError::Io {
            path: path.display().to_string(),
            source,
        })?;

        let sound = Self { data: data.into() };

        // Fail at load time, not mid-game.
        sound.decoder()?;

        Ok(sound)
    }

    pub(crate) fn decoder(&self) -> Result<Decoder<Cursor<Arc<[u8]>>>> {
        Ok(Decoder::new(Cursor::new(Arc::clone(&self.data)))?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_is_an_io_error() {
        let err = Sound::from_file("res/sounds/nope.ogg").unwrap_err();
        assert!(matches!(err, AudioError::Io { .. }));
    }

    #[test]
    fn garbage_data_fails_to_decode() {
        let sound = Sound {
            data: vec![0u8; 64].into(),
        };
        assert!(matches!(
            sound.decoder().err().expect("decoder should reject garbage data"),
            AudioError::Decode(_)
        ));
    }
}
