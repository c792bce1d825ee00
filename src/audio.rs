//! Audio playback for completion chimes and the countdown tick.

use rodio::source::{SineWave, Source};
use rodio::{OutputStream, OutputStreamHandle, Sink};
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AudioError {
    #[error("Failed to initialize audio output: {0}")]
    Stream(#[from] rodio::StreamError),
    #[error("Failed to play audio: {0}")]
    Play(#[from] rodio::PlayError),
}

pub struct AudioPlayer {
    _stream: OutputStream,
    handle: OutputStreamHandle,
}

impl AudioPlayer {
    /// Opens the default audio output. Call once at startup; on machines
    /// without an output device this fails and the host runs silent.
    pub fn new() -> Result<Self, AudioError> {
        let (stream, handle) = OutputStream::try_default()?;
        Ok(Self {
            _stream: stream,
            handle,
        })
    }

    /// Plays the two-tone completion chime at the given volume (0-100).
    /// Fire-and-forget; failures are logged.
    pub fn play_completion(&self, volume: u32) {
        if let Err(e) = self.play_chime(amplitude(volume)) {
            eprintln!("Failed to play chime: {e}");
        }
    }

    /// Plays a short tick blip at the given volume (0-100), used during
    /// the final seconds of a session. Fire-and-forget.
    pub fn play_tick(&self, volume: u32) {
        if let Err(e) = self.play_blip(amplitude(volume)) {
            eprintln!("Failed to play tick: {e}");
        }
    }

    fn play_chime(&self, amplitude: f32) -> Result<(), AudioError> {
        let sink = Sink::try_new(&self.handle)?;

        // A5 then C6, separated by a short silence.
        let tone1 = SineWave::new(880.0)
            .take_duration(Duration::from_millis(150))
            .amplify(amplitude);
        let silence = rodio::source::Zero::<f32>::new(1, 44100)
            .take_duration(Duration::from_millis(50));
        let tone2 = SineWave::new(1046.5)
            .take_duration(Duration::from_millis(200))
            .amplify(amplitude);

        sink.append(tone1);
        sink.append(silence);
        sink.append(tone2);
        sink.detach();

        Ok(())
    }

    fn play_blip(&self, amplitude: f32) -> Result<(), AudioError> {
        let sink = Sink::try_new(&self.handle)?;
        let blip = SineWave::new(1000.0)
            .take_duration(Duration::from_millis(30))
            .amplify(amplitude * 0.5);
        sink.append(blip);
        sink.detach();
        Ok(())
    }
}

/// Maps a 0-100 volume setting onto a sine amplitude. Full volume stays
/// below 1.0 to keep the chime from clipping.
fn amplitude(volume: u32) -> f32 {
    volume.min(100) as f32 / 100.0 * 0.6
}
