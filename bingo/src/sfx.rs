//! Real audio output: the built-in roll and draw sounds, and rodio-backed channels.

use std::fs;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use engine::audio::{Patch, PatchVoice, Waveform};
use rodio::{Decoder, OutputStream, OutputStreamHandle, Sink, Source};
use thiserror::Error;

use crate::audio::{AudioChannel, SilentChannel};
use crate::settings::BingoSettings;

/// Base gain of the rolling loop (0.0..=1.0), before user settings.
///
/// Sits under the draw chime so the called number stands out.
pub const ROLL_SFX_VOLUME: f32 = 0.35;
/// Base gain of the draw chime (0.0..=1.0), before user settings.
pub const DRAW_SFX_VOLUME: f32 = 0.6;

const SAMPLE_RATE: u32 = 48_000;
const CHANNELS: u16 = 2;

#[derive(Debug, Error)]
pub enum SfxError {
    #[error("no audio output: {0}")]
    Stream(#[from] rodio::StreamError),
    #[error("cannot open a sink: {0}")]
    Play(#[from] rodio::PlayError),
    #[error("cannot decode audio: {0}")]
    Decode(#[from] rodio::decoder::DecoderError),
    #[error("cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// The ticking wheel: a short click that loops for as long as the roll lasts.
pub fn roll_patch() -> Patch {
    Patch::new(Duration::from_millis(90))
        .with_partial(1_800.0, 0.45, Waveform::Square)
        .with_partial(900.0, 0.3, Waveform::Triangle)
        .with_attack(Duration::from_millis(1))
        .with_decay(45.0)
        .with_release(Duration::from_millis(5))
        .looping(true)
}

/// A bell chime with a long tail, cut short by the silence timer.
pub fn draw_patch() -> Patch {
    Patch::new(Duration::from_millis(2_800))
        .with_partial(880.0, 0.5, Waveform::Sine)
        .with_partial(1_760.0, 0.25, Waveform::Sine)
        .with_partial(2_430.0, 0.12, Waveform::Sine)
        .with_partial(440.0, 0.2, Waveform::Triangle)
        .with_attack(Duration::from_millis(4))
        .with_decay(1.6)
        .with_release(Duration::from_millis(200))
}

/// A procedural patch as a rodio source.
#[derive(Debug, Clone)]
pub struct SynthSource {
    voice: PatchVoice,
}

impl SynthSource {
    pub fn new(patch: Patch) -> Self {
        Self {
            voice: PatchVoice::new(patch, SAMPLE_RATE, CHANNELS),
        }
    }
}

impl Iterator for SynthSource {
    type Item = f32;

    fn next(&mut self) -> Option<Self::Item> {
        self.voice.next()
    }
}

impl Source for SynthSource {
    fn current_frame_len(&self) -> Option<usize> {
        None
    }

    fn channels(&self) -> u16 {
        self.voice.channels()
    }

    fn sample_rate(&self) -> u32 {
        self.voice.sample_rate()
    }

    fn total_duration(&self) -> Option<Duration> {
        self.voice.total_duration()
    }
}

/// What a channel plays. Each `play` after a rewind builds a fresh source from this.
#[derive(Debug, Clone)]
pub enum SoundSource {
    Synth(Patch),
    /// An encoded file (wav, mp3, ogg, flac) held in memory.
    Encoded { bytes: Arc<[u8]>, looping: bool },
}

impl SoundSource {
    /// Reads and test-decodes an audio file so a bad file is reported at start-up, not mid-round.
    pub fn load(path: &Path, looping: bool) -> Result<Self, SfxError> {
        let bytes: Arc<[u8]> = fs::read(path)
            .map_err(|source| SfxError::Io {
                path: path.to_path_buf(),
                source,
            })?
            .into();
        Decoder::new(Cursor::new(Arc::clone(&bytes)))?;
        Ok(Self::Encoded { bytes, looping })
    }

    pub fn is_looping(&self) -> bool {
        match self {
            SoundSource::Synth(patch) => patch.is_looping(),
            SoundSource::Encoded { looping, .. } => *looping,
        }
    }

    fn append_to(&self, sink: &Sink) -> Result<(), SfxError> {
        match self {
            SoundSource::Synth(patch) => sink.append(SynthSource::new(patch.clone())),
            SoundSource::Encoded { bytes, looping } => {
                let decoded =
                    Decoder::new(Cursor::new(Arc::clone(bytes)))?.convert_samples::<f32>();
                if *looping {
                    sink.append(decoded.repeat_infinite());
                } else {
                    sink.append(decoded);
                }
            }
        }
        Ok(())
    }
}

/// Holds the output stream open. Channels stop making sound once this is dropped.
pub struct Sfx {
    _stream: OutputStream,
    handle: OutputStreamHandle,
}

impl Sfx {
    pub fn open() -> Result<Self, SfxError> {
        let (stream, handle) = OutputStream::try_default()?;
        Ok(Self {
            _stream: stream,
            handle,
        })
    }

    pub fn channel(&self, source: SoundSource, volume: f32) -> RodioChannel {
        RodioChannel {
            handle: self.handle.clone(),
            source,
            volume: volume.clamp(0.0, 1.0),
            sink: None,
        }
    }
}

/// One sound on a rodio sink.
///
/// Rodio sinks can't seek back, so rewinding drops the sink; the next `play` queues the sound
/// again from the start.
pub struct RodioChannel {
    handle: OutputStreamHandle,
    source: SoundSource,
    volume: f32,
    sink: Option<Sink>,
}

impl RodioChannel {
    fn open_sink(&self) -> Result<Sink, SfxError> {
        let sink = Sink::try_new(&self.handle)?;
        sink.set_volume(self.volume);
        self.source.append_to(&sink)?;
        Ok(sink)
    }
}

impl AudioChannel for RodioChannel {
    fn play(&mut self) {
        if let Some(sink) = &self.sink {
            if !sink.empty() {
                sink.play();
                return;
            }
        }
        match self.open_sink() {
            Ok(sink) => self.sink = Some(sink),
            Err(err) => {
                log::warn!("sound not played: {err}");
                self.sink = None;
            }
        }
    }

    fn pause(&mut self) {
        if let Some(sink) = &self.sink {
            sink.pause();
        }
    }

    fn rewind(&mut self) {
        let was_playing = self.is_playing();
        if let Some(sink) = self.sink.take() {
            sink.stop();
        }
        if was_playing {
            self.play();
        }
    }

    fn is_playing(&self) -> bool {
        self.sink
            .as_ref()
            .is_some_and(|sink| !sink.is_paused() && !sink.empty())
    }
}

/// The two channels a session needs, plus the stream keeping them audible.
pub struct AudioRig {
    pub roll: Box<dyn AudioChannel>,
    pub draw: Box<dyn AudioChannel>,
    /// `None` when running silent.
    pub output: Option<Sfx>,
}

impl AudioRig {
    pub fn silent() -> Self {
        Self {
            roll: Box::new(SilentChannel::new()),
            draw: Box::new(SilentChannel::new()),
            output: None,
        }
    }

    /// Opens the default output device and builds both channels from `settings`.
    ///
    /// Falls back to silent channels, with a warning, when muted or when there is no device.
    pub fn from_settings(settings: &BingoSettings) -> Self {
        if settings.audio.mute_all {
            log::debug!("audio muted");
            return Self::silent();
        }
        let sfx = match Sfx::open() {
            Ok(sfx) => sfx,
            Err(err) => {
                log::warn!("audio disabled: {err}");
                return Self::silent();
            }
        };

        let roll_source = load_or_builtin(settings.sounds.roll.as_deref(), true, roll_patch);
        let draw_source = load_or_builtin(settings.sounds.draw.as_deref(), false, draw_patch);
        let roll = sfx.channel(
            roll_source,
            settings.audio.effective_roll_gain() * ROLL_SFX_VOLUME,
        );
        let draw = sfx.channel(
            draw_source,
            settings.audio.effective_draw_gain() * DRAW_SFX_VOLUME,
        );
        Self {
            roll: Box::new(roll),
            draw: Box::new(draw),
            output: Some(sfx),
        }
    }
}

fn load_or_builtin(path: Option<&Path>, looping: bool, builtin: fn() -> Patch) -> SoundSource {
    let Some(path) = path else {
        return SoundSource::Synth(builtin());
    };
    match SoundSource::load(path, looping) {
        Ok(source) => {
            log::debug!("loaded sound {}", path.display());
            source
        }
        Err(err) => {
            log::warn!("{err}; using the built-in sound");
            SoundSource::Synth(builtin())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roll_sound_loops_and_draw_sound_ends() {
        assert!(roll_patch().is_looping());
        assert!(!draw_patch().is_looping());
        assert_eq!(SynthSource::new(roll_patch()).total_duration(), None);
        let chime = SynthSource::new(draw_patch());
        let length = chime.total_duration().unwrap();
        assert!(length > Duration::from_millis(2_500));
        assert!(length < Duration::from_millis(3_000));
    }

    #[test]
    fn synth_source_reports_stream_format() {
        let source = SynthSource::new(draw_patch());
        assert_eq!(source.channels(), CHANNELS);
        assert_eq!(source.sample_rate(), SAMPLE_RATE);
        assert_eq!(source.current_frame_len(), None);
    }

    #[test]
    fn draw_chime_is_audible_early_and_quiet_late() {
        let patch = draw_patch();
        let early = (0..480)
            .map(|i| patch.sample_at(0.05 + i as f32 / SAMPLE_RATE as f32).abs())
            .fold(0.0f32, f32::max);
        let late = (0..480)
            .map(|i| patch.sample_at(2.79 + i as f32 / SAMPLE_RATE as f32).abs())
            .fold(0.0f32, f32::max);
        assert!(early > 0.1, "early peak {early}");
        assert!(late < early / 4.0, "late peak {late}");
    }

    #[test]
    fn loading_a_missing_file_is_an_io_error() {
        let err = SoundSource::load(Path::new("/definitely/not/here.wav"), false).unwrap_err();
        assert!(matches!(err, SfxError::Io { .. }));
    }

    #[test]
    fn loading_garbage_is_a_decode_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("noise.wav");
        fs::write(&path, b"this is not audio").unwrap();
        let err = SoundSource::load(&path, true).unwrap_err();
        assert!(matches!(err, SfxError::Decode(_)));
    }

    #[test]
    fn bad_sound_files_fall_back_to_builtin_patches() {
        let source = load_or_builtin(Some(Path::new("/missing.ogg")), true, roll_patch);
        assert!(matches!(source, SoundSource::Synth(_)));
        assert!(source.is_looping());
    }

    #[test]
    fn muted_settings_give_silent_rig() {
        let mut settings = BingoSettings::default();
        settings.audio.mute_all = true;
        let rig = AudioRig::from_settings(&settings);
        assert!(rig.output.is_none());
        assert!(!rig.roll.is_playing());
    }
}
