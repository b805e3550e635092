use std::f32::consts::TAU;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Waveform {
    Sine,
    Triangle,
    Square,
    Saw,
}

pub fn waveform_sample(wave: Waveform, phase: f32) -> f32 {
    match wave {
        Waveform::Sine => phase.sin(),
        Waveform::Triangle => (2.0 / std::f32::consts::PI) * phase.sin().asin(),
        Waveform::Square => {
            if phase.sin() >= 0.0 {
                1.0
            } else {
                -1.0
            }
        }
        Waveform::Saw => 2.0 * (phase / TAU) - 1.0,
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Partial {
    pub freq_hz: f32,
    pub gain: f32,
    pub waveform: Waveform,
}

/// A procedural sound: a handful of partials under one percussive envelope.
///
/// The envelope is a linear attack, an exponential decay, and a short linear release at the end of
/// each cycle so looping patches don't click at the seam.
#[derive(Debug, Clone, PartialEq)]
pub struct Patch {
    partials: Vec<Partial>,
    length_secs: f32,
    attack_secs: f32,
    decay_per_sec: f32,
    release_secs: f32,
    looping: bool,
}

impl Patch {
    pub fn new(length: Duration) -> Self {
        Self {
            partials: Vec::new(),
            length_secs: length.as_secs_f32().max(0.001),
            attack_secs: 0.005,
            decay_per_sec: 0.0,
            release_secs: 0.01,
            looping: false,
        }
    }

    pub fn with_partial(mut self, freq_hz: f32, gain: f32, waveform: Waveform) -> Self {
        self.partials.push(Partial {
            freq_hz: freq_hz.max(0.0),
            gain: gain.max(0.0),
            waveform,
        });
        self
    }

    pub fn with_attack(mut self, attack: Duration) -> Self {
        self.attack_secs = attack.as_secs_f32().min(self.length_secs);
        self
    }

    pub fn with_decay(mut self, per_sec: f32) -> Self {
        self.decay_per_sec = per_sec.max(0.0);
        self
    }

    pub fn with_release(mut self, release: Duration) -> Self {
        self.release_secs = release.as_secs_f32().min(self.length_secs);
        self
    }

    pub fn looping(mut self, looping: bool) -> Self {
        self.looping = looping;
        self
    }

    pub fn is_looping(&self) -> bool {
        self.looping
    }

    pub fn length(&self) -> Duration {
        Duration::from_secs_f32(self.length_secs)
    }

    pub fn partials(&self) -> &[Partial] {
        &self.partials
    }

    /// Envelope gain at `t` seconds into a cycle.
    pub fn envelope_at(&self, t: f32) -> f32 {
        if t < 0.0 || t >= self.length_secs {
            return 0.0;
        }
        let attack = if self.attack_secs > 0.0 && t < self.attack_secs {
            t / self.attack_secs
        } else {
            1.0
        };
        let decay = (-self.decay_per_sec * t).exp();
        let release_start = self.length_secs - self.release_secs;
        let release = if self.release_secs > 0.0 && t > release_start {
            ((self.length_secs - t) / self.release_secs).max(0.0)
        } else {
            1.0
        };
        attack * decay * release
    }

    /// Mono sample at `t` seconds into a cycle, soft-limited to avoid clipping.
    pub fn sample_at(&self, t: f32) -> f32 {
        let env = self.envelope_at(t);
        if env == 0.0 {
            return 0.0;
        }
        let mut sample = 0.0f32;
        for p in &self.partials {
            let phase = (TAU * p.freq_hz * t) % TAU;
            sample += waveform_sample(p.waveform, phase) * p.gain;
        }
        (sample * env).tanh() * 0.9
    }
}

/// Interleaved sample stream for a `Patch`.
///
/// Finite patches end after one cycle; looping patches never end.
#[derive(Debug, Clone)]
pub struct PatchVoice {
    patch: Patch,
    sample_rate: u32,
    channels: u16,
    frame: u64,
    chan: u16,
    cycle_frames: u64,
    current: f32,
}

impl PatchVoice {
    pub fn new(patch: Patch, sample_rate: u32, channels: u16) -> Self {
        let sample_rate = sample_rate.max(1);
        let cycle_frames = ((patch.length_secs * sample_rate as f32).round() as u64).max(1);
        Self {
            patch,
            sample_rate,
            channels: channels.max(1),
            frame: 0,
            chan: 0,
            cycle_frames,
            current: 0.0,
        }
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn channels(&self) -> u16 {
        self.channels
    }

    pub fn patch(&self) -> &Patch {
        &self.patch
    }

    pub fn total_duration(&self) -> Option<Duration> {
        if self.patch.looping {
            None
        } else {
            Some(self.patch.length())
        }
    }
}

impl Iterator for PatchVoice {
    type Item = f32;

    fn next(&mut self) -> Option<Self::Item> {
        if !self.patch.looping && self.frame >= self.cycle_frames {
            return None;
        }

        if self.chan == 0 {
            let pos = self.frame % self.cycle_frames;
            let t = pos as f32 / self.sample_rate as f32;
            self.current = self.patch.sample_at(t);
        }

        let sample = self.current;
        self.chan += 1;
        if self.chan >= self.channels {
            self.chan = 0;
            self.frame = self.frame.wrapping_add(1);
        }
        Some(sample)
    }
}
