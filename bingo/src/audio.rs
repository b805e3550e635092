//! Playback channels the session drives.
//!
//! A channel is one sound with a play head: `play` resumes from the head, `pause` holds it, and
//! `rewind` moves it back to the start without changing whether it is playing. Calls that don't
//! change anything (pausing a paused channel, say) are no-ops.

use std::cell::RefCell;
use std::rc::Rc;

pub trait AudioChannel {
    fn play(&mut self);
    fn pause(&mut self);
    fn rewind(&mut self);
    fn is_playing(&self) -> bool;

    /// Pause and seek to the start, the way the session silences a channel.
    fn stop(&mut self) {
        self.pause();
        self.rewind();
    }
}

impl<T: AudioChannel + ?Sized> AudioChannel for Box<T> {
    fn play(&mut self) {
        (**self).play()
    }

    fn pause(&mut self) {
        (**self).pause()
    }

    fn rewind(&mut self) {
        (**self).rewind()
    }

    fn is_playing(&self) -> bool {
        (**self).is_playing()
    }
}

/// A channel with no output device. Tracks play state only.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SilentChannel {
    playing: bool,
}

impl SilentChannel {
    pub fn new() -> Self {
        Self::default()
    }
}

impl AudioChannel for SilentChannel {
    fn play(&mut self) {
        self.playing = true;
    }

    fn pause(&mut self) {
        self.playing = false;
    }

    fn rewind(&mut self) {}

    fn is_playing(&self) -> bool {
        self.playing
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelOp {
    Play,
    Pause,
    Rewind,
}

/// Shared view of the operations a [`RecordingChannel`] received.
///
/// Cloning shares the same log, so a test can keep one half while the session owns the channel.
#[derive(Debug, Clone, Default)]
pub struct ChannelLog(Rc<RefCell<Vec<ChannelOp>>>);

impl ChannelLog {
    pub fn ops(&self) -> Vec<ChannelOp> {
        self.0.borrow().clone()
    }

    pub fn count(&self, op: ChannelOp) -> usize {
        self.0.borrow().iter().filter(|&&o| o == op).count()
    }

    pub fn last(&self) -> Option<ChannelOp> {
        self.0.borrow().last().copied()
    }

    pub fn clear(&self) {
        self.0.borrow_mut().clear();
    }

    fn push(&self, op: ChannelOp) {
        self.0.borrow_mut().push(op);
    }
}

#[derive(Debug, Clone, Default)]
pub struct RecordingChannel {
    playing: bool,
    log: ChannelLog,
}

impl RecordingChannel {
    pub fn new() -> (Self, ChannelLog) {
        let log = ChannelLog::default();
        (
            Self {
                playing: false,
                log: log.clone(),
            },
            log,
        )
    }
}

impl AudioChannel for RecordingChannel {
    fn play(&mut self) {
        self.log.push(ChannelOp::Play);
        self.playing = true;
    }

    fn pause(&mut self) {
        self.log.push(ChannelOp::Pause);
        self.playing = false;
    }

    fn rewind(&mut self) {
        self.log.push(ChannelOp::Rewind);
    }

    fn is_playing(&self) -> bool {
        self.playing
    }
}
