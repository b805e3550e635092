//! The roll → stop → draw → reset state machine.
//!
//! A `BingoSession` owns everything one round of play touches: the drawn set, the number source,
//! both audio channels and the three timer handles. Timers are events on a [`Scheduler`], so the
//! whole machine runs on virtual time; the window feeds it frame deltas through [`advance`], tests
//! feed it whatever they like.
//!
//! [`advance`]: BingoSession::advance

use std::time::Duration;

use engine::scheduler::{Fired, Scheduler, TimerHandle, TimerQueue};
use serde::Serialize;

use crate::audio::AudioChannel;
use crate::board::{Ball, MAX_NUMBER};
use crate::draw::{DrawnSet, NumberSource, draw_number, flicker_number, number_source};
use crate::settings::RollTiming;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionTimer {
    Tick,
    AutoStop,
    SilenceDraw,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub enum RollPhase {
    #[default]
    Idle,
    Rolling,
    /// A draw just finished. Behaves like `Idle` for `start`.
    Stopped,
}

/// Something observable that happened while time advanced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    Flicker(Ball),
    Drawn(Ball),
    DrawSilenced,
}

/// Read-only copy of the state a view or a report needs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionSnapshot {
    pub drawn: DrawnSet,
    pub current: Option<Ball>,
    #[serde(rename = "final")]
    pub final_ball: Option<Ball>,
    pub phase: RollPhase,
    pub can_draw: bool,
    pub remaining: usize,
}

impl SessionSnapshot {
    pub fn is_rolling(&self) -> bool {
        self.phase == RollPhase::Rolling
    }
}

impl Default for SessionSnapshot {
    fn default() -> Self {
        Self {
            drawn: DrawnSet::new(),
            current: None,
            final_ball: None,
            phase: RollPhase::Idle,
            can_draw: true,
            remaining: MAX_NUMBER as usize,
        }
    }
}

/// The session the windowed app and headless runner both use.
pub type LiveSession =
    BingoSession<TimerQueue<SessionTimer>, Box<dyn NumberSource>, Box<dyn AudioChannel>>;

impl LiveSession {
    /// A session on a fresh timer queue, drawing from `seed` (or OS entropy).
    pub fn live(
        timing: RollTiming,
        seed: Option<u64>,
        roll_audio: Box<dyn AudioChannel>,
        draw_audio: Box<dyn AudioChannel>,
    ) -> Self {
        BingoSession::new(
            TimerQueue::new(),
            number_source(seed),
            roll_audio,
            draw_audio,
            timing,
        )
    }
}

pub struct BingoSession<S, R, A> {
    scheduler: S,
    rng: R,
    roll_audio: A,
    draw_audio: A,
    timing: RollTiming,

    drawn: DrawnSet,
    current: Option<Ball>,
    final_ball: Option<Ball>,
    phase: RollPhase,

    tick: Option<TimerHandle>,
    auto_stop: Option<TimerHandle>,
    silence: Option<TimerHandle>,
    disposed: bool,
}

impl<S, R, A> BingoSession<S, R, A>
where
    S: Scheduler<SessionTimer>,
    R: NumberSource,
    A: AudioChannel,
{
    pub fn new(scheduler: S, rng: R, roll_audio: A, draw_audio: A, timing: RollTiming) -> Self {
        Self {
            scheduler,
            rng,
            roll_audio,
            draw_audio,
            timing: timing.sanitized(),
            drawn: DrawnSet::new(),
            current: None,
            final_ball: None,
            phase: RollPhase::Idle,
            tick: None,
            auto_stop: None,
            silence: None,
            disposed: false,
        }
    }

    /// Whether `start` would begin a roll right now.
    pub fn can_draw(&self) -> bool {
        !self.disposed && self.phase != RollPhase::Rolling && !self.drawn.is_full()
    }

    /// Begins a roll. Returns `false` (and changes nothing) while rolling, once all numbers are
    /// drawn, or after `dispose`.
    pub fn start(&mut self) -> bool {
        if !self.can_draw() {
            log::debug!(
                "start ignored: phase={:?} drawn={}",
                self.phase,
                self.drawn.len()
            );
            return false;
        }

        self.final_ball = None;
        self.roll_audio.play();
        self.cancel_tick();
        self.tick = Some(
            self.scheduler
                .schedule_repeating(self.timing.tick_interval, SessionTimer::Tick),
        );
        self.cancel_auto_stop();
        self.auto_stop = Some(
            self.scheduler
                .schedule_once(self.timing.roll_duration, SessionTimer::AutoStop),
        );
        self.phase = RollPhase::Rolling;
        log::debug!("roll started at {:?}", self.scheduler.now());
        true
    }

    /// Ends the roll and draws a number. Manual stops and the auto-stop share this path.
    ///
    /// Returns the drawn ball, or `None` if no roll was active.
    pub fn stop(&mut self) -> Option<Ball> {
        if self.phase != RollPhase::Rolling {
            return None;
        }

        self.cancel_tick();
        self.cancel_auto_stop();
        self.roll_audio.stop();

        let ball = match draw_number(&self.drawn, &mut self.rng) {
            Ok(ball) => ball,
            Err(err) => {
                log::warn!("roll stopped without a draw: {err}");
                self.phase = RollPhase::Idle;
                return None;
            }
        };
        if let Err(err) = self.drawn.insert(ball) {
            log::warn!("draw not recorded: {err}");
        }
        self.current = Some(ball);
        self.final_ball = Some(ball);

        self.cancel_silence();
        self.draw_audio.rewind();
        self.draw_audio.play();
        self.silence = Some(
            self.scheduler
                .schedule_once(self.timing.draw_silence, SessionTimer::SilenceDraw),
        );

        self.phase = RollPhase::Stopped;
        log::info!(
            "drew {ball} ({} drawn, {} left)",
            self.drawn.len(),
            self.drawn.remaining()
        );
        Some(ball)
    }

    /// `start` when a roll can begin, `stop` while rolling.
    pub fn start_or_stop(&mut self) -> Option<Ball> {
        if self.phase == RollPhase::Rolling {
            self.stop()
        } else {
            self.start();
            None
        }
    }

    /// Back to a fresh session, from any state.
    pub fn reset(&mut self) {
        self.cancel_tick();
        self.cancel_auto_stop();
        self.cancel_silence();
        self.roll_audio.stop();
        self.draw_audio.stop();

        self.drawn.clear();
        self.current = None;
        self.final_ball = None;
        self.phase = RollPhase::Idle;
        log::debug!("session reset");
    }

    /// Same cleanup as `reset`; afterwards `start` is refused.
    pub fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        self.reset();
        self.disposed = true;
        log::debug!("session disposed");
    }

    /// Moves virtual time forward by `dt`, dispatching every timer that comes due.
    ///
    /// Timers are handled one at a time in due order, so a stop firing partway through cancels
    /// the ticks that would have followed it in the same step.
    pub fn advance(&mut self, dt: Duration) -> Vec<SessionEvent> {
        let deadline = self.scheduler.now().saturating_add(dt);
        let mut events = Vec::new();
        while let Some(fired) = self.scheduler.poll(deadline) {
            if let Some(event) = self.on_timer(fired) {
                events.push(event);
            }
        }
        self.scheduler.advance_to(deadline);
        events
    }

    /// Handles one fired timer. Timers the session no longer tracks are ignored.
    pub fn on_timer(&mut self, fired: Fired<SessionTimer>) -> Option<SessionEvent> {
        match fired.event {
            SessionTimer::Tick => {
                if self.tick != Some(fired.handle) || self.phase != RollPhase::Rolling {
                    return None;
                }
                let ball = flicker_number(&mut self.rng)?;
                self.current = Some(ball);
                Some(SessionEvent::Flicker(ball))
            }
            SessionTimer::AutoStop => {
                if self.auto_stop != Some(fired.handle) {
                    return None;
                }
                self.auto_stop = None;
                log::debug!("auto-stop at {:?}", fired.at);
                self.stop().map(SessionEvent::Drawn)
            }
            SessionTimer::SilenceDraw => {
                if self.silence != Some(fired.handle) {
                    return None;
                }
                self.silence = None;
                self.draw_audio.stop();
                Some(SessionEvent::DrawSilenced)
            }
        }
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            drawn: self.drawn.clone(),
            current: self.current,
            final_ball: self.final_ball,
            phase: self.phase,
            can_draw: self.can_draw(),
            remaining: self.drawn.remaining(),
        }
    }

    pub fn phase(&self) -> RollPhase {
        self.phase
    }

    pub fn is_rolling(&self) -> bool {
        self.phase == RollPhase::Rolling
    }

    pub fn drawn(&self) -> &DrawnSet {
        &self.drawn
    }

    pub fn current(&self) -> Option<Ball> {
        self.current
    }

    pub fn final_ball(&self) -> Option<Ball> {
        self.final_ball
    }

    pub fn timing(&self) -> RollTiming {
        self.timing
    }

    pub fn now(&self) -> Duration {
        self.scheduler.now()
    }

    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }

    pub fn roll_audio(&self) -> &A {
        &self.roll_audio
    }

    pub fn draw_audio(&self) -> &A {
        &self.draw_audio
    }

    /// Number of timer handles the session is still holding.
    pub fn active_timers(&self) -> usize {
        [self.tick, self.auto_stop, self.silence]
            .iter()
            .filter(|h| h.is_some())
            .count()
    }

    fn cancel_tick(&mut self) {
        if let Some(handle) = self.tick.take() {
            self.scheduler.cancel(handle);
        }
    }

    fn cancel_auto_stop(&mut self) {
        if let Some(handle) = self.auto_stop.take() {
            self.scheduler.cancel(handle);
        }
    }

    fn cancel_silence(&mut self) {
        if let Some(handle) = self.silence.take() {
            self.scheduler.cancel(handle);
        }
    }
}
