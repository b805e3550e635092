//! Whole rounds with no window: start, let the auto-stop fire, repeat.
//!
//! Time is virtual, so a full 75-round game finishes instantly. The session is advanced in fixed
//! frame steps the same way the window advances it.

use std::fmt;
use std::time::Duration;

use engine::app::DEFAULT_FRAME_INTERVAL;
use engine::scheduler::Scheduler;
use serde::Serialize;

use crate::audio::AudioChannel;
use crate::board::{Ball, MAX_NUMBER};
use crate::draw::NumberSource;
use crate::session::{BingoSession, SessionEvent, SessionSnapshot, SessionTimer};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RoundReport {
    pub round: usize,
    pub ball: Ball,
    /// Virtual time of the draw, in milliseconds since the session began.
    pub drawn_at_ms: u64,
    /// Ticks shown during the roll.
    pub flickers: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HeadlessReport {
    pub rounds: Vec<RoundReport>,
    pub frames: u64,
    /// Every number has been drawn; no further round can start.
    pub exhausted: bool,
    pub session: SessionSnapshot,
}

impl fmt::Display for HeadlessReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for r in &self.rounds {
            writeln!(
                f,
                "round {:>2}: {:<5} at {:>7.2}s ({} ticks)",
                r.round,
                r.ball.to_string(),
                r.drawn_at_ms as f64 / 1000.0,
                r.flickers
            )?;
        }
        write!(
            f,
            "{} drawn, {} left{}",
            self.session.drawn.len(),
            self.session.remaining,
            if self.exhausted { " (all numbers drawn)" } else { "" }
        )
    }
}

pub struct HeadlessRunner<S, R, A> {
    session: BingoSession<S, R, A>,
    frame_interval: Duration,
    frames: u64,
}

impl<S, R, A> HeadlessRunner<S, R, A>
where
    S: Scheduler<SessionTimer>,
    R: NumberSource,
    A: AudioChannel,
{
    pub fn new(session: BingoSession<S, R, A>) -> Self {
        Self::with_frame_interval(session, DEFAULT_FRAME_INTERVAL)
    }

    pub fn with_frame_interval(session: BingoSession<S, R, A>, frame_interval: Duration) -> Self {
        Self {
            session,
            frame_interval: frame_interval.max(Duration::from_millis(1)),
            frames: 0,
        }
    }

    pub fn session(&self) -> &BingoSession<S, R, A> {
        &self.session
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// One frame of virtual time.
    pub fn step(&mut self) -> Vec<SessionEvent> {
        self.frames += 1;
        self.session.advance(self.frame_interval)
    }

    /// Starts a roll and steps until it draws. `None` if no roll could start.
    pub fn play_round(&mut self, round: usize) -> Option<RoundReport> {
        if !self.session.start() {
            return None;
        }
        let budget = self.session.timing().roll_duration.as_nanos()
            / self.frame_interval.as_nanos().max(1)
            + 2;
        let mut flickers = 0;
        for _ in 0..budget {
            for event in self.step() {
                match event {
                    SessionEvent::Flicker(_) => flickers += 1,
                    SessionEvent::Drawn(ball) => {
                        return Some(RoundReport {
                            round,
                            ball,
                            drawn_at_ms: u64::try_from(self.session.now().as_millis())
                                .unwrap_or(u64::MAX),
                            flickers,
                        });
                    }
                    SessionEvent::DrawSilenced => {}
                }
            }
        }
        log::warn!("round {round} never stopped; stopping it by hand");
        self.session.stop().map(|ball| RoundReport {
            round,
            ball,
            drawn_at_ms: u64::try_from(self.session.now().as_millis()).unwrap_or(u64::MAX),
            flickers,
        })
    }

    /// Plays up to `rounds` rounds, then lets the last draw sound run out.
    pub fn run(&mut self, rounds: usize) -> HeadlessReport {
        let mut reports = Vec::with_capacity(rounds.min(MAX_NUMBER as usize));
        for round in 1..=rounds {
            match self.play_round(round) {
                Some(report) => reports.push(report),
                None => break,
            }
        }

        let silence = self.session.timing().draw_silence;
        let mut waited = Duration::ZERO;
        while self.session.draw_audio().is_playing() && waited <= silence {
            self.step();
            waited += self.frame_interval;
        }

        HeadlessReport {
            rounds: reports,
            frames: self.frames,
            exhausted: self.session.drawn().is_full(),
            session: self.session.snapshot(),
        }
    }

    pub fn into_session(self) -> BingoSession<S, R, A> {
        self.session
    }
}
