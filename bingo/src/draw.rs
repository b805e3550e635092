use std::collections::VecDeque;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Serialize, Serializer};
use thiserror::Error;

use crate::board::{Ball, MAX_NUMBER};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum DrawError {
    #[error("every number has been drawn")]
    Exhausted,
    #[error("{0} has already been drawn")]
    AlreadyDrawn(Ball),
}

/// Uniform integer generator over `1..=max`.
///
/// Injected into the session so tests and seeded runs can control every number drawn.
pub trait NumberSource {
    fn next_in(&mut self, max: u8) -> u8;
}

impl<T: NumberSource + ?Sized> NumberSource for Box<T> {
    fn next_in(&mut self, max: u8) -> u8 {
        (**self).next_in(max)
    }
}

/// Seeded xorshift64* generator. Same seed, same draw order.
#[derive(Debug, Clone)]
pub struct XorShiftSource {
    state: u64,
}

impl XorShiftSource {
    pub fn new(seed: u64) -> Self {
        let seed = if seed == 0 {
            0x9E37_79B9_7F4A_7C15
        } else {
            seed
        };
        Self { state: seed }
    }

    fn next_u32(&mut self) -> u32 {
        let mut x = self.state;
        x ^= x >> 12;
        x ^= x << 25;
        x ^= x >> 27;
        self.state = x;
        (x.wrapping_mul(0x2545_F491_4F6C_DD1D) >> 32) as u32
    }
}

impl NumberSource for XorShiftSource {
    fn next_in(&mut self, max: u8) -> u8 {
        let max = max.max(1) as u32;
        // Reject the tail so every value in 0..max is equally likely.
        let zone = u32::MAX - (u32::MAX % max);
        loop {
            let v = self.next_u32();
            if v < zone {
                return (v % max) as u8 + 1;
            }
        }
    }
}

/// OS-seeded generator for normal play.
#[derive(Debug, Clone)]
pub struct EntropySource {
    rng: StdRng,
}

impl EntropySource {
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }
}

impl Default for EntropySource {
    fn default() -> Self {
        Self::new()
    }
}

impl NumberSource for EntropySource {
    fn next_in(&mut self, max: u8) -> u8 {
        self.rng.gen_range(1..=max.max(1))
    }
}

/// Replays a fixed sequence, cycling when it runs out. Values are clamped into `1..=max`.
#[derive(Debug, Clone)]
pub struct ScriptedSource {
    values: VecDeque<u8>,
}

impl ScriptedSource {
    /// Panics if `values` is empty.
    pub fn new(values: impl IntoIterator<Item = u8>) -> Self {
        let values: VecDeque<u8> = values.into_iter().collect();
        assert!(!values.is_empty(), "scripted source needs at least one value");
        Self { values }
    }
}

impl NumberSource for ScriptedSource {
    fn next_in(&mut self, max: u8) -> u8 {
        let v = self.values.pop_front().unwrap_or(1);
        self.values.push_back(v);
        v.clamp(1, max.max(1))
    }
}

/// Seeded source when `seed` is given, OS entropy otherwise.
pub fn number_source(seed: Option<u64>) -> Box<dyn NumberSource> {
    match seed {
        Some(seed) => Box::new(XorShiftSource::new(seed)),
        None => Box::new(EntropySource::new()),
    }
}

/// Balls drawn so far, in draw order, with O(1) membership.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DrawnSet {
    order: Vec<Ball>,
    // Bit n is set when ball n has been drawn; bit 0 is unused.
    mask: u128,
}

impl DrawnSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.order.len() >= MAX_NUMBER as usize
    }

    pub fn remaining(&self) -> usize {
        MAX_NUMBER as usize - self.order.len()
    }

    pub fn contains(&self, ball: Ball) -> bool {
        self.mask & (1u128 << ball.number()) != 0
    }

    pub fn insert(&mut self, ball: Ball) -> Result<(), DrawError> {
        if self.contains(ball) {
            return Err(DrawError::AlreadyDrawn(ball));
        }
        if self.is_full() {
            return Err(DrawError::Exhausted);
        }
        self.mask |= 1u128 << ball.number();
        self.order.push(ball);
        Ok(())
    }

    pub fn last(&self) -> Option<Ball> {
        self.order.last().copied()
    }

    pub fn as_slice(&self) -> &[Ball] {
        &self.order
    }

    pub fn iter(&self) -> impl Iterator<Item = Ball> + '_ {
        self.order.iter().copied()
    }

    pub fn clear(&mut self) {
        self.order.clear();
        self.mask = 0;
    }
}

impl Serialize for DrawnSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.order.serialize(serializer)
    }
}

/// Picks a ball not yet in `drawn` by rejection sampling over `1..=MAX_NUMBER`.
///
/// Terminates almost surely while at least one ball remains; an exhausted set is reported instead
/// of spinning forever.
pub fn draw_number<R: NumberSource + ?Sized>(
    drawn: &DrawnSet,
    rng: &mut R,
) -> Result<Ball, DrawError> {
    if drawn.is_full() {
        return Err(DrawError::Exhausted);
    }
    loop {
        let Some(ball) = Ball::new(rng.next_in(MAX_NUMBER)) else {
            continue;
        };
        if !drawn.contains(ball) {
            return Ok(ball);
        }
    }
}

/// A uniformly random ball with no rejection, for the rolling flicker.
pub fn flicker_number<R: NumberSource + ?Sized>(rng: &mut R) -> Option<Ball> {
    Ball::new(rng.next_in(MAX_NUMBER))
}
