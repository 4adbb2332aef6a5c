use ndarray::Array1;
use rand::Rng;
use std::collections::VecDeque;

use crate::error::{AgentError, Result};

/// One interaction step: the agent saw `state`, took `action`, received
/// `reward` and ended up in `next_state`.
///
/// When `done` is true `next_state` is kept for completeness but is never
/// bootstrapped from.
#[derive(Clone, Debug, PartialEq)]
pub struct Experience {
    pub state: Array1<f32>,
    pub action: usize,
    pub reward: f32,
    pub next_state: Array1<f32>,
    pub done: bool,
}

/// Bounded first-in first-out store of experiences.
///
/// Once full, each [`ReplayBuffer::add`] evicts the oldest experience, so
/// `len()` never exceeds `capacity()`. Sampling draws uniformly *with*
/// replacement.
#[derive(Clone, Debug)]
pub struct ReplayBuffer {
    buffer: VecDeque<Experience>,
    capacity: usize,
}

impl ReplayBuffer {
    pub fn new(capacity: usize) -> Result<Self> {
        if capacity == 0 {
            return Err(AgentError::invalid_parameter("capacity", "replay capacity must be at least 1"));
        }
        Ok(ReplayBuffer {
            // Large memories fill up over time; don't reserve it all upfront.
            buffer: VecDeque::with_capacity(capacity.min(4096)),
            capacity,
        })
    }

    pub fn add(&mut self, experience: Experience) {
        if self.buffer.len() == self.capacity {
            self.buffer.pop_front();
        }
        self.buffer.push_back(experience);
    }

    /// Draw `min(batch_size, len())` experiences independently and uniformly.
    /// The same experience may appear more than once.
    pub fn sample<R: Rng + ?Sized>(&self, batch_size: usize, rng: &mut R) -> Vec<&Experience> {
        let len = self.buffer.len();
        if len == 0 {
            return Vec::new();
        }
        (0..batch_size.min(len))
            .map(|_| &self.buffer[rng.gen_range(0..len)])
            .collect()
    }

    /// Experiences from oldest to newest.
    pub fn iter(&self) -> impl Iterator<Item = &Experience> {
        self.buffer.iter()
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn clear(&mut self) {
        self.buffer.clear();
    }
}
