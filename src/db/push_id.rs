// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Chronological push-id generation, compatible with Firebase push keys.
//!
//! An id is 8 characters of millisecond timestamp followed by 12 random
//! characters, all drawn from a 64-character alphabet whose ASCII order
//! matches its numeric order. Ids therefore sort in creation order. Ids
//! generated in the same millisecond increment the random suffix instead
//! of drawing a new one.

use crate::error::AppError;
use ring::rand::{SecureRandom, SystemRandom};
use std::sync::Mutex;

const PUSH_CHARS: &[u8; 64] = b"-0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ_abcdefghijklmnopqrstuvwxyz";
const RANDOM_LEN: usize = 12;

#[derive(Default)]
struct PushState {
    last_time: u64,
    last_random: [u8; RANDOM_LEN],
}

/// Push-id generator. One per store so that ids stay monotonic.
pub struct PushIdGenerator {
    state: Mutex<PushState>,
    rng: SystemRandom,
}

impl Default for PushIdGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl PushIdGenerator {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(PushState::default()),
            rng: SystemRandom::new(),
        }
    }

    /// Generate an id for the current time.
    pub fn next_id(&self) -> Result<String, AppError> {
        let now = chrono::Utc::now().timestamp_millis().max(0) as u64;
        self.next_id_at(now)
    }

    /// Generate an id for the given millisecond timestamp.
    pub fn next_id_at(&self, now_ms: u64) -> Result<String, AppError> {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());

        // Never step backwards, even if the clock does.
        let now = now_ms.max(state.last_time);
        if now == state.last_time && state.last_time != 0 {
            increment(&mut state.last_random);
        } else {
            let mut bytes = [0u8; RANDOM_LEN];
            self.rng
                .fill(&mut bytes)
                .map_err(|_| AppError::Internal(anyhow::anyhow!("system RNG unavailable")))?;
            for (slot, byte) in state.last_random.iter_mut().zip(bytes) {
                *slot = byte % 64;
            }
        }
        state.last_time = now;

        let mut id = String::with_capacity(8 + RANDOM_LEN);
        let mut time = now;
        let mut time_chars = [0u8; 8];
        for slot in time_chars.iter_mut().rev() {
            *slot = PUSH_CHARS[(time % 64) as usize];
            time /= 64;
        }
        id.extend(time_chars.iter().map(|&c| c as char));
        id.extend(
            state
                .last_random
                .iter()
                .map(|&r| PUSH_CHARS[r as usize] as char),
        );
        Ok(id)
    }
}

/// Add one to the random suffix, carrying from the right.
fn increment(random: &mut [u8; RANDOM_LEN]) {
    for digit in random.iter_mut().rev() {
        if *digit == 63 {
            *digit = 0;
        } else {
            *digit += 1;
            return;
        }
    }
}
