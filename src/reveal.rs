// SpecHack
// copyright zipxing@hotmail.com 2022～2025

//! Reveal phase state machine.
//!
//! signal-lock ──(T1)──► materialize ──(T2)──► interactive
//!
//! The state is advanced once per rendered frame with the frame delta.
//! Phases only move forward, `reset` is the only way back.

use log::debug;
use std::fmt;

/// end of the signal-lock phase, seconds
pub const PHASE_SIGNAL_LOCK: f64 = 1.5;
/// end of the materialize phase, seconds
pub const PHASE_MATERIALIZE_END: f64 = 3.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RevealPhase {
    SignalLock,
    Materialize,
    Interactive,
}

impl RevealPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            RevealPhase::SignalLock => "signal-lock",
            RevealPhase::Materialize => "materialize",
            RevealPhase::Interactive => "interactive",
        }
    }
}

impl fmt::Display for RevealPhase {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RevealState {
    pub phase: RevealPhase,
    pub elapsed: f64,
    /// scan-line sweep progress in [0, 1]
    pub reveal_progress: f64,
    signal_lock: f64,
    materialize_end: f64,
    completed: bool,
    completion_pending: bool,
}

impl Default for RevealState {
    fn default() -> Self {
        Self::new()
    }
}

impl RevealState {
    pub fn new() -> Self {
        Self::with_timing(PHASE_SIGNAL_LOCK, PHASE_MATERIALIZE_END)
    }

    /// Custom phase boundaries, callers guarantee 0 < signal_lock < materialize_end.
    pub fn with_timing(signal_lock: f64, materialize_end: f64) -> Self {
        Self {
            phase: RevealPhase::SignalLock,
            elapsed: 0.0,
            reveal_progress: 0.0,
            signal_lock,
            materialize_end,
            completed: false,
            completion_pending: false,
        }
    }

    /// Advance by one frame. Negative deltas count as zero.
    pub fn advance(&mut self, dt: f64) -> RevealPhase {
        self.elapsed += dt.max(0.0);
        let (phase, progress) = if self.elapsed < self.signal_lock {
            (RevealPhase::SignalLock, 0.0)
        } else if self.elapsed < self.materialize_end {
            (
                RevealPhase::Materialize,
                (self.elapsed - self.signal_lock) / (self.materialize_end - self.signal_lock),
            )
        } else {
            if !self.completed {
                self.completed = true;
                self.completion_pending = true;
            }
            (RevealPhase::Interactive, 1.0)
        };
        if phase != self.phase {
            debug!("reveal {} -> {} at {:.3}s", self.phase, phase, self.elapsed);
        }
        self.phase = phase;
        self.reveal_progress = progress;
        phase
    }

    /// True exactly once, after the frame that first entered interactive.
    pub fn take_completion(&mut self) -> bool {
        std::mem::take(&mut self.completion_pending)
    }

    pub fn is_complete(&self) -> bool {
        self.completed
    }

    pub fn reset(&mut self) {
        *self = Self::with_timing(self.signal_lock, self.materialize_end);
    }
}

/// The reveal state plus an optional completion callback that fires at most
/// once until the clock is reset.
pub struct RevealClock {
    state: RevealState,
    on_complete: Option<Box<dyn FnMut()>>,
}

impl RevealClock {
    pub fn new(state: RevealState) -> Self {
        Self {
            state,
            on_complete: None,
        }
    }

    pub fn with_callback(state: RevealState, f: impl FnMut() + 'static) -> Self {
        Self {
            state,
            on_complete: Some(Box::new(f)),
        }
    }

    pub fn set_callback(&mut self, f: impl FnMut() + 'static) {
        self.on_complete = Some(Box::new(f));
    }

    pub fn tick(&mut self, dt: f64) -> RevealPhase {
        let phase = self.state.advance(dt);
        if self.state.take_completion() {
            if let Some(f) = self.on_complete.as_mut() {
                f();
            }
        }
        phase
    }

    pub fn state(&self) -> &RevealState {
        &self.state
    }

    pub fn phase(&self) -> RevealPhase {
        self.state.phase
    }

    pub fn reset(&mut self) {
        self.state.reset();
    }
}
