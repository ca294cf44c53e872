//! Synthetic pointer motion after a period without real input.
//!
//! ```text
//!   Interactive --(now - last >= threshold)--> Idle
//!   Idle --(real pointer event)--> Interactive
//! ```
//!
//! While idle the pointer follows two sinusoids of unequal frequency, eased
//! in from the last real position. Consumers receive the result through the
//! same path as a real pointer and cannot tell the two apart.

use crate::config::IdleConfig;
use glam::Vec2;
use std::f32::consts::TAU;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IdleState {
    Interactive,
    Idle,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ResolvedPointer {
    /// Centred ndc, y up.
    pub ndc: Vec2,
    pub synthetic: bool,
}

#[derive(Clone, Debug)]
pub struct IdleMotion {
    config: IdleConfig,
    state: IdleState,
    last_interaction_ms: f64,
    idle_since_ms: f64,
    /// Real pointer position when idling began; the orbit eases out of it.
    anchor: Vec2,
}

impl IdleMotion {
    pub fn new(config: &IdleConfig, now_ms: f64) -> Self {
        Self {
            config: config.clone(),
            state: IdleState::Interactive,
            last_interaction_ms: now_ms,
            idle_since_ms: now_ms,
            anchor: Vec2::ZERO,
        }
    }

    #[inline]
    pub fn state(&self) -> IdleState {
        self.state
    }

    #[inline]
    pub fn is_synthetic(&self) -> bool {
        self.state == IdleState::Idle
    }

    #[inline]
    pub fn last_interaction_ms(&self) -> f64 {
        self.last_interaction_ms
    }

    /// A real pointer event arrived.
    pub fn on_pointer(&mut self, timestamp_ms: f64) {
        self.last_interaction_ms = self.last_interaction_ms.max(timestamp_ms);
        if self.state == IdleState::Idle {
            log::debug!("[idle] pointer activity, leaving idle motion");
            self.state = IdleState::Interactive;
        }
    }

    /// Evaluate the idle timer; called once per frame.
    pub fn update(&mut self, now_ms: f64) -> IdleState {
        if self.state == IdleState::Interactive
            && now_ms - self.last_interaction_ms >= self.config.threshold_ms
        {
            log::debug!(
                "[idle] no input for {:.0} ms, starting idle motion",
                now_ms - self.last_interaction_ms
            );
            self.state = IdleState::Idle;
            self.idle_since_ms = now_ms;
        }
        self.state
    }

    /// Update the state and pick the pointer this frame should use.
    pub fn resolve(&mut self, now_ms: f64, real_ndc: Vec2) -> ResolvedPointer {
        match self.update(now_ms) {
            IdleState::Interactive => {
                self.anchor = real_ndc;
                ResolvedPointer {
                    ndc: real_ndc,
                    synthetic: false,
                }
            }
            IdleState::Idle => {
                let elapsed = (now_ms - self.idle_since_ms).max(0.0);
                let orbit = self.synthetic_position(elapsed);
                let t = if self.config.blend_in_ms > 0.0 {
                    (elapsed / self.config.blend_in_ms).min(1.0) as f32
                } else {
                    1.0
                };
                let s = t * t * (3.0 - 2.0 * t);
                ResolvedPointer {
                    ndc: self.anchor.lerp(orbit, s),
                    synthetic: true,
                }
            }
        }
    }

    /// Orbit position `elapsed_ms` after idling began, bounded by the
    /// configured amplitude.
    pub fn synthetic_position(&self, elapsed_ms: f64) -> Vec2 {
        let t = (elapsed_ms / 1000.0) as f32;
        let f = self.config.freq_hz;
        Vec2::new((TAU * f.x * t).sin(), (TAU * f.y * t).sin()) * self.config.amplitude
    }
}
