// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Adaptive per-tick time allowance.
//!
//! Every progressive tick starts with a "begin scene" timestamp. The delta
//! between two consecutive timestamps is the real frame time the user sees;
//! the controller smooths it and nudges the budget so that frame time hovers
//! around the configured target.

use crate::config::{BudgetConfig, BudgetConfigError};
use crate::history::{FrameStats, FrameTimeHistory};

/// Averages closer than this to the target leave the budget untouched.
const STABLE_BAND_MS: f32 = 1e-3;

/// Maintains the frame budget within `[min_budget_ms, max_budget_ms]`.
#[derive(Debug, Clone)]
pub struct FrameBudgetController {
    config: BudgetConfig,
    budget_ms: f32,
    average_frame_ms: f32,
    last_begin_ms: Option<f64>,
    history: FrameTimeHistory,
}

impl FrameBudgetController {
    /// Creates a controller from `config`, applying device scaling once.
    pub fn new(config: BudgetConfig) -> Result<Self, BudgetConfigError> {
        config.validate()?;
        let config = config.scaled_for_device();
        let budget_ms = config
            .initial_budget_ms
            .clamp(config.min_budget_ms, config.max_budget_ms);

        log::info!(
            "FrameBudget: {:?} device, budget {:.2}ms in [{:.2}, {:.2}]ms, target frame {:.2}ms",
            config.device,
            budget_ms,
            config.min_budget_ms,
            config.max_budget_ms,
            config.target_frame_ms
        );

        Ok(Self {
            average_frame_ms: config.target_frame_ms,
            budget_ms,
            last_begin_ms: None,
            history: FrameTimeHistory::new(),
            config,
        })
    }

    /// The current per-tick budget, in milliseconds.
    #[inline]
    pub fn budget_ms(&self) -> f32 {
        self.budget_ms
    }

    /// The smoothed frame time, in milliseconds.
    #[inline]
    pub fn average_frame_ms(&self) -> f32 {
        self.average_frame_ms
    }

    /// The effective (device-scaled) configuration.
    pub fn config(&self) -> &BudgetConfig {
        &self.config
    }

    /// Records the start of a tick.
    ///
    /// When `calibrate` is `true` and a previous timestamp exists, the delta
    /// feeds the running average. Callers pass `false` for non-progressive
    /// renders and for the first tick of a render, whose delta spans idle
    /// time rather than a frame.
    pub fn begin_scene(&mut self, now_ms: f64, calibrate: bool) {
        if calibrate {
            if let Some(last) = self.last_begin_ms {
                self.record_frame_time((now_ms - last) as f32);
            }
        }
        self.last_begin_ms = Some(now_ms);
    }

    /// Feeds one measured frame time into the controller.
    pub fn record_frame_time(&mut self, frame_ms: f32) {
        if !frame_ms.is_finite() || frame_ms < 0.0 {
            log::warn!("FrameBudget: ignoring invalid frame time {frame_ms}ms.");
            return;
        }
        self.history.push(frame_ms);

        let weight = self.config.average_weight;
        self.average_frame_ms = weight * self.average_frame_ms + (1.0 - weight) * frame_ms;

        let target = self.config.target_frame_ms;
        let (min, max) = (self.config.min_budget_ms, self.config.max_budget_ms);
        let previous = self.budget_ms;

        if self.average_frame_ms < target - STABLE_BAND_MS {
            if self.budget_ms < max {
                self.budget_ms += self.config.ramp_up_ms;
            }
        } else if self.average_frame_ms > target + STABLE_BAND_MS && self.budget_ms > min {
            let base = self.config.shrink_base;
            self.budget_ms *= base + (1.0 - base) * (target / self.average_frame_ms);
        }
        self.budget_ms = self.budget_ms.clamp(min, max);

        if self.budget_ms != previous {
            log::trace!(
                "FrameBudget: avg {:.2}ms → budget {:.2}ms (was {:.2}ms)",
                self.average_frame_ms,
                self.budget_ms,
                previous
            );
        }
    }

    /// Forgets the last begin-scene timestamp so the next delta is not measured.
    pub fn reset_timing(&mut self) {
        self.last_begin_ms = None;
    }

    /// Timing summary of the recent window.
    pub fn stats(&self) -> FrameStats {
        self.history.stats()
    }
}
