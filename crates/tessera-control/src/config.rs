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

//! Configuration for the frame budget controller.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Class of device the viewer runs on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DeviceClass {
    /// Desktop-class GPU; thresholds are used as configured.
    #[default]
    Desktop,
    /// Mobile or otherwise constrained device; every millisecond threshold is
    /// doubled (and the target display rate halved) once at construction.
    Constrained,
}

/// Tuning knobs of the adaptive frame budget.
///
/// The constants are empirical. What matters is the shape of the control:
/// slow additive growth while frames are fast, fast multiplicative correction
/// when they are slow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BudgetConfig {
    /// Lower bound of the per-tick budget, in milliseconds.
    pub min_budget_ms: f32,
    /// Upper bound of the per-tick budget, in milliseconds.
    pub max_budget_ms: f32,
    /// Budget used before any frame has been measured.
    pub initial_budget_ms: f32,
    /// Desired wall-clock time between two ticks.
    pub target_frame_ms: f32,
    /// Additive growth applied when frames are faster than the target.
    pub ramp_up_ms: f32,
    /// Weight of the previous running average when a new sample arrives.
    pub average_weight: f32,
    /// Floor of the multiplicative shrink factor.
    ///
    /// The factor is `shrink_base + (1 - shrink_base) * target / average`.
    pub shrink_base: f32,
    /// Device class; `Constrained` doubles every millisecond threshold.
    pub device: DeviceClass,
}

impl Default for BudgetConfig {
    fn default() -> Self {
        Self {
            min_budget_ms: 2.0,
            max_budget_ms: 1000.0 / 30.0,
            initial_budget_ms: 1000.0 / 60.0,
            target_frame_ms: 1000.0 / 30.0,
            ramp_up_ms: 1.0,
            average_weight: 0.75,
            shrink_base: 0.75,
            device: DeviceClass::Desktop,
        }
    }
}

/// A rejected [`BudgetConfig`].
#[derive(Debug, Error, PartialEq)]
pub enum BudgetConfigError {
    /// A threshold is NaN, infinite, or not strictly positive.
    #[error("'{field}' must be finite and positive, got {value}")]
    NotPositive {
        /// Offending field.
        field: &'static str,
        /// Offending value.
        value: f32,
    },
    /// `min_budget_ms` exceeds `max_budget_ms`.
    #[error("min budget {min}ms exceeds max budget {max}ms")]
    InvertedBounds {
        /// Configured minimum.
        min: f32,
        /// Configured maximum.
        max: f32,
    },
    /// A weight lies outside `[0, 1)`.
    #[error("'{field}' must lie in [0, 1), got {value}")]
    WeightOutOfRange {
        /// Offending field.
        field: &'static str,
        /// Offending value.
        value: f32,
    },
}

impl BudgetConfig {
    /// Checks that every threshold is usable.
    pub fn validate(&self) -> Result<(), BudgetConfigError> {
        for (field, value) in [
            ("min_budget_ms", self.min_budget_ms),
            ("max_budget_ms", self.max_budget_ms),
            ("initial_budget_ms", self.initial_budget_ms),
            ("target_frame_ms", self.target_frame_ms),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(BudgetConfigError::NotPositive { field, value });
            }
        }
        if !self.ramp_up_ms.is_finite() || self.ramp_up_ms < 0.0 {
            return Err(BudgetConfigError::NotPositive {
                field: "ramp_up_ms",
                value: self.ramp_up_ms,
            });
        }
        if self.min_budget_ms > self.max_budget_ms {
            return Err(BudgetConfigError::InvertedBounds {
                min: self.min_budget_ms,
                max: self.max_budget_ms,
            });
        }
        for (field, value) in [
            ("average_weight", self.average_weight),
            ("shrink_base", self.shrink_base),
        ] {
            if !(0.0..1.0).contains(&value) {
                return Err(BudgetConfigError::WeightOutOfRange { field, value });
            }
        }
        Ok(())
    }

    /// Returns the configuration with device scaling applied.
    ///
    /// Constrained devices get doubled millisecond thresholds; the ramp and
    /// weights are unitless or per-step and stay as they are.
    pub fn scaled_for_device(&self) -> Self {
        match self.device {
            DeviceClass::Desktop => self.clone(),
            DeviceClass::Constrained => Self {
                min_budget_ms: self.min_budget_ms * 2.0,
                max_budget_ms: self.max_budget_ms * 2.0,
                initial_budget_ms: self.initial_budget_ms * 2.0,
                target_frame_ms: self.target_frame_ms * 2.0,
                ..self.clone()
            },
        }
    }
}
