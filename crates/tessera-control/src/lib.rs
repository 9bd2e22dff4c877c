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

//! # Tessera Control
//!
//! The cold side of the scheduler: it watches how long frames actually take
//! and adjusts the per-tick time allowance handed to the command list
//! executor.
//!
//! - [`FrameBudgetController`]: additive ramp-up, multiplicative ramp-down,
//!   clamped to the configured bounds.
//! - [`FrameTimeHistory`]: rolling window of measured frame times, exposed as
//!   [`FrameStats`] for diagnostics.

#![warn(missing_docs)]

pub mod budget;
pub mod config;
pub mod history;

pub use budget::FrameBudgetController;
pub use config::{BudgetConfig, BudgetConfigError, DeviceClass};
pub use history::{FrameStats, FrameTimeHistory};
