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

//! # Tessera Core
//!
//! Foundational crate containing the types, traits, and interface contracts
//! shared by the progressive rendering scheduler: render batches and the
//! collaborators that produce and consume them, the command vocabulary used by
//! the command list executor, the clock abstraction, and viewer events.

#![warn(missing_docs)]

pub mod command;
pub mod event;
pub mod math;
pub mod renderer;
pub mod time;

pub use time::{Clock, ManualClock, SystemClock};
