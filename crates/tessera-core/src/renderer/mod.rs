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

//! Contracts between the scheduler and the rendering collaborators.
//!
//! The scheduler decides *what* to draw and *when*; actually drawing is the
//! business of external components. This module defines the data exchanged
//! with them ([`RenderBatch`], [`ViewInfo`]) and the traits they implement:
//!
//! - [`BatchSource`]: one per loaded model, yields batches by importance.
//! - [`SceneRenderer`]: the low-level renderer that draws and composes.
//! - [`ProgressivePass`]: auxiliary passes (shadow map, ground shadow,
//!   ground reflection) that complete independently over several ticks.

mod batch;
mod error;
pub mod traits;
mod view;

pub use self::batch::{BatchId, ModelId, RenderBatch};
pub use self::error::RenderError;
pub use self::traits::{BatchSource, ProgressivePass, SceneRenderer};
pub use self::view::ViewInfo;
