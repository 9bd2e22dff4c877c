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

//! # Tessera Lanes
//!
//! Hot-path execution pipelines of the progressive renderer.
//!
//! - [`command_lane`]: the resumable, tick-driven command list interpreter.
//! - [`scene_lane`]: the time-sliced scheduler that merges the batch streams
//!   of every loaded model by importance.

#![warn(missing_docs)]

pub mod command_lane;
pub mod scene_lane;

pub use command_lane::{CommandList, CommandListError, TickReport};
pub use scene_lane::{RenderScene, SceneSchedulerConfig, SceneStats};
