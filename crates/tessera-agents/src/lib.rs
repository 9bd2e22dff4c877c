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

//! # Tessera Agents
//!
//! The agents own the lanes and decide, tick after tick, what they should do.
//!
//! - [`render_agent`]: chooses between full, progressive and silent renders,
//!   builds the matching command list and drives it across ticks.
//! - [`config`]: the viewer configuration the agent is built from.

#![warn(missing_docs)]

pub mod config;
pub mod render_agent;

pub use config::ViewerConfig;
pub use render_agent::{RenderAgent, RenderCommand, RenderMode};
