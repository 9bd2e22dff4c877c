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

//! Acts as the **[A]gent** for progressive rendering.
//!
//! The agent watches the invalidation flags raised by the application, picks a
//! [`RenderMode`] when something needs drawing, turns the mode into a command
//! list from the fixed [`RenderCommand`] catalogue and then feeds that list to
//! the executor once per tick with the budget granted by the frame budget
//! controller.
//!
//! Life of a render:
//!
//! ```text
//! Idle ──trigger──▶ BuildingList ──▶ Executing ──finished──▶ Idle
//!                                       │  ▲
//!                                       └──┘ paused, resume next tick
//! ```

mod agent;
mod catalogue;
mod invalidation;
mod mode;
mod stages;

pub use agent::*;
pub use catalogue::*;
pub use invalidation::*;
pub use mode::*;
pub use stages::RenderStages;
