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

//! Viewer notifications and the channel that carries them.
//!
//! The scheduler never calls back into the application. Instead it publishes
//! [`ViewerEvent`]s on an [`EventBus`], and the owner of the bus drains them at
//! its own pace (typically once per frame, after `tick`).

mod bus;

pub use self::bus::EventBus;

/// A notification emitted by the render agent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ViewerEvent {
    /// A composed frame was handed to the display.
    RenderPresented,
    /// The current scene traversal advanced.
    ProgressUpdate {
        /// Fraction of the scene rendered so far, in percent (`0.0..=100.0`).
        percent: f32,
    },
    /// The "final frame is on screen" state flipped.
    FinalFrameRenderedChanged {
        /// `true` once every pass of the current render has completed.
        finished: bool,
    },
}
