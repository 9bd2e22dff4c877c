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

use crate::renderer::{RenderBatch, RenderError, ViewInfo};

/// The low-level renderer driven by the scheduler.
///
/// Implementations issue the actual GPU work. Batch rendering is infallible
/// from the scheduler's point of view; the whole-pass operations report
/// failures so the owning command can park itself.
pub trait SceneRenderer: Send {
    /// Prepares the targets for a new render.
    fn begin_scene(&mut self, view: &ViewInfo, clear: bool) -> Result<(), RenderError>;

    /// Draws one batch into the beauty target.
    fn render_batch(&mut self, batch: &RenderBatch);

    /// Draws the highlight (selection) pass.
    fn render_highlighted(&mut self) -> Result<(), RenderError>;

    /// Draws hidden objects as ghosted geometry.
    fn render_ghosted(&mut self) -> Result<(), RenderError>;

    /// Fills the secondary buffers (section caps, picking IDs).
    fn render_additional_buffers(
        &mut self,
        sections: bool,
        id_buffer: bool,
    ) -> Result<(), RenderError>;

    /// Draws the overlay scenes on top of the beauty target.
    fn render_overlays(&mut self) -> Result<(), RenderError>;

    /// Composes every target into the displayed frame.
    ///
    /// `partial` is `true` when the beauty pass has not finished yet.
    fn compose_final_frame(&mut self, partial: bool) -> Result<(), RenderError>;

    /// Suppresses (or restores) expensive effects during camera motion.
    fn set_navigation_mode(&mut self, moving: bool);

    /// Resizes every target.
    fn resize(&mut self, width: u32, height: u32);
}
