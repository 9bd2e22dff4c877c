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

use crate::renderer::{ModelId, RenderBatch, ViewInfo};

/// Per-model supplier of render batches.
///
/// A source walks its model (typically in BVH order) and yields batches tagged
/// with a `render_importance`. The scheduler merges the streams of all
/// sources, always drawing the most important pending batch first.
pub trait BatchSource: Send {
    /// The model this source belongs to.
    fn model_id(&self) -> ModelId;

    /// Restarts the traversal for a new render from `view`.
    fn reset(&mut self, view: &ViewInfo);

    /// Returns the next batch of the current traversal, or `None` when exhausted.
    fn next_batch(&mut self) -> Option<RenderBatch>;

    /// Abandons the remaining opaque batches of this traversal.
    ///
    /// Subsequent calls to [`next_batch`](Self::next_batch) only yield
    /// transparent batches.
    fn skip_opaque_shapes(&mut self);

    /// Returns `true` once the current traversal has yielded everything.
    fn is_done(&self) -> bool;

    /// Hidden models take no part in traversal.
    fn is_visible(&self) -> bool {
        true
    }

    /// Fraction of the current traversal already handed out, `0.0..=1.0`.
    fn progress(&self) -> f32 {
        if self.is_done() {
            1.0
        } else {
            0.0
        }
    }
}
