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

use crate::math::{Aabb, Vec3};
use std::fmt;

/// Identifies a loaded model within the scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ModelId(pub u32);

impl fmt::Display for ModelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "model#{}", self.0)
    }
}

/// Identifies a batch within its model. Only unique per model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BatchId(pub u32);

/// A unit of geometry work handed out by a [`BatchSource`](super::BatchSource).
///
/// The source owns the underlying geometry; a `RenderBatch` is a cheap handle
/// that the scheduler holds for at most one `render_some` step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderBatch {
    /// The batch, unique within `model`.
    pub id: BatchId,
    /// The model that produced this batch.
    pub model: ModelId,
    /// Scheduling priority. Higher values are drawn first.
    pub render_importance: f32,
    /// `true` for transparent content, which must be drawn back to front.
    pub sort_objects: bool,
    /// World-space bounds of everything in the batch.
    pub bounds: Aabb,
}

impl RenderBatch {
    /// Creates an opaque batch with invalid bounds.
    pub fn new(model: ModelId, id: BatchId, render_importance: f32) -> Self {
        Self {
            id,
            model,
            render_importance,
            sort_objects: false,
            bounds: Aabb::INVALID,
        }
    }

    /// Marks the batch as transparent.
    pub fn transparent(mut self) -> Self {
        self.sort_objects = true;
        self
    }

    /// Sets the world-space bounds.
    pub fn with_bounds(mut self, bounds: Aabb) -> Self {
        self.bounds = bounds;
        self
    }

    /// Returns `true` if the batch holds transparent content.
    #[inline]
    pub fn is_transparent(&self) -> bool {
        self.sort_objects
    }

    /// Squared distance from `eye` to the batch bounds.
    #[inline]
    pub fn distance_squared_from(&self, eye: Vec3) -> f32 {
        self.bounds.distance_squared_to(eye)
    }
}
