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

//! Flags raised between ticks by everything that can make the frame stale.

/// Pending render requests.
///
/// Every mutator only sets flags. Repeated calls before the agent's next tick
/// coalesce into one request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct InvalidationState {
    needs_clear: bool,
    needs_render: bool,
    overlay_dirty: bool,
    silent_render: bool,
    deferred_silent_render: bool,
}

impl InvalidationState {
    /// Creates a state with nothing pending.
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks the frame stale.
    ///
    /// `needs_clear` implies `needs_render`.
    pub fn invalidate(&mut self, needs_clear: bool, needs_render: bool, overlay_dirty: bool) {
        self.needs_clear |= needs_clear;
        self.needs_render |= needs_render || needs_clear;
        self.overlay_dirty |= overlay_dirty;
    }

    /// Requests a silent render on the next tick.
    pub fn request_silent_render(&mut self) {
        self.silent_render = true;
    }

    /// Requests a silent render once the current render has finished.
    pub fn request_deferred_silent_render(&mut self) {
        self.deferred_silent_render = true;
    }

    /// Returns `true` if the scene must be traversed again.
    pub fn scene_pending(&self) -> bool {
        self.needs_render
    }

    /// Returns `true` if only the overlays are stale.
    pub fn overlay_pending(&self) -> bool {
        self.overlay_dirty
    }

    /// Returns `true` if an immediate silent render is pending.
    pub fn silent_pending(&self) -> bool {
        self.silent_render
    }

    /// Returns `true` if a deferred silent render is pending.
    pub fn deferred_silent_pending(&self) -> bool {
        self.deferred_silent_render
    }

    /// Returns `true` if anything at all is pending.
    pub fn any_pending(&self) -> bool {
        self.needs_render || self.overlay_dirty || self.silent_render || self.deferred_silent_render
    }

    /// Consumes a pending scene request, returning whether it asked for a clear.
    ///
    /// A scene render covers the overlays and supersedes an immediate silent
    /// render, so both of those flags are dropped with it.
    pub fn take_scene(&mut self) -> Option<bool> {
        if !self.needs_render {
            return None;
        }
        let clear = self.needs_clear;
        self.needs_clear = false;
        self.needs_render = false;
        self.overlay_dirty = false;
        self.silent_render = false;
        Some(clear)
    }

    /// Consumes a pending overlay refresh.
    pub fn take_overlay(&mut self) -> bool {
        std::mem::take(&mut self.overlay_dirty)
    }

    /// Consumes a pending immediate silent render.
    pub fn take_silent(&mut self) -> bool {
        std::mem::take(&mut self.silent_render)
    }

    /// Consumes a pending deferred silent render.
    pub fn take_deferred_silent(&mut self) -> bool {
        std::mem::take(&mut self.deferred_silent_render)
    }
}
