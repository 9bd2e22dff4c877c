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

use crate::renderer::ViewInfo;

/// An auxiliary pass that regenerates its output over several ticks.
///
/// Shadow maps, ground shadows and ground reflections all follow the same
/// shape: they go stale when the scene changes, are restarted with
/// [`begin_update`](Self::begin_update), and then consume slices of the frame
/// budget until [`is_done`](Self::is_done) reports completion.
pub trait ProgressivePass: Send {
    /// Name used in logs.
    fn name(&self) -> &'static str;

    /// Disabled passes are never scheduled.
    fn is_enabled(&self) -> bool;

    /// Returns `true` if the output no longer matches the scene.
    fn needs_update(&self) -> bool;

    /// Flags the output as out of date.
    fn mark_stale(&mut self);

    /// Starts regenerating the output for `view`.
    fn begin_update(&mut self, view: &ViewInfo);

    /// Performs work for at most `time_remaining_ms` and returns the time left.
    fn render_some(&mut self, time_remaining_ms: f32) -> f32;

    /// Returns `true` once the update started by `begin_update` has completed.
    fn is_done(&self) -> bool;
}
