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

/// The flavour of a scene render.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RenderMode {
    /// Unbudgeted; blocks until every pass completes.
    Full,
    /// Budgeted; partial results are presented every tick.
    Progressive,
    /// Budgeted; the result is presented only once complete.
    Silent,
}

impl RenderMode {
    /// Returns `true` if ticks of this mode are limited by the frame budget.
    pub fn is_budgeted(self) -> bool {
        !matches!(self, RenderMode::Full)
    }

    /// Returns `true` if intermediate frames are shown.
    pub fn presents_partial_frames(self) -> bool {
        matches!(self, RenderMode::Progressive)
    }
}

/// What the active command list is doing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActiveList {
    /// A scene traversal in the given mode.
    Scene(RenderMode),
    /// The two-command overlay refresh.
    OverlayOnly,
}

impl ActiveList {
    /// The render mode, if this is a scene traversal.
    pub fn mode(self) -> Option<RenderMode> {
        match self {
            ActiveList::Scene(mode) => Some(mode),
            ActiveList::OverlayOnly => None,
        }
    }
}
