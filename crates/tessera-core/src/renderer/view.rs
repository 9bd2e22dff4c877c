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

use crate::math::Vec3;

/// Camera state the scheduler needs for one render.
///
/// Owned by the navigation collaborator; the agent keeps a copy of the most
/// recent value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewInfo {
    /// World-space camera position.
    pub camera_position: Vec3,
    /// `true` while the camera is being moved interactively.
    pub is_moving: bool,
}

impl Default for ViewInfo {
    fn default() -> Self {
        Self {
            camera_position: Vec3::ZERO,
            is_moving: false,
        }
    }
}

impl ViewInfo {
    /// Creates a stationary view at `camera_position`.
    pub fn at(camera_position: Vec3) -> Self {
        Self {
            camera_position,
            is_moving: false,
        }
    }

    /// Returns a copy with the motion flag set to `is_moving`.
    pub fn moving(mut self, is_moving: bool) -> Self {
        self.is_moving = is_moving;
        self
    }
}
