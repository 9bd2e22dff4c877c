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

use serde::{Deserialize, Serialize};

/// Tuning of the scene batch scheduler.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneSchedulerConfig {
    /// Share of the time handed to `render_some` that is reserved for
    /// transparent batches in non-resumable frames.
    pub transparency_fraction: f32,
    /// Weight of the previous value when smoothing per-model batch durations.
    pub batch_time_weight: f32,
}

impl Default for SceneSchedulerConfig {
    fn default() -> Self {
        Self {
            transparency_fraction: 0.2,
            batch_time_weight: 0.75,
        }
    }
}
