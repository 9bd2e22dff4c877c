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

//! Viewer configuration, loadable from RON.

use anyhow::{ensure, Context};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tessera_control::BudgetConfig;
use tessera_lanes::SceneSchedulerConfig;

/// Everything the render agent is built from.
///
/// Missing fields take their default value, so a file only needs to list what
/// it overrides:
///
/// ```ron
/// (
///     progressive_rendering: true,
///     budget: (device: Constrained),
/// )
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    /// Budgeted renders that present partial results. When `false`, every
    /// scene render completes in a single tick.
    pub progressive_rendering: bool,
    /// Reorder work in frames rendered while the camera moves, giving up on
    /// opaque content to make room for transparency.
    pub non_resumable_while_moving: bool,
    /// Draw hidden objects as ghosts.
    pub ghosting: bool,
    /// Fill the picking buffer.
    pub id_buffer: bool,
    /// Schedule a silent re-render when ground passes complete after the
    /// beauty pass, since transparent content drawn before them may be wrong.
    pub rerender_after_late_ground: bool,
    /// Frame budget tuning.
    pub budget: BudgetConfig,
    /// Scene scheduler tuning.
    pub scene: SceneSchedulerConfig,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            progressive_rendering: true,
            non_resumable_while_moving: true,
            ghosting: true,
            id_buffer: false,
            rerender_after_late_ground: true,
            budget: BudgetConfig::default(),
            scene: SceneSchedulerConfig::default(),
        }
    }
}

impl ViewerConfig {
    /// Parses and validates a RON document.
    pub fn from_ron_str(source: &str) -> anyhow::Result<Self> {
        let config: ViewerConfig =
            ron::from_str(source).context("Failed to parse viewer configuration")?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a RON file.
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let config = Self::from_ron_str(&source)
            .with_context(|| format!("Invalid configuration in {}", path.display()))?;
        log::info!("Loaded viewer configuration from {}", path.display());
        Ok(config)
    }

    /// Serializes to pretty-printed RON.
    pub fn to_ron_string(&self) -> anyhow::Result<String> {
        let pretty = ron::ser::PrettyConfig::default().indentor("  ".to_string());
        ron::ser::to_string_pretty(self, pretty).context("Failed to serialize viewer configuration")
    }

    /// Checks every numeric setting.
    pub fn validate(&self) -> anyhow::Result<()> {
        self.budget.validate()?;
        let fraction = self.scene.transparency_fraction;
        ensure!(
            (0.0..=1.0).contains(&fraction),
            "transparency_fraction must lie in [0, 1], got {fraction}"
        );
        let weight = self.scene.batch_time_weight;
        ensure!(
            (0.0..1.0).contains(&weight),
            "batch_time_weight must lie in [0, 1), got {weight}"
        );
        Ok(())
    }
}
