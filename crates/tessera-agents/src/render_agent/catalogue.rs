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

//! The fixed set of commands a render list is built from.

use super::RenderMode;
use tessera_core::command::CommandLevel;
use tessera_lanes::{CommandList, CommandListError};

/// Every operation a render command list can contain.
///
/// The discriminant indexes the dispatch table in
/// [`RenderStages`](super::RenderStages).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum RenderCommand {
    /// Suppresses effects that are too costly while the camera moves.
    ApplyNavigationFeatures,
    /// Binds the frame targets and restarts the scene traversal.
    ///
    /// Param: `clear`.
    BeginScene,
    /// Continues the shadow map update.
    UpdateShadowMap,
    /// Generates the ground shadow ahead of the beauty pass.
    GenerateGroundShadow,
    /// Generates the ground reflection ahead of the beauty pass.
    GenerateGroundReflection,
    /// Draws the highlighted objects.
    RenderHighlighted,
    /// Time-sliced traversal of every loaded model.
    BeautyPass,
    /// Draws hidden objects as ghosts.
    RenderGhosted,
    /// Fills the section and picking buffers.
    ///
    /// Params: `sections`, `id_buffer`.
    RenderAdditionalBuffers,
    /// Completes ground shadow and reflection after the beauty pass.
    FinishGroundPasses,
    /// Draws the overlay scenes.
    RenderOverlays,
    /// Composes the displayed frame.
    ///
    /// Param: `partial`, set when intermediate frames may be shown.
    Present,
    /// Marks the final frame as rendered.
    SignalFinished,
}

impl RenderCommand {
    /// Number of commands in the catalogue.
    pub const COUNT: usize = 13;

    /// Every command, in discriminant order.
    pub const ALL: [RenderCommand; Self::COUNT] = [
        RenderCommand::ApplyNavigationFeatures,
        RenderCommand::BeginScene,
        RenderCommand::UpdateShadowMap,
        RenderCommand::GenerateGroundShadow,
        RenderCommand::GenerateGroundReflection,
        RenderCommand::RenderHighlighted,
        RenderCommand::BeautyPass,
        RenderCommand::RenderGhosted,
        RenderCommand::RenderAdditionalBuffers,
        RenderCommand::FinishGroundPasses,
        RenderCommand::RenderOverlays,
        RenderCommand::Present,
        RenderCommand::SignalFinished,
    ];

    /// Position in [`RenderCommand::ALL`].
    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    /// Stable name used in logs.
    pub fn name(self) -> &'static str {
        match self {
            RenderCommand::ApplyNavigationFeatures => "apply_navigation_features",
            RenderCommand::BeginScene => "begin_scene",
            RenderCommand::UpdateShadowMap => "update_shadow_map",
            RenderCommand::GenerateGroundShadow => "generate_ground_shadow",
            RenderCommand::GenerateGroundReflection => "generate_ground_reflection",
            RenderCommand::RenderHighlighted => "render_highlighted",
            RenderCommand::BeautyPass => "beauty_pass",
            RenderCommand::RenderGhosted => "render_ghosted",
            RenderCommand::RenderAdditionalBuffers => "render_additional_buffers",
            RenderCommand::FinishGroundPasses => "finish_ground_passes",
            RenderCommand::RenderOverlays => "render_overlays",
            RenderCommand::Present => "present",
            RenderCommand::SignalFinished => "signal_finished",
        }
    }
}

/// Which optional commands a scene list needs, sampled when it is built.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScenePlan {
    /// Mode of the render.
    pub mode: RenderMode,
    /// Clear the frame targets before drawing.
    pub clear: bool,
    /// The shadow map is enabled and stale.
    pub shadow_map: bool,
    /// The ground shadow is enabled and stale.
    pub ground_shadow: bool,
    /// The ground reflection is enabled and stale.
    pub ground_reflection: bool,
    /// Something is highlighted.
    pub highlighted: bool,
    /// Hidden objects must be drawn as ghosts.
    pub ghosted: bool,
    /// Section planes are active.
    pub sections: bool,
    /// The picking buffer is enabled.
    pub id_buffer: bool,
}

impl ScenePlan {
    /// A plan with every optional command left out.
    pub fn minimal(mode: RenderMode, clear: bool) -> Self {
        Self {
            mode,
            clear,
            shadow_map: false,
            ground_shadow: false,
            ground_reflection: false,
            highlighted: false,
            ghosted: false,
            sections: false,
            id_buffer: false,
        }
    }

    // A full render finishes in one tick, so ground passes can run before the
    // beauty pass. Other modes complete them afterwards.
    fn ground_before_beauty(&self) -> bool {
        self.mode == RenderMode::Full
    }
}

fn overlay_level(mode: Option<RenderMode>) -> CommandLevel {
    match mode {
        Some(RenderMode::Progressive) => CommandLevel::DoAfter,
        _ => CommandLevel::NormalSequence,
    }
}

/// Fills `list` with the commands of a scene render.
///
/// `list` must not hold an active list.
pub fn build_scene_list(
    list: &mut CommandList<RenderCommand>,
    plan: &ScenePlan,
) -> Result<(), CommandListError> {
    use CommandLevel::{AlwaysDo, NormalSequence};

    list.begin()?;
    list.add_command(RenderCommand::ApplyNavigationFeatures, AlwaysDo)?;
    list.add_command(RenderCommand::BeginScene, NormalSequence)?;
    list.set_param("clear", plan.clear)?;

    if plan.shadow_map {
        list.add_command(RenderCommand::UpdateShadowMap, NormalSequence)?;
    }
    if plan.ground_before_beauty() {
        if plan.ground_shadow {
            list.add_command(RenderCommand::GenerateGroundShadow, NormalSequence)?;
        }
        if plan.ground_reflection {
            list.add_command(RenderCommand::GenerateGroundReflection, NormalSequence)?;
        }
    }
    if plan.highlighted {
        list.add_command(RenderCommand::RenderHighlighted, NormalSequence)?;
    }
    list.add_command(RenderCommand::BeautyPass, NormalSequence)?;
    if plan.ghosted {
        list.add_command(RenderCommand::RenderGhosted, NormalSequence)?;
    }
    if plan.sections || plan.id_buffer {
        list.add_command(RenderCommand::RenderAdditionalBuffers, NormalSequence)?;
        list.set_param("sections", plan.sections)?;
        list.set_param("id_buffer", plan.id_buffer)?;
    }
    if !plan.ground_before_beauty() && (plan.ground_shadow || plan.ground_reflection) {
        list.add_command(RenderCommand::FinishGroundPasses, NormalSequence)?;
    }

    let level = overlay_level(Some(plan.mode));
    list.add_command(RenderCommand::RenderOverlays, level)?;
    list.add_command(RenderCommand::Present, level)?;
    list.set_param("partial", plan.mode.presents_partial_frames())?;
    list.add_command(RenderCommand::SignalFinished, NormalSequence)?;
    list.end()
}

/// Fills `list` with the two-command overlay refresh.
pub fn build_overlay_list(list: &mut CommandList<RenderCommand>) -> Result<(), CommandListError> {
    let level = overlay_level(None);
    list.begin()?;
    list.add_command(RenderCommand::RenderOverlays, level)?;
    list.add_command(RenderCommand::Present, level)?;
    list.set_param("partial", false)?;
    list.end()
}
