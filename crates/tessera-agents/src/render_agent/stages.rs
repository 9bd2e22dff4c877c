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

//! The handler that gives every [`RenderCommand`] its meaning.

use super::{RenderCommand, RenderMode, ScenePlan};
use tessera_core::command::{CommandContext, CommandError, CommandHandler, CommandStatus};
use tessera_core::event::ViewerEvent;
use tessera_core::renderer::{ProgressivePass, RenderError, SceneRenderer, ViewInfo};
use tessera_lanes::RenderScene;

type StageFn =
    fn(&mut RenderStages, &mut CommandContext<'_>) -> Result<CommandStatus, CommandError>;

/// Stage implementations, indexed by [`RenderCommand::index`].
const STAGES: [StageFn; RenderCommand::COUNT] = [
    RenderStages::apply_navigation_features,
    RenderStages::begin_scene,
    RenderStages::update_shadow_map,
    RenderStages::generate_ground_shadow,
    RenderStages::generate_ground_reflection,
    RenderStages::render_highlighted,
    RenderStages::beauty_pass,
    RenderStages::render_ghosted,
    RenderStages::render_additional_buffers,
    RenderStages::finish_ground_passes,
    RenderStages::render_overlays,
    RenderStages::present,
    RenderStages::signal_finished,
];

// A progressive pass and whether its current update has been started.
struct PassSlot {
    pass: Box<dyn ProgressivePass>,
    started: bool,
}

impl PassSlot {
    fn new(pass: Box<dyn ProgressivePass>) -> Self {
        Self {
            pass,
            started: false,
        }
    }

    fn is_stale(&self) -> bool {
        self.pass.is_enabled() && self.pass.needs_update()
    }

    // Spends the context's remaining time on the pass. Returns `true` once done.
    fn advance(&mut self, view: &ViewInfo, ctx: &mut CommandContext<'_>) -> bool {
        if !self.started {
            self.pass.begin_update(view);
            self.started = true;
        }
        let left = self.pass.render_some(ctx.time_remaining());
        ctx.set_time_remaining(left);
        let done = self.pass.is_done();
        if done {
            self.started = false;
            log::trace!("RenderStages: {} complete", self.pass.name());
        }
        done
    }
}

/// Owns every collaborator the render commands touch.
///
/// The agent hands this to the command list executor each tick. Outcomes the
/// agent must react to (completion, late ground passes, lost context) are
/// recorded as flags and collected with the `take_*` methods.
pub struct RenderStages {
    renderer: Box<dyn SceneRenderer>,
    scene: RenderScene,
    shadow_map: Option<PassSlot>,
    ground_shadow: Option<PassSlot>,
    ground_reflection: Option<PassSlot>,
    events: flume::Sender<ViewerEvent>,

    view: ViewInfo,
    mode: RenderMode,
    highlighted: bool,
    all_visible: bool,
    sections_active: bool,

    ghosting: bool,
    id_buffer: bool,
    non_resumable_while_moving: bool,

    frame_complete: bool,
    late_ground_completed: bool,
    context_lost: bool,
}

impl RenderStages {
    /// Creates the stages around a renderer and a scene.
    pub fn new(
        renderer: Box<dyn SceneRenderer>,
        scene: RenderScene,
        events: flume::Sender<ViewerEvent>,
    ) -> Self {
        Self {
            renderer,
            scene,
            shadow_map: None,
            ground_shadow: None,
            ground_reflection: None,
            events,
            view: ViewInfo::default(),
            mode: RenderMode::Progressive,
            highlighted: false,
            all_visible: true,
            sections_active: false,
            ghosting: true,
            id_buffer: false,
            non_resumable_while_moving: true,
            frame_complete: false,
            late_ground_completed: false,
            context_lost: false,
        }
    }

    pub(crate) fn set_shadow_map(&mut self, pass: Box<dyn ProgressivePass>) {
        self.shadow_map = Some(PassSlot::new(pass));
    }

    pub(crate) fn set_ground_shadow(&mut self, pass: Box<dyn ProgressivePass>) {
        self.ground_shadow = Some(PassSlot::new(pass));
    }

    pub(crate) fn set_ground_reflection(&mut self, pass: Box<dyn ProgressivePass>) {
        self.ground_reflection = Some(PassSlot::new(pass));
    }

    pub(crate) fn configure(&mut self, ghosting: bool, id_buffer: bool, non_resumable: bool) {
        self.ghosting = ghosting;
        self.id_buffer = id_buffer;
        self.non_resumable_while_moving = non_resumable;
    }

    /// The scene scheduler.
    pub fn scene(&self) -> &RenderScene {
        &self.scene
    }

    /// Mutable access to the scene scheduler.
    pub fn scene_mut(&mut self) -> &mut RenderScene {
        &mut self.scene
    }

    /// Mutable access to the renderer.
    pub fn renderer_mut(&mut self) -> &mut dyn SceneRenderer {
        self.renderer.as_mut()
    }

    /// Camera state used by the next scene list.
    pub fn view(&self) -> ViewInfo {
        self.view
    }

    pub(crate) fn set_view(&mut self, view: ViewInfo) {
        self.view = view;
    }

    pub(crate) fn set_mode(&mut self, mode: RenderMode) {
        self.mode = mode;
    }

    /// Returns `true` if something is highlighted.
    pub fn highlighted(&self) -> bool {
        self.highlighted
    }

    pub(crate) fn set_highlighted(&mut self, highlighted: bool) -> bool {
        std::mem::replace(&mut self.highlighted, highlighted) != highlighted
    }

    /// Returns `true` if every object is visible.
    pub fn all_visible(&self) -> bool {
        self.all_visible
    }

    pub(crate) fn set_all_visible(&mut self, all_visible: bool) -> bool {
        std::mem::replace(&mut self.all_visible, all_visible) != all_visible
    }

    /// Returns `true` if section planes are active.
    pub fn sections_active(&self) -> bool {
        self.sections_active
    }

    pub(crate) fn set_sections_active(&mut self, active: bool) -> bool {
        std::mem::replace(&mut self.sections_active, active) != active
    }

    /// Flags every progressive pass for regeneration.
    pub fn mark_passes_stale(&mut self) {
        for slot in [
            self.shadow_map.as_mut(),
            self.ground_shadow.as_mut(),
            self.ground_reflection.as_mut(),
        ]
        .into_iter()
        .flatten()
        {
            slot.pass.mark_stale();
            slot.started = false;
        }
    }

    /// Samples which optional commands a list in `mode` needs right now.
    pub fn plan(&self, mode: RenderMode, clear: bool) -> ScenePlan {
        let stale = |slot: &Option<PassSlot>| slot.as_ref().is_some_and(PassSlot::is_stale);
        ScenePlan {
            mode,
            clear,
            shadow_map: stale(&self.shadow_map),
            ground_shadow: stale(&self.ground_shadow),
            ground_reflection: stale(&self.ground_reflection),
            highlighted: self.highlighted,
            ghosted: self.ghosting && !self.all_visible,
            sections: self.sections_active,
            id_buffer: self.id_buffer,
        }
    }

    pub(crate) fn take_frame_complete(&mut self) -> bool {
        std::mem::take(&mut self.frame_complete)
    }

    pub(crate) fn take_late_ground_completed(&mut self) -> bool {
        std::mem::take(&mut self.late_ground_completed)
    }

    pub(crate) fn take_context_lost(&mut self) -> bool {
        std::mem::take(&mut self.context_lost)
    }

    fn publish(&self, event: ViewerEvent) {
        if let Err(e) = self.events.send(event) {
            log::error!("RenderStages: failed to send {event:?}: {e}");
        }
    }

    fn advance_pass(
        slot: Option<&mut PassSlot>,
        name: &'static str,
        view: &ViewInfo,
        ctx: &mut CommandContext<'_>,
    ) -> Result<CommandStatus, CommandError> {
        let slot = slot.ok_or(CommandError::MissingCollaborator(name))?;
        Ok(CommandStatus::paused_unless(slot.advance(view, ctx)))
    }

    // --- Stages ---

    fn apply_navigation_features(
        &mut self,
        _ctx: &mut CommandContext<'_>,
    ) -> Result<CommandStatus, CommandError> {
        self.renderer.set_navigation_mode(self.view.is_moving);
        Ok(CommandStatus::Finished)
    }

    fn begin_scene(&mut self, ctx: &mut CommandContext<'_>) -> Result<CommandStatus, CommandError> {
        self.renderer.begin_scene(&self.view, ctx.params().bool("clear"))?;

        let non_resumable = self.non_resumable_while_moving
            && self.view.is_moving
            && self.mode == RenderMode::Progressive;
        self.scene.set_non_resumable(non_resumable);
        self.scene.reset(&self.view);

        for slot in [
            self.shadow_map.as_mut(),
            self.ground_shadow.as_mut(),
            self.ground_reflection.as_mut(),
        ]
        .into_iter()
        .flatten()
        {
            slot.started = false;
        }
        self.frame_complete = false;
        Ok(CommandStatus::Finished)
    }

    fn update_shadow_map(
        &mut self,
        ctx: &mut CommandContext<'_>,
    ) -> Result<CommandStatus, CommandError> {
        let view = self.view;
        Self::advance_pass(self.shadow_map.as_mut(), "shadow_map", &view, ctx)
    }

    fn generate_ground_shadow(
        &mut self,
        ctx: &mut CommandContext<'_>,
    ) -> Result<CommandStatus, CommandError> {
        let view = self.view;
        Self::advance_pass(self.ground_shadow.as_mut(), "ground_shadow", &view, ctx)
    }

    fn generate_ground_reflection(
        &mut self,
        ctx: &mut CommandContext<'_>,
    ) -> Result<CommandStatus, CommandError> {
        let view = self.view;
        Self::advance_pass(
            self.ground_reflection.as_mut(),
            "ground_reflection",
            &view,
            ctx,
        )
    }

    fn render_highlighted(
        &mut self,
        _ctx: &mut CommandContext<'_>,
    ) -> Result<CommandStatus, CommandError> {
        self.renderer.render_highlighted()?;
        Ok(CommandStatus::Finished)
    }

    fn beauty_pass(&mut self, ctx: &mut CommandContext<'_>) -> Result<CommandStatus, CommandError> {
        let renderer = &mut self.renderer;
        let left = self
            .scene
            .render_some(|batch| renderer.render_batch(batch), ctx.time_remaining());
        ctx.set_time_remaining(left);
        Ok(CommandStatus::paused_unless(self.scene.is_done()))
    }

    fn render_ghosted(
        &mut self,
        _ctx: &mut CommandContext<'_>,
    ) -> Result<CommandStatus, CommandError> {
        self.renderer.render_ghosted()?;
        Ok(CommandStatus::Finished)
    }

    fn render_additional_buffers(
        &mut self,
        ctx: &mut CommandContext<'_>,
    ) -> Result<CommandStatus, CommandError> {
        let params = ctx.params();
        self.renderer
            .render_additional_buffers(params.bool("sections"), params.bool("id_buffer"))?;
        Ok(CommandStatus::Finished)
    }

    fn finish_ground_passes(
        &mut self,
        ctx: &mut CommandContext<'_>,
    ) -> Result<CommandStatus, CommandError> {
        let view = self.view;
        let mut all_done = true;
        for slot in [self.ground_shadow.as_mut(), self.ground_reflection.as_mut()]
            .into_iter()
            .flatten()
        {
            if !slot.is_stale() {
                continue;
            }
            if ctx.is_out_of_time() {
                all_done = false;
                continue;
            }
            if slot.advance(&view, ctx) {
                log::debug!(
                    "RenderStages: {} completed after the beauty pass",
                    slot.pass.name()
                );
                self.late_ground_completed = true;
            } else {
                all_done = false;
            }
        }
        Ok(CommandStatus::paused_unless(all_done))
    }

    fn render_overlays(
        &mut self,
        _ctx: &mut CommandContext<'_>,
    ) -> Result<CommandStatus, CommandError> {
        self.renderer.render_overlays()?;
        Ok(CommandStatus::Finished)
    }

    fn present(&mut self, ctx: &mut CommandContext<'_>) -> Result<CommandStatus, CommandError> {
        let partial = ctx.params().bool("partial") && !self.scene.is_done();
        self.renderer.compose_final_frame(partial)?;
        self.publish(ViewerEvent::RenderPresented);
        Ok(CommandStatus::Finished)
    }

    fn signal_finished(
        &mut self,
        _ctx: &mut CommandContext<'_>,
    ) -> Result<CommandStatus, CommandError> {
        log::debug!("RenderStages: {:?} render finished", self.mode);
        self.frame_complete = true;
        Ok(CommandStatus::Finished)
    }
}

impl CommandHandler<RenderCommand> for RenderStages {
    fn execute(
        &mut self,
        command: RenderCommand,
        ctx: &mut CommandContext<'_>,
    ) -> Result<CommandStatus, CommandError> {
        let result = STAGES[command.index()](self, ctx);
        if let Err(CommandError::Render(RenderError::ContextLost)) = &result {
            self.context_lost = true;
        }
        result
    }
}
