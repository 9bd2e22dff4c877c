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

//! Defines the RenderAgent, which decides what to render and drives it across ticks.

use super::{
    build_overlay_list, build_scene_list, ActiveList, InvalidationState, RenderCommand,
    RenderMode, RenderStages,
};
use crate::config::ViewerConfig;
use std::sync::Arc;
use tessera_control::{BudgetConfigError, FrameBudgetController, FrameStats};
use tessera_core::event::{EventBus, ViewerEvent};
use tessera_core::renderer::{BatchSource, ModelId, ProgressivePass, SceneRenderer, ViewInfo};
use tessera_core::Clock;
use tessera_lanes::{CommandList, RenderScene};

/// The agent responsible for scheduling progressive renders.
///
/// Nothing here renders synchronously. Mutators only raise flags; all work
/// happens in [`tick`](Self::tick), which the application calls once per
/// display refresh with the current timestamp.
pub struct RenderAgent {
    config: ViewerConfig,
    // The single command list; rebuilt in place for every render.
    commands: CommandList<RenderCommand>,
    stages: RenderStages,
    budget: FrameBudgetController,
    invalidation: InvalidationState,
    events: EventBus<ViewerEvent>,
    // What the active list is doing, `None` when idle.
    active: Option<ActiveList>,
    final_frame_rendered: bool,
    // Set while the graphics context is lost.
    suspended: bool,
    // The last tick was progressive, so the next one may feed its delta.
    calibrate_next: bool,
}

impl RenderAgent {
    /// Creates an agent drawing through `renderer` and timing batches with `clock`.
    ///
    /// The first tick renders the (empty) scene.
    pub fn new(
        config: ViewerConfig,
        renderer: Box<dyn SceneRenderer>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, BudgetConfigError> {
        let budget = FrameBudgetController::new(config.budget.clone())?;
        let events = EventBus::new();
        let scene = RenderScene::new(config.scene.clone(), clock);
        let mut stages = RenderStages::new(renderer, scene, events.sender());
        stages.configure(
            config.ghosting,
            config.id_buffer,
            config.non_resumable_while_moving,
        );

        let mut invalidation = InvalidationState::new();
        invalidation.invalidate(true, true, true);

        log::info!(
            "RenderAgent: created (progressive: {}, budget: {:.2}ms)",
            config.progressive_rendering,
            budget.budget_ms()
        );

        Ok(Self {
            config,
            commands: CommandList::new(),
            stages,
            budget,
            invalidation,
            events,
            active: None,
            final_frame_rendered: false,
            suspended: false,
            calibrate_next: false,
        })
    }

    /// Attaches a shadow map pass.
    pub fn with_shadow_map(mut self, pass: Box<dyn ProgressivePass>) -> Self {
        self.stages.set_shadow_map(pass);
        self
    }

    /// Attaches a ground shadow pass.
    pub fn with_ground_shadow(mut self, pass: Box<dyn ProgressivePass>) -> Self {
        self.stages.set_ground_shadow(pass);
        self
    }

    /// Attaches a ground reflection pass.
    pub fn with_ground_reflection(mut self, pass: Box<dyn ProgressivePass>) -> Self {
        self.stages.set_ground_reflection(pass);
        self
    }

    /// Registers a model and schedules a re-render.
    pub fn add_model(&mut self, source: Box<dyn BatchSource>) {
        self.stages.scene_mut().add_model(source);
        self.scene_changed();
    }

    /// Unregisters a model, scheduling a re-render if it was present.
    pub fn remove_model(&mut self, id: ModelId) -> Option<Box<dyn BatchSource>> {
        let removed = self.stages.scene_mut().remove_model(id);
        if removed.is_some() {
            self.scene_changed();
        }
        removed
    }

    // --- Invalidation surface ---

    /// Marks the frame stale. Takes effect on the next tick.
    pub fn invalidate(&mut self, needs_clear: bool, needs_render: bool, overlay_dirty: bool) {
        self.invalidation
            .invalidate(needs_clear, needs_render, overlay_dirty);
    }

    /// Requests a silent render on the next tick, superseding the current one.
    pub fn request_silent_render(&mut self) {
        self.invalidation.request_silent_render();
    }

    /// Requests a silent render once the current render has finished.
    pub fn request_deferred_silent_render(&mut self) {
        self.invalidation.request_deferred_silent_render();
    }

    /// The scene content changed; every derived pass is regenerated.
    pub fn scene_changed(&mut self) {
        self.stages.mark_passes_stale();
        self.invalidate(true, true, false);
    }

    /// Resizes the frame targets and redraws everything.
    pub fn resize(&mut self, width: u32, height: u32) {
        log::debug!("RenderAgent: resize to {width}x{height}");
        self.stages.renderer_mut().resize(width, height);
        self.invalidate(true, true, true);
    }

    /// Updates the camera, redrawing if it changed.
    pub fn set_camera(&mut self, view: ViewInfo) {
        if self.stages.view() != view {
            self.stages.set_view(view);
            self.invalidate(true, true, false);
        }
    }

    /// Toggles the highlighted-objects pass.
    pub fn set_highlighted(&mut self, highlighted: bool) {
        if self.stages.set_highlighted(highlighted) {
            self.invalidate(true, true, false);
        }
    }

    /// Tells the agent whether every object is visible.
    pub fn set_all_visible(&mut self, all_visible: bool) {
        if self.stages.set_all_visible(all_visible) {
            self.invalidate(true, true, false);
        }
    }

    /// Toggles section planes.
    pub fn set_sections_active(&mut self, active: bool) {
        if self.stages.set_sections_active(active) {
            self.invalidate(true, true, false);
        }
    }

    // --- Context loss ---

    /// Stops ticking and drops the active list until the context comes back.
    pub fn on_context_lost(&mut self) {
        if self.suspended {
            return;
        }
        log::warn!("RenderAgent: graphics context lost, suspending rendering.");
        self.commands.discard();
        self.active = None;
        self.suspended = true;
        self.calibrate_next = false;
        self.budget.reset_timing();
    }

    /// Resumes ticking with a full re-render.
    pub fn on_context_restored(&mut self) {
        if !self.suspended {
            return;
        }
        log::info!("RenderAgent: graphics context restored.");
        self.suspended = false;
        self.scene_changed();
        self.invalidate(true, true, true);
    }

    // --- Queries ---

    /// Returns `true` while a command list is in flight.
    pub fn is_rendering(&self) -> bool {
        self.commands.is_active()
    }

    /// Mode of the scene render in flight, if any.
    pub fn current_mode(&self) -> Option<RenderMode> {
        self.active.and_then(ActiveList::mode)
    }

    /// What the active command list is doing, if anything.
    pub fn active_list(&self) -> Option<ActiveList> {
        self.active
    }

    /// Returns `true` once the last scene render completed every pass.
    pub fn is_final_frame_rendered(&self) -> bool {
        self.final_frame_rendered
    }

    /// Returns `true` while the graphics context is lost.
    pub fn is_suspended(&self) -> bool {
        self.suspended
    }

    /// Current per-tick budget, in milliseconds.
    pub fn frame_budget_ms(&self) -> f32 {
        self.budget.budget_ms()
    }

    /// Timing summary of recent progressive ticks.
    pub fn frame_stats(&self) -> FrameStats {
        self.budget.stats()
    }

    /// Flags waiting for the next tick.
    pub fn invalidation(&self) -> &InvalidationState {
        &self.invalidation
    }

    /// The bus on which viewer events are published.
    pub fn events(&self) -> &EventBus<ViewerEvent> {
        &self.events
    }

    /// The collaborators driven by the command list.
    pub fn stages(&self) -> &RenderStages {
        &self.stages
    }

    /// The command list.
    pub fn commands(&self) -> &CommandList<RenderCommand> {
        &self.commands
    }

    /// Configuration the agent was built from.
    pub fn config(&self) -> &ViewerConfig {
        &self.config
    }

    // --- Tick ---

    /// Runs one tick at timestamp `now_ms`.
    pub fn tick(&mut self, now_ms: f64) {
        if self.suspended {
            return;
        }
        self.schedule();
        let Some(active) = self.active else {
            // Idle time between renders is not frame time.
            self.calibrate_next = false;
            self.budget.reset_timing();
            return;
        };

        let mode = active.mode();
        let progressive = mode == Some(RenderMode::Progressive);
        // A progressive list that supersedes another keeps calibrating across
        // the switch, so navigation still adapts the budget.
        self.budget.begin_scene(now_ms, progressive && self.calibrate_next);
        self.calibrate_next = progressive;
        let budget_ms = match mode {
            Some(mode) if mode.is_budgeted() => self.budget.budget_ms(),
            _ => f32::INFINITY,
        };

        let finished = self.commands.execute_tick(&mut self.stages, budget_ms);

        if self.stages.take_context_lost() {
            self.on_context_lost();
            return;
        }
        if self.stages.take_late_ground_completed() && self.config.rerender_after_late_ground {
            self.invalidation.request_deferred_silent_render();
        }
        if mode.is_some() {
            self.events.publish(ViewerEvent::ProgressUpdate {
                percent: self.stages.scene().progress() * 100.0,
            });
        }
        if finished {
            log::trace!(
                "RenderAgent: {:?} list finished after {} ticks",
                active,
                self.commands.tick()
            );
            self.active = None;
            self.calibrate_next = false;
            if self.stages.take_frame_complete() {
                self.set_final_frame_rendered(true);
            }
        }
    }

    // Turns pending flags into a new command list when one is due.
    fn schedule(&mut self) {
        if let Some(clear) = self.invalidation.take_scene() {
            let mode = if self.config.progressive_rendering {
                RenderMode::Progressive
            } else {
                RenderMode::Full
            };
            self.start_scene(mode, clear);
            return;
        }

        if self.invalidation.take_silent() {
            // The silent render draws the overlays too.
            self.invalidation.take_overlay();
            self.start_scene(RenderMode::Silent, true);
            return;
        }

        match self.active {
            None => {
                if self.invalidation.take_overlay() {
                    self.start_overlay();
                } else if self.invalidation.take_deferred_silent() {
                    self.start_scene(RenderMode::Silent, true);
                }
            }
            // Progressive lists redraw the overlays every tick.
            Some(ActiveList::Scene(RenderMode::Progressive)) => {
                self.invalidation.take_overlay();
            }
            // Anything else is shown once the active list completes.
            Some(_) => {}
        }
    }

    fn start_scene(&mut self, mode: RenderMode, clear: bool) {
        if self.commands.is_active() {
            log::debug!("RenderAgent: superseding {:?} list", self.active);
        }
        self.commands.discard();
        self.stages.set_mode(mode);
        let plan = self.stages.plan(mode, clear);

        if let Err(e) = build_scene_list(&mut self.commands, &plan) {
            log::error!("RenderAgent: failed to build {mode:?} list: {e}");
            self.commands.discard();
            self.active = None;
            return;
        }
        log::debug!(
            "RenderAgent: built {:?} list of {} commands (clear: {})",
            mode,
            self.commands.len(),
            clear
        );
        self.active = Some(ActiveList::Scene(mode));
        self.set_final_frame_rendered(false);
    }

    fn start_overlay(&mut self) {
        self.commands.discard();
        if let Err(e) = build_overlay_list(&mut self.commands) {
            log::error!("RenderAgent: failed to build overlay list: {e}");
            self.commands.discard();
            return;
        }
        self.active = Some(ActiveList::OverlayOnly);
    }

    fn set_final_frame_rendered(&mut self, finished: bool) {
        if self.final_frame_rendered != finished {
            self.final_frame_rendered = finished;
            self.events
                .publish(ViewerEvent::FinalFrameRenderedChanged { finished });
        }
    }
}
