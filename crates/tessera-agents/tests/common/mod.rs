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

//! Test doubles shared by the render agent integration tests.

#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use tessera_agents::{RenderAgent, ViewerConfig};
use tessera_control::BudgetConfig;
use tessera_core::event::ViewerEvent;
use tessera_core::math::Aabb;
use tessera_core::renderer::{
    BatchId, BatchSource, ModelId, ProgressivePass, RenderBatch, RenderError, SceneRenderer,
    ViewInfo,
};
use tessera_core::{Clock, ManualClock};

/// One observable call into the renderer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Call {
    Navigation(bool),
    BeginScene { clear: bool },
    Batch(ModelId, BatchId),
    Highlighted,
    Ghosted,
    AdditionalBuffers { sections: bool, id_buffer: bool },
    Overlays,
    Present { partial: bool },
    Resize(u32, u32),
}

/// Records every call and advances the clock by a fixed cost per batch.
pub struct RecordingRenderer {
    calls: Arc<Mutex<Vec<Call>>>,
    clock: Arc<ManualClock>,
    batch_cost_ms: f64,
    context_lost: Arc<AtomicBool>,
}

impl RecordingRenderer {
    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }
}

impl SceneRenderer for RecordingRenderer {
    fn begin_scene(&mut self, _view: &ViewInfo, clear: bool) -> Result<(), RenderError> {
        if self.context_lost.load(Ordering::SeqCst) {
            return Err(RenderError::ContextLost);
        }
        self.record(Call::BeginScene { clear });
        Ok(())
    }

    fn render_batch(&mut self, batch: &RenderBatch) {
        self.clock.advance(self.batch_cost_ms);
        self.record(Call::Batch(batch.model, batch.id));
    }

    fn render_highlighted(&mut self) -> Result<(), RenderError> {
        self.record(Call::Highlighted);
        Ok(())
    }

    fn render_ghosted(&mut self) -> Result<(), RenderError> {
        self.record(Call::Ghosted);
        Ok(())
    }

    fn render_additional_buffers(
        &mut self,
        sections: bool,
        id_buffer: bool,
    ) -> Result<(), RenderError> {
        self.record(Call::AdditionalBuffers {
            sections,
            id_buffer,
        });
        Ok(())
    }

    fn render_overlays(&mut self) -> Result<(), RenderError> {
        self.record(Call::Overlays);
        Ok(())
    }

    fn compose_final_frame(&mut self, partial: bool) -> Result<(), RenderError> {
        self.record(Call::Present { partial });
        Ok(())
    }

    fn set_navigation_mode(&mut self, moving: bool) {
        self.record(Call::Navigation(moving));
    }

    fn resize(&mut self, width: u32, height: u32) {
        self.record(Call::Resize(width, height));
    }
}

/// A model whose batches are listed up front, opaque before transparent.
pub struct ScriptedSource {
    id: ModelId,
    batches: Vec<RenderBatch>,
    next: usize,
    skip_opaque: bool,
}

impl ScriptedSource {
    /// `count` opaque batches of decreasing importance.
    pub fn opaque(id: u32, count: u32) -> Self {
        let model = ModelId(id);
        let batches = (0..count)
            .map(|i| RenderBatch::new(model, BatchId(i), (count - i) as f32))
            .collect();
        Self {
            id: model,
            batches,
            next: 0,
            skip_opaque: false,
        }
    }

    /// Appends a transparent batch.
    pub fn with_transparent(mut self, id: u32, bounds: Aabb) -> Self {
        self.batches
            .push(RenderBatch::new(self.id, BatchId(id), 0.0).transparent().with_bounds(bounds));
        self
    }
}

impl BatchSource for ScriptedSource {
    fn model_id(&self) -> ModelId {
        self.id
    }

    fn reset(&mut self, _view: &ViewInfo) {
        self.next = 0;
        self.skip_opaque = false;
    }

    fn next_batch(&mut self) -> Option<RenderBatch> {
        while let Some(batch) = self.batches.get(self.next).copied() {
            self.next += 1;
            if !self.skip_opaque || batch.is_transparent() {
                return Some(batch);
            }
        }
        None
    }

    fn skip_opaque_shapes(&mut self) {
        self.skip_opaque = true;
    }

    fn is_done(&self) -> bool {
        self.next >= self.batches.len()
    }
}

/// A progressive pass that needs a fixed amount of time per update.
pub struct ScriptedPass {
    name: &'static str,
    work_ms: f32,
    remaining_ms: f32,
    stale: bool,
}

impl ScriptedPass {
    pub fn new(name: &'static str, work_ms: f32) -> Self {
        Self {
            name,
            work_ms,
            remaining_ms: work_ms,
            stale: true,
        }
    }
}

impl ProgressivePass for ScriptedPass {
    fn name(&self) -> &'static str {
        self.name
    }

    fn is_enabled(&self) -> bool {
        true
    }

    fn needs_update(&self) -> bool {
        self.stale
    }

    fn mark_stale(&mut self) {
        self.stale = true;
    }

    fn begin_update(&mut self, _view: &ViewInfo) {
        self.remaining_ms = self.work_ms;
    }

    fn render_some(&mut self, time_remaining_ms: f32) -> f32 {
        let spent = time_remaining_ms.min(self.remaining_ms).max(0.0);
        self.remaining_ms -= spent;
        if self.remaining_ms <= 0.0 {
            self.stale = false;
        }
        time_remaining_ms - spent
    }

    fn is_done(&self) -> bool {
        self.remaining_ms <= 0.0
    }
}

/// Budget used throughout the tests: 10ms to start, bounded to [2, 30].
pub fn test_budget() -> BudgetConfig {
    BudgetConfig {
        min_budget_ms: 2.0,
        max_budget_ms: 30.0,
        initial_budget_ms: 10.0,
        target_frame_ms: 16.0,
        ..Default::default()
    }
}

pub fn test_config() -> ViewerConfig {
    ViewerConfig {
        budget: test_budget(),
        ..Default::default()
    }
}

/// An agent wired to a recording renderer and a manual clock.
pub struct Harness {
    pub agent: RenderAgent,
    pub clock: Arc<ManualClock>,
    pub context_lost: Arc<AtomicBool>,
    calls: Arc<Mutex<Vec<Call>>>,
}

impl Harness {
    pub fn new(config: ViewerConfig, batch_cost_ms: f64) -> Self {
        Self::build(config, batch_cost_ms, |agent| agent)
    }

    pub fn build(
        config: ViewerConfig,
        batch_cost_ms: f64,
        attach: impl FnOnce(RenderAgent) -> RenderAgent,
    ) -> Self {
        let clock = Arc::new(ManualClock::new(0.0));
        let calls = Arc::new(Mutex::new(Vec::new()));
        let context_lost = Arc::new(AtomicBool::new(false));
        let renderer = RecordingRenderer {
            calls: calls.clone(),
            clock: clock.clone(),
            batch_cost_ms,
            context_lost: context_lost.clone(),
        };
        let agent = RenderAgent::new(config, Box::new(renderer), clock.clone()).unwrap();
        Self {
            agent: attach(agent),
            clock,
            context_lost,
            calls,
        }
    }

    /// Ticks at the current time, then lets 1ms of idle time pass.
    pub fn tick(&mut self) {
        self.agent.tick(self.clock.now_ms());
        self.clock.advance(1.0);
    }

    /// Ticks until the agent is idle, up to `max` ticks. Returns the count.
    pub fn run_to_idle(&mut self, max: usize) -> usize {
        for n in 1..=max {
            self.tick();
            if !self.agent.is_rendering() {
                return n;
            }
        }
        panic!("still rendering after {max} ticks");
    }

    /// Drains the calls recorded so far.
    pub fn take_calls(&self) -> Vec<Call> {
        std::mem::take(&mut *self.calls.lock().unwrap())
    }

    /// Drains the events published so far.
    pub fn take_events(&self) -> Vec<ViewerEvent> {
        self.agent.events().drain()
    }
}

pub fn batches(calls: &[Call]) -> usize {
    calls.iter().filter(|c| matches!(c, Call::Batch(..))).count()
}
