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

//! Sandbox: a few hundred simulated objects streamed through the render agent.
//!
//! Usage: `sandbox [viewer.ron]`. Set `RUST_LOG=debug` to follow list builds.

use anyhow::Result;
use std::sync::Arc;
use tessera_agents::{RenderAgent, ViewerConfig};
use tessera_core::event::ViewerEvent;
use tessera_core::math::{Aabb, Vec3};
use tessera_core::renderer::{
    BatchId, BatchSource, ModelId, RenderBatch, RenderError, SceneRenderer, ViewInfo,
};
use tessera_core::{Clock, ManualClock};

const FRAME_MS: f64 = 1000.0 / 60.0;
const TICKS: u32 = 240;

/// Pretends to draw: every batch costs time proportional to its size.
struct SimulatedRenderer {
    clock: Arc<ManualClock>,
    batches_drawn: u64,
    frames_presented: u64,
}

impl SceneRenderer for SimulatedRenderer {
    fn begin_scene(&mut self, view: &ViewInfo, clear: bool) -> Result<(), RenderError> {
        log::debug!("begin_scene at {:?} (clear: {clear})", view.camera_position);
        Ok(())
    }

    fn render_batch(&mut self, batch: &RenderBatch) {
        self.clock.advance(0.05 + f64::from(batch.render_importance) * 0.02);
        self.batches_drawn += 1;
    }

    fn render_highlighted(&mut self) -> Result<(), RenderError> {
        Ok(())
    }

    fn render_ghosted(&mut self) -> Result<(), RenderError> {
        Ok(())
    }

    fn render_additional_buffers(
        &mut self,
        _sections: bool,
        _id_buffer: bool,
    ) -> Result<(), RenderError> {
        Ok(())
    }

    fn render_overlays(&mut self) -> Result<(), RenderError> {
        Ok(())
    }

    fn compose_final_frame(&mut self, partial: bool) -> Result<(), RenderError> {
        self.frames_presented += 1;
        log::trace!(
            "present #{} (partial: {partial}, {} batches drawn so far)",
            self.frames_presented,
            self.batches_drawn
        );
        Ok(())
    }

    fn set_navigation_mode(&mut self, _moving: bool) {}

    fn resize(&mut self, width: u32, height: u32) {
        log::info!("resized to {width}x{height}");
    }
}

/// A grid of boxes, larger ones first, with every seventh box transparent.
struct GridModel {
    id: ModelId,
    batches: Vec<RenderBatch>,
    next: usize,
}

impl GridModel {
    fn new(id: u32, origin: Vec3, side: u32) -> Self {
        let model = ModelId(id);
        let mut opaque = Vec::new();
        let mut transparent = Vec::new();
        for i in 0..side * side {
            let size = 1.0 + ((i * 37) % 11) as f32;
            let min = origin + Vec3::new((i % side) as f32 * 12.0, 0.0, (i / side) as f32 * 12.0);
            let bounds = Aabb::from_min_max(min, min + Vec3::ONE * size);
            let batch = RenderBatch::new(model, BatchId(i), size).with_bounds(bounds);
            if i % 7 == 0 {
                transparent.push(batch.transparent());
            } else {
                opaque.push(batch);
            }
        }
        opaque.sort_by(|a, b| b.render_importance.total_cmp(&a.render_importance));
        opaque.extend(transparent);
        Self {
            id: model,
            batches: opaque,
            next: 0,
        }
    }
}

impl BatchSource for GridModel {
    fn model_id(&self) -> ModelId {
        self.id
    }

    fn reset(&mut self, _view: &ViewInfo) {
        self.next = 0;
    }

    fn next_batch(&mut self) -> Option<RenderBatch> {
        let batch = self.batches.get(self.next).copied()?;
        self.next += 1;
        Some(batch)
    }

    fn skip_opaque_shapes(&mut self) {
        while self
            .batches
            .get(self.next)
            .is_some_and(|b| !b.is_transparent())
        {
            self.next += 1;
        }
    }

    fn is_done(&self) -> bool {
        self.next >= self.batches.len()
    }

    fn progress(&self) -> f32 {
        self.next as f32 / self.batches.len().max(1) as f32
    }
}

fn main() -> Result<()> {
    use env_logger::{Builder, Env};

    Builder::from_env(Env::default().default_filter_or("info")).init();

    let config = match std::env::args().nth(1) {
        Some(path) => ViewerConfig::load(path)?,
        None => ViewerConfig::default(),
    };

    let clock = Arc::new(ManualClock::new(0.0));
    let renderer = SimulatedRenderer {
        clock: clock.clone(),
        batches_drawn: 0,
        frames_presented: 0,
    };
    let mut agent = RenderAgent::new(config, Box::new(renderer), clock.clone())?;
    agent.resize(1280, 720);
    agent.add_model(Box::new(GridModel::new(1, Vec3::ZERO, 20)));
    agent.add_model(Box::new(GridModel::new(2, Vec3::new(0.0, 0.0, 300.0), 12)));

    let mut next_frame = 0.0;
    for tick in 0..TICKS {
        // Orbit for the first second, then hold still.
        let angle = tick.min(60) as f32 * 0.02;
        let eye = Vec3::new(angle.cos() * 400.0, 80.0, angle.sin() * 400.0);
        agent.set_camera(ViewInfo::at(eye).moving(tick < 60));

        if tick == 150 {
            agent.set_highlighted(true);
        }
        if tick == 200 {
            agent.request_silent_render();
        }

        next_frame += FRAME_MS;
        agent.tick(clock.now_ms());
        if clock.now_ms() < next_frame {
            clock.set(next_frame);
        }

        for event in agent.events().drain() {
            match event {
                ViewerEvent::FinalFrameRenderedChanged { finished: true } => {
                    log::info!("tick {tick}: final frame rendered");
                }
                ViewerEvent::ProgressUpdate { percent } => {
                    log::debug!("tick {tick}: {percent:.0}%");
                }
                _ => {}
            }
        }
    }

    let stats = agent.frame_stats();
    log::info!(
        "done: budget {:.2}ms, {} frames measured, average {:.2}ms (min {:.2}, max {:.2})",
        agent.frame_budget_ms(),
        stats.samples,
        stats.average_ms,
        stats.min_ms,
        stats.max_ms
    );
    Ok(())
}
