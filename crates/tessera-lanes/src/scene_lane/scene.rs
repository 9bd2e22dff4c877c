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

//! Importance-ordered traversal of every loaded model under a time limit.

use super::SceneSchedulerConfig;
use std::cmp::Ordering;
use std::sync::Arc;
use tessera_core::renderer::{BatchSource, ModelId, RenderBatch, ViewInfo};
use tessera_core::Clock;

/// Counters for the current traversal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SceneStats {
    /// Batches handed to the render callback.
    pub rendered: usize,
    /// Transparent batches held back for the back-to-front pass.
    pub deferred: usize,
    /// Models told to abandon their remaining opaque batches.
    pub opaque_skips: usize,
}

struct ModelEntry {
    source: Box<dyn BatchSource>,
    // The batch on deck for this model.
    candidate: Option<RenderBatch>,
    exhausted: bool,
    skipped_opaque: bool,
    avg_batch_ms: Option<f32>,
}

/// Merges the batch streams of all loaded models into one time-sliced loop.
///
/// Each step renders the most important pending batch across every model.
/// When the frame is flagged non-resumable (the camera is moving and the
/// result will be thrown away anyway), the scheduler gives up on opaque
/// content once time runs short and makes sure transparent content is drawn
/// back to front at the end of the call.
pub struct RenderScene {
    models: Vec<ModelEntry>,
    clock: Arc<dyn Clock>,
    config: SceneSchedulerConfig,
    view: ViewInfo,
    non_resumable: bool,
    done: bool,
    deferred: Vec<(usize, RenderBatch)>,
    stats: SceneStats,
}

impl RenderScene {
    /// Creates an empty scene measuring batch durations with `clock`.
    pub fn new(config: SceneSchedulerConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            models: Vec::new(),
            clock,
            config,
            view: ViewInfo::default(),
            non_resumable: false,
            done: true,
            deferred: Vec::new(),
            stats: SceneStats::default(),
        }
    }

    /// Registers a model.
    ///
    /// The model joins at the next [`reset`](Self::reset); a traversal in
    /// progress is not affected.
    pub fn add_model(&mut self, source: Box<dyn BatchSource>) {
        log::info!("RenderScene: added {}", source.model_id());
        self.models.push(ModelEntry {
            source,
            candidate: None,
            exhausted: true,
            skipped_opaque: false,
            avg_batch_ms: None,
        });
    }

    /// Unregisters a model and hands its source back.
    pub fn remove_model(&mut self, id: ModelId) -> Option<Box<dyn BatchSource>> {
        let index = self.models.iter().position(|m| m.source.model_id() == id)?;
        log::info!("RenderScene: removed {id}");
        Some(self.models.remove(index).source)
    }

    /// Number of registered models.
    pub fn model_count(&self) -> usize {
        self.models.len()
    }

    /// Restarts the traversal of every visible model for `view`.
    pub fn reset(&mut self, view: &ViewInfo) {
        self.view = *view;
        self.done = false;
        self.deferred.clear();
        self.stats = SceneStats::default();
        for model in &mut self.models {
            model.candidate = None;
            model.skipped_opaque = false;
            model.exhausted = !model.source.is_visible();
            if !model.exhausted {
                model.source.reset(view);
            }
        }
        log::trace!(
            "RenderScene: reset {} models (non-resumable: {})",
            self.models.len(),
            self.non_resumable
        );
    }

    /// Flags the frame as one that will be discarded before it completes.
    pub fn set_non_resumable(&mut self, non_resumable: bool) {
        self.non_resumable = non_resumable;
    }

    /// Returns `true` if the current frame is non-resumable.
    pub fn is_non_resumable(&self) -> bool {
        self.non_resumable
    }

    /// Returns `true` once every model is exhausted. Stays `true` until `reset`.
    pub fn is_done(&self) -> bool {
        self.done
    }

    /// Counters for the current traversal.
    pub fn stats(&self) -> SceneStats {
        self.stats
    }

    /// Fraction of the traversal completed, averaged over visible models.
    pub fn progress(&self) -> f32 {
        if self.done {
            return 1.0;
        }
        let visible: Vec<f32> = self
            .models
            .iter()
            .filter(|m| m.source.is_visible())
            .map(|m| if m.exhausted { 1.0 } else { m.source.progress() })
            .collect();
        if visible.is_empty() {
            return 1.0;
        }
        visible.iter().sum::<f32>() / visible.len() as f32
    }

    /// Renders batches through `render_fn` until `time_remaining_ms` is spent
    /// or every model is exhausted, and returns the time left.
    ///
    /// Time is charged at each model's smoothed batch duration rather than the
    /// raw measurement, which keeps per-tick jitter out of the budget.
    pub fn render_some<F>(&mut self, mut render_fn: F, mut time_remaining_ms: f32) -> f32
    where
        F: FnMut(&RenderBatch),
    {
        if self.done {
            return time_remaining_ms;
        }

        let reserve_ms = if time_remaining_ms.is_finite() {
            self.config.transparency_fraction * time_remaining_ms
        } else {
            0.0
        };

        while time_remaining_ms > 0.0 {
            self.fill_candidates();

            if self.non_resumable && time_remaining_ms < reserve_ms {
                self.skip_remaining_opaque();
            }

            let Some((index, batch)) = self.take_best_candidate() else {
                self.done = true;
                log::trace!("RenderScene: traversal done ({:?})", self.stats);
                break;
            };

            if self.non_resumable && batch.is_transparent() {
                self.deferred.push((index, batch));
                self.stats.deferred += 1;
                continue;
            }

            time_remaining_ms -= self.render_timed(index, &batch, &mut render_fn);
        }

        if !self.deferred.is_empty() {
            let eye = self.view.camera_position;
            let mut deferred = std::mem::take(&mut self.deferred);
            deferred.sort_by(|(_, a), (_, b)| {
                b.distance_squared_from(eye)
                    .partial_cmp(&a.distance_squared_from(eye))
                    .unwrap_or(Ordering::Equal)
            });
            for (index, batch) in deferred.drain(..) {
                time_remaining_ms -= self.render_timed(index, &batch, &mut render_fn);
            }
            self.deferred = deferred;
        }

        self.fill_candidates();
        time_remaining_ms
    }

    fn fill_candidates(&mut self) {
        for model in &mut self.models {
            if model.exhausted || model.candidate.is_some() {
                continue;
            }
            model.candidate = model.source.next_batch();
            model.exhausted = model.candidate.is_none();
        }
    }

    fn skip_remaining_opaque(&mut self) {
        for model in &mut self.models {
            let opaque_on_deck = model
                .candidate
                .as_ref()
                .is_some_and(|b| !b.is_transparent());
            if !opaque_on_deck || model.skipped_opaque {
                continue;
            }
            model.source.skip_opaque_shapes();
            model.skipped_opaque = true;
            model.candidate = model.source.next_batch();
            model.exhausted = model.candidate.is_none();
            self.stats.opaque_skips += 1;
        }
    }

    // Ties go to the model registered first.
    fn take_best_candidate(&mut self) -> Option<(usize, RenderBatch)> {
        let mut best: Option<(usize, f32)> = None;
        for (index, model) in self.models.iter().enumerate() {
            let Some(batch) = &model.candidate else {
                continue;
            };
            if best.map_or(true, |(_, importance)| batch.render_importance > importance) {
                best = Some((index, batch.render_importance));
            }
        }
        let (index, _) = best?;
        self.models[index].candidate.take().map(|batch| (index, batch))
    }

    fn render_timed<F>(&mut self, index: usize, batch: &RenderBatch, render_fn: &mut F) -> f32
    where
        F: FnMut(&RenderBatch),
    {
        let start = self.clock.now_ms();
        render_fn(batch);
        let elapsed = (self.clock.now_ms() - start).max(0.0) as f32;

        let weight = self.config.batch_time_weight;
        let model = &mut self.models[index];
        let average = match model.avg_batch_ms {
            Some(avg) => weight * avg + (1.0 - weight) * elapsed,
            None => elapsed,
        };
        model.avg_batch_ms = Some(average);
        self.stats.rendered += 1;
        average
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use tessera_core::math::{Aabb, Vec3};
    use tessera_core::renderer::BatchId;
    use tessera_core::ManualClock;

    /// Hands out a fixed list of batches; opaque ones first.
    struct ListSource {
        id: ModelId,
        batches: Vec<RenderBatch>,
        next: usize,
        visible: bool,
        skip_opaque: bool,
    }

    impl ListSource {
        fn new(id: u32, batches: Vec<RenderBatch>) -> Self {
            Self {
                id: ModelId(id),
                batches,
                next: 0,
                visible: true,
                skip_opaque: false,
            }
        }

        fn opaque(id: u32, importances: &[f32]) -> Self {
            let batches = importances
                .iter()
                .enumerate()
                .map(|(i, &imp)| RenderBatch::new(ModelId(id), BatchId(i as u32), imp))
                .collect();
            Self::new(id, batches)
        }
    }

    impl BatchSource for ListSource {
        fn model_id(&self) -> ModelId {
            self.id
        }
        fn reset(&mut self, _view: &ViewInfo) {
            self.next = 0;
            self.skip_opaque = false;
        }
        fn next_batch(&mut self) -> Option<RenderBatch> {
            loop {
                let batch = self.batches.get(self.next).copied();
                self.next += 1;
                match batch {
                    Some(b) if self.skip_opaque && !b.is_transparent() => continue,
                    other => return other,
                }
            }
        }
        fn skip_opaque_shapes(&mut self) {
            self.skip_opaque = true;
        }
        fn is_done(&self) -> bool {
            self.next >= self.batches.len()
        }
        fn is_visible(&self) -> bool {
            self.visible
        }
        fn progress(&self) -> f32 {
            (self.next.min(self.batches.len())) as f32 / self.batches.len().max(1) as f32
        }
    }

    fn scene(clock: Arc<ManualClock>) -> RenderScene {
        RenderScene::new(SceneSchedulerConfig::default(), clock)
    }

    #[test]
    fn test_unlimited_budget_renders_everything() {
        let clock = Arc::new(ManualClock::new(0.0));
        let mut scene = scene(clock.clone());
        scene.add_model(Box::new(ListSource::opaque(1, &[1.0; 10])));
        scene.reset(&ViewInfo::default());

        let mut drawn = Vec::new();
        let left = scene.render_some(
            |b| {
                clock.advance(1.0);
                drawn.push(b.id);
            },
            f32::INFINITY,
        );

        assert_eq!(drawn.len(), 10);
        assert!(scene.is_done());
        assert_eq!(left, f32::INFINITY);
        assert_eq!(scene.stats().rendered, 10);
        assert_eq!(scene.progress(), 1.0);
    }

    #[test]
    fn test_highest_importance_wins_across_models() {
        let clock = Arc::new(ManualClock::new(0.0));
        let mut scene = scene(clock);
        scene.add_model(Box::new(ListSource::opaque(1, &[3.0])));
        scene.add_model(Box::new(ListSource::opaque(2, &[5.0, 1.0])));
        scene.reset(&ViewInfo::default());

        let mut order = Vec::new();
        scene.render_some(|b| order.push((b.model, b.render_importance)), f32::INFINITY);

        assert_eq!(
            order,
            vec![
                (ModelId(2), 5.0),
                (ModelId(1), 3.0),
                (ModelId(2), 1.0)
            ]
        );
    }

    #[test]
    fn test_ties_go_to_first_registered_model() {
        let clock = Arc::new(ManualClock::new(0.0));
        let mut scene = scene(clock);
        scene.add_model(Box::new(ListSource::opaque(1, &[2.0])));
        scene.add_model(Box::new(ListSource::opaque(2, &[2.0])));
        scene.reset(&ViewInfo::default());

        let mut order = Vec::new();
        scene.render_some(|b| order.push(b.model), f32::INFINITY);
        assert_eq!(order, vec![ModelId(1), ModelId(2)]);
    }

    #[test]
    fn test_time_limit_pauses_and_resumes() {
        let clock = Arc::new(ManualClock::new(0.0));
        let mut scene = scene(clock.clone());
        scene.add_model(Box::new(ListSource::opaque(1, &[1.0; 6])));
        scene.reset(&ViewInfo::default());

        let mut count = 0;
        let mut draw = |_: &RenderBatch| {
            clock.advance(2.0);
            count += 1;
        };
        let left = scene.render_some(&mut draw, 5.0);
        assert!(left <= 0.0);
        assert!(!scene.is_done());
        let first = scene.stats().rendered;
        assert_eq!(first, 3);

        // Slots hold the next batch between calls.
        assert!(scene.models[0].candidate.is_some());

        scene.render_some(&mut draw, f32::INFINITY);
        assert!(scene.is_done());
        assert_eq!(count, 6);
    }

    #[test]
    fn test_charges_smoothed_duration() {
        let clock = Arc::new(ManualClock::new(0.0));
        let mut scene = scene(clock.clone());
        scene.add_model(Box::new(ListSource::opaque(1, &[1.0; 3])));
        scene.reset(&ViewInfo::default());

        let costs = [4.0, 8.0, 8.0];
        let mut i = 0;
        let left = scene.render_some(
            |_| {
                clock.advance(costs[i]);
                i += 1;
            },
            100.0,
        );
        // 4, then 0.75*4 + 0.25*8 = 5, then 0.75*5 + 0.25*8 = 5.75
        assert_relative_eq!(left, 100.0 - 4.0 - 5.0 - 5.75);
    }

    #[test]
    fn test_done_is_monotonic_until_reset() {
        let clock = Arc::new(ManualClock::new(0.0));
        let mut scene = scene(clock);
        scene.add_model(Box::new(ListSource::opaque(1, &[1.0])));
        scene.reset(&ViewInfo::default());
        scene.render_some(|_| {}, f32::INFINITY);
        assert!(scene.is_done());

        let mut calls = 0;
        assert_eq!(scene.render_some(|_| calls += 1, 3.0), 3.0);
        assert_eq!(calls, 0);
        assert!(scene.is_done());

        scene.reset(&ViewInfo::default());
        assert!(!scene.is_done());
        scene.render_some(|_| calls += 1, f32::INFINITY);
        assert_eq!(calls, 1);
    }

    #[test]
    fn test_hidden_models_are_skipped() {
        let clock = Arc::new(ManualClock::new(0.0));
        let mut scene = scene(clock);
        let mut hidden = ListSource::opaque(1, &[9.0]);
        hidden.visible = false;
        scene.add_model(Box::new(hidden));
        scene.add_model(Box::new(ListSource::opaque(2, &[1.0])));
        scene.reset(&ViewInfo::default());

        let mut order = Vec::new();
        scene.render_some(|b| order.push(b.model), f32::INFINITY);
        assert_eq!(order, vec![ModelId(2)]);
    }

    #[test]
    fn test_models_join_at_next_reset() {
        let clock = Arc::new(ManualClock::new(0.0));
        let mut scene = scene(clock);
        scene.add_model(Box::new(ListSource::opaque(1, &[1.0])));
        scene.reset(&ViewInfo::default());
        scene.add_model(Box::new(ListSource::opaque(2, &[5.0])));

        let mut order = Vec::new();
        scene.render_some(|b| order.push(b.model), f32::INFINITY);
        assert_eq!(order, vec![ModelId(1)]);

        assert!(scene.remove_model(ModelId(1)).is_some());
        assert!(scene.remove_model(ModelId(1)).is_none());
        assert_eq!(scene.model_count(), 1);
    }

    #[test]
    fn test_non_resumable_defers_and_sorts_transparent() {
        let clock = Arc::new(ManualClock::new(0.0));
        let mut scene = RenderScene::new(
            SceneSchedulerConfig {
                transparency_fraction: 0.1,
                ..Default::default()
            },
            clock.clone(),
        );

        let at = |x: f32| Aabb::from_point(Vec3::new(x, 0.0, 0.0));
        let model = ModelId(1);
        let mut batches: Vec<RenderBatch> = (0..20)
            .map(|i| RenderBatch::new(model, BatchId(i), 100.0 - i as f32))
            .collect();
        batches.push(RenderBatch::new(model, BatchId(100), 1.0).transparent().with_bounds(at(5.0)));
        batches.push(RenderBatch::new(model, BatchId(101), 1.0).transparent().with_bounds(at(50.0)));
        batches.push(RenderBatch::new(model, BatchId(102), 1.0).transparent().with_bounds(at(20.0)));
        scene.add_model(Box::new(ListSource::new(1, batches)));

        scene.set_non_resumable(true);
        scene.reset(&ViewInfo::at(Vec3::ZERO).moving(true));

        let mut drawn = Vec::new();
        scene.render_some(
            |b| {
                clock.advance(1.2);
                drawn.push(b.id);
            },
            10.0,
        );

        // 1ms of the 10ms is reserved. After eight opaque batches only 0.4ms
        // remain and the rest of the opaque content is abandoned.
        let opaque: Vec<_> = drawn.iter().filter(|id| id.0 < 100).collect();
        assert_eq!(opaque.len(), 8);
        assert_eq!(
            &drawn[8..],
            &[BatchId(101), BatchId(102), BatchId(100)],
            "transparent batches are drawn back to front"
        );
        assert!(scene.is_done());
        assert_eq!(scene.stats().opaque_skips, 1);
        assert_eq!(scene.stats().deferred, 3);
    }

    #[test]
    fn test_skipped_opaque_stays_skipped_after_transparent() {
        let clock = Arc::new(ManualClock::new(0.0));
        let mut scene = RenderScene::new(
            SceneSchedulerConfig {
                transparency_fraction: 0.1,
                ..Default::default()
            },
            clock.clone(),
        );

        let at = |x: f32| Aabb::from_point(Vec3::new(x, 0.0, 0.0));
        let model = ModelId(1);
        let mut batches: Vec<RenderBatch> = (0..20)
            .map(|i| RenderBatch::new(model, BatchId(i), 100.0 - i as f32))
            .collect();
        batches.push(RenderBatch::new(model, BatchId(100), 1.0).transparent().with_bounds(at(5.0)));
        // Opaque content interleaved after the first transparent batch.
        batches.push(RenderBatch::new(model, BatchId(50), 1.0));
        batches.push(RenderBatch::new(model, BatchId(101), 1.0).transparent().with_bounds(at(20.0)));
        scene.add_model(Box::new(ListSource::new(1, batches)));

        scene.set_non_resumable(true);
        scene.reset(&ViewInfo::at(Vec3::ZERO).moving(true));

        let mut drawn = Vec::new();
        scene.render_some(
            |b| {
                clock.advance(1.2);
                drawn.push(b.id);
            },
            10.0,
        );

        assert!(!drawn.contains(&BatchId(50)));
        assert_eq!(&drawn[8..], &[BatchId(101), BatchId(100)]);
        assert!(scene.is_done());
        assert_eq!(scene.stats().opaque_skips, 1);
        assert_eq!(scene.stats().deferred, 2);
    }

    #[test]
    fn test_resumable_frame_renders_transparent_inline() {
        let clock = Arc::new(ManualClock::new(0.0));
        let mut scene = scene(clock);
        let model = ModelId(1);
        scene.add_model(Box::new(ListSource::new(
            1,
            vec![
                RenderBatch::new(model, BatchId(0), 1.0).transparent(),
                RenderBatch::new(model, BatchId(1), 1.0),
            ],
        )));
        scene.reset(&ViewInfo::default());

        let mut drawn = Vec::new();
        scene.render_some(|b| drawn.push(b.id), f32::INFINITY);
        assert_eq!(drawn, vec![BatchId(0), BatchId(1)]);
        assert_eq!(scene.stats().deferred, 0);
    }
}
