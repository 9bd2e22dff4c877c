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

//! Integration tests for the RenderAgent's mode selection and list execution.
//!
//! These tests drive the agent tick by tick against a recording renderer and
//! a manual clock, checking which commands run in each tick.

mod common;

use approx::assert_relative_eq;
use common::{batches, test_config, Call, Harness, ScriptedPass, ScriptedSource};
use tessera_agents::{RenderMode, ViewerConfig};
use tessera_core::event::ViewerEvent;
use tessera_core::math::Vec3;
use tessera_core::renderer::{BatchId, ModelId, ViewInfo};

fn progressive_with_model(batch_count: u32) -> Harness {
    let mut h = Harness::new(test_config(), 4.0);
    h.agent
        .add_model(Box::new(ScriptedSource::opaque(1, batch_count)));
    h
}

fn idle_with_model(batch_count: u32) -> Harness {
    let mut h = progressive_with_model(batch_count);
    h.run_to_idle(100);
    h.take_calls();
    h.take_events();
    h
}

// ─────────────────────────────────────────────────────────────────────────────
// Progressive renders
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_paused_beauty_pass_still_presents() {
    let mut h = progressive_with_model(4);

    // Tick 1: 10ms budget, 4ms per batch. The third batch overruns.
    h.tick();
    assert_eq!(h.agent.current_mode(), Some(RenderMode::Progressive));
    assert!(h.agent.is_rendering());
    let m = ModelId(1);
    assert_eq!(
        h.take_calls(),
        vec![
            Call::Navigation(false),
            Call::BeginScene { clear: true },
            Call::Batch(m, BatchId(0)),
            Call::Batch(m, BatchId(1)),
            Call::Batch(m, BatchId(2)),
            Call::Overlays,
            Call::Present { partial: true },
        ]
    );
    let events = h.take_events();
    assert_eq!(events[0], ViewerEvent::RenderPresented);
    assert!(matches!(events[1], ViewerEvent::ProgressUpdate { .. }));

    // Tick 2: the beauty pass resumes and the list completes.
    h.tick();
    assert!(!h.agent.is_rendering());
    assert_eq!(
        h.take_calls(),
        vec![
            Call::Navigation(false),
            Call::Batch(m, BatchId(3)),
            Call::Overlays,
            Call::Present { partial: false },
        ]
    );
    assert_eq!(
        h.take_events(),
        vec![
            ViewerEvent::RenderPresented,
            ViewerEvent::ProgressUpdate { percent: 100.0 },
            ViewerEvent::FinalFrameRenderedChanged { finished: true },
        ]
    );
    assert!(h.agent.is_final_frame_rendered());
    // 13ms between ticks is under the 16ms target: the budget grows by 1ms.
    assert_relative_eq!(h.agent.frame_budget_ms(), 11.0);

    // Tick 3: nothing is pending.
    h.tick();
    assert!(h.take_calls().is_empty());
    assert!(h.take_events().is_empty());
    assert_eq!(h.agent.current_mode(), None);
}

#[test]
fn test_new_request_supersedes_render_in_flight() {
    let mut h = progressive_with_model(20);
    h.tick();
    h.tick();
    assert!(h.agent.is_rendering());
    h.take_calls();

    h.agent.invalidate(true, true, false);
    h.tick();

    let calls = h.take_calls();
    assert!(calls.contains(&Call::BeginScene { clear: true }));
    assert_eq!(calls[2], Call::Batch(ModelId(1), BatchId(0)));
    assert_eq!(h.agent.commands().tick(), 1);
}

#[test]
fn test_progressive_ticks_calibrate_budget() {
    let mut h = Harness::new(test_config(), 20.0);
    h.agent.add_model(Box::new(ScriptedSource::opaque(1, 200)));
    for _ in 0..20 {
        h.tick();
    }
    assert!(h.agent.frame_stats().samples > 0);
    // Every tick overruns the 16ms target by a wide margin.
    assert!(h.agent.frame_budget_ms() < 10.0);
}

#[test]
fn test_budget_adapts_while_navigating() {
    let mut h = progressive_with_model(100);
    for i in 0..30 {
        // Every tick starts a new progressive list.
        h.agent
            .set_camera(ViewInfo::at(Vec3::new(i as f32, 0.0, 0.0)).moving(true));
        h.tick();
        h.clock.advance(29.0);
    }
    assert!(h.agent.frame_stats().samples > 0);
    // About 42ms between ticks, far over the 16ms target.
    assert!(h.agent.frame_budget_ms() < 10.0);
}

#[test]
fn test_idle_time_does_not_calibrate_budget() {
    let mut h = idle_with_model(4);
    let samples = h.agent.frame_stats().samples;
    let budget = h.agent.frame_budget_ms();

    h.clock.advance(5000.0);
    h.agent.invalidate(true, true, false);
    h.tick();

    assert_eq!(h.agent.frame_stats().samples, samples);
    assert_relative_eq!(h.agent.frame_budget_ms(), budget);
}

#[test]
fn test_budget_stays_bounded_under_extreme_frames() {
    let mut h = Harness::new(test_config(), 500.0);
    h.agent.add_model(Box::new(ScriptedSource::opaque(1, 1000)));
    for _ in 0..100 {
        h.tick();
        let budget = h.agent.frame_budget_ms();
        assert!((2.0..=30.0).contains(&budget), "budget {budget} out of bounds");
    }
    assert_eq!(h.agent.frame_budget_ms(), 2.0);
}

// ─────────────────────────────────────────────────────────────────────────────
// Full renders
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_full_render_completes_in_one_tick() {
    let config = ViewerConfig {
        progressive_rendering: false,
        ..test_config()
    };
    let mut h = Harness::new(config, 4.0);
    h.agent.add_model(Box::new(ScriptedSource::opaque(1, 50)));

    h.tick();

    assert!(!h.agent.is_rendering());
    let calls = h.take_calls();
    assert_eq!(batches(&calls), 50);
    assert_eq!(calls.last(), Some(&Call::Present { partial: false }));
    assert!(h.agent.is_final_frame_rendered());
}

#[test]
fn test_full_render_generates_ground_before_beauty() {
    let config = ViewerConfig {
        progressive_rendering: false,
        ..test_config()
    };
    let mut h = Harness::build(config, 4.0, |agent| {
        agent.with_ground_shadow(Box::new(ScriptedPass::new("ground_shadow", 5.0)))
    });
    h.agent.add_model(Box::new(ScriptedSource::opaque(1, 2)));

    h.tick();
    assert!(!h.agent.is_rendering());
    assert!(!h.agent.invalidation().deferred_silent_pending());
}

// ─────────────────────────────────────────────────────────────────────────────
// Silent renders
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_silent_render_presents_only_when_complete() {
    let mut h = idle_with_model(20);

    h.agent.request_silent_render();
    let ticks = h.run_to_idle(100);
    assert!(ticks > 1);

    let calls = h.take_calls();
    assert_eq!(calls[1], Call::BeginScene { clear: true });
    let presents: Vec<_> = calls
        .iter()
        .filter(|c| matches!(c, Call::Present { .. }))
        .collect();
    assert_eq!(presents, vec![&Call::Present { partial: false }]);
    assert_eq!(calls.last(), Some(&Call::Present { partial: false }));
    assert_eq!(batches(&calls), 20);

    let events = h.take_events();
    assert_eq!(
        events.first(),
        Some(&ViewerEvent::FinalFrameRenderedChanged { finished: false })
    );
    assert_eq!(
        events.last(),
        Some(&ViewerEvent::FinalFrameRenderedChanged { finished: true })
    );
}

#[test]
fn test_scene_change_cancels_pending_silent_render() {
    let mut h = idle_with_model(20);

    h.agent.request_silent_render();
    h.agent.invalidate(false, true, false);
    h.tick();

    assert_eq!(h.agent.current_mode(), Some(RenderMode::Progressive));
    assert!(!h.agent.invalidation().silent_pending());
}

#[test]
fn test_deferred_silent_render_waits_for_idle() {
    let mut h = idle_with_model(20);

    h.agent.invalidate(false, true, false);
    h.tick();
    h.agent.request_deferred_silent_render();
    h.tick();
    assert_eq!(h.agent.current_mode(), Some(RenderMode::Progressive));

    h.run_to_idle(100);
    assert!(h.agent.invalidation().deferred_silent_pending());

    h.tick();
    assert_eq!(h.agent.current_mode(), Some(RenderMode::Silent));
    assert!(!h.agent.invalidation().deferred_silent_pending());
}

#[test]
fn test_late_ground_completion_schedules_silent_render() {
    let mut h = Harness::build(test_config(), 4.0, |agent| {
        agent.with_ground_shadow(Box::new(ScriptedPass::new("ground_shadow", 5.0)))
    });
    h.agent.add_model(Box::new(ScriptedSource::opaque(1, 1)));

    // 10ms budget: one 4ms batch, then the 5ms ground shadow.
    h.tick();
    assert!(!h.agent.is_rendering());
    assert!(h.agent.invalidation().deferred_silent_pending());

    h.tick();
    assert_eq!(h.agent.current_mode(), None, "silent render finished in one tick");
    assert!(!h.agent.invalidation().any_pending());

    // The ground shadow is up to date, so no further render follows.
    h.take_calls();
    h.tick();
    assert!(h.take_calls().is_empty());
}

#[test]
fn test_late_ground_rerender_can_be_disabled() {
    let config = ViewerConfig {
        rerender_after_late_ground: false,
        ..test_config()
    };
    let mut h = Harness::build(config, 4.0, |agent| {
        agent.with_ground_reflection(Box::new(ScriptedPass::new("ground_reflection", 5.0)))
    });
    h.agent.add_model(Box::new(ScriptedSource::opaque(1, 1)));

    h.tick();
    assert!(!h.agent.is_rendering());
    assert!(!h.agent.invalidation().deferred_silent_pending());
}

#[test]
fn test_unfinished_ground_pass_keeps_list_running() {
    let mut h = Harness::build(test_config(), 4.0, |agent| {
        agent.with_ground_shadow(Box::new(ScriptedPass::new("ground_shadow", 25.0)))
    });
    h.agent.add_model(Box::new(ScriptedSource::opaque(1, 1)));

    h.tick();
    assert!(h.agent.is_rendering());
    assert!(!h.agent.is_final_frame_rendered());

    h.run_to_idle(20);
    assert!(h.agent.is_final_frame_rendered());
    assert!(h.agent.invalidation().deferred_silent_pending());
}

// ─────────────────────────────────────────────────────────────────────────────
// Overlay refreshes
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_overlay_change_uses_two_command_list() {
    let mut h = idle_with_model(4);

    h.agent.invalidate(false, false, true);
    h.tick();

    assert_eq!(
        h.take_calls(),
        vec![Call::Overlays, Call::Present { partial: false }]
    );
    assert_eq!(h.take_events(), vec![ViewerEvent::RenderPresented]);
    assert!(!h.agent.is_rendering());
    assert!(h.agent.is_final_frame_rendered());
}

#[test]
fn test_overlay_change_during_progressive_render_is_absorbed() {
    let mut h = progressive_with_model(20);
    h.tick();
    h.agent.invalidate(false, false, true);
    h.tick();
    assert!(!h.agent.invalidation().overlay_pending());

    h.run_to_idle(100);
    h.take_calls();
    h.tick();
    assert!(h.take_calls().is_empty());
}

#[test]
fn test_overlay_change_during_silent_render_shown_after() {
    let mut h = idle_with_model(20);

    h.agent.request_silent_render();
    h.tick();
    h.agent.invalidate(false, false, true);
    h.run_to_idle(100);
    assert!(h.agent.invalidation().overlay_pending());

    h.take_calls();
    h.tick();
    assert_eq!(
        h.take_calls(),
        vec![Call::Overlays, Call::Present { partial: false }]
    );
}
