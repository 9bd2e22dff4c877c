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

//! Rolling storage for measured frame times.

/// A snapshot of recent frame timing.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FrameStats {
    /// Number of samples in the window.
    pub samples: usize,
    /// Mean frame time, in milliseconds.
    pub average_ms: f32,
    /// Variance of the frame time; high values indicate stutter.
    pub variance: f32,
    /// Fastest frame in the window.
    pub min_ms: f32,
    /// Slowest frame in the window.
    pub max_ms: f32,
}

/// A fixed-size circular buffer of frame durations.
///
/// Holds the last `N` samples (120 by default, about two seconds at 60Hz).
#[derive(Debug, Clone)]
pub struct FrameTimeHistory<const N: usize = 120> {
    data: [f32; N],
    index: usize,
    count: usize,
}

impl<const N: usize> FrameTimeHistory<N> {
    /// Creates an empty history.
    pub fn new() -> Self {
        Self {
            data: [0.0; N],
            index: 0,
            count: 0,
        }
    }

    /// Records a sample, overwriting the oldest one if full.
    pub fn push(&mut self, frame_ms: f32) {
        if N == 0 {
            return;
        }
        self.data[self.index] = frame_ms;
        self.index = (self.index + 1) % N;
        self.count = (self.count + 1).min(N);
    }

    /// Number of samples currently stored.
    pub fn len(&self) -> usize {
        self.count
    }

    /// Returns `true` if nothing was recorded yet.
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Forgets every sample.
    pub fn clear(&mut self) {
        self.index = 0;
        self.count = 0;
    }

    /// Iterates over the samples from oldest to newest.
    pub fn iter(&self) -> impl Iterator<Item = f32> + '_ {
        let start = if self.count < N { 0 } else { self.index };
        (0..self.count).map(move |i| self.data[(start + i) % N])
    }

    /// Arithmetic mean of the window, `0.0` when empty.
    pub fn average(&self) -> f32 {
        if self.count == 0 {
            return 0.0;
        }
        self.iter().sum::<f32>() / self.count as f32
    }

    /// Population variance of the window, `0.0` below two samples.
    pub fn variance(&self) -> f32 {
        if self.count < 2 {
            return 0.0;
        }
        let avg = self.average();
        self.iter().map(|v| (v - avg) * (v - avg)).sum::<f32>() / self.count as f32
    }

    /// Summarizes the window.
    pub fn stats(&self) -> FrameStats {
        if self.count == 0 {
            return FrameStats::default();
        }
        FrameStats {
            samples: self.count,
            average_ms: self.average(),
            variance: self.variance(),
            min_ms: self.iter().fold(f32::MAX, f32::min),
            max_ms: self.iter().fold(f32::MIN, f32::max),
        }
    }
}

impl<const N: usize> Default for FrameTimeHistory<N> {
    fn default() -> Self {
        Self::new()
    }
}
