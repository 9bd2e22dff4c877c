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

//! Errors reported by rendering collaborators.

use thiserror::Error;

/// A failure surfaced by a renderer or auxiliary pass.
///
/// The scheduler never escalates these: a command that receives one logs it
/// and stays parked until the list is superseded.
#[derive(Debug, Error)]
pub enum RenderError {
    /// The graphics context was lost and must be restored before rendering resumes.
    #[error("graphics context lost")]
    ContextLost,
    /// A pass failed for a backend-specific reason.
    #[error("{pass} pass failed: {reason}")]
    PassFailed {
        /// Name of the failing pass.
        pass: &'static str,
        /// Backend-provided description.
        reason: String,
    },
    /// Any other backend failure.
    #[error("backend error: {0}")]
    Backend(String),
}
