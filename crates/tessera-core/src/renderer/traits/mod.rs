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

//! Traits implemented by rendering collaborators.

mod batch_source;
mod progressive_pass;
mod scene_renderer;

pub use self::batch_source::BatchSource;
pub use self::progressive_pass::ProgressivePass;
pub use self::scene_renderer::SceneRenderer;
