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

//! # Command Abstraction
//!
//! The vocabulary shared by command lists and the handlers that execute them.
//!
//! A command list is an ordered sequence of operations of some type `C`
//! (usually a fieldless enum), each tagged with a [`CommandLevel`] and owning a
//! [`CommandParams`] slot written while the list is built. The executor walks
//! the list once per tick and hands each operation to a [`CommandHandler`]
//! together with a [`CommandContext`].
//!
//! ## Pausing
//!
//! Handlers report [`CommandStatus::Paused`] when they ran out of time. The
//! executor then stops running [`CommandLevel::NormalSequence`] commands for
//! the rest of the tick and resumes at the paused command on the next one.
//!
//! ```rust,ignore
//! impl CommandHandler<MyCommand> for MyStages {
//!     fn execute(&mut self, cmd: MyCommand, ctx: &mut CommandContext<'_>)
//!         -> Result<CommandStatus, CommandError>
//!     {
//!         match cmd {
//!             MyCommand::Draw => {
//!                 let left = self.scene.render_some(ctx.time_remaining());
//!                 ctx.set_time_remaining(left);
//!                 Ok(CommandStatus::paused_unless(self.scene.is_done()))
//!             }
//!         }
//!     }
//! }
//! ```

mod params;

pub use self::params::{CommandParams, ParamValue};

use crate::renderer::RenderError;
use thiserror::Error;

/// How a command participates in a tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CommandLevel {
    /// Runs in list order; skipped for the rest of the tick once a command pauses.
    #[default]
    NormalSequence,
    /// Runs every tick it is reached, even after an earlier command paused.
    DoAfter,
    /// Runs first, every tick, unconditionally. Never pauses.
    AlwaysDo,
}

/// Result of executing one command for one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandStatus {
    /// The command completed its work.
    Finished,
    /// The command needs more time; resume here next tick.
    Paused,
}

impl CommandStatus {
    /// `Finished` if `done`, `Paused` otherwise.
    #[inline]
    pub fn paused_unless(done: bool) -> Self {
        if done {
            CommandStatus::Finished
        } else {
            CommandStatus::Paused
        }
    }

    /// Returns `true` for [`CommandStatus::Paused`].
    #[inline]
    pub fn is_paused(self) -> bool {
        self == CommandStatus::Paused
    }
}

/// A failure inside a command handler.
///
/// The executor logs these and treats the command as paused.
#[derive(Debug, Error)]
pub enum CommandError {
    /// A collaborator failed.
    #[error(transparent)]
    Render(#[from] RenderError),
    /// A required collaborator is not attached.
    #[error("collaborator '{0}' is not attached")]
    MissingCollaborator(&'static str),
    /// Any other failure.
    #[error("{0}")]
    Failed(String),
}

/// Everything a command may read or mutate besides its handler's own state.
pub struct CommandContext<'a> {
    params: &'a CommandParams,
    tick: u32,
    time_remaining_ms: &'a mut f32,
}

impl<'a> CommandContext<'a> {
    /// Creates a context for one command invocation.
    pub fn new(params: &'a CommandParams, tick: u32, time_remaining_ms: &'a mut f32) -> Self {
        Self {
            params,
            tick,
            time_remaining_ms,
        }
    }

    /// Parameters written into this command's slot when the list was built.
    #[inline]
    pub fn params(&self) -> &CommandParams {
        self.params
    }

    /// 0-based index of the current tick within the list's lifetime.
    #[inline]
    pub fn tick(&self) -> u32 {
        self.tick
    }

    /// Returns `true` during the first tick of the list.
    #[inline]
    pub fn is_first_tick(&self) -> bool {
        self.tick == 0
    }

    /// Milliseconds left in this tick's budget.
    #[inline]
    pub fn time_remaining(&self) -> f32 {
        *self.time_remaining_ms
    }

    /// Overwrites the remaining time, usually with a value returned by a
    /// budget-limited collaborator.
    #[inline]
    pub fn set_time_remaining(&mut self, ms: f32) {
        *self.time_remaining_ms = ms;
    }

    /// Returns `true` once the budget is spent.
    #[inline]
    pub fn is_out_of_time(&self) -> bool {
        *self.time_remaining_ms <= 0.0
    }
}

/// Executes commands of type `C`.
///
/// The handler is the explicit home of every collaborator a command needs;
/// commands themselves carry no state besides their parameters.
pub trait CommandHandler<C> {
    /// Runs `command` for the current tick.
    fn execute(
        &mut self,
        command: C,
        ctx: &mut CommandContext<'_>,
    ) -> Result<CommandStatus, CommandError>;
}
