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

//! The command list and its tick-driven interpreter.
//!
//! ## Lifecycle
//!
//! ```text
//! begin() → [ add_command() → set_param()* ]* → end() → [ execute_tick() ]*
//! ```
//!
//! A list stays *active* from `end()` until a tick completes every command,
//! or until [`CommandList::discard`] drops it. Only one list can be active:
//! `begin()` on an active, incomplete list is rejected.

use std::fmt::Debug;
use tessera_core::command::{
    CommandContext, CommandHandler, CommandLevel, CommandParams, CommandStatus, ParamValue,
};
use thiserror::Error;

/// Misuse of the command list building API.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum CommandListError {
    /// `begin()` was called while a previous list is still incomplete.
    #[error("a command list is still active; finish or discard it first")]
    AlreadyActive,
    /// `begin()` was called while a list is being built.
    #[error("a command list is already being built")]
    AlreadyBuilding,
    /// A building call was made outside `begin()` / `end()`.
    #[error("no command list is being built")]
    NotBuilding,
}

/// Summary of the last [`CommandList::execute_tick`] call.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TickReport {
    /// Tick index the report describes.
    pub tick: u32,
    /// Number of command invocations, ALWAYS_DO commands included.
    pub executed: usize,
    /// Index of the command the list will resume at, if it paused.
    pub paused_at: Option<usize>,
    /// Budget left once every command ran.
    pub time_remaining_ms: f32,
}

impl TickReport {
    /// Returns `true` if the list completed during this tick.
    pub fn is_finished(&self) -> bool {
        self.paused_at.is_none()
    }
}

#[derive(Debug)]
struct CommandSlot<C> {
    command: C,
    level: CommandLevel,
    params: CommandParams,
}

/// An ordered, resumable list of commands of type `C`.
///
/// Slots and their parameter maps are kept across builds and reused, so
/// rebuilding a list of similar length every few frames does not allocate.
#[derive(Debug)]
pub struct CommandList<C> {
    slots: Vec<CommandSlot<C>>,
    // Committed commands. The open slot, if any, sits at index `len`.
    len: usize,
    open_slot: Option<usize>,
    building: bool,
    active: bool,
    has_always_do: bool,
    cursor: usize,
    restart_index: usize,
    tick: u32,
    last_report: TickReport,
}

impl<C: Copy + Debug> CommandList<C> {
    /// Creates an empty, inactive list.
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            len: 0,
            open_slot: None,
            building: false,
            active: false,
            has_always_do: false,
            cursor: 0,
            restart_index: 0,
            tick: 0,
            last_report: TickReport::default(),
        }
    }

    /// Starts building a new list, resetting the cursor and aggregate flags.
    pub fn begin(&mut self) -> Result<(), CommandListError> {
        if self.building {
            log::warn!("CommandList: begin() while a list is being built.");
            debug_assert!(false, "begin() while a list is being built");
            return Err(CommandListError::AlreadyBuilding);
        }
        if self.active {
            log::warn!("CommandList: begin() while the previous list is incomplete.");
            debug_assert!(false, "begin() while the previous list is incomplete");
            return Err(CommandListError::AlreadyActive);
        }
        self.building = true;
        self.len = 0;
        self.open_slot = None;
        self.has_always_do = false;
        self.cursor = 0;
        self.restart_index = 0;
        self.tick = 0;
        Ok(())
    }

    /// Appends `command` and returns its index.
    ///
    /// Opening the new slot commits the previously open one.
    pub fn add_command(
        &mut self,
        command: C,
        level: CommandLevel,
    ) -> Result<usize, CommandListError> {
        if !self.building {
            debug_assert!(false, "add_command() outside begin()/end()");
            return Err(CommandListError::NotBuilding);
        }
        self.commit_open_slot();

        let index = self.len;
        match self.slots.get_mut(index) {
            Some(slot) => {
                slot.command = command;
                slot.level = level;
                slot.params.clear();
            }
            None => self.slots.push(CommandSlot {
                command,
                level,
                params: CommandParams::new(),
            }),
        }
        self.open_slot = Some(index);
        self.has_always_do |= level == CommandLevel::AlwaysDo;
        Ok(index)
    }

    /// Writes a parameter into the most recently added command.
    pub fn set_param(
        &mut self,
        name: &'static str,
        value: impl Into<ParamValue>,
    ) -> Result<(), CommandListError> {
        match self.open_slot {
            Some(index) if self.building => {
                self.slots[index].params.set(name, value);
                Ok(())
            }
            _ => {
                debug_assert!(false, "set_param('{name}') with no open command");
                Err(CommandListError::NotBuilding)
            }
        }
    }

    /// Closes the last slot. The list becomes immutable and active.
    pub fn end(&mut self) -> Result<(), CommandListError> {
        if !self.building {
            debug_assert!(false, "end() without begin()");
            return Err(CommandListError::NotBuilding);
        }
        self.commit_open_slot();
        self.building = false;
        self.active = true;
        Ok(())
    }

    /// Drops the current list, finished or not, so a new one can begin.
    pub fn discard(&mut self) {
        if self.active || self.building {
            log::debug!(
                "CommandList: discarding list of {} commands at index {}.",
                self.len,
                self.restart_index
            );
        }
        self.building = false;
        self.active = false;
        self.open_slot = None;
        self.len = 0;
        self.restart_index = 0;
        self.cursor = 0;
    }

    /// Runs the list for one tick with `budget_ms` to spend.
    ///
    /// Returns `true` once every command has completed (or if no list is
    /// active), `false` if execution must resume next tick.
    pub fn execute_tick<H>(&mut self, handler: &mut H, budget_ms: f32) -> bool
    where
        H: CommandHandler<C> + ?Sized,
    {
        if !self.active {
            return true;
        }
        if self.building {
            debug_assert!(false, "execute_tick() called while building");
            log::error!("CommandList: execute_tick() called while building.");
            return false;
        }

        let tick = self.tick;
        let mut remaining = budget_ms;
        let mut executed = 0;

        if self.has_always_do {
            for index in 0..self.len {
                let slot = &self.slots[index];
                if slot.level != CommandLevel::AlwaysDo {
                    continue;
                }
                self.cursor = index;
                if Self::run_slot(slot, handler, tick, &mut remaining).is_paused() {
                    log::debug!(
                        "CommandList: always-do command {:?} asked to pause; ignored.",
                        slot.command
                    );
                }
                executed += 1;
            }
        }

        let mut paused_at = None;
        for index in self.restart_index..self.len {
            let slot = &self.slots[index];
            match slot.level {
                CommandLevel::AlwaysDo => continue,
                CommandLevel::NormalSequence if paused_at.is_some() => continue,
                _ => {}
            }
            self.cursor = index;
            let status = Self::run_slot(slot, handler, tick, &mut remaining);
            executed += 1;
            if status.is_paused() && paused_at.is_none() {
                paused_at = Some(index);
            }
        }

        self.tick += 1;
        self.last_report = TickReport {
            tick,
            executed,
            paused_at,
            time_remaining_ms: remaining,
        };
        log::trace!("CommandList: {:?}", self.last_report);

        match paused_at {
            Some(index) => {
                self.restart_index = index;
                false
            }
            None => {
                self.active = false;
                self.restart_index = 0;
                true
            }
        }
    }

    fn run_slot<H>(
        slot: &CommandSlot<C>,
        handler: &mut H,
        tick: u32,
        remaining: &mut f32,
    ) -> CommandStatus
    where
        H: CommandHandler<C> + ?Sized,
    {
        let mut ctx = CommandContext::new(&slot.params, tick, remaining);
        match handler.execute(slot.command, &mut ctx) {
            Ok(status) => status,
            Err(e) => {
                log::error!("Command {:?} failed: {e}", slot.command);
                CommandStatus::Paused
            }
        }
    }

    fn commit_open_slot(&mut self) {
        if let Some(index) = self.open_slot.take() {
            self.len = index + 1;
        }
    }

    /// Returns `true` from `end()` until the list completes or is discarded.
    #[inline]
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Returns `true` between `begin()` and `end()`.
    #[inline]
    pub fn is_building(&self) -> bool {
        self.building
    }

    /// Number of committed commands.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if no command is committed.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Ticks executed since `begin()`.
    #[inline]
    pub fn tick(&self) -> u32 {
        self.tick
    }

    /// Index the next tick resumes at.
    #[inline]
    pub fn restart_index(&self) -> usize {
        self.restart_index
    }

    /// Index of the command executed most recently.
    #[inline]
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Returns `true` if any committed command is ALWAYS_DO.
    #[inline]
    pub fn has_always_do(&self) -> bool {
        self.has_always_do
    }

    /// Summary of the last executed tick.
    pub fn last_report(&self) -> &TickReport {
        &self.last_report
    }

    /// Iterates over the committed commands and their levels.
    pub fn commands(&self) -> impl Iterator<Item = (C, CommandLevel)> + '_ {
        self.slots[..self.len].iter().map(|s| (s.command, s.level))
    }

    /// Parameters of the committed command at `index`.
    pub fn params(&self, index: usize) -> Option<&CommandParams> {
        self.slots[..self.len].get(index).map(|s| &s.params)
    }
}

impl<C: Copy + Debug> Default for CommandList<C> {
    fn default() -> Self {
        Self::new()
    }
}
