// UI module - line-based terminal front end
//
// This module contains:
// - command: Per-screen command parsing
// - render: Plain-text screens for every session type
// - ConsoleController: Event loop wiring input, timers and speech to the engine

pub mod command;
pub mod console;
pub mod render;

pub use command::{Command, CommandError, ListDisplay, Screen};
pub use console::{ConsoleController, Flow, ShellEvent, spawn_line_reader, spawn_speech_forwarder};
