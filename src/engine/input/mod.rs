// Input handling system
//
// Commands arrive as text lines, get parsed on a reader thread, and are queued
// in a bounded buffer that the simulation thread drains once per frame.
//
// - `action`: input events and the command parser
// - `buffer`: bounded per-frame event queue
// - `reader`: background line reader feeding an mpsc channel

pub mod action;
pub mod buffer;
pub mod reader;

// Re-export commonly used types
pub use action::{parse_command, InputError, InputEvent};
pub use buffer::EventBuffer;
pub use reader::{spawn_reader, spawn_stdin_reader};
