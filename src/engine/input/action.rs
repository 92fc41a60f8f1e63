// Sandbox input events and the text command syntax that produces them

use glam::Vec2;

/// Discrete events the sandbox reacts to between physics steps
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    /// Stop the simulation loop
    Quit,

    /// Drop a ball at a position in world coordinates
    SpawnBallAt(Vec2),
}

/// Errors produced while parsing a command line
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum InputError {
    #[error("Unknown command: {0}")]
    UnknownCommand(String),

    #[error("Command '{command}' is missing argument '{argument}'")]
    MissingArgument {
        command: &'static str,
        argument: &'static str,
    },

    #[error("Invalid number '{0}'")]
    InvalidNumber(String),
}

/// Parse one line of input
///
/// Accepted forms are `spawn <x> <y>` and `quit`. Blank lines and lines
/// starting with `#` yield `Ok(None)`. Commands are case-insensitive.
pub fn parse_command(line: &str) -> Result<Option<InputEvent>, InputError> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return Ok(None);
    }

    let mut words = line.split_whitespace();
    let Some(command) = words.next() else {
        return Ok(None);
    };

    match command.to_ascii_lowercase().as_str() {
        "quit" | "exit" => Ok(Some(InputEvent::Quit)),
        "spawn" => {
            let x = parse_coordinate(words.next(), "x")?;
            let y = parse_coordinate(words.next(), "y")?;
            Ok(Some(InputEvent::SpawnBallAt(Vec2::new(x, y))))
        }
        _ => Err(InputError::UnknownCommand(command.to_string())),
    }
}

fn parse_coordinate(word: Option<&str>, argument: &'static str) -> Result<f32, InputError> {
    let word = word.ok_or(InputError::MissingArgument {
        command: "spawn",
        argument,
    })?;
    match word.parse::<f32>() {
        Ok(value) if value.is_finite() => Ok(value),
        _ => Err(InputError::InvalidNumber(word.to_string())),
    }
}
