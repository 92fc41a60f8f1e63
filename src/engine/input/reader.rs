// Background thread turning lines of text into input events

use super::action::{parse_command, InputEvent};
use std::io::BufRead;
use std::sync::mpsc::{self, Receiver};
use std::thread::{self, JoinHandle};

/// Read commands from `reader` on a new thread
///
/// Parsed events are sent over the returned channel; malformed lines are
/// logged and skipped. End of input or a read error sends a final `Quit`.
pub fn spawn_reader<R>(reader: R) -> std::io::Result<(Receiver<InputEvent>, JoinHandle<()>)>
where
    R: BufRead + Send + 'static,
{
    let (sender, receiver) = mpsc::channel();

    let handle = thread::Builder::new()
        .name("input-reader".to_string())
        .spawn(move || {
            for line in reader.lines() {
                let line = match line {
                    Ok(line) => line,
                    Err(e) => {
                        log::warn!("Failed to read input: {}", e);
                        break;
                    }
                };

                match parse_command(&line) {
                    Ok(Some(event)) => {
                        let quit = event == InputEvent::Quit;
                        if sender.send(event).is_err() || quit {
                            return;
                        }
                    }
                    Ok(None) => {}
                    Err(e) => log::warn!("Ignoring input line: {}", e),
                }
            }

            log::info!("Input closed");
            let _ = sender.send(InputEvent::Quit);
        })?;

    Ok((receiver, handle))
}

/// Read commands from standard input
pub fn spawn_stdin_reader() -> std::io::Result<(Receiver<InputEvent>, JoinHandle<()>)> {
    spawn_reader(std::io::BufReader::new(std::io::stdin()))
}
