// Bounded queue of input events waiting for the next frame

use super::action::InputEvent;
use std::collections::VecDeque;

/// Maximum number of buffered events to store
const MAX_BUFFER_SIZE: usize = 64;

/// Event buffer drained once per frame on the simulation thread
///
/// When full, the oldest event is dropped. `Quit` is never dropped.
#[derive(Debug)]
pub struct EventBuffer {
    buffer: VecDeque<InputEvent>,
    capacity: usize,
    dropped: u64,
}

impl EventBuffer {
    /// Create a new event buffer
    pub fn new() -> Self {
        Self::with_capacity(MAX_BUFFER_SIZE)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            buffer: VecDeque::with_capacity(capacity),
            capacity,
            dropped: 0,
        }
    }

    /// Add an event to the buffer
    pub fn push(&mut self, event: InputEvent) {
        self.buffer.push_back(event);

        // Keep buffer size under control
        if self.buffer.len() > self.capacity {
            let victim = self
                .buffer
                .iter()
                .position(|event| *event != InputEvent::Quit);
            if let Some(index) = victim {
                self.buffer.remove(index);
                self.dropped += 1;
                log::warn!("Input buffer full, dropped an event");
            }
        }
    }

    /// Take every buffered event in arrival order
    pub fn drain(&mut self) -> impl Iterator<Item = InputEvent> + '_ {
        self.buffer.drain(..)
    }

    /// Get the number of buffered events
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    /// Check if the buffer is empty
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Number of events dropped because the buffer was full
    pub fn dropped(&self) -> u64 {
        self.dropped
    }
}

impl Default for EventBuffer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec2;

    fn spawn(x: f32) -> InputEvent {
        InputEvent::SpawnBallAt(Vec2::new(x, 0.0))
    }

    #[test]
    fn test_buffer_creation() {
        let buffer = EventBuffer::new();
        assert!(buffer.is_empty());
        assert_eq!(buffer.len(), 0);
    }

    #[test]
    fn test_drain_keeps_order() {
        let mut buffer = EventBuffer::new();
        buffer.push(spawn(1.0));
        buffer.push(spawn(2.0));
        buffer.push(InputEvent::Quit);

        let events: Vec<_> = buffer.drain().collect();
        assert_eq!(events, vec![spawn(1.0), spawn(2.0), InputEvent::Quit]);
        assert!(buffer.is_empty());
    }

    #[test]
    fn test_buffer_max_size() {
        let mut buffer = EventBuffer::with_capacity(3);
        for i in 0..5 {
            buffer.push(spawn(i as f32));
        }

        assert_eq!(buffer.len(), 3);
        assert_eq!(buffer.dropped(), 2);
        let events: Vec<_> = buffer.drain().collect();
        assert_eq!(events, vec![spawn(2.0), spawn(3.0), spawn(4.0)]);
    }

    #[test]
    fn test_quit_survives_overflow() {
        let mut buffer = EventBuffer::with_capacity(2);
        buffer.push(InputEvent::Quit);
        buffer.push(spawn(1.0));
        buffer.push(spawn(2.0));

        let events: Vec<_> = buffer.drain().collect();
        assert_eq!(events, vec![InputEvent::Quit, spawn(2.0)]);
    }
}
