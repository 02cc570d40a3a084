//! Input and configuration events buffered between frames.
//!
//! Window callbacks and the parameter panel push [`SceneEvent`]s; the frame
//! loop drains the queue once, before any animation or hit-testing, so the
//! whole frame sees one consistent snapshot of the inputs.

use std::collections::VecDeque;

use crate::config::Visibility;
use crate::galaxy::GalaxyParameters;

#[derive(Debug, Clone, PartialEq)]
pub enum SceneEvent {
    /// Cursor position in physical pixels from the window's top-left corner
    PointerMoved { x: f32, y: f32 },
    /// Scroll by a number of pixels; positive scrolls down the page
    Scrolled { delta: f32 },
    /// New surface size in physical pixels
    Resized {
        width: u32,
        height: u32,
        scale_factor: f64,
    },
    /// Replace the galaxy with one generated from these parameters
    ParametersChanged(GalaxyParameters),
    /// Show or hide already-inserted objects
    VisibilityChanged(Visibility),
}

/// FIFO of pending events
#[derive(Debug, Default)]
pub struct EventQueue {
    events: VecDeque<SceneEvent>,
}

impl EventQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, event: SceneEvent) {
        self.events.push_back(event);
    }

    /// Removes and returns every queued event in arrival order
    pub fn drain(&mut self) -> std::collections::vec_deque::IntoIter<SceneEvent> {
        std::mem::take(&mut self.events).into_iter()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_drain_preserves_order_and_empties() {
        let mut queue = EventQueue::new();
        queue.push(SceneEvent::Scrolled { delta: 10.0 });
        queue.push(SceneEvent::PointerMoved { x: 1.0, y: 2.0 });

        let events: Vec<_> = queue.drain().collect();
        assert_eq!(
            events,
            vec![
                SceneEvent::Scrolled { delta: 10.0 },
                SceneEvent::PointerMoved { x: 1.0, y: 2.0 },
            ]
        );
        assert!(queue.is_empty());
    }

    #[test]
    fn test_events_pushed_after_drain_wait_for_next_frame() {
        let mut queue = EventQueue::new();
        queue.push(SceneEvent::Scrolled { delta: 1.0 });
        let drained = queue.drain();
        queue.push(SceneEvent::Scrolled { delta: 2.0 });

        assert_eq!(drained.count(), 1);
        assert_eq!(queue.len(), 1);
    }
}
