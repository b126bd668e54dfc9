// SpecHack
// copyright zipxing@hotmail.com 2022～2025

//! Input events of the reveal scene.
//!
//! Pointer and device orientation input from whatever hosts the scene is
//! converted into a unified InputEvent and queued. The queue only accepts
//! events while it is attached, so a detached (unmounted) scene never sees
//! late input.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InputEvent {
    PointerDown { id: u32, x: f64, y: f64, t_ms: f64 },
    PointerMove { id: u32, x: f64, y: f64, t_ms: f64 },
    PointerUp { id: u32, x: f64, y: f64, t_ms: f64 },
    /// angles in degrees, None when the sensor did not report one
    DeviceOrientation { beta: Option<f64>, gamma: Option<f64> },
}

impl InputEvent {
    pub fn is_pointer(&self) -> bool {
        !matches!(self, InputEvent::DeviceOrientation { .. })
    }
}

#[derive(Debug, Default)]
pub struct EventQueue {
    events: Vec<InputEvent>,
    attached: bool,
}

impl EventQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn attach(&mut self) {
        self.attached = true;
    }

    /// Detach and drop anything still queued.
    pub fn detach(&mut self) {
        self.attached = false;
        self.events.clear();
    }

    pub fn is_attached(&self) -> bool {
        self.attached
    }

    /// Returns false when the event was dropped.
    pub fn push(&mut self, e: InputEvent) -> bool {
        if self.attached {
            self.events.push(e);
        }
        self.attached
    }

    pub fn drain(&mut self) -> Vec<InputEvent> {
        std::mem::take(&mut self.events)
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
    fn detached_queue_drops() {
        let mut q = EventQueue::new();
        let e = InputEvent::PointerDown {
            id: 1,
            x: 0.0,
            y: 0.0,
            t_ms: 0.0,
        };
        assert!(!q.push(e));
        q.attach();
        assert!(q.push(e));
        assert_eq!(q.len(), 1);
        q.detach();
        assert!(q.is_empty());
    }

    #[test]
    fn events_read_from_json() {
        let e: InputEvent =
            serde_json::from_str(r#"{"type":"device_orientation","beta":10.0,"gamma":null}"#)
                .unwrap();
        assert_eq!(
            e,
            InputEvent::DeviceOrientation {
                beta: Some(10.0),
                gamma: None
            }
        );
        assert!(!e.is_pointer());
    }
}
