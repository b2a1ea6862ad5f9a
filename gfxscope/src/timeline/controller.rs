//! Ownership of the single active detailed view.
//!
//! ```text
//!            activate(view)
//!   ┌──────┐ ───────────────▶ ┌────────┐
//!   │ Idle │                  │ Active │ ── activate(other): old view handed back
//!   └──────┘ ◀─────────────── └────────┘
//!     dismiss / Escape / Enter / click outside
//! ```
//!
//! Every dismissal path goes through [`TimelineController::dismiss`], which
//! moves the view out of the controller. The caller receives the view by
//! value and tears it down; a second trigger for the same view finds the
//! controller idle and gets nothing back.

use log::debug;

/// Keys the timeline reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Escape,
    Enter,
    Other,
}

/// Holds at most one active detailed view.
#[derive(Debug)]
pub struct TimelineController<V> {
    active: Option<V>,
}

impl<V> Default for TimelineController<V> {
    fn default() -> Self {
        Self { active: None }
    }
}

impl<V> TimelineController<V> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    #[must_use]
    pub fn active(&self) -> Option<&V> {
        self.active.as_ref()
    }

    pub fn active_mut(&mut self) -> Option<&mut V> {
        self.active.as_mut()
    }

    /// Install `view`. A previously active view is returned for teardown.
    #[must_use = "a replaced view must be discarded"]
    pub fn activate(&mut self, view: V) -> Option<V> {
        let previous = self.dismiss();
        debug!("Detailed view activated");
        self.active = Some(view);
        previous
    }

    /// Remove the active view, if any.
    #[must_use = "a dismissed view must be discarded"]
    pub fn dismiss(&mut self) -> Option<V> {
        let view = self.active.take();
        if view.is_some() {
            debug!("Detailed view dismissed");
        }
        view
    }

    /// Escape and Enter dismiss the active view.
    #[must_use = "a dismissed view must be discarded"]
    pub fn on_key(&mut self, key: Key) -> Option<V> {
        match key {
            Key::Escape | Key::Enter => self.dismiss(),
            Key::Other => None,
        }
    }

    /// A click outside the detailed view dismisses it.
    #[must_use = "a dismissed view must be discarded"]
    pub fn on_click_outside(&mut self) -> Option<V> {
        self.dismiss()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_activation_replaces_previous_view() {
        let mut controller = TimelineController::new();
        assert_eq!(controller.activate("first"), None);
        assert_eq!(controller.activate("second"), Some("first"));
        assert_eq!(controller.active(), Some(&"second"));
    }

    #[test]
    fn test_dismissal_triggers_tear_down_once() {
        let mut controller = TimelineController::new();
        let _ = controller.activate(1);
        assert_eq!(controller.on_key(Key::Escape), Some(1));
        assert_eq!(controller.on_click_outside(), None);
        assert_eq!(controller.dismiss(), None);
        assert!(!controller.is_active());
    }

    #[test]
    fn test_only_escape_and_enter_dismiss() {
        let mut controller = TimelineController::new();
        let _ = controller.activate(1);
        assert_eq!(controller.on_key(Key::Other), None);
        assert!(controller.is_active());
        assert_eq!(controller.on_key(Key::Enter), Some(1));
    }
}
