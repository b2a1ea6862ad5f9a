//! Domain types providing compile-time safety and self-documentation
//!
//! These newtype wrappers prevent passing a thread id where a process id is
//! expected when aggregating CPU activity.

use serde::Deserialize;
use std::fmt;

/// Thread ID
///
/// Thread id as recorded by the CPU scheduler events. Tid 0 is the idle thread.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize)]
#[serde(transparent)]
pub struct Tid(pub u32);

impl Tid {
    /// The per-core idle thread.
    pub const IDLE: Tid = Tid(0);

    #[must_use]
    pub fn is_idle(self) -> bool {
        self == Self::IDLE
    }
}

impl fmt::Display for Tid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TID:{}", self.0)
    }
}

/// Process ID
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize)]
#[serde(transparent)]
pub struct Pid(pub u32);

impl fmt::Display for Pid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PID:{}", self.0)
    }
}

/// The main thread of a process shares its id with the process.
impl From<Pid> for Tid {
    fn from(pid: Pid) -> Self {
        Tid(pid.0)
    }
}

/// Android task id owning a view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(transparent)]
pub struct TaskId(pub i32);

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Timestamp or duration in microseconds, relative to the trace start.
pub type Micros = i64;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_idle_tid() {
        assert!(Tid(0).is_idle());
        assert!(!Tid(7).is_idle());
    }

    #[test]
    fn test_display() {
        assert_eq!(Tid(42).to_string(), "TID:42");
        assert_eq!(Pid(7).to_string(), "PID:7");
        assert_eq!(Tid::from(Pid(7)), Tid(7));
    }
}
