//! Per-operation "request in flight" flags.
//!
//! An operation takes the flag with `try_begin` before doing anything else
//! and holds the returned guard for as long as it runs. The flag clears when
//! the guard drops, whichever way the operation exits.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

#[derive(Debug, Clone, Default)]
pub struct InFlight {
    active: Arc<AtomicBool>,
}

impl InFlight {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take the flag, or `None` if it is already held
    pub fn try_begin(&self) -> Option<InFlightGuard> {
        self.active
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| InFlightGuard {
                active: self.active.clone(),
            })
    }

    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::Acquire)
    }
}

/// Clears its `InFlight` flag on drop.
#[derive(Debug)]
pub struct InFlightGuard {
    active: Arc<AtomicBool>,
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.active.store(false, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_begin_fails_while_held() {
        let flag = InFlight::new();
        let guard = flag.try_begin().expect("first begin");
        assert!(flag.is_active());
        assert!(flag.try_begin().is_none());

        drop(guard);
        assert!(!flag.is_active());
        assert!(flag.try_begin().is_some());
    }

    #[test]
    fn test_guard_released_on_early_return() {
        fn fails(flag: &InFlight) -> Result<(), &'static str> {
            let _guard = flag.try_begin().ok_or("busy")?;
            Err("validation failed")
        }

        let flag = InFlight::new();
        assert_eq!(fails(&flag), Err("validation failed"));
        assert!(!flag.is_active());
    }

    #[test]
    fn test_clones_share_the_flag() {
        let flag = InFlight::new();
        let other = flag.clone();
        let _guard = flag.try_begin().unwrap();
        assert!(other.is_active());
        assert!(other.try_begin().is_none());
    }
}
