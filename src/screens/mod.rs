// src/screens/mod.rs

pub mod auth;
pub mod gate;
pub mod quiz_detail;
pub mod quiz_list;

use std::sync::atomic::{AtomicBool, Ordering};

/// Holds an in-progress flag for one submission and resets it on drop.
pub(crate) struct InFlight<'a>(&'a AtomicBool);

impl<'a> InFlight<'a> {
    /// Returns `None` if the flag is already set.
    pub(crate) fn enter(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(flag))
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}
