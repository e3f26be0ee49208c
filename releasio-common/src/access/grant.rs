//! Deferred actions waiting on an out-of-band capability grant
//!
//! Some tools need a credential the user picks in a separate dialog. An
//! action gated on it either runs straight away or waits in a queue until the
//! dialog reports success.

use std::collections::VecDeque;
use std::fmt;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GrantStatus {
    Granted,
    NotGranted,
    /// The environment offers no way to ask; actions proceed ungated
    Unavailable,
}

/// Asks the environment whether the capability is currently granted
pub trait GrantProbe: Send + Sync {
    fn probe(&self) -> GrantStatus;
}

impl<F> GrantProbe for F
where
    F: Fn() -> GrantStatus + Send + Sync,
{
    fn probe(&self) -> GrantStatus {
        self()
    }
}

type Deferred = Box<dyn FnOnce() + Send>;

pub struct CapabilityGrant {
    probe: Box<dyn GrantProbe>,
    pending: VecDeque<Deferred>,
    requested: bool,
}

impl CapabilityGrant {
    pub fn new<P: GrantProbe + 'static>(probe: P) -> Self {
        Self {
            probe: Box::new(probe),
            pending: VecDeque::new(),
            requested: false,
        }
    }

    /// Run `action` now if the capability is granted, otherwise queue it and
    /// request a grant
    ///
    /// Returns whether the action ran immediately.
    pub fn require<F>(&mut self, action: F) -> bool
    where
        F: FnOnce() + Send + 'static,
    {
        match self.probe.probe() {
            GrantStatus::Granted => {
                action();
                true
            }
            GrantStatus::Unavailable => {
                warn!("Capability grant cannot be checked here; proceeding");
                action();
                true
            }
            GrantStatus::NotGranted => {
                self.pending.push_back(Box::new(action));
                self.requested = true;
                debug!("Action deferred until grant ({} pending)", self.pending.len());
                false
            }
        }
    }

    /// The grant dialog succeeded: run every deferred action in order
    pub fn grant(&mut self) -> usize {
        self.requested = false;
        let mut ran = 0;
        while let Some(action) = self.pending.pop_front() {
            action();
            ran += 1;
        }
        if ran > 0 {
            info!("Capability granted; ran {} deferred action(s)", ran);
        }
        ran
    }

    /// The granted credential turned out to be invalid; ask again
    pub fn reset(&mut self) {
        self.requested = true;
    }

    /// Drop deferred actions without running them (dialog dismissed)
    pub fn cancel(&mut self) -> usize {
        self.requested = false;
        let dropped = self.pending.len();
        self.pending.clear();
        dropped
    }

    /// Whether the grant dialog should be showing
    pub fn is_requested(&self) -> bool {
        self.requested
    }

    pub fn pending(&self) -> usize {
        self.pending.len()
    }
}

impl fmt::Debug for CapabilityGrant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CapabilityGrant")
            .field("pending", &self.pending.len())
            .field("requested", &self.requested)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::{Arc, Mutex};

    #[test]
    fn test_granted_runs_immediately() {
        let mut grant = CapabilityGrant::new(|| GrantStatus::Granted);
        let ran = Arc::new(AtomicBool::new(false));
        let flag = ran.clone();
        assert!(grant.require(move || flag.store(true, Ordering::SeqCst)));
        assert!(ran.load(Ordering::SeqCst));
        assert!(!grant.is_requested());
    }

    #[test]
    fn test_unavailable_environment_proceeds() {
        let mut grant = CapabilityGrant::new(|| GrantStatus::Unavailable);
        assert!(grant.require(|| {}));
        assert_eq!(grant.pending(), 0);
    }

    #[test]
    fn test_deferred_actions_run_in_order_after_grant() {
        let granted = Arc::new(AtomicBool::new(false));
        let probe_flag = granted.clone();
        let mut grant = CapabilityGrant::new(move || {
            if probe_flag.load(Ordering::SeqCst) {
                GrantStatus::Granted
            } else {
                GrantStatus::NotGranted
            }
        });

        let log = Arc::new(Mutex::new(Vec::new()));
        for n in 1..=3 {
            let log = log.clone();
            assert!(!grant.require(move || log.lock().unwrap().push(n)));
        }
        assert!(grant.is_requested());
        assert!(log.lock().unwrap().is_empty());

        granted.store(true, Ordering::SeqCst);
        assert_eq!(grant.grant(), 3);
        assert_eq!(*log.lock().unwrap(), vec![1, 2, 3]);
        assert!(!grant.is_requested());
    }

    #[test]
    fn test_cancel_drops_pending() {
        let mut grant = CapabilityGrant::new(|| GrantStatus::NotGranted);
        grant.require(|| panic!("must not run"));
        assert_eq!(grant.cancel(), 1);
        assert_eq!(grant.grant(), 0);

        grant.reset();
        assert!(grant.is_requested());
    }
}
