//! Scoped ownership of decoder-side record handles

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::ops::Deref;
use std::rc::Rc;

/// A claim on a native handle. Dropping it runs the release hook exactly once.
pub struct Lease {
    name: String,
    release: Option<Box<dyn FnOnce(&str)>>,
}

impl Lease {
    pub fn new(name: impl Into<String>, release: impl FnOnce(&str) + 'static) -> Self {
        Self {
            name: name.into(),
            release: Some(Box::new(release)),
        }
    }

    /// A lease for records that own no native resources
    pub fn detached(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            release: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl Drop for Lease {
    fn drop(&mut self) {
        if let Some(release) = self.release.take() {
            release(&self.name);
        }
    }
}

impl fmt::Debug for Lease {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Lease").field("name", &self.name).finish()
    }
}

/// A decoded record together with the lease on its native handle
#[derive(Debug)]
pub struct Decoded<R> {
    record: R,
    lease: Lease,
}

impl<R> Decoded<R> {
    pub fn new(record: R, lease: Lease) -> Self {
        Self { record, lease }
    }

    pub fn name(&self) -> &str {
        self.lease.name()
    }
}

impl<R> Deref for Decoded<R> {
    type Target = R;

    fn deref(&self) -> &R {
        &self.record
    }
}

#[derive(Debug, Default)]
struct LedgerState {
    opened: HashMap<String, usize>,
    outstanding: usize,
}

/// Counts opened and released handles per file name.
///
/// Cloning shares the same counters, so a host can keep a ledger while the
/// decoder that issues leases is owned elsewhere.
#[derive(Debug, Clone, Default)]
pub struct LeaseLedger {
    state: Rc<RefCell<LedgerState>>,
}

impl LeaseLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn open(&self, name: &str) -> Lease {
        {
            let mut state = self.state.borrow_mut();
            *state.opened.entry(name.to_ascii_uppercase()).or_default() += 1;
            state.outstanding += 1;
        }
        log::trace!("open {}", name);

        let state = Rc::clone(&self.state);
        Lease::new(name, move |name| {
            state.borrow_mut().outstanding -= 1;
            log::trace!("release {}", name);
        })
    }

    /// How many times `name` was opened
    pub fn opened(&self, name: &str) -> usize {
        self.state
            .borrow()
            .opened
            .get(&name.to_ascii_uppercase())
            .copied()
            .unwrap_or(0)
    }

    pub fn total_opened(&self) -> usize {
        self.state.borrow().opened.values().sum()
    }

    /// Handles opened but not yet released
    pub fn outstanding(&self) -> usize {
        self.state.borrow().outstanding
    }
}
