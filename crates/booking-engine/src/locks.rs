//! Per-employee mutual exclusion for check-then-write sequences.
//!
//! Each employee gets its own mutex, created on first use. Bookings for
//! different employees never wait on each other.

use std::sync::Arc;

use dashmap::DashMap;
use parking_lot::Mutex;

use crate::EmployeeId;

#[derive(Debug, Default)]
pub struct EmployeeLocks {
    locks: DashMap<EmployeeId, Arc<Mutex<()>>>,
}

impl EmployeeLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `f` while holding `employee_id`'s lock.
    pub fn with_employee<R>(&self, employee_id: EmployeeId, f: impl FnOnce() -> R) -> R {
        // Clone the Arc out so the map shard is not held while we block.
        let mutex = Arc::clone(&self.locks.entry(employee_id).or_default());
        let _guard = mutex.lock();
        f()
    }

    /// Number of employees that have been locked at least once.
    pub fn len(&self) -> usize {
        self.locks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locks.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use uuid::Uuid;

    #[test]
    fn test_returns_closure_value() {
        let locks = EmployeeLocks::new();
        let out = locks.with_employee(Uuid::new_v4(), || 42);
        assert_eq!(out, 42);
        assert_eq!(locks.len(), 1);
    }

    #[test]
    fn test_same_employee_is_serialized() {
        let locks = EmployeeLocks::new();
        let employee = Uuid::new_v4();
        let inside = AtomicUsize::new(0);
        let max_inside = AtomicUsize::new(0);

        std::thread::scope(|s| {
            for _ in 0..8 {
                s.spawn(|| {
                    for _ in 0..50 {
                        locks.with_employee(employee, || {
                            let n = inside.fetch_add(1, Ordering::SeqCst) + 1;
                            max_inside.fetch_max(n, Ordering::SeqCst);
                            std::thread::yield_now();
                            inside.fetch_sub(1, Ordering::SeqCst);
                        });
                    }
                });
            }
        });

        assert_eq!(max_inside.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_different_employees_do_not_block() {
        let locks = EmployeeLocks::new();
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        // Holding a's lock must not prevent taking b's.
        let nested = locks.with_employee(a, || locks.with_employee(b, || "ok"));
        assert_eq!(nested, "ok");
        assert_eq!(locks.len(), 2);
    }
}
