use std::sync::Mutex;
use std::sync::MutexGuard;
use std::sync::RwLock;
use std::sync::RwLockReadGuard;
use std::sync::RwLockWriteGuard;

use tracing::warn;

/// Acquires a read guard, recovering the inner value if a previous holder
/// panicked. Lock poisoning is not a correctness signal for any state we
/// protect, so recovery is always safe here.
pub fn rwlock_read_or_recover<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(|poisoned| {
        warn!("recovering from poisoned rwlock (read)");
        poisoned.into_inner()
    })
}

pub fn rwlock_write_or_recover<T>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(|poisoned| {
        warn!("recovering from poisoned rwlock (write)");
        poisoned.into_inner()
    })
}

pub fn mutex_lock_or_recover<T>(lock: &Mutex<T>) -> MutexGuard<'_, T> {
    lock.lock().unwrap_or_else(|poisoned| {
        warn!("recovering from poisoned mutex");
        poisoned.into_inner()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_mutex_recovers_after_panic() {
        let lock = Arc::new(Mutex::new(7u32));
        let poisoner = Arc::clone(&lock);
        let _ = std::thread::spawn(move || {
            let _guard = poisoner.lock().unwrap();
            panic!("poison");
        })
        .join();

        assert!(lock.lock().is_err());
        assert_eq!(*mutex_lock_or_recover(&lock), 7);
    }

    #[test]
    fn test_rwlock_read_and_write_recover() {
        let lock = RwLock::new(String::from("state"));
        assert_eq!(*rwlock_read_or_recover(&lock), "state");
        rwlock_write_or_recover(&lock).push_str(" mutated");
        assert_eq!(*rwlock_read_or_recover(&lock), "state mutated");
    }
}
