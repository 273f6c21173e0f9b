//! Thread-safe handle for shells that drive one marketplace from several places.

use std::sync::Arc;

use parking_lot::{Mutex, MutexGuard};

use crate::market::Marketplace;

/// Cloneable handle that serialises every command behind one lock.
#[derive(Clone)]
pub struct SharedMarketplace {
    inner: Arc<Mutex<Marketplace>>,
}

impl SharedMarketplace {
    /// Wrap an opened marketplace.
    pub fn new(market: Marketplace) -> Self {
        Self {
            inner: Arc::new(Mutex::new(market)),
        }
    }

    /// Exclusive access for as long as the guard lives.
    pub fn lock(&self) -> MutexGuard<'_, Marketplace> {
        self.inner.lock()
    }

    /// Run `f` with exclusive access and return its result.
    pub fn with<R>(&self, f: impl FnOnce(&mut Marketplace) -> R) -> R {
        let mut guard = self.inner.lock();
        f(&mut *guard)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{clock::SystemClock, models::AccountKind, store::SnapshotStore};
    use anyhow::Result;
    use rand::{rngs::StdRng, SeedableRng};
    use std::thread;
    use tempfile::tempdir;

    #[test]
    fn concurrent_registrations_are_all_kept() -> Result<()> {
        let dir = tempdir()?;
        let market = Marketplace::with_parts(
            SnapshotStore::new(dir.path()),
            SystemClock,
            StdRng::seed_from_u64(5),
            8,
        );
        let shared = SharedMarketplace::new(market);

        thread::scope(|scope| {
            for worker in 0..4 {
                let shared = shared.clone();
                scope.spawn(move || {
                    for n in 0..5 {
                        shared.with(|market| {
                            market.register_user(
                                AccountKind::Customer,
                                format!("user-{worker}-{n}"),
                                "pw",
                            )
                        });
                    }
                });
            }
        });

        assert_eq!(shared.lock().users().len(), 20);
        let reopened = Marketplace::with_parts(
            SnapshotStore::new(dir.path()),
            SystemClock,
            StdRng::seed_from_u64(6),
            8,
        );
        assert_eq!(reopened.users().len(), 20);
        Ok(())
    }
}
