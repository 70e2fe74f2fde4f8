//! Striped per-user write locks.

use std::sync::Arc;

use tokio::sync::{Mutex, OwnedMutexGuard};

const STRIPES: usize = 64;

/// A fixed set of mutexes; a user always maps to the same stripe.
///
/// Holding the guard for a user serializes every ledger write of that user.
/// Different users may share a stripe, which only costs some contention.
#[derive(Clone, Debug)]
pub(crate) struct UserLocks {
    stripes: Arc<[Arc<Mutex<()>>]>,
}

impl Default for UserLocks {
    fn default() -> Self {
        Self {
            stripes: (0..STRIPES).map(|_| Arc::new(Mutex::new(()))).collect(),
        }
    }
}

impl UserLocks {
    fn stripe(&self, user_id: i64) -> usize {
        // `STRIPES` fits in i64 and `rem_euclid` is never negative.
        user_id.rem_euclid(STRIPES as i64) as usize
    }

    /// Wait for exclusive write access to `user_id`'s records.
    pub(crate) async fn lock(&self, user_id: i64) -> OwnedMutexGuard<()> {
        let stripe = self.stripes[self.stripe(user_id)].clone();
        stripe.lock_owned().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn negative_ids_map_into_range() {
        let locks = UserLocks::default();
        assert!(locks.stripe(-1) < STRIPES);
        assert!(locks.stripe(i64::MIN) < STRIPES);
        assert_eq!(locks.stripe(7), locks.stripe(7 + STRIPES as i64));
    }
}
