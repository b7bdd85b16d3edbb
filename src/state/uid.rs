//! TS6 UID allocation.
//!
//! A UID is the 3-character server ID followed by a 6-character base36
//! suffix, e.g. `00AAAAAAB`. The relay hands UIDs to clients that start
//! SASL before registration completes, so allocation consults the UID
//! index and skips values that are still taken; after a daemon restart
//! the counter begins at zero while entries from the previous run can
//! linger in the index.

use std::sync::atomic::{AtomicU64, Ordering};

const UID_SUFFIX_LEN: u32 = 6;
const BASE36_DIGITS: &[u8; 36] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Allocates unused TS6 user IDs for this server.
pub struct UidAllocator {
    sid: String,
    counter: AtomicU64,
}

impl UidAllocator {
    /// Create an allocator for the given server ID.
    pub fn new(sid: String) -> Self {
        Self {
            sid,
            counter: AtomicU64::new(0),
        }
    }

    /// Allocate the next UID for which `in_use` returns false.
    ///
    /// Every candidate is checked against the predicate; taken values
    /// are skipped until a free one turns up.
    pub fn allocate<F>(&self, in_use: F) -> String
    where
        F: Fn(&str) -> bool,
    {
        loop {
            let uid = self.next_candidate();
            if !in_use(&uid) {
                return uid;
            }
        }
    }

    /// The next raw candidate: SID plus the counter in base36, most
    /// significant digit first.
    fn next_candidate(&self) -> String {
        let n = self.counter.fetch_add(1, Ordering::Relaxed);
        let mut uid = String::with_capacity(self.sid.len() + UID_SUFFIX_LEN as usize);
        uid.push_str(&self.sid);
        for position in (0..UID_SUFFIX_LEN).rev() {
            let digit = (n / 36u64.pow(position)) % 36;
            uid.push(BASE36_DIGITS[digit as usize] as char);
        }
        uid
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn allocates_sequential_uids() {
        let uids = UidAllocator::new("00A".to_string());
        assert_eq!(uids.allocate(|_| false), "00AAAAAAA");
        assert_eq!(uids.allocate(|_| false), "00AAAAAAB");
        assert_eq!(uids.allocate(|_| false), "00AAAAAAC");
    }

    #[test]
    fn skips_uids_still_in_use() {
        let uids = UidAllocator::new("00A".to_string());
        let taken: HashSet<&str> = ["00AAAAAAA", "00AAAAAAB"].into_iter().collect();
        assert_eq!(uids.allocate(|uid| taken.contains(uid)), "00AAAAAAC");
    }

    #[test]
    fn suffix_carries_into_the_next_digit() {
        let uids = UidAllocator::new("00A".to_string());
        let mut last = String::new();
        for _ in 0..37 {
            last = uids.allocate(|_| false);
        }
        // Allocation 36 ends the first digit run ("...A9"); one more
        // carries into the next position.
        assert_eq!(last, "00AAAAABA");
    }
}
