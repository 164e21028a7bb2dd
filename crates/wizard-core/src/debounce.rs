use std::collections::HashMap;
use std::hash::Hash;
use std::time::{Duration, Instant};

/// Trailing-edge debouncer keyed by `K`.
///
/// Each `schedule` replaces the pending value for its key and pushes that
/// key's deadline to `now + window`. Values come out of [`Debouncer::take_due`]
/// once their key has been quiet for a full window. Time is passed in by the
/// caller, so the owner decides how it is driven (timer task, tick loop, test).
#[derive(Debug)]
pub struct Debouncer<K, V> {
    window: Duration,
    pending: HashMap<K, (V, Instant)>,
}

impl<K: Eq + Hash + Clone, V> Debouncer<K, V> {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            pending: HashMap::new(),
        }
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    pub fn schedule(&mut self, key: K, value: V, now: Instant) {
        self.pending.insert(key, (value, now + self.window));
    }

    /// Remove and return every entry whose deadline has passed.
    pub fn take_due(&mut self, now: Instant) -> Vec<(K, V)> {
        let due: Vec<K> = self
            .pending
            .iter()
            .filter(|(_, (_, deadline))| *deadline <= now)
            .map(|(k, _)| k.clone())
            .collect();
        due.into_iter()
            .filter_map(|k| self.pending.remove(&k).map(|(v, _)| (k, v)))
            .collect()
    }

    /// Remove and return everything pending, due or not.
    pub fn drain(&mut self) -> Vec<(K, V)> {
        self.pending.drain().map(|(k, (v, _))| (k, v)).collect()
    }

    /// Drop one key's pending value without emitting it.
    pub fn cancel(&mut self, key: &K) -> Option<V> {
        self.pending.remove(key).map(|(v, _)| v)
    }

    /// Drop everything pending without emitting it.
    pub fn cancel_all(&mut self) {
        self.pending.clear();
    }

    pub fn is_pending(&self, key: &K) -> bool {
        self.pending.contains_key(key)
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.pending.values().map(|(_, deadline)| *deadline).min()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WINDOW: Duration = Duration::from_millis(1000);

    #[test]
    fn nothing_is_due_inside_the_window() {
        let start = Instant::now();
        let mut d = Debouncer::new(WINDOW);
        d.schedule("a", 1, start);
        assert!(d.take_due(start + Duration::from_millis(999)).is_empty());
        assert_eq!(d.take_due(start + WINDOW), vec![("a", 1)]);
        assert!(d.is_empty());
    }

    #[test]
    fn rapid_updates_coalesce_to_latest_value() {
        let start = Instant::now();
        let mut d = Debouncer::new(WINDOW);
        for i in 0..10u64 {
            d.schedule("notes", i, start + Duration::from_millis(i * 100));
        }
        // Last schedule at 900ms, so due at 1900ms.
        assert!(d.take_due(start + Duration::from_millis(1500)).is_empty());
        assert_eq!(d.take_due(start + Duration::from_millis(1900)), vec![("notes", 9)]);
    }

    #[test]
    fn keys_are_debounced_independently() {
        let start = Instant::now();
        let mut d = Debouncer::new(WINDOW);
        d.schedule("a", 1, start);
        d.schedule("b", 2, start + Duration::from_millis(500));

        assert_eq!(d.take_due(start + WINDOW), vec![("a", 1)]);
        assert!(d.is_pending(&"b"));
        assert_eq!(d.next_deadline(), Some(start + Duration::from_millis(1500)));
    }

    #[test]
    fn drain_and_cancel() {
        let start = Instant::now();
        let mut d = Debouncer::new(WINDOW);
        d.schedule("a", 1, start);
        assert_eq!(d.drain(), vec![("a", 1)]);

        d.schedule("b", 2, start);
        d.schedule("c", 3, start);
        assert_eq!(d.cancel(&"b"), Some(2));
        assert!(!d.is_pending(&"b"));
        d.cancel_all();
        assert!(d.take_due(start + WINDOW * 2).is_empty());
    }
}
