// Авторские права (c) 2025 urdekcah. Все права защищены.
//
// Этот исходный код распространяется под лицензией AGPL-3.0,
// текст которой находится в файле LICENSE в корневом каталоге данного проекта.
use dashmap::DashMap;
use std::{borrow::Borrow, fmt, hash::Hash, time::Duration};
use tokio::time::Instant;
use tracing::trace;

/// Upper bound for deadlines that would overflow `Instant`.
const MAX_TTL: Duration = Duration::from_secs(60 * 60 * 24 * 365 * 30);

struct CacheEntry<V> {
  value: V,
  expires_at: Instant,
}

impl<V> CacheEntry<V> {
  fn is_fresh(&self, now: Instant) -> bool {
    now < self.expires_at
  }
}

/// Key/value store where every entry carries its own deadline.
///
/// Expired entries are never returned. They are dropped lazily when `get`
/// runs into them, or in bulk by [`TimedCache::purge_expired`].
pub struct TimedCache<K, V> {
  entries: DashMap<K, CacheEntry<V>>,
}

impl<K, V> TimedCache<K, V>
where
  K: Eq + Hash,
  V: Clone,
{
  pub fn new() -> Self {
    Self {
      entries: DashMap::new(),
    }
  }

  pub fn get<Q>(&self, key: &Q) -> Option<V>
  where
    K: Borrow<Q>,
    Q: Hash + Eq + ?Sized,
  {
    let now = Instant::now();
    if let Some(entry) = self.entries.get(key) {
      if entry.is_fresh(now) {
        return Some(entry.value.clone());
      }
    }

    // the shard guard above must be gone before removing
    if self
      .entries
      .remove_if(key, |_, entry| !entry.is_fresh(now))
      .is_some()
    {
      trace!("dropped expired cache entry");
    }
    None
  }

  pub fn put(&self, key: K, value: V, ttl: Duration) {
    let now = Instant::now();
    let expires_at = now
      .checked_add(ttl)
      .unwrap_or_else(|| now + MAX_TTL);
    self.entries.insert(key, CacheEntry { value, expires_at });
  }

  pub fn remove<Q>(&self, key: &Q) -> Option<V>
  where
    K: Borrow<Q>,
    Q: Hash + Eq + ?Sized,
  {
    let now = Instant::now();
    self
      .entries
      .remove(key)
      .and_then(|(_, entry)| entry.is_fresh(now).then_some(entry.value))
  }

  /// Drops every expired entry and returns how many were removed.
  pub fn purge_expired(&self) -> usize {
    let now = Instant::now();
    let mut purged = 0;
    self.entries.retain(|_, entry| {
      let keep = entry.is_fresh(now);
      if !keep {
        purged += 1;
      }
      keep
    });
    purged
  }
}

impl<K, V> TimedCache<K, V>
where
  K: Eq + Hash,
{
  pub fn clear(&self) {
    self.entries.clear();
  }

  /// Number of stored entries, including expired ones not yet purged.
  pub fn len(&self) -> usize {
    self.entries.len()
  }

  pub fn is_empty(&self) -> bool {
    self.entries.is_empty()
  }
}

impl<K, V> Default for TimedCache<K, V>
where
  K: Eq + Hash,
  V: Clone,
{
  fn default() -> Self {
    Self::new()
  }
}

impl<K, V> fmt::Debug for TimedCache<K, V>
where
  K: Eq + Hash,
{
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("TimedCache")
      .field("entries", &self.entries.len())
      .finish()
  }
}
