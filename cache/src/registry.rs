// Авторские права (c) 2025 urdekcah. Все права защищены.
//
// Этот исходный код распространяется под лицензией AGPL-3.0,
// текст которой находится в файле LICENSE в корневом каталоге данного проекта.
use crate::timed::TimedCache;
use parking_lot::Mutex;
use std::{collections::HashMap, fmt, hash::Hash, ops::Deref, sync::Arc, time::Duration};
use tokio::{runtime::Handle, task::JoinHandle};
use tracing::{debug, trace, warn};

type Slots<K, V> = Arc<Mutex<HashMap<String, Slot<K, V>>>>;

struct Slot<K, V> {
  cache: Arc<TimedCache<K, V>>,
  refs: usize,
  purger: Option<JoinHandle<()>>,
}

/// Named, reference-counted cache instances.
///
/// `acquire` hands out a [`CacheHandle`] to the instance registered under a
/// kind, creating it on first use. The instance lives while at least one
/// handle does; releasing the last handle unregisters it and drops every
/// entry. Cloning the registry shares the same set of instances.
pub struct CacheRegistry<K, V> {
  slots: Slots<K, V>,
  purge_interval: Option<Duration>,
}

impl<K, V> CacheRegistry<K, V>
where
  K: Eq + Hash + Send + Sync + 'static,
  V: Clone + Send + Sync + 'static,
{
  pub fn new() -> Self {
    Self {
      slots: Arc::new(Mutex::new(HashMap::new())),
      purge_interval: None,
    }
  }

  /// Sweep expired entries of every instance created from now on.
  ///
  /// Sweeps run on the tokio runtime current at `acquire` time; outside a
  /// runtime expired entries are only dropped lazily.
  pub fn with_purge_interval(mut self, every: Duration) -> Self {
    self.purge_interval = Some(every).filter(|every| !every.is_zero());
    self
  }

  pub fn acquire(&self, kind: &str) -> CacheHandle<K, V> {
    let mut slots = self.slots.lock();
    let slot = slots.entry(kind.to_string()).or_insert_with(|| {
      debug!(kind, "creating cache instance");
      let cache = Arc::new(TimedCache::new());
      let purger = self.spawn_purger(kind, &cache);
      Slot {
        cache,
        refs: 0,
        purger,
      }
    });
    slot.refs += 1;
    trace!(kind, refs = slot.refs, "cache acquired");

    CacheHandle {
      kind: kind.to_string(),
      cache: Arc::clone(&slot.cache),
      slots: Arc::clone(&self.slots),
      released: false,
    }
  }

  /// Outstanding acquisitions for `kind`; zero when it is not registered.
  pub fn ref_count(&self, kind: &str) -> usize {
    self.slots.lock().get(kind).map_or(0, |slot| slot.refs)
  }

  pub fn is_live(&self, kind: &str) -> bool {
    self.slots.lock().contains_key(kind)
  }

  pub fn kinds(&self) -> Vec<String> {
    let mut kinds: Vec<String> = self.slots.lock().keys().cloned().collect();
    kinds.sort();
    kinds
  }

  fn spawn_purger(&self, kind: &str, cache: &Arc<TimedCache<K, V>>) -> Option<JoinHandle<()>> {
    let every = self.purge_interval?;
    let runtime = match Handle::try_current() {
      Ok(runtime) => runtime,
      Err(_) => {
        warn!(kind, "no tokio runtime, expired entries will only be dropped on access");
        return None;
      }
    };

    let cache = Arc::downgrade(cache);
    let kind = kind.to_string();
    Some(runtime.spawn(async move {
      let mut ticker = tokio::time::interval(every);
      // first tick fires immediately
      ticker.tick().await;
      loop {
        ticker.tick().await;
        let Some(cache) = cache.upgrade() else {
          break;
        };
        let purged = cache.purge_expired();
        if purged > 0 {
          debug!(kind = %kind, purged, "purged expired cache entries");
        }
      }
    }))
  }
}

impl<K, V> Default for CacheRegistry<K, V>
where
  K: Eq + Hash + Send + Sync + 'static,
  V: Clone + Send + Sync + 'static,
{
  fn default() -> Self {
    Self::new()
  }
}

impl<K, V> Clone for CacheRegistry<K, V> {
  fn clone(&self) -> Self {
    Self {
      slots: Arc::clone(&self.slots),
      purge_interval: self.purge_interval,
    }
  }
}

impl<K, V> fmt::Debug for CacheRegistry<K, V> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let slots = self.slots.lock();
    let mut map = f.debug_map();
    for (kind, slot) in slots.iter() {
      map.entry(kind, &slot.refs);
    }
    map.finish()
  }
}

/// One acquisition of a registered cache instance.
///
/// Dereferences to the shared [`TimedCache`]. Dropping the handle releases
/// it; [`CacheHandle::release`] does the same and reports what is left.
pub struct CacheHandle<K: Eq + Hash, V> {
  kind: String,
  cache: Arc<TimedCache<K, V>>,
  slots: Slots<K, V>,
  released: bool,
}

impl<K: Eq + Hash, V> CacheHandle<K, V> {
  pub fn kind(&self) -> &str {
    &self.kind
  }

  /// Returns the acquisitions still outstanding for this kind.
  pub fn release(mut self) -> usize {
    self.released = true;
    self.release_slot()
  }

  fn release_slot(&self) -> usize {
    let mut slots = self.slots.lock();
    let Some(slot) = slots.get_mut(&self.kind) else {
      return 0;
    };
    slot.refs -= 1;
    let remaining = slot.refs;
    trace!(kind = %self.kind, refs = remaining, "cache released");

    if remaining == 0 {
      if let Some(slot) = slots.remove(&self.kind) {
        if let Some(purger) = slot.purger {
          purger.abort();
        }
        slot.cache.clear();
        debug!(kind = %self.kind, "cache instance torn down");
      }
    }
    remaining
  }
}

impl<K: Eq + Hash, V> Clone for CacheHandle<K, V> {
  fn clone(&self) -> Self {
    let mut slots = self.slots.lock();
    if let Some(slot) = slots.get_mut(&self.kind) {
      slot.refs += 1;
    }
    Self {
      kind: self.kind.clone(),
      cache: Arc::clone(&self.cache),
      slots: Arc::clone(&self.slots),
      released: false,
    }
  }
}

impl<K: Eq + Hash, V> Deref for CacheHandle<K, V> {
  type Target = TimedCache<K, V>;

  fn deref(&self) -> &Self::Target {
    &self.cache
  }
}

impl<K: Eq + Hash, V> Drop for CacheHandle<K, V> {
  fn drop(&mut self) {
    if !self.released {
      self.release_slot();
    }
  }
}

impl<K: Eq + Hash, V> fmt::Debug for CacheHandle<K, V> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("CacheHandle")
      .field("kind", &self.kind)
      .finish_non_exhaustive()
  }
}
