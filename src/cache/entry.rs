//! Cache Entry Module
//!
//! Defines individual cache entries, their TTL semantics, and the size
//! heuristic used for memory accounting.

use std::sync::Arc;
use std::time::Duration;

// == Size Heuristic ==
/// Approximate number of size units a value contributes to the cache.
///
/// The result must be stable: the same value reports the same size until it
/// is mutated. It does not need to be an exact heap byte count.
pub trait CacheSize {
    fn cache_size(&self) -> usize;
}

impl CacheSize for String {
    fn cache_size(&self) -> usize {
        self.len()
    }
}

impl CacheSize for Vec<u8> {
    fn cache_size(&self) -> usize {
        self.len()
    }
}

impl CacheSize for &'static str {
    fn cache_size(&self) -> usize {
        self.len()
    }
}

/// Length of the compact JSON text.
impl CacheSize for serde_json::Value {
    fn cache_size(&self) -> usize {
        match self {
            serde_json::Value::String(s) => s.len() + 2,
            other => other.to_string().len(),
        }
    }
}

impl<T: CacheSize> CacheSize for Option<T> {
    fn cache_size(&self) -> usize {
        self.as_ref().map_or(0, CacheSize::cache_size)
    }
}

impl<T: CacheSize + ?Sized> CacheSize for Box<T> {
    fn cache_size(&self) -> usize {
        (**self).cache_size()
    }
}

impl<T: CacheSize + ?Sized> CacheSize for Arc<T> {
    fn cache_size(&self) -> usize {
        (**self).cache_size()
    }
}

macro_rules! fixed_cache_size {
    ($($ty:ty),*) => {
        $(
            impl CacheSize for $ty {
                fn cache_size(&self) -> usize {
                    std::mem::size_of::<$ty>()
                }
            }
        )*
    };
}

fixed_cache_size!(bool, char, u8, u16, u32, u64, u128, usize, i8, i16, i32, i64, i128, isize, f32, f64);

// == Cache Entry ==
/// A single cached record with recency and TTL metadata.
#[derive(Debug, Clone)]
pub struct Entry<V> {
    /// Unique key within the cache
    pub key: String,
    /// The stored value
    pub value: V,
    /// Last read or write (Unix seconds)
    pub last_access: i64,
    /// Time to live, measured from `last_access`
    pub ttl: Duration,
    /// Size contribution, fixed until the next update
    size: usize,
}

impl<V: CacheSize> Entry<V> {
    // == Constructor ==
    /// Creates an entry accessed at `now`.
    pub fn new(key: String, value: V, ttl: Duration, now: i64) -> Self {
        let size = key.len() + value.cache_size();
        Self {
            key,
            value,
            last_access: now,
            ttl,
            size,
        }
    }

    // == Update ==
    /// Replaces value and TTL and refreshes the access time.
    ///
    /// Returns the size before the update.
    pub fn update(&mut self, value: V, ttl: Duration, now: i64) -> usize {
        let old_size = self.size;
        self.value = value;
        self.ttl = ttl;
        self.last_access = now;
        self.size = self.key.len() + self.value.cache_size();
        old_size
    }
}

impl<V> Entry<V> {
    /// Size contribution of this entry.
    pub fn size(&self) -> usize {
        self.size
    }

    // == Is Expired ==
    /// Checks if the entry is logically expired at `now`.
    ///
    /// A zero TTL is expired on arrival. Otherwise the entry expires once
    /// strictly more than `ttl` whole seconds have passed since the last access.
    pub fn is_expired(&self, now: i64) -> bool {
        if self.ttl.is_zero() {
            return true;
        }
        let ttl = i64::try_from(self.ttl.as_secs()).unwrap_or(i64::MAX);
        now.saturating_sub(self.last_access) > ttl
    }

    /// Marks the entry as accessed at `now`.
    pub fn touch(&mut self, now: i64) {
        self.last_access = now;
    }
}

// == Lookup ==
/// Outcome of a read that distinguishes hits from the two kinds of miss.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup<V> {
    Hit(V),
    /// Present but logically expired, awaiting the sweep
    Expired,
    Missing,
}

impl<V> Lookup<V> {
    pub fn is_hit(&self) -> bool {
        matches!(self, Lookup::Hit(_))
    }

    pub fn into_option(self) -> Option<V> {
        match self {
            Lookup::Hit(value) => Some(value),
            Lookup::Expired | Lookup::Missing => None,
        }
    }
}
