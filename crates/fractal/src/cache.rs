//! Memoised generation results, recomputed only when their inputs change

use std::sync::Arc;

use shared::GenerationParams;

/// Exact identity of one generator run. Floats are compared by bit pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GenerationKey {
    size: u64,
    iterations: u32,
    position: [u64; 3],
    angle: u64,
}

impl GenerationKey {
    pub fn new(params: &GenerationParams, angle: f64) -> Self {
        Self {
            size: params.size.to_bits(),
            iterations: params.iterations,
            position: params.position.map(f64::to_bits),
            angle: angle.to_bits(),
        }
    }
}

/// Single-entry memo: holds the last value and the key it was built from
pub struct Memo<K, V> {
    key: Option<K>,
    value: Option<Arc<V>>,
    rebuild_count: u64,
}

impl<K, V> Default for Memo<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> Memo<K, V> {
    pub fn new() -> Self {
        Self {
            key: None,
            value: None,
            rebuild_count: 0,
        }
    }

    /// Rebuild counter
    pub fn rebuild_count(&self) -> u64 {
        self.rebuild_count
    }

    /// Drop the cached value; the next lookup recomputes
    pub fn invalidate(&mut self) {
        self.key = None;
        self.value = None;
    }
}

impl<K: PartialEq + Clone, V> Memo<K, V> {
    /// Check if cache is still valid for `key`
    pub fn is_valid(&self, key: &K) -> bool {
        self.value.is_some() && self.key.as_ref() == Some(key)
    }

    pub fn get_or_compute(&mut self, key: &K, compute: impl FnOnce(&K) -> V) -> Arc<V> {
        match self.try_get_or_compute(key, |k| Ok::<V, std::convert::Infallible>(compute(k))) {
            Ok(value) => value,
            Err(never) => match never {},
        }
    }

    /// Like [`Memo::get_or_compute`]; a failed computation leaves the old entry in place.
    pub fn try_get_or_compute<E>(
        &mut self,
        key: &K,
        compute: impl FnOnce(&K) -> Result<V, E>,
    ) -> Result<Arc<V>, E> {
        if self.key.as_ref() == Some(key) {
            if let Some(value) = &self.value {
                return Ok(Arc::clone(value));
            }
        }

        let value = Arc::new(compute(key)?);
        self.key = Some(key.clone());
        self.value = Some(Arc::clone(&value));
        self.rebuild_count += 1;
        Ok(value)
    }
}
