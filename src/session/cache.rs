//! Per-salt cache of derived cipher engines.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use log::debug;

use crate::crypto::{CipherEngine, CryptoResult};

/// Memoizes cipher engines by document salt.
///
/// Key derivation is deliberately slow, so each distinct salt is derived
/// at most once per session. There is no eviction: the number of salts
/// touched in one session is small and engines are only dropped in bulk
/// when the session password resets.
#[derive(Default)]
pub struct EngineCache {
    engines: RwLock<HashMap<String, Arc<CipherEngine>>>,
}

impl EngineCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up the engine for `salt`, deriving one from `password` on a
    /// miss.
    pub fn get_or_create(
        &self,
        password: &str,
        salt: &str,
        iterations: u32,
    ) -> CryptoResult<Arc<CipherEngine>> {
        if let Some(engine) = self.engines.read().unwrap().get(salt) {
            return Ok(engine.clone());
        }

        debug!("deriving cipher engine for new salt ({iterations} rounds)");
        let engine = Arc::new(CipherEngine::derive(password, salt, iterations)?);
        self.engines
            .write()
            .unwrap()
            .insert(salt.to_string(), engine.clone());
        Ok(engine)
    }

    /// Drop every cached engine. Called whenever the session password
    /// resets.
    pub fn invalidate_all(&self) {
        self.engines.write().unwrap().clear();
    }

    pub fn len(&self) -> usize {
        self.engines.read().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_engine_is_derived_once_per_salt() {
        let cache = EngineCache::new();
        let first = cache.get_or_create("hunter2", "salt-a", 1000).unwrap();
        let second = cache.get_or_create("hunter2", "salt-a", 1000).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(cache.len(), 1);

        cache.get_or_create("hunter2", "salt-b", 1000).unwrap();
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn test_invalidate_all_drops_engines() {
        let cache = EngineCache::new();
        let before = cache.get_or_create("hunter2", "salt-a", 1000).unwrap();
        cache.invalidate_all();
        assert!(cache.is_empty());

        let after = cache.get_or_create("hunter2", "salt-a", 1000).unwrap();
        assert!(!Arc::ptr_eq(&before, &after));
    }
}
