//! Per-file, per-listener scratch storage.
//!
//! The analyzer creates one [`UserData`] for every (file, listener) pair at
//! the start of a run and drops them all when the run ends. A listener sees
//! only its own store, during `on_process` for that file and again during
//! `on_finish`.

use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::marker::PhantomData;

/// Typed key into a [`UserData`] store.
pub struct Key<T> {
    name: &'static str,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Key<T> {
    /// Creates a key.
    #[must_use]
    pub const fn new(name: &'static str) -> Self {
        Self {
            name,
            _marker: PhantomData,
        }
    }

    /// Key name.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }
}

impl<T> Clone for Key<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Key<T> {}

impl<T> fmt::Debug for Key<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Key").field(&self.name).finish()
    }
}

impl<T> fmt::Display for Key<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// Scratch values a listener attached to one file.
#[derive(Default)]
pub struct UserData {
    slots: HashMap<&'static str, Box<dyn Any + Send + Sync>>,
}

impl UserData {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `value` under `key`, replacing any previous value.
    pub fn put<T: Any + Send + Sync>(&mut self, key: &Key<T>, value: T) {
        self.slots.insert(key.name, Box::new(value));
    }

    /// Reads the value stored under `key`.
    ///
    /// Returns `None` if nothing was stored or if a value of another type
    /// was stored under the same name.
    #[must_use]
    pub fn get<T: Any + Send + Sync>(&self, key: &Key<T>) -> Option<&T> {
        self.slots.get(key.name).and_then(|v| v.downcast_ref::<T>())
    }

    /// Removes and returns the value stored under `key`.
    pub fn take<T: Any + Send + Sync>(&mut self, key: &Key<T>) -> Option<T> {
        let boxed = self.slots.remove(key.name)?;
        match boxed.downcast::<T>() {
            Ok(value) => Some(*value),
            Err(other) => {
                self.slots.insert(key.name, other);
                None
            }
        }
    }

    /// Returns true if no values are stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

impl fmt::Debug for UserData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut keys: Vec<_> = self.slots.keys().collect();
        keys.sort();
        f.debug_struct("UserData").field("keys", &keys).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PACKAGE: Key<String> = Key::new("package");
    const COUNT: Key<usize> = Key::new("count");

    #[test]
    fn put_then_get() {
        let mut data = UserData::new();
        assert!(data.get(&PACKAGE).is_none());

        data.put(&PACKAGE, "com.x".to_string());
        data.put(&COUNT, 3);

        assert_eq!(data.get(&PACKAGE).map(String::as_str), Some("com.x"));
        assert_eq!(data.get(&COUNT), Some(&3));
    }

    #[test]
    fn mismatched_type_reads_as_absent() {
        let mut data = UserData::new();
        data.put(&COUNT, 3_usize);

        let same_name: Key<String> = Key::new("count");
        assert!(data.get(&same_name).is_none());
        assert!(data.take(&same_name).is_none());
        assert_eq!(data.take(&COUNT), Some(3));
        assert!(data.is_empty());
    }

    #[test]
    fn key_displays_its_name() {
        assert_eq!(PACKAGE.to_string(), "package");
    }
}
