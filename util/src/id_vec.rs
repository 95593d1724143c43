use std::marker::PhantomData;

/// Arena of values addressed by a typed id.
/// Ids are handed out by `push` and are never invalidated, since nothing is ever removed.
#[derive(Debug, Hash, PartialEq, Eq, Clone)]
pub struct IdVec<K, V> {
    vec: Vec<V>,
    _phantom: PhantomData<K>,
}

impl<K, V> Default for IdVec<K, V> {
    fn default() -> Self {
        Self::with_capacity(0)
    }
}

impl<K, V> IdVec<K, V> {
    /// Create a new empty `IdVec` with room for `cap` values.
    pub fn with_capacity(cap: usize) -> Self {
        Self {
            vec: Vec::with_capacity(cap),
            _phantom: PhantomData,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.vec.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.vec.is_empty()
    }

    /// Iterate through values in id order.
    pub fn iter(&self) -> std::slice::Iter<'_, V> {
        self.vec.iter()
    }
}

impl<K: Into<usize>, V> IdVec<K, V> {
    /// Get the value with id `k`.
    /// Ids only come from `push` on this same arena, so `k` is always in range.
    #[inline]
    pub fn get(&self, k: K) -> &V {
        &self.vec[k.into()]
    }
}

impl<K: From<usize>, V> IdVec<K, V> {
    /// Store `v` and return the id it can be retrieved with.
    #[inline]
    pub fn push(&mut self, v: V) -> K {
        let id = self.vec.len().into();
        self.vec.push(v);
        id
    }

    /// Iterate through (id, value) pairs in id order.
    pub fn enumerate(&self) -> impl Iterator<Item = (K, &V)> + '_ {
        self.vec.iter().enumerate().map(|(i, v)| (K::from(i), v))
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq)]
    struct Key(u8);

    impl From<usize> for Key {
        fn from(val: usize) -> Self {
            Self(val as u8)
        }
    }

    impl From<Key> for usize {
        fn from(k: Key) -> usize {
            k.0 as usize
        }
    }

    #[test]
    fn test_push_and_get() {
        let mut ids: IdVec<Key, &str> = IdVec::with_capacity(2);
        let a = ids.push("a");
        let b = ids.push("b");
        assert_eq!(a, Key(0));
        assert_eq!(b, Key(1));
        assert_eq!(*ids.get(b), "b");
        assert_eq!(ids.len(), 2);
    }

    #[test]
    fn test_enumerate() {
        let mut ids: IdVec<Key, char> = IdVec::default();
        assert!(ids.is_empty());
        ids.push('x');
        ids.push('y');
        let pairs: Vec<_> = ids.enumerate().collect();
        assert_eq!(pairs, vec![(Key(0), &'x'), (Key(1), &'y')]);
    }
}
