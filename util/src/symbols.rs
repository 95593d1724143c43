use std::hash::BuildHasher;

use hashbrown::hash_map::{HashMap, RawEntryMut};

use crate::Hasher;

/// Interner for identifiers that only ever grow, such as execution identifiers.
///
/// Every string is stored once, back to back in a single buffer. The lookup map stores
/// only keys (with `()` values) and is probed by the hash of the string, so the
/// strings themselves are never duplicated into it.
#[derive(Debug)]
pub struct Symbols<K> {
    lookup: HashMap<K, (), Hasher>,
    /// end offset of each interned string in `buf`, indexed by key:
    ends: Vec<usize>,
    buf: String,
}

impl<K> Default for Symbols<K> {
    fn default() -> Self {
        Self::with_capacity_and_avg_len(0, 0)
    }
}

impl<K> Symbols<K> {
    pub fn with_capacity_and_avg_len(cap: usize, avg_len: usize) -> Self {
        Self {
            lookup: HashMap::with_capacity_and_hasher(cap, Hasher::default()),
            ends: Vec::with_capacity(cap),
            buf: String::with_capacity(cap * avg_len),
        }
    }

    /// Number of distinct strings interned.
    #[inline]
    pub fn len(&self) -> usize {
        self.ends.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.ends.is_empty()
    }
}

impl<K> Symbols<K>
where
    K: Copy + Into<usize> + From<usize>,
{
    /// Intern `s`, returning its key and whether it was newly added.
    pub fn intern(&mut self, s: &str) -> (K, bool) {
        let hash = self.lookup.hasher().hash_one(s);
        let Self {
            lookup, ends, buf, ..
        } = self;

        let entry = lookup
            .raw_entry_mut()
            .from_hash(hash, |k| slice(ends.as_slice(), buf.as_str(), (*k).into()) == s);

        match entry {
            RawEntryMut::Occupied(entry) => (*entry.into_key(), false),
            RawEntryMut::Vacant(entry) => {
                buf.push_str(s);
                ends.push(buf.len());
                let k = K::from(ends.len() - 1);
                let hasher = Hasher::default();
                entry.insert_with_hasher(hash, k, (), |k| {
                    hasher.hash_one(slice(ends.as_slice(), buf.as_str(), (*k).into()))
                });
                (k, true)
            }
        }
    }

    /// Look up the key for `s` without interning it.
    pub fn find(&self, s: &str) -> Option<K> {
        let hash = self.lookup.hasher().hash_one(s);
        self.lookup
            .raw_entry()
            .from_hash(hash, |k| slice(&self.ends, &self.buf, (*k).into()) == s)
            .map(|(k, _)| *k)
    }

    /// Get the string interned under `k`.
    #[inline]
    pub fn get(&self, k: K) -> &str {
        slice(&self.ends, &self.buf, k.into())
    }
}

fn slice<'a>(ends: &[usize], buf: &'a str, idx: usize) -> &'a str {
    let start = if idx == 0 { 0 } else { ends[idx - 1] };
    &buf[start..ends[idx]]
}
