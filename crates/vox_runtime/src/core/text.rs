//! Immutable heap strings with a precomputed hash.

use ahash::RandomState;
use std::borrow::Cow;
use std::fmt;
use std::hash::{BuildHasher, Hasher};
use std::rc::Rc;

/// Fixed-seed hasher state. Seeds are constant so a given byte sequence
/// always hashes to the same value, in every heap and every run.
pub fn fast_hasher() -> RandomState {
    RandomState::with_seeds(0, 0, 0, 0)
}

/// Hash of a byte sequence as stored in `VoxString::hash`.
#[inline]
pub fn hash_bytes(bytes: &[u8]) -> u64 {
    let mut hasher = fast_hasher().build_hasher();
    hasher.write(bytes);
    hasher.finish()
}

/// String object payload.
///
/// The bytes sit behind an `Rc` so method and field tables can key on them
/// without copying. Content is not required to be valid UTF-8.
#[derive(Clone)]
pub struct VoxString {
    hash: u64,
    chars: Rc<Vec<u8>>,
}

impl VoxString {
    /// Takes ownership of `chars`; the buffer is moved, not copied.
    pub fn from_vec(chars: Vec<u8>) -> Self {
        let hash = hash_bytes(&chars);
        Self { hash, chars: Rc::new(chars) }
    }

    /// Copies `chars` into a fresh buffer.
    pub fn from_bytes(chars: &[u8]) -> Self {
        Self::from_vec(chars.to_vec())
    }

    #[inline]
    pub fn hash(&self) -> u64 {
        self.hash
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.chars.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }

    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.chars
    }

    pub fn to_str_lossy(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.chars)
    }

    pub(crate) fn shared_chars(&self) -> Rc<Vec<u8>> {
        Rc::clone(&self.chars)
    }

    /// Content equality with the hash as a fast reject.
    pub fn content_eq(&self, other: &VoxString) -> bool {
        if self.hash != other.hash {
            return false;
        }
        if Rc::ptr_eq(&self.chars, &other.chars) {
            return true;
        }
        self.chars.as_slice() == other.chars.as_slice()
    }
}

impl fmt::Debug for VoxString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.to_str_lossy())
    }
}
