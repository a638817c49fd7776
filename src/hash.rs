//! Slot placement.
//!
//! The tree never compares keys for ordering. Where a key goes is decided by
//! a [`SlotHasher`]: a pure function of `(order, level, key)` returning the
//! child slot to follow at that level. The same key must map to the same
//! slot for the same `(order, level)` every time, or inserted keys become
//! unreachable.
//!
//! The default [`ProbeHasher`] reduces a key to a `u64` digest with a
//! [`KeyDigest`] strategy and then runs the probing scheme from
//! "ANE – Árvore N-ária de Espalhamento Naturalmente Balanceada"
//! (Silva et al., 2006):
//!
//! ```text
//! for i in 0..=min(key, PROBE_LIMIT - 1):
//!     r = (key + i) mod (order + level + i)
//!     if r < order: return r
//! ```
//!
//! The scan is capped at [`PROBE_LIMIT`] steps. Below the root a large key
//! only resolves at a divisor of `key - order - level` (or a neighbour),
//! which for a random `u64` can lie near `key / 2`. Any key the scan settles
//! within the limit is placed exactly as by the uncapped scan; the rest go
//! through [`OnExhaustion`].

// =============================================================================
// Traits
// =============================================================================

/// Maps a key at a given tree level to a child slot.
///
/// Implementations must return a value in `0..order`. The tree checks every
/// result and reports anything else as
/// [`AneError::InvalidHashResult`](crate::AneError::InvalidHashResult).
pub trait SlotHasher<K: ?Sized> {
    fn slot(&self, order: usize, level: usize, key: &K) -> usize;
}

/// Any `Fn(order, level, &key) -> slot` closure is a hasher.
impl<K: ?Sized, F> SlotHasher<K> for F
where
    F: Fn(usize, usize, &K) -> usize,
{
    #[inline]
    fn slot(&self, order: usize, level: usize, key: &K) -> usize {
        self(order, level, key)
    }
}

/// Reduces a key to the integer fed into the probing scheme.
pub trait KeyDigest<K: ?Sized> {
    fn digest(&self, key: &K) -> u64;
}

// =============================================================================
// Digests
// =============================================================================

/// Integer keys are their own digest.
///
/// Signed integers are sign-extended to 64 bits and reinterpreted, so `-1`
/// digests to `u64::MAX`. 128-bit integers keep their low 64 bits.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Identity;

macro_rules! identity_digest {
    ($($t:ty),* $(,)?) => {
        $(
            impl KeyDigest<$t> for Identity {
                #[inline]
                fn digest(&self, key: &$t) -> u64 {
                    *key as u64
                }
            }
        )*
    };
}

identity_digest!(u8, u16, u32, u64, u128, usize, i8, i16, i32, i64, i128, isize);

impl KeyDigest<bool> for Identity {
    #[inline]
    fn digest(&self, key: &bool) -> u64 {
        u64::from(*key)
    }
}

impl KeyDigest<char> for Identity {
    #[inline]
    fn digest(&self, key: &char) -> u64 {
        u64::from(u32::from(*key))
    }
}

/// Bernstein's djb2 over the key's bytes (`h = h * 33 + byte`, seed 5381).
///
/// Works for anything byte-like: `str`, `String`, `[u8]`, `Vec<u8>`.
/// Bytes are added as unsigned values, so non-ASCII keys differ from a
/// `char`-signed C implementation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Djb2;

impl Djb2 {
    const SEED: u64 = 5381;

    pub fn hash_bytes(bytes: &[u8]) -> u64 {
        bytes.iter().fold(Self::SEED, |h, &b| {
            (h << 5).wrapping_add(h).wrapping_add(u64::from(b))
        })
    }
}

impl<K: AsRef<[u8]> + ?Sized> KeyDigest<K> for Djb2 {
    #[inline]
    fn digest(&self, key: &K) -> u64 {
        Self::hash_bytes(key.as_ref())
    }
}

// =============================================================================
// Probing hasher
// =============================================================================

/// What [`probe`] returns when no `r < order` turns up before `i` passes the
/// key or reaches [`PROBE_LIMIT`].
///
/// This happens for small keys deep in the tree, e.g. with order 2 every key
/// in `2..2 + level` exhausts the scan, and for a small share of large keys
/// below the root.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OnExhaustion {
    /// Fold the last probe into range with `r % order`.
    #[default]
    Wrap,
    /// Return the last probe unchanged. It is out of range, so the tree
    /// rejects the operation with `InvalidHashResult`.
    Reject,
}

/// The default hasher: digest the key, then probe.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProbeHasher<D = Identity> {
    digest: D,
    on_exhaustion: OnExhaustion,
}

impl<D> ProbeHasher<D> {
    pub fn new(digest: D) -> Self {
        Self {
            digest,
            on_exhaustion: OnExhaustion::default(),
        }
    }

    pub fn with_exhaustion(mut self, on_exhaustion: OnExhaustion) -> Self {
        self.on_exhaustion = on_exhaustion;
        self
    }

    pub fn on_exhaustion(&self) -> OnExhaustion {
        self.on_exhaustion
    }

    pub fn digest(&self) -> &D {
        &self.digest
    }
}

impl<K: ?Sized, D: KeyDigest<K>> SlotHasher<K> for ProbeHasher<D> {
    #[inline]
    fn slot(&self, order: usize, level: usize, key: &K) -> usize {
        probe(order, level, self.digest.digest(key), self.on_exhaustion)
    }
}

/// Maximum number of steps [`probe`] takes before falling back to
/// [`OnExhaustion`].
pub const PROBE_LIMIT: u64 = 1 << 12;

/// Probe for the slot of integer `key` at `level` in a tree of `order`.
///
/// Arithmetic runs in `u128` so `key + i` never overflows. With `order <= 1`
/// the answer is always slot 0. At most `min(key + 1, PROBE_LIMIT)` steps
/// are taken.
pub fn probe(order: usize, level: usize, key: u64, on_exhaustion: OnExhaustion) -> usize {
    if order <= 1 {
        return 0;
    }

    let order_w = order as u128;
    let base = order_w + level as u128;
    let last = u128::from(key.min(PROBE_LIMIT - 1));
    let key = u128::from(key);

    let mut r = 0u128;
    let mut i = 0u128;
    while i <= last {
        r = (key + i) % (base + i);
        if r < order_w {
            return r as usize;
        }
        i += 1;
    }

    match on_exhaustion {
        OnExhaustion::Wrap => (r % order_w) as usize,
        OnExhaustion::Reject => usize::try_from(r).unwrap_or(usize::MAX),
    }
}
