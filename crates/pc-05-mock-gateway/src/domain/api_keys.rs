//! API keys accepted by the gateway.

/// Registered API keys.
///
/// Lookup compares against every key in constant time, so neither the
/// position of a match nor a common prefix is observable through timing.
#[derive(Clone, Default)]
pub struct ApiKeyRegistry {
    keys: Vec<String>,
}

impl ApiKeyRegistry {
    pub fn new<I, K>(keys: I) -> Self
    where
        I: IntoIterator<Item = K>,
        K: Into<String>,
    {
        Self {
            keys: keys.into_iter().map(Into::into).collect(),
        }
    }

    /// Whether `candidate` is a registered key.
    #[must_use]
    pub fn contains(&self, candidate: &str) -> bool {
        self.keys
            .iter()
            .fold(false, |found, key| constant_time_compare(candidate, key) | found)
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

impl std::fmt::Debug for ApiKeyRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiKeyRegistry")
            .field("keys", &self.keys.len())
            .finish()
    }
}

/// Constant-time string comparison.
///
/// SECURITY: takes the same time regardless of how many bytes match. Inputs
/// of different length are padded with different bytes so they never compare
/// equal, and the length check itself is constant-time.
pub fn constant_time_compare(a: &str, b: &str) -> bool {
    use subtle::ConstantTimeEq;

    let max_len = std::cmp::max(a.len(), b.len());
    let mut a_padded = vec![0u8; max_len];
    let mut b_padded = vec![0xFFu8; max_len];
    a_padded[..a.len()].copy_from_slice(a.as_bytes());
    b_padded[..b.len()].copy_from_slice(b.as_bytes());

    let lengths_equal = a.len().ct_eq(&b.len());
    let contents_equal = a_padded.ct_eq(&b_padded);
    (lengths_equal & contents_equal).into()
}
