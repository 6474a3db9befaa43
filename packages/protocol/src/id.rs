use crc32fast::Hasher;

use crate::element::ElementId;

/// Derive a short stable seed from a namespace string using CRC32
pub fn namespace_seed(namespace: &str) -> String {
    let mut hasher = Hasher::new();
    hasher.update(namespace.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Sequential id generator for elements created by one engine instance.
///
/// Ids are `{seed}-{count}`. The seed mixes the namespace with the creation
/// time so that two engines (or two sessions over the same saved registry)
/// do not hand out the same ids.
#[derive(Debug, Clone)]
pub struct IdGenerator {
    seed: String,
    count: u64,
}

impl IdGenerator {
    pub fn new(namespace: &str) -> Self {
        let stamp = chrono::Utc::now()
            .timestamp_nanos_opt()
            .unwrap_or_default();
        Self::from_seed(namespace_seed(&format!("{}:{}", namespace, stamp)))
    }

    pub fn from_seed(seed: impl Into<String>) -> Self {
        Self {
            seed: seed.into(),
            count: 0,
        }
    }

    /// Generate next sequential id
    pub fn next_id(&mut self) -> ElementId {
        self.count += 1;
        ElementId::new(format!("{}-{}", self.seed, self.count))
    }

    pub fn seed(&self) -> &str {
        &self.seed
    }
}
