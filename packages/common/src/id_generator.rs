use crc32fast::Hasher;

/// Derive a short, stable seed from a document id using CRC32
pub fn get_document_seed(document_id: &str) -> String {
    let mut hasher = Hasher::new();
    hasher.update(document_id.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Sequential id generator for blocks within a document
///
/// Ids have the form `<seed>-<n>`. The counter only ever moves forward, so an
/// id handed out once is never produced again by the same generator.
#[derive(Debug, Clone)]
pub struct IdGenerator {
    seed: String,
    count: u64,
}

impl IdGenerator {
    pub fn for_document(document_id: &str) -> Self {
        Self {
            seed: get_document_seed(document_id),
            count: 0,
        }
    }

    pub fn from_seed(seed: impl Into<String>) -> Self {
        Self {
            seed: seed.into(),
            count: 0,
        }
    }

    /// Generate next sequential id
    pub fn new_id(&mut self) -> String {
        self.count += 1;
        format!("{}-{}", self.seed, self.count)
    }

    /// Advance the counter past an id that already exists, so loaded
    /// documents never collide with freshly generated ids.
    pub fn observe(&mut self, existing: &str) {
        let Some(suffix) = existing
            .strip_prefix(self.seed.as_str())
            .and_then(|rest| rest.strip_prefix('-'))
        else {
            return;
        };

        if let Ok(n) = suffix.parse::<u64>() {
            self.count = self.count.max(n);
        }
    }

    pub fn seed(&self) -> &str {
        &self.seed
    }

    /// Number of ids generated or observed so far
    pub fn count(&self) -> u64 {
        self.count
    }
}
