/// A bounded run of sequentially numbered lines.
///
/// Owned by the scanner loop while filling, then moved wholesale into one
/// worker; nothing mutates a batch after hand-off. Line numbers come from a
/// single producer and are strictly increasing, so they are unique within a
/// batch.
#[derive(Debug)]
pub struct Batch {
    entries: Vec<(u64, String)>,
    capacity: usize,
}

impl Batch {
    /// Creates an empty batch. `capacity` must be at least 1.
    pub fn new(capacity: usize) -> Self {
        debug_assert!(capacity >= 1);
        Self {
            entries: Vec::with_capacity(capacity),
            capacity,
        }
    }

    /// Appends one numbered line.
    pub fn push(&mut self, line_number: u64, text: String) {
        self.entries.push((line_number, text));
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether the batch has reached its capacity and must be flushed.
    pub fn is_full(&self) -> bool {
        self.entries.len() >= self.capacity
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Consumes the batch, yielding its lines in arrival order.
    pub fn into_lines(self) -> impl Iterator<Item = (u64, String)> {
        self.entries.into_iter()
    }
}
