use serde::Serialize;

/// Outcome of a completed import.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ImportReport {
    pub created: usize,
    pub updated: usize,
    pub total_read: usize,
}

impl ImportReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_created(&mut self) {
        self.created += 1;
        self.total_read += 1;
    }

    pub fn record_updated(&mut self) {
        self.updated += 1;
        self.total_read += 1;
    }
}
