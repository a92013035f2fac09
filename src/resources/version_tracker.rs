/// Version tracker - used to mark CPU-side data that must be re-uploaded.
///
/// GPU mirrors remember the version they last uploaded and compare it
/// against [`ChangeTracker::version`] before each frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ChangeTracker {
    version: u64,
}

impl ChangeTracker {
    #[must_use]
    pub fn new() -> Self {
        Self { version: 0 }
    }

    /// Marks as modified, increments version by 1
    pub fn changed(&mut self) {
        self.version = self.version.wrapping_add(1);
    }

    /// Gets the current version number
    #[must_use]
    pub fn version(&self) -> u64 {
        self.version
    }
}

#[cfg(test)]
mod tests {
    use super::ChangeTracker;

    #[test]
    fn changed_increments_version() {
        let mut tracker = ChangeTracker::new();
        assert_eq!(tracker.version(), 0);
        tracker.changed();
        tracker.changed();
        assert_eq!(tracker.version(), 2);
    }
}
