//! Configuration for the replay engine.

/// When consumed entries leave the log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConsumePolicy {
    /// Delete a group's entries together with its successful commit.
    #[default]
    DeleteOnCommit,
    /// Leave entries in the log; another collaborator removes them later.
    Retain,
}

/// Configuration for replay passes.
#[derive(Debug, Clone)]
pub struct ReplayConfig {
    /// What happens to a group's entries after its commit.
    pub consume: ConsumePolicy,
    /// Refuse to run against a store that does not advertise
    /// `(entity_id, created_at)` scan ordering.
    pub require_ordered_scan: bool,
    /// Stop cleanly after this many groups.
    pub max_groups: Option<usize>,
}

impl ReplayConfig {
    /// Creates the default configuration.
    pub fn new() -> Self {
        Self {
            consume: ConsumePolicy::DeleteOnCommit,
            require_ordered_scan: true,
            max_groups: None,
        }
    }

    /// Sets the consume policy.
    pub fn with_consume(mut self, consume: ConsumePolicy) -> Self {
        self.consume = consume;
        self
    }

    /// Sets whether the store must advertise ordered scans.
    pub fn with_require_ordered_scan(mut self, require: bool) -> Self {
        self.require_ordered_scan = require;
        self
    }

    /// Limits a pass to `max` groups.
    pub fn with_max_groups(mut self, max: usize) -> Self {
        self.max_groups = Some(max);
        self
    }
}

impl Default for ReplayConfig {
    fn default() -> Self {
        Self::new()
    }
}
