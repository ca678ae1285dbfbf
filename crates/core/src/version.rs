//! Record versioning for optimistic concurrency.

/// A persisted record whose mutable state is tracked by a monotonically
/// increasing version.
///
/// The store bumps the version on every successful conditional write, so a
/// reader can submit "apply this only if nobody changed it since I looked".
pub trait Versioned {
    /// Strongly-typed record identifier.
    type Id: Clone + Eq + core::hash::Hash + core::fmt::Debug;

    /// Returns the record identifier.
    fn id(&self) -> &Self::Id;

    /// Version of the record's mutable state (starts at 1 on insert).
    fn version(&self) -> u64;
}

/// Optimistic concurrency expectation for a conditional write.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ExpectedVersion {
    /// Skip version checking; the store applies the write against whatever
    /// state it holds at commit time.
    Any,
    /// Require the record to be at an exact version.
    Exact(u64),
}

impl ExpectedVersion {
    pub fn matches(self, actual: u64) -> bool {
        match self {
            ExpectedVersion::Any => true,
            ExpectedVersion::Exact(v) => v == actual,
        }
    }
}
