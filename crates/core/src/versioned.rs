//! Generation-stamped values.

use serde::{Deserialize, Serialize};

/// A value paired with a monotonically increasing generation counter.
///
/// The snapshot is replaced wholesale on every refresh/tick; the generation
/// gives derived-view caches a cheap staleness key without relying on object
/// identity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Versioned<T> {
    pub generation: u64,
    pub value: T,
}

impl<T> Versioned<T> {
    pub fn new(generation: u64, value: T) -> Self {
        Self { generation, value }
    }

    /// Wrap a successor value, bumping the generation.
    pub fn next(&self, value: T) -> Self {
        Self {
            generation: self.generation + 1,
            value,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn next_bumps_generation() {
        let v = Versioned::new(3, "a");
        let w = v.next("b");
        assert_eq!(w.generation, 4);
        assert_eq!(w.value, "b");
    }
}
