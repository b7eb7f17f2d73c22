use crate::types::{Field, FieldValues};
use parking_lot::Mutex;

/// Per-request map that concurrent lookups write their fields into.
///
/// Once sealed, further writes are dropped so that lookups finishing after
/// the deadline cannot race with the merge.
#[derive(Default)]
pub struct ResultMap {
    inner: Mutex<Inner>,
}

#[derive(Default)]
struct Inner {
    values: FieldValues,
    sealed: bool,
}

impl ResultMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns false if the map was already sealed and nothing was written.
    pub fn insert_all<I>(&self, values: I) -> bool
    where
        I: IntoIterator<Item = (Field, String)>,
    {
        let mut inner = self.inner.lock();
        if inner.sealed {
            return false;
        }
        inner.values.extend(values);
        true
    }

    /// Closes the map for writing and hands out everything collected so far.
    pub fn seal(&self) -> FieldValues {
        let mut inner = self.inner.lock();
        inner.sealed = true;
        std::mem::take(&mut inner.values)
    }
}
