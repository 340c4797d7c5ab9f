use alloc::vec::Vec;

use anyhow::{anyhow, Result};

/// Per-call cursor state for one explosion descent: the read cursor of
/// every size column plus the checkpoint tables written on entry to each
/// level. O(levels * columns) storage, allocated once per kernel call and
/// discarded on return.
#[derive(Debug)]
pub(crate) struct ExplodeScratch {
    /// Next read position into each size column.
    pub si: Vec<usize>,
    /// Cursor snapshot per level, `num_size_columns` entries per level.
    pub start_si: Vec<usize>,
    /// Data cursor snapshot per level.
    pub start_di: Vec<usize>,
}

impl ExplodeScratch {
    /// Allocates zeroed scratch for `num_levels` levels over
    /// `num_size_columns` size columns.
    ///
    /// Allocation failure is reported as an error so callers can tell it
    /// apart from a zero-length result.
    pub fn new(num_levels: usize, num_size_columns: usize) -> Result<Self> {
        Ok(ExplodeScratch {
            si: zeroed(num_size_columns)?,
            start_si: zeroed(num_levels * num_size_columns)?,
            start_di: zeroed(num_levels)?,
        })
    }
}

fn zeroed(len: usize) -> Result<Vec<usize>> {
    let mut cursors = Vec::new();
    cursors
        .try_reserve_exact(len)
        .map_err(|_| anyhow!("failed to allocate explosion scratch of {len} cursors"))?;
    cursors.resize(len, 0);
    Ok(cursors)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scratch_is_zeroed() {
        let scratch = ExplodeScratch::new(3, 2).unwrap();
        assert_eq!(scratch.si, [0, 0]);
        assert_eq!(scratch.start_si.len(), 6);
        assert_eq!(scratch.start_di.len(), 3);
        assert!(scratch.start_si.iter().all(|&cursor| cursor == 0));
    }
}
