use alloc::vec::Vec;

use anyhow::{ensure, Result};
use serde::{Deserialize, Serialize};

/// A flat column of repeat counts describing the lengths of the
/// variable-length subsequences at one nesting level.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct SizeColumn {
    pub counts: Vec<u64>,
}

impl SizeColumn {
    pub fn new(counts: Vec<u64>) -> Self {
        SizeColumn { counts }
    }

    /// The number of repeat counts stored.
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Total number of leaf items implied by summing every repeat count.
    ///
    /// A data column governed by this size column holds exactly this many
    /// items.
    pub fn total_items(&self) -> u64 {
        self.counts.iter().sum()
    }

    pub fn as_slice(&self) -> &[u64] {
        &self.counts
    }
}

impl From<Vec<u64>> for SizeColumn {
    fn from(counts: Vec<u64>) -> Self {
        Self::new(counts)
    }
}

/// A flat column of fixed-width leaf items, stored as raw bytes.
///
/// The kernels copy item bytes verbatim, so the column is
/// endianness-agnostic; the `from_*` constructors encode little-endian.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct DataColumn {
    pub bytes: Vec<u8>,
    pub datum_bytes: usize,
}

impl DataColumn {
    pub fn new(bytes: Vec<u8>, datum_bytes: usize) -> Result<Self> {
        ensure!(datum_bytes >= 1, "datum width must be at least one byte");
        ensure!(
            bytes.len() % datum_bytes == 0,
            "column of {} bytes is not a whole number of {}-byte items",
            bytes.len(),
            datum_bytes
        );
        Ok(DataColumn { bytes, datum_bytes })
    }

    /// The number of items stored.
    pub fn num_items(&self) -> usize {
        self.bytes.len() / self.datum_bytes
    }

    pub fn from_u64s(items: &[u64]) -> Self {
        Self::from_le_words(items.iter().map(|x| x.to_le_bytes()))
    }

    pub fn from_i64s(items: &[i64]) -> Self {
        Self::from_le_words(items.iter().map(|x| x.to_le_bytes()))
    }

    pub fn from_f64s(items: &[f64]) -> Self {
        Self::from_le_words(items.iter().map(|x| x.to_le_bytes()))
    }

    fn from_le_words(words: impl Iterator<Item = [u8; 8]>) -> Self {
        let mut bytes = Vec::new();
        for word in words {
            bytes.extend_from_slice(&word);
        }
        DataColumn {
            bytes,
            datum_bytes: 8,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn size_column_totals() {
        let sizes = SizeColumn::new(vec![0, 1, 1, 2, 0, 2]);
        assert_eq!(sizes.len(), 6);
        assert_eq!(sizes.total_items(), 6);
        assert_eq!(SizeColumn::default().total_items(), 0);
    }

    #[test]
    fn data_column_item_accounting() {
        let data = DataColumn::from_u64s(&[1, 2, 3]);
        assert_eq!(data.datum_bytes, 8);
        assert_eq!(data.num_items(), 3);
        assert_eq!(&data.bytes[..8], &1u64.to_le_bytes());

        assert!(DataColumn::new(vec![0; 7], 8).is_err());
        assert!(DataColumn::new(vec![0; 8], 0).is_err());
        assert_eq!(DataColumn::new(vec![0; 6], 3).unwrap().num_items(), 2);
    }

    #[test]
    fn size_column_serde_roundtrip() {
        let sizes = SizeColumn::new(vec![3, 2, 2, 2]);
        let json = serde_json::to_string(&sizes).unwrap();
        assert_eq!(serde_json::from_str::<SizeColumn>(&json).unwrap(), sizes);
    }
}
