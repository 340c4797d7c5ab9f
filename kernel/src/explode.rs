//! Explosion kernels: materialize the broadcast structure implied by a
//! stack of shredded size columns into flat repeat counts or flat data.

use alloc::vec;
use alloc::vec::Vec;

use anyhow::{ensure, Result};

use crate::scratch::ExplodeScratch;

/// Receives what one descent emits: a repeat count at every inner node and
/// a data-cursor position at every leaf.
trait Sink {
    fn node(&mut self, repeat: u64);
    fn leaf(&mut self, di: usize);
}

/// Depth-first walk over the nesting levels of one explosion call.
///
/// `si[c]` advances monotonically through size column `c`. On entry to a
/// level every cursor is checkpointed; each sibling iteration then rewinds
/// the cursors of all columns except the one the level iterates, which is
/// consumed serially across siblings. The data cursor `di` follows the
/// same rule against `data_size_column`.
struct Descent<'a> {
    level_to_column: &'a [u32],
    size_columns: &'a [&'a [u64]],
    /// Column whose consumption the data cursor tracks; `None` for the
    /// size-only variant.
    data_size_column: Option<usize>,
    scratch: &'a mut ExplodeScratch,
    di: usize,
}

impl Descent<'_> {
    fn entry<S: Sink>(&mut self, levi: usize, sink: &mut S) {
        if levi == self.level_to_column.len() {
            sink.leaf(self.di);
            self.di += 1;
            return;
        }

        let coli = self.level_to_column[levi] as usize;
        let repeat = self.size_columns[coli][self.scratch.si[coli]];
        self.scratch.si[coli] += 1;
        sink.node(repeat);

        let num_cols = self.size_columns.len();
        let checkpoint = levi * num_cols;
        self.scratch.start_si[checkpoint..checkpoint + num_cols]
            .copy_from_slice(&self.scratch.si);
        self.scratch.start_di[levi] = self.di;

        for _ in 0..repeat {
            for j in 0..num_cols {
                if j != coli {
                    self.scratch.si[j] = self.scratch.start_si[checkpoint + j];
                }
            }
            if self.data_size_column != Some(coli) {
                self.di = self.scratch.start_di[levi];
            }
            self.entry(levi + 1, sink);
        }
    }
}

fn run<S: Sink>(
    num_entries: usize,
    level_to_column: &[u32],
    size_columns: &[&[u64]],
    data_size_column: Option<usize>,
    sink: &mut S,
) -> Result<()> {
    ensure!(
        level_to_column
            .iter()
            .all(|&coli| (coli as usize) < size_columns.len()),
        "level map references a size column out of range (have {})",
        size_columns.len()
    );

    let mut scratch = ExplodeScratch::new(level_to_column.len(), size_columns.len())?;
    let mut descent = Descent {
        level_to_column,
        size_columns,
        data_size_column,
        scratch: &mut scratch,
        di: 0,
    };
    for _ in 0..num_entries {
        descent.entry(0, sink);
    }
    Ok(())
}

/// Sink for the size variant: the repeat counts themselves.
struct SizeSink<'a> {
    out: Option<&'a mut [u64]>,
    written: usize,
}

impl Sink for SizeSink<'_> {
    #[inline]
    fn node(&mut self, repeat: u64) {
        if let Some(out) = self.out.as_deref_mut() {
            out[self.written] = repeat;
        }
        self.written += 1;
    }

    #[inline]
    fn leaf(&mut self, _di: usize) {}
}

/// Sink for the data variant at a compile-time item width.
struct FixedWidthSink<'a, const W: usize> {
    data: &'a [u8],
    out: Option<&'a mut [u8]>,
    written: usize,
}

impl<const W: usize> Sink for FixedWidthSink<'_, W> {
    #[inline]
    fn node(&mut self, _repeat: u64) {}

    #[inline]
    fn leaf(&mut self, di: usize) {
        if let Some(out) = self.out.as_deref_mut() {
            out[self.written * W..(self.written + 1) * W]
                .copy_from_slice(&self.data[di * W..(di + 1) * W]);
        }
        self.written += 1;
    }
}

/// Bytewise fallback sink for item widths without a monomorphic descent.
struct AnyWidthSink<'a> {
    datum_bytes: usize,
    data: &'a [u8],
    out: Option<&'a mut [u8]>,
    written: usize,
}

impl Sink for AnyWidthSink<'_> {
    #[inline]
    fn node(&mut self, _repeat: u64) {}

    #[inline]
    fn leaf(&mut self, di: usize) {
        let width = self.datum_bytes;
        if let Some(out) = self.out.as_deref_mut() {
            out[self.written * width..(self.written + 1) * width]
                .copy_from_slice(&self.data[di * width..(di + 1) * width]);
        }
        self.written += 1;
    }
}

/// Sink for the data variant over a typed item slice.
struct TypedSink<'a, T: Copy> {
    data: &'a [T],
    out: Option<&'a mut [T]>,
    written: usize,
}

impl<T: Copy> Sink for TypedSink<'_, T> {
    #[inline]
    fn node(&mut self, _repeat: u64) {}

    #[inline]
    fn leaf(&mut self, di: usize) {
        if let Some(out) = self.out.as_deref_mut() {
            out[self.written] = self.data[di];
        }
        self.written += 1;
    }
}

/// Explodes the jagged shape dictated by `level_to_column` and
/// `size_columns` into a flat sequence of repeat counts, one count per
/// inner node in depth-first pre-order, and returns how many were emitted.
///
/// Each level reads its repeat counts from
/// `size_columns[level_to_column[level]]`. A column appearing at several
/// levels is consumed serially through all of its occurrences over the
/// whole traversal, while every other column is rewound for each sibling
/// subtree.
///
/// With `exploded = None` this is the dry run: cursor motion is identical
/// to the fill phase and nothing is written, so the returned length is the
/// exact capacity a subsequent fill requires. With `Some(out)`, `out` must
/// have at least that capacity.
pub fn explode_size(
    num_entries: usize,
    level_to_column: &[u32],
    size_columns: &[&[u64]],
    exploded: Option<&mut [u64]>,
) -> Result<usize> {
    let mut sink = SizeSink {
        out: exploded,
        written: 0,
    };
    run(num_entries, level_to_column, size_columns, None, &mut sink)?;
    Ok(sink.written)
}

/// Explodes the data column governed by `size_columns[data_size_column]`
/// into the fully broadcast flat item sequence, one `datum_bytes`-wide
/// item per leaf of the exploded shape, and returns the item count.
///
/// The data cursor advances with its governing size column and is rewound
/// wherever some other column drives the iteration, so each source item is
/// duplicated once per leaf that replays it. `exploded = None` is the dry
/// run; `data` is never read in that phase.
pub fn explode_data(
    num_entries: usize,
    level_to_column: &[u32],
    size_columns: &[&[u64]],
    data_size_column: u32,
    datum_bytes: usize,
    data: &[u8],
    exploded: Option<&mut [u8]>,
) -> Result<usize> {
    ensure!(
        (data_size_column as usize) < size_columns.len(),
        "data size column {} out of range (have {})",
        data_size_column,
        size_columns.len()
    );
    ensure!(datum_bytes >= 1, "datum width must be at least one byte");

    let dsc = Some(data_size_column as usize);
    // Monomorphic descents for the item widths the engine actually stores;
    // anything else takes the bytewise path.
    match datum_bytes {
        1 => run_fixed::<1>(num_entries, level_to_column, size_columns, dsc, data, exploded),
        2 => run_fixed::<2>(num_entries, level_to_column, size_columns, dsc, data, exploded),
        4 => run_fixed::<4>(num_entries, level_to_column, size_columns, dsc, data, exploded),
        8 => run_fixed::<8>(num_entries, level_to_column, size_columns, dsc, data, exploded),
        _ => {
            let mut sink = AnyWidthSink {
                datum_bytes,
                data,
                out: exploded,
                written: 0,
            };
            run(num_entries, level_to_column, size_columns, dsc, &mut sink)?;
            Ok(sink.written)
        }
    }
}

fn run_fixed<const W: usize>(
    num_entries: usize,
    level_to_column: &[u32],
    size_columns: &[&[u64]],
    data_size_column: Option<usize>,
    data: &[u8],
    exploded: Option<&mut [u8]>,
) -> Result<usize> {
    let mut sink = FixedWidthSink::<W> {
        data,
        out: exploded,
        written: 0,
    };
    run(
        num_entries,
        level_to_column,
        size_columns,
        data_size_column,
        &mut sink,
    )?;
    Ok(sink.written)
}

/// [`explode_data`] over a typed item slice instead of raw bytes, for
/// in-process callers whose columns are already `&[T]`.
pub fn explode_data_typed<T: Copy>(
    num_entries: usize,
    level_to_column: &[u32],
    size_columns: &[&[u64]],
    data_size_column: u32,
    data: &[T],
    exploded: Option<&mut [T]>,
) -> Result<usize> {
    ensure!(
        (data_size_column as usize) < size_columns.len(),
        "data size column {} out of range (have {})",
        data_size_column,
        size_columns.len()
    );

    let mut sink = TypedSink {
        data,
        out: exploded,
        written: 0,
    };
    run(
        num_entries,
        level_to_column,
        size_columns,
        Some(data_size_column as usize),
        &mut sink,
    )?;
    Ok(sink.written)
}

/// Two-phase [`explode_size`]: dry-run for the exact length, allocate,
/// fill.
pub fn explode_size_to_vec(
    num_entries: usize,
    level_to_column: &[u32],
    size_columns: &[&[u64]],
) -> Result<Vec<u64>> {
    let len = explode_size(num_entries, level_to_column, size_columns, None)?;
    let mut exploded = vec![0u64; len];
    let filled = explode_size(num_entries, level_to_column, size_columns, Some(&mut exploded))?;
    debug_assert_eq!(filled, len, "fill phase diverged from dry run");
    log::debug!(
        "exploded {} levels over {} size columns into {} repeats",
        level_to_column.len(),
        size_columns.len(),
        len
    );
    Ok(exploded)
}

/// Two-phase [`explode_data`]: dry-run for the exact item count, allocate,
/// fill.
pub fn explode_data_to_vec(
    num_entries: usize,
    level_to_column: &[u32],
    size_columns: &[&[u64]],
    data_size_column: u32,
    datum_bytes: usize,
    data: &[u8],
) -> Result<Vec<u8>> {
    let len = explode_data(
        num_entries,
        level_to_column,
        size_columns,
        data_size_column,
        datum_bytes,
        data,
        None,
    )?;
    let mut exploded = vec![0u8; len * datum_bytes];
    let filled = explode_data(
        num_entries,
        level_to_column,
        size_columns,
        data_size_column,
        datum_bytes,
        data,
        Some(&mut exploded),
    )?;
    debug_assert_eq!(filled, len, "fill phase diverged from dry run");
    log::debug!(
        "exploded data column {} into {} items of {} bytes",
        data_size_column,
        len,
        datum_bytes
    );
    Ok(exploded)
}
