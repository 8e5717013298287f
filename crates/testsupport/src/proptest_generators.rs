//! Property-based test generators using proptest.
//!
//! Provides strategies for generating random stream-operation sequences,
//! used to compare the cache against the plain in-memory model.

use proptest::prelude::*;

/// One stream operation against an open handle.
#[derive(Clone, Debug)]
pub enum FileOp {
    Read(usize),
    Write(Vec<u8>),
    SeekSet(u64),
    SeekCurrent(i64),
    SeekEnd(i64),
    Fsync,
}

/// Strategy for a single operation.
///
/// Transfer lengths and seek targets stay within a few pages of a small
/// configured page size so sequences regularly cross page boundaries and
/// force evictions.
pub fn arb_file_op(max_offset: u64) -> impl Strategy<Value = FileOp> {
    let max_len = max_offset as usize / 2;
    prop_oneof![
        (0..max_len).prop_map(FileOp::Read),
        prop::collection::vec(any::<u8>(), 0..max_len).prop_map(FileOp::Write),
        (0..max_offset).prop_map(FileOp::SeekSet),
        (-(max_offset as i64)..max_offset as i64).prop_map(FileOp::SeekCurrent),
        (-(max_offset as i64)..=0).prop_map(FileOp::SeekEnd),
        Just(FileOp::Fsync),
    ]
}

/// Strategy for an operation sequence.
///
/// # Example
///
/// ```
/// use proptest::prelude::*;
/// use testsupport::proptest_generators::arb_file_ops;
///
/// proptest! {
///     #[test]
///     fn sequences_are_bounded(ops in arb_file_ops(512)) {
///         assert!(!ops.is_empty());
///     }
/// }
/// ```
pub fn arb_file_ops(max_offset: u64) -> impl Strategy<Value = Vec<FileOp>> {
    prop::collection::vec(arb_file_op(max_offset), 1..40)
}
