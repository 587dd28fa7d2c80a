// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

// Count-prefixed container of homogeneous records
//
// Layout: `[u32 count]` then `count` times `[u32 byte length][record]`.
// The container keeps the encoded bytes and an index of record ranges;
// records are only decoded when read.

use std::ops::Range;

use byteorder::{ByteOrder, LittleEndian};
use tracing::{debug, trace};

use crate::codec::{Cursor, put_u32};
use crate::error::{CodecError, Mismatch};
use crate::schema::Schema;
use crate::view::{View, Viewable};

const COUNT_LEN: usize = 4;
const LENGTH_PREFIX_LEN: usize = 4;

pub struct List<T> {
    view: View<T>,
    buffer: Vec<u8>,
    records: Vec<Range<usize>>,
}

impl<T: Viewable + Schema> List<T> {
    pub fn new() -> Self {
        Self::with_view(View::new())
    }

    pub fn with_view(view: View<T>) -> Self {
        Self {
            view,
            buffer: vec![0; COUNT_LEN],
            records: Vec::new(),
        }
    }

    /// Decode a complete container
    pub fn from_bytes(buffer: &[u8]) -> Result<Self, CodecError> {
        let mut list = Self::new();
        Self::unpack_into(buffer, &mut list)?;
        Ok(list)
    }

    pub fn view(&self) -> &View<T> {
        &self.view
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// The encoded container, count prefix included
    pub fn as_bytes(&self) -> &[u8] {
        &self.buffer
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.buffer
    }

    /// Validate and encode `value` as a new trailing record
    pub fn append(&mut self, value: &T) -> Result<(), CodecError> {
        let count = self.next_count()?;
        let prefix_at = self.buffer.len();
        put_u32(&mut self.buffer, 0);
        let written = match self.view.encode_into(value, &mut self.buffer) {
            Ok(written) => written,
            Err(err) => {
                self.buffer.truncate(prefix_at);
                return Err(err);
            }
        };
        let Ok(record_len) = u32::try_from(written) else {
            self.buffer.truncate(prefix_at);
            return Err(CodecError::ValueShape {
                path: "<record>".to_string(),
                expected: "record shorter than 4 GiB",
            });
        };
        LittleEndian::write_u32(&mut self.buffer[prefix_at..prefix_at + LENGTH_PREFIX_LEN], record_len);
        let start = prefix_at + LENGTH_PREFIX_LEN;
        self.records.push(start..start + written);
        self.write_count(count);
        trace!(index = count, record_len = written, "Appended record");
        Ok(())
    }

    /// Decode every record of `buffer` and append them to `list`
    ///
    /// The whole buffer is scanned and decoded before `list` is touched, so
    /// on error `list` is left exactly as it was. Returns the number of
    /// records appended.
    pub fn unpack_into(buffer: &[u8], list: &mut List<T>) -> Result<usize, CodecError> {
        let scanned = scan(&list.view, buffer)?;
        let added = scanned.len();
        let total = list
            .len()
            .checked_add(added)
            .and_then(|total| u32::try_from(total).ok())
            .ok_or_else(|| CodecError::ValueShape {
                path: "<list>".to_string(),
                expected: "at most u32::MAX records",
            })?;

        list.buffer.reserve(buffer.len().saturating_sub(COUNT_LEN));
        for range in scanned {
            let prefix_at = list.buffer.len();
            list.buffer
                .extend_from_slice(&buffer[range.start - LENGTH_PREFIX_LEN..range.end]);
            let start = prefix_at + LENGTH_PREFIX_LEN;
            list.records.push(start..start + range.len());
        }
        list.write_count(total);
        debug!(added, total, "Unpacked records into list");
        Ok(added)
    }

    /// Decode the record at `index`
    pub fn get(&self, index: usize) -> Option<Result<T, CodecError>> {
        let range = self.records.get(index)?;
        Some(self.decode_range(range))
    }

    /// Encoded bytes of the record at `index`, without its length prefix
    pub fn raw(&self, index: usize) -> Option<&[u8]> {
        self.records.get(index).map(|range| &self.buffer[range.clone()])
    }

    /// Buffer offset where the record at `index` starts
    pub fn record_offset(&self, index: usize) -> Option<usize> {
        self.records.get(index).map(|range| range.start)
    }

    /// Lazily decode records front to back; call again to restart
    pub fn iter(&self) -> ListIter<'_, T> {
        ListIter {
            list: self,
            next: 0,
        }
    }

    /// Decode every record into memory
    pub fn to_vec(&self) -> Result<Vec<T>, CodecError> {
        self.iter().collect()
    }

    fn decode_range(&self, range: &Range<usize>) -> Result<T, CodecError> {
        let (value, _) = self.view.decode(&self.buffer[..range.end], range.start)?;
        Ok(value)
    }

    fn next_count(&self) -> Result<u32, CodecError> {
        u32::try_from(self.records.len() + 1).map_err(|_| CodecError::ValueShape {
            path: "<list>".to_string(),
            expected: "at most u32::MAX records",
        })
    }

    fn write_count(&mut self, count: u32) {
        LittleEndian::write_u32(&mut self.buffer[..COUNT_LEN], count);
    }
}

/// Frame-scan and fully decode `buffer`, returning the record ranges
fn scan<T: Viewable + Schema>(view: &View<T>, buffer: &[u8]) -> Result<Vec<Range<usize>>, CodecError> {
    let mut cursor = Cursor::new(buffer, 0);
    let count = cursor.u32()? as usize;
    cursor.ensure_room(count, LENGTH_PREFIX_LEN + view.min_encoded_len())?;

    let mut ranges = Vec::with_capacity(count);
    for _ in 0..count {
        let declared = cursor.u32()? as usize;
        let start = cursor.position();
        cursor.take(declared)?;
        let end = start + declared;
        let (_, consumed_to) = view.decode(&buffer[..end], start)?;
        if consumed_to != end {
            return Err(CodecError::mismatch(
                start,
                Mismatch::RecordLength {
                    declared,
                    consumed: consumed_to - start,
                },
            ));
        }
        ranges.push(start..end);
    }

    if cursor.remaining() > 0 {
        return Err(CodecError::mismatch(
            cursor.position(),
            Mismatch::TrailingBytes(cursor.remaining()),
        ));
    }
    Ok(ranges)
}

impl<T: Viewable + Schema> Default for List<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for List<T> {
    fn clone(&self) -> Self {
        Self {
            view: self.view.clone(),
            buffer: self.buffer.clone(),
            records: self.records.clone(),
        }
    }
}

impl<T> std::fmt::Debug for List<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("List")
            .field("view", &self.view)
            .field("len", &self.records.len())
            .field("bytes", &self.buffer.len())
            .finish()
    }
}

pub struct ListIter<'a, T> {
    list: &'a List<T>,
    next: usize,
}

impl<T: Viewable + Schema> Iterator for ListIter<'_, T> {
    type Item = Result<T, CodecError>;

    fn next(&mut self) -> Option<Self::Item> {
        let item = self.list.get(self.next)?;
        self.next += 1;
        Some(item)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.list.len().saturating_sub(self.next);
        (remaining, Some(remaining))
    }
}

impl<T: Viewable + Schema> ExactSizeIterator for ListIter<'_, T> {}

impl<'a, T: Viewable + Schema> IntoIterator for &'a List<T> {
    type Item = Result<T, CodecError>;
    type IntoIter = ListIter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn words(n: usize) -> List<String> {
        let mut list = List::new();
        for i in 0..n {
            list.append(&format!("word-{i}")).unwrap();
        }
        list
    }

    #[sr_test_utils::logged_test]
    fn append_updates_count_in_place() {
        let list = words(3);
        assert_eq!(list.len(), 3);
        assert_eq!(LittleEndian::read_u32(&list.as_bytes()[..4]), 3);
        assert_eq!(list.get(1).unwrap().unwrap(), "word-1");
        assert!(list.get(3).is_none());
    }

    #[sr_test_utils::logged_test]
    fn iteration_is_lazy_and_restartable() {
        let list = words(4);
        let mut iter = list.iter();
        assert_eq!(iter.len(), 4);
        assert_eq!(iter.next().unwrap().unwrap(), "word-0");
        assert_eq!(iter.len(), 3);

        let all: Vec<String> = list.iter().collect::<Result<_, _>>().unwrap();
        assert_eq!(all, vec!["word-0", "word-1", "word-2", "word-3"]);
        let again = list.to_vec().unwrap();
        assert_eq!(all, again);
    }

    #[sr_test_utils::logged_test]
    fn unpack_appends_to_existing_records() {
        let source = words(2);
        let mut target = words(1);
        let added = List::unpack_into(source.as_bytes(), &mut target).unwrap();
        assert_eq!(added, 2);
        assert_eq!(target.len(), 3);
        assert_eq!(LittleEndian::read_u32(&target.as_bytes()[..4]), 3);
        assert_eq!(target.to_vec().unwrap(), vec!["word-0", "word-0", "word-1"]);

        let reparsed = List::<String>::from_bytes(target.as_bytes()).unwrap();
        assert_eq!(reparsed.len(), 3);
    }

    #[sr_test_utils::logged_test]
    fn record_length_mismatch_is_detected() {
        let mut bytes = words(1).into_bytes();
        // declare one byte more than the string occupies and supply it
        let declared = LittleEndian::read_u32(&bytes[4..8]) + 1;
        LittleEndian::write_u32(&mut bytes[4..8], declared);
        bytes.push(0);
        let err = List::<String>::from_bytes(&bytes).unwrap_err();
        assert!(matches!(
            err,
            CodecError::SchemaMismatch {
                reason: Mismatch::RecordLength { .. },
                ..
            }
        ));
    }

    #[sr_test_utils::logged_test]
    fn trailing_bytes_are_rejected() {
        let mut bytes = words(2).into_bytes();
        bytes.extend_from_slice(&[1, 2]);
        let mut target = List::<String>::new();
        let err = List::unpack_into(&bytes, &mut target).unwrap_err();
        assert!(matches!(
            err,
            CodecError::SchemaMismatch {
                reason: Mismatch::TrailingBytes(2),
                ..
            }
        ));
        assert!(target.is_empty());
    }

    #[sr_test_utils::logged_test]
    fn empty_buffer_is_truncated() {
        let err = List::<String>::from_bytes(&[]).unwrap_err();
        assert!(matches!(err, CodecError::TruncatedBuffer { offset: 0, .. }));
    }
}
