use std::mem;

use super::Segment;
use crate::common::{ChunkId, ChunkOffset, OlapError, PosList, Result, RowId, ScanType};
use crate::field_type::{ColumnValue, Value};

/// 原始编码：下标即 chunk offset
#[derive(Debug, Clone)]
pub struct ValueSegment<T> {
    values: Vec<T>,
}

impl<T: ColumnValue> ValueSegment<T> {
    pub fn new() -> Self {
        Self { values: Vec::new() }
    }

    /// 批量读取时优先用这个，而不是逐行 `read`
    pub fn values(&self) -> &[T] {
        &self.values
    }

    pub fn push(&mut self, value: T) {
        self.values.push(value);
    }
}

impl<T: ColumnValue> Default for ValueSegment<T> {
    fn default() -> Self { Self::new() }
}

impl<T: ColumnValue> FromIterator<T> for ValueSegment<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self { values: iter.into_iter().collect() }
    }
}

impl<T: ColumnValue> Segment for ValueSegment<T> {
    fn read(&self, offset: ChunkOffset) -> Result<Value> {
        self.values
            .get(offset as usize)
            .cloned()
            .map(T::into_value)
            .ok_or_else(|| OlapError::OutOfBounds(
                format!("value segment offset {offset} >= {}", self.values.len()),
            ))
    }

    fn append(&mut self, value: &Value) -> Result<()> {
        self.values.push(T::from_value(value)?);
        Ok(())
    }

    fn size(&self) -> usize { self.values.len() }

    fn estimate_memory_usage(&self) -> usize {
        mem::size_of::<T>() * self.values.len()
    }

    fn scan(
        &self,
        scan_type:    ScanType,
        search_value: &Value,
        chunk_id:     ChunkId,
        pos_list:     &mut PosList,
    ) -> Result<()> {
        let search = T::from_value(search_value)?;
        let hits = self.values
            .iter()
            .enumerate()
            .filter(|(_, v)| scan_type.matches(v.compare(&search)))
            .map(|(offset, _)| RowId::new(chunk_id, offset as ChunkOffset));
        pos_list.extend(hits);
        Ok(())
    }
}
