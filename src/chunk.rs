//! Chunk：固定容量的行组，每列一个 segment

use crate::common::{ColumnId, OlapError, Result};
use crate::field_type::Value;
use crate::segment::{AnySegment, Segment};

#[derive(Debug, Clone, Default)]
pub struct Chunk {
    segments: Vec<AnySegment>,
}

impl Chunk {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_segments(segments: Vec<AnySegment>) -> Result<Self> {
        let mut chunk = Self::new();
        for segment in segments {
            chunk.add_segment(segment)?;
        }
        Ok(chunk)
    }

    /// 追加一列的存储；新 segment 的行数必须与已有列一致
    pub fn add_segment(&mut self, segment: AnySegment) -> Result<()> {
        if !self.segments.is_empty() && segment.size() != self.size() {
            return Err(OlapError::SchemaLocked(format!(
                "segment with {} rows added to chunk with {} rows",
                segment.size(),
                self.size(),
            )));
        }
        self.segments.push(segment);
        Ok(())
    }

    /// 每列追加一个值；先整体校验，校验通过后才写入
    pub fn append(&mut self, row: &[Value]) -> Result<()> {
        if row.len() != self.column_count() {
            return Err(OlapError::ArityMismatch {
                expected: self.column_count(),
                actual:   row.len(),
            });
        }
        for (segment, value) in self.segments.iter().zip(row) {
            match segment {
                AnySegment::Value(s) => value.expect_type(s.column_type())?,
                other                => return Err(OlapError::Immutable(other.kind())),
            }
        }
        for (segment, value) in self.segments.iter_mut().zip(row) {
            segment.append(value)?;
        }
        Ok(())
    }

    pub fn get_segment(&self, column_id: ColumnId) -> Result<&AnySegment> {
        self.segments.get(column_id as usize).ok_or_else(|| OlapError::OutOfBounds(
            format!("column id {column_id} >= {}", self.segments.len()),
        ))
    }

    pub fn segments(&self) -> &[AnySegment] {
        &self.segments
    }

    pub fn column_count(&self) -> usize {
        self.segments.len()
    }

    /// 行数，取第一列的大小；没有列时为 0
    pub fn size(&self) -> usize {
        self.segments.first().map_or(0, |s| s.size())
    }

    pub fn is_mutable(&self) -> bool {
        self.segments.iter().all(AnySegment::is_mutable)
    }

    pub fn estimate_memory_usage(&self) -> usize {
        self.segments.iter().map(|s| s.estimate_memory_usage()).sum()
    }
}
