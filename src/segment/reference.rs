use std::fmt;
use std::mem;
use std::sync::Arc;

use super::Segment;
use crate::common::{
    ChunkId, ChunkOffset, ColumnId, ColumnType, OlapError, PosList, Result, RowId, ScanType,
};
use crate::field_type::Value;
use crate::table::Table;

/// 不存值的间接层：第 i 行 = `referenced_table` 中 `pos_list[i]` 那一行
///
/// `pos_list` 里的地址总是直接指向基表存储，不会再指向另一个 reference segment，
/// 因此读取只跳一次。这一点由 `TableScan` 构建输出时保证。
#[derive(Clone)]
pub struct ReferenceSegment {
    referenced_table:     Arc<Table>,
    referenced_column_id: ColumnId,
    pos_list:             Arc<PosList>,
}

impl ReferenceSegment {
    pub fn new(
        referenced_table:     Arc<Table>,
        referenced_column_id: ColumnId,
        pos_list:             Arc<PosList>,
    ) -> Self {
        Self { referenced_table, referenced_column_id, pos_list }
    }

    pub fn pos_list(&self) -> &Arc<PosList> {
        &self.pos_list
    }

    pub fn referenced_table(&self) -> &Arc<Table> {
        &self.referenced_table
    }

    pub fn referenced_column_id(&self) -> ColumnId {
        self.referenced_column_id
    }

    pub fn column_type(&self) -> Result<ColumnType> {
        self.referenced_table.column_type(self.referenced_column_id)
    }

    fn resolve(&self, row_id: RowId) -> Result<Value> {
        self.referenced_table.get_value(row_id, self.referenced_column_id)
    }
}

impl Segment for ReferenceSegment {
    fn read(&self, offset: ChunkOffset) -> Result<Value> {
        let row_id = self.pos_list.get(offset as usize).ok_or_else(|| OlapError::OutOfBounds(
            format!("reference segment offset {offset} >= {}", self.pos_list.len()),
        ))?;
        self.resolve(*row_id)
    }

    fn append(&mut self, _value: &Value) -> Result<()> {
        Err(OlapError::Immutable("ReferenceSegment"))
    }

    fn size(&self) -> usize { self.pos_list.len() }

    fn estimate_memory_usage(&self) -> usize {
        self.pos_list.len() * mem::size_of::<RowId>()
            + mem::size_of::<Arc<PosList>>()
            + mem::size_of::<Arc<Table>>()
            + mem::size_of::<ColumnId>()
    }

    /// 命中时写出的是基表 RowId，而不是本 segment 内的位置，
    /// 所以对扫描结果再扫描仍然只有一跳。`chunk_id` 不参与。
    fn scan(
        &self,
        scan_type:    ScanType,
        search_value: &Value,
        _chunk_id:    ChunkId,
        pos_list:     &mut PosList,
    ) -> Result<()> {
        search_value.expect_type(self.column_type()?)?;
        for &row_id in self.pos_list.iter() {
            let value = self.resolve(row_id)?;
            if scan_type.matches(value.compare(search_value)?) {
                pos_list.push(row_id);
            }
        }
        Ok(())
    }
}

impl fmt::Debug for ReferenceSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReferenceSegment")
            .field("referenced_column_id", &self.referenced_column_id)
            .field("rows", &self.pos_list.len())
            .finish()
    }
}
