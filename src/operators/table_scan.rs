use std::sync::Arc;

use tracing::{debug, trace};

use super::Operator;
use crate::chunk::Chunk;
use crate::common::{ChunkId, ColumnId, OlapError, PosList, Result, ScanType};
use crate::field_type::Value;
use crate::segment::{AnySegment, ReferenceSegment, Segment};
use crate::table::Table;

/// 单列谓词过滤：`column <scan_type> search_value`
///
/// 输出表与输入表列相同，只有一个由 reference segment 组成的 chunk，
/// 所有列共享同一个位置列表；没有命中时输出表只有一个空 chunk。
/// 输入本身是视图时，输出直接引用其基表，间接层始终只有一跳。
#[derive(Debug, Clone)]
pub struct TableScan {
    input:        Arc<Table>,
    column_id:    ColumnId,
    scan_type:    ScanType,
    search_value: Value,
}

impl TableScan {
    pub fn new(
        input:        Arc<Table>,
        column_id:    ColumnId,
        scan_type:    ScanType,
        search_value: impl Into<Value>,
    ) -> Self {
        Self { input, column_id, scan_type, search_value: search_value.into() }
    }

    pub fn input(&self) -> &Arc<Table> {
        &self.input
    }

    pub fn column_id(&self) -> ColumnId {
        self.column_id
    }

    pub fn scan_type(&self) -> ScanType {
        self.scan_type
    }

    pub fn search_value(&self) -> &Value {
        &self.search_value
    }

    /// 输出列应当引用的表和列
    ///
    /// 直接存储的输入引用自身；由 reference segment 组成的输入引用它们共同的基表。
    /// 空 chunk 不参与判断。
    fn resolve_targets(&self) -> Result<(Arc<Table>, Vec<ColumnId>)> {
        let mut base: Option<(Arc<Table>, Vec<ColumnId>)> = None;
        let mut has_direct = false;

        for (chunk_id, chunk) in self.input.chunks().iter().enumerate() {
            if chunk.size() == 0 {
                continue;
            }
            let segments = chunk.segments();
            let refs: Vec<&ReferenceSegment> =
                segments.iter().filter_map(AnySegment::as_reference).collect();
            if refs.is_empty() {
                has_direct = true;
                continue;
            }
            if refs.len() != segments.len() {
                return Err(invalid_reference(chunk_id, "mixes reference and stored segments"));
            }

            let first = refs[0];
            let shared = refs.iter().all(|r| {
                Arc::ptr_eq(r.referenced_table(), first.referenced_table())
                    && Arc::ptr_eq(r.pos_list(), first.pos_list())
            });
            if !shared {
                return Err(invalid_reference(chunk_id, "columns disagree on table or position list"));
            }

            let column_ids: Vec<ColumnId> = refs.iter().map(|r| r.referenced_column_id()).collect();
            match &base {
                None => base = Some((first.referenced_table().clone(), column_ids)),
                Some((table, known)) => {
                    if !Arc::ptr_eq(table, first.referenced_table()) || *known != column_ids {
                        return Err(invalid_reference(chunk_id, "chunks reference different base columns"));
                    }
                }
            }
        }

        match base {
            Some(_) if has_direct => Err(OlapError::InvalidReference(
                "input mixes stored and reference chunks".into(),
            )),
            Some((table, column_ids)) => {
                let nested = table.chunks()
                    .iter()
                    .flat_map(Chunk::segments)
                    .any(|s| s.as_reference().is_some());
                if nested {
                    return Err(OlapError::InvalidReference(
                        "referenced table is itself a view".into(),
                    ));
                }
                Ok((table, column_ids))
            }
            None => {
                let column_ids = (0..self.input.column_count()).map(|id| id as ColumnId).collect();
                Ok((self.input.clone(), column_ids))
            }
        }
    }
}

impl Operator for TableScan {
    fn execute(&self) -> Result<Arc<Table>> {
        let input = &self.input;
        self.search_value.expect_type(input.column_type(self.column_id)?)?;
        let (target, target_column_ids) = self.resolve_targets()?;

        let mut output = Table::new(input.max_chunk_size())?;
        for (name, &column_type) in input.column_names().iter().zip(input.column_types()) {
            output.add_column(name.clone(), column_type)?;
        }

        let mut pos_list = PosList::new();
        for (chunk_id, chunk) in input.chunks().iter().enumerate() {
            let chunk_id = chunk_id as ChunkId;
            let before = pos_list.len();
            chunk.get_segment(self.column_id)?
                .scan(self.scan_type, &self.search_value, chunk_id, &mut pos_list)?;
            trace!(chunk_id, matches = pos_list.len() - before, "scan chunk");
        }

        let matches = pos_list.len();
        if matches > 0 {
            let pos_list = Arc::new(pos_list);
            let segments = target_column_ids
                .iter()
                .map(|&id| ReferenceSegment::new(target.clone(), id, pos_list.clone()).into())
                .collect();
            output.emplace_chunk(Chunk::from_segments(segments)?)?;
        }

        debug!(
            column_id = self.column_id,
            scan_type = %self.scan_type,
            search_value = %self.search_value,
            input_rows = input.row_count(),
            matches,
            "table scan",
        );
        Ok(Arc::new(output))
    }
}

fn invalid_reference(chunk_id: usize, reason: &str) -> OlapError {
    OlapError::InvalidReference(format!("chunk {chunk_id}: {reason}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::{ColumnType, RowId};

    /// a:int, b:float，chunk_size = 2
    fn small_table() -> Arc<Table> {
        let mut t = Table::new(2).unwrap();
        t.add_column("a", ColumnType::Int).unwrap();
        t.add_column("b", ColumnType::Float).unwrap();
        t.append(&[12345.into(), 458.7f32.into()]).unwrap();
        t.append(&[123.into(), 456.7f32.into()]).unwrap();
        t.append(&[1234.into(), 457.7f32.into()]).unwrap();
        Arc::new(t)
    }

    fn column_a(table: &Table) -> Vec<Value> {
        table.chunks()
            .iter()
            .flat_map(|c| {
                let seg = c.get_segment(0).unwrap();
                (0..seg.size()).map(move |i| seg.read(i as u32).unwrap())
            })
            .collect()
    }

    #[test]
    fn accessors() {
        let scan = TableScan::new(small_table(), 1, ScanType::LessThan, 457.0f32);
        assert_eq!(scan.column_id(), 1);
        assert_eq!(scan.scan_type(), ScanType::LessThan);
        assert_eq!(scan.search_value(), &Value::Float(457.0));
        assert_eq!(scan.input().row_count(), 3);
    }

    #[test]
    fn output_keeps_columns_and_references_input() {
        let input = small_table();
        let out = TableScan::new(input.clone(), 0, ScanType::GreaterThanEquals, 1234).execute().unwrap();

        assert_eq!(out.column_names(), input.column_names());
        assert_eq!(out.column_types(), input.column_types());
        assert_eq!(out.chunk_count(), 1);
        assert_eq!(out.row_count(), 2);
        assert_eq!(column_a(&out), vec![Value::Int(12345), Value::Int(1234)]);

        let chunk = out.get_chunk(0).unwrap();
        let a = chunk.get_segment(0).unwrap().as_reference().unwrap();
        let b = chunk.get_segment(1).unwrap().as_reference().unwrap();
        assert!(Arc::ptr_eq(a.referenced_table(), &input));
        assert!(Arc::ptr_eq(a.pos_list(), b.pos_list()));
        assert_eq!(**a.pos_list(), vec![RowId::new(0, 0), RowId::new(1, 0)]);
        assert_eq!(out.get_value(RowId::new(0, 1), 1).unwrap(), Value::Float(457.7));
    }

    #[test]
    fn no_match_yields_empty_table() {
        let out = TableScan::new(small_table(), 0, ScanType::Equals, 7).execute().unwrap();
        assert_eq!(out.row_count(), 0);
        assert_eq!(out.chunk_count(), 1);
        assert_eq!(out.column_count(), 2);
    }

    #[test]
    fn wrong_literal_type_fails() {
        let scan = TableScan::new(small_table(), 0, ScanType::Equals, "x");
        assert_eq!(
            scan.execute().unwrap_err(),
            OlapError::TypeMismatch { expected: ColumnType::Int, actual: ColumnType::String },
        );
        let scan = TableScan::new(small_table(), 5, ScanType::Equals, 1);
        assert!(matches!(scan.execute(), Err(OlapError::OutOfBounds(_))));
    }

    #[test]
    fn chained_scan_stays_one_hop() {
        let input = small_table();
        let first = TableScan::new(input.clone(), 0, ScanType::GreaterThan, 200).execute().unwrap();
        let second = TableScan::new(first.clone(), 1, ScanType::LessThan, 458.0f32).execute().unwrap();

        assert_eq!(column_a(&second), vec![Value::Int(1234)]);
        let seg = second.get_chunk(0).unwrap().get_segment(0).unwrap().as_reference().unwrap();
        assert!(Arc::ptr_eq(seg.referenced_table(), &input));
        assert_eq!(**seg.pos_list(), vec![RowId::new(1, 0)]);
    }

    #[test]
    fn scan_of_empty_view_is_empty() {
        let empty = TableScan::new(small_table(), 0, ScanType::Equals, 0).execute().unwrap();
        let again = TableScan::new(empty, 0, ScanType::NotEquals, 0).execute().unwrap();
        assert_eq!(again.row_count(), 0);
    }

    #[test]
    fn scan_over_compressed_chunks() {
        let mut t = Table::new(3).unwrap();
        t.add_column("s", ColumnType::String).unwrap();
        for s in ["x", "y", "x", "z", "x", "y", "w"] {
            t.append(&[s.into()]).unwrap();
        }
        t.compress_chunk(0).unwrap();
        t.compress_chunk(2).unwrap();
        let out = TableScan::new(Arc::new(t), 0, ScanType::Equals, "x").execute().unwrap();
        let seg = out.get_chunk(0).unwrap().get_segment(0).unwrap().as_reference().unwrap();
        assert_eq!(**seg.pos_list(), vec![RowId::new(0, 0), RowId::new(0, 2), RowId::new(1, 1)]);
    }

    #[test]
    fn views_over_different_bases_are_rejected() {
        let left = TableScan::new(small_table(), 0, ScanType::NotEquals, 0).execute().unwrap();
        let right = TableScan::new(small_table(), 0, ScanType::NotEquals, 0).execute().unwrap();

        let mut mixed = Table::new(8).unwrap();
        mixed.add_column("a", ColumnType::Int).unwrap();
        mixed.add_column("b", ColumnType::Float).unwrap();
        mixed.emplace_chunk(left.get_chunk(0).unwrap().clone()).unwrap();
        mixed.emplace_chunk(right.get_chunk(0).unwrap().clone()).unwrap();

        let scan = TableScan::new(Arc::new(mixed), 0, ScanType::Equals, 1);
        assert!(matches!(scan.execute(), Err(OlapError::InvalidReference(_))));
    }

    #[test]
    fn stored_and_reference_chunks_are_rejected() {
        let view = TableScan::new(small_table(), 0, ScanType::NotEquals, 0).execute().unwrap();

        let mut mixed = Table::new(8).unwrap();
        mixed.add_column("a", ColumnType::Int).unwrap();
        mixed.add_column("b", ColumnType::Float).unwrap();
        mixed.emplace_chunk(view.get_chunk(0).unwrap().clone()).unwrap();
        // 尾 chunk 不可变，append 会新开一个存储 chunk
        mixed.append(&[1.into(), 1.0f32.into()]).unwrap();
        assert_eq!(mixed.chunk_count(), 2);

        let scan = TableScan::new(Arc::new(mixed), 0, ScanType::Equals, 1);
        assert!(matches!(scan.execute(), Err(OlapError::InvalidReference(_))));
    }
}
