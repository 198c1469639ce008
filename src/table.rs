//! Table：列元数据 + 有序 chunk 序列
//!
//! 行追加到尾 chunk，尾 chunk 满（或已被压缩）时分配新 chunk。
//! 任何 chunk 都可以单独做字典压缩，各列的转换在 rayon 线程池上并行执行。

use rayon::prelude::*;
use tracing::{debug, info};

use crate::chunk::Chunk;
use crate::common::{ChunkId, ColumnId, ColumnType, OlapError, Result, RowId};
use crate::config::TableConfig;
use crate::field_type::Value;
use crate::segment::{AnySegment, Segment};

#[derive(Debug)]
pub struct Table {
    column_names: Vec<String>,
    column_types: Vec<ColumnType>,
    config:       TableConfig,
    chunks:       Vec<Chunk>,
}

impl Table {
    pub fn new(chunk_size: u32) -> Result<Self> {
        Self::with_config(TableConfig::new(chunk_size))
    }

    /// 新表带一个预分配的空 chunk
    pub fn with_config(config: TableConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            column_names: Vec::new(),
            column_types: Vec::new(),
            config,
            chunks:       vec![Chunk::new()],
        })
    }

    // ── Schema ────────────────────────────────────────────────────────────────

    /// 只能在写入任何行之前加列
    pub fn add_column(&mut self, name: impl Into<String>, column_type: ColumnType) -> Result<()> {
        let name = name.into();
        if self.chunks.len() > 1 || self.row_count() > 0 || !self.tail().is_mutable() {
            return Err(OlapError::SchemaLocked(format!(
                "cannot add column '{name}' to a table holding {} rows",
                self.row_count(),
            )));
        }
        if ColumnId::try_from(self.column_names.len()).is_err() {
            return Err(OlapError::SchemaLocked(format!("too many columns to add '{name}'")));
        }

        self.tail_mut().add_segment(AnySegment::empty(column_type))?;
        debug!(column = %name, %column_type, "add column");
        self.column_names.push(name);
        self.column_types.push(column_type);
        Ok(())
    }

    /// 同 [`Table::add_column`]，列类型按名字（"int" / "float" / "double" / "string"）解析
    pub fn add_column_by_type_name(&mut self, name: impl Into<String>, type_name: &str) -> Result<()> {
        self.add_column(name, type_name.parse()?)
    }

    pub fn column_count(&self) -> usize {
        self.column_names.len()
    }

    pub fn column_names(&self) -> &[String] {
        &self.column_names
    }

    pub fn column_types(&self) -> &[ColumnType] {
        &self.column_types
    }

    pub fn column_name(&self, column_id: ColumnId) -> Result<&str> {
        self.column_names
            .get(column_id as usize)
            .map(String::as_str)
            .ok_or_else(|| self.column_out_of_bounds(column_id))
    }

    pub fn column_type(&self, column_id: ColumnId) -> Result<ColumnType> {
        self.column_types
            .get(column_id as usize)
            .copied()
            .ok_or_else(|| self.column_out_of_bounds(column_id))
    }

    /// 线性查找，同名列返回第一个
    pub fn column_id_by_name(&self, name: &str) -> Result<ColumnId> {
        self.column_names
            .iter()
            .position(|n| n == name)
            .map(|idx| idx as ColumnId)
            .ok_or_else(|| OlapError::ColumnNotFound(name.into()))
    }

    // ── 行 ────────────────────────────────────────────────────────────────────

    /// 追加一行；行长度与类型在分配新 chunk 之前校验
    pub fn append(&mut self, row: &[Value]) -> Result<()> {
        if row.len() != self.column_count() {
            return Err(OlapError::ArityMismatch {
                expected: self.column_count(),
                actual:   row.len(),
            });
        }
        for (value, column_type) in row.iter().zip(&self.column_types) {
            value.expect_type(*column_type)?;
        }

        let tail = self.tail();
        if tail.size() >= self.config.chunk_size as usize || !tail.is_mutable() {
            self.create_new_chunk()?;
        }
        self.tail_mut().append(row)
    }

    pub fn row_count(&self) -> usize {
        self.chunks.iter().map(Chunk::size).sum()
    }

    pub fn get_value(&self, row_id: RowId, column_id: ColumnId) -> Result<Value> {
        self.get_chunk(row_id.chunk_id)?
            .get_segment(column_id)?
            .read(row_id.chunk_offset)
    }

    // ── Chunk ─────────────────────────────────────────────────────────────────

    pub fn chunk_count(&self) -> usize {
        self.chunks.len()
    }

    pub fn chunks(&self) -> &[Chunk] {
        &self.chunks
    }

    pub fn max_chunk_size(&self) -> u32 {
        self.config.chunk_size
    }

    pub fn config(&self) -> &TableConfig {
        &self.config
    }

    pub fn get_chunk(&self, chunk_id: ChunkId) -> Result<&Chunk> {
        self.chunks.get(chunk_id as usize).ok_or_else(|| OlapError::OutOfBounds(
            format!("chunk id {chunk_id} >= {}", self.chunks.len()),
        ))
    }

    /// 放入一个已构建好的 chunk：尾 chunk 为空时替换它，否则追加
    pub fn emplace_chunk(&mut self, chunk: Chunk) -> Result<()> {
        if chunk.column_count() != self.column_count() {
            return Err(OlapError::ArityMismatch {
                expected: self.column_count(),
                actual:   chunk.column_count(),
            });
        }
        if self.tail().size() == 0 {
            *self.tail_mut() = chunk;
        } else {
            self.chunks.push(chunk);
        }
        Ok(())
    }

    /// 把 chunk 的每一列转换为 dictionary segment，全部成功后一次性替换
    ///
    /// 任一列失败时原 chunk 保持不变。
    pub fn compress_chunk(&mut self, chunk_id: ChunkId) -> Result<()> {
        let old = self.get_chunk(chunk_id)?;
        let bytes_before = old.estimate_memory_usage();
        debug!(chunk_id, columns = old.column_count(), rows = old.size(), "compressing chunk");

        let segments: Vec<AnySegment> = if self.config.parallel_compression {
            old.segments().par_iter().map(AnySegment::compress).collect::<Result<_>>()?
        } else {
            old.segments().iter().map(AnySegment::compress).collect::<Result<_>>()?
        };
        let compressed = Chunk::from_segments(segments)?;

        let bytes_after = compressed.estimate_memory_usage();
        self.chunks[chunk_id as usize] = compressed;
        info!(chunk_id, bytes_before, bytes_after, "compress chunk");
        Ok(())
    }

    pub fn estimate_memory_usage(&self) -> usize {
        self.chunks.iter().map(Chunk::estimate_memory_usage).sum()
    }

    // ── 内部 ──────────────────────────────────────────────────────────────────

    fn create_new_chunk(&mut self) -> Result<()> {
        let segments = self.column_types.iter().map(|&t| AnySegment::empty(t)).collect();
        self.chunks.push(Chunk::from_segments(segments)?);
        debug!(chunk_id = self.chunks.len() - 1, "allocate chunk");
        Ok(())
    }

    fn tail(&self) -> &Chunk {
        &self.chunks[self.chunks.len() - 1]
    }

    fn tail_mut(&mut self) -> &mut Chunk {
        let last = self.chunks.len() - 1;
        &mut self.chunks[last]
    }

    fn column_out_of_bounds(&self, column_id: ColumnId) -> OlapError {
        OlapError::OutOfBounds(format!("column id {column_id} >= {}", self.column_count()))
    }
}
