//! # olap-memory-engine
//!
//! 内存列存 OLAP 引擎：按 chunk 切分的表、三种 segment 编码、以及基于位置列表的表扫描。
//!
//! ## 整体架构
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │  StorageManager   name → Arc<Table>                          │
//! │        │                                                     │
//! │  Operator ── GetTable / TableScan ──→ Arc<Table>（视图）      │
//! │        │                                                     │
//! │      Table   column_names / column_types / TableConfig       │
//! │        │                                                     │
//! │      Chunk × N   （每个最多 chunk_size 行）                   │
//! │        │                                                     │
//! │   AnySegment × 列数                                           │
//! │   ┌───────────────┬──────────────────────┬─────────────────┐ │
//! │   │ ValueSegment  │ DictionarySegment    │ ReferenceSegment│ │
//! │   │  Vec<T>，可变  │  有序字典 +           │  Arc<Table> +    │ │
//! │   │               │  AttributeVector     │  Arc<PosList>   │ │
//! │   │               │  (u8/u16/u32)        │  （只跳一次）     │ │
//! │   └───────────────┴──────────────────────┴─────────────────┘ │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! `Table::compress_chunk` 在 rayon 线程池上把一个 chunk 的所有列转换为字典编码。

pub mod common;
pub mod config;
pub mod field_type;

// ── 存储层 ────────────────────────────────────────────────────────────────────
pub mod attribute_vector;
pub mod segment;
pub mod chunk;
pub mod table;
pub mod storage;

// ── 算子 ──────────────────────────────────────────────────────────────────────
pub mod operators;

pub use chunk::Chunk;
pub use common::{
    ChunkId, ChunkOffset, ColumnId, ColumnType, OlapError, PosList, Result, RowId, ScanType,
    ValueId, INVALID_VALUE_ID,
};
pub use config::{TableConfig, DEFAULT_CHUNK_SIZE};
pub use field_type::{ColumnValue, Value};
pub use operators::{GetTable, Operator, TableScan};
pub use segment::{AnySegment, DictionarySegment, ReferenceSegment, Segment, ValueSegment};
pub use storage::StorageManager;
pub use table::Table;
