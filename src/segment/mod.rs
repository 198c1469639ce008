//! Segment：一列在一个 chunk 内的存储单元
//!
//! 三种封闭变体：
//! - **Value**：追加式的原始值数组，可变
//! - **Dictionary**：有序去重字典 + 定宽 attribute vector，不可变
//! - **Reference**：通过位置列表指向基表的间接层，不可变
//!
//! 统一能力由 [`Segment`] trait 描述；[`AnySegment`] 是按列持有的类型擦除枚举。

mod dictionary;
mod reference;
mod value;

pub use dictionary::DictionarySegment;
pub use reference::ReferenceSegment;
pub use value::ValueSegment;

use std::any::Any;

use crate::common::{ChunkId, ChunkOffset, ColumnType, OlapError, PosList, Result, ScanType};
use crate::field_type::{ColumnValue, Value};

// ── Segment 能力 ──────────────────────────────────────────────────────────────

pub trait Segment {
    /// 随机读取；越界返回 `OutOfBounds`
    fn read(&self, offset: ChunkOffset) -> Result<Value>;

    /// 追加一个值；dictionary / reference segment 返回 `Immutable`
    fn append(&mut self, value: &Value) -> Result<()>;

    fn size(&self) -> usize;

    /// 粗略的内存占用（字节）
    fn estimate_memory_usage(&self) -> usize;

    /// 对每一行求值 `value <scan_type> search_value`，按 offset 升序把命中的
    /// 行地址追加到 `pos_list`
    fn scan(
        &self,
        scan_type:    ScanType,
        search_value: &Value,
        chunk_id:     ChunkId,
        pos_list:     &mut PosList,
    ) -> Result<()>;
}

/// 按原生类型分派到同名变体
macro_rules! with_typed {
    ($segment:expr, $inner:ident => $body:expr) => {
        match $segment {
            Self::Int($inner)    => $body,
            Self::Float($inner)  => $body,
            Self::Double($inner) => $body,
            Self::String($inner) => $body,
        }
    };
}

// ── AnyValueSegment ───────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub enum AnyValueSegment {
    Int(ValueSegment<i32>),
    Float(ValueSegment<f32>),
    Double(ValueSegment<f64>),
    String(ValueSegment<String>),
}

impl AnyValueSegment {
    pub fn empty(column_type: ColumnType) -> Self {
        match column_type {
            ColumnType::Int    => Self::Int(ValueSegment::new()),
            ColumnType::Float  => Self::Float(ValueSegment::new()),
            ColumnType::Double => Self::Double(ValueSegment::new()),
            ColumnType::String => Self::String(ValueSegment::new()),
        }
    }

    pub fn column_type(&self) -> ColumnType {
        match self {
            Self::Int(_)    => ColumnType::Int,
            Self::Float(_)  => ColumnType::Float,
            Self::Double(_) => ColumnType::Double,
            Self::String(_) => ColumnType::String,
        }
    }

    pub fn downcast<T: ColumnValue>(&self) -> Option<&ValueSegment<T>> {
        with_typed!(self, s => (s as &dyn Any).downcast_ref::<ValueSegment<T>>())
    }
}

impl Segment for AnyValueSegment {
    fn read(&self, offset: ChunkOffset) -> Result<Value> {
        with_typed!(self, s => s.read(offset))
    }
    fn append(&mut self, value: &Value) -> Result<()> {
        with_typed!(self, s => s.append(value))
    }
    fn size(&self) -> usize {
        with_typed!(self, s => s.size())
    }
    fn estimate_memory_usage(&self) -> usize {
        with_typed!(self, s => s.estimate_memory_usage())
    }
    fn scan(
        &self,
        scan_type:    ScanType,
        search_value: &Value,
        chunk_id:     ChunkId,
        pos_list:     &mut PosList,
    ) -> Result<()> {
        with_typed!(self, s => s.scan(scan_type, search_value, chunk_id, pos_list))
    }
}

// ── AnyDictionarySegment ──────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub enum AnyDictionarySegment {
    Int(DictionarySegment<i32>),
    Float(DictionarySegment<f32>),
    Double(DictionarySegment<f64>),
    String(DictionarySegment<String>),
}

impl AnyDictionarySegment {
    /// 从 value segment 一次性构建，类型与源列一致
    pub fn from_value_segment(segment: &AnyValueSegment) -> Result<Self> {
        Ok(match segment {
            AnyValueSegment::Int(s)    => Self::Int(DictionarySegment::from_value_segment(s)?),
            AnyValueSegment::Float(s)  => Self::Float(DictionarySegment::from_value_segment(s)?),
            AnyValueSegment::Double(s) => Self::Double(DictionarySegment::from_value_segment(s)?),
            AnyValueSegment::String(s) => Self::String(DictionarySegment::from_value_segment(s)?),
        })
    }

    pub fn column_type(&self) -> ColumnType {
        match self {
            Self::Int(_)    => ColumnType::Int,
            Self::Float(_)  => ColumnType::Float,
            Self::Double(_) => ColumnType::Double,
            Self::String(_) => ColumnType::String,
        }
    }

    pub fn unique_values_count(&self) -> usize {
        with_typed!(self, s => s.unique_values_count())
    }

    pub fn downcast<T: ColumnValue>(&self) -> Option<&DictionarySegment<T>> {
        with_typed!(self, s => (s as &dyn Any).downcast_ref::<DictionarySegment<T>>())
    }
}

impl Segment for AnyDictionarySegment {
    fn read(&self, offset: ChunkOffset) -> Result<Value> {
        with_typed!(self, s => s.read(offset))
    }
    fn append(&mut self, value: &Value) -> Result<()> {
        with_typed!(self, s => s.append(value))
    }
    fn size(&self) -> usize {
        with_typed!(self, s => s.size())
    }
    fn estimate_memory_usage(&self) -> usize {
        with_typed!(self, s => s.estimate_memory_usage())
    }
    fn scan(
        &self,
        scan_type:    ScanType,
        search_value: &Value,
        chunk_id:     ChunkId,
        pos_list:     &mut PosList,
    ) -> Result<()> {
        with_typed!(self, s => s.scan(scan_type, search_value, chunk_id, pos_list))
    }
}

// ── AnySegment ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub enum AnySegment {
    Value(AnyValueSegment),
    Dictionary(AnyDictionarySegment),
    Reference(ReferenceSegment),
}

impl AnySegment {
    /// 新列使用的空 value segment
    pub fn empty(column_type: ColumnType) -> Self {
        Self::Value(AnyValueSegment::empty(column_type))
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Value(_)      => "ValueSegment",
            Self::Dictionary(_) => "DictionarySegment",
            Self::Reference(_)  => "ReferenceSegment",
        }
    }

    pub fn column_type(&self) -> Result<ColumnType> {
        match self {
            Self::Value(s)      => Ok(s.column_type()),
            Self::Dictionary(s) => Ok(s.column_type()),
            Self::Reference(s)  => s.column_type(),
        }
    }

    pub fn is_mutable(&self) -> bool {
        matches!(self, Self::Value(_))
    }

    pub fn as_value(&self) -> Option<&AnyValueSegment> {
        match self { Self::Value(s) => Some(s), _ => None }
    }
    pub fn as_dictionary(&self) -> Option<&AnyDictionarySegment> {
        match self { Self::Dictionary(s) => Some(s), _ => None }
    }
    pub fn as_reference(&self) -> Option<&ReferenceSegment> {
        match self { Self::Reference(s) => Some(s), _ => None }
    }

    /// 字典压缩：value → dictionary；已是 dictionary 的直接共享
    pub fn compress(&self) -> Result<AnySegment> {
        match self {
            Self::Value(s)      => Ok(Self::Dictionary(AnyDictionarySegment::from_value_segment(s)?)),
            Self::Dictionary(s) => Ok(Self::Dictionary(s.clone())),
            Self::Reference(_)  => Err(OlapError::Immutable("ReferenceSegment")),
        }
    }
}

impl Segment for AnySegment {
    fn read(&self, offset: ChunkOffset) -> Result<Value> {
        match self {
            Self::Value(s)      => s.read(offset),
            Self::Dictionary(s) => s.read(offset),
            Self::Reference(s)  => s.read(offset),
        }
    }

    fn append(&mut self, value: &Value) -> Result<()> {
        match self {
            Self::Value(s)      => s.append(value),
            Self::Dictionary(s) => s.append(value),
            Self::Reference(s)  => s.append(value),
        }
    }

    fn size(&self) -> usize {
        match self {
            Self::Value(s)      => s.size(),
            Self::Dictionary(s) => s.size(),
            Self::Reference(s)  => s.size(),
        }
    }

    fn estimate_memory_usage(&self) -> usize {
        match self {
            Self::Value(s)      => s.estimate_memory_usage(),
            Self::Dictionary(s) => s.estimate_memory_usage(),
            Self::Reference(s)  => s.estimate_memory_usage(),
        }
    }

    fn scan(
        &self,
        scan_type:    ScanType,
        search_value: &Value,
        chunk_id:     ChunkId,
        pos_list:     &mut PosList,
    ) -> Result<()> {
        match self {
            Self::Value(s)      => s.scan(scan_type, search_value, chunk_id, pos_list),
            Self::Dictionary(s) => s.scan(scan_type, search_value, chunk_id, pos_list),
            Self::Reference(s)  => s.scan(scan_type, search_value, chunk_id, pos_list),
        }
    }
}

impl From<AnyValueSegment> for AnySegment {
    fn from(s: AnyValueSegment) -> Self { Self::Value(s) }
}
impl From<AnyDictionarySegment> for AnySegment {
    fn from(s: AnyDictionarySegment) -> Self { Self::Dictionary(s) }
}
impl From<ReferenceSegment> for AnySegment {
    fn from(s: ReferenceSegment) -> Self { Self::Reference(s) }
}
