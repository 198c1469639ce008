//! 全局基础类型与错误定义

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use thiserror::Error;

// ── ID 类型别名 ───────────────────────────────────────────────────────────────

pub type ChunkId     = u32;
pub type ChunkOffset = u32;
pub type ColumnId    = u16;
/// 字典中的下标
pub type ValueId     = u32;

/// 下界/上界查询"找不到"的哨兵值，永远不是合法的字典下标。
///
/// 窄位宽的 attribute vector 读出的值会被放宽到 `ValueId`，因此不会与之冲突。
pub const INVALID_VALUE_ID: ValueId = ValueId::MAX;

// ── RowId / PosList ───────────────────────────────────────────────────────────

/// 表内某个 chunk 中的一行；只有相对某张具体的表才有意义
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RowId {
    pub chunk_id:     ChunkId,
    pub chunk_offset: ChunkOffset,
}

impl RowId {
    pub fn new(chunk_id: ChunkId, chunk_offset: ChunkOffset) -> Self {
        Self { chunk_id, chunk_offset }
    }
}

impl fmt::Display for RowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{})", self.chunk_id, self.chunk_offset)
    }
}

/// 有序行地址列表：顺序即视图的行顺序，允许重复
pub type PosList = Vec<RowId>;

// ── 枚举 ──────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColumnType {
    Int,
    Float,
    Double,
    String,
}

impl ColumnType {
    pub fn name(self) -> &'static str {
        match self {
            Self::Int    => "int",
            Self::Float  => "float",
            Self::Double => "double",
            Self::String => "string",
        }
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ColumnType {
    type Err = OlapError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "int"    => Ok(Self::Int),
            "float"  => Ok(Self::Float),
            "double" => Ok(Self::Double),
            "string" => Ok(Self::String),
            other    => Err(OlapError::UnknownColumnType(other.into())),
        }
    }
}

/// 扫描谓词 `value <op> literal` 的比较运算符
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanType {
    Equals,
    NotEquals,
    LessThan,
    LessThanEquals,
    GreaterThan,
    GreaterThanEquals,
}

impl ScanType {
    /// `ordering` 是 `value.cmp(literal)` 的结果
    pub fn matches(self, ordering: Ordering) -> bool {
        match self {
            Self::Equals            => ordering == Ordering::Equal,
            Self::NotEquals         => ordering != Ordering::Equal,
            Self::LessThan          => ordering == Ordering::Less,
            Self::LessThanEquals    => ordering != Ordering::Greater,
            Self::GreaterThan       => ordering == Ordering::Greater,
            Self::GreaterThanEquals => ordering != Ordering::Less,
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            Self::Equals            => "=",
            Self::NotEquals         => "!=",
            Self::LessThan          => "<",
            Self::LessThanEquals    => "<=",
            Self::GreaterThan       => ">",
            Self::GreaterThanEquals => ">=",
        }
    }
}

impl fmt::Display for ScanType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

// ── 错误 ──────────────────────────────────────────────────────────────────────

#[derive(Debug, Error, PartialEq)]
pub enum OlapError {
    #[error("type mismatch: expected {expected}, got {actual}")]
    TypeMismatch { expected: ColumnType, actual: ColumnType },
    #[error("unknown column type: {0}")]
    UnknownColumnType(String),
    #[error("arity mismatch: expected {expected} values, got {actual}")]
    ArityMismatch { expected: usize, actual: usize },
    #[error("{0} is immutable")]
    Immutable(&'static str),
    #[error("column not found: {0}")]
    ColumnNotFound(String),
    #[error("out of bounds: {0}")]
    OutOfBounds(String),
    #[error("dictionary capacity exceeded: {distinct} distinct values")]
    CapacityExceeded { distinct: usize },
    #[error("schema locked: {0}")]
    SchemaLocked(String),
    #[error("table not found: {0}")]
    TableNotFound(String),
    #[error("table already exists: {0}")]
    TableExists(String),
    #[error("invalid reference: {0}")]
    InvalidReference(String),
    #[error("invalid config: {0}")]
    InvalidConfig(String),
}

pub type Result<T> = std::result::Result<T, OlapError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn column_type_parses_known_names() {
        assert_eq!("int".parse::<ColumnType>().unwrap(), ColumnType::Int);
        assert_eq!("double".parse::<ColumnType>().unwrap(), ColumnType::Double);
        assert_eq!(ColumnType::Float.to_string(), "float");
        assert_eq!(
            "long".parse::<ColumnType>(),
            Err(OlapError::UnknownColumnType("long".into())),
        );
    }

    #[test]
    fn scan_type_matches_orderings() {
        use Ordering::*;
        assert!(ScanType::Equals.matches(Equal));
        assert!(!ScanType::Equals.matches(Less));
        assert!(ScanType::NotEquals.matches(Greater));
        assert!(ScanType::LessThan.matches(Less));
        assert!(!ScanType::LessThan.matches(Equal));
        assert!(ScanType::LessThanEquals.matches(Equal));
        assert!(ScanType::GreaterThan.matches(Greater));
        assert!(!ScanType::GreaterThanEquals.matches(Less));
    }
}
