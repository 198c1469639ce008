//! 列值的运行时表示，以及原生类型与列类型的绑定

use std::cmp::Ordering;
use std::fmt;

use crate::common::{ColumnType, OlapError, Result};

/// 列值（运行时表示），封闭的带标签联合
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Int(i32),
    Float(f32),
    Double(f64),
    String(String),
}

impl Value {
    pub fn column_type(&self) -> ColumnType {
        match self {
            Self::Int(_)    => ColumnType::Int,
            Self::Float(_)  => ColumnType::Float,
            Self::Double(_) => ColumnType::Double,
            Self::String(_) => ColumnType::String,
        }
    }

    /// 检查 `self` 的标签是否为 `expected`
    pub fn expect_type(&self, expected: ColumnType) -> Result<()> {
        let actual = self.column_type();
        if actual != expected {
            return Err(OlapError::TypeMismatch { expected, actual });
        }
        Ok(())
    }

    /// 同类型值之间的全序比较；标签不同则报类型不匹配
    pub fn compare(&self, other: &Value) -> Result<Ordering> {
        match (self, other) {
            (Self::Int(a), Self::Int(b))       => Ok(a.compare(b)),
            (Self::Float(a), Self::Float(b))   => Ok(a.compare(b)),
            (Self::Double(a), Self::Double(b)) => Ok(a.compare(b)),
            (Self::String(a), Self::String(b)) => Ok(a.compare(b)),
            _ => Err(OlapError::TypeMismatch {
                expected: self.column_type(),
                actual:   other.column_type(),
            }),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(v)    => write!(f, "{v}"),
            Self::Float(v)  => write!(f, "{v}"),
            Self::Double(v) => write!(f, "{v}"),
            Self::String(v) => f.write_str(v),
        }
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self { Self::Int(v) }
}
impl From<f32> for Value {
    fn from(v: f32) -> Self { Self::Float(v) }
}
impl From<f64> for Value {
    fn from(v: f64) -> Self { Self::Double(v) }
}
impl From<String> for Value {
    fn from(v: String) -> Self { Self::String(v) }
}
impl From<&str> for Value {
    fn from(v: &str) -> Self { Self::String(v.into()) }
}

// ── ColumnValue ───────────────────────────────────────────────────────────────

/// 可存入 segment 的原生类型
///
/// `compare` 是所有编码共用的全序：浮点数先按 `==` 判等（±0 相等），
/// 其余按 `total_cmp` 排序，同一个 NaN 归为一组。
pub trait ColumnValue: Clone + fmt::Debug + Send + Sync + 'static {
    const COLUMN_TYPE: ColumnType;

    /// 带类型检查的转换，标签不符时返回 `TypeMismatch`
    fn from_value(value: &Value) -> Result<Self>;

    fn into_value(self) -> Value;

    fn compare(&self, other: &Self) -> Ordering;
}

macro_rules! impl_column_value {
    ($ty:ty, $variant:ident, |$a:ident, $b:ident| $cmp:expr) => {
        impl ColumnValue for $ty {
            const COLUMN_TYPE: ColumnType = ColumnType::$variant;

            fn from_value(value: &Value) -> Result<Self> {
                match value {
                    Value::$variant(v) => Ok(v.clone()),
                    other => Err(OlapError::TypeMismatch {
                        expected: Self::COLUMN_TYPE,
                        actual:   other.column_type(),
                    }),
                }
            }

            fn into_value(self) -> Value {
                Value::$variant(self)
            }

            fn compare(&self, other: &Self) -> Ordering {
                let ($a, $b) = (self, other);
                $cmp
            }
        }
    };
}

impl_column_value!(i32, Int, |a, b| a.cmp(b));
impl_column_value!(f32, Float, |a, b| if a == b { Ordering::Equal } else { a.total_cmp(b) });
impl_column_value!(f64, Double, |a, b| if a == b { Ordering::Equal } else { a.total_cmp(b) });
impl_column_value!(String, String, |a, b| a.cmp(b));
