//! Attribute vector：offset → ValueId 的定宽整数数组
//!
//! 物理宽度（8/16/32 位）由字典基数决定，选择逻辑见
//! [`AttributeVectorWidth::for_cardinality`]；由 `DictionarySegment` 在构建时调用。

use std::fmt;

use crate::common::{OlapError, Result, ValueId};

// ── 位宽 ──────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum AttributeVectorWidth {
    U8,
    U16,
    U32,
}

impl AttributeVectorWidth {
    /// 按字典基数 `n` 选择最窄位宽：所需位数 = floor(log2(n)) + 1
    ///
    /// 空字典使用 `U8`；超过 32 位返回 `CapacityExceeded`。
    pub fn for_cardinality(n: usize) -> Result<Self> {
        let bits = usize::BITS - n.leading_zeros();
        match bits {
            0..=8   => Ok(Self::U8),
            9..=16  => Ok(Self::U16),
            17..=32 => Ok(Self::U32),
            _       => Err(OlapError::CapacityExceeded { distinct: n }),
        }
    }

    pub fn bytes(self) -> usize {
        match self {
            Self::U8  => 1,
            Self::U16 => 2,
            Self::U32 => 4,
        }
    }

    /// 分配 `len` 个槽位、全部为 0 的 attribute vector
    pub fn allocate(self, len: usize) -> Box<dyn AttributeVector> {
        match self {
            Self::U8  => Box::new(FixedSizeAttributeVector::<u8>::with_len(len)),
            Self::U16 => Box::new(FixedSizeAttributeVector::<u16>::with_len(len)),
            Self::U32 => Box::new(FixedSizeAttributeVector::<u32>::with_len(len)),
        }
    }
}

// ── AttributeVector ───────────────────────────────────────────────────────────

pub trait AttributeVector: fmt::Debug + Send + Sync {
    fn get(&self, offset: usize) -> Result<ValueId>;

    /// 仅在构建期使用
    fn set(&mut self, offset: usize, value_id: ValueId) -> Result<()>;

    fn size(&self) -> usize;

    fn width(&self) -> AttributeVectorWidth;

    fn width_in_bytes(&self) -> usize {
        self.width().bytes()
    }
}

/// 可作为 attribute vector 元素的无符号整数
pub trait AttributeWord:
    Copy + Default + fmt::Debug + Send + Sync + TryFrom<ValueId> + Into<ValueId> + 'static
{
    const WIDTH: AttributeVectorWidth;
}

impl AttributeWord for u8  { const WIDTH: AttributeVectorWidth = AttributeVectorWidth::U8; }
impl AttributeWord for u16 { const WIDTH: AttributeVectorWidth = AttributeVectorWidth::U16; }
impl AttributeWord for u32 { const WIDTH: AttributeVectorWidth = AttributeVectorWidth::U32; }

#[derive(Debug, Clone, Default)]
pub struct FixedSizeAttributeVector<W: AttributeWord> {
    values: Vec<W>,
}

impl<W: AttributeWord> FixedSizeAttributeVector<W> {
    pub fn with_len(len: usize) -> Self {
        Self { values: vec![W::default(); len] }
    }
}

impl<W: AttributeWord> AttributeVector for FixedSizeAttributeVector<W> {
    fn get(&self, offset: usize) -> Result<ValueId> {
        self.values
            .get(offset)
            .map(|&w| w.into())
            .ok_or_else(|| OlapError::OutOfBounds(
                format!("attribute vector offset {offset} >= {}", self.values.len()),
            ))
    }

    fn set(&mut self, offset: usize, value_id: ValueId) -> Result<()> {
        let len  = self.values.len();
        let word = W::try_from(value_id).map_err(|_| OlapError::CapacityExceeded {
            distinct: value_id as usize + 1,
        })?;
        let slot = self.values.get_mut(offset).ok_or_else(|| OlapError::OutOfBounds(
            format!("attribute vector offset {offset} >= {len}"),
        ))?;
        *slot = word;
        Ok(())
    }

    fn size(&self) -> usize { self.values.len() }

    fn width(&self) -> AttributeVectorWidth { W::WIDTH }
}
