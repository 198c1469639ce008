use std::cmp::Ordering;
use std::mem;
use std::sync::Arc;

use super::{Segment, ValueSegment};
use crate::attribute_vector::{AttributeVector, AttributeVectorWidth};
use crate::common::{
    ChunkId, ChunkOffset, OlapError, PosList, Result, RowId, ScanType, ValueId, INVALID_VALUE_ID,
};
use crate::field_type::{ColumnValue, Value};

/// 字典编码：升序去重的字典 + 每行一个 ValueId 的 attribute vector
///
/// 只能由 [`ValueSegment`] 一次性构建，之后不可变。
#[derive(Debug, Clone)]
pub struct DictionarySegment<T> {
    dictionary:       Arc<Vec<T>>,
    attribute_vector: Arc<dyn AttributeVector>,
}

impl<T: ColumnValue> DictionarySegment<T> {
    pub fn from_value_segment(segment: &ValueSegment<T>) -> Result<Self> {
        let values = segment.values();

        let mut dictionary = values.to_vec();
        dictionary.sort_by(T::compare);
        dictionary.dedup_by(|a, b| a.compare(b) == Ordering::Equal);

        // 位宽按字典基数选，槽位数按源行数分配
        let width = AttributeVectorWidth::for_cardinality(dictionary.len())?;
        let mut attribute_vector = width.allocate(values.len());
        for (offset, value) in values.iter().enumerate() {
            let value_id = match dictionary.binary_search_by(|probe| probe.compare(value)) {
                Ok(value_id) => value_id,
                Err(_)       => unreachable!("value missing from its own dictionary"),
            };
            attribute_vector.set(offset, value_id as ValueId)?;
        }

        Ok(Self {
            dictionary:       Arc::new(dictionary),
            attribute_vector: Arc::from(attribute_vector),
        })
    }

    pub fn get(&self, offset: ChunkOffset) -> Result<T> {
        let value_id = self.attribute_vector.get(offset as usize)?;
        self.value_by_value_id(value_id).cloned()
    }

    pub fn dictionary(&self) -> &[T] {
        &self.dictionary
    }

    pub fn attribute_vector(&self) -> &dyn AttributeVector {
        self.attribute_vector.as_ref()
    }

    pub fn value_by_value_id(&self, value_id: ValueId) -> Result<&T> {
        self.dictionary.get(value_id as usize).ok_or_else(|| OlapError::OutOfBounds(
            format!("value id {value_id} >= {}", self.dictionary.len()),
        ))
    }

    pub fn unique_values_count(&self) -> usize {
        self.dictionary.len()
    }

    /// 第一个字典值 `>= value` 的 ValueId；全部更小时返回 `INVALID_VALUE_ID`
    pub fn lower_bound(&self, value: &T) -> ValueId {
        let idx = self.dictionary.partition_point(|d| d.compare(value) == Ordering::Less);
        self.bound_to_value_id(idx)
    }

    /// 第一个字典值 `> value` 的 ValueId；全部不大于时返回 `INVALID_VALUE_ID`
    pub fn upper_bound(&self, value: &T) -> ValueId {
        let idx = self.dictionary.partition_point(|d| d.compare(value) != Ordering::Greater);
        self.bound_to_value_id(idx)
    }

    pub fn lower_bound_variant(&self, value: &Value) -> Result<ValueId> {
        Ok(self.lower_bound(&T::from_value(value)?))
    }

    pub fn upper_bound_variant(&self, value: &Value) -> Result<ValueId> {
        Ok(self.upper_bound(&T::from_value(value)?))
    }

    fn bound_to_value_id(&self, idx: usize) -> ValueId {
        if idx >= self.dictionary.len() { INVALID_VALUE_ID } else { idx as ValueId }
    }
}

impl<T: ColumnValue> Segment for DictionarySegment<T> {
    fn read(&self, offset: ChunkOffset) -> Result<Value> {
        self.get(offset).map(T::into_value)
    }

    fn append(&mut self, _value: &Value) -> Result<()> {
        Err(OlapError::Immutable("DictionarySegment"))
    }

    fn size(&self) -> usize {
        self.attribute_vector.size()
    }

    fn estimate_memory_usage(&self) -> usize {
        self.attribute_vector.size() * self.attribute_vector.width_in_bytes()
            + self.dictionary.len() * mem::size_of::<T>()
    }

    fn scan(
        &self,
        scan_type:    ScanType,
        search_value: &Value,
        chunk_id:     ChunkId,
        pos_list:     &mut PosList,
    ) -> Result<()> {
        let search = T::from_value(search_value)?;

        // INVALID_VALUE_ID 视为字典末尾
        let len   = self.dictionary.len() as ValueId;
        let clamp = |id: ValueId| if id == INVALID_VALUE_ID { len } else { id };
        let lower = clamp(self.lower_bound(&search));
        let upper = clamp(self.upper_bound(&search));

        // 谓词转成 ValueId 半开区间 [begin, end)；NotEquals 取补集
        let (begin, end, negate) = match scan_type {
            ScanType::Equals            => (lower, upper, false),
            ScanType::NotEquals         => (lower, upper, true),
            ScanType::LessThan          => (0, lower, false),
            ScanType::LessThanEquals    => (0, upper, false),
            ScanType::GreaterThan       => (upper, len, false),
            ScanType::GreaterThanEquals => (lower, len, false),
        };
        if begin >= end && !negate {
            return Ok(());
        }

        let av = &self.attribute_vector;
        for offset in 0..av.size() {
            let value_id = av.get(offset)?;
            if (begin..end).contains(&value_id) != negate {
                pos_list.push(RowId::new(chunk_id, offset as ChunkOffset));
            }
        }
        Ok(())
    }
}
