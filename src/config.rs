//! 表级配置

use crate::common::{OlapError, Result};

/// 默认每个 chunk 最多容纳的行数
pub const DEFAULT_CHUNK_SIZE: u32 = 65_535;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableConfig {
    /// 每个 chunk 的最大行数，必须 > 0
    pub chunk_size:           u32,
    /// `compress_chunk` 是否按列并行转换
    pub parallel_compression: bool,
}

impl TableConfig {
    pub fn new(chunk_size: u32) -> Self {
        Self { chunk_size, ..Self::default() }
    }

    pub fn with_chunk_size(mut self, chunk_size: u32) -> Self {
        self.chunk_size = chunk_size; self
    }
    pub fn with_parallel_compression(mut self, enabled: bool) -> Self {
        self.parallel_compression = enabled; self
    }

    pub fn validate(&self) -> Result<()> {
        if self.chunk_size == 0 {
            return Err(OlapError::InvalidConfig("chunk_size must be positive".into()));
        }
        Ok(())
    }
}

impl Default for TableConfig {
    fn default() -> Self {
        Self { chunk_size: DEFAULT_CHUNK_SIZE, parallel_compression: true }
    }
}
