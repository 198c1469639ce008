//! 算子：输入一张表（或什么都不输入），输出一张 `Arc<Table>`
//!
//! 算子不修改输入表；输出可能是引用输入表的视图。

mod table_scan;

pub use table_scan::TableScan;

use std::sync::Arc;

use crate::common::Result;
use crate::storage::StorageManager;
use crate::table::Table;

pub trait Operator {
    fn execute(&self) -> Result<Arc<Table>>;
}

/// 按名字从 [`StorageManager`] 取表
pub struct GetTable<'a> {
    storage:    &'a StorageManager,
    table_name: String,
}

impl<'a> GetTable<'a> {
    pub fn new(storage: &'a StorageManager, table_name: impl Into<String>) -> Self {
        Self { storage, table_name: table_name.into() }
    }

    pub fn table_name(&self) -> &str {
        &self.table_name
    }
}

impl Operator for GetTable<'_> {
    fn execute(&self) -> Result<Arc<Table>> {
        self.storage.get_table(&self.table_name)
    }
}
