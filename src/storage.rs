//! 表注册中心：名字 → `Arc<Table>`
//!
//! 由调用方创建并传递，不是进程级单例。

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::debug;

use crate::common::{OlapError, Result};
use crate::table::Table;

/// 线程安全的表注册中心
#[derive(Debug, Default)]
pub struct StorageManager {
    tables: RwLock<HashMap<String, Arc<Table>>>,
}

impl StorageManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_table(&self, name: impl Into<String>, table: Arc<Table>) -> Result<()> {
        let name = name.into();
        let mut tables = self.tables.write();
        if tables.contains_key(&name) {
            return Err(OlapError::TableExists(name));
        }
        debug!(table = %name, rows = table.row_count(), "register table");
        tables.insert(name, table);
        Ok(())
    }

    pub fn drop_table(&self, name: &str) -> Result<()> {
        self.tables.write()
            .remove(name)
            .map(|_| debug!(table = %name, "drop table"))
            .ok_or_else(|| OlapError::TableNotFound(name.into()))
    }

    pub fn get_table(&self, name: &str) -> Result<Arc<Table>> {
        self.tables.read()
            .get(name)
            .cloned()
            .ok_or_else(|| OlapError::TableNotFound(name.into()))
    }

    pub fn has_table(&self, name: &str) -> bool {
        self.tables.read().contains_key(name)
    }

    /// 按字典序排列
    pub fn table_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.tables.read().keys().cloned().collect();
        names.sort();
        names
    }

    pub fn table_count(&self) -> usize {
        self.tables.read().len()
    }

    /// 清空所有表；已经被外部持有的 `Arc<Table>` 不受影响
    pub fn reset(&self) {
        let mut tables = self.tables.write();
        debug!(tables = tables.len(), "reset storage manager");
        tables.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::ColumnType;

    fn empty_table() -> Arc<Table> {
        let mut t = Table::new(4).unwrap();
        t.add_column("a", ColumnType::Int).unwrap();
        Arc::new(t)
    }

    #[test]
    fn add_get_drop() {
        let sm = StorageManager::new();
        let t = empty_table();
        sm.add_table("first_table", t.clone()).unwrap();
        assert!(sm.has_table("first_table"));
        assert!(Arc::ptr_eq(&sm.get_table("first_table").unwrap(), &t));

        sm.drop_table("first_table").unwrap();
        assert!(!sm.has_table("first_table"));
        assert_eq!(sm.drop_table("first_table"), Err(OlapError::TableNotFound("first_table".into())));
        assert!(matches!(sm.get_table("first_table"), Err(OlapError::TableNotFound(_))));
    }

    #[test]
    fn duplicate_name_is_rejected() {
        let sm = StorageManager::new();
        sm.add_table("t", empty_table()).unwrap();
        assert_eq!(sm.add_table("t", empty_table()), Err(OlapError::TableExists("t".into())));
        assert_eq!(sm.table_count(), 1);
    }

    #[test]
    fn names_are_sorted_and_reset_clears() {
        let sm = StorageManager::new();
        sm.add_table("second_table", empty_table()).unwrap();
        sm.add_table("first_table", empty_table()).unwrap();
        assert_eq!(sm.table_names(), vec!["first_table", "second_table"]);

        let held = sm.get_table("first_table").unwrap();
        sm.reset();
        assert_eq!(sm.table_count(), 0);
        assert!(sm.table_names().is_empty());
        assert_eq!(held.column_count(), 1);
    }
}
