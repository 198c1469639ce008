//! # olap-memory-engine 使用案例
//!
//! 1. 建表、追加行（自动切分 chunk）
//! 2. 注册到 StorageManager
//! 3. 字典压缩一个 chunk
//! 4. TableScan，并在扫描结果上再扫描
//! 5. 按 RowId 直接读取

use std::sync::Arc;

use olap_memory_engine::{
    ColumnType, GetTable, Operator, Result, RowId, ScanType, Segment, StorageManager, Table,
    TableConfig, TableScan,
};
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    println!("═══════════════════════════════════════════════════════════");
    println!("   olap-memory-engine 演示                                  ");
    println!("═══════════════════════════════════════════════════════════\n");

    // =========================================================================
    // 1. 建表
    // =========================================================================
    println!("【1】建表 orders (order_id int, amount double, status string) ...");
    let mut orders = Table::with_config(TableConfig::new(4).with_parallel_compression(true))?;
    orders.add_column("order_id", ColumnType::Int)?;
    orders.add_column("amount", ColumnType::Double)?;
    orders.add_column_by_type_name("status", "string")?;

    let statuses = ["paid", "shipped", "paid", "cancelled", "paid"];
    for i in 0..10 {
        orders.append(&[
            (1000 + i).into(),
            (f64::from(i) * 12.5).into(),
            statuses[i as usize % statuses.len()].into(),
        ])?;
    }
    println!(
        "    rows = {}, chunks = {}, max_chunk_size = {}\n",
        orders.row_count(),
        orders.chunk_count(),
        orders.max_chunk_size(),
    );

    // =========================================================================
    // 2. 字典压缩
    // =========================================================================
    println!("【2】压缩 chunk 0 ...");
    let before = orders.estimate_memory_usage();
    orders.compress_chunk(0)?;
    let status = orders.get_chunk(0)?.get_segment(2)?;
    println!(
        "    memory {} → {} bytes, status distinct = {}\n",
        before,
        orders.estimate_memory_usage(),
        status.as_dictionary().map_or(0, |d| d.unique_values_count()),
    );

    // =========================================================================
    // 3. 注册
    // =========================================================================
    println!("【3】注册到 StorageManager ...");
    let storage = StorageManager::new();
    storage.add_table("orders", Arc::new(orders))?;
    println!("    tables = {:?}\n", storage.table_names());

    // =========================================================================
    // 4. 扫描
    // =========================================================================
    println!("【4】status = 'paid' 然后 amount > 40.0 ...");
    let orders = GetTable::new(&storage, "orders").execute()?;
    let status_id = orders.column_id_by_name("status")?;
    let amount_id = orders.column_id_by_name("amount")?;

    let paid = TableScan::new(orders.clone(), status_id, ScanType::Equals, "paid").execute()?;
    println!("    paid rows = {}", paid.row_count());
    let big = TableScan::new(paid, amount_id, ScanType::GreaterThan, 40.0).execute()?;
    println!("    paid & amount > 40 rows = {}", big.row_count());

    for chunk in big.chunks() {
        let ids = chunk.get_segment(0)?;
        let amounts = chunk.get_segment(amount_id)?;
        for offset in 0..ids.size() as u32 {
            println!("      order_id = {}, amount = {}", ids.read(offset)?, amounts.read(offset)?);
        }
    }
    println!();

    // =========================================================================
    // 5. 直接读取
    // =========================================================================
    println!("【5】get_value ...");
    let row = RowId::new(2, 1);
    println!("    {} → status = {}", row, orders.get_value(row, status_id)?);

    println!("\n✓ 演示完成");
    Ok(())
}
