use std::sync::Arc;

use proptest::prelude::*;

use olap_memory_engine::{
    AnySegment, ColumnType, DictionarySegment, Operator, ScanType, Segment, Table, TableScan,
    ValueSegment, Value, INVALID_VALUE_ID,
};

const SCAN_TYPES: [ScanType; 6] = [
    ScanType::Equals,
    ScanType::NotEquals,
    ScanType::LessThan,
    ScanType::LessThanEquals,
    ScanType::GreaterThan,
    ScanType::GreaterThanEquals,
];

fn int_table(values: &[i32], chunk_size: u32) -> Table {
    let mut t = Table::new(chunk_size).unwrap();
    t.add_column("v", ColumnType::Int).unwrap();
    for &v in values {
        t.append(&[v.into()]).unwrap();
    }
    t
}

fn scanned_values(table: &Table) -> Vec<Value> {
    table.chunks()
        .iter()
        .flat_map(|c| {
            let seg = c.get_segment(0).unwrap();
            (0..seg.size() as u32).map(move |o| seg.read(o).unwrap())
        })
        .collect()
}

proptest! {
    #[test]
    fn chunking_splits_rows_evenly(n in 0usize..200, chunk_size in 1u32..32) {
        let values: Vec<i32> = (0..n as i32).collect();
        let t = int_table(&values, chunk_size);
        let cs = chunk_size as usize;

        prop_assert_eq!(t.row_count(), n);
        prop_assert_eq!(t.chunk_count(), n.div_ceil(cs).max(1));
        for (i, chunk) in t.chunks().iter().enumerate() {
            if i + 1 < t.chunk_count() {
                prop_assert_eq!(chunk.size(), cs);
            } else {
                prop_assert!(chunk.size() <= cs);
            }
        }
    }

    #[test]
    fn dictionary_reads_match_source(values in prop::collection::vec(-50i32..50, 0..300)) {
        let source: ValueSegment<i32> = values.iter().copied().collect();
        let dict = DictionarySegment::from_value_segment(&source).unwrap();

        prop_assert_eq!(dict.size(), source.size());
        for offset in 0..source.size() as u32 {
            prop_assert_eq!(dict.read(offset).unwrap(), source.read(offset).unwrap());
        }
        prop_assert!(dict.dictionary().windows(2).all(|w| w[0] < w[1]));
        prop_assert!(dict.unique_values_count() <= dict.size());
    }

    #[test]
    fn string_dictionary_reads_match_source(values in prop::collection::vec("[a-d]{0,3}", 0..100)) {
        let source: ValueSegment<String> = values.into_iter().collect();
        let dict = DictionarySegment::from_value_segment(&source).unwrap();
        for offset in 0..source.size() as u32 {
            prop_assert_eq!(dict.read(offset).unwrap(), source.read(offset).unwrap());
        }
    }

    #[test]
    fn bounds_are_ordered(
        values in prop::collection::vec(-20i32..20, 1..60),
        probe in -25i32..25,
    ) {
        let source: ValueSegment<i32> = values.iter().copied().collect();
        let dict = DictionarySegment::from_value_segment(&source).unwrap();
        let lower = dict.lower_bound(&probe);
        let upper = dict.upper_bound(&probe);
        let max = *values.iter().max().unwrap();

        if lower != INVALID_VALUE_ID && upper != INVALID_VALUE_ID {
            prop_assert!(lower <= upper);
        }
        prop_assert_eq!(lower == INVALID_VALUE_ID, probe > max);
        if probe > max {
            prop_assert_eq!(upper, INVALID_VALUE_ID);
        }
    }

    #[test]
    fn scans_agree_across_encodings(
        values in prop::collection::vec(-10i32..10, 0..80),
        literal in -12i32..12,
        op in 0usize..6,
    ) {
        let plain = Arc::new(int_table(&values, 7));
        let mut compressed = int_table(&values, 7);
        for chunk_id in 0..compressed.chunk_count() as u32 {
            compressed.compress_chunk(chunk_id).unwrap();
        }
        let compressed = Arc::new(compressed);

        let scan_type = SCAN_TYPES[op];
        let a = TableScan::new(plain, 0, scan_type, literal).execute().unwrap();
        let b = TableScan::new(compressed, 0, scan_type, literal).execute().unwrap();
        prop_assert_eq!(scanned_values(&a), scanned_values(&b));

        let expected: Vec<Value> = values
            .iter()
            .filter(|&&v| scan_type.matches(v.cmp(&literal)))
            .map(|&v| Value::Int(v))
            .collect();
        prop_assert_eq!(scanned_values(&a), expected);
    }

    #[test]
    fn equality_scan_finds_present_values(values in prop::collection::vec(0i32..30, 1..50)) {
        let t = Arc::new(int_table(&values, 8));
        let present = TableScan::new(t.clone(), 0, ScanType::Equals, values[0]).execute().unwrap();
        prop_assert!(present.row_count() >= 1);
        let absent = TableScan::new(t, 0, ScanType::Equals, -1).execute().unwrap();
        prop_assert_eq!(absent.row_count(), 0);
    }

    #[test]
    fn rescan_is_idempotent(
        values in prop::collection::vec(-10i32..10, 0..60),
        literal in -10i32..10,
        op in 0usize..6,
    ) {
        let base = Arc::new(int_table(&values, 5));
        let scan_type = SCAN_TYPES[op];
        let once = TableScan::new(base.clone(), 0, scan_type, literal).execute().unwrap();
        let twice = TableScan::new(once.clone(), 0, scan_type, literal).execute().unwrap();
        prop_assert_eq!(scanned_values(&once), scanned_values(&twice));

        for chunk in twice.chunks() {
            if let Some(seg) = chunk.get_segment(0).unwrap().as_reference() {
                prop_assert!(Arc::ptr_eq(seg.referenced_table(), &base));
            }
        }
    }

    #[test]
    fn appends_to_compressed_segments_fail(values in prop::collection::vec(any::<i32>(), 0..20)) {
        let mut seg = AnySegment::empty(ColumnType::Int);
        for &v in &values {
            seg.append(&Value::Int(v)).unwrap();
        }
        let mut dict = seg.compress().unwrap();
        prop_assert!(dict.append(&Value::Int(0)).is_err());
        prop_assert_eq!(dict.size(), values.len());
    }
}
