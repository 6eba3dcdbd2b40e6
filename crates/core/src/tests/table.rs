use super::*;

#[test]
fn sorted_lookup_returns_last_write() {
    let unit = load("(op: Blank), (op: Blank), (op: Blank), (op: Blank)");
    let ids = ids(&unit);

    let mut table = UnsortedTable::new();
    table.insert(ids[3], 30);
    table.insert(ids[0], 0);
    table.insert(ids[2], 20);
    table.insert(ids[0], 1);
    table.insert(ids[2], 21);
    table.insert(ids[2], 22);
    assert_eq!(table.len(), 6);

    let table = table.finish();
    assert_eq!(table.len(), 3);
    assert_eq!(table.get(ids[0]), Some(&1));
    assert_eq!(table.get(ids[1]), None);
    assert_eq!(table.get(ids[2]), Some(&22));
    assert_eq!(table.get(ids[3]), Some(&30));

    let keys: Vec<_> = table.iter().map(|(line, _)| line).collect();
    assert_eq!(keys, [ids[0], ids[2], ids[3]]);
    for id in [ids[0], ids[2], ids[3]] {
        assert_eq!(keys.iter().filter(|key| **key == id).count(), 1);
    }
}

#[test]
fn empty_table_finishes_empty() {
    let table: SortedTable<Address> = UnsortedTable::new().finish();
    assert!(table.is_empty());
}
