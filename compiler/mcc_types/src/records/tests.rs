use super::*;
use crate::ctype::{CType, Elmtype};
use pretty_assertions::assert_eq;

fn define_point(records: &mut RecordStore) -> RecordId {
    let id = records.create(RecordKind::Struct, Some("point".into()), "@@point".into());
    let Ok(()) = records.append_elem(id, "x".into(), CType::int()) else {
        panic!("append x");
    };
    let Ok(()) = records.append_elem(id, "y".into(), CType::int()) else {
        panic!("append y");
    };
    records.get_mut(id).defined = true;
    id
}

#[test]
fn create_starts_undefined() {
    let mut records = RecordStore::new();
    let id = records.create(RecordKind::Struct, Some("s".into()), "@@s".into());
    assert!(!records.get(id).defined);
    assert!(!records.get(id).being_defined);
    assert_eq!(records.find_by_irident("@@s"), Some(id));
}

#[test]
fn duplicate_member_is_rejected() {
    let mut records = RecordStore::new();
    let id = records.create(RecordKind::Struct, Some("s".into()), "@@s".into());
    let Ok(()) = records.append_elem(id, "m".into(), CType::int()) else {
        panic!("first append");
    };
    assert_eq!(
        records.append_elem(id, "m".into(), CType::int()),
        Err(DuplicateElem)
    );
}

#[test]
fn member_lookup_preserves_declaration_order() {
    let mut records = RecordStore::new();
    let id = define_point(&mut records);
    let Some((index, elem)) = records.get(id).find_elem("y") else {
        panic!("member y exists");
    };
    assert_eq!(index, 1);
    assert_eq!(elem.name, "y");
}

#[test]
fn struct_offsets_accumulate() {
    let mut records = RecordStore::new();
    let id = records.create(RecordKind::Struct, Some("s".into()), "@@s".into());
    let Ok(()) = records.append_elem(id, "a".into(), CType::Basic(Elmtype::Char)) else {
        panic!("append a");
    };
    let Ok(()) = records.append_elem(id, "b".into(), CType::Basic(Elmtype::Long)) else {
        panic!("append b");
    };
    let Ok(()) = records.append_elem(id, "c".into(), CType::int()) else {
        panic!("append c");
    };
    records.get_mut(id).defined = true;
    assert_eq!(records.elem_offset(id, 0), Some(0));
    assert_eq!(records.elem_offset(id, 1), Some(1));
    assert_eq!(records.elem_offset(id, 2), Some(5));
}

#[test]
fn union_offsets_are_zero() {
    let mut records = RecordStore::new();
    let id = records.create(RecordKind::Union, Some("u".into()), "@@u".into());
    let Ok(()) = records.append_elem(id, "a".into(), CType::int()) else {
        panic!("append a");
    };
    let Ok(()) = records.append_elem(id, "b".into(), CType::Basic(Elmtype::Long)) else {
        panic!("append b");
    };
    records.get_mut(id).defined = true;
    assert_eq!(records.elem_offset(id, 1), Some(0));
}
