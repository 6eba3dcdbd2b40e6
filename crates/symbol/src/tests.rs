use super::*;

#[test]
fn define_tracks_multiplicity() {
    let mut table = SymbolTable::new();
    let first = table.define("loop");
    assert_eq!(
        table.get(first).expect("entry").state,
        DefinitionState::Single
    );
    let second = table.define("loop");
    assert_eq!(first, second);
    assert_eq!(
        table.get(first).expect("entry").state,
        DefinitionState::Multiple
    );
}

#[test]
fn reference_creates_undefined_entry_once() {
    let mut table = SymbolTable::new();
    let a = table.reference("later");
    let b = table.reference("later");
    assert_eq!(a, b);
    assert_eq!(table.len(), 1);
    let entry = table.get(a).expect("entry");
    assert_eq!(entry.state, DefinitionState::Undefined);
    assert!(entry.value.is_empty());
    assert_eq!(table.resolve(a, &[]), None);

    let defined = table.define("later");
    assert_eq!(defined, a);
    assert!(table.get(a).expect("entry").is_singly_defined());
}

#[test]
fn resolves_constants_locations_and_pointers() {
    let mut table = SymbolTable::new();
    let k = table.define("k");
    table.set_value(k, SymbolValue::Constant(MaskedBits::word(0x1234)));
    let here = table.define("here");
    table.set_value(here, SymbolValue::location(0x0040, 3, SymbolKind::Code));
    let alias = table.define("alias");
    table.set_value(alias, SymbolValue::InternalPointer(here));

    assert_eq!(table.resolve(k, &[]), Some(0x1234));
    assert_eq!(table.resolve(here, &[]), Some(0x0040));
    assert_eq!(table.resolve(alias, &[]), Some(0x0040));
}

#[test]
fn masked_bits_ignore_unselected_bits() {
    let bits = MaskedBits {
        byte_count: 1,
        bit_pattern: 0x1FF,
        mask: 0xFF,
    };
    assert_eq!(bits.value(), 0xFF);
}

#[test]
fn external_pointer_follows_linked_table() {
    let mut os = SymbolTable::new();
    let charin = os.define("charIn");
    os.set_value(charin, SymbolValue::location(0xFFF8, 1, SymbolKind::Object));

    let mut user = SymbolTable::new();
    let import = user.define("charIn");
    user.set_binding(import, Binding::Imported);
    user.set_value(
        import,
        SymbolValue::ExternalPointer {
            table: os.id(),
            entry: charin,
        },
    );

    assert_ne!(os.id(), user.id());
    assert_eq!(user.resolve(import, &[]), None);
    assert_eq!(user.resolve(import, &[&os]), Some(0xFFF8));
    assert_eq!(user.resolve_ref(os.symbol_ref(charin), &[&os]), Some(0xFFF8));
}

#[test]
fn pointer_cycles_do_not_resolve() {
    let mut table = SymbolTable::new();
    let a = table.define("a");
    let b = table.define("b");
    table.set_value(a, SymbolValue::InternalPointer(b));
    table.set_value(b, SymbolValue::InternalPointer(a));
    assert_eq!(table.resolve(a, &[]), None);
}

#[test]
fn iteration_preserves_insertion_order() {
    let mut table = SymbolTable::new();
    table.reference("zeta");
    table.define("alpha");
    let names: Vec<_> = table.iter().map(|(_, entry)| entry.name.as_str()).collect();
    assert_eq!(names, ["zeta", "alpha"]);
    assert_eq!(table.find("alpha").and_then(|id| table.name(id)), Some("alpha"));
}
