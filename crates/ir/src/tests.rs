use super::*;
use pepas_isa::{AddressingMode, Mnemonic};
use pepas_symbol::{Binding, DefinitionState, SymbolTable};

const PROGRAM: &str = r#"
(
    lines: [
        (op: Blank),
        (op: Section(".text", "rwx")),
        (symbol: Some("main"), op: NonUnary(LDWA, Dec(10), d), comment: Some("load")),
        (op: Unary(RET)),
        (op: Section(".data", "rw")),
        (symbol: Some("buf"), op: Block(Dec(30))),
        (op: Word(Sym("main"))),
        (op: Ascii("hi\n")),
        (op: Export("main")),
        (op: Import("charIn")),
        (op: Scall("DECI")),
    ],
)
"#;

#[test]
fn loads_document_into_arena_and_symbol_table() {
    let unit = load_document(PROGRAM).expect("document should load");
    assert_eq!(unit.program.len(), 11);

    let ids: Vec<_> = unit.program.ids().collect();
    let section = &unit.program[ids[1]];
    assert_eq!(
        section.kind,
        LineKind::Section {
            name: ".text".to_string(),
            flags: SectionFlags::RWX,
        }
    );

    let load = &unit.program[ids[2]];
    assert!(load.is_instruction());
    assert_eq!(load.comment.as_deref(), Some("load"));
    let main = load.symbol.expect("main should be declared");
    assert_eq!(unit.symbols.name(main), Some("main"));
    let entry = unit.symbols.get(main).expect("entry");
    assert_eq!(entry.state, DefinitionState::Single);
    assert_eq!(entry.binding, Binding::Global);

    let char_in = unit.symbols.find("charIn").expect("import is referenced");
    let entry = unit.symbols.get(char_in).expect("entry");
    assert_eq!(entry.state, DefinitionState::Undefined);
    assert_eq!(entry.binding, Binding::Imported);

    match &unit.program[ids[6]].kind {
        LineKind::Literal {
            kind: LiteralKind::Word,
            argument: Argument::Symbolic { name, symbol },
        } => {
            assert_eq!(name, "main");
            assert!(unit.symbols.owns(*symbol));
            assert_eq!(symbol.entry, main);
        }
        other => panic!("unexpected line kind: {other:?}"),
    }
}

#[test]
fn rejects_operand_arity_mismatch() {
    let err = load_document("(lines: [(op: Unary(LDWA))])").expect_err("LDWA needs an operand");
    assert!(matches!(err, DocumentError::MissingOperand { line: 1, .. }));

    let err = load_document("(lines: [(op: NonUnary(RET, Dec(1), i))])")
        .expect_err("RET is unary");
    assert!(matches!(err, DocumentError::UnexpectedOperand { line: 1, .. }));
}

#[test]
fn rejects_bad_flags_alignment_and_unknown_fields() {
    let err = load_document(r#"(lines: [(op: Section("x", "rwq"))])"#).expect_err("bad flags");
    assert!(matches!(err, DocumentError::InvalidFlags { .. }));

    let err = load_document("(lines: [(op: Blank), (op: Align(Dec(3)))])").expect_err("bad align");
    assert!(matches!(err, DocumentError::InvalidAlignment { line: 2 }));

    let err = load_document("(lines: [(op: Block(Dec(-1)))])").expect_err("negative block");
    assert!(matches!(err, DocumentError::InvalidBlockSize { line: 1 }));

    let err = load_document("(lines: [(op: Blank, label: None)])").expect_err("unknown field");
    assert!(matches!(err, DocumentError::Parse(_)));
}

#[test]
fn object_sizes_follow_line_kind() {
    let mut symbols = SymbolTable::new();
    let word = Line::new(LineKind::Literal {
        kind: LiteralKind::Word,
        argument: Argument::Decimal(10),
    });
    let byte = Line::new(LineKind::Literal {
        kind: LiteralKind::Byte,
        argument: Argument::Decimal(10),
    });
    let ascii = Line::new(LineKind::Literal {
        kind: LiteralKind::Ascii,
        argument: Argument::String(b"hello".to_vec()),
    });
    let block = Line::new(LineKind::Block(Argument::Decimal(30)));
    let align = Line::new(LineKind::Align(Argument::Decimal(8)));
    let unary = Line::new(LineKind::Monadic {
        mnemonic: Mnemonic::Asla,
    });
    let dyadic = Line::new(LineKind::Dyadic {
        mnemonic: Mnemonic::Ldwa,
        mode: AddressingMode::D,
        argument: Argument::Decimal(0),
    });
    let id = symbols.define("k");
    let equate = Line::new(LineKind::Equate(Argument::Decimal(3))).with_symbol(id);

    assert_eq!(word.object_size(0), Some(2));
    assert_eq!(byte.object_size(0), Some(1));
    assert_eq!(ascii.object_size(0), Some(5));
    assert_eq!(block.object_size(0), Some(30));
    assert_eq!(align.object_size(3), Some(5));
    assert_eq!(align.object_size(16), Some(0));
    assert_eq!(unary.object_size(0), Some(1));
    assert_eq!(dyadic.object_size(0), Some(3));
    assert_eq!(equate.object_size(0), None);
    assert_eq!(Line::new(LineKind::Blank).object_size(0), None);
}

#[test]
fn constants_respect_width() {
    assert_eq!(Argument::Decimal(-1).constant(2), Ok(Some(0xFFFF)));
    assert_eq!(Argument::Decimal(255).constant(1), Ok(Some(0xFF)));
    assert_eq!(
        Argument::Decimal(256).constant(1),
        Err(ArgumentError::OutOfRange {
            value: 256,
            width: 1
        })
    );
    assert_eq!(Argument::Hexadecimal(0xFEED).constant(2), Ok(Some(0xFEED)));
    assert!(Argument::Hexadecimal(0x100).constant(1).is_err());
    assert_eq!(Argument::String(b"ab".to_vec()).constant(2), Ok(Some(0x6162)));
    assert!(Argument::String(b"abc".to_vec()).constant(2).is_err());
    assert_eq!(Argument::Character(b'A').constant(1), Ok(Some(0x41)));
}

#[test]
fn formats_lines_in_source_columns() {
    let unit = load_document(PROGRAM).expect("document should load");
    let lines: Vec<_> = unit
        .program
        .iter()
        .map(|(_, line)| format_line(line, &unit.symbols))
        .collect();

    assert_eq!(lines[0], "");
    assert_eq!(lines[1], "         .SECTION \".text\", \"rwx\"");
    assert_eq!(lines[2], "main:    LDWA    10,d             ;load");
    assert_eq!(lines[3], "         RET");
    assert_eq!(lines[7], "         .ASCII  \"hi\\n\"");
}

#[test]
fn section_flags_parse_and_display() {
    let flags = SectionFlags::parse("rwz").expect("valid flags");
    assert!(flags.r && flags.w && flags.z && !flags.x);
    assert_eq!(flags.to_string(), "rwz");
    assert!(flags.same_permissions(&SectionFlags::parse("RW").expect("valid flags")));
    assert_eq!(SectionFlags::parse("rwy"), None);
}
