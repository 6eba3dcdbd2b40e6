use super::*;

#[test]
fn groups_lines_by_section_name() {
    let unit = load(SECTIONED);
    let split = split_to_sections(&unit.program, &unit.symbols, SectionDescriptor::default())
        .expect("split should succeed");

    let summary: Vec<_> = split
        .sections
        .iter()
        .map(|section| (section.descriptor.name.as_str(), section.lines.len()))
        .collect();
    assert_eq!(summary, [(".text", 5), (".data", 3), ("memvec", 3)]);

    let ids = ids(&unit);
    assert_eq!(split.sections[0].lines, [ids[0], ids[1], ids[2], ids[6], ids[7]]);
    assert!(split.sections[1].descriptor.flags.w);
    assert!(!split.sections[1].descriptor.flags.x);
}

#[test]
fn records_system_calls_and_ports_in_order() {
    let unit = load(
        r#"
        (op: Scall("DECI")),
        (op: Scall("deco")),
        (op: Input("charIn")),
        (op: Output("charOut")),
        "#,
    );
    let split = split_to_sections(&unit.program, &unit.symbols, SectionDescriptor::default())
        .expect("split should succeed");

    assert_eq!(split.system_calls, ["DECI", "deco"]);
    assert_eq!(
        split.mmios,
        [
            Mmio {
                name: "charIn".to_string(),
                kind: MmioKind::Input,
            },
            Mmio {
                name: "charOut".to_string(),
                kind: MmioKind::Output,
            },
        ]
    );
    assert_eq!(split.sections.len(), 1);
    assert_eq!(split.sections[0].lines.len(), 4);
}

#[test]
fn tracks_alignment_and_origin_count() {
    let unit = load(
        r#"
        (op: Align(Dec(2))),
        (op: Section("data", "rw")),
        (op: Align(Dec(8))),
        (op: Align(Dec(4))),
        (op: Org(Hex(0x100))),
        (op: Burn(Hex(0x1FF))),
        "#,
    );
    let split = split_to_sections(&unit.program, &unit.symbols, SectionDescriptor::default())
        .expect("split should succeed");

    assert_eq!(split.sections[0].descriptor.alignment, 2);
    assert_eq!(split.sections[0].descriptor.org_count, 0);
    assert_eq!(split.sections[1].descriptor.alignment, 8);
    assert_eq!(split.sections[1].descriptor.org_count, 2);
}

#[test]
fn rejects_section_redeclared_with_other_flags() {
    let mut unit = load(
        r#"
        (op: Section("x", "rwx")),
        (op: Byte(Dec(1))),
        (op: Section("x", "rw")),
        "#,
    );
    let err = assemble_unit(&mut unit).expect_err("flag conflict should fail");
    let ids = ids(&unit);
    assert!(matches!(
        &err,
        AssemblyError::SectionFlagConflict { name, .. } if name == "x"
    ));
    assert_eq!(err.line(), Some(ids[2]));
}

#[test]
fn default_section_conflict_is_detected() {
    let unit = load(r#"(op: Section(".text", "rw"))"#);
    let err = split_to_sections(&unit.program, &unit.symbols, SectionDescriptor::default())
        .expect_err("default .text is rwx");
    assert!(matches!(err, AssemblyError::SectionFlagConflict { .. }));
}

#[test]
fn rejects_multiply_defined_symbol() {
    let unit = load(
        r#"
        (symbol: Some("twice"), op: Byte(Dec(1))),
        (symbol: Some("twice"), op: Byte(Dec(2))),
        "#,
    );
    let err = split_to_sections(&unit.program, &unit.symbols, SectionDescriptor::default())
        .expect_err("duplicate label should fail");
    let ids = ids(&unit);
    assert_eq!(
        err,
        AssemblyError::MultiplyDefinedSymbol {
            name: "twice".to_string(),
            line: ids[0],
        }
    );
}
