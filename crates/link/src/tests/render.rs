use super::*;

#[test]
fn raw_binary_places_bytes_at_their_addresses() {
    let (_, output) = assemble_lines(
        r#"
        (op: Org(Hex(0x0010))),
        (op: Byte(Dec(1))),
        (op: Org(Hex(0x0014))),
        (op: Word(Hex(0xBEEF))),
        "#,
    );
    assert_eq!(render(&output, OutputKind::RawBinary), [1, 0, 0, 0, 0xBE, 0xEF]);
}

#[test]
fn raw_binary_skips_bss() {
    let (_, output) = assemble_lines(
        r#"
        (op: Byte(Dec(7))),
        (op: Section(".bss", "rwz")),
        (op: Block(Dec(16))),
        (op: Section(".data", "rw")),
        (op: Byte(Dec(9))),
        "#,
    );
    let image = render(&output, OutputKind::RawBinary);

    assert_eq!(image.len(), 18);
    assert_eq!(image[0], 7);
    assert!(image[1..17].iter().all(|byte| *byte == 0));
    assert_eq!(image[17], 9);
}

#[test]
fn raw_binary_rejects_overlapping_origins() {
    let (_, output) = assemble_lines(
        r#"
        (op: Org(Hex(0x0000))),
        (op: Word(Dec(1))),
        (op: Org(Hex(0x0001))),
        (op: Byte(Dec(2))),
        "#,
    );
    let segments = layout_segments(&output.sections);
    let err = render_output(&output, &segments, OutputKind::RawBinary)
        .expect_err("overlap should fail");
    assert!(err.to_string().contains("overlaps at address 0x0001"));
}

#[test]
fn object_text_is_terminated_by_zz() {
    let (_, output) = assemble_lines(
        r#"
        (op: NonUnary(LDWA, Dec(10), d)),
        (op: Unary(RET)),
        "#,
    );
    assert_eq!(
        String::from_utf8(render(&output, OutputKind::ObjectText)).expect("utf8"),
        "C1 00 0A 01 zz\n"
    );
}

#[test]
fn object_text_wraps_sixteen_bytes_per_line() {
    let (_, output) = assemble_lines("(op: Block(Dec(16))), (op: Byte(Hex(0xAB)))");
    let segments = layout_segments(&output.sections);
    let text = render_object_text(&output, &segments);
    let lines: Vec<_> = text.lines().collect();

    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0].split(' ').count(), 16);
    assert_eq!(lines[1], "AB zz");
}

#[test]
fn empty_program_renders_terminator_only() {
    let (_, output) = assemble_lines("(op: Blank)");
    assert!(render(&output, OutputKind::RawBinary).is_empty());
    assert_eq!(render(&output, OutputKind::ObjectText), b"zz\n");
}

#[test]
fn layout_report_lists_placed_lines() {
    let (unit, output) = assemble_lines(
        r#"
        (symbol: Some("main"), op: Unary(RET)),
        (op: Word(Sym("elsewhere"))),
        "#,
    );
    let segments = layout_segments(&output.sections);
    let report = layout_report(&unit.program, &unit.symbols, &output, &segments);

    assert_eq!(report.sections.len(), 1);
    let text = &report.sections[0];
    assert_eq!(text.flags, "rwx");
    assert_eq!(text.lines.len(), 2);
    assert_eq!(text.lines[0].line, 1);
    assert_eq!(text.lines[0].source, "main:    RET");
    assert_eq!(text.lines[1].address, 1);
    assert_eq!(report.relocations.len(), 1);
    assert_eq!(report.relocations[0].symbol, "elsewhere");
    assert_eq!(report.relocations[0].offset, 1);
}
