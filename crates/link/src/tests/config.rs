use super::*;

#[test]
fn default_config_uses_text_rwx_at_zero() {
    let config = default_config();
    let descriptor = config
        .default_section_descriptor()
        .expect("default flags are valid");

    assert_eq!(config.initial_base_address, 0);
    assert_eq!(descriptor.name, ".text");
    assert_eq!(descriptor.flags, SectionFlags::RWX);
    assert_eq!(config.output.kind, OutputKind::ObjectText);
    assert!(config.output.listing);
}

#[test]
fn config_fields_default_when_omitted() {
    let config: AssemblerConfig = ron::from_str(
        r#"(
  initial_base_address: 0x8000,
  output: (kind: RawBinary),
)"#,
    )
    .expect("parse config");

    assert_eq!(config.initial_base_address, 0x8000);
    assert_eq!(config.default_section.name, ".text");
    assert_eq!(config.output.kind, OutputKind::RawBinary);
    assert!(config.output.listing);
    assert_eq!(OutputKind::RawBinary.extension(), "bin");
}

#[test]
fn config_rejects_unknown_fields() {
    let err = ron::from_str::<AssemblerConfig>("(origin: 5)").expect_err("unknown field");
    assert!(err.to_string().contains("origin"));
}

#[test]
fn invalid_default_flags_are_reported() {
    let config: AssemblerConfig =
        ron::from_str(r#"(default_section: (name: "boot", flags: "rq"))"#).expect("parse config");
    let err = config
        .assemble_options(&[])
        .expect_err("flags should be rejected");
    assert!(err.to_string().contains("invalid flags \"rq\""));
}

#[test]
fn config_options_drive_assembly() {
    let config: AssemblerConfig = ron::from_str(
        r#"(initial_base_address: 0x0200, default_section: (name: "boot", flags: "rx"))"#,
    )
    .expect("parse config");
    let options = config.assemble_options(&[]).expect("options");
    let mut unit = load_document("(lines: [(op: Unary(RET))])").expect("document");
    let output = assemble(&unit.program, &mut unit.symbols, &options).expect("assemble");

    assert_eq!(output.sections[0].descriptor.name, "boot");
    assert_eq!(output.sections[0].descriptor.base_address, 0x0200);
}

#[test]
fn load_config_reports_missing_file() {
    let path = std::env::temp_dir().join("pepas-config-that-does-not-exist.ron");
    let err = load_config(&path).expect_err("missing file");
    assert!(err.to_string().contains("failed to read assembler config"));
}
