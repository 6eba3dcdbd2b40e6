use super::*;
use pepas_ir::{LineId, Unit, load_document};

/// Lines of a RON IR document, without the surrounding `(lines: [...])`.
fn load(lines: &str) -> Unit {
    load_document(&format!("(lines: [{lines}])")).expect("test document should load")
}

fn ids(unit: &Unit) -> Vec<LineId> {
    unit.program.ids().collect()
}

fn assemble_unit(unit: &mut Unit) -> Result<AssemblyOutput, AssemblyError> {
    assemble(&unit.program, &mut unit.symbols, &AssembleOptions::default())
}

fn address_of(output: &AssemblyOutput, line: LineId) -> Option<(u16, u16)> {
    output
        .addresses
        .get(line)
        .map(|address| (address.address, address.size))
}

fn section<'a>(output: &'a AssemblyOutput, name: &str) -> &'a SectionDescriptor {
    &output
        .sections
        .iter()
        .find(|section| section.descriptor.name == name)
        .expect("section should exist")
        .descriptor
}

/// Leading blank line, `.text` reopened after `.data`, then `memvec`.
const SECTIONED: &str = r#"
    (op: Blank),
    (op: Section(".text", "rwx")),
    (op: NonUnary(LDWA, Dec(10), d)),
    (op: Section(".data", "rw")),
    (op: Block(Dec(30))),
    (op: Word(Dec(10))),
    (op: Section(".text", "rwx")),
    (op: NonUnary(BR, Dec(0), i)),
    (op: Section("memvec", "rw")),
    (op: Byte(Dec(0))),
    (op: Byte(Dec(0))),
"#;

mod sections;
mod table;
