use super::*;
use pepas_core::{AssembleOptions, AssemblyOutput, Section, SectionDescriptor, assemble};
use pepas_ir::{SectionFlags, Unit, load_document};

fn assemble_lines(lines: &str) -> (Unit, AssemblyOutput) {
    let mut unit =
        load_document(&format!("(lines: [{lines}])")).expect("test document should load");
    let output = assemble(&unit.program, &mut unit.symbols, &AssembleOptions::default())
        .expect("assembly should succeed");
    (unit, output)
}

/// A laid-out section with no lines, for exercising the grouping rules.
fn placed(name: &str, flags: &str, base_address: u16, byte_count: u32) -> Section {
    let mut descriptor =
        SectionDescriptor::new(name, SectionFlags::parse(flags).expect("valid flags"));
    descriptor.low_address = base_address;
    descriptor.base_address = base_address;
    descriptor.high_address = base_address.wrapping_add(byte_count as u16);
    descriptor.byte_count = byte_count;
    Section {
        descriptor,
        lines: Vec::new(),
    }
}

fn render(output: &AssemblyOutput, kind: OutputKind) -> Vec<u8> {
    let segments = layout_segments(&output.sections);
    render_output(output, &segments, kind).expect("render")
}

mod config;
mod render;
