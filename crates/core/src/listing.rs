use std::fmt::Write as _;

use pepas_ir::{Program, format_line};
use pepas_symbol::SymbolTable;

use crate::driver::AssemblyOutput;

const BYTES_PER_ROW: usize = 3;

/// Render `address | object code | source` rows for every section. Object
/// code longer than three bytes continues on rows without an address.
pub fn render_listing(program: &Program, symbols: &SymbolTable, output: &AssemblyOutput) -> String {
    let mut out = String::new();

    for (index, section) in output.sections.iter().enumerate() {
        let descriptor = &section.descriptor;
        if index > 0 {
            out.push('\n');
        }
        let _ = writeln!(
            out,
            "; section {} ({}) base 0x{:04X} size {}",
            descriptor.name, descriptor.flags, descriptor.base_address, descriptor.byte_count
        );

        let bytes = output.section_bytes(index);
        for &id in &section.lines {
            let source = format_line(&program[id], symbols);
            let Some(address) = output.addresses.get(id) else {
                push_row(&mut out, "", "", &source);
                continue;
            };

            let code = output
                .object
                .spans
                .get(id)
                .and_then(|span| bytes.get(span.range.clone()))
                .unwrap_or(&[]);
            let mut rows = code.chunks(BYTES_PER_ROW);
            let first = rows.next().map(hex).unwrap_or_default();
            push_row(&mut out, &format!("{:04X}", address.address), &first, &source);
            for row in rows {
                push_row(&mut out, "", &hex(row), "");
            }
        }
    }

    out
}

fn push_row(out: &mut String, address: &str, code: &str, source: &str) {
    let row = format!("{address:<4} {code:<6} {source}");
    out.push_str(row.trim_end());
    out.push('\n');
}

fn hex(bytes: &[u8]) -> String {
    bytes.iter().map(|byte| format!("{byte:02X}")).collect()
}
