use pepas_core::AssemblyOutput;
use pepas_ir::{Program, format_line};
use pepas_symbol::SymbolTable;
use serde::Serialize;

use super::Segment;

/// Machine-readable summary of a laid-out target.
#[derive(Debug, Clone, Serialize)]
pub struct LayoutReport {
    pub sections: Vec<SectionReport>,
    pub segments: Vec<Segment>,
    pub relocations: Vec<RelocationReport>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SectionReport {
    pub name: String,
    pub flags: String,
    pub alignment: u16,
    pub low_address: u16,
    pub high_address: u16,
    pub base_address: u16,
    pub byte_count: u32,
    pub lines: Vec<LineReport>,
}

#[derive(Debug, Clone, Serialize)]
pub struct LineReport {
    pub line: usize,
    pub address: u16,
    pub size: u16,
    pub source: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct RelocationReport {
    pub section: String,
    pub offset: usize,
    pub width: u8,
    pub symbol: String,
}

pub fn layout_report(
    program: &Program,
    symbols: &SymbolTable,
    output: &AssemblyOutput,
    segments: &[Segment],
) -> LayoutReport {
    let sections = output
        .sections
        .iter()
        .map(|section| {
            let descriptor = &section.descriptor;
            let lines = section
                .lines
                .iter()
                .filter_map(|&line| {
                    let address = output.addresses.get(line)?;
                    Some(LineReport {
                        line: line.index() + 1,
                        address: address.address,
                        size: address.size,
                        source: format_line(&program[line], symbols).trim().to_string(),
                    })
                })
                .collect();
            SectionReport {
                name: descriptor.name.clone(),
                flags: descriptor.flags.to_string(),
                alignment: descriptor.alignment,
                low_address: descriptor.low_address,
                high_address: descriptor.high_address,
                base_address: descriptor.base_address,
                byte_count: descriptor.byte_count,
                lines,
            }
        })
        .collect();

    let relocations = output
        .object
        .relocations
        .iter()
        .map(|relocation| RelocationReport {
            section: output
                .sections
                .get(relocation.section)
                .map(|section| section.descriptor.name.clone())
                .unwrap_or_default(),
            offset: relocation.offset,
            width: relocation.width,
            symbol: relocation.symbol.clone(),
        })
        .collect();

    LayoutReport {
        sections,
        segments: segments.to_vec(),
        relocations,
    }
}
