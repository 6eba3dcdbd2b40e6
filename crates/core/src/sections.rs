use pepas_ir::{AnnotateKind, Argument, LineId, LineKind, Program, SectionFlags};
use pepas_symbol::SymbolTable;
use rustc_hash::FxHashMap;
use tracing::{debug, trace};

use crate::error::AssemblyError;

pub const DEFAULT_SECTION_NAME: &str = ".text";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionDescriptor {
    pub name: String,
    pub flags: SectionFlags,
    pub alignment: u16,
    /// Number of `.ORG` and `.BURN` directives in the section.
    pub org_count: u32,
    pub low_address: u16,
    pub high_address: u16,
    /// Bytes of address space occupied by the section's lines.
    pub byte_count: u32,
    /// First address occupied by the section.
    pub base_address: u16,
}

impl SectionDescriptor {
    pub fn new(name: impl Into<String>, flags: SectionFlags) -> Self {
        Self {
            name: name.into(),
            flags,
            alignment: 1,
            org_count: 0,
            low_address: 0,
            high_address: 0,
            byte_count: 0,
            base_address: 0,
        }
    }

    pub fn is_bss(&self) -> bool {
        self.flags.z
    }

    /// Width of the section's address range as computed by layout.
    ///
    /// Forward-walked sections keep `low_address` inclusive and
    /// `high_address` exclusive; backward-walked sections the reverse. An
    /// anchor section holding bytes on both sides of its first `.ORG` has
    /// both bounds exclusive, so its extent is one more than `byte_count`.
    /// `.ORG` can also shrink the extent below the bytes actually stored;
    /// use `byte_count` to measure contents.
    pub fn extent(&self) -> u16 {
        self.high_address.wrapping_sub(self.low_address)
    }
}

impl Default for SectionDescriptor {
    fn default() -> Self {
        Self::new(DEFAULT_SECTION_NAME, SectionFlags::RWX)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    pub descriptor: SectionDescriptor,
    pub lines: Vec<LineId>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MmioKind {
    Input,
    Output,
}

/// A memory-mapped I/O port declared with `.INPUT` or `.OUTPUT`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mmio {
    pub name: String,
    pub kind: MmioKind,
}

#[derive(Debug, Clone, Default)]
pub struct SectionedProgram {
    pub sections: Vec<Section>,
    pub system_calls: Vec<String>,
    pub mmios: Vec<Mmio>,
}

/// Partition `program` into named sections. The initial section is always
/// first, even when no line lands in it.
pub fn split_to_sections(
    program: &Program,
    symbols: &SymbolTable,
    initial: SectionDescriptor,
) -> Result<SectionedProgram, AssemblyError> {
    let mut result = SectionedProgram::default();
    let mut by_name: FxHashMap<String, usize> = FxHashMap::default();
    by_name.insert(initial.name.clone(), 0);
    result.sections.push(Section {
        descriptor: initial,
        lines: Vec::new(),
    });
    let mut active = 0;

    for (id, line) in program.iter() {
        if let Some(symbol) = line.symbol {
            match symbols.get(symbol) {
                Some(entry) if entry.is_singly_defined() => {}
                Some(entry) => {
                    return Err(AssemblyError::MultiplyDefinedSymbol {
                        name: entry.name.clone(),
                        line: id,
                    });
                }
                None => {
                    return Err(AssemblyError::internal(
                        "line declares a symbol missing from the table",
                        Some(id),
                    ));
                }
            }
        }

        match &line.kind {
            LineKind::Section { name, flags } => match by_name.get(name) {
                Some(&index) => {
                    let existing = result.sections[index].descriptor.flags;
                    if existing != *flags {
                        return Err(AssemblyError::SectionFlagConflict {
                            name: name.clone(),
                            expected: existing,
                            found: *flags,
                            line: id,
                        });
                    }
                    active = index;
                }
                None => {
                    trace!(section = %name, flags = %flags, "opening section");
                    active = result.sections.len();
                    by_name.insert(name.clone(), active);
                    result.sections.push(Section {
                        descriptor: SectionDescriptor::new(name.clone(), *flags),
                        lines: Vec::new(),
                    });
                }
            },
            LineKind::Align(argument) => {
                let alignment = argument.count().unwrap_or(1);
                let descriptor = &mut result.sections[active].descriptor;
                descriptor.alignment = descriptor.alignment.max(alignment);
            }
            LineKind::Org { .. } => {
                result.sections[active].descriptor.org_count += 1;
            }
            LineKind::Annotate { kind, argument } => match kind {
                AnnotateKind::Scall => result.system_calls.push(annotation_name(argument)),
                AnnotateKind::Input => result.mmios.push(Mmio {
                    name: annotation_name(argument),
                    kind: MmioKind::Input,
                }),
                AnnotateKind::Output => result.mmios.push(Mmio {
                    name: annotation_name(argument),
                    kind: MmioKind::Output,
                }),
                AnnotateKind::Export | AnnotateKind::Import => {}
            },
            _ => {}
        }

        result.sections[active].lines.push(id);
    }

    debug!(
        sections = result.sections.len(),
        system_calls = result.system_calls.len(),
        mmios = result.mmios.len(),
        "split program into sections"
    );
    Ok(result)
}

fn annotation_name(argument: &Argument) -> String {
    match argument {
        Argument::Symbolic { name, .. } => name.clone(),
        other => other.to_string(),
    }
}
