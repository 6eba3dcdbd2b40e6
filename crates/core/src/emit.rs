use std::ops::Range;

use pepas_ir::{Argument, Line, LineId, LineKind, LiteralKind, Program};
use pepas_isa::{AddressingMode, opcode};
use pepas_symbol::SymbolTable;
use tracing::{debug, trace};

use crate::error::AssemblyError;
use crate::sections::Section;
use crate::table::{AddressTable, SortedTable, UnsortedTable};

/// Bytes of one line inside its section's buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectSpan {
    pub section: usize,
    pub range: Range<usize>,
}

/// A symbolic operand whose value was unknown at emission time. The bytes at
/// `offset` are left zero for the consumer to patch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Relocation {
    pub section: usize,
    pub offset: usize,
    pub width: u8,
    pub symbol: String,
    pub line: LineId,
}

#[derive(Debug, Clone, Default)]
pub struct ObjectCode {
    /// One buffer per section, in section order. Empty for BSS sections.
    pub buffers: Vec<Vec<u8>>,
    pub relocations: Vec<Relocation>,
    pub spans: SortedTable<ObjectSpan>,
}

struct Emitter<'a> {
    symbols: &'a SymbolTable,
    linked: &'a [&'a SymbolTable],
    relocations: Vec<Relocation>,
}

pub fn emit_object_code(
    program: &Program,
    sections: &[Section],
    addresses: &AddressTable,
    symbols: &SymbolTable,
    linked: &[&SymbolTable],
) -> Result<ObjectCode, AssemblyError> {
    let mut emitter = Emitter {
        symbols,
        linked,
        relocations: Vec::new(),
    };
    let mut spans = UnsortedTable::new();
    let mut buffers = Vec::with_capacity(sections.len());

    for (index, section) in sections.iter().enumerate() {
        if section.descriptor.is_bss() {
            for &id in &section.lines {
                if addresses.contains(id) {
                    spans.insert(
                        id,
                        ObjectSpan {
                            section: index,
                            range: 0..0,
                        },
                    );
                }
            }
            buffers.push(Vec::new());
            continue;
        }

        let mut bytes = vec![0u8; section.descriptor.byte_count as usize];
        let mut cursor = 0usize;
        for &id in &section.lines {
            let Some(address) = addresses.get(id) else {
                continue;
            };
            let size = usize::from(address.size);
            let end = cursor + size;
            let Some(target) = bytes.get_mut(cursor..end) else {
                return Err(AssemblyError::internal(
                    format!(
                        "line overruns section \"{}\" ({end} > {} bytes)",
                        section.descriptor.name, section.descriptor.byte_count
                    ),
                    Some(id),
                ));
            };
            emitter.emit_line(&program[id], id, index, cursor, target)?;
            trace!(%id, section = index, start = cursor, end, "emitted line");
            spans.insert(
                id,
                ObjectSpan {
                    section: index,
                    range: cursor..end,
                },
            );
            cursor = end;
        }
        if cursor != bytes.len() {
            return Err(AssemblyError::internal(
                format!(
                    "section \"{}\" emitted {cursor} of {} bytes",
                    section.descriptor.name,
                    bytes.len()
                ),
                None,
            ));
        }
        buffers.push(bytes);
    }

    debug!(
        sections = buffers.len(),
        relocations = emitter.relocations.len(),
        "emitted object code"
    );
    Ok(ObjectCode {
        buffers,
        relocations: emitter.relocations,
        spans: spans.finish(),
    })
}

impl Emitter<'_> {
    /// Fill `out`, which is exactly the line's address-table size.
    fn emit_line(
        &mut self,
        line: &Line,
        id: LineId,
        section: usize,
        offset: usize,
        out: &mut [u8],
    ) -> Result<(), AssemblyError> {
        match &line.kind {
            LineKind::Monadic { mnemonic } => {
                let op = opcode(*mnemonic, AddressingMode::None)
                    .map_err(|source| AssemblyError::InvalidInstruction { source, line: id })?;
                self.write(out, 0, &[op], id)
            }
            LineKind::Dyadic {
                mnemonic,
                mode,
                argument,
            } => {
                let op = opcode(*mnemonic, *mode)
                    .map_err(|source| AssemblyError::InvalidInstruction { source, line: id })?;
                self.write(out, 0, &[op], id)?;
                self.operand(argument, 2, id, section, offset + 1, &mut out[1..])
            }
            LineKind::Align(_) | LineKind::Block(_) => {
                out.fill(0);
                Ok(())
            }
            LineKind::Literal {
                kind: LiteralKind::Ascii,
                argument,
            } => {
                let text = argument.as_bytes().ok_or_else(|| {
                    AssemblyError::UnsupportedArgumentKind {
                        reason: ".ASCII requires a string".to_string(),
                        line: id,
                    }
                })?;
                self.write(out, 0, text, id)
            }
            LineKind::Literal {
                kind: LiteralKind::Byte,
                argument,
            } => self.operand(argument, 1, id, section, offset, out),
            LineKind::Literal {
                kind: LiteralKind::Word,
                argument,
            } => self.operand(argument, 2, id, section, offset, out),
            LineKind::Blank
            | LineKind::Comment
            | LineKind::Equate(_)
            | LineKind::Section { .. }
            | LineKind::Annotate { .. }
            | LineKind::Org { .. } => Err(AssemblyError::internal(
                "non-addressable line has an address",
                Some(id),
            )),
        }
    }

    fn write(&self, out: &mut [u8], at: usize, bytes: &[u8], id: LineId) -> Result<(), AssemblyError> {
        let Some(target) = out.get_mut(at..at + bytes.len()) else {
            return Err(AssemblyError::internal(
                format!("{} bytes do not fit in {}", bytes.len(), out.len()),
                Some(id),
            ));
        };
        target.copy_from_slice(bytes);
        Ok(())
    }

    /// Write a big-endian operand of `width` bytes, or record a relocation
    /// when its symbol cannot be resolved yet.
    fn operand(
        &mut self,
        argument: &Argument,
        width: u8,
        id: LineId,
        section: usize,
        offset: usize,
        out: &mut [u8],
    ) -> Result<(), AssemblyError> {
        let value = match argument {
            Argument::Symbolic { name, symbol } => {
                match self.symbols.resolve_ref(*symbol, self.linked) {
                    Some(value) if fits(value, width) => value,
                    Some(value) => {
                        return Err(AssemblyError::UnsupportedArgumentKind {
                            reason: format!(
                                "value {value:#06X} of \"{name}\" does not fit in {width} byte(s)"
                            ),
                            line: id,
                        });
                    }
                    None => {
                        trace!(%id, symbol = %name, "unresolved operand, emitting relocation");
                        self.relocations.push(Relocation {
                            section,
                            offset,
                            width,
                            symbol: name.clone(),
                            line: id,
                        });
                        out.fill(0);
                        return Ok(());
                    }
                }
            }
            other => match other.constant(width) {
                Ok(Some(value)) => value,
                Ok(None) => return Err(AssemblyError::internal("constant without a value", Some(id))),
                Err(err) => {
                    return Err(AssemblyError::UnsupportedArgumentKind {
                        reason: err.to_string(),
                        line: id,
                    });
                }
            },
        };
        let encoded = value.to_be_bytes();
        self.write(out, 0, &encoded[encoded.len() - usize::from(width)..], id)
    }
}

fn fits(value: u64, width: u8) -> bool {
    u32::from(width) >= u64::BITS / 8 || value >> (u32::from(width) * 8) == 0
}
