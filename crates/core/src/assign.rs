use pepas_ir::{Argument, LineId, LineKind, OrgKind, Program};
use pepas_symbol::{MaskedBits, SymbolId, SymbolKind, SymbolTable, SymbolValue};
use tracing::{debug, trace};

use crate::error::AssemblyError;
use crate::sections::Section;
use crate::table::{Address, AddressTable, UnsortedTable};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Forward,
    Backward,
}

/// One entry of the section processing order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// The section holding the first `.ORG`. Lines before `split` are walked
    /// backward from `origin - 1`, the rest forward from `origin`.
    Anchor {
        section: usize,
        split: usize,
        origin: u16,
    },
    /// Walk a whole section in `direction`, starting at the base left by the
    /// previous step in the same direction.
    Walk { section: usize, direction: Direction },
}

impl Step {
    pub fn section(&self) -> usize {
        match self {
            Step::Anchor { section, .. } | Step::Walk { section, .. } => *section,
        }
    }
}

/// Compute the order in which sections are laid out.
pub fn schedule(
    program: &Program,
    sections: &[Section],
    initial_base_address: u16,
) -> Result<Vec<Step>, AssemblyError> {
    let mut steps = Vec::with_capacity(sections.len());

    let first_org = first_directive(program, sections, OrgKind::Org)?;
    match first_org {
        Some((anchor, split, origin)) => {
            steps.push(Step::Anchor {
                section: anchor,
                split,
                origin,
            });
            for section in (0..anchor).rev() {
                steps.push(Step::Walk {
                    section,
                    direction: Direction::Backward,
                });
            }
            for section in anchor + 1..sections.len() {
                steps.push(Step::Walk {
                    section,
                    direction: Direction::Forward,
                });
            }
        }
        None => match first_directive(program, sections, OrgKind::Burn)? {
            Some((_, _, burn)) => {
                debug!(burn, "laying out backward from .BURN");
                // The whole program ends at the burn address.
                steps.push(Step::Anchor {
                    section: sections.len().saturating_sub(1),
                    split: sections.last().map_or(0, |section| section.lines.len()),
                    origin: burn.wrapping_add(1),
                });
                for section in (0..sections.len().saturating_sub(1)).rev() {
                    steps.push(Step::Walk {
                        section,
                        direction: Direction::Backward,
                    });
                }
            }
            None => {
                if !sections.is_empty() {
                    steps.push(Step::Anchor {
                        section: 0,
                        split: 0,
                        origin: initial_base_address,
                    });
                }
                for section in 1..sections.len() {
                    steps.push(Step::Walk {
                        section,
                        direction: Direction::Forward,
                    });
                }
            }
        },
    }

    let mut seen = vec![false; sections.len()];
    for step in &steps {
        let index = step.section();
        if index >= sections.len() || std::mem::replace(&mut seen[index], true) {
            return Err(AssemblyError::internal(
                format!("section {index} scheduled more than once"),
                None,
            ));
        }
    }
    if steps.len() != sections.len() {
        return Err(AssemblyError::internal(
            format!(
                "layout schedule has {} entries for {} sections",
                steps.len(),
                sections.len()
            ),
            None,
        ));
    }

    Ok(steps)
}

/// Locate the first directive of `kind`, returning the section index, the
/// line position inside that section and the directive's value.
fn first_directive(
    program: &Program,
    sections: &[Section],
    kind: OrgKind,
) -> Result<Option<(usize, usize, u16)>, AssemblyError> {
    for (section_index, section) in sections.iter().enumerate() {
        for (position, &id) in section.lines.iter().enumerate() {
            if let LineKind::Org {
                kind: found,
                argument,
            } = &program[id].kind
            {
                if *found == kind {
                    let value = origin_value(argument, id)?;
                    return Ok(Some((section_index, position, value)));
                }
            }
        }
    }
    Ok(None)
}

fn origin_value(argument: &Argument, line: LineId) -> Result<u16, AssemblyError> {
    match argument.constant(2) {
        Ok(Some(value)) => Ok(value as u16),
        Ok(None) => Err(AssemblyError::UnsupportedArgumentKind {
            reason: format!("origin must be a constant, found symbol \"{argument}\""),
            line,
        }),
        Err(err) => Err(AssemblyError::UnsupportedArgumentKind {
            reason: err.to_string(),
            line,
        }),
    }
}

/// Result of walking a run of lines.
#[derive(Debug, Clone, Copy)]
struct Walked {
    entry: u16,
    exit: u16,
    /// Base in effect at the first byte-producing line of a forward walk.
    first: Option<u16>,
    bytes: u32,
}

struct Walker<'a> {
    program: &'a Program,
    symbols: &'a mut SymbolTable,
    table: &'a mut UnsortedTable<Address>,
}

impl Walker<'_> {
    fn walk(
        &mut self,
        section: usize,
        lines: &[LineId],
        direction: Direction,
        base: u16,
    ) -> Result<Walked, AssemblyError> {
        let mut walked = Walked {
            entry: base,
            exit: base,
            first: None,
            bytes: 0,
        };
        let mut base = base;
        let program = self.program;

        let ordered: Box<dyn Iterator<Item = &LineId> + '_> = match direction {
            Direction::Forward => Box::new(lines.iter()),
            Direction::Backward => Box::new(lines.iter().rev()),
        };

        for &id in ordered {
            let line = &program[id];
            match &line.kind {
                LineKind::Org {
                    kind: OrgKind::Org,
                    argument,
                } => {
                    base = origin_value(argument, id)?;
                    if let Some(symbol) = line.symbol {
                        self.place(symbol, section, base, 0, SymbolKind::Object);
                    }
                    continue;
                }
                LineKind::Equate(argument) => {
                    if let Some(symbol) = line.symbol {
                        let value = equate_value(self.symbols, argument, id)?;
                        self.symbols.set_value(symbol, value);
                    }
                    continue;
                }
                _ => {}
            }

            let size = line.object_size(base).unwrap_or(0);
            let address = match direction {
                Direction::Forward => {
                    let address = base;
                    if size > 0 && walked.first.is_none() {
                        walked.first = Some(base);
                    }
                    base = base.wrapping_add(size);
                    address
                }
                Direction::Backward => {
                    let next = base.wrapping_sub(size);
                    let address = next.wrapping_add(u16::from(size > 0));
                    base = next;
                    address
                }
            };

            if size > 0 {
                trace!(%id, address, size, "assigned address");
                self.table.insert(id, Address { address, size });
                walked.bytes += u32::from(size);
            }

            if let Some(symbol) = line.symbol {
                let kind = if line.is_instruction() {
                    SymbolKind::Code
                } else {
                    SymbolKind::Object
                };
                self.place(symbol, section, address, size, kind);
            }
        }

        walked.exit = base;
        Ok(walked)
    }

    fn place(
        &mut self,
        symbol: SymbolId,
        section: usize,
        address: u16,
        size: u16,
        kind: SymbolKind,
    ) {
        self.symbols
            .set_value(symbol, SymbolValue::location(address, size, kind));
        if let Some(entry) = self.symbols.get_mut(symbol) {
            entry.section = Some(section);
        }
    }
}

fn equate_value(
    symbols: &SymbolTable,
    argument: &Argument,
    line: LineId,
) -> Result<SymbolValue, AssemblyError> {
    if let Some(target) = argument.symbol() {
        return Ok(if symbols.owns(target) {
            SymbolValue::InternalPointer(target.entry)
        } else {
            SymbolValue::ExternalPointer {
                table: target.table,
                entry: target.entry,
            }
        });
    }
    match argument.constant(2) {
        Ok(Some(value)) => Ok(SymbolValue::Constant(MaskedBits {
            byte_count: 2,
            bit_pattern: value,
            mask: 0xFFFF,
        })),
        Ok(None) => Err(AssemblyError::internal("symbolic equate without a symbol", Some(line))),
        Err(err) => Err(AssemblyError::UnsupportedArgumentKind {
            reason: err.to_string(),
            line,
        }),
    }
}

/// Assign an address to every byte-producing line, fill in each section's
/// bounds and give every declared symbol its value.
pub fn assign_addresses(
    program: &Program,
    sections: &mut [Section],
    symbols: &mut SymbolTable,
    initial_base_address: u16,
) -> Result<AddressTable, AssemblyError> {
    let steps = schedule(program, sections, initial_base_address)?;
    let mut table = UnsortedTable::new();
    let mut walker = Walker {
        program,
        symbols,
        table: &mut table,
    };

    // Backward steps continue from `backward_base`, forward steps from
    // `forward_base`; both start at the anchor.
    let mut backward_base = initial_base_address;
    let mut forward_base = initial_base_address;

    for step in steps {
        match step {
            Step::Anchor {
                section,
                split,
                origin,
            } => {
                let lines = &sections[section].lines;
                let split = split.min(lines.len());
                let prefix = walker.walk(
                    section,
                    &lines[..split],
                    Direction::Backward,
                    origin.wrapping_sub(1),
                )?;
                let rest = walker.walk(section, &lines[split..], Direction::Forward, origin)?;

                let descriptor = &mut sections[section].descriptor;
                if prefix.bytes > 0 {
                    descriptor.low_address = prefix.exit;
                    descriptor.base_address = prefix.exit.wrapping_add(1);
                } else {
                    let low = rest.first.unwrap_or(rest.exit);
                    descriptor.low_address = low;
                    descriptor.base_address = low;
                }
                descriptor.high_address = if rest.bytes > 0 || prefix.bytes == 0 {
                    rest.exit
                } else {
                    prefix.entry
                };
                descriptor.byte_count = prefix.bytes + rest.bytes;

                backward_base = prefix.exit;
                forward_base = rest.exit;
                debug!(
                    section = %descriptor.name,
                    low = descriptor.low_address,
                    high = descriptor.high_address,
                    "laid out anchor section"
                );
            }
            Step::Walk {
                section,
                direction: Direction::Forward,
            } => {
                let walked = walker.walk(
                    section,
                    &sections[section].lines,
                    Direction::Forward,
                    forward_base,
                )?;
                let descriptor = &mut sections[section].descriptor;
                let low = walked.first.unwrap_or(walked.exit);
                descriptor.low_address = low;
                descriptor.base_address = low;
                descriptor.high_address = walked.exit;
                descriptor.byte_count = walked.bytes;
                forward_base = walked.exit;
                debug!(section = %descriptor.name, "laid out section forward");
            }
            Step::Walk {
                section,
                direction: Direction::Backward,
            } => {
                let walked = walker.walk(
                    section,
                    &sections[section].lines,
                    Direction::Backward,
                    backward_base,
                )?;
                let descriptor = &mut sections[section].descriptor;
                descriptor.high_address = walked.entry;
                descriptor.low_address = walked.exit;
                descriptor.base_address = if walked.bytes > 0 {
                    walked.exit.wrapping_add(1)
                } else {
                    walked.exit
                };
                descriptor.byte_count = walked.bytes;
                backward_base = walked.exit;
                debug!(section = %descriptor.name, "laid out section backward");
            }
        }
    }

    Ok(table.finish())
}
