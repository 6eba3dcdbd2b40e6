use pepas_ir::Program;
use pepas_symbol::{Binding, SymbolTable, SymbolValue};
use tracing::debug;

use crate::assign::assign_addresses;
use crate::emit::{ObjectCode, emit_object_code};
use crate::error::AssemblyError;
use crate::sections::{Mmio, Section, SectionDescriptor, split_to_sections};
use crate::table::AddressTable;

#[derive(Debug, Clone)]
pub struct AssembleOptions<'a> {
    /// Origin used when the program has neither `.ORG` nor `.BURN`.
    pub initial_base_address: u16,
    pub default_section: SectionDescriptor,
    /// Symbol tables of other targets that imported symbols may refer to.
    pub linked: &'a [&'a SymbolTable],
}

impl Default for AssembleOptions<'_> {
    fn default() -> Self {
        Self {
            initial_base_address: 0,
            default_section: SectionDescriptor::default(),
            linked: &[],
        }
    }
}

#[derive(Debug, Clone)]
pub struct AssemblyOutput {
    pub sections: Vec<Section>,
    pub system_calls: Vec<String>,
    pub mmios: Vec<Mmio>,
    pub addresses: AddressTable,
    pub object: ObjectCode,
}

impl AssemblyOutput {
    /// Bytes emitted for the section at `index`.
    pub fn section_bytes(&self, index: usize) -> &[u8] {
        self.object
            .buffers
            .get(index)
            .map_or(&[], |bytes| bytes.as_slice())
    }
}

/// Run sectioning, address assignment and object code emission for one
/// target. `symbols` receives the final value of every declared symbol.
pub fn assemble(
    program: &Program,
    symbols: &mut SymbolTable,
    options: &AssembleOptions<'_>,
) -> Result<AssemblyOutput, AssemblyError> {
    bind_imports(symbols, options.linked);

    let split = split_to_sections(program, symbols, options.default_section.clone())?;
    let mut sections = split.sections;

    let addresses = assign_addresses(
        program,
        &mut sections,
        symbols,
        options.initial_base_address,
    )?;
    debug!(lines = addresses.len(), "assigned addresses");

    let object = emit_object_code(program, &sections, &addresses, symbols, options.linked)?;

    Ok(AssemblyOutput {
        sections,
        system_calls: split.system_calls,
        mmios: split.mmios,
        addresses,
        object,
    })
}

/// Point every unresolved import at the exported symbol of the same name in
/// the first linked table that defines it.
fn bind_imports(symbols: &mut SymbolTable, linked: &[&SymbolTable]) {
    let imports: Vec<_> = symbols
        .iter()
        .filter(|(_, entry)| entry.binding == Binding::Imported && entry.value.is_empty())
        .map(|(id, entry)| (id, entry.name.clone()))
        .collect();

    for (id, name) in imports {
        let target = linked.iter().find_map(|table| {
            let entry = table.find(&name)?;
            let exported = table.get(entry)?;
            (exported.binding == Binding::Global && exported.is_singly_defined())
                .then(|| (table.id(), entry))
        });
        match target {
            Some((table, entry)) => {
                debug!(symbol = %name, "bound import to linked table");
                symbols.set_value(id, SymbolValue::ExternalPointer { table, entry });
            }
            None => debug!(symbol = %name, "import left unresolved"),
        }
    }
}
