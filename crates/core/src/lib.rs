pub mod assign;
pub mod driver;
pub mod emit;
pub mod error;
pub mod listing;
pub mod sections;
pub mod table;

pub use assign::{Direction, Step, assign_addresses, schedule};
pub use driver::{AssembleOptions, AssemblyOutput, assemble};
pub use emit::{ObjectCode, ObjectSpan, Relocation, emit_object_code};
pub use error::AssemblyError;
pub use listing::render_listing;
pub use sections::{
    DEFAULT_SECTION_NAME, Mmio, MmioKind, Section, SectionDescriptor, SectionedProgram,
    split_to_sections,
};
pub use table::{Address, AddressTable, SortedTable, UnsortedTable};

#[cfg(test)]
mod tests;
