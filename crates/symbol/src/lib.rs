mod table;
mod value;

pub use table::{Binding, DefinitionState, SymbolEntry, SymbolId, SymbolRef, SymbolTable, TableId};
pub use value::{MaskedBits, SymbolKind, SymbolValue};

#[cfg(test)]
mod tests;
