use std::sync::atomic::{AtomicU32, Ordering};

use indexmap::IndexMap;

use super::SymbolValue;

const MAX_POINTER_DEPTH: usize = 32;

static NEXT_TABLE_ID: AtomicU32 = AtomicU32::new(0);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TableId(u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SymbolId(u32);

impl SymbolId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Identifies an entry independently of the table that owns it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SymbolRef {
    pub table: TableId,
    pub entry: SymbolId,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DefinitionState {
    Undefined,
    Single,
    Multiple,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Binding {
    Local,
    Global,
    Imported,
}

#[derive(Debug, Clone)]
pub struct SymbolEntry {
    pub name: String,
    pub state: DefinitionState,
    pub binding: Binding,
    pub value: SymbolValue,
    /// Index of the section the symbol is relocated against, once laid out.
    pub section: Option<usize>,
}

impl SymbolEntry {
    fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            state: DefinitionState::Undefined,
            binding: Binding::Local,
            value: SymbolValue::Empty,
            section: None,
        }
    }

    pub fn is_singly_defined(&self) -> bool {
        self.state == DefinitionState::Single
    }
}

/// Root symbol table of one assembly target.
#[derive(Debug)]
pub struct SymbolTable {
    id: TableId,
    entries: IndexMap<String, SymbolEntry>,
}

impl Default for SymbolTable {
    fn default() -> Self {
        Self::new()
    }
}

impl SymbolTable {
    pub fn new() -> Self {
        Self {
            id: TableId(NEXT_TABLE_ID.fetch_add(1, Ordering::Relaxed)),
            entries: IndexMap::new(),
        }
    }

    pub fn id(&self) -> TableId {
        self.id
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Record a definition of `name`. A second definition marks the entry as
    /// multiply defined; the caller decides whether that is fatal.
    pub fn define(&mut self, name: &str) -> SymbolId {
        let id = self.reference(name);
        let entry = &mut self.entries[id.index()];
        entry.state = match entry.state {
            DefinitionState::Undefined => DefinitionState::Single,
            DefinitionState::Single | DefinitionState::Multiple => DefinitionState::Multiple,
        };
        id
    }

    pub fn reference(&mut self, name: &str) -> SymbolId {
        let entry = self.entries.entry(name.to_string());
        let index = entry.index();
        entry.or_insert_with(|| SymbolEntry::new(name));
        SymbolId(index as u32)
    }

    pub fn find(&self, name: &str) -> Option<SymbolId> {
        self.entries
            .get_index_of(name)
            .map(|index| SymbolId(index as u32))
    }

    pub fn get(&self, id: SymbolId) -> Option<&SymbolEntry> {
        self.entries.get_index(id.index()).map(|(_, entry)| entry)
    }

    pub fn get_mut(&mut self, id: SymbolId) -> Option<&mut SymbolEntry> {
        self.entries
            .get_index_mut(id.index())
            .map(|(_, entry)| entry)
    }

    pub fn name(&self, id: SymbolId) -> Option<&str> {
        self.get(id).map(|entry| entry.name.as_str())
    }

    pub fn set_value(&mut self, id: SymbolId, value: SymbolValue) {
        if let Some(entry) = self.get_mut(id) {
            entry.value = value;
        }
    }

    pub fn set_binding(&mut self, id: SymbolId, binding: Binding) {
        if let Some(entry) = self.get_mut(id) {
            entry.binding = binding;
        }
    }

    pub fn symbol_ref(&self, id: SymbolId) -> SymbolRef {
        SymbolRef {
            table: self.id,
            entry: id,
        }
    }

    pub fn owns(&self, symbol: SymbolRef) -> bool {
        symbol.table == self.id
    }

    pub fn iter(&self) -> impl Iterator<Item = (SymbolId, &SymbolEntry)> {
        self.entries
            .values()
            .enumerate()
            .map(|(index, entry)| (SymbolId(index as u32), entry))
    }

    /// Numeric value of an entry, following pointers into this table and into
    /// any of the `linked` tables. `None` when the value is not known yet.
    pub fn resolve(&self, id: SymbolId, linked: &[&SymbolTable]) -> Option<u64> {
        self.resolve_with_depth(id, linked, 0)
    }

    /// Resolve a reference that may point into another table.
    pub fn resolve_ref(&self, symbol: SymbolRef, linked: &[&SymbolTable]) -> Option<u64> {
        if self.owns(symbol) {
            return self.resolve(symbol.entry, linked);
        }
        let table = linked.iter().find(|table| table.owns(symbol))?;
        table.resolve(symbol.entry, linked)
    }

    fn resolve_with_depth(&self, id: SymbolId, linked: &[&SymbolTable], depth: usize) -> Option<u64> {
        if depth > MAX_POINTER_DEPTH {
            return None;
        }
        match self.get(id)?.value {
            SymbolValue::Empty => None,
            SymbolValue::Constant(bits) => Some(bits.value()),
            SymbolValue::Location {
                address, offset, ..
            } => Some(u64::from(address.wrapping_add(offset))),
            SymbolValue::InternalPointer(target) => {
                self.resolve_with_depth(target, linked, depth + 1)
            }
            SymbolValue::ExternalPointer { table, entry } => {
                let other = linked.iter().find(|candidate| candidate.id == table)?;
                other.resolve_with_depth(entry, linked, depth + 1)
            }
        }
    }
}
