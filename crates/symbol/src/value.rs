use super::{SymbolId, TableId};

/// A fixed-width bit pattern. Only the bits selected by `mask` are meaningful.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MaskedBits {
    pub byte_count: u8,
    pub bit_pattern: u64,
    pub mask: u64,
}

impl MaskedBits {
    pub const fn word(value: u16) -> Self {
        Self {
            byte_count: 2,
            bit_pattern: value as u64,
            mask: 0xFFFF,
        }
    }

    pub const fn value(&self) -> u64 {
        self.bit_pattern & self.mask
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolKind {
    Code,
    Object,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SymbolValue {
    #[default]
    Empty,
    Constant(MaskedBits),
    Location {
        /// Bytes occupied by the object at `address`.
        size: u16,
        /// Bytes needed to store a pointer to the object.
        address_width: u16,
        address: u16,
        offset: u16,
        kind: SymbolKind,
    },
    InternalPointer(SymbolId),
    ExternalPointer {
        table: TableId,
        entry: SymbolId,
    },
}

impl SymbolValue {
    pub fn location(address: u16, size: u16, kind: SymbolKind) -> Self {
        Self::Location {
            size,
            address_width: 2,
            address,
            offset: 0,
            kind,
        }
    }

    pub fn size(&self) -> u32 {
        match self {
            SymbolValue::Empty => 0,
            SymbolValue::Constant(bits) => u32::from(bits.byte_count),
            SymbolValue::Location { size, .. } => u32::from(*size),
            SymbolValue::InternalPointer(_) | SymbolValue::ExternalPointer { .. } => 2,
        }
    }

    pub fn kind(&self) -> Option<SymbolKind> {
        match self {
            SymbolValue::Location { kind, .. } => Some(*kind),
            _ => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, SymbolValue::Empty)
    }
}
