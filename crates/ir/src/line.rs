use std::fmt;

use pepas_isa::{AddressingMode, Mnemonic};
use pepas_symbol::{SymbolId, SymbolRef};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Operand of an instruction or directive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Argument {
    Decimal(i32),
    Hexadecimal(u16),
    Character(u8),
    String(Vec<u8>),
    Symbolic { name: String, symbol: SymbolRef },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ArgumentError {
    #[error("value {value} does not fit in {width} byte(s)")]
    OutOfRange { value: i64, width: u8 },
    #[error("string of {len} bytes does not fit in {width} byte(s)")]
    StringTooLong { len: usize, width: u8 },
}

impl Argument {
    pub fn symbol(&self) -> Option<SymbolRef> {
        match self {
            Argument::Symbolic { symbol, .. } => Some(*symbol),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Argument::String(bytes) => Some(bytes),
            _ => None,
        }
    }

    /// Value of a non-symbolic argument truncated to `width` big-endian bytes.
    /// Returns `Ok(None)` for symbolic arguments, whose value lives in a
    /// symbol table.
    pub fn constant(&self, width: u8) -> Result<Option<u64>, ArgumentError> {
        let bits = u32::from(width.clamp(1, 8)) * 8;
        let mask = if bits >= 64 { u64::MAX } else { (1u64 << bits) - 1 };
        match self {
            Argument::Decimal(value) => {
                let value = i64::from(*value);
                let min = -(1i64 << (bits - 1));
                if value < min || value > mask as i64 {
                    return Err(ArgumentError::OutOfRange { value, width });
                }
                Ok(Some(value as u64 & mask))
            }
            Argument::Hexadecimal(value) => {
                let value = u64::from(*value);
                if value > mask {
                    return Err(ArgumentError::OutOfRange {
                        value: value as i64,
                        width,
                    });
                }
                Ok(Some(value))
            }
            Argument::Character(value) => Ok(Some(u64::from(*value))),
            Argument::String(bytes) => {
                if bytes.len() > usize::from(width) {
                    return Err(ArgumentError::StringTooLong {
                        len: bytes.len(),
                        width,
                    });
                }
                Ok(Some(
                    bytes
                        .iter()
                        .fold(0u64, |acc, byte| (acc << 8) | u64::from(*byte)),
                ))
            }
            Argument::Symbolic { .. } => Ok(None),
        }
    }

    /// Non-negative count used by `.BLOCK` and `.ALIGN`.
    pub fn count(&self) -> Option<u16> {
        match self {
            Argument::Decimal(value) => u16::try_from(*value).ok(),
            Argument::Hexadecimal(value) => Some(*value),
            Argument::Character(value) => Some(u16::from(*value)),
            Argument::String(_) | Argument::Symbolic { .. } => None,
        }
    }
}

impl fmt::Display for Argument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Argument::Decimal(value) => write!(f, "{value}"),
            Argument::Hexadecimal(value) => write!(f, "0x{value:04X}"),
            Argument::Character(value) => write!(f, "'{}'", escape_byte(*value, b'\'')),
            Argument::String(bytes) => {
                f.write_str("\"")?;
                for byte in bytes {
                    f.write_str(&escape_byte(*byte, b'"'))?;
                }
                f.write_str("\"")
            }
            Argument::Symbolic { name, .. } => f.write_str(name),
        }
    }
}

fn escape_byte(byte: u8, quote: u8) -> String {
    match byte {
        b'\n' => "\\n".to_string(),
        b'\t' => "\\t".to_string(),
        b'\r' => "\\r".to_string(),
        b'\\' => "\\\\".to_string(),
        _ if byte == quote => format!("\\{}", byte as char),
        0x20..=0x7E => (byte as char).to_string(),
        _ => format!("\\x{byte:02X}"),
    }
}

/// Permission flags of a section. `z` marks a section whose bytes are not
/// stored in the output file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct SectionFlags {
    pub r: bool,
    pub w: bool,
    pub x: bool,
    pub z: bool,
}

impl SectionFlags {
    pub const RWX: Self = Self {
        r: true,
        w: true,
        x: true,
        z: false,
    };

    pub fn parse(text: &str) -> Option<Self> {
        let mut flags = Self::default();
        for ch in text.chars() {
            match ch.to_ascii_lowercase() {
                'r' => flags.r = true,
                'w' => flags.w = true,
                'x' => flags.x = true,
                'z' => flags.z = true,
                _ => return None,
            }
        }
        Some(flags)
    }

    /// Same R/W/X permissions, ignoring `z`.
    pub fn same_permissions(&self, other: &Self) -> bool {
        self.r == other.r && self.w == other.w && self.x == other.x
    }
}

impl fmt::Display for SectionFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (set, ch) in [(self.r, 'r'), (self.w, 'w'), (self.x, 'x'), (self.z, 'z')] {
            if set {
                write!(f, "{ch}")?;
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LiteralKind {
    Ascii,
    Byte,
    Word,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnnotateKind {
    Export,
    Import,
    Input,
    Output,
    Scall,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrgKind {
    Org,
    Burn,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineKind {
    Blank,
    Comment,
    Monadic {
        mnemonic: Mnemonic,
    },
    Dyadic {
        mnemonic: Mnemonic,
        mode: AddressingMode,
        argument: Argument,
    },
    Align(Argument),
    Literal {
        kind: LiteralKind,
        argument: Argument,
    },
    Block(Argument),
    Equate(Argument),
    Section {
        name: String,
        flags: SectionFlags,
    },
    Annotate {
        kind: AnnotateKind,
        argument: Argument,
    },
    Org {
        kind: OrgKind,
        argument: Argument,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Line {
    pub kind: LineKind,
    pub symbol: Option<SymbolId>,
    pub comment: Option<String>,
}

impl Line {
    pub fn new(kind: LineKind) -> Self {
        Self {
            kind,
            symbol: None,
            comment: None,
        }
    }

    pub fn with_symbol(mut self, symbol: SymbolId) -> Self {
        self.symbol = Some(symbol);
        self
    }

    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    pub fn is_instruction(&self) -> bool {
        matches!(
            self.kind,
            LineKind::Monadic { .. } | LineKind::Dyadic { .. }
        )
    }

    /// Bytes this line occupies when placed at `base`, or `None` when the
    /// line never occupies address space.
    pub fn object_size(&self, base: u16) -> Option<u16> {
        match &self.kind {
            LineKind::Blank
            | LineKind::Comment
            | LineKind::Equate(_)
            | LineKind::Section { .. }
            | LineKind::Annotate { .. }
            | LineKind::Org { .. } => None,
            LineKind::Monadic { .. } => Some(1),
            LineKind::Dyadic { .. } => Some(3),
            LineKind::Literal { kind, argument } => Some(match kind {
                LiteralKind::Byte => 1,
                LiteralKind::Word => 2,
                LiteralKind::Ascii => argument
                    .as_bytes()
                    .map_or(0, |bytes| u16::try_from(bytes.len()).unwrap_or(u16::MAX)),
            }),
            LineKind::Block(argument) => Some(argument.count().unwrap_or(0)),
            LineKind::Align(argument) => {
                let alignment = argument.count().unwrap_or(1);
                if alignment <= 1 {
                    return Some(0);
                }
                Some((alignment - base % alignment) % alignment)
            }
        }
    }
}
