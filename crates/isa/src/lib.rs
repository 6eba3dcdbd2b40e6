use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Mnemonic {
    Ret,
    Sret,
    Movflga,
    Movaflg,
    Movspa,
    Movasp,
    Nop,
    Nega,
    Negx,
    Asla,
    Aslx,
    Asra,
    Asrx,
    Nota,
    Notx,
    Rola,
    Rolx,
    Rora,
    Rorx,
    Br,
    Brle,
    Brlt,
    Breq,
    Brne,
    Brge,
    Brgt,
    Brv,
    Brc,
    Call,
    Scall,
    Addsp,
    Subsp,
    Adda,
    Addx,
    Suba,
    Subx,
    Anda,
    Andx,
    Ora,
    Orx,
    Xora,
    Xorx,
    Cpwa,
    Cpwx,
    Cpba,
    Cpbx,
    Ldwa,
    Ldwx,
    Ldba,
    Ldbx,
    Stwa,
    Stwx,
    Stba,
    Stbx,
}

/// Operand addressing modes. `None` is only legal for unary instructions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AddressingMode {
    None,
    I,
    D,
    N,
    S,
    Sf,
    X,
    Sx,
    Sfx,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstructionType {
    /// Unary, no register field.
    UnaryNone,
    /// Unary, register field in the low bit.
    UnaryRegister,
    /// Branches and calls: immediate or indexed only.
    BranchIx,
    /// Non-register instruction accepting every addressing mode.
    AaaAll,
    /// Register instruction accepting every addressing mode.
    RaaaAll,
    /// Register instruction rejecting immediate addressing (stores).
    RaaaNoImmediate,
}

const AAA_MODES: [AddressingMode; 8] = [
    AddressingMode::I,
    AddressingMode::D,
    AddressingMode::N,
    AddressingMode::S,
    AddressingMode::Sf,
    AddressingMode::X,
    AddressingMode::Sx,
    AddressingMode::Sfx,
];

impl Mnemonic {
    pub const fn base_opcode(self) -> u8 {
        match self {
            Mnemonic::Ret => 0x01,
            Mnemonic::Sret => 0x02,
            Mnemonic::Movflga => 0x03,
            Mnemonic::Movaflg => 0x04,
            Mnemonic::Movspa => 0x05,
            Mnemonic::Movasp => 0x06,
            Mnemonic::Nop => 0x07,
            Mnemonic::Nega => 0x18,
            Mnemonic::Negx => 0x19,
            Mnemonic::Asla => 0x1A,
            Mnemonic::Aslx => 0x1B,
            Mnemonic::Asra => 0x1C,
            Mnemonic::Asrx => 0x1D,
            Mnemonic::Nota => 0x1E,
            Mnemonic::Notx => 0x1F,
            Mnemonic::Rola => 0x20,
            Mnemonic::Rolx => 0x21,
            Mnemonic::Rora => 0x22,
            Mnemonic::Rorx => 0x23,
            Mnemonic::Br => 0x24,
            Mnemonic::Brle => 0x26,
            Mnemonic::Brlt => 0x28,
            Mnemonic::Breq => 0x2A,
            Mnemonic::Brne => 0x2C,
            Mnemonic::Brge => 0x2E,
            Mnemonic::Brgt => 0x30,
            Mnemonic::Brv => 0x32,
            Mnemonic::Brc => 0x34,
            Mnemonic::Call => 0x36,
            Mnemonic::Scall => 0x38,
            Mnemonic::Addsp => 0x40,
            Mnemonic::Subsp => 0x48,
            Mnemonic::Adda => 0x50,
            Mnemonic::Addx => 0x58,
            Mnemonic::Suba => 0x60,
            Mnemonic::Subx => 0x68,
            Mnemonic::Anda => 0x70,
            Mnemonic::Andx => 0x78,
            Mnemonic::Ora => 0x80,
            Mnemonic::Orx => 0x88,
            Mnemonic::Xora => 0x90,
            Mnemonic::Xorx => 0x98,
            Mnemonic::Cpwa => 0xA0,
            Mnemonic::Cpwx => 0xA8,
            Mnemonic::Cpba => 0xB0,
            Mnemonic::Cpbx => 0xB8,
            Mnemonic::Ldwa => 0xC0,
            Mnemonic::Ldwx => 0xC8,
            Mnemonic::Ldba => 0xD0,
            Mnemonic::Ldbx => 0xD8,
            Mnemonic::Stwa => 0xE0,
            Mnemonic::Stwx => 0xE8,
            Mnemonic::Stba => 0xF0,
            Mnemonic::Stbx => 0xF8,
        }
    }

    pub const fn instruction_type(self) -> InstructionType {
        match self {
            Mnemonic::Ret
            | Mnemonic::Sret
            | Mnemonic::Movflga
            | Mnemonic::Movaflg
            | Mnemonic::Movspa
            | Mnemonic::Movasp
            | Mnemonic::Nop => InstructionType::UnaryNone,
            Mnemonic::Nega
            | Mnemonic::Negx
            | Mnemonic::Asla
            | Mnemonic::Aslx
            | Mnemonic::Asra
            | Mnemonic::Asrx
            | Mnemonic::Nota
            | Mnemonic::Notx
            | Mnemonic::Rola
            | Mnemonic::Rolx
            | Mnemonic::Rora
            | Mnemonic::Rorx => InstructionType::UnaryRegister,
            Mnemonic::Br
            | Mnemonic::Brle
            | Mnemonic::Brlt
            | Mnemonic::Breq
            | Mnemonic::Brne
            | Mnemonic::Brge
            | Mnemonic::Brgt
            | Mnemonic::Brv
            | Mnemonic::Brc
            | Mnemonic::Call => InstructionType::BranchIx,
            Mnemonic::Scall | Mnemonic::Addsp | Mnemonic::Subsp => InstructionType::AaaAll,
            Mnemonic::Stwa | Mnemonic::Stwx | Mnemonic::Stba | Mnemonic::Stbx => {
                InstructionType::RaaaNoImmediate
            }
            _ => InstructionType::RaaaAll,
        }
    }

    pub const fn is_unary(self) -> bool {
        matches!(
            self.instruction_type(),
            InstructionType::UnaryNone | InstructionType::UnaryRegister
        )
    }

    pub fn name(self) -> &'static str {
        match self {
            Mnemonic::Ret => "RET",
            Mnemonic::Sret => "SRET",
            Mnemonic::Movflga => "MOVFLGA",
            Mnemonic::Movaflg => "MOVAFLG",
            Mnemonic::Movspa => "MOVSPA",
            Mnemonic::Movasp => "MOVASP",
            Mnemonic::Nop => "NOP",
            Mnemonic::Nega => "NEGA",
            Mnemonic::Negx => "NEGX",
            Mnemonic::Asla => "ASLA",
            Mnemonic::Aslx => "ASLX",
            Mnemonic::Asra => "ASRA",
            Mnemonic::Asrx => "ASRX",
            Mnemonic::Nota => "NOTA",
            Mnemonic::Notx => "NOTX",
            Mnemonic::Rola => "ROLA",
            Mnemonic::Rolx => "ROLX",
            Mnemonic::Rora => "RORA",
            Mnemonic::Rorx => "RORX",
            Mnemonic::Br => "BR",
            Mnemonic::Brle => "BRLE",
            Mnemonic::Brlt => "BRLT",
            Mnemonic::Breq => "BREQ",
            Mnemonic::Brne => "BRNE",
            Mnemonic::Brge => "BRGE",
            Mnemonic::Brgt => "BRGT",
            Mnemonic::Brv => "BRV",
            Mnemonic::Brc => "BRC",
            Mnemonic::Call => "CALL",
            Mnemonic::Scall => "SCALL",
            Mnemonic::Addsp => "ADDSP",
            Mnemonic::Subsp => "SUBSP",
            Mnemonic::Adda => "ADDA",
            Mnemonic::Addx => "ADDX",
            Mnemonic::Suba => "SUBA",
            Mnemonic::Subx => "SUBX",
            Mnemonic::Anda => "ANDA",
            Mnemonic::Andx => "ANDX",
            Mnemonic::Ora => "ORA",
            Mnemonic::Orx => "ORX",
            Mnemonic::Xora => "XORA",
            Mnemonic::Xorx => "XORX",
            Mnemonic::Cpwa => "CPWA",
            Mnemonic::Cpwx => "CPWX",
            Mnemonic::Cpba => "CPBA",
            Mnemonic::Cpbx => "CPBX",
            Mnemonic::Ldwa => "LDWA",
            Mnemonic::Ldwx => "LDWX",
            Mnemonic::Ldba => "LDBA",
            Mnemonic::Ldbx => "LDBX",
            Mnemonic::Stwa => "STWA",
            Mnemonic::Stwx => "STWX",
            Mnemonic::Stba => "STBA",
            Mnemonic::Stbx => "STBX",
        }
    }
}

impl AddressingMode {
    pub fn name(self) -> &'static str {
        match self {
            AddressingMode::None => "",
            AddressingMode::I => "i",
            AddressingMode::D => "d",
            AddressingMode::N => "n",
            AddressingMode::S => "s",
            AddressingMode::Sf => "sf",
            AddressingMode::X => "x",
            AddressingMode::Sx => "sx",
            AddressingMode::Sfx => "sfx",
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum EncodeError {
    #[error("'{mnemonic}' is unary and takes no addressing mode")]
    UnaryWithMode { mnemonic: &'static str },
    #[error("'{mnemonic}' requires an addressing mode")]
    MissingMode { mnemonic: &'static str },
    #[error("addressing mode '{mode}' is not legal for '{mnemonic}'")]
    IllegalMode {
        mnemonic: &'static str,
        mode: &'static str,
    },
}

/// Composite opcode for a mnemonic/addressing-mode pair.
pub fn opcode(mnemonic: Mnemonic, mode: AddressingMode) -> Result<u8, EncodeError> {
    let base = mnemonic.base_opcode();
    let illegal = || EncodeError::IllegalMode {
        mnemonic: mnemonic.name(),
        mode: mode.name(),
    };
    match mnemonic.instruction_type() {
        InstructionType::UnaryNone | InstructionType::UnaryRegister => {
            if mode == AddressingMode::None {
                Ok(base)
            } else {
                Err(EncodeError::UnaryWithMode {
                    mnemonic: mnemonic.name(),
                })
            }
        }
        InstructionType::BranchIx => match mode {
            AddressingMode::None => Err(EncodeError::MissingMode {
                mnemonic: mnemonic.name(),
            }),
            AddressingMode::I => Ok(base),
            AddressingMode::X => Ok(base + 1),
            _ => Err(illegal()),
        },
        kind => {
            if mode == AddressingMode::None {
                return Err(EncodeError::MissingMode {
                    mnemonic: mnemonic.name(),
                });
            }
            if kind == InstructionType::RaaaNoImmediate && mode == AddressingMode::I {
                return Err(illegal());
            }
            let offset = AAA_MODES
                .iter()
                .position(|candidate| *candidate == mode)
                .ok_or_else(illegal)?;
            Ok(base + offset as u8)
        }
    }
}
