use pepas_isa::{AddressingMode, Mnemonic};
use pepas_symbol::{Binding, SymbolTable};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::{AnnotateKind, Argument, Line, LineKind, LiteralKind, OrgKind, Program, SectionFlags};

/// Serialized form of an already-parsed program, one entry per source line.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Document {
    #[serde(default)]
    pub lines: Vec<SourceLine>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SourceLine {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub symbol: Option<String>,
    pub op: Op,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Op {
    Blank,
    Comment,
    Unary(Mnemonic),
    NonUnary(Mnemonic, Value, AddressingMode),
    Align(Value),
    Ascii(String),
    Byte(Value),
    Word(Value),
    Block(Value),
    Equate(Value),
    /// Section name and flag string, e.g. `Section(".data", "rw")`.
    Section(String, String),
    Export(String),
    Import(String),
    Input(String),
    Output(String),
    Scall(String),
    Org(Value),
    Burn(Value),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Value {
    Dec(i32),
    Hex(u16),
    Char(char),
    Str(String),
    Sym(String),
}

#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("failed to parse IR document: {0}")]
    Parse(#[from] ron::error::SpannedError),
    #[error("line {line}: '{mnemonic}' is unary and takes no operand")]
    UnexpectedOperand { line: usize, mnemonic: &'static str },
    #[error("line {line}: '{mnemonic}' requires an operand")]
    MissingOperand { line: usize, mnemonic: &'static str },
    #[error("line {line}: invalid section flags \"{flags}\"")]
    InvalidFlags { line: usize, flags: String },
    #[error("line {line}: .ALIGN requires 1, 2, 4 or 8")]
    InvalidAlignment { line: usize },
    #[error("line {line}: .BLOCK requires a constant between 0 and 65535")]
    InvalidBlockSize { line: usize },
    #[error("line {line}: character {ch:?} is not ASCII")]
    NonAsciiCharacter { line: usize, ch: char },
}

/// A lowered document: the line arena and the symbol table it declares.
#[derive(Debug)]
pub struct Unit {
    pub program: Program,
    pub symbols: SymbolTable,
}

impl Document {
    pub fn parse(text: &str) -> Result<Self, DocumentError> {
        Ok(ron::from_str(text)?)
    }

    /// Build the line arena, defining every declared symbol and referencing
    /// every symbolic operand in a fresh symbol table.
    pub fn lower(&self) -> Result<Unit, DocumentError> {
        let mut symbols = SymbolTable::new();
        let mut program = Program::new();

        for (index, source) in self.lines.iter().enumerate() {
            let line_no = index + 1;
            let kind = lower_op(&source.op, line_no, &mut symbols)?;
            let mut line = Line::new(kind);
            if let Some(name) = &source.symbol {
                line.symbol = Some(symbols.define(name));
            }
            line.comment = source.comment.clone();
            program.push(line);
        }

        Ok(Unit { program, symbols })
    }
}

/// Parse and lower a RON document in one step.
pub fn load_document(text: &str) -> Result<Unit, DocumentError> {
    Document::parse(text)?.lower()
}

fn lower_op(op: &Op, line: usize, symbols: &mut SymbolTable) -> Result<LineKind, DocumentError> {
    let kind = match op {
        Op::Blank => LineKind::Blank,
        Op::Comment => LineKind::Comment,
        Op::Unary(mnemonic) => {
            if !mnemonic.is_unary() {
                return Err(DocumentError::MissingOperand {
                    line,
                    mnemonic: mnemonic.name(),
                });
            }
            LineKind::Monadic {
                mnemonic: *mnemonic,
            }
        }
        Op::NonUnary(mnemonic, value, mode) => {
            if mnemonic.is_unary() {
                return Err(DocumentError::UnexpectedOperand {
                    line,
                    mnemonic: mnemonic.name(),
                });
            }
            LineKind::Dyadic {
                mnemonic: *mnemonic,
                mode: *mode,
                argument: lower_value(value, line, symbols)?,
            }
        }
        Op::Align(value) => {
            let argument = lower_value(value, line, symbols)?;
            if !matches!(argument.count(), Some(1 | 2 | 4 | 8)) {
                return Err(DocumentError::InvalidAlignment { line });
            }
            LineKind::Align(argument)
        }
        Op::Ascii(text) => LineKind::Literal {
            kind: LiteralKind::Ascii,
            argument: Argument::String(text.as_bytes().to_vec()),
        },
        Op::Byte(value) => LineKind::Literal {
            kind: LiteralKind::Byte,
            argument: lower_value(value, line, symbols)?,
        },
        Op::Word(value) => LineKind::Literal {
            kind: LiteralKind::Word,
            argument: lower_value(value, line, symbols)?,
        },
        Op::Block(value) => {
            let argument = lower_value(value, line, symbols)?;
            if argument.count().is_none() {
                return Err(DocumentError::InvalidBlockSize { line });
            }
            LineKind::Block(argument)
        }
        Op::Equate(value) => LineKind::Equate(lower_value(value, line, symbols)?),
        Op::Section(name, flags) => LineKind::Section {
            name: name.clone(),
            flags: SectionFlags::parse(flags).ok_or_else(|| DocumentError::InvalidFlags {
                line,
                flags: flags.clone(),
            })?,
        },
        Op::Export(name) => {
            let argument = symbolic(name, symbols);
            if let Some(id) = symbols.find(name) {
                symbols.set_binding(id, Binding::Global);
            }
            LineKind::Annotate {
                kind: AnnotateKind::Export,
                argument,
            }
        }
        Op::Import(name) => {
            let argument = symbolic(name, symbols);
            if let Some(id) = symbols.find(name) {
                symbols.set_binding(id, Binding::Imported);
            }
            LineKind::Annotate {
                kind: AnnotateKind::Import,
                argument,
            }
        }
        Op::Input(name) => annotate(AnnotateKind::Input, name, symbols),
        Op::Output(name) => annotate(AnnotateKind::Output, name, symbols),
        Op::Scall(name) => annotate(AnnotateKind::Scall, name, symbols),
        Op::Org(value) => LineKind::Org {
            kind: OrgKind::Org,
            argument: lower_value(value, line, symbols)?,
        },
        Op::Burn(value) => LineKind::Org {
            kind: OrgKind::Burn,
            argument: lower_value(value, line, symbols)?,
        },
    };
    Ok(kind)
}

fn annotate(kind: AnnotateKind, name: &str, symbols: &mut SymbolTable) -> LineKind {
    LineKind::Annotate {
        kind,
        argument: symbolic(name, symbols),
    }
}

fn symbolic(name: &str, symbols: &mut SymbolTable) -> Argument {
    let id = symbols.reference(name);
    Argument::Symbolic {
        name: name.to_string(),
        symbol: symbols.symbol_ref(id),
    }
}

fn lower_value(value: &Value, line: usize, symbols: &mut SymbolTable) -> Result<Argument, DocumentError> {
    Ok(match value {
        Value::Dec(value) => Argument::Decimal(*value),
        Value::Hex(value) => Argument::Hexadecimal(*value),
        Value::Char(ch) => {
            if !ch.is_ascii() {
                return Err(DocumentError::NonAsciiCharacter { line, ch: *ch });
            }
            Argument::Character(*ch as u8)
        }
        Value::Str(text) => Argument::String(text.as_bytes().to_vec()),
        Value::Sym(name) => symbolic(name, symbols),
    })
}
