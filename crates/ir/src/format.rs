use pepas_symbol::SymbolTable;

use super::{AnnotateKind, Line, LineKind, LiteralKind, OrgKind};

const LABEL_WIDTH: usize = 9;
const MNEMONIC_WIDTH: usize = 7;
const COMMENT_COLUMN: usize = 34;

/// Render one line the way it would appear in source, with the label,
/// mnemonic and operand columns aligned.
pub fn format_line(line: &Line, symbols: &SymbolTable) -> String {
    let label = line
        .symbol
        .and_then(|id| symbols.name(id))
        .map(|name| format!("{name}:"))
        .unwrap_or_default();

    let (mnemonic, operand) = match &line.kind {
        LineKind::Blank | LineKind::Comment => (String::new(), String::new()),
        LineKind::Monadic { mnemonic } => (mnemonic.name().to_string(), String::new()),
        LineKind::Dyadic {
            mnemonic,
            mode,
            argument,
        } => (mnemonic.name().to_string(), format!("{argument},{}", mode.name())),
        LineKind::Align(argument) => (".ALIGN".to_string(), argument.to_string()),
        LineKind::Literal { kind, argument } => {
            let directive = match kind {
                LiteralKind::Ascii => ".ASCII",
                LiteralKind::Byte => ".BYTE",
                LiteralKind::Word => ".WORD",
            };
            (directive.to_string(), argument.to_string())
        }
        LineKind::Block(argument) => (".BLOCK".to_string(), argument.to_string()),
        LineKind::Equate(argument) => (".EQUATE".to_string(), argument.to_string()),
        LineKind::Section { name, flags } => {
            (".SECTION".to_string(), format!("\"{name}\", \"{flags}\""))
        }
        LineKind::Annotate { kind, argument } => {
            let directive = match kind {
                AnnotateKind::Export => ".EXPORT",
                AnnotateKind::Import => ".IMPORT",
                AnnotateKind::Input => ".INPUT",
                AnnotateKind::Output => ".OUTPUT",
                AnnotateKind::Scall => ".SCALL",
            };
            (directive.to_string(), argument.to_string())
        }
        LineKind::Org { kind, argument } => {
            let directive = match kind {
                OrgKind::Org => ".ORG",
                OrgKind::Burn => ".BURN",
            };
            (directive.to_string(), argument.to_string())
        }
    };

    let mut out = if mnemonic.is_empty() && label.is_empty() {
        String::new()
    } else {
        format!("{label:<LABEL_WIDTH$}{mnemonic:<MNEMONIC_WIDTH$} {operand}")
    };
    if let Some(comment) = &line.comment {
        if matches!(line.kind, LineKind::Comment) || out.is_empty() {
            out = format!(";{comment}");
        } else {
            out = format!("{out:<COMMENT_COLUMN$};{comment}");
        }
    }
    out.trim_end().to_string()
}
