mod document;
mod format;
mod line;
mod program;

pub use document::{Document, DocumentError, Op, SourceLine, Unit, Value, load_document};
pub use format::format_line;
pub use line::{
    AnnotateKind, Argument, ArgumentError, Line, LineKind, LiteralKind, OrgKind, SectionFlags,
};
pub use program::{LineId, Program};

#[cfg(test)]
mod tests;
