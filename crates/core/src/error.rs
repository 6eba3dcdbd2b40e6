use pepas_ir::{LineId, SectionFlags};
use pepas_isa::EncodeError;
use thiserror::Error;

/// Fatal conditions of one assembly target. The first error aborts the
/// target; no object code is produced.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AssemblyError {
    #[error("{line}: section \"{name}\" redeclared with flags \"{found}\", expected \"{expected}\"")]
    SectionFlagConflict {
        name: String,
        expected: SectionFlags,
        found: SectionFlags,
        line: LineId,
    },
    #[error("{line}: symbol \"{name}\" is defined more than once")]
    MultiplyDefinedSymbol { name: String, line: LineId },
    #[error("internal layout error: {message}")]
    LayoutInternalError {
        message: String,
        line: Option<LineId>,
    },
    #[error("{line}: unsupported argument: {reason}")]
    UnsupportedArgumentKind { reason: String, line: LineId },
    #[error("{line}: {source}")]
    InvalidInstruction {
        #[source]
        source: EncodeError,
        line: LineId,
    },
}

impl AssemblyError {
    pub(crate) fn internal(message: impl Into<String>, line: Option<LineId>) -> Self {
        AssemblyError::LayoutInternalError {
            message: message.into(),
            line,
        }
    }

    /// Line that triggered the error, when there is one.
    pub fn line(&self) -> Option<LineId> {
        match self {
            AssemblyError::SectionFlagConflict { line, .. }
            | AssemblyError::MultiplyDefinedSymbol { line, .. }
            | AssemblyError::UnsupportedArgumentKind { line, .. }
            | AssemblyError::InvalidInstruction { line, .. } => Some(*line),
            AssemblyError::LayoutInternalError { line, .. } => *line,
        }
    }
}
