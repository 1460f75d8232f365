/// Which hard-failure class an [`Error`] belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureClass {
    /// Truncated or malformed byte stream
    Stream,
    /// Reference pointing outside the structure it indexes
    Reference,
    /// Tag selecting a decode path that does not exist
    Unsupported,
    /// Input or table file could not be read or parsed
    Input,
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("unexpected end of data at offset {offset:#x}: need {needed} bytes")]
    Truncated { offset: u64, needed: usize },

    #[error("negative string length {len} at offset {offset:#x}")]
    NegativeLength { offset: u64, len: i32 },

    #[error("malformed stream at offset {offset:#x}: {reason}")]
    Malformed { offset: u64, reason: String },

    #[error("template index {index} out of range at offset {offset:#x}: catalog has {count} templates")]
    TemplateIndex { offset: u64, index: u32, count: usize },

    #[error("unsupported {what} tag {tag} at offset {offset:#x}")]
    Unsupported { offset: u64, what: &'static str, tag: u32 },

    #[error("{origin}:{line}: {reason}")]
    Table { origin: String, line: usize, reason: String },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    pub fn class(&self) -> FailureClass {
        match self {
            Error::Truncated { .. } | Error::NegativeLength { .. } | Error::Malformed { .. } => {
                FailureClass::Stream
            }
            Error::TemplateIndex { .. } => FailureClass::Reference,
            Error::Unsupported { .. } => FailureClass::Unsupported,
            Error::Table { .. } | Error::Io(_) => FailureClass::Input,
        }
    }

    /// Stream offset of the failure, for decode errors
    pub fn offset(&self) -> Option<u64> {
        match self {
            Error::Truncated { offset, .. }
            | Error::NegativeLength { offset, .. }
            | Error::Malformed { offset, .. }
            | Error::TemplateIndex { offset, .. }
            | Error::Unsupported { offset, .. } => Some(*offset),
            Error::Table { .. } | Error::Io(_) => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
