/// Errors that can occur while building or decoding protocol values.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum WireError {
    /// The port identifier is empty or contains a delimiter.
    #[error("invalid port identifier {0:?}")]
    InvalidPort(String),

    /// The verb is empty or contains a delimiter.
    #[error("invalid verb {0:?}")]
    InvalidVerb(String),

    /// A token argument contains a character the wire format cannot carry.
    #[error("argument {index} ({value:?}) contains a delimiter ('(', ')', ',' or line break)")]
    InvalidArgument { index: usize, value: String },

    /// A reply integer does not map to any variant of the expected enum.
    #[error("unknown {name} value {value}")]
    UnknownDiscriminant { name: &'static str, value: i64 },
}

pub type Result<T> = std::result::Result<T, WireError>;
