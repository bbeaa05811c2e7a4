use thiserror::Error;

/// A value could not be represented in its declared ABI type, or a type
/// string could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EncodeError {
    #[error("expected a value of type `{expected}`, found {found}")]
    TypeMismatch { expected: String, found: &'static str },
    #[error("value does not fit in `{ty}`")]
    Overflow { ty: String },
    #[error("`{ty}` expects {expected} elements, found {found}")]
    LengthMismatch {
        ty: String,
        expected: usize,
        found: usize,
    },
    #[error("invalid type `{0}`")]
    InvalidType(String),
}

/// The bytes handed to the decoder are not a valid encoding of the
/// requested types.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("buffer too short: needed {needed} bytes at offset {at}, have {len}")]
    Truncated { at: usize, needed: usize, len: usize },
    #[error("offset {offset} points past the end of a {len} byte block")]
    OffsetOutOfRange { offset: usize, len: usize },
    #[error("declared length {declared} exceeds the {remaining} bytes remaining")]
    LengthOutOfRange { declared: usize, remaining: usize },
    #[error("word does not fit in a machine sized integer")]
    WordOverflow,
    #[error("non canonical encoding for `{ty}`")]
    InvalidValue { ty: String },
    #[error("string is not valid utf-8")]
    InvalidUtf8,
    #[error("type `{0}` cannot be decoded")]
    InvalidType(String),
}

#[derive(Debug, Error)]
pub enum MulticallError {
    #[error("`{function}` takes {expected} arguments, {found} given")]
    ArgumentCount {
        function: String,
        expected: usize,
        found: usize,
    },
    #[error("request key is already present in the batch")]
    DuplicateKey,
    #[error("aggregator returned {found} results for {expected} calls")]
    LengthMismatch { expected: usize, found: usize },
    #[error("return data of call #{index} is malformed")]
    ReturnData {
        index: usize,
        #[source]
        source: DecodeError,
    },
    #[error(transparent)]
    Encode(#[from] EncodeError),
    #[error(transparent)]
    Decode(#[from] DecodeError),
}
