use thiserror::Error;

/// Failure modes of one composition pass. Every variant is terminal for the
/// current invocation; no partial document is ever produced.
#[derive(Debug, Error)]
pub enum Error {
    /// A base64 payload, the source document, or the image bytes could not
    /// be decoded.
    #[error("could not decode payload: {0}")]
    Decode(String),

    /// The image bytes match neither the PNG nor the JPEG signature.
    #[error("unsupported image format, expected PNG or JPEG")]
    UnsupportedFormat,

    /// The document rejected a structural mutation (page append, font or
    /// image registration, content stream rewrite).
    #[error("could not embed resource: {0}")]
    Embed(String),
}

impl From<base64::DecodeError> for Error {
    fn from(err: base64::DecodeError) -> Self {
        Error::Decode(err.to_string())
    }
}

impl From<png::DecodingError> for Error {
    fn from(err: png::DecodingError) -> Self {
        Error::Decode(err.to_string())
    }
}

impl From<lopdf::Error> for Error {
    fn from(err: lopdf::Error) -> Self {
        Error::Embed(err.to_string())
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Embed(err.to_string())
    }
}
