//! Error types for the decoder.
//!
//! Malformed input never produces an error: noise, oversized frames and
//! allocation failures are handled inside the reassembler. The only
//! decoder-level failure is a stream that ends part-way through a frame.

use std::io;

use thiserror::Error;

use crate::reassembler::ParserState;

/// End-of-stream conditions that leave a frame incomplete.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum EofError {
    /// The stream ended while a frame header was being read.
    #[error("premature EOF while reading frame header (state {state:?})")]
    MidHeader {
        /// Parser position when the stream ended.
        state: ParserState,
    },

    /// The stream ended while a payload was being copied.
    #[error("premature EOF: {bytes_received} of {expected} payload bytes received")]
    MidFrame {
        /// Payload bytes received before EOF.
        bytes_received: usize,
        /// Payload length declared by the header.
        expected: usize,
    },

    /// The stream ended while an oversized frame was being flushed.
    #[error("premature EOF with {remaining} bytes of an oversized frame unflushed")]
    MidFlush {
        /// Bytes of the oversized frame still expected.
        remaining: u16,
    },
}

/// Top-level decoder error.
#[derive(Debug, Error)]
pub enum CodecError {
    /// Transport I/O failure.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// End-of-stream handling.
    #[error("EOF: {0}")]
    Eof(#[from] EofError),
}

impl CodecError {
    /// Error category for logging.
    ///
    /// One of `"io"` or `"eof"`.
    #[must_use]
    pub fn error_type(&self) -> &'static str {
        match self {
            Self::Io(_) => "io",
            Self::Eof(_) => "eof",
        }
    }
}

impl From<CodecError> for io::Error {
    fn from(err: CodecError) -> Self {
        match err {
            CodecError::Io(e) => e,
            CodecError::Eof(e) => io::Error::new(io::ErrorKind::UnexpectedEof, e),
        }
    }
}

impl From<EofError> for io::Error {
    fn from(err: EofError) -> Self { CodecError::Eof(err).into() }
}

#[cfg(test)]
mod tests {
    use std::io;

    use rstest::rstest;

    use super::{CodecError, EofError};
    use crate::reassembler::ParserState;

    #[rstest]
    #[case::mid_header(EofError::MidHeader { state: ParserState::DataLengthLow })]
    #[case::mid_frame(EofError::MidFrame { bytes_received: 3, expected: 9 })]
    #[case::mid_flush(EofError::MidFlush { remaining: 12 })]
    fn eof_errors_become_unexpected_eof(#[case] eof: EofError) {
        let err: io::Error = eof.into();
        assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof);

        let inner = err
            .get_ref()
            .and_then(|inner| inner.downcast_ref::<EofError>())
            .copied();
        assert_eq!(inner, Some(eof));
    }

    #[test]
    fn io_errors_pass_through() {
        let err: io::Error = CodecError::Io(io::Error::other("uart reset")).into();
        assert_eq!(err.kind(), io::ErrorKind::Other);
    }

    #[test]
    fn categories_are_named() {
        assert_eq!(CodecError::from(EofError::MidFlush { remaining: 1 }).error_type(), "eof");
    }

    #[test]
    fn mid_frame_message_reports_progress() {
        let err = EofError::MidFrame {
            bytes_received: 2,
            expected: 5,
        };
        assert_eq!(
            err.to_string(),
            "premature EOF: 2 of 5 payload bytes received"
        );
    }
}
