//! Utilities for exercising the `hciframe` reassembler in tests.
//!
//! Frame builders produce well-formed wire bytes, [`Recorder`] captures what
//! the reassembler delivers, and the feeding helpers replay a stream in
//! arbitrary chunkings.
//!
//! ```rust
//! use hciframe::{RawFormat, RawPacket, Reassembler, ReassemblerConfig};
//! use hciframe_testing::{Recorder, command_frame, feed_in_chunks};
//!
//! let recorder: Recorder<RawPacket> = Recorder::new();
//! let mut reassembler = Reassembler::new(RawFormat, ReassemblerConfig::default());
//! reassembler.initialize(recorder.callback());
//!
//! feed_in_chunks(&mut reassembler, &command_frame(0x0C03, &[]), 1);
//! assert_eq!(recorder.sizes(), vec![4]);
//! ```

pub mod feed;
pub mod frames;
pub mod logging;
pub mod recorder;
pub mod strategies;

pub use feed::{feed_at_splits, feed_in_chunks};
pub use frames::{acl_frame, command_frame, extended_command_frame, sco_frame};
pub use logging::{LoggerHandle, logger};
pub use recorder::{Delivery, Recorder};
