//! Reassembly counters.
//!
//! Every frame outcome (delivered, flushed, abandoned, or a discarded noise
//! byte) bumps one counter through the [`metrics`](https://docs.rs/metrics)
//! facade. Without the `metrics` feature the helpers compile to no-ops.

#[cfg(feature = "metrics")]
use metrics::counter;

use crate::packet::PacketType;

/// Name of the counter tracking reassembled frames.
pub const FRAMES_REASSEMBLED: &str = "hciframe_frames_total";
/// Name of the counter tracking frames flushed for exceeding the payload ceiling.
pub const FRAMES_FLUSHED: &str = "hciframe_flushed_total";
/// Name of the counter tracking frames abandoned because allocation failed.
pub const ALLOCATION_FAILURES: &str = "hciframe_alloc_failures_total";
/// Name of the counter tracking discarded leading bytes.
pub const NOISE_BYTES: &str = "hciframe_noise_bytes_total";

/// Record a reassembled frame of the given family.
#[cfg(feature = "metrics")]
pub fn inc_frames(packet_type: PacketType) {
    counter!(FRAMES_REASSEMBLED, "family" => packet_type.name()).increment(1);
}

/// Record a flushed frame.
#[cfg(feature = "metrics")]
pub fn inc_flushed() { counter!(FRAMES_FLUSHED).increment(1); }

/// Record an abandoned frame.
#[cfg(feature = "metrics")]
pub fn inc_allocation_failures() { counter!(ALLOCATION_FAILURES).increment(1); }

/// Record a discarded noise byte.
#[cfg(feature = "metrics")]
pub fn inc_noise() { counter!(NOISE_BYTES).increment(1); }

#[cfg(not(feature = "metrics"))]
pub fn inc_frames(_: PacketType) {}

#[cfg(not(feature = "metrics"))]
pub fn inc_flushed() {}

#[cfg(not(feature = "metrics"))]
pub fn inc_allocation_failures() {}

#[cfg(not(feature = "metrics"))]
pub fn inc_noise() {}
