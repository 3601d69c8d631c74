//! Shared layout constants for the composer.

/// Width of the prompt column (`›` plus a space) drawn to the left of the input.
pub(crate) const LIVE_PREFIX_COLS: u16 = 2;
