// Copyright 2026 presburger developers
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

//! # Errors

use thiserror::Error;

/// presburger error type
///
/// Dimension mismatches and out-of-range indices are programmer errors and
/// are reported by panicking, matching the preconditions documented on the
/// individual operations. The variants here cover the conditions a caller
/// can meaningfully react to.
#[derive(Debug, Error)]
pub enum PresburgerError {
    /// A subtrahend contains a local variable whose floor-division
    /// representation cannot be recovered from its inequalities. Set
    /// difference cannot complement such a polyhedron.
    #[error("Subtraction unsupported: {text:?}")]
    SubtractionUnsupported {
        /// Text
        text: String,
    },

    /// For errors which are likely bugs.
    #[error("Potential bug: {text:?}. This is potentially a bug. Please file a report on https://github.com/presburger-rs/presburger/issues")]
    PotentialBug {
        /// Text
        text: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    send_sync_test!(error, PresburgerError);
}
