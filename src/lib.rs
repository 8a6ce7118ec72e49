// Copyright 2026 presburger developers
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

//! presburger is a library for Presburger set arithmetic written entirely in Rust.
//!
//! A [`PresburgerSet`](`crate::set::PresburgerSet`) represents a subset of the
//! integer lattice `Z^(d+s)` (with `d` dimension and `s` symbol coordinates) as
//! a finite union of integer polyhedra. Each polyhedron is a
//! [`FlatAffineConstraints`](`crate::constraints::FlatAffineConstraints`): a
//! conjunction of affine equalities and inequalities with integer
//! coefficients, possibly with existentially quantified local variables that
//! encode floor divisions.
//!
//! Sets can be combined with the usual boolean operations: union,
//! intersection, set difference and complement. Membership, emptiness and
//! equality are decided exactly over the integers, and a redundancy-reducing
//! [`coalesce`](`crate::set::PresburgerSet::coalesce`) pass removes disjuncts
//! that are contained in others.
//!
//! The heavy lifting is done by an incremental rational
//! [`Simplex`](`crate::simplex::Simplex`) solver with snapshot/rollback
//! support, which the set-difference engine drives hard: each subtrahend
//! polyhedron is partitioned into disjoint slices along its inequalities,
//! and each slice is complemented against the minuend.
//!
//! A companion [`predicate`] module provides the uniqued
//! position/question/answer DAG used for IR pattern matching.
//!
//! # Example
//!
//! ```
//! use presburger::constraints::FlatAffineConstraints;
//! use presburger::set::PresburgerSet;
//!
//! // A = { x : 0 <= x <= 10 }
//! let mut a = FlatAffineConstraints::universe(1, 0);
//! a.add_inequality(&[1, 0]);
//! a.add_inequality(&[-1, 10]);
//!
//! // B = { x : 3 <= x <= 5 }
//! let mut b = FlatAffineConstraints::universe(1, 0);
//! b.add_inequality(&[1, -3]);
//! b.add_inequality(&[-1, 5]);
//!
//! let a = PresburgerSet::from_constraints(a);
//! let b = PresburgerSet::from_constraints(b);
//!
//! let diff = a.subtract(&b)?;
//! assert!(diff.contains_point(&[2]));
//! assert!(!diff.contains_point(&[4]));
//! # Ok::<(), presburger::core::Error>(())
//! ```
//!
//! # Coefficient range
//!
//! All constraint coefficients are `i64`. Intermediate arithmetic widens to
//! `i128`, and narrowing back is checked: inputs whose combinations exceed
//! the 64-bit range cause a panic rather than silent wraparound.
//!
//! # License
//!
//! Licensed under either of
//!
//!   * Apache License, Version 2.0,
//!     ([LICENSE-APACHE](https://github.com/presburger-rs/presburger/blob/main/LICENSE-APACHE) or
//!     <http://www.apache.org/licenses/LICENSE-2.0>)
//!   * MIT License ([LICENSE-MIT](https://github.com/presburger-rs/presburger/blob/main/LICENSE-MIT) or
//!     <http://opensource.org/licenses/MIT>)
//!
//! at your option.

#![warn(missing_docs)]
#![allow(unused_attributes)]

#[macro_use]
pub mod core;

/// Flat affine constraint systems (single integer polyhedra)
pub mod constraints;

/// Uniqued predicate DAG for IR pattern matching
pub mod predicate;

/// Sets of integer polyhedra and their boolean operations
pub mod set;

/// Incremental rational simplex solver
pub mod simplex;

#[cfg(test)]
mod tests;
