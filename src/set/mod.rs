// Copyright 2026 presburger developers
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

//! # Presburger sets
//!
//! A [`PresburgerSet`] is a finite union of integer polyhedra
//! ([`FlatAffineConstraints`]) over a shared ambient space of `num_dims`
//! dimension and `num_syms` symbol coordinates. The polyhedra of the union
//! are called *disjuncts*; their local variable counts may differ.
//!
//! Union and intersection are simple compositions over the disjuncts. Set
//! difference is the workhorse: `b \ (U_i s_i)` is computed by recursively
//! partitioning each subtrahend disjunct into disjoint slices along its
//! inequalities and complementing each slice, with an incremental
//! [`Simplex`] pruning empty slices and skipping redundant inequalities
//! along the way.

use crate::constraints::{FlatAffineConstraints, IdKind};
use crate::core::Error;
use crate::presburger_error;
use crate::simplex::Simplex;
use fixedbitset::FixedBitSet;
use std::fmt;
use tracing::{debug, trace};

#[cfg(feature = "serde1")]
use serde::{Deserialize, Serialize};

/// A subset of `Z^(dims + syms)` represented as a union of integer
/// polyhedra.
///
/// The empty union denotes the empty set. Disjunct order is preserved by
/// all operations for determinism, but carries no meaning.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde1", derive(Serialize, Deserialize))]
pub struct PresburgerSet {
    num_dims: usize,
    num_syms: usize,
    flat_affine_constraints: Vec<FlatAffineConstraints>,
}

/// Assert that the constraint system and set live in compatible spaces.
fn assert_dimensions_compatible_fac(fac: &FlatAffineConstraints, set: &PresburgerSet) {
    assert_eq!(
        fac.num_dims(),
        set.num_dims(),
        "dimension counts of the FlatAffineConstraints and PresburgerSet do not match"
    );
    assert_eq!(
        fac.num_syms(),
        set.num_syms(),
        "symbol counts of the FlatAffineConstraints and PresburgerSet do not match"
    );
}

/// Assert that the two sets live in compatible spaces.
fn assert_dimensions_compatible(set_a: &PresburgerSet, set_b: &PresburgerSet) {
    assert_eq!(
        set_a.num_dims(),
        set_b.num_dims(),
        "dimension counts of the PresburgerSets do not match"
    );
    assert_eq!(
        set_a.num_syms(),
        set_b.num_syms(),
        "symbol counts of the PresburgerSets do not match"
    );
}

impl PresburgerSet {
    /// The empty set over the given space.
    pub fn empty_set(num_dims: usize, num_syms: usize) -> Self {
        PresburgerSet {
            num_dims,
            num_syms,
            flat_affine_constraints: Vec::new(),
        }
    }

    /// The whole of `Z^(dims + syms)`: one unconstrained disjunct.
    pub fn universe(num_dims: usize, num_syms: usize) -> Self {
        let mut result = PresburgerSet::empty_set(num_dims, num_syms);
        result.union_fac_in_place(FlatAffineConstraints::universe(num_dims, num_syms));
        result
    }

    /// A set with the single given disjunct.
    pub fn from_constraints(fac: FlatAffineConstraints) -> Self {
        let mut result = PresburgerSet::empty_set(fac.num_dims(), fac.num_syms());
        result.union_fac_in_place(fac);
        result
    }

    /// Number of disjuncts.
    pub fn num_facs(&self) -> usize {
        self.flat_affine_constraints.len()
    }

    /// Number of dimension coordinates.
    pub fn num_dims(&self) -> usize {
        self.num_dims
    }

    /// Number of symbol coordinates.
    pub fn num_syms(&self) -> usize {
        self.num_syms
    }

    /// All disjuncts, in order.
    pub fn flat_affine_constraints(&self) -> &[FlatAffineConstraints] {
        &self.flat_affine_constraints
    }

    /// Disjunct `index`.
    pub fn flat_affine_constraints_at(&self, index: usize) -> &FlatAffineConstraints {
        assert!(index < self.num_facs(), "disjunct index out of bounds");
        &self.flat_affine_constraints[index]
    }

    /// Mutates this set into its union with the given polyhedron.
    pub fn union_fac_in_place(&mut self, fac: FlatAffineConstraints) {
        assert_dimensions_compatible_fac(&fac, self);
        self.flat_affine_constraints.push(fac);
    }

    /// Mutates this set into its union with `set`.
    pub fn union_set_in_place(&mut self, set: &PresburgerSet) {
        assert_dimensions_compatible(set, self);
        for fac in &set.flat_affine_constraints {
            self.union_fac_in_place(fac.clone());
        }
    }

    /// Returns the union of this set and `set`.
    pub fn union_set(&self, set: &PresburgerSet) -> PresburgerSet {
        assert_dimensions_compatible(set, self);
        let mut result = self.clone();
        result.union_set_in_place(set);
        result
    }

    /// A point is contained in the union iff some disjunct contains it.
    pub fn contains_point(&self, point: &[i64]) -> bool {
        self.flat_affine_constraints
            .iter()
            .any(|fac| fac.contains_point(point))
    }

    /// Returns the intersection of this set and `set`.
    ///
    /// `(U_i a_i) ^ (U_j b_j)` is computed as `U_ij (a_i ^ b_j)`; pairwise
    /// intersections that are empty by the GCD test are dropped.
    pub fn intersect(&self, set: &PresburgerSet) -> PresburgerSet {
        assert_dimensions_compatible(set, self);
        let mut result = PresburgerSet::empty_set(self.num_dims, self.num_syms);
        for cs_a in &self.flat_affine_constraints {
            for cs_b in &set.flat_affine_constraints {
                let mut a = cs_a.clone();
                let mut b = cs_b.clone();
                a.merge_local_ids(&mut b);
                a.append(b);
                if !a.is_empty_by_gcd_test() {
                    result.union_fac_in_place(a);
                }
            }
        }
        result
    }

    /// Returns `fac \ set`.
    ///
    /// `fac` is modified during the recursion but restored before each
    /// return, so it is taken by value.
    pub fn set_difference(
        fac: FlatAffineConstraints,
        set: &PresburgerSet,
    ) -> Result<PresburgerSet, Error> {
        assert_dimensions_compatible_fac(&fac, set);
        if fac.is_empty_by_gcd_test() {
            return Ok(PresburgerSet::empty_set(fac.num_dims(), fac.num_syms()));
        }
        trace!(
            subtrahend_disjuncts = set.num_facs(),
            "computing set difference"
        );
        let mut result = PresburgerSet::empty_set(fac.num_dims(), fac.num_syms());
        let mut simplex = Simplex::new(&fac);
        let mut fac = fac;
        subtract_recursively(&mut fac, &mut simplex, set, 0, &mut result)?;
        Ok(result)
    }

    /// Returns the complement of this set within `Z^(dims + syms)`.
    pub fn complement(&self) -> Result<PresburgerSet, Error> {
        PresburgerSet::set_difference(
            FlatAffineConstraints::universe(self.num_dims, self.num_syms),
            self,
        )
    }

    /// Returns `self \ set`.
    pub fn subtract(&self, set: &PresburgerSet) -> Result<PresburgerSet, Error> {
        assert_dimensions_compatible(set, self);
        let mut result = PresburgerSet::empty_set(self.num_dims, self.num_syms);
        // (U_i t_i) \ s is U_i (t_i \ s).
        for fac in &self.flat_affine_constraints {
            result.union_set_in_place(&PresburgerSet::set_difference(fac.clone(), set)?);
        }
        Ok(result)
    }

    /// Whether the two sets contain exactly the same integer points.
    ///
    /// `S == T` iff `S \ T` and `T \ S` are both integer-empty.
    pub fn is_equal(&self, set: &PresburgerSet) -> Result<bool, Error> {
        assert_dimensions_compatible(set, self);
        Ok(self.subtract(set)?.is_integer_empty() && set.subtract(self)?.is_integer_empty())
    }

    /// Whether no disjunct contains an integer point.
    pub fn is_integer_empty(&self) -> bool {
        self.flat_affine_constraints
            .iter()
            .all(|fac| fac.is_integer_empty())
    }

    /// Returns an integer point of the set, truncated to the ambient
    /// `dims + syms` coordinates, if one exists.
    pub fn find_integer_sample(&self) -> Option<Vec<i64>> {
        for fac in &self.flat_affine_constraints {
            if let Some(mut sample) = fac.find_integer_sample() {
                sample.truncate(self.num_dims + self.num_syms);
                return Some(sample);
            }
        }
        None
    }

    /// Returns an equivalent set with redundant disjuncts removed.
    ///
    /// A disjunct is redundant if it is empty or contained (over the
    /// rationals) in another disjunct that is not itself redundant. The
    /// rational test is conservative: it may keep disjuncts an integer
    /// containment test would drop, but never drops genuine points.
    pub fn coalesce(&self) -> PresburgerSet {
        let mut new_set = PresburgerSet::empty_set(self.num_dims, self.num_syms);
        let mut is_redundant = FixedBitSet::with_capacity(self.num_facs());

        for i in 0..self.flat_affine_constraints.len() {
            if is_redundant.contains(i) {
                continue;
            }
            let mut simplex = Simplex::new(&self.flat_affine_constraints[i]);

            // An empty polyhedron is trivially redundant.
            if simplex.is_empty() {
                is_redundant.insert(i);
                continue;
            }

            for j in 0..self.flat_affine_constraints.len() {
                if j == i || is_redundant.contains(j) {
                    continue;
                }
                if simplex.is_rational_subset_of(&self.flat_affine_constraints[j]) {
                    is_redundant.insert(i);
                    break;
                }
            }
        }

        for (i, fac) in self.flat_affine_constraints.iter().enumerate() {
            if !is_redundant.contains(i) {
                new_set.union_fac_in_place(fac.clone());
            }
        }
        debug!(
            before = self.num_facs(),
            after = new_set.num_facs(),
            "coalesced set"
        );
        new_set
    }
}

/// The complement of `a.x + c >= 0` over the integers is
/// `-a.x - c - 1 >= 0`.
fn complement_inequality(ineq: &[i64]) -> Vec<i64> {
    let mut coeffs: Vec<i64> = ineq.iter().map(|&c| -c).collect();
    *coeffs.last_mut().unwrap() -= 1;
    coeffs
}

/// Recurses into `b ^ ~ineq`, leaving `b` and `simplex` unchanged.
fn recurse_with_inequality(
    b: &mut FlatAffineConstraints,
    simplex: &mut Simplex,
    ineq: &[i64],
    s: &PresburgerSet,
    i: usize,
    result: &mut PresburgerSet,
) -> Result<(), Error> {
    let snapshot = simplex.snapshot();
    b.add_inequality(ineq);
    simplex.add_inequality(ineq);
    subtract_recursively(b, simplex, s, i + 1, result)?;
    b.remove_inequality(b.num_inequalities() - 1);
    simplex.rollback(snapshot);
    Ok(())
}

/// First recurses into the part where `ineq` is violated, then persists
/// `ineq` on `b` and `simplex`: all later parts of this level must satisfy
/// it.
fn process_inequality(
    b: &mut FlatAffineConstraints,
    simplex: &mut Simplex,
    ineq: &[i64],
    s: &PresburgerSet,
    i: usize,
    result: &mut PresburgerSet,
) -> Result<(), Error> {
    recurse_with_inequality(b, simplex, &complement_inequality(ineq), s, i, result)?;
    b.add_inequality(ineq);
    simplex.add_inequality(ineq);
    Ok(())
}

/// Accumulates `b \ (U_{k >= i} s_k)` into `result`. `simplex` must
/// describe `b`; both are callee-saved.
///
/// With `s_i = ^_j q_j`, the complement is partitioned by the first
/// violated inequality,
///
/// ```text
/// ~s_i = (~q_1) U (q_1 ^ ~q_2) U (q_1 ^ q_2 ^ ~q_3) U ...
/// ```
///
/// and every slice `b ^ q_1 ^ .. ^ q_{j-1} ^ ~q_j` recurses into level
/// `i + 1`. Equalities are handled as two opposed inequalities. Division
/// inequalities of `s_i`'s locals are instead added to `b` itself so every
/// slice keeps the floor-division meaning of those locals, and their
/// complement slices (which are necessarily empty) are skipped. Inequalities
/// the simplex proves redundant in `b ^ s_i` are skipped as well; the
/// result stays correct either way, with fewer disjuncts.
fn subtract_recursively(
    b: &mut FlatAffineConstraints,
    simplex: &mut Simplex,
    s: &PresburgerSet,
    i: usize,
    result: &mut PresburgerSet,
) -> Result<(), Error> {
    if i == s.num_facs() {
        result.union_fac_in_place(b.clone());
        return Ok(());
    }
    let mut s_i = s.flat_affine_constraints_at(i).clone();
    let b_init_num_locals = b.num_locals();
    let b_init_num_ineqs = b.num_inequalities();
    let b_init_num_eqs = b.num_equalities();

    // Which of s_i's inequalities are division inequalities of its locals.
    // Inequality indices survive merge_local_ids, which only edits columns.
    let reprs = s_i.local_reprs();

    // Re-home the locals of b and s_i into a shared column layout.
    b.merge_local_ids(&mut s_i);

    let mut is_div_inequality = FixedBitSet::with_capacity(s_i.num_inequalities());
    for (local, maybe_pair) in reprs.iter().enumerate() {
        let Some((lower, upper)) = *maybe_pair else {
            return Err(presburger_error!(
                SubtractionUnsupported,
                format!("no division representation found for subtrahend local {local}")
            ));
        };
        debug_assert_ne!(lower, upper, "lower and upper bounds must differ");
        b.add_inequality(s_i.inequality(lower));
        b.add_inequality(s_i.inequality(upper));
        is_div_inequality.insert(lower);
        is_div_inequality.insert(upper);
    }

    let initial_snapshot = simplex.snapshot();
    let offset = simplex.num_constraints();
    let num_locals_added = b.num_locals() - b_init_num_locals;
    simplex.append_variable(num_locals_added);

    let snapshot_before_intersect = simplex.snapshot();
    simplex.intersect_flat_affine_constraints(&s_i);

    let restore_b = |b: &mut FlatAffineConstraints| {
        b.remove_inequality_range(b_init_num_ineqs, b.num_inequalities());
        b.remove_equality_range(b_init_num_eqs, b.num_equalities());
        b.remove_id_range(IdKind::Local, b_init_num_locals, b.num_locals());
    };

    if simplex.is_empty() {
        // b ^ s_i is empty, so b \ s_i = b: move directly to i + 1.
        simplex.rollback(initial_snapshot);
        restore_b(b);
        subtract_recursively(b, simplex, s, i + 1, result)?;
        return Ok(());
    }

    simplex.detect_redundant()?;

    // The constraints were appended in this order: s_i's inequalities, then
    // one (positive, negative) inequality pair per equality.
    let total_appended = s_i.num_inequalities() + 2 * s_i.num_equalities();
    let mut is_marked_redundant = FixedBitSet::with_capacity(total_appended);
    for j in 0..total_appended {
        if simplex.is_marked_redundant(offset + j) {
            is_marked_redundant.insert(j);
        }
    }

    // Drop s_i's constraints again; the widened locals and the division
    // inequalities on b stay.
    simplex.rollback(snapshot_before_intersect);

    for j in 0..s_i.num_inequalities() {
        if is_marked_redundant.contains(j) || is_div_inequality.contains(j) {
            continue;
        }
        process_inequality(b, simplex, s_i.inequality(j), s, i, result)?;
    }

    // Divisions are always represented by inequalities, so the equality
    // pairs need no division check.
    let eq_offset = s_i.num_inequalities();
    for j in 0..s_i.num_equalities() {
        if !is_marked_redundant.contains(eq_offset + 2 * j) {
            let coeffs = s_i.equality(j).to_vec();
            process_inequality(b, simplex, &coeffs, s, i, result)?;
        }
        if !is_marked_redundant.contains(eq_offset + 2 * j + 1) {
            let negated: Vec<i64> = s_i.equality(j).iter().map(|&c| -c).collect();
            process_inequality(b, simplex, &negated, s, i, result)?;
        }
    }

    // Rollback b and simplex to their initial states.
    restore_b(b);
    simplex.rollback(initial_snapshot);
    Ok(())
}

impl fmt::Display for PresburgerSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} FlatAffineConstraints:", self.num_facs())?;
        for fac in &self.flat_affine_constraints {
            writeln!(f, "{fac}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    send_sync_test!(presburger_set, PresburgerSet);

    fn interval(lo: i64, hi: i64) -> FlatAffineConstraints {
        let mut fac = FlatAffineConstraints::universe(1, 0);
        fac.add_inequality(&[1, -lo]);
        fac.add_inequality(&[-1, hi]);
        fac
    }

    #[test]
    fn test_empty_set() {
        let empty = PresburgerSet::empty_set(1, 0);
        assert_eq!(empty.num_facs(), 0);
        assert!(empty.is_integer_empty());
        assert!(!empty.contains_point(&[0]));
        assert!(empty.find_integer_sample().is_none());
    }

    #[test]
    fn test_universe() {
        let universe = PresburgerSet::universe(2, 0);
        assert!(universe.contains_point(&[5, -17]));
        assert!(!universe.is_integer_empty());
        assert!(universe.find_integer_sample().is_some());
    }

    #[test]
    fn test_union() {
        let a = PresburgerSet::from_constraints(interval(0, 2));
        let b = PresburgerSet::from_constraints(interval(5, 7));
        let u = a.union_set(&b);
        assert_eq!(u.num_facs(), 2);
        for x in -2..10 {
            assert_eq!(
                u.contains_point(&[x]),
                (0..=2).contains(&x) || (5..=7).contains(&x)
            );
        }
    }

    #[test]
    fn test_intersect() {
        let a = PresburgerSet::from_constraints(interval(0, 5));
        let b = PresburgerSet::from_constraints(interval(3, 9));
        let isect = a.intersect(&b);
        for x in -2..12 {
            assert_eq!(isect.contains_point(&[x]), (3..=5).contains(&x));
        }
    }

    #[test]
    fn test_intersect_drops_gcd_empty_products() {
        // The pairwise product carries 2x = 1, which the GCD test refutes.
        let mut a = FlatAffineConstraints::universe(1, 0);
        a.add_equality(&[2, 0]);
        let mut b = FlatAffineConstraints::universe(1, 0);
        b.add_equality(&[2, -1]);
        let isect = PresburgerSet::from_constraints(a)
            .intersect(&PresburgerSet::from_constraints(b));
        assert_eq!(isect.num_facs(), 0);
    }

    #[test]
    fn test_subtract_interval() {
        let a = PresburgerSet::from_constraints(interval(0, 10));
        let b = PresburgerSet::from_constraints(interval(3, 5));
        let diff = a.subtract(&b).unwrap();
        for x in -2..13 {
            assert_eq!(
                diff.contains_point(&[x]),
                (0..=2).contains(&x) || (6..=10).contains(&x)
            );
        }
        assert!(!diff.is_integer_empty());
    }

    #[test]
    fn test_subtract_restores_input() {
        // Repeated subtraction from the same set gives the same result:
        // the recursion restores its working state.
        let a = PresburgerSet::from_constraints(interval(0, 10));
        let b = PresburgerSet::from_constraints(interval(2, 4))
            .union_set(&PresburgerSet::from_constraints(interval(6, 8)));
        let first = a.subtract(&b).unwrap();
        let second = a.subtract(&b).unwrap();
        assert!(first.is_equal(&second).unwrap());
        for x in -1..12 {
            assert_eq!(first.contains_point(&[x]), second.contains_point(&[x]));
        }
    }

    #[test]
    fn test_complement_of_universe_is_empty() {
        let universe = PresburgerSet::universe(1, 0);
        assert!(universe.complement().unwrap().is_integer_empty());
    }

    #[test]
    fn test_subtraction_unsupported_local() {
        // A subtrahend local bounded on one side only has no division
        // representation, which subtraction must reject.
        let a = PresburgerSet::from_constraints(interval(0, 5));
        let mut bad = FlatAffineConstraints::with_locals(1, 0, 1);
        bad.add_inequality(&[1, -2, 0]);
        let b = PresburgerSet::from_constraints(bad);
        assert!(a.subtract(&b).is_err());
    }

    #[test]
    fn test_coalesce_removes_contained_disjunct() {
        let a = PresburgerSet::from_constraints(interval(0, 10));
        let mut both = a.clone();
        both.union_fac_in_place(interval(2, 4));
        let coalesced = both.coalesce();
        assert_eq!(coalesced.num_facs(), 1);
        for x in -2..13 {
            assert_eq!(coalesced.contains_point(&[x]), both.contains_point(&[x]));
        }
    }

    #[test]
    fn test_coalesce_drops_empty_disjunct() {
        let mut set = PresburgerSet::from_constraints(interval(0, 3));
        set.union_fac_in_place(interval(5, 4)); // empty interval
        let coalesced = set.coalesce();
        assert_eq!(coalesced.num_facs(), 1);
    }

    #[test]
    fn test_display_format() {
        let set = PresburgerSet::from_constraints(interval(0, 1));
        let text = format!("{set}");
        assert!(text.starts_with("1 FlatAffineConstraints:\n"));
        assert!(text.contains("Constraints (1 dims, 0 syms, 0 locals)"));
    }

    #[test]
    #[should_panic(expected = "dimension counts")]
    fn test_dimension_mismatch_panics() {
        let a = PresburgerSet::universe(1, 0);
        let b = PresburgerSet::universe(2, 0);
        a.union_set(&b);
    }
}
