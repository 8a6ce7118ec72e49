// Copyright 2026 presburger developers
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

//! # Flat affine constraints
//!
//! A [`FlatAffineConstraints`] is a single integer polyhedron: a conjunction
//! of affine equalities and inequalities over a fixed column layout
//! `[dims | syms | locals | constant]`. Dimension and symbol columns are part
//! of the ambient space shared by every polyhedron in a set; local columns
//! are existentially quantified integers private to one polyhedron, used to
//! encode floor divisions.
//!
//! A coefficient row `a_1 .. a_n c` encodes `a_1 x_1 + ... + a_n x_n + c >= 0`
//! (inequality) or `... = 0` (equality).

mod sample;

use crate::core::{narrow, Matrix};
use num_integer::Integer;
use std::fmt;

#[cfg(feature = "serde1")]
use serde::{Deserialize, Serialize};

/// The kinds of identifier columns of a constraint system, in column order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IdKind {
    /// Dimension coordinates of the ambient space.
    Dimension,
    /// Symbolic coordinates of the ambient space.
    Symbol,
    /// Existentially quantified locals private to this polyhedron.
    Local,
}

/// A conjunction of affine equalities and inequalities with integer
/// coefficients, describing one integer polyhedron.
///
/// Operations return new values or mutate `self` in place; there is no
/// hidden sharing. A system with no constraints is the universe.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde1", derive(Serialize, Deserialize))]
pub struct FlatAffineConstraints {
    num_dims: usize,
    num_syms: usize,
    num_locals: usize,
    equalities: Matrix,
    inequalities: Matrix,
}

impl FlatAffineConstraints {
    /// Creates the universe polyhedron: no constraints over
    /// `num_dims + num_syms` coordinates.
    pub fn universe(num_dims: usize, num_syms: usize) -> Self {
        FlatAffineConstraints::with_locals(num_dims, num_syms, 0)
    }

    /// Creates an unconstrained system with an explicit number of local
    /// columns.
    pub fn with_locals(num_dims: usize, num_syms: usize, num_locals: usize) -> Self {
        let num_cols = num_dims + num_syms + num_locals + 1;
        FlatAffineConstraints {
            num_dims,
            num_syms,
            num_locals,
            equalities: Matrix::new(0, num_cols),
            inequalities: Matrix::new(0, num_cols),
        }
    }

    /// Number of dimension columns.
    pub fn num_dims(&self) -> usize {
        self.num_dims
    }

    /// Number of symbol columns.
    pub fn num_syms(&self) -> usize {
        self.num_syms
    }

    /// Number of local columns.
    pub fn num_locals(&self) -> usize {
        self.num_locals
    }

    /// Total number of identifier columns (dims + syms + locals).
    pub fn num_ids(&self) -> usize {
        self.num_dims + self.num_syms + self.num_locals
    }

    /// Number of columns of a coefficient row (ids + constant).
    pub fn num_cols(&self) -> usize {
        self.num_ids() + 1
    }

    /// Number of equality constraints.
    pub fn num_equalities(&self) -> usize {
        self.equalities.num_rows()
    }

    /// Number of inequality constraints.
    pub fn num_inequalities(&self) -> usize {
        self.inequalities.num_rows()
    }

    /// Total number of constraints.
    pub fn num_constraints(&self) -> usize {
        self.num_equalities() + self.num_inequalities()
    }

    /// Borrows equality `index` as a coefficient row.
    pub fn equality(&self, index: usize) -> &[i64] {
        self.equalities.row(index)
    }

    /// Borrows inequality `index` as a coefficient row.
    pub fn inequality(&self, index: usize) -> &[i64] {
        self.inequalities.row(index)
    }

    /// First column of the given identifier kind.
    fn id_kind_offset(&self, kind: IdKind) -> usize {
        match kind {
            IdKind::Dimension => 0,
            IdKind::Symbol => self.num_dims,
            IdKind::Local => self.num_dims + self.num_syms,
        }
    }

    fn num_ids_of_kind(&self, kind: IdKind) -> usize {
        match kind {
            IdKind::Dimension => self.num_dims,
            IdKind::Symbol => self.num_syms,
            IdKind::Local => self.num_locals,
        }
    }

    /// Adds the inequality `coeffs >= 0`. The row length must match
    /// [`num_cols`](Self::num_cols).
    pub fn add_inequality(&mut self, coeffs: &[i64]) {
        assert_eq!(coeffs.len(), self.num_cols(), "coefficient row length mismatch");
        self.inequalities.add_row(coeffs);
    }

    /// Adds the equality `coeffs == 0`. The row length must match
    /// [`num_cols`](Self::num_cols).
    pub fn add_equality(&mut self, coeffs: &[i64]) {
        assert_eq!(coeffs.len(), self.num_cols(), "coefficient row length mismatch");
        self.equalities.add_row(coeffs);
    }

    /// Removes inequality `index`.
    pub fn remove_inequality(&mut self, index: usize) {
        assert!(index < self.num_inequalities(), "inequality index out of bounds");
        self.inequalities.remove_row(index);
    }

    /// Removes equality `index`.
    pub fn remove_equality(&mut self, index: usize) {
        assert!(index < self.num_equalities(), "equality index out of bounds");
        self.equalities.remove_row(index);
    }

    /// Removes the inequalities in `[start, end)`.
    pub fn remove_inequality_range(&mut self, start: usize, end: usize) {
        assert!(start <= end && end <= self.num_inequalities(), "range out of bounds");
        self.inequalities.remove_rows(start, end);
    }

    /// Removes the equalities in `[start, end)`.
    pub fn remove_equality_range(&mut self, start: usize, end: usize) {
        assert!(start <= end && end <= self.num_equalities(), "range out of bounds");
        self.equalities.remove_rows(start, end);
    }

    /// Removes the identifier columns `[start, end)` of the given kind from
    /// every constraint. The removed identifiers must not be needed to
    /// express the polyhedron; the caller is responsible for that.
    pub fn remove_id_range(&mut self, kind: IdKind, start: usize, end: usize) {
        assert!(
            start <= end && end <= self.num_ids_of_kind(kind),
            "identifier range out of bounds"
        );
        let offset = self.id_kind_offset(kind);
        self.equalities.remove_columns(offset + start, end - start);
        self.inequalities.remove_columns(offset + start, end - start);
        match kind {
            IdKind::Dimension => self.num_dims -= end - start,
            IdKind::Symbol => self.num_syms -= end - start,
            IdKind::Local => self.num_locals -= end - start,
        }
    }

    /// Inserts `count` zero local columns before local `pos`.
    fn insert_local_ids(&mut self, pos: usize, count: usize) {
        assert!(pos <= self.num_locals, "local index out of bounds");
        let col = self.num_dims + self.num_syms + pos;
        self.equalities.insert_columns(col, count);
        self.inequalities.insert_columns(col, count);
        self.num_locals += count;
    }

    /// Re-homes the local columns of `self` and `other` into a shared local
    /// index space.
    ///
    /// After the call both systems have `L1 + L2` locals: `self`'s original
    /// locals occupy the first `L1` local columns and `other`'s original
    /// locals the next `L2`. Zero columns are inserted so all existing rows
    /// keep their meaning.
    pub fn merge_local_ids(&mut self, other: &mut FlatAffineConstraints) {
        assert_eq!(self.num_dims, other.num_dims, "dimension count mismatch");
        assert_eq!(self.num_syms, other.num_syms, "symbol count mismatch");
        let locals_a = self.num_locals;
        let locals_b = other.num_locals;
        self.insert_local_ids(locals_a, locals_b);
        other.insert_local_ids(0, locals_a);
    }

    /// Concatenates `other`'s constraints onto `self`. Both systems must
    /// have identical column layouts (same dims, syms and locals).
    pub fn append(&mut self, other: FlatAffineConstraints) {
        assert_eq!(self.num_dims, other.num_dims, "dimension count mismatch");
        assert_eq!(self.num_syms, other.num_syms, "symbol count mismatch");
        assert_eq!(self.num_locals, other.num_locals, "local count mismatch");
        for i in 0..other.num_equalities() {
            self.equalities.add_row(other.equality(i));
        }
        for i in 0..other.num_inequalities() {
            self.inequalities.add_row(other.inequality(i));
        }
    }

    /// Evaluates a coefficient row at `values` (length `num_ids`).
    fn eval_row(row: &[i64], values: &[i64]) -> i128 {
        let mut acc = *row.last().unwrap() as i128;
        for (coeff, value) in row[..row.len() - 1].iter().zip(values) {
            acc += *coeff as i128 * *value as i128;
        }
        acc
    }

    /// Whether the polyhedron contains the given point. The point covers the
    /// dimension and symbol coordinates; local variables are existentially
    /// quantified, so the residual system over the locals is checked for an
    /// integer solution.
    pub fn contains_point(&self, point: &[i64]) -> bool {
        assert_eq!(
            point.len(),
            self.num_dims + self.num_syms,
            "point length must be dims + syms"
        );
        if self.num_locals == 0 {
            for i in 0..self.num_equalities() {
                if Self::eval_row(self.equality(i), point) != 0 {
                    return false;
                }
            }
            for i in 0..self.num_inequalities() {
                if Self::eval_row(self.inequality(i), point) < 0 {
                    return false;
                }
            }
            return true;
        }
        // Restrict to the point: fold the dim/sym terms into the constant,
        // leaving a system over the locals alone.
        let mut residual = FlatAffineConstraints::universe(self.num_locals, 0);
        let local_offset = self.num_dims + self.num_syms;
        let restrict = |row: &[i64]| -> Vec<i64> {
            let mut out = Vec::with_capacity(self.num_locals + 1);
            out.extend_from_slice(&row[local_offset..local_offset + self.num_locals]);
            let mut constant = *row.last().unwrap() as i128;
            for (coeff, value) in row[..local_offset].iter().zip(point) {
                constant += *coeff as i128 * *value as i128;
            }
            out.push(narrow(constant));
            out
        };
        for i in 0..self.num_equalities() {
            residual.add_equality(&restrict(self.equality(i)));
        }
        for i in 0..self.num_inequalities() {
            residual.add_inequality(&restrict(self.inequality(i)));
        }
        residual.find_integer_sample().is_some()
    }

    /// A cheap sufficient (not necessary) emptiness test: some equality has
    /// a constant term not divisible by the GCD of its other coefficients.
    pub fn is_empty_by_gcd_test(&self) -> bool {
        for i in 0..self.num_equalities() {
            let row = self.equality(i);
            let constant = *row.last().unwrap();
            let gcd = row[..row.len() - 1]
                .iter()
                .fold(0i64, |acc, &coeff| acc.gcd(&coeff));
            if gcd == 0 {
                if constant != 0 {
                    return true;
                }
            } else if constant % gcd != 0 {
                return true;
            }
        }
        false
    }

    /// Whether the polyhedron contains no integer point. Exact.
    pub fn is_integer_empty(&self) -> bool {
        self.find_integer_sample().is_none()
    }

    /// Returns an integer point satisfying all constraints, if one exists.
    /// The returned vector covers all identifier columns, locals included.
    pub fn find_integer_sample(&self) -> Option<Vec<i64>> {
        if self.is_empty_by_gcd_test() {
            return None;
        }
        sample::find_integer_sample(self)
    }

    /// For each local variable, identifies the pair of inequalities
    /// `(lower, upper)` that pin it as a floor division `q = floor(e / d)`:
    ///
    /// * lower: `d*q - e + d - 1 >= 0` (positive coefficient `d` on `q`),
    /// * upper: `e - d*q >= 0` (coefficient `-d` on `q`),
    ///
    /// i.e. two inequalities that negate each other on every non-constant
    /// column and whose constants sum to `d - 1`. Returns `None` for locals
    /// with no such pair; set difference cannot handle those.
    pub fn local_reprs(&self) -> Vec<Option<(usize, usize)>> {
        let local_offset = self.num_dims + self.num_syms;
        let num_cols = self.num_cols();
        (0..self.num_locals)
            .map(|local| {
                let col = local_offset + local;
                for lower in 0..self.num_inequalities() {
                    let lower_row = self.inequality(lower);
                    let divisor = lower_row[col];
                    if divisor < 1 {
                        continue;
                    }
                    for upper in 0..self.num_inequalities() {
                        if upper == lower {
                            continue;
                        }
                        let upper_row = self.inequality(upper);
                        if upper_row[col] != -divisor {
                            continue;
                        }
                        let opposed = (0..num_cols - 1)
                            .all(|k| upper_row[k] == -lower_row[k]);
                        if !opposed {
                            continue;
                        }
                        if lower_row[num_cols - 1] + upper_row[num_cols - 1] == divisor - 1 {
                            return Some((lower, upper));
                        }
                    }
                }
                None
            })
            .collect()
    }
}

impl fmt::Display for FlatAffineConstraints {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Constraints ({} dims, {} syms, {} locals), ({} constraints)",
            self.num_dims,
            self.num_syms,
            self.num_locals,
            self.num_constraints()
        )?;
        let write_row = |f: &mut fmt::Formatter<'_>, row: &[i64], suffix: &str| {
            for coeff in row {
                write!(f, "{coeff} ")?;
            }
            writeln!(f, "{suffix}")
        };
        for i in 0..self.num_equalities() {
            write_row(f, self.equality(i), "= 0")?;
        }
        for i in 0..self.num_inequalities() {
            write_row(f, self.inequality(i), ">= 0")?;
        }
        Ok(())
    }
}
