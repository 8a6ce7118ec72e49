// Copyright 2026 presburger developers
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

//! # Incremental rational simplex
//!
//! A feasibility-oriented simplex over the rationals, used to answer
//! emptiness, redundancy, optimization and containment queries about a
//! [`FlatAffineConstraints`] while constraints are added and removed
//! incrementally.
//!
//! The tableau stores integers only: column 0 holds a positive per-row
//! denominator, column 1 the constant term, and every further column belongs
//! to one *unknown* (a variable of the constraint system or an added
//! constraint). Every unknown is either in row orientation (basic) or column
//! orientation (non-basic, sample value zero). Constraint unknowns are
//! *restricted* to non-negative sample values; an inequality is satisfied by
//! the current rational sample iff its unknown's sample value is
//! non-negative.
//!
//! All mutations are recorded in an append-only undo journal. A snapshot is
//! an index into that journal, and [`Simplex::rollback`] replays inverse
//! operations in LIFO order, which is exactly the discipline the recursive
//! set-difference engine needs.

use crate::constraints::FlatAffineConstraints;
use crate::core::{narrow, Error, Fraction, Matrix};
use crate::presburger_error;
use num_integer::Integer;
use num_traits::Zero;

/// Direction of rational optimization along an affine objective.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    /// Maximize the objective.
    Up,
    /// Minimize the objective.
    Down,
}

impl Direction {
    fn flipped(self) -> Direction {
        match self {
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
        }
    }
}

fn sign_matches_direction(elem: i64, direction: Direction) -> bool {
    match direction {
        Direction::Up => elem > 0,
        Direction::Down => elem < 0,
    }
}

fn sign_matches_direction_wide(elem: i128, direction: Direction) -> bool {
    match direction {
        Direction::Up => elem > 0,
        Direction::Down => elem < 0,
    }
}

/// Identifies an unknown of the tableau.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum UnknownRef {
    /// A variable of the constraint system.
    Variable(usize),
    /// An added constraint.
    Constraint(usize),
}

impl UnknownRef {
    /// Total order used to break pivot ties; guarantees termination of the
    /// feasibility-restoring pivot loop (Bland's rule).
    fn ordering_key(self) -> i64 {
        match self {
            UnknownRef::Variable(i) => i as i64,
            UnknownRef::Constraint(i) => -1 - (i as i64),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Orientation {
    Row,
    Column,
}

#[derive(Clone, Copy, Debug)]
struct Unknown {
    orientation: Orientation,
    /// Row index or column index, depending on orientation.
    pos: usize,
    /// Restricted unknowns must keep non-negative sample values.
    restricted: bool,
}

/// One entry of the undo journal; each is the inverse of a mutation.
#[derive(Clone, Copy, Debug)]
enum UndoOp {
    RemoveLastConstraint,
    RemoveLastVariable,
    UnmarkEmpty,
    UnmarkLastRedundant,
}

/// An opaque marker into the constraint history of a [`Simplex`].
///
/// Snapshots must be rolled back in LIFO order: rolling back to a snapshot
/// invalidates every younger snapshot.
pub type Snapshot = usize;

/// Incremental rational LP over the column layout of a constraint system.
///
/// The simplex is a short-lived companion to one
/// [`FlatAffineConstraints`]: it is constructed from the polyhedron, driven
/// through a series of constraint additions and rollbacks, and discarded.
pub struct Simplex {
    /// Integer tableau; column 0 is the row denominator, column 1 the
    /// constant term.
    tableau: Matrix,
    /// Number of rows at the top of the tableau that hold constraints
    /// marked redundant. These rows are frozen: they are never chosen as
    /// pivot rows.
    num_redundant: usize,
    /// Set once rational infeasibility is detected.
    empty: bool,
    undo_log: Vec<UndoOp>,
    /// Unknown owning each row.
    row_unknown: Vec<UnknownRef>,
    /// Unknown owning each column; columns 0 and 1 have none.
    col_unknown: Vec<Option<UnknownRef>>,
    cons: Vec<Unknown>,
    vars: Vec<Unknown>,
}

impl Simplex {
    /// Creates a simplex describing the given polyhedron.
    pub fn new(fac: &FlatAffineConstraints) -> Self {
        let mut simplex = Simplex::with_variables(fac.num_ids());
        simplex.intersect_flat_affine_constraints(fac);
        simplex
    }

    /// Creates an unconstrained simplex over `num_variables` variables.
    fn with_variables(num_variables: usize) -> Self {
        let mut col_unknown = vec![None, None];
        let mut vars = Vec::with_capacity(num_variables);
        for i in 0..num_variables {
            col_unknown.push(Some(UnknownRef::Variable(i)));
            vars.push(Unknown {
                orientation: Orientation::Column,
                pos: 2 + i,
                restricted: false,
            });
        }
        Simplex {
            tableau: Matrix::new(0, 2 + num_variables),
            num_redundant: 0,
            empty: false,
            undo_log: Vec::new(),
            row_unknown: Vec::new(),
            col_unknown,
            cons: Vec::new(),
            vars,
        }
    }

    /// Number of constraints ever added and still live. Constraint indices
    /// are stable within a snapshot frame; new constraints are appended.
    pub fn num_constraints(&self) -> usize {
        self.cons.len()
    }

    /// Number of variables of the tableau.
    pub fn num_variables(&self) -> usize {
        self.vars.len()
    }

    /// Whether the polyhedron is rationally infeasible.
    pub fn is_empty(&self) -> bool {
        self.empty
    }

    fn num_rows(&self) -> usize {
        self.tableau.num_rows()
    }

    fn num_cols(&self) -> usize {
        self.tableau.num_columns()
    }

    fn unknown(&self, r: UnknownRef) -> &Unknown {
        match r {
            UnknownRef::Variable(i) => &self.vars[i],
            UnknownRef::Constraint(i) => &self.cons[i],
        }
    }

    fn unknown_mut(&mut self, r: UnknownRef) -> &mut Unknown {
        match r {
            UnknownRef::Variable(i) => &mut self.vars[i],
            UnknownRef::Constraint(i) => &mut self.cons[i],
        }
    }

    /// Divides the row through by the GCD of all its entries, keeping the
    /// denominator positive.
    fn normalize_row(&mut self, row: usize) {
        let mut gcd: i64 = 0;
        for &value in self.tableau.row(row) {
            gcd = gcd.gcd(&value);
        }
        if gcd <= 1 {
            return;
        }
        for value in self.tableau.row_mut(row) {
            *value /= gcd;
        }
    }

    /// Adds a new row for the affine expression `coeffs` (length
    /// `num_variables + 1`, constant last) and returns the new constraint's
    /// index. The new unknown starts unrestricted.
    fn add_row(&mut self, coeffs: &[i64]) -> usize {
        assert_eq!(
            coeffs.len(),
            self.vars.len() + 1,
            "coefficient row has the wrong length"
        );
        let new_row = self.num_rows();
        self.tableau.resize_vertically(new_row + 1);
        self.row_unknown.push(UnknownRef::Constraint(self.cons.len()));
        self.cons.push(Unknown {
            orientation: Orientation::Row,
            pos: new_row,
            restricted: false,
        });
        self.tableau[(new_row, 0)] = 1;
        self.tableau[(new_row, 1)] = *coeffs.last().unwrap();
        for (i, &coeff) in coeffs[..self.vars.len()].iter().enumerate() {
            if coeff == 0 {
                continue;
            }
            match self.vars[i].orientation {
                Orientation::Column => {
                    let col = self.vars[i].pos;
                    self.tableau[(new_row, col)] = narrow(
                        self.tableau[(new_row, col)] as i128 + coeff as i128,
                    );
                }
                Orientation::Row => {
                    // The variable is basic: fold `coeff` times its defining
                    // row into the new row, matching denominators first.
                    let src = self.vars[i].pos;
                    let new_denom = self.tableau[(new_row, 0)];
                    let src_denom = self.tableau[(src, 0)];
                    let lcm = (new_denom as i128).lcm(&(src_denom as i128));
                    let new_scale = lcm / new_denom as i128;
                    let src_scale = coeff as i128 * (lcm / src_denom as i128);
                    self.tableau[(new_row, 0)] = narrow(lcm);
                    for col in 1..self.num_cols() {
                        self.tableau[(new_row, col)] = narrow(
                            new_scale * self.tableau[(new_row, col)] as i128
                                + src_scale * self.tableau[(src, col)] as i128,
                        );
                    }
                }
            }
        }
        self.normalize_row(new_row);
        self.undo_log.push(UndoOp::RemoveLastConstraint);
        self.cons.len() - 1
    }

    fn swap_tableau_rows(&mut self, row_a: usize, row_b: usize) {
        if row_a == row_b {
            return;
        }
        self.tableau.swap_rows(row_a, row_b);
        self.row_unknown.swap(row_a, row_b);
        let ua = self.row_unknown[row_a];
        let ub = self.row_unknown[row_b];
        self.unknown_mut(ua).pos = row_a;
        self.unknown_mut(ub).pos = row_b;
    }

    /// Exchanges the basic unknown of `pivot_row` with the non-basic unknown
    /// of `pivot_col` and updates the whole tableau accordingly.
    fn pivot(&mut self, pivot_row: usize, pivot_col: usize) {
        assert!(pivot_col >= 2, "refusing to pivot a non-unknown column");
        let pivot_elem = self.tableau[(pivot_row, pivot_col)];
        assert_ne!(pivot_elem, 0, "pivot element is zero");

        // Bookkeeping: the row and column unknowns trade places.
        let row_ref = self.row_unknown[pivot_row];
        let col_ref = self.col_unknown[pivot_col].expect("pivot column has no unknown");
        self.row_unknown[pivot_row] = col_ref;
        self.col_unknown[pivot_col] = Some(row_ref);
        *self.unknown_mut(col_ref) = Unknown {
            orientation: Orientation::Row,
            pos: pivot_row,
            restricted: self.unknown(col_ref).restricted,
        };
        *self.unknown_mut(row_ref) = Unknown {
            orientation: Orientation::Column,
            pos: pivot_col,
            restricted: self.unknown(row_ref).restricted,
        };

        // With the old pivot row reading
        //   x_r = (c + sum_j a_j y_j) / d,          a_p = pivot element,
        // the exchanged unknown satisfies
        //   y_p = (s*d*x_r - s*c - sum_{j != p} s*a_j y_j) / |a_p|,
        // with s the sign of a_p.
        let old_row: Vec<i64> = self.tableau.row(pivot_row).to_vec();
        let d = old_row[0] as i128;
        let s: i128 = if pivot_elem < 0 { -1 } else { 1 };
        let abs_pivot = (pivot_elem as i128).abs();

        for col in 1..self.num_cols() {
            let value = if col == pivot_col {
                d * s
            } else {
                -s * old_row[col] as i128
            };
            self.tableau[(pivot_row, col)] = narrow(value);
        }
        self.tableau[(pivot_row, 0)] = narrow(abs_pivot);
        self.normalize_row(pivot_row);

        for row in 0..self.num_rows() {
            if row == pivot_row {
                continue;
            }
            let b = self.tableau[(row, pivot_col)] as i128;
            if b == 0 {
                continue;
            }
            // Substitute the pivot expression into this row.
            let row_denom = self.tableau[(row, 0)] as i128;
            for col in 1..self.num_cols() {
                let value = if col == pivot_col {
                    b * d * s
                } else {
                    self.tableau[(row, col)] as i128 * abs_pivot
                        - b * s * old_row[col] as i128
                };
                self.tableau[(row, col)] = narrow(value);
            }
            self.tableau[(row, 0)] = narrow(row_denom * abs_pivot);
            self.normalize_row(row);
        }
    }

    /// Searches for a pivot column for `row` in the given direction, and a
    /// pivot row that keeps every other restricted row feasible. Returns
    /// `None` if the row's sample value cannot change in that direction;
    /// returns a pivot with `row` itself when the change is unbounded.
    fn find_pivot(&self, row: usize, direction: Direction) -> Option<(usize, usize)> {
        let mut col = None;
        for j in 2..self.num_cols() {
            let elem = self.tableau[(row, j)];
            if elem == 0 {
                continue;
            }
            let unknown = self.col_unknown[j].expect("unknown column");
            if self.unknown(unknown).restricted && !sign_matches_direction(elem, direction) {
                continue;
            }
            col = Some(j);
            break;
        }
        let col = col?;
        let new_direction = if self.tableau[(row, col)] < 0 {
            direction.flipped()
        } else {
            direction
        };
        let pivot_row = self
            .find_pivot_row(Some(row), new_direction, col)
            .unwrap_or(row);
        Some((pivot_row, col))
    }

    /// Among the restricted rows limiting movement of column `col` in
    /// `direction`, returns the most constraining one (ties broken by the
    /// unknown ordering to prevent cycling).
    fn find_pivot_row(
        &self,
        skip_row: Option<usize>,
        direction: Direction,
        col: usize,
    ) -> Option<usize> {
        let mut ret: Option<(usize, i64, i64)> = None;
        for row in self.num_redundant..self.num_rows() {
            if skip_row == Some(row) {
                continue;
            }
            let elem = self.tableau[(row, col)];
            if elem == 0 {
                continue;
            }
            if !self.unknown(self.row_unknown[row]).restricted {
                continue;
            }
            if sign_matches_direction(elem, direction) {
                continue;
            }
            let const_term = self.tableau[(row, 1)];
            match ret {
                None => ret = Some((row, elem, const_term)),
                Some((best_row, best_elem, best_const)) => {
                    let diff =
                        best_const as i128 * elem as i128 - const_term as i128 * best_elem as i128;
                    let tighter = if diff == 0 {
                        self.row_unknown[row].ordering_key()
                            < self.row_unknown[best_row].ordering_key()
                    } else {
                        !sign_matches_direction_wide(diff, direction)
                    };
                    if tighter {
                        ret = Some((row, elem, const_term));
                    }
                }
            }
        }
        ret.map(|(row, _, _)| row)
    }

    /// Pivots until the unknown's sample value is non-negative. Returns
    /// `false` if the unknown's maximum is negative, i.e. the tableau has
    /// become infeasible.
    fn restore_row(&mut self, unknown_ref: UnknownRef) -> bool {
        loop {
            let u = *self.unknown(unknown_ref);
            if u.orientation == Orientation::Column {
                // Sample value of a non-basic unknown is zero.
                return true;
            }
            if self.tableau[(u.pos, 1)] >= 0 {
                return true;
            }
            match self.find_pivot(u.pos, Direction::Up) {
                None => return false,
                Some((row, col)) => self.pivot(row, col),
            }
        }
    }

    fn mark_empty(&mut self) {
        if self.empty {
            return;
        }
        self.undo_log.push(UndoOp::UnmarkEmpty);
        self.empty = true;
    }

    /// Adds the constraint `coeffs >= 0` (length `num_variables + 1`,
    /// constant last) and restores rational feasibility, marking the simplex
    /// empty if that is impossible.
    pub fn add_inequality(&mut self, coeffs: &[i64]) {
        let con_index = self.add_row(coeffs);
        self.cons[con_index].restricted = true;
        if !self.restore_row(UnknownRef::Constraint(con_index)) {
            self.mark_empty();
        }
    }

    /// Adds the constraint `coeffs == 0` as a pair of opposed inequalities.
    pub fn add_equality(&mut self, coeffs: &[i64]) {
        self.add_inequality(coeffs);
        let negated: Vec<i64> = coeffs.iter().map(|&c| -c).collect();
        self.add_inequality(&negated);
    }

    /// Adds all constraints of `fac`: inequalities first, then each equality
    /// as a (positive, negative) inequality pair. The set-difference engine
    /// relies on this ordering when reading back redundancy flags.
    pub fn intersect_flat_affine_constraints(&mut self, fac: &FlatAffineConstraints) {
        assert_eq!(
            fac.num_ids(),
            self.num_variables(),
            "constraint system has a different number of variables"
        );
        for i in 0..fac.num_inequalities() {
            self.add_inequality(fac.inequality(i));
        }
        for i in 0..fac.num_equalities() {
            self.add_equality(fac.equality(i));
        }
    }

    /// Appends `count` new unrestricted variables in column orientation.
    pub fn append_variable(&mut self, count: usize) {
        for _ in 0..count {
            let col = self.num_cols();
            self.tableau.insert_columns(col, 1);
            self.col_unknown.push(Some(UnknownRef::Variable(self.vars.len())));
            self.vars.push(Unknown {
                orientation: Orientation::Column,
                pos: col,
                restricted: false,
            });
            self.undo_log.push(UndoOp::RemoveLastVariable);
        }
    }

    /// Returns a snapshot of the current constraint history.
    pub fn snapshot(&self) -> Snapshot {
        self.undo_log.len()
    }

    /// Erases everything added after `snapshot` was taken, in LIFO order.
    pub fn rollback(&mut self, snapshot: Snapshot) {
        assert!(snapshot <= self.undo_log.len(), "snapshot is not live");
        while self.undo_log.len() > snapshot {
            let op = self.undo_log.pop().unwrap();
            self.undo(op);
        }
    }

    /// Moves the unknown into row orientation so its row (or zero column)
    /// can be deallocated. Returns `false` if the unknown's column was zero
    /// everywhere and has already been removed.
    fn pull_to_row_for_removal(&mut self, unknown_ref: UnknownRef) -> bool {
        let u = *self.unknown(unknown_ref);
        if u.orientation == Orientation::Row {
            return true;
        }
        let column = u.pos;
        // Prefer a pivot that keeps the tableau feasible; otherwise the
        // unknown is unbounded in both directions and any non-zero entry
        // will do.
        let row = self
            .find_pivot_row(None, Direction::Up, column)
            .or_else(|| self.find_pivot_row(None, Direction::Down, column))
            .or_else(|| {
                (self.num_redundant..self.num_rows())
                    .find(|&r| self.tableau[(r, column)] != 0)
            });
        if let Some(row) = row {
            self.pivot(row, column);
            return true;
        }
        // The column is zero everywhere: no row references the unknown, so
        // the column itself can be dropped.
        debug_assert!(
            (0..self.num_rows()).all(|r| self.tableau[(r, column)] == 0),
            "unknown referenced only by redundant rows"
        );
        let last = self.num_cols() - 1;
        if column != last {
            self.tableau.swap_columns(column, last);
            self.col_unknown.swap(column, last);
            let moved = self.col_unknown[column].expect("unknown column");
            self.unknown_mut(moved).pos = column;
        }
        self.tableau.remove_columns(last, 1);
        self.col_unknown.pop();
        false
    }

    fn undo(&mut self, op: UndoOp) {
        match op {
            UndoOp::RemoveLastConstraint => {
                let unknown_ref = UnknownRef::Constraint(self.cons.len() - 1);
                if self.pull_to_row_for_removal(unknown_ref) {
                    let row = self.unknown(unknown_ref).pos;
                    let last = self.num_rows() - 1;
                    self.swap_tableau_rows(row, last);
                    self.tableau.remove_rows(last, last + 1);
                    self.row_unknown.pop();
                }
                self.cons.pop();
            }
            UndoOp::RemoveLastVariable => {
                let unknown_ref = UnknownRef::Variable(self.vars.len() - 1);
                if self.pull_to_row_for_removal(unknown_ref) {
                    let row = self.unknown(unknown_ref).pos;
                    let last = self.num_rows() - 1;
                    self.swap_tableau_rows(row, last);
                    self.tableau.remove_rows(last, last + 1);
                    self.row_unknown.pop();
                }
                self.vars.pop();
            }
            UndoOp::UnmarkEmpty => self.empty = false,
            UndoOp::UnmarkLastRedundant => self.num_redundant -= 1,
        }
    }

    /// Freezes the unknown's row in the redundant region at the top of the
    /// tableau.
    fn mark_row_redundant(&mut self, unknown_ref: UnknownRef) {
        let u = *self.unknown(unknown_ref);
        assert_eq!(u.orientation, Orientation::Row);
        self.swap_tableau_rows(u.pos, self.num_redundant);
        self.num_redundant += 1;
        self.undo_log.push(UndoOp::UnmarkLastRedundant);
    }

    /// Detects constraints that are implied by the others and marks them
    /// redundant. Only the redundancy flag is affected; no constraint is
    /// removed.
    ///
    /// A constraint is redundant iff it cannot attain a negative sample
    /// value subject to the remaining constraints. A constraint whose
    /// minimum is negative is feasible at that minimum by construction, so
    /// failing to restore it afterwards is reported as a `PotentialBug`.
    pub fn detect_redundant(&mut self) -> Result<(), Error> {
        // Emptiness has no meaningful notion of redundancy.
        if self.empty {
            return Ok(());
        }
        for id in 0..self.cons.len() {
            if self.is_marked_redundant(id) {
                continue;
            }
            if self.cons[id].orientation == Orientation::Column {
                let column = self.cons[id].pos;
                match self.find_pivot_row(None, Direction::Down, column) {
                    // No restricted row limits a downward move, so the
                    // constraint can go negative: not redundant.
                    None => continue,
                    Some(row) => self.pivot(row, column),
                }
            }
            let row = self.cons[id].pos;
            let minimum = self.compute_row_optimum(Direction::Down, row);
            match minimum {
                Some(min) if min >= Fraction::zero() => {
                    self.mark_row_redundant(UnknownRef::Constraint(id));
                }
                _ => {
                    // The minimization may have left this restricted row
                    // with a negative sample value; restore it.
                    if !self.restore_row(UnknownRef::Constraint(id)) {
                        return Err(presburger_error!(
                            PotentialBug,
                            "could not restore non-redundant row"
                        ));
                    }
                }
            }
        }
        Ok(())
    }

    /// Whether constraint `index` is currently marked redundant.
    pub fn is_marked_redundant(&self, index: usize) -> bool {
        let u = &self.cons[index];
        u.orientation == Orientation::Row && u.pos < self.num_redundant
    }

    /// Optimizes the sample value of `row` in the given direction; `None`
    /// means unbounded.
    fn compute_row_optimum(&mut self, direction: Direction, row: usize) -> Option<Fraction> {
        while let Some((pivot_row, pivot_col)) = self.find_pivot(row, direction) {
            if pivot_row == row {
                return None;
            }
            self.pivot(pivot_row, pivot_col);
        }
        Some(Fraction::new(
            self.tableau[(row, 1)],
            self.tableau[(row, 0)],
        ))
    }

    /// Computes the extremum of the affine expression `coeffs` (length
    /// `num_variables + 1`, constant last) over the polyhedron. Returns
    /// `None` when the expression is unbounded in that direction.
    pub fn compute_optimum(&mut self, direction: Direction, coeffs: &[i64]) -> Option<Fraction> {
        assert!(!self.empty, "optimum of an empty polyhedron");
        let snapshot = self.snapshot();
        let con_index = self.add_row(coeffs);
        let row = self.cons[con_index].pos;
        let optimum = self.compute_row_optimum(direction, row);
        self.rollback(snapshot);
        optimum
    }

    /// The tightest integer bounds `(ceil(min), floor(max))` of the affine
    /// expression over the polyhedron; `None` on an unbounded side.
    pub fn compute_integer_bounds(&mut self, coeffs: &[i64]) -> (Option<i64>, Option<i64>) {
        let min = self
            .compute_optimum(Direction::Down, coeffs)
            .map(|f| f.ceil().to_integer());
        let max = self
            .compute_optimum(Direction::Up, coeffs)
            .map(|f| f.floor().to_integer());
        (min, max)
    }

    /// Whether the inequality `coeffs >= 0` holds everywhere on the
    /// polyhedron.
    fn is_redundant_inequality(&mut self, coeffs: &[i64]) -> bool {
        match self.compute_optimum(Direction::Down, coeffs) {
            Some(min) => min >= Fraction::zero(),
            None => false,
        }
    }

    /// Whether the equality `coeffs == 0` holds everywhere on the
    /// polyhedron.
    fn is_redundant_equality(&mut self, coeffs: &[i64]) -> bool {
        let min = self.compute_optimum(Direction::Down, coeffs);
        let max = self.compute_optimum(Direction::Up, coeffs);
        matches!((min, max), (Some(min), Some(max))
            if min == Fraction::zero() && max == Fraction::zero())
    }

    /// Whether the current polyhedron is contained in `fac` over the
    /// rationals.
    pub fn is_rational_subset_of(&mut self, fac: &FlatAffineConstraints) -> bool {
        if self.empty {
            return true;
        }
        for i in 0..fac.num_inequalities() {
            if !self.is_redundant_inequality(fac.inequality(i)) {
                return false;
            }
        }
        for i in 0..fac.num_equalities() {
            if !self.is_redundant_equality(fac.equality(i)) {
                return false;
            }
        }
        true
    }

    /// Searches for an integer point in the polyhedron by depth-first
    /// search, pinning one variable per level to each integer value in its
    /// rational range.
    ///
    /// The polyhedron must be bounded; unbounded polyhedra are handled by
    /// [`FlatAffineConstraints::find_integer_sample`], which eliminates
    /// unbounded directions before delegating here.
    ///
    /// # Panics
    ///
    /// Panics if some variable is unbounded over the polyhedron.
    pub fn find_integer_sample(&mut self) -> Option<Vec<i64>> {
        if self.empty {
            return None;
        }
        let snapshot = self.snapshot();
        let mut sample = Vec::with_capacity(self.vars.len());
        let found = self.sample_level(&mut sample);
        self.rollback(snapshot);
        found.then_some(sample)
    }

    fn sample_level(&mut self, sample: &mut Vec<i64>) -> bool {
        let num_vars = self.vars.len();
        let level = sample.len();
        if level == num_vars {
            return true;
        }
        let mut coeffs = vec![0; num_vars + 1];
        coeffs[level] = 1;
        let (lo, hi) = self.compute_integer_bounds(&coeffs);
        let (Some(lo), Some(hi)) = (lo, hi) else {
            panic!("integer sample search requires a bounded polyhedron");
        };
        for value in lo..=hi {
            let snapshot = self.snapshot();
            let mut pin = vec![0; num_vars + 1];
            pin[level] = 1;
            pin[num_vars] = -value;
            self.add_equality(&pin);
            if !self.empty {
                sample.push(value);
                if self.sample_level(sample) {
                    return true;
                }
                sample.pop();
            }
            self.rollback(snapshot);
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    send_sync_test!(simplex, Simplex);

    /// `0 <= x <= 5`, `0 <= y <= 5`.
    fn unit_box() -> FlatAffineConstraints {
        let mut fac = FlatAffineConstraints::universe(2, 0);
        fac.add_inequality(&[1, 0, 0]);
        fac.add_inequality(&[-1, 0, 5]);
        fac.add_inequality(&[0, 1, 0]);
        fac.add_inequality(&[0, -1, 5]);
        fac
    }

    #[test]
    fn test_feasible_box() {
        let simplex = Simplex::new(&unit_box());
        assert!(!simplex.is_empty());
        assert_eq!(simplex.num_constraints(), 4);
    }

    #[test]
    fn test_infeasible_interval() {
        // x >= 3 and x <= 2.
        let mut fac = FlatAffineConstraints::universe(1, 0);
        fac.add_inequality(&[1, -3]);
        fac.add_inequality(&[-1, 2]);
        let simplex = Simplex::new(&fac);
        assert!(simplex.is_empty());
    }

    #[test]
    fn test_rational_feasible_without_integers() {
        // 1 <= 2x <= 1 is rationally feasible at x = 1/2.
        let mut fac = FlatAffineConstraints::universe(1, 0);
        fac.add_inequality(&[2, -1]);
        fac.add_inequality(&[-2, 1]);
        let simplex = Simplex::new(&fac);
        assert!(!simplex.is_empty());
    }

    #[test]
    fn test_snapshot_rollback_restores_feasibility() {
        let mut simplex = Simplex::new(&unit_box());
        let snapshot = simplex.snapshot();
        simplex.add_inequality(&[1, 0, -10]); // x >= 10: empty
        assert!(simplex.is_empty());
        simplex.rollback(snapshot);
        assert!(!simplex.is_empty());
        assert_eq!(simplex.num_constraints(), 4);
        // The tableau is still usable after rollback.
        simplex.add_inequality(&[1, 0, -5]); // x >= 5: feasible at the corner
        assert!(!simplex.is_empty());
    }

    #[test]
    fn test_append_variable_and_rollback() {
        let mut simplex = Simplex::new(&unit_box());
        let snapshot = simplex.snapshot();
        simplex.append_variable(2);
        assert_eq!(simplex.num_variables(), 4);
        simplex.add_inequality(&[0, 0, 1, 0, 0]); // q >= 0
        simplex.add_inequality(&[0, 0, -1, 0, 3]); // q <= 3
        assert!(!simplex.is_empty());
        simplex.rollback(snapshot);
        assert_eq!(simplex.num_variables(), 2);
        assert!(!simplex.is_empty());
    }

    #[test]
    fn test_compute_optimum() {
        let mut simplex = Simplex::new(&unit_box());
        // max (x + y) = 10, min (x + y) = 0.
        assert_eq!(
            simplex.compute_optimum(Direction::Up, &[1, 1, 0]),
            Some(Fraction::new(10, 1))
        );
        assert_eq!(
            simplex.compute_optimum(Direction::Down, &[1, 1, 0]),
            Some(Fraction::new(0, 1))
        );
    }

    #[test]
    fn test_compute_optimum_unbounded() {
        let mut fac = FlatAffineConstraints::universe(1, 0);
        fac.add_inequality(&[1, 0]); // x >= 0
        let mut simplex = Simplex::new(&fac);
        assert_eq!(simplex.compute_optimum(Direction::Up, &[1, 0]), None);
        assert_eq!(
            simplex.compute_optimum(Direction::Down, &[1, 0]),
            Some(Fraction::new(0, 1))
        );
    }

    #[test]
    fn test_halfline_optimum_with_offset() {
        // x <= 7 only.
        let mut fac = FlatAffineConstraints::universe(1, 0);
        fac.add_inequality(&[-1, 7]);
        let mut simplex = Simplex::new(&fac);
        assert_eq!(
            simplex.compute_optimum(Direction::Up, &[1, 0]),
            Some(Fraction::new(7, 1))
        );
        assert_eq!(simplex.compute_optimum(Direction::Down, &[1, 0]), None);
    }

    #[test]
    fn test_detect_redundant() {
        let mut simplex = Simplex::new(&unit_box());
        let offset = simplex.num_constraints();
        // x <= 100 is implied by x <= 5; x <= 3 is not.
        simplex.add_inequality(&[-1, 0, 100]);
        simplex.add_inequality(&[-1, 0, 3]);
        simplex.detect_redundant().unwrap();
        assert!(simplex.is_marked_redundant(offset));
        assert!(!simplex.is_marked_redundant(offset + 1));
    }

    #[test]
    fn test_detect_redundant_duplicate() {
        let mut simplex = Simplex::new(&unit_box());
        let offset = simplex.num_constraints();
        simplex.add_inequality(&[1, 0, 0]); // duplicate of x >= 0
        simplex.detect_redundant().unwrap();
        // The scan marks the earlier of the two copies; exactly one survives.
        assert!(simplex.is_marked_redundant(0));
        assert!(!simplex.is_marked_redundant(offset));
    }

    #[test]
    fn test_redundancy_unwinds_on_rollback() {
        let mut simplex = Simplex::new(&unit_box());
        let snapshot = simplex.snapshot();
        let offset = simplex.num_constraints();
        simplex.add_inequality(&[-1, 0, 100]);
        simplex.detect_redundant().unwrap();
        assert!(simplex.is_marked_redundant(offset));
        simplex.rollback(snapshot);
        assert_eq!(simplex.num_constraints(), offset);
        // Further work proceeds normally.
        simplex.add_inequality(&[1, 0, -1]);
        assert!(!simplex.is_empty());
    }

    #[test]
    fn test_is_rational_subset_of() {
        let mut simplex = Simplex::new(&unit_box());
        // The box is contained in x >= -1 but not in x >= 1.
        let mut larger = FlatAffineConstraints::universe(2, 0);
        larger.add_inequality(&[1, 0, 1]);
        assert!(simplex.is_rational_subset_of(&larger));
        let mut shifted = FlatAffineConstraints::universe(2, 0);
        shifted.add_inequality(&[1, 0, -1]);
        assert!(!simplex.is_rational_subset_of(&shifted));
        // Everything is contained in the universe.
        assert!(simplex.is_rational_subset_of(&FlatAffineConstraints::universe(2, 0)));
    }

    #[test]
    fn test_empty_is_subset_of_everything() {
        let mut fac = FlatAffineConstraints::universe(1, 0);
        fac.add_inequality(&[1, -3]);
        fac.add_inequality(&[-1, 2]);
        let mut simplex = Simplex::new(&fac);
        let mut point = FlatAffineConstraints::universe(1, 0);
        point.add_equality(&[1, -7]);
        assert!(simplex.is_rational_subset_of(&point));
    }

    #[test]
    fn test_find_integer_sample_box() {
        let mut simplex = Simplex::new(&unit_box());
        let sample = simplex.find_integer_sample().unwrap();
        assert_eq!(sample.len(), 2);
        for &v in &sample {
            assert!((0..=5).contains(&v));
        }
        // The simplex is restored after the search.
        assert!(!simplex.is_empty());
        assert_eq!(simplex.num_constraints(), 4);
    }

    #[test]
    fn test_find_integer_sample_none_between_integers() {
        // 1 <= 3x <= 2 has rational but no integer solutions.
        let mut fac = FlatAffineConstraints::universe(1, 0);
        fac.add_inequality(&[3, -1]);
        fac.add_inequality(&[-3, 2]);
        let mut simplex = Simplex::new(&fac);
        assert!(!simplex.is_empty());
        assert!(simplex.find_integer_sample().is_none());
    }

    #[test]
    fn test_find_integer_sample_diagonal() {
        // x + y = 7 inside the box: sample must satisfy the equality.
        let mut fac = unit_box();
        fac.add_equality(&[1, 1, -7]);
        let mut simplex = Simplex::new(&fac);
        let sample = simplex.find_integer_sample().unwrap();
        assert_eq!(sample[0] + sample[1], 7);
    }

    #[test]
    fn test_integer_bounds() {
        let mut simplex = Simplex::new(&unit_box());
        assert_eq!(simplex.compute_integer_bounds(&[1, 0, 0]), (Some(0), Some(5)));
        // Bounds of 2x + 1 over [0, 5] are [1, 11].
        assert_eq!(simplex.compute_integer_bounds(&[2, 0, 1]), (Some(1), Some(11)));
    }
}
