// Copyright 2026 presburger developers
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

//! # Integer sample search
//!
//! Exact search for an integer point of a constraint system. Equalities are
//! first eliminated over the integers (unit-coefficient substitution, with a
//! symmetric-modulus reduction to manufacture a unit coefficient when none
//! exists). The residual inequality system is GCD-tightened and then solved:
//! bounded systems by the simplex branch-and-bound sampler, unbounded ones
//! by integer Fourier-Motzkin elimination. An eliminated variable whose
//! bound coefficients are not all 1 uses the dark shadow, with splinter
//! subproblems restoring exactness when the dark shadow comes up empty.

use super::FlatAffineConstraints;
use crate::core::narrow;
use crate::simplex::Simplex;
use num_integer::Integer;
use tracing::{debug, trace};

/// One scratch constraint: coefficients then constant.
#[derive(Clone, Debug)]
struct Row {
    coeffs: Vec<i64>,
    is_equality: bool,
}

/// Outcome of normalizing a single row.
enum Normalized {
    Ok,
    /// The row holds for every point and can be dropped.
    Trivial,
    /// The row holds for no integer point.
    Contradiction,
}

/// Entry point used by [`FlatAffineConstraints::find_integer_sample`].
pub(super) fn find_integer_sample(fac: &FlatAffineConstraints) -> Option<Vec<i64>> {
    let num_vars = fac.num_ids();
    let mut rows = Vec::with_capacity(fac.num_constraints());
    for i in 0..fac.num_equalities() {
        rows.push(Row {
            coeffs: fac.equality(i).to_vec(),
            is_equality: true,
        });
    }
    for i in 0..fac.num_inequalities() {
        rows.push(Row {
            coeffs: fac.inequality(i).to_vec(),
            is_equality: false,
        });
    }
    solve(rows, num_vars)
}

/// Solves a mixed system; the returned assignment has exactly `num_vars`
/// entries (auxiliary variables introduced along the way are dropped).
fn solve(rows: Vec<Row>, num_vars: usize) -> Option<Vec<i64>> {
    let (ineqs, substitutions, total_vars) = eliminate_equalities(rows, num_vars)?;
    let mut assignment = solve_inequalities(ineqs, total_vars)?;
    // Resolve substituted variables in reverse elimination order; each
    // recorded row has a +-1 coefficient on its variable.
    for (var, row) in substitutions.iter().rev() {
        let sign = row[*var];
        debug_assert!(sign == 1 || sign == -1);
        let mut acc = *row.last().unwrap() as i128;
        for (i, &coeff) in row[..row.len() - 1].iter().enumerate() {
            if i != *var {
                acc += coeff as i128 * assignment[i] as i128;
            }
        }
        assignment[*var] = narrow(-(sign as i128) * acc);
    }
    assignment.truncate(num_vars);
    Some(assignment)
}

/// `v` reduced modulo `m` into the symmetric residue range.
fn symmetric_mod(v: i64, m: i64) -> i64 {
    debug_assert!(m > 1);
    let q = Integer::div_floor(&(2 * v as i128 + m as i128), &(2 * m as i128));
    narrow(v as i128 - m as i128 * q)
}

fn normalize_equality(coeffs: &mut [i64]) -> Normalized {
    let n = coeffs.len() - 1;
    let gcd = coeffs[..n].iter().fold(0i64, |acc, &c| acc.gcd(&c));
    let constant = coeffs[n];
    if gcd == 0 {
        return if constant == 0 {
            Normalized::Trivial
        } else {
            Normalized::Contradiction
        };
    }
    if constant % gcd != 0 {
        return Normalized::Contradiction;
    }
    if gcd > 1 {
        for value in coeffs.iter_mut() {
            *value /= gcd;
        }
    }
    Normalized::Ok
}

/// Integer tightening: `a.x + c >= 0` with `g = gcd(a)` is equivalent to
/// `(a/g).x + floor(c/g) >= 0` over the integers.
fn tighten_inequality(coeffs: &mut [i64]) -> Normalized {
    let n = coeffs.len() - 1;
    let gcd = coeffs[..n].iter().fold(0i64, |acc, &c| acc.gcd(&c));
    if gcd == 0 {
        return if coeffs[n] >= 0 {
            Normalized::Trivial
        } else {
            Normalized::Contradiction
        };
    }
    if gcd > 1 {
        for value in coeffs[..n].iter_mut() {
            *value /= gcd;
        }
        coeffs[n] = Integer::div_floor(&coeffs[n], &gcd);
    }
    Normalized::Ok
}

type Substitution = (usize, Vec<i64>);

/// Eliminates every equality over the integers, recording one substitution
/// per eliminated variable. May grow the variable count: when no equality
/// carries a unit coefficient, the smallest coefficient `a_k` is reduced
/// modulo `m = |a_k| + 1` with a fresh variable, which yields a derived
/// equality whose coefficient on `x_k` is -sign(a_k); the next round
/// substitutes through it and the original coefficients shrink.
fn eliminate_equalities(
    mut rows: Vec<Row>,
    mut num_vars: usize,
) -> Option<(Vec<Vec<i64>>, Vec<Substitution>, usize)> {
    let mut substitutions: Vec<Substitution> = Vec::new();
    loop {
        let mut unit_eq = None;
        let mut other_eq = None;
        let mut i = 0;
        while i < rows.len() {
            if !rows[i].is_equality {
                i += 1;
                continue;
            }
            match normalize_equality(&mut rows[i].coeffs) {
                Normalized::Contradiction => return None,
                Normalized::Trivial => {
                    rows.swap_remove(i);
                    continue;
                }
                Normalized::Ok => {}
            }
            if rows[i].coeffs[..num_vars].iter().any(|c| c.abs() == 1) {
                unit_eq.get_or_insert(i);
            } else {
                other_eq.get_or_insert(i);
            }
            i += 1;
        }
        match (unit_eq, other_eq) {
            (Some(index), _) => {
                let eq = rows.remove(index).coeffs;
                let var = eq[..num_vars]
                    .iter()
                    .position(|c| c.abs() == 1)
                    .unwrap();
                let sign = eq[var] as i128;
                for row in &mut rows {
                    let factor = row.coeffs[var] as i128 * sign;
                    if factor == 0 {
                        continue;
                    }
                    for (value, &e) in row.coeffs.iter_mut().zip(&eq) {
                        *value = narrow(*value as i128 - factor * e as i128);
                    }
                }
                substitutions.push((var, eq));
            }
            (None, Some(index)) => {
                let var = (0..num_vars)
                    .filter(|&j| rows[index].coeffs[j] != 0)
                    .min_by_key(|&j| rows[index].coeffs[j].abs())
                    .unwrap();
                let modulus = rows[index].coeffs[var].abs() + 1;
                trace!(modulus, "reducing equality without unit coefficient");
                for row in &mut rows {
                    row.coeffs.insert(num_vars, 0);
                }
                for (_, sub) in &mut substitutions {
                    sub.insert(num_vars, 0);
                }
                let source = &rows[index].coeffs;
                let mut derived: Vec<i64> = (0..num_vars)
                    .map(|j| symmetric_mod(source[j], modulus))
                    .collect();
                derived.push(-modulus);
                derived.push(symmetric_mod(*source.last().unwrap(), modulus));
                num_vars += 1;
                rows.push(Row {
                    coeffs: derived,
                    is_equality: true,
                });
            }
            (None, None) => break,
        }
    }
    let ineqs = rows.into_iter().map(|row| row.coeffs).collect();
    Some((ineqs, substitutions, num_vars))
}

/// Evaluates a row at `assignment`, leaving out the `skip` variable's term.
fn eval_without(row: &[i64], skip: usize, assignment: &[i64]) -> i128 {
    let mut acc = *row.last().unwrap() as i128;
    for (i, &coeff) in row[..row.len() - 1].iter().enumerate() {
        if i != skip {
            acc += coeff as i128 * assignment[i] as i128;
        }
    }
    acc
}

/// The largest lower bound `ceil(-l(y) / a)` over the lower-bound rows.
fn lower_bound_at(lowers: &[Vec<i64>], var: usize, assignment: &[i64]) -> i64 {
    lowers
        .iter()
        .map(|row| {
            narrow(Integer::div_ceil(
                &-eval_without(row, var, assignment),
                &(row[var] as i128),
            ))
        })
        .max()
        .unwrap()
}

/// The smallest upper bound `floor(u(y) / b)` over the upper-bound rows.
fn upper_bound_at(uppers: &[Vec<i64>], var: usize, assignment: &[i64]) -> i64 {
    uppers
        .iter()
        .map(|row| {
            narrow(Integer::div_floor(
                &eval_without(row, var, assignment),
                &(-row[var] as i128),
            ))
        })
        .min()
        .unwrap()
}

/// Fourier-Motzkin combination of a lower and an upper bound row on `var`;
/// `dark` subtracts the dark-shadow slack `(a - 1)(b - 1)`.
fn combine(lower: &[i64], upper: &[i64], var: usize, dark: bool) -> Vec<i64> {
    let a = lower[var] as i128;
    let b = -upper[var] as i128;
    let mut row: Vec<i64> = lower
        .iter()
        .zip(upper)
        .map(|(&l, &u)| narrow(b * l as i128 + a * u as i128))
        .collect();
    debug_assert_eq!(row[var], 0);
    if dark {
        let last = row.len() - 1;
        row[last] = narrow(row[last] as i128 - (a - 1) * (b - 1));
    }
    row
}

/// Solves an inequality-only system.
fn solve_inequalities(mut rows: Vec<Vec<i64>>, num_vars: usize) -> Option<Vec<i64>> {
    let mut i = 0;
    while i < rows.len() {
        match tighten_inequality(&mut rows[i]) {
            Normalized::Contradiction => return None,
            Normalized::Trivial => {
                rows.swap_remove(i);
            }
            Normalized::Ok => i += 1,
        }
    }
    if rows.is_empty() {
        return Some(vec![0; num_vars]);
    }

    let occurring: Vec<usize> = (0..num_vars)
        .filter(|&v| rows.iter().any(|row| row[v] != 0))
        .collect();
    debug_assert!(!occurring.is_empty());

    // Rational relaxation; also classifies each direction as bounded or not.
    let mut compact = FlatAffineConstraints::universe(occurring.len(), 0);
    for row in &rows {
        let mut r: Vec<i64> = occurring.iter().map(|&v| row[v]).collect();
        r.push(*row.last().unwrap());
        compact.add_inequality(&r);
    }
    let mut simplex = Simplex::new(&compact);
    if simplex.is_empty() {
        return None;
    }
    let mut unbounded_var = None;
    for (ci, &v) in occurring.iter().enumerate() {
        let mut objective = vec![0; occurring.len() + 1];
        objective[ci] = 1;
        match simplex.compute_integer_bounds(&objective) {
            (Some(lo), Some(hi)) => {
                if lo > hi {
                    return None;
                }
            }
            _ => {
                unbounded_var = Some(v);
                break;
            }
        }
    }

    let Some(var) = unbounded_var else {
        // Fully bounded: the simplex sampler decides.
        let sample = simplex.find_integer_sample()?;
        let mut assignment = vec![0; num_vars];
        for (ci, &v) in occurring.iter().enumerate() {
            assignment[v] = sample[ci];
        }
        return Some(assignment);
    };

    debug!(var, "eliminating unbounded direction");
    let mut lowers = Vec::new();
    let mut uppers = Vec::new();
    let mut rest = Vec::new();
    for row in &rows {
        match row[var].cmp(&0) {
            std::cmp::Ordering::Greater => lowers.push(row.clone()),
            std::cmp::Ordering::Less => uppers.push(row.clone()),
            std::cmp::Ordering::Equal => rest.push(row.clone()),
        }
    }

    if lowers.is_empty() || uppers.is_empty() {
        // One-sided: any value past the surviving bounds works.
        let mut assignment = solve_inequalities(rest, num_vars)?;
        assignment[var] = if uppers.is_empty() {
            if lowers.is_empty() {
                0
            } else {
                lower_bound_at(&lowers, var, &assignment)
            }
        } else {
            upper_bound_at(&uppers, var, &assignment)
        };
        return Some(assignment);
    }

    // With a unit coefficient on one side the plain combination is exact;
    // otherwise use the dark shadow.
    let exact = lowers.iter().all(|row| row[var] == 1)
        || uppers.iter().all(|row| row[var] == -1);
    let mut combined = rest.clone();
    for lower in &lowers {
        for upper in &uppers {
            combined.push(combine(lower, upper, var, !exact));
        }
    }
    if let Some(mut assignment) = solve_inequalities(combined, num_vars) {
        let lo = lower_bound_at(&lowers, var, &assignment);
        let hi = upper_bound_at(&uppers, var, &assignment);
        debug_assert!(lo <= hi, "shadow guaranteed a non-empty interval");
        assignment[var] = lo;
        return Some(assignment);
    }
    if exact {
        return None;
    }

    // Dark shadow came up empty: any integer solution must sit close above
    // some lower bound. Branch over the splinter equalities.
    let b_max = uppers.iter().map(|row| -row[var]).max().unwrap();
    for lower in &lowers {
        let a = lower[var];
        let limit = Integer::div_floor(&(a * b_max - a - b_max), &b_max);
        for k in 0..=limit {
            trace!(a, k, "trying splinter branch");
            let mut pinned = lower.clone();
            *pinned.last_mut().unwrap() -= k;
            let mut branch: Vec<Row> = rows
                .iter()
                .map(|row| Row {
                    coeffs: row.clone(),
                    is_equality: false,
                })
                .collect();
            branch.push(Row {
                coeffs: pinned,
                is_equality: true,
            });
            if let Some(assignment) = solve(branch, num_vars) {
                return Some(assignment);
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_symmetric_mod() {
        assert_eq!(symmetric_mod(3, 4), -1);
        assert_eq!(symmetric_mod(5, 4), 1);
        assert_eq!(symmetric_mod(-3, 4), 1);
        assert_eq!(symmetric_mod(7, 8), -1);
        assert_eq!(symmetric_mod(-7, 8), 1);
        assert_eq!(symmetric_mod(0, 5), 0);
        assert_eq!(symmetric_mod(10, 5), 0);
    }

    #[test]
    fn test_tighten_inequality() {
        // 3x - 1 >= 0 tightens to x - 1 >= 0 (x >= 1/3 means x >= 1).
        let mut row = vec![3, -1];
        assert!(matches!(tighten_inequality(&mut row), Normalized::Ok));
        assert_eq!(row, vec![1, -1]);
        // 2x + 5 >= 0 tightens to x + 2 >= 0.
        let mut row = vec![2, 5];
        assert!(matches!(tighten_inequality(&mut row), Normalized::Ok));
        assert_eq!(row, vec![1, 2]);
    }

    #[test]
    fn test_constant_rows() {
        let mut row = vec![0, 0, -1];
        assert!(matches!(
            tighten_inequality(&mut row),
            Normalized::Contradiction
        ));
        let mut row = vec![0, 0, 3];
        assert!(matches!(tighten_inequality(&mut row), Normalized::Trivial));
    }

    #[test]
    fn test_dark_shadow_combination() {
        // 2x >= y and 3x <= y + 5 on x: lower [2, -1, 0], upper [-3, 1, 5].
        let lower = vec![2, -1, 0];
        let upper = vec![-3, 1, 5];
        let plain = combine(&lower, &upper, 0, false);
        assert_eq!(plain, vec![0, -1, 10]);
        let dark = combine(&lower, &upper, 0, true);
        assert_eq!(dark, vec![0, -1, 8]);
    }
}
