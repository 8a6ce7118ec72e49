// Copyright 2026 presburger developers
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

//! Cross-component scenario and property tests for the set operations.

use crate::constraints::FlatAffineConstraints;
use crate::set::PresburgerSet;
use rand::Rng;
use rand_xoshiro::rand_core::SeedableRng;
use rand_xoshiro::Xoshiro256PlusPlus;

/// `{ x : lo <= x <= hi }` in one dimension.
fn interval(lo: i64, hi: i64) -> FlatAffineConstraints {
    let mut fac = FlatAffineConstraints::universe(1, 0);
    fac.add_inequality(&[1, -lo]);
    fac.add_inequality(&[-1, hi]);
    fac
}

fn interval_set(lo: i64, hi: i64) -> PresburgerSet {
    PresburgerSet::from_constraints(interval(lo, hi))
}

/// The even numbers: `x = 2 * floor(x / 2)`, encoded with one local.
fn evens() -> PresburgerSet {
    let mut fac = FlatAffineConstraints::with_locals(1, 0, 1);
    fac.add_inequality(&[1, -2, 0]);
    fac.add_inequality(&[-1, 2, 1]);
    fac.add_equality(&[1, -2, 0]);
    PresburgerSet::from_constraints(fac)
}

/// Checks that two sets contain exactly the same points of a 1-D grid.
fn assert_same_points_1d(a: &PresburgerSet, b: &PresburgerSet, range: std::ops::RangeInclusive<i64>) {
    for x in range {
        assert_eq!(
            a.contains_point(&[x]),
            b.contains_point(&[x]),
            "sets disagree at x = {x}"
        );
    }
}

// Seed scenario 1: interval difference splits into two disjuncts.
#[test]
fn test_interval_difference() {
    let a = interval_set(0, 10);
    let b = interval_set(3, 5);
    let diff = a.subtract(&b).unwrap();
    for x in [0, 1, 2, 6, 7, 8, 9, 10] {
        assert!(diff.contains_point(&[x]), "expected {x} in the difference");
    }
    for x in [3, 4, 5, -1, 11] {
        assert!(!diff.contains_point(&[x]), "expected {x} not in the difference");
    }
    assert!(!diff.is_integer_empty());
    assert_eq!(diff.num_facs(), 2);
}

// Seed scenario 2: the complement of the universe is empty.
#[test]
fn test_complement_of_universe() {
    let universe = PresburgerSet::universe(1, 0);
    assert!(universe.complement().unwrap().is_integer_empty());
}

// Seed scenario 3: subtracting the evens exercises the local-variable path.
#[test]
fn test_subtract_evens() {
    let a = interval_set(0, 5);
    let diff = a.subtract(&evens()).unwrap();
    for x in [1, 3, 5] {
        assert!(diff.contains_point(&[x]), "expected odd {x} in the difference");
    }
    for x in [0, 2, 4, 6, -1, -2] {
        assert!(!diff.contains_point(&[x]), "expected {x} not in the difference");
    }
    assert!(!diff.is_integer_empty());
}

// Seed scenario 4: a split interval equals its hull over the integers.
#[test]
fn test_split_interval_equality() {
    let a = interval_set(0, 4);
    let b = interval_set(0, 2).union_set(&interval_set(3, 4));
    assert!(a.is_equal(&b).unwrap());
    assert!(b.is_equal(&a).unwrap());
    assert!(a.subtract(&b).unwrap().is_integer_empty());
    assert!(b.subtract(&a).unwrap().is_integer_empty());

    let coalesced = b.coalesce();
    assert!(coalesced.num_facs() <= b.num_facs());
    assert_same_points_1d(&coalesced, &b, -2..=6);
}

// Seed scenario 5: a 2-D triangle and its complement are disjoint.
#[test]
fn test_triangle() {
    let mut fac = FlatAffineConstraints::universe(2, 0);
    fac.add_inequality(&[1, 1, 0]); // x + y >= 0
    fac.add_inequality(&[1, -1, 0]); // x - y >= 0
    fac.add_inequality(&[-1, 0, 3]); // x <= 3
    let a = PresburgerSet::from_constraints(fac);

    assert!(a.contains_point(&[2, 1]));
    assert!(!a.contains_point(&[-1, 0]));

    let complement = a.complement().unwrap();
    assert!(a.intersect(&complement).is_integer_empty());
    for x in -4..=6 {
        for y in -6..=6 {
            assert_eq!(
                complement.contains_point(&[x, y]),
                !a.contains_point(&[x, y]),
                "complement disagrees at ({x}, {y})"
            );
        }
    }
}

// Seed scenario 6: the empty set is the unit of union and absorbs
// intersection.
#[test]
fn test_empty_set_identities() {
    let empty = PresburgerSet::empty_set(1, 0);
    assert!(empty.is_integer_empty());
    assert!(!empty.contains_point(&[0]));

    let a = interval_set(-2, 7);
    assert_same_points_1d(&a.union_set(&empty), &a, -5..=10);
    assert!(a.intersect(&empty).is_integer_empty());
}

#[test]
fn test_union_commutes_and_associates() {
    let a = interval_set(0, 3);
    let b = interval_set(2, 6);
    let c = interval_set(10, 12);
    assert!(a.union_set(&b).is_equal(&b.union_set(&a)).unwrap());
    assert!(a
        .union_set(&b)
        .union_set(&c)
        .is_equal(&a.union_set(&b.union_set(&c)))
        .unwrap());
}

#[test]
fn test_intersection_distributes_over_union() {
    let a = interval_set(0, 8);
    let b = interval_set(2, 4);
    let c = interval_set(6, 11);
    let lhs = a.intersect(&b.union_set(&c));
    let rhs = a.intersect(&b).union_set(&a.intersect(&c));
    assert!(lhs.is_equal(&rhs).unwrap());
    assert_same_points_1d(&lhs, &rhs, -2..=13);
}

#[test]
fn test_double_complement() {
    let a = interval_set(0, 10).union_set(&interval_set(20, 25));
    let double = a.complement().unwrap().complement().unwrap();
    assert!(a.is_equal(&double).unwrap());
    assert_same_points_1d(&a, &double, -5..=30);
}

#[test]
fn test_de_morgan() {
    let a = interval_set(0, 3);
    let b = interval_set(2, 5);
    let lhs = a.union_set(&b).complement().unwrap();
    let rhs = a
        .complement()
        .unwrap()
        .intersect(&b.complement().unwrap());
    assert!(lhs.is_equal(&rhs).unwrap());
    assert_same_points_1d(&lhs, &rhs, -5..=10);
}

#[test]
fn test_subtraction_is_intersection_with_complement() {
    let a = interval_set(0, 10);
    let b = interval_set(4, 6);
    let lhs = a.subtract(&b).unwrap();
    let rhs = a.intersect(&b.complement().unwrap());
    assert!(lhs.is_equal(&rhs).unwrap());
    assert_same_points_1d(&lhs, &rhs, -2..=12);
}

#[test]
fn test_containment_via_subtraction() {
    let inner = interval_set(2, 4);
    let outer = interval_set(0, 10);
    assert!(inner.subtract(&outer).unwrap().is_integer_empty());
    assert!(!outer.subtract(&inner).unwrap().is_integer_empty());
}

#[test]
fn test_equality_is_symmetric() {
    let a = interval_set(0, 4);
    let b = interval_set(0, 2).union_set(&interval_set(3, 4));
    let c = interval_set(0, 5);
    assert_eq!(a.is_equal(&b).unwrap(), b.is_equal(&a).unwrap());
    assert_eq!(a.is_equal(&c).unwrap(), c.is_equal(&a).unwrap());
    assert!(!a.is_equal(&c).unwrap());
}

#[test]
fn test_complements_of_distinct_sets_differ() {
    let a = interval_set(0, 10);
    let b = interval_set(0, 5);
    let comp_a = a.complement().unwrap();
    let comp_b = b.complement().unwrap();
    // 7 witnesses the difference: outside a's complement, inside b's.
    assert!(!comp_a.contains_point(&[7]));
    assert!(comp_b.contains_point(&[7]));
    assert!(!comp_a.is_equal(&comp_b).unwrap());
}

#[test]
fn test_point_membership_composes() {
    let a = interval_set(0, 5);
    let b = interval_set(3, 9);
    let union = a.union_set(&b);
    let isect = a.intersect(&b);
    let comp = a.complement().unwrap();
    for x in -3..=12 {
        let in_a = a.contains_point(&[x]);
        let in_b = b.contains_point(&[x]);
        assert_eq!(union.contains_point(&[x]), in_a || in_b);
        assert_eq!(isect.contains_point(&[x]), in_a && in_b);
        assert_eq!(comp.contains_point(&[x]), !in_a);
    }
}

#[test]
fn test_sample_soundness() {
    let sets = [
        interval_set(3, 5),
        interval_set(-7, -7),
        interval_set(0, 10).subtract(&interval_set(0, 9)).unwrap(),
        evens(),
        interval_set(0, 10).complement().unwrap(),
    ];
    for set in &sets {
        let sample = set.find_integer_sample().expect("set is non-empty");
        assert!(
            set.contains_point(&sample),
            "sample {sample:?} not contained in its set"
        );
    }

    let empty = interval_set(5, 4);
    assert!(empty.is_integer_empty());
    assert!(empty.find_integer_sample().is_none());
}

#[test]
fn test_coalesce_preserves_points() {
    let set = interval_set(0, 10)
        .union_set(&interval_set(2, 4))
        .union_set(&interval_set(8, 15))
        .union_set(&interval_set(30, 29)); // empty disjunct
    let coalesced = set.coalesce();
    assert!(coalesced.num_facs() <= set.num_facs());
    assert_same_points_1d(&coalesced, &set, -3..=20);
    // The nested interval and the empty disjunct are dropped.
    assert_eq!(coalesced.num_facs(), 2);
}

#[test]
fn test_subtracting_a_set_from_itself_is_empty() {
    let sets = [
        interval_set(0, 10),
        interval_set(-3, 2).union_set(&interval_set(5, 9)),
        evens(),
    ];
    for set in &sets {
        assert!(set.subtract(set).unwrap().is_integer_empty());
    }
}

#[test]
fn test_subtract_with_symbols() {
    // One dim, one symbol: { (x, s) : s <= x <= s + 10 } minus
    // { (x, s) : s + 3 <= x <= s + 5 }.
    let mut a = FlatAffineConstraints::universe(1, 1);
    a.add_inequality(&[1, -1, 0]);
    a.add_inequality(&[-1, 1, 10]);
    let mut b = FlatAffineConstraints::universe(1, 1);
    b.add_inequality(&[1, -1, -3]);
    b.add_inequality(&[-1, 1, 5]);
    let diff = PresburgerSet::from_constraints(a)
        .subtract(&PresburgerSet::from_constraints(b))
        .unwrap();
    for s in -3..=3 {
        for offset in -2..=12 {
            let x = s + offset;
            let expected = (0..=2).contains(&offset) || (6..=10).contains(&offset);
            assert_eq!(
                diff.contains_point(&[x, s]),
                expected,
                "disagreement at x = {x}, s = {s}"
            );
        }
    }
}

/// Builds a random union of up to three intervals within [-20, 20].
fn random_interval_set(rng: &mut Xoshiro256PlusPlus) -> PresburgerSet {
    let mut set = PresburgerSet::empty_set(1, 0);
    for _ in 0..rng.gen_range(1..=3) {
        let lo = rng.gen_range(-20..=20);
        let len = rng.gen_range(0..=8);
        set.union_fac_in_place(interval(lo, lo + len));
    }
    set
}

#[test]
fn test_randomized_boolean_identities() {
    let mut rng = Xoshiro256PlusPlus::seed_from_u64(42);
    for _ in 0..10 {
        let a = random_interval_set(&mut rng);
        let b = random_interval_set(&mut rng);

        let diff = a.subtract(&b).unwrap();
        let comp_b = b.complement().unwrap();
        let via_complement = a.intersect(&comp_b);
        for x in -25..=35 {
            let in_a = a.contains_point(&[x]);
            let in_b = b.contains_point(&[x]);
            assert_eq!(diff.contains_point(&[x]), in_a && !in_b);
            assert_eq!(via_complement.contains_point(&[x]), in_a && !in_b);
            assert_eq!(a.union_set(&b).contains_point(&[x]), in_a || in_b);
            assert_eq!(a.intersect(&b).contains_point(&[x]), in_a && in_b);
        }
        assert!(diff.is_equal(&via_complement).unwrap());

        let coalesced = a.coalesce();
        assert!(coalesced.num_facs() <= a.num_facs());
        for x in -25..=35 {
            assert_eq!(coalesced.contains_point(&[x]), a.contains_point(&[x]));
        }
    }
}

#[test]
fn test_randomized_double_complement() {
    let mut rng = Xoshiro256PlusPlus::seed_from_u64(7);
    for _ in 0..5 {
        let a = random_interval_set(&mut rng);
        let double = a.complement().unwrap().complement().unwrap();
        assert!(a.is_equal(&double).unwrap());
        for x in -25..=35 {
            assert_eq!(a.contains_point(&[x]), double.contains_point(&[x]));
        }
    }
}
