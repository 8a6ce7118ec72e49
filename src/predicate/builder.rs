// Copyright 2026 presburger developers
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

//! # Predicate builder
//!
//! Factory methods for constructing interned positions and predicates.

use super::{
    Answer, OperationEdge, Position, PositionRef, Predicate, PredicateUniquer, Question,
};

/// Convenience facade over a [`PredicateUniquer`] for building positions and
/// predicates.
pub struct PredicateBuilder<'a> {
    uniquer: &'a mut PredicateUniquer,
}

impl<'a> PredicateBuilder<'a> {
    /// Creates a builder interning into `uniquer`.
    pub fn new(uniquer: &'a mut PredicateUniquer) -> Self {
        PredicateBuilder { uniquer }
    }

    /// Whether `handle` names an operand-like position (a single operand or
    /// an operand group).
    fn is_operand_like(&self, handle: PositionRef) -> bool {
        matches!(
            self.uniquer.position_data(handle),
            Position::Operand { .. } | Position::OperandGroup { .. }
        )
    }

    /// Whether `handle` names a value-like position (operand, result, or a
    /// group of either).
    fn is_value_like(&self, handle: PositionRef) -> bool {
        matches!(
            self.uniquer.position_data(handle),
            Position::Operand { .. }
                | Position::OperandGroup { .. }
                | Position::Result { .. }
                | Position::ResultGroup { .. }
        )
    }

    fn assert_operation(&self, handle: PositionRef) {
        assert!(
            matches!(
                self.uniquer.position_data(handle),
                Position::Operation { .. }
            ),
            "expected an operation position"
        );
    }

    //
    // Positions
    //

    /// The root operation position.
    pub fn root(&mut self) -> PositionRef {
        self.uniquer.position(Position::Operation {
            parent: None,
            edge: OperationEdge::Root,
            depth: 0,
        })
    }

    /// The operation defining the value held by the given operand-like
    /// position.
    pub fn operand_defining_op(&mut self, pos: PositionRef) -> PositionRef {
        assert!(self.is_operand_like(pos), "expected an operand position");
        let depth = self.uniquer.operation_depth(pos) + 1;
        self.uniquer.position(Position::Operation {
            parent: Some(pos),
            edge: OperationEdge::Defining,
            depth,
        })
    }

    /// An operation using the value at the given position, optionally
    /// through a specific operand.
    pub fn users_op(&mut self, pos: PositionRef, operand: Option<u32>) -> PositionRef {
        assert!(self.is_value_like(pos), "expected a value position");
        let depth = self.uniquer.operation_depth(pos) + 1;
        self.uniquer.position(Position::Operation {
            parent: Some(pos),
            edge: OperationEdge::User { operand },
            depth,
        })
    }

    /// An attribute of the given operation.
    pub fn attribute(&mut self, pos: PositionRef, name: &str) -> PositionRef {
        self.assert_operation(pos);
        self.uniquer.position(Position::Attribute {
            parent: pos,
            name: name.to_string(),
        })
    }

    /// An operand of the given operation.
    pub fn operand(&mut self, pos: PositionRef, index: u32) -> PositionRef {
        self.assert_operation(pos);
        self.uniquer.position(Position::Operand { parent: pos, index })
    }

    /// A group of operands of the given operation.
    pub fn operand_group(
        &mut self,
        pos: PositionRef,
        group: Option<u32>,
        is_variadic: bool,
    ) -> PositionRef {
        self.assert_operation(pos);
        self.uniquer.position(Position::OperandGroup {
            parent: pos,
            group,
            is_variadic,
        })
    }

    /// The group of all operands of the given operation.
    pub fn all_operands(&mut self, pos: PositionRef) -> PositionRef {
        self.operand_group(pos, None, true)
    }

    /// A result of the given operation.
    pub fn result(&mut self, pos: PositionRef, index: u32) -> PositionRef {
        self.assert_operation(pos);
        self.uniquer.position(Position::Result { parent: pos, index })
    }

    /// A group of results of the given operation.
    pub fn result_group(
        &mut self,
        pos: PositionRef,
        group: Option<u32>,
        is_variadic: bool,
    ) -> PositionRef {
        self.assert_operation(pos);
        self.uniquer.position(Position::ResultGroup {
            parent: pos,
            group,
            is_variadic,
        })
    }

    /// The group of all results of the given operation.
    pub fn all_results(&mut self, pos: PositionRef) -> PositionRef {
        self.result_group(pos, None, true)
    }

    /// The type of the given attribute, operand or result position.
    pub fn type_of(&mut self, pos: PositionRef) -> PositionRef {
        assert!(
            self.is_value_like(pos)
                || matches!(self.uniquer.position_data(pos), Position::Attribute { .. }),
            "expected an attribute, operand, or result position"
        );
        self.uniquer.position(Position::Type { parent: pos })
    }

    //
    // Predicates
    //

    /// A predicate comparing an attribute to a known value.
    pub fn attribute_constraint(&mut self, value: &str) -> Predicate {
        (
            self.uniquer.question(Question::Attribute),
            self.uniquer.answer(Answer::Attribute {
                value: value.to_string(),
            }),
        )
    }

    /// A predicate checking that two values are equal.
    pub fn equal_to(&mut self, pos: PositionRef) -> Predicate {
        (
            self.uniquer.question(Question::EqualTo { other: pos }),
            self.uniquer.answer(Answer::True),
        )
    }

    /// A predicate checking that two values are not equal.
    pub fn not_equal_to(&mut self, pos: PositionRef) -> Predicate {
        (
            self.uniquer.question(Question::EqualTo { other: pos }),
            self.uniquer.answer(Answer::False),
        )
    }

    /// A predicate applying a named, parameterized constraint to several
    /// positions.
    pub fn constraint(&mut self, name: &str, args: &[PositionRef], params: &str) -> Predicate {
        (
            self.uniquer.question(Question::Constraint {
                name: name.to_string(),
                args: args.to_vec(),
                params: params.to_string(),
            }),
            self.uniquer.answer(Answer::True),
        )
    }

    /// A predicate checking that a positional value exists.
    pub fn is_not_null(&mut self) -> Predicate {
        (
            self.uniquer.question(Question::IsNotNull),
            self.uniquer.answer(Answer::True),
        )
    }

    /// A predicate comparing the operand count of an operation to a known
    /// value.
    pub fn operand_count(&mut self, count: u32) -> Predicate {
        (
            self.uniquer.question(Question::OperandCount),
            self.uniquer.answer(Answer::Unsigned { value: count }),
        )
    }

    /// A predicate requiring at least `count` operands.
    pub fn operand_count_at_least(&mut self, count: u32) -> Predicate {
        (
            self.uniquer.question(Question::OperandCountAtLeast),
            self.uniquer.answer(Answer::Unsigned { value: count }),
        )
    }

    /// A predicate comparing the name of an operation to a known value.
    pub fn operation_name(&mut self, name: &str) -> Predicate {
        (
            self.uniquer.question(Question::OperationName),
            self.uniquer.answer(Answer::OperationName {
                name: name.to_string(),
            }),
        )
    }

    /// A predicate comparing the result count of an operation to a known
    /// value.
    pub fn result_count(&mut self, count: u32) -> Predicate {
        (
            self.uniquer.question(Question::ResultCount),
            self.uniquer.answer(Answer::Unsigned { value: count }),
        )
    }

    /// A predicate requiring at least `count` results.
    pub fn result_count_at_least(&mut self, count: u32) -> Predicate {
        (
            self.uniquer.question(Question::ResultCountAtLeast),
            self.uniquer.answer(Answer::Unsigned { value: count }),
        )
    }

    /// A predicate comparing the type of an attribute or value to a known
    /// type.
    pub fn type_constraint(&mut self, value: &str) -> Predicate {
        (
            self.uniquer.question(Question::Type),
            self.uniquer.answer(Answer::Type {
                value: value.to_string(),
            }),
        )
    }
}
