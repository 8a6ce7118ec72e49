// Copyright 2026 presburger developers
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

//! # Predicate DAG
//!
//! A uniqued DAG of predicates over an input IR, used to drive matcher-tree
//! construction. Predicates are composed of three node kinds:
//!
//! * **Positions** name a location in the IR being matched: an operation,
//!   one of its operands, results, attributes, or a type. Each position
//!   links to the position it is formed relative to; the only parentless
//!   position is the root operation.
//! * **Questions** are queries applied at a position, such as "what is the
//!   operation name here".
//! * **Answers** are the expected replies.
//!
//! All nodes are interned in a [`PredicateUniquer`]: structurally equal
//! nodes share one handle, so predicate equality is handle equality. The
//! [`PredicateBuilder`](builder::PredicateBuilder) offers factory methods
//! returning interned handles.
//!
//! IR-facing payloads (operation names, attribute and type renderings) are
//! plain strings here; the frontend that owns a real IR maps its entities
//! to stable strings.

pub mod builder;

use std::collections::HashMap;

/// The kinds of predicate nodes.
///
/// Positions are declared in decreasing priority, questions in dependency
/// order ([`IsNotNull`](Kind::IsNotNullQuestion) must be asked before
/// anything else at the same position, the operation name next, and so on).
/// The derived `Ord` follows declaration order and is what matcher-tree
/// construction sorts by.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Kind {
    /// Positions, ordered by decreasing priority.
    OperationPos,
    /// An operand of an operation.
    OperandPos,
    /// A group of operands of an operation.
    OperandGroupPos,
    /// An attribute of an operation.
    AttributePos,
    /// A result of an operation.
    ResultPos,
    /// A group of results of an operation.
    ResultGroupPos,
    /// The type of a value-like position.
    TypePos,

    /// Questions, ordered by dependency.
    IsNotNullQuestion,
    /// The name of an operation.
    OperationNameQuestion,
    /// The type of a value-like position.
    TypeQuestion,
    /// An attribute comparison.
    AttributeQuestion,
    /// The exact operand count of an operation.
    OperandCountQuestion,
    /// A lower bound on the operand count.
    OperandCountAtLeastQuestion,
    /// The exact result count of an operation.
    ResultCountQuestion,
    /// A lower bound on the result count.
    ResultCountAtLeastQuestion,
    /// Equality of two positional values.
    EqualToQuestion,
    /// A named, parameterized constraint over several positions.
    ConstraintQuestion,

    /// Answers.
    AttributeAnswer,
    /// The boolean `false` answer.
    FalseAnswer,
    /// An operation name answer.
    OperationNameAnswer,
    /// The boolean `true` answer.
    TrueAnswer,
    /// A type answer.
    TypeAnswer,
    /// An unsigned number answer.
    UnsignedAnswer,
}

/// Interned handle to a [`Position`]. Handle equality is node equality.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct PositionRef(usize);

/// Interned handle to a [`Question`]. Handle equality is node equality.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct QuestionRef(usize);

/// Interned handle to an [`Answer`]. Handle equality is node equality.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct AnswerRef(usize);

/// A predicate: a question together with its expected answer.
pub type Predicate = (QuestionRef, AnswerRef);

/// How an operation position relates to the position it is anchored at.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum OperationEdge {
    /// The root operation; it has no anchor.
    Root,
    /// The operation defining the anchor operand (downward traversal).
    Defining,
    /// An operation using the anchor value (upward traversal), optionally
    /// through a specific operand index.
    User {
        /// The operand of the user through which the value flows, if pinned.
        operand: Option<u32>,
    },
}

/// A location in the input IR on which predicates can be applied.
///
/// Operation positions anchor all other positions; they are themselves
/// anchored at operand-like positions, except for the parentless root.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Position {
    /// An operation in the IR.
    Operation {
        /// The anchor position, `None` only for the root.
        parent: Option<PositionRef>,
        /// How this operation is reached from the anchor.
        edge: OperationEdge,
        /// Depth of this operation position; the root has depth 0.
        depth: u32,
    },
    /// An operand of the parent operation.
    Operand {
        /// The operation owning the operand.
        parent: PositionRef,
        /// The operand number.
        index: u32,
    },
    /// A group of operands of the parent operation.
    OperandGroup {
        /// The operation owning the operands.
        parent: PositionRef,
        /// The group number; `None` refers to all operands.
        group: Option<u32>,
        /// Whether the group has unknown size. If `false`, the group has at
        /// most one element.
        is_variadic: bool,
    },
    /// A named attribute of the parent operation.
    Attribute {
        /// The operation owning the attribute.
        parent: PositionRef,
        /// The attribute name.
        name: String,
    },
    /// A result of the parent operation.
    Result {
        /// The operation owning the result.
        parent: PositionRef,
        /// The result number.
        index: u32,
    },
    /// A group of results of the parent operation.
    ResultGroup {
        /// The operation owning the results.
        parent: PositionRef,
        /// The group number; `None` refers to all results.
        group: Option<u32>,
        /// Whether the group has unknown size. If `false`, the group has at
        /// most one element.
        is_variadic: bool,
    },
    /// The type of the parent attribute, operand or result.
    Type {
        /// The value-like position whose type this is.
        parent: PositionRef,
    },
}

impl Position {
    /// The kind of this position.
    pub fn kind(&self) -> Kind {
        match self {
            Position::Operation { .. } => Kind::OperationPos,
            Position::Operand { .. } => Kind::OperandPos,
            Position::OperandGroup { .. } => Kind::OperandGroupPos,
            Position::Attribute { .. } => Kind::AttributePos,
            Position::Result { .. } => Kind::ResultPos,
            Position::ResultGroup { .. } => Kind::ResultGroupPos,
            Position::Type { .. } => Kind::TypePos,
        }
    }

    /// The position this one is formed relative to, if any.
    pub fn parent(&self) -> Option<PositionRef> {
        match *self {
            Position::Operation { parent, .. } => parent,
            Position::Operand { parent, .. }
            | Position::OperandGroup { parent, .. }
            | Position::Attribute { parent, .. }
            | Position::Result { parent, .. }
            | Position::ResultGroup { parent, .. }
            | Position::Type { parent } => Some(parent),
        }
    }
}

/// A query on a positional value.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Question {
    /// Does the positional value exist?
    IsNotNull,
    /// What is the operation's name?
    OperationName,
    /// What is the value's type?
    Type,
    /// What is the attribute's value?
    Attribute,
    /// How many operands does the operation have?
    OperandCount,
    /// Does the operation have at least this many operands?
    OperandCountAtLeast,
    /// How many results does the operation have?
    ResultCount,
    /// Does the operation have at least this many results?
    ResultCountAtLeast,
    /// Is the positional value equal to the value at `other`?
    EqualTo {
        /// The position compared against.
        other: PositionRef,
    },
    /// Does a named constraint hold over the given positions?
    Constraint {
        /// The constraint name.
        name: String,
        /// The positions the constraint applies to.
        args: Vec<PositionRef>,
        /// Opaque constraint parameters.
        params: String,
    },
}

impl Question {
    /// The kind of this question.
    pub fn kind(&self) -> Kind {
        match self {
            Question::IsNotNull => Kind::IsNotNullQuestion,
            Question::OperationName => Kind::OperationNameQuestion,
            Question::Type => Kind::TypeQuestion,
            Question::Attribute => Kind::AttributeQuestion,
            Question::OperandCount => Kind::OperandCountQuestion,
            Question::OperandCountAtLeast => Kind::OperandCountAtLeastQuestion,
            Question::ResultCount => Kind::ResultCountQuestion,
            Question::ResultCountAtLeast => Kind::ResultCountAtLeastQuestion,
            Question::EqualTo { .. } => Kind::EqualToQuestion,
            Question::Constraint { .. } => Kind::ConstraintQuestion,
        }
    }
}

/// The expected reply to a [`Question`].
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Answer {
    /// An attribute value.
    Attribute {
        /// The rendered attribute.
        value: String,
    },
    /// The boolean `false`.
    False,
    /// An operation name.
    OperationName {
        /// The name.
        name: String,
    },
    /// The boolean `true`.
    True,
    /// A type value.
    Type {
        /// The rendered type.
        value: String,
    },
    /// An unsigned number, e.g. an operand count.
    Unsigned {
        /// The value.
        value: u32,
    },
}

impl Answer {
    /// The kind of this answer.
    pub fn kind(&self) -> Kind {
        match self {
            Answer::Attribute { .. } => Kind::AttributeAnswer,
            Answer::False => Kind::FalseAnswer,
            Answer::OperationName { .. } => Kind::OperationNameAnswer,
            Answer::True => Kind::TrueAnswer,
            Answer::Type { .. } => Kind::TypeAnswer,
            Answer::Unsigned { .. } => Kind::UnsignedAnswer,
        }
    }
}

/// Owns and uniques all predicate nodes.
///
/// Nodes live as long as the uniquer; handles are plain indices and stay
/// valid for its whole lifetime. Interning is not synchronized; share a
/// uniquer across threads only under external locking.
#[derive(Debug, Default)]
pub struct PredicateUniquer {
    positions: Vec<Position>,
    position_ids: HashMap<Position, PositionRef>,
    questions: Vec<Question>,
    question_ids: HashMap<Question, QuestionRef>,
    answers: Vec<Answer>,
    answer_ids: HashMap<Answer, AnswerRef>,
}

impl PredicateUniquer {
    /// Creates an empty uniquer.
    pub fn new() -> Self {
        PredicateUniquer::default()
    }

    /// Interns a position, returning the handle of the unique copy.
    pub fn position(&mut self, position: Position) -> PositionRef {
        if let Some(&existing) = self.position_ids.get(&position) {
            return existing;
        }
        let handle = PositionRef(self.positions.len());
        self.positions.push(position.clone());
        self.position_ids.insert(position, handle);
        handle
    }

    /// Interns a question.
    pub fn question(&mut self, question: Question) -> QuestionRef {
        if let Some(&existing) = self.question_ids.get(&question) {
            return existing;
        }
        let handle = QuestionRef(self.questions.len());
        self.questions.push(question.clone());
        self.question_ids.insert(question, handle);
        handle
    }

    /// Interns an answer.
    pub fn answer(&mut self, answer: Answer) -> AnswerRef {
        if let Some(&existing) = self.answer_ids.get(&answer) {
            return existing;
        }
        let handle = AnswerRef(self.answers.len());
        self.answers.push(answer.clone());
        self.answer_ids.insert(answer, handle);
        handle
    }

    /// Resolves a position handle.
    pub fn position_data(&self, handle: PositionRef) -> &Position {
        &self.positions[handle.0]
    }

    /// Resolves a question handle.
    pub fn question_data(&self, handle: QuestionRef) -> &Question {
        &self.questions[handle.0]
    }

    /// Resolves an answer handle.
    pub fn answer_data(&self, handle: AnswerRef) -> &Answer {
        &self.answers[handle.0]
    }

    /// Number of interned positions.
    pub fn num_positions(&self) -> usize {
        self.positions.len()
    }

    /// Depth of the first ancestor operation position of `handle` (the
    /// handle itself, if it is an operation position).
    pub fn operation_depth(&self, handle: PositionRef) -> u32 {
        let mut current = handle;
        loop {
            match self.position_data(current) {
                Position::Operation { depth, .. } => return *depth,
                position => {
                    current = position
                        .parent()
                        .expect("non-operation position must have a parent");
                }
            }
        }
    }
}
