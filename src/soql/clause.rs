use super::expression::{self, Build, Expression};

/// The clause a group of expressions renders under.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClauseKind {
    /// `select a, b`, or `select *` when empty
    Select,
    /// `where a = b and c = d`, omitted when empty
    Where,
    /// `group by a, b`, omitted when empty
    GroupBy,
    /// `order by a, b`, omitted when empty
    OrderBy,
}

/// An ordered, immutable group of expressions rendered with a clause-specific
/// keyword.
///
/// Clauses are append-only: [`Clause::append`] returns a *new* clause holding
/// the prior expressions followed by the supplied ones, leaving the receiver
/// untouched. This makes clauses safe to share between query templates.
///
/// ```
/// use sodaq::soql::clause::select;
/// use sodaq::soql::expression::Build;
///
/// let base = select(["a"]);
/// let extended = base.append(["b"]);
/// assert_eq!(base.build(), "select a");
/// assert_eq!(extended.build(), "select a, b");
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Clause {
    kind: ClauseKind,
    expressions: Vec<Expression>,
}

impl Clause {
    /// An empty clause of the given kind.
    pub fn new(kind: ClauseKind) -> Clause {
        Clause {
            kind,
            expressions: Vec::new(),
        }
    }

    pub fn kind(&self) -> ClauseKind {
        self.kind
    }

    /// The expressions contained in this clause, in append order.
    pub fn expressions(&self) -> &[Expression] {
        &self.expressions
    }

    pub fn is_empty(&self) -> bool {
        self.expressions.is_empty()
    }

    /// Returns a new clause with the supplied expressions appended.
    pub fn append<E: Into<Expression>>(&self, exprs: impl IntoIterator<Item = E>) -> Clause {
        let mut expressions = self.expressions.clone();
        expressions.extend(exprs.into_iter().map(Into::into));
        Clause {
            kind: self.kind,
            expressions,
        }
    }
}

impl Build for Clause {
    fn build(&self) -> String {
        if self.is_empty() {
            return match self.kind {
                ClauseKind::Select => "select *".to_string(),
                _ => String::new(),
            };
        }
        let joined = |sep: &str| {
            self.expressions
                .iter()
                .map(Build::build)
                .collect::<Vec<_>>()
                .join(sep)
        };
        match self.kind {
            ClauseKind::Select => format!("select {}", joined(", ")),
            // Top-level where expressions are implicitly and-joined.
            ClauseKind::Where => format!(
                "where {}",
                expression::and(self.expressions.iter().cloned()).build()
            ),
            ClauseKind::GroupBy => format!("group by {}", joined(", ")),
            ClauseKind::OrderBy => format!("order by {}", joined(", ")),
        }
    }
}

/// A select clause initialized with the provided expressions.
pub fn select<E: Into<Expression>>(exprs: impl IntoIterator<Item = E>) -> Clause {
    Clause::new(ClauseKind::Select).append(exprs)
}

/// A where clause initialized with the provided expressions.
pub fn where_<E: Into<Expression>>(exprs: impl IntoIterator<Item = E>) -> Clause {
    Clause::new(ClauseKind::Where).append(exprs)
}

/// A group by clause initialized with the provided expressions.
pub fn group_by<E: Into<Expression>>(exprs: impl IntoIterator<Item = E>) -> Clause {
    Clause::new(ClauseKind::GroupBy).append(exprs)
}

/// An order by clause initialized with the provided expressions.
pub fn order_by<E: Into<Expression>>(exprs: impl IntoIterator<Item = E>) -> Clause {
    Clause::new(ClauseKind::OrderBy).append(exprs)
}
