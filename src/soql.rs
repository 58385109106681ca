//! # SoQL query composition
//!
//! This module builds canonical SoQL query strings out of immutable value
//! objects. It is organized into focused submodules:
//!
//! - **[expression]** - Immutable renderable fragments (columns, operators,
//!   functions, aliases) and the [`Build`] trait
//! - **[clause]** - Ordered, copy-on-append expression groups per clause kind
//!   (select, where, group by, order by)
//! - **[query]** - The complete query with offset/limit and the final render
//!
//! ## Quick Start
//!
//! ```
//! use sodaq::soql::expression::{self as expr, Build, OrderDirection};
//! use sodaq::soql::Query;
//! use sodaq::Location;
//!
//! let mut query = Query::<Location>::new("earthquakes");
//! query.add_where([expr::gt("magnitude", "2.0")]);
//! query.add_order([expr::order("magnitude", OrderDirection::Desc)]);
//!
//! assert_eq!(
//!     query.build(),
//!     "select * where magnitude > 2.0 order by magnitude desc offset 0 limit 25"
//! );
//! ```
//!
//! ## Rendering Rules
//!
//! Every part renders independently and the query joins the non-empty parts
//! with single spaces:
//!
//! ```text
//! select <expr,...>|*              where <expr> [and <expr>]*
//! group by <expr,...>              order by <expr,...>
//! offset <int>                     limit <int>
//! ```
//!
//! An empty where/group by/order by clause contributes nothing; an empty
//! select renders as `select *`. Offset and limit default to `0` and `25`
//! and only disappear when explicitly cleared.
pub mod clause;
pub mod expression;
pub mod query;

pub use clause::{Clause, ClauseKind};
pub use expression::{Build, Expression, OrderDirection};
pub use query::Query;
