use std::marker::PhantomData;

use crate::datatypes::GeoBox;
use crate::entity::Entity;

use super::clause::{Clause, ClauseKind};
use super::expression::{self, Build, Expression};

/// A structured, immutable query against a dataset, typed by the entity the
/// resulting rows marshal into.
///
/// Offset and limit are always present with defaults of `0` and `25`; pass
/// `None` to [`Query::set_offset`] or [`Query::set_limit`] for the
/// first-class "no offset" / "no limit" state, which renders to nothing.
///
/// ```
/// use sodaq::soql::expression::Build;
/// use sodaq::soql::Query;
/// use sodaq::Location;
///
/// let query = Query::<Location>::new("restaurants");
/// assert_eq!(query.build(), "select * offset 0 limit 25");
/// ```
#[derive(Debug, Clone)]
pub struct Query<T: Entity> {
    dataset: String,
    select: Clause,
    where_: Clause,
    group_by: Clause,
    order_by: Clause,
    offset: Option<u64>,
    limit: Option<u64>,
    mapping: PhantomData<fn() -> T>,
}

impl<T: Entity> Query<T> {
    /// Constructs a query against the named dataset.
    pub fn new(dataset: impl Into<String>) -> Query<T> {
        Query {
            dataset: dataset.into(),
            select: Clause::new(ClauseKind::Select),
            where_: Clause::new(ClauseKind::Where),
            group_by: Clause::new(ClauseKind::GroupBy),
            order_by: Clause::new(ClauseKind::OrderBy),
            offset: Some(0),
            limit: Some(25),
            mapping: PhantomData,
        }
    }

    /// The dataset this query refers to.
    pub fn dataset(&self) -> &str {
        &self.dataset
    }

    pub fn select(&self) -> &Clause {
        &self.select
    }

    pub fn where_clause(&self) -> &Clause {
        &self.where_
    }

    pub fn group_by(&self) -> &Clause {
        &self.group_by
    }

    pub fn order_by(&self) -> &Clause {
        &self.order_by
    }

    pub fn offset(&self) -> Option<u64> {
        self.offset
    }

    pub fn limit(&self) -> Option<u64> {
        self.limit
    }

    /// Appends expressions to the select clause, replacing it with a new
    /// clause that includes them.
    pub fn add_select<E: Into<Expression>>(&mut self, exprs: impl IntoIterator<Item = E>) {
        self.select = self.select.append(exprs);
    }

    /// Appends expressions to the where clause; multiple top-level
    /// expressions are and-joined when the query renders.
    pub fn add_where<E: Into<Expression>>(&mut self, exprs: impl IntoIterator<Item = E>) {
        self.where_ = self.where_.append(exprs);
    }

    /// Appends expressions to the group by clause.
    pub fn add_group<E: Into<Expression>>(&mut self, exprs: impl IntoIterator<Item = E>) {
        self.group_by = self.group_by.append(exprs);
    }

    /// Appends expressions to the order by clause.
    pub fn add_order<E: Into<Expression>>(&mut self, exprs: impl IntoIterator<Item = E>) {
        self.order_by = self.order_by.append(exprs);
    }

    /// Sugar for `add_where(is_not_null(expr))`.
    pub fn where_is_not_null(&mut self, expr: impl Into<Expression>) {
        self.add_where([expression::is_not_null(expr)]);
    }

    /// Sugar for `add_where(is_null(expr))`.
    pub fn where_is_null(&mut self, expr: impl Into<Expression>) {
        self.add_where([expression::is_null(expr)]);
    }

    /// Sugar for `add_where(eq(left, right))`.
    pub fn where_eq(&mut self, left: impl Into<Expression>, right: impl Into<Expression>) {
        self.add_where([expression::eq(left, right)]);
    }

    /// Sugar for `add_where(neq(left, right))`.
    pub fn where_neq(&mut self, left: impl Into<Expression>, right: impl Into<Expression>) {
        self.add_where([expression::neq(left, right)]);
    }

    /// Sugar for `add_where(gt(left, right))`.
    pub fn where_gt(&mut self, left: impl Into<Expression>, right: impl Into<Expression>) {
        self.add_where([expression::gt(left, right)]);
    }

    /// Sugar for `add_where(gte(left, right))`.
    pub fn where_gte(&mut self, left: impl Into<Expression>, right: impl Into<Expression>) {
        self.add_where([expression::gte(left, right)]);
    }

    /// Sugar for `add_where(lt(left, right))`.
    pub fn where_lt(&mut self, left: impl Into<Expression>, right: impl Into<Expression>) {
        self.add_where([expression::lt(left, right)]);
    }

    /// Sugar for `add_where(lte(left, right))`.
    pub fn where_lte(&mut self, left: impl Into<Expression>, right: impl Into<Expression>) {
        self.add_where([expression::lte(left, right)]);
    }

    /// Sugar for `add_where(starts_with(left, right))`.
    pub fn where_starts_with(&mut self, left: impl Into<Expression>, right: impl Into<Expression>) {
        self.add_where([expression::starts_with(left, right)]);
    }

    /// Sugar for `add_where(contains(left, right))`.
    pub fn where_contains(&mut self, left: impl Into<Expression>, right: impl Into<Expression>) {
        self.add_where([expression::contains(left, right)]);
    }

    /// Sugar for `add_where(within_box(location, geo_box))`.
    pub fn where_within_box(&mut self, location: impl Into<Expression>, geo_box: GeoBox) {
        self.add_where([expression::within_box(location, geo_box)]);
    }

    /// Sets the query offset; `None` clears it entirely.
    pub fn set_offset(&mut self, offset: Option<u64>) {
        self.offset = offset;
    }

    /// Sets the query limit; `None` clears it entirely.
    pub fn set_limit(&mut self, limit: Option<u64>) {
        self.limit = limit;
    }
}

fn render_count(keyword: &str, count: Option<u64>) -> String {
    match count {
        Some(n) => format!("{keyword} {n}"),
        None => String::new(),
    }
}

impl<T: Entity> Build for Query<T> {
    fn build(&self) -> String {
        let parts = [
            self.select.build(),
            self.where_.build(),
            self.group_by.build(),
            self.order_by.build(),
            render_count("offset", self.offset),
            render_count("limit", self.limit),
        ];
        let mut joined = parts.join(" ");
        while joined.contains("  ") {
            joined = joined.replace("  ", " ");
        }
        joined.trim().to_string()
    }
}
