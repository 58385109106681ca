use std::fmt;

use crate::datatypes::GeoBox;

/// Anything that can render itself as a canonical SoQL fragment.
///
/// `build` is pure and deterministic: rendering the same value twice yields
/// the same string both times.
pub trait Build {
    fn build(&self) -> String;
}

/// Sort direction for [`order`] expressions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderDirection {
    /// Ascending (`asc`)
    Asc,
    /// Descending (`desc`)
    Desc,
}

impl OrderDirection {
    /// The lower-cased SoQL keyword.
    pub fn keyword(&self) -> &'static str {
        match self {
            OrderDirection::Asc => "asc",
            OrderDirection::Desc => "desc",
        }
    }
}

/// An immutable query expression.
///
/// Expressions are value objects: composites (operators, functions) are built
/// from the rendered text of already-built children and never mutated in
/// place. `&str` and `String` convert into simple expressions, so constructor
/// arguments accept plain column names directly:
///
/// ```
/// use sodaq::soql::expression::{eq, Build};
///
/// assert_eq!(eq("a", "b").build(), "a = b");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Expression {
    /// The rendered expression text.
    text: String,
    /// Whether building wraps the text in parentheses.
    needs_wrap: bool,
}

impl Expression {
    /// The raw expression text, before any wrapping.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Whether this expression renders wrapped in parentheses.
    pub fn needs_wrap(&self) -> bool {
        self.needs_wrap
    }

    /// A copy of this expression that renders wrapped in parentheses.
    pub fn wrapped(mut self) -> Expression {
        self.needs_wrap = true;
        self
    }
}

impl Build for Expression {
    fn build(&self) -> String {
        if self.needs_wrap && !self.text.is_empty() {
            format!("({})", self.text)
        } else {
            self.text.clone()
        }
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.build())
    }
}

impl From<&str> for Expression {
    fn from(text: &str) -> Self {
        simple(text)
    }
}

impl From<String> for Expression {
    fn from(text: String) -> Self {
        simple(text)
    }
}

fn build_all<E: Into<Expression>>(exprs: impl IntoIterator<Item = E>) -> Vec<String> {
    exprs.into_iter().map(|e| e.into().build()).collect()
}

/// A literal, column reference, or identifier, rendered verbatim.
pub fn simple(text: impl Into<String>) -> Expression {
    Expression {
        text: text.into(),
        needs_wrap: false,
    }
}

/// A column reference, e.g. `a`.
pub fn column(name: impl Into<String>) -> Expression {
    simple(name)
}

/// A prefix function application, e.g. `not a`.
pub fn infixed(function: &str, arg: impl Into<Expression>) -> Expression {
    simple(format!("{} {}", function, arg.into().build()))
}

/// A postfix function application, e.g. `a is null`.
pub fn suffixed(function: &str, arg: impl Into<Expression>) -> Expression {
    simple(format!("{} {}", arg.into().build(), function))
}

/// Joins built children with ` op ` between them, e.g. `a + b`.
///
/// Binary and associative n-ary applications share this implementation.
pub fn operator<E: Into<Expression>>(op: &str, exprs: impl IntoIterator<Item = E>) -> Expression {
    simple(build_all(exprs).join(&format!(" {op} ")))
}

/// A function call with an argument list, e.g. `function(a, b, c)`.
pub fn function<E: Into<Expression>>(name: &str, args: impl IntoIterator<Item = E>) -> Expression {
    simple(format!("{}({})", name, build_all(args).join(", ")))
}

/// `a is not null`
pub fn is_not_null(expr: impl Into<Expression>) -> Expression {
    suffixed("is not null", expr)
}

/// `a is null`
pub fn is_null(expr: impl Into<Expression>) -> Expression {
    suffixed("is null", expr)
}

/// `not a`
pub fn not(expr: impl Into<Expression>) -> Expression {
    infixed("not", expr)
}

/// Joins expressions with `and`, e.g. `a and b and c`.
pub fn and<E: Into<Expression>>(exprs: impl IntoIterator<Item = E>) -> Expression {
    operator("and", exprs)
}

/// Joins expressions with `or`, e.g. `a or b or c`.
pub fn or<E: Into<Expression>>(exprs: impl IntoIterator<Item = E>) -> Expression {
    operator("or", exprs)
}

/// `a < b`
pub fn lt(left: impl Into<Expression>, right: impl Into<Expression>) -> Expression {
    operator("<", [left.into(), right.into()])
}

/// `a <= b`
pub fn lte(left: impl Into<Expression>, right: impl Into<Expression>) -> Expression {
    operator("<=", [left.into(), right.into()])
}

/// `a = b`
pub fn eq(left: impl Into<Expression>, right: impl Into<Expression>) -> Expression {
    operator("=", [left.into(), right.into()])
}

/// `a != b`
pub fn neq(left: impl Into<Expression>, right: impl Into<Expression>) -> Expression {
    operator("!=", [left.into(), right.into()])
}

/// `a > b`
pub fn gt(left: impl Into<Expression>, right: impl Into<Expression>) -> Expression {
    operator(">", [left.into(), right.into()])
}

/// `a >= b`
pub fn gte(left: impl Into<Expression>, right: impl Into<Expression>) -> Expression {
    operator(">=", [left.into(), right.into()])
}

/// `a + b`
pub fn add(left: impl Into<Expression>, right: impl Into<Expression>) -> Expression {
    operator("+", [left.into(), right.into()])
}

/// `a - b`
pub fn subtract(left: impl Into<Expression>, right: impl Into<Expression>) -> Expression {
    operator("-", [left.into(), right.into()])
}

/// `a * b`
pub fn multiplied_by(left: impl Into<Expression>, right: impl Into<Expression>) -> Expression {
    operator("*", [left.into(), right.into()])
}

/// `a / b`
pub fn divided_by(left: impl Into<Expression>, right: impl Into<Expression>) -> Expression {
    operator("/", [left.into(), right.into()])
}

/// Server-side uppercase, e.g. `upper(a)`.
pub fn upper(expr: impl Into<Expression>) -> Expression {
    function("upper", [expr.into()])
}

/// Server-side lowercase, e.g. `lower(a)`.
pub fn lower(expr: impl Into<Expression>) -> Expression {
    function("lower", [expr.into()])
}

/// `starts_with(a, b)`
pub fn starts_with(left: impl Into<Expression>, right: impl Into<Expression>) -> Expression {
    function("starts_with", [left.into(), right.into()])
}

/// `contains(a, b)`
pub fn contains(left: impl Into<Expression>, right: impl Into<Expression>) -> Expression {
    function("contains", [left.into(), right.into()])
}

/// Server-side string cast, e.g. `to_string(a)`.
pub fn cast_to_string(expr: impl Into<Expression>) -> Expression {
    function("to_string", [expr.into()])
}

/// Server-side number cast, e.g. `to_number(a)`.
pub fn to_number(expr: impl Into<Expression>) -> Expression {
    function("to_number", [expr.into()])
}

/// Server-side boolean cast, e.g. `to_boolean(a)`.
pub fn to_boolean(expr: impl Into<Expression>) -> Expression {
    function("to_boolean", [expr.into()])
}

/// `to_location(lat, lng)`
pub fn to_location(lat: impl Into<Expression>, lng: impl Into<Expression>) -> Expression {
    function("to_location", [lat.into(), lng.into()])
}

/// `to_fixed_timestamp(a)`
pub fn to_fixed_timestamp(expr: impl Into<Expression>) -> Expression {
    function("to_fixed_timestamp", [expr.into()])
}

/// `to_floating_timestamp(a)`
pub fn to_floating_timestamp(expr: impl Into<Expression>) -> Expression {
    function("to_floating_timestamp", [expr.into()])
}

/// Aggregated sum, e.g. `sum(a)`.
pub fn sum(expr: impl Into<Expression>) -> Expression {
    function("sum", [expr.into()])
}

/// Aggregated count, e.g. `count(a)`.
pub fn count(expr: impl Into<Expression>) -> Expression {
    function("count", [expr.into()])
}

/// Aggregated average, e.g. `avg(a)`.
pub fn avg(expr: impl Into<Expression>) -> Expression {
    function("avg", [expr.into()])
}

/// Aggregated minimum, e.g. `min(a)`.
pub fn min(expr: impl Into<Expression>) -> Expression {
    function("min", [expr.into()])
}

/// Aggregated maximum, e.g. `max(a)`.
pub fn max(expr: impl Into<Expression>) -> Expression {
    function("max", [expr.into()])
}

/// Aliases an expression for later reference, e.g. `a as alias_of_a`.
pub fn alias(expr: impl Into<Expression>, alias: impl Into<String>) -> Expression {
    operator("as", [expr.into(), simple(alias.into())])
}

/// Single-quotes an expression for literal comparison, e.g. `'something'`.
///
/// The caller is responsible for pre-escaping embedded quotes.
pub fn quoted(expr: impl Into<Expression>) -> Expression {
    simple(format!("'{}'", expr.into().build()))
}

/// Appends a sort direction keyword, e.g. `a desc`.
pub fn order(expr: impl Into<Expression>, direction: OrderDirection) -> Expression {
    simple(format!("{} {}", expr.into().build(), direction.keyword()))
}

/// Wraps expressions in parentheses, e.g. `(a)`.
pub fn parentheses<E: Into<Expression>>(exprs: impl IntoIterator<Item = E>) -> Expression {
    simple(format!("({})", build_all(exprs).join(", ")))
}

/// A bounding-box spatial predicate over a location column:
/// `within_box(location, north, east, south, west)`.
pub fn within_box(location: impl Into<Expression>, geo_box: GeoBox) -> Expression {
    function("within_box", [location.into(), simple(geo_box.build())])
}
