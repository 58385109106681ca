use sodaq::soql::clause::{group_by, order_by, select, where_};
use sodaq::soql::expression::{self as expr, Build, OrderDirection};
use sodaq::soql::{Clause, ClauseKind, Query};
use sodaq::GeoBox;

sodaq::entity! {
    pub struct Earthquake {
        region: Option<String>,
        source: Option<String>,
        magnitude: Option<f64>,
    }
}

fn assert_builds(expected: &str, fragment: impl Build) {
    assert_eq!(expected, fragment.build(), "malformed fragment");
}

// ============================================================================
// Expression rendering
// ============================================================================

#[test]
fn test_column() {
    assert_builds("a", expr::column("a"));
}

#[test]
fn test_parentheses() {
    assert_builds("(a)", expr::parentheses(["a"]));
}

#[test]
fn test_wrapped_expression() {
    assert_builds("(a = b)", expr::eq("a", "b").wrapped());
}

#[test]
fn test_is_not_null() {
    assert_builds("a is not null", expr::is_not_null("a"));
}

#[test]
fn test_is_null() {
    assert_builds("a is null", expr::is_null("a"));
}

#[test]
fn test_not() {
    assert_builds("not a", expr::not("a"));
}

#[test]
fn test_and() {
    assert_builds("a and b and c and (c = d)", expr::and(["a", "b", "c", "(c = d)"]));
    assert_builds(
        "a = b and c = d",
        expr::and([expr::eq("a", "b"), expr::eq("c", "d")]),
    );
}

#[test]
fn test_or() {
    assert_builds("a or b or c or (c = d)", expr::or(["a", "b", "c", "(c = d)"]));
}

#[test]
fn test_comparisons() {
    assert_builds("a < b", expr::lt("a", "b"));
    assert_builds("a <= b", expr::lte("a", "b"));
    assert_builds("a = b", expr::eq("a", "b"));
    assert_builds("a != b", expr::neq("a", "b"));
    assert_builds("a > b", expr::gt("a", "b"));
    assert_builds("a >= b", expr::gte("a", "b"));
}

#[test]
fn test_arithmetic() {
    assert_builds("a + b", expr::add("a", "b"));
    assert_builds("a - b", expr::subtract("a", "b"));
    assert_builds("a * b", expr::multiplied_by("a", "b"));
    assert_builds("a / b", expr::divided_by("a", "b"));
}

#[test]
fn test_string_functions() {
    assert_builds("upper(a)", expr::upper("a"));
    assert_builds("lower(a)", expr::lower("a"));
    assert_builds("starts_with(a, b)", expr::starts_with("a", "b"));
    assert_builds("contains(a, 'b')", expr::contains("a", expr::quoted("b")));
}

#[test]
fn test_casts() {
    assert_builds("to_string(a)", expr::cast_to_string("a"));
    assert_builds("to_number(a)", expr::to_number("a"));
    assert_builds("to_boolean(a)", expr::to_boolean("a"));
    assert_builds("to_location(a, b)", expr::to_location("a", "b"));
    assert_builds("to_fixed_timestamp(a)", expr::to_fixed_timestamp("a"));
    assert_builds("to_floating_timestamp(a)", expr::to_floating_timestamp("a"));
}

#[test]
fn test_aggregates() {
    assert_builds("sum(a)", expr::sum("a"));
    assert_builds("count(a)", expr::count("a"));
    assert_builds("avg(a)", expr::avg("a"));
    assert_builds("min(a)", expr::min("a"));
    assert_builds("max(a)", expr::max("a"));
}

#[test]
fn test_alias() {
    assert_builds("a as alias_a", expr::alias("a", "alias_a"));
}

#[test]
fn test_quoted() {
    assert_builds("'something'", expr::quoted("something"));
}

#[test]
fn test_order_direction() {
    assert_builds("a desc", expr::order("a", OrderDirection::Desc));
    assert_builds("a asc", expr::order("a", OrderDirection::Asc));
}

#[test]
fn test_within_box() {
    assert_builds(
        "within_box(location, 47.712585, -122.464676, 47.510759, -122.249756)",
        expr::within_box(
            "location",
            GeoBox::new(47.712585, -122.464676, 47.510759, -122.249756),
        ),
    );
}

#[test]
fn test_nested_composition() {
    let predicate = expr::and([
        expr::gt(expr::to_number("magnitude"), "2.0"),
        expr::starts_with("region", expr::quoted("Washington")),
    ]);
    assert_builds(
        "to_number(magnitude) > 2.0 and starts_with(region, 'Washington')",
        predicate,
    );
}

// ============================================================================
// Clause rendering
// ============================================================================

#[test]
fn test_select_clause() {
    assert_builds("select a, b", select(["a", "b"]));
}

#[test]
fn test_empty_select_is_select_all() {
    assert_builds("select *", Clause::new(ClauseKind::Select));
}

#[test]
fn test_where_clause_and_joins() {
    assert_builds(
        "where a = b and c = d",
        where_([expr::and([expr::eq("a", "b"), expr::eq("c", "d")])]),
    );
    assert_builds(
        "where a = b and b = c",
        where_([expr::eq("a", "b"), expr::eq("b", "c")]),
    );
}

#[test]
fn test_empty_where_renders_empty() {
    assert_builds("", Clause::new(ClauseKind::Where));
}

#[test]
fn test_group_by_clause() {
    assert_builds("group by a, b", group_by(["a", "b"]));
}

#[test]
fn test_order_by_clause() {
    assert_builds(
        "order by a desc",
        order_by([expr::order("a", OrderDirection::Desc)]),
    );
}

#[test]
fn test_clause_append_is_copy_on_append() {
    let base = where_([expr::eq("a", "b")]);
    let extended = base.append([expr::eq("c", "d")]);

    assert_builds("where a = b", base.clone());
    assert_builds("where a = b and c = d", extended);
    assert_eq!(base.expressions().len(), 1);
}

// ============================================================================
// Query rendering
// ============================================================================

#[test]
fn test_default_query() {
    let query = Query::<Earthquake>::new("earthquakes");
    assert_eq!("select * offset 0 limit 25", query.build());
}

#[test]
fn test_query_build_is_deterministic() {
    let mut query = Query::<Earthquake>::new("earthquakes");
    query.add_select(["region", "magnitude"]);
    query.where_gt("magnitude", "2.0");
    query.add_order([expr::order("magnitude", OrderDirection::Desc)]);

    assert_eq!(query.build(), query.build());
}

#[test]
fn test_full_query() {
    let mut query = Query::<Earthquake>::new("earthquakes");
    query.add_select(["region", "magnitude"]);
    query.add_where([expr::gt("magnitude", "2.0"), expr::eq("source", expr::quoted("pr"))]);
    query.add_group(["region"]);
    query.add_order([expr::order("magnitude", OrderDirection::Desc)]);
    query.set_offset(Some(50));
    query.set_limit(Some(10));

    assert_eq!(
        "select region, magnitude where magnitude > 2.0 and source = 'pr' \
         group by region order by magnitude desc offset 50 limit 10",
        query.build()
    );
    assert_eq!("earthquakes", query.dataset());
}

#[test]
fn test_where_sugar() {
    let mut query = Query::<Earthquake>::new("earthquakes");
    query.where_eq("a", "b");
    query.where_is_not_null("region");
    assert_eq!(
        "select * where a = b and region is not null offset 0 limit 25",
        query.build()
    );
}

#[test]
fn test_where_within_box() {
    let mut query = Query::<Earthquake>::new("earthquakes");
    query.where_within_box(
        "location",
        GeoBox::new(47.712585, -122.464676, 47.510759, -122.249756),
    );
    assert_eq!(
        "select * where within_box(location, 47.712585, -122.464676, 47.510759, -122.249756) \
         offset 0 limit 25",
        query.build()
    );
}

#[test]
fn test_cleared_offset_and_limit_render_nothing() {
    let mut query = Query::<Earthquake>::new("earthquakes");
    query.set_offset(None);
    query.set_limit(None);
    assert_eq!("select *", query.build());
}

#[test]
fn test_zero_limit_is_distinct_from_no_limit() {
    let mut query = Query::<Earthquake>::new("earthquakes");
    query.set_limit(Some(0));
    assert_eq!("select * offset 0 limit 0", query.build());
}

#[test]
fn test_query_clauses_are_shareable_templates() {
    let mut base = Query::<Earthquake>::new("earthquakes");
    base.where_gt("magnitude", "2.0");

    let mut page_two = base.clone();
    page_two.set_offset(Some(25));

    assert_eq!("select * where magnitude > 2.0 offset 0 limit 25", base.build());
    assert_eq!(
        "select * where magnitude > 2.0 offset 25 limit 25",
        page_two.build()
    );
}
