//! Autocomplete filtering and rewriting, with `$` marking the cursor

use formula_runtime::autocomplete::{Autocompleter, AutocompleteConfig, autocomplete_formula, filter_candidates};
use pretty_assertions::assert_eq;
use rstest::rstest;

const ALL_FIELDS: [&str; 3] = ["field name a", "double quoted \"", "single quoted '"];
const ALL_FUNCTIONS: [&str; 4] = ["field", "upper", "lower", "length"];

/// Strip the `$` marker, returning the formula and the cursor in characters
fn split_cursor(marked: &str) -> (String, usize) {
    let byte_index = marked.find('$').expect("cursor marker");
    (marked.replacen('$', "", 1), marked[..byte_index].chars().count())
}

fn join_cursor(formula: &str, cursor: usize) -> String {
    let mut marked: String = formula.chars().take(cursor).collect();
    marked.push('$');
    marked.extend(formula.chars().skip(cursor));
    marked
}

fn autocompleter() -> Autocompleter {
    Autocompleter::new(AutocompleteConfig::new().with_lookup_functions(["field"]))
}

#[rstest]
#[case("fi$", &["field"], &[], true)]
#[case("l$", &["lower", "length"], &[], true)]
#[case("field(\"$", &[], &ALL_FIELDS, true)]
#[case("field(\"f$", &[], &["field name a"], true)]
#[case("field(\"f$\")", &[], &["field name a"], true)]
#[case("field(\"d$\")", &[], &["double quoted \""], true)]
#[case("field(\"s$\")", &[], &["single quoted '"], true)]
#[case("lower()$", &ALL_FUNCTIONS, &ALL_FIELDS, false)]
#[case("$", &ALL_FUNCTIONS, &ALL_FIELDS, false)]
fn test_filter_by_cursor_location(
    #[case] marked: &str,
    #[case] functions: &[&str],
    #[case] fields: &[&str],
    #[case] filtered: bool,
) {
    let (formula, cursor) = split_cursor(marked);
    let result = autocompleter().filter(&formula, cursor, &ALL_FUNCTIONS, &ALL_FIELDS);

    assert_eq!(result.functions, functions);
    assert_eq!(result.fields, fields);
    assert_eq!(result.filtered, filtered);
}

#[rstest]
#[case("fi$", "field('$')")]
#[case("fie$", "field('$')")]
#[case("fiel$", "field('$')")]
#[case("field$", "field('$')")]
#[case("field($", "field('field name a')$")]
#[case("field('$", "field('$")]
#[case("field(''$", "field(''$")]
#[case("field('')$", "field('')$")]
#[case("fie$)", "field('$'))")]
#[case("f$i", "field('$'i")]
#[case("field2('$", "field2('$")]
#[case("field('$')", "field('field name a')$")]
#[case("field(\"$\")", "field(\"field name a\")$")]
#[case("field(\"field na$me a\")", "field(\"field na$me a\")")]
#[case("field(\"field na$\")", "field(\"field name a\")$")]
#[case("field('field na$')", "field('field name a')$")]
#[case("field(\"d$\")", "field(\"double quoted \\\"\")$")]
#[case("field(\"s$\")", "field(\"single quoted '\")$")]
#[case("field('d$')", "field('double quoted \"')$")]
#[case("field('s$')", "field('single quoted \\'')$")]
#[case("field(\"d$", "field(\"double quoted \\\"\")$")]
#[case("field(\"s$", "field(\"single quoted '\")$")]
#[case("field('d$", "field('double quoted \"')$")]
#[case("field('s$", "field('single quoted \\'')$")]
#[case("u$", "upper($)")]
#[case("l$", "lower($)")]
#[case("le$", "length($)")]
#[case("u($", "u($")]
#[case("u$)", "upper($))")]
#[case("upper(f$)", "upper(field('$'))")]
#[case("upper(f$", "upper(field('$')")]
#[case("upper(l$)", "upper(lower($))")]
#[case("upper(l$", "upper(lower($)")]
fn test_autocomplete_rewrites(#[case] marked: &str, #[case] expected: &str) {
    let autocompleter = autocompleter();
    let (formula, cursor) = split_cursor(marked);
    let filtered = autocompleter.filter(&formula, cursor, &ALL_FUNCTIONS, &ALL_FIELDS);
    let completion = autocompleter.autocomplete(&formula, cursor, &filtered.functions, &filtered.fields);

    assert_eq!(join_cursor(&completion.formula, completion.cursor), expected);
}

#[test]
fn test_default_lookup_functions_include_get() {
    let (formula, cursor) = split_cursor("concat('a', get('fi$");
    let filtered = filter_candidates(&formula, cursor, &ALL_FUNCTIONS, &ALL_FIELDS);
    assert_eq!(filtered.fields, vec!["field name a"]);

    let completion = autocomplete_formula(&formula, cursor, &filtered.functions, &filtered.fields);
    assert_eq!(
        join_cursor(&completion.formula, completion.cursor),
        "concat('a', get('field name a')$"
    );
}

#[test]
fn test_no_candidates_leaves_formula_alone() {
    let (formula, cursor) = split_cursor("zz$");
    let filtered = autocompleter().filter(&formula, cursor, &ALL_FUNCTIONS, &ALL_FIELDS);
    assert!(filtered.functions.is_empty());
    assert!(filtered.filtered);

    let completion = autocompleter().autocomplete(&formula, cursor, &filtered.functions, &filtered.fields);
    assert_eq!(join_cursor(&completion.formula, completion.cursor), "zz$");
}
