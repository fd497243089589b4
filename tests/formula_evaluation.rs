//! End-to-end formula evaluation through the data ledger and rich-text bridge

use async_trait::async_trait;
use formula_runtime::ledger::{
    Application, ApplicationContext, DataLedger, DataProvider, Mode, Page, PageParameterProvider, PathParam,
    PathParamType,
};
use formula_runtime::registry::functions::GET_NODE_TYPE;
use formula_runtime::registry::{FunctionError, RuntimeFunction, create_standard_registry, standard_registry};
use formula_runtime::rich_text::{self, EditorNode};
use formula_runtime::value_ext::ValueExt;
use formula_runtime::{EvaluationError, FormulaEngine, is_valid_formula, parse, resolve_formula};
use pretty_assertions::assert_eq;
use rstest::rstest;
use serde_json::{Map, Value, json};
use std::sync::Arc;

struct NamedProvider {
    name: &'static str,
    priority: i32,
    data: Value,
}

#[async_trait]
impl DataProvider for NamedProvider {
    fn name(&self) -> &str {
        self.name
    }

    fn priority(&self) -> i32 {
        self.priority
    }

    fn data_chunk(&self, _ledger: &DataLedger, path: &[String]) -> Option<Value> {
        self.data.get_path(path).cloned()
    }
}

fn page() -> Page {
    Page {
        id: 3,
        name: "product".to_string(),
        path: "/product/:id/:slug".to_string(),
        path_params: vec![
            PathParam {
                name: "id".to_string(),
                param_type: PathParamType::Numeric,
            },
            PathParam {
                name: "slug".to_string(),
                param_type: PathParamType::Text,
            },
        ],
    }
}

fn context(mode: Mode) -> ApplicationContext {
    let page = page();
    let application = Application {
        id: 1,
        name: "shop".to_string(),
        pages: vec![page.clone()],
    };
    let mut params = Map::new();
    params.insert("id".to_string(), json!(17));
    params.insert("slug".to_string(), json!("blue-mug"));
    ApplicationContext::new(application, page, mode).with_page_params(params)
}

async fn ledger(mode: Mode) -> DataLedger {
    let providers: [Arc<dyn DataProvider>; 2] = [
        Arc::new(NamedProvider {
            name: "user",
            priority: 5,
            data: json!({"first_name": "Grace", "orders": [{"total": 12.5}, {"total": 30}]}),
        }),
        Arc::new(PageParameterProvider::new()),
    ];
    let ledger = DataLedger::new(providers, context(mode));
    ledger.init().await.expect("providers initialize");
    ledger
}

#[rstest]
#[case("get('page_parameter.id')", json!(17))]
#[case("get('page_parameter.slug')", json!("blue-mug"))]
#[case("concat('Hi ', get('user.first_name'))", json!("Hi Grace"))]
#[case("add(get('user.orders[0].total'), get('user.orders.1.total'))", json!(42.5))]
#[case("concat(get('page_parameter.id'), '/', get('page_parameter.slug'))", json!("17/blue-mug"))]
#[case("get('unknown.path')", Value::Null)]
#[case("get('page_parameter.id.nested')", Value::Null)]
#[tokio::test]
async fn test_resolve_against_providers(#[case] formula: &str, #[case] expected: Value) {
    let ledger = ledger(Mode::Public).await;
    assert_eq!(resolve_formula(formula, &ledger).expect("formula evaluates"), expected);
}

#[tokio::test]
async fn test_editing_mode_uses_placeholders() {
    let ledger = ledger(Mode::Editing).await;
    let engine = FormulaEngine::new();
    assert_eq!(
        engine.resolve_formula("concat(get('page_parameter.id'), '-', get('page_parameter.slug'))", &ledger),
        Ok(json!("1-test"))
    );
}

#[tokio::test]
async fn test_literals_evaluate_to_themselves() {
    let ledger = ledger(Mode::Public).await;
    let engine = FormulaEngine::new();
    for (formula, expected) in [("'text'", json!("text")), ("-4.25", json!(-4.25)), ("false", json!(false))] {
        let tree = parse(formula).expect("valid formula");
        assert_eq!(engine.evaluate(&tree, &ledger), Ok(expected));
    }
}

#[tokio::test]
async fn test_add_rejects_bad_arguments_before_running() {
    let ledger = ledger(Mode::Public).await;

    assert_eq!(
        resolve_formula("add(1, 2, 3)", &ledger),
        Err(EvaluationError::Function(FunctionError::InvalidArity {
            name: "add".to_string(),
            min: 2,
            max: Some(2),
            actual: 3,
        }))
    );
    assert_eq!(
        resolve_formula("add('abc', 2)", &ledger),
        Err(EvaluationError::Function(FunctionError::InvalidArgumentType {
            name: "add".to_string(),
            index: 0,
            expected: "number".to_string(),
            actual: "text".to_string(),
        }))
    );

    let add = standard_registry().get("add").cloned().expect("add is built in");
    assert!(add.validate_args(&[json!(1), json!("2")]).is_ok());
}

#[tokio::test]
async fn test_ledger_resolves_by_first_matching_provider() {
    let shadowed: [Arc<dyn DataProvider>; 3] = [
        Arc::new(NamedProvider {
            name: "user",
            priority: 20,
            data: json!({"first_name": "Late"}),
        }),
        Arc::new(NamedProvider {
            name: "user",
            priority: 1,
            data: json!({"first_name": "Early"}),
        }),
        Arc::new(NamedProvider {
            name: "user",
            priority: 1,
            data: json!({"first_name": "Tied", "extra": true}),
        }),
    ];
    let ledger = DataLedger::new(shadowed, context(Mode::Public));

    let priorities: Vec<i32> = ledger.providers().iter().map(|p| p.priority()).collect();
    assert_eq!(priorities, vec![1, 1, 20]);
    assert_eq!(ledger.get("user.first_name"), Some(json!("Early")));
    // The winning provider answers exclusively, even on a miss
    assert_eq!(ledger.get("user.extra"), None);
}

#[test]
fn test_formula_validity() {
    assert!(is_valid_formula(""));
    assert!(is_valid_formula("concat('a', get(\"b\"))"));
    assert!(is_valid_formula("missing_function()"));
    assert!(!is_valid_formula("concat('a',"));
    assert!(!is_valid_formula("'unterminated"));
}

#[tokio::test]
async fn test_rich_text_round_trip() {
    let registry = create_standard_registry();
    let ledger = ledger(Mode::Public).await;

    let nodes = vec![EditorNode::text("hello"), EditorNode::text("there")];
    let formula = rich_text::to_formula(&nodes, &registry);
    assert_eq!(formula, "concat('hello', 'there')");
    assert_eq!(resolve_formula(&formula, &ledger), Ok(json!("hellothere")));

    let tree = parse("concat('Dear ', get('user.first_name'), ', welcome')").expect("valid formula");
    let nodes = rich_text::to_nodes(&tree, &registry).expect("every call has a node mapping");
    assert_eq!(nodes.len(), 3);
    assert_eq!(nodes[1].attr_str("path"), Some("user.first_name"));

    let rebuilt = rich_text::to_formula(&nodes, &registry);
    assert_eq!(
        rebuilt,
        "concat(concat('Dear ', get('user.first_name')), ', welcome')"
    );
    assert_eq!(resolve_formula(&rebuilt, &ledger), Ok(json!("Dear Grace, welcome")));
}

#[tokio::test]
async fn test_long_editor_document_resolves() {
    let registry = create_standard_registry();
    let ledger = ledger(Mode::Public).await;

    let nodes: Vec<EditorNode> = (0..300)
        .map(|i| match i % 3 {
            0 => EditorNode::new(GET_NODE_TYPE).with_attr("path", json!("user.first_name")),
            _ => EditorNode::text(i.to_string()),
        })
        .collect();
    let formula = rich_text::to_formula(&nodes, &registry);
    assert!(formula.starts_with(&"concat(".repeat(299)));

    let expected: String = (0..300)
        .map(|i| match i % 3 {
            0 => "Grace".to_string(),
            _ => i.to_string(),
        })
        .collect();
    assert!(is_valid_formula(&formula));
    assert_eq!(resolve_formula(&formula, &ledger), Ok(json!(expected)));

    let tree = parse(&formula).expect("bridge output parses");
    assert_eq!(rich_text::to_nodes(&tree, &registry).map(|nodes| nodes.len()), Ok(300));
}

#[test]
fn test_editor_nodes_json_shape() {
    let nodes: Vec<EditorNode> = serde_json::from_value(json!([
        {"type": "wrapper", "content": [{"type": "text", "text": "line one"}]},
        {"type": "wrapper"},
        {"type": "get-formula-component", "attrs": {"path": "page_parameter.id", "id": "x"}},
    ]))
    .expect("editor JSON deserializes");

    assert_eq!(
        rich_text::to_formula(&nodes, &standard_registry()),
        "concat(concat('line one', '\\n'), get('page_parameter.id'))"
    );
}
