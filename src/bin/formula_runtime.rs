//! Command-line interface for the formula runtime
//!
//! Evaluates, checks, autocompletes and converts formulas.

use anyhow::{Context, Result, bail};
use async_trait::async_trait;
use clap::{Parser, Subcommand};
use formula_runtime::ast::FunctionNameCollector;
use formula_runtime::autocomplete::Autocompleter;
use formula_runtime::ledger::{
    Application, ApplicationContext, DataLedger, DataProvider, Mode, Page, PageParameterProvider,
};
use formula_runtime::registry::standard_registry;
use formula_runtime::rich_text::{self, EditorNode};
use formula_runtime::value_ext::ValueExt;
use formula_runtime::{FormulaEngine, parse};
use serde_json::{Map, Value};
use std::fs;
use std::io::{self, Read};
use std::process;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "formula-runtime")]
#[command(about = "Evaluate, check, autocomplete and convert page formulas")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Evaluate a formula against JSON data
    Eval {
        /// Formula to evaluate
        formula: String,
        /// JSON object whose top-level keys become data providers (reads stdin if "-")
        #[arg(short, long)]
        file: Option<String>,
        /// Page parameter as name=value, available as page_parameter.<name>
        #[arg(short = 'p', long = "param")]
        params: Vec<String>,
        /// Pretty-print JSON output
        #[arg(long)]
        pretty: bool,
    },
    /// Check formula syntax
    Check {
        /// Formula to check
        formula: String,
        /// Suppress informational messages
        #[arg(short, long)]
        quiet: bool,
    },
    /// Autocomplete a formula at a cursor position
    Complete {
        /// Formula being typed
        formula: String,
        /// Cursor position in characters (defaults to the end)
        #[arg(short, long)]
        cursor: Option<usize>,
        /// Field names to offer
        #[arg(long = "field")]
        fields: Vec<String>,
    },
    /// Convert a formula into rich-text editor nodes
    ToNodes {
        /// Formula to convert
        formula: String,
        /// Pretty-print JSON output
        #[arg(long)]
        pretty: bool,
    },
    /// Convert rich-text editor nodes (JSON array) into a formula
    FromNodes {
        /// File holding the nodes (reads stdin if not provided)
        #[arg(short, long)]
        file: Option<String>,
    },
}

/// Serves one top-level key of the input JSON
struct JsonProvider {
    name: String,
    data: Value,
}

#[async_trait]
impl DataProvider for JsonProvider {
    fn name(&self) -> &str {
        &self.name
    }

    fn data_chunk(&self, _ledger: &DataLedger, path: &[String]) -> Option<Value> {
        self.data.get_path(path).cloned()
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    human_panic::setup_panic!();
    env_logger::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Eval {
            formula,
            file,
            params,
            pretty,
        } => handle_eval(&formula, file.as_deref(), &params, pretty).await,
        Commands::Check { formula, quiet } => {
            handle_check(&formula, quiet);
            Ok(())
        }
        Commands::Complete {
            formula,
            cursor,
            fields,
        } => handle_complete(&formula, cursor, &fields),
        Commands::ToNodes { formula, pretty } => handle_to_nodes(&formula, pretty),
        Commands::FromNodes { file } => handle_from_nodes(file.as_deref()),
    }
}

fn read_input(file: Option<&str>) -> Result<String> {
    match file {
        Some(path) if path != "-" => {
            fs::read_to_string(path).with_context(|| format!("Error reading file '{path}'"))
        }
        _ => {
            let mut buffer = String::new();
            io::stdin()
                .read_to_string(&mut buffer)
                .context("Error reading from stdin")?;
            Ok(buffer)
        }
    }
}

fn print_json(value: &impl serde::Serialize, pretty: bool) -> Result<()> {
    let output = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    println!("{output}");
    Ok(())
}

fn parse_param(param: &str) -> Result<(String, Value)> {
    let Some((name, raw)) = param.split_once('=') else {
        bail!("Invalid page parameter '{param}', expected name=value");
    };
    let value = serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()));
    Ok((name.to_string(), value))
}

async fn handle_eval(formula: &str, file: Option<&str>, params: &[String], pretty: bool) -> Result<()> {
    let mut providers: Vec<Arc<dyn DataProvider>> = vec![Arc::new(PageParameterProvider::new())];
    if let Some(file) = file {
        let data: Value = serde_json::from_str(&read_input(Some(file))?).context("Error parsing JSON data")?;
        let Value::Object(data) = data else {
            bail!("JSON data must be an object");
        };
        providers.extend(data.into_iter().map(|(name, data)| {
            Arc::new(JsonProvider { name, data }) as Arc<dyn DataProvider>
        }));
    }

    let page_params = params
        .iter()
        .map(|param| parse_param(param))
        .collect::<Result<Map<String, Value>>>()?;
    let page = Page {
        id: 1,
        name: "cli".to_string(),
        path: "/".to_string(),
        path_params: Vec::new(),
    };
    let application = Application {
        id: 1,
        name: "cli".to_string(),
        pages: vec![page.clone()],
    };
    let context = ApplicationContext::new(application, page, Mode::Public).with_page_params(page_params);

    let ledger = DataLedger::new(providers, context);
    ledger.init().await?;

    let engine = FormulaEngine::new();
    let result = engine
        .resolve_formula(formula, &ledger)
        .with_context(|| format!("Error evaluating formula '{formula}'"))?;
    print_json(&result, pretty)
}

fn handle_check(formula: &str, quiet: bool) {
    match parse(formula) {
        Ok(expression) => {
            if quiet {
                println!("VALID");
            } else {
                println!("✓ Formula is valid");
                println!("Formula: {formula}");
                println!("Normalized: {expression}");

                let registry = standard_registry();
                let unknown: Vec<_> = FunctionNameCollector::collect(&expression)
                    .into_iter()
                    .filter(|name| !registry.contains(name))
                    .collect();
                if !unknown.is_empty() {
                    println!("Warning: unknown functions: {}", unknown.join(", "));
                }
            }
        }
        Err(_) if formula.trim().is_empty() => println!("VALID"),
        Err(e) => {
            if quiet {
                eprintln!("INVALID");
            } else {
                eprintln!("✗ Invalid formula: {e}");
                eprintln!("Formula: {formula}");
            }
            process::exit(1);
        }
    }
}

fn handle_complete(formula: &str, cursor: Option<usize>, fields: &[String]) -> Result<()> {
    let length = formula.chars().count();
    let cursor = cursor.unwrap_or(length);
    if cursor > length {
        bail!("Cursor {cursor} is past the end of the formula ({length} characters)");
    }

    let registry = standard_registry();
    let functions = registry.function_names();
    let autocompleter = Autocompleter::default();
    let filtered = autocompleter.filter(formula, cursor, &functions, fields);
    let completion = autocompleter.autocomplete(formula, cursor, &filtered.functions, &filtered.fields);

    let output = serde_json::json!({
        "functions": filtered.functions,
        "fields": filtered.fields,
        "filtered": filtered.filtered,
        "formula": completion.formula,
        "cursor": completion.cursor,
    });
    print_json(&output, true)
}

fn handle_to_nodes(formula: &str, pretty: bool) -> Result<()> {
    let expression = parse(formula).with_context(|| format!("Error parsing formula '{formula}'"))?;
    let nodes = rich_text::to_nodes(&expression, &standard_registry())?;
    print_json(&nodes, pretty)
}

fn handle_from_nodes(file: Option<&str>) -> Result<()> {
    let nodes: Vec<EditorNode> =
        serde_json::from_str(&read_input(file)?).context("Error parsing editor nodes")?;
    println!("{}", rich_text::to_formula(&nodes, &standard_registry()));
    Ok(())
}
