//! Formula autocompletion
//!
//! Given a formula, a cursor position and the available function and field
//! names, [`Autocompleter::filter`] narrows the candidates down to what fits at
//! the cursor and [`Autocompleter::accept`] rewrites the formula when one is
//! chosen.
//!
//! Cursor positions are character offsets, as reported by text inputs.

#![warn(missing_docs)]

mod context;

use crate::parser::escape;
use crate::parser::tokenizer::is_identifier_continue;
use context::{CursorContext, LiteralSpan, detect};

/// Configuration for [`Autocompleter`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AutocompleteConfig {
    /// Functions whose single argument is a field name
    pub lookup_functions: Vec<String>,
}

impl Default for AutocompleteConfig {
    fn default() -> Self {
        Self {
            lookup_functions: vec!["field".to_string(), "get".to_string()],
        }
    }
}

impl AutocompleteConfig {
    /// Create a default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the lookup functions
    pub fn with_lookup_functions<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.lookup_functions = names.into_iter().map(Into::into).collect();
        self
    }
}

/// Candidates that fit the cursor position
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterResult {
    /// Matching function names
    pub functions: Vec<String>,
    /// Matching field names
    pub fields: Vec<String>,
    /// Whether the lists were narrowed down by the cursor context
    pub filtered: bool,
}

/// A candidate picked by the user
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Candidate {
    /// A function name
    Function(String),
    /// A field name
    Field(String),
}

impl Candidate {
    /// Candidate text
    pub fn text(&self) -> &str {
        match self {
            Candidate::Function(name) | Candidate::Field(name) => name,
        }
    }
}

/// Formula text and cursor after a completion
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Completion {
    /// Rewritten formula
    pub formula: String,
    /// Cursor position in characters
    pub cursor: usize,
}

impl Completion {
    fn unchanged(formula: &str, cursor: usize) -> Self {
        Self {
            formula: formula.to_string(),
            cursor,
        }
    }

    fn from_bytes(formula: String, byte_cursor: usize) -> Self {
        let cursor = formula[..byte_cursor].chars().count();
        Self { formula, cursor }
    }
}

/// Cursor-aware candidate filtering and formula rewriting
#[derive(Debug, Clone, Default)]
pub struct Autocompleter {
    config: AutocompleteConfig,
}

impl Autocompleter {
    /// Create an autocompleter
    pub fn new(config: AutocompleteConfig) -> Self {
        Self { config }
    }

    /// Configuration
    pub fn config(&self) -> &AutocompleteConfig {
        &self.config
    }

    fn is_lookup(&self, name: &str) -> bool {
        self.config.lookup_functions.iter().any(|f| f == name)
    }

    fn context(&self, formula: &str, cursor: usize) -> (CursorContext, usize) {
        let byte_cursor = byte_offset(formula, cursor);
        let context = detect(formula, byte_cursor, &self.config.lookup_functions);
        log::trace!("Autocomplete context at {cursor}: {context:?}");
        (context, byte_cursor)
    }

    /// Narrow `functions` and `fields` to what fits at `cursor`
    ///
    /// Functions match the typed identifier by case-sensitive prefix. Fields
    /// match the text typed in a lookup argument by case-insensitive prefix.
    /// Outside both contexts every candidate is returned unfiltered.
    pub fn filter<F, G>(&self, formula: &str, cursor: usize, functions: &[F], fields: &[G]) -> FilterResult
    where
        F: AsRef<str>,
        G: AsRef<str>,
    {
        let (context, byte_cursor) = self.context(formula, cursor);
        match context {
            CursorContext::Function { start, .. } => {
                let typed = &formula[start..byte_cursor];
                FilterResult {
                    functions: matching(functions, |name| name.starts_with(typed)),
                    fields: Vec::new(),
                    filtered: true,
                }
            }
            CursorContext::Field { literal } => {
                let typed = literal
                    .map(|l| crate::parser::unescape(&formula[l.content_start..byte_cursor]))
                    .unwrap_or_default()
                    .to_lowercase();
                FilterResult {
                    functions: Vec::new(),
                    fields: matching(fields, |name| name.to_lowercase().starts_with(&typed)),
                    filtered: true,
                }
            }
            CursorContext::Unstructured => FilterResult {
                functions: matching(functions, |_| true),
                fields: matching(fields, |_| true),
                filtered: false,
            },
        }
    }

    /// Rewrite `formula` for the chosen candidate
    ///
    /// A function replaces the identifier being typed with `name(`, placing
    /// the cursor inside the parentheses, or inside quotes for lookup
    /// functions. A field replaces the lookup argument with a quoted literal
    /// and closes the call. Outside both contexts the candidate text is
    /// inserted at the cursor. A candidate of the wrong kind for the context
    /// leaves the formula unchanged.
    pub fn accept(&self, formula: &str, cursor: usize, candidate: &Candidate) -> Completion {
        let (context, byte_cursor) = self.context(formula, cursor);
        match (context, candidate) {
            (
                CursorContext::Function {
                    start,
                    mid_identifier,
                },
                Candidate::Function(name),
            ) => self.accept_function(formula, start, byte_cursor, mid_identifier, name),
            (CursorContext::Field { literal }, Candidate::Field(field)) => {
                accept_field(formula, byte_cursor, literal, field)
                    .unwrap_or_else(|| Completion::unchanged(formula, cursor))
            }
            (CursorContext::Unstructured, candidate) => {
                let mut rewritten = formula.to_string();
                rewritten.insert_str(byte_cursor, candidate.text());
                Completion::from_bytes(rewritten, byte_cursor + candidate.text().len())
            }
            _ => Completion::unchanged(formula, cursor),
        }
    }

    /// Accept the first candidate fitting the cursor context
    ///
    /// `functions` and `fields` are normally the lists returned by
    /// [`Autocompleter::filter`]. Unstructured contexts are left unchanged.
    pub fn autocomplete<F, G>(&self, formula: &str, cursor: usize, functions: &[F], fields: &[G]) -> Completion
    where
        F: AsRef<str>,
        G: AsRef<str>,
    {
        let (context, _) = self.context(formula, cursor);
        let candidate = match context {
            CursorContext::Function { .. } => functions
                .first()
                .map(|name| Candidate::Function(name.as_ref().to_string())),
            CursorContext::Field { .. } => fields
                .first()
                .map(|name| Candidate::Field(name.as_ref().to_string())),
            CursorContext::Unstructured => None,
        };

        match candidate {
            Some(candidate) => self.accept(formula, cursor, &candidate),
            None => Completion::unchanged(formula, cursor),
        }
    }

    fn accept_function(
        &self,
        formula: &str,
        start: usize,
        byte_cursor: usize,
        mid_identifier: bool,
        name: &str,
    ) -> Completion {
        let mut rewritten = String::with_capacity(formula.len() + name.len() + 4);
        rewritten.push_str(&formula[..start]);
        rewritten.push_str(name);
        rewritten.push('(');
        let new_cursor = if self.is_lookup(name) {
            rewritten.push('\'');
            let inside = rewritten.len();
            rewritten.push('\'');
            inside
        } else {
            rewritten.len()
        };

        let after = &formula[byte_cursor..];
        if !mid_identifier && !after.starts_with(is_identifier_continue) {
            rewritten.push(')');
        }
        rewritten.push_str(after);
        Completion::from_bytes(rewritten, new_cursor)
    }
}

fn accept_field(formula: &str, byte_cursor: usize, literal: Option<LiteralSpan>, field: &str) -> Option<Completion> {
    let (mut rewritten, rest) = match literal {
        Some(literal) => {
            let untouched_text_follows = match literal.closing {
                Some(closing) => byte_cursor != closing,
                None => byte_cursor != formula.len(),
            };
            let nothing_typed = literal.closing.is_none() && byte_cursor == literal.content_start;
            if untouched_text_follows || nothing_typed {
                return None;
            }

            let mut rewritten = formula[..literal.content_start].to_string();
            rewritten.push_str(&escape(field, literal.quote));
            rewritten.push(literal.quote);
            let rest = literal
                .closing
                .map_or("", |closing| &formula[closing + literal.quote.len_utf8()..]);
            (rewritten, rest)
        }
        None => {
            let mut rewritten = formula[..byte_cursor].to_string();
            rewritten.push_str(&crate::parser::quote_string(field, '\''));
            (rewritten, &formula[byte_cursor..])
        }
    };

    rewritten.push(')');
    let new_cursor = rewritten.len();
    rewritten.push_str(rest.strip_prefix(')').unwrap_or(rest));
    Some(Completion::from_bytes(rewritten, new_cursor))
}

fn matching<S: AsRef<str>>(names: &[S], predicate: impl Fn(&str) -> bool) -> Vec<String> {
    names
        .iter()
        .map(AsRef::as_ref)
        .filter(|name| predicate(name))
        .map(str::to_string)
        .collect()
}

/// Byte offset of the character offset `cursor`, clamped to the end of `text`
fn byte_offset(text: &str, cursor: usize) -> usize {
    text.char_indices()
        .nth(cursor)
        .map_or(text.len(), |(offset, _)| offset)
}

/// Filter candidates with the default configuration
pub fn filter_candidates<F, G>(formula: &str, cursor: usize, functions: &[F], fields: &[G]) -> FilterResult
where
    F: AsRef<str>,
    G: AsRef<str>,
{
    Autocompleter::default().filter(formula, cursor, functions, fields)
}

/// Accept the first fitting candidate with the default configuration
pub fn autocomplete_formula<F, G>(formula: &str, cursor: usize, functions: &[F], fields: &[G]) -> Completion
where
    F: AsRef<str>,
    G: AsRef<str>,
{
    Autocompleter::default().autocomplete(formula, cursor, functions, fields)
}
