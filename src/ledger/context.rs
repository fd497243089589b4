//! Application context the ledger evaluates against

use super::error::{LedgerError, LedgerResult};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Identifier of a page
pub type PageId = i64;

/// Rendering mode of the application
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// The page is being edited in the builder
    #[default]
    Editing,
    /// The page is previewed from the builder
    Preview,
    /// The page is published
    Public,
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Editing => write!(f, "editing"),
            Mode::Preview => write!(f, "preview"),
            Mode::Public => write!(f, "public"),
        }
    }
}

/// Type of a page path parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PathParamType {
    /// Free text
    Text,
    /// Integer
    Numeric,
}

impl PathParamType {
    /// Placeholder value used while editing, when no real parameter exists
    pub fn placeholder(&self) -> Value {
        match self {
            PathParamType::Text => Value::String("test".to_string()),
            PathParamType::Numeric => Value::from(1),
        }
    }
}

/// A parameter declared in a page path
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathParam {
    /// Parameter name
    pub name: String,
    /// Parameter type
    #[serde(rename = "type")]
    pub param_type: PathParamType,
}

/// A page of an application
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
    /// Page id
    pub id: PageId,
    /// Page name
    pub name: String,
    /// Page path, e.g. `/product/:id`
    pub path: String,
    /// Parameters declared in the path
    #[serde(default)]
    pub path_params: Vec<PathParam>,
}

/// An application with its pages
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Application {
    /// Application id
    pub id: i64,
    /// Application name
    pub name: String,
    /// Pages of the application
    #[serde(default)]
    pub pages: Vec<Page>,
}

impl Application {
    /// Find a page by id
    pub fn page(&self, page_id: PageId) -> Option<&Page> {
        self.pages.iter().find(|page| page.id == page_id)
    }
}

/// Everything providers may read about where a formula is evaluated
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApplicationContext {
    /// Current application
    pub application: Application,
    /// Current page
    pub page: Page,
    /// Rendering mode
    #[serde(default)]
    pub mode: Mode,
    /// Actual page parameter values, outside of editing mode
    #[serde(default)]
    pub page_params_value: Map<String, Value>,
}

impl ApplicationContext {
    /// Create a context for a page
    pub fn new(application: Application, page: Page, mode: Mode) -> Self {
        Self {
            application,
            page,
            mode,
            page_params_value: Map::new(),
        }
    }

    /// Create a context for the page `page_id` of `application`
    pub fn for_page(application: Application, page_id: PageId, mode: Mode) -> LedgerResult<Self> {
        let page = application
            .page(page_id)
            .cloned()
            .ok_or_else(|| LedgerError::PageNotFound {
                page_id,
                application_id: application.id,
            })?;
        Ok(Self::new(application, page, mode))
    }

    /// Set the actual page parameter values
    pub fn with_page_params(mut self, params: Map<String, Value>) -> Self {
        self.page_params_value = params;
        self
    }
}
