//! Data ledger and data providers
//!
//! Formulas read data through dotted paths such as
//! `data_source.products.rows.0.name`. The first segment names a
//! [`DataProvider`]; the [`DataLedger`] routes the rest of the path to it.

#![warn(missing_docs)]

mod context;
mod data_ledger;
mod error;
mod provider;
pub mod providers;

pub use context::{Application, ApplicationContext, Mode, Page, PageId, PathParam, PathParamType};
pub use data_ledger::{DataLedger, PathSegments, to_path};
pub use error::{LedgerError, LedgerResult};
pub use provider::DataProvider;
pub use providers::{DataSourceProvider, PageParameterProvider};
