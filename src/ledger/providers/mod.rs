//! Built-in data providers

mod data_source;
mod page_parameter;

pub use data_source::DataSourceProvider;
pub use page_parameter::PageParameterProvider;
