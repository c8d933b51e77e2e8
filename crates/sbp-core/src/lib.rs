pub mod catalog;
pub mod error;
pub mod models;

pub use catalog::{ProductCatalog, SearchOutcome, StockInGateway};
pub use error::BackendError;
pub use models::{IntakeType, Product, StockInBatch, StockInItem, UnknownIntakeType};
