use async_trait::async_trait;

use crate::error::BackendError;
use crate::models::{Product, StockInBatch};

/// Result of a prefix search. An empty match is not an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchOutcome {
    Found(Vec<Product>),
    NotFound,
}

impl SearchOutcome {
    pub fn from_candidates(candidates: Vec<Product>) -> Self {
        if candidates.is_empty() {
            SearchOutcome::NotFound
        } else {
            SearchOutcome::Found(candidates)
        }
    }

    pub fn into_candidates(self) -> Vec<Product> {
        match self {
            SearchOutcome::Found(candidates) => candidates,
            SearchOutcome::NotFound => Vec::new(),
        }
    }
}

#[async_trait]
pub trait ProductCatalog: Send + Sync {
    async fn search(&self, term: &str, limit: u32) -> Result<SearchOutcome, BackendError>;
    async fn lookup_exact(&self, code: &str) -> Result<Option<Product>, BackendError>;
}

#[async_trait]
pub trait StockInGateway: Send + Sync {
    async fn submit_batch(&self, batch: &StockInBatch) -> Result<(), BackendError>;
}
