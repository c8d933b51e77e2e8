use rust_decimal::Decimal;
use sbp_core::{BackendError, Product, SearchOutcome, StockInItem};
use uuid::Uuid;

use crate::quantity::{is_quantity_input, parse_quantity};

pub type LineId = Uuid;

pub const NOT_FOUND_MESSAGE: &str = "Product not found.";
pub const SEARCH_FAILED_MESSAGE: &str = "Failed to search products.";
pub const LOOKUP_FAILED_MESSAGE: &str = "Failed to fetch product.";
pub const CODE_REQUIRED_MESSAGE: &str = "Product code is required.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineStatus {
    Idle,
    Searching,
    Suggesting,
    Error,
    Resolved,
}

/// One product + quantity row of a stock intake.
///
/// Every request issued for a row is tagged with the row's sequence number.
/// Code edits, request starts and selections bump the number, so a response
/// is applied only while it is still the latest thing the row asked for.
#[derive(Debug, Clone, PartialEq)]
pub struct StockLine {
    id: LineId,
    kode: String,
    qty: String,
    product: Option<Product>,
    is_fetching: bool,
    error: Option<String>,
    suggestions: Vec<Product>,
    show_suggestions: bool,
    sequence: u64,
}

impl StockLine {
    pub fn empty() -> Self {
        Self {
            id: Uuid::new_v4(),
            kode: String::new(),
            qty: String::new(),
            product: None,
            is_fetching: false,
            error: None,
            suggestions: Vec::new(),
            show_suggestions: false,
            sequence: 0,
        }
    }

    pub fn id(&self) -> LineId {
        self.id
    }

    pub fn kode(&self) -> &str {
        &self.kode
    }

    pub fn qty(&self) -> &str {
        &self.qty
    }

    pub fn product(&self) -> Option<&Product> {
        self.product.as_ref()
    }

    pub fn is_fetching(&self) -> bool {
        self.is_fetching
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn suggestions(&self) -> &[Product] {
        &self.suggestions
    }

    pub fn show_suggestions(&self) -> bool {
        self.show_suggestions
    }

    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    pub fn status(&self) -> LineStatus {
        if self.is_fetching {
            LineStatus::Searching
        } else if self.error.is_some() {
            LineStatus::Error
        } else if self.product.is_some() {
            LineStatus::Resolved
        } else if self.show_suggestions && !self.suggestions.is_empty() {
            LineStatus::Suggesting
        } else {
            LineStatus::Idle
        }
    }

    /// Stores the upper-cased code and drops the resolved product and error.
    /// Returns the trimmed search term and the sequence number the search
    /// must be started with, or `None` when the code is blank.
    pub fn edit_code(&mut self, value: &str) -> Option<(u64, String)> {
        self.kode = value.to_uppercase();
        self.product = None;
        self.error = None;
        self.sequence += 1;

        let term = self.kode.trim();
        if term.is_empty() {
            self.suggestions.clear();
            self.show_suggestions = false;
            self.is_fetching = false;
            return None;
        }

        self.is_fetching = true;
        Some((self.sequence, term.to_string()))
    }

    /// Starts the search scheduled at `scheduled`. Returns the request's
    /// sequence number, or `None` if the row moved on since scheduling.
    pub fn begin_search(&mut self, scheduled: u64) -> Option<u64> {
        if scheduled != self.sequence {
            return None;
        }

        self.sequence += 1;
        self.is_fetching = true;
        self.show_suggestions = true;
        self.error = None;
        Some(self.sequence)
    }

    /// Applies a search response. Returns `false` when it was stale.
    pub fn finish_search(
        &mut self,
        sequence: u64,
        result: Result<SearchOutcome, BackendError>,
    ) -> bool {
        if sequence != self.sequence {
            return false;
        }

        self.is_fetching = false;
        match result {
            Ok(SearchOutcome::Found(candidates)) => {
                self.suggestions = candidates;
                self.show_suggestions = true;
                self.error = None;
            }
            Ok(SearchOutcome::NotFound) => {
                self.suggestions.clear();
                self.show_suggestions = false;
                self.error = Some(NOT_FOUND_MESSAGE.to_string());
            }
            Err(_) => {
                self.suggestions.clear();
                self.show_suggestions = false;
                self.error = Some(SEARCH_FAILED_MESSAGE.to_string());
            }
        }

        true
    }

    /// Commits the suggestion at `index`. Returns `false` if there is none.
    pub fn select_suggestion(&mut self, index: usize) -> bool {
        match self.suggestions.get(index).cloned() {
            Some(product) => {
                self.resolve(product);
                true
            }
            None => false,
        }
    }

    pub fn resolve(&mut self, product: Product) {
        self.kode = product.kode.to_uppercase();
        self.product = Some(product);
        self.suggestions.clear();
        self.show_suggestions = false;
        self.is_fetching = false;
        self.error = None;
        self.sequence += 1;
    }

    /// Blur fallback. Returns the code to look up exactly and the request's
    /// sequence number; `None` when the row is already resolved or blank.
    pub fn begin_exact_lookup(&mut self) -> Option<(u64, String)> {
        if self.product.is_some() {
            return None;
        }

        let code = self.kode.trim().to_string();
        if code.is_empty() {
            self.error = Some(CODE_REQUIRED_MESSAGE.to_string());
            return None;
        }

        self.sequence += 1;
        self.is_fetching = true;
        self.error = None;
        self.show_suggestions = false;
        Some((self.sequence, code))
    }

    /// Applies an exact lookup response. Returns `false` when it was stale.
    pub fn finish_exact_lookup(
        &mut self,
        sequence: u64,
        result: Result<Option<Product>, BackendError>,
    ) -> bool {
        if sequence != self.sequence {
            return false;
        }

        self.is_fetching = false;
        self.suggestions.clear();
        self.show_suggestions = false;
        match result {
            Ok(Some(product)) => {
                self.product = Some(product);
                self.error = None;
            }
            Ok(None) => {
                self.product = None;
                self.error = Some(NOT_FOUND_MESSAGE.to_string());
            }
            Err(_) => {
                self.product = None;
                self.error = Some(LOOKUP_FAILED_MESSAGE.to_string());
            }
        }

        true
    }

    /// Stores `value` if it is a valid quantity keystroke; otherwise ignores it.
    pub fn set_quantity(&mut self, value: &str) -> bool {
        if !is_quantity_input(value) {
            return false;
        }

        self.qty = value.to_string();
        true
    }

    pub fn quantity(&self) -> Option<Decimal> {
        parse_quantity(&self.qty)
    }

    /// Quantity × unit price for a resolved row with a positive quantity.
    /// `None` as well when the product does not fit in a `Decimal`.
    pub fn subtotal(&self) -> Option<Decimal> {
        let product = self.product.as_ref()?;
        let quantity = self.quantity()?;
        quantity.checked_mul(Decimal::from(product.harga_idr))
    }

    pub fn to_item(&self) -> Option<StockInItem> {
        let product = self.product.as_ref()?;
        let qty = self.quantity()?;
        Some(StockInItem {
            product_id: product.id,
            product_kode: product.kode.clone(),
            qty,
            satuan: product.satuan.clone(),
        })
    }
}

impl Default for StockLine {
    fn default() -> Self {
        Self::empty()
    }
}
