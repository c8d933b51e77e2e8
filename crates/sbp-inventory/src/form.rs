use chrono::{Local, NaiveDate};
use rust_decimal::Decimal;
use sbp_core::{BackendError, IntakeType, StockInBatch, StockInItem};
use thiserror::Error;

use crate::line::{LineId, StockLine};

pub const SAVE_FAILED_MESSAGE: &str = "Failed to save stock intake.";
pub const SAVED_MESSAGE: &str = "Stock intake saved to stock movements and stock levels.";

/// Part of the form an error belongs to, so the UI can scroll to it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorScope {
    Location,
    Lines,
    Form,
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FormError {
    #[error("Storage location is required.")]
    MissingLocation,

    #[error("At least one line needs a detected product and a quantity above zero.")]
    NoValidLines,

    #[error("A submission is already in progress.")]
    InProgress,

    #[error("{0}")]
    Rejected(String),

    #[error("An error occurred while saving.")]
    Transport,
}

impl FormError {
    pub fn scope(&self) -> ErrorScope {
        match self {
            FormError::MissingLocation => ErrorScope::Location,
            FormError::NoValidLines => ErrorScope::Lines,
            FormError::InProgress | FormError::Rejected(_) | FormError::Transport => {
                ErrorScope::Form
            }
        }
    }

    pub fn from_backend(err: &BackendError) -> Self {
        match err {
            BackendError::Transport(_) => FormError::Transport,
            _ => FormError::Rejected(
                err.server_message()
                    .unwrap_or(SAVE_FAILED_MESSAGE)
                    .to_string(),
            ),
        }
    }
}

/// Stock intake form: header fields plus an ordered, never empty set of lines.
#[derive(Debug, Clone, PartialEq)]
pub struct StockInForm {
    lokasi: String,
    jenis_pemasukan: IntakeType,
    tanggal: NaiveDate,
    lines: Vec<StockLine>,
    error: Option<FormError>,
    success: Option<String>,
    submitting: bool,
}

impl StockInForm {
    pub fn new(tanggal: NaiveDate) -> Self {
        Self {
            lokasi: String::new(),
            jenis_pemasukan: IntakeType::default(),
            tanggal,
            lines: vec![StockLine::empty()],
            error: None,
            success: None,
            submitting: false,
        }
    }

    pub fn today() -> Self {
        Self::new(Local::now().date_naive())
    }

    pub fn lokasi(&self) -> &str {
        &self.lokasi
    }

    pub fn set_lokasi(&mut self, lokasi: impl Into<String>) {
        self.lokasi = lokasi.into();
    }

    pub fn jenis_pemasukan(&self) -> IntakeType {
        self.jenis_pemasukan
    }

    pub fn set_jenis_pemasukan(&mut self, jenis_pemasukan: IntakeType) {
        self.jenis_pemasukan = jenis_pemasukan;
    }

    pub fn tanggal(&self) -> NaiveDate {
        self.tanggal
    }

    pub fn set_tanggal(&mut self, tanggal: NaiveDate) {
        self.tanggal = tanggal;
    }

    pub fn lines(&self) -> &[StockLine] {
        &self.lines
    }

    pub fn line(&self, id: LineId) -> Option<&StockLine> {
        self.lines.iter().find(|line| line.id() == id)
    }

    pub fn line_ids(&self) -> Vec<LineId> {
        self.lines.iter().map(StockLine::id).collect()
    }

    /// Applies `update` to the line with `id`; `None` if there is no such line.
    pub fn update_line<R>(
        &mut self,
        id: LineId,
        update: impl FnOnce(&mut StockLine) -> R,
    ) -> Option<R> {
        self.lines
            .iter_mut()
            .find(|line| line.id() == id)
            .map(update)
    }

    pub fn add_line(&mut self) -> LineId {
        let line = StockLine::empty();
        let id = line.id();
        self.lines.push(line);
        self.error = None;
        id
    }

    /// Removes a line unless it is the last one.
    pub fn remove_line(&mut self, id: LineId) -> bool {
        if self.lines.len() == 1 {
            return false;
        }

        let before = self.lines.len();
        self.lines.retain(|line| line.id() != id);
        self.lines.len() != before
    }

    pub fn error(&self) -> Option<&FormError> {
        self.error.as_ref()
    }

    pub fn success(&self) -> Option<&str> {
        self.success.as_deref()
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    /// Sum of quantity × unit price over resolved lines with a positive
    /// quantity, or `None` if the total does not fit in a `Decimal`.
    pub fn grand_total(&self) -> Option<Decimal> {
        self.lines
            .iter()
            .filter_map(|line| Some((line.product()?.harga_idr, line.quantity()?)))
            .try_fold(Decimal::ZERO, |total, (harga_idr, quantity)| {
                total.checked_add(quantity.checked_mul(Decimal::from(harga_idr))?)
            })
    }

    pub fn valid_items(&self) -> Vec<StockInItem> {
        self.lines.iter().filter_map(StockLine::to_item).collect()
    }

    /// Checks the location first, then the lines, and builds the payload.
    pub fn build_batch(&self) -> Result<StockInBatch, FormError> {
        let lokasi = self.lokasi.trim();
        if lokasi.is_empty() {
            return Err(FormError::MissingLocation);
        }

        let items = self.valid_items();
        if items.is_empty() {
            return Err(FormError::NoValidLines);
        }

        Ok(StockInBatch {
            tanggal: self.tanggal,
            lokasi: lokasi.to_string(),
            jenis_pemasukan: self.jenis_pemasukan,
            items,
        })
    }

    /// Clears feedback and marks the form as submitting. Validation failures
    /// are recorded on the form and returned.
    pub fn begin_submit(&mut self) -> Result<StockInBatch, FormError> {
        if self.submitting {
            return Err(FormError::InProgress);
        }

        self.error = None;
        self.success = None;

        match self.build_batch() {
            Ok(batch) => {
                self.submitting = true;
                Ok(batch)
            }
            Err(err) => {
                self.error = Some(err.clone());
                Err(err)
            }
        }
    }

    pub fn finish_submit(&mut self, result: Result<(), BackendError>) -> Result<(), FormError> {
        self.submitting = false;

        match result {
            Ok(()) => {
                self.lines = vec![StockLine::empty()];
                self.lokasi.clear();
                self.jenis_pemasukan = IntakeType::default();
                self.error = None;
                self.success = Some(SAVED_MESSAGE.to_string());
                Ok(())
            }
            Err(err) => {
                let err = FormError::from_backend(&err);
                self.error = Some(err.clone());
                Err(err)
            }
        }
    }
}
