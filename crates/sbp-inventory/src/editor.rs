use std::collections::HashMap;
use std::sync::Arc;

use chrono::NaiveDate;
use sbp_core::{IntakeType, ProductCatalog, StockInGateway};
use thiserror::Error;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::config::IntakeSettings;
use crate::form::{FormError, StockInForm};
use crate::line::{LineId, StockLine};

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum IntakeError {
    #[error("unknown stock line {0}")]
    UnknownLine(LineId),
}

/// Drives a [`StockInForm`] against the product catalogue and the batch
/// stock-in endpoint.
///
/// Each line owns at most one pending debounce timer. A fired timer hands the
/// search to a detached task and exits, so cancelling a timer never cancels a
/// request that is already on the wire; stale answers are dropped by the
/// line's sequence check instead.
pub struct StockInEditor<C, G>
where
    C: ProductCatalog + 'static,
    G: StockInGateway + 'static,
{
    form: Arc<RwLock<StockInForm>>,
    catalog: Arc<C>,
    gateway: Arc<G>,
    settings: IntakeSettings,
    timers: HashMap<LineId, JoinHandle<()>>,
}

impl<C, G> StockInEditor<C, G>
where
    C: ProductCatalog + 'static,
    G: StockInGateway + 'static,
{
    pub fn new(catalog: Arc<C>, gateway: Arc<G>, settings: IntakeSettings) -> Self {
        Self::with_form(catalog, gateway, settings, StockInForm::today())
    }

    pub fn with_form(
        catalog: Arc<C>,
        gateway: Arc<G>,
        settings: IntakeSettings,
        form: StockInForm,
    ) -> Self {
        Self {
            form: Arc::new(RwLock::new(form)),
            catalog,
            gateway,
            settings,
            timers: HashMap::new(),
        }
    }

    pub async fn snapshot(&self) -> StockInForm {
        self.form.read().await.clone()
    }

    pub async fn line(&self, id: LineId) -> Option<StockLine> {
        self.form.read().await.line(id).cloned()
    }

    pub async fn set_lokasi(&self, lokasi: impl Into<String>) {
        self.form.write().await.set_lokasi(lokasi);
    }

    pub async fn set_jenis_pemasukan(&self, jenis_pemasukan: IntakeType) {
        self.form.write().await.set_jenis_pemasukan(jenis_pemasukan);
    }

    pub async fn set_tanggal(&self, tanggal: NaiveDate) {
        self.form.write().await.set_tanggal(tanggal);
    }

    pub async fn add_line(&self) -> LineId {
        self.form.write().await.add_line()
    }

    /// Removes a line and its pending timer. The last line is never removed.
    pub async fn remove_line(&mut self, id: LineId) -> bool {
        let removed = self.form.write().await.remove_line(id);
        if removed {
            self.cancel_timer(id);
        }
        removed
    }

    /// Code keystroke: resets the line and (re)starts its debounce timer.
    pub async fn edit_code(&mut self, id: LineId, value: &str) -> Result<(), IntakeError> {
        let scheduled = self
            .form
            .write()
            .await
            .update_line(id, |line| line.edit_code(value))
            .ok_or(IntakeError::UnknownLine(id))?;

        self.cancel_timer(id);
        let Some((sequence, term)) = scheduled else {
            return Ok(());
        };

        let form = Arc::clone(&self.form);
        let catalog = Arc::clone(&self.catalog);
        let delay = self.settings.debounce;
        let limit = self.settings.search_limit;
        let timer = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            tokio::spawn(run_search(form, catalog, id, sequence, term, limit));
        });
        self.timers.insert(id, timer);

        Ok(())
    }

    /// Quantity keystroke. Returns whether the value was accepted.
    pub async fn edit_quantity(&self, id: LineId, value: &str) -> Result<bool, IntakeError> {
        self.form
            .write()
            .await
            .update_line(id, |line| line.set_quantity(value))
            .ok_or(IntakeError::UnknownLine(id))
    }

    /// Commits the suggestion at `index`. Returns whether one was selected.
    pub async fn select_suggestion(&self, id: LineId, index: usize) -> Result<bool, IntakeError> {
        self.form
            .write()
            .await
            .update_line(id, |line| line.select_suggestion(index))
            .ok_or(IntakeError::UnknownLine(id))
    }

    /// Code field lost focus: look the typed code up exactly unless the line
    /// is already resolved.
    pub async fn blur_code(&self, id: LineId) -> Result<(), IntakeError> {
        let lookup = self
            .form
            .write()
            .await
            .update_line(id, StockLine::begin_exact_lookup)
            .ok_or(IntakeError::UnknownLine(id))?;

        if let Some((sequence, code)) = lookup {
            tokio::spawn(run_exact_lookup(
                Arc::clone(&self.form),
                Arc::clone(&self.catalog),
                id,
                sequence,
                code,
            ));
        }

        Ok(())
    }

    /// Validates the form and posts the batch. On success the form is reset
    /// to a single empty line; on failure it stays as it was, ready to retry.
    pub async fn submit(&mut self) -> Result<(), FormError> {
        let batch = self.form.write().await.begin_submit()?;

        let result = self.gateway.submit_batch(&batch).await;
        if let Err(err) = &result {
            warn!("stock intake submission failed: {err}");
        }

        let succeeded = result.is_ok();
        let outcome = self.form.write().await.finish_submit(result);
        if succeeded {
            info!(
                lokasi = %batch.lokasi,
                items = batch.items.len(),
                "stock intake submitted"
            );
            self.cancel_all_timers();
        }

        outcome
    }

    fn cancel_timer(&mut self, id: LineId) {
        if let Some(timer) = self.timers.remove(&id) {
            timer.abort();
        }
    }

    fn cancel_all_timers(&mut self) {
        for (_, timer) in self.timers.drain() {
            timer.abort();
        }
    }
}

impl<C, G> Drop for StockInEditor<C, G>
where
    C: ProductCatalog + 'static,
    G: StockInGateway + 'static,
{
    fn drop(&mut self) {
        self.cancel_all_timers();
    }
}

async fn run_search<C: ProductCatalog>(
    form: Arc<RwLock<StockInForm>>,
    catalog: Arc<C>,
    id: LineId,
    scheduled: u64,
    term: String,
    limit: u32,
) {
    let started = form
        .write()
        .await
        .update_line(id, |line| line.begin_search(scheduled))
        .flatten();
    let Some(sequence) = started else {
        return;
    };

    debug!(%id, %term, sequence, "searching products for line");
    let result = catalog.search(&term, limit).await;
    if let Err(err) = &result {
        warn!(%id, %term, "product search failed: {err}");
    }

    let applied = form
        .write()
        .await
        .update_line(id, |line| line.finish_search(sequence, result))
        .unwrap_or(false);
    if !applied {
        debug!(%id, sequence, "dropping stale search response");
    }
}

async fn run_exact_lookup<C: ProductCatalog>(
    form: Arc<RwLock<StockInForm>>,
    catalog: Arc<C>,
    id: LineId,
    sequence: u64,
    code: String,
) {
    debug!(%id, %code, "looking up product code");
    let result = catalog.lookup_exact(&code).await;
    if let Err(err) = &result {
        warn!(%id, %code, "product lookup failed: {err}");
    }

    let applied = form
        .write()
        .await
        .update_line(id, |line| line.finish_exact_lookup(sequence, result))
        .unwrap_or(false);
    if !applied {
        debug!(%id, sequence, "dropping stale lookup response");
    }
}
