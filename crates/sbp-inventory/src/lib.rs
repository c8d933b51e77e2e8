pub mod config;
pub mod editor;
pub mod form;
pub mod line;
pub mod money;
pub mod quantity;

pub use config::IntakeSettings;
pub use editor::{IntakeError, StockInEditor};
pub use form::{ErrorScope, FormError, StockInForm};
pub use line::{LineId, LineStatus, StockLine};
pub use money::format_rupiah;
pub use quantity::{is_quantity_input, parse_quantity};
