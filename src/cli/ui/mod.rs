pub mod formatting;
pub mod table_renderer;

pub use formatting::{format_amount, format_date, format_percent};
pub use table_renderer::{Alignment, Table, TableColumn};
