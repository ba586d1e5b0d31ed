pub mod csv;
pub mod workbook;

pub use workbook::{is_spreadsheet, load_workbook};
