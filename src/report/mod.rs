// Presentation and export of the results table.

pub mod csv_export;
pub mod table;

pub use csv_export::{read_results_csv, save_results_csv};
pub use table::{render_results, render_signals};
