pub mod output;

pub use output::{print_csv_rows, print_json, print_table, OutputFormat, Report};
