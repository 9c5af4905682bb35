pub mod csv_table;
pub mod naming;
pub mod polars_utils;

pub use csv_table::{
    CsvTable, mangle_duplicate_headers, read_csv, read_csv_table, read_csv_table_from_reader,
    write_csv, write_csv_to,
};
pub use naming::{
    BLANK_COLUMN_PREFIX, blank_column_name, display_header, is_blank_column, output_filename,
};
pub use polars_utils::{
    any_to_string, column_names, column_position, column_values, filter_rows, format_numeric,
    frame_from_records, has_column, record_at, records, set_string_column, string_column,
    string_frame,
};
