pub mod csv_conversion;
