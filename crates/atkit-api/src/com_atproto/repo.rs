pub mod list_records;
