mod test_utils;

mod api;
mod file_storage;
mod list;
mod list_fault;
mod save;
mod save_invalid_signature;
