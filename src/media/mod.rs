mod storage;

pub use storage::{MediaStorage, MediaStorageError, is_valid_file_name};
