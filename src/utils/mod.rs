pub mod file_operations;

pub use file_operations::{
    clear_directory, copy_file_preserving_times, list_files_with_extensions, matches_extensions,
    metadata_to_datetime, paths_overlap, resolve_path, sha256_file,
};
