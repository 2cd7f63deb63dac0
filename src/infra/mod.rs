pub mod fallback;
pub mod fs_copy;
pub mod sync_marker;
