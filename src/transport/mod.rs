/// Filesystem JSONL reading and atomic publishing.
pub mod fs;
