/// Line-delimited JSON file-backed corpus.
pub mod jsonl_source;
