use std::path::PathBuf;

// For argp::FromArgs
pub fn native_path(value: &str) -> Result<PathBuf, String> { Ok(PathBuf::from(value)) }
