//! GitHub Actions workflow commands. These are read by the runner from stdout.

/// Redact `value` from all subsequent log output of the job.
pub fn add_mask(value: &str) {
    if !value.is_empty() {
        println!("::add-mask::{}", escape_data(value));
    }
}

/// Report an error annotation. The process must still exit non-zero.
pub fn set_failed(message: &str) { println!("::error::{}", escape_data(message)); }

fn escape_data(value: &str) -> String {
    value.replace('%', "%25").replace('\r', "%0D").replace('\n', "%0A")
}
