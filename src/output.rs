use std::io::Write;

/// Abstraction over user-facing output.
///
/// Command modules use this trait instead of `println!`/`eprintln!` so that
/// output can be swapped out without touching the commands.
pub trait UserOutput: Send + Sync {
    /// Informational status message (e.g., "Starting project 'demo'...")
    fn status(&self, message: &str);

    /// Success message (e.g., "Project 'demo' is up")
    fn success(&self, message: &str);

    /// Warning message
    fn warning(&self, message: &str);

    /// Error message
    fn error(&self, message: &str);

    /// Raw bytes written straight to stdout (logs, rendered files).
    fn raw(&self, bytes: &[u8]);
}

/// Terminal output: stdout for results, stderr for warnings and errors.
pub struct CliOutput;

impl UserOutput for CliOutput {
    fn status(&self, message: &str) {
        println!("{}", message);
    }

    fn success(&self, message: &str) {
        println!("\x1b[32m{}\x1b[0m", message);
    }

    fn warning(&self, message: &str) {
        eprintln!("\x1b[33m{}\x1b[0m", message);
    }

    fn error(&self, message: &str) {
        eprintln!("\x1b[31m{}\x1b[0m", message);
    }

    fn raw(&self, bytes: &[u8]) {
        let mut stdout = std::io::stdout().lock();
        stdout.write_all(bytes).ok();
        stdout.flush().ok();
    }
}
