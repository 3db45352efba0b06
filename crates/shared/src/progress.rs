use std::io::Write;

/// Receives "n of total done" updates from the concurrent stages.
///
/// Purely observational: nothing in the pipeline depends on it.
pub trait Progress: Send + Sync {
    fn advance(&self, completed: usize, total: usize);
}

/// Silent sink
pub struct NoProgress;

impl Progress for NoProgress {
    fn advance(&self, _completed: usize, _total: usize) {}
}

/// Prints a dot per finished unit to stderr, newline at the end
pub struct StderrProgress;

impl Progress for StderrProgress {
    fn advance(&self, completed: usize, total: usize) {
        let mut stderr = std::io::stderr();
        let _ = write!(stderr, ".");
        if completed >= total {
            let _ = writeln!(stderr);
        }
        let _ = stderr.flush();
    }
}

/// Records every update, for asserting on the signals a stage sends
#[cfg(test)]
#[derive(Default)]
pub(crate) struct RecordingProgress {
    pub calls: std::sync::Mutex<Vec<(usize, usize)>>,
}

#[cfg(test)]
impl Progress for RecordingProgress {
    fn advance(&self, completed: usize, total: usize) {
        self.calls.lock().unwrap().push((completed, total));
    }
}
