//! Callback-based progress reporting shared by all workflows.
//!
//! Library code never draws anything itself; it emits [`Progress`] events and lets
//! the caller (a CLI progress bar, a test, nothing at all) decide what to do.

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Progress {
    PhaseStart { name: &'static str },
    PhaseFinish,

    TaskStart { total_steps: u64 },
    TaskIncrement,
    TaskFinish,

    Message(String),
}

pub type ProgressCallback<'a> = Box<dyn Fn(Progress) + Send + Sync + 'a>;

#[derive(Default)]
pub struct ProgressReporter<'a> {
    callback: Option<ProgressCallback<'a>>,
}

impl<'a> ProgressReporter<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_callback(callback: ProgressCallback<'a>) -> Self {
        Self {
            callback: Some(callback),
        }
    }

    #[inline]
    pub fn report(&self, event: Progress) {
        if let Some(cb) = &self.callback {
            cb(event);
        }
    }

    /// Emits `TaskStart`, runs `body` with an increment handle, then `TaskFinish`.
    pub fn task<T>(&self, total_steps: u64, body: impl FnOnce(&(dyn Fn() + Sync)) -> T) -> T {
        self.report(Progress::TaskStart { total_steps });
        let result = body(&|| self.report(Progress::TaskIncrement));
        self.report(Progress::TaskFinish);
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    fn recording_reporter() -> (ProgressReporter<'static>, Arc<Mutex<Vec<Progress>>>) {
        let events = Arc::new(Mutex::new(Vec::new()));
        let sink = events.clone();
        let reporter =
            ProgressReporter::with_callback(Box::new(move |e| sink.lock().unwrap().push(e)));
        (reporter, events)
    }

    #[test]
    fn silent_reporter_ignores_events() {
        let reporter = ProgressReporter::new();
        reporter.report(Progress::Message("ignored".to_string()));
        assert_eq!(reporter.task(3, |_| 7), 7);
    }

    #[test]
    fn task_brackets_increments_with_start_and_finish() {
        let (reporter, events) = recording_reporter();
        let total = reporter.task(2, |inc| {
            inc();
            inc();
            2
        });

        assert_eq!(total, 2);
        assert_eq!(
            *events.lock().unwrap(),
            vec![
                Progress::TaskStart { total_steps: 2 },
                Progress::TaskIncrement,
                Progress::TaskIncrement,
                Progress::TaskFinish,
            ]
        );
    }
}
