//! Progress handler trait and events

use std::time::Duration;

/// Events emitted while packaging or cleaning functions
#[derive(Debug, Clone)]
pub enum ProgressEvent {
    /// A run over the selected targets started
    RunStarted { action: String, targets: usize },

    /// A target's pipeline started
    TargetStarted { function: String },

    /// A phase completed for a target
    StageComplete {
        function: String,
        stage: String,
        duration: Duration,
    },

    /// A target stopped on an ignorable condition
    TargetSkipped { function: String, reason: String },

    /// A target failed
    TargetFailed { function: String, error: String },

    /// A target went through every phase
    TargetComplete {
        function: String,
        total_time: Duration,
    },

    /// The run finished
    RunComplete {
        completed: usize,
        skipped: usize,
        failed: usize,
        total_time: Duration,
    },
}

/// Receives progress events during a run
pub trait ProgressHandler: Send + Sync {
    fn on_progress(&self, event: &ProgressEvent);
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct CountingHandler {
        count: Arc<AtomicUsize>,
    }

    impl ProgressHandler for CountingHandler {
        fn on_progress(&self, _event: &ProgressEvent) {
            self.count.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn test_progress_events() {
        let count = Arc::new(AtomicUsize::new(0));
        let handler = CountingHandler {
            count: count.clone(),
        };

        handler.on_progress(&ProgressEvent::RunStarted {
            action: "package".to_string(),
            targets: 1,
        });
        handler.on_progress(&ProgressEvent::TargetStarted {
            function: "hello".to_string(),
        });
        handler.on_progress(&ProgressEvent::RunComplete {
            completed: 1,
            skipped: 0,
            failed: 0,
            total_time: Duration::from_secs(2),
        });

        assert_eq!(count.load(Ordering::SeqCst), 3);
    }
}
