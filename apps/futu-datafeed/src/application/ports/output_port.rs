//! Diagnostic Output Port
//!
//! Human-readable progress and failure messages produced by the datafeed.
//! Callers pick where they go: stdout, the tracing subscriber, or any closure.

/// Sink for datafeed diagnostics.
pub trait OutputSink: Send + Sync {
    /// Emit one message.
    fn output(&self, message: &str);
}

impl<F> OutputSink for F
where
    F: Fn(&str) + Send + Sync,
{
    fn output(&self, message: &str) {
        self(message);
    }
}

/// Prints each message on its own line to stdout.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleOutput;

impl OutputSink for ConsoleOutput {
    fn output(&self, message: &str) {
        println!("{message}");
    }
}

/// Forwards each message to the tracing subscriber at `info` level.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingOutput;

impl OutputSink for TracingOutput {
    fn output(&self, message: &str) {
        tracing::info!(target: "futu_datafeed::output", "{message}");
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;

    #[test]
    fn closures_are_sinks() {
        let seen = Mutex::new(Vec::new());
        let sink = |message: &str| seen.lock().unwrap().push(message.to_string());

        sink.output("first");
        sink.output("second");

        assert_eq!(*seen.lock().unwrap(), vec!["first", "second"]);
    }

    #[test]
    fn sinks_work_as_trait_objects() {
        let console: &dyn OutputSink = &ConsoleOutput;
        console.output("console");
        let tracing_sink: &dyn OutputSink = &TracingOutput;
        tracing_sink.output("tracing");
    }
}
