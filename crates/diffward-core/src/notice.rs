/// Receiver for informational notes emitted by otherwise pure helpers.
///
/// Budget clamping and file filtering report what they did through this
/// capability instead of a global logger. The binary wires it to `tracing`;
/// tests collect the messages.
///
/// Any `Fn(&str)` closure is a sink:
///
/// ```
/// use std::cell::RefCell;
/// use diffward_core::NoticeSink;
///
/// let seen = RefCell::new(Vec::new());
/// let sink = |msg: &str| seen.borrow_mut().push(msg.to_string());
/// sink.notice("hello");
/// assert_eq!(seen.borrow().as_slice(), ["hello"]);
/// ```
pub trait NoticeSink {
    /// Record one informational message.
    fn notice(&self, message: &str);
}

impl<F> NoticeSink for F
where
    F: Fn(&str),
{
    fn notice(&self, message: &str) {
        self(message)
    }
}

/// Sink that forwards every notice to `tracing::info!`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl NoticeSink for TracingSink {
    fn notice(&self, message: &str) {
        tracing::info!("{message}");
    }
}

/// Sink that drops every notice.
#[derive(Debug, Clone, Copy, Default)]
pub struct SilentSink;

impl NoticeSink for SilentSink {
    fn notice(&self, _message: &str) {}
}
