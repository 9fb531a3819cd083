/// Dispatcher configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchConfig {
    /// Most packets one drain takes from a single queue.
    ///
    /// `None` drains every queue until it is empty, including packets
    /// enqueued while the pass runs. A handler that keeps re-enqueuing then
    /// holds the pass; set a limit to leave the rest for the next turn.
    pub max_packets_per_pass: Option<usize>,
}

impl DispatchConfig {
    pub(crate) fn pass_budget(&self) -> usize {
        self.max_packets_per_pass.unwrap_or(usize::MAX)
    }
}
