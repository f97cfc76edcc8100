/// Outcome of a bounded wait on a worker signal.
pub(crate) enum Wait<T> {
    Ready(T),
    TimedOut,
}
