/// Commands sent from the async runtime to the main (event loop) thread.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiCommand {
    /// Exit the event loop.
    Shutdown,
}
