/// Commands sent from the input handler to the main application.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppCommand {
    /// Record button: start, stop, or start over depending on status.
    Toggle,
    /// Select the catalog entry at a zero-based index.
    Select {
        /// Zero-based catalog index.
        index: usize,
    },
    /// Select the catalog entry with this name.
    SelectByName {
        /// Entry name, matched ignoring ASCII case.
        name: String,
    },
    /// Print the catalog.
    List,
    /// Print usage.
    Help,
    /// Request application shutdown.
    Shutdown,
}
