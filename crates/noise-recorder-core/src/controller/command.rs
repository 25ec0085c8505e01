/// Requests a caller (e.g. a record button) can make of the controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControllerCommand {
    /// Begin capturing. Ignored unless the session is Waiting.
    Start,
    /// End capturing. Ignored unless the session is Recording.
    Stop,
    /// Use `prefix` for the next attempt. Never interrupts an active one.
    Select {
        /// Filename prefix, normally a catalog entry name.
        prefix: String,
    },
    /// Return an Uploaded session to Waiting under the current prefix.
    Rearm,
    /// Finish any in-flight work and exit the run loop.
    Shutdown,
}
