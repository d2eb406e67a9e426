use std::time::Duration;

use crate::Isbn;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Ask the decode source to begin capturing.
    StartCapture,
    /// Ask the decode source to stop and release the camera.
    StopCapture,
    /// Issue one metadata lookup for an accepted code.
    Lookup { isbn: Isbn },
    /// (Re)start the single expiry timer for the message slot.
    ScheduleMessageExpiry { generation: u64, after: Duration },
    /// Drop the pending expiry timer, if any.
    CancelMessageExpiry,
}
