//! # farescout browser
//!
//! Debugger-driven browser automation over the Chrome DevTools Protocol.
//!
//! [`CdpClient`] owns the WebSocket transport: command/response correlation by
//! id, and routing of asynchronous events to the tab session they belong to.
//! [`TabSession`] is one attached tab: domain enablement, navigation,
//! load detection, and the command channel. [`NetworkCapture`] correlates
//! request/response pairs observed on a session's event stream and extracts
//! response bodies for URLs on an allow-list. [`InputSimulator`] replays
//! pointer and keyboard input with randomized pacing.

mod capture;
mod cdp;
mod error;
mod input;
mod protocol;
mod tab;

pub use capture::{CaptureConfig, CapturedExchange, NetworkCapture, run_capture};
pub use cdp::CdpClient;
pub use error::BrowserError;
pub use input::InputSimulator;
pub use protocol::{CdpMessage, NetworkEvent, PageInfo};
pub use tab::{LOAD_TIMEOUT, TabSession};
