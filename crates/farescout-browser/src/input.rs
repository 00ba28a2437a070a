//! Synthetic pointer and keyboard input.
//!
//! Pure pass-through into the session's command channel; the only added
//! behavior is the randomized pacing between events so the input doesn't
//! land with machine-perfect timing. Send errors propagate to the caller.

use std::time::Duration;

use serde_json::json;

use farescout_core::pacing::sleep_jittered;

use crate::error::BrowserError;
use crate::tab::TabSession;

const INPUT_DELAY_BASE: Duration = Duration::from_millis(100);
const INPUT_DELAY_SPREAD: Duration = Duration::from_millis(50);

/// Input replay over an attached tab. Stateless.
pub struct InputSimulator {
    session: TabSession,
}

impl InputSimulator {
    pub fn new(session: TabSession) -> Self {
        Self { session }
    }

    /// Left-click at viewport coordinates: press, jittered pause, release.
    pub async fn click(&self, x: f64, y: f64) -> Result<(), BrowserError> {
        sleep_jittered(INPUT_DELAY_BASE, INPUT_DELAY_SPREAD).await;
        self.session
            .call(
                "Input.dispatchMouseEvent",
                Some(json!({
                    "type": "mousePressed",
                    "x": x,
                    "y": y,
                    "button": "left",
                    "clickCount": 1,
                })),
            )
            .await?;
        sleep_jittered(INPUT_DELAY_BASE, INPUT_DELAY_SPREAD).await;
        self.session
            .call(
                "Input.dispatchMouseEvent",
                Some(json!({
                    "type": "mouseReleased",
                    "x": x,
                    "y": y,
                    "button": "left",
                    "clickCount": 1,
                })),
            )
            .await?;
        Ok(())
    }

    /// Type text one character at a time, key-down then key-up per character,
    /// each preceded by a jittered pause.
    pub async fn type_text(&self, text: &str) -> Result<(), BrowserError> {
        for ch in text.chars() {
            let ch = ch.to_string();
            sleep_jittered(INPUT_DELAY_BASE, INPUT_DELAY_SPREAD).await;
            self.session
                .call(
                    "Input.dispatchKeyEvent",
                    Some(json!({ "type": "keyDown", "text": ch })),
                )
                .await?;
            sleep_jittered(INPUT_DELAY_BASE, INPUT_DELAY_SPREAD).await;
            self.session
                .call(
                    "Input.dispatchKeyEvent",
                    Some(json!({ "type": "keyUp", "text": ch })),
                )
                .await?;
        }
        Ok(())
    }
}
