//! Browser control: a managed Chrome/Chromium session and the driver seam
//! the engine works against.

pub mod session;

pub use session::BrowserSession;

use crate::error::Result;
use crate::grounding::ElementObservation;

/// The operations the engine needs from a live page.
///
/// `BrowserSession` is the production implementation; tests substitute
/// scripted fakes so the control loop and executor run without Chrome.
pub trait PageDriver {
    /// Load a URL, wait for it to settle, and dismiss blocking popups.
    fn navigate(&self, url: &str) -> Result<()>;

    /// URL of the current page.
    fn current_url(&self) -> String;

    /// PNG screenshot of the current viewport.
    fn screenshot(&self) -> Result<Vec<u8>>;

    /// Geometry of the visible interactive elements, in document order.
    fn interactive_elements(&self) -> Result<Vec<ElementObservation>>;

    /// Click whatever element occupies the given viewport coordinates.
    fn click_at(&self, x: f64, y: f64) -> Result<()>;

    /// Type text into the focused element.
    fn type_text(&self, text: &str) -> Result<()>;

    /// Press a named key (`Enter`, `PageDown`, `PageUp`, `End`).
    fn press_key(&self, key: &str) -> Result<()>;

    /// Close the page and release the browser.
    fn close(&self) -> Result<()>;
}
