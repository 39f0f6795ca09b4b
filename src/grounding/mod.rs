//! Set-of-Mark grounding: every screenshot is paired with numbered marks
//! over the interactive elements, so a vision model can name a click target
//! by integer id instead of by selector.

pub mod observation;
pub mod overlay;

pub use observation::{ElementObservation, Observation};

use std::path::PathBuf;

use rusttype::Font;

use crate::browser::PageDriver;
use crate::config::AgentConfig;
use crate::error::Result;

/// Captures grounded snapshots of a page.
///
/// Each capture gets the next epoch number; resolved element ids are only
/// ever interpreted against the observation they came from.
pub struct Grounder {
    epoch: u64,
    font: Option<Font<'static>>,
    artifacts_dir: Option<PathBuf>,
}

impl Grounder {
    pub fn new(config: &AgentConfig) -> Self {
        let font = overlay::load_label_font(&config.font_paths);
        if font.is_none() {
            log::warn!("No overlay label font found; marks will be unlabeled boxes");
        }
        Self {
            epoch: 0,
            font,
            artifacts_dir: Some(config.artifacts_dir.clone()),
        }
    }

    /// Builder method: skip writing debug artifacts.
    pub fn without_artifacts(mut self) -> Self {
        self.artifacts_dir = None;
        self
    }

    /// Capture the current page: screenshot, interactive elements, and the
    /// marked overlay. Overlay trouble degrades to the raw screenshot
    /// rather than failing the capture.
    pub fn observe(&mut self, driver: &dyn PageDriver) -> Result<Observation> {
        self.epoch += 1;

        let screenshot = driver.screenshot()?;
        let elements = driver.interactive_elements()?;
        let element_count = elements.len();

        let overlay = match overlay::render_overlay(&screenshot, &elements, self.font.as_ref()) {
            Ok(marked) => marked,
            Err(e) => {
                log::warn!("Overlay rendering failed, using raw screenshot: {}", e);
                screenshot.clone()
            }
        };

        if let Some(dir) = &self.artifacts_dir {
            match overlay::write_debug_artifact(dir, &overlay) {
                Ok(path) => log::debug!("Wrote overlay artifact to {}", path.display()),
                Err(e) => log::debug!("Could not write overlay artifact: {}", e),
            }
        }

        log::info!(
            "Observation {}: {} interactive elements",
            self.epoch,
            element_count
        );
        Ok(Observation::new(self.epoch, screenshot, overlay, elements))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AgentError;

    use std::cell::RefCell;
    use std::io::Cursor;

    use image::{DynamicImage, Rgba, RgbaImage};

    struct StubDriver {
        screenshot: Vec<u8>,
        elements: Vec<ElementObservation>,
        fail_screenshot: RefCell<bool>,
    }

    impl StubDriver {
        fn new(elements: Vec<ElementObservation>) -> Self {
            let image = RgbaImage::from_pixel(120, 80, Rgba([255, 255, 255, 255]));
            let mut png = Vec::new();
            DynamicImage::ImageRgba8(image)
                .write_to(&mut Cursor::new(&mut png), image::ImageOutputFormat::Png)
                .unwrap();
            Self {
                screenshot: png,
                elements,
                fail_screenshot: RefCell::new(false),
            }
        }
    }

    impl PageDriver for StubDriver {
        fn navigate(&self, _url: &str) -> Result<()> {
            Ok(())
        }

        fn current_url(&self) -> String {
            "about:blank".to_string()
        }

        fn screenshot(&self) -> Result<Vec<u8>> {
            if *self.fail_screenshot.borrow() {
                return Err(AgentError::Session("screenshot unavailable".to_string()));
            }
            Ok(self.screenshot.clone())
        }

        fn interactive_elements(&self) -> Result<Vec<ElementObservation>> {
            Ok(self.elements.clone())
        }

        fn click_at(&self, _x: f64, _y: f64) -> Result<()> {
            Ok(())
        }

        fn type_text(&self, _text: &str) -> Result<()> {
            Ok(())
        }

        fn press_key(&self, _key: &str) -> Result<()> {
            Ok(())
        }

        fn close(&self) -> Result<()> {
            Ok(())
        }
    }

    fn element(id: u32) -> ElementObservation {
        ElementObservation {
            id,
            x: 10.0 * id as f64,
            y: 5.0,
            width: 8.0,
            height: 8.0,
            tag: "a".to_string(),
        }
    }

    #[test]
    fn test_observe_stamps_increasing_epochs() {
        let driver = StubDriver::new(vec![element(0), element(1)]);
        let mut grounder = Grounder::new(&AgentConfig::default()).without_artifacts();

        let first = grounder.observe(&driver).unwrap();
        let second = grounder.observe(&driver).unwrap();

        assert_eq!(first.epoch(), 1);
        assert_eq!(second.epoch(), 2);
        assert_eq!(first.element_count(), 2);
        assert!(first.element(1).is_some());
        assert!(first.element(9).is_none());
    }

    #[test]
    fn test_observe_marks_differ_from_screenshot() {
        let driver = StubDriver::new(vec![element(0)]);
        let mut grounder = Grounder::new(&AgentConfig::default()).without_artifacts();

        let obs = grounder.observe(&driver).unwrap();
        assert_ne!(obs.overlay(), obs.screenshot());
    }

    #[test]
    fn test_observe_propagates_driver_failure() {
        let driver = StubDriver::new(vec![]);
        *driver.fail_screenshot.borrow_mut() = true;
        let mut grounder = Grounder::new(&AgentConfig::default()).without_artifacts();

        let err = grounder.observe(&driver).unwrap_err();
        assert!(matches!(err, AgentError::Session(_)));
    }
}
