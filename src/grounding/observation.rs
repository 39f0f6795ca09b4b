use indexmap::IndexMap;
use serde::Deserialize;

/// Geometry and tag of one interactive element, as reported by the
/// in-page collection script. Coordinates are viewport CSS pixels.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ElementObservation {
    /// Mark number, unique within one observation.
    pub id: u32,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    /// Lowercase tag name, for logs.
    #[serde(rename = "tagName")]
    pub tag: String,
}

impl ElementObservation {
    /// Center point of the bounding box, the coordinate a click aims at.
    pub fn center(&self) -> (f64, f64) {
        (self.x + self.width / 2.0, self.y + self.height / 2.0)
    }
}

/// One grounded snapshot of the page: the raw screenshot, the same image
/// with numbered marks burned in, and the id-to-geometry map those marks
/// refer to.
///
/// The three parts are captured together and carry an epoch number; a mark
/// id is meaningful only against the observation that produced it, so
/// resolution and clicking always work from a single `Observation` value.
#[derive(Debug)]
pub struct Observation {
    epoch: u64,
    screenshot: Vec<u8>,
    overlay: Vec<u8>,
    elements: IndexMap<u32, ElementObservation>,
}

impl Observation {
    pub fn new(
        epoch: u64,
        screenshot: Vec<u8>,
        overlay: Vec<u8>,
        elements: Vec<ElementObservation>,
    ) -> Self {
        let elements = elements.into_iter().map(|e| (e.id, e)).collect();
        Self {
            epoch,
            screenshot,
            overlay,
            elements,
        }
    }

    /// Monotonic capture number, for correlating logs with artifacts.
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    /// The unmarked screenshot, PNG-encoded.
    pub fn screenshot(&self) -> &[u8] {
        &self.screenshot
    }

    /// The screenshot with numbered marks, PNG-encoded. This is the image
    /// a vision model resolves element descriptions against.
    pub fn overlay(&self) -> &[u8] {
        &self.overlay
    }

    /// Look up the element a mark id refers to.
    pub fn element(&self, id: u32) -> Option<&ElementObservation> {
        self.elements.get(&id)
    }

    /// Elements in mark order.
    pub fn elements(&self) -> impl Iterator<Item = &ElementObservation> {
        self.elements.values()
    }

    pub fn element_count(&self) -> usize {
        self.elements.len()
    }
}
