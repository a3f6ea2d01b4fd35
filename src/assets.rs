//! Reel strip asset and load signalling
//!
//! The reel strip is fetched asynchronously at startup. Until it arrives the
//! frame loop keeps running but the machine does not advance; the loader
//! completes a one-shot `LoadSignal` that the loop checks each frame.

use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::rc::Rc;

use crate::consts::SEGMENT_COUNT;
use crate::sim::Symbol;

/// Where the browser build fetches the reel strip from
pub const REEL_STRIP_URL: &str = "assets/reel.json";

/// Drum size used when the strip leaves it out
pub const DEFAULT_RADIUS: f32 = 9.0;
pub const DEFAULT_WIDTH: f32 = 8.0;

#[derive(Debug, thiserror::Error)]
pub enum AssetError {
    #[error("fetch failed: {0}")]
    Fetch(String),

    #[error("server returned HTTP {0}")]
    Status(u16),

    #[error("malformed reel strip: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("reel strip has {0} segments, expected 8")]
    SegmentCount(usize),

    #[error("segment {index} shows {found:?}, expected {expected:?}")]
    SegmentOrder {
        index: usize,
        expected: Symbol,
        found: Symbol,
    },
}

/// One printed segment of the strip
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StripSegment {
    pub symbol: Symbol,
    /// Linear RGB in [0, 1]
    pub color: [f32; 3],
}

/// Printed reel strip and drum dimensions
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReelStrip {
    pub segments: Vec<StripSegment>,
    /// Drum radius (world units)
    #[serde(default = "default_radius")]
    pub radius: f32,
    /// Drum width along x (world units)
    #[serde(default = "default_width")]
    pub width: f32,
}

fn default_radius() -> f32 {
    DEFAULT_RADIUS
}

fn default_width() -> f32 {
    DEFAULT_WIDTH
}

impl ReelStrip {
    /// Parse and validate. Segment `i` must carry the symbol whose index is
    /// `i`, since outcomes are resolved by segment number.
    pub fn from_json(json: &str) -> Result<Self, AssetError> {
        let strip: ReelStrip = serde_json::from_str(json)?;
        strip.validate()?;
        Ok(strip)
    }

    pub fn validate(&self) -> Result<(), AssetError> {
        if self.segments.len() != SEGMENT_COUNT as usize {
            return Err(AssetError::SegmentCount(self.segments.len()));
        }
        for (index, (segment, expected)) in self.segments.iter().zip(Symbol::ALL).enumerate() {
            if segment.symbol != expected {
                return Err(AssetError::SegmentOrder {
                    index,
                    expected,
                    found: segment.symbol,
                });
            }
        }
        Ok(())
    }

    /// Segment colours padded for a uniform array
    pub fn palette(&self) -> [[f32; 4]; SEGMENT_COUNT as usize] {
        let mut palette = [[0.0; 4]; SEGMENT_COUNT as usize];
        for (slot, segment) in palette.iter_mut().zip(&self.segments) {
            let [r, g, b] = segment.color;
            *slot = [r, g, b, 1.0];
        }
        palette
    }
}

/// Observer side of a one-shot load
#[derive(Debug)]
pub struct LoadSignal<T> {
    slot: Rc<RefCell<Option<T>>>,
}

/// Completer side of a one-shot load; consumed on completion
#[derive(Debug)]
pub struct LoadCompleter<T> {
    slot: Rc<RefCell<Option<T>>>,
}

/// Create a linked completer/observer pair
pub fn load_signal<T>() -> (LoadCompleter<T>, LoadSignal<T>) {
    let slot = Rc::new(RefCell::new(None));
    (
        LoadCompleter { slot: slot.clone() },
        LoadSignal { slot },
    )
}

impl<T> LoadCompleter<T> {
    pub fn complete(self, value: T) {
        *self.slot.borrow_mut() = Some(value);
    }
}

impl<T> LoadSignal<T> {
    pub fn is_ready(&self) -> bool {
        self.slot.borrow().is_some()
    }

    /// Run `f` on the loaded value, if any
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> Option<R> {
        self.slot.borrow().as_ref().map(f)
    }
}

/// Fetch and parse the reel strip (browser only)
#[cfg(target_arch = "wasm32")]
pub async fn fetch_reel_strip(url: &str) -> Result<ReelStrip, AssetError> {
    use wasm_bindgen::JsCast;
    use wasm_bindgen_futures::JsFuture;

    let window = web_sys::window().ok_or_else(|| AssetError::Fetch("no window".into()))?;
    let response = JsFuture::from(window.fetch_with_str(url))
        .await
        .map_err(|e| AssetError::Fetch(format!("{:?}", e)))?;
    let response: web_sys::Response = response
        .dyn_into()
        .map_err(|_| AssetError::Fetch("not a Response".into()))?;
    if !response.ok() {
        return Err(AssetError::Status(response.status()));
    }
    let text = response
        .text()
        .map_err(|e| AssetError::Fetch(format!("{:?}", e)))?;
    let text = JsFuture::from(text)
        .await
        .map_err(|e| AssetError::Fetch(format!("{:?}", e)))?
        .as_string()
        .ok_or_else(|| AssetError::Fetch("body is not text".into()))?;
    ReelStrip::from_json(&text)
}
