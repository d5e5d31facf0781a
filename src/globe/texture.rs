//! Optional equirectangular map texture, reduced to a land mask.
//!
//! Candidates are tried in order on a background thread: plain paths,
//! `file://` URLs and `http(s)://` URLs. The first one that decodes wins.
//! Until then (or forever, if every candidate fails) the renderer uses the
//! landmass rings.

use crate::error::GlobeError;
use image::DynamicImage;
use std::f64::consts::{FRAC_PI_2, PI, TAU};
use std::io::Read;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

/// Maximum size for a downloaded texture (32MB)
const MAX_TEXTURE_SIZE: u64 = 32 * 1024 * 1024;

/// Mask resolution; textures are downsampled to at most this.
const MASK_WIDTH: u32 = 720;
const MASK_HEIGHT: u32 = 360;

/// Pixels darker than this (0..1 luminance) count as water.
const WATER_LUMINANCE: f64 = 0.08;

/// Land/water mask in equirectangular layout, row 0 at the north pole.
#[derive(Debug, Clone, PartialEq)]
pub struct LandTexture {
    width: u32,
    height: u32,
    land: Vec<bool>,
}

/// Blue-dominant or near-black pixels are water.
pub fn is_land_pixel(r: u8, g: u8, b: u8) -> bool {
    let luminance = (0.299 * r as f64 + 0.587 * g as f64 + 0.114 * b as f64) / 255.0;
    let water = (b > r && b > g) || luminance < WATER_LUMINANCE;
    !water
}

impl LandTexture {
    pub fn from_mask(width: u32, height: u32, land: Vec<bool>) -> Option<Self> {
        if width == 0 || height == 0 || land.len() != (width * height) as usize {
            return None;
        }
        Some(Self { width, height, land })
    }

    pub fn from_image(image: &DynamicImage) -> Option<Self> {
        let width = image.width().min(MASK_WIDTH);
        let height = image.height().min(MASK_HEIGHT);
        let rgb = image
            .resize_exact(width, height, image::imageops::FilterType::Triangle)
            .to_rgb8();
        let land = rgb.pixels().map(|p| is_land_pixel(p.0[0], p.0[1], p.0[2])).collect();
        Self::from_mask(width, height, land)
    }

    /// Whether `(lat, lng)` in radians is land.
    pub fn sample(&self, lat: f64, lng: f64) -> bool {
        let u = ((lng + PI) / TAU).rem_euclid(1.0);
        let v = ((FRAC_PI_2 - lat) / PI).clamp(0.0, 1.0);
        let x = ((u * self.width as f64) as u32).min(self.width - 1);
        let y = ((v * self.height as f64) as u32).min(self.height - 1);
        self.land[(y * self.width + x) as usize]
    }

    pub fn land_fraction(&self) -> f64 {
        self.land.iter().filter(|&&l| l).count() as f64 / self.land.len() as f64
    }
}

fn read_capped(mut reader: impl Read, source: &str) -> Result<Vec<u8>, GlobeError> {
    let mut bytes = Vec::new();
    reader.by_ref().take(MAX_TEXTURE_SIZE + 1).read_to_end(&mut bytes)?;
    if bytes.len() as u64 > MAX_TEXTURE_SIZE {
        return Err(GlobeError::TextureTooLarge {
            source_name: source.to_string(),
            limit: MAX_TEXTURE_SIZE,
        });
    }
    Ok(bytes)
}

fn fetch_bytes(source: &str, cancel: &AtomicBool) -> Result<Vec<u8>, GlobeError> {
    if let Some(path) = source.strip_prefix("file://") {
        let path = urlencoding::decode(path).map_err(|err| GlobeError::Http {
            url: source.to_string(),
            reason: err.to_string(),
        })?;
        let file = std::fs::File::open(Path::new(path.as_ref()))?;
        read_capped(file, source)
    } else if source.starts_with("http://") || source.starts_with("https://") {
        let response = ureq::get(source)
            .timeout(Duration::from_secs(10))
            .call()
            .map_err(|err| GlobeError::Http {
                url: source.to_string(),
                reason: err.to_string(),
            })?;

        if let Some(len) = response.header("Content-Length").and_then(|s| s.parse::<u64>().ok()) {
            if len > MAX_TEXTURE_SIZE {
                return Err(GlobeError::TextureTooLarge {
                    source_name: source.to_string(),
                    limit: MAX_TEXTURE_SIZE,
                });
            }
        }
        if cancel.load(Ordering::Relaxed) {
            return Err(GlobeError::Cancelled);
        }
        read_capped(response.into_reader(), source)
    } else {
        let file = std::fs::File::open(Path::new(source))?;
        read_capped(file, source)
    }
}

/// Load and decode one candidate.
pub fn load_texture(source: &str, cancel: &AtomicBool) -> Result<LandTexture, GlobeError> {
    if cancel.load(Ordering::Relaxed) {
        return Err(GlobeError::Cancelled);
    }
    let bytes = fetch_bytes(source, cancel)?;
    if cancel.load(Ordering::Relaxed) {
        return Err(GlobeError::Cancelled);
    }
    let image = image::load_from_memory(&bytes)?;
    LandTexture::from_image(&image).ok_or(GlobeError::EmptyTexture)
}

/// Try candidates in order; every failure is logged and the next tried.
pub fn load_first(candidates: &[String], cancel: &AtomicBool) -> Option<LandTexture> {
    for source in candidates {
        match load_texture(source, cancel) {
            Ok(texture) => {
                tracing::info!(%source, land = texture.land_fraction(), "map texture loaded");
                return Some(texture);
            }
            Err(GlobeError::Cancelled) => return None,
            Err(err) => tracing::warn!(%source, %err, "map texture candidate failed"),
        }
    }
    if !candidates.is_empty() {
        tracing::info!("no map texture available, using landmass outlines");
    }
    None
}

/// Background texture fetch, polled once per frame.
pub struct TextureLoader {
    receiver: Option<Receiver<LandTexture>>,
    cancel: Arc<AtomicBool>,
    texture: Option<LandTexture>,
}

impl TextureLoader {
    /// No candidates: never produces a texture.
    pub fn none() -> Self {
        Self {
            receiver: None,
            cancel: Arc::new(AtomicBool::new(false)),
            texture: None,
        }
    }

    /// Already loaded (print mode loads synchronously).
    pub fn ready(texture: Option<LandTexture>) -> Self {
        let mut loader = Self::none();
        loader.texture = texture;
        loader
    }

    pub fn spawn(candidates: Vec<String>) -> Self {
        if candidates.is_empty() {
            return Self::none();
        }
        let (tx, rx) = mpsc::channel();
        let cancel = Arc::new(AtomicBool::new(false));
        let flag = cancel.clone();

        thread::spawn(move || {
            if let Some(texture) = load_first(&candidates, &flag) {
                if !flag.load(Ordering::Relaxed) {
                    let _ = tx.send(texture);
                }
            }
        });

        Self {
            receiver: Some(rx),
            cancel,
            texture: None,
        }
    }

    /// Pick up a finished load, if any, and return the current texture.
    pub fn poll(&mut self) -> Option<&LandTexture> {
        let received = self.receiver.as_ref().map(|rx| rx.try_recv());
        match received {
            Some(Ok(texture)) => {
                self.texture = Some(texture);
                self.receiver = None;
            }
            Some(Err(TryRecvError::Disconnected)) => self.receiver = None,
            Some(Err(TryRecvError::Empty)) | None => {}
        }
        self.texture.as_ref()
    }

    pub fn texture(&self) -> Option<&LandTexture> {
        self.texture.as_ref()
    }

    pub fn is_pending(&self) -> bool {
        self.receiver.is_some()
    }

    pub fn cancel(&mut self) {
        self.cancel.store(true, Ordering::Relaxed);
        self.receiver = None;
    }
}

impl Drop for TextureLoader {
    fn drop(&mut self) {
        self.cancel.store(true, Ordering::Relaxed);
    }
}
