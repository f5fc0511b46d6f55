/// Skybox images: background loading, texel sampling and cube-map lookup
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;

use image::{imageops::FilterType, RgbaImage};
use log::debug;
use nalgebra::Vector3;
use skyview_core::textures::{SkyboxTextures, TextureSource, SKYBOX_IMAGE_NAMES};

/// Images are shrunk so their longest side is at most this many texels
const MAX_TEXTURE_SIZE: u32 = 128;

/// A decoded face image, ready for nearest-texel sampling
#[derive(Debug, Clone)]
pub struct FaceImage {
    pixels: RgbaImage,
}

impl FaceImage {
    pub fn from_rgba(pixels: RgbaImage) -> Self {
        let (width, height) = pixels.dimensions();
        let longest = width.max(height);
        if longest <= MAX_TEXTURE_SIZE {
            return Self { pixels };
        }
        let scale = MAX_TEXTURE_SIZE as f32 / longest as f32;
        let new_width = ((width as f32 * scale) as u32).max(1);
        let new_height = ((height as f32 * scale) as u32).max(1);
        Self {
            pixels: image::imageops::resize(&pixels, new_width, new_height, FilterType::Triangle),
        }
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.pixels.dimensions()
    }

    /// Nearest texel, clamped to the edge. `(0, 0)` is the first row of the file.
    pub fn sample(&self, u: f32, v: f32) -> [u8; 4] {
        let (width, height) = self.pixels.dimensions();
        let x = (u.clamp(0.0, 1.0) * (width - 1) as f32).round() as u32;
        let y = (v.clamp(0.0, 1.0) * (height - 1) as f32).round() as u32;
        self.pixels.get_pixel(x, y).0
    }
}

/// Result of loading one face, sent from the loader thread
#[derive(Debug)]
pub enum ImageEvent {
    Loaded { face: usize, image: FaceImage },
    Failed { face: usize, reason: String },
}

fn load_face(path: &Path) -> Result<FaceImage, image::ImageError> {
    Ok(FaceImage::from_rgba(image::open(path)?.to_rgba8()))
}

/// Decode the six skybox images from `dir` on a worker thread.
pub fn spawn_loader(dir: PathBuf) -> Receiver<ImageEvent> {
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        for (face, name) in SKYBOX_IMAGE_NAMES.iter().enumerate() {
            let path = dir.join(name);
            debug!("loading skybox image {}", path.display());
            let event = match load_face(&path) {
                Ok(image) => ImageEvent::Loaded { face, image },
                Err(e) => ImageEvent::Failed {
                    face,
                    reason: format!("{}: {}", path.display(), e),
                },
            };
            // the frame loop has gone away
            if tx.send(event).is_err() {
                break;
            }
        }
    });
    rx
}

/// Apply every pending loader notification. Returns false once the loader is done.
pub fn drain(rx: &Receiver<ImageEvent>, textures: &mut SkyboxTextures<FaceImage>) -> bool {
    loop {
        match rx.try_recv() {
            Ok(ImageEvent::Loaded { face, image }) => textures.complete(face, image),
            Ok(ImageEvent::Failed { face, reason }) => textures.fail(face, reason),
            Err(TryRecvError::Empty) => return true,
            Err(TryRecvError::Disconnected) => return false,
        }
    }
}

/// Texel of image `face`, or the placeholder if it never loaded
pub fn sample(textures: &SkyboxTextures<FaceImage>, face: usize, u: f32, v: f32) -> [u8; 4] {
    match textures.texture(face) {
        TextureSource::Image(image) => image.sample(u, v),
        TextureSource::Placeholder(texel) => texel,
    }
}

/// Pick the cube image a direction points at and the `(u, v)` inside it.
///
/// Image order is +X, -X, +Y, -Y, +Z, -Z with the usual cube-map face
/// orientation.
pub fn cube_lookup(dir: &Vector3<f32>) -> (usize, f32, f32) {
    let (ax, ay, az) = (dir.x.abs(), dir.y.abs(), dir.z.abs());
    let (face, sc, tc, major) = if ax >= ay && ax >= az {
        if dir.x >= 0.0 {
            (0, -dir.z, -dir.y, ax)
        } else {
            (1, dir.z, -dir.y, ax)
        }
    } else if ay >= az {
        if dir.y >= 0.0 {
            (2, dir.x, dir.z, ay)
        } else {
            (3, dir.x, -dir.z, ay)
        }
    } else if dir.z >= 0.0 {
        (4, dir.x, -dir.y, az)
    } else {
        (5, -dir.x, -dir.y, az)
    };
    if major == 0.0 {
        return (face, 0.5, 0.5);
    }
    (face, 0.5 * (sc / major + 1.0), 0.5 * (tc / major + 1.0))
}
