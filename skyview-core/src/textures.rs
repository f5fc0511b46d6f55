/// Readiness gate for asynchronously loaded skybox images
use log::{debug, info, warn};

/// File names of the six cube images, in texture order
pub const SKYBOX_IMAGE_NAMES: [&str; 6] = [
    "pos-x.png",
    "neg-x.png",
    "pos-y.png",
    "neg-y.png",
    "pos-z.png",
    "neg-z.png",
];

/// Solid blue RGBA texel shown while an image is missing
pub const PLACEHOLDER_RGBA: [u8; 4] = [0, 0, 255, 255];

#[derive(Debug, Clone, PartialEq)]
enum Slot<T> {
    Pending,
    Loaded(T),
    Failed(String),
}

/// What a texture unit should sample for one face
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TextureSource<'a, T> {
    Image(&'a T),
    Placeholder([u8; 4]),
}

/// Tracks the skybox images as they finish loading.
///
/// The gate opens once every image has either loaded or failed; failed faces
/// keep the placeholder texel.
#[derive(Debug, Clone)]
pub struct SkyboxTextures<T> {
    slots: Vec<Slot<T>>,
    pending: usize,
}

impl<T> SkyboxTextures<T> {
    pub fn new(count: usize) -> Self {
        Self {
            slots: (0..count).map(|_| Slot::Pending).collect(),
            pending: count,
        }
    }

    /// Store a loaded image. Later notifications for the same face replace it.
    pub fn complete(&mut self, face: usize, image: T) {
        if self.settle(face) {
            debug!("skybox image {} loaded", face);
            self.slots[face] = Slot::Loaded(image);
        }
    }

    /// Record that a face could not be loaded; it keeps the placeholder.
    pub fn fail(&mut self, face: usize, reason: impl Into<String>) {
        if self.settle(face) {
            let reason = reason.into();
            warn!("skybox image {} failed to load: {}", face, reason);
            self.slots[face] = Slot::Failed(reason);
        }
    }

    fn settle(&mut self, face: usize) -> bool {
        let Some(slot) = self.slots.get(face) else {
            warn!("ignoring skybox image {} (only {} faces)", face, self.slots.len());
            return false;
        };
        if matches!(slot, Slot::Pending) {
            self.pending -= 1;
            if self.pending == 0 {
                info!("all {} skybox images settled", self.slots.len());
            }
        }
        true
    }

    /// True once nothing is pending anymore
    pub fn is_ready(&self) -> bool {
        self.pending == 0
    }

    pub fn failures(&self) -> impl Iterator<Item = (usize, &str)> + '_ {
        self.slots.iter().enumerate().filter_map(|(face, slot)| match slot {
            Slot::Failed(reason) => Some((face, reason.as_str())),
            _ => None,
        })
    }

    pub fn texture(&self, face: usize) -> TextureSource<'_, T> {
        match self.slots.get(face) {
            Some(Slot::Loaded(image)) => TextureSource::Image(image),
            _ => TextureSource::Placeholder(PLACEHOLDER_RGBA),
        }
    }
}
