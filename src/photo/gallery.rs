/// Full photo gallery for one listing
///
/// Gallery requests use their own permits, not the thumbnail pool.
///
/// The photo service has no "how many photos" endpoint, so the gallery
/// probes indices 0, 1, 2, ... one at a time until the service says there
/// is nothing more. A 404 or a body that isn't an image counts as the end
/// of the listing's photos; any other failure stops the gallery early and
/// is reported as an interruption so the detail view can say the gallery
/// may be incomplete.
use tracing::{info, warn};

use super::thumbnail::PhotoFetcher;
use super::{fit_within, Photo};

/// One gallery photo at display size plus the full decoded image
#[derive(Debug, Clone)]
pub struct GalleryPhoto {
    pub preview: Photo,
    pub full: Photo,
}

/// Why the gallery stopped probing
#[derive(Debug, Clone, PartialEq)]
pub enum GalleryEnd {
    /// The service ran out of photos
    Exhausted,
    /// Hit the configured maximum number of photos
    Capped,
    /// A network or server error cut the gallery short
    Interrupted(String),
}

#[derive(Debug, Clone)]
pub struct Gallery {
    pub listing_id: String,
    pub photos: Vec<GalleryPhoto>,
    pub end: GalleryEnd,
}

impl Gallery {
    /// Whether the gallery may be missing photos
    pub fn is_incomplete(&self) -> bool {
        matches!(self.end, GalleryEnd::Interrupted(_))
    }
}

impl PhotoFetcher {
    /// Load every photo of a listing, in index order.
    ///
    /// Gallery photos are not cached. No retries.
    pub async fn gallery(self, listing_id: String) -> Gallery {
        if listing_id.is_empty() {
            return Gallery {
                listing_id,
                photos: Vec::new(),
                end: GalleryEnd::Exhausted,
            };
        }

        let (size, max_photos) = self.gallery_limits();
        let mut photos = Vec::new();
        let mut end = GalleryEnd::Capped;

        for index in 0..max_photos {
            let url = self.url(&listing_id, index, size);
            let result = self
                .run_gallery_job(move |source| {
                    let bytes = source.get(&url)?;
                    let image = image::load_from_memory(&bytes)?;
                    Ok(GalleryPhoto {
                        preview: Photo::from_image(fit_within(image.clone(), size)),
                        full: Photo::from_image(image),
                    })
                })
                .await;

            match result {
                Ok(photo) => photos.push(photo),
                Err(e) if e.is_exhaustion() => {
                    end = GalleryEnd::Exhausted;
                    break;
                }
                Err(e) => {
                    warn!("⚠️  Gallery for {} stopped at photo {}: {}", listing_id, index, e);
                    end = GalleryEnd::Interrupted(e.to_string());
                    break;
                }
            }
        }

        info!("🖼️  Loaded {} photos for {}", photos.len(), listing_id);
        Gallery {
            listing_id,
            photos,
            end,
        }
    }
}
