/// Thumbnail cache and bounded photo fetcher
///
/// Table thumbnails are fetched at most once per listing identifier.
/// Concurrent requests for the same identifier share one `OnceCell`, so
/// only the first runs the download and the rest await its result.
/// Failures are cached as a gray placeholder and never retried during the
/// session. Results go back to the UI as messages; this module never
/// touches on-screen state.
///
/// Thumbnails and galleries draw on separate permit pools, so opening a
/// listing never queues behind a freshly displayed table.
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::{OnceCell, Semaphore};
use tracing::{debug, warn};

use super::client::{photo_url, FetchError, PhotoSource};
use super::{Photo, FAILED_COLOR};
use crate::config::Settings;

/// Thread-safe thumbnail store keyed by listing identifier.
///
/// Entries are created on first request and never evicted.
#[derive(Debug, Default)]
pub struct ThumbnailCache {
    entries: DashMap<String, Arc<OnceCell<Photo>>>,
}

impl ThumbnailCache {
    /// Finished thumbnail for a listing, if any
    pub fn get(&self, listing_id: &str) -> Option<Photo> {
        self.entries
            .get(listing_id)
            .and_then(|cell| cell.get().cloned())
    }

    /// The single slot for a listing, inserting an empty one if absent
    fn slot(&self, listing_id: &str) -> Arc<OnceCell<Photo>> {
        self.entries
            .entry(listing_id.to_string())
            .or_default()
            .clone()
    }

    /// Claim the slot for a listing. False when a download has already
    /// finished or is under way.
    fn reserve(&self, listing_id: &str) -> bool {
        match self.entries.entry(listing_id.to_string()) {
            Entry::Occupied(_) => false,
            Entry::Vacant(slot) => {
                slot.insert(Arc::default());
                true
            }
        }
    }

    /// Number of finished thumbnails
    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.entries.iter().filter(|e| e.value().initialized()).count()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Concurrent gallery downloads, independent of `fetch_workers`
const GALLERY_WORKERS: usize = 1;

struct Inner {
    source: Arc<dyn PhotoSource>,
    cache: ThumbnailCache,
    permits: Semaphore,
    gallery_permits: Semaphore,
    url_template: String,
    thumbnail_request_size: u32,
    thumbnail_size: u32,
    gallery_size: u32,
    gallery_max_photos: usize,
}

/// Downloads listing photos on a fixed-size pool.
///
/// Cheap to clone; clones share the cache and the pool.
#[derive(Clone)]
pub struct PhotoFetcher {
    inner: Arc<Inner>,
}

impl PhotoFetcher {
    pub fn new(source: Arc<dyn PhotoSource>, settings: &Settings) -> Self {
        Self {
            inner: Arc::new(Inner {
                source,
                cache: ThumbnailCache::default(),
                permits: Semaphore::new(settings.workers()),
                gallery_permits: Semaphore::new(GALLERY_WORKERS),
                url_template: settings.photo_url_template.clone(),
                thumbnail_request_size: settings.thumbnail_request_size,
                thumbnail_size: settings.thumbnail_size,
                gallery_size: settings.gallery_size,
                gallery_max_photos: settings.gallery_max_photos,
            }),
        }
    }

    /// Synchronous cache lookup
    pub fn cached(&self, listing_id: &str) -> Option<Photo> {
        self.inner.cache.get(listing_id)
    }

    #[cfg(test)]
    pub fn cache(&self) -> &ThumbnailCache {
        &self.inner.cache
    }

    /// Identifiers that still need a download, in the order given.
    ///
    /// Skips empty identifiers, repeats and identifiers that are cached or
    /// already being fetched. Every returned identifier is reserved and
    /// must be passed to [`PhotoFetcher::thumbnail`].
    pub fn pending<'a>(&self, listing_ids: impl IntoIterator<Item = &'a str>) -> Vec<String> {
        listing_ids
            .into_iter()
            .filter(|id| !id.is_empty())
            .filter(|id| self.inner.cache.reserve(id))
            .map(str::to_string)
            .collect()
    }

    /// Thumbnail for a listing, downloading it on first request.
    ///
    /// Never fails: errors become the cached gray placeholder.
    pub async fn thumbnail(self, listing_id: String) -> (String, Photo) {
        if listing_id.is_empty() {
            return (listing_id, Photo::placeholder(self.inner.thumbnail_size, FAILED_COLOR));
        }

        let slot = self.inner.cache.slot(&listing_id);
        let photo = slot
            .get_or_init(|| self.download_thumbnail(&listing_id))
            .await
            .clone();
        (listing_id, photo)
    }

    async fn download_thumbnail(&self, listing_id: &str) -> Photo {
        let size = self.inner.thumbnail_size;
        let url = self.url(listing_id, 0, self.inner.thumbnail_request_size);

        match self
            .run_blocking(move |source| Photo::decode(&source.get(&url)?, size))
            .await
        {
            Ok(photo) => {
                debug!("📸 Thumbnail ready for {}", listing_id);
                photo
            }
            Err(e) => {
                debug!("Thumbnail for {} unavailable: {}", listing_id, e);
                Photo::placeholder(size, FAILED_COLOR)
            }
        }
    }

    pub(super) fn url(&self, listing_id: &str, index: usize, size: u32) -> String {
        photo_url(&self.inner.url_template, listing_id, index, size)
    }

    /// Gallery photo size and the most photo indices to probe
    pub(super) fn gallery_limits(&self) -> (u32, usize) {
        (self.inner.gallery_size, self.inner.gallery_max_photos)
    }

    /// Run blocking thumbnail work once a pool permit is free.
    ///
    /// Permits are handed out in request order, so work queued for a
    /// freshly displayed table is served top to bottom.
    pub(super) async fn run_blocking<T, F>(&self, job: F) -> Result<T, FetchError>
    where
        T: Send + 'static,
        F: FnOnce(&dyn PhotoSource) -> Result<T, FetchError> + Send + 'static,
    {
        self.run_with(&self.inner.permits, job).await
    }

    /// Run blocking gallery work on the gallery's own permits
    pub(super) async fn run_gallery_job<T, F>(&self, job: F) -> Result<T, FetchError>
    where
        T: Send + 'static,
        F: FnOnce(&dyn PhotoSource) -> Result<T, FetchError> + Send + 'static,
    {
        self.run_with(&self.inner.gallery_permits, job).await
    }

    async fn run_with<T, F>(&self, permits: &Semaphore, job: F) -> Result<T, FetchError>
    where
        T: Send + 'static,
        F: FnOnce(&dyn PhotoSource) -> Result<T, FetchError> + Send + 'static,
    {
        let _permit = permits
            .acquire()
            .await
            .map_err(|e| FetchError::Worker(e.to_string()))?;

        let source = Arc::clone(&self.inner.source);
        tokio::task::spawn_blocking(move || job(source.as_ref()))
            .await
            .map_err(|e| {
                warn!("⚠️  Photo worker failed: {}", e);
                FetchError::Worker(e.to_string())
            })?
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::photo::client::fakes::FakeSource;
    use crate::photo::test_support::png;
    use std::time::Duration;

    const THUMB_URL: &str = "http://media.mlspin.com/photo.aspx?mls=7001&n=0&w=150&h=150";

    fn fetcher(source: Arc<FakeSource>) -> PhotoFetcher {
        PhotoFetcher::new(source, &Settings::default())
    }

    #[tokio::test]
    async fn test_fetch_decodes_and_caches() {
        let source = Arc::new(FakeSource::new());
        source.ok(THUMB_URL, png(300, 150));
        let fetcher = fetcher(source.clone());

        assert!(fetcher.cached("7001").is_none());

        let (id, photo) = fetcher.clone().thumbnail("7001".into()).await;
        assert_eq!(id, "7001");
        assert!(!photo.is_placeholder);
        assert_eq!((photo.width, photo.height), (100, 50));

        let hit = fetcher.cached("7001").unwrap();
        assert_eq!(hit.width, 100);
        assert_eq!(source.requested(), vec![THUMB_URL.to_string()]);
    }

    #[tokio::test]
    async fn test_failed_fetch_caches_placeholder() {
        let source = Arc::new(FakeSource::new());
        source.status(THUMB_URL, 500);
        let fetcher = fetcher(source.clone());

        let (_, photo) = fetcher.clone().thumbnail("7001".into()).await;
        assert!(photo.is_placeholder);
        assert_eq!((photo.width, photo.height), (100, 100));
        assert_eq!(source.calls(), 1);

        // Second request is served from the cache
        let (_, again) = fetcher.clone().thumbnail("7001".into()).await;
        assert!(again.is_placeholder);
        assert!(fetcher.cached("7001").unwrap().is_placeholder);
        assert_eq!(source.calls(), 1);
    }

    #[tokio::test]
    async fn test_undecodable_body_caches_placeholder() {
        let source = Arc::new(FakeSource::new());
        source.ok(THUMB_URL, b"<html>gone</html>".to_vec());
        let fetcher = fetcher(source.clone());

        let (_, photo) = fetcher.clone().thumbnail("7001".into()).await;
        assert!(photo.is_placeholder);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_requests_collapse() {
        let source = Arc::new(FakeSource::with_delay(Duration::from_millis(50)));
        source.ok(THUMB_URL, png(50, 50));
        let fetcher = fetcher(source.clone());

        let (a, b, c) = tokio::join!(
            fetcher.clone().thumbnail("7001".into()),
            fetcher.clone().thumbnail("7001".into()),
            fetcher.clone().thumbnail("7001".into()),
        );

        assert_eq!(source.calls(), 1);
        assert!(!a.1.is_placeholder && !b.1.is_placeholder && !c.1.is_placeholder);
        assert_eq!(fetcher.cache().len(), 1);
    }

    #[tokio::test]
    async fn test_empty_identifier_is_never_fetched() {
        let source = Arc::new(FakeSource::new());
        let fetcher = fetcher(source.clone());

        let (_, photo) = fetcher.clone().thumbnail(String::new()).await;
        assert!(photo.is_placeholder);
        assert_eq!(source.calls(), 0);
        assert!(fetcher.cache().is_empty());
    }

    #[tokio::test]
    async fn test_pending_skips_empty_cached_and_repeats() {
        let source = Arc::new(FakeSource::new());
        source.ok(THUMB_URL, png(20, 20));
        let fetcher = fetcher(source.clone());
        fetcher.clone().thumbnail("7001".into()).await;

        let pending = fetcher.pending(["7002", "", "7001", "7003", "7002"]);
        assert_eq!(pending, vec!["7002", "7003"]);
    }

    #[tokio::test]
    async fn test_pending_skips_downloads_in_flight() {
        let source = Arc::new(FakeSource::new());
        let fetcher = fetcher(source.clone());

        // Re-filtering before the first batch finishes queues nothing new
        assert_eq!(fetcher.pending(["7002", "7003"]), vec!["7002", "7003"]);
        assert_eq!(fetcher.pending(["7003", "7002", "7004"]), vec!["7004"]);

        for id in ["7002", "7003", "7004"] {
            let (_, photo) = fetcher.clone().thumbnail(id.into()).await;
            assert!(photo.is_placeholder);
        }
        assert_eq!(source.calls(), 3);
        assert!(fetcher.pending(["7002", "7003", "7004"]).is_empty());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_pool_bounds_concurrency() {
        use std::sync::atomic::{AtomicUsize, Ordering};

        struct Tracking {
            active: AtomicUsize,
            peak: AtomicUsize,
        }

        impl PhotoSource for Tracking {
            fn get(&self, _url: &str) -> Result<Vec<u8>, FetchError> {
                let now = self.active.fetch_add(1, Ordering::SeqCst) + 1;
                self.peak.fetch_max(now, Ordering::SeqCst);
                std::thread::sleep(Duration::from_millis(20));
                self.active.fetch_sub(1, Ordering::SeqCst);
                Err(FetchError::NotFound)
            }
        }

        let source = Arc::new(Tracking {
            active: AtomicUsize::new(0),
            peak: AtomicUsize::new(0),
        });
        let settings = Settings {
            fetch_workers: 2,
            ..Settings::default()
        };
        let fetcher = PhotoFetcher::new(source.clone(), &settings);

        let tasks: Vec<_> = (0..8)
            .map(|i| tokio::spawn(fetcher.clone().thumbnail(format!("{}", 9000 + i))))
            .collect();
        for task in tasks {
            task.await.unwrap();
        }

        assert!(source.peak.load(Ordering::SeqCst) <= 2);
        assert_eq!(fetcher.cache().len(), 8);
    }
}
