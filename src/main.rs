use iced::widget::image::Handle;
use iced::widget::{column, container, row, text};
use iced::{Element, Length, Size, Task, Theme};
use rfd::{FileDialog, MessageDialog, MessageLevel};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod config;
mod photo;
mod state;
mod ui;

use config::Settings;
use photo::client::ReqwestClient;
use photo::gallery::Gallery;
use photo::thumbnail::PhotoFetcher;
use photo::{Photo, PENDING_COLOR};
use state::filter::FilterCriteria;
use state::session::Session;
use state::table::LoadError;
use state::zip::ZipLookup;
use ui::detail::Detail;
use ui::filters::FilterField;
use ui::table::TableView;

/// Main application state
struct PropertyViewer {
    settings: Settings,
    /// Loaded listings, ZIP lookup and sort toggles
    session: Session,
    /// Background photo downloads and the thumbnail cache
    fetcher: PhotoFetcher,
    /// Current filter inputs
    criteria: FilterCriteria,
    /// Dropdown options, each starting with "" for "any"
    counties: Vec<String>,
    towns: Vec<String>,
    /// Table rows currently displayed, in display order
    displayed: Vec<usize>,
    /// Thumbnails patched in as they arrive
    thumbnails: HashMap<String, Handle>,
    /// Light-gray stand-in for rows still waiting on a thumbnail
    pending: Handle,
    detail: Option<Detail>,
    /// Status message to display to the user
    status: String,
}

/// Application messages (events)
#[derive(Debug, Clone)]
enum Message {
    /// User clicked "Load Property File"
    LoadFile,
    FilterChanged(FilterField, String),
    CountySelected(String),
    TownSelected(String),
    /// User clicked a column header
    SortBy(String),
    /// A background thumbnail fetch finished
    ThumbnailReady((String, Photo)),
    /// User clicked a table row
    RowSelected(usize),
    GalleryLoaded(Gallery),
    Enlarge(usize),
    CloseEnlarged,
    CloseDetail,
}

impl PropertyViewer {
    /// Create a new instance of the application
    fn new() -> (Self, Task<Message>) {
        let settings = Settings::load();

        // A missing ZIP file is not fatal: towns just stay unresolved
        let zip_path = settings.zip_path();
        let zips = ZipLookup::load(&zip_path).unwrap_or_else(|e| {
            error!("❌ {}", e);
            show_error("Missing File", &e.to_string());
            ZipLookup::default()
        });

        let source = Arc::new(ReqwestClient::new(settings.request_timeout()));
        let fetcher = PhotoFetcher::new(source, &settings);
        let pending = Photo::placeholder(settings.thumbnail_size, PENDING_COLOR).handle;

        info!("🏠 Property viewer ready ({} ZIP codes)", zips.len());

        (
            PropertyViewer {
                settings,
                session: Session::new(zips),
                fetcher,
                criteria: FilterCriteria::default(),
                counties: Vec::new(),
                towns: Vec::new(),
                displayed: Vec::new(),
                thumbnails: HashMap::new(),
                pending,
                detail: None,
                status: "Load a property file to begin.".to_string(),
            },
            Task::none(),
        )
    }

    /// Handle application messages and update state
    fn update(&mut self, message: Message) -> Task<Message> {
        match message {
            Message::LoadFile => {
                // Show the native file picker dialog
                let file = FileDialog::new()
                    .set_title("Select property file")
                    .add_filter("CSV / TXT", &["csv", "txt"])
                    .add_filter("All files", &["*"])
                    .pick_file();

                match file {
                    Some(path) => self.load_file(&path),
                    None => Task::none(),
                }
            }
            Message::FilterChanged(field, value) => {
                field.set(&mut self.criteria, value);
                self.apply_filters()
            }
            Message::CountySelected(county) => {
                self.criteria.county = county;
                self.apply_filters()
            }
            Message::TownSelected(town) => {
                self.criteria.town = town;
                self.apply_filters()
            }
            Message::SortBy(column) => {
                self.session.sort(&mut self.displayed, &column);
                Task::none()
            }
            Message::ThumbnailReady((listing_id, photo)) => {
                if photo.is_placeholder {
                    debug!("No thumbnail for {}, showing placeholder", listing_id);
                }
                self.thumbnails.insert(listing_id, photo.handle);
                Task::none()
            }
            Message::RowSelected(row) => {
                let Some(table) = self.session.table() else {
                    return Task::none();
                };
                let listing_id = table.listing_id(row).to_string();
                self.detail = Some(Detail::new(row, listing_id.clone()));

                Task::perform(self.fetcher.clone().gallery(listing_id), Message::GalleryLoaded)
            }
            Message::GalleryLoaded(gallery) => {
                // Ignore galleries for a listing that is no longer open
                if let Some(detail) = self.detail.as_mut() {
                    if detail.listing_id == gallery.listing_id {
                        detail.gallery = Some(gallery);
                    }
                }
                Task::none()
            }
            Message::Enlarge(index) => {
                if let Some(detail) = self.detail.as_mut() {
                    detail.enlarged = Some(index);
                }
                Task::none()
            }
            Message::CloseEnlarged => {
                if let Some(detail) = self.detail.as_mut() {
                    detail.enlarged = None;
                }
                Task::none()
            }
            Message::CloseDetail => {
                self.detail = None;
                Task::none()
            }
        }
    }

    /// Load a listing file synchronously, keeping the old table on failure
    fn load_file(&mut self, path: &std::path::Path) -> Task<Message> {
        match self.session.load_file(path) {
            Ok(summary) => {
                self.counties = std::iter::once(String::new()).chain(summary.counties).collect();
                self.towns = std::iter::once(String::new()).chain(summary.towns).collect();
                self.criteria.county.clear();
                self.criteria.town.clear();
                self.detail = None;
                self.status = format!("Loaded {} rows successfully.", summary.rows);
                self.apply_filters()
            }
            Err(e) => {
                warn!("⚠️  Could not load {}: {}", path.display(), e);
                let title = match &e {
                    LoadError::NoReadableRows => "File Error",
                    LoadError::MissingColumns(_) => "Invalid File",
                    _ => "Load Error",
                };
                show_error(title, &e.to_string());
                Task::none()
            }
        }
    }

    /// Re-run the filters over the whole table and queue thumbnails
    /// for the rows now on screen
    fn apply_filters(&mut self) -> Task<Message> {
        self.displayed = self.session.filter(&self.criteria);

        let Some(table) = self.session.table() else {
            return Task::none();
        };
        let ids: Vec<&str> = self.displayed.iter().map(|&i| table.listing_id(i)).collect();

        // Cache hits are applied immediately
        for id in &ids {
            if !self.thumbnails.contains_key(*id) {
                if let Some(photo) = self.fetcher.cached(id) {
                    self.thumbnails.insert(id.to_string(), photo.handle);
                }
            }
        }

        let fetches: Vec<Task<Message>> = self
            .fetcher
            .pending(ids)
            .into_iter()
            .map(|id| Task::perform(self.fetcher.clone().thumbnail(id), Message::ThumbnailReady))
            .collect();

        Task::batch(fetches)
    }

    /// Build the user interface
    fn view(&self) -> Element<'_, Message> {
        let filters = ui::filters::view(&self.criteria, &self.counties, &self.towns);

        let main: Element<'_, Message> = match (self.session.table(), &self.detail) {
            (Some(table), Some(detail)) => detail.view(table, self.settings.gallery_size),
            (Some(table), None) => TableView {
                table,
                rows: &self.displayed,
                thumbnails: &self.thumbnails,
                pending: &self.pending,
                thumbnail_size: self.settings.thumbnail_size,
            }
            .view(),
            (None, _) => container(text("No property file loaded."))
                .center_x(Length::Fill)
                .center_y(Length::Fill)
                .into(),
        };

        let total = self.session.table().map_or(0, |t| t.len());
        let shown = format!("{} of {} listings shown", self.displayed.len(), total);

        column![
            row![filters, main].spacing(10).height(Length::Fill),
            row![text(&self.status).size(14), text(shown).size(14)].spacing(30),
        ]
        .padding(5)
        .into()
    }

    /// Set the application theme
    fn theme(&self) -> Theme {
        Theme::Dark
    }
}

/// Blocking error dialog
fn show_error(title: &str, description: &str) {
    MessageDialog::new()
        .set_level(MessageLevel::Error)
        .set_title(title)
        .set_description(description)
        .show();
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();
}

fn main() -> iced::Result {
    init_tracing();

    iced::application(
        "Property Viewer",
        PropertyViewer::update,
        PropertyViewer::view,
    )
    .theme(PropertyViewer::theme)
    .window_size(Size::new(1800.0, 800.0))
    .centered()
    .run_with(PropertyViewer::new)
}
