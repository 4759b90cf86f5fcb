/// Detail view for one listing: every field plus its photo gallery
use iced::widget::{button, column, container, image, mouse_area, row, scrollable, text, Column};
use iced::{Element, Length};
use iced_aw::Wrap;

use crate::photo::gallery::Gallery;
use crate::photo::Photo;
use crate::state::table::ListingTable;
use crate::Message;

/// Gallery tiles per line
const GALLERY_COLUMNS: usize = 4;
const TILE_PADDING: u16 = 5;
const TILE_SPACING: f32 = 5.0;

/// Currently open listing
#[derive(Debug, Clone)]
pub struct Detail {
    /// Row index in the listing table
    pub row: usize,
    pub listing_id: String,
    /// `None` while photos are still loading
    pub gallery: Option<Gallery>,
    /// Gallery photo shown at full size
    pub enlarged: Option<usize>,
}

impl Detail {
    pub fn new(row: usize, listing_id: String) -> Self {
        Self {
            row,
            listing_id,
            gallery: None,
            enlarged: None,
        }
    }

    pub fn view<'a>(&'a self, table: &'a ListingTable, tile_size: u32) -> Element<'a, Message> {
        let header = row![
            button("← Back").on_press(Message::CloseDetail),
            text("Property Details").size(22),
        ]
        .spacing(20);

        let schema = table.schema();
        let mut fields = Column::new().spacing(2);
        if let Some(listing) = table.row(self.row) {
            for col in schema.visible() {
                fields = fields.push(text(format!("{}: {}", schema.columns()[col], listing[col])).size(14));
            }
        }

        let photos: Element<'a, Message> = match (&self.gallery, self.enlarged) {
            (None, _) => text("Loading photos...").into(),
            (Some(gallery), Some(index)) if index < gallery.photos.len() => column![
                button("Close").on_press(Message::CloseEnlarged),
                scrollable(full_size(&gallery.photos[index].full)).direction(
                    scrollable::Direction::Both {
                        vertical: scrollable::Scrollbar::default(),
                        horizontal: scrollable::Scrollbar::default(),
                    }
                ),
            ]
            .spacing(10)
            .into(),
            (Some(gallery), _) => gallery_grid(gallery, tile_size),
        };

        column![
            header,
            container(scrollable(fields)).height(Length::FillPortion(1)),
            container(photos).height(Length::FillPortion(2)),
        ]
        .spacing(15)
        .padding(10)
        .width(Length::Fill)
        .into()
    }
}

fn gallery_grid(gallery: &Gallery, tile_size: u32) -> Element<'_, Message> {
    if gallery.photos.is_empty() && !gallery.is_incomplete() {
        return text("No photos available").into();
    }

    let tile = tile_size as f32 + 2.0 * f32::from(TILE_PADDING);
    let tiles: Vec<Element<'_, Message>> = gallery
        .photos
        .iter()
        .enumerate()
        .map(|(i, photo)| {
            mouse_area(
                container(full_size(&photo.preview))
                    .padding(TILE_PADDING)
                    .center_x(tile),
            )
            .on_press(Message::Enlarge(i))
            .into()
        })
        .collect();

    let mut content = Column::new().spacing(10);
    if gallery.is_incomplete() {
        content = content.push(text("⚠️ Some photos could not be loaded; the gallery may be incomplete.").size(14));
    }
    content = content.push(
        Wrap::with_elements(tiles)
            .spacing(TILE_SPACING)
            .line_spacing(TILE_SPACING)
            .max_width(GALLERY_COLUMNS as f32 * (tile + TILE_SPACING)),
    );

    scrollable(content).width(Length::Fill).into()
}

/// A photo at its decoded pixel size
fn full_size(photo: &Photo) -> Element<'_, Message> {
    image(photo.handle.clone())
        .width(photo.width as f32)
        .height(photo.height as f32)
        .into()
}
