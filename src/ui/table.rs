/// Results table: thumbnail column plus every visible listing column
use iced::widget::image::Handle;
use iced::widget::{button, container, image, mouse_area, row, scrollable, text, Column, Row};
use iced::{Element, Length};
use std::collections::HashMap;

use crate::state::table::ListingTable;
use crate::Message;

/// Width of each data column (px)
const COL_WIDTH: f32 = 250.0;

pub struct TableView<'a> {
    pub table: &'a ListingTable,
    /// Row indices to show, in display order
    pub rows: &'a [usize],
    /// Thumbnails that have arrived, by listing identifier
    pub thumbnails: &'a HashMap<String, Handle>,
    /// Shown until a row's thumbnail arrives
    pub pending: &'a Handle,
    pub thumbnail_size: u32,
}

impl<'a> TableView<'a> {
    pub fn view(self) -> Element<'a, Message> {
        let schema = self.table.schema();
        let visible = schema.visible();
        let photo_width = self.thumbnail_size as f32 + 20.0;

        let mut header: Row<Message> = Row::new()
            .spacing(4)
            .push(container(text("Photo")).width(Length::Fixed(photo_width)));
        for &col in &visible {
            let name = &schema.columns()[col];
            header = header.push(
                button(text(name.as_str()))
                    .on_press(Message::SortBy(name.clone()))
                    .width(Length::Fixed(COL_WIDTH)),
            );
        }

        let mut body = Column::new().spacing(4).push(header);
        for &index in self.rows {
            let listing_id = self.table.listing_id(index);
            let thumb = self.thumbnails.get(listing_id).unwrap_or(self.pending);

            let mut cells: Row<Message> = row![container(
                image(thumb.clone())
                    .width(Length::Fixed(self.thumbnail_size as f32))
                    .height(Length::Fixed(self.thumbnail_size as f32))
            )
            .center_x(Length::Fixed(photo_width))]
            .spacing(4);

            let listing = &self.table.rows()[index];
            for &col in &visible {
                cells = cells.push(text(listing[col].as_str()).size(14).width(Length::Fixed(COL_WIDTH)));
            }

            body = body.push(mouse_area(cells).on_press(Message::RowSelected(index)));
        }

        scrollable(body)
            .direction(scrollable::Direction::Both {
                vertical: scrollable::Scrollbar::default(),
                horizontal: scrollable::Scrollbar::default(),
            })
            .width(Length::Fill)
            .height(Length::Fill)
            .into()
    }
}
