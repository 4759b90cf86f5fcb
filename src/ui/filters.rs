/// Left-hand filter panel: text filters plus county/town dropdowns
use iced::widget::{button, column, pick_list, text, text_input, Column};
use iced::{Element, Length};

use crate::state::filter::FilterCriteria;
use crate::Message;

/// Which text filter changed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterField {
    MinBeds,
    MinBaths,
    MinPrice,
    MaxPrice,
    MinSqft,
    Remarks,
}

impl FilterField {
    const ALL: [FilterField; 6] = [
        FilterField::MinBeds,
        FilterField::MinBaths,
        FilterField::MinPrice,
        FilterField::MaxPrice,
        FilterField::MinSqft,
        FilterField::Remarks,
    ];

    fn label(self) -> &'static str {
        match self {
            FilterField::MinBeds => "Min Beds",
            FilterField::MinBaths => "Min Baths",
            FilterField::MinPrice => "Price Min",
            FilterField::MaxPrice => "Price Max",
            FilterField::MinSqft => "Min Sq Ft",
            FilterField::Remarks => "Remarks Contains",
        }
    }

    /// The criteria field this input edits
    pub fn value(self, criteria: &FilterCriteria) -> &str {
        match self {
            FilterField::MinBeds => &criteria.min_beds,
            FilterField::MinBaths => &criteria.min_baths,
            FilterField::MinPrice => &criteria.min_price,
            FilterField::MaxPrice => &criteria.max_price,
            FilterField::MinSqft => &criteria.min_sqft,
            FilterField::Remarks => &criteria.remarks,
        }
    }

    pub fn set(self, criteria: &mut FilterCriteria, value: String) {
        let slot = match self {
            FilterField::MinBeds => &mut criteria.min_beds,
            FilterField::MinBaths => &mut criteria.min_baths,
            FilterField::MinPrice => &mut criteria.min_price,
            FilterField::MaxPrice => &mut criteria.max_price,
            FilterField::MinSqft => &mut criteria.min_sqft,
            FilterField::Remarks => &mut criteria.remarks,
        };
        *slot = value;
    }
}

/// Build the filter panel
pub fn view<'a>(
    criteria: &'a FilterCriteria,
    counties: &'a [String],
    towns: &'a [String],
) -> Element<'a, Message> {
    let mut panel: Column<Message> = column![
        button("Load Property File")
            .on_press(Message::LoadFile)
            .padding(10),
        text("Filters").size(18),
    ]
    .spacing(8)
    .padding(5)
    .width(Length::Fixed(180.0));

    for field in FilterField::ALL {
        panel = panel.push(
            column![
                text(field.label()).size(14),
                text_input("", field.value(criteria))
                    .on_input(move |value| Message::FilterChanged(field, value))
                    .width(Length::Fixed(150.0)),
            ]
            .spacing(2),
        );
    }

    panel = panel
        .push(text("County").size(14))
        .push(
            pick_list(counties, selected(&criteria.county), Message::CountySelected)
                .placeholder("Any")
                .width(Length::Fixed(150.0)),
        )
        .push(text("Town").size(14))
        .push(
            pick_list(towns, selected(&criteria.town), Message::TownSelected)
                .placeholder("Any")
                .width(Length::Fixed(170.0)),
        );

    panel.into()
}

/// Empty selection shows the placeholder
fn selected(value: &String) -> Option<&String> {
    (!value.is_empty()).then_some(value)
}
