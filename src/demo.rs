//! Built-in tutorial screen
//!
//! Shown when the CLI is started without a description file. It walks
//! through the primitives: plain rows of text, a centered banner, a
//! space-evenly column at 30% height, a bordered column with nested rings,
//! and an image card.

use crate::assets::{Bitmap, ImageStore};
use crate::ast::*;

pub const CARD_IMAGE: &str = "aj1";
pub const CARD_TITLE: &str = "Air Jordan 1";
pub const CARD_DESCRIPTION: &str = "Air Jordan 1 X OFFWhite Chicago";

const HEADLINE: &str = "First Jetpack Compose Tutorial";

pub fn tutorial_screen() -> Node {
    let text_row = || Container::row().children([Text::new(HEADLINE), Text::new(HEADLINE)]);
    let hello_world = || [Text::new("Hello"), Text::new("World"), Text::new("Hello")];

    Container::column()
        .width(Length::FILL)
        .height(Length::FILL)
        .child(text_row())
        .child(text_row())
        .child(Container::column().child(text_row()).child(text_row()))
        .child(
            Container::column().child(
                Container::row()
                    .width(Length::FILL)
                    .padding(10.0)
                    .background(Color::GREEN)
                    .align(Alignment::Center)
                    .arrange(Arrangement::Center)
                    .child(Text::new("Learning to place components in rows and columns")),
            ),
        )
        .child(
            Container::column()
                .background(Color::CYAN)
                .width(Length::FILL)
                .height(Length::Fraction(0.3))
                .arrange(Arrangement::SpaceEvenly)
                .align(Alignment::Center)
                .children(hello_world()),
        )
        .child(
            Container::row()
                .width(Length::FILL)
                .background(Color::YELLOW)
                .padding(10.0)
                .align(Alignment::Center)
                .arrange(Arrangement::SpaceEvenly)
                .children(hello_world()),
        )
        .child(
            Container::column()
                .background(Color::GREEN)
                .height(Length::Fraction(0.5))
                .width(Length::Fixed(300.0))
                .border(5.0, Color::BLACK)
                .padding(5.0)
                .border(5.0, Color::BLUE)
                .padding(5.0)
                .border(5.0, Color::RED)
                .padding(10.0)
                .child(Spacer::height(20.0))
                .child(Text::new("New Column1"))
                .child(Spacer::height(50.0))
                .child(Text::new("New Column2")),
        )
        .child(
            Container::column()
                .width(Length::Fraction(0.5))
                .padding(16.0)
                .child(ImageCard::new(CARD_IMAGE, CARD_DESCRIPTION, CARD_TITLE)),
        )
        .into()
}

/// Stand-in for the card photo when no asset directory provides one.
pub fn placeholder_image() -> Bitmap {
    let (w, h) = (320u32, 200u32);
    let mut rgba = Vec::with_capacity((w * h * 4) as usize);
    for y in 0..h {
        for x in 0..w {
            let band = (x + y) / 40 % 3;
            let c = match band {
                0 => Color::from_rgb(200, 16, 46),
                1 => Color::WHITE,
                _ => Color::from_rgb(20, 20, 20),
            };
            rgba.extend_from_slice(&[c.r, c.g, c.b, 255]);
        }
    }
    Bitmap { width: w, height: h, rgba }
}

/// Register the placeholder unless the store already has a real image.
pub fn ensure_card_image(images: &mut ImageStore) {
    if !images.contains(CARD_IMAGE) {
        images.insert(CARD_IMAGE, placeholder_image());
    }
}
