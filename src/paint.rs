//! Painter: resolved layout → ordered display list
//!
//! Items are emitted back to front. The rasterizer draws them in list
//! order, so an item always lands on top of every item before it.

use crate::ast::{Color, Decoration, ImageCard, Node, TextStyle};
use crate::layout::{LayoutBox, Rect};
use crate::text::Typesetter;

#[derive(Debug, Clone, PartialEq)]
pub enum DisplayItem {
    FillRect {
        rect: Rect,
        color: Color,
    },
    /// Stroke drawn inside `rect`.
    StrokeRect {
        rect: Rect,
        width: f32,
        color: Color,
    },
    /// One line of text; `y` is the top of the line box.
    Text {
        x: f32,
        y: f32,
        text: String,
        style: TextStyle,
    },
    /// Image scaled to fit `bounds`, centered.
    Image {
        id: String,
        bounds: Rect,
    },
    /// `top` above `start_y`, blending to `bottom` at the last row.
    VerticalGradient {
        rect: Rect,
        start_y: f32,
        top: Color,
        bottom: Color,
    },
    PushClip {
        rect: Rect,
        radius: f32,
    },
    PopClip,
}

impl DisplayItem {
    pub fn kind(&self) -> &'static str {
        match self {
            DisplayItem::FillRect { .. } => "fill",
            DisplayItem::StrokeRect { .. } => "stroke",
            DisplayItem::Text { .. } => "text",
            DisplayItem::Image { .. } => "image",
            DisplayItem::VerticalGradient { .. } => "gradient",
            DisplayItem::PushClip { .. } => "push-clip",
            DisplayItem::PopClip => "pop-clip",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct DisplayList {
    pub items: Vec<DisplayItem>,
}

impl DisplayList {
    pub fn push(&mut self, item: DisplayItem) {
        self.items.push(item);
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, DisplayItem> {
        self.items.iter()
    }
}

pub fn paint(root: &LayoutBox<'_>, ts: &Typesetter) -> DisplayList {
    let mut list = DisplayList::default();
    paint_box(&mut list, root, ts);
    list
}

fn paint_box(list: &mut DisplayList, b: &LayoutBox<'_>, ts: &Typesetter) {
    for d in &b.decorations {
        match d.decoration {
            Decoration::Background(color) => list.push(DisplayItem::FillRect { rect: d.rect, color }),
            Decoration::Border { width, color } => list.push(DisplayItem::StrokeRect {
                rect: d.rect,
                width,
                color,
            }),
            Decoration::Padding(_) => {}
        }
    }

    match b.node {
        Node::Container(_) => {
            for child in &b.children {
                paint_box(list, child, ts);
            }
        }
        Node::Text(t) => {
            let line_height = ts.line_height(t.style.size);
            for (i, line) in b.lines.iter().enumerate() {
                list.push(DisplayItem::Text {
                    x: b.frame.x,
                    y: b.frame.y + i as f32 * line_height,
                    text: line.clone(),
                    style: t.style,
                });
            }
        }
        Node::Spacer(_) => {}
        Node::ImageCard(card) => paint_image_card(list, b.frame, card, ts),
    }
}

/// Card layers, bottom to top: surface, image, scrim, caption.
fn paint_image_card(list: &mut DisplayList, frame: Rect, card: &ImageCard, ts: &Typesetter) {
    list.push(DisplayItem::PushClip {
        rect: frame,
        radius: card.corner_radius,
    });
    list.push(DisplayItem::FillRect {
        rect: frame,
        color: ImageCard::SURFACE_COLOR,
    });
    list.push(DisplayItem::Image {
        id: card.image.clone(),
        bounds: frame,
    });
    list.push(DisplayItem::VerticalGradient {
        rect: frame,
        start_y: frame.y + card.gradient_start,
        top: Color::TRANSPARENT,
        bottom: Color::BLACK,
    });

    let style = TextStyle {
        color: ImageCard::CAPTION_COLOR,
        size: ImageCard::CAPTION_SIZE,
    };
    let inner = frame.inset(
        ImageCard::CAPTION_INSET,
        ImageCard::CAPTION_INSET,
        ImageCard::CAPTION_INSET,
        ImageCard::CAPTION_INSET,
    );
    let text_w = ts.measure(&card.title, style.size);
    list.push(DisplayItem::Text {
        x: inner.x + (inner.width - text_w) / 2.0,
        y: inner.bottom() - ts.line_height(style.size),
        text: card.title.clone(),
        style,
    });
    list.push(DisplayItem::PopClip);
}
