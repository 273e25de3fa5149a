//! Description tree for Tessera layouts
//!
//! A layout is an immutable tree of node descriptions: stacking containers,
//! text labels, spacers and image cards. Building a tree never fails and
//! never touches the outside world; sizes, distribution and decorations are
//! only resolved later by the layout pass.

use std::fmt;

use crate::assets::ImageStore;
use crate::error::{Error, Result};

// ============================================================================
// NODES
// ============================================================================

/// A node in the description tree
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Container(Container),
    Text(Text),
    Spacer(Spacer),
    ImageCard(ImageCard),
}

impl Node {
    pub fn text(content: impl Into<String>) -> Node {
        Node::Text(Text::new(content))
    }

    pub fn spacer(height: f32) -> Node {
        Node::Spacer(Spacer::height(height))
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            Node::Container(c) => match c.axis {
                Axis::Vertical => "Column",
                Axis::Horizontal => "Row",
            },
            Node::Text(_) => "Text",
            Node::Spacer(_) => "Spacer",
            Node::ImageCard(_) => "ImageCard",
        }
    }

    pub fn children(&self) -> &[Node] {
        match self {
            Node::Container(c) => &c.children,
            _ => &[],
        }
    }
}

impl From<Container> for Node {
    fn from(c: Container) -> Self {
        Node::Container(c)
    }
}

impl From<Text> for Node {
    fn from(t: Text) -> Self {
        Node::Text(t)
    }
}

impl From<Spacer> for Node {
    fn from(s: Spacer) -> Self {
        Node::Spacer(s)
    }
}

impl From<ImageCard> for Node {
    fn from(card: ImageCard) -> Self {
        Node::ImageCard(card)
    }
}

/// Direction children are stacked in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Axis {
    #[default]
    Vertical,
    Horizontal,
}

/// Distribution of children along the main axis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Arrangement {
    #[default]
    Start,
    End,
    Center,
    /// Equal space before, between and after children.
    SpaceEvenly,
    /// All free space between children, none at the ends.
    SpaceBetween,
    /// Equal space around each child; the ends get half.
    SpaceAround,
}

impl Arrangement {
    pub fn from_name(name: &str) -> Option<Arrangement> {
        match name {
            "start" | "top" => Some(Arrangement::Start),
            "end" | "bottom" => Some(Arrangement::End),
            "center" => Some(Arrangement::Center),
            "space-evenly" | "space_evenly" => Some(Arrangement::SpaceEvenly),
            "space-between" | "space_between" => Some(Arrangement::SpaceBetween),
            "space-around" | "space_around" => Some(Arrangement::SpaceAround),
            _ => None,
        }
    }
}

/// Placement of children on the cross axis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Alignment {
    #[default]
    Start,
    Center,
    End,
}

impl Alignment {
    pub fn from_name(name: &str) -> Option<Alignment> {
        match name {
            "start" | "top" | "left" => Some(Alignment::Start),
            "center" => Some(Alignment::Center),
            "end" | "bottom" | "right" => Some(Alignment::End),
            _ => None,
        }
    }
}

/// Size constraint for one axis of a container
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Length {
    /// Size to content.
    #[default]
    Wrap,
    /// Fixed length in logical pixels.
    Fixed(f32),
    /// Fraction of the parent's resolved content size, in (0, 1].
    Fraction(f32),
}

impl Length {
    pub const FILL: Length = Length::Fraction(1.0);
}

/// A stacking container
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Container {
    pub axis: Axis,
    pub children: Vec<Node>,
    pub arrangement: Arrangement,
    pub alignment: Alignment,
    /// Applied outer to inner, in order.
    pub decorations: Vec<Decoration>,
    pub width: Length,
    pub height: Length,
}

impl Container {
    pub fn column() -> Self {
        Self {
            axis: Axis::Vertical,
            ..Self::default()
        }
    }

    pub fn row() -> Self {
        Self {
            axis: Axis::Horizontal,
            ..Self::default()
        }
    }

    pub fn width(mut self, width: Length) -> Self {
        self.width = width;
        self
    }

    pub fn height(mut self, height: Length) -> Self {
        self.height = height;
        self
    }

    pub fn arrange(mut self, arrangement: Arrangement) -> Self {
        self.arrangement = arrangement;
        self
    }

    pub fn align(mut self, alignment: Alignment) -> Self {
        self.alignment = alignment;
        self
    }

    /// Replace the whole decoration list.
    pub fn decorations(mut self, decorations: Vec<Decoration>) -> Self {
        self.decorations = decorations;
        self
    }

    /// Append one decoration inside the ones already declared.
    pub fn decorate(mut self, decoration: Decoration) -> Self {
        self.decorations.push(decoration);
        self
    }

    pub fn background(self, color: Color) -> Self {
        self.decorate(Decoration::Background(color))
    }

    pub fn border(self, width: f32, color: Color) -> Self {
        self.decorate(Decoration::Border { width, color })
    }

    pub fn padding(self, value: f32) -> Self {
        self.decorate(Decoration::Padding(Insets::all(value)))
    }

    pub fn child(mut self, child: impl Into<Node>) -> Self {
        self.children.push(child.into());
        self
    }

    pub fn children<I, N>(mut self, children: I) -> Self
    where
        I: IntoIterator<Item = N>,
        N: Into<Node>,
    {
        self.children.extend(children.into_iter().map(Into::into));
        self
    }

    /// Sum of all border widths and paddings.
    pub fn insets(&self) -> Insets {
        self.decorations
            .iter()
            .fold(Insets::ZERO, |acc, d| acc + d.insets())
    }
}

/// A text label
#[derive(Debug, Clone, PartialEq)]
pub struct Text {
    pub content: String,
    pub style: TextStyle,
}

impl Text {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            style: TextStyle::default(),
        }
    }

    pub fn color(mut self, color: Color) -> Self {
        self.style.color = color;
        self
    }

    pub fn size(mut self, size: f32) -> Self {
        self.style.size = size;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextStyle {
    pub color: Color,
    pub size: f32,
}

impl Default for TextStyle {
    fn default() -> Self {
        Self {
            color: Color::BLACK,
            size: 16.0,
        }
    }
}

/// Empty space of a fixed size
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Spacer {
    pub width: f32,
    pub height: f32,
}

impl Spacer {
    pub fn height(height: f32) -> Self {
        Self { width: 0.0, height }
    }

    pub fn width(width: f32) -> Self {
        Self { width, height: 0.0 }
    }
}

// ============================================================================
// IMAGE CARD
// ============================================================================

/// Image card: picture, gradient scrim, caption, in that z-order
#[derive(Debug, Clone, PartialEq)]
pub struct ImageCard {
    /// Identifier resolved through the image store.
    pub image: String,
    pub description: String,
    pub title: String,
    pub height: f32,
    pub corner_radius: f32,
    /// Distance from the top edge where the scrim starts darkening.
    pub gradient_start: f32,
}

impl ImageCard {
    pub const DEFAULT_HEIGHT: f32 = 200.0;
    pub const CORNER_RADIUS: f32 = 15.0;
    pub const GRADIENT_START: f32 = 100.0;
    pub const CAPTION_INSET: f32 = 12.0;
    pub const CAPTION_SIZE: f32 = 12.0;
    pub const CAPTION_COLOR: Color = Color::WHITE;
    pub const SURFACE_COLOR: Color = Color { r: 255, g: 251, b: 254, a: 255 };

    pub fn new(
        image: impl Into<String>,
        description: impl Into<String>,
        title: impl Into<String>,
    ) -> Self {
        Self {
            image: image.into(),
            description: description.into(),
            title: title.into(),
            height: Self::DEFAULT_HEIGHT,
            corner_radius: Self::CORNER_RADIUS,
            gradient_start: Self::GRADIENT_START,
        }
    }

    pub fn height(mut self, height: f32) -> Self {
        self.height = height;
        self
    }
}

// ============================================================================
// DECORATION
// ============================================================================

/// One step of a node's decoration chain
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Decoration {
    /// Fill the current rectangle.
    Background(Color),
    /// Stroke the current rectangle, then shrink it by `width`.
    Border { width: f32, color: Color },
    /// Shrink the current rectangle.
    Padding(Insets),
}

impl Decoration {
    /// How far this step moves the content rectangle inward.
    pub fn insets(&self) -> Insets {
        match self {
            Decoration::Background(_) => Insets::ZERO,
            Decoration::Border { width, .. } => Insets::all(*width),
            Decoration::Padding(p) => *p,
        }
    }
}

/// Edge insets
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Insets {
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
    pub left: f32,
}

impl Insets {
    pub const ZERO: Insets = Insets {
        top: 0.0,
        right: 0.0,
        bottom: 0.0,
        left: 0.0,
    };

    pub fn new(top: f32, right: f32, bottom: f32, left: f32) -> Self {
        Self { top, right, bottom, left }
    }

    pub fn all(value: f32) -> Self {
        Self::new(value, value, value, value)
    }

    pub fn symmetric(vertical: f32, horizontal: f32) -> Self {
        Self::new(vertical, horizontal, vertical, horizontal)
    }

    pub fn horizontal(&self) -> f32 {
        self.left + self.right
    }

    pub fn vertical(&self) -> f32 {
        self.top + self.bottom
    }
}

impl std::ops::Add for Insets {
    type Output = Insets;

    fn add(self, rhs: Insets) -> Insets {
        Insets {
            top: self.top + rhs.top,
            right: self.right + rhs.right,
            bottom: self.bottom + rhs.bottom,
            left: self.left + rhs.left,
        }
    }
}

// ============================================================================
// STYLING
// ============================================================================

/// Colors in Tessera
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const TRANSPARENT: Color = Color { r: 0, g: 0, b: 0, a: 0 };
    pub const WHITE: Color = Color { r: 255, g: 255, b: 255, a: 255 };
    pub const BLACK: Color = Color { r: 0, g: 0, b: 0, a: 255 };
    pub const GRAY: Color = Color { r: 136, g: 136, b: 136, a: 255 };
    pub const LIGHT_GRAY: Color = Color { r: 204, g: 204, b: 204, a: 255 };
    pub const DARK_GRAY: Color = Color { r: 68, g: 68, b: 68, a: 255 };
    pub const RED: Color = Color { r: 255, g: 0, b: 0, a: 255 };
    pub const GREEN: Color = Color { r: 0, g: 255, b: 0, a: 255 };
    pub const BLUE: Color = Color { r: 0, g: 0, b: 255, a: 255 };
    pub const YELLOW: Color = Color { r: 255, g: 255, b: 0, a: 255 };
    pub const CYAN: Color = Color { r: 0, g: 255, b: 255, a: 255 };
    pub const MAGENTA: Color = Color { r: 255, g: 0, b: 255, a: 255 };

    pub fn from_hex(hex: &str) -> Option<Color> {
        let hex = hex.trim_start_matches('#');
        if !hex.is_ascii() {
            return None;
        }
        match hex.len() {
            8 => {
                // RRGGBBAA
                let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
                let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
                let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
                let a = u8::from_str_radix(&hex[6..8], 16).ok()?;
                Some(Color { r, g, b, a })
            }
            6 => {
                let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
                let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
                let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
                Some(Color { r, g, b, a: 255 })
            }
            4 => {
                // RGBA shorthand
                let r = u8::from_str_radix(&hex[0..1], 16).ok()? * 17;
                let g = u8::from_str_radix(&hex[1..2], 16).ok()? * 17;
                let b = u8::from_str_radix(&hex[2..3], 16).ok()? * 17;
                let a = u8::from_str_radix(&hex[3..4], 16).ok()? * 17;
                Some(Color { r, g, b, a })
            }
            3 => {
                let r = u8::from_str_radix(&hex[0..1], 16).ok()? * 17;
                let g = u8::from_str_radix(&hex[1..2], 16).ok()? * 17;
                let b = u8::from_str_radix(&hex[2..3], 16).ok()? * 17;
                Some(Color { r, g, b, a: 255 })
            }
            _ => None,
        }
    }

    pub fn from_name(name: &str) -> Option<Color> {
        let color = match name.to_ascii_lowercase().as_str() {
            "transparent" => Color::TRANSPARENT,
            "white" => Color::WHITE,
            "black" => Color::BLACK,
            "gray" | "grey" => Color::GRAY,
            "lightgray" | "light_gray" => Color::LIGHT_GRAY,
            "darkgray" | "dark_gray" => Color::DARK_GRAY,
            "red" => Color::RED,
            "green" => Color::GREEN,
            "blue" => Color::BLUE,
            "yellow" => Color::YELLOW,
            "cyan" => Color::CYAN,
            "magenta" => Color::MAGENTA,
            _ => return None,
        };
        Some(color)
    }

    pub fn from_rgb(r: u8, g: u8, b: u8) -> Color {
        Color { r, g, b, a: 255 }
    }

    pub fn from_rgba(r: u8, g: u8, b: u8, a: u8) -> Color {
        Color { r, g, b, a }
    }

    pub fn with_alpha(self, a: u8) -> Color {
        Color { a, ..self }
    }

    /// `0x00RRGGBB`, alpha dropped.
    pub fn to_u32(self) -> u32 {
        ((self.r as u32) << 16) | ((self.g as u32) << 8) | (self.b as u32)
    }

    pub fn from_u32(pixel: u32) -> Color {
        Color {
            r: ((pixel >> 16) & 0xFF) as u8,
            g: ((pixel >> 8) & 0xFF) as u8,
            b: (pixel & 0xFF) as u8,
            a: 255,
        }
    }

    /// Interpolate every channel, alpha included.
    pub fn lerp(self, other: Color, t: f32) -> Color {
        let t = t.clamp(0.0, 1.0);
        let mix = |a: u8, b: u8| (a as f32 + (b as f32 - a as f32) * t).round() as u8;
        Color {
            r: mix(self.r, other.r),
            g: mix(self.g, other.g),
            b: mix(self.b, other.b),
            a: mix(self.a, other.a),
        }
    }
}

impl Default for Color {
    fn default() -> Self {
        Color::BLACK
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.a == 255 {
            write!(f, "#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
        } else {
            write!(f, "#{:02X}{:02X}{:02X}{:02X}", self.r, self.g, self.b, self.a)
        }
    }
}

// ============================================================================
// VALIDATION
// ============================================================================

/// Check the two conditions a description can get wrong: fractions outside
/// (0, 1] and image cards pointing at unknown images.
pub fn validate(root: &Node, images: &ImageStore) -> Result<()> {
    match root {
        Node::Container(c) => {
            for length in [c.width, c.height] {
                if let Length::Fraction(f) = length {
                    if !(f > 0.0 && f <= 1.0) {
                        return Err(Error::InvalidFraction(f));
                    }
                }
            }
            for child in &c.children {
                validate(child, images)?;
            }
            Ok(())
        }
        Node::ImageCard(card) => {
            if images.contains(&card.image) {
                Ok(())
            } else {
                Err(Error::MissingImage(card.image.clone()))
            }
        }
        Node::Text(_) | Node::Spacer(_) => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::Bitmap;

    #[test]
    fn test_builder_keeps_decoration_order() {
        let col = Container::column()
            .border(5.0, Color::BLACK)
            .padding(5.0)
            .border(5.0, Color::BLUE);
        assert_eq!(
            col.decorations,
            vec![
                Decoration::Border { width: 5.0, color: Color::BLACK },
                Decoration::Padding(Insets::all(5.0)),
                Decoration::Border { width: 5.0, color: Color::BLUE },
            ]
        );
        assert_eq!(col.insets(), Insets::all(15.0));
    }

    #[test]
    fn test_background_adds_no_inset() {
        let row = Container::row().background(Color::GREEN).padding(10.0);
        assert_eq!(row.insets().horizontal(), 20.0);
        assert_eq!(row.insets().vertical(), 20.0);
    }

    #[test]
    fn test_color_from_hex() {
        assert_eq!(Color::from_hex("#00FFFF"), Some(Color::CYAN));
        assert_eq!(Color::from_hex("f00"), Some(Color::RED));
        assert_eq!(Color::from_hex("#0000"), Some(Color::TRANSPARENT));
        assert_eq!(Color::from_hex("#12345"), None);
        assert_eq!(Color::from_hex("#zzzzzz"), None);
    }

    #[test]
    fn test_color_display_round_trips() {
        let c = Color::from_rgba(18, 52, 86, 120);
        assert_eq!(Color::from_hex(&c.to_string()), Some(c));
        assert_eq!(Color::YELLOW.to_string(), "#FFFF00");
    }

    #[test]
    fn test_lerp_endpoints() {
        assert_eq!(Color::TRANSPARENT.lerp(Color::BLACK, 0.0), Color::TRANSPARENT);
        assert_eq!(Color::TRANSPARENT.lerp(Color::BLACK, 1.0), Color::BLACK);
        assert_eq!(Color::TRANSPARENT.lerp(Color::BLACK, 0.5).a, 128);
    }

    #[test]
    fn test_validate_rejects_bad_fractions() {
        let images = ImageStore::new();
        for bad in [0.0, -0.5, 1.5, f32::NAN] {
            let root: Node = Container::column().height(Length::Fraction(bad)).into();
            assert!(matches!(validate(&root, &images), Err(Error::InvalidFraction(_))));
        }
        let ok: Node = Container::column().height(Length::Fraction(1.0)).into();
        assert!(validate(&ok, &images).is_ok());
    }

    #[test]
    fn test_validate_missing_image() {
        let root: Node = Container::column()
            .child(ImageCard::new("aj1", "sneaker", "Air Jordan 1"))
            .into();
        let mut images = ImageStore::new();
        match validate(&root, &images) {
            Err(Error::MissingImage(id)) => assert_eq!(id, "aj1"),
            other => panic!("unexpected {:?}", other),
        }
        images.insert("aj1", Bitmap::solid(2, 2, Color::RED));
        assert!(validate(&root, &images).is_ok());
    }

    #[test]
    fn test_nested_validation_reaches_children() {
        let root: Node = Container::column()
            .child(Container::row().child(Container::column().width(Length::Fraction(2.0))))
            .into();
        assert!(matches!(
            validate(&root, &ImageStore::new()),
            Err(Error::InvalidFraction(f)) if f == 2.0
        ));
    }
}
