//! Layout pass
//!
//! Resolves a description tree against a viewport: fixed and fractional
//! sizes, the decoration chain, main-axis distribution and cross-axis
//! alignment. The pass is a pure function of the tree, the viewport and the
//! text metrics; it allocates a fresh `LayoutBox` tree every time.

use std::fmt::Write as _;

use crate::ast::{Alignment, Arrangement, Axis, Container, Decoration, Length, Node};
use crate::text::Typesetter;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Size {
    pub width: f32,
    pub height: f32,
}

impl Size {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    fn main(&self, axis: Axis) -> f32 {
        match axis {
            Axis::Vertical => self.height,
            Axis::Horizontal => self.width,
        }
    }

    fn cross(&self, axis: Axis) -> f32 {
        match axis {
            Axis::Vertical => self.width,
            Axis::Horizontal => self.height,
        }
    }

    fn from_axes(axis: Axis, main: f32, cross: f32) -> Size {
        match axis {
            Axis::Vertical => Size::new(cross, main),
            Axis::Horizontal => Size::new(main, cross),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self { x, y, width, height }
    }

    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    /// Shrink by the given edges; never goes negative.
    pub fn inset(&self, top: f32, right: f32, bottom: f32, left: f32) -> Rect {
        Rect {
            x: self.x + left,
            y: self.y + top,
            width: (self.width - left - right).max(0.0),
            height: (self.height - top - bottom).max(0.0),
        }
    }
}

/// One decoration step with the rectangle it applies to
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolvedDecoration {
    pub rect: Rect,
    pub decoration: Decoration,
}

/// A node placed on the page
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutBox<'a> {
    pub node: &'a Node,
    /// Outer rectangle, before any decoration.
    pub frame: Rect,
    /// Rectangle left for children after every decoration.
    pub content: Rect,
    pub decorations: Vec<ResolvedDecoration>,
    /// Wrapped lines, text nodes only.
    pub lines: Vec<String>,
    pub children: Vec<LayoutBox<'a>>,
}

impl<'a> LayoutBox<'a> {
    /// Indented dump of the resolved tree, one node per line.
    pub fn report(&self) -> String {
        let mut out = String::new();
        self.report_into(&mut out, 0);
        out
    }

    fn report_into(&self, out: &mut String, indent: usize) {
        let f = &self.frame;
        let _ = write!(
            out,
            "{}{} frame=({:.1}, {:.1}, {:.1}x{:.1})",
            " ".repeat(indent),
            self.node.kind_name(),
            f.x,
            f.y,
            f.width,
            f.height
        );
        if self.content != self.frame {
            let c = &self.content;
            let _ = write!(out, " content=({:.1}, {:.1}, {:.1}x{:.1})", c.x, c.y, c.width, c.height);
        }
        match self.node {
            Node::Text(t) => {
                let _ = write!(out, " text='{}'", t.content);
            }
            Node::ImageCard(card) => {
                let _ = write!(out, " image='{}' title='{}'", card.image, card.title);
            }
            _ => {}
        }
        out.push('\n');
        for child in &self.children {
            child.report_into(out, indent + 2);
        }
    }

    /// Depth-first search for the first box whose node satisfies `pred`.
    pub fn find(&self, pred: &impl Fn(&Node) -> bool) -> Option<&LayoutBox<'a>> {
        if pred(self.node) {
            return Some(self);
        }
        self.children.iter().find_map(|c| c.find(pred))
    }
}

/// Lay out `root` inside a viewport anchored at the origin.
pub fn layout<'a>(root: &'a Node, viewport: Size, ts: &Typesetter) -> LayoutBox<'a> {
    place(root, 0.0, 0.0, viewport, viewport, ts)
}

// `available` is the space left for this node; `parent` is the size its
// fractions resolve against.
fn place<'a>(node: &'a Node, x: f32, y: f32, available: Size, parent: Size, ts: &Typesetter) -> LayoutBox<'a> {
    let size = measure(node, available, parent, ts);
    let frame = Rect::new(x, y, size.width, size.height);

    match node {
        Node::Container(c) => {
            let (decorations, content) = resolve_decorations(frame, &c.decorations);
            let basis = child_basis(c, available, parent);
            let children = arrange(c, content, basis, ts);
            LayoutBox {
                node,
                frame,
                content,
                decorations,
                lines: vec![],
                children,
            }
        }
        Node::Text(t) => LayoutBox {
            node,
            frame,
            content: frame,
            decorations: vec![],
            lines: ts.wrap(&t.content, t.style.size, available.width),
            children: vec![],
        },
        Node::Spacer(_) | Node::ImageCard(_) => LayoutBox {
            node,
            frame,
            content: frame,
            decorations: vec![],
            lines: vec![],
            children: vec![],
        },
    }
}

/// Walk the decoration chain outer to inner.
pub fn resolve_decorations(frame: Rect, chain: &[Decoration]) -> (Vec<ResolvedDecoration>, Rect) {
    let mut rect = frame;
    let mut resolved = Vec::with_capacity(chain.len());
    for decoration in chain {
        resolved.push(ResolvedDecoration { rect, decoration: *decoration });
        let i = decoration.insets();
        rect = rect.inset(i.top, i.right, i.bottom, i.left);
    }
    (resolved, rect)
}

fn resolve_length(length: Length, parent: f32) -> Option<f32> {
    match length {
        Length::Wrap => None,
        Length::Fixed(v) => Some(v.max(0.0)),
        Length::Fraction(f) => Some((parent * f).max(0.0)),
    }
}

/// Space a container's children measure against, per axis: the resolved
/// content box when the size is declared, otherwise what is available.
fn child_basis(c: &Container, available: Size, parent: Size) -> Size {
    let insets = c.insets();
    let w = resolve_length(c.width, parent.width).unwrap_or(available.width);
    let h = resolve_length(c.height, parent.height).unwrap_or(available.height);
    Size::new(
        (w - insets.horizontal()).max(0.0),
        (h - insets.vertical()).max(0.0),
    )
}

fn measure(node: &Node, available: Size, parent: Size, ts: &Typesetter) -> Size {
    match node {
        Node::Text(t) => {
            let (w, h) = ts.measure_block(&t.content, t.style.size, available.width);
            Size::new(w.min(available.width), h)
        }
        Node::Spacer(s) => Size::new(s.width, s.height),
        Node::ImageCard(card) => Size::new(available.width, card.height),
        Node::Container(c) => {
            let insets = c.insets();
            let basis = child_basis(c, available, parent);
            let content = measure_children(c, basis, ts)
                .iter()
                .fold((0.0f32, 0.0f32), |(main, cross), (_, s)| {
                    (main + s.main(c.axis), cross.max(s.cross(c.axis)))
                });
            let content = Size::from_axes(c.axis, content.0, content.1);

            let width = resolve_length(c.width, parent.width)
                .unwrap_or_else(|| (content.width + insets.horizontal()).min(available.width));
            let height = resolve_length(c.height, parent.height)
                .unwrap_or_else(|| (content.height + insets.vertical()).min(available.height));
            Size::new(width, height)
        }
    }
}

/// Measure children in order, each against what the earlier ones left on
/// the main axis. Returns the space offered and the size taken.
fn measure_children(c: &Container, basis: Size, ts: &Typesetter) -> Vec<(Size, Size)> {
    let mut remaining = basis.main(c.axis);
    let cross = basis.cross(c.axis);
    c.children
        .iter()
        .map(|child| {
            let offered = Size::from_axes(c.axis, remaining.max(0.0), cross);
            let size = measure(child, offered, basis, ts);
            remaining -= size.main(c.axis);
            (offered, size)
        })
        .collect()
}

/// Leading offset and gap between children for a distribution.
pub fn distribute(arrangement: Arrangement, free: f32, count: usize) -> (f32, f32) {
    let free = free.max(0.0);
    if count == 0 {
        return (0.0, 0.0);
    }
    let n = count as f32;
    match arrangement {
        Arrangement::Start => (0.0, 0.0),
        Arrangement::End => (free, 0.0),
        Arrangement::Center => (free / 2.0, 0.0),
        Arrangement::SpaceBetween => {
            if count > 1 {
                (0.0, free / (n - 1.0))
            } else {
                (0.0, 0.0)
            }
        }
        Arrangement::SpaceAround => {
            let g = free / n;
            (g / 2.0, g)
        }
        Arrangement::SpaceEvenly => {
            let g = free / (n + 1.0);
            (g, g)
        }
    }
}

fn align(alignment: Alignment, free: f32) -> f32 {
    match alignment {
        Alignment::Start => 0.0,
        Alignment::Center => free / 2.0,
        Alignment::End => free,
    }
}

fn arrange<'a>(c: &'a Container, content: Rect, basis: Size, ts: &Typesetter) -> Vec<LayoutBox<'a>> {
    let measured = measure_children(c, basis, ts);
    let used: f32 = measured.iter().map(|(_, s)| s.main(c.axis)).sum();
    let free = content.size().main(c.axis) - used;
    let (lead, gap) = distribute(c.arrangement, free, measured.len());

    let mut cursor = lead;
    c.children
        .iter()
        .zip(measured)
        .map(|(child, (offered, size))| {
            let cross = align(c.alignment, content.size().cross(c.axis) - size.cross(c.axis));
            let (x, y) = match c.axis {
                Axis::Vertical => (content.x + cross, content.y + cursor),
                Axis::Horizontal => (content.x + cursor, content.y + cross),
            };
            cursor += size.main(c.axis) + gap;
            place(child, x, y, offered, basis, ts)
        })
        .collect()
}
