use tessera::assets::{Bitmap, ImageStore};
use tessera::ast::*;
use tessera::layout::{layout, LayoutBox, Size};
use tessera::paint::{paint, DisplayItem};
use tessera::renderer::{FrameBuffer, Renderer};
use tessera::text::Typesetter;
use tessera::{demo, parser, Preview};

fn ts() -> Typesetter {
    Typesetter::fallback()
}

fn gaps(children: &[LayoutBox<'_>]) -> Vec<f32> {
    children
        .windows(2)
        .map(|w| w[1].frame.x - w[0].frame.right())
        .collect()
}

#[test]
fn space_evenly_row_has_equal_nonzero_gaps() {
    let root: Node = Container::row()
        .width(Length::FILL)
        .arrange(Arrangement::SpaceEvenly)
        .children([Text::new("Hello"), Text::new("World"), Text::new("Hello")])
        .into();
    let ts = ts();
    let tree = layout(&root, Size::new(400.0, 100.0), &ts);

    let gaps = gaps(&tree.children);
    assert_eq!(gaps.len(), 2);
    assert!(gaps[0] > 0.0);
    assert!((gaps[0] - gaps[1]).abs() < 1e-3);
    // the outer spaces match the inner ones
    assert!((tree.children[0].frame.x - gaps[0]).abs() < 1e-3);
    assert!((400.0 - tree.children[2].frame.right() - gaps[0]).abs() < 1e-3);
}

#[test]
fn space_evenly_holds_for_parsed_yellow_row() {
    let root = parser::parse(
        "row width=fill background=yellow padding=10 arrange=space-evenly {\n text \"Hello\"\n text \"World\"\n text \"Hello\"\n}",
    )
    .unwrap();
    let ts = ts();
    let tree = layout(&root, Size::new(480.0, 200.0), &ts);
    let gaps = gaps(&tree.children);
    assert!(gaps[0] > 0.0);
    assert!((gaps[0] - gaps[1]).abs() < 1e-3);
    assert_eq!(tree.children[0].frame.y, 10.0);
}

#[test]
fn fraction_resolves_against_parent_height() {
    for h in [100.0f32, 333.0, 892.0, 1280.0] {
        let root: Node = Container::column()
            .height(Length::Fixed(h))
            .child(Container::column().height(Length::Fraction(0.3)))
            .into();
        let ts = ts();
        let tree = layout(&root, Size::new(400.0, 2000.0), &ts);
        let child = &tree.children[0];
        assert!((child.frame.height - 0.3 * h).abs() <= 1.0, "h={}", h);
    }
}

#[test]
fn fraction_uses_parent_not_viewport() {
    let root: Node = Container::column()
        .height(Length::Fixed(200.0))
        .padding(20.0)
        .child(Container::column().height(Length::Fraction(0.5)))
        .into();
    let ts = ts();
    let tree = layout(&root, Size::new(400.0, 1000.0), &ts);
    // content box is 160 tall
    assert_eq!(tree.children[0].frame.height, 80.0);
}

#[test]
fn tutorial_cyan_column_is_thirty_percent() {
    let root = demo::tutorial_screen();
    let ts = ts();
    let tree = layout(&root, Size::new(480.0, 1280.0), &ts);
    let cyan = tree
        .find(&|n| matches!(n, Node::Container(c) if c.decorations.first() == Some(&Decoration::Background(Color::CYAN))))
        .unwrap();
    assert!((cyan.frame.height - 384.0).abs() <= 1.0);
}

fn card_scene() -> (Node, ImageStore) {
    let root: Node = Container::column()
        .width(Length::Fixed(240.0))
        .child(ImageCard::new("aj1", "sneaker", "Air Jordan 1"))
        .into();
    let mut images = ImageStore::new();
    images.insert("aj1", Bitmap::solid(120, 100, Color::RED));
    (root, images)
}

#[test]
fn image_card_layers_are_image_gradient_caption() {
    let (root, _) = card_scene();
    let ts = ts();
    let list = paint(&layout(&root, Size::new(240.0, 400.0), &ts), &ts);
    let kinds: Vec<&str> = list
        .iter()
        .map(|i| i.kind())
        .filter(|k| matches!(*k, "image" | "gradient" | "text"))
        .collect();
    assert_eq!(kinds, vec!["image", "gradient", "text"]);

    let gradient = list
        .iter()
        .find_map(|i| match i {
            DisplayItem::VerticalGradient { rect, start_y, top, bottom } => Some((*rect, *start_y, *top, *bottom)),
            _ => None,
        })
        .unwrap();
    assert_eq!(gradient.1, gradient.0.y + ImageCard::GRADIENT_START);
    assert_eq!(gradient.2, Color::TRANSPARENT);
    assert_eq!(gradient.3, Color::BLACK);
}

// Rows covered by the fallback caption glyphs, relative to the card top.
fn caption_rows(ts: &Typesetter) -> std::ops::Range<usize> {
    let size = ImageCard::CAPTION_SIZE;
    let top = ImageCard::DEFAULT_HEIGHT - ImageCard::CAPTION_INSET - ts.line_height(size);
    let baseline = (top + size) as usize;
    let glyph_h = (size * 0.7).round() as usize;
    baseline - glyph_h..baseline
}

#[test]
fn caption_is_not_occluded_by_gradient() {
    let (root, images) = card_scene();
    let preview = Preview::with_parts(root, ts(), images, Color::WHITE);
    let fb = preview.render(240, 220).unwrap();

    let ts = ts();
    let white = Color::WHITE.to_u32();
    let rows = caption_rows(&ts);
    let caption_px: usize = rows
        .clone()
        .map(|y| (0..fb.width).filter(|&x| fb.pixel(x, y) == white).count())
        .sum();
    assert!(caption_px > 0);

    // the scrim itself is dark at that height
    let scrim = fb.color_at(2, rows.start);
    assert!(scrim.r < 128 && scrim.g == 0);

    // drawing the scrim last would have dimmed every caption pixel
    let mut list = preview.display_list(240, 220).unwrap();
    let g = list.items.iter().position(|i| i.kind() == "gradient").unwrap();
    let t = list.items.iter().position(|i| i.kind() == "text").unwrap();
    list.items.swap(g, t);
    let mut swapped = FrameBuffer::new(240, 220);
    Renderer::new(ts).rasterize(&list, &mut swapped, preview.images());
    let swapped_px: usize = rows
        .map(|y| (0..swapped.width).filter(|&x| swapped.pixel(x, y) == white).count())
        .sum();
    assert_eq!(swapped_px, 0);
}

#[test]
fn decoration_chain_draws_concentric_rings() {
    let root: Node = Container::column()
        .width(Length::Fixed(300.0))
        .height(Length::Fixed(120.0))
        .border(5.0, Color::BLACK)
        .padding(5.0)
        .border(5.0, Color::BLUE)
        .padding(5.0)
        .border(5.0, Color::RED)
        .padding(10.0)
        .into();

    let ts = ts();
    let tree = layout(&root, Size::new(320.0, 140.0), &ts);
    assert_eq!(tree.content.x, 35.0);
    assert_eq!(tree.content.y, 35.0);
    assert_eq!(tree.content.width, 230.0);

    let preview = Preview::with_parts(root.clone(), ts, ImageStore::new(), Color::WHITE);
    let fb = preview.render(320, 140).unwrap();
    let y = 60;
    let at = |x: usize| fb.pixel(x, y);
    let (black, blue, red, white) = (
        Color::BLACK.to_u32(),
        Color::BLUE.to_u32(),
        Color::RED.to_u32(),
        Color::WHITE.to_u32(),
    );

    for x in 0..5 {
        assert_eq!(at(x), black, "x={}", x);
        assert_eq!(at(299 - x), black, "x={}", 299 - x);
    }
    for x in 5..10 {
        assert_eq!(at(x), white, "x={}", x);
    }
    for x in 10..15 {
        assert_eq!(at(x), blue, "x={}", x);
    }
    for x in 15..20 {
        assert_eq!(at(x), white, "x={}", x);
    }
    for x in 20..25 {
        assert_eq!(at(x), red, "x={}", x);
    }
    for x in 25..35 {
        assert_eq!(at(x), white, "x={}", x);
    }
    // same rings vertically
    assert_eq!(fb.pixel(150, 2), black);
    assert_eq!(fb.pixel(150, 12), blue);
    assert_eq!(fb.pixel(150, 22), red);
    assert_eq!(fb.pixel(150, 117), black);
}

#[test]
fn reordering_the_chain_changes_the_result() {
    let a: Node = Container::column()
        .width(Length::Fixed(40.0))
        .height(Length::Fixed(40.0))
        .border(5.0, Color::BLACK)
        .padding(5.0)
        .into();
    let b: Node = Container::column()
        .width(Length::Fixed(40.0))
        .height(Length::Fixed(40.0))
        .padding(5.0)
        .border(5.0, Color::BLACK)
        .into();
    let ts = ts();
    let la = layout(&a, Size::new(40.0, 40.0), &ts);
    let lb = layout(&b, Size::new(40.0, 40.0), &ts);
    assert_eq!(la.content, lb.content);
    assert_ne!(paint(&la, &ts), paint(&lb, &ts));
}

#[test]
fn building_twice_gives_identical_trees() {
    let a = demo::tutorial_screen();
    let b = demo::tutorial_screen();
    assert_eq!(a, b);

    let ts = ts();
    let viewport = Size::new(480.0, 1280.0);
    let la = layout(&a, viewport, &ts);
    let lb = layout(&b, viewport, &ts);
    assert_eq!(la, lb);
    assert_eq!(la.report(), lb.report());
    assert_eq!(paint(&la, &ts), paint(&lb, &ts));
}

#[test]
fn layout_does_not_touch_the_description() {
    let root = demo::tutorial_screen();
    let before = root.clone();
    let ts = ts();
    let _ = layout(&root, Size::new(300.0, 600.0), &ts);
    let _ = layout(&root, Size::new(480.0, 1280.0), &ts);
    assert_eq!(root, before);
}

#[test]
fn oversized_child_renders_clamped_to_viewport() {
    let root = parser::parse(
        "column width=fill align=center {\n column width=5000000000 height=10 background=red border=2:blue\n}",
    )
    .unwrap();
    let preview = Preview::with_parts(root, ts(), ImageStore::new(), Color::WHITE);
    let fb = preview.render(100, 100).unwrap();
    assert_eq!(fb.pixel(50, 0), Color::BLUE.to_u32());
    assert_eq!(fb.pixel(50, 5), Color::RED.to_u32());
    assert_eq!(fb.pixel(50, 50), Color::WHITE.to_u32());
}
