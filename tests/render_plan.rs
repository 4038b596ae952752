//! Draw-call level tests: render onto a surface that records every
//! operation, then check the geometry the renderer asked for.

use zencompose::{
    Adjustment, Adjustments, Color, FitMode, ImageId, InputImage, LayoutMode, MergeConfig, Rect,
    Shadow, Shape, Size, SourceImage, Surface, TemplateId, render, render_preview,
};

#[derive(Clone, Debug, PartialEq)]
enum Op {
    Save,
    Restore,
    Clip(Shape),
    Alpha(f32),
    Fill(Rect, Color),
    Image { tag: u32, src: Rect, dst: Rect },
    Stroke(Shape, f64, Color),
    Shadow(Shape, Shadow),
}

struct Img {
    tag: u32,
    w: u32,
    h: u32,
}

impl SourceImage for Img {
    fn dimensions(&self) -> (u32, u32) {
        (self.w, self.h)
    }
}

struct Recorder {
    size: Size,
    rounded: bool,
    ops: Vec<Op>,
}

impl Recorder {
    fn new(width: u32, height: u32) -> Self {
        Self {
            size: Size::new(width, height),
            rounded: true,
            ops: Vec::new(),
        }
    }

    fn images(&self) -> Vec<(u32, Rect, Rect)> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                Op::Image { tag, src, dst } => Some((*tag, *src, *dst)),
                _ => None,
            })
            .collect()
    }

    fn clips(&self) -> Vec<Shape> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                Op::Clip(s) => Some(*s),
                _ => None,
            })
            .collect()
    }

    fn shadows(&self) -> Vec<(Shape, Shadow)> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                Op::Shadow(s, sh) => Some((*s, *sh)),
                _ => None,
            })
            .collect()
    }
}

impl Surface for Recorder {
    type Image = Img;

    fn size(&self) -> Size {
        self.size
    }

    fn supports_rounded_clip(&self) -> bool {
        self.rounded
    }

    fn save(&mut self) {
        self.ops.push(Op::Save);
    }

    fn restore(&mut self) {
        self.ops.push(Op::Restore);
    }

    fn clip(&mut self, shape: Shape) {
        self.ops.push(Op::Clip(shape));
    }

    fn set_alpha(&mut self, alpha: f32) {
        self.ops.push(Op::Alpha(alpha));
    }

    fn fill_rect(&mut self, rect: Rect, color: Color) {
        self.ops.push(Op::Fill(rect, color));
    }

    fn draw_image(&mut self, image: &Img, src: Rect, dst: Rect) {
        self.ops.push(Op::Image {
            tag: image.tag,
            src,
            dst,
        });
    }

    fn stroke(&mut self, shape: Shape, width: f64, color: Color) {
        self.ops.push(Op::Stroke(shape, width, color));
    }

    fn draw_shadow(&mut self, shape: Shape, shadow: Shadow) {
        self.ops.push(Op::Shadow(shape, shadow));
    }
}

fn imgs(sizes: &[(u32, u32)]) -> Vec<Img> {
    sizes
        .iter()
        .enumerate()
        .map(|(i, &(w, h))| Img {
            tag: i as u32,
            w,
            h,
        })
        .collect()
}

fn inputs(images: &[Img]) -> Vec<InputImage<'_, Img>> {
    images
        .iter()
        .map(|img| InputImage::new(ImageId(u64::from(img.tag) + 100), img))
        .collect()
}

fn run(config: &MergeConfig, images: &[Img], adjustments: &Adjustments) -> Recorder {
    let size = config.canvas_size();
    let mut rec = Recorder::new(size.width, size.height);
    render(&mut rec, &inputs(images), config, adjustments);
    rec
}

#[test]
fn single_image_fills_canvas() {
    let images = imgs(&[(400, 300)]);
    let rec = run(&MergeConfig::new(800, 600), &images, &Adjustments::new());
    let canvas = Rect::new(0.0, 0.0, 800.0, 600.0);
    assert_eq!(rec.ops[0], Op::Fill(canvas, Color::hex(0x0a0c10)));
    assert_eq!(
        rec.images(),
        vec![(0, Rect::new(0.0, 0.0, 400.0, 300.0), canvas)]
    );
    assert_eq!(rec.clips(), vec![Shape::Rect(canvas), Shape::Rect(canvas)]);
}

#[test]
fn zero_images_draw_nothing() {
    let rec = run(&MergeConfig::new(800, 600), &[], &Adjustments::new());
    assert!(rec.ops.is_empty());
}

#[test]
fn unknown_template_matches_default() {
    let images = imgs(&[(640, 480), (480, 640), (500, 500)]);
    let a = run(&MergeConfig::new(900, 300), &images, &Adjustments::new());
    let b = run(
        &MergeConfig::new(900, 300).template_named("holographic"),
        &images,
        &Adjustments::new(),
    );
    assert_eq!(a.ops, b.ops);
}

#[test]
fn rendering_is_deterministic() {
    let images = imgs(&[(640, 480), (480, 640), (500, 500), (300, 200), (10, 10)]);
    let mut adj = Adjustments::new();
    adj.set(ImageId(101), Adjustment::default().zoom(1.7).pan(0.3, -0.2));
    let config = MergeConfig::new(1000, 700).template(TemplateId::Scrapbook);
    assert_eq!(run(&config, &images, &adj).ops, run(&config, &images, &adj).ops);
}

#[test]
fn last_row_widens() {
    let images = imgs(&[(100, 100); 5]);
    let rec = run(&MergeConfig::new(1200, 600), &images, &Adjustments::new());
    let dsts: Vec<Rect> = rec.images().into_iter().map(|(_, _, dst)| dst).collect();
    assert_eq!(dsts.len(), 5);
    assert_eq!(dsts[0], Rect::new(0.0, 0.0, 400.0, 300.0));
    assert_eq!(dsts[2], Rect::new(800.0, 0.0, 400.0, 300.0));
    assert_eq!(dsts[3], Rect::new(0.0, 300.0, 600.0, 300.0));
    assert_eq!(dsts[4], Rect::new(600.0, 300.0, 600.0, 300.0));
}

#[test]
fn horizontal_layout_with_gap() {
    let images = imgs(&[(100, 100); 3]);
    let config = MergeConfig::new(620, 200)
        .layout(LayoutMode::Horizontal)
        .template(TemplateId::Chunky);
    let rec = run(&config, &images, &Adjustments::new());
    let xs: Vec<f64> = rec.images().into_iter().map(|(_, _, dst)| dst.x).collect();
    // (620 - 2 * 14) / 3 = 197.33...
    let w = (620.0 - 28.0) / 3.0;
    assert_eq!(xs, vec![0.0, w + 14.0, 2.0 * (w + 14.0)]);
}

#[test]
fn fill_mode_covers_and_centers() {
    let images = imgs(&[(200, 100)]);
    let config = MergeConfig::new(100, 100).fit_mode(FitMode::Fill);
    let rec = run(&config, &images, &Adjustments::new());
    assert_eq!(
        rec.images(),
        vec![(
            0,
            Rect::new(0.0, 0.0, 200.0, 100.0),
            Rect::new(-50.0, 0.0, 200.0, 100.0)
        )]
    );
}

#[test]
fn per_image_fit_overrides_global() {
    let images = imgs(&[(200, 100), (200, 100)]);
    let mut adj = Adjustments::new();
    adj.update(ImageId(101), |a| a.fit_mode = Some(FitMode::Fill));
    let rec = run(&MergeConfig::new(200, 100), &images, &adj);
    let dsts: Vec<Rect> = rec.images().into_iter().map(|(_, _, dst)| dst).collect();
    assert_eq!(dsts[0], Rect::new(0.0, 0.0, 100.0, 100.0));
    assert_eq!(dsts[1], Rect::new(50.0, 0.0, 200.0, 100.0));
}

#[test]
fn adjustment_window_is_drawn() {
    let images = imgs(&[(1000, 800)]);
    let mut adj = Adjustments::new();
    adj.set(ImageId(100), Adjustment::default().zoom(2.0));
    let rec = run(&MergeConfig::new(500, 400), &images, &adj);
    assert_eq!(rec.images()[0].1, Rect::new(250.0, 200.0, 500.0, 400.0));
}

#[test]
fn framed_template_draws_mat_and_border() {
    let images = imgs(&[(100, 100)]);
    let config = MergeConfig::new(200, 100).template(TemplateId::Framed);
    let rec = run(&config, &images, &Adjustments::new());
    let cell = Rect::new(0.0, 0.0, 200.0, 100.0);
    assert!(rec.ops.contains(&Op::Fill(cell, Color::hex(0x1a1a1a))));
    assert_eq!(rec.images()[0].2, Rect::new(12.0, 12.0, 176.0, 76.0));
    assert_eq!(
        rec.ops.last(),
        Some(&Op::Stroke(
            Shape::Rect(Rect::new(1.5, 1.5, 197.0, 97.0)),
            3.0,
            Color::hex(0x2a2a2a)
        ))
    );
}

#[test]
fn no_mat_without_padding() {
    let images = imgs(&[(100, 100)]);
    let rec = run(&MergeConfig::new(100, 100).template(TemplateId::Chunky), &images, &Adjustments::new());
    let fills = rec.ops.iter().filter(|op| matches!(op, Op::Fill(..))).count();
    assert_eq!(fills, 1);
}

#[test]
fn rounded_corners_when_supported() {
    let images = imgs(&[(100, 100)]);
    let config = MergeConfig::new(300, 200).template(TemplateId::Gallery);
    let rec = run(&config, &images, &Adjustments::new());
    let cell = Rect::new(0.0, 0.0, 300.0, 200.0);
    assert_eq!(
        rec.clips(),
        vec![
            Shape::RoundedRect { rect: cell, radius: 8.0 },
            Shape::RoundedRect { rect: cell.inset(4.0), radius: 6.0 },
        ]
    );
    assert_eq!(
        rec.ops.last(),
        Some(&Op::Stroke(
            Shape::RoundedRect { rect: cell, radius: 8.0 },
            1.0,
            Color::hex(0x3a3a3a)
        ))
    );
}

#[test]
fn rectangular_fallback_without_rounded_clip() {
    let images = imgs(&[(100, 100)]);
    let config = MergeConfig::new(300, 200).template(TemplateId::Gallery);
    let mut rec = Recorder::new(300, 200);
    rec.rounded = false;
    render(&mut rec, &inputs(&images), &config, &Adjustments::new());
    let cell = Rect::new(0.0, 0.0, 300.0, 200.0);
    assert_eq!(rec.clips(), vec![Shape::Rect(cell), Shape::Rect(cell.inset(4.0))]);
    assert_eq!(
        rec.ops.last(),
        Some(&Op::Stroke(Shape::Rect(cell.inset(0.5)), 1.0, Color::hex(0x3a3a3a)))
    );
}

#[test]
fn overlap_layers_and_shadows() {
    let images = imgs(&[(400, 300); 3]);
    let config = MergeConfig::new(800, 600).template(TemplateId::Overlap);
    let rec = run(&config, &images, &Adjustments::new());

    assert_eq!(rec.ops[0], Op::Fill(Rect::new(0.0, 0.0, 800.0, 600.0), Color::hex(0x0f1216)));
    let layers = [
        Rect::new(0.0, 0.0, 800.0, 600.0),
        Rect::new(48.0, 48.0, 704.0, 504.0),
        Rect::new(96.0, 96.0, 608.0, 408.0),
    ];
    let dsts: Vec<Rect> = rec.images().into_iter().map(|(_, _, dst)| dst).collect();
    assert_eq!(dsts, layers.to_vec());

    let shadow = Shadow {
        color: Color::rgba(0, 0, 0, 115),
        blur: 20.0,
        offset_x: 8.0,
        offset_y: 8.0,
    };
    assert_eq!(
        rec.shadows(),
        vec![(Shape::Rect(layers[0]), shadow), (Shape::Rect(layers[1]), shadow)]
    );
}

#[test]
fn overlap_layers_never_collapse() {
    let images = imgs(&[(10, 10); 4]);
    let config = MergeConfig::new(100, 100).template(TemplateId::Overlap);
    let rec = run(&config, &images, &Adjustments::new());
    let last = rec.images()[3].2;
    assert_eq!(last, Rect::new(144.0, 144.0, 1.0, 1.0));
}

#[test]
fn background_backdrop_and_cards() {
    let images = imgs(&[(400, 300), (100, 100), (100, 100)]);
    let config = MergeConfig::new(800, 400).template(TemplateId::Background);
    let rec = run(&config, &images, &Adjustments::new());

    assert_eq!(
        &rec.ops[..5],
        &[
            Op::Fill(Rect::new(0.0, 0.0, 800.0, 400.0), Color::hex(0x0a0c10)),
            Op::Save,
            Op::Alpha(0.35),
            Op::Image {
                tag: 0,
                src: Rect::new(0.0, 0.0, 400.0, 300.0),
                dst: Rect::new(0.0, -100.0, 800.0, 600.0),
            },
            Op::Restore,
        ]
    );

    let cards = [Rect::new(0.0, 0.0, 396.0, 400.0), Rect::new(404.0, 0.0, 396.0, 400.0)];
    let shadows: Vec<Shape> = rec.shadows().into_iter().map(|(s, _)| s).collect();
    assert_eq!(
        shadows,
        cards
            .iter()
            .map(|&rect| Shape::RoundedRect { rect, radius: 12.0 })
            .collect::<Vec<_>>()
    );
    for card in cards {
        assert!(rec.ops.contains(&Op::Fill(card, Color::rgba(20, 20, 24, 235))));
        assert!(rec.ops.contains(&Op::Clip(Shape::RoundedRect {
            rect: card.inset(6.0),
            radius: 8.0
        })));
    }
    let dsts: Vec<Rect> = rec.images().into_iter().skip(1).map(|(_, _, dst)| dst).collect();
    assert_eq!(dsts, vec![cards[0].inset(6.0), cards[1].inset(6.0)]);
}

#[test]
fn background_with_single_image_is_backdrop_only() {
    let images = imgs(&[(400, 400)]);
    let config = MergeConfig::new(200, 100).template(TemplateId::Background);
    let rec = run(&config, &images, &Adjustments::new());
    assert_eq!(rec.images().len(), 1);
    assert!(rec.shadows().is_empty());
}

#[test]
fn zero_sized_image_is_skipped() {
    let images = imgs(&[(100, 100), (0, 50), (100, 100)]);
    let config = MergeConfig::new(300, 100);
    let size = config.canvas_size();
    let mut rec = Recorder::new(size.width, size.height);
    let summary = render(&mut rec, &inputs(&images), &config, &Adjustments::new());
    assert_eq!(summary.drawn, 2);
    assert_eq!(summary.skipped, vec![ImageId(101)]);
    let tags: Vec<u32> = rec.images().into_iter().map(|(tag, _, _)| tag).collect();
    assert_eq!(tags, vec![0, 2]);
    // The skipped image keeps its cell; neighbours do not shift.
    assert_eq!(rec.images()[1].2.x, 200.0);
}

#[test]
fn padding_larger_than_cell_skips_image() {
    let images = imgs(&[(10, 10)]);
    let config = MergeConfig::new(20, 20).template(TemplateId::Polaroid);
    let mut rec = Recorder::new(20, 20);
    let summary = render(&mut rec, &inputs(&images), &config, &Adjustments::new());
    assert_eq!(summary.drawn, 0);
    assert_eq!(summary.skipped, vec![ImageId(100)]);
    assert!(rec.images().is_empty());
    // The cell itself is still decorated.
    assert!(rec.ops.contains(&Op::Fill(Rect::new(0.0, 0.0, 20.0, 20.0), Color::hex(0xfafaf8))));
}

#[test]
fn drawn_counts_every_placed_image() {
    let images = imgs(&[(400, 300), (100, 100), (100, 100)]);
    for id in TemplateId::ALL {
        let config = MergeConfig::new(800, 400).template(id);
        let mut rec = Recorder::new(800, 400);
        let summary = render(&mut rec, &inputs(&images), &config, &Adjustments::new());
        assert_eq!(summary.drawn, rec.images().len(), "{id:?}");
        assert_eq!(summary.drawn, 3, "{id:?}");
        assert!(summary.skipped.is_empty(), "{id:?}");
    }
}

#[test]
fn overlap_with_single_image_has_no_shadow() {
    let images = imgs(&[(400, 300)]);
    let config = MergeConfig::new(800, 600).template(TemplateId::Overlap);
    let rec = run(&config, &images, &Adjustments::new());
    let canvas = Rect::new(0.0, 0.0, 800.0, 600.0);
    assert!(rec.shadows().is_empty());
    assert_eq!(rec.clips(), vec![Shape::Rect(canvas)]);
    assert_eq!(
        rec.images(),
        vec![(0, Rect::new(0.0, 0.0, 400.0, 300.0), canvas)]
    );
}

#[test]
fn background_cards_without_rounded_clip() {
    let images = imgs(&[(400, 300), (100, 100), (100, 100)]);
    let config = MergeConfig::new(800, 400).template(TemplateId::Background);
    let mut rec = Recorder::new(800, 400);
    rec.rounded = false;
    render(&mut rec, &inputs(&images), &config, &Adjustments::new());

    let cards = [Rect::new(0.0, 0.0, 396.0, 400.0), Rect::new(404.0, 0.0, 396.0, 400.0)];
    let shadows: Vec<Shape> = rec.shadows().into_iter().map(|(s, _)| s).collect();
    assert_eq!(shadows, cards.iter().map(|&r| Shape::Rect(r)).collect::<Vec<_>>());
    assert_eq!(
        rec.clips(),
        vec![
            Shape::Rect(cards[0]),
            Shape::Rect(cards[0].inset(6.0)),
            Shape::Rect(cards[1]),
            Shape::Rect(cards[1].inset(6.0)),
        ]
    );
}

#[test]
fn save_and_restore_balance() {
    let images = imgs(&[(300, 200); 4]);
    for id in TemplateId::ALL {
        let rec = run(&MergeConfig::new(600, 400).template(id), &images, &Adjustments::new());
        let saves = rec.ops.iter().filter(|op| **op == Op::Save).count();
        let restores = rec.ops.iter().filter(|op| **op == Op::Restore).count();
        assert_eq!(saves, restores, "{id:?}");
    }
}

#[test]
fn preview_stretches_window_over_canvas() {
    let img = Img { tag: 7, w: 1000, h: 800 };
    let mut rec = Recorder::new(360, 240);
    let adj = Adjustment::default().zoom(2.0).fit_mode(FitMode::Fill);
    assert!(render_preview(&mut rec, &img, &adj, Size::new(360, 240)));
    let canvas = Rect::new(0.0, 0.0, 360.0, 240.0);
    assert_eq!(
        rec.ops,
        vec![
            Op::Fill(canvas, Color::hex(0x0a0c10)),
            Op::Image {
                tag: 7,
                src: Rect::new(250.0, 200.0, 500.0, 400.0),
                dst: canvas,
            },
        ]
    );

    let empty = Img { tag: 8, w: 0, h: 0 };
    let mut rec = Recorder::new(10, 10);
    assert!(!render_preview(&mut rec, &empty, &Adjustment::default(), Size::new(10, 10)));
    assert!(rec.ops.is_empty());
}
