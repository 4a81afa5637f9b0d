use super::*;
use crate::{foundation::core::Canvas, render::cpu::CpuSurface};

fn gradient(width: u32, height: u32) -> Pixmap {
    let mut p = Pixmap::new(width, height);
    for y in 0..height {
        for x in 0..width {
            p.set_pixel(x, y, [(x * 7 % 256) as u8, (y * 5 % 256) as u8, 90, 255]);
        }
    }
    p
}

fn surface(width: u32, height: u32) -> CpuSurface {
    CpuSurface::new(Canvas { width, height })
}

#[test]
fn reading_before_load_is_not_ready() {
    let (pending, completer) = PendingImage::unresolved("slow");
    let mut img = ShreddedImage::new(pending, ShredOptions::default()).unwrap();

    assert!(!img.is_ready());
    assert_eq!(img.readiness(), Readiness::Loading);
    assert!(img.strips().is_empty());
    assert!(img.try_strips().unwrap_err().is_not_ready());
    assert!(img.source().is_none());

    let mut s = surface(4, 4);
    img.draw(&mut s);
    assert!(s.pixmap().data().iter().all(|&b| b == 0));

    completer.complete(Ok(gradient(20, 4)));
    assert!(img.strips().is_empty());
    assert_eq!(img.poll().unwrap(), Readiness::Ready);
    assert_eq!(img.try_strips().unwrap().len(), 4);
}

#[test]
fn loaded_image_is_built_at_construction() {
    let img = ShreddedImage::new(
        PendingImage::ready(gradient(23, 6)),
        ShredOptions::default().with_parity(Parity::Even),
    )
    .unwrap();
    assert!(img.is_ready());
    // 23 px in bands of 5: indices 0..5, even ones kept.
    let indices: Vec<_> = img.strips().iter().map(|s| s.index()).collect();
    assert_eq!(indices, vec![0, 2, 4]);
}

#[test]
fn strip_count_covers_source_width() {
    for width in [10, 11, 37, 64] {
        let img = ShreddedImage::new(
            PendingImage::ready(gradient(width, 3)),
            ShredOptions::default().with_strip_width(4),
        )
        .unwrap();
        let covered: u32 = img.strips().iter().map(Strip::width).sum();
        assert_eq!(covered, width);
        assert!(img.strips().len() as u32 * 4 >= width);
    }
}

#[test]
fn zero_strip_width_is_rejected() {
    let err = ShreddedImage::new(
        PendingImage::ready(gradient(4, 4)),
        ShredOptions::default().with_strip_width(0),
    )
    .unwrap_err();
    assert!(matches!(err, ShredError::InvalidGeometry(_)));
}

#[test]
fn zero_area_decode_settles_as_failed() {
    let (pending, completer) = PendingImage::unresolved("empty");
    let mut img = ShreddedImage::new(pending, ShredOptions::default()).unwrap();
    completer.complete(Ok(Pixmap::new(0, 8)));

    let err = img.poll().unwrap_err();
    assert!(matches!(err, ShredError::InvalidGeometry(_)));
    assert_eq!(img.readiness(), Readiness::Failed);
    assert_eq!(img.poll().unwrap(), Readiness::Failed);
    assert!(img.strips().is_empty());
    assert!(!img.try_strips().unwrap_err().is_not_ready());
}

#[test]
fn failed_load_never_becomes_ready() {
    let (pending, completer) = PendingImage::unresolved("broken");
    let mut img = ShreddedImage::new(pending, ShredOptions::default()).unwrap();
    completer.complete(Err(ShredError::validation("bad bytes")));
    assert_eq!(img.poll().unwrap(), Readiness::Failed);
    assert!(img.failure().unwrap().contains("bad bytes"));
}

#[test]
fn target_width_resizes_before_slicing() {
    let img = ShreddedImage::new(
        PendingImage::ready(gradient(40, 20)),
        ShredOptions::default()
            .with_strip_width(5)
            .with_target_width(20),
    )
    .unwrap();
    let source = img.source().unwrap();
    assert_eq!((source.width(), source.height()), (20, 10));
    assert_eq!(img.strips().len(), 4);
}

#[test]
fn horizontal_source_keeps_upright_dimensions() {
    let img = ShreddedImage::new(
        PendingImage::ready(gradient(12, 30)),
        ShredOptions::default().with_orientation(Orientation::Horizontal),
    )
    .unwrap();
    let source = img.source().unwrap();
    assert_eq!((source.width(), source.height()), (12, 30));
    // 30 rows in bands of 5.
    assert_eq!(img.strips().len(), 6);
    assert_eq!(img.strips()[0].height(), 12);
}

#[test]
fn draw_is_idempotent() {
    let mut img = ShreddedImage::new(
        PendingImage::ready(gradient(15, 6)),
        ShredOptions::default().with_parity(Parity::Odd),
    )
    .unwrap();
    img.set_state(SpatialState::at(2.0, 1.0).with_spread(3.0).with_opacity(0.5));

    let mut a = surface(32, 8);
    img.draw(&mut a);
    let mut b = surface(32, 8);
    img.draw(&mut b);
    assert_eq!(a.pixmap(), b.pixmap());
}

#[test]
fn opacity_scales_and_restores_alpha() {
    let mut img = ShreddedImage::new(
        PendingImage::ready(gradient(5, 2)),
        ShredOptions::default(),
    )
    .unwrap();
    img.set_opacity(0.0);

    let mut s = surface(5, 2);
    s.set_global_alpha(0.8);
    img.draw(&mut s);
    assert!(s.pixmap().data().iter().all(|&b| b == 0));
    assert_eq!(s.global_alpha(), 0.8);
}

#[test]
fn draw_with_state_leaves_animated_state_alone() {
    let mut img = ShreddedImage::new(
        PendingImage::ready(gradient(10, 3)),
        ShredOptions::default(),
    )
    .unwrap();
    img.set_state(SpatialState::at(50.0, 50.0).with_spread(4.0));

    let mut s = surface(10, 3);
    img.draw_with_state(&mut s, SpatialState::default());
    assert_eq!(s.pixmap(), &gradient(10, 3));
    assert_eq!(img.state().spread, 4.0);
}

#[test]
fn animatable_exposes_every_property() {
    let mut img = ShreddedImage::new(
        PendingImage::ready(gradient(5, 5)),
        ShredOptions::default(),
    )
    .unwrap();
    for (i, prop) in Property::ALL.into_iter().enumerate() {
        img.set_property(prop, i as f64 + 0.5);
        assert_eq!(img.property(prop), Some(i as f64 + 0.5));
    }
    assert_eq!(img.state().opacity, 3.5);
}
