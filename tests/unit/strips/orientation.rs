use super::*;
use crate::{
    foundation::core::{Canvas, Parity},
    render::cpu::CpuSurface,
};

fn checker(width: u32, height: u32) -> Pixmap {
    let mut p = Pixmap::new(width, height);
    for y in 0..height {
        for x in 0..width {
            p.set_pixel(x, y, [(x * 11 % 256) as u8, (y * 17 % 256) as u8, 3, 255]);
        }
    }
    p
}

#[test]
fn horizontal_strips_are_row_bands() {
    let image = checker(8, 12);
    let model = StripModel::new(4, None).unwrap();
    let strips = model.build(&Orientation::Horizontal.prepare(&image)).unwrap();
    assert_eq!(strips.len(), 3);
    // Band k of the transposed image holds rows 4k..4k+4 of the source.
    assert_eq!(strips[1].pixels().transpose(), image.crop(0, 4, 8, 4));
}

#[test]
fn horizontal_render_at_spread_one_reproduces_the_image() {
    let image = checker(9, 14);
    let model = StripModel::new(3, None).unwrap();
    let strips = model.build(&Orientation::Horizontal.prepare(&image)).unwrap();
    let mut surface = CpuSurface::new(Canvas {
        width: 12,
        height: 20,
    });
    Orientation::Horizontal.render(&mut surface, &model, &strips, Point::new(2.0, 3.0), 1.0);
    assert_eq!(surface.pixmap().crop(2, 3, 9, 14), image);
    assert_eq!(surface.pixmap().pixel(0, 0), [0, 0, 0, 0]);
}

#[test]
fn horizontal_halves_at_spread_two_reassemble_the_image() {
    let image = checker(10, 10);
    let sliced = Orientation::Horizontal.prepare(&image);
    let even = StripModel::new(2, Some(Parity::Even)).unwrap();
    let odd = StripModel::new(2, Some(Parity::Odd)).unwrap();
    let mut surface = CpuSurface::new(Canvas {
        width: 10,
        height: 10,
    });
    let h = Orientation::Horizontal;
    h.render(&mut surface, &even, &even.build(&sliced).unwrap(), Point::new(0.0, 0.0), 2.0);
    h.render(&mut surface, &odd, &odd.build(&sliced).unwrap(), Point::new(0.0, 2.0), 2.0);
    assert_eq!(surface.pixmap(), &image);
}

#[test]
fn spread_separates_rows_vertically() {
    let image = checker(4, 4);
    let model = StripModel::new(2, None).unwrap();
    let strips = model.build(&Orientation::Horizontal.prepare(&image)).unwrap();
    let mut surface = CpuSurface::new(Canvas {
        width: 4,
        height: 8,
    });
    Orientation::Horizontal.render(&mut surface, &model, &strips, Point::new(0.0, 0.0), 2.0);
    let p = surface.pixmap();
    assert_eq!(p.crop(0, 0, 4, 2), image.crop(0, 0, 4, 2));
    assert!(p.crop(0, 2, 4, 2).data().iter().all(|&b| b == 0));
    assert_eq!(p.crop(0, 4, 4, 2), image.crop(0, 2, 4, 2));
}

#[test]
fn transpose_needs_a_loaded_image() {
    let (pending, completer) = PendingImage::unresolved("later");
    let err = Orientation::Horizontal.prepare_pending(&pending).unwrap_err();
    assert!(err.is_not_ready());

    completer.complete(Ok(checker(3, 2)));
    let sliced = Orientation::Horizontal.prepare_pending(&pending).unwrap();
    assert_eq!((sliced.width(), sliced.height()), (2, 3));
}

#[test]
fn axis_points_along_band_stacking() {
    assert_eq!(Orientation::Vertical.axis(), (1.0, 0.0));
    assert_eq!(Orientation::Horizontal.axis(), (0.0, 1.0));
}

#[test]
fn fractional_positions_keep_every_source_pixel() {
    let image = checker(20, 20);
    let model = StripModel::new(4, None).unwrap();
    for orientation in [Orientation::Vertical, Orientation::Horizontal] {
        let strips = model.build(&orientation.prepare(&image)).unwrap();
        for (x, y, spread) in [
            (0.5, 0.5, 1.0),
            (7.5, 7.5, 1.3),
            (3.25, 10.75, 1.7),
            (0.5, 2.5, 2.0),
        ] {
            let mut surface = CpuSurface::new(Canvas {
                width: 80,
                height: 80,
            });
            orientation.render(&mut surface, &model, &strips, Point::new(x, y), spread);
            let opaque = surface
                .pixmap()
                .data()
                .chunks_exact(4)
                .filter(|px| px[3] == 255)
                .count();
            assert_eq!(opaque, 400, "{orientation:?} at ({x}, {y}) spread {spread}");
        }
    }
}

#[test]
fn half_pixel_origin_shifts_the_whole_image_by_one() {
    let image = checker(20, 20);
    let model = StripModel::new(4, None).unwrap();
    for orientation in [Orientation::Vertical, Orientation::Horizontal] {
        let strips = model.build(&orientation.prepare(&image)).unwrap();
        let mut surface = CpuSurface::new(Canvas {
            width: 30,
            height: 30,
        });
        orientation.render(&mut surface, &model, &strips, Point::new(0.5, 0.5), 1.0);
        assert_eq!(surface.pixmap().crop(1, 1, 20, 20), image, "{orientation:?}");
    }
}
