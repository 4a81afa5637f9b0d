use super::*;

#[test]
fn canvas_rejects_zero_sides() {
    assert!(Canvas::new(0, 10).is_err());
    assert!(Canvas::new(10, 0).is_err());
    let c = Canvas::new(4, 3).unwrap();
    assert_eq!((c.width, c.height), (4, 3));
}

#[test]
fn parity_partitions_indices() {
    let even: Vec<usize> = (0..6).filter(|&i| Parity::Even.matches(i)).collect();
    let odd: Vec<usize> = (0..6).filter(|&i| Parity::Odd.matches(i)).collect();
    assert_eq!(even, vec![0, 2, 4]);
    assert_eq!(odd, vec![1, 3, 5]);
    assert_eq!(Parity::Even.suffix(), "_even");
    assert_eq!(Parity::Odd.suffix(), "_odd");
}

#[test]
fn premul_from_straight_rounds() {
    let c = Rgba8Premul::from_straight_rgba(255, 128, 0, 128);
    assert_eq!(c.to_array(), [128, 64, 0, 128]);
    assert_eq!(Rgba8Premul::transparent().to_array(), [0, 0, 0, 0]);
}
