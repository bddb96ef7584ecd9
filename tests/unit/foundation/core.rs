use super::*;

#[test]
fn intersect_clamps_to_overlap() {
    let a = IntRect::new(0, 0, 10, 10);
    let b = IntRect::new(5, 6, 10, 10);
    assert_eq!(a.intersect(&b), IntRect::new(5, 6, 5, 4));

    let far = IntRect::new(20, 20, 3, 3);
    assert!(a.intersect(&far).is_empty());
}

#[test]
fn round_out_covers_fractional_edges() {
    let r = IntRect::round_out(Rect::new(1.2, 2.8, 4.1, 5.0));
    assert_eq!(r, IntRect::new(1, 2, 4, 3));
}

#[test]
fn two_rect_rejects_non_positive_sizes() {
    let ok = IntRect::new(0, 0, 4, 4);
    assert!(!TwoRect::identity(ok).is_invalid());
    assert!(TwoRect::new(IntRect::new(0, 0, 0, 4), ok).is_invalid());
    assert!(TwoRect::new(ok, IntRect::new(0, 0, 4, -1)).is_invalid());
}

#[test]
fn contains_uses_exclusive_far_edges() {
    let r = IntRect::new(2, 2, 2, 2);
    assert!(r.contains(2, 2));
    assert!(r.contains(3, 3));
    assert!(!r.contains(4, 3));
}

#[test]
fn round_out_saturates_huge_spans() {
    let r = IntRect::round_out(Rect::new(-3.0e9, -1.0, 3.0e9, 1.0));
    assert_eq!(r.x, i32::MIN);
    assert_eq!(r.width, i32::MAX);
    assert_eq!(r.height, 2);
    let clipped = r.intersect(&IntRect::new(0, 0, 16, 16));
    assert_eq!(clipped, IntRect::new(0, 0, 16, 1));
}
