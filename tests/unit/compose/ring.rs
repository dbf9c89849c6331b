use super::*;

use crate::foundation::core::Dimensions;

fn ring(count: usize) -> FrameRing {
    FrameRing::new(
        PictureInfo::nv12(Dimensions::new(2, 2)),
        BufferBackend::Shareable,
        count,
    )
    .unwrap()
}

#[test]
fn zero_slots_is_rejected() {
    assert!(
        FrameRing::new(
            PictureInfo::nv12(Dimensions::new(2, 2)),
            BufferBackend::Heap,
            0
        )
        .is_err()
    );
}

#[test]
fn released_slots_are_recycled_in_order() {
    let mut r = ring(2);
    let a = r.write_next(|b| b.fill(1));
    let a_ptr = Arc::as_ptr(&a);
    drop(a);
    let b = r.write_next(|b| b.fill(2));
    drop(b);
    let c = r.write_next(|b| b.fill(3));
    assert_eq!(Arc::as_ptr(&c), a_ptr);
    assert_eq!(c.as_slice(), &[3; 6]);
    assert_eq!(r.overflows(), 0);
}

#[test]
fn held_slots_are_never_overwritten() {
    let mut r = ring(2);
    let a = r.write_next(|b| b.fill(1));
    let b = r.write_next(|b| b.fill(2));
    assert_eq!(r.in_flight(), 2);

    let extra = r.write_next(|b| b.fill(9));
    assert_eq!(r.overflows(), 1);
    assert_eq!(extra.backend(), BufferBackend::Shareable);
    assert_eq!(a.as_slice(), &[1; 6]);
    assert_eq!(b.as_slice(), &[2; 6]);

    drop(b);
    let d = r.write_next(|b| b.fill(4));
    assert_eq!(d.as_slice(), &[4; 6]);
    assert_eq!(a.as_slice(), &[1; 6]);
    assert_eq!(r.capacity(), 2);
}
