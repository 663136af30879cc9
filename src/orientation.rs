use crate::types::Dims;

/// All distinct axis-aligned rotations of a box.
///
/// The order is fixed: (L,W,H), (L,H,W), (W,L,H), (W,H,L), (H,L,W), (H,W,L),
/// with later duplicates dropped. Search traces depend on it.
pub fn orientations(dims: Dims) -> Vec<Dims> {
    let Dims {
        length: l,
        width: w,
        height: h,
    } = dims;
    let candidates = [
        Dims::new(l, w, h),
        Dims::new(l, h, w),
        Dims::new(w, l, h),
        Dims::new(w, h, l),
        Dims::new(h, l, w),
        Dims::new(h, w, l),
    ];

    let mut out: Vec<Dims> = Vec::with_capacity(candidates.len());
    for c in candidates {
        if !out.contains(&c) {
            out.push(c);
        }
    }
    out
}
