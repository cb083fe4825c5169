//! Size quantizer: continuous pixel extents to a closed vocabulary of size classes.
//!
//! Both tables are ordered `(upper bound, label)` pairs, upper bound inclusive.
//! A value larger than every bound falls into the table's overflow class.

/// A quantized size class. `rank` orders classes within one axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SizeClass {
    pub rank: usize,
    pub label: &'static str,
}

/// Height buckets in ascending order.
pub const HEIGHT_CLASSES: &[(f64, &str)] = &[
    (20.0, "h-4"),
    (32.0, "h-6"),
    (40.0, "h-8"),
    (48.0, "h-10"),
    (64.0, "h-12"),
    (96.0, "h-16"),
    (128.0, "h-24"),
];
pub const HEIGHT_OVERFLOW: &str = "h-32";

/// Width buckets in ascending order.
pub const WIDTH_CLASSES: &[(f64, &str)] = &[
    (32.0, "w-8"),
    (48.0, "w-12"),
    (64.0, "w-16"),
    (96.0, "w-24"),
    (128.0, "w-32"),
    (192.0, "w-48"),
    (256.0, "w-64"),
    (384.0, "w-96"),
];
pub const WIDTH_OVERFLOW: &str = "w-full";

fn bucket(table: &[(f64, &'static str)], overflow: &'static str, value: f64) -> SizeClass {
    // Bounds are sorted, so the first bound >= value is found by partition point.
    // NaN compares false everywhere and lands in the overflow class.
    let idx = table.partition_point(|&(bound, _)| value > bound || value.is_nan());
    match table.get(idx) {
        Some(&(_, label)) => SizeClass { rank: idx, label },
        None => SizeClass { rank: table.len(), label: overflow },
    }
}

pub fn height_class(height: f64) -> SizeClass {
    bucket(HEIGHT_CLASSES, HEIGHT_OVERFLOW, height)
}

pub fn width_class(width: f64) -> SizeClass {
    bucket(WIDTH_CLASSES, WIDTH_OVERFLOW, width)
}

/// Nominal pixel size of a class, used when drawing preview boxes.
///
/// `w-full` has no fixed size; callers pass the width available to it.
pub fn nominal_px(label: &str, full: f64) -> f64 {
    if label.ends_with("-full") {
        return full;
    }
    label
        .rsplit('-')
        .next()
        .and_then(|n| n.parse::<f64>().ok())
        .map(|n| n * 4.0)
        .unwrap_or(full)
}
