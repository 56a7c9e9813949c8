use core::ops::Range;

/// Returns (`ab` overlaps `cd` || `ab` is adjacent to `cd`).
pub(crate) fn touching<I: PartialOrd>(ab: &Range<I>, cd: &Range<I>) -> bool {
    ab.start <= cd.end && cd.start <= ab.end
}

/// Returns (`outer` contains every element of `inner`).
pub(crate) fn covers<I: PartialOrd>(outer: &Range<I>, inner: &Range<I>) -> bool {
    outer.start <= inner.start && inner.end <= outer.end
}
