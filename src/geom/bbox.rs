use geo::{Coord, Rect};

/// Compute the bounding rectangle of a collection of rectangles.
pub(crate) fn combined_bounds<'a>(rects: impl IntoIterator<Item = &'a Rect<f64>>) -> Option<Rect<f64>> {
    rects.into_iter().copied().reduce(|a, b| {
        Rect::new(
            Coord {
                x: a.min().x.min(b.min().x),
                y: a.min().y.min(b.min().y),
            },
            Coord {
                x: a.max().x.max(b.max().x),
                y: a.max().y.max(b.max().y),
            },
        )
    })
}

/// Grow a rectangle by `margin` on every side.
pub(crate) fn expand(rect: &Rect<f64>, margin: f64) -> Rect<f64> {
    Rect::new(
        Coord {
            x: rect.min().x - margin,
            y: rect.min().y - margin,
        },
        Coord {
            x: rect.max().x + margin,
            y: rect.max().y + margin,
        },
    )
}

/// Closed-interval overlap test on both axes.
pub(crate) fn overlaps(a: &Rect<f64>, b: &Rect<f64>) -> bool {
    a.min().x <= b.max().x
        && b.min().x <= a.max().x
        && a.min().y <= b.max().y
        && b.min().y <= a.max().y
}
