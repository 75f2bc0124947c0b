use serde::{Deserialize, Serialize};

use super::rect::{Point, Rect};

/// Where an interior pixel sits relative to the reference point
///
/// Variant order is the priority order: the first one whose predicate holds
/// decides the pixel's source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Row above the reference: copy the pixel one row up
    Above,
    /// Column left of the reference: copy the pixel one column left
    Left,
    /// Column right of the reference: copy from the rectangle's right edge
    Right,
    /// Row below the reference: copy from the rectangle's bottom edge
    Below,
    /// The reference itself: copy the bottom-right corner
    Center,
}

/// How the below-the-reference rule is evaluated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BelowRule {
    /// `y > reference.y`
    #[default]
    Corrected,
    /// Repeats the left-of comparison, so the rule never fires and pixels in
    /// the reference column below the reference stay untouched
    Legacy,
}

impl Direction {
    /// Classify an interior point, or `None` if no rule applies
    ///
    /// `None` only happens with [`BelowRule::Legacy`].
    pub fn classify(point: Point, reference: Point, below_rule: BelowRule) -> Option<Self> {
        if point.y < reference.y {
            return Some(Self::Above);
        }
        if point.x < reference.x {
            return Some(Self::Left);
        }
        if point.x > reference.x {
            return Some(Self::Right);
        }

        let below = match below_rule {
            BelowRule::Corrected => point.y > reference.y,
            BelowRule::Legacy => point.x < reference.x,
        };
        if below {
            return Some(Self::Below);
        }

        if point == reference {
            return Some(Self::Center);
        }
        None
    }

    /// The pixel a point in this direction copies from
    pub fn source(self, point: Point, rect: &Rect) -> Point {
        match self {
            Self::Above => Point::new(point.x, point.y - 1),
            Self::Left => Point::new(point.x - 1, point.y),
            Self::Right => Point::new(rect.x1, point.y),
            Self::Below => Point::new(point.x, rect.y1),
            Self::Center => rect.bottom_right(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classify_all(rect: &Rect, rule: BelowRule) -> Vec<(Point, Option<Direction>)> {
        let reference = rect.reference();
        rect.interior_column_major()
            .map(|p| (p, Direction::classify(p, reference, rule)))
            .collect()
    }

    #[test]
    fn test_two_by_two_scenario() {
        let rect = Rect::new((2, 2), (4, 4)).unwrap();
        let reference = rect.reference();

        let cases = [
            ((2, 2), Direction::Above, (2, 1)),
            ((3, 2), Direction::Above, (3, 1)),
            ((2, 3), Direction::Left, (1, 3)),
            ((3, 3), Direction::Center, (4, 4)),
        ];

        for ((x, y), direction, (sx, sy)) in cases {
            let point = Point::new(x, y);
            let got = Direction::classify(point, reference, BelowRule::Corrected);
            assert_eq!(got, Some(direction), "at ({}, {})", x, y);
            assert_eq!(direction.source(point, &rect), Point::new(sx, sy));
        }
    }

    #[test]
    fn test_corrected_rule_classifies_every_pixel() {
        for (from, to) in [((1, 1), (7, 7)), ((3, 5), (10, 6)), ((948, 230), (954, 235)), ((1, 1), (2, 9))] {
            let rect = Rect::new(from, to).unwrap();
            for (p, d) in classify_all(&rect, BelowRule::Corrected) {
                assert!(d.is_some(), "({}, {}) unclassified in {:?}", p.x, p.y, rect);
            }
        }
    }

    #[test]
    fn test_reference_always_uses_corner_copy() {
        let rect = Rect::new((4, 4), (9, 9)).unwrap();
        let reference = rect.reference();
        for rule in [BelowRule::Corrected, BelowRule::Legacy] {
            assert_eq!(Direction::classify(reference, reference, rule), Some(Direction::Center));
        }
        assert_eq!(Direction::Center.source(reference, &rect), Point::new(9, 9));
    }

    #[test]
    fn test_below_only_in_reference_column() {
        // x in 2..5, y in 2..6, reference (4, 4)
        let rect = Rect::new((2, 2), (5, 6)).unwrap();
        let below: Vec<Point> = classify_all(&rect, BelowRule::Corrected)
            .into_iter()
            .filter(|(_, d)| *d == Some(Direction::Below))
            .map(|(p, _)| p)
            .collect();
        assert_eq!(below, vec![Point::new(4, 5)]);
        assert_eq!(Direction::Below.source(Point::new(4, 5), &rect), Point::new(4, 6));
    }

    #[test]
    fn test_legacy_rule_leaves_gap_below_reference() {
        let rect = Rect::new((2, 2), (5, 6)).unwrap();
        let unclassified: Vec<Point> = classify_all(&rect, BelowRule::Legacy)
            .into_iter()
            .filter(|(_, d)| d.is_none())
            .map(|(p, _)| p)
            .collect();
        assert_eq!(unclassified, vec![Point::new(4, 5)]);

        assert!(classify_all(&rect, BelowRule::Legacy)
            .iter()
            .all(|(_, d)| *d != Some(Direction::Below)));
    }

    #[test]
    fn test_right_copies_from_right_edge() {
        let rect = Rect::new((1, 1), (7, 3)).unwrap();
        let point = Point::new(6, 2);
        assert_eq!(
            Direction::classify(point, rect.reference(), BelowRule::Corrected),
            Some(Direction::Right)
        );
        assert_eq!(Direction::Right.source(point, &rect), Point::new(7, 2));
    }
}
