//! Circles and their minimal enclosing circle.
//!
//! The enclosing circle uses move-to-front basis extension: a running basis of at most three
//! circles defines the current candidate, and any circle falling outside restarts the scan with
//! an extended basis.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Circle {
    pub x: f64,
    pub y: f64,
    pub r: f64,
}

impl Circle {
    pub fn new(x: f64, y: f64, r: f64) -> Self {
        Self { x, y, r }
    }

    pub fn distance(&self, other: &Circle) -> f64 {
        (other.x - self.x).hypot(other.y - self.y)
    }

    /// Whether `other` lies inside `self`, allowing `eps` of slack.
    pub fn contains(&self, other: &Circle, eps: f64) -> bool {
        self.distance(other) + other.r <= self.r + eps
    }

    /// Whether the two circles keep at least `gap` between their rims, allowing `eps` of slack.
    pub fn separated(&self, other: &Circle, gap: f64, eps: f64) -> bool {
        self.distance(other) + eps >= self.r + other.r + gap
    }
}

/// Smallest circle enclosing every circle in `circles`, or `None` when the slice is empty.
pub fn enclose(circles: &[Circle]) -> Option<Circle> {
    let n = circles.len();
    if n == 0 {
        return None;
    }

    // Basis changes are rare in practice; the cap only guards against float ping-pong.
    let max_restarts = n.saturating_mul(n).saturating_add(64);
    let mut restarts = 0usize;
    let mut basis: Vec<Circle> = Vec::with_capacity(3);
    let mut current: Option<Circle> = None;
    let mut i = 0usize;
    while i < n {
        let p = circles[i];
        if current.is_some_and(|e| encloses_weak(&e, &p)) {
            i += 1;
            continue;
        }
        restarts += 1;
        let extended = if restarts > max_restarts {
            None
        } else {
            extend_basis(&basis, p)
        };
        let Some(extended) = extended else {
            tracing::trace!(circles = n, "enclosing basis did not converge; using bounds");
            current = None;
            break;
        };
        current = Some(enclose_basis(&extended));
        basis = extended;
        i = 0;
    }

    let e = match current {
        Some(e) => e,
        None => bounding_circle(circles)?,
    };
    Some(grow_to_fit(e, circles))
}

fn extend_basis(basis: &[Circle], p: Circle) -> Option<Vec<Circle>> {
    if encloses_weak_all(&p, basis) {
        return Some(vec![p]);
    }

    for b in basis {
        if encloses_not(&p, b) && encloses_weak_all(&enclose_basis2(b, &p), basis) {
            return Some(vec![*b, p]);
        }
    }

    for i in 0..basis.len().saturating_sub(1) {
        for j in (i + 1)..basis.len() {
            let (bi, bj) = (&basis[i], &basis[j]);
            if encloses_not(&enclose_basis2(bi, bj), &p)
                && encloses_not(&enclose_basis2(bi, &p), bj)
                && encloses_not(&enclose_basis2(bj, &p), bi)
                && encloses_weak_all(&enclose_basis3(bi, bj, &p), basis)
            {
                return Some(vec![*bi, *bj, p]);
            }
        }
    }

    None
}

fn encloses_not(a: &Circle, b: &Circle) -> bool {
    let dr = a.r - b.r;
    let dx = b.x - a.x;
    let dy = b.y - a.y;
    dr < 0.0 || dr * dr < dx * dx + dy * dy
}

fn encloses_weak(a: &Circle, b: &Circle) -> bool {
    let dr = a.r - b.r + a.r.max(b.r).max(1.0) * 1e-9;
    let dx = b.x - a.x;
    let dy = b.y - a.y;
    dr > 0.0 && dr * dr > dx * dx + dy * dy
}

fn encloses_weak_all(a: &Circle, basis: &[Circle]) -> bool {
    basis.iter().all(|b| encloses_weak(a, b))
}

fn enclose_basis(basis: &[Circle]) -> Circle {
    match basis {
        [a] => *a,
        [a, b] => enclose_basis2(a, b),
        [a, b, c] => enclose_basis3(a, b, c),
        _ => Circle::new(0.0, 0.0, 0.0),
    }
}

fn enclose_basis2(a: &Circle, b: &Circle) -> Circle {
    let x21 = b.x - a.x;
    let y21 = b.y - a.y;
    let r21 = b.r - a.r;
    let l = x21.hypot(y21);
    if l == 0.0 {
        return if a.r >= b.r { *a } else { *b };
    }
    Circle {
        x: (a.x + b.x + x21 / l * r21) / 2.0,
        y: (a.y + b.y + y21 / l * r21) / 2.0,
        r: (l + a.r + b.r) / 2.0,
    }
}

fn enclose_basis3(a: &Circle, b: &Circle, c: &Circle) -> Circle {
    let (x1, y1, r1) = (a.x, a.y, a.r);
    let (x2, y2, r2) = (b.x, b.y, b.r);
    let (x3, y3, r3) = (c.x, c.y, c.r);
    let a2 = x1 - x2;
    let a3 = x1 - x3;
    let b2 = y1 - y2;
    let b3 = y1 - y3;
    let c2 = r2 - r1;
    let c3 = r3 - r1;
    let d1 = x1 * x1 + y1 * y1 - r1 * r1;
    let d2 = d1 - x2 * x2 - y2 * y2 + r2 * r2;
    let d3 = d1 - x3 * x3 - y3 * y3 + r3 * r3;
    let ab = a3 * b2 - a2 * b3;
    let xa = (b2 * d3 - b3 * d2) / (ab * 2.0) - x1;
    let xb = (b3 * c2 - b2 * c3) / ab;
    let ya = (a3 * d2 - a2 * d3) / (ab * 2.0) - y1;
    let yb = (a2 * c3 - a3 * c2) / ab;
    let qa = xb * xb + yb * yb - 1.0;
    let qb = 2.0 * (r1 + xa * xb + ya * yb);
    let qc = xa * xa + ya * ya - r1 * r1;
    // Collinear centers make `ab` zero; the NaN result then fails every containment check.
    let r = -(if qa.abs() > 1e-6 {
        (qb + (qb * qb - 4.0 * qa * qc).sqrt()) / (2.0 * qa)
    } else {
        qc / qb
    });
    Circle {
        x: x1 + xa + xb * r,
        y: y1 + ya + yb * r,
        r,
    }
}

fn bounding_circle(circles: &[Circle]) -> Option<Circle> {
    let first = circles.first()?;
    let (mut min_x, mut min_y) = (first.x - first.r, first.y - first.r);
    let (mut max_x, mut max_y) = (first.x + first.r, first.y + first.r);
    for c in circles {
        min_x = min_x.min(c.x - c.r);
        min_y = min_y.min(c.y - c.r);
        max_x = max_x.max(c.x + c.r);
        max_y = max_y.max(c.y + c.r);
    }
    Some(Circle::new((min_x + max_x) / 2.0, (min_y + max_y) / 2.0, 0.0))
}

/// Grows `e` until it contains every circle in `circles`.
pub(crate) fn grow_to_fit(mut e: Circle, circles: &[Circle]) -> Circle {
    for c in circles {
        let needed = e.distance(c) + c.r;
        if needed > e.r {
            e.r = needed;
        }
    }
    e
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const EPS: f64 = 1e-9;

    fn assert_close(a: f64, b: f64) {
        assert!((a - b).abs() < 1e-6, "{a} != {b}");
    }

    #[test]
    fn empty_slice_has_no_enclosure() {
        assert_eq!(enclose(&[]), None);
    }

    #[test]
    fn single_circle_encloses_itself() {
        let c = Circle::new(3.0, -2.0, 5.0);
        assert_eq!(enclose(&[c]), Some(c));
    }

    #[test]
    fn two_touching_circles() {
        let e = enclose(&[Circle::new(-1.0, 0.0, 1.0), Circle::new(2.0, 0.0, 2.0)]).unwrap();
        assert_close(e.x, 1.0);
        assert_close(e.y, 0.0);
        assert_close(e.r, 3.0);
    }

    #[test]
    fn nested_circle_is_ignored() {
        let big = Circle::new(0.0, 0.0, 10.0);
        let e = enclose(&[Circle::new(1.0, 1.0, 2.0), big]).unwrap();
        assert_close(e.r, 10.0);
        assert_close(e.x, 0.0);
    }

    #[test]
    fn three_unit_circles_on_a_triangle() {
        let h = 3f64.sqrt();
        let circles = [
            Circle::new(-1.0, 0.0, 1.0),
            Circle::new(1.0, 0.0, 1.0),
            Circle::new(0.0, h, 1.0),
        ];
        let e = enclose(&circles).unwrap();
        let centroid_y = h / 3.0;
        assert_close(e.x, 0.0);
        assert_close(e.y, centroid_y);
        assert_close(e.r, 1.0 + 2.0 / h);
    }

    #[test]
    fn collinear_circles_are_enclosed() {
        let circles = [
            Circle::new(0.0, 0.0, 1.0),
            Circle::new(4.0, 0.0, 1.0),
            Circle::new(2.0, 0.0, 1.0),
            Circle::new(8.0, 0.0, 0.5),
        ];
        let e = enclose(&circles).unwrap();
        assert_close(e.r, 4.75);
        for c in &circles {
            assert!(e.contains(c, EPS));
        }
    }

    #[test]
    fn zero_radius_points() {
        let circles = [
            Circle::new(0.0, 0.0, 0.0),
            Circle::new(2.0, 0.0, 0.0),
            Circle::new(1.0, 1.0, 0.0),
        ];
        let e = enclose(&circles).unwrap();
        assert_close(e.r, 1.0);
        for c in &circles {
            assert!(e.contains(c, EPS));
        }
    }

    proptest! {
        #[test]
        fn enclosure_contains_and_touches(
            circles in prop::collection::vec(
                (-100.0f64..100.0, -100.0f64..100.0, 0.0f64..10.0),
                1..120,
            )
        ) {
            let circles = circles
                .into_iter()
                .map(|(x, y, r)| Circle::new(x, y, r))
                .collect::<Vec<_>>();
            let e = enclose(&circles).unwrap();
            for c in &circles {
                prop_assert!(e.contains(c, 1e-7), "{c:?} escapes {e:?}");
            }
            prop_assert!(
                circles.iter().any(|c| (e.distance(c) + c.r - e.r).abs() < 1e-6),
                "enclosure {e:?} touches nothing"
            );
        }
    }
}
