//! Greedy packing of sibling circles around a common center.
//!
//! Circles are placed largest first. The first two touch; each following circle is placed
//! tangent to a pair of neighbours on the front chain (the ring of circles on the outside of
//! the packing). If it would overlap a chain circle, the chain is cut past that circle and the
//! placement is retried. After each insertion the chain pair closest to the origin becomes the
//! next host pair, which keeps the packing round and the enclosing circle small.

use crate::circle::{Circle, enclose, grow_to_fit};

// Relative slack for tangency: touching circles must not count as overlapping.
const TOUCH_EPS: f64 = 1e-9;

/// Packs `circles` in place so that rims keep at least `padding` apart and re-centers the
/// packing on its enclosing circle at the origin.
///
/// Returns the enclosing radius of the circles grown by `padding / 2`; every circle therefore
/// sits at least `padding / 2` inside the returned radius. Input coordinates are ignored.
pub fn pack_siblings(circles: &mut [Circle], padding: f64) -> f64 {
    let pad = padding.max(0.0) / 2.0;
    let radii = circles.iter().map(|c| c.r).collect::<Vec<_>>();
    for c in circles.iter_mut() {
        c.r += pad;
    }
    let radius = place(circles);
    for (c, r) in circles.iter_mut().zip(radii) {
        c.r = r;
    }
    radius
}

/// Places touching circles (no padding) and returns their enclosing radius.
fn place(circles: &mut [Circle]) -> f64 {
    if circles.is_empty() {
        return 0.0;
    }

    let mut order: Vec<usize> = (0..circles.len()).collect();
    order.sort_by(|&a, &b| circles[b].r.total_cmp(&circles[a].r));
    let mut sorted = order.iter().map(|&i| circles[i]).collect::<Vec<_>>();

    let front = place_sorted(&mut sorted);
    let hull = enclose(&front).map(|e| grow_to_fit(e, &sorted));
    let Some(e) = hull else {
        return 0.0;
    };
    for (&i, c) in order.iter().zip(&sorted) {
        circles[i] = Circle::new(c.x - e.x, c.y - e.y, c.r);
    }
    e.r
}

/// Positions circles sorted by decreasing radius and returns the final front chain.
fn place_sorted(cs: &mut [Circle]) -> Vec<Circle> {
    let n = cs.len();
    cs[0].x = 0.0;
    cs[0].y = 0.0;
    if n == 1 {
        return vec![cs[0]];
    }

    cs[0].x = -cs[1].r;
    cs[1].x = cs[0].r;
    cs[1].y = 0.0;
    if n == 2 {
        return vec![cs[0], cs[1]];
    }

    let (x, y) = tangent_spot(&cs[0], &cs[1], cs[2].r);
    cs[2].x = x;
    cs[2].y = y;

    // Front chain as a ring of indices: 0 -> 1 -> 2 -> 0.
    let mut next = vec![0usize; n];
    let mut prev = vec![0usize; n];
    next[0] = 1;
    next[1] = 2;
    next[2] = 0;
    prev[0] = 2;
    prev[1] = 0;
    prev[2] = 1;

    let (mut a, mut b) = (0usize, 1usize);
    let mut i = 3;
    while i < n {
        let (x, y) = tangent_spot(&cs[b], &cs[a], cs[i].r);
        cs[i].x = x;
        cs[i].y = y;
        let c = cs[i];

        // Walk the chain outwards from the host pair in both directions, always advancing the
        // side that has covered less arc, until the two walks meet.
        let (mut j, mut k) = (next[b], prev[a]);
        let (mut sj, mut sk) = (cs[b].r, cs[a].r);
        let mut cut = false;
        loop {
            if sj <= sk {
                if intersects(&cs[j], &c) {
                    b = j;
                    next[a] = b;
                    prev[b] = a;
                    cut = true;
                    break;
                }
                sj += cs[j].r;
                j = next[j];
            } else {
                if intersects(&cs[k], &c) {
                    a = k;
                    next[a] = b;
                    prev[b] = a;
                    cut = true;
                    break;
                }
                sk += cs[k].r;
                k = prev[k];
            }
            if j == next[k] {
                break;
            }
        }
        if cut {
            continue;
        }

        prev[i] = a;
        next[i] = b;
        next[a] = i;
        prev[b] = i;
        b = i;

        let mut best = a;
        let mut best_score = score(&cs[a], &cs[next[a]]);
        let mut cur = next[b];
        while cur != b {
            let s = score(&cs[cur], &cs[next[cur]]);
            if s < best_score {
                best = cur;
                best_score = s;
            }
            cur = next[cur];
        }
        a = best;
        b = next[a];
        i += 1;
    }

    let mut front = vec![cs[b]];
    let mut cur = next[b];
    while cur != b {
        front.push(cs[cur]);
        cur = next[cur];
    }
    front
}

/// Center at which a circle of radius `r` touches both `a` and `b`.
fn tangent_spot(a: &Circle, b: &Circle, r: f64) -> (f64, f64) {
    let dx = b.x - a.x;
    let dy = b.y - a.y;
    let d2 = dx * dx + dy * dy;
    if d2 <= 0.0 {
        return (a.x + a.r + r, a.y);
    }
    let ra2 = (a.r + r) * (a.r + r);
    let rb2 = (b.r + r) * (b.r + r);
    if ra2 > rb2 {
        let x = (d2 + rb2 - ra2) / (2.0 * d2);
        let y = (rb2 / d2 - x * x).max(0.0).sqrt();
        (b.x - x * dx - y * dy, b.y - x * dy + y * dx)
    } else {
        let x = (d2 + ra2 - rb2) / (2.0 * d2);
        let y = (ra2 / d2 - x * x).max(0.0).sqrt();
        (a.x + x * dx - y * dy, a.y + x * dy + y * dx)
    }
}

fn intersects(a: &Circle, b: &Circle) -> bool {
    let sum = a.r + b.r;
    let dr = sum - sum * TOUCH_EPS;
    let dx = b.x - a.x;
    let dy = b.y - a.y;
    dr > 0.0 && dr * dr > dx * dx + dy * dy
}

/// Squared distance from the origin to the weighted midpoint of two chain neighbours.
fn score(a: &Circle, b: &Circle) -> f64 {
    let ab = a.r + b.r;
    let (x, y) = if ab > 0.0 {
        ((a.x * b.r + b.x * a.r) / ab, (a.y * b.r + b.y * a.r) / ab)
    } else {
        ((a.x + b.x) / 2.0, (a.y + b.y) / 2.0)
    };
    x * x + y * y
}
