//! Depth color ramp for branch circles.
//!
//! A linear scale over depth `[0, 5]` between two HSL stops, interpolated in CIE HCL (the way
//! d3's `interpolateHcl` does it) and written as `rgb(r, g, b)`.

const DEPTH_DOMAIN: f64 = 5.0;
const START: Hsl = Hsl {
    h_deg: 20.0,
    s_pct: 0.0,
    l_pct: 80.0,
};
const END: Hsl = Hsl {
    h_deg: 200.0,
    s_pct: 30.0,
    l_pct: 40.0,
};

// D50 white point and the Lab companding constants.
const XN: f64 = 0.96422;
const YN: f64 = 1.0;
const ZN: f64 = 0.82521;
const T0: f64 = 4.0 / 29.0;
const T1: f64 = 6.0 / 29.0;
const T2: f64 = 3.0 * T1 * T1;
const T3: f64 = T1 * T1 * T1;

#[derive(Debug, Clone, Copy)]
struct Hsl {
    h_deg: f64,
    s_pct: f64,
    l_pct: f64,
}

#[derive(Debug, Clone, Copy)]
struct Rgb01 {
    r: f64,
    g: f64,
    b: f64,
}

/// Hue is NaN for achromatic colors, so it does not pull the interpolation.
#[derive(Debug, Clone, Copy)]
struct Hcl {
    h: f64,
    c: f64,
    l: f64,
}

/// Fill color of a branch circle at `depth`. Depths past the domain extrapolate.
pub fn depth_color(depth: usize) -> String {
    let t = depth as f64 / DEPTH_DOMAIN;
    let a = rgb_to_hcl(hsl_to_rgb01(START));
    let b = rgb_to_hcl(hsl_to_rgb01(END));
    let mixed = Hcl {
        h: interpolate_hue(a.h, b.h, t),
        c: interpolate(a.c, b.c, t),
        l: interpolate(a.l, b.l, t),
    };
    fmt_rgb(hcl_to_rgb(mixed))
}

fn interpolate(a: f64, b: f64, t: f64) -> f64 {
    match (a.is_nan(), b.is_nan()) {
        (true, _) => b,
        (_, true) => a,
        _ => a + (b - a) * t,
    }
}

fn interpolate_hue(a: f64, b: f64, t: f64) -> f64 {
    if a.is_nan() || b.is_nan() {
        return interpolate(a, b, t);
    }
    let mut d = b - a;
    if !(-180.0..=180.0).contains(&d) {
        d -= 360.0 * (d / 360.0).round();
    }
    a + d * t
}

fn hsl_to_rgb01(hsl: Hsl) -> Rgb01 {
    let h = (hsl.h_deg / 360.0) % 1.0;
    let s = (hsl.s_pct / 100.0).clamp(0.0, 1.0);
    let l = (hsl.l_pct / 100.0).clamp(0.0, 1.0);

    if s == 0.0 {
        return Rgb01 { r: l, g: l, b: l };
    }

    fn hue_to_rgb(p: f64, q: f64, mut t: f64) -> f64 {
        if t < 0.0 {
            t += 1.0;
        }
        if t > 1.0 {
            t -= 1.0;
        }
        if t < 1.0 / 6.0 {
            return p + (q - p) * 6.0 * t;
        }
        if t < 1.0 / 2.0 {
            return q;
        }
        if t < 2.0 / 3.0 {
            return p + (q - p) * (2.0 / 3.0 - t) * 6.0;
        }
        p
    }

    let q = if l < 0.5 {
        l * (1.0 + s)
    } else {
        l + s - l * s
    };
    let p = 2.0 * l - q;
    Rgb01 {
        r: hue_to_rgb(p, q, h + 1.0 / 3.0),
        g: hue_to_rgb(p, q, h),
        b: hue_to_rgb(p, q, h - 1.0 / 3.0),
    }
}

fn to_linear(x: f64) -> f64 {
    if x <= 0.04045 {
        x / 12.92
    } else {
        ((x + 0.055) / 1.055).powf(2.4)
    }
}

fn from_linear(x: f64) -> f64 {
    if x <= 0.0031308 {
        12.92 * x
    } else {
        1.055 * x.powf(1.0 / 2.4) - 0.055
    }
}

fn xyz_to_lab(t: f64) -> f64 {
    if t > T3 { t.cbrt() } else { t / T2 + T0 }
}

fn lab_to_xyz(t: f64) -> f64 {
    if t > T1 { t * t * t } else { T2 * (t - T0) }
}

fn rgb_to_hcl(rgb: Rgb01) -> Hcl {
    let r = to_linear(rgb.r);
    let g = to_linear(rgb.g);
    let b = to_linear(rgb.b);
    let y = xyz_to_lab((0.2225045 * r + 0.7168786 * g + 0.0606169 * b) / YN);
    let (x, z) = if r == g && g == b {
        (y, y)
    } else {
        (
            xyz_to_lab((0.4360747 * r + 0.3850649 * g + 0.1430804 * b) / XN),
            xyz_to_lab((0.0139322 * r + 0.0971045 * g + 0.7141733 * b) / ZN),
        )
    };
    let l = 116.0 * y - 16.0;
    let a = 500.0 * (x - y);
    let bb = 200.0 * (y - z);

    if a == 0.0 && bb == 0.0 {
        let c = if l > 0.0 && l < 100.0 { 0.0 } else { f64::NAN };
        return Hcl { h: f64::NAN, c, l };
    }
    let h = bb.atan2(a).to_degrees();
    Hcl {
        h: if h < 0.0 { h + 360.0 } else { h },
        c: a.hypot(bb),
        l,
    }
}

fn hcl_to_rgb(hcl: Hcl) -> Rgb01 {
    let (a, b) = if hcl.h.is_nan() {
        (0.0, 0.0)
    } else {
        let h = hcl.h.to_radians();
        let c = if hcl.c.is_nan() { 0.0 } else { hcl.c };
        (h.cos() * c, h.sin() * c)
    };
    let y = (hcl.l + 16.0) / 116.0;
    let x = XN * lab_to_xyz(y + a / 500.0);
    let z = ZN * lab_to_xyz(y - b / 200.0);
    let y = YN * lab_to_xyz(y);
    Rgb01 {
        r: from_linear(3.1338561 * x - 1.6168667 * y - 0.4906146 * z),
        g: from_linear(-0.9787684 * x + 1.9161415 * y + 0.0334540 * z),
        b: from_linear(0.0719453 * x - 0.2289914 * y + 1.4052427 * z),
    }
}

fn fmt_rgb(rgb: Rgb01) -> String {
    let channel = |v: f64| {
        if v.is_nan() {
            0
        } else {
            (v * 255.0).round().clamp(0.0, 255.0) as u8
        }
    };
    format!(
        "rgb({}, {}, {})",
        channel(rgb.r),
        channel(rgb.g),
        channel(rgb.b)
    )
}
