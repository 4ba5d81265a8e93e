//! Path color animation.
//!
//! The renderer redraws the path every frame; the line's color is a pure
//! function of elapsed time, cycling hue at `animation.speed` revolutions per
//! second with fixed saturation and lightness. No state is kept between
//! frames.

use crate::config::{PathAnimation, PathOptions};

/// Linear RGB triple, each channel in 0..=1.
pub type Rgb = [f32; 3];

/// Hue (0..1) reached after `elapsed_secs` at `speed` revolutions per second.
#[inline]
pub fn path_hue(elapsed_secs: f64, speed: f64) -> f64 {
    (elapsed_secs * speed).rem_euclid(1.0)
}

/// Convert HSL (all components 0..=1, hue wraps) to RGB.
pub fn hsl_to_rgb(h: f64, s: f64, l: f64) -> Rgb {
    let h = h.rem_euclid(1.0);
    let s = s.clamp(0.0, 1.0);
    let l = l.clamp(0.0, 1.0);

    if s == 0.0 {
        return [l as f32; 3];
    }

    let q = if l <= 0.5 { l * (1.0 + s) } else { l + s - l * s };
    let p = 2.0 * l - q;

    [
        hue_to_channel(p, q, h + 1.0 / 3.0) as f32,
        hue_to_channel(p, q, h) as f32,
        hue_to_channel(p, q, h - 1.0 / 3.0) as f32,
    ]
}

fn hue_to_channel(p: f64, q: f64, t: f64) -> f64 {
    let t = t.rem_euclid(1.0);
    if t < 1.0 / 6.0 {
        p + (q - p) * 6.0 * t
    } else if t < 0.5 {
        q
    } else if t < 2.0 / 3.0 {
        p + (q - p) * 6.0 * (2.0 / 3.0 - t)
    } else {
        p
    }
}

/// Animated path color at `elapsed_secs`.
pub fn animated_color(elapsed_secs: f64, animation: &PathAnimation) -> Rgb {
    hsl_to_rgb(path_hue(elapsed_secs, animation.speed), animation.saturation, animation.lightness)
}

impl PathOptions {
    /// Color for the frame at `elapsed_secs`, or `None` when animation is off
    /// and the renderer should use `default_color`.
    pub fn color_at(&self, elapsed_secs: f64) -> Option<Rgb> {
        self.animate.then(|| animated_color(elapsed_secs, &self.animation))
    }
}
