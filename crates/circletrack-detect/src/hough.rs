//! Gradient Hough transform for circles.
//!
//! Every Canny edge pixel votes along its Sobel gradient direction (both
//! signs) at distances in `[min_radius, max_radius]`, into an accumulator
//! downsampled by `dp`. Accumulator peaks above `acc_threshold` become
//! center candidates, strongest first. Candidates closer than `min_dist` to
//! an accepted circle are dropped; the rest get a radius from the histogram
//! of edge distances and are kept when enough of the circumference is
//! supported by edges.

use image::GrayImage;
use imageproc::edges::canny;
use imageproc::gradients::{horizontal_sobel, vertical_sobel};
use nalgebra::Point2;
use serde::{Deserialize, Serialize};

use crate::params::HoughCircleParams;

#[cfg(feature = "tracing")]
use tracing::instrument;

/// A circle returned by the detector, in sub-pixel image coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct CircleCandidate {
    pub center: Point2<f32>,
    pub radius: f32,
    /// Accumulator votes at the center peak.
    pub votes: u32,
    /// Fraction of the circumference covered by edge pixels.
    pub support: f32,
}

struct Accumulator {
    width: usize,
    height: usize,
    dp: f32,
    votes: Vec<u32>,
}

impl Accumulator {
    fn new(img_w: u32, img_h: u32, dp: f32) -> Self {
        let width = (img_w as f32 / dp).ceil() as usize + 1;
        let height = (img_h as f32 / dp).ceil() as usize + 1;
        Self {
            width,
            height,
            dp,
            votes: vec![0; width * height],
        }
    }

    /// Cell index for an image-space point, or `None` outside the grid.
    #[inline]
    fn cell(&self, x: f32, y: f32) -> Option<usize> {
        let ax = (x / self.dp).round();
        let ay = (y / self.dp).round();
        if ax < 0.0 || ay < 0.0 || ax >= self.width as f32 || ay >= self.height as f32 {
            return None;
        }
        Some(ay as usize * self.width + ax as usize)
    }

    /// Local maxima above `threshold`, strongest first; ties keep raster order.
    fn peaks(&self, threshold: u32) -> Vec<(usize, u32)> {
        let w = self.width;
        let mut out = Vec::new();
        if self.width < 3 || self.height < 3 {
            return out;
        }
        for ay in 1..self.height - 1 {
            for ax in 1..w - 1 {
                let idx = ay * w + ax;
                let v = self.votes[idx];
                if v > threshold
                    && v > self.votes[idx - 1]
                    && v >= self.votes[idx + 1]
                    && v > self.votes[idx - w]
                    && v >= self.votes[idx + w]
                {
                    out.push((idx, v));
                }
            }
        }
        out.sort_by(|a, b| b.1.cmp(&a.1));
        out
    }

    /// Vote-weighted centroid of the 3x3 neighbourhood, in image pixels.
    fn refine(&self, idx: usize) -> Point2<f32> {
        let w = self.width as i64;
        let cx = (idx % self.width) as i64;
        let cy = (idx / self.width) as i64;
        let mut sum = 0.0f32;
        let mut sx = 0.0f32;
        let mut sy = 0.0f32;
        for dy in -1..=1 {
            for dx in -1..=1 {
                let x = cx + dx;
                let y = cy + dy;
                if x < 0 || y < 0 || x >= w || y >= self.height as i64 {
                    continue;
                }
                let v = self.votes[(y * w + x) as usize] as f32;
                sum += v;
                sx += v * x as f32;
                sy += v * y as f32;
            }
        }
        if sum <= 0.0 {
            return Point2::new(cx as f32 * self.dp, cy as f32 * self.dp);
        }
        Point2::new(sx / sum * self.dp, sy / sum * self.dp)
    }
}

/// Detect circles in a smoothed intensity image.
///
/// The output order is the detector's native order (strongest center first);
/// callers that need a single target take the first element.
#[cfg_attr(
    feature = "tracing",
    instrument(level = "debug", skip(gray, params), fields(width = gray.width(), height = gray.height()))
)]
pub fn detect_circles(gray: &GrayImage, params: &HoughCircleParams) -> Vec<CircleCandidate> {
    let (w, h) = gray.dimensions();
    if w < 3 || h < 3 || params.dp <= 0.0 || params.max_radius < params.min_radius {
        return Vec::new();
    }

    let edges = canny(gray, 0.5 * params.canny_threshold, params.canny_threshold);
    let gx = horizontal_sobel(gray);
    let gy = vertical_sobel(gray);

    let mut edge_points: Vec<Point2<f32>> = Vec::new();
    let mut acc = Accumulator::new(w, h, params.dp);
    let r_min = params.min_radius as f32;
    let r_max = params.max_radius as f32;

    for (x, y, px) in edges.enumerate_pixels() {
        if px[0] == 0 {
            continue;
        }
        edge_points.push(Point2::new(x as f32, y as f32));

        let vx = gx.get_pixel(x, y)[0] as f32;
        let vy = gy.get_pixel(x, y)[0] as f32;
        let mag = (vx * vx + vy * vy).sqrt();
        if mag < 1e-3 {
            continue;
        }
        let (dx, dy) = (vx / mag, vy / mag);

        for sign in [1.0f32, -1.0] {
            let mut last = None;
            let mut r = r_min;
            while r <= r_max {
                let Some(idx) = acc.cell(x as f32 + sign * dx * r, y as f32 + sign * dy * r)
                else {
                    break;
                };
                if last != Some(idx) {
                    acc.votes[idx] += 1;
                    last = Some(idx);
                }
                r += params.dp;
            }
        }
    }

    if edge_points.is_empty() {
        return Vec::new();
    }

    let min_dist_sq = params.min_dist * params.min_dist;
    let mut out: Vec<CircleCandidate> = Vec::new();
    for (idx, votes) in acc.peaks(params.acc_threshold) {
        let center = acc.refine(idx);
        let crowded = out.iter().any(|c| {
            let d = c.center - center;
            d.x * d.x + d.y * d.y < min_dist_sq
        });
        if crowded {
            continue;
        }
        if let Some((radius, support)) = estimate_radius(&edge_points, center, params) {
            out.push(CircleCandidate {
                center,
                radius,
                votes,
                support,
            });
        }
    }
    log::debug!("hough: {} edge px, {} circles", edge_points.len(), out.len());
    out
}

/// Pick the radius whose 1-px distance bin best covers its circumference.
///
/// Returns `(radius, support)` with the radius refined as the mean distance
/// of the edge pixels in the neighbouring bins.
fn estimate_radius(
    edge_points: &[Point2<f32>],
    center: Point2<f32>,
    params: &HoughCircleParams,
) -> Option<(f32, f32)> {
    let r_min = params.min_radius as f32;
    let r_max = params.max_radius as f32;
    let nbins = (params.max_radius - params.min_radius) as usize + 1;
    let mut hist = vec![0u32; nbins];
    let mut dist_sum = vec![0.0f32; nbins];

    for p in edge_points {
        let d = (*p - center).norm();
        if d < r_min - 0.5 || d >= r_max + 0.5 {
            continue;
        }
        let bin = ((d - r_min).round().max(0.0) as usize).min(nbins - 1);
        hist[bin] += 1;
        dist_sum[bin] += d;
    }

    let circumference = |bin: usize| std::f32::consts::TAU * (r_min + bin as f32).max(1.0);
    let best = (0..nbins)
        .filter(|&b| hist[b] > 0)
        .max_by(|&a, &b| {
            let sa = hist[a] as f32 / circumference(a);
            let sb = hist[b] as f32 / circumference(b);
            sa.partial_cmp(&sb)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| hist[a].cmp(&hist[b]))
        })?;

    let lo = best.saturating_sub(1);
    let hi = (best + 1).min(nbins - 1);
    let count: u32 = hist[lo..=hi].iter().sum();
    let sum: f32 = dist_sum[lo..=hi].iter().sum();
    let support = count as f32 / circumference(best);
    if support < params.min_radius_support {
        return None;
    }
    Some((sum / count as f32, support))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flat_image_has_no_circles() {
        let img = GrayImage::from_pixel(64, 48, image::Luma([128]));
        assert!(detect_circles(&img, &HoughCircleParams::default()).is_empty());
    }

    #[test]
    fn tiny_image_is_rejected() {
        let img = GrayImage::new(2, 2);
        assert!(detect_circles(&img, &HoughCircleParams::default()).is_empty());
    }

    #[test]
    fn inverted_radius_window_is_rejected() {
        let img = GrayImage::new(64, 64);
        let params = HoughCircleParams {
            min_radius: 50,
            max_radius: 10,
            ..HoughCircleParams::default()
        };
        assert!(detect_circles(&img, &params).is_empty());
    }

    #[test]
    fn radius_from_ring_of_points() {
        let center = Point2::new(50.0, 40.0);
        let pts: Vec<Point2<f32>> = (0..180)
            .map(|k| {
                let t = k as f32 * std::f32::consts::TAU / 180.0;
                Point2::new(center.x + 20.0 * t.cos(), center.y + 20.0 * t.sin())
            })
            .collect();
        let (r, support) =
            estimate_radius(&pts, center, &HoughCircleParams::default()).expect("radius");
        approx::assert_abs_diff_eq!(r, 20.0, epsilon = 0.5);
        assert!(support > 1.0);
    }

    #[test]
    fn sparse_arc_lacks_support() {
        let center = Point2::new(50.0, 40.0);
        let pts: Vec<Point2<f32>> = (0..10)
            .map(|k| Point2::new(center.x + 30.0, center.y + k as f32 * 0.1))
            .collect();
        assert!(estimate_radius(&pts, center, &HoughCircleParams::default()).is_none());
    }

    #[test]
    fn peaks_are_sorted_by_votes() {
        let mut acc = Accumulator::new(12, 12, 1.0);
        let w = acc.width;
        acc.votes[3 * w + 3] = 40;
        acc.votes[8 * w + 8] = 90;
        acc.votes[5 * w + 9] = 10;
        let peaks = acc.peaks(30);
        assert_eq!(peaks, vec![(8 * w + 8, 90), (3 * w + 3, 40)]);
    }
}
