//! Whole-frame foreign-object scan: triangular contours in the edge map.

use circletrack_core::ForeignObject;
use image::GrayImage;
use imageproc::contours::find_contours;
use imageproc::edges::canny;
use imageproc::geometry::{approximate_polygon_dp, arc_length};
use imageproc::point::Point;

use crate::params::ForeignObjectParams;

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Classify one contour, returning it as a foreign object when its
/// simplified polygon has exactly `params.vertex_count` vertices.
pub fn classify_contour(
    points: &[Point<i32>],
    params: &ForeignObjectParams,
) -> Option<ForeignObject> {
    if points.len() < params.vertex_count {
        return None;
    }
    let epsilon = params.epsilon_frac * arc_length(points, true);
    if epsilon.is_nan() || epsilon <= 0.0 {
        return None;
    }
    let polygon = approximate_polygon_dp(points, epsilon, true);
    if polygon.len() != params.vertex_count {
        return None;
    }
    Some(ForeignObject {
        contour: points.iter().map(|p| [p.x, p.y]).collect(),
        polygon: polygon.iter().map(|p| [p.x, p.y]).collect(),
    })
}

/// Find every foreign object in an (unsmoothed) intensity frame.
#[cfg_attr(
    feature = "tracing",
    instrument(level = "debug", skip(gray, params), fields(width = gray.width(), height = gray.height()))
)]
pub fn scan_foreign_objects(gray: &GrayImage, params: &ForeignObjectParams) -> Vec<ForeignObject> {
    if gray.width() < 3 || gray.height() < 3 {
        return Vec::new();
    }
    let edges = canny(gray, params.canny_low, params.canny_high);
    find_contours::<i32>(&edges)
        .iter()
        .filter_map(|contour| classify_contour(&contour.points, params))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;

    /// Dense closed contour through `vertices`, one point per pixel step.
    fn polyline(vertices: &[(i32, i32)]) -> Vec<Point<i32>> {
        let mut out = Vec::new();
        for (i, &(x0, y0)) in vertices.iter().enumerate() {
            let (x1, y1) = vertices[(i + 1) % vertices.len()];
            let steps = (x1 - x0).abs().max((y1 - y0).abs()).max(1);
            for s in 0..steps {
                let t = s as f64 / steps as f64;
                out.push(Point::new(
                    (x0 as f64 + t * (x1 - x0) as f64).round() as i32,
                    (y0 as f64 + t * (y1 - y0) as f64).round() as i32,
                ));
            }
        }
        out
    }

    #[test]
    fn perimeter_of_closed_square() {
        let sq = polyline(&[(0, 0), (10, 0), (10, 10), (0, 10)]);
        approx::assert_abs_diff_eq!(arc_length(&sq, true), 40.0, epsilon = 1e-9);
    }

    #[test]
    fn triangle_keeps_its_corners() {
        let tri = polyline(&[(20, 150), (180, 160), (90, 20)]);
        let obj = classify_contour(&tri, &ForeignObjectParams::default()).expect("triangle");
        for v in [[20, 150], [180, 160], [90, 20]] {
            assert!(obj.polygon.contains(&v), "missing vertex {v:?} in {:?}", obj.polygon);
        }
    }

    #[test]
    fn circle_contour_is_not_foreign() {
        let ring: Vec<Point<i32>> = (0..200)
            .map(|k| {
                let t = k as f64 * std::f64::consts::TAU / 200.0;
                Point::new(
                    (100.0 + 50.0 * t.cos()).round() as i32,
                    (100.0 + 50.0 * t.sin()).round() as i32,
                )
            })
            .collect();
        assert!(classify_contour(&ring, &ForeignObjectParams::default()).is_none());
    }

    #[test]
    fn triangle_contour_is_foreign() {
        let tri = polyline(&[(10, 90), (90, 95), (50, 10)]);
        let obj = classify_contour(&tri, &ForeignObjectParams::default()).expect("triangle");
        assert_eq!(obj.polygon.len(), 3);
        assert_eq!(obj.contour.len(), tri.len());
    }

    #[test]
    fn quad_and_pentagon_are_not_foreign() {
        let params = ForeignObjectParams::default();
        let quad = polyline(&[(10, 10), (90, 10), (90, 70), (10, 70)]);
        assert!(classify_contour(&quad, &params).is_none());
        let penta = polyline(&[(50, 0), (100, 38), (81, 95), (19, 95), (0, 38)]);
        assert!(classify_contour(&penta, &params).is_none());
    }

    #[test]
    fn tiny_contours_are_ignored() {
        let params = ForeignObjectParams::default();
        assert!(classify_contour(&[Point::new(1, 1), Point::new(2, 2)], &params).is_none());
        assert!(classify_contour(&[Point::new(4, 4); 6], &params).is_none());
    }

    #[test]
    fn blank_frame_has_no_foreign_objects() {
        let img = GrayImage::from_pixel(120, 90, Luma([60]));
        assert!(scan_foreign_objects(&img, &ForeignObjectParams::default()).is_empty());
    }
}
