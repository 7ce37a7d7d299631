use circletrack_detect::{
    detect_circles, foreign::scan_foreign_objects, preprocess::smooth, DetectionPipeline,
    ForeignObjectParams, HoughCircleParams, PipelineParams,
};
use image::{GrayImage, Luma, Rgb, RgbImage};
use imageproc::drawing::{draw_filled_circle_mut, draw_polygon_mut};
use imageproc::point::Point;

fn disk_frame(w: u32, h: u32, disks: &[(i32, i32, i32)]) -> RgbImage {
    let mut img = RgbImage::from_pixel(w, h, Rgb([30, 30, 30]));
    for &(x, y, r) in disks {
        draw_filled_circle_mut(&mut img, (x, y), r, Rgb([220, 220, 220]));
    }
    img
}

fn to_gray(img: &RgbImage) -> GrayImage {
    image::imageops::grayscale(img)
}

#[test]
fn detects_single_disk_center_and_radius() {
    let gray = smooth(&to_gray(&disk_frame(320, 240, &[(160, 120, 40)])), 2.0);
    let circles = detect_circles(&gray, &HoughCircleParams::default());
    assert!(!circles.is_empty(), "no circle found");
    let c = circles[0];
    assert!((c.center.x - 160.0).abs() <= 2.0, "center x {}", c.center.x);
    assert!((c.center.y - 120.0).abs() <= 2.0, "center y {}", c.center.y);
    assert!((c.radius - 40.0).abs() <= 3.0, "radius {}", c.radius);
}

#[test]
fn separated_disks_are_both_found() {
    let gray = smooth(
        &to_gray(&disk_frame(480, 240, &[(120, 120, 30), (340, 120, 50)])),
        2.0,
    );
    let circles = detect_circles(&gray, &HoughCircleParams::default());
    let near = |x: f32, y: f32| {
        circles
            .iter()
            .any(|c| (c.center.x - x).abs() <= 3.0 && (c.center.y - y).abs() <= 3.0)
    };
    assert!(near(120.0, 120.0), "{circles:?}");
    assert!(near(340.0, 120.0), "{circles:?}");
}

#[test]
fn min_dist_keeps_one_circle_per_cluster() {
    let gray = smooth(&to_gray(&disk_frame(320, 240, &[(160, 120, 40)])), 2.0);
    let circles = detect_circles(&gray, &HoughCircleParams::default());
    for (i, a) in circles.iter().enumerate() {
        for b in &circles[i + 1..] {
            assert!((a.center - b.center).norm() >= 80.0);
        }
    }
}

#[test]
fn pipeline_measures_offset_from_frame_center() {
    let frame = disk_frame(640, 480, &[(340, 200, 45)]);
    let res = DetectionPipeline::new(PipelineParams::default()).process(&frame, true);
    let target = res.target.expect("target selected");
    assert_eq!(target.error.x, target.circle.x - 320);
    assert_eq!(target.error.y, target.circle.y - 240);
    assert!((target.error.x - 20).abs() <= 2, "{target:?}");
    assert!((target.error.y + 40).abs() <= 2, "{target:?}");
    // A smooth disk has no straight edges inside its box.
    assert!(target.orientation_deg.abs() < 45.0);
}

#[test]
fn detection_runs_while_disarmed() {
    let mut frame = disk_frame(640, 480, &[(340, 200, 45)]);
    draw_polygon_mut(
        &mut frame,
        &[Point::new(60, 420), Point::new(180, 430), Point::new(120, 320)],
        Rgb([220, 220, 220]),
    );
    let res = DetectionPipeline::default().process(&frame, false);
    assert!(!res.armed);
    assert!(res.num_candidates >= 1);
    assert!(res.target.is_none());
    assert!(res.foreign_object_detected(), "foreign scan must run while disarmed");
}

#[test]
fn filled_triangle_raises_foreign_object_flag() {
    let mut gray = GrayImage::from_pixel(400, 300, Luma([20]));
    draw_polygon_mut(
        &mut gray,
        &[Point::new(80, 240), Point::new(330, 250), Point::new(200, 50)],
        Luma([230]),
    );
    let objects = scan_foreign_objects(&gray, &ForeignObjectParams::default());
    assert!(!objects.is_empty());
    assert!(objects.iter().all(|o| o.polygon.len() == 3));
}

#[test]
fn disk_alone_is_not_a_foreign_object() {
    let gray = to_gray(&disk_frame(320, 240, &[(160, 120, 60)]));
    assert!(scan_foreign_objects(&gray, &ForeignObjectParams::default()).is_empty());
}
