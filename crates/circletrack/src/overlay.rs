//! Drawing detection results onto a frame.

use circletrack_core::{frame_center, Circle, DetectionResult};
use image::{Rgb, RgbImage};
use imageproc::drawing::{draw_filled_rect_mut, draw_hollow_circle_mut, draw_line_segment_mut};
use imageproc::rect::Rect;

use crate::stability::StabilityState;

pub const TARGET_COLOR: Rgb<u8> = Rgb([0, 255, 0]);
pub const LAST_VALID_COLOR: Rgb<u8> = Rgb([0, 128, 0]);
pub const CENTER_COLOR: Rgb<u8> = Rgb([0, 0, 255]);
pub const FOREIGN_COLOR: Rgb<u8> = Rgb([255, 0, 0]);
pub const TEXT_COLOR: Rgb<u8> = Rgb([255, 255, 255]);

const TARGET_CROSS: i32 = 10;
const CENTER_CROSS: i32 = 15;
const GLYPH_SCALE: u32 = 3;
const BANNER_TOP: i32 = 84;
const BANNER_HEIGHT: u32 = 32;

/// Render the overlay for one frame into a new image.
///
/// Draws the frame-center crosshair, the selected circle with its
/// crosshair, the numeric readouts, foreign-object polygons and the warning
/// banner. With no selection, the last confirmed circle is outlined thinly.
pub fn render_overlay(
    frame: &RgbImage,
    detection: &DetectionResult,
    stability: &StabilityState,
) -> RgbImage {
    let mut out = frame.clone();
    let (w, h) = out.dimensions();
    if w == 0 || h == 0 {
        return out;
    }

    let (cx, cy) = frame_center(w, h);
    draw_cross(&mut out, cx, cy, CENTER_CROSS, CENTER_COLOR);

    match detection.target {
        Some(target) => {
            draw_circle(&mut out, target.circle, TARGET_COLOR, 2);
            draw_cross(
                &mut out,
                target.circle.x,
                target.circle.y,
                TARGET_CROSS,
                TARGET_COLOR,
            );
            draw_text(&mut out, 10, 16, &format!("X:{}", target.error.x));
            draw_text(&mut out, 10, 40, &format!("Y:{}", target.error.y));
            draw_text(
                &mut out,
                10,
                64,
                &format!("A:{:.2}", target.orientation_deg),
            );
        }
        None => {
            if let Some(valid) = stability.last_valid {
                draw_circle(&mut out, valid, LAST_VALID_COLOR, 1);
            }
        }
    }

    for object in &detection.foreign_objects {
        draw_closed_polygon(&mut out, &object.polygon, FOREIGN_COLOR);
    }

    if detection.foreign_object_detected() {
        draw_filled_rect_mut(
            &mut out,
            Rect::at(0, BANNER_TOP).of_size(w, BANNER_HEIGHT),
            FOREIGN_COLOR,
        );
        draw_text(&mut out, 50, BANNER_TOP + 8, "WARNING");
    }

    out
}

fn draw_circle(img: &mut RgbImage, c: Circle, color: Rgb<u8>, thickness: i32) {
    for t in 0..thickness.max(1) {
        let r = c.r + t;
        if r > 0 {
            draw_hollow_circle_mut(img, (c.x, c.y), r, color);
        }
    }
}

fn draw_cross(img: &mut RgbImage, x: i32, y: i32, half: i32, color: Rgb<u8>) {
    for t in 0..2 {
        let (xf, yf, tf, hf) = (x as f32, y as f32, t as f32, half as f32);
        draw_line_segment_mut(img, (xf - hf, yf + tf), (xf + hf, yf + tf), color);
        draw_line_segment_mut(img, (xf + tf, yf - hf), (xf + tf, yf + hf), color);
    }
}

fn draw_closed_polygon(img: &mut RgbImage, vertices: &[[i32; 2]], color: Rgb<u8>) {
    let n = vertices.len();
    if n < 2 {
        return;
    }
    for i in 0..n {
        let [ax, ay] = vertices[i];
        let [bx, by] = vertices[(i + 1) % n];
        for t in 0..2 {
            let t = t as f32;
            draw_line_segment_mut(
                img,
                (ax as f32 + t, ay as f32),
                (bx as f32 + t, by as f32),
                color,
            );
        }
    }
}

/// 3x5 bitmap rows, MSB is the leftmost column.
fn glyph(c: char) -> Option<[u8; 5]> {
    Some(match c {
        '0' => [0b111, 0b101, 0b101, 0b101, 0b111],
        '1' => [0b010, 0b110, 0b010, 0b010, 0b111],
        '2' => [0b111, 0b001, 0b111, 0b100, 0b111],
        '3' => [0b111, 0b001, 0b111, 0b001, 0b111],
        '4' => [0b101, 0b101, 0b111, 0b001, 0b001],
        '5' => [0b111, 0b100, 0b111, 0b001, 0b111],
        '6' => [0b111, 0b100, 0b111, 0b101, 0b111],
        '7' => [0b111, 0b001, 0b010, 0b010, 0b010],
        '8' => [0b111, 0b101, 0b111, 0b101, 0b111],
        '9' => [0b111, 0b101, 0b111, 0b001, 0b111],
        '-' => [0b000, 0b000, 0b111, 0b000, 0b000],
        '.' => [0b000, 0b000, 0b000, 0b000, 0b010],
        ':' => [0b000, 0b010, 0b000, 0b010, 0b000],
        'A' => [0b010, 0b101, 0b111, 0b101, 0b101],
        'G' => [0b111, 0b100, 0b101, 0b101, 0b111],
        'I' => [0b111, 0b010, 0b010, 0b010, 0b111],
        'N' => [0b101, 0b111, 0b111, 0b111, 0b101],
        'R' => [0b110, 0b101, 0b110, 0b101, 0b101],
        'W' => [0b101, 0b101, 0b101, 0b111, 0b101],
        'X' => [0b101, 0b101, 0b010, 0b101, 0b101],
        'Y' => [0b101, 0b101, 0b010, 0b010, 0b010],
        _ => return None,
    })
}

fn draw_text(img: &mut RgbImage, x: i32, y: i32, text: &str) {
    let s = GLYPH_SCALE as i32;
    let mut pen = x;
    for c in text.chars() {
        if let Some(rows) = glyph(c) {
            for (row, bits) in rows.iter().enumerate() {
                for col in 0..3 {
                    if bits & (0b100 >> col) != 0 {
                        draw_filled_rect_mut(
                            img,
                            Rect::at(pen + col * s, y + row as i32 * s)
                                .of_size(GLYPH_SCALE, GLYPH_SCALE),
                            TEXT_COLOR,
                        );
                    }
                }
            }
        }
        pen += 4 * s;
    }
}
