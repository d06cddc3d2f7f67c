//! Confusion-matrix heatmap rendering
//!
//! An 800x600 PNG: an n×n grid of cells shaded from white to blue by count,
//! outlined in black, with a color bar on the right. Row i is the actual
//! class i and column j the predicted class j, in label-index order, so the
//! top-left cell is Fake/Fake. The counts themselves are printed in the
//! classification report.

use crate::eval::ConfusionMatrix;
use crate::error::{Error, Result};
use image::{Rgb, RgbImage};
use std::path::Path;

const WIDTH: u32 = 800;
const HEIGHT: u32 = 600;

const GRID_LEFT: u32 = 160;
const GRID_TOP: u32 = 80;
/// Side of the whole grid, split evenly between classes
const GRID_SIZE: u32 = 440;

const BAR_LEFT: u32 = 660;
const BAR_WIDTH: u32 = 24;

const WHITE: Rgb<u8> = Rgb([255, 255, 255]);
const BLACK: Rgb<u8> = Rgb([0, 0, 0]);
/// End points of the count scale
const LIGHT: [f32; 3] = [247.0, 251.0, 255.0];
const DARK: [f32; 3] = [8.0, 48.0, 107.0];

/// Draw `cm` as a shaded grid
pub fn render_confusion_matrix(cm: &ConfusionMatrix) -> RgbImage {
    let mut img = RgbImage::from_pixel(WIDTH, HEIGHT, WHITE);
    let n = cm.n_classes().max(1) as u32;
    let cell = GRID_SIZE / n;
    let max = cm.max_count().max(1) as f32;

    for (i, row) in cm.matrix().iter().enumerate() {
        for (j, &count) in row.iter().enumerate() {
            let x0 = GRID_LEFT + j as u32 * cell;
            let y0 = GRID_TOP + i as u32 * cell;
            fill_rect(&mut img, x0, y0, cell, cell, shade(count as f32 / max));
            outline_rect(&mut img, x0, y0, cell, cell, BLACK);
        }
    }

    // Color bar, dark end on top
    let bar_height = n * cell;
    for y in 0..bar_height {
        let t = 1.0 - y as f32 / (bar_height - 1).max(1) as f32;
        fill_rect(&mut img, BAR_LEFT, GRID_TOP + y, BAR_WIDTH, 1, shade(t));
    }
    outline_rect(&mut img, BAR_LEFT, GRID_TOP, BAR_WIDTH, bar_height, BLACK);

    img
}

/// Render `cm` and write it as PNG, creating parent directories
pub fn save_confusion_matrix(cm: &ConfusionMatrix, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    render_confusion_matrix(cm)
        .save_with_format(path, image::ImageFormat::Png)
        .map_err(|e| Error::Render(format!("failed to write {}: {e}", path.display())))
}

/// Linear white-to-blue scale for `t` in [0, 1]
fn shade(t: f32) -> Rgb<u8> {
    let t = t.clamp(0.0, 1.0);
    let channel = |k: usize| (LIGHT[k] + (DARK[k] - LIGHT[k]) * t).round() as u8;
    Rgb([channel(0), channel(1), channel(2)])
}

fn fill_rect(img: &mut RgbImage, x0: u32, y0: u32, w: u32, h: u32, color: Rgb<u8>) {
    for y in y0..(y0 + h).min(img.height()) {
        for x in x0..(x0 + w).min(img.width()) {
            img.put_pixel(x, y, color);
        }
    }
}

/// One-pixel border on the inside edge of the rectangle
fn outline_rect(img: &mut RgbImage, x0: u32, y0: u32, w: u32, h: u32, color: Rgb<u8>) {
    if w == 0 || h == 0 {
        return;
    }
    fill_rect(img, x0, y0, w, 1, color);
    fill_rect(img, x0, y0 + h - 1, w, 1, color);
    fill_rect(img, x0, y0, 1, h, color);
    fill_rect(img, x0 + w - 1, y0, 1, h, color);
}
