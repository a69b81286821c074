/// Sample artworks for demonstration galleries
///
/// Every sample is credited to "Digital Artist N", which is what
/// `ArtworkStore::delete_samples` matches on when cleaning them up.

use image::{Rgba, RgbaImage};

use crate::state::data::NewArtwork;

/// Size of generated sample images
const SAMPLE_WIDTH: u32 = 600;
const SAMPLE_HEIGHT: u32 = 400;

/// Number of built-in samples
pub const SAMPLE_COUNT: u32 = 5;

/// Titles, artists and descriptions of the built-in samples, in load order
const SAMPLES: [(&str, &str, &str); SAMPLE_COUNT as usize] = [
    (
        "Abstract Sunset",
        "Digital Artist 1",
        "A beautiful abstract representation of sunset colors",
    ),
    (
        "Geometric Harmony",
        "Digital Artist 2",
        "Modern geometric patterns in vibrant colors",
    ),
    (
        "Ocean Dreams",
        "Digital Artist 3",
        "Serene ocean waves with gradient blues",
    ),
    (
        "Digital Forest",
        "Digital Artist 4",
        "Abstract forest with digital textures",
    ),
    (
        "Cosmic Journey",
        "Digital Artist 5",
        "Space-inspired digital artwork",
    ),
];

/// Build all sample artworks, ready to insert
pub fn sample_artworks() -> Vec<NewArtwork> {
    SAMPLES
        .iter()
        .zip(1..)
        .map(|(&(title, artist, description), kind)| NewArtwork {
            title: title.to_string(),
            artist: artist.to_string(),
            description: description.to_string(),
            image: sample_image(kind),
        })
        .collect()
}

/// Draw sample image `kind` (1-5). Out-of-range kinds fall back to 1.
pub fn sample_image(kind: u32) -> RgbaImage {
    let kind = if (1..=SAMPLE_COUNT).contains(&kind) { kind } else { 1 };
    let mut img = RgbaImage::new(SAMPLE_WIDTH, SAMPLE_HEIGHT);

    match kind {
        // Abstract Sunset
        1 => {
            vertical_gradient(&mut img, [255, 140, 0], [255, 69, 0]);
            for i in 0..10 {
                fill_circle(&mut img, 100 + i * 45, 150 + i * 20, 50, Rgba([255, 215, 0, 160]));
            }
        }
        // Geometric Harmony
        2 => {
            fill_rect(&mut img, 0, 0, SAMPLE_WIDTH, SAMPLE_HEIGHT, Rgba([40, 44, 52, 255]));
            let colors = [[0, 255, 255], [255, 0, 255], [255, 255, 0], [0, 255, 0]];
            for (i, [r, g, b]) in colors.into_iter().enumerate() {
                let x = 80 + i as u32 * 110;
                fill_triangle(&mut img, (x, 320), (x + 120, 320), (x + 60, 100), Rgba([r, g, b, 160]));
            }
        }
        // Ocean Dreams
        3 => {
            vertical_gradient(&mut img, [0, 191, 255], [0, 0, 139]);
            for i in 0..6 {
                fill_upper_half_ellipse(&mut img, 50 + i * 65, 40, Rgba([255, 255, 255, 100]));
            }
        }
        // Digital Forest
        4 => {
            vertical_gradient(&mut img, [34, 139, 34], [0, 100, 0]);
            for i in 0..7 {
                let x = 45 + i * 80;
                fill_rect(&mut img, x, 200, 24, 200, Rgba([139, 69, 19, 255]));
                fill_circle(&mut img, x + 12, 185, 38, Rgba([0, 128, 0, 180]));
            }
        }
        // Cosmic Journey
        _ => {
            fill_rect(&mut img, 0, 0, SAMPLE_WIDTH, SAMPLE_HEIGHT, Rgba([0, 0, 0, 255]));
            let mut seed: u32 = 0x2545_f491;
            for _ in 0..120 {
                seed = next_random(seed);
                let x = seed % SAMPLE_WIDTH;
                seed = next_random(seed);
                let y = seed % SAMPLE_HEIGHT;
                fill_rect(&mut img, x, y, 2, 2, Rgba([255, 255, 255, 255]));
            }
        }
    }

    img
}

// ========== Drawing helpers ==========

/// Deterministic LCG step so the star field is reproducible
fn next_random(seed: u32) -> u32 {
    seed.wrapping_mul(1_664_525).wrapping_add(1_013_904_223)
}

fn vertical_gradient(img: &mut RgbaImage, top: [u8; 3], bottom: [u8; 3]) {
    let height = img.height().max(2) - 1;
    for (_, y, pixel) in img.enumerate_pixels_mut() {
        let t = y as f32 / height as f32;
        let mix = |a: u8, b: u8| (a as f32 + (b as f32 - a as f32) * t).round() as u8;
        *pixel = Rgba([mix(top[0], bottom[0]), mix(top[1], bottom[1]), mix(top[2], bottom[2]), 255]);
    }
}

/// Source-over blend of `color` onto the pixel at (x, y), ignoring out-of-bounds points
fn blend(img: &mut RgbaImage, x: u32, y: u32, color: Rgba<u8>) {
    if x >= img.width() || y >= img.height() {
        return;
    }
    let alpha = color[3] as f32 / 255.0;
    let dst = img.get_pixel_mut(x, y);
    for c in 0..3 {
        dst[c] = (color[c] as f32 * alpha + dst[c] as f32 * (1.0 - alpha)).round() as u8;
    }
    dst[3] = 255;
}

fn fill_rect(img: &mut RgbaImage, x: u32, y: u32, width: u32, height: u32, color: Rgba<u8>) {
    for py in y..y.saturating_add(height) {
        for px in x..x.saturating_add(width) {
            blend(img, px, py, color);
        }
    }
}

fn fill_circle(img: &mut RgbaImage, cx: u32, cy: u32, radius: u32, color: Rgba<u8>) {
    let r2 = (radius * radius) as i64;
    for py in cy.saturating_sub(radius)..=cy + radius {
        for px in cx.saturating_sub(radius)..=cx + radius {
            let dx = px as i64 - cx as i64;
            let dy = py as i64 - cy as i64;
            if dx * dx + dy * dy <= r2 {
                blend(img, px, py, color);
            }
        }
    }
}

/// Half ellipse spanning the full image width, flat side at `top + height`
fn fill_upper_half_ellipse(img: &mut RgbaImage, top: u32, height: u32, color: Rgba<u8>) {
    let a = img.width() as f32 / 2.0;
    let b = height as f32;
    let base = (top + height) as f32;
    for py in top..top + height {
        let dy = (base - py as f32) / b;
        let half = a * (1.0 - dy * dy).max(0.0).sqrt();
        let from = (a - half).max(0.0) as u32;
        let to = (a + half) as u32;
        for px in from..to {
            blend(img, px, py, color);
        }
    }
}

fn fill_triangle(
    img: &mut RgbaImage,
    p0: (u32, u32),
    p1: (u32, u32),
    p2: (u32, u32),
    color: Rgba<u8>,
) {
    let pts = [p0, p1, p2].map(|(x, y)| (x as i64, y as i64));
    let min_x = pts.iter().map(|p| p.0).min().unwrap_or(0);
    let max_x = pts.iter().map(|p| p.0).max().unwrap_or(0);
    let min_y = pts.iter().map(|p| p.1).min().unwrap_or(0);
    let max_y = pts.iter().map(|p| p.1).max().unwrap_or(0);

    let edge = |a: (i64, i64), b: (i64, i64), p: (i64, i64)| {
        (b.0 - a.0) * (p.1 - a.1) - (b.1 - a.1) * (p.0 - a.0)
    };

    for py in min_y..=max_y {
        for px in min_x..=max_x {
            let p = (px, py);
            let w0 = edge(pts[1], pts[2], p);
            let w1 = edge(pts[2], pts[0], p);
            let w2 = edge(pts[0], pts[1], p);
            let inside = (w0 >= 0 && w1 >= 0 && w2 >= 0) || (w0 <= 0 && w1 <= 0 && w2 <= 0);
            if inside {
                blend(img, px as u32, py as u32, color);
            }
        }
    }
}
