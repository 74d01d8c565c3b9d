//! Placeholder cover generation.
//!
//! Draws a 2:3 cover with:
//! - a diagonal two-colour gradient picked from a fixed palette
//! - the title word-wrapped in bold serif
//! - the author name below it in sans-serif

use crate::error::Result;
use ab_glyph::{Font, FontRef, PxScale, ScaleFont};
use base64::{Engine, engine::general_purpose::STANDARD};
use image::{ImageFormat, Rgba, RgbaImage};
use imageproc::drawing::{draw_text_mut, text_size};
use rand::Rng;
use std::io::Cursor;

/// Default placeholder width in pixels.
pub const DEFAULT_WIDTH: u32 = 300;

/// Gradient colours.
pub const PALETTE: [[u8; 3]; 6] = [
    [0x66, 0x7e, 0xea],
    [0x76, 0x4b, 0xa2],
    [0xf0, 0x93, 0xfb],
    [0xf5, 0x57, 0x6c],
    [0x4f, 0xac, 0xfe],
    [0x00, 0xf2, 0xfe],
];

static TITLE_FONT: &[u8] = include_bytes!("../../assets/fonts/DejaVuSerif-Bold.ttf");
static AUTHOR_FONT: &[u8] = include_bytes!("../../assets/fonts/DejaVuSans.ttf");

// Metrics at the reference width of 300 px.
const TITLE_PX: f32 = 28.0;
const AUTHOR_PX: f32 = 18.0;
const LINE_HEIGHT: f32 = 35.0;
const AUTHOR_GAP: f32 = 60.0;
const WRAP_WIDTH: f32 = 260.0;

const TEXT_COLOR: Rgba<u8> = Rgba([255, 255, 255, 255]);

/// Placeholder generation options.
#[derive(Debug, Clone)]
pub struct PlaceholderOptions {
    /// Cover width in pixels; height is 1.5 times this.
    pub width: u32,
}

impl Default for PlaceholderOptions {
    fn default() -> Self {
        Self {
            width: DEFAULT_WIDTH,
        }
    }
}

impl PlaceholderOptions {
    /// Cover height in pixels.
    pub fn height(&self) -> u32 {
        self.width.saturating_mul(3) / 2
    }

    fn scale(&self) -> f32 {
        self.width as f32 / DEFAULT_WIDTH as f32
    }
}

/// Generate a placeholder cover as a PNG data URL, using the thread RNG.
pub fn generate_placeholder(title: &str, author: &str) -> Result<String> {
    generate_placeholder_with(
        title,
        author,
        &PlaceholderOptions::default(),
        &mut rand::rng(),
    )
}

/// Generate a placeholder cover as a PNG data URL.
pub fn generate_placeholder_with<R: Rng + ?Sized>(
    title: &str,
    author: &str,
    options: &PlaceholderOptions,
    rng: &mut R,
) -> Result<String> {
    let img = render_placeholder(title, author, options, rng);
    let png = encode_png(&img)?;
    Ok(format!("data:image/png;base64,{}", STANDARD.encode(png)))
}

/// Encode a rendered cover as PNG bytes.
pub fn encode_png(img: &RgbaImage) -> Result<Vec<u8>> {
    let mut png_data = Vec::new();
    img.write_to(&mut Cursor::new(&mut png_data), ImageFormat::Png)?;
    Ok(png_data)
}

/// Draw a placeholder cover.
pub fn render_placeholder<R: Rng + ?Sized>(
    title: &str,
    author: &str,
    options: &PlaceholderOptions,
    rng: &mut R,
) -> RgbaImage {
    let width = options.width.max(1);
    let height = options.height().max(1);
    let scale = options.scale();

    let (from, to) = pick_colors(rng);
    let mut img = diagonal_gradient(width, height, from, to);

    let title_font = FontRef::try_from_slice(TITLE_FONT);
    let author_font = FontRef::try_from_slice(AUTHOR_FONT);
    let (Ok(title_font), Ok(author_font)) = (title_font, author_font) else {
        tracing::warn!("Embedded cover fonts failed to load, drawing gradient only");
        return img;
    };

    let center = width as f32 / 2.0;
    let title_scale = PxScale::from(TITLE_PX * scale);
    let mut baseline = height as f32 / 3.0;

    let lines = wrap_title(title, &title_font, title_scale, WRAP_WIDTH * scale);
    for (i, line) in lines.iter().enumerate() {
        if i > 0 {
            baseline += LINE_HEIGHT * scale;
        }
        draw_centered(&mut img, &title_font, title_scale, center, baseline, line);
    }

    let author_scale = PxScale::from(AUTHOR_PX * scale);
    draw_centered(
        &mut img,
        &author_font,
        author_scale,
        center,
        baseline + AUTHOR_GAP * scale,
        author.trim(),
    );

    img
}

/// Two palette colours, drawn independently and uniformly.
fn pick_colors<R: Rng + ?Sized>(rng: &mut R) -> ([u8; 3], [u8; 3]) {
    let first = PALETTE[rng.random_range(0..PALETTE.len())];
    let second = PALETTE[rng.random_range(0..PALETTE.len())];
    (first, second)
}

/// Gradient from the top-left corner to the bottom-right corner.
fn diagonal_gradient(width: u32, height: u32, from: [u8; 3], to: [u8; 3]) -> RgbaImage {
    let (w, h) = (width as f32, height as f32);
    let length_sq = w * w + h * h;

    RgbaImage::from_fn(width, height, |x, y| {
        let t = ((x as f32 * w + y as f32 * h) / length_sq).clamp(0.0, 1.0);
        let mix = |a: u8, b: u8| (a as f32 + (b as f32 - a as f32) * t).round() as u8;
        Rgba([
            mix(from[0], to[0]),
            mix(from[1], to[1]),
            mix(from[2], to[2]),
            255,
        ])
    })
}

/// Greedy word wrap: a word joins the current line while the line stays
/// within `max_width`.
fn wrap_title(title: &str, font: &FontRef<'_>, scale: PxScale, max_width: f32) -> Vec<String> {
    let mut lines = Vec::new();
    let mut line = String::new();

    for word in title.split_whitespace() {
        let candidate = if line.is_empty() {
            word.to_string()
        } else {
            format!("{} {}", line, word)
        };

        let (candidate_width, _) = text_size(scale, font, &candidate);
        if candidate_width as f32 > max_width && !line.is_empty() {
            lines.push(std::mem::replace(&mut line, word.to_string()));
        } else {
            line = candidate;
        }
    }

    if !line.is_empty() {
        lines.push(line);
    }
    lines
}

/// Draw `text` horizontally centred on `center` with its baseline at `baseline`.
fn draw_centered(
    img: &mut RgbaImage,
    font: &FontRef<'_>,
    scale: PxScale,
    center: f32,
    baseline: f32,
    text: &str,
) {
    if text.is_empty() {
        return;
    }

    let (text_width, _) = text_size(scale, font, text);
    let ascent = font.as_scaled(scale).ascent();
    let x = (center - text_width as f32 / 2.0).round() as i32;
    let y = (baseline - ascent).round() as i32;

    draw_text_mut(img, TEXT_COLOR, x, y, scale, font, text);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cover::payload::decode_image_payload;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn title_font() -> FontRef<'static> {
        FontRef::try_from_slice(TITLE_FONT).unwrap()
    }

    #[test]
    fn test_placeholder_is_png_payload() {
        let payload =
            generate_placeholder("A Very Long Title That Wraps", "Author Name").unwrap();
        let (mime, bytes) = decode_image_payload(&payload).unwrap();
        assert_eq!(mime, "image/png");
        assert!(!bytes.is_empty());

        let img = image::load_from_memory(&bytes).unwrap();
        assert_eq!((img.width(), img.height()), (300, 450));
    }

    #[test]
    fn test_placeholder_handles_degenerate_titles() {
        let long = "word ".repeat(500);
        let unbroken = "x".repeat(400);
        for title in ["", "   ", long.as_str(), unbroken.as_str()] {
            let payload = generate_placeholder(title, "").unwrap();
            assert!(payload.len() > "data:image/png;base64,".len());
        }
    }

    #[test]
    fn test_seeded_generation_is_deterministic() {
        let options = PlaceholderOptions::default();
        let a = render_placeholder("Dune", "Frank Herbert", &options, &mut StdRng::seed_from_u64(7));
        let b = render_placeholder("Dune", "Frank Herbert", &options, &mut StdRng::seed_from_u64(7));
        assert_eq!(a, b);
    }

    #[test]
    fn test_gradient_corners_use_palette() {
        let img = diagonal_gradient(300, 450, PALETTE[0], PALETTE[5]);
        let [r, g, b, _] = img.get_pixel(0, 0).0;
        assert_eq!([r, g, b], PALETTE[0]);

        let [r, g, b, _] = img.get_pixel(299, 449).0;
        let close = |a: u8, b: u8| (a as i16 - b as i16).abs() <= 2;
        assert!(close(r, PALETTE[5][0]) && close(g, PALETTE[5][1]) && close(b, PALETTE[5][2]));
    }

    #[test]
    fn test_colors_come_from_palette() {
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..50 {
            let (a, b) = pick_colors(&mut rng);
            assert!(PALETTE.contains(&a));
            assert!(PALETTE.contains(&b));
        }
    }

    #[test]
    fn test_different_picks_change_pixels() {
        let options = PlaceholderOptions::default();
        let picks = |seed: u64| pick_colors(&mut StdRng::seed_from_u64(seed));

        let first = picks(0);
        let other_seed = (1..64u64)
            .find(|&seed| picks(seed).0 != first.0)
            .unwrap();
        let other = picks(other_seed);

        let a = render_placeholder("Dune", "", &options, &mut StdRng::seed_from_u64(0));
        let b = render_placeholder("Dune", "", &options, &mut StdRng::seed_from_u64(other_seed));
        assert_ne!(a, b);

        let [r, g, bl, _] = a.get_pixel(0, 0).0;
        assert_eq!([r, g, bl], first.0);
        let [r, g, bl, _] = b.get_pixel(0, 0).0;
        assert_eq!([r, g, bl], other.0);
    }

    #[test]
    fn test_wrap_title_breaks_long_titles() {
        let font = title_font();
        let scale = PxScale::from(TITLE_PX);

        let lines = wrap_title(
            "A Very Long Title That Wraps Across Several Lines",
            &font,
            scale,
            WRAP_WIDTH,
        );
        assert!(lines.len() > 1);
        for line in &lines {
            if line.contains(' ') {
                assert!(text_size(scale, &font, line).0 as f32 <= WRAP_WIDTH);
            }
        }
        assert_eq!(
            lines.join(" "),
            "A Very Long Title That Wraps Across Several Lines"
        );

        assert_eq!(wrap_title("Dune", &font, scale, WRAP_WIDTH), vec!["Dune"]);
        assert!(wrap_title("", &font, scale, WRAP_WIDTH).is_empty());
    }

    #[test]
    fn test_title_pixels_are_drawn() {
        let options = PlaceholderOptions::default();
        let mut rng = StdRng::seed_from_u64(1);
        let with_text = render_placeholder("Dune", "Frank Herbert", &options, &mut rng);
        let mut rng = StdRng::seed_from_u64(1);
        let blank = render_placeholder("", "", &options, &mut rng);
        assert_ne!(with_text, blank);
    }

    #[test]
    fn test_options_scale_height() {
        let options = PlaceholderOptions { width: 600 };
        assert_eq!(options.height(), 900);
        let img = render_placeholder("T", "A", &options, &mut StdRng::seed_from_u64(3));
        assert_eq!(img.dimensions(), (600, 900));
    }
}
