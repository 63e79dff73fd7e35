//! Placement of words on the canvas.
//!
//! Words are placed largest first along an elliptical spiral out from the
//! centre. A summed-area table over the occupied pixels answers "is this
//! rectangle free" in constant time.

use crate::glyphs::{text_width, GLYPH_SIZE};
use crate::tokenizer::WordCount;
use persona_core::{CoreError, VisualizationError};
use tracing::debug;

const SPIRAL_GROWTH: f32 = 2.0;
const SPIRAL_ARC_STEP: f32 = 3.0;
pub(crate) const WORD_PADDING: u32 = 2;

#[derive(Debug, Clone, PartialEq)]
pub struct PlacedWord {
    pub text: String,
    pub count: usize,
    /// Count relative to the most frequent word, in `(0, 1]`.
    pub frequency: f32,
    /// Pixels per glyph cell; each character is `8 * scale` pixels square.
    pub scale: u32,
    pub x: u32,
    pub y: u32,
}

impl PlacedWord {
    pub fn width(&self) -> u32 {
        text_width(&self.text, self.scale)
    }

    pub fn height(&self) -> u32 {
        GLYPH_SIZE * self.scale
    }
}

pub(crate) struct Occupancy {
    width: u32,
    height: u32,
    cells: Vec<bool>,
    sums: Vec<u32>,
}

impl Occupancy {
    pub(crate) fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            cells: vec![false; (width * height) as usize],
            sums: vec![0; ((width + 1) * (height + 1)) as usize],
        }
    }

    fn sum_at(&self, x: u32, y: u32) -> u32 {
        self.sums[(y * (self.width + 1) + x) as usize]
    }

    pub(crate) fn is_free(&self, x: u32, y: u32, w: u32, h: u32) -> bool {
        if x + w > self.width || y + h > self.height {
            return false;
        }
        let total = self.sum_at(x + w, y + h) + self.sum_at(x, y)
            - self.sum_at(x + w, y)
            - self.sum_at(x, y + h);
        total == 0
    }

    pub(crate) fn occupy(&mut self, x: u32, y: u32, w: u32, h: u32) {
        let x_end = (x + w).min(self.width);
        let y_end = (y + h).min(self.height);
        for row in y..y_end {
            for col in x..x_end {
                self.cells[(row * self.width + col) as usize] = true;
            }
        }
        self.rebuild_sums(y);
    }

    fn rebuild_sums(&mut self, from_row: u32) {
        let stride = self.width + 1;
        for row in from_row..self.height {
            let mut row_sum = 0;
            for col in 0..self.width {
                row_sum += self.cells[(row * self.width + col) as usize] as u32;
                let above = self.sums[(row * stride + col + 1) as usize];
                self.sums[((row + 1) * stride + col + 1) as usize] = above + row_sum;
            }
        }
    }

    /// First free spot for a `w`×`h` box on a spiral from the centre.
    pub(crate) fn find_position(&self, w: u32, h: u32) -> Option<(u32, u32)> {
        if w > self.width || h > self.height {
            return None;
        }

        let center_x = (self.width - w) as f32 / 2.0;
        let center_y = (self.height - h) as f32 / 2.0;
        let aspect = self.height as f32 / self.width as f32;
        let max_radius = ((self.width * self.width + self.height * self.height) as f32).sqrt();

        let mut theta: f32 = 0.0;
        loop {
            let radius = SPIRAL_GROWTH * theta;
            if radius > max_radius {
                return None;
            }

            let x = center_x + radius * theta.cos();
            let y = center_y + radius * aspect * theta.sin();
            if x >= 0.0 && y >= 0.0 {
                let (x, y) = (x.round() as u32, y.round() as u32);
                if self.is_free(x, y, w, h) {
                    return Some((x, y));
                }
            }

            theta += (SPIRAL_ARC_STEP / radius.max(1.0)).min(0.5);
        }
    }
}

/// Lay out `words` (most frequent first) on a `width`×`height` canvas.
///
/// Sizes follow the relative-scaling rule: each word's size is
/// `(rs * f / f_prev + (1 - rs)) * size_prev`. A word that does not fit
/// shrinks until it does; once nothing fits at the smallest size the layout
/// stops. A word too long for the empty canvas at the smallest size is
/// skipped. Fails only when no word at all can be placed.
pub fn layout_words(
    words: &[WordCount],
    width: u32,
    height: u32,
    max_font_size: u32,
    relative_scaling: f32,
) -> Result<Vec<PlacedWord>, CoreError> {
    let Some(max_count) = words.first().map(|w| w.count) else {
        return Err(VisualizationError::NoWords { token_count: 0 }.into());
    };

    let mut occupancy = Occupancy::new(width, height);
    let mut placed = Vec::with_capacity(words.len());
    let mut font_size = max_font_size.max(GLYPH_SIZE) as f32;
    let mut last_frequency = 1.0_f32;

    for word in words {
        if !fits_canvas(&word.word, width, height) {
            debug!("Skipping '{}', too long for a {}x{} canvas", word.word, width, height);
            continue;
        }

        let frequency = word.count as f32 / max_count as f32;
        if !placed.is_empty() && relative_scaling > 0.0 {
            font_size *= relative_scaling * (frequency / last_frequency) + (1.0 - relative_scaling);
        }

        let mut scale = ((font_size / GLYPH_SIZE as f32).round() as u32).max(1);
        let position = loop {
            let box_w = text_width(&word.word, scale) + 2 * WORD_PADDING;
            let box_h = GLYPH_SIZE * scale + 2 * WORD_PADDING;
            if let Some((x, y)) = occupancy.find_position(box_w, box_h) {
                occupancy.occupy(x, y, box_w, box_h);
                break Some((x + WORD_PADDING, y + WORD_PADDING));
            }
            if scale == 1 {
                break None;
            }
            scale -= 1;
        };

        let Some((x, y)) = position else {
            debug!("No room left after {} words", placed.len());
            break;
        };

        font_size = font_size.min((scale * GLYPH_SIZE) as f32);
        last_frequency = frequency;
        placed.push(PlacedWord {
            text: word.word.clone(),
            count: word.count,
            frequency,
            scale,
            x,
            y,
        });
    }

    if placed.is_empty() {
        return Err(VisualizationError::NoSpace {
            word: words[0].word.clone(),
            width,
            height,
        }
        .into());
    }
    Ok(placed)
}

/// Whether `word` fits an empty canvas at scale 1, padding included.
fn fits_canvas(word: &str, width: u32, height: u32) -> bool {
    text_width(word, 1) + 2 * WORD_PADDING <= width && GLYPH_SIZE + 2 * WORD_PADDING <= height
}
