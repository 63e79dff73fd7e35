use crate::glyphs::draw_text;
use crate::layout::{layout_words, PlacedWord};
use crate::tokenizer::count_words;
use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use persona_core::{CoreError, VisualizationError, WordCloudConfig};
use std::io::Cursor;
use tracing::{debug, info};

/// Samples of the viridis colormap, dark to light.
const PALETTE: [[u8; 3]; 8] = [
    [68, 1, 84],
    [70, 50, 126],
    [54, 92, 141],
    [39, 127, 142],
    [31, 161, 135],
    [74, 193, 109],
    [160, 218, 57],
    [220, 227, 25],
];

#[derive(Debug, Clone, PartialEq)]
pub struct WordCloudOptions {
    pub width: u32,
    pub height: u32,
    pub background_color: String,
    pub max_words: usize,
    pub relative_scaling: f32,
    /// Defaults to a quarter of the canvas height.
    pub max_font_size: Option<u32>,
}

impl Default for WordCloudOptions {
    fn default() -> Self {
        Self::from(&WordCloudConfig::default())
    }
}

impl From<&WordCloudConfig> for WordCloudOptions {
    fn from(config: &WordCloudConfig) -> Self {
        Self {
            width: config.width,
            height: config.height,
            background_color: config.background_color.clone(),
            max_words: config.max_words,
            relative_scaling: config.relative_scaling,
            max_font_size: None,
        }
    }
}

/// `white`-style names or `#rrggbb`.
pub fn parse_color(value: &str) -> Result<Rgb<u8>, CoreError> {
    let named = match value.trim().to_ascii_lowercase().as_str() {
        "white" => Some([255, 255, 255]),
        "black" => Some([0, 0, 0]),
        "gray" | "grey" => Some([128, 128, 128]),
        "red" => Some([255, 0, 0]),
        "green" => Some([0, 128, 0]),
        "blue" => Some([0, 0, 255]),
        "yellow" => Some([255, 255, 0]),
        "navy" => Some([0, 0, 128]),
        _ => None,
    };
    if let Some(rgb) = named {
        return Ok(Rgb(rgb));
    }

    let invalid = || {
        CoreError::Visualization(VisualizationError::InvalidColor {
            value: value.to_string(),
        })
    };
    let hex = value.trim().strip_prefix('#').ok_or_else(invalid)?;
    if hex.len() != 6 || !hex.is_ascii() {
        return Err(invalid());
    }
    let channel = |range: std::ops::Range<usize>| u8::from_str_radix(&hex[range], 16).map_err(|_| invalid());
    Ok(Rgb([channel(0..2)?, channel(2..4)?, channel(4..6)?]))
}

/// A laid-out cloud; draw it with `to_image` or encode it with `to_png`.
#[derive(Debug, Clone)]
pub struct WordCloud {
    width: u32,
    height: u32,
    background: Rgb<u8>,
    words: Vec<PlacedWord>,
}

impl WordCloud {
    pub fn generate(text: &str, options: &WordCloudOptions) -> Result<Self, CoreError> {
        if options.width < 8 || options.height < 8 {
            return Err(VisualizationError::CanvasTooSmall {
                width: options.width,
                height: options.height,
            }
            .into());
        }
        let background = parse_color(&options.background_color)?;

        let mut counts = count_words(text);
        if counts.is_empty() {
            return Err(VisualizationError::NoWords { token_count: 0 }.into());
        }
        counts.truncate(options.max_words);
        debug!("Laying out {} distinct words", counts.len());

        let max_font_size = options.max_font_size.unwrap_or(options.height / 4);
        let words = layout_words(
            &counts,
            options.width,
            options.height,
            max_font_size,
            options.relative_scaling,
        )?;
        info!(
            "Word cloud placed {} of {} words on {}x{}",
            words.len(),
            counts.len(),
            options.width,
            options.height
        );

        Ok(Self {
            width: options.width,
            height: options.height,
            background,
            words,
        })
    }

    pub fn words(&self) -> &[PlacedWord] {
        &self.words
    }

    pub fn to_image(&self) -> RgbImage {
        let mut image = RgbImage::from_pixel(self.width, self.height, self.background);
        for (rank, word) in self.words.iter().enumerate() {
            let color = Rgb(PALETTE[rank % PALETTE.len()]);
            draw_text(&mut image, &word.text, word.x, word.y, word.scale, color);
        }
        image
    }

    pub fn to_png(&self) -> Result<Vec<u8>, CoreError> {
        let mut bytes = Vec::new();
        DynamicImage::ImageRgb8(self.to_image())
            .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
            .map_err(VisualizationError::from)?;
        Ok(bytes)
    }
}
