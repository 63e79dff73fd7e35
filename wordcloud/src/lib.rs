pub mod cloud;
pub mod glyphs;
pub mod layout;
pub mod renderer;
pub mod tokenizer;
pub mod visualizer;

pub use cloud::{parse_color, WordCloud, WordCloudOptions};
pub use layout::{layout_words, PlacedWord};
pub use renderer::{CloudRenderer, WordCloudRenderer};
pub use tokenizer::{count_words, WordCount};
pub use visualizer::Visualizer;
