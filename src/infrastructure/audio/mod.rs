mod decoder;
mod ffmpeg;
mod normalizer;
mod wav;

pub use normalizer::TieredAudioNormalizer;
