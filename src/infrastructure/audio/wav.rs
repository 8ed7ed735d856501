use std::io::Cursor;

use hound::{SampleFormat, WavSpec, WavWriter};

/// Encodes mono f32 samples as a PCM16 WAV file in memory.
pub(super) fn encode_pcm16_wav(samples: &[f32], sample_rate: u32) -> Vec<u8> {
    let spec = WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    };

    let mut buffer = Vec::with_capacity(44 + samples.len() * 2);
    {
        let mut writer = WavWriter::new(Cursor::new(&mut buffer), spec)
            .expect("in-memory WAV writer cannot fail to open");
        for &sample in samples {
            let clamped = (sample.clamp(-1.0, 1.0) * i16::MAX as f32) as i16;
            writer
                .write_sample(clamped)
                .expect("in-memory WAV write cannot fail");
        }
        writer
            .finalize()
            .expect("in-memory WAV finalize cannot fail");
    }

    buffer
}
