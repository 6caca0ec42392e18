//! WAV encoding for speech uploads.

use std::io::Cursor;

use avatar_core::ports::{AudioClip, GatewayError};

/// Encode a mono f32 clip as a 16-bit PCM WAV byte buffer.
pub fn encode_wav(clip: &AudioClip) -> Result<Vec<u8>, GatewayError> {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate: clip.sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    let mut cursor = Cursor::new(Vec::new());
    {
        let mut writer = hound::WavWriter::new(&mut cursor, spec)
            .map_err(|e| GatewayError::InputStream(e.to_string()))?;
        for &sample in &clip.samples {
            let value = (sample.clamp(-1.0, 1.0) * f32::from(i16::MAX)) as i16;
            writer
                .write_sample(value)
                .map_err(|e| GatewayError::InputStream(e.to_string()))?;
        }
        writer
            .finalize()
            .map_err(|e| GatewayError::InputStream(e.to_string()))?;
    }
    Ok(cursor.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encoded_wav_has_riff_header_and_data() {
        let clip = AudioClip { samples: vec![0.0, 0.5, -0.5, 1.0], sample_rate: 16_000 };
        let bytes = encode_wav(&clip).unwrap();
        assert_eq!(&bytes[0..4], b"RIFF");
        assert_eq!(&bytes[8..12], b"WAVE");
        // 44-byte canonical header + 2 bytes per sample
        assert_eq!(bytes.len(), 44 + clip.samples.len() * 2);
    }

    #[test]
    fn out_of_range_samples_are_clamped() {
        let clip = AudioClip { samples: vec![2.0, -2.0], sample_rate: 8_000 };
        let bytes = encode_wav(&clip).unwrap();
        let mut reader = hound::WavReader::new(Cursor::new(bytes)).unwrap();
        let samples: Vec<i16> = reader.samples::<i16>().map(Result::unwrap).collect();
        assert_eq!(samples, vec![i16::MAX, -i16::MAX]);
    }
}
