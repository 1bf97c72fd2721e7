//! PCM → WAV containerization
//!
//! The synthesis capability returns raw 16-bit little-endian PCM at 24 kHz
//! mono. Browsers will not play that, so it is wrapped into a standard WAV
//! container. The transform is pure and deterministic.

use std::io::Cursor;

use agrivoice_core::AudioPayload;

pub const SAMPLE_RATE_HZ: u32 = 24_000;
pub const CHANNELS: u16 = 1;
pub const BITS_PER_SAMPLE: u16 = 16;

/// Wrap raw PCM16LE samples into a WAV container.
///
/// A trailing odd byte (half a sample) is dropped.
pub fn pcm_to_wav(pcm: &[u8]) -> Result<Vec<u8>, hound::Error> {
    let spec = hound::WavSpec {
        channels: CHANNELS,
        sample_rate: SAMPLE_RATE_HZ,
        bits_per_sample: BITS_PER_SAMPLE,
        sample_format: hound::SampleFormat::Int,
    };

    let mut cursor = Cursor::new(Vec::with_capacity(pcm.len() + 44));
    {
        let mut writer = hound::WavWriter::new(&mut cursor, spec)?;
        for sample in pcm.chunks_exact(2) {
            writer.write_sample(i16::from_le_bytes([sample[0], sample[1]]))?;
        }
        writer.finalize()?;
    }
    Ok(cursor.into_inner())
}

/// Containerize PCM and wrap it as a self-describing payload
pub fn wav_payload(pcm: &[u8]) -> Result<AudioPayload, hound::Error> {
    let bytes = pcm_to_wav(pcm)?;
    Ok(AudioPayload::from_bytes("audio/wav", &bytes))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn container_parses_back_with_expected_format() {
        let pcm: Vec<u8> = (0..64u8).collect();
        let wav = pcm_to_wav(&pcm).unwrap();

        let reader = hound::WavReader::new(Cursor::new(&wav)).unwrap();
        let spec = reader.spec();
        assert_eq!(spec.sample_rate, 24_000);
        assert_eq!(spec.channels, 1);
        assert_eq!(spec.bits_per_sample, 16);
        assert_eq!(reader.len(), 32);
    }

    #[test]
    fn transform_is_deterministic() {
        let pcm: Vec<u8> = vec![0x10, 0x20, 0x30, 0x40];
        assert_eq!(pcm_to_wav(&pcm).unwrap(), pcm_to_wav(&pcm).unwrap());
    }

    #[test]
    fn odd_trailing_byte_is_dropped() {
        let wav = pcm_to_wav(&[1, 2, 3]).unwrap();
        let reader = hound::WavReader::new(Cursor::new(&wav)).unwrap();
        assert_eq!(reader.len(), 1);
    }

    #[test]
    fn payload_is_wav_mime() {
        let payload = wav_payload(&[0, 0]).unwrap();
        assert_eq!(payload.mime_type, "audio/wav");
        assert!(!payload.is_empty());
    }
}
