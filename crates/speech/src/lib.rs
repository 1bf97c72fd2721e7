//! Speech I/O adapter
//!
//! Transcription is a single call to a multimodal capability that hears all
//! three supported languages. Synthesis retries transient failures under
//! the shared retry policy and degrades to "no audio" on exhaustion; the
//! raw PCM result is containerized into WAV by a pure transform that is
//! never retried.

mod client;
mod stt;
mod tts;
pub mod wav;

pub use client::{GeminiSpeechClient, GeminiSpeechConfig, SynthesisClient, TranscriptionClient};
pub use stt::SpeechTranscriber;
pub use tts::SpeechSynthesizer;
pub use wav::{pcm_to_wav, BITS_PER_SAMPLE, CHANNELS, SAMPLE_RATE_HZ};
