// Audio module - turning stored audio files into mono PCM
//
// The trainer never captures or plays audio; it only needs decoded mono
// samples at the analysis rate.

pub mod decode;

pub use decode::{AudioDecoder, DecodedAudio, WavDecoder};
