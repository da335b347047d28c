//! Encoding detection for files whose encoding is unknown.
//!
//! Detection is a fixed cascade evaluated over a bounded prefix of the file:
//! byte-order mark, strict UTF-8, the legacy Chinese encodings in priority
//! order, and finally a lossy single-byte fallback. The first stage that
//! accepts the sample wins, so the outcome is deterministic for a given input.
//!
//! A legacy candidate must decode without malformed sequences and without
//! producing Private Use Area characters: GB18030 maps the GBK user-defined
//! ranges (where many Big5 byte pairs land) to the PUA.

use encoding_rs::{DecoderResult, Encoding, BIG5, GB18030, UTF_8, WINDOWS_1252};
use serde::{Serialize, Serializer};
use std::borrow::Cow;

pub const DEFAULT_SAMPLE_SIZE: usize = 64 * 1024;

/// Legacy multi-byte encodings tried after UTF-8, in priority order.
/// GB18030 decodes every GBK and GB2312 sequence.
pub const LEGACY_ENCODINGS: [&Encoding; 2] = [GB18030, BIG5];

/// Used when nothing else decodes the sample cleanly.
pub const FALLBACK_ENCODING: &Encoding = WINDOWS_1252;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DetectionStage {
    Bom,
    Utf8,
    Legacy,
    Fallback,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EncodingGuess {
    #[serde(serialize_with = "serialize_encoding")]
    pub encoding: &'static Encoding,
    /// Advisory only; nothing branches on it.
    pub confidence: f32,
    pub fallback_used: bool,
    pub stage: DetectionStage,
}

fn serialize_encoding<S: Serializer>(
    encoding: &&'static Encoding,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(encoding.name())
}

impl EncodingGuess {
    pub fn name(&self) -> &'static str {
        self.encoding.name()
    }

    /// Decodes the complete file content with the guessed encoding, stripping
    /// a BOM if one was detected. The flag reports whether any byte had to be
    /// replaced with U+FFFD.
    pub fn decode<'a>(&self, bytes: &'a [u8]) -> (Cow<'a, str>, bool) {
        match self.stage {
            DetectionStage::Bom => self.encoding.decode_with_bom_removal(bytes),
            _ => self.encoding.decode_without_bom_handling(bytes),
        }
    }
}

/// Guesses the encoding of `sample`.
///
/// `complete` tells whether `sample` is the whole file; when it is only a
/// prefix, a multi-byte sequence cut off at the end is not held against the
/// candidate.
pub fn detect(sample: &[u8], complete: bool) -> EncodingGuess {
    if let Some((encoding, _)) = Encoding::for_bom(sample) {
        return EncodingGuess {
            encoding,
            confidence: 1.0,
            fallback_used: false,
            stage: DetectionStage::Bom,
        };
    }

    if strict_decode(UTF_8, sample, complete).is_some() {
        let confidence = if sample.is_ascii() { 0.8 } else { 0.95 };
        return EncodingGuess {
            encoding: UTF_8,
            confidence,
            fallback_used: false,
            stage: DetectionStage::Utf8,
        };
    }

    for (rank, &encoding) in LEGACY_ENCODINGS.iter().enumerate() {
        let accepted = strict_decode(encoding, sample, complete)
            .is_some_and(|text| !text.chars().any(is_private_use));
        if accepted {
            return EncodingGuess {
                encoding,
                confidence: 0.6 - 0.1 * rank as f32,
                fallback_used: false,
                stage: DetectionStage::Legacy,
            };
        }
    }

    EncodingGuess {
        encoding: FALLBACK_ENCODING,
        confidence: 0.1,
        fallback_used: true,
        stage: DetectionStage::Fallback,
    }
}

/// Strict decode of `sample`; `None` at the first malformed sequence.
fn strict_decode(encoding: &'static Encoding, sample: &[u8], complete: bool) -> Option<String> {
    let mut decoder = encoding.new_decoder_without_bom_handling();
    let capacity = decoder.max_utf8_buffer_length_without_replacement(sample.len())?;
    let mut out = String::with_capacity(capacity);
    let (result, _read) = decoder.decode_to_string_without_replacement(sample, &mut out, complete);
    match result {
        DecoderResult::InputEmpty => Some(out),
        _ => None,
    }
}

fn is_private_use(c: char) -> bool {
    matches!(c, '\u{E000}'..='\u{F8FF}' | '\u{F0000}'..='\u{10FFFF}')
}
