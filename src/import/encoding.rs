//! Text encoding resolution and detection
//!
//! Alipay exports are GBK, WeChat exports are UTF-8, and the unified table is
//! whatever the last tool to touch it wrote. Decoding goes through
//! `encoding_rs`; detection is a pluggable sniffing step.

use encoding_rs::{Encoding, GBK, UTF_8};

use crate::error::{BillError, BillResult};

/// Resolve a WHATWG encoding label such as "gbk" or "utf-8"
pub fn resolve_encoding(label: &str) -> BillResult<&'static Encoding> {
    Encoding::for_label(label.trim().as_bytes())
        .ok_or_else(|| BillError::Config(format!("Unknown text encoding: '{}'", label)))
}

/// Decode bytes into a String, honoring a BOM if one is present
///
/// Bytes that are invalid in the chosen encoding are reported rather than
/// silently replaced.
pub fn decode(bytes: &[u8], encoding: &'static Encoding) -> BillResult<String> {
    let (text, used, had_errors) = encoding.decode(bytes);
    if had_errors {
        return Err(BillError::malformed(format!(
            "input is not valid {} text",
            used.name()
        )));
    }
    Ok(text.into_owned())
}

/// Guesses the encoding of raw bytes
pub trait EncodingDetector {
    /// Returns None when the sample is inconclusive
    fn detect(&self, bytes: &[u8]) -> Option<&'static Encoding>;
}

/// Detector that inspects a leading sample of the input
///
/// Order: byte-order mark, then strict UTF-8, then GBK.
///
/// Only the first `sample_len` bytes are examined. A file that is plain ASCII
/// throughout the sample but GBK further on is reported as UTF-8, and decoding
/// it then fails as malformed input. Raise `detect_sample_bytes` in the
/// settings for tables with long ASCII-only prefixes.
#[derive(Debug, Clone)]
pub struct SniffingDetector {
    sample_len: usize,
}

impl SniffingDetector {
    pub fn new(sample_len: usize) -> Self {
        Self {
            sample_len: sample_len.max(4),
        }
    }
}

impl Default for SniffingDetector {
    fn default() -> Self {
        Self::new(64 * 1024)
    }
}

impl EncodingDetector for SniffingDetector {
    fn detect(&self, bytes: &[u8]) -> Option<&'static Encoding> {
        if let Some((encoding, _)) = Encoding::for_bom(bytes) {
            return Some(encoding);
        }

        let truncated = bytes.len() > self.sample_len;
        let sample = &bytes[..bytes.len().min(self.sample_len)];

        match std::str::from_utf8(sample) {
            Ok(_) => return Some(UTF_8),
            // error_len() == None means the sample ends mid-character
            Err(e) if truncated && e.error_len().is_none() => return Some(UTF_8),
            Err(_) => {}
        }

        let mut decoder = GBK.new_decoder_without_bom_handling();
        let capacity = decoder
            .max_utf8_buffer_length(sample.len())
            .unwrap_or(sample.len() * 3);
        let mut scratch = String::with_capacity(capacity);
        let (result, _, had_errors) = decoder.decode_to_string(sample, &mut scratch, !truncated);
        if had_errors || result != encoding_rs::CoderResult::InputEmpty {
            return None;
        }
        Some(GBK)
    }
}

/// Detect with a fallback for inconclusive samples
pub fn detect_or(
    detector: &dyn EncodingDetector,
    bytes: &[u8],
    fallback: &'static Encoding,
) -> &'static Encoding {
    match detector.detect(bytes) {
        Some(encoding) => encoding,
        None => {
            tracing::warn!(
                fallback = fallback.name(),
                "Encoding detection inconclusive, using fallback"
            );
            fallback
        }
    }
}
