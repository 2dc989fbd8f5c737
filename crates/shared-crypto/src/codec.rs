//! # Codecs
//!
//! Reversible text transforms used by the signing protocol. Every codec maps
//! UTF-8 text to its encoded text form (`encode`/`decode`) and raw bytes to
//! the same text alphabet (`encode_bytes`/`decode_to_bytes`).
//!
//! | Tag | Text form | Byte form |
//! |-----|-----------|-----------|
//! | `url-encoded` | RFC 3986 percent-encoding | percent-encoding of padded Base64 |
//! | `base64` | standard alphabet, padded | same |
//! | `hexstr` | lower-case, two chars per byte | same |
//! | `base32` | RFC 4648, unpadded, lower-cased | RFC 4648, unpadded |
//! | `base58` | Bitcoin alphabet | same |
//!
//! Decoders are case-insensitive where the alphabet allows it (`hexstr`,
//! `base32`). The `url-encoded` decoder only accepts what its encoder emits:
//! unreserved characters and `%XX` escapes.

use crate::errors::EncodingError;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use data_encoding::BASE32_NOPAD;
use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use shared_types::Encoding;

/// Everything except the RFC 3986 unreserved set is escaped.
const COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

fn is_url_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '-' | '.' | '_' | '~' | '%')
}

/// A reversible text/byte transform.
pub trait Codec: Send + Sync {
    /// Tag this codec implements.
    fn encoding(&self) -> Encoding;

    /// Encode UTF-8 text.
    fn encode(&self, text: &str) -> String;

    /// Inverse of [`Codec::encode`].
    ///
    /// # Errors
    ///
    /// Fails when the input is outside the alphabet or does not decode to UTF-8.
    fn decode(&self, text: &str) -> Result<String, EncodingError> {
        let bytes = self.decode_text_bytes(text)?;
        String::from_utf8(bytes).map_err(|_| EncodingError::InvalidUtf8(self.encoding()))
    }

    /// Encode raw bytes.
    fn encode_bytes(&self, bytes: &[u8]) -> String;

    /// Inverse of [`Codec::encode_bytes`].
    ///
    /// # Errors
    ///
    /// Fails when the input is outside the alphabet.
    fn decode_to_bytes(&self, text: &str) -> Result<Vec<u8>, EncodingError>;

    /// Raw bytes behind a text-form encoding. Defaults to the byte form.
    #[doc(hidden)]
    fn decode_text_bytes(&self, text: &str) -> Result<Vec<u8>, EncodingError> {
        self.decode_to_bytes(text)
    }
}

/// `url-encoded`
#[derive(Debug, Clone, Copy, Default)]
pub struct UrlCodec;

impl Codec for UrlCodec {
    fn encoding(&self) -> Encoding {
        Encoding::UrlEncoded
    }

    fn encode(&self, text: &str) -> String {
        utf8_percent_encode(text, COMPONENT).to_string()
    }

    fn encode_bytes(&self, bytes: &[u8]) -> String {
        self.encode(&STANDARD.encode(bytes))
    }

    fn decode_to_bytes(&self, text: &str) -> Result<Vec<u8>, EncodingError> {
        let base64_text = self.decode(text)?;
        STANDARD
            .decode(base64_text)
            .map_err(|e| EncodingError::input(Encoding::UrlEncoded, e))
    }

    fn decode_text_bytes(&self, text: &str) -> Result<Vec<u8>, EncodingError> {
        if let Some(c) = text.chars().find(|c| !is_url_char(*c)) {
            return Err(EncodingError::input(
                Encoding::UrlEncoded,
                format!("unescaped character {c:?}"),
            ));
        }
        let escapes_valid = text.split('%').skip(1).all(|escape| {
            escape.len() >= 2 && escape.as_bytes()[..2].iter().all(u8::is_ascii_hexdigit)
        });
        if !escapes_valid {
            return Err(EncodingError::input(Encoding::UrlEncoded, "truncated escape"));
        }
        Ok(percent_decode_str(text).collect())
    }
}

/// `base64`
#[derive(Debug, Clone, Copy, Default)]
pub struct Base64Codec;

impl Codec for Base64Codec {
    fn encoding(&self) -> Encoding {
        Encoding::Base64
    }

    fn encode(&self, text: &str) -> String {
        self.encode_bytes(text.as_bytes())
    }

    fn encode_bytes(&self, bytes: &[u8]) -> String {
        STANDARD.encode(bytes)
    }

    fn decode_to_bytes(&self, text: &str) -> Result<Vec<u8>, EncodingError> {
        STANDARD
            .decode(text)
            .map_err(|e| EncodingError::input(Encoding::Base64, e))
    }
}

/// `hexstr`
#[derive(Debug, Clone, Copy, Default)]
pub struct HexCodec;

impl Codec for HexCodec {
    fn encoding(&self) -> Encoding {
        Encoding::HexStr
    }

    fn encode(&self, text: &str) -> String {
        self.encode_bytes(text.as_bytes())
    }

    fn encode_bytes(&self, bytes: &[u8]) -> String {
        hex::encode(bytes)
    }

    fn decode_to_bytes(&self, text: &str) -> Result<Vec<u8>, EncodingError> {
        hex::decode(text).map_err(|e| EncodingError::input(Encoding::HexStr, e))
    }
}

/// `base32`
#[derive(Debug, Clone, Copy, Default)]
pub struct Base32Codec;

impl Codec for Base32Codec {
    fn encoding(&self) -> Encoding {
        Encoding::Base32
    }

    fn encode(&self, text: &str) -> String {
        BASE32_NOPAD.encode(text.as_bytes()).to_ascii_lowercase()
    }

    fn encode_bytes(&self, bytes: &[u8]) -> String {
        BASE32_NOPAD.encode(bytes)
    }

    fn decode_to_bytes(&self, text: &str) -> Result<Vec<u8>, EncodingError> {
        BASE32_NOPAD
            .decode(text.to_ascii_uppercase().as_bytes())
            .map_err(|e| EncodingError::input(Encoding::Base32, e))
    }
}

/// `base58`
#[derive(Debug, Clone, Copy, Default)]
pub struct Base58Codec;

impl Codec for Base58Codec {
    fn encoding(&self) -> Encoding {
        Encoding::Base58
    }

    fn encode(&self, text: &str) -> String {
        self.encode_bytes(text.as_bytes())
    }

    fn encode_bytes(&self, bytes: &[u8]) -> String {
        bs58::encode(bytes).into_string()
    }

    fn decode_to_bytes(&self, text: &str) -> Result<Vec<u8>, EncodingError> {
        bs58::decode(text)
            .into_vec()
            .map_err(|e| EncodingError::input(Encoding::Base58, e))
    }
}

static URL: UrlCodec = UrlCodec;
static BASE64: Base64Codec = Base64Codec;
static HEX: HexCodec = HexCodec;
static BASE32: Base32Codec = Base32Codec;
static BASE58: Base58Codec = Base58Codec;

/// Codec implementing `encoding`.
#[must_use]
pub fn codec_for(encoding: Encoding) -> &'static dyn Codec {
    match encoding {
        Encoding::UrlEncoded => &URL,
        Encoding::Base64 => &BASE64,
        Encoding::HexStr => &HEX,
        Encoding::Base32 => &BASE32,
        Encoding::Base58 => &BASE58,
    }
}

/// Codec for a configuration tag such as `"base58"`.
///
/// # Errors
///
/// Returns `EncodingError::UnsupportedEncodingFormat` for an unknown tag.
pub fn codec_for_tag(tag: &str) -> Result<&'static dyn Codec, EncodingError> {
    tag.parse::<Encoding>()
        .map(codec_for)
        .map_err(|_| EncodingError::UnsupportedEncodingFormat(tag.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const SAMPLE_TEXT: &str = "Hello, World! \u{fc}";
    const SAMPLE_BYTES: [u8; 6] = [0x00, 0x01, 0x7f, 0x80, 0xfe, 0xff];

    #[test]
    fn test_text_golden_vectors() {
        let expected = [
            (Encoding::UrlEncoded, "Hello%2C%20World%21%20%C3%BC"),
            (Encoding::Base64, "SGVsbG8sIFdvcmxkISDDvA=="),
            (Encoding::HexStr, "48656c6c6f2c20576f726c642120c3bc"),
            (Encoding::Base32, "jbswy3dpfqqfo33snrscciggdxq"),
            (Encoding::Base58, "9wWTEnNWQV2M4vYkUsW6hq"),
        ];
        for (encoding, vector) in expected {
            let codec = codec_for(encoding);
            assert_eq!(codec.encode(SAMPLE_TEXT), vector, "{encoding}");
            assert_eq!(codec.decode(vector).unwrap(), SAMPLE_TEXT, "{encoding}");
        }
    }

    #[test]
    fn test_byte_golden_vectors() {
        let expected = [
            (Encoding::UrlEncoded, "AAF%2FgP7%2F"),
            (Encoding::Base64, "AAF/gP7/"),
            (Encoding::HexStr, "00017f80feff"),
            (Encoding::Base32, "AAAX7AH674"),
            (Encoding::Base58, "1AoZayk"),
        ];
        for (encoding, vector) in expected {
            let codec = codec_for(encoding);
            assert_eq!(codec.encode_bytes(&SAMPLE_BYTES), vector, "{encoding}");
            assert_eq!(codec.decode_to_bytes(vector).unwrap(), SAMPLE_BYTES, "{encoding}");
        }
    }

    #[test]
    fn test_base32_decode_is_case_insensitive() {
        let codec = codec_for(Encoding::Base32);
        assert_eq!(codec.decode("JBSWY3DPFQQFO33SNRSCCIGDXQ").unwrap(), SAMPLE_TEXT);
        assert_eq!(codec.decode_to_bytes("aaax7ah674").unwrap(), SAMPLE_BYTES);
    }

    #[test]
    fn test_url_decode_is_strict() {
        let codec = codec_for(Encoding::UrlEncoded);
        assert!(codec.decode("a b").is_err());
        assert!(codec.decode("AAF/gP7/").is_err());
        assert!(codec.decode("abc%2").is_err());
        assert!(codec.decode("abc%zz").is_err());
        assert_eq!(codec.decode("a%2Fb%2fc").unwrap(), "a/b/c");
    }

    #[test]
    fn test_hex_accepts_upper_case() {
        assert_eq!(
            codec_for(Encoding::HexStr).decode_to_bytes("00017F80FEFF").unwrap(),
            SAMPLE_BYTES
        );
    }

    #[test]
    fn test_factory_by_tag() {
        for encoding in Encoding::ALL {
            let codec = codec_for_tag(encoding.as_str()).unwrap();
            assert_eq!(codec.encoding(), encoding);
        }
    }

    #[test]
    fn test_unknown_tag_rejected() {
        let err = codec_for_tag("base36").err().unwrap();
        assert_eq!(err, EncodingError::UnsupportedEncodingFormat("base36".into()));
    }

    #[test]
    fn test_malformed_input_rejected() {
        assert!(matches!(
            codec_for(Encoding::Base58).decode_to_bytes("0OIl"),
            Err(EncodingError::InvalidInput { encoding: Encoding::Base58, .. })
        ));
        assert!(codec_for(Encoding::HexStr).decode_to_bytes("abc").is_err());
        assert!(codec_for(Encoding::Base64).decode_to_bytes("not base64!").is_err());
    }

    #[test]
    fn test_non_utf8_text_rejected() {
        // 0xff alone is never valid UTF-8
        assert_eq!(
            codec_for(Encoding::HexStr).decode("ff"),
            Err(EncodingError::InvalidUtf8(Encoding::HexStr))
        );
        assert_eq!(
            codec_for(Encoding::UrlEncoded).decode("%FF"),
            Err(EncodingError::InvalidUtf8(Encoding::UrlEncoded))
        );
    }

    fn any_encoding() -> impl Strategy<Value = Encoding> {
        prop::sample::select(Encoding::ALL.to_vec())
    }

    proptest! {
        #[test]
        fn test_text_round_trip(encoding in any_encoding(), text in ".*") {
            let codec = codec_for(encoding);
            prop_assert_eq!(codec.decode(&codec.encode(&text)).unwrap(), text);
        }

        #[test]
        fn test_bytes_round_trip(
            encoding in any_encoding(),
            bytes in prop::collection::vec(any::<u8>(), 0..256),
        ) {
            let codec = codec_for(encoding);
            prop_assert_eq!(codec.decode_to_bytes(&codec.encode_bytes(&bytes)).unwrap(), bytes);
        }
    }
}
