// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Payload decoder: Base64 text from the web layer to raw byte buffers.
//
// Accepts what Android's `Base64.DEFAULT` accepts: the standard alphabet,
// optional padding, and line-wrapped input (whitespace is skipped). No size
// or content validation happens here; the AR engine owns format checks.

use std::borrow::Cow;

use base64::alphabet;
use base64::engine::general_purpose::STANDARD;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use base64::Engine as _;
use tracing::debug;

use arview_core::error::{ArViewError, Result};
use arview_core::types::PayloadField;

/// Standard alphabet, padding optional on decode.
const TRANSPORT: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Decode one encoded field.
///
/// Fails with [`ArViewError::Decode`] on any invalid input; never returns a
/// truncated buffer.
pub fn decode_field(field: PayloadField, encoded: &str) -> Result<Vec<u8>> {
    let compact: Cow<'_, str> = if encoded.bytes().any(|b| b.is_ascii_whitespace()) {
        Cow::Owned(encoded.chars().filter(|c| !c.is_ascii_whitespace()).collect())
    } else {
        Cow::Borrowed(encoded)
    };

    let bytes = TRANSPORT
        .decode(compact.as_bytes())
        .map_err(|e| ArViewError::Decode {
            field,
            reason: e.to_string(),
        })?;

    debug!(%field, encoded_len = encoded.len(), decoded_len = bytes.len(), "payload decoded");
    Ok(bytes)
}

/// Decode the model and texture payloads of one request.
///
/// The model is decoded first; a bad model never reaches the texture.
pub fn decode(encoded_model: &str, encoded_texture: &str) -> Result<(Vec<u8>, Vec<u8>)> {
    let model = decode_field(PayloadField::Model, encoded_model)?;
    let texture = decode_field(PayloadField::Texture, encoded_texture)?;
    Ok((model, texture))
}

/// Canonical (padded, unwrapped) encoding, the inverse of [`decode_field`].
pub fn encode(bytes: &[u8]) -> String {
    STANDARD.encode(bytes)
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    /// Printable characters outside the Base64 alphabet, padding and whitespace.
    fn foreign_char() -> impl Strategy<Value = char> {
        prop::sample::select(
            (0x21u8..0x7f)
                .map(char::from)
                .filter(|c| !c.is_ascii_alphanumeric() && !matches!(c, '+' | '/' | '='))
                .chain(['é', '€', '\u{0}'])
                .collect::<Vec<_>>(),
        )
    }

    #[test]
    fn decodes_both_fields() {
        let (model, texture) = decode("b2JqIGRhdGE=", "iVBORw==").unwrap();
        assert_eq!(model, b"obj data");
        assert_eq!(texture, [0x89, b'P', b'N', b'G']);
    }

    #[test]
    fn line_wrapped_input_accepted() {
        let wrapped = "djEgMC4wIDAu\nMCAwLjAK\r\n";
        let bytes = decode_field(PayloadField::Model, wrapped).unwrap();
        assert_eq!(bytes, b"v1 0.0 0.0 0.0\n");
    }

    #[test]
    fn missing_padding_accepted() {
        assert_eq!(decode_field(PayloadField::Texture, "AAE").unwrap(), [0, 1]);
    }

    #[test]
    fn malformed_model_names_field() {
        let err = decode("not*base64", "AAEC").unwrap_err();
        match err {
            ArViewError::Decode { field, .. } => assert_eq!(field, PayloadField::Model),
            other => panic!("expected decode error, got {other:?}"),
        }
    }

    #[test]
    fn malformed_texture_names_field() {
        let err = decode("AAEC", "A").unwrap_err();
        assert!(matches!(
            err,
            ArViewError::Decode {
                field: PayloadField::Texture,
                ..
            }
        ));
    }

    #[test]
    fn url_safe_alphabet_rejected() {
        assert!(decode_field(PayloadField::Model, "_-7dzA==").is_err());
    }

    proptest! {
        /// Any byte string survives encode then decode unchanged.
        #[test]
        fn prop_round_trip(bytes in prop::collection::vec(any::<u8>(), 0..512)) {
            let encoded = encode(&bytes);
            prop_assert_eq!(decode_field(PayloadField::Model, &encoded).unwrap(), bytes);
        }

        /// A single foreign character anywhere in the input is a decode error.
        #[test]
        fn prop_foreign_char_rejected(
            bytes in prop::collection::vec(any::<u8>(), 0..128),
            at in any::<prop::sample::Index>(),
            bad in foreign_char(),
        ) {
            let mut encoded = encode(&bytes);
            encoded.insert(at.index(encoded.len() + 1), bad);
            let is_decode_error = matches!(
                decode_field(PayloadField::Texture, &encoded),
                Err(ArViewError::Decode { field: PayloadField::Texture, .. })
            );
            prop_assert!(is_decode_error, "accepted {:?}", encoded);
        }
    }
}
