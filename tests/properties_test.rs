mod common;

use common::*;
use proptest::prelude::*;
use wxdat_decoder::decrypt::V3Decryptor;
use wxdat_decoder::{
    ContainerTranscoder, DatDecryptor, DecryptError, KeyMaterial, SchemeVariant, TranscodeError,
    VersionDetector,
};

proptest! {
    #[test]
    fn xor_round_trip(data in proptest::collection::vec(any::<u8>(), 0..512), key in any::<u8>()) {
        let encrypted = encrypt_v3(&data, key);
        prop_assert_eq!(V3Decryptor::xor_decrypt(&encrypted, key), data);
    }

    #[test]
    fn detect_is_total(header in proptest::collection::vec(any::<u8>(), 0..32)) {
        match VersionDetector::detect(&header) {
            Ok(SchemeVariant::CurrentCipherDefaultKey) => {
                prop_assert!(header.starts_with(VersionDetector::V4_V1_SIGNATURE))
            }
            Ok(SchemeVariant::CurrentCipherUserKey) => {
                prop_assert!(header.starts_with(VersionDetector::V4_V2_SIGNATURE))
            }
            Ok(SchemeVariant::LegacyXorOnly) => {
                prop_assert!(VersionDetector::legacy_xor_candidate(&header).is_some())
            }
            Err(DecryptError::UnsupportedFormat) => {}
            Err(other) => prop_assert!(false, "unexpected error: {:?}", other),
        }
    }

    #[test]
    fn legacy_jpeg_detected_for_any_key(key in any::<u8>(), body in proptest::collection::vec(any::<u8>(), 0..64)) {
        let mut plain = vec![0xFF, 0xD8, 0xFF];
        plain.extend(body);
        let encrypted = encrypt_v3(&plain, key);

        prop_assert_eq!(VersionDetector::detect(&encrypted).ok(), Some(SchemeVariant::LegacyXorOnly));
        prop_assert_eq!(VersionDetector::legacy_xor_candidate(&encrypted), Some(key));

        let keys = KeyMaterial::with_fallback_key(key);
        let decrypted = DatDecryptor::decrypt(&encrypted, &keys).unwrap();
        prop_assert_eq!(decrypted.bytes(), plain.as_slice());
    }

    #[test]
    fn decrypt_never_panics(data in proptest::collection::vec(any::<u8>(), 0..256), key in any::<u8>()) {
        let keys = KeyMaterial::with_fallback_key(key);
        let _ = DatDecryptor::decrypt(&data, &keys);

        let mut v4 = VersionDetector::V4_V1_SIGNATURE.to_vec();
        v4.extend_from_slice(&data);
        let _ = DatDecryptor::decrypt(&v4, &keys);
    }

    #[test]
    fn transcoder_never_reads_past_end(tail in proptest::collection::vec(any::<u8>(), 0..64)) {
        let mut data = b"wxgf".to_vec();
        data.extend(tail);
        let transcoder = ContainerTranscoder::default();
        let _ = transcoder.transcode_if_proprietary(data);
    }
}

#[test]
fn test_truncated_container_signature() {
    let transcoder = ContainerTranscoder::default();
    for short in [&b"w"[..], b"wx", b"wxg", b"WXG"] {
        let result = transcoder.transcode_if_proprietary(short.to_vec());
        assert!(
            matches!(result, Err(TranscodeError::TruncatedInput { .. })),
            "{:?}",
            short
        );
    }
}
