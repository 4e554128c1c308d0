use super::*;

fn encoded(
    emit: impl FnOnce(&mut PostcardEncoder<Vec<u8>>) -> io::Result<()>,
) -> Vec<u8> {
    let mut encoder = PostcardEncoder::new(Vec::new());
    emit(&mut encoder).unwrap();
    encoder.into_inner()
}

#[test]
fn varint_u32_roundtrip() {
    let test_values: &[u32] =
        &[0, 1, 127, 128, 255, 256, 16383, 16384, u32::MAX / 2, u32::MAX];

    for &value in test_values {
        let bytes = encoded(|e| e.emit_u32(value));
        let decoded = PostcardDecoder::new(&bytes[..]).read_u32().unwrap();
        assert_eq!(value, decoded, "roundtrip failed for {value}");
    }
}

#[test]
fn zigzag_i64_roundtrip() {
    let test_values: &[i64] =
        &[0, 1, -1, 63, -64, 64, -65, 127, -128, i64::MAX, i64::MIN];

    for &value in test_values {
        let bytes = encoded(|e| e.emit_i64(value));
        let decoded = PostcardDecoder::new(&bytes[..]).read_i64().unwrap();
        assert_eq!(value, decoded, "roundtrip failed for {value}");
    }
}

#[test]
fn varint_layout() {
    assert_eq!(encoded(|e| e.emit_u32(0)), [0x00]);
    assert_eq!(encoded(|e| e.emit_u32(127)), [0x7F]);
    assert_eq!(encoded(|e| e.emit_u32(128)), [0x80, 0x01]);
    assert_eq!(encoded(|e| e.emit_u32(300)), [0xAC, 0x02]);
    assert_eq!(encoded(|e| e.emit_u64(u64::MAX)).len(), 10);
}

#[test]
fn zigzag_layout() {
    assert_eq!(encoded(|e| e.emit_i32(0)), [0x00]);
    assert_eq!(encoded(|e| e.emit_i32(-1)), [0x01]);
    assert_eq!(encoded(|e| e.emit_i32(1)), [0x02]);
    assert_eq!(encoded(|e| e.emit_i32(-2)), [0x03]);
    assert_eq!(encoded(|e| e.emit_i16(i16::MIN)), [0xFF, 0xFF, 0x03]);
}

#[test]
#[allow(clippy::float_cmp)]
fn floats_are_fixed_width() {
    let bytes = encoded(|e| e.emit_f32(std::f32::consts::PI));
    assert_eq!(bytes.len(), 4);
    assert_eq!(
        PostcardDecoder::new(&bytes[..]).read_f32().unwrap(),
        std::f32::consts::PI
    );

    let bytes = encoded(|e| e.emit_f64(std::f64::consts::E));
    assert_eq!(bytes.len(), 8);
    assert_eq!(
        PostcardDecoder::new(&bytes[..]).read_f64().unwrap(),
        std::f64::consts::E
    );
}

#[test]
fn overlong_varint_is_invalid_data() {
    let bytes = [0xFF; 6];
    let err = PostcardDecoder::new(&bytes[..]).read_u32().unwrap_err();
    assert_eq!(err.kind(), io::ErrorKind::InvalidData);
}

#[test]
fn varint_overflowing_its_width_is_invalid_data() {
    // 65536 does not fit in a u16
    let err = PostcardDecoder::new(&[0x80, 0x80, 0x04][..])
        .read_u16()
        .unwrap_err();
    assert_eq!(err.kind(), io::ErrorKind::InvalidData);

    // ten bytes whose last one sets bits above bit 63
    let mut bytes = [0xFF; 10];
    bytes[9] = 0x7F;
    let err = PostcardDecoder::new(&bytes[..]).read_u64().unwrap_err();
    assert_eq!(err.kind(), io::ErrorKind::InvalidData);

    // the last u32 byte may not continue
    let bytes = [0xFF, 0xFF, 0xFF, 0xFF, 0x8F];
    let err = PostcardDecoder::new(&bytes[..]).read_u32().unwrap_err();
    assert_eq!(err.kind(), io::ErrorKind::InvalidData);
}

#[test]
fn varint_at_full_width_is_accepted() {
    let decode = |bytes: &[u8]| PostcardDecoder::new(bytes).read_u16();

    assert_eq!(decode(&[0xFF, 0xFF, 0x03]).unwrap(), u16::MAX);
    assert_eq!(
        PostcardDecoder::new(&encoded(|e| e.emit_u64(u64::MAX))[..])
            .read_u64()
            .unwrap(),
        u64::MAX
    );
}

#[test]
fn unterminated_varint_is_eof() {
    let bytes = [0x80, 0x80];
    let err = PostcardDecoder::new(&bytes[..]).read_u64().unwrap_err();
    assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof);
}

#[test]
fn huge_length_prefix_does_not_preallocate() {
    // announces u64::MAX / 2 bytes but carries three
    let mut bytes = encoded(|e| e.emit_u64(u64::MAX / 2));
    bytes.extend_from_slice(b"abc");

    let err = PostcardDecoder::new(&bytes[..]).read_str().unwrap_err();
    assert!(matches!(
        err.kind(),
        io::ErrorKind::UnexpectedEof | io::ErrorKind::InvalidData
    ));
}

#[test]
fn raw_bytes_short_read_is_eof() {
    let bytes = [1u8, 2];
    let err = PostcardDecoder::new(&bytes[..]).read_raw_bytes(3).unwrap_err();
    assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof);
}

#[test]
fn invalid_bool_and_char_are_rejected() {
    let err = PostcardDecoder::new(&[2u8][..]).read_bool().unwrap_err();
    assert_eq!(err.kind(), io::ErrorKind::InvalidData);

    let surrogate = encoded(|e| e.emit_u32(0xD800));
    let err = PostcardDecoder::new(&surrogate[..]).read_char().unwrap_err();
    assert_eq!(err.kind(), io::ErrorKind::InvalidData);
}
