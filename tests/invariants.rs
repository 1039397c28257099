use hex_literal::hex;
use picocbor::{DecodeMode, Decoder, Encoder, ErrorCode};

fn drain(bytes: &[u8]) -> Vec<(u8, u8)> {
    let mut d = Decoder::new(bytes, DecodeMode::Normal);
    let mut levels = Vec::new();
    loop {
        match d.next_item() {
            Ok(item) => levels.push((item.nest_level, item.next_nest_level)),
            Err(e) => {
                assert_eq!(e.code, ErrorCode::NoMoreItems);
                break;
            }
        }
    }
    d.finish().unwrap();
    levels
}

/// `next_nest_level` forms a valid parenthesisation: a step up only when a
/// container opens, and the level after one item is the level the next item
/// occurs at.
fn check_parenthesisation(levels: &[(u8, u8)]) {
    let mut current = 0u8;
    for &(nest, next) in levels {
        assert_eq!(nest, current, "item must occur at the advertised level");
        assert!(
            next <= nest + 1,
            "the level can only grow by opening one container"
        );
        current = next;
    }
    assert_eq!(current, 0, "all containers must close by the end");
}

#[test]
fn nesting_parenthesisation_holds() {
    let samples: &[&[u8]] = &[
        &hex!("00"),
        &hex!("8301820203626869"),
        &hex!("bf616101616202ff"),
        &hex!("819f9f01ffff"),
        &hex!("a26161830102036162f5"),
        &hex!("9f8080ff"),
        &hex!("0001626869"),
    ];
    for sample in samples {
        check_parenthesisation(&drain(sample));
    }
}

#[test]
fn decode_is_idempotent_across_contexts() {
    let bytes = hex!("a26161830102036162c48221196ab3");
    let run = || drain(&bytes);
    assert_eq!(run(), run());
}

#[test]
fn reencoding_preferred_input_is_byte_identical() {
    // Encoded with preferred integer and float lengths throughout.
    let mut buf = [0u8; 128];
    let mut enc = Encoder::new(&mut buf);
    enc.open_map().unwrap();
    enc.text("ints").unwrap();
    enc.open_array().unwrap();
    enc.u64(0).unwrap();
    enc.u64(24).unwrap();
    enc.u64(65_536).unwrap();
    enc.i64(-42).unwrap();
    enc.close_array().unwrap();
    enc.text("pi").unwrap();
    enc.f64(1.5).unwrap();
    enc.close_map().unwrap();
    let original = enc.finish_bytes().unwrap().to_vec();

    // Decode and re-encode the same tree.
    let mut d = Decoder::new(&original, DecodeMode::Normal);
    let mut out = [0u8; 128];
    let mut enc = Encoder::new(&mut out);
    d.enter_map().unwrap();
    enc.open_map().unwrap();
    enc.text("ints").unwrap();
    enc.open_array().unwrap();
    d.enter_array_from_map_str("ints").unwrap();
    loop {
        match d.i64() {
            Ok(v) => enc.i64(v).unwrap(),
            Err(e) => {
                assert_eq!(e.code, ErrorCode::NoMoreItems);
                d.take_last_error();
                break;
            }
        }
    }
    d.exit_array().unwrap();
    enc.close_array().unwrap();
    enc.text("pi").unwrap();
    enc.f64(d.f64_in_map_str("pi").unwrap()).unwrap();
    enc.close_map().unwrap();
    d.exit_map().unwrap();
    d.finish().unwrap();

    assert_eq!(enc.finish_bytes().unwrap(), original.as_slice());
}

#[test]
fn sticky_errors_do_not_change_finish() {
    let bytes = hex!("a1616101");
    let finish_code = |extra_calls: usize| {
        let mut d = Decoder::new(&bytes, DecodeMode::Normal);
        d.enter_map().unwrap();
        let _ = d.i64_in_map_str("nope");
        for _ in 0..extra_calls {
            let _ = d.bool_in_map(7);
            let _ = d.exit_array();
            let _ = d.text_in_map_str("also nope");
        }
        d.finish().unwrap_err().code
    };
    assert_eq!(finish_code(0), ErrorCode::LabelNotFound);
    assert_eq!(finish_code(0), finish_code(5));
}

#[test]
fn error_bands_classify() {
    use picocbor::ErrorCode as E;
    for code in [E::BadType7, E::ExtraBytes, E::Unsupported, E::BadInt] {
        assert!(code.is_not_well_formed());
        assert!(!code.is_unrecoverable());
    }
    for code in [E::IndefiniteStringChunk, E::HitEnd, E::BadBreak] {
        assert!(code.is_not_well_formed());
        assert!(code.is_unrecoverable());
    }
    for code in [E::InputTooLarge, E::MapLabelType, E::NoStringAllocator] {
        assert!(!code.is_not_well_formed());
        assert!(code.is_unrecoverable());
    }
    for code in [
        E::UnexpectedType,
        E::DuplicateLabel,
        E::LabelNotFound,
        E::NoMoreItems,
        E::ConversionUnderOverFlow,
        E::ExitMismatch,
    ] {
        assert!(!code.is_not_well_formed());
        assert!(!code.is_unrecoverable());
    }
    for code in [E::BufferTooSmall, E::CloseMismatch, E::ArrayTooLong] {
        assert!(!code.is_not_well_formed());
        assert!(!code.is_unrecoverable());
    }
}

#[test]
fn error_display_is_stable() {
    let err = picocbor::Error::new(ErrorCode::DuplicateLabel, 12);
    assert_eq!(format!("{err}"), "cbor error at 12: duplicate map label");
    assert_eq!(ErrorCode::DuplicateLabel.code(), 62);
}
