use hex_literal::hex;
use picocbor::{Convert, DecodeMode, Decoder, ErrorCode};

fn decoder(bytes: &[u8]) -> Decoder<'_> {
    Decoder::new(bytes, DecodeMode::Normal)
}

#[test]
fn i64_from_integers() {
    let bytes = hex!("0c");
    assert_eq!(decoder(&bytes).i64().unwrap(), 12);

    let bytes = hex!("29");
    assert_eq!(decoder(&bytes).i64().unwrap(), -10);

    let bytes = hex!("1bffffffffffffffff");
    assert_eq!(
        decoder(&bytes).i64().unwrap_err().code,
        ErrorCode::ConversionUnderOverFlow
    );
}

#[test]
fn i64_rejects_other_kinds_without_options() {
    let bytes = hex!("f93c00");
    assert_eq!(
        decoder(&bytes).i64().unwrap_err().code,
        ErrorCode::UnexpectedType
    );
    let bytes = hex!("6161");
    assert_eq!(
        decoder(&bytes).i64().unwrap_err().code,
        ErrorCode::UnexpectedType
    );
}

#[test]
fn i64_from_float_rounds_ties_to_even() {
    let cases: &[(&[u8], i64)] = &[
        (&hex!("f94100"), 2),  // 2.5 -> 2
        (&hex!("f94300"), 4),  // 3.5 -> 4
        (&hex!("f9c100"), -2), // -2.5 -> -2
        (&hex!("fb4010666666666666"), 4), // 4.1
        (&hex!("fbc010666666666666"), -4), // -4.1
    ];
    for (bytes, expected) in cases {
        let got = decoder(bytes)
            .i64_convert(Convert::XINT64 | Convert::FLOAT)
            .unwrap();
        assert_eq!(got, *expected);
    }
}

#[test]
fn i64_from_nan_is_float_exception() {
    let bytes = hex!("f97e00");
    assert_eq!(
        decoder(&bytes)
            .i64_convert(Convert::XINT64 | Convert::FLOAT)
            .unwrap_err()
            .code,
        ErrorCode::FloatException
    );
}

#[test]
fn i64_from_bignum() {
    // 256 as a positive bignum.
    let bytes = hex!("c2420100");
    assert_eq!(
        decoder(&bytes)
            .i64_convert(Convert::XINT64 | Convert::BIG_NUM)
            .unwrap(),
        256
    );

    // -257 as a negative bignum.
    let bytes = hex!("c3420100");
    assert_eq!(
        decoder(&bytes)
            .i64_convert(Convert::XINT64 | Convert::BIG_NUM)
            .unwrap(),
        -257
    );

    // Nine significant bytes cannot fit.
    let bytes = hex!("c249010000000000000000");
    assert_eq!(
        decoder(&bytes)
            .i64_convert(Convert::BIG_NUM)
            .unwrap_err()
            .code,
        ErrorCode::ConversionUnderOverFlow
    );

    // Without the BIG_NUM option the kind is simply wrong.
    let bytes = hex!("c2420100");
    assert_eq!(
        decoder(&bytes).i64_convert(Convert::XINT64).unwrap_err().code,
        ErrorCode::UnexpectedType
    );
}

#[test]
fn i64_from_decimal_fraction() {
    // 15 * 10^2.
    let bytes = hex!("c482020f");
    assert_eq!(
        decoder(&bytes)
            .i64_convert(Convert::DECIMAL_FRACTION)
            .unwrap(),
        1500
    );

    // 1500 * 10^-2.
    let bytes = hex!("c482211905dc");
    assert_eq!(
        decoder(&bytes)
            .i64_convert(Convert::DECIMAL_FRACTION)
            .unwrap(),
        15
    );

    // 273.15 does not divide exactly.
    let bytes = hex!("c48221196ab3");
    assert_eq!(
        decoder(&bytes)
            .i64_convert(Convert::DECIMAL_FRACTION)
            .unwrap_err()
            .code,
        ErrorCode::ConversionUnderOverFlow
    );
}

#[test]
fn i64_from_big_float() {
    // 3 * 2^2.
    let bytes = hex!("c5820203");
    assert_eq!(
        decoder(&bytes).i64_convert(Convert::BIG_FLOAT).unwrap(),
        12
    );
}

#[test]
fn u64_sign_discipline() {
    let bytes = hex!("20");
    assert_eq!(
        decoder(&bytes).u64().unwrap_err().code,
        ErrorCode::NumberSignConversion
    );

    let bytes = hex!("1bffffffffffffffff");
    assert_eq!(decoder(&bytes).u64().unwrap(), u64::MAX);

    let bytes = hex!("c3420100");
    assert_eq!(
        decoder(&bytes)
            .u64_convert(Convert::BIG_NUM)
            .unwrap_err()
            .code,
        ErrorCode::NumberSignConversion
    );

    // -1.5 to unsigned.
    let bytes = hex!("f9be00");
    assert_eq!(
        decoder(&bytes)
            .u64_convert(Convert::FLOAT)
            .unwrap_err()
            .code,
        ErrorCode::NumberSignConversion
    );
}

#[test]
fn f64_from_numeric_kinds() {
    let bytes = hex!("0c");
    assert_eq!(
        decoder(&bytes)
            .f64_convert(Convert::FLOAT | Convert::XINT64)
            .unwrap(),
        12.0
    );

    let bytes = hex!("c2420100");
    assert_eq!(
        decoder(&bytes).f64_convert(Convert::BIG_NUM).unwrap(),
        256.0
    );

    let bytes = hex!("c3420100");
    assert_eq!(
        decoder(&bytes).f64_convert(Convert::BIG_NUM).unwrap(),
        -257.0
    );

    // 273.15 via a decimal fraction.
    let bytes = hex!("c48221196ab3");
    let got = decoder(&bytes)
        .f64_convert(Convert::DECIMAL_FRACTION)
        .unwrap();
    assert!((got - 273.15).abs() < 1e-9);

    // 1.5 via a big float.
    let bytes = hex!("c5822003");
    assert_eq!(
        decoder(&bytes).f64_convert(Convert::BIG_FLOAT).unwrap(),
        1.5
    );
}

#[test]
fn f64_clamps_on_overflow_and_underflow() {
    // 1 * 10^400 overflows to infinity.
    let bytes = hex!("c48219019001");
    let got = decoder(&bytes)
        .f64_convert(Convert::DECIMAL_FRACTION)
        .unwrap();
    assert!(got.is_infinite() && got.is_sign_positive());

    // 1 * 10^-400 underflows to zero.
    let bytes = hex!("c48239018f01");
    let got = decoder(&bytes)
        .f64_convert(Convert::DECIMAL_FRACTION)
        .unwrap();
    assert_eq!(got, 0.0);
}

#[test]
fn int_to_float_precision_loss_is_silent() {
    // 2^63 - 1 is not representable; the conversion still succeeds.
    let bytes = hex!("1b7fffffffffffffff");
    let got = decoder(&bytes)
        .f64_convert(Convert::XINT64)
        .unwrap();
    assert_eq!(got, 9.223_372_036_854_776e18);
}

#[test]
fn conversion_errors_are_sticky() {
    let bytes = hex!("6161");
    let mut d = decoder(&bytes);
    let err = d.i64().unwrap_err();
    assert_eq!(err.code, ErrorCode::UnexpectedType);
    assert_eq!(d.finish().unwrap_err(), err);
}
