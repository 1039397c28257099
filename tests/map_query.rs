use hex_literal::hex;
use picocbor::{
    DecodeMode, Decoder, ErrorCode, ItemType, Label, MapQueryEntry, Value,
};

fn decoder(bytes: &[u8]) -> Decoder<'_> {
    Decoder::new(bytes, DecodeMode::Normal)
}

// {"first": 1, "second": [10, 11], "third": "x", 7: true}
const SAMPLE: [u8; 28] = hex!("a465666972737401667365636f6e64820a0b657468697264617807f5");

#[test]
fn lookup_by_text_label() {
    let mut d = decoder(&SAMPLE);
    d.enter_map().unwrap();
    assert_eq!(d.i64_in_map_str("first").unwrap(), 1);
    assert_eq!(d.text_in_map_str("third").unwrap(), "x");
    assert_eq!(d.bool_in_map(7).unwrap(), true);
    d.exit_map().unwrap();
    d.finish().unwrap();
}

#[test]
fn lookup_order_is_free() {
    let mut d = decoder(&SAMPLE);
    d.enter_map().unwrap();
    assert_eq!(d.bool_in_map(7).unwrap(), true);
    assert_eq!(d.i64_in_map_str("first").unwrap(), 1);
    assert_eq!(d.i64_in_map_str("first").unwrap(), 1);
    d.exit_map().unwrap();
    d.finish().unwrap();
}

#[test]
fn lookup_label_not_found() {
    let mut d = decoder(&SAMPLE);
    d.enter_map().unwrap();
    let err = d.i64_in_map_str("missing").unwrap_err();
    assert_eq!(err.code, ErrorCode::LabelNotFound);
}

#[test]
fn lookup_unexpected_type() {
    let mut d = decoder(&SAMPLE);
    d.enter_map().unwrap();
    let err = d
        .item_in_map_str("first", ItemType::TextString)
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::UnexpectedType);
}

#[test]
fn lookup_without_entered_map() {
    let mut d = decoder(&SAMPLE);
    let err = d.i64_in_map_str("first").unwrap_err();
    assert_eq!(err.code, ErrorCode::MapNotEntered);
}

#[test]
fn duplicate_label_detected_for_any_lookup() {
    // {"a": 1, "b": 2, "a": 3}
    let bytes = hex!("a3616101616202616103");
    for probe in ["a", "b"] {
        let mut d = decoder(&bytes);
        d.enter_map().unwrap();
        let result = d.item_in_map_str(probe, ItemType::Any);
        if probe == "a" {
            assert_eq!(result.unwrap_err().code, ErrorCode::DuplicateLabel);
        } else {
            // The scan still covers the whole map, so the duplicate of "a"
            // is only an error when "a" is the label sought.
            assert_eq!(result.unwrap().value, Value::Int64(2));
        }
    }
}

#[test]
fn numeric_labels_match_across_signedness() {
    // {1: "x"} with the label encoded as a uint.
    let bytes = hex!("a1016178");
    let mut d = decoder(&bytes);
    d.enter_map().unwrap();
    let item = d.item_in_map(1, ItemType::TextString).unwrap();
    assert_eq!(item.value, Value::TextString(b"x"));
}

#[test]
fn enter_nested_containers_by_label() {
    // {"cfg": {"depth": 3}, "ids": [5, 6]}
    let bytes = hex!("a263636667a16564657074680363696473820506");
    let mut d = decoder(&bytes);
    d.enter_map().unwrap();

    d.enter_map_from_map_str("cfg").unwrap();
    assert_eq!(d.i64_in_map_str("depth").unwrap(), 3);
    d.exit_map().unwrap();

    let head = d.enter_array_from_map_str("ids").unwrap();
    assert_eq!(head.value, Value::Array(2));
    assert_eq!(d.i64().unwrap(), 5);
    assert_eq!(d.i64().unwrap(), 6);
    let err = d.i64().unwrap_err();
    assert_eq!(err.code, ErrorCode::NoMoreItems);
    d.take_last_error();
    d.exit_array().unwrap();

    d.exit_map().unwrap();
    d.finish().unwrap();
}

#[test]
fn enter_from_map_type_checked() {
    let mut d = decoder(&SAMPLE);
    d.enter_map().unwrap();
    let err = d.enter_map_from_map_str("first").unwrap_err();
    assert_eq!(err.code, ErrorCode::UnexpectedType);
}

#[test]
fn sequential_traversal_stops_at_container_end() {
    let mut d = decoder(&SAMPLE);
    d.enter_map().unwrap();
    let mut entries = 0;
    loop {
        match d.next_item() {
            Ok(item) => {
                entries += 1;
                // Skip the children of container-valued entries.
                if item.next_nest_level > item.nest_level {
                    while d.next_item().unwrap().next_nest_level > item.nest_level {}
                }
            }
            Err(e) => {
                assert_eq!(e.code, ErrorCode::NoMoreItems);
                break;
            }
        }
    }
    assert_eq!(entries, 4);
    d.exit_map().unwrap();
    d.finish().unwrap();
}

#[test]
fn rewind_restarts_entered_container() {
    let bytes = hex!("83010203");
    let mut d = decoder(&bytes);
    d.enter_array().unwrap();
    assert_eq!(d.i64().unwrap(), 1);
    assert_eq!(d.i64().unwrap(), 2);
    d.rewind();
    assert_eq!(d.i64().unwrap(), 1);
    assert_eq!(d.i64().unwrap(), 2);
    assert_eq!(d.i64().unwrap(), 3);
    d.exit_array().unwrap();
    d.finish().unwrap();
}

#[test]
fn rewind_without_enter_restarts_input() {
    let bytes = hex!("0102");
    let mut d = decoder(&bytes);
    assert_eq!(d.i64().unwrap(), 1);
    d.rewind();
    assert_eq!(d.i64().unwrap(), 1);
    assert_eq!(d.i64().unwrap(), 2);
    d.finish().unwrap();
}

#[test]
fn exit_skips_unconsumed_entries() {
    let mut d = decoder(&SAMPLE);
    d.enter_map().unwrap();
    d.exit_map().unwrap();
    d.finish().unwrap();
}

#[test]
fn exit_mismatch() {
    let mut d = decoder(&SAMPLE);
    d.enter_map().unwrap();
    let err = d.exit_array().unwrap_err();
    assert_eq!(err.code, ErrorCode::ExitMismatch);
}

#[test]
fn enter_unexpected_type() {
    let bytes = hex!("01");
    let mut d = decoder(&bytes);
    let err = d.enter_map().unwrap_err();
    assert_eq!(err.code, ErrorCode::UnexpectedType);
}

#[test]
fn enter_empty_map() {
    let bytes = hex!("a0");
    let mut d = decoder(&bytes);
    d.enter_map().unwrap();
    let err = d.next_item().unwrap_err();
    assert_eq!(err.code, ErrorCode::NoMoreItems);
    d.exit_map().unwrap();
    d.finish().unwrap();
}

#[test]
fn enter_indefinite_map() {
    let bytes = hex!("bf616101616202ff");
    let mut d = decoder(&bytes);
    d.enter_map().unwrap();
    assert_eq!(d.i64_in_map_str("b").unwrap(), 2);
    assert_eq!(d.i64_in_map_str("a").unwrap(), 1);
    d.exit_map().unwrap();
    d.finish().unwrap();
}

#[test]
fn sticky_error_discipline() {
    let mut d = decoder(&SAMPLE);
    d.enter_map().unwrap();
    let first = d.i64_in_map_str("missing").unwrap_err();
    assert_eq!(first.code, ErrorCode::LabelNotFound);

    // Everything afterward is a no-op returning the same error.
    assert_eq!(d.i64_in_map_str("first").unwrap_err(), first);
    assert_eq!(d.bool_in_map(7).unwrap_err(), first);
    assert_eq!(d.exit_map().unwrap_err(), first);
    assert_eq!(d.last_error(), Some(first));

    let err = d.finish().unwrap_err();
    assert_eq!(err, first);
}

#[test]
fn sticky_error_reset_resumes() {
    let mut d = decoder(&SAMPLE);
    d.enter_map().unwrap();
    d.i64_in_map_str("missing").unwrap_err();
    assert_eq!(d.take_last_error().unwrap().code, ErrorCode::LabelNotFound);
    assert_eq!(d.i64_in_map_str("first").unwrap(), 1);
    d.exit_map().unwrap();
    d.finish().unwrap();
}

#[test]
fn batch_lookup() {
    let mut d = decoder(&SAMPLE);
    d.enter_map().unwrap();
    let mut queries = [
        MapQueryEntry::new(Label::TextString(b"first"), ItemType::Int64),
        MapQueryEntry::new(Label::Int64(7), ItemType::Bool),
        MapQueryEntry::new(Label::TextString(b"third"), ItemType::Any),
    ];
    d.items_in_map(&mut queries).unwrap();
    assert_eq!(queries[0].item.unwrap().value, Value::Int64(1));
    assert_eq!(queries[1].item.unwrap().value, Value::Bool(true));
    assert_eq!(queries[2].item.unwrap().value, Value::TextString(b"x"));
    d.exit_map().unwrap();
    d.finish().unwrap();
}

#[test]
fn batch_lookup_missing_label() {
    let mut d = decoder(&SAMPLE);
    d.enter_map().unwrap();
    let mut queries = [MapQueryEntry::new(
        Label::TextString(b"missing"),
        ItemType::Any,
    )];
    let err = d.items_in_map(&mut queries).unwrap_err();
    assert_eq!(err.code, ErrorCode::LabelNotFound);
}

#[test]
fn batch_lookup_duplicate() {
    let bytes = hex!("a3616101616202616103");
    let mut d = decoder(&bytes);
    d.enter_map().unwrap();
    let mut queries = [MapQueryEntry::new(Label::TextString(b"a"), ItemType::Any)];
    let err = d.items_in_map(&mut queries).unwrap_err();
    assert_eq!(err.code, ErrorCode::DuplicateLabel);
}

#[test]
fn batch_lookup_callback_sees_unmatched() {
    let mut d = decoder(&SAMPLE);
    d.enter_map().unwrap();
    let mut queries = [MapQueryEntry::new(
        Label::TextString(b"first"),
        ItemType::Int64,
    )];
    let mut unmatched = 0;
    d.items_in_map_with_callback(&mut queries, |_| {
        unmatched += 1;
        Ok(())
    })
    .unwrap();
    assert_eq!(unmatched, 3);
    d.exit_map().unwrap();
    d.finish().unwrap();
}

#[test]
fn bstr_wrap_roundtrip() {
    // An array whose second element wraps an encoded map.
    let mut buf = [0u8; 64];
    let mut enc = picocbor::Encoder::new(&mut buf);
    enc.open_array().unwrap();
    enc.u64(9).unwrap();
    enc.open_bytes_wrap().unwrap();
    enc.open_map().unwrap();
    enc.text("k").unwrap();
    enc.u64(1).unwrap();
    enc.close_map().unwrap();
    enc.close_bytes_wrap().unwrap();
    enc.close_array().unwrap();
    let len = enc.finish().unwrap();

    let mut d = decoder(&buf[..len]);
    d.enter_array().unwrap();
    assert_eq!(d.u64().unwrap(), 9);
    d.enter_bstr_wrapped().unwrap();
    d.enter_map().unwrap();
    assert_eq!(d.u64_in_map_str("k").unwrap(), 1);
    d.exit_map().unwrap();
    d.exit_bstr_wrapped().unwrap();
    d.exit_array().unwrap();
    d.finish().unwrap();
}

#[test]
fn map_as_array_containers_enter_as_arrays() {
    let bytes = hex!("a2016178216179");
    let mut d = Decoder::new(&bytes, DecodeMode::MapAsArray);
    let head = d.enter_array().unwrap();
    assert_eq!(head.value, Value::MapAsArray(4));
    assert_eq!(d.i64().unwrap(), 1);
    assert_eq!(d.text().unwrap(), "x");
    assert_eq!(d.i64().unwrap(), -2);
    assert_eq!(d.text().unwrap(), "y");
    d.exit_array().unwrap();
    d.finish().unwrap();
}
