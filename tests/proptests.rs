// Property tests for encode/decode roundtrips.
//
// These are intentionally conservative in size and depth to keep CI fast.
#![allow(clippy::unwrap_used, clippy::expect_used)]

use proptest::prelude::*;

use picocbor::{DecodeMode, DecodedItem, Decoder, Encoder, Error, ErrorCode, Label, Value};

#[derive(Debug, Clone, PartialEq)]
enum Item {
    Int(i64),
    UInt(u64),
    Bytes(Vec<u8>),
    Text(String),
    Bool(bool),
    Null,
    Double(f64),
    Array(Vec<Item>),
    Map(Vec<(String, Item)>),
}

fn arb_leaf() -> impl Strategy<Value = Item> {
    prop_oneof![
        any::<i64>().prop_map(Item::Int),
        (i64::MAX as u64 + 1..=u64::MAX).prop_map(Item::UInt),
        prop_oneof![
            Just(0_i64),
            Just(23),
            Just(24),
            Just(255),
            Just(256),
            Just(65_535),
            Just(65_536),
            Just(-24),
            Just(-25),
        ]
        .prop_map(Item::Int),
        proptest::collection::vec(any::<u8>(), 0..=40).prop_map(Item::Bytes),
        "[a-z]{0,24}".prop_map(Item::Text),
        any::<bool>().prop_map(Item::Bool),
        Just(Item::Null),
        any::<f64>()
            .prop_filter("NaN does not compare", |f| !f.is_nan())
            .prop_map(Item::Double),
        prop_oneof![Just(0.0_f64), Just(1.5), Just(65504.0), Just(1.1), Just(-0.0)]
            .prop_map(Item::Double),
    ]
}

fn arb_item() -> impl Strategy<Value = Item> {
    arb_leaf().prop_recursive(3, 24, 6, |inner| {
        prop_oneof![
            proptest::collection::vec(inner.clone(), 0..=6).prop_map(Item::Array),
            proptest::collection::btree_map("[a-z]{0,8}", inner, 0..=6)
                .prop_map(|m| Item::Map(m.into_iter().collect())),
        ]
    })
}

fn encode_item(enc: &mut Encoder<'_>, item: &Item) -> Result<(), Error> {
    match item {
        Item::Int(v) => enc.i64(*v),
        Item::UInt(v) => enc.u64(*v),
        Item::Bytes(b) => enc.bytes(b),
        Item::Text(s) => enc.text(s),
        Item::Bool(b) => enc.bool(*b),
        Item::Null => enc.null(),
        Item::Double(v) => enc.f64(*v),
        Item::Array(items) => {
            enc.open_array()?;
            for child in items {
                encode_item(enc, child)?;
            }
            enc.close_array()
        }
        Item::Map(entries) => {
            enc.open_map()?;
            for (key, value) in entries {
                enc.text(key)?;
                encode_item(enc, value)?;
            }
            enc.close_map()
        }
    }
}

fn encode_to_vec(item: &Item) -> Vec<u8> {
    let mut buf = vec![0u8; 1 << 16];
    let mut enc = Encoder::new(&mut buf);
    encode_item(&mut enc, item).unwrap();
    let len = enc.finish().unwrap();
    buf.truncate(len);
    buf
}

fn rebuild(d: &mut Decoder<'_>, head: &DecodedItem<'_>) -> Item {
    match head.value {
        Value::Int64(v) => Item::Int(v),
        Value::UInt64(v) => Item::UInt(v),
        Value::ByteString(b) => Item::Bytes(b.to_vec()),
        Value::TextString(t) => Item::Text(String::from_utf8(t.to_vec()).unwrap()),
        Value::Bool(b) => Item::Bool(b),
        Value::Null => Item::Null,
        Value::Double(v) => Item::Double(v),
        Value::Array(n) => {
            let mut items = Vec::new();
            for _ in 0..n {
                let child = d.next_item().unwrap();
                items.push(rebuild(d, &child));
            }
            Item::Array(items)
        }
        Value::Map(n) => {
            let mut entries = Vec::new();
            for _ in 0..n {
                let entry = d.next_item().unwrap();
                let Label::TextString(key) = entry.label else {
                    panic!("generated maps use text labels");
                };
                let key = String::from_utf8(key.to_vec()).unwrap();
                entries.push((key, rebuild(d, &entry)));
            }
            Item::Map(entries)
        }
        other => panic!("unexpected value {other:?}"),
    }
}

proptest! {
    #[test]
    fn roundtrip_preserves_tree(item in arb_item()) {
        let encoded = encode_to_vec(&item);

        let mut d = Decoder::new(&encoded, DecodeMode::Normal);
        let head = d.next_item().unwrap();
        let rebuilt = rebuild(&mut d, &head);
        prop_assert_eq!(d.next_item().unwrap_err().code, ErrorCode::NoMoreItems);
        d.finish().unwrap();

        prop_assert_eq!(&rebuilt, &item);

        // Preferred encodings re-encode byte-for-byte.
        prop_assert_eq!(encode_to_vec(&rebuilt), encoded);
    }

    #[test]
    fn size_only_agrees_with_buffered(item in arb_item()) {
        let encoded = encode_to_vec(&item);
        let mut size_enc = Encoder::size_only();
        encode_item(&mut size_enc, &item).unwrap();
        prop_assert_eq!(size_enc.finish().unwrap(), encoded.len());
    }

    #[test]
    fn nesting_levels_parenthesise(item in arb_item()) {
        let encoded = encode_to_vec(&item);
        let mut d = Decoder::new(&encoded, DecodeMode::Normal);
        let mut current = 0u8;
        loop {
            match d.next_item() {
                Ok(item) => {
                    prop_assert_eq!(item.nest_level, current);
                    prop_assert!(item.next_nest_level <= item.nest_level + 1);
                    current = item.next_nest_level;
                }
                Err(e) => {
                    prop_assert_eq!(e.code, ErrorCode::NoMoreItems);
                    break;
                }
            }
        }
        prop_assert_eq!(current, 0);
        d.finish().unwrap();
    }
}
