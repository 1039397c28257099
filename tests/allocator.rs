use hex_literal::hex;
use picocbor::{DecodeMode, Decoder, ErrorCode, MemPool, Value};

#[test]
fn mem_pool_minimum_size() {
    let mut tiny = [0u8; 4];
    let err = MemPool::new(&mut tiny).unwrap_err();
    assert_eq!(err.code, ErrorCode::MemPoolSize);
}

#[test]
fn indefinite_text_concatenates_chunks() {
    // "hello" split as "he" + "llo".
    let bytes = hex!("7f6268656c6c6fff");
    let mut pool_buf = [0u8; 64];
    let pool = MemPool::new(&mut pool_buf).unwrap();
    let mut d = Decoder::new(&bytes, DecodeMode::Normal);
    d.set_string_allocator(&pool, false);

    let item = d.next_item().unwrap();
    assert_eq!(item.value, Value::TextString(b"hello"));
    assert!(item.data_allocated);
    d.finish().unwrap();

    // Sealed strings outlive the decoder and the destructed pool.
    assert_eq!(item.value, Value::TextString(b"hello"));
}

#[test]
fn indefinite_bytes_with_empty_chunk_list() {
    let bytes = hex!("5fff");
    let mut pool_buf = [0u8; 16];
    let pool = MemPool::new(&mut pool_buf).unwrap();
    let mut d = Decoder::new(&bytes, DecodeMode::Normal);
    d.set_string_allocator(&pool, false);
    let item = d.next_item().unwrap();
    assert_eq!(item.value, Value::ByteString(&[]));
    assert!(item.data_allocated);
    d.finish().unwrap();
}

#[test]
fn indefinite_string_requires_allocator() {
    let bytes = hex!("5f4101ff");
    let mut d = Decoder::new(&bytes, DecodeMode::Normal);
    assert_eq!(
        d.next_item().unwrap_err().code,
        ErrorCode::NoStringAllocator
    );
}

#[test]
fn indefinite_string_chunk_must_match_major() {
    // A text chunk inside an indefinite byte string.
    let bytes = hex!("5f6161ff");
    let mut pool_buf = [0u8; 16];
    let pool = MemPool::new(&mut pool_buf).unwrap();
    let mut d = Decoder::new(&bytes, DecodeMode::Normal);
    d.set_string_allocator(&pool, false);
    let err = d.next_item().unwrap_err();
    assert_eq!(err.code, ErrorCode::IndefiniteStringChunk);
    assert!(err.is_unrecoverable());

    // A nested indefinite chunk is just as bad.
    let bytes = hex!("5f5f4101ffff");
    let pool = MemPool::new(&mut pool_buf).unwrap();
    let mut d = Decoder::new(&bytes, DecodeMode::Normal);
    d.set_string_allocator(&pool, false);
    assert_eq!(
        d.next_item().unwrap_err().code,
        ErrorCode::IndefiniteStringChunk
    );
}

#[test]
fn pool_exhaustion() {
    // Eight chunks of eight bytes need 64 bytes of pool.
    let mut encoded = vec![0x5f];
    for _ in 0..8 {
        encoded.push(0x48);
        encoded.extend_from_slice(&[0xab; 8]);
    }
    encoded.push(0xff);

    let mut pool_buf = [0u8; 16];
    let pool = MemPool::new(&mut pool_buf).unwrap();
    let mut d = Decoder::new(&encoded, DecodeMode::Normal);
    d.set_string_allocator(&pool, false);
    assert_eq!(d.next_item().unwrap_err().code, ErrorCode::StringAllocate);
}

#[test]
fn all_strings_mode_copies_definite_strings() {
    let bytes = hex!("626869");
    let mut pool_buf = [0u8; 32];
    let pool = MemPool::new(&mut pool_buf).unwrap();
    let mut d = Decoder::new(&bytes, DecodeMode::Normal);
    d.set_string_allocator(&pool, true);
    let item = d.next_item().unwrap();
    assert_eq!(item.value, Value::TextString(b"hi"));
    assert!(item.data_allocated);
    d.finish().unwrap();
}

#[test]
fn indefinite_label_is_marked_allocated() {
    // {("a" as an indefinite text): 1}
    let bytes = hex!("bf7f6161ff01ff");
    let mut pool_buf = [0u8; 32];
    let pool = MemPool::new(&mut pool_buf).unwrap();
    let mut d = Decoder::new(&bytes, DecodeMode::Normal);
    d.set_string_allocator(&pool, false);
    d.next_item().unwrap();
    let item = d.next_item().unwrap();
    assert_eq!(item.label, picocbor::Label::TextString(b"a"));
    assert!(item.label_allocated);
    assert!(!item.data_allocated);
    assert_eq!(item.value, Value::Int64(1));
    d.finish().unwrap();
}

#[test]
fn multiple_allocated_strings_stay_valid() {
    // ["ab"+"c", "de"+"f"] as indefinite texts.
    let bytes = hex!("827f62616261" "63ff7f626465" "6166ff");
    let mut pool_buf = [0u8; 64];
    let pool = MemPool::new(&mut pool_buf).unwrap();
    let mut d = Decoder::new(&bytes, DecodeMode::Normal);
    d.set_string_allocator(&pool, false);
    d.next_item().unwrap();
    let first = d.next_item().unwrap();
    let second = d.next_item().unwrap();
    assert_eq!(first.value, Value::TextString(b"abc"));
    assert_eq!(second.value, Value::TextString(b"def"));
    d.finish().unwrap();
}
