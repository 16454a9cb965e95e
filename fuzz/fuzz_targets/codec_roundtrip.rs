#![no_main]
use std::io::Cursor;

use libfuzzer_sys::fuzz_target;
use lossless::{arithmetic, huffman, packbits, rle, Model};

fuzz_target!(|data: &[u8]| {
    let mut encoded = Vec::new();
    rle::encode(data, &mut encoded).unwrap();
    let mut decoded = Vec::new();
    rle::decode(&encoded[..], &mut decoded).unwrap();
    assert_eq!(data, &decoded[..]);

    encoded.clear();
    packbits::encode(data, &mut encoded).unwrap();
    decoded.clear();
    packbits::decode(&encoded[..], &mut decoded).unwrap();
    assert_eq!(data, &decoded[..]);

    encoded.clear();
    huffman::encode(Cursor::new(data), &mut encoded).unwrap();
    decoded.clear();
    huffman::decode(&encoded[..], &mut decoded).unwrap();
    assert_eq!(data, &decoded[..]);

    for model in [Model::Static, Model::Adaptive] {
        encoded.clear();
        arithmetic::encode(Cursor::new(data), &mut encoded, model).unwrap();
        decoded.clear();
        arithmetic::decode(&encoded[..], &mut decoded, model).unwrap();
        assert_eq!(data, &decoded[..]);
    }
});
