use std::io::Cursor;

use lossless::{arithmetic, Model};

fn main() {
    let input: Vec<u8> = b"the quick brown fox jumps over the lazy dog "
        .iter()
        .copied()
        .cycle()
        .take(10_000)
        .collect();

    for _ in 0..1000 {
        for model in [Model::Static, Model::Adaptive] {
            let mut encoded = Vec::new();
            arithmetic::encode(Cursor::new(&input[..]), &mut encoded, model).unwrap();

            let mut decoded = Vec::new();
            arithmetic::decode(&encoded[..], &mut decoded, model).unwrap();
            assert_eq!(input, decoded);
        }
    }
}
