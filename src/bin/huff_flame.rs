use huffcode::{HuffmanDecoder, HuffmanEncoder};

fn main() {
    let input: Vec<u8> = (0..64 * 1024)
        .map(|i| match i % 10 {
            0..=5 => b'a',
            6..=8 => b'b',
            _ => (i % 256) as u8,
        })
        .collect();

    let encoder = HuffmanEncoder::from_bytes(&input).unwrap().embed_table(false);
    let decoder = HuffmanDecoder::new(encoder.tree().clone());

    for _ in 0..1000 {
        let packed = encoder.encode_bytes(&input).unwrap();
        let output = decoder.decode_bytes(&packed).unwrap();
        assert_eq!(input.len(), output.len());
    }
}
