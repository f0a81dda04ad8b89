#![no_main]
use huffcode::{compress_bytes, decompress_bytes, HuffmanDecoder, HuffmanEncoder};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Self-describing framing end to end.
    let packed = compress_bytes(data).unwrap();
    let output = decompress_bytes(&packed).unwrap();
    assert_eq!(data, output.as_slice());

    // Raw payload with the tree shared out of band.
    let encoder = HuffmanEncoder::from_bytes(data).unwrap().embed_table(false);
    let packed = encoder.encode_bytes(data).unwrap();
    let decoder = HuffmanDecoder::new(encoder.tree().clone());
    let output = decoder.decode_bytes(&packed).unwrap();
    assert_eq!(data, output.as_slice());

    // A decoder rebuilt from the serialized table must agree.
    let mut table = Vec::new();
    encoder.table().write_to(&mut table).unwrap();
    let parsed = huffcode::CodeTable::read_from(&mut table.as_slice()).unwrap();
    let rebuilt = HuffmanDecoder::new(huffcode::Tree::from_code_table(&parsed).unwrap());
    assert_eq!(data, rebuilt.decode_bytes(&packed).unwrap().as_slice());
});
