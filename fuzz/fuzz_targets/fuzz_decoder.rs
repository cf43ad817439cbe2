#![no_main]

use arbitrary::Arbitrary;
use formstream::{ChunkedSource, Decoder, DecodeError, DecoderOptions, Source, chunk_utils::split_by_seeds};
use libfuzzer_sys::fuzz_target;

type Outcome<E> = Result<Vec<(Vec<u8>, Vec<u8>)>, DecodeError<E>>;

#[derive(Debug, Arbitrary)]
struct Input<'a> {
    /// Window capacity, folded into `1..=64`.
    capacity: u8,
    /// Value read size, folded into `1..=16`.
    read_size: u8,
    seeds: Vec<usize>,
    body: &'a [u8],
}

fn drain<S: Source>(decoder: &mut Decoder<S>, read_size: usize) -> Outcome<S::Error> {
    let mut pairs = Vec::new();
    let mut buf = vec![0u8; read_size];
    while let Some(mut pair) = decoder.next_pair()? {
        let mut value = Vec::new();
        loop {
            match pair.value.read(&mut buf)? {
                0 => break,
                n => value.extend_from_slice(&buf[..n]),
            }
        }
        assert!(pair.value.is_drained());
        pairs.push((pair.key.into(), value));
    }
    Ok(pairs)
}

fuzz_target!(|input: Input<'_>| {
    let options = DecoderOptions {
        window_capacity: 1 + usize::from(input.capacity % 64),
    };
    let read_size = 1 + usize::from(input.read_size % 16);

    let mut whole = Decoder::with_options(input.body, options);
    let expected = drain(&mut whole, 4096);

    let source = ChunkedSource::new(split_by_seeds(input.body, &input.seeds));
    let mut chunked = Decoder::with_options(source, options);
    assert_eq!(drain(&mut chunked, read_size), expected, "chunked");

    let source = ChunkedSource::new(input.body.chunks(1)).with_eager_end();
    let mut bytewise = Decoder::with_options(source, options);
    assert_eq!(drain(&mut bytewise, 1), expected, "bytewise");

    // A key never contains a delimiter, and decoding never grows a value.
    if let Ok(pairs) = &expected {
        for (key, value) in pairs {
            assert!(!key.contains(&b'&') && !key.contains(&b'='));
            assert!(key.len() < options.window_capacity);
            assert!(value.len() <= input.body.len());
        }
    }
});
