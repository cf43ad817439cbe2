use alloc::vec::Vec;

/// Split `payload` into `parts` approximately equal-sized chunks.
///
/// # Panics
///
/// Panics if `parts` is zero.
#[must_use]
pub fn produce_chunks(payload: &[u8], parts: usize) -> Vec<&[u8]> {
    assert!(parts > 0);
    let chunk_size = payload.len().div_ceil(parts).max(1);
    payload.chunks(chunk_size).collect()
}

/// Split `payload` at positions derived from `seeds`: each seed picks the size
/// of the next chunk (at least one byte). Whatever the seeds do not cover
/// becomes the final chunk.
#[must_use]
pub fn split_by_seeds<'a>(payload: &'a [u8], seeds: &[usize]) -> Vec<&'a [u8]> {
    let mut chunks = Vec::new();
    let mut rest = payload;
    for &seed in seeds {
        if rest.is_empty() {
            break;
        }
        let (chunk, tail) = rest.split_at(1 + seed % rest.len());
        chunks.push(chunk);
        rest = tail;
    }
    if !rest.is_empty() {
        chunks.push(rest);
    }
    chunks
}
