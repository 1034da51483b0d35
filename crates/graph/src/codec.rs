use crate::error::{GraphError, Result};
use crate::shard_store::ShardKey;
use crate::types::GraphElement;
use flate2::read::ZlibDecoder;
use flate2::write::ZlibEncoder;
use flate2::Compression;
use std::io::{Read, Write};

/// Prefix of every shard blob; bumped when the payload layout changes.
pub const SHARD_MAGIC: &[u8] = b"CNS1";

pub const DEFAULT_MAX_DECOMPRESSED_BYTES: usize = 256 * 1024 * 1024;

/// Serialize elements to JSON and compress them into a shard blob.
pub fn encode_shard(elements: &[GraphElement]) -> Result<Vec<u8>> {
    let json = serde_json::to_vec(elements)
        .map_err(|err| GraphError::EncodeFailed(format!("serialize elements: {err}")))?;

    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::best());
    encoder
        .write_all(&json)
        .map_err(|err| GraphError::EncodeFailed(format!("compress shard (zlib): {err}")))?;
    let compressed = encoder
        .finish()
        .map_err(|err| GraphError::EncodeFailed(format!("finish shard compression: {err}")))?;

    let mut out = Vec::with_capacity(SHARD_MAGIC.len() + compressed.len());
    out.extend_from_slice(SHARD_MAGIC);
    out.extend_from_slice(&compressed);
    Ok(out)
}

/// Decompress and deserialize a shard blob.
///
/// Both stages run to completion before anything is returned, so a failure
/// never yields a partial element list.
pub fn decode_shard(key: ShardKey, bytes: &[u8], max_len: usize) -> Result<Vec<GraphElement>> {
    let Some(body) = bytes.strip_prefix(SHARD_MAGIC) else {
        return Err(GraphError::decode(key, "missing shard header"));
    };

    let json = decompress_zlib_with_limit(body, max_len)
        .map_err(|reason| GraphError::decode(key, reason))?;

    serde_json::from_slice(&json)
        .map_err(|err| GraphError::decode(key, format!("parse shard json: {err}")))
}

fn decompress_zlib_with_limit(
    bytes: &[u8],
    max_len: usize,
) -> std::result::Result<Vec<u8>, String> {
    let decoder = ZlibDecoder::new(bytes);
    let mut out = Vec::new();
    decoder
        .take(max_len.saturating_add(1) as u64)
        .read_to_end(&mut out)
        .map_err(|err| format!("decompress shard (zlib): {err}"))?;
    if out.len() > max_len {
        return Err(format!("Shard payload too large (over {max_len} bytes)"));
    }
    Ok(out)
}
