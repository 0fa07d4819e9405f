// 缓存编解码
// 值以 JSON 信封存储：`{"v": 1, "shape": "page", "data": ...}`

use serde::{Deserialize, Serialize};

use super::error::CacheError;
use super::payload::{Cacheable, Shape};

/// 信封格式版本，格式变化时递增，旧条目解码失败后按未命中处理
pub const CODEC_VERSION: u8 = 1;

#[derive(Serialize)]
struct EnvelopeRef<'a, V> {
    v: u8,
    shape: Shape,
    data: &'a V,
}

#[derive(Deserialize)]
struct Envelope<V> {
    v: u8,
    shape: Shape,
    data: V,
}

pub fn encode<V: Cacheable>(value: &V) -> Result<Vec<u8>, CacheError> {
    serde_json::to_vec(&EnvelopeRef {
        v: CODEC_VERSION,
        shape: V::SHAPE,
        data: value,
    })
    .map_err(CacheError::Encode)
}

/// 按 `V::SHAPE` 解码；版本或形态不符都视为解码失败
pub fn decode<V: Cacheable>(bytes: &[u8]) -> Result<V, CacheError> {
    let envelope: Envelope<V> =
        serde_json::from_slice(bytes).map_err(|e| CacheError::Decode(e.to_string()))?;

    if envelope.v != CODEC_VERSION {
        return Err(CacheError::Decode(format!(
            "unsupported codec version {} (expected {})",
            envelope.v, CODEC_VERSION
        )));
    }
    if envelope.shape != V::SHAPE {
        return Err(CacheError::Decode(format!(
            "shape mismatch: stored {:?}, requested {:?}",
            envelope.shape,
            V::SHAPE
        )));
    }

    Ok(envelope.data)
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use serde_json::{Value, json};

    use super::*;
    use crate::cache::payload::Projection;
    use crate::database::Pagination;

    #[test]
    fn entity_projection_keeps_its_mapping() {
        let projection = Projection::new(Some(json!({"id": 42, "name": "Ann"})));

        let bytes = encode(&projection).unwrap();
        let decoded: Projection<Value> = decode(&bytes).unwrap();

        assert_eq!(decoded, projection);
    }

    #[test]
    fn empty_projection_is_a_valid_value() {
        let bytes = encode(&Projection::<Value>::new(None)).unwrap();
        let decoded: Projection<Value> = decode(&bytes).unwrap();
        assert!(decoded.is_empty());
    }

    #[test]
    fn page_is_stored_in_a_versioned_envelope() {
        let page = Pagination::from_rows(2, 10, 25, vec![json!({"id": 11})]);

        let bytes = encode(&page).unwrap();
        let raw: Value = serde_json::from_slice(&bytes).unwrap();

        assert_eq!(raw["v"], json!(CODEC_VERSION));
        assert_eq!(raw["shape"], json!("page"));
        assert_eq!(raw["data"]["total_pages"], json!(3));
    }

    #[test]
    fn shape_mismatch_is_a_decode_error() {
        let bytes = encode(&Projection::new(Some(json!({"id": 1})))).unwrap();
        let result = decode::<Pagination<Value>>(&bytes);
        assert!(matches!(result, Err(CacheError::Decode(_))));
    }

    #[test]
    fn unknown_version_is_a_decode_error() {
        let bytes = br#"{"v":99,"shape":"entity","data":{"data":null}}"#;
        let result = decode::<Projection<Value>>(bytes);
        assert!(matches!(result, Err(CacheError::Decode(msg)) if msg.contains("version")));
    }

    #[test]
    fn garbage_is_a_decode_error() {
        let result = decode::<Projection<Value>>(b"\xff\x00not json");
        assert!(matches!(result, Err(CacheError::Decode(_))));
    }

    #[test]
    fn non_string_map_keys_fail_to_encode() {
        let mut data = HashMap::new();
        data.insert(vec![1u8, 2], 3);

        let result = encode(&Projection::new(Some(data)));
        assert!(matches!(result, Err(CacheError::Encode(_))));
    }
}
