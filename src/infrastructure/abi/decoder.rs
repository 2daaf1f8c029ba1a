//! ABI decoder implementation using alloy-dyn-abi

use alloy_dyn_abi::{DynSolType, DynSolValue};
use alloy_primitives::{Address, B256, U256};

use crate::domain::abi::{
    has_log_data, AbiDecoder, AbiRegistry, DecodeError, DecodedArguments, DecodedCall, DecodedLog,
    DecodedTopic, LogEntry, ParamSpec,
};

/// ABI decoder implementation using alloy-dyn-abi
#[derive(Debug, Clone)]
pub struct AlloyAbiDecoder {
    registry: AbiRegistry,
}

impl AlloyAbiDecoder {
    /// Create a new decoder with the given registry
    pub fn new(registry: AbiRegistry) -> Self {
        Self { registry }
    }
}

impl AbiDecoder for AlloyAbiDecoder {
    fn decode_calldata(&self, data: &[u8]) -> Result<DecodedCall, DecodeError> {
        if data.len() < 4 {
            return Err(DecodeError::InputTooShort(data.len()));
        }

        let mut selector = [0u8; 4];
        selector.copy_from_slice(&data[..4]);

        let method = self
            .registry
            .method(selector)
            .ok_or_else(|| DecodeError::UnknownSelector(selector.to_vec()))?;

        let params: Vec<(usize, &ParamSpec)> = method.inputs.iter().enumerate().collect();
        let arguments = decode_params(&params, &data[4..], &method.name)?;

        tracing::trace!(
            "Decoded method call: {} with {} arguments",
            method.name,
            arguments.len()
        );

        Ok(DecodedCall {
            method_name: method.name.clone(),
            signature: method.signature.clone(),
            arguments,
        })
    }

    fn decode_log(&self, log: &LogEntry) -> Result<DecodedLog, DecodeError> {
        let topic0 = log.topics.first().ok_or(DecodeError::MissingEventTopic)?;

        let event = self
            .registry
            .event(topic0)
            .ok_or_else(|| DecodeError::UnknownSelector(topic0.to_vec()))?;

        let indexed_topics = &log.topics[1..];
        if indexed_topics.len() > event.indexed_count() {
            return Err(DecodeError::IndexedParamMismatch {
                event: event.name.clone(),
                topics: log.topics.len(),
                indexed: event.indexed_count(),
            });
        }

        let indexed_params: Vec<(usize, &ParamSpec)> = event.indexed_inputs().collect();

        let indexed = indexed_topics
            .iter()
            .zip(&indexed_params)
            .map(|(topic, (position, param))| -> Result<DecodedTopic, DecodeError> {
                Ok(DecodedTopic {
                    name: param.display_name(*position),
                    kind: param.kind.clone(),
                    value: decode_topic(param, topic)?,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let data = if has_log_data(&log.data) {
            let data_params: Vec<(usize, &ParamSpec)> = event.data_inputs().collect();
            decode_params(&data_params, &log.data, &event.name)?
        } else {
            tracing::trace!(
                event = %event.name,
                data_len = log.data.len(),
                "Skipping data payload"
            );
            DecodedArguments::new()
        };

        tracing::trace!(
            "Decoded event: {} with {} indexed and {} data params",
            event.name,
            indexed.len(),
            data.len()
        );

        Ok(DecodedLog {
            event_name: event.name.clone(),
            signature: event.signature.clone(),
            address: log.address,
            indexed,
            data,
            topics: log.topics.clone(),
            raw_data: log.data.clone(),
            log_index: log.log_index,
        })
    }
}

/// Parse a parameter's declared type
fn param_type(param: &ParamSpec, context: &str) -> Result<DynSolType, DecodeError> {
    param.kind.parse::<DynSolType>().map_err(|e| {
        DecodeError::decode(
            context,
            format!("failed to parse type '{}' for param '{}': {}", param.kind, param.name, e),
        )
    })
}

/// Decode an ABI-encoded parameter tuple into a name-value mapping
///
/// `params` pairs each parameter with its declaration position so unnamed
/// parameters keep a stable `arg{n}` key.
fn decode_params(
    params: &[(usize, &ParamSpec)],
    data: &[u8],
    context: &str,
) -> Result<DecodedArguments, DecodeError> {
    if params.is_empty() {
        return Ok(DecodedArguments::new());
    }

    let types = params
        .iter()
        .map(|(_, param)| param_type(param, context))
        .collect::<Result<Vec<_>, _>>()?;

    let decoded = DynSolType::Tuple(types)
        .abi_decode_params(data)
        .map_err(|e| DecodeError::decode(context, e))?;

    // Extract individual values from the tuple
    let values = match decoded {
        DynSolValue::Tuple(values) => values,
        other => vec![other],
    };

    if values.len() != params.len() {
        return Err(DecodeError::decode(
            context,
            format!("expected {} values, decoded {}", params.len(), values.len()),
        ));
    }

    Ok(params
        .iter()
        .zip(values)
        .map(|((position, param), value)| (param.display_name(*position), value))
        .collect())
}

/// Decode a single indexed topic word
///
/// Unsigned integers take the whole word big-endian and addresses its low
/// 20 bytes. Reference types are stored as the keccak256 of their encoding,
/// so the original value is unrecoverable and the raw word is returned.
fn decode_topic(param: &ParamSpec, topic: &B256) -> Result<DynSolValue, DecodeError> {
    let context = format!("indexed param '{}'", param.name);
    let ty = param_type(param, &context)?;
    match ty {
        DynSolType::Uint(size) => Ok(DynSolValue::Uint(U256::from_be_slice(topic.as_slice()), size)),
        DynSolType::Address => Ok(DynSolValue::Address(Address::from_word(*topic))),
        DynSolType::String
        | DynSolType::Bytes
        | DynSolType::Array(_)
        | DynSolType::FixedArray(..)
        | DynSolType::Tuple(_) => Ok(DynSolValue::FixedBytes(*topic, 32)),
        ty => ty
            .abi_decode(topic.as_slice())
            .map_err(|e| DecodeError::decode(context, e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::abi::{EventSignature, MethodSignature};
    use alloy_primitives::{address, b256, Bytes};

    fn make_transfer_method() -> MethodSignature {
        MethodSignature {
            selector: [0xa9, 0x05, 0x9c, 0xbb],
            name: "transfer".to_string(),
            signature: "transfer(address,uint256)".to_string(),
            inputs: vec![ParamSpec::new("to", "address"), ParamSpec::new("amount", "uint256")],
        }
    }

    fn make_transfer_event() -> EventSignature {
        EventSignature {
            selector: b256!("ddf252ad1be2c89b69c2b068fc378daa952ba7f163c4a11628f55a4df523b3ef"),
            name: "Transfer".to_string(),
            signature: "Transfer(address,address,uint256)".to_string(),
            inputs: vec![
                ParamSpec::indexed("from", "address"),
                ParamSpec::indexed("to", "address"),
                ParamSpec::new("value", "uint256"),
            ],
        }
    }

    fn make_decoder() -> AlloyAbiDecoder {
        let mut registry = AbiRegistry::new();
        registry.insert_method(make_transfer_method());
        registry.insert_event(make_transfer_event());
        AlloyAbiDecoder::new(registry)
    }

    fn word(hex_str: &str) -> B256 {
        let bytes = hex::decode(format!("{:0>64}", hex_str)).unwrap();
        B256::from_slice(&bytes)
    }

    #[test]
    fn test_decode_transfer() {
        // transfer(0x1234567890123456789012345678901234567890, 1000)
        let calldata = hex::decode(
            "a9059cbb000000000000000000000000123456789012345678901234567890123456789000000000000000000000000000000000000000000000000000000000000003e8"
        ).unwrap();

        let result = make_decoder().decode_calldata(&calldata).unwrap();

        assert_eq!(result.method_name, "transfer");
        assert_eq!(result.arguments.len(), 2);
        assert_eq!(
            result.arguments["to"],
            DynSolValue::Address(address!("1234567890123456789012345678901234567890"))
        );
        assert_eq!(result.arguments["amount"], DynSolValue::Uint(U256::from(1000), 256));
        let keys: Vec<_> = result.arguments.keys().cloned().collect();
        assert_eq!(keys, vec!["to", "amount"]);
    }

    #[test]
    fn test_unknown_selector() {
        let calldata = hex::decode("deadbeef").unwrap();

        let err = make_decoder().decode_calldata(&calldata).unwrap_err();
        assert!(matches!(err, DecodeError::UnknownSelector(ref s) if s == &[0xde, 0xad, 0xbe, 0xef]));
        assert!(err.to_string().contains("0xdeadbeef"));
    }

    #[test]
    fn test_calldata_too_short() {
        let err = make_decoder().decode_calldata(&[0xa9, 0x05]).unwrap_err();
        assert!(matches!(err, DecodeError::InputTooShort(2)));
    }

    #[test]
    fn test_truncated_calldata() {
        // selector + only the first argument word
        let calldata = hex::decode(
            "a9059cbb0000000000000000000000001234567890123456789012345678901234567890"
        ).unwrap();

        let err = make_decoder().decode_calldata(&calldata).unwrap_err();
        assert!(matches!(err, DecodeError::Decode { .. }));
    }

    #[test]
    fn test_unnamed_params_get_positional_keys() {
        let mut registry = AbiRegistry::new();
        registry.insert_method(MethodSignature {
            selector: [0x11, 0x22, 0x33, 0x44],
            name: "set".to_string(),
            signature: "set(uint256,bool)".to_string(),
            inputs: vec![ParamSpec::new("", "uint256"), ParamSpec::new("", "bool")],
        });
        let decoder = AlloyAbiDecoder::new(registry);

        let mut calldata = vec![0x11, 0x22, 0x33, 0x44];
        calldata.extend_from_slice(word("07").as_slice());
        calldata.extend_from_slice(word("01").as_slice());

        let result = decoder.decode_calldata(&calldata).unwrap();
        assert_eq!(result.arguments["arg0"], DynSolValue::Uint(U256::from(7), 256));
        assert_eq!(result.arguments["arg1"], DynSolValue::Bool(true));
    }

    #[test]
    fn test_decode_transfer_log() {
        let log = LogEntry {
            address: address!("bc4ca0eda7647a8ab7c2061c2e118a18a936f13d"),
            topics: vec![
                make_transfer_event().selector,
                word("71c7656ec7ab88b098defb751b7401b5f6d8976f"),
                word("1234567890123456789012345678901234567890"),
            ],
            data: Bytes::from(word("2a").to_vec()),
            log_index: Some(3),
        };

        let decoded = make_decoder().decode_log(&log).unwrap();
        assert_eq!(decoded.event_name, "Transfer");
        assert_eq!(decoded.indexed.len(), 2);
        assert_eq!(decoded.indexed[0].name, "from");
        assert_eq!(
            decoded.indexed[0].value,
            DynSolValue::Address(address!("71c7656ec7ab88b098defb751b7401b5f6d8976f"))
        );
        assert_eq!(decoded.data["value"], DynSolValue::Uint(U256::from(42), 256));
        assert!(decoded.has_data());
        assert_eq!(decoded.raw_data, log.data);
        assert_eq!(decoded.topics, log.topics);
        assert_eq!(decoded.log_index, Some(3));
    }

    #[test]
    fn test_log_without_topics() {
        let err = make_decoder().decode_log(&LogEntry::default()).unwrap_err();
        assert!(matches!(err, DecodeError::MissingEventTopic));
    }

    #[test]
    fn test_log_unknown_event() {
        let log = LogEntry {
            topics: vec![B256::repeat_byte(0xee)],
            ..Default::default()
        };
        let err = make_decoder().decode_log(&log).unwrap_err();
        assert!(matches!(err, DecodeError::UnknownSelector(ref s) if s.len() == 32));
    }

    #[test]
    fn test_too_many_topics() {
        let log = LogEntry {
            topics: vec![
                make_transfer_event().selector,
                word("01"),
                word("02"),
                word("03"),
            ],
            ..Default::default()
        };

        let err = make_decoder().decode_log(&log).unwrap_err();
        match err {
            DecodeError::IndexedParamMismatch { event, topics, indexed } => {
                assert_eq!(event, "Transfer");
                assert_eq!(topics, 4);
                assert_eq!(indexed, 2);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_fewer_topics_than_indexed_params() {
        let log = LogEntry {
            topics: vec![make_transfer_event().selector, word("01")],
            ..Default::default()
        };

        let decoded = make_decoder().decode_log(&log).unwrap();
        assert_eq!(decoded.indexed.len(), 1);
        assert_eq!(decoded.indexed[0].name, "from");
    }

    #[test]
    fn test_short_data_skips_payload_decoding() {
        for data in [Bytes::new(), Bytes::from(vec![0xff])] {
            let log = LogEntry {
                topics: vec![make_transfer_event().selector],
                data,
                ..Default::default()
            };

            let decoded = make_decoder().decode_log(&log).unwrap();
            assert!(decoded.data.is_empty());
            assert!(!decoded.has_data());
        }
    }

    #[test]
    fn test_two_byte_data_is_decoded() {
        let log = LogEntry {
            topics: vec![make_transfer_event().selector],
            data: Bytes::from(vec![0x00, 0x2a]),
            ..Default::default()
        };

        // Two bytes pass the length guard but cannot hold a uint256 word
        let err = make_decoder().decode_log(&log).unwrap_err();
        assert!(matches!(err, DecodeError::Decode { .. }));
    }

    #[test]
    fn test_decode_topic_value_types() {
        let uint = decode_topic(&ParamSpec::indexed("id", "uint256"), &word("2a")).unwrap();
        assert_eq!(uint, DynSolValue::Uint(U256::from(42), 256));

        let large = decode_topic(&ParamSpec::indexed("id", "uint256"), &word("0100")).unwrap();
        assert_eq!(large, DynSolValue::Uint(U256::from(256), 256));

        let flag = decode_topic(&ParamSpec::indexed("ok", "bool"), &word("01")).unwrap();
        assert_eq!(flag, DynSolValue::Bool(true));

        let hashed = B256::repeat_byte(0xab);
        let name = decode_topic(&ParamSpec::indexed("name", "string"), &hashed).unwrap();
        assert_eq!(name, DynSolValue::FixedBytes(hashed, 32));
    }
}
