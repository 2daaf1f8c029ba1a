//! Calldata encoded for any method of the bundled ABI decodes back to the same values

use alloy_dyn_abi::{DynSolType, DynSolValue};
use alloy_primitives::{Address, B256, I256, U256};
use proptest::prelude::*;
use proptest::strategy::ValueTree;
use proptest::test_runner::TestRunner;

use txlens::domain::abi::{AbiDecoder, MethodSignature};
use txlens::infrastructure::{AbiLoader, AlloyAbiDecoder};

fn bundled_methods() -> Vec<MethodSignature> {
    AbiLoader::bundled()
        .expect("bundled ABI should load")
        .methods()
        .cloned()
        .collect()
}

fn any_value(ty: &DynSolType) -> BoxedStrategy<DynSolValue> {
    match ty {
        DynSolType::Bool => any::<bool>().prop_map(DynSolValue::Bool).boxed(),
        DynSolType::Address => prop::array::uniform20(any::<u8>())
            .prop_map(|bytes| DynSolValue::Address(Address::from(bytes)))
            .boxed(),
        DynSolType::Uint(bits) => {
            let bits = *bits;
            prop::array::uniform4(any::<u64>())
                .prop_map(move |limbs| {
                    let mask = U256::MAX >> (256 - bits);
                    DynSolValue::Uint(U256::from_limbs(limbs) & mask, bits)
                })
                .boxed()
        }
        DynSolType::Int(bits) => {
            let bits = *bits;
            any::<i8>()
                .prop_map(move |v| DynSolValue::Int(I256::try_from(v).unwrap(), bits))
                .boxed()
        }
        DynSolType::FixedBytes(size) => {
            let size = *size;
            prop::array::uniform32(any::<u8>())
                .prop_map(move |mut bytes| {
                    bytes[size..].fill(0);
                    DynSolValue::FixedBytes(B256::from(bytes), size)
                })
                .boxed()
        }
        DynSolType::Bytes => prop::collection::vec(any::<u8>(), 0..96)
            .prop_map(DynSolValue::Bytes)
            .boxed(),
        DynSolType::String => "\\PC{0,48}".prop_map(DynSolValue::String).boxed(),
        DynSolType::Array(inner) => prop::collection::vec(any_value(inner), 0..4)
            .prop_map(DynSolValue::Array)
            .boxed(),
        DynSolType::FixedArray(inner, len) => prop::collection::vec(any_value(inner), *len)
            .prop_map(DynSolValue::FixedArray)
            .boxed(),
        DynSolType::Tuple(types) => types
            .iter()
            .map(any_value)
            .collect::<Vec<_>>()
            .prop_map(DynSolValue::Tuple)
            .boxed(),
        other => panic!("no value strategy for {other:?}"),
    }
}

fn any_call() -> impl Strategy<Value = (MethodSignature, Vec<DynSolValue>)> {
    prop::sample::select(bundled_methods()).prop_flat_map(|method| {
        let args: Vec<_> = method
            .inputs
            .iter()
            .map(|param| any_value(&param.kind.parse().expect("bundled ABI types parse")))
            .collect();
        (Just(method), args)
    })
}

proptest! {
    #[test]
    fn calldata_round_trips_for_every_bundled_method((method, args) in any_call()) {
        let decoder = AlloyAbiDecoder::new(AbiLoader::bundled().unwrap());

        let mut calldata = method.selector.to_vec();
        calldata.extend(DynSolValue::Tuple(args.clone()).abi_encode_params());

        let decoded = decoder.decode_calldata(&calldata);
        prop_assert!(decoded.is_ok(), "{}: {:?}", method.signature, decoded.as_ref().err());
        let decoded = decoded.unwrap();

        prop_assert_eq!(&decoded.method_name, &method.name);
        prop_assert_eq!(&decoded.signature, &method.signature);
        prop_assert_eq!(decoded.arguments.len(), args.len());
        for (decoded_value, expected) in decoded.arguments.values().zip(&args) {
            prop_assert_eq!(decoded_value, expected);
        }
    }

    #[test]
    fn uint256_words_round_trip(limbs in prop::array::uniform4(any::<u64>())) {
        let value = U256::from_limbs(limbs);
        let decoder = AlloyAbiDecoder::new(AbiLoader::bundled().unwrap());

        // mintApe(uint256)
        let mut calldata = vec![0xa7, 0x23, 0x53, 0x3e];
        calldata.extend_from_slice(&value.to_be_bytes::<32>());

        let decoded = decoder.decode_calldata(&calldata).unwrap();
        prop_assert_eq!(&decoded.arguments["numberOfTokens"], &DynSolValue::Uint(value, 256));
    }
}

#[test]
fn every_bundled_method_is_covered() {
    let decoder = AlloyAbiDecoder::new(AbiLoader::bundled().unwrap());
    let mut runner = TestRunner::default();

    for method in bundled_methods() {
        let args: Vec<_> = method
            .inputs
            .iter()
            .map(|param| any_value(&param.kind.parse().unwrap()))
            .collect();
        let values = args.new_tree(&mut runner).unwrap().current();

        let mut calldata = method.selector.to_vec();
        calldata.extend(DynSolValue::Tuple(values.clone()).abi_encode_params());

        let decoded = decoder
            .decode_calldata(&calldata)
            .unwrap_or_else(|e| panic!("{}: {e}", method.signature));
        assert_eq!(decoded.method_name, method.name);
        let decoded_values: Vec<_> = decoded.arguments.values().cloned().collect();
        assert_eq!(decoded_values, values, "{}", method.signature);
    }
}
