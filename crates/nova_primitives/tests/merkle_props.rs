use hex::ToHex;
use nova_primitives::{
    blake2b_256, largest_power_of_two, le_bytes, merkle_leaf, merkle_node, merkle_root, u64_from_le,
};
use proptest::prelude::*;

#[test]
fn leaf_and_node_prefixes() {
    let leaf: String = merkle_leaf(b"").encode_hex();
    assert_eq!(leaf, "03170a2e7597b7b7e3d84c05391d139a62b157e78786d8c082f29dcf4c111314");
    assert_eq!(merkle_node(&[0; 32], &[0; 32]), blake2b_256(&[&[1u8], &[0u8; 64]]));
}

proptest! {
    #[test]
    fn root_splits_at_largest_power_of_two(
        leaves in prop::collection::vec(prop::collection::vec(any::<u8>(), 0..8), 2..64)
    ) {
        let k = largest_power_of_two(leaves.len());
        prop_assert!(k < leaves.len() && 2 * k >= leaves.len());
        let expected = merkle_node(&merkle_root(&leaves[..k]), &merkle_root(&leaves[k..]));
        prop_assert_eq!(merkle_root(&leaves), expected);
    }

    #[test]
    fn le_round_trip(x in any::<u64>()) {
        prop_assert_eq!(u64_from_le(&le_bytes::<8>(u128::from(x))), x);
        prop_assert_eq!(le_bytes::<8>(u128::from(x)), x.to_le_bytes());
    }
}
