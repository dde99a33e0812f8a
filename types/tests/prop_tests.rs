use proptest::prelude::*;

use aov_types::{Address, Amount, PairKey};

proptest! {
    /// Every address survives its own text form, regardless of letter case.
    #[test]
    fn address_text_form_parses_back(bytes in prop::array::uniform20(0u8..)) {
        let addr = Address::new(bytes);
        let text = addr.to_string();
        prop_assert_eq!(text.parse::<Address>().unwrap(), addr);
        prop_assert_eq!(text.to_uppercase().replacen("0X", "0x", 1).parse::<Address>().unwrap(), addr);
    }

    /// Reversing a pair with distinct sides yields a different key; reversing twice is identity.
    #[test]
    fn pair_direction_matters(
        a in prop::array::uniform20(0u8..),
        b in prop::array::uniform20(0u8..),
    ) {
        let key = PairKey::new(Address::new(a), Address::new(b));
        prop_assert_eq!(key.reversed().reversed(), key);
        prop_assert_eq!(key.reversed() == key, a == b);
        prop_assert_eq!(key.is_self_pair(), a == b);
    }

    /// checked_add agrees with u128 arithmetic.
    #[test]
    fn amount_checked_add_matches_u128(a in any::<u128>(), b in any::<u128>()) {
        let sum = Amount::new(a).checked_add(Amount::new(b));
        prop_assert_eq!(sum.map(|s| s.raw()), a.checked_add(b));
    }

    /// Amount ordering follows the raw value.
    #[test]
    fn amount_ordering(a in any::<u128>(), b in any::<u128>()) {
        prop_assert_eq!(Amount::new(a) <= Amount::new(b), a <= b);
    }

    /// Pair keys survive bincode unchanged (snapshots depend on this).
    #[test]
    fn pair_key_bincode_roundtrip(
        a in prop::array::uniform20(0u8..),
        b in prop::array::uniform20(0u8..),
    ) {
        let key = PairKey::new(Address::new(a), Address::new(b));
        let encoded = bincode::serialize(&key).unwrap();
        let decoded: PairKey = bincode::deserialize(&encoded).unwrap();
        prop_assert_eq!(decoded, key);
    }
}
