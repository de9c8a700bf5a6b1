use bijux_bridge_model::{to_legacy, to_unified, AccountType, CustomerId, LegacyCustomer};
use proptest::prelude::*;
use proptest::test_runner::Config;

const WORDS: &str = "[A-Za-z0-9]{1,8}( [A-Za-z0-9]{1,8}){0,2}";

fn canonical_address() -> impl Strategy<Value = Option<String>> {
    let region = prop_oneof![
        "[A-Z]{2}",
        "[0-9]{5}",
        ("[A-Z]{2}", "[0-9]{5}(-[0-9]{4})?").prop_map(|(s, z)| format!("{s} {z}")),
    ];
    prop_oneof![
        Just(None),
        WORDS.prop_map(Some),
        (WORDS, WORDS).prop_map(|(a, b)| Some(format!("{a}, {b}"))),
        (WORDS, WORDS, region).prop_map(|(a, b, r)| Some(format!("{a}, {b}, {r}"))),
        (WORDS, WORDS, WORDS, WORDS)
            .prop_map(|(a, b, c, d)| Some(format!("{a}, {b}, {c}, {d}"))),
    ]
}

fn canonical_account_type() -> impl Strategy<Value = Option<String>> {
    prop_oneof![
        Just(None),
        proptest::sample::select(AccountType::ALL.to_vec()).prop_map(|t| Some(t.as_str().to_string())),
    ]
}

prop_compose! {
    fn canonical_legacy()(
        id in "[A-Za-z0-9_-]{1,20}",
        name in WORDS,
        email in proptest::option::of("[a-z]{1,8}@[a-z]{1,8}\\.com"),
        phone in proptest::option::of("[0-9]{3}-[0-9]{4}"),
        address in canonical_address(),
        account_type in canonical_account_type(),
        created_date in proptest::option::of("20[0-9]{2}-[01][0-9]-[0-3][0-9]"),
    ) -> LegacyCustomer {
        LegacyCustomer {
            customer_id: CustomerId::parse(&id).expect("generated id"),
            full_name: name,
            email,
            phone_number: phone,
            address,
            account_type,
            created_date,
        }
    }
}

proptest! {
    #![proptest_config(Config::with_cases(256))]
    #[test]
    fn legacy_round_trip_reproduces_canonical_record(r in canonical_legacy()) {
        let unified = to_unified(&r);
        let back = to_legacy(&unified, r.created_date.as_deref());
        prop_assert_eq!(back, r);
    }

    #[test]
    fn transformation_is_deterministic(r in canonical_legacy()) {
        prop_assert_eq!(to_unified(&r), to_unified(&r));
    }

    #[test]
    fn unified_record_keeps_legacy_id(r in canonical_legacy()) {
        prop_assert_eq!(to_unified(&r).id, r.customer_id);
    }
}
