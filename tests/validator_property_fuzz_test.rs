use certform_tester::{FieldState, format_domain_input, validate_domain_list, validate_email};
use proptest::collection::vec;
use proptest::prelude::*;
use proptest::test_runner::FileFailurePersistence;

const VALIDATOR_PROPTEST_REGRESSION_FILE: &str =
    "tests/proptest-regressions/validator_property_fuzz_test.txt";
const DEFAULT_VALIDATOR_PROPTEST_CASES: u32 = 256;

fn env_proptest_cases(var_name: &str, default_cases: u32) -> u32 {
    std::env::var(var_name)
        .ok()
        .and_then(|raw| raw.parse::<u32>().ok())
        .filter(|value| *value > 0)
        .unwrap_or(default_cases)
}

fn validator_proptest_cases() -> u32 {
    std::env::var("CERTFORM_TESTER_VALIDATOR_PROPTEST_CASES")
        .ok()
        .and_then(|raw| raw.parse::<u32>().ok())
        .filter(|value| *value > 0)
        .unwrap_or_else(|| {
            env_proptest_cases(
                "CERTFORM_TESTER_PROPTEST_CASES",
                DEFAULT_VALIDATOR_PROPTEST_CASES,
            )
        })
}

fn label_strategy() -> BoxedStrategy<String> {
    // Labels that obey the hostname grammar: alphanumeric edges, hyphens
    // only in the middle, at most 63 chars.
    (
        "[a-z0-9]",
        proptest::option::of(("[a-z0-9-]{0,10}", "[a-z0-9]")),
    )
        .prop_map(|(head, tail)| match tail {
            Some((middle, last)) => format!("{head}{middle}{last}"),
            None => head,
        })
        .boxed()
}

fn hostname_strategy() -> BoxedStrategy<String> {
    vec(label_strategy(), 1..=4)
        .prop_map(|labels| labels.join("."))
        .boxed()
}

fn hostname_list_strategy() -> BoxedStrategy<Vec<String>> {
    vec(hostname_strategy(), 1..=6).boxed()
}

fn messy_separator_strategy() -> BoxedStrategy<String> {
    prop_oneof![
        Just(",".to_string()),
        Just(", ".to_string()),
        Just(" ,".to_string()),
        Just("  ,   ".to_string()),
        Just(",\t".to_string()),
    ]
    .boxed()
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: validator_proptest_cases(),
        failure_persistence: Some(Box::new(
            FileFailurePersistence::Direct(VALIDATOR_PROPTEST_REGRESSION_FILE),
        )),
        .. ProptestConfig::default()
    })]

    #[test]
    fn well_formed_hostname_lists_validate_with_their_count(
        hostnames in hostname_list_strategy(),
        separator in messy_separator_strategy(),
    ) {
        let raw = hostnames.join(&separator);
        let state = validate_domain_list(&raw);
        prop_assert_eq!(
            state,
            FieldState::Valid(format!("{} domain(s) validated successfully.", hostnames.len()))
        );
    }

    #[test]
    fn scheme_prefixed_candidates_always_fail(
        hostname in hostname_strategy(),
        scheme in prop_oneof![Just("http://"), Just("https://")],
    ) {
        let raw = format!("{scheme}{hostname}");
        let state = validate_domain_list(&raw);
        prop_assert_eq!(
            state,
            FieldState::Invalid(format!("Invalid domain format: {raw}"))
        );
    }

    #[test]
    fn overlong_hostnames_always_fail(label in "[a-z]{1,20}") {
        // Stack enough labels to pass 253 chars while keeping each label legal.
        let mut hostname = label.clone();
        while hostname.len() <= 253 {
            hostname.push('.');
            hostname.push_str(&label);
        }
        prop_assert_eq!(
            validate_domain_list(&hostname),
            FieldState::Invalid(format!("Invalid domain format: {hostname}"))
        );
    }

    #[test]
    fn formatting_normalizes_every_separator(
        hostnames in hostname_list_strategy(),
        separator in messy_separator_strategy(),
    ) {
        let raw = hostnames.join(&separator);
        let formatted = format_domain_input(&raw);
        prop_assert_eq!(formatted, hostnames.join(", "));
    }

    #[test]
    fn formatting_is_idempotent(
        hostnames in hostname_list_strategy(),
        separator in messy_separator_strategy(),
    ) {
        let formatted = format_domain_input(&hostnames.join(&separator));
        prop_assert_eq!(format_domain_input(&formatted), formatted);
    }

    #[test]
    fn addresses_without_a_dotted_host_never_validate(
        local in "[a-z0-9]{1,8}",
        host in "[a-z0-9]{1,8}",
    ) {
        let raw = format!("{local}@{host}");
        prop_assert_eq!(
            validate_email(&raw),
            FieldState::Invalid("Please enter a valid email address.".to_string())
        );
    }

    #[test]
    fn plain_addresses_always_validate(
        local in "[a-z0-9._+-]{1,12}",
        host in "[a-z0-9-]{1,12}",
        tld in "[a-z]{2,6}",
    ) {
        let raw = format!("{local}@{host}.{tld}");
        prop_assert_eq!(
            validate_email(&raw),
            FieldState::Valid("Email address is valid.".to_string())
        );
    }
}
