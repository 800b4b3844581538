use crate::{
    FieldState, format_domain_input, is_valid_domain, split_domain_list, validate_domain_list,
    validate_email,
};

#[test]
fn empty_domain_list_is_required() {
    assert_eq!(
        validate_domain_list(""),
        FieldState::Invalid("Domain name(s) are required.".into())
    );
    assert_eq!(
        validate_domain_list("   "),
        FieldState::Invalid("Domain name(s) are required.".into())
    );
}

#[test]
fn commas_without_candidates_need_a_valid_domain() {
    assert_eq!(
        validate_domain_list(",, ,"),
        FieldState::Invalid("Please enter at least one valid domain.".into())
    );
}

#[test]
fn valid_domain_lists_report_their_count() {
    assert_eq!(
        validate_domain_list("example.com"),
        FieldState::Valid("1 domain(s) validated successfully.".into())
    );
    assert_eq!(
        validate_domain_list("example.com, sub.example.com"),
        FieldState::Valid("2 domain(s) validated successfully.".into())
    );
    // Trailing commas and uneven spacing do not change the count.
    assert_eq!(
        validate_domain_list("a.com ,b.org,  c.net,"),
        FieldState::Valid("3 domain(s) validated successfully.".into())
    );
}

#[test]
fn first_invalid_candidate_is_named() {
    assert_eq!(
        validate_domain_list("example.com, http://example.com"),
        FieldState::Invalid("Invalid domain format: http://example.com".into())
    );
    assert_eq!(
        validate_domain_list("-bad.com, also-bad-.org"),
        FieldState::Invalid("Invalid domain format: -bad.com".into())
    );
}

#[test]
fn scheme_prefixes_are_rejected() {
    assert!(!is_valid_domain("http://example.com"));
    assert!(!is_valid_domain("https://example.com"));
    assert!(is_valid_domain("httpx.example.com"));
}

#[test]
fn domain_length_boundaries() {
    // 63-char label is the longest allowed; 64 is out.
    let label63 = "a".repeat(63);
    let label64 = "a".repeat(64);
    assert!(is_valid_domain(&format!("{label63}.com")));
    assert!(!is_valid_domain(&format!("{label64}.com")));

    // 253 total chars pass, 254 do not.
    let label = "a".repeat(49);
    let long253 = format!("{label}.{label}.{label}.{label}.{label}.aac");
    assert_eq!(long253.len(), 253);
    assert!(is_valid_domain(&long253));
    let long254 = format!("{label}.{label}.{label}.{label}.{label}.aacd");
    assert_eq!(long254.len(), 254);
    assert!(!is_valid_domain(&long254));
}

#[test]
fn hyphens_cannot_edge_a_label() {
    assert!(is_valid_domain("my-site.example.com"));
    assert!(!is_valid_domain("-mysite.example.com"));
    assert!(!is_valid_domain("mysite-.example.com"));
    assert!(!is_valid_domain("mysite.-example.com"));
}

#[test]
fn single_label_hosts_are_accepted() {
    assert!(is_valid_domain("localhost"));
    assert!(is_valid_domain("a"));
}

#[test]
fn email_states() {
    assert_eq!(
        validate_email(""),
        FieldState::Invalid("Email address is required.".into())
    );
    assert_eq!(
        validate_email("  "),
        FieldState::Invalid("Email address is required.".into())
    );
    assert_eq!(
        validate_email("not-an-email"),
        FieldState::Invalid("Please enter a valid email address.".into())
    );
    assert_eq!(
        validate_email("user@host"),
        FieldState::Invalid("Please enter a valid email address.".into())
    );
    assert_eq!(
        validate_email("user name@host.tld"),
        FieldState::Invalid("Please enter a valid email address.".into())
    );
    assert_eq!(
        validate_email("user@host.tld"),
        FieldState::Valid("Email address is valid.".into())
    );
    // Surrounding whitespace is tolerated.
    assert_eq!(
        validate_email("  user@host.tld  "),
        FieldState::Valid("Email address is valid.".into())
    );
}

#[test]
fn split_trims_and_drops_empties() {
    assert_eq!(
        split_domain_list(" a.com , ,b.org,"),
        vec!["a.com", "b.org"]
    );
}

#[test]
fn comma_spacing_is_normalized() {
    assert_eq!(
        format_domain_input("a.com ,b.org  ,   c.net"),
        "a.com, b.org, c.net"
    );
    assert_eq!(format_domain_input("a.com"), "a.com");
    assert_eq!(format_domain_input("a.com,b.org"), "a.com, b.org");
}

#[test]
fn field_state_accessors() {
    assert!(FieldState::Valid("ok".into()).is_valid());
    assert!(!FieldState::Invalid("no".into()).is_valid());
    assert!(!FieldState::Untouched.is_valid());
    assert_eq!(FieldState::Untouched.message(), None);
    assert_eq!(FieldState::Invalid("no".into()).message(), Some("no"));
}
