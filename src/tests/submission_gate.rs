use super::form_page;
use crate::Result;

fn fill_valid(page: &mut crate::Page) -> Result<()> {
    page.type_text("#domains", "example.com, www.example.com")?;
    page.type_text("#email", "admin@example.com")?;
    page.set_checked("#accept_agreement", true)?;
    Ok(())
}

#[test]
fn one_failing_submit_annotates_every_field() -> Result<()> {
    let mut page = form_page()?;
    page.click("#generateBtn")?;

    page.assert_class("#domains", "is-invalid", true)?;
    page.assert_class("#email", "is-invalid", true)?;
    page.assert_class("#accept_agreement", "is-invalid", true)?;
    assert_eq!(page.submission_count(), 0);
    page.assert_disabled("#generateBtn", false)?;
    Ok(())
}

#[test]
fn consent_alone_blocks_submission() -> Result<()> {
    let mut page = form_page()?;
    page.type_text("#domains", "example.com")?;
    page.type_text("#email", "admin@example.com")?;
    page.click("#generateBtn")?;

    assert_eq!(page.submission_count(), 0);
    page.assert_class("#accept_agreement", "is-invalid", true)?;
    page.assert_text(
        ".form-check .invalid-feedback",
        "You must accept the Let's Encrypt Subscriber Agreement.",
    )?;
    // The text fields validated fine and say so.
    page.assert_class("#domains", "is-valid", true)?;
    page.assert_class("#email", "is-valid", true)?;
    Ok(())
}

#[test]
fn successful_submit_latches_and_shows_loading() -> Result<()> {
    let mut page = form_page()?;
    fill_valid(&mut page)?;
    page.click("#generateBtn")?;

    assert_eq!(page.submission_count(), 1);
    assert!(page.is_submission_locked());
    page.assert_disabled("#generateBtn", true)?;
    page.assert_class(".btn-text", "d-none", true)?;
    page.assert_class(".btn-loading", "d-none", false)?;
    Ok(())
}

#[test]
fn submitted_form_data_captures_successful_controls() -> Result<()> {
    let mut page = form_page()?;
    fill_valid(&mut page)?;
    page.submit("#sslForm")?;

    let entries = page.last_submission().unwrap_or_default().to_vec();
    assert_eq!(
        entries,
        vec![
            ("domains".to_string(), "example.com, www.example.com".to_string()),
            ("email".to_string(), "admin@example.com".to_string()),
            ("accept_agreement".to_string(), "on".to_string()),
        ]
    );
    Ok(())
}

#[test]
fn unchecked_boxes_are_not_submitted() -> Result<()> {
    let mut page = crate::Page::from_html(
        r#"
        <form id="sslForm">
          <input id="domains" name="domains" value="example.com">
          <input id="email" name="email" value="admin@example.com">
          <input id="accept_agreement" name="accept_agreement" type="checkbox" checked>
          <input type="checkbox" name="newsletter">
          <button id="generateBtn" type="submit">Generate</button>
        </form>
        "#,
    )?;
    page.submit("#sslForm")?;

    let entries = page.last_submission().unwrap_or_default().to_vec();
    assert!(entries.iter().any(|(name, _)| name == "accept_agreement"));
    assert!(!entries.iter().any(|(name, _)| name == "newsletter"));
    Ok(())
}

#[test]
fn duplicate_submits_are_discarded_while_locked() -> Result<()> {
    let mut page = form_page()?;
    fill_valid(&mut page)?;
    page.click("#generateBtn")?;
    assert_eq!(page.submission_count(), 1);

    // A second click lands on a disabled button; a direct form submit is
    // swallowed by the latch.
    page.click("#generateBtn")?;
    page.submit("#sslForm")?;
    assert_eq!(page.submission_count(), 1);
    Ok(())
}

#[test]
fn fixing_fields_after_a_block_allows_submission() -> Result<()> {
    let mut page = form_page()?;
    page.type_text("#domains", "ftp://example.com")?;
    page.click("#generateBtn")?;
    assert_eq!(page.submission_count(), 0);

    fill_valid(&mut page)?;
    page.click("#generateBtn")?;
    assert_eq!(page.submission_count(), 1);
    Ok(())
}

#[test]
fn missing_consent_checkbox_blocks_without_annotation() -> Result<()> {
    let mut page = crate::Page::from_html(
        r#"
        <form id="sslForm">
          <input id="domains" name="domains" value="example.com">
          <input id="email" name="email" value="admin@example.com">
          <button id="generateBtn" type="submit">Generate</button>
        </form>
        "#,
    )?;
    page.submit("#sslForm")?;

    assert_eq!(page.submission_count(), 0);
    page.assert_disabled("#generateBtn", false)?;
    Ok(())
}

#[test]
fn submit_controls_outside_the_wired_form_do_nothing() -> Result<()> {
    let mut page = crate::Page::from_html(
        r#"
        <form id="sslForm">
          <input id="domains" name="domains" value="example.com">
          <input id="email" name="email" value="admin@example.com">
          <input id="accept_agreement" name="accept_agreement" type="checkbox" checked>
          <button id="generateBtn" type="submit">Generate</button>
        </form>
        <form id="other"><button id="otherBtn">Go</button></form>
        "#,
    )?;
    page.click("#otherBtn")?;
    assert_eq!(page.submission_count(), 0);

    page.click("#generateBtn")?;
    assert_eq!(page.submission_count(), 1);
    Ok(())
}
