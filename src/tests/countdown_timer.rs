use super::{download_page, form_page};
use crate::Result;

#[test]
fn countdown_is_injected_under_the_download_section() -> Result<()> {
    let page = download_page()?;
    page.assert_exists(".download-section .text-muted.text-center.mt-2")?;
    page.assert_text("#countdown", "15:00")?;
    assert_eq!(page.countdown_remaining(), Some(15 * 60));
    Ok(())
}

#[test]
fn pages_without_a_download_section_schedule_no_countdown() -> Result<()> {
    let page = form_page()?;
    page.assert_missing("#countdown")?;
    assert_eq!(page.countdown_remaining(), None);
    // The info alert is sticky, so nothing at all is pending.
    assert!(page.pending_timers().is_empty());
    Ok(())
}

#[test]
fn first_tick_still_reads_fifteen_minutes() -> Result<()> {
    let mut page = download_page()?;
    page.advance_time(1000)?;
    page.assert_text("#countdown", "15:00")?;

    page.advance_time(1000)?;
    page.assert_text("#countdown", "14:59")?;
    Ok(())
}

#[test]
fn display_formats_minutes_and_padded_seconds() -> Result<()> {
    let mut page = download_page()?;
    // 95 ticks: renders were 15:00, 15:00, 14:59, ..., 13:26.
    page.advance_time(95_000)?;
    page.assert_text("#countdown", "13:26")?;
    Ok(())
}

#[test]
fn expiry_reloads_the_page_and_restarts_the_clock() -> Result<()> {
    let mut page = download_page()?;
    assert_eq!(page.reload_count(), 0);

    // The zero render happens on tick 901.
    page.advance_time_to(900_000)?;
    page.assert_text("#countdown", "0:01")?;
    assert_eq!(page.reload_count(), 0);

    page.advance_time_to(901_000)?;
    assert_eq!(page.reload_count(), 1);

    // The rebuilt page starts a fresh countdown.
    page.assert_text("#countdown", "15:00")?;
    assert_eq!(page.countdown_remaining(), Some(15 * 60));
    assert_eq!(page.now_ms(), 901_000);

    // And it expires again a full cycle later.
    page.advance_time_to(901_000 + 901_000)?;
    assert_eq!(page.reload_count(), 2);
    Ok(())
}

#[test]
fn clipboard_survives_a_reload() -> Result<()> {
    let mut page = download_page()?;
    page.click(".copy-btn")?;
    assert_eq!(page.clipboard_text(), "-----BEGIN CERTIFICATE-----");

    page.advance_time_to(901_000)?;
    assert_eq!(page.reload_count(), 1);
    assert_eq!(page.clipboard_text(), "-----BEGIN CERTIFICATE-----");
    Ok(())
}

#[test]
fn interval_requeues_exactly_once_per_second() -> Result<()> {
    let mut page = download_page()?;
    let before = page.pending_timers();
    let countdown_timer = before
        .iter()
        .find(|timer| timer.interval_ms == Some(1000))
        .cloned();
    assert!(countdown_timer.is_some());

    page.advance_time(10_000)?;
    let after = page.pending_timers();
    let requeued = after
        .iter()
        .filter(|timer| timer.interval_ms == Some(1000))
        .count();
    assert_eq!(requeued, 1);
    page.assert_text("#countdown", "14:51")?;
    Ok(())
}

#[test]
fn advancing_backwards_is_rejected() -> Result<()> {
    let mut page = download_page()?;
    page.advance_time_to(5000)?;
    assert!(page.advance_time_to(4000).is_err());
    assert!(page.advance_time(-1).is_err());
    Ok(())
}

#[test]
fn runaway_interval_hits_the_step_limit() -> Result<()> {
    let mut page = download_page()?;
    page.set_timer_step_limit(100)?;
    let err = page.advance_time(200_000).unwrap_err();
    let message = err.to_string();
    assert!(message.contains("max task steps"), "unexpected error: {message}");
    Ok(())
}
