// Copyright (c) MySocial Team
// SPDX-License-Identifier: Apache-2.0

use once_cell::sync::Lazy;
use regex::Regex;

static DURATION_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^P(?:(\d+)D)?(?:T(?:(\d+)H)?(?:(\d+)M)?(?:(\d+)S)?)?$")
        .expect("duration pattern is a valid regex")
});

/// Parse a compact `PT#H#M#S` duration into seconds.
///
/// Each component is optional and a missing component counts as zero.
/// Returns `None` for strings that are not in this notation at all, and for
/// durations that do not fit in a `u32` of seconds.
pub fn parse_duration(raw: &str) -> Option<u32> {
    let captures = DURATION_PATTERN.captures(raw.trim())?;

    let component = |index: usize| -> Option<u64> {
        match captures.get(index) {
            Some(m) => m.as_str().parse::<u64>().ok(),
            None => Some(0),
        }
    };

    let days = component(1)?;
    let hours = component(2)?;
    let minutes = component(3)?;
    let seconds = component(4)?;

    let total = days
        .checked_mul(86_400)?
        .checked_add(hours.checked_mul(3_600)?)?
        .checked_add(minutes.checked_mul(60)?)?
        .checked_add(seconds)?;
    u32::try_from(total).ok()
}
