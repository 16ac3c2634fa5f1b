use super::{MediaItem, UNKNOWN_DATE};
use std::collections::BTreeSet;

const SIZE_UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];
const MONTHS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// `1536` -> `"1.5 KB"`; one decimal, trailing `.0` dropped.
pub fn format_file_size(bytes: u64) -> String {
    if bytes == 0 {
        return "0 B".to_string();
    }
    let mut unit = 0;
    let mut value = bytes as f64;
    while value >= 1024.0 && unit < SIZE_UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    let rounded = (value * 10.0).round() / 10.0;
    format!("{} {}", rounded, SIZE_UNITS[unit])
}

pub fn format_file_size_mb(bytes: u64) -> String {
    format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
}

/// `"2025-06-03"` -> `"3rd Jun 25"`. Absent or unknown dates render empty,
/// malformed ones as `"-"`.
pub fn format_media_date(date: Option<&str>) -> String {
    let date = match date {
        None => return String::new(),
        Some(date) if date == UNKNOWN_DATE || date.is_empty() => return String::new(),
        Some(date) => date,
    };

    let mut parts = date.split('-');
    let (Some(year), Some(month), Some(day)) = (parts.next(), parts.next(), parts.next()) else {
        return "-".to_string();
    };
    if year.is_empty() || month.is_empty() {
        return "-".to_string();
    }
    let Ok(day) = day.parse::<u32>() else {
        return "-".to_string();
    };
    let short_year: String = year.chars().skip(2).collect();

    let month = match month.parse::<usize>() {
        Ok(m) if (1..=MONTHS.len()).contains(&m) => MONTHS[m - 1],
        _ => month,
    };
    format!("{}{} {} {}", day, ordinal_suffix(day), month, short_year)
}

fn ordinal_suffix(n: u32) -> &'static str {
    if n > 3 && n < 21 {
        return "th";
    }
    match n % 10 {
        1 => "st",
        2 => "nd",
        3 => "rd",
        _ => "th",
    }
}

/// Lowercased text after the last dot, or empty.
pub fn file_extension(file_name: &str) -> String {
    file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_lowercase())
        .unwrap_or_default()
}

/// Distinct categories of a catalog, sorted.
pub fn unique_categories(items: &[MediaItem]) -> Vec<String> {
    items
        .iter()
        .map(|item| item.category.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}
