use chrono::Datelike;
use courtwatch_core::models::{CourtRegistry, Slot, SlotSet};

/// Discord rejects message content longer than this.
pub const MAX_MESSAGE_LEN: usize = 2000;

const HEADER: &str = "The following court slots have become available:\n\n";

/// Render newly available slots as a flat list, oldest first, with a booking link.
///
/// Lines that would push the message past Discord's limit are summarised
/// as a count instead.
pub fn format_slot_message(slots: &SlotSet, courts: &CourtRegistry, booking_url: Option<&str>) -> String {
    let footer = match booking_url {
        Some(url) => format!("\nbook here: {url}"),
        None => "\nbook here: on the facility's booking page".to_string(),
    };

    let mut message = String::from(HEADER);
    let mut listed = 0;
    for slot in slots {
        let line = slot_line(slot, courts);
        let remaining = slots.len() - listed - 1;
        let reserve = if remaining > 0 { overflow_line(remaining).len() } else { 0 };
        if message.len() + line.len() + reserve + footer.len() > MAX_MESSAGE_LEN {
            break;
        }
        message.push_str(&line);
        listed += 1;
    }

    if listed < slots.len() {
        message.push_str(&overflow_line(slots.len() - listed));
    }

    message.push_str(&footer);
    message
}

/// `- Friday, 10.01.2025, Time: 1100, Court 1`
pub fn slot_line(slot: &Slot, courts: &CourtRegistry) -> String {
    format!(
        "- {}, {}, Time: {}, {}\n",
        weekday_name(slot),
        slot.date.format("%d.%m.%Y"),
        slot.time_code(),
        courts.name_of(slot.court)
    )
}

fn weekday_name(slot: &Slot) -> &'static str {
    match slot.date.weekday() {
        chrono::Weekday::Mon => "Monday",
        chrono::Weekday::Tue => "Tuesday",
        chrono::Weekday::Wed => "Wednesday",
        chrono::Weekday::Thu => "Thursday",
        chrono::Weekday::Fri => "Friday",
        chrono::Weekday::Sat => "Saturday",
        chrono::Weekday::Sun => "Sunday",
    }
}

fn overflow_line(count: usize) -> String {
    format!("- ...and {count} more\n")
}
