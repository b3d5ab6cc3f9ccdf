use chrono::{Datelike, Local, NaiveDate};
use crossterm::event::KeyCode;

use crate::locale::ISO_DATE;

#[derive(Clone, Copy, PartialEq)]
enum DatePart {
    Year,
    Month,
    Day,
}

impl DatePart {
    fn width(self) -> usize {
        match self {
            DatePart::Year => 4,
            DatePart::Month | DatePart::Day => 2,
        }
    }
}

/// Inline editor for the ISO date fields. Digits accumulate per part and
/// commit once the part is full; invalid combinations (Feb 30, month 13)
/// are simply not applied, the previous date stays.
pub struct DateInput {
    date: NaiveDate,
    part: DatePart,
    buffer: String,
}

impl DateInput {
    /// Seed from a stored ISO string; anything unparseable starts at today.
    pub fn new(iso: &str) -> Self {
        let date = NaiveDate::parse_from_str(iso, ISO_DATE)
            .unwrap_or_else(|_| Local::now().date_naive());
        Self {
            date,
            part: DatePart::Year,
            buffer: String::new(),
        }
    }

    /// Current value in the stored wire format.
    pub fn iso(&self) -> String {
        self.date.format(ISO_DATE).to_string()
    }

    pub fn handle_key(&mut self, key: KeyCode) {
        match key {
            KeyCode::Char(c) if c.is_ascii_digit() => {
                self.buffer.push(c);
                if self.buffer.len() == self.part.width() {
                    self.apply_buffer();
                    self.buffer.clear();
                }
            }
            KeyCode::Backspace => {
                self.buffer.pop();
            }
            KeyCode::Right => self.cycle(true),
            KeyCode::Left => self.cycle(false),
            _ => {}
        }
    }

    fn cycle(&mut self, forward: bool) {
        self.part = match (self.part, forward) {
            (DatePart::Year, true) | (DatePart::Day, false) => DatePart::Month,
            (DatePart::Month, true) | (DatePart::Year, false) => DatePart::Day,
            (DatePart::Day, true) | (DatePart::Month, false) => DatePart::Year,
        };
        self.buffer.clear();
    }

    fn apply_buffer(&mut self) {
        let Ok(value) = self.buffer.parse::<u32>() else {
            return;
        };
        let candidate = match self.part {
            DatePart::Year => NaiveDate::from_ymd_opt(value as i32, self.date.month(), self.date.day()),
            DatePart::Month => NaiveDate::from_ymd_opt(self.date.year(), value, self.date.day()),
            DatePart::Day => NaiveDate::from_ymd_opt(self.date.year(), self.date.month(), value),
        };
        if let Some(date) = candidate {
            self.date = date;
        }
    }

    /// Editing view: the active part shows the pending digits or a mask.
    pub fn display(&self) -> String {
        let active = if self.buffer.is_empty() {
            match self.part {
                DatePart::Year => "[YYYY]".to_string(),
                DatePart::Month => "[MM]".to_string(),
                DatePart::Day => "[DD]".to_string(),
            }
        } else {
            format!("[{}]", self.buffer)
        };
        match self.part {
            DatePart::Year => format!("{}{:02}-{:02}", active, self.date.month(), self.date.day()),
            DatePart::Month => format!(
                "{}-{}{:02}",
                self.date.year(),
                active,
                self.date.day()
            ),
            DatePart::Day => format!(
                "{}-{:02}-{}",
                self.date.year(),
                self.date.month(),
                active
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn type_digits(input: &mut DateInput, digits: &str) {
        for c in digits.chars() {
            input.handle_key(KeyCode::Char(c));
        }
    }

    #[test]
    fn seeds_from_iso_string() {
        let input = DateInput::new("2026-08-06");
        assert_eq!(input.iso(), "2026-08-06");
    }

    #[test]
    fn typing_a_full_part_commits_it() {
        let mut input = DateInput::new("2026-08-06");
        type_digits(&mut input, "2027");
        assert_eq!(input.iso(), "2027-08-06");

        input.handle_key(KeyCode::Right);
        type_digits(&mut input, "12");
        assert_eq!(input.iso(), "2027-12-06");

        input.handle_key(KeyCode::Right);
        type_digits(&mut input, "25");
        assert_eq!(input.iso(), "2027-12-25");
    }

    #[test]
    fn invalid_combination_keeps_previous_date() {
        let mut input = DateInput::new("2026-02-10");
        input.handle_key(KeyCode::Right);
        input.handle_key(KeyCode::Right);
        type_digits(&mut input, "30"); // Feb 30 does not exist
        assert_eq!(input.iso(), "2026-02-10");
    }

    #[test]
    fn garbage_seed_falls_back_to_today() {
        let input = DateInput::new("not a date");
        assert_eq!(input.iso(), Local::now().date_naive().format(ISO_DATE).to_string());
    }
}
