use formats::trip_summary::TripSummary;
use serde::{Deserialize, Serialize};

pub const DEFAULT_TRAVELER_COUNT: u32 = 2;

/// Data behind the trip form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TripForm {
    pub trip_name: String,
    pub requirements: String,
    pub destination: String,
    pub duration: String,
    pub dates: String,
    pub budget: String,
    pub travelers: Vec<String>,
    pub traveler_count: u32,
    /// Where the form's content came from, shown next to the form.
    pub chat_context: String,
}

impl Default for TripForm {
    fn default() -> Self {
        Self {
            trip_name: String::new(),
            requirements: String::new(),
            destination: String::new(),
            duration: String::new(),
            dates: String::new(),
            budget: String::new(),
            travelers: Vec::new(),
            traveler_count: DEFAULT_TRAVELER_COUNT,
            chat_context: String::new(),
        }
    }
}

impl TripForm {
    /// Copies the non-empty fields of `summary` into the form. Empty summary
    /// fields leave what the user typed alone.
    pub fn apply_summary(&mut self, summary: &TripSummary) {
        fill(&mut self.trip_name, &summary.title);
        fill(&mut self.requirements, &summary.requirements);
        fill(&mut self.destination, &summary.destination);
        fill(&mut self.duration, &summary.duration);
        fill(&mut self.dates, &summary.dates);
        fill(&mut self.budget, &summary.budget);

        let names: Vec<String> = summary
            .participant_names
            .iter()
            .map(|n| n.trim())
            .filter(|n| !n.is_empty())
            .map(str::to_string)
            .collect();
        if !names.is_empty() {
            self.set_traveler_count(names.len());
            self.travelers = names;
        }
    }

    /// Sets the traveler count, never below one.
    pub fn set_traveler_count(&mut self, count: usize) {
        self.traveler_count = u32::try_from(count).unwrap_or(u32::MAX).max(1);
    }
}

fn fill(field: &mut String, value: &str) {
    let value = value.trim();
    if !value.is_empty() {
        *field = value.to_string();
    }
}
