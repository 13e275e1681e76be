use std::fmt::Write as _;

use caloscope_core::domain::{
    food_history::{FoodEntry, HistorySnapshot},
    user_profile::entities::UserProfile,
};

const NAME_WIDTH: usize = 28;

fn truncate(value: &str, width: usize) -> String {
    if value.chars().count() <= width {
        return value.to_string();
    }
    let mut out: String = value.chars().take(width.saturating_sub(1)).collect();
    out.push('…');
    out
}

fn entry_line(entry: &FoodEntry) -> String {
    let mut line = format!(
        "{:<10} {:<16} {:<width$} {:>8.0} {:>5}",
        truncate(&entry.id, 10),
        entry.created_at.format("%Y-%m-%d %H:%M"),
        truncate(&entry.predicted_name, NAME_WIDTH),
        entry.calories,
        entry.confidence,
        width = NAME_WIDTH,
    );
    if let Some(comment) = entry.comment.as_deref().filter(|c| !c.is_empty()) {
        let _ = write!(line, "  {comment}");
    }
    line
}

pub fn history_table(snapshot: &HistorySnapshot) -> String {
    let mut out = format!(
        "{} entries, sorted by {}, scope {}\n",
        snapshot.items.len(),
        snapshot.sort_order,
        snapshot.scope
    );

    if snapshot.items.is_empty() {
        out.push_str("No food logged yet.\n");
    } else {
        let _ = writeln!(
            out,
            "{:<10} {:<16} {:<width$} {:>8} {:>5}",
            "ID",
            "LOGGED",
            "FOOD",
            "KCAL",
            "CONF",
            width = NAME_WIDTH
        );
        for entry in &snapshot.items {
            out.push_str(&entry_line(entry));
            out.push('\n');
        }
    }

    let _ = writeln!(out, "Total: {:.0} kcal", snapshot.total_calories);
    if snapshot.has_more {
        let _ = writeln!(out, "More entries available (page {} loaded).", snapshot.page);
    }
    out
}

pub fn entry_summary(entry: &FoodEntry) -> String {
    format!(
        "{} ({}): {:.0} kcal",
        entry.predicted_name, entry.id, entry.calories
    )
}

fn optional<T: ToString>(value: Option<T>) -> String {
    value.map_or_else(|| "-".to_string(), |v| v.to_string())
}

pub fn profile(profile: &UserProfile) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Email:       {}", profile.email);
    let _ = writeln!(out, "Name:        {}", optional(profile.full_name.as_deref()));
    let _ = writeln!(out, "Age:         {}", optional(profile.age));
    let _ = writeln!(out, "Gender:      {}", optional(profile.gender.as_deref()));
    let _ = writeln!(
        out,
        "Height:      {}",
        optional(profile.height.map(|h| format!("{h} cm")))
    );
    let _ = writeln!(
        out,
        "Weight:      {}",
        optional(profile.weight.map(|w| format!("{w} kg")))
    );
    let _ = writeln!(
        out,
        "Daily goal:  {}",
        optional(profile.daily_calorie_goal.map(|g| format!("{g:.0} kcal")))
    );
    out
}
