//! Read-side aggregates over already loaded meals and weights.

use std::collections::BTreeSet;

use chrono::{Duration, NaiveDate};

use crate::entities::{
    round1, BmiCategory, LoggedMeal, MacroProgress, MacroTotals, MetabolicProfile, WeeklySummary,
    WeightChange, WeightEntry, WeightTrend,
};

/// Days covered by the weekly summary, today included
pub const WEEKLY_WINDOW_DAYS: i64 = 7;
/// Average step between the last entries that still counts as stable
pub const TREND_THRESHOLD_KG: f64 = 0.15;
const TREND_ENTRIES: usize = 3;

pub fn today_totals(meals: &[LoggedMeal], today: NaiveDate) -> MacroTotals {
    MacroTotals::from_meals(meals.iter().filter(|m| m.date == today))
}

/// Averages per logged day over the trailing week. `None` until at least
/// two different days have meals.
pub fn weekly_summary(meals: &[LoggedMeal], today: NaiveDate) -> Option<WeeklySummary> {
    let from = today - Duration::days(WEEKLY_WINDOW_DAYS - 1);
    let in_window: Vec<&LoggedMeal> = meals
        .iter()
        .filter(|m| m.date >= from && m.date <= today)
        .collect();

    let days: BTreeSet<NaiveDate> = in_window.iter().map(|m| m.date).collect();
    if days.len() < 2 {
        return None;
    }

    let days_logged = days.len() as u32;
    let totals = MacroTotals::from_meals(in_window);
    Some(WeeklySummary {
        from,
        to: today,
        days_logged,
        daily_average: totals.divided_by(f64::from(days_logged)).rounded(),
    })
}

/// Consecutive days with meals, counted back from the latest logged day.
/// Zero unless that day is today or yesterday.
pub fn streak(meals: &[LoggedMeal], today: NaiveDate) -> u32 {
    let days: BTreeSet<NaiveDate> = meals.iter().map(|m| m.date).filter(|d| *d <= today).collect();
    let Some(&latest) = days.iter().next_back() else {
        return 0;
    };
    if latest < today - Duration::days(1) {
        return 0;
    }

    let mut count = 0;
    let mut day = latest;
    while days.contains(&day) {
        count += 1;
        day -= Duration::days(1);
    }
    count
}

/// Direction of the average step across the last three entries
pub fn weight_trend(entries: &[WeightEntry]) -> Option<WeightTrend> {
    if entries.len() < TREND_ENTRIES {
        return None;
    }
    let recent = &entries[entries.len() - TREND_ENTRIES..];
    let total: f64 = recent.windows(2).map(|w| w[1].weight_kg - w[0].weight_kg).sum();
    let average = total / (TREND_ENTRIES - 1) as f64;

    Some(if average < -TREND_THRESHOLD_KG {
        WeightTrend::Down
    } else if average > TREND_THRESHOLD_KG {
        WeightTrend::Up
    } else {
        WeightTrend::Stable
    })
}

/// Change from the last entry on or before `today - days` to the latest
/// entry. Entries must be sorted by date.
pub fn weight_change(entries: &[WeightEntry], today: NaiveDate, days: i64) -> Option<WeightChange> {
    let latest = entries.last()?;
    let cutoff = today - Duration::days(days);
    let earlier = entries.iter().rev().find(|e| e.date <= cutoff)?;
    if earlier.weight_kg <= 0.0 {
        return None;
    }

    // The percentage is taken from the displayed (rounded) change
    let change = round1(latest.weight_kg - earlier.weight_kg);
    Some(WeightChange {
        change,
        percentage: round1(change / earlier.weight_kg * 100.0),
    })
}

pub fn latest_weight(entries: &[WeightEntry]) -> Option<f64> {
    entries.last().map(|e| e.weight_kg)
}

/// Body mass index rounded to 0.1
pub fn bmi(weight_kg: f64, height_cm: f64) -> Option<f64> {
    if weight_kg <= 0.0 || height_cm <= 0.0 {
        return None;
    }
    let height_m = height_cm / 100.0;
    Some(round1(weight_kg / (height_m * height_m)))
}

pub fn bmi_category(bmi: f64) -> BmiCategory {
    if bmi < 18.5 {
        BmiCategory::Underweight
    } else if bmi < 25.0 {
        BmiCategory::Normal
    } else if bmi < 30.0 {
        BmiCategory::Overweight
    } else {
        BmiCategory::Obese
    }
}

/// Daily water goal: 35 ml per kg, to the nearest 100 ml
pub fn water_target_ml(weight_kg: f64) -> u32 {
    ((weight_kg * 35.0 / 100.0).round() * 100.0).max(0.0) as u32
}

pub fn macro_progress(consumed: MacroTotals, targets: &MetabolicProfile) -> MacroProgress {
    MacroProgress {
        consumed: consumed.rounded(),
        target: MacroTotals {
            calories: targets.target_calories,
            protein: targets.target_protein_g,
            carbs: targets.target_carbs_g,
            fat: targets.target_fat_g,
        },
        remaining_calories: (targets.target_calories - consumed.calories).round(),
    }
}
