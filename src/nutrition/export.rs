//! CSV export of daily logs

use crate::models::DailyNutritionLog;
use std::io::Write;

const HEADER: [&str; 9] = [
    "date",
    "calories",
    "protein_g",
    "carbohydrates_g",
    "fat_g",
    "water_ml",
    "nutrition_score",
    "logged_entries",
    "planned_entries",
];

/// Write one row per log, oldest first
pub fn write_logs_csv<W: Write>(logs: &[DailyNutritionLog], writer: W) -> csv::Result<()> {
    let mut sorted: Vec<&DailyNutritionLog> = logs.iter().collect();
    sorted.sort_by_key(|l| l.date);

    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(HEADER)?;

    for log in sorted {
        wtr.write_record([
            log.date.format("%Y-%m-%d").to_string(),
            format!("{:.1}", log.total_calories),
            format!("{:.1}", log.total_protein),
            format!("{:.1}", log.total_carbohydrates),
            format!("{:.1}", log.total_fat),
            format!("{:.0}", water_ml(log)),
            log.nutrition_score
                .map(|s| format!("{:.1}", s))
                .unwrap_or_default(),
            log.food_logs.len().to_string(),
            log.planned_entries.len().to_string(),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}

fn water_ml(log: &DailyNutritionLog) -> f64 {
    log.hydration
        .as_ref()
        .map(|h| h.water_ml)
        .filter(|w| *w > 0.0)
        .unwrap_or(log.water_ml)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_csv_rows_sorted_by_date() {
        let mut later = DailyNutritionLog::empty(NaiveDate::from_ymd_opt(2024, 5, 3).unwrap());
        later.total_calories = 1800.0;
        later.nutrition_score = Some(6.5);
        let mut earlier = DailyNutritionLog::empty(NaiveDate::from_ymd_opt(2024, 5, 1).unwrap());
        earlier.water_ml = 1250.0;

        let mut out = Vec::new();
        write_logs_csv(&[later, earlier], &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("date,calories"));
        assert_eq!(lines[1], "2024-05-01,0.0,0.0,0.0,0.0,1250,,0,0");
        assert_eq!(lines[2], "2024-05-03,1800.0,0.0,0.0,0.0,0,6.5,0,0");
    }
}
