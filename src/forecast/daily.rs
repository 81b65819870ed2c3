use crate::condition::Condition;

/// One dated observation feeding a daily group.
///
/// Point readings carry the same value in `high_c` and `low_c`; day summaries
/// carry their own range. A reading with `condition: None` widens the range
/// without voting for the representative condition.
#[derive(Debug, Clone)]
pub struct DatedReading<T> {
    pub date: String,
    pub high_c: f64,
    pub low_c: f64,
    pub condition: Option<Condition>,
    pub item: T,
}

impl<T> DatedReading<T> {
    pub fn point(date: impl Into<String>, temp_c: f64, condition: Condition, item: T) -> Self {
        Self {
            date: date.into(),
            high_c: temp_c,
            low_c: temp_c,
            condition: Some(condition),
            item,
        }
    }
}

#[derive(Debug, Clone)]
pub struct DayGroup<T> {
    pub date: String,
    pub high_c: f64,
    pub low_c: f64,
    pub condition: Condition,
    pub items: Vec<T>,
}

struct Accumulator<T> {
    date: String,
    high_c: f64,
    low_c: f64,
    votes: Vec<Condition>,
    items: Vec<T>,
}

/// Group readings by calendar date, keeping dates in first-seen order.
pub fn group_by_date<T>(readings: impl IntoIterator<Item = DatedReading<T>>) -> Vec<DayGroup<T>> {
    let mut groups: Vec<Accumulator<T>> = Vec::new();

    for reading in readings {
        let index = match groups.iter().position(|g| g.date == reading.date) {
            Some(index) => index,
            None => {
                groups.push(Accumulator {
                    date: reading.date.clone(),
                    high_c: f64::NEG_INFINITY,
                    low_c: f64::INFINITY,
                    votes: Vec::new(),
                    items: Vec::new(),
                });
                groups.len() - 1
            }
        };

        let group = &mut groups[index];
        if !reading.high_c.is_nan() {
            group.high_c = group.high_c.max(reading.high_c);
        }
        if !reading.low_c.is_nan() {
            group.low_c = group.low_c.min(reading.low_c);
        }
        if let Some(condition) = reading.condition {
            group.votes.push(condition);
        }
        group.items.push(reading.item);
    }

    groups
        .into_iter()
        .map(|group| DayGroup {
            high_c: finite_or(group.high_c, 0.0),
            low_c: finite_or(group.low_c, 0.0),
            condition: dominant_condition(&group.votes).unwrap_or_default(),
            date: group.date,
            items: group.items,
        })
        .collect()
}

/// Most frequent condition; ties go to whichever appeared first.
pub fn dominant_condition(conditions: &[Condition]) -> Option<Condition> {
    let mut counts: Vec<(Condition, usize)> = Vec::new();
    for condition in conditions {
        match counts.iter_mut().find(|(c, _)| c == condition) {
            Some((_, count)) => *count += 1,
            None => counts.push((*condition, 1)),
        }
    }

    let mut best: Option<(Condition, usize)> = None;
    for (condition, count) in counts {
        // Strictly greater keeps the earliest on ties.
        if best.map_or(true, |(_, best_count)| count > best_count) {
            best = Some((condition, count));
        }
    }
    best.map(|(condition, _)| condition)
}

fn finite_or(value: f64, fallback: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        fallback
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_majority_condition_wins() {
        let readings = vec![
            DatedReading::point("2024-05-01", 12.0, Condition::Rainy, ()),
            DatedReading::point("2024-05-01", 14.0, Condition::Rainy, ()),
            DatedReading::point("2024-05-01", 18.0, Condition::Sunny, ()),
        ];

        let days = group_by_date(readings);

        assert_eq!(days.len(), 1);
        assert_eq!(days[0].condition, Condition::Rainy);
        assert_eq!(days[0].high_c, 18.0);
        assert_eq!(days[0].low_c, 12.0);
        assert_eq!(days[0].items.len(), 3);
    }

    #[test]
    fn test_tie_goes_to_first_seen() {
        let readings = vec![
            DatedReading::point("2024-05-01", 20.0, Condition::Sunny, ()),
            DatedReading::point("2024-05-01", 16.0, Condition::Rainy, ()),
        ];

        let days = group_by_date(readings);
        assert_eq!(days[0].condition, Condition::Sunny);

        assert_eq!(
            dominant_condition(&[Condition::Rainy, Condition::Sunny]),
            Some(Condition::Rainy)
        );
    }

    #[test]
    fn test_dates_keep_input_order() {
        let readings = vec![
            DatedReading::point("2024-05-02", 10.0, Condition::Cloudy, 1),
            DatedReading::point("2024-05-01", 11.0, Condition::Sunny, 2),
            DatedReading::point("2024-05-02", 12.0, Condition::Cloudy, 3),
        ];

        let days = group_by_date(readings);
        let dates: Vec<_> = days.iter().map(|d| d.date.as_str()).collect();
        assert_eq!(dates, vec!["2024-05-02", "2024-05-01"]);
        assert_eq!(days[0].items, vec![1, 3]);
    }

    #[test]
    fn test_unvoted_reading_widens_range_only() {
        let readings = vec![
            DatedReading::point("2024-05-01", 15.0, Condition::Snowy, ()),
            DatedReading {
                date: "2024-05-01".to_string(),
                high_c: 21.0,
                low_c: 9.0,
                condition: None,
                item: (),
            },
        ];

        let days = group_by_date(readings);
        assert_eq!(days[0].condition, Condition::Snowy);
        assert_eq!(days[0].high_c, 21.0);
        assert_eq!(days[0].low_c, 9.0);
    }

    #[test]
    fn test_empty_input() {
        assert!(group_by_date(Vec::<DatedReading<()>>::new()).is_empty());
        assert_eq!(dominant_condition(&[]), None);
    }
}
