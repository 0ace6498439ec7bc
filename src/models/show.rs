//! Show listing model

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A concert or appearance listed on the site
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Show {
    pub id: i64,
    pub name: String,
    /// Day of the show; shows without a date are always upcoming
    pub date: Option<NaiveDate>,
    pub time: Option<String>,
    pub location: Option<String>,
    pub description: Option<String>,
}

impl Show {
    /// Whether the show belongs in the upcoming list on `today`
    pub fn is_upcoming(&self, today: NaiveDate) -> bool {
        match self.date {
            Some(date) => date >= today,
            None => true,
        }
    }
}

/// Split shows into (upcoming, past), each ordered by date with undated shows last
pub fn partition_shows(mut shows: Vec<Show>, today: NaiveDate) -> (Vec<Show>, Vec<Show>) {
    shows.sort_by(|a, b| match (a.date, b.date) {
        (Some(x), Some(y)) => x.cmp(&y),
        (Some(_), None) => std::cmp::Ordering::Less,
        (None, Some(_)) => std::cmp::Ordering::Greater,
        (None, None) => a.id.cmp(&b.id),
    });

    shows.into_iter().partition(|s| s.is_upcoming(today))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn show(id: i64, date: Option<&str>) -> Show {
        Show {
            id,
            name: format!("show {id}"),
            date: date.map(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").unwrap()),
            time: None,
            location: None,
            description: None,
        }
    }

    #[test]
    fn test_partition_boundary() {
        let today = NaiveDate::from_ymd_opt(2024, 5, 10).unwrap();
        let shows = vec![
            show(1, Some("2024-05-09")),
            show(2, Some("2024-05-10")),
            show(3, None),
            show(4, Some("2024-06-01")),
            show(5, Some("2023-01-01")),
        ];

        let (upcoming, past) = partition_shows(shows, today);
        let upcoming: Vec<i64> = upcoming.iter().map(|s| s.id).collect();
        let past: Vec<i64> = past.iter().map(|s| s.id).collect();

        assert_eq!(upcoming, vec![2, 4, 3]);
        assert_eq!(past, vec![5, 1]);
    }
}
