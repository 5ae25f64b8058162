//! Projection output structures

use serde::{Deserialize, Serialize};

use crate::assumptions::ScalePoint;

/// One projected year, as written to CSV
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProjectionRow {
    pub year: i32,
    /// Both sexes, in persons
    pub total: f64,
    pub mean_age: f64,
    pub fertility_scale: f64,
}

/// Complete projection result: parallel series indexed by year
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProjectionOutput {
    pub years: Vec<i32>,
    pub totals: Vec<f64>,
    pub mean_ages: Vec<f64>,
    pub fertility_scales: Vec<f64>,
}

impl ProjectionOutput {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            years: Vec::with_capacity(capacity),
            totals: Vec::with_capacity(capacity),
            mean_ages: Vec::with_capacity(capacity),
            fertility_scales: Vec::with_capacity(capacity),
        }
    }

    /// Record one projected year
    pub fn push(&mut self, row: ProjectionRow) {
        self.years.push(row.year);
        self.totals.push(row.total);
        self.mean_ages.push(row.mean_age);
        self.fertility_scales.push(row.fertility_scale);
    }

    pub fn len(&self) -> usize {
        self.years.len()
    }

    pub fn is_empty(&self) -> bool {
        self.years.is_empty()
    }

    pub fn row(&self, i: usize) -> Option<ProjectionRow> {
        Some(ProjectionRow {
            year: *self.years.get(i)?,
            total: *self.totals.get(i)?,
            mean_age: *self.mean_ages.get(i)?,
            fertility_scale: *self.fertility_scales.get(i)?,
        })
    }

    pub fn rows(&self) -> impl Iterator<Item = ProjectionRow> + '_ {
        (0..self.len()).filter_map(move |i| self.row(i))
    }

    /// Effective fertility scale per year, for overlaying on the fitted series
    pub fn fertility_path(&self) -> Vec<ScalePoint> {
        self.years
            .iter()
            .zip(&self.fertility_scales)
            .map(|(&year, &scale)| ScalePoint { year, scale })
            .collect()
    }

    /// Get summary statistics
    pub fn summary(&self) -> ProjectionSummary {
        let last = self.len().checked_sub(1).and_then(|i| self.row(i));
        let peak = self
            .rows()
            .fold(None, |best: Option<ProjectionRow>, row| match best {
                Some(b) if b.total >= row.total => Some(b),
                _ => Some(row),
            });

        ProjectionSummary {
            total_years: self.len() as u32,
            final_year: last.map(|r| r.year),
            final_total: last.map(|r| r.total).unwrap_or(0.0),
            final_mean_age: last.map(|r| r.mean_age).unwrap_or(0.0),
            peak_year: peak.map(|r| r.year),
            peak_total: peak.map(|r| r.total).unwrap_or(0.0),
        }
    }
}

/// Summary statistics for a projection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectionSummary {
    pub total_years: u32,
    pub final_year: Option<i32>,
    pub final_total: f64,
    pub final_mean_age: f64,
    /// First year reaching the highest total
    pub peak_year: Option<i32>,
    pub peak_total: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn output(totals: &[f64]) -> ProjectionOutput {
        let mut out = ProjectionOutput::with_capacity(totals.len());
        for (i, &total) in totals.iter().enumerate() {
            out.push(ProjectionRow {
                year: 2026 + i as i32,
                total,
                mean_age: 30.0 + i as f64,
                fertility_scale: 0.4,
            });
        }
        out
    }

    #[test]
    fn test_summary_tracks_peak_and_final() {
        let summary = output(&[10.0, 30.0, 30.0, 20.0]).summary();
        assert_eq!(summary.total_years, 4);
        assert_eq!(summary.final_year, Some(2029));
        assert_eq!(summary.final_total, 20.0);
        assert_eq!(summary.final_mean_age, 33.0);
        assert_eq!(summary.peak_year, Some(2027));
        assert_eq!(summary.peak_total, 30.0);
    }

    #[test]
    fn test_empty_summary() {
        let summary = ProjectionOutput::default().summary();
        assert_eq!(summary.total_years, 0);
        assert_eq!(summary.final_year, None);
        assert_eq!(summary.peak_total, 0.0);
    }

    #[test]
    fn test_rows_and_fertility_path_follow_years() {
        let out = output(&[1.0, 2.0]);
        let rows: Vec<ProjectionRow> = out.rows().collect();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1].year, 2027);
        assert_eq!(rows[1].total, 2.0);

        let path = out.fertility_path();
        assert_eq!(path[0], ScalePoint { year: 2026, scale: 0.4 });
        assert!(out.row(2).is_none());
    }
}
