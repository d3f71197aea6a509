//! Confusion matrix input: a validated square grid plus its class labels.

use crate::error::{PlotError, Result};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// A square grid of counts or frequencies (row = true class, col = predicted class)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfusionMatrix {
    values: Vec<Vec<f64>>,
    labels: Vec<String>,
}

/// On-disk layout of a matrix file
#[derive(Debug, Deserialize)]
struct MatrixFile {
    matrix: Vec<Vec<f64>>,
    #[serde(default)]
    labels: Vec<String>,
}

impl ConfusionMatrix {
    /// Build a matrix, checking that it is square, finite and that the labels
    /// (when any are given) cover every class.
    pub fn new(values: Vec<Vec<f64>>, labels: Vec<String>) -> Result<Self> {
        let n = values.len();
        for (row, entries) in values.iter().enumerate() {
            if entries.len() != n {
                return Err(PlotError::NotSquare {
                    row,
                    len: entries.len(),
                    expected: n,
                });
            }
            if let Some(col) = entries.iter().position(|v| !v.is_finite()) {
                return Err(PlotError::NonFinite { row, col });
            }
        }

        // An empty label list means "no tick labels", anything else must match
        if !labels.is_empty() && labels.len() != n {
            return Err(PlotError::LabelMismatch {
                labels: labels.len(),
                classes: n,
            });
        }

        Ok(Self { values, labels })
    }

    /// Convenience constructor for borrowed rows and string labels
    pub fn from_rows<S: AsRef<str>>(rows: &[Vec<f64>], labels: &[S]) -> Result<Self> {
        Self::new(
            rows.to_vec(),
            labels.iter().map(|l| l.as_ref().to_string()).collect(),
        )
    }

    /// Load a matrix from a JSON file of the form `{"matrix": [[..]], "labels": [..]}`
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path.as_ref())?;
        let parsed: MatrixFile = serde_json::from_reader(BufReader::new(file))?;
        Self::new(parsed.matrix, parsed.labels)
    }

    /// Number of classes (rows == columns)
    pub fn n_classes(&self) -> usize {
        self.values.len()
    }

    pub fn values(&self) -> &[Vec<f64>] {
        &self.values
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.values[row][col]
    }

    /// Class names as shown on the axes (underscores become spaces)
    pub fn display_labels(&self) -> Vec<String> {
        self.labels.iter().map(|l| display_label(l)).collect()
    }

    /// Largest entry, 0.0 for an empty matrix
    pub fn max(&self) -> f64 {
        self.values
            .iter()
            .flatten()
            .copied()
            .fold(None, |acc: Option<f64>, v| Some(acc.map_or(v, |a| a.max(v))))
            .unwrap_or(0.0)
    }

    /// Smallest entry, 0.0 for an empty matrix
    pub fn min(&self) -> f64 {
        self.values
            .iter()
            .flatten()
            .copied()
            .fold(None, |acc: Option<f64>, v| Some(acc.map_or(v, |a| a.min(v))))
            .unwrap_or(0.0)
    }

    /// Values above this are annotated in white, the rest in black
    pub fn text_threshold(&self) -> f64 {
        self.max() / 2.0
    }

    pub fn total(&self) -> f64 {
        self.values.iter().flatten().sum()
    }

    /// Row-normalized copy; each row sums to 1 unless it was all zeros
    pub fn normalized(&self) -> Self {
        let values = self
            .values
            .iter()
            .map(|row| {
                let sum: f64 = row.iter().sum();
                if sum == 0.0 {
                    vec![0.0; row.len()]
                } else {
                    row.iter().map(|v| v / sum).collect()
                }
            })
            .collect();

        Self {
            values,
            labels: self.labels.clone(),
        }
    }

    /// Fixed-width text rendering with display labels as headers
    pub fn to_table(&self) -> String {
        let labels = self.display_labels();
        let label_at = |i: usize| labels.get(i).map(String::as_str).unwrap_or("");
        let row_width = labels.iter().map(|l| l.chars().count()).max().unwrap_or(0);

        let mut s = String::new();
        s.push_str(&" ".repeat(row_width));
        for j in 0..self.n_classes() {
            s.push_str(&format!(" {:>10}", truncate(label_at(j), 10)));
        }
        s.push('\n');

        for (i, row) in self.values.iter().enumerate() {
            s.push_str(&format!("{:>width$}", label_at(i), width = row_width));
            for v in row {
                s.push_str(&format!(" {:>10.2}", v));
            }
            s.push('\n');
        }

        s
    }
}

/// Axis form of a class name
pub fn display_label(label: &str) -> String {
    label.replace('_', " ")
}

fn truncate(s: &str, max_chars: usize) -> String {
    s.chars().take(max_chars).collect()
}
