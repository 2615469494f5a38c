//! Chart specifications
//!
//! The page draws the charts; the server only decides what goes in them.

use serde::Serialize;

use crate::aggregate::{StatusCount, YearCount};
use crate::dataset::Dataset;

/// How the year axis places its ticks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TickMode {
    /// One tick per integer step
    Linear,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Bar {
    pub year: i32,
    pub count: usize,
}

/// Count-by-year bar chart
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BarChart {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub color: String,
    pub x_tick_mode: TickMode,
    /// Bars carry their count as a label
    pub show_values: bool,
    pub bars: Vec<Bar>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Slice {
    pub label: String,
    pub value: usize,
}

/// Status distribution pie chart
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PieChart {
    pub title: String,
    pub slices: Vec<Slice>,
}

/// Bar chart of the year series, `None` when there is nothing to plot
pub fn year_chart(dataset: Dataset, series: &[YearCount]) -> Option<BarChart> {
    if series.is_empty() {
        return None;
    }

    let (title, x_label, color) = match dataset {
        Dataset::Contracts => ("Contratos por Año", "Año del Contrato", "#E63946"),
        Dataset::Processes => (
            "Procesos de Contratación por Año",
            "Año del Proceso",
            "#2ca02c",
        ),
    };

    let mut bars: Vec<Bar> = series
        .iter()
        .map(|y| Bar {
            year: y.year,
            count: y.count,
        })
        .collect();
    bars.sort_by_key(|b| b.year);

    Some(BarChart {
        title: title.to_string(),
        x_label: x_label.to_string(),
        y_label: "Cantidad".to_string(),
        color: color.to_string(),
        x_tick_mode: TickMode::Linear,
        show_values: true,
        bars,
    })
}

/// Pie chart of the status distribution, `None` when there is nothing to plot
pub fn status_chart(dataset: Dataset, distribution: &[StatusCount]) -> Option<PieChart> {
    if distribution.is_empty() {
        return None;
    }

    let title = match dataset {
        Dataset::Contracts => "Estado de los Contratos",
        Dataset::Processes => "Estado de los Procesos",
    };

    Some(PieChart {
        title: title.to_string(),
        slices: distribution
            .iter()
            .map(|s| Slice {
                label: s.status.clone(),
                value: s.count,
            })
            .collect(),
    })
}
