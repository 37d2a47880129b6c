//! SVG rendering of dashboard figures

use std::collections::BTreeMap;
use std::error::Error;
use std::fs;
use std::ops::Range;
use std::path::Path;

use plotters::prelude::*;
use tracing::{debug, instrument};

use crate::models::{ClimateVariable, PredictionResult};
use crate::report::AnnualAggregate;
use crate::{ClimateError, Result};

const SIZE: (u32, u32) = (900, 540);

type DrawResult = std::result::Result<(), Box<dyn Error>>;

/// Historical values of the forecast month plus the predicted point
#[instrument(level = "debug", skip(series, prediction, path))]
pub fn render_prediction_context(
    series: &[(i32, f64)],
    prediction: &PredictionResult,
    path: &Path,
) -> Result<()> {
    prepare(path)?;
    draw_prediction_context(series, prediction, path).map_err(to_chart_error)?;
    debug!("Wrote prediction chart to {}", path.display());
    Ok(())
}

fn draw_prediction_context(
    series: &[(i32, f64)],
    prediction: &PredictionResult,
    path: &Path,
) -> DrawResult {
    let root = SVGBackend::new(path, SIZE).into_drawing_area();
    root.fill(&WHITE)?;

    let first_year = series
        .first()
        .map_or(prediction.year, |&(year, _)| year.min(prediction.year));
    let last_year = series
        .last()
        .map_or(prediction.year, |&(year, _)| year.max(prediction.year));
    let y_range = padded_range(
        series
            .iter()
            .map(|&(_, t)| t)
            .chain([prediction.predicted_temperature, prediction.historical_average]),
    );

    let mut chart = ChartBuilder::on(&root)
        .caption(
            format!("Temperature for month {:02}", prediction.month),
            ("sans-serif", 24),
        )
        .margin(12)
        .x_label_area_size(40)
        .y_label_area_size(50)
        .build_cartesian_2d(first_year - 1..last_year + 1, y_range)?;

    chart
        .configure_mesh()
        .x_desc("Year")
        .y_desc("Average temperature (°C)")
        .draw()?;

    if !series.is_empty() {
        chart
            .draw_series(LineSeries::new(series.iter().copied(), &BLUE))?
            .label("Historical")
            .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], &BLUE));
        chart.draw_series(
            series
                .iter()
                .map(|&point| Circle::new(point, 3, BLUE.filled())),
        )?;
    }

    chart
        .draw_series(LineSeries::new(
            [
                (first_year - 1, prediction.historical_average),
                (last_year + 1, prediction.historical_average),
            ],
            &BLACK.mix(0.5),
        ))?
        .label("Historical average")
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], &BLACK.mix(0.5)));

    chart
        .draw_series(std::iter::once(Circle::new(
            (prediction.year, prediction.predicted_temperature),
            6,
            RED.filled(),
        )))?
        .label(format!("Prediction {}", prediction.year))
        .legend(|(x, y)| Circle::new((x + 10, y), 4, RED.filled()));

    chart
        .configure_series_labels()
        .background_style(&WHITE.mix(0.8))
        .border_style(&BLACK)
        .draw()?;

    root.present()?;
    Ok(())
}

/// Annual mean temperature with rainfall rescaled onto the temperature axis
#[instrument(level = "debug", skip(aggregates, path))]
pub fn render_annual_trends(aggregates: &[AnnualAggregate], path: &Path) -> Result<()> {
    if aggregates.is_empty() {
        return Err(ClimateError::no_data("no annual aggregates to plot"));
    }
    prepare(path)?;
    draw_annual_trends(aggregates, path).map_err(to_chart_error)?;
    debug!("Wrote annual trend chart to {}", path.display());
    Ok(())
}

fn draw_annual_trends(aggregates: &[AnnualAggregate], path: &Path) -> DrawResult {
    let root = SVGBackend::new(path, SIZE).into_drawing_area();
    root.fill(&WHITE)?;

    let temperature = span(aggregates.iter().map(|a| a.average_temperature));
    let rainfall = span(aggregates.iter().map(|a| a.total_rainfall));
    let rescale = |rain: f64| {
        if rainfall.end > rainfall.start {
            temperature.start
                + (rain - rainfall.start) / (rainfall.end - rainfall.start)
                    * (temperature.end - temperature.start)
        } else {
            (temperature.start + temperature.end) / 2.0
        }
    };

    let first_year = aggregates[0].year;
    let last_year = aggregates[aggregates.len() - 1].year;
    let y_range = padded_range([temperature.start, temperature.end].into_iter());

    let mut chart = ChartBuilder::on(&root)
        .caption("Annual temperature and rainfall", ("sans-serif", 24))
        .margin(12)
        .x_label_area_size(40)
        .y_label_area_size(50)
        .build_cartesian_2d(first_year..last_year.max(first_year + 1), y_range)?;

    chart
        .configure_mesh()
        .x_desc("Year")
        .y_desc("Average temperature (°C)")
        .draw()?;

    chart
        .draw_series(LineSeries::new(
            aggregates.iter().map(|a| (a.year, a.average_temperature)),
            &RED,
        ))?
        .label(ClimateVariable::AverageTemperature.label())
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], &RED));

    chart
        .draw_series(LineSeries::new(
            aggregates.iter().map(|a| (a.year, rescale(a.total_rainfall))),
            &BLUE,
        ))?
        .label(format!(
            "{} (scaled, {:.0}-{:.0} mm)",
            ClimateVariable::TotalRainfall.label(),
            rainfall.start,
            rainfall.end
        ))
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], &BLUE));

    chart
        .configure_series_labels()
        .background_style(&WHITE.mix(0.8))
        .border_style(&BLACK)
        .draw()?;

    root.present()?;
    Ok(())
}

/// Bar chart of the seasonal component per calendar month
#[instrument(level = "debug", skip(pattern, path))]
pub fn render_seasonal_pattern(
    pattern: &BTreeMap<u32, f64>,
    variable: ClimateVariable,
    path: &Path,
) -> Result<()> {
    if pattern.is_empty() {
        return Err(ClimateError::no_data("no seasonal pattern to plot"));
    }
    prepare(path)?;
    draw_seasonal_pattern(pattern, variable, path).map_err(to_chart_error)?;
    debug!("Wrote seasonal chart to {}", path.display());
    Ok(())
}

fn draw_seasonal_pattern(
    pattern: &BTreeMap<u32, f64>,
    variable: ClimateVariable,
    path: &Path,
) -> DrawResult {
    let root = SVGBackend::new(path, SIZE).into_drawing_area();
    root.fill(&WHITE)?;

    // bars start at zero, so the axis must include it
    let y_range = padded_range(pattern.values().copied().chain([0.0]));

    let mut chart = ChartBuilder::on(&root)
        .caption(
            format!("Seasonal pattern of {}", variable.label()),
            ("sans-serif", 24),
        )
        .margin(12)
        .x_label_area_size(40)
        .y_label_area_size(50)
        .build_cartesian_2d(0.5f64..12.5f64, y_range)?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(12)
        .x_label_formatter(&|x| format!("{:.0}", x))
        .x_desc("Month")
        .y_desc("Seasonal component")
        .draw()?;

    chart.draw_series(pattern.iter().map(|(&month, &value)| {
        let x = f64::from(month);
        let color = if value >= 0.0 { RED } else { BLUE };
        Rectangle::new([(x - 0.35, 0.0), (x + 0.35, value)], color.mix(0.7).filled())
    }))?;

    root.present()?;
    Ok(())
}

fn prepare(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    Ok(())
}

fn to_chart_error(error: Box<dyn Error>) -> ClimateError {
    ClimateError::chart(error.to_string())
}

fn span(values: impl Iterator<Item = f64>) -> Range<f64> {
    values.fold(f64::INFINITY..f64::NEG_INFINITY, |range, v| {
        range.start.min(v)..range.end.max(v)
    })
}

/// Value range with a margin; flat or empty input still yields a drawable axis
fn padded_range(values: impl Iterator<Item = f64>) -> Range<f64> {
    let Range { start, end } = span(values);
    if !start.is_finite() || !end.is_finite() {
        return 0.0..1.0;
    }
    let pad = ((end - start) * 0.1).max(0.5);
    start - pad..end + pad
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::synthetic_dataset;
    use crate::models::Direction;
    use crate::report::{annual_aggregates, decompose, monthly_seasonal_pattern};
    use tempfile::TempDir;

    fn prediction() -> PredictionResult {
        PredictionResult {
            year: 2025,
            month: 6,
            predicted_temperature: 23.4,
            historical_average: 22.9,
            delta: 0.5,
            direction: Direction::Higher,
        }
    }

    fn assert_svg(path: &Path) {
        let content = fs::read_to_string(path).unwrap();
        assert!(content.contains("<svg"));
    }

    #[test]
    fn test_prediction_chart() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("charts/prediction.svg");
        let series = vec![(2000, 22.5), (2001, 23.1), (2002, 22.8)];

        render_prediction_context(&series, &prediction(), &path).unwrap();
        assert_svg(&path);
    }

    #[test]
    fn test_prediction_chart_without_history() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("prediction.svg");

        render_prediction_context(&[], &prediction(), &path).unwrap();
        assert_svg(&path);
    }

    #[test]
    fn test_annual_chart() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("annual.svg");
        let annual = annual_aggregates(&synthetic_dataset(2000, 2010));

        render_annual_trends(&annual, &path).unwrap();
        assert_svg(&path);
    }

    #[test]
    fn test_seasonal_chart() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("seasonal.svg");
        let decomposition =
            decompose(&synthetic_dataset(2000, 2003), ClimateVariable::TotalRainfall).unwrap();
        let pattern = monthly_seasonal_pattern(&decomposition);

        render_seasonal_pattern(&pattern, ClimateVariable::TotalRainfall, &path).unwrap();
        assert_svg(&path);
    }

    #[test]
    fn test_empty_inputs() {
        let dir = TempDir::new().unwrap();
        assert!(matches!(
            render_annual_trends(&[], &dir.path().join("a.svg")),
            Err(ClimateError::NoData { .. })
        ));
        assert!(matches!(
            render_seasonal_pattern(
                &BTreeMap::new(),
                ClimateVariable::AverageTemperature,
                &dir.path().join("s.svg")
            ),
            Err(ClimateError::NoData { .. })
        ));
    }

    #[test]
    fn test_padded_range_handles_flat_values() {
        let range = padded_range([3.0, 3.0].into_iter());
        assert!(range.start < 3.0 && range.end > 3.0);
        assert_eq!(padded_range(std::iter::empty()), 0.0..1.0);
    }
}
