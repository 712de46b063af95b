use crate::model::{DisplayMatrix, RescaleMode, Weighting};

/// Rescales each sample row by its sum or max. A row whose denominator is zero
/// maps to all zeros.
pub fn build_display(weighting: &Weighting, rescale: RescaleMode) -> DisplayMatrix {
    let mut values = Vec::with_capacity(weighting.scores.len());
    for row in &weighting.scores {
        let denom = match rescale {
            RescaleMode::Sum => row.iter().sum::<f64>(),
            RescaleMode::Max => row.iter().copied().fold(0.0f64, f64::max),
        };
        if denom > 0.0 && denom.is_finite() {
            values.push(row.iter().map(|v| rescale_value(*v, denom)).collect());
        } else {
            values.push(vec![0.0; row.len()]);
        }
    }

    DisplayMatrix {
        samples: weighting.samples.clone(),
        cell_types: weighting.cell_types.clone(),
        values,
        rescale,
    }
}

fn rescale_value(v: f64, denom: f64) -> f64 {
    let out = v / denom;
    if out.is_finite() { out } else { 0.0 }
}

#[cfg(test)]
#[path = "../../tests/src_inline/pipeline/stage4_display.rs"]
mod tests;
