//! Demo mode for the data source inspector
//! Creates synthetic data to showcase features

use std::sync::Arc;
use arrow::array::{ArrayRef, Float64Array, Int64Array};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use anyhow::Result;
use dv_data::{FrameIndex, LabeledFrame};

/// Number of synthetic scatter points
const DEMO_ROWS: usize = 12;

/// Scatter points on a noisy spiral, indexed by sample number
pub fn scatter_frame() -> Result<LabeledFrame> {
    let schema = Arc::new(Schema::new(vec![
        Field::new("x", DataType::Float64, false),
        Field::new("y", DataType::Float64, false),
    ]));

    let (x, y): (Vec<f64>, Vec<f64>) = (0..DEMO_ROWS)
        .map(|i| {
            let t = i as f64 * 0.5;
            // Deterministic jitter so the output is stable between runs
            let jitter = ((i * 7919) % 13) as f64 / 13.0 - 0.5;
            (round2(t * t.cos() + jitter), round2(t * t.sin() - jitter))
        })
        .unzip();

    let batch = RecordBatch::try_new(
        schema,
        vec![
            Arc::new(Float64Array::from(x)) as ArrayRef,
            Arc::new(Float64Array::from(y)) as ArrayRef,
        ],
    )?;

    let samples: ArrayRef = Arc::new(Int64Array::from_iter_values(100..100 + DEMO_ROWS as i64));
    let index = FrameIndex::single(Some("sample".to_string()), samples);
    Ok(LabeledFrame::with_index(batch, index)?)
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
