use std::sync::Arc;

use arrow::array::{Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use chrono::{Duration, NaiveDate};
use parquet::arrow::ArrowWriter;
use serde_json::json;

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }

    fn pick<'a>(&mut self, items: &[&'a str]) -> &'a str {
        items[(self.next_u64() % items.len() as u64) as usize]
    }
}

struct Row {
    date: String,
    region: String,
    sales: i64,
    cost: i64,
    comment: String,
}

fn main() -> anyhow::Result<()> {
    let mut rng = SimpleRng::new(42);

    let regions = [("North", 120.0), ("South", 90.0), ("East", 150.0), ("West", 60.0)];
    let openers = ["Great", "Slow", "Friendly", "Late", "Excellent", "Poor"];
    let subjects = ["delivery", "service", "product quality", "support team", "price"];
    let closers = ["overall", "this month", "again", "as usual", "in 2023"];

    let start = NaiveDate::from_ymd_opt(2023, 1, 1).ok_or_else(|| anyhow::anyhow!("bad date"))?;

    let mut rows = Vec::new();
    for day in 0..90 {
        let date = start + Duration::days(day);
        for &(region, base) in &regions {
            let sales = rng.gauss(base, base * 0.2).max(0.0) as i64;
            let cost = (sales as f64 * rng.gauss(0.6, 0.05)) as i64;
            let comment = format!(
                "{} {} {}",
                rng.pick(&openers),
                rng.pick(&subjects),
                rng.pick(&closers)
            );
            rows.push(Row {
                date: date.format("%Y-%m-%d").to_string(),
                region: region.to_string(),
                sales,
                cost,
                comment,
            });
        }
    }

    // Write CSV
    let csv_path = "sample_data.csv";
    let mut writer = csv::Writer::from_path(csv_path)?;
    writer.write_record(["Date", "Region", "Sales", "Cost", "Comment"])?;
    for row in &rows {
        writer.write_record(&[
            row.date.clone(),
            row.region.clone(),
            row.sales.to_string(),
            row.cost.to_string(),
            row.comment.clone(),
        ])?;
    }
    writer.flush()?;

    // Write Parquet with the same rows
    let schema = Arc::new(Schema::new(vec![
        Field::new("Date", DataType::Utf8, false),
        Field::new("Region", DataType::Utf8, false),
        Field::new("Sales", DataType::Int64, false),
        Field::new("Cost", DataType::Int64, false),
        Field::new("Comment", DataType::Utf8, false),
    ]));
    let batch = RecordBatch::try_new(
        schema.clone(),
        vec![
            Arc::new(StringArray::from_iter_values(rows.iter().map(|r| r.date.as_str()))),
            Arc::new(StringArray::from_iter_values(rows.iter().map(|r| r.region.as_str()))),
            Arc::new(Int64Array::from_iter_values(rows.iter().map(|r| r.sales))),
            Arc::new(Int64Array::from_iter_values(rows.iter().map(|r| r.cost))),
            Arc::new(StringArray::from_iter_values(rows.iter().map(|r| r.comment.as_str()))),
        ],
    )?;
    let parquet_path = "sample_data.parquet";
    let file = std::fs::File::create(parquet_path)?;
    let mut parquet_writer = ArrowWriter::try_new(file, schema, None)?;
    parquet_writer.write(&batch)?;
    parquet_writer.close()?;

    // Job exercising every chart kind
    let job = json!({
        "types": {
            "Date": "datetime",
            "Region": "categoric",
            "Sales": "numeric",
            "Cost": "numeric",
            "Comment": "text"
        },
        "charts": [
            {"type": "pieplot", "x": "Region"},
            {"type": "barplot", "x": "Region", "y": "Sales"},
            {"type": "scatterplot", "x": "Sales", "y": "Cost"},
            {"type": "timeplot", "x": "Date", "y": ["Sales", "Cost"]},
            {"type": "boxplot", "x": "Sales"},
            {"type": "histogram", "x": "Cost", "bins": 50},
            {"type": "correlation"},
            {"type": "wordcloud", "x": "Comment"},
            {"type": "rowlength", "x": "Comment"}
        ],
        "language": "english",
        "stem": false
    });
    let job_path = "sample_job.json";
    std::fs::write(job_path, serde_json::to_string_pretty(&job)?)?;

    println!(
        "Wrote {} rows to {csv_path} and {parquet_path}, job to {job_path}",
        rows.len()
    );
    Ok(())
}
