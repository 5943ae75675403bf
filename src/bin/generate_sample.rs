use std::sync::Arc;

use anyhow::Context;
use arrow::array::{Float64Array, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;

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
}

/// Booster generations in flight order: (category, first flight, success rate).
const BOOSTERS: [(&str, u32, f64); 5] = [
    ("v1.0", 1, 0.0),
    ("v1.1", 6, 0.15),
    ("FT", 21, 0.65),
    ("B4", 38, 0.55),
    ("B5", 50, 0.9),
];

const SITES: [&str; 4] = ["CCAFS LC-40", "VAFB SLC-4E", "KSC LC-39A", "CCAFS SLC-40"];

struct Row {
    flight: i64,
    site: &'static str,
    class: i64,
    payload: f64,
    booster_version: String,
    category: &'static str,
}

fn generate(rng: &mut SimpleRng, flights: u32) -> Vec<Row> {
    (1..=flights)
        .map(|flight| {
            let (category, _, success_rate) = BOOSTERS
                .iter()
                .rev()
                .find(|(_, first, _)| flight >= *first)
                .copied()
                .unwrap_or(BOOSTERS[0]);

            let site = match flight {
                1..=10 => SITES[0],
                _ => SITES[(rng.next_u64() % SITES.len() as u64) as usize],
            };
            // heavier payloads once boosters mature
            let ceiling = 2_000.0 + 700.0 * f64::from(flight).min(20.0);
            let payload = (rng.next_f64() * ceiling).round();
            let class = i64::from(rng.next_f64() < success_rate);

            Row {
                flight: i64::from(flight),
                site,
                class,
                payload,
                booster_version: format!("F9 {category} B{:04}", 1000 + flight),
                category,
            }
        })
        .collect()
}

fn write_csv(path: &str, rows: &[Row]) -> anyhow::Result<()> {
    let mut writer = csv::Writer::from_path(path).with_context(|| format!("creating {path}"))?;
    writer.write_record([
        "Unnamed: 0",
        "Flight Number",
        "Launch Site",
        "class",
        "Payload Mass (kg)",
        "Booster Version",
        "Booster Version Category",
    ])?;
    for (i, r) in rows.iter().enumerate() {
        writer.write_record([
            i.to_string(),
            r.flight.to_string(),
            r.site.to_string(),
            r.class.to_string(),
            format!("{:.1}", r.payload),
            r.booster_version.clone(),
            r.category.to_string(),
        ])?;
    }
    writer.flush()?;
    Ok(())
}

fn write_parquet(path: &str, rows: &[Row]) -> anyhow::Result<()> {
    let schema = Arc::new(Schema::new(vec![
        Field::new("Flight Number", DataType::Int64, false),
        Field::new("Launch Site", DataType::Utf8, false),
        Field::new("class", DataType::Int64, false),
        Field::new("Payload Mass (kg)", DataType::Float64, false),
        Field::new("Booster Version", DataType::Utf8, false),
        Field::new("Booster Version Category", DataType::Utf8, false),
    ]));

    let batch = RecordBatch::try_new(
        schema.clone(),
        vec![
            Arc::new(Int64Array::from_iter_values(rows.iter().map(|r| r.flight))),
            Arc::new(StringArray::from_iter_values(rows.iter().map(|r| r.site))),
            Arc::new(Int64Array::from_iter_values(rows.iter().map(|r| r.class))),
            Arc::new(Float64Array::from_iter_values(rows.iter().map(|r| r.payload))),
            Arc::new(StringArray::from_iter_values(
                rows.iter().map(|r| r.booster_version.as_str()),
            )),
            Arc::new(StringArray::from_iter_values(rows.iter().map(|r| r.category))),
        ],
    )
    .context("building record batch")?;

    let file = std::fs::File::create(path).with_context(|| format!("creating {path}"))?;
    let mut writer = ArrowWriter::try_new(file, schema, None)?;
    writer.write(&batch)?;
    writer.close()?;
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let mut rng = SimpleRng::new(42);
    let rows = generate(&mut rng, 56);

    write_csv("spacex_launch_dash.csv", &rows)?;
    write_parquet("spacex_launch_dash.parquet", &rows)?;

    println!(
        "Wrote {} launches to spacex_launch_dash.csv and spacex_launch_dash.parquet",
        rows.len()
    );
    Ok(())
}
