use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{ArrayRef, Float64Builder, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;

/// splitmix64; deterministic so every run writes the same sample.
struct SampleRng(u64);

impl SampleRng {
    fn next_u64(&mut self) -> u64 {
        self.0 = self.0.wrapping_add(0x9E37_79B9_7F4A_7C15);
        let mut z = self.0;
        z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
        z ^ (z >> 31)
    }

    /// Uniform in [0, 1).
    fn unit(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let radius = (-2.0 * self.unit().max(1e-15).ln()).sqrt();
        mean + std_dev * radius * (std::f64::consts::TAU * self.unit()).cos()
    }

    fn pick<'a>(&mut self, items: &[&'a str]) -> &'a str {
        items[(self.next_u64() % items.len() as u64) as usize]
    }
}

const FIRST_NAMES: [&str; 12] = [
    "Asha", "Ben", "Chen", "Divya", "Emeka", "Farah", "Gabriel", "Hana", "Ivan", "Jaya", "Kofi",
    "Lena",
];
const GENDERS: [&str; 2] = ["Female", "Male"];
const LUNCH: [&str; 2] = ["standard", "free/reduced"];
const SUBJECTS: [&str; 4] = ["Math", "Science", "English", "History"];

struct Student {
    roll: i64,
    name: String,
    gender: String,
    lunch: String,
    scores: Vec<Option<f64>>,
}

fn generate(n: usize, rng: &mut SampleRng) -> Vec<Student> {
    (0..n)
        .map(|i| {
            // shared ability makes the subjects correlate
            let ability = rng.gauss(0.0, 1.0);
            let lunch = rng.pick(&LUNCH).to_string();
            let boost = if lunch == "standard" { 4.0 } else { -4.0 };
            let scores = SUBJECTS
                .iter()
                .enumerate()
                .map(|(j, _)| {
                    // ~3% of cells are left blank
                    if rng.unit() < 0.03 {
                        return None;
                    }
                    let base = 62.0 + 3.0 * j as f64;
                    let raw = base + boost + 12.0 * ability + rng.gauss(0.0, 6.0);
                    Some(raw.clamp(0.0, 100.0).round())
                })
                .collect();
            Student {
                roll: i as i64 + 1,
                name: format!("{} {}", rng.pick(&FIRST_NAMES), (b'A' + (i % 26) as u8) as char),
                gender: rng.pick(&GENDERS).to_string(),
                lunch,
                scores,
            }
        })
        .collect()
}

fn write_csv(path: &str, students: &[Student]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path).context("creating CSV file")?;
    let mut header = vec!["Roll No", "Student Name", "Gender", "Lunch"];
    header.extend(SUBJECTS);
    writer.write_record(&header)?;
    for s in students {
        let mut record = vec![
            s.roll.to_string(),
            s.name.clone(),
            s.gender.clone(),
            s.lunch.clone(),
        ];
        record.extend(
            s.scores
                .iter()
                .map(|v| v.map(|x| x.to_string()).unwrap_or_default()),
        );
        writer.write_record(&record)?;
    }
    writer.flush()?;
    Ok(())
}

fn write_parquet(path: &str, students: &[Student]) -> Result<()> {
    let mut fields = vec![
        Field::new("Roll No", DataType::Int64, false),
        Field::new("Student Name", DataType::Utf8, false),
        Field::new("Gender", DataType::Utf8, false),
        Field::new("Lunch", DataType::Utf8, false),
    ];
    fields.extend(SUBJECTS.iter().map(|s| Field::new(*s, DataType::Float64, true)));
    let schema = Arc::new(Schema::new(fields));

    let mut columns: Vec<ArrayRef> = vec![
        Arc::new(Int64Array::from(students.iter().map(|s| s.roll).collect::<Vec<_>>())),
        Arc::new(StringArray::from(
            students.iter().map(|s| s.name.as_str()).collect::<Vec<_>>(),
        )),
        Arc::new(StringArray::from(
            students.iter().map(|s| s.gender.as_str()).collect::<Vec<_>>(),
        )),
        Arc::new(StringArray::from(
            students.iter().map(|s| s.lunch.as_str()).collect::<Vec<_>>(),
        )),
    ];
    for j in 0..SUBJECTS.len() {
        let mut builder = Float64Builder::new();
        for s in students {
            builder.append_option(s.scores[j]);
        }
        columns.push(Arc::new(builder.finish()));
    }

    let batch = RecordBatch::try_new(schema.clone(), columns).context("building record batch")?;
    let file = std::fs::File::create(path).context("creating parquet file")?;
    let mut writer = ArrowWriter::try_new(file, schema, None).context("creating parquet writer")?;
    writer.write(&batch).context("writing record batch")?;
    writer.close().context("closing parquet writer")?;
    Ok(())
}

fn main() -> Result<()> {
    let mut rng = SampleRng(42);
    let students = generate(120, &mut rng);

    write_csv("sample_scores.csv", &students)?;
    write_parquet("sample_scores.parquet", &students)?;

    println!(
        "Wrote {} students ({} subjects) to sample_scores.csv and sample_scores.parquet",
        students.len(),
        SUBJECTS.len()
    );
    Ok(())
}
