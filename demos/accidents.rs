//! An example explaining accident severity from road conditions.
use splitwise::{Column, Dataset, ForestBuilder, ForestConfig, ForestIO, Selections, TreeMode, Value};
use std::env;
use std::error::Error;

const ACCIDENTS: &str = "\
light,road,speed_limit,helmet,region,severity
dark,wet,50,false,north,severe
dark,wet,50,false,north,severe
dark,wet,30,true,south,severe
dark,dry,50,false,north,severe
dark,dry,30,true,north,minor
dark,dry,30,,north,minor
lit,wet,50,true,south,minor
lit,dry,30,true,north,minor
lit,wet,50,false,south,severe
lit,dry,30,true,north,minor
lit,wet,50,true,south,minor
lit,dry,70,false,north,severe
dark,wet,70,false,north,severe
lit,dry,30,true,south,minor
dark,wet,30,true,north,minor
lit,wet,70,,north,severe
";

fn parse_cell(raw: &str) -> Option<Value> {
    let raw = raw.trim();
    if raw.is_empty() {
        None
    } else if let Ok(i) = raw.parse::<i64>() {
        Some(Value::Int(i))
    } else if let Ok(f) = raw.parse::<f64>() {
        Some(Value::Float(f))
    } else {
        Some(Value::from(raw).normalized())
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let args: Vec<String> = env::args().collect();
    let mode = match args.get(1) {
        Some(m) => m.parse::<TreeMode>()?,
        None => TreeMode::Independent,
    };
    let threshold = match args.get(2) {
        Some(t) => Some(t.parse::<i64>()?),
        None => None,
    };

    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(ACCIDENTS.as_bytes());
    let headers = csv_reader.headers()?.clone();
    let mut cells: Vec<Vec<Option<Value>>> = vec![Vec::new(); headers.len()];
    for result in csv_reader.records() {
        let record = result?;
        for (j, raw) in record.iter().enumerate() {
            cells[j].push(parse_cell(raw));
        }
    }
    let columns = headers
        .iter()
        .zip(cells)
        .map(|(name, values)| Column::new(name, values))
        .collect();
    let data = Dataset::new(columns)?;

    let selections: Selections = vec![
        ("region", vec![Value::from("north")]),
        ("severity", vec![Value::from("severe")]),
    ]
    .into_iter()
    .collect();

    let config = ForestConfig::new(mode, threshold);
    let result = ForestBuilder::new(config).build(
        &data,
        &["light", "road", "speed_limit", "helmet"],
        &["severity"],
        &selections,
    )?;

    println!("{}", result);
    println!("{}", result.json_dump()?);
    Ok(())
}
