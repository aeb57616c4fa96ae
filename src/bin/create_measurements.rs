use anyhow::{Context, Result, anyhow};
use clap::Parser;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Normal};
use std::fs;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use std::str::FromStr;

const STATIONS: &[(&str, f64)] = &[
    ("Abha", 18.0),
    ("Abidjan", 26.0),
    ("Abéché", 29.4),
    ("Accra", 26.4),
    ("Addis Ababa", 16.0),
    ("Adelaide", 17.3),
    ("Aden", 29.1),
    ("Alexandria", 20.0),
    ("Anchorage", 2.8),
    ("Athens", 19.2),
    ("Baghdad", 22.77),
    ("Bangkok", 28.6),
    ("Berlin", 10.3),
    ("Bulawayo", 18.9),
    ("Cairo", 21.4),
    ("Dakar", 24.0),
    ("Dhaka", 25.9),
    ("Dikson", -11.1),
    ("Hamburg", 9.7),
    ("Helsinki", 5.9),
    ("Istanbul", 13.9),
    ("Jakarta", 26.7),
    ("Kampala", 20.0),
    ("Lagos", 26.8),
    ("Lima", 19.8),
    ("Melbourne", 15.1),
    ("Mexico City", 17.5),
    ("Nairobi", 17.8),
    ("Oslo", 5.7),
    ("Palembang", 27.3),
    ("Reykjavík", 4.3),
    ("San Francisco", 14.6),
    ("Tokyo", 15.4),
    ("Ulaanbaatar", -0.4),
    ("Vladivostok", 4.9),
    ("Yakutsk", -8.8),
    ("Zürich", 9.3),
];

/// Writes random `<station>;<temperature>` records to stdout
#[derive(Parser, Debug)]
#[command(name = "create_measurements", version)]
struct Args {
    /// Number of records (underscores allowed, e.g. 1_000_000)
    #[arg(value_parser = parse_count)]
    count: u64,

    /// `<name>;<mean>` file to draw stations from, `#` lines ignored
    #[arg(long, value_name = "FILE")]
    stations: Option<PathBuf>,

    /// Seed for reproducible output
    #[arg(long)]
    seed: Option<u64>,
}

fn parse_count(value: &str) -> Result<u64, std::num::ParseIntError> {
    value.replace('_', "").parse()
}

#[derive(Debug)]
struct City {
    name: String,
    distribution: Normal<f64>,
}

impl City {
    fn new(name: &str, mean: f64) -> Result<Self> {
        Ok(Self {
            name: name.to_string(),
            distribution: Normal::new(mean, 10.0)
                .with_context(|| format!("could not create normal distribution for: {}", name))?,
        })
    }

    fn sample(&self, rng: &mut impl Rng) -> f64 {
        self.distribution.sample(rng).clamp(-99.9, 99.9)
    }
}

impl FromStr for City {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (name, mean_str) = s
            .split_once(';')
            .ok_or_else(|| anyhow!("missing ';' in: {}", s))?;
        let mean: f64 = mean_str
            .trim()
            .parse()
            .with_context(|| format!("invalid mean in: {}", s))?;
        City::new(name, mean)
    }
}

fn load_cities(path: Option<&PathBuf>) -> Result<Vec<City>> {
    let Some(path) = path else {
        return STATIONS
            .iter()
            .map(|&(name, mean)| City::new(name, mean))
            .collect();
    };

    let cities = fs::read_to_string(path)
        .with_context(|| format!("could not read {}", path.display()))?
        .lines()
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::parse)
        .collect::<Result<Vec<City>>>()?;

    if cities.is_empty() {
        return Err(anyhow!("no stations in {}", path.display()));
    }

    Ok(cities)
}

fn main() -> Result<()> {
    let args = Args::parse();
    let cities = load_cities(args.stations.as_ref())?;

    let mut rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_rng(&mut rand::rng()),
    };

    let stdout = io::stdout();
    let mut out = BufWriter::with_capacity(1 << 20, stdout.lock());

    for _ in 0..args.count {
        let city = &cities[rng.random_range(0..cities.len())];
        let temp = city.sample(&mut rng);
        writeln!(out, "{};{:.1}", city.name, temp)?;
    }

    out.flush()?;
    Ok(())
}
