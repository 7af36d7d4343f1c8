//! Writes `animes.csv` and `animes.parquet`: a deterministic synthetic
//! dataset with the same quirks as real exports (messy headers, duplicate
//! titles, out-of-range ratings, unparseable dates).

use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{Float64Array, Int64Array, ListBuilder, StringArray, StringBuilder};
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

const PREFIXES: [&str; 10] = [
    "Shadow", "Crimson", "Silent", "Iron", "Starlight", "Hollow", "Neon", "Eternal", "Wild", "Paper",
];
const SUFFIXES: [&str; 10] = [
    "Blade", "Academy", "Garden", "Requiem", "Frontier", "Alchemist", "Chronicle", "Drift", "Bloom", "Protocol",
];
const GENRES: [&str; 8] = [
    "Action", "Adventure", "Comedy", "Drama", "Fantasy", "Romance", "Sci-Fi", "Slice of Life",
];
const STUDIOS: [&str; 8] = [
    "Bones", "Madhouse", "MAPPA", "Pierrot", "Sunrise", "Kyoto Animation", "Wit Studio", "Toei Animation",
];
const STATUSES: [&str; 3] = ["Terminé", "En cours", "Abandonné"];
const SOURCES: [&str; 4] = ["Manga", "Light Novel", "Original", "Jeu vidéo"];

struct Row {
    title: String,
    genres: Vec<&'static str>,
    source: &'static str,
    status: &'static str,
    studio: &'static str,
    date: String,
    rating: f64,
    best: f64,
    worst: f64,
    episodes: i64,
}

fn generate(rng: &mut SimpleRng) -> Vec<Row> {
    let mut rows = Vec::new();
    for prefix in PREFIXES {
        for suffix in SUFFIXES {
            if rng.next_f64() < 0.4 {
                continue;
            }
            let n_genres = 1 + (rng.next_u64() % 3) as usize;
            let mut genres = Vec::with_capacity(n_genres);
            while genres.len() < n_genres {
                let g = rng.pick(&GENRES);
                if !genres.contains(&g) {
                    genres.push(g);
                }
            }

            let rating = rng.gauss(7.2, 1.2);
            let year = 1995 + (rng.next_u64() % 30) as i32;
            let month = 1 + (rng.next_u64() % 12) as u32;
            let day = 1 + (rng.next_u64() % 28) as u32;

            rows.push(Row {
                title: format!("{prefix} {suffix}"),
                genres,
                source: rng.pick(&SOURCES),
                status: rng.pick(&STATUSES),
                studio: rng.pick(&STUDIOS),
                date: format!("{year:04}-{month:02}-{day:02}"),
                rating: (rating * 10.0).round() / 10.0,
                best: ((rating + 1.0 + rng.next_f64()) * 10.0).round() / 10.0,
                worst: ((rating - 1.5 - rng.next_f64()) * 10.0).round() / 10.0,
                episodes: [1, 12, 13, 24, 26, 50, 150][(rng.next_u64() % 7) as usize],
            });
        }
    }

    // Quirks the loader has to clean up.
    if let Some(first) = rows.first() {
        let duplicate = Row {
            title: format!("  {}  ", first.title.to_lowercase()),
            genres: vec!["Comedy"],
            source: "Original",
            status: "Terminé",
            studio: "Bones",
            date: "unknown".to_string(),
            rating: 4.0,
            best: 5.0,
            worst: 3.0,
            episodes: 3,
        };
        rows.push(duplicate);
    }
    rows.push(Row {
        title: "Overflow Test".to_string(),
        genres: Vec::new(),
        source: "Original",
        status: "En cours",
        studio: "MAPPA",
        date: "31/12/2020".to_string(),
        rating: 11.5,
        best: 12.0,
        worst: -1.0,
        episodes: 12,
    });
    rows.push(Row {
        title: "Unrated Pilot".to_string(),
        genres: vec!["Drama"],
        source: "Original",
        status: "Abandonné",
        studio: "Sunrise",
        date: "someday".to_string(),
        rating: f64::NAN,
        best: f64::NAN,
        worst: f64::NAN,
        episodes: 1,
    });
    rows
}

fn write_csv(rows: &[Row], path: &str) -> Result<()> {
    let mut wtr = csv::Writer::from_path(path).with_context(|| format!("creating {path}"))?;
    // Headers deliberately use spacing/casing the loader normalizes.
    wtr.write_record([
        "Anime", " Genre Tags", "Source", "Status", "Studio", "Date Pub", "Note Globale",
        "Note Meilleur Ep", "Note Pire Ep", "Nb Episodes",
    ])?;
    for r in rows {
        let fmt = |v: f64| if v.is_nan() { String::new() } else { v.to_string() };
        wtr.write_record([
            r.title.clone(),
            r.genres.join(" / "),
            r.source.to_string(),
            r.status.to_string(),
            r.studio.to_string(),
            r.date.clone(),
            fmt(r.rating),
            fmt(r.best),
            fmt(r.worst),
            r.episodes.to_string(),
        ])?;
    }
    wtr.flush().context("flushing CSV")?;
    Ok(())
}

fn write_parquet(rows: &[Row], path: &str) -> Result<()> {
    let mut genre_builder = ListBuilder::new(StringBuilder::new());
    for r in rows {
        for g in &r.genres {
            genre_builder.values().append_value(g);
        }
        genre_builder.append(true);
    }

    let opt = |v: f64| (!v.is_nan()).then_some(v);
    let schema = Arc::new(Schema::new(vec![
        Field::new("anime", DataType::Utf8, false),
        Field::new(
            "genre_tags",
            DataType::List(Arc::new(Field::new("item", DataType::Utf8, true))),
            false,
        ),
        Field::new("source", DataType::Utf8, false),
        Field::new("status", DataType::Utf8, false),
        Field::new("studio", DataType::Utf8, false),
        Field::new("date_pub", DataType::Utf8, false),
        Field::new("note_globale", DataType::Float64, true),
        Field::new("note_meilleur_ep", DataType::Float64, true),
        Field::new("note_pire_ep", DataType::Float64, true),
        Field::new("nb_episodes", DataType::Int64, false),
    ]));

    let batch = RecordBatch::try_new(
        schema.clone(),
        vec![
            Arc::new(StringArray::from_iter_values(rows.iter().map(|r| r.title.as_str()))),
            Arc::new(genre_builder.finish()),
            Arc::new(StringArray::from_iter_values(rows.iter().map(|r| r.source))),
            Arc::new(StringArray::from_iter_values(rows.iter().map(|r| r.status))),
            Arc::new(StringArray::from_iter_values(rows.iter().map(|r| r.studio))),
            Arc::new(StringArray::from_iter_values(rows.iter().map(|r| r.date.as_str()))),
            Arc::new(Float64Array::from_iter(rows.iter().map(|r| opt(r.rating)))),
            Arc::new(Float64Array::from_iter(rows.iter().map(|r| opt(r.best)))),
            Arc::new(Float64Array::from_iter(rows.iter().map(|r| opt(r.worst)))),
            Arc::new(Int64Array::from_iter_values(rows.iter().map(|r| r.episodes))),
        ],
    )
    .context("building record batch")?;

    let file = std::fs::File::create(path).with_context(|| format!("creating {path}"))?;
    let mut writer = ArrowWriter::try_new(file, schema, None).context("creating parquet writer")?;
    writer.write(&batch).context("writing batch")?;
    writer.close().context("closing parquet writer")?;
    Ok(())
}

fn main() -> Result<()> {
    let mut rng = SimpleRng::new(42);
    let rows = generate(&mut rng);

    write_csv(&rows, "animes.csv")?;
    write_parquet(&rows, "animes.parquet")?;

    println!("Wrote {} rows to animes.csv and animes.parquet", rows.len());
    Ok(())
}
