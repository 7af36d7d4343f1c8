use std::io;
use std::path::{Path, PathBuf};

use serde::Serialize;
use thiserror::Error;

use super::aggregate::FilteredView;
use super::model::AnimeRecord;

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("Failed to create {}: {source}", path.display())]
    Create {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

/// One exported row. Field names match the normalized input headers so an
/// export loads back through the same loader.
#[derive(Debug, Serialize)]
struct ExportRow<'a> {
    anime: &'a str,
    genre_tags: String,
    genre_principal: &'a str,
    source: &'a str,
    status: &'a str,
    studio: &'a str,
    date_pub: Option<String>,
    note_globale: Option<f64>,
    note_meilleur_ep: Option<f64>,
    note_pire_ep: Option<f64>,
    nb_episodes: u32,
    image_url: Option<&'a str>,
    comm_saison_1: Option<&'a str>,
    meilleur_ep_titre: Option<&'a str>,
}

impl<'a> From<&'a AnimeRecord> for ExportRow<'a> {
    fn from(rec: &'a AnimeRecord) -> Self {
        ExportRow {
            anime: &rec.title,
            genre_tags: rec.genre_tags.join("/"),
            genre_principal: &rec.primary_genre,
            source: &rec.source,
            status: &rec.status,
            studio: &rec.studio,
            date_pub: rec.publish_date.map(|d| d.format("%Y-%m-%d").to_string()),
            note_globale: rec.overall_rating,
            note_meilleur_ep: rec.best_episode_rating,
            note_pire_ep: rec.worst_episode_rating,
            nb_episodes: rec.episode_count,
            image_url: rec.image_url.as_deref(),
            comm_saison_1: rec.description.as_deref(),
            meilleur_ep_titre: rec.best_episode_title.as_deref(),
        }
    }
}

/// Write records as UTF-8 CSV with a header row and no index column.
/// Missing values are written as empty cells.
pub fn write_csv<'a, W, I>(records: I, writer: W) -> Result<(), ExportError>
where
    W: io::Write,
    I: IntoIterator<Item = &'a AnimeRecord>,
{
    let mut wtr = csv::Writer::from_writer(writer);
    let mut wrote_any = false;
    for rec in records {
        wtr.serialize(ExportRow::from(rec))?;
        wrote_any = true;
    }
    if !wrote_any {
        // serde only emits the header alongside the first row.
        wtr.write_record(HEADER)?;
    }
    wtr.flush().map_err(csv::Error::from)?;
    Ok(())
}

const HEADER: [&str; 14] = [
    "anime",
    "genre_tags",
    "genre_principal",
    "source",
    "status",
    "studio",
    "date_pub",
    "note_globale",
    "note_meilleur_ep",
    "note_pire_ep",
    "nb_episodes",
    "image_url",
    "comm_saison_1",
    "meilleur_ep_titre",
];

/// Serialize a view into an in-memory CSV buffer.
pub fn view_to_csv_bytes(view: &FilteredView) -> Result<Vec<u8>, ExportError> {
    let mut buf = Vec::new();
    write_csv(view.records(), &mut buf)?;
    Ok(buf)
}

/// Export a view to `path`, in source order.
pub fn export_csv(view: &FilteredView, path: &Path) -> Result<(), ExportError> {
    let bytes = view_to_csv_bytes(view)?;
    std::fs::write(path, bytes).map_err(|source| ExportError::Create {
        path: path.to_path_buf(),
        source,
    })?;
    log::info!("Exported {} titles to {}", view.len(), path.display());
    Ok(())
}
