use std::collections::BTreeMap;

use clap::{Parser, Subcommand};
use log::info;
use rarwe_catalog::Catalog;
use rarwe_catalog::clients::{
    Attributes, Record, RecordKind,
    errors::{Error, Result},
    jsonapi::RelationshipData,
};
use rarwe_catalog::helpers::capitalize;
use serde_json::json;

#[derive(Parser)]
#[command(name = "rarwe")]
#[command(version, about = "Browse and edit a band and song catalog", long_about = None)]
struct Cli {
    /// Base URL of the JSON:API backend
    #[arg(long, global = true, env = "RARWE_API_URL")]
    api_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the records of one kind (`bands` or `songs`), or of every kind
    List { kind: Option<RecordKind> },
    /// List the songs of one band
    BandSongs { band_id: String },
    /// Add a band
    CreateBand {
        #[arg(long)]
        name: String,
        #[arg(long)]
        description: Option<String>,
    },
    /// Add a song to a band
    CreateSong {
        #[arg(long)]
        title: String,
        /// Id of the band the song belongs to
        #[arg(long)]
        band: String,
        #[arg(long, value_parser = clap::value_parser!(u8).range(0..=5))]
        rating: Option<u8>,
    },
    /// Change the name or description of a band
    UpdateBand {
        id: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        description: Option<String>,
    },
    /// Give a song a rating from 0 to 5
    RateSong {
        id: String,
        #[arg(value_parser = clap::value_parser!(u8).range(0..=5))]
        rating: u8,
    },
}

pub async fn run() -> Result<()> {
    let cli = Cli::parse();

    let mut builder = Catalog::builder();
    if let Some(api_url) = cli.api_url {
        builder = builder.api_url(api_url);
    }
    let mut catalog = builder.build()?;

    match cli.command {
        Commands::List { kind: Some(kind) } => list(&mut catalog, kind).await,
        Commands::List { kind: None } => {
            for kind in RecordKind::ALL {
                list(&mut catalog, kind).await?;
            }
            Ok(())
        }
        Commands::BandSongs { band_id } => band_songs(&mut catalog, &band_id).await,
        Commands::CreateBand { name, description } => {
            let mut attributes = Attributes::new();
            attributes.insert("name".into(), json!(name));
            if let Some(description) = description {
                attributes.insert("description".into(), json!(description));
            }
            let band = catalog
                .create(RecordKind::Band, attributes, BTreeMap::new())
                .await?;
            println!("Created band {}: {}", band.id(), describe(&band));
            Ok(())
        }
        Commands::CreateSong {
            title,
            band,
            rating,
        } => {
            let mut attributes = Attributes::new();
            attributes.insert("title".into(), json!(title));
            if let Some(rating) = rating {
                attributes.insert("rating".into(), json!(rating));
            }
            let relationships = BTreeMap::from([(
                "band".to_string(),
                RelationshipData::to_one(RecordKind::Band, band),
            )]);
            let song = catalog
                .create(RecordKind::Song, attributes, relationships)
                .await?;
            println!("Created song {}: {}", song.id(), describe(&song));
            Ok(())
        }
        Commands::UpdateBand {
            id,
            name,
            description,
        } => {
            let mut attributes = Attributes::new();
            if let Some(name) = name {
                attributes.insert("name".into(), json!(name));
            }
            if let Some(description) = description {
                attributes.insert("description".into(), json!(description));
            }
            if attributes.is_empty() {
                return Err(Error::ConfigurationError(
                    "Nothing to update, pass --name or --description".into(),
                ));
            }
            catalog.update(RecordKind::Band, &id, attributes).await?;
            println!("Updated band {id}");
            Ok(())
        }
        Commands::RateSong { id, rating } => {
            let mut attributes = Attributes::new();
            attributes.insert("rating".into(), json!(rating));
            catalog.update(RecordKind::Song, &id, attributes).await?;
            println!("Rated song {id}: {rating}/5");
            Ok(())
        }
    }
}

async fn list(catalog: &mut Catalog, kind: RecordKind) -> Result<()> {
    info!("Fetching {kind}s ...");
    let records = catalog.fetch_all(kind).await?;
    if records.is_empty() {
        println!("No {kind}s yet");
    }
    for record in records {
        println!("{:>4}  {}", record.id(), describe(record));
    }
    Ok(())
}

// The bands/band/songs screen: find the band, then follow its songs link
async fn band_songs(catalog: &mut Catalog, band_id: &str) -> Result<()> {
    catalog.fetch_all(RecordKind::Band).await?;
    let band = catalog
        .find(RecordKind::Band, |band| band.id() == band_id)
        .ok_or_else(|| Error::RecordNotFound {
            kind: RecordKind::Band,
            id: band_id.to_string(),
        })?;
    println!("{}", describe(band));

    let songs = catalog
        .fetch_related(RecordKind::Band, band_id, "songs")
        .await?;
    let songs: Vec<&Record> = match (songs.as_many(), songs.as_one()) {
        (Some(many), _) => many.iter().collect(),
        (None, Some(one)) => vec![one],
        (None, None) => Vec::new(),
    };
    if songs.is_empty() {
        println!("  No songs yet");
    }
    for song in songs {
        println!("  {:>4}  {}", song.id(), describe(song));
    }
    Ok(())
}

fn describe(record: &Record) -> String {
    match record.kind() {
        RecordKind::Band => capitalize(record.attr_str("name").unwrap_or_default()),
        RecordKind::Song => {
            let title = capitalize(record.attr_str("title").unwrap_or_default());
            match record.attribute("rating").and_then(serde_json::Value::as_u64) {
                Some(rating) => format!("{title} ({rating}/5)"),
                None => title,
            }
        }
    }
}
