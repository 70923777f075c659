mod catalog;
mod logging;
mod session;

use std::fs;
use std::path::PathBuf;

use anyhow::{anyhow, bail, Context, Result};
use chrono::{Local, Utc};
use clap::{Parser, Subcommand};
use listing_core::{
    Amenity, CustomField, DashboardStats, FieldType, FieldValue, PropertyDraft, PropertyPatch,
    PropertyStatus, PropertyType, DEFAULT_MAX_FILES,
};
use listing_engine::{import_template, read_import_file, write_export, DEFAULT_UPLOAD_ENDPOINT};
use listing_logging::listing_warn;

use catalog::{AmenityUpdate, Catalog};
use logging::LogDestination;
use session::MediaArgs;

#[derive(Parser)]
#[command(name = "listing")]
#[command(about = "Manage property listings, their media and CSV exchange files")]
#[command(version)]
struct Cli {
    /// Directory holding the local catalog.
    #[arg(long, default_value = ".", global = true)]
    dir: PathBuf,

    /// Where log output goes.
    #[arg(long, value_enum, default_value = "terminal", global = true)]
    log: LogDestination,

    /// Log debug output.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print or write the CSV import template
    Template {
        #[arg(short, long)]
        out: Option<PathBuf>,
    },

    /// Import one property from a CSV file
    Import { file: PathBuf },

    /// Export one property to a CSV file
    Export {
        property_id: String,

        #[arg(short, long, default_value = "exports")]
        out: PathBuf,
    },

    /// Create a property
    Add {
        #[arg(long)]
        title: String,

        #[arg(long)]
        description: String,

        #[arg(long)]
        price: f64,

        #[arg(long)]
        location: String,

        #[arg(long, default_value = "USD")]
        currency: String,

        /// House, Apartment, Land or Commercial
        #[arg(long = "type", value_parser = parse_property_type, default_value = "House")]
        property_type: PropertyType,

        /// "For Sale", "For Rent" or "Sold"
        #[arg(long, value_parser = parse_status, default_value = "For Sale")]
        status: PropertyStatus,
    },

    /// Change fields of a property; fields not given stay as they are
    Edit {
        property_id: String,

        #[arg(long)]
        title: Option<String>,

        #[arg(long)]
        description: Option<String>,

        #[arg(long)]
        price: Option<f64>,

        #[arg(long)]
        location: Option<String>,

        #[arg(long)]
        currency: Option<String>,

        #[arg(long = "type", value_parser = parse_property_type)]
        property_type: Option<PropertyType>,

        #[arg(long, value_parser = parse_status)]
        status: Option<PropertyStatus>,
    },

    /// Show one property with its custom fields, amenities and media
    Show { property_id: String },

    /// Add, replace or remove a custom field
    Field {
        property_id: String,

        #[command(subcommand)]
        action: FieldAction,
    },

    /// Add, replace, update or remove an amenity
    Amenity {
        property_id: String,

        #[command(subcommand)]
        action: AmenityAction,
    },

    /// List properties in the catalog
    List,

    /// Show dashboard statistics
    Stats,

    /// Edit the media of a property and save the result
    Media {
        property_id: String,

        /// Local file to attach (repeatable)
        #[arg(long = "add", value_name = "FILE")]
        add: Vec<PathBuf>,

        /// Stored media to remove (repeatable)
        #[arg(long = "remove", value_name = "MEDIA_ID")]
        remove: Vec<String>,

        /// Move ITEM in front of TARGET; TARGET `end` moves it last.
        /// Added files are addressed as `new:1`, `new:2`, ...
        #[arg(long = "move", value_names = ["ITEM", "TARGET"], num_args = 2)]
        moves: Vec<String>,

        /// Set the description of an item, `ITEM=TEXT` (repeatable)
        #[arg(long = "describe", value_name = "ITEM=TEXT")]
        describe: Vec<String>,

        /// Upload endpoint
        #[arg(long, env = "LISTING_UPLOAD_ENDPOINT", default_value = DEFAULT_UPLOAD_ENDPOINT)]
        endpoint: String,

        #[arg(long, default_value_t = DEFAULT_MAX_FILES)]
        max_files: usize,

        /// Show the resulting list without saving anything
        #[arg(long)]
        dry_run: bool,
    },
}

#[derive(Subcommand)]
enum FieldAction {
    /// Add the field, or replace the field with the same name
    Set {
        name: String,
        value: String,

        /// text, number, boolean, metric, currency or percentage
        #[arg(long = "type", value_parser = parse_field_type, default_value = "text")]
        field_type: FieldType,

        #[arg(long, default_value = "")]
        unit: String,

        #[arg(long, default_value = "")]
        icon: String,
    },
    Remove { name: String },
}

#[derive(Subcommand)]
enum AmenityAction {
    /// Add the amenity, or replace the amenity with the same name
    Set {
        name: String,

        #[arg(long)]
        unavailable: bool,

        #[arg(long, default_value = "Star")]
        icon: String,

        #[arg(long, default_value = "text-gray-600")]
        color: String,

        #[arg(long, default_value = "")]
        notes: String,
    },
    /// Change availability or notes of an existing amenity
    Update {
        name: String,

        #[arg(long)]
        available: Option<bool>,

        #[arg(long)]
        notes: Option<String>,
    },
    Remove { name: String },
}

fn parse_property_type(raw: &str) -> Result<PropertyType, String> {
    PropertyType::parse(raw).ok_or_else(|| {
        let names: Vec<_> = PropertyType::ALL.iter().map(|t| t.as_str()).collect();
        format!("expected one of {}", names.join(", "))
    })
}

fn parse_status(raw: &str) -> Result<PropertyStatus, String> {
    PropertyStatus::parse(raw).ok_or_else(|| {
        let names: Vec<_> = PropertyStatus::ALL.iter().map(|s| s.as_str()).collect();
        format!("expected one of {}", names.join(", "))
    })
}

fn parse_field_type(raw: &str) -> Result<FieldType, String> {
    FieldType::parse(raw)
        .ok_or_else(|| "expected text, number, boolean, metric, currency or percentage".to_string())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::initialize(cli.log, cli.verbose);

    match cli.command {
        Command::Template { out } => {
            let template = import_template();
            match out {
                Some(path) => {
                    fs::write(&path, template)
                        .with_context(|| format!("writing template to {}", path.display()))?;
                    println!("Template written to {}", path.display());
                }
                None => println!("{template}"),
            }
        }
        Command::Import { file } => {
            let outcome = read_import_file(&file)
                .with_context(|| format!("reading {}", file.display()))?;
            for warning in &outcome.warnings {
                listing_warn!("{warning}");
                println!("warning: {warning}");
            }
            if !outcome.is_valid() {
                for error in &outcome.errors {
                    println!("error: {error}");
                }
                bail!("{} is not a valid listing", file.display());
            }
            let catalog = Catalog::load(&cli.dir)?;
            let added_at = Local::now().format("%Y-%m-%d").to_string();
            let id = catalog.insert_import(&outcome, &added_at, Utc::now().timestamp_millis())?;
            println!("Imported {} as {id}", outcome.draft.title);
        }
        Command::Export { property_id, out } => {
            let catalog = Catalog::load(&cli.dir)?;
            let export = catalog
                .export(&property_id)
                .ok_or_else(|| anyhow!("unknown property {property_id}"))?;
            let path = write_export(&out, &export)?;
            println!("Exported to {}", path.display());
        }
        Command::Add {
            title,
            description,
            price,
            location,
            currency,
            property_type,
            status,
        } => {
            let draft = PropertyDraft {
                title,
                description,
                price,
                currency,
                location,
                property_type,
                status,
            };
            let catalog = Catalog::load(&cli.dir)?;
            let added_at = Local::now().format("%Y-%m-%d").to_string();
            let id = catalog.create_property(draft, &added_at)?;
            println!("Created {id}");
        }
        Command::Edit {
            property_id,
            title,
            description,
            price,
            location,
            currency,
            property_type,
            status,
        } => {
            let patch = PropertyPatch {
                title,
                description,
                price,
                currency,
                location,
                property_type,
                status,
            };
            if patch.is_empty() {
                bail!("nothing to change; pass at least one field");
            }
            let catalog = Catalog::load(&cli.dir)?;
            let property = catalog.update_property(&property_id, &patch)?;
            println!("Updated {} ({})", property.id, property.title);
        }
        Command::Show { property_id } => {
            let catalog = Catalog::load(&cli.dir)?;
            let export = catalog
                .export(&property_id)
                .ok_or_else(|| anyhow!("unknown property {property_id}"))?;
            print_property(&export);
        }
        Command::Field {
            property_id,
            action,
        } => {
            let catalog = Catalog::load(&cli.dir)?;
            match action {
                FieldAction::Set {
                    name,
                    value,
                    field_type,
                    unit,
                    icon,
                } => {
                    let field = CustomField {
                        value: FieldValue::parse_as(field_type, &value),
                        name,
                        field_type,
                        unit,
                        icon,
                    };
                    catalog.set_custom_field(&property_id, &field)?;
                    println!("Set {} on {property_id}", field.name.trim());
                }
                FieldAction::Remove { name } => {
                    if !catalog.remove_custom_field(&property_id, &name)? {
                        bail!("{property_id} has no custom field {name}");
                    }
                    println!("Removed {name} from {property_id}");
                }
            }
        }
        Command::Amenity {
            property_id,
            action,
        } => {
            let catalog = Catalog::load(&cli.dir)?;
            match action {
                AmenityAction::Set {
                    name,
                    unavailable,
                    icon,
                    color,
                    notes,
                } => {
                    let amenity = Amenity {
                        name,
                        is_available: !unavailable,
                        icon,
                        color,
                        notes,
                    };
                    catalog.set_amenity(&property_id, &amenity)?;
                    println!("Set {} on {property_id}", amenity.name.trim());
                }
                AmenityAction::Update {
                    name,
                    available,
                    notes,
                } => {
                    let update = AmenityUpdate {
                        is_available: available,
                        notes,
                    };
                    let amenity = catalog.update_amenity(&property_id, &name, &update)?;
                    let state = if amenity.is_available { "available" } else { "unavailable" };
                    println!("{} is {state}", amenity.name);
                }
                AmenityAction::Remove { name } => {
                    if !catalog.remove_amenity(&property_id, &name)? {
                        bail!("{property_id} has no amenity {name}");
                    }
                    println!("Removed {name} from {property_id}");
                }
            }
        }
        Command::List => {
            let catalog = Catalog::load(&cli.dir)?;
            for property in catalog.properties() {
                println!(
                    "{}\t{}\t{}\t{}\t{} {}\t{}",
                    property.id,
                    property.title,
                    property.property_type,
                    property.status,
                    property.price,
                    property.currency,
                    property.location
                );
            }
        }
        Command::Stats => {
            let catalog = Catalog::load(&cli.dir)?;
            print_stats(&DashboardStats::from_properties(&catalog.properties()));
        }
        Command::Media {
            property_id,
            add,
            remove,
            moves,
            describe,
            endpoint,
            max_files,
            dry_run,
        } => {
            let args = MediaArgs {
                property_id,
                add,
                remove,
                moves: moves
                    .chunks(2)
                    .map(|pair| (pair[0].clone(), pair[1].clone()))
                    .collect(),
                describe: describe
                    .iter()
                    .map(|entry| {
                        entry
                            .split_once('=')
                            .map(|(item, text)| (item.to_string(), text.to_string()))
                            .ok_or_else(|| anyhow!("expected ITEM=TEXT, got {entry}"))
                    })
                    .collect::<Result<_>>()?,
                endpoint,
                max_files,
                dry_run,
            };
            session::run(Catalog::load(&cli.dir)?, args)?;
        }
    }
    Ok(())
}

fn print_property(export: &listing_engine::PropertyExport) {
    let property = &export.property;
    println!("{} ({})", property.title, property.id);
    println!("  {} / {}", property.property_type, property.status);
    println!("  {} {}", property.price, property.currency);
    println!("  {}", property.location);
    println!("  {}", property.description);
    println!(
        "  added {}; {} views, {} likes, {} shares",
        property.added_at, property.views, property.likes, property.shares
    );
    if !export.custom_fields.is_empty() {
        println!("Custom fields:");
        for field in &export.custom_fields {
            let unit = if field.unit.is_empty() { String::new() } else { format!(" {}", field.unit) };
            println!("  {}: {}{unit}", field.name, field.value);
        }
    }
    if !export.amenities.is_empty() {
        println!("Amenities:");
        for amenity in &export.amenities {
            let mark = if amenity.is_available { "yes" } else { "no" };
            let mut line = format!("  {} [{mark}]", amenity.name);
            if !amenity.notes.is_empty() {
                line.push_str(&format!(" - {}", amenity.notes));
            }
            println!("{line}");
        }
    }
    println!("Media: {}", export.media.len());
}

fn print_stats(stats: &DashboardStats) {
    println!("Properties:      {}", stats.total_properties);
    println!("Active listings: {}", stats.active_listings);
    println!("Sold:            {}", stats.sold);
    println!("Views:           {}", stats.total_views);
    println!("Likes:           {}", stats.total_likes);
    println!("Shares:          {}", stats.total_shares);
    println!("Engagement:      {:.1}%", stats.engagement_rate());
    if !stats.top_properties.is_empty() {
        println!("Top properties:");
        for (rank, top) in stats.top_properties.iter().enumerate() {
            println!("  {}. {} ({} views)", rank + 1, top.title, top.views);
        }
    }
}
