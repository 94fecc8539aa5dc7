//! Synthetic well data for the demo table
//!
//! Gives the model something plausible to query. Values are random but
//! bounded so aggregate questions ("deepest well", "total production in
//! Texas") have sensible answers.

use chrono::NaiveDate;
use rand::seq::SliceRandom;
use rand::Rng;
use rusqlite::{params, Transaction};

const NAME_PREFIXES: &[&str] = &[
    "Eagle", "Falcon", "Permian", "Bakken", "Gulf", "Prairie", "Redrock", "Sandstone", "Mesa",
    "Caprock", "Basin", "Ridge",
];

const NAME_SUFFIXES: &[&str] = &[
    "Ford", "Point", "Creek", "Flats", "Bluff", "Springs", "Draw", "Bend", "Canyon", "Fork",
];

const LOCATIONS: &[&str] = &[
    "Texas",
    "Oklahoma",
    "New Mexico",
    "North Dakota",
    "Louisiana",
    "Wyoming",
    "Colorado",
    "Alaska",
    "Gulf of Mexico",
    "Kansas",
];

const FORMATIONS: &[&str] = &[
    "Sandstone with shale interbeds",
    "Fractured carbonate reservoir",
    "Tight shale, high TOC",
    "Dolomitized limestone",
    "Deltaic sandstone, high porosity",
    "Turbidite sequence",
    "Chalk with natural fractures",
    "Conglomerate, poorly sorted",
];

/// One generated row for the demo table
#[derive(Clone, Debug)]
pub struct SyntheticWell {
    pub well_id: i64,
    pub well_name: String,
    pub location: String,
    pub production_date: NaiveDate,
    pub production_volume: f64,
    pub depth: f64,
    pub geological_data: String,
    pub reservoir_pressure: f64,
}

impl SyntheticWell {
    /// Generate the row with the given (1-based) primary key
    pub fn generate(rng: &mut impl Rng, well_id: i64) -> Self {
        let prefix = NAME_PREFIXES.choose(rng).unwrap_or(&NAME_PREFIXES[0]);
        let suffix = NAME_SUFFIXES.choose(rng).unwrap_or(&NAME_SUFFIXES[0]);
        let pad = rng.gen_range(1..=99);

        let base = NaiveDate::from_ymd_opt(2015, 1, 1).unwrap_or_default();
        let production_date = base + chrono::Days::new(rng.gen_range(0..3650));

        Self {
            well_id,
            well_name: format!("{} {} #{}", prefix, suffix, pad),
            location: LOCATIONS.choose(rng).unwrap_or(&LOCATIONS[0]).to_string(),
            production_date,
            production_volume: rng.gen_range(50.0..5000.0),
            depth: rng.gen_range(1500.0..20000.0),
            geological_data: FORMATIONS.choose(rng).unwrap_or(&FORMATIONS[0]).to_string(),
            reservoir_pressure: rng.gen_range(1000.0..9000.0),
        }
    }
}

/// Insert `count` synthetic wells with primary keys 1..=count
pub(crate) fn insert_synthetic_wells(tx: &Transaction, count: usize) -> rusqlite::Result<()> {
    let mut stmt = tx.prepare(
        "INSERT INTO ExplorationProduction
         (WellID, WellName, Location, ProductionDate, ProductionVolume, Depth, GeologicalData, ReservoirPressure)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
    )?;

    let mut rng = rand::thread_rng();
    for id in 1..=count as i64 {
        let well = SyntheticWell::generate(&mut rng, id);
        stmt.execute(params![
            well.well_id,
            well.well_name,
            well.location,
            well.production_date.format("%Y-%m-%d").to_string(),
            well.production_volume,
            well.depth,
            well.geological_data,
            well.reservoir_pressure,
        ])?;
    }

    Ok(())
}
