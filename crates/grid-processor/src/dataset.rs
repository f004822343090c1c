//! In-memory forecast and reference datasets.
//!
//! Datasets are read from JSON documents holding the coordinate arrays and,
//! per field, the values of every member and lead time step. Known fields are
//! converted to display units on load (see [`FieldKind::convert`]).

use std::collections::{BTreeMap, HashMap};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use field_common::{
    Coordinates, Dimension, FieldKind, ForecastSource, LatLonUnits, LatLonWindow, PlotError,
    ReferenceSource, Result,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::discovery::MemberFile;

/// On-disk layout of a forecast file. Field values are indexed
/// `[member][lead_time][point]`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EnsembleDocument {
    pub latitude: Vec<f64>,
    pub longitude: Vec<f64>,
    /// `[ny, nx]` for a regular mesh; absent for scattered points.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shape: Option<Vec<usize>>,
    pub fields: BTreeMap<String, Vec<Vec<Vec<f32>>>>,
}

/// On-disk layout of a reference file. Field values are indexed
/// `[lead_time][point]`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReferenceDocument {
    pub latitude: Vec<f64>,
    pub longitude: Vec<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shape: Option<Vec<usize>>,
    pub fields: BTreeMap<String, Vec<Vec<f32>>>,
}

/// Values of every field, flattened to `[member][lead_time][point]`.
#[derive(Debug, Clone, PartialEq)]
struct FieldStore {
    members: usize,
    lead_times: usize,
    points: usize,
    values: HashMap<String, Vec<f32>>,
}

impl FieldStore {
    fn offset(&self, member: usize, lead_time: usize) -> usize {
        (member * self.lead_times + lead_time) * self.points
    }

    fn slice(&self, field: &str, member: usize, lead_time: usize) -> Result<&[f32]> {
        let values = self
            .values
            .get(field)
            .ok_or_else(|| PlotError::UnknownField(field.to_string()))?;
        if member >= self.members {
            return Err(PlotError::out_of_range(Dimension::Ensemble, member, self.members));
        }
        if lead_time >= self.lead_times {
            return Err(PlotError::out_of_range(Dimension::LeadTime, lead_time, self.lead_times));
        }
        let start = self.offset(member, lead_time);
        Ok(&values[start..start + self.points])
    }

    /// Keep only the points at `indices`.
    fn subset(&self, indices: &[usize]) -> Self {
        let values = self
            .values
            .iter()
            .map(|(name, values)| {
                let mut kept = Vec::with_capacity(self.members * self.lead_times * indices.len());
                for chunk in values.chunks(self.points.max(1)) {
                    kept.extend(indices.iter().map(|&i| chunk[i]));
                }
                (name.clone(), kept)
            })
            .collect();
        Self {
            points: indices.len(),
            values,
            ..*self
        }
    }

    fn field_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.values.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

/// Flatten `[member][lead_time][point]` values, checking every level has the
/// same length.
fn flatten_field(
    name: &str,
    nested: Vec<Vec<Vec<f32>>>,
    points: usize,
    expected: Option<(usize, usize)>,
) -> Result<(usize, usize, Vec<f32>)> {
    let members = nested.len();
    let lead_times = nested.first().map_or(0, Vec::len);
    if let Some((m, l)) = expected {
        if (m, l) != (members, lead_times) {
            return Err(PlotError::data_read(format!(
                "field '{}' has {} members x {} lead times, other fields have {} x {}",
                name, members, lead_times, m, l
            )));
        }
    }

    let mut flat = Vec::with_capacity(members * lead_times * points);
    for (member, steps) in nested.into_iter().enumerate() {
        if steps.len() != lead_times {
            return Err(PlotError::data_read(format!(
                "field '{}' member {} has {} lead times, expected {}",
                name,
                member,
                steps.len(),
                lead_times
            )));
        }
        for (lead_time, values) in steps.into_iter().enumerate() {
            if values.len() != points {
                return Err(PlotError::data_read(format!(
                    "field '{}' member {} lead time {} has {} points, coordinates have {}",
                    name,
                    member,
                    lead_time,
                    values.len(),
                    points
                )));
            }
            flat.extend(values);
        }
    }

    if let Ok(kind) = name.parse::<FieldKind>() {
        kind.convert_all(&mut flat);
    }
    Ok((members, lead_times, flat))
}

fn coordinates(
    latitude: Vec<f64>,
    longitude: Vec<f64>,
    shape: Option<Vec<usize>>,
    units: LatLonUnits,
) -> Result<Coordinates> {
    let shape = shape.unwrap_or_else(|| vec![latitude.len()]);
    Coordinates::from_arrays(latitude, longitude, &shape, units)
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let file = File::open(path)
        .map_err(|e| PlotError::data_read(format!("{}: {}", path.display(), e)))?;
    serde_json::from_reader(BufReader::new(file))
        .map_err(|e| PlotError::data_read(format!("{}: {}", path.display(), e)))
}

/// Forecast from one model, possibly with several ensemble members.
#[derive(Debug, Clone, PartialEq)]
pub struct EnsembleDataset {
    coords: Coordinates,
    /// Identifier of each member, in storage order.
    members: Vec<usize>,
    store: FieldStore,
}

impl EnsembleDataset {
    /// Build a dataset from a parsed document. Members are numbered from 0.
    pub fn from_document(doc: EnsembleDocument, units: LatLonUnits) -> Result<Self> {
        let coords = coordinates(doc.latitude, doc.longitude, doc.shape, units)?;
        let points = coords.len();

        let mut dims = None;
        let mut values = HashMap::with_capacity(doc.fields.len());
        for (name, nested) in doc.fields {
            let (members, lead_times, flat) = flatten_field(&name, nested, points, dims)?;
            dims = Some((members, lead_times));
            values.insert(name, flat);
        }
        let (members, lead_times) = dims.unwrap_or((0, 0));

        Ok(Self {
            coords,
            members: (0..members).collect(),
            store: FieldStore {
                members,
                lead_times,
                points,
                values,
            },
        })
    }

    /// Load a dataset document from a JSON file.
    pub fn load(path: &Path, units: LatLonUnits) -> Result<Self> {
        let doc: EnsembleDocument = read_json(path)?;
        let dataset = Self::from_document(doc, units)?;
        debug!(
            path = %path.display(),
            members = dataset.store.members,
            lead_times = dataset.store.lead_times,
            points = dataset.store.points,
            "Loaded forecast file"
        );
        Ok(dataset)
    }

    /// Load one single-member file per member and stack them along the
    /// member axis, in the order given.
    pub fn load_members(files: &[MemberFile], units: LatLonUnits) -> Result<Self> {
        let mut parts = Vec::with_capacity(files.len());
        for file in files {
            let mut part = Self::load(&file.path, units)?;
            if part.store.members != 1 {
                return Err(PlotError::data_read(format!(
                    "{} holds {} members, expected exactly one",
                    file.path.display(),
                    part.store.members
                )));
            }
            part.members = vec![file.member];
            parts.push(part);
        }
        let dataset = Self::concat(parts)?;
        info!(
            members = dataset.num_members(),
            lead_times = dataset.num_lead_times(),
            fields = ?dataset.field_names(),
            "Loaded ensemble"
        );
        Ok(dataset)
    }

    /// Concatenate datasets along the member axis. All parts must share
    /// coordinates, lead times and fields.
    pub fn concat(parts: Vec<Self>) -> Result<Self> {
        let mut parts = parts.into_iter();
        let mut merged = parts
            .next()
            .ok_or_else(|| PlotError::data_read("no member datasets to concatenate"))?;

        for part in parts {
            if part.coords != merged.coords {
                return Err(PlotError::data_read(
                    "member datasets have different coordinates",
                ));
            }
            if part.store.lead_times != merged.store.lead_times {
                return Err(PlotError::data_read(format!(
                    "member datasets have {} and {} lead times",
                    merged.store.lead_times, part.store.lead_times
                )));
            }
            if part.store.field_names() != merged.store.field_names() {
                return Err(PlotError::data_read(format!(
                    "member datasets hold different fields: {:?} and {:?}",
                    merged.store.field_names(),
                    part.store.field_names()
                )));
            }

            for (name, values) in part.store.values {
                if let Some(existing) = merged.store.values.get_mut(&name) {
                    existing.extend(values);
                }
            }
            merged.store.members += part.store.members;
            merged.members.extend(part.members);
        }

        Ok(merged)
    }

    /// Drop scattered points outside `window`. Regular meshes are returned
    /// unchanged.
    pub fn crop(&self, window: &LatLonWindow) -> Result<Self> {
        let Some(indices) = self.coords.indices_within(window) else {
            debug!("Regular mesh is not cropped");
            return Ok(self.clone());
        };
        if indices.is_empty() {
            return Err(PlotError::data_read(format!(
                "no points inside window {:?}",
                window
            )));
        }
        debug!(kept = indices.len(), of = self.coords.len(), "Cropped forecast");
        Ok(Self {
            coords: subset_coords(&self.coords, &indices),
            members: self.members.clone(),
            store: self.store.subset(&indices),
        })
    }

    /// Member identifiers, in storage order.
    pub fn members(&self) -> &[usize] {
        &self.members
    }

    pub fn field_names(&self) -> Vec<&str> {
        self.store.field_names()
    }
}

impl ForecastSource for EnsembleDataset {
    fn num_members(&self) -> usize {
        self.store.members
    }

    fn num_lead_times(&self) -> usize {
        self.store.lead_times
    }

    fn coordinates(&self) -> &Coordinates {
        &self.coords
    }

    fn select(&self, field: &str, member: usize, lead_time: usize) -> Result<Vec<f32>> {
        Ok(self.store.slice(field, member, lead_time)?.to_vec())
    }

    fn has_field(&self, field: &str) -> bool {
        self.store.values.contains_key(field)
    }
}

/// Reference data (analysis) indexed only by lead time step.
#[derive(Debug, Clone, PartialEq)]
pub struct ReferenceDataset {
    coords: Coordinates,
    store: FieldStore,
}

impl ReferenceDataset {
    pub fn from_document(doc: ReferenceDocument, units: LatLonUnits) -> Result<Self> {
        let coords = coordinates(doc.latitude, doc.longitude, doc.shape, units)?;
        let points = coords.len();

        let mut dims = None;
        let mut values = HashMap::with_capacity(doc.fields.len());
        for (name, steps) in doc.fields {
            // a reference is a single-member forecast
            let (_, lead_times, flat) = flatten_field(&name, vec![steps], points, dims)?;
            dims = Some((1, lead_times));
            values.insert(name, flat);
        }
        let lead_times = dims.map_or(0, |(_, l)| l);

        Ok(Self {
            coords,
            store: FieldStore {
                members: 1,
                lead_times,
                points,
                values,
            },
        })
    }

    pub fn load(path: &Path, units: LatLonUnits) -> Result<Self> {
        let doc: ReferenceDocument = read_json(path)?;
        let dataset = Self::from_document(doc, units)?;
        info!(
            path = %path.display(),
            lead_times = dataset.store.lead_times,
            points = dataset.store.points,
            units = %units,
            "Loaded reference"
        );
        Ok(dataset)
    }

    pub fn crop(&self, window: &LatLonWindow) -> Result<Self> {
        let Some(indices) = self.coords.indices_within(window) else {
            return Ok(self.clone());
        };
        if indices.is_empty() {
            return Err(PlotError::data_read(format!(
                "no reference points inside window {:?}",
                window
            )));
        }
        Ok(Self {
            coords: subset_coords(&self.coords, &indices),
            store: self.store.subset(&indices),
        })
    }

    pub fn field_names(&self) -> Vec<&str> {
        self.store.field_names()
    }
}

impl ReferenceSource for ReferenceDataset {
    fn num_lead_times(&self) -> usize {
        self.store.lead_times
    }

    fn coordinates(&self) -> &Coordinates {
        &self.coords
    }

    fn select(&self, field: &str, lead_time: usize) -> Result<Vec<f32>> {
        Ok(self.store.slice(field, 0, lead_time)?.to_vec())
    }

    fn has_field(&self, field: &str) -> bool {
        self.store.values.contains_key(field)
    }
}

fn subset_coords(coords: &Coordinates, indices: &[usize]) -> Coordinates {
    let lat = coords.lat();
    let lon = coords.lon();
    Coordinates::Scattered {
        lat: indices.iter().map(|&i| lat[i]).collect(),
        lon: indices.iter().map(|&i| lon[i]).collect(),
    }
}
