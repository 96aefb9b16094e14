//! The edit reconciler: sole owner of the measurement and sample tables.

use std::ops::Range;
use std::path::Path;
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, info};

use super::edit::{MeasurementEdit, SampleEdit};
use super::history::{ChangeNotice, ChangeScope, EditRecord, EditTarget};
use crate::chemistry::{Chemistry, DyeCorrection, MCresolPurple};
use crate::config::EngineConfig;
use crate::dataset::{
    aggregate, aggregate_all, group_ranges, member_range, quality_stats, regroup, Measurement,
    SampleGroup,
};
use crate::error::{PhcurateError, Result, ValidationError};
use crate::input::{RawRecord, RecordParser, SourceMetadata};
use crate::persistence::{Snapshot, FORMAT_VERSION};
use crate::rangefinder::RangefinderConfig;
use crate::stats;

/// Owns one imported dataset and keeps its sample table consistent with its
/// measurement table across every edit.
///
/// Edits are validated before anything is touched. Work that could fail runs
/// on a copy which replaces the owned tables only on success, so a rejected
/// edit leaves no trace.
#[derive(Debug)]
pub struct EditReconciler {
    config: EngineConfig,
    chemistry: Arc<dyn Chemistry>,
    source: Option<SourceMetadata>,
    measurements: Vec<Measurement>,
    samples: Vec<SampleGroup>,
    revision: u64,
    history: Vec<EditRecord>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    subscribers: Vec<Sender<ChangeNotice>>,
}

impl EditReconciler {
    /// Build a dataset from raw records with the default chemistry.
    pub fn ingest(records: Vec<RawRecord>, config: EngineConfig) -> Result<Self> {
        Self::ingest_with_chemistry(records, config, Arc::new(MCresolPurple))
    }

    /// Read a delimited file and build a dataset from it.
    pub fn from_file(path: impl AsRef<Path>, config: EngineConfig) -> Result<Self> {
        Self::from_file_with_parser(path, config, &RecordParser::new())
    }

    /// Read and ingest a file with a configured parser.
    pub fn from_file_with_parser(
        path: impl AsRef<Path>,
        config: EngineConfig,
        parser: &RecordParser,
    ) -> Result<Self> {
        let (records, source) = parser.parse_file(path)?;
        Ok(Self::ingest(records, config)?.with_source(source))
    }

    /// Build a dataset from raw records.
    ///
    /// Records keep their order; the first gets order key 1.
    pub fn ingest_with_chemistry(
        records: Vec<RawRecord>,
        config: EngineConfig,
        chemistry: Arc<dyn Chemistry>,
    ) -> Result<Self> {
        config.validate()?;
        if records.is_empty() {
            return Err(PhcurateError::EmptyData("No records to ingest".to_string()));
        }
        let classifier = config.classifier.compile()?;

        let mut measurements = Vec::with_capacity(records.len());
        for (i, record) in records.into_iter().enumerate() {
            let order = u32::try_from(i + 1).map_err(|_| PhcurateError::Parse {
                row: i + 1,
                column: 0,
                message: "too many records".to_string(),
            })?;
            let mut m = Measurement::from_record(order, record);
            m.classification = classifier.classification(&m.label);
            m.extra_indicator = classifier.extra_indicator(&m.label);
            measurements.push(m);
        }

        let groups = regroup(&mut measurements);

        if config.uniform_covariates {
            for range in group_ranges(&measurements).into_values() {
                enforce_uniform_covariates(&mut measurements[range]);
            }
        }

        for m in &mut measurements {
            m.ph = compute_ph(chemistry.as_ref(), m, config.dye);
        }

        if let Some(autoflag) = config.autoflag {
            for range in group_ranges(&measurements).into_values() {
                apply_autoflag(&mut measurements[range], &autoflag);
            }
        }

        let samples = aggregate_all(&measurements, chemistry.as_ref())?;
        info!(
            measurements = measurements.len(),
            groups, "ingested measurement records"
        );

        let now = Utc::now();
        let engine = Self {
            config,
            chemistry,
            source: None,
            measurements,
            samples,
            revision: 0,
            history: Vec::new(),
            created_at: now,
            updated_at: now,
            subscribers: Vec::new(),
        };
        engine.verify()?;
        Ok(engine)
    }

    /// Attach metadata about the file the records came from.
    pub fn with_source(mut self, source: SourceMetadata) -> Self {
        self.source = Some(source);
        self
    }

    // Read-only views

    /// Measurement table in order-key order.
    pub fn measurements(&self) -> &[Measurement] {
        &self.measurements
    }

    /// Sample table in group-id order.
    pub fn samples(&self) -> &[SampleGroup] {
        &self.samples
    }

    /// Look up a measurement by order key.
    pub fn measurement(&self, order: u32) -> Option<&Measurement> {
        self.index_of(order).ok().map(|i| &self.measurements[i])
    }

    /// Look up a sample group by id.
    pub fn sample(&self, group_id: u32) -> Option<&SampleGroup> {
        self.sample_slot(group_id).map(|i| &self.samples[i])
    }

    /// Member measurements of a sample group.
    pub fn members(&self, group_id: u32) -> Option<&[Measurement]> {
        member_range(&self.measurements, group_id).map(|r| &self.measurements[r])
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn source(&self) -> Option<&SourceMetadata> {
        self.source.as_ref()
    }

    /// Number of successful edits applied so far.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Applied edits, oldest first.
    pub fn history(&self) -> &[EditRecord] {
        &self.history
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Receive a notice after every successful edit.
    pub fn subscribe(&mut self) -> Receiver<ChangeNotice> {
        let (tx, rx) = mpsc::channel();
        self.subscribers.push(tx);
        rx
    }

    // Edits

    /// Edit one measurement from a field name and textual value.
    pub fn edit_measurement_field(
        &mut self,
        order: u32,
        field: &str,
        value: &str,
    ) -> Result<ChangeNotice> {
        let edit = MeasurementEdit::parse(field, value)?;
        self.edit_measurement(order, edit)
    }

    /// Apply an edit to one measurement.
    ///
    /// A `good` change recomputes only the owning group's statistics. A label
    /// change can split or merge runs, so it regroups the whole table.
    pub fn edit_measurement(&mut self, order: u32, edit: MeasurementEdit) -> Result<ChangeNotice> {
        let index = self.index_of(order)?;

        let scope = if edit.triggers_regroup() {
            let mut working = self.measurements.clone();
            apply_measurement_edit(&mut working[index], &edit);
            self.rebuild(working)?
        } else {
            let group_id = self.measurements[index].group_id;
            let range = self.existing_range(group_id)?;
            let slot = self.existing_slot(group_id)?;

            apply_measurement_edit(&mut self.measurements[index], &edit);
            let quality = quality_stats(&self.measurements[range]);
            let sample = &mut self.samples[slot];
            sample.good_count = quality.good_count;
            sample.ph = quality.ph;
            sample.ph_std = quality.ph_std;

            debug!(order, group_id, field = edit.field(), "recomputed group quality statistics");
            ChangeScope::Group { group_id }
        };

        Ok(self.commit(EditTarget::Measurement { order, edit }, scope))
    }

    /// Edit a whole sample from a field name and textual value.
    pub fn edit_sample_field(
        &mut self,
        group_id: u32,
        field: &str,
        value: &str,
    ) -> Result<ChangeNotice> {
        let edit = SampleEdit::parse(field, value)?;
        self.edit_sample(group_id, edit)
    }

    /// Apply an edit to every measurement of a sample group.
    ///
    /// Salinity and temperature changes recompute member pH. A label change
    /// regroups the whole table, so the group may merge with a neighbour.
    pub fn edit_sample(&mut self, group_id: u32, edit: SampleEdit) -> Result<ChangeNotice> {
        edit.validate()?;
        let (range, slot) = match (member_range(&self.measurements, group_id), self.sample_slot(group_id)) {
            (Some(range), Some(slot)) => (range, slot),
            _ => return Err(ValidationError::UnknownSample(group_id).into()),
        };

        let scope = if edit.triggers_regroup() {
            let mut working = self.measurements.clone();
            for m in &mut working[range] {
                apply_sample_edit(m, &edit);
            }
            self.rebuild(working)?
        } else {
            let mut members = self.measurements[range.clone()].to_vec();
            for m in &mut members {
                apply_sample_edit(m, &edit);
                if edit.affects_ph() {
                    m.ph = compute_ph(self.chemistry.as_ref(), m, self.config.dye);
                }
            }
            let sample = aggregate(&members, group_id, self.chemistry.as_ref())?;

            self.measurements[range].clone_from_slice(&members);
            self.samples[slot] = sample;
            debug!(group_id, field = edit.field(), "recomputed sample group");
            ChangeScope::Group { group_id }
        };

        Ok(self.commit(EditTarget::Sample { group_id, edit }, scope))
    }

    /// Reseed the good flags of one group with the rangefinder.
    pub fn autoflag_sample(
        &mut self,
        group_id: u32,
        config: RangefinderConfig,
    ) -> Result<ChangeNotice> {
        config.validate()?;
        let (range, slot) = match (member_range(&self.measurements, group_id), self.sample_slot(group_id)) {
            (Some(range), Some(slot)) => (range, slot),
            _ => return Err(ValidationError::UnknownSample(group_id).into()),
        };

        let mut members = self.measurements[range.clone()].to_vec();
        let excluded = apply_autoflag(&mut members, &config);
        let sample = aggregate(&members, group_id, self.chemistry.as_ref())?;

        self.measurements[range].clone_from_slice(&members);
        self.samples[slot] = sample;

        Ok(self.commit(
            EditTarget::Autoflag {
                group_id: Some(group_id),
                config,
                excluded,
            },
            ChangeScope::Group { group_id },
        ))
    }

    /// Reseed the good flags of every group with the rangefinder.
    pub fn autoflag_all(&mut self, config: RangefinderConfig) -> Result<ChangeNotice> {
        config.validate()?;
        let mut working = self.measurements.clone();
        let mut excluded = 0;
        for range in group_ranges(&working).into_values() {
            excluded += apply_autoflag(&mut working[range], &config);
        }
        let samples = aggregate_all(&working, self.chemistry.as_ref())?;

        self.measurements = working;
        self.samples = samples;
        info!(excluded, "reseeded good flags for all groups");

        Ok(self.commit(
            EditTarget::Autoflag {
                group_id: None,
                config,
                excluded,
            },
            ChangeScope::All,
        ))
    }

    /// Replace the dye correction and recompute every pH.
    pub fn set_dye_correction(&mut self, dye: DyeCorrection) -> Result<ChangeNotice> {
        let config = EngineConfig {
            dye,
            ..self.config.clone()
        };
        config.validate()?;

        let mut working = self.measurements.clone();
        for m in &mut working {
            m.ph = compute_ph(self.chemistry.as_ref(), m, dye);
        }
        let samples = aggregate_all(&working, self.chemistry.as_ref())?;

        self.measurements = working;
        self.samples = samples;
        self.config = config;
        info!(intercept = dye.intercept, slope = dye.slope, "applied new dye correction");

        Ok(self.commit(EditTarget::DyeCorrection { dye }, ChangeScope::All))
    }

    // Consistency

    /// Check every table invariant.
    ///
    /// Returns a consistency fault describing the first violation found.
    pub fn verify(&self) -> Result<()> {
        let fault = |message: String| Err(PhcurateError::Consistency(message));

        for pair in self.measurements.windows(2) {
            if pair[1].order <= pair[0].order {
                return fault(format!(
                    "Order keys out of sequence at {} -> {}",
                    pair[0].order, pair[1].order
                ));
            }
        }

        let mut expected = self.measurements.clone();
        let groups = regroup(&mut expected);
        for (m, e) in self.measurements.iter().zip(&expected) {
            if m.group_id != e.group_id {
                return fault(format!(
                    "Measurement {} has group {} but its label run is group {}",
                    m.order, m.group_id, e.group_id
                ));
            }
        }
        if self.samples.len() != groups as usize {
            return fault(format!(
                "{} sample rows for {} groups",
                self.samples.len(),
                groups
            ));
        }

        for m in &self.measurements {
            if m.ph != compute_ph(self.chemistry.as_ref(), m, self.config.dye) {
                return fault(format!("Measurement {} has a stale pH", m.order));
            }
        }

        let derived = aggregate_all(&self.measurements, self.chemistry.as_ref())?;
        for (sample, fresh) in self.samples.iter().zip(&derived) {
            if sample != fresh {
                return fault(format!("Sample group {} is stale", sample.group_id));
            }
        }

        Ok(())
    }

    // Persistence

    /// Capture the complete engine state.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            format_version: FORMAT_VERSION.to_string(),
            created_at: self.created_at,
            updated_at: self.updated_at,
            source: self.source.clone(),
            config: self.config.clone(),
            revision: self.revision,
            measurements: self.measurements.clone(),
            samples: self.samples.clone(),
            history: self.history.clone(),
        }
    }

    /// Rebuild an engine from a snapshot with the default chemistry.
    pub fn restore(snapshot: Snapshot) -> Result<Self> {
        Self::restore_with_chemistry(snapshot, Arc::new(MCresolPurple))
    }

    /// Rebuild an engine from a snapshot.
    ///
    /// The tables are taken as stored and then verified.
    pub fn restore_with_chemistry(snapshot: Snapshot, chemistry: Arc<dyn Chemistry>) -> Result<Self> {
        if snapshot.format_version != FORMAT_VERSION {
            return Err(PhcurateError::Persistence(format!(
                "Unsupported snapshot format {} (expected {})",
                snapshot.format_version, FORMAT_VERSION
            )));
        }
        snapshot.config.validate()?;

        let engine = Self {
            config: snapshot.config,
            chemistry,
            source: snapshot.source,
            measurements: snapshot.measurements,
            samples: snapshot.samples,
            revision: snapshot.revision,
            history: snapshot.history,
            created_at: snapshot.created_at,
            updated_at: snapshot.updated_at,
            subscribers: Vec::new(),
        };
        engine.verify()?;
        Ok(engine)
    }

    // Helpers

    fn index_of(&self, order: u32) -> Result<usize> {
        self.measurements
            .binary_search_by_key(&order, |m| m.order)
            .map_err(|_| ValidationError::UnknownMeasurement(order).into())
    }

    fn sample_slot(&self, group_id: u32) -> Option<usize> {
        let slot = (group_id as usize).checked_sub(1)?;
        (slot < self.samples.len()).then_some(slot)
    }

    fn existing_range(&self, group_id: u32) -> Result<Range<usize>> {
        member_range(&self.measurements, group_id).ok_or_else(|| {
            PhcurateError::Consistency(format!("Sample group {} has no members", group_id))
        })
    }

    fn existing_slot(&self, group_id: u32) -> Result<usize> {
        self.sample_slot(group_id).ok_or_else(|| {
            PhcurateError::Consistency(format!("Sample group {} has no sample row", group_id))
        })
    }

    /// Regroup and re-aggregate a working table, then adopt it.
    fn rebuild(&mut self, mut working: Vec<Measurement>) -> Result<ChangeScope> {
        let groups = regroup(&mut working);
        let samples = aggregate_all(&working, self.chemistry.as_ref())?;
        self.measurements = working;
        self.samples = samples;
        info!(groups, "regrouped measurement table");
        Ok(ChangeScope::Regrouped {
            groups: groups as usize,
        })
    }

    fn commit(&mut self, target: EditTarget, scope: ChangeScope) -> ChangeNotice {
        self.revision += 1;
        self.updated_at = Utc::now();
        self.history.push(EditRecord::new(self.revision, target));

        let notice = ChangeNotice {
            revision: self.revision,
            scope,
        };
        self.subscribers.retain(|tx| tx.send(notice).is_ok());
        debug_assert!(self.verify().is_ok(), "tables inconsistent after edit");
        notice
    }
}

fn compute_ph(chemistry: &dyn Chemistry, m: &Measurement, dye: DyeCorrection) -> Option<f64> {
    let ph = chemistry.ph_from_absorbance(&m.absorbance, m.temperature, m.salinity, dye);
    ph.is_finite().then_some(ph)
}

fn apply_measurement_edit(m: &mut Measurement, edit: &MeasurementEdit) {
    match edit {
        MeasurementEdit::Label(label) => m.label = label.clone(),
        MeasurementEdit::Good(flag) => m.good = *flag,
    }
}

fn apply_sample_edit(m: &mut Measurement, edit: &SampleEdit) {
    match edit {
        SampleEdit::Salinity(v) => m.salinity = *v,
        SampleEdit::Temperature(v) => m.temperature = *v,
        SampleEdit::Classification(c) => m.classification = *c,
        SampleEdit::ExtraIndicator(flag) => m.extra_indicator = *flag,
        SampleEdit::Label(label) => m.label = label.clone(),
    }
}

/// Set each member's salinity and temperature to the group median.
fn enforce_uniform_covariates(members: &mut [Measurement]) {
    let salinities: Vec<f64> = members.iter().map(|m| m.salinity).collect();
    let temperatures: Vec<f64> = members.iter().map(|m| m.temperature).collect();
    let (Some(salinity), Some(temperature)) =
        (stats::median(&salinities), stats::median(&temperatures))
    else {
        return;
    };
    for m in members {
        m.salinity = salinity;
        m.temperature = temperature;
    }
}

/// Write the rangefinder mask into the good flags; returns how many were excluded.
///
/// Members without a defined pH are always excluded.
fn apply_autoflag(members: &mut [Measurement], config: &RangefinderConfig) -> usize {
    let defined: Vec<(usize, f64)> = members
        .iter()
        .enumerate()
        .filter_map(|(i, m)| m.ph.map(|ph| (i, ph)))
        .collect();
    let values: Vec<f64> = defined.iter().map(|&(_, ph)| ph).collect();
    let mask = config.find(&values);

    for m in members.iter_mut() {
        m.good = false;
    }
    for (&(i, _), keep) in defined.iter().zip(mask) {
        members[i].good = keep;
    }
    members.iter().filter(|m| !m.good).count()
}
