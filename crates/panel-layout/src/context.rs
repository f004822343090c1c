//! Per-figure selection and labeling context.

use field_common::{Dimension, LeadTimeStep, PlotError, Result};

/// Title of an ensemble-mean panel.
pub const ENSEMBLE_MEAN_LABEL: &str = "ensemble mean";

/// Default title of a reference panel.
pub const DEFAULT_REFERENCE_LABEL: &str = "ref";

/// What the panel binder needs to know beyond the layout: the dataset steps
/// behind each lead time slot and how to name models, lead times and members.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PanelContext {
    /// Dataset lead time step plotted in each lead time slot.
    pub lead_times: Vec<usize>,
    /// Member identifiers, in the order the members are stacked in the datasets.
    pub members: Vec<usize>,
    /// False for deterministic runs, whose single member has no name.
    pub ensemble: bool,
    pub model_labels: Option<Vec<String>>,
    pub step: LeadTimeStep,
    pub reference_label: String,
}

impl PanelContext {
    pub fn new(lead_times: Vec<usize>, members: Vec<usize>) -> Self {
        Self {
            lead_times,
            members,
            ensemble: true,
            model_labels: None,
            step: LeadTimeStep::default(),
            reference_label: DEFAULT_REFERENCE_LABEL.to_string(),
        }
    }

    /// Context of a deterministic run: one unnamed member.
    pub fn deterministic(lead_times: Vec<usize>) -> Self {
        Self {
            ensemble: false,
            ..Self::new(lead_times, vec![0])
        }
    }

    pub fn with_model_labels(mut self, labels: Vec<String>) -> Self {
        self.model_labels = Some(labels);
        self
    }

    pub fn with_step(mut self, step: LeadTimeStep) -> Self {
        self.step = step;
        self
    }

    pub fn with_reference_label(mut self, label: impl Into<String>) -> Self {
        self.reference_label = label.into();
        self
    }

    /// Dataset step of a lead time slot.
    pub fn lead_time_step(&self, slot: usize) -> Result<usize> {
        self.lead_times
            .get(slot)
            .copied()
            .ok_or_else(|| PlotError::out_of_range(Dimension::LeadTime, slot, self.lead_times.len()))
    }

    pub fn model_label(&self, index: usize) -> String {
        match &self.model_labels {
            None => format!("model {}", index),
            Some(labels) => labels.get(index).cloned().unwrap_or_default(),
        }
    }

    pub fn lead_time_label(&self, slot: usize) -> String {
        match self.lead_times.get(slot) {
            Some(&lead_time) => self.step.label(lead_time),
            None => String::new(),
        }
    }

    pub fn member_label(&self, index: usize) -> String {
        match self.members.get(index) {
            Some(id) if self.ensemble => format!("member {}", id),
            _ => String::new(),
        }
    }

    /// Label of position `index` along `dimension`.
    pub fn label(&self, dimension: Dimension, index: usize) -> String {
        match dimension {
            Dimension::Model => self.model_label(index),
            Dimension::LeadTime => self.lead_time_label(index),
            Dimension::Ensemble => self.member_label(index),
        }
    }
}
