//! Exhaustive checks of layout resolution over small inputs.

use field_common::{Coordinates, ForecastSource, PlotError, ReferenceSource, Result};
use panel_layout::{bind, LayoutPlan, LayoutRequest, PanelContext, PanelRole, SlotPosition};

struct Uniform {
    coords: Coordinates,
}

impl Uniform {
    fn new() -> Self {
        Self {
            coords: Coordinates::Scattered {
                lat: vec![59.9, 60.1],
                lon: vec![10.7, 10.8],
            },
        }
    }
}

impl ForecastSource for Uniform {
    fn num_members(&self) -> usize {
        8
    }

    fn num_lead_times(&self) -> usize {
        8
    }

    fn coordinates(&self) -> &Coordinates {
        &self.coords
    }

    fn select(&self, _field: &str, _member: usize, _lead_time: usize) -> Result<Vec<f32>> {
        Ok(vec![0.0; 2])
    }

    fn has_field(&self, _field: &str) -> bool {
        true
    }
}

impl ReferenceSource for Uniform {
    fn num_lead_times(&self) -> usize {
        8
    }

    fn coordinates(&self) -> &Coordinates {
        &self.coords
    }

    fn select(&self, _field: &str, _lead_time: usize) -> Result<Vec<f32>> {
        Ok(vec![0.0; 2])
    }

    fn has_field(&self, _field: &str) -> bool {
        true
    }
}

fn all_requests() -> Vec<LayoutRequest> {
    let mut requests = Vec::new();
    for num_models in 0..=5 {
        for num_lead_times in 0..=5 {
            for ensemble_size in [None, Some(0), Some(1), Some(2), Some(3), Some(5)] {
                for mean in [false, true] {
                    for reference in [false, true] {
                        requests.push(LayoutRequest {
                            num_models,
                            num_lead_times,
                            ensemble_size,
                            plot_ensemble_mean: mean,
                            include_reference: reference,
                            swap_axes: false,
                        });
                    }
                }
            }
        }
    }
    requests
}

fn valid_plans() -> Vec<(LayoutRequest, LayoutPlan)> {
    all_requests()
        .into_iter()
        .filter_map(|req| req.resolve().ok().map(|plan| (req, plan)))
        .collect()
}

fn slot_in_bounds(slot: SlotPosition, plan: &LayoutPlan) -> bool {
    match slot {
        SlotPosition::All => true,
        SlotPosition::Row(r) => r < plan.panel_shape.rows,
        SlotPosition::Column(c) => c < plan.panel_shape.cols,
        SlotPosition::Panel(k) => k < plan.occupied,
    }
}

#[test]
fn test_errors_are_dimension_or_limit_errors() {
    for req in all_requests() {
        match req.resolve() {
            Ok(_) => {}
            Err(PlotError::InvalidDimension { .. }) | Err(PlotError::PanelLimitExceeded { .. }) => {}
            Err(other) => panic!("unexpected error for {:?}: {}", req, other),
        }
    }
}

#[test]
fn test_zero_lengths_never_resolve() {
    for req in all_requests() {
        if req.num_models == 0 || req.num_lead_times == 0 || req.ensemble_size == Some(0) {
            assert!(req.resolve().is_err(), "{:?} resolved", req);
        }
    }
}

#[test]
fn test_plans_are_well_formed() {
    let plans = valid_plans();
    assert!(!plans.is_empty());

    for (req, plan) in &plans {
        assert!(plan.panel_shape.rows >= 1 && plan.panel_shape.cols >= 1, "{:?}", req);
        assert!(plan.occupied >= 1 && plan.occupied <= plan.cell_count(), "{:?}", req);
        assert!(plan.cell_count() <= 16 || !plan.is_collapsed(), "{:?}", req);
        assert_eq!(plan.lengths, req.lengths());

        if let Some(slot) = plan.ensemble_mean_slot {
            assert!(slot_in_bounds(slot, plan), "mean slot {:?} for {:?}", slot, req);
        }
        if let Some(slot) = plan.reference_slot {
            assert!(slot_in_bounds(slot, plan), "reference slot {:?} for {:?}", slot, req);
        }
        assert_eq!(plan.ensemble_mean_slot.is_some(), req.plot_ensemble_mean);
        assert_eq!(plan.reference_slot.is_some(), req.include_reference);

        if !plan.is_collapsed() {
            assert_eq!(plan.occupied, plan.cell_count(), "{:?}", req);
        }
    }
}

#[test]
fn test_resolution_is_deterministic() {
    for (req, plan) in valid_plans() {
        assert_eq!(req.resolve().unwrap(), plan);
    }
}

#[test]
fn test_swap_is_transpose() {
    for (req, plan) in valid_plans() {
        let swapped = req.with_swap_axes(true).resolve().unwrap();
        assert_eq!(swapped, plan.clone().transpose(), "{:?}", req);
        assert_eq!(swapped.clone().transpose(), plan);
    }
}

#[test]
fn test_binding_covers_every_cell() {
    let models: Vec<Uniform> = (0..5).map(|_| Uniform::new()).collect();
    let reference = Uniform::new();
    let ctx = PanelContext::new((0..5).collect(), (0..5).collect());

    for (req, plan) in valid_plans() {
        for plan in [plan.clone(), plan.transpose()] {
            let requests = bind(&plan, &models[..req.num_models], Some(&reference), &ctx)
                .collect::<Result<Vec<_>>>()
                .unwrap_or_else(|e| panic!("binding {:?} failed: {}", req, e));

            assert_eq!(requests.len(), plan.cell_count());
            let filled = requests.iter().filter(|r| !r.is_empty()).count();
            assert_eq!(filled, plan.occupied, "{:?}", req);

            let references = requests
                .iter()
                .filter(|r| matches!(r.role, PanelRole::Reference { .. }))
                .count();
            assert_eq!(references > 0, req.include_reference, "{:?}", req);

            let means = requests
                .iter()
                .filter(|r| matches!(r.role, PanelRole::EnsembleMean { .. }))
                .count();
            assert_eq!(means > 0, req.plot_ensemble_mean, "{:?}", req);
        }
    }
}
