//! Fluent builder for constructing a [`Scheduler`].

use std::collections::BTreeMap;

use arb_behavior::{Behavior, BehaviorFactory, Neutral};
use arb_core::{GamePiece, ResourceId, SchedulerConfig};
use arb_input::{ControlBindings, NoVision, Trigger, VisionSource};
use arb_resource::{ResourceSet, ResourceTable};

use crate::binding::{Binder, Binding};
use crate::scheduler::DefaultSlot;
use crate::{SchedError, SchedResult, Scheduler};

/// Builder for [`Scheduler`].
///
/// # Required inputs
///
/// - [`SchedulerConfig`] — period, cycle count, budgets
/// - [`ResourceTable`] — from [`arb_resource::ResourceTableBuilder`]
///
/// # Optional inputs (have defaults)
///
/// | Method                 | Default                                  |
/// |------------------------|------------------------------------------|
/// | `.vision(v)`           | `NoVision`                               |
/// | `.initial_mode(m)`     | `GamePiece::Cone`                        |
/// | `.set_default(r, f)`   | `Neutral` (stop every cycle)             |
///
/// # Validation
///
/// [`build`](Self::build) invokes every behavior factory once and rejects
/// the configuration if any behavior requires no resources or an unknown
/// one, if a default requires anything but its own resource, or if a
/// resource is given two defaults.
///
/// # Example
///
/// ```rust,ignore
/// let mut builder = SchedulerBuilder::new(config, table);
/// builder.set_default(wrist, factory(move || park(wrist)));
/// builder.bind(controls.trigger("wrist_up")).while_true(factory(move || move_wrist(wrist, 0.2)));
/// let mut scheduler = builder.build()?;
/// scheduler.run(&mut inputs, &mut NoopObserver)?;
/// ```
pub struct SchedulerBuilder {
    config:    SchedulerConfig,
    resources: ResourceTable,
    vision:    Option<Box<dyn VisionSource>>,
    mode:      GamePiece,
    defaults:  Vec<(ResourceId, BehaviorFactory)>,
    bindings:  Vec<Binding>,
}

impl SchedulerBuilder {
    pub fn new(config: SchedulerConfig, resources: ResourceTable) -> Self {
        Self {
            config,
            resources,
            vision:   None,
            mode:     GamePiece::default(),
            defaults: Vec::new(),
            bindings: Vec::new(),
        }
    }

    /// Supply the pose/vision collaborator.
    pub fn vision(&mut self, vision: impl VisionSource + 'static) -> &mut Self {
        self.vision = Some(Box::new(vision));
        self
    }

    pub fn initial_mode(&mut self, mode: GamePiece) -> &mut Self {
        self.mode = mode;
        self
    }

    /// Register the default behavior of `resource`.
    pub fn set_default(&mut self, resource: ResourceId, factory: BehaviorFactory) -> &mut Self {
        self.defaults.push((resource, factory));
        self
    }

    /// Register a trigger.  Passing `None` is legal and yields a binder
    /// whose methods do nothing.
    pub fn bind(&mut self, trigger: impl Into<Option<Trigger>>) -> Binder<'_> {
        let index = trigger.into().map(|t| {
            self.bindings.push(Binding::new(t));
            self.bindings.len() - 1
        });
        Binder::new(self, index)
    }

    /// `bind(controls.trigger(role))`.
    pub fn bind_role(&mut self, controls: &ControlBindings, role: &str) -> Binder<'_> {
        self.bind(controls.trigger(role))
    }

    /// The resource table, for id lookups while wiring.
    pub fn resources(&self) -> &ResourceTable {
        &self.resources
    }

    pub(crate) fn binding_mut(&mut self, index: usize) -> Option<&mut Binding> {
        self.bindings.get_mut(index)
    }

    /// Validate the configuration and return a ready-to-run [`Scheduler`].
    pub fn build(self) -> SchedResult<Scheduler> {
        self.config.validate()?;
        if self.resources.is_empty() {
            return Err(SchedError::Config("no resources registered".into()));
        }

        // ── Defaults ──────────────────────────────────────────────────────
        let mut chosen: BTreeMap<ResourceId, (BehaviorFactory, Behavior)> = BTreeMap::new();
        for (resource, factory) in &self.defaults {
            let probe = factory();
            if !self.resources.contains(*resource) {
                return Err(SchedError::UnknownResource {
                    behavior: probe.name().to_owned(),
                    resource: resource.to_string(),
                });
            }
            let resource_name = self.resources.name(*resource).to_owned();
            if chosen.contains_key(resource) {
                return Err(SchedError::DuplicateDefault { resource: resource_name });
            }
            if probe.requirements().is_empty() {
                return Err(SchedError::EmptyRequirements { behavior: probe.name().to_owned() });
            }
            if probe.requirements() != ResourceSet::single(*resource) {
                return Err(SchedError::DefaultRequirements {
                    resource: resource_name,
                    behavior: probe.name().to_owned(),
                });
            }
            chosen.insert(*resource, (factory.clone(), probe));
        }

        // ── Bindings ──────────────────────────────────────────────────────
        for binding in &self.bindings {
            for factory in binding.factories() {
                let probe = factory();
                check_requirements(&self.resources, &probe)?;
            }
        }

        // ── Fill missing defaults with Neutral ────────────────────────────
        let mut defaults = Vec::with_capacity(self.resources.count);
        for resource in self.resources.ids() {
            let slot = match chosen.remove(&resource) {
                Some((factory, probe)) => DefaultSlot::new(factory, &probe),
                None => {
                    let neutral: BehaviorFactory = std::sync::Arc::new(move || {
                        Behavior::new("Neutral", resource, Neutral).ignoring_disable(true)
                    });
                    let probe = neutral();
                    DefaultSlot::new(neutral, &probe)
                }
            };
            defaults.push(slot);
        }

        log::info!(
            "scheduler built: {} resources, {} trigger bindings, {} explicit defaults, {} ms period",
            self.resources.count,
            self.bindings.len(),
            self.defaults.len(),
            self.config.period_ms,
        );

        let vision = self.vision.unwrap_or_else(|| Box::new(NoVision));
        Ok(Scheduler::new(self.config, self.resources, vision, self.mode, self.bindings, defaults))
    }
}

fn check_requirements(resources: &ResourceTable, behavior: &Behavior) -> SchedResult<()> {
    let req = behavior.requirements();
    if req.is_empty() {
        return Err(SchedError::EmptyRequirements { behavior: behavior.name().to_owned() });
    }
    if let Some(unknown) = req.iter().find(|&r| !resources.contains(r)) {
        return Err(SchedError::UnknownResource {
            behavior: behavior.name().to_owned(),
            resource: unknown.to_string(),
        });
    }
    Ok(())
}
