//! `ControlBindings` — which physical control plays which role.

use crate::{Axis, NameMap, Trigger};

/// Maps role names (`"wrist_up"`, `"translation_x"`, …) to triggers and axes.
///
/// A role with no entry is simply absent: [`trigger`](Self::trigger) and
/// [`axis`](Self::axis) return `None` and the robot code skips the binding.
/// This is how one robot program supports several control schemes where not
/// every scheme has every control.
#[derive(Clone, Debug, Default)]
pub struct ControlBindings {
    /// Profile name, for logs.
    pub name: String,
    triggers: NameMap<Trigger>,
    axes:     NameMap<Axis>,
}

impl ControlBindings {
    pub fn new(name: &str) -> Self {
        Self { name: name.to_owned(), ..Self::default() }
    }

    /// Bind `role` to `trigger`, returning the trigger it replaced.
    pub fn insert_trigger(&mut self, role: &str, trigger: Trigger) -> Option<Trigger> {
        self.triggers.insert(role.to_owned(), trigger)
    }

    pub fn insert_axis(&mut self, role: &str, axis: Axis) -> Option<Axis> {
        self.axes.insert(role.to_owned(), axis)
    }

    pub fn trigger(&self, role: &str) -> Option<Trigger> {
        let found = self.triggers.get(role).cloned();
        if found.is_none() {
            log::debug!("profile {:?} has no control for role {role:?}", self.name);
        }
        found
    }

    pub fn axis(&self, role: &str) -> Option<Axis> {
        self.axes.get(role).cloned()
    }

    /// Axis value for `role`, or `0.0` when the role is unbound.
    pub fn axis_value(&self, role: &str, frame: &crate::InputFrame) -> f64 {
        self.axes.get(role).map(|a| a.read(frame)).unwrap_or(0.0)
    }

    pub fn has_role(&self, role: &str) -> bool {
        self.triggers.contains_key(role) || self.axes.contains_key(role)
    }

    /// All bound role names, sorted.
    pub fn roles(&self) -> Vec<&str> {
        let mut roles: Vec<&str> = self
            .triggers
            .keys()
            .chain(self.axes.keys())
            .map(String::as_str)
            .collect();
        roles.sort_unstable();
        roles
    }
}
