//! Requests: what a running behavior may ask of the scheduler.

use arb_core::{GamePiece, ResourceId};
use arb_resource::{ActuatorCommand, Outputs, ResourceResult, ResourceSet, StateSnapshot};

use crate::Behavior;

/// A change a behavior wants the scheduler to make.
///
/// Requests are queued during the call that produced them and applied by the
/// scheduler, in order, right after that call returns.  A behavior therefore
/// never observes its own request mid-call.
#[derive(Debug)]
pub enum Request {
    /// Write the mode state.
    SetMode(GamePiece),

    /// Schedule a new behavior instance through normal arbitration.
    Schedule(Behavior),

    /// Cancel every explicitly scheduled behavior.
    CancelAll,
}

/// Everything a behavior may touch during one call: a guarded write view
/// over its held resources, and the request queue.
pub struct Effects<'a> {
    outputs:  Outputs<'a>,
    requests: &'a mut Vec<Request>,
}

impl<'a> Effects<'a> {
    pub fn new(outputs: Outputs<'a>, requests: &'a mut Vec<Request>) -> Self {
        Self { outputs, requests }
    }

    pub fn apply(&mut self, id: ResourceId, command: ActuatorCommand) -> ResourceResult<()> {
        self.outputs.apply(id, command)
    }

    pub fn stop(&mut self, id: ResourceId) -> ResourceResult<()> {
        self.outputs.stop(id)
    }

    pub fn stop_all(&mut self) -> ResourceResult<()> {
        self.outputs.stop_all()
    }

    /// Live observed state (as opposed to the start-of-cycle snapshot in the
    /// context).
    pub fn observed(&self, id: ResourceId) -> ResourceResult<StateSnapshot> {
        self.outputs.observed(id)
    }

    pub fn held(&self) -> ResourceSet {
        self.outputs.held()
    }

    pub fn set_mode(&mut self, piece: GamePiece) {
        self.requests.push(Request::SetMode(piece));
    }

    pub fn schedule(&mut self, behavior: Behavior) {
        self.requests.push(Request::Schedule(behavior));
    }

    pub fn cancel_all(&mut self) {
        self.requests.push(Request::CancelAll);
    }

    pub fn request(&mut self, request: Request) {
        self.requests.push(request);
    }
}
