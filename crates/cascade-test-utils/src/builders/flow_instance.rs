//! Builder for flow instances in a known state.

use cascade_recorder::{ChangeTracker, FlowInstance, FlowInstanceId};
use serde_json::Value;

/// Final lifecycle transition applied by [`FlowInstanceBuilder::build`]
#[derive(Debug, Clone, PartialEq, Eq)]
enum Finish {
    Active,
    NotStarted,
    Completed,
    Failed(String),
    Cancelled,
}

/// Builds a [`FlowInstance`] by replaying engine transitions
///
/// Instances are started by default; every entry given to `with_steps`
/// is applied as one step, so the built instance's step id equals the
/// number of steps and its change tracker holds the last one.
#[derive(Debug, Clone)]
pub struct FlowInstanceBuilder {
    flow_uri: String,
    id: Option<String>,
    state: i32,
    attrs: Vec<(String, Value)>,
    steps: Vec<Value>,
    finish: Finish,
}

impl FlowInstanceBuilder {
    pub fn new(flow_uri: impl Into<String>) -> Self {
        Self {
            flow_uri: flow_uri.into(),
            id: None,
            state: 0,
            attrs: Vec::new(),
            steps: Vec::new(),
            finish: Finish::Active,
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_state(mut self, state: i32) -> Self {
        self.state = state;
        self
    }

    pub fn with_attr(mut self, name: impl Into<String>, value: Value) -> Self {
        self.attrs.push((name.into(), value));
        self
    }

    /// Steps to apply, in order, each one becoming the change tracker
    pub fn with_steps(mut self, steps: Vec<Value>) -> Self {
        self.steps = steps;
        self
    }

    /// Leave the instance unstarted (no steps can be applied)
    pub fn not_started(mut self) -> Self {
        self.finish = Finish::NotStarted;
        self
    }

    pub fn completed(mut self) -> Self {
        self.finish = Finish::Completed;
        self
    }

    pub fn failed(mut self, error: impl Into<String>) -> Self {
        self.finish = Finish::Failed(error.into());
        self
    }

    pub fn cancelled(mut self) -> Self {
        self.finish = Finish::Cancelled;
        self
    }

    /// Build the instance
    ///
    /// Panics when the requested combination is impossible, e.g. steps on
    /// an unstarted instance.
    pub fn build(self) -> FlowInstance {
        let mut instance = match self.id {
            Some(id) => FlowInstance::with_id(FlowInstanceId(id), self.flow_uri),
            None => FlowInstance::new(self.flow_uri),
        };

        instance.set_state(self.state);
        for (name, value) in self.attrs {
            instance.set_attr(name, value);
        }

        if self.finish == Finish::NotStarted {
            assert!(self.steps.is_empty(), "cannot apply steps to an unstarted instance");
            return instance;
        }

        instance.start().expect("fresh instance must start");
        for step in self.steps {
            instance
                .apply_step(ChangeTracker::new(step))
                .expect("active instance must accept steps");
        }

        match self.finish {
            Finish::Active | Finish::NotStarted => {}
            Finish::Completed => instance.complete().expect("active instance must complete"),
            Finish::Failed(error) => instance.fail(error).expect("active instance must fail"),
            Finish::Cancelled => instance.cancel().expect("active instance must cancel"),
        }

        instance
    }
}
