//! Scenario tests for the scene graph
//!
//! Shared fixtures live here: a [`Recorder`] behavior that journals every
//! hook invocation, and a helper that builds small trees.

mod transforms;

use crate::events::Event;
use crate::foundation::logging;
use crate::scene::{
    DrawCommand, NodeBehavior, NodeContext, NodeId, RenderStates, Renderer, Scene, AABB,
};
use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

pub(super) type Journal = Rc<RefCell<Vec<String>>>;

/// Behavior that writes `label:phase` into a shared journal
pub(super) struct Recorder {
    label: &'static str,
    journal: Journal,
    consume_events: bool,
    quad: Option<AABB>,
}

impl Recorder {
    pub(super) fn new(label: &'static str, journal: &Journal) -> Self {
        Self {
            label,
            journal: Rc::clone(journal),
            consume_events: false,
            quad: None,
        }
    }

    pub(super) fn consuming(mut self) -> Self {
        self.consume_events = true;
        self
    }

    pub(super) fn drawing(mut self, quad: AABB) -> Self {
        self.quad = Some(quad);
        self
    }
}

impl NodeBehavior for Recorder {
    fn handle_event(&mut self, _ctx: &mut NodeContext<'_>, event: &mut Event) {
        let entry = if event.handled {
            format!("{}:event(handled)", self.label)
        } else {
            format!("{}:event", self.label)
        };
        self.journal.borrow_mut().push(entry);
        if self.consume_events {
            event.mark_handled();
        }
    }

    fn update(&mut self, _ctx: &mut NodeContext<'_>, _dt: Duration) {
        self.journal.borrow_mut().push(format!("{}:update", self.label));
    }

    fn draw(
        &mut self,
        ctx: &mut NodeContext<'_>,
        states: &mut RenderStates,
        renderer: &mut dyn Renderer,
    ) {
        self.journal.borrow_mut().push(format!("{}:draw", self.label));
        if self.quad.is_some() {
            renderer.submit(DrawCommand {
                node: ctx.id(),
                z_index: ctx.z_index(),
                states: *states,
                local_bounds: self.quad,
            });
        }
    }
}

pub(super) fn journal() -> Journal {
    logging::init_for_tests();
    Rc::new(RefCell::new(Vec::new()))
}

pub(super) fn entries(journal: &Journal) -> Vec<String> {
    journal.borrow().clone()
}

/// Create a recording node and attach it under `parent`
pub(super) fn recorded_child(
    scene: &mut Scene,
    parent: NodeId,
    label: &'static str,
    journal: &Journal,
) -> NodeId {
    let id = scene.create_node_with(Recorder::new(label, journal));
    scene.set_name(id, label);
    scene
        .attach_child(parent, id)
        .expect("fresh node attaches");
    id
}
