//! Input events delivered to the scene
//!
//! The windowing layer polls one [`Event`] per call and hands it to
//! [`Scene::handle_event`](crate::scene::Scene::handle_event). Handlers read
//! payloads through the narrowing accessors, which return `None` on a type
//! mismatch, and set [`Event::handled`] to tell ancestors the event was used.

use crate::foundation::math::Vec2;

/// Event type identification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventType {
    /// Pointer moved
    PointerMoved,
    /// Pointer button pressed or released
    PointerButton,
    /// Key pressed or released
    Key,
    /// Text input
    Text,
    /// Framebuffer resized
    Resized,
    /// Window close requested
    Closed,
    /// Application-defined event
    Custom,
}

/// Keys the scene distinguishes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyCode {
    /// Escape key
    Escape,
    /// Enter key
    Enter,
    /// Space key
    Space,
    /// Tab key
    Tab,
    /// Backspace key
    Backspace,
    /// Delete key
    Delete,
    /// Up arrow
    Up,
    /// Down arrow
    Down,
    /// Left arrow
    Left,
    /// Right arrow
    Right,
    /// Printable key, lower-cased
    Character(char),
    /// F1..F12
    Function(u8),
}

/// Mouse buttons
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseButton {
    /// Left mouse button
    Left,
    /// Right mouse button
    Right,
    /// Middle mouse button
    Middle,
}

/// Pointer position in window coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerMoved {
    /// Cursor position
    pub position: Vec2,
}

/// Pointer button transition
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerButton {
    /// Which button
    pub button: MouseButton,
    /// `true` on press, `false` on release
    pub pressed: bool,
    /// Cursor position at the transition
    pub position: Vec2,
}

/// Key transition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyInput {
    /// Which key
    pub key: KeyCode,
    /// `true` on press, `false` on release
    pub pressed: bool,
}

/// Event payloads
#[derive(Debug, Clone, PartialEq)]
pub enum EventPayload {
    /// Pointer moved
    PointerMoved(PointerMoved),
    /// Pointer button pressed or released
    PointerButton(PointerButton),
    /// Key pressed or released
    Key(KeyInput),
    /// Text codepoint
    Text(char),
    /// New framebuffer size
    Resized(Vec2),
    /// Window close requested
    Closed,
    /// Application-defined event id
    Custom(u32),
}

/// An input event travelling down the tree
#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    payload: EventPayload,
    /// Advisory flag set by the first node that consumed the event
    pub handled: bool,
}

impl Event {
    /// Wrap a payload into an unhandled event
    pub fn new(payload: EventPayload) -> Self {
        Self {
            payload,
            handled: false,
        }
    }

    /// Pointer moved to `position`
    pub fn pointer_moved_to(position: Vec2) -> Self {
        Self::new(EventPayload::PointerMoved(PointerMoved { position }))
    }

    /// Pointer button transition at `position`
    pub fn pointer_button_at(button: MouseButton, pressed: bool, position: Vec2) -> Self {
        Self::new(EventPayload::PointerButton(PointerButton {
            button,
            pressed,
            position,
        }))
    }

    /// Key transition
    pub fn key_input(key: KeyCode, pressed: bool) -> Self {
        Self::new(EventPayload::Key(KeyInput { key, pressed }))
    }

    /// Text input
    pub fn text_input(codepoint: char) -> Self {
        Self::new(EventPayload::Text(codepoint))
    }

    /// Type tag of the payload
    pub fn event_type(&self) -> EventType {
        match self.payload {
            EventPayload::PointerMoved(_) => EventType::PointerMoved,
            EventPayload::PointerButton(_) => EventType::PointerButton,
            EventPayload::Key(_) => EventType::Key,
            EventPayload::Text(_) => EventType::Text,
            EventPayload::Resized(_) => EventType::Resized,
            EventPayload::Closed => EventType::Closed,
            EventPayload::Custom(_) => EventType::Custom,
        }
    }

    /// Raw payload
    pub fn payload(&self) -> &EventPayload {
        &self.payload
    }

    /// Mark as consumed
    pub fn mark_handled(&mut self) {
        self.handled = true;
    }

    /// Pointer-moved payload, if this is one
    pub fn pointer_moved(&self) -> Option<&PointerMoved> {
        match &self.payload {
            EventPayload::PointerMoved(p) => Some(p),
            _ => None,
        }
    }

    /// Pointer-button payload, if this is one
    pub fn pointer_button(&self) -> Option<&PointerButton> {
        match &self.payload {
            EventPayload::PointerButton(p) => Some(p),
            _ => None,
        }
    }

    /// Key payload, if this is one
    pub fn key(&self) -> Option<&KeyInput> {
        match &self.payload {
            EventPayload::Key(k) => Some(k),
            _ => None,
        }
    }

    /// Text codepoint, if this is a text event
    pub fn text(&self) -> Option<char> {
        match self.payload {
            EventPayload::Text(c) => Some(c),
            _ => None,
        }
    }

    /// New size, if this is a resize event
    pub fn resized(&self) -> Option<Vec2> {
        match self.payload {
            EventPayload::Resized(size) => Some(size),
            _ => None,
        }
    }

    /// Pointer position carried by either pointer payload
    pub fn pointer_position(&self) -> Option<Vec2> {
        match &self.payload {
            EventPayload::PointerMoved(p) => Some(p.position),
            EventPayload::PointerButton(p) => Some(p.position),
            _ => None,
        }
    }
}
