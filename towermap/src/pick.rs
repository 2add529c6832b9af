//! Pointer handling: telling clicks from drags and turning picks into a selection.

use crate::surface::{MapSurface, ObjectId, PickResult};

/// Default distance in pixels the pointer may move between press and release of a click.
pub const DEFAULT_MAX_CLICK_MOVE: f64 = 5.0;

/// Position relative to the top left corner of the canvas, in CSS pixels.
#[derive(Debug, Default, Copy, Clone, PartialEq)]
pub struct ScreenPoint {
    /// Horizontal position.
    pub x: f64,
    /// Vertical position.
    pub y: f64,
}

impl ScreenPoint {
    /// Creates a new point.
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Converts client coordinates of an event to canvas coordinates. The canvas offset is floored
/// the same way browsers snap the canvas to device pixels.
pub fn canvas_position(
    client_x: f64,
    client_y: f64,
    canvas_left: f64,
    canvas_top: f64,
) -> ScreenPoint {
    ScreenPoint::new(client_x - canvas_left.floor(), client_y - canvas_top.floor())
}

/// Pointer event from the canvas.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum PointerInput {
    /// Mouse button pressed.
    MouseDown(ScreenPoint),
    /// Mouse button released.
    MouseUp(ScreenPoint),
    /// Finger touched the screen.
    TouchStart {
        /// Number of touches of the event.
        touches: usize,
        /// Position of the first touch.
        position: ScreenPoint,
    },
    /// Finger left the screen.
    TouchEnd {
        /// Number of changed touches of the event.
        touches: usize,
        /// Position of the first changed touch.
        position: ScreenPoint,
    },
}

#[derive(Debug, Default, Copy, Clone, PartialEq)]
enum ClickState {
    #[default]
    Idle,
    Armed(ScreenPoint),
}

/// Recognizes clicks: a press followed by a release close to the press position.
#[derive(Debug, Clone, PartialEq)]
pub struct ClickDetector {
    state: ClickState,
    max_move: f64,
}

impl Default for ClickDetector {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_CLICK_MOVE)
    }
}

impl ClickDetector {
    /// Creates a detector that allows `max_move` pixels of movement along each axis.
    pub fn new(max_move: f64) -> Self {
        Self {
            state: ClickState::Idle,
            max_move,
        }
    }

    /// Pointer pressed at the position.
    pub fn pointer_down(&mut self, position: ScreenPoint) {
        self.state = ClickState::Armed(position);
    }

    /// Pointer released at the position. Returns the position if it completes a click.
    pub fn pointer_up(&mut self, position: ScreenPoint) -> Option<ScreenPoint> {
        let ClickState::Armed(down) = std::mem::take(&mut self.state) else {
            return None;
        };

        let is_click = (position.x - down.x).abs() <= self.max_move
            && (position.y - down.y).abs() <= self.max_move;
        is_click.then_some(position)
    }

    /// Feeds an event to the detector. Multi-touch events are ignored.
    pub fn handle(&mut self, input: PointerInput) -> Option<ScreenPoint> {
        match input {
            PointerInput::MouseDown(position) => {
                self.pointer_down(position);
                None
            }
            PointerInput::MouseUp(position) => self.pointer_up(position),
            PointerInput::TouchStart { touches, position } if touches == 1 => {
                self.pointer_down(position);
                None
            }
            PointerInput::TouchEnd { touches, position } if touches == 1 => {
                self.pointer_up(position)
            }
            PointerInput::TouchStart { .. } | PointerInput::TouchEnd { .. } => None,
        }
    }

    /// Returns true between a press and a release.
    pub fn is_armed(&self) -> bool {
        matches!(self.state, ClickState::Armed(_))
    }
}

/// Outcome of [`Selection::apply`].
#[derive(Debug, Clone, PartialEq)]
pub enum SelectionChange {
    /// Nothing selectable was picked.
    Ignored,
    /// The picked object is already selected.
    Unchanged,
    /// Another object became selected.
    Selected {
        /// The new selection.
        object: ObjectId,
        /// Name written to the selection property, if it was written.
        published: Option<String>,
    },
}

/// Currently selected map object, mirrored to a dynamic property of the engine.
#[derive(Debug, Clone, PartialEq)]
pub struct Selection {
    property: String,
    current: Option<ObjectId>,
    published: Option<String>,
}

impl Selection {
    /// Creates an empty selection published under the given dynamic property.
    pub fn new(property: impl Into<String>) -> Self {
        Self {
            property: property.into(),
            current: None,
            published: None,
        }
    }

    /// Selects the topmost pickable result. When several objects are under the pointer, the
    /// currently selected one is skipped so that repeated clicks cycle through the stack.
    pub fn apply<S: MapSurface + ?Sized>(
        &mut self,
        results: Vec<PickResult>,
        surface: &mut S,
    ) -> SelectionChange {
        let mut candidates: Vec<PickResult> = results
            .into_iter()
            .filter(|r| r.user_data.is_some())
            .collect();

        if candidates.len() > 1 {
            if let Some(current) = &self.current {
                candidates.retain(|r| &r.object != current);
            }
        }

        let Some(picked) = candidates.into_iter().next() else {
            log::debug!("Nothing selectable under the pointer");
            return SelectionChange::Ignored;
        };

        if self.current.as_ref() == Some(&picked.object) {
            return SelectionChange::Unchanged;
        }

        log::debug!("Selected {:?}", picked.object);
        let name = picked.name().map(str::to_string);
        self.current = Some(picked.object.clone());

        let published = match name {
            Some(name) if self.published.as_ref() != Some(&name) => {
                surface.set_dynamic_property(&self.property, vec![name.clone()]);
                self.published = Some(name.clone());
                Some(name)
            }
            _ => None,
        };

        SelectionChange::Selected {
            object: picked.object,
            published,
        }
    }

    /// Selected object.
    pub fn current(&self) -> Option<&ObjectId> {
        self.current.as_ref()
    }

    /// Last name written to the dynamic property.
    pub fn published_name(&self) -> Option<&str> {
        self.published.as_deref()
    }

    /// Name of the dynamic property.
    pub fn property(&self) -> &str {
        &self.property
    }
}
