//! Navigation side panel.

/// Visible state of the panel.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub enum NavState {
    /// Hidden to the left of the screen.
    #[default]
    Closed,
    /// Narrow panel with the basic controls.
    Basic,
    /// Full width panel.
    Advanced {
        /// State restored when the advanced mode is toggled off.
        return_to: ReturnState,
    },
}

/// State the panel goes back to after the advanced mode.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub enum ReturnState {
    /// Panel was closed.
    #[default]
    Closed,
    /// Panel was in the basic mode.
    Basic,
}

impl From<ReturnState> for NavState {
    fn from(value: ReturnState) -> Self {
        match value {
            ReturnState::Closed => NavState::Closed,
            ReturnState::Basic => NavState::Basic,
        }
    }
}

/// CSS applied to the panel element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavStyle {
    /// `width` property.
    pub width: &'static str,
    /// `transform` property.
    pub transform: &'static str,
}

/// Controller of the panel, driven by the hamburger and the advanced buttons.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct NavPanel {
    state: NavState,
}

impl NavPanel {
    /// Closed panel.
    pub fn new() -> Self {
        Self::default()
    }

    /// Hamburger button: opens the basic panel or closes whatever is open.
    pub fn toggle_basic(&mut self) -> NavStyle {
        self.state = match self.state {
            NavState::Closed => NavState::Basic,
            NavState::Basic | NavState::Advanced { .. } => NavState::Closed,
        };
        self.style()
    }

    /// Advanced button: opens the full width panel or restores the state it was opened from.
    pub fn toggle_advanced(&mut self) -> NavStyle {
        self.state = match self.state {
            NavState::Advanced { return_to } => return_to.into(),
            NavState::Closed => NavState::Advanced {
                return_to: ReturnState::Closed,
            },
            NavState::Basic => NavState::Advanced {
                return_to: ReturnState::Basic,
            },
        };
        self.style()
    }

    /// Current state.
    pub fn state(&self) -> NavState {
        self.state
    }

    /// Returns true when the advanced mode is open.
    pub fn is_advanced(&self) -> bool {
        matches!(self.state, NavState::Advanced { .. })
    }

    /// Returns true when the panel is visible.
    pub fn is_open(&self) -> bool {
        self.state != NavState::Closed
    }

    /// Style of the panel element in the current state.
    pub fn style(&self) -> NavStyle {
        match self.state {
            NavState::Closed => NavStyle {
                width: "500px",
                transform: "translateX(-500px)",
            },
            NavState::Basic => NavStyle {
                width: "500px",
                transform: "translateX(0px)",
            },
            NavState::Advanced { .. } => NavStyle {
                width: "100%",
                transform: "translateX(0px)",
            },
        }
    }

    /// Text of the advanced button: the mode it switches to.
    pub fn advanced_label(&self) -> &'static str {
        if self.is_advanced() {
            "Basic"
        } else {
            "Advanced"
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hamburger_toggles() {
        let mut nav = NavPanel::new();
        assert!(!nav.is_open());

        assert_eq!(nav.toggle_basic().transform, "translateX(0px)");
        assert_eq!(nav.state(), NavState::Basic);
        assert_eq!(nav.toggle_basic().transform, "translateX(-500px)");
        assert_eq!(nav.state(), NavState::Closed);
    }

    #[test]
    fn advanced_twice_restores_style() {
        for initial in [NavState::Closed, NavState::Basic] {
            let mut nav = NavPanel::new();
            if initial == NavState::Basic {
                nav.toggle_basic();
            }
            let before = nav.style();

            let advanced = nav.toggle_advanced();
            assert_eq!(advanced.width, "100%");
            assert_eq!(nav.advanced_label(), "Basic");

            assert_eq!(nav.toggle_advanced(), before);
            assert_eq!(nav.state(), initial);
            assert_eq!(nav.advanced_label(), "Advanced");
        }
    }

    #[test]
    fn hamburger_closes_advanced() {
        let mut nav = NavPanel::new();
        nav.toggle_basic();
        nav.toggle_advanced();

        let style = nav.toggle_basic();
        assert_eq!(nav.state(), NavState::Closed);
        assert_eq!(style.width, "500px");
        assert_eq!(style.transform, "translateX(-500px)");
    }
}
