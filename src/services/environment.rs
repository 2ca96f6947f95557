use crate::model::snapshot::Theme;

/// What the host can offer the workspace. A non-interactive host (tests,
/// batch jobs) gets no persistence and no OS theme lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Environment {
    pub interactive: bool,
    pub prefers_dark: bool,
}

impl Environment {
    pub fn interactive(prefers_dark: bool) -> Self {
        Environment {
            interactive: true,
            prefers_dark,
        }
    }

    pub fn headless() -> Self {
        Environment::default()
    }

    pub fn system_theme(&self) -> Theme {
        if self.interactive && self.prefers_dark {
            Theme::Dark
        } else {
            Theme::Light
        }
    }
}
