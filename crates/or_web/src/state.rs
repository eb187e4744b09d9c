use or_analysis::BatchRunner;

pub struct AppState {
    pub runner: BatchRunner,
    /// Include the error's debug chain in error responses.
    pub dev_mode: bool,
}

impl AppState {
    pub fn new(runner: BatchRunner) -> Self {
        Self { runner, dev_mode: false }
    }

    pub fn with_dev_mode(mut self, dev_mode: bool) -> Self {
        self.dev_mode = dev_mode;
        self
    }
}
