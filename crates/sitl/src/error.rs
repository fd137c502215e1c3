/// Errors that can occur while configuring or stepping the simulator.
#[derive(Debug, thiserror::Error)]
pub enum SimulatorError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(&'static str),

    #[error("Invalid step size: {0} us")]
    InvalidStep(u64),
}
