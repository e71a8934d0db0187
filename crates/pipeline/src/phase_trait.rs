/// A lifecycle phase invoked by the build orchestrator.
///
/// Phases take their context by reference and report everything through the
/// returned value; they hold no state between invocations.
pub trait BuildpackPhase {
    type Context;
    type Output;
    type Error: std::error::Error;

    fn name(&self) -> &'static str;

    fn execute(&self, context: &Self::Context) -> Result<Self::Output, Self::Error>;
}
