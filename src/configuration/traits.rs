use miette::Result;

/// A deserialized configuration table that still needs validating
/// before it can be used.
pub trait ResolvableConfiguration {
    type Resolved;

    /// Validate the table and turn it into its `Resolved` type.
    fn resolve(self) -> Result<Self::Resolved>;
}


/// Like [`ResolvableConfiguration`], but resolution needs values
/// from an already-resolved table (usually the base paths).
pub trait ResolvableConfigurationWithContext {
    type Context;
    type Resolved;

    /// Validate the table against `context` and turn it into its `Resolved` type.
    fn resolve(self, context: Self::Context) -> Result<Self::Resolved>;
}
