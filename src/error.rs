/// Errors surfaced by the fallible entry points of the crate.
///
/// Most failure paths of a panel loader are soft: they are logged and the
/// loader carries on. This type only exists for callers who explicitly ask for
/// the reason (see [`PanelLoader::try_attach_to_panel`](crate::PanelLoader::try_attach_to_panel)
/// and [`LoaderOptions::merged`](crate::LoaderOptions::merged)).
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The options object could not be turned into [`LoaderOptions`](crate::LoaderOptions)
    #[error("invalid loader options: {0}")]
    InvalidOptions(#[from] serde_json::Error),
    /// The options were valid JSON but not a JSON object
    #[error("loader options must be a JSON object, got: {0}")]
    OptionsNotAnObject(String),
    /// The selector uses a syntax the document cannot evaluate
    #[error("invalid selector: {0:?}")]
    InvalidSelector(String),
    /// No element matched the selector
    #[error("Panel not found: {0}")]
    PanelNotFound(String),
}

pub type Result<T> = core::result::Result<T, Error>;
