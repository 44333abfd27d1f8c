/// A marker trait for model settings. Use this to define the settings for a model. These
/// settings should be readable from a config file.
pub trait ModelSettings: Clone {}

/// A trait for models. A model is a struct that contains a behaviour that can be used by
/// the nodes, e.g. a channel or a mobility pattern.
pub trait Model {
    type Settings: ModelSettings;

    fn with_settings(settings: &Self::Settings) -> Self;
}
